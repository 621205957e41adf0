// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! World transform construction.

use nalgebra::{Matrix4, Rotation3, Vector3};
use scenesmith_core::Vec3;

/// Build the object-to-world matrix from a position and ZYX-intrinsic
/// Euler angles in degrees: `M = T * Rz * Ry * Rx`.
pub fn transform_matrix(position: Vec3, rotation_euler_deg: Vec3) -> Matrix4<f64> {
    let rotation = Rotation3::from_euler_angles(
        rotation_euler_deg.x.to_radians(),
        rotation_euler_deg.y.to_radians(),
        rotation_euler_deg.z.to_radians(),
    );

    let mut matrix = Matrix4::identity();
    matrix
        .fixed_view_mut::<3, 3>(0, 0)
        .copy_from(rotation.matrix());
    matrix
        .fixed_view_mut::<3, 1>(0, 3)
        .copy_from(&Vector3::new(position.x, position.y, position.z));
    matrix
}

/// Flatten to the 16-float column-major layout glTF expects.
pub fn matrix_col_major(matrix: &Matrix4<f64>) -> Vec<f64> {
    matrix.as_slice().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_identity_rotation_keeps_translation_in_last_column() {
        let m = transform_matrix(Vec3::new(1.0, 2.0, 3.0), Vec3::default());
        let flat = matrix_col_major(&m);

        assert_eq!(flat.len(), 16);
        // Column-major: translation occupies elements 12..15
        assert_relative_eq!(flat[12], 1.0);
        assert_relative_eq!(flat[13], 2.0);
        assert_relative_eq!(flat[14], 3.0);
        assert_relative_eq!(flat[15], 1.0);
        // Rotation block is identity
        assert_relative_eq!(flat[0], 1.0);
        assert_relative_eq!(flat[5], 1.0);
        assert_relative_eq!(flat[10], 1.0);
    }

    #[test]
    fn test_yaw_90_maps_x_to_negative_z() {
        // +90 deg about Y sends +X to -Z in a right-handed frame
        let m = transform_matrix(Vec3::default(), Vec3::new(0.0, 90.0, 0.0));
        let p = m.transform_point(&Point3::new(1.0, 0.0, 0.0));

        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.z, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_euler_order_is_zyx() {
        // Compose 90 deg about X then 90 deg about Z; with ZYX order the
        // +Y axis goes X-rot: +Y -> +Z, and Z-rot leaves +Z fixed.
        let m = transform_matrix(Vec3::default(), Vec3::new(90.0, 0.0, 90.0));
        let p = m.transform_point(&Point3::new(0.0, 1.0, 0.0));

        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_then_translation() {
        let m = transform_matrix(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 90.0, 0.0));
        let p = m.transform_point(&Point3::new(1.0, 0.0, 0.0));

        assert_relative_eq!(p.x, 5.0, epsilon = 1e-12);
        assert_relative_eq!(p.z, -1.0, epsilon = 1e-12);
    }
}
