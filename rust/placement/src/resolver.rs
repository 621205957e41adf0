// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placement resolution: surface snapping, occupancy checks, and world
//! patch assembly.

use crate::transform::{matrix_col_major, transform_matrix};
use scenesmith_core::{
    AssetSpec, OccupiedRegion, PatchObject, PatchPhysics, PatchPlacement, PatchTransform,
    PipelineDefaults, Surface, Vec3, WorldContext, WorldPatch,
};
use scenesmith_geometry::load_glb;
use tracing::{info, warn};

/// Bounding-box extents of the cleaned container, with a cube fallback
/// when the bytes cannot be read. The fallback keeps placement running on
/// a broken export; validation fails the candidate separately.
pub fn extents_from_glb(data: &[u8], defaults: &PipelineDefaults) -> Vec3 {
    match load_glb(data) {
        Ok(contents) if !contents.meshes.is_empty() => {
            let extents = contents.merged().extents();
            Vec3::new(extents.x, extents.y, extents.z)
        }
        Ok(_) => {
            warn!("Container holds no triangle geometry, using fallback extents");
            Vec3::new(
                defaults.fallback_extent_m,
                defaults.fallback_extent_m,
                defaults.fallback_extent_m,
            )
        }
        Err(err) => {
            warn!(error = %err, "Could not load mesh extents, using fallback");
            Vec3::new(
                defaults.fallback_extent_m,
                defaults.fallback_extent_m,
                defaults.fallback_extent_m,
            )
        }
    }
}

/// Compute the world transform for an asset and assemble its world patch.
///
/// Position priority: the spec pose seeds the position, the target
/// surface overrides the up coordinate (top + clearance) and fills in
/// zero lateral coordinates from the surface center, and occupied-region
/// overlaps produce a warning without moving the object.
pub fn resolve_placement(
    spec: &AssetSpec,
    world: &WorldContext,
    extents: Vec3,
    asset_uri: &str,
    defaults: &PipelineDefaults,
) -> WorldPatch {
    let placement = &spec.placement;
    let clearance_m = defaults.resolve_clearance(placement);

    let surface = find_surface(world, placement.target_surface_id.as_deref());
    let position = resolve_position(
        placement.pose.position,
        surface,
        clearance_m,
        world,
    );
    let rotation = placement.pose.rotation_euler_deg;

    let collision_warn = if placement.collision_allowed {
        false
    } else {
        overlaps_occupied(position, extents, &world.occupied_regions)
    };

    let matrix = transform_matrix(position, rotation);

    let mut warnings = Vec::new();
    if collision_warn {
        warnings.push(
            "Proposed position overlaps an occupied region - manual adjustment may be needed"
                .to_owned(),
        );
    }
    if surface.is_none() {
        warnings.push("No target surface found - position inferred from spec only".to_owned());
    }

    info!(
        x = position.x,
        y = position.y,
        z = position.z,
        surface = placement.target_surface_id.as_deref().unwrap_or("none"),
        "World patch computed"
    );

    WorldPatch {
        schema_version: defaults.schema_version.clone(),
        world_id: world.world_id.clone().unwrap_or_else(|| "unknown".into()),
        object: PatchObject {
            name: spec
                .object
                .name
                .clone()
                .unwrap_or_else(|| "generated_asset".into()),
            category: spec.object.category.clone().unwrap_or_else(|| "prop".into()),
            asset_uri: asset_uri.to_owned(),
        },
        transform: PatchTransform {
            position,
            rotation_euler_deg: rotation,
            scale: Vec3::new(1.0, 1.0, 1.0),
            matrix_4x4_col_major: matrix_col_major(&matrix),
        },
        placement: PatchPlacement {
            target_surface_id: placement
                .target_surface_id
                .clone()
                .unwrap_or_else(|| "unknown".into()),
            clearance_m,
            anchors: defaults.resolve_anchors(placement),
            collision_allowed: placement.collision_allowed,
        },
        physics: PatchPhysics {
            gravity: world
                .physics
                .as_ref()
                .map_or(defaults.gravity, |p| p.gravity),
            is_static: true,
            collision_mesh: "convex_hull".to_owned(),
        },
        warnings,
    }
}

/// Surface lookup: the requested id wins, any first surface is the
/// fallback, an empty surface list yields none.
fn find_surface<'a>(world: &'a WorldContext, surface_id: Option<&str>) -> Option<&'a Surface> {
    if world.surfaces.is_empty() {
        return None;
    }
    if let Some(id) = surface_id {
        if let Some(surface) = world.surface_by_id(id) {
            return Some(surface);
        }
    }
    world.surfaces.first()
}

/// Seed from the spec pose, then let the surface override: zero lateral
/// coordinates mean "unset" and defer to the surface center, and the up
/// coordinate is always the surface top plus clearance.
fn resolve_position(
    spec_position: Vec3,
    surface: Option<&Surface>,
    clearance_m: f64,
    world: &WorldContext,
) -> Vec3 {
    let mut position = spec_position;

    let Some(surface) = surface else {
        return position;
    };

    if position.x == 0.0 {
        if let Some(center_x) = surface.bbox.center_x {
            position.x = center_x;
        }
    }
    if position.z == 0.0 {
        if let Some(center_z) = surface.bbox.center_z {
            position.z = center_z;
        }
    }

    let up = world.up_axis.index();
    position.set_component(up, surface.top_height(world.up_axis) + clearance_m);
    position
}

/// Soft collision test: lateral AABB of the object against every
/// occupied region. Strict inequalities, so touching edges do not count.
fn overlaps_occupied(position: Vec3, extents: Vec3, regions: &[OccupiedRegion]) -> bool {
    let half_x = extents.x / 2.0;
    let half_z = extents.z / 2.0;
    let obj_min_x = position.x - half_x;
    let obj_max_x = position.x + half_x;
    let obj_min_z = position.z - half_z;
    let obj_max_z = position.z + half_z;

    for region in regions {
        let bbox = &region.bbox;
        let overlap_x = obj_max_x > bbox.min_x && obj_min_x < bbox.max_x;
        let overlap_z = obj_max_z > bbox.min_z && obj_min_z < bbox.max_z;
        if overlap_x && overlap_z {
            warn!(
                x = position.x,
                z = position.z,
                region = region.id.as_deref().unwrap_or("?"),
                "Placement overlaps occupied region"
            );
            return true;
        }
    }
    false
}
