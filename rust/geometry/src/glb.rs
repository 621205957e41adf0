// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Self-contained GLB (binary glTF 2.0) reader, writer, and material
//! patcher.
//!
//! The writer emits a single-buffer, single-primitive container with
//! positions, indices, and optional vertex colors and UVs. The reader
//! handles the subset of glTF this pipeline produces and consumes:
//! triangle primitives with f32 positions and u8/u16/u32 indices. The
//! patcher edits the JSON chunk in place and recomputes chunk and total
//! lengths; the BIN chunk bytes are never touched.

use crate::error::{Error, Result};
use crate::mesh::TriMesh;
use nalgebra::Point3;
use serde_json::{json, Value};
use tracing::{debug, warn};

const GLB_MAGIC: u32 = 0x4654_6C67; // "glTF"
const GLB_VERSION: u32 = 2;
const CHUNK_JSON: u32 = 0x4E4F_534A; // "JSON"
const CHUNK_BIN: u32 = 0x004E_4942; // "BIN\0"

const HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

// glTF component types
const COMP_U8: u64 = 5121;
const COMP_U16: u64 = 5123;
const COMP_U32: u64 = 5125;
const COMP_F32: u64 = 5126;

/// Everything the validation battery needs from a loaded container.
#[derive(Debug, Clone)]
pub struct GlbContents {
    /// Triangle sub-meshes, one per triangle primitive
    pub meshes: Vec<TriMesh>,
    pub texture_count: usize,
    pub image_count: usize,
    pub has_vertex_colors: bool,
}

impl GlbContents {
    /// Textures count only when both a texture and a backing image exist.
    #[inline]
    pub fn has_textures(&self) -> bool {
        self.texture_count > 0 && self.image_count > 0
    }

    /// Flatten all sub-meshes into one. Returns an empty mesh if the
    /// container held no triangle primitives.
    pub fn merged(&self) -> TriMesh {
        let mut merged = TriMesh::new();
        for mesh in &self.meshes {
            merged.concat(mesh);
        }
        merged
    }
}

fn pad4(len: usize) -> usize {
    (4 - len % 4) % 4
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Serialize a mesh into GLB bytes.
///
/// The container always carries one material slot (`mat0`) referenced by
/// the primitive, so a later [`patch_material`] lands on a material the
/// primitive actually uses.
pub fn export_glb(mesh: &TriMesh) -> Result<Vec<u8>> {
    if mesh.is_empty() {
        return Err(Error::EmptyMesh("cannot export empty mesh".into()));
    }

    let vertex_count = mesh.positions.len();
    let mut bin: Vec<u8> = Vec::new();
    let mut buffer_views = Vec::new();
    let mut accessors = Vec::new();

    // Positions, f32 VEC3 with required min/max
    let mut min = [f32::INFINITY; 3];
    let mut max = [f32::NEG_INFINITY; 3];
    for p in &mesh.positions {
        let q = [p.x as f32, p.y as f32, p.z as f32];
        for i in 0..3 {
            min[i] = min[i].min(q[i]);
            max[i] = max[i].max(q[i]);
            bin.extend_from_slice(&q[i].to_le_bytes());
        }
    }
    buffer_views.push(json!({
        "buffer": 0,
        "byteOffset": 0,
        "byteLength": vertex_count * 12,
    }));
    accessors.push(json!({
        "bufferView": 0,
        "componentType": COMP_F32,
        "count": vertex_count,
        "type": "VEC3",
        "min": min,
        "max": max,
    }));
    let position_accessor = 0u32;

    // Indices, u32 SCALAR
    let index_offset = bin.len();
    for face in &mesh.faces {
        for &vi in face {
            bin.extend_from_slice(&vi.to_le_bytes());
        }
    }
    buffer_views.push(json!({
        "buffer": 0,
        "byteOffset": index_offset,
        "byteLength": mesh.faces.len() * 12,
    }));
    accessors.push(json!({
        "bufferView": 1,
        "componentType": COMP_U32,
        "count": mesh.faces.len() * 3,
        "type": "SCALAR",
    }));
    let index_accessor = 1u32;

    let mut attributes = json!({ "POSITION": position_accessor });

    // Smooth area-weighted vertex normals
    let normal_offset = bin.len();
    for n in mesh.vertex_normals() {
        bin.extend_from_slice(&n.x.to_le_bytes());
        bin.extend_from_slice(&n.y.to_le_bytes());
        bin.extend_from_slice(&n.z.to_le_bytes());
    }
    let view_index = buffer_views.len();
    buffer_views.push(json!({
        "buffer": 0,
        "byteOffset": normal_offset,
        "byteLength": vertex_count * 12,
    }));
    let accessor_index = accessors.len();
    accessors.push(json!({
        "bufferView": view_index,
        "componentType": COMP_F32,
        "count": vertex_count,
        "type": "VEC3",
    }));
    attributes["NORMAL"] = json!(accessor_index);

    if let Some(colors) = &mesh.colors {
        let color_offset = bin.len();
        for c in colors {
            bin.extend_from_slice(c);
        }
        bin.resize(bin.len() + pad4(bin.len()), 0);
        let view_index = buffer_views.len();
        buffer_views.push(json!({
            "buffer": 0,
            "byteOffset": color_offset,
            "byteLength": colors.len() * 4,
        }));
        let accessor_index = accessors.len();
        accessors.push(json!({
            "bufferView": view_index,
            "componentType": COMP_U8,
            "normalized": true,
            "count": colors.len(),
            "type": "VEC4",
        }));
        attributes["COLOR_0"] = json!(accessor_index);
    }

    if let Some(uvs) = &mesh.uvs {
        let uv_offset = bin.len();
        for uv in uvs {
            bin.extend_from_slice(&uv[0].to_le_bytes());
            bin.extend_from_slice(&uv[1].to_le_bytes());
        }
        let view_index = buffer_views.len();
        buffer_views.push(json!({
            "buffer": 0,
            "byteOffset": uv_offset,
            "byteLength": uvs.len() * 8,
        }));
        let accessor_index = accessors.len();
        accessors.push(json!({
            "bufferView": view_index,
            "componentType": COMP_F32,
            "count": uvs.len(),
            "type": "VEC2",
        }));
        attributes["TEXCOORD_0"] = json!(accessor_index);
    }

    let gltf = json!({
        "asset": { "version": "2.0", "generator": "scenesmith" },
        "scene": 0,
        "scenes": [ { "nodes": [0] } ],
        "nodes": [ { "mesh": 0 } ],
        "meshes": [ {
            "primitives": [ {
                "attributes": attributes,
                "indices": index_accessor,
                "material": 0,
                "mode": 4,
            } ],
        } ],
        "materials": [ { "name": "mat0" } ],
        "buffers": [ { "byteLength": bin.len() } ],
        "bufferViews": buffer_views,
        "accessors": accessors,
    });

    let json_bytes = serde_json::to_vec(&gltf)?;
    Ok(assemble(&json_bytes, &bin))
}

/// Lay out header + JSON chunk (space padded) + BIN chunk (zero padded).
fn assemble(json_bytes: &[u8], bin: &[u8]) -> Vec<u8> {
    let json_padded = json_bytes.len() + pad4(json_bytes.len());
    let bin_padded = bin.len() + pad4(bin.len());
    let total = HEADER_LEN + CHUNK_HEADER_LEN + json_padded + CHUNK_HEADER_LEN + bin_padded;

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    out.extend_from_slice(&GLB_VERSION.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());

    out.extend_from_slice(&(json_padded as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    out.extend_from_slice(json_bytes);
    out.resize(out.len() + pad4(json_bytes.len()), 0x20);

    out.extend_from_slice(&(bin_padded as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_BIN.to_le_bytes());
    out.extend_from_slice(bin);
    out.resize(out.len() + pad4(bin.len()), 0);

    out
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

fn read_u32(data: &[u8], offset: usize) -> Result<u32> {
    let bytes: [u8; 4] = data
        .get(offset..offset + 4)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| Error::ContainerFormat(format!("truncated at byte {offset}")))?;
    Ok(u32::from_le_bytes(bytes))
}

/// Split a GLB byte stream into its JSON document and BIN payload.
fn split_chunks(data: &[u8]) -> Result<(Value, &[u8])> {
    if data.len() < HEADER_LEN {
        return Err(Error::ContainerFormat("shorter than GLB header".into()));
    }
    if read_u32(data, 0)? != GLB_MAGIC {
        return Err(Error::ContainerFormat("bad magic, not a GLB file".into()));
    }
    let version = read_u32(data, 4)?;
    if version != GLB_VERSION {
        return Err(Error::ContainerFormat(format!(
            "unsupported GLB version {version}"
        )));
    }

    let chunk0_len = read_u32(data, HEADER_LEN)? as usize;
    let chunk0_type = read_u32(data, HEADER_LEN + 4)?;
    if chunk0_type != CHUNK_JSON {
        return Err(Error::ContainerFormat("chunk 0 is not JSON".into()));
    }
    let json_start = HEADER_LEN + CHUNK_HEADER_LEN;
    let json_bytes = data
        .get(json_start..json_start + chunk0_len)
        .ok_or_else(|| Error::ContainerFormat("JSON chunk overruns file".into()))?;
    let gltf: Value = serde_json::from_slice(trim_chunk_padding(json_bytes))?;

    // BIN chunk is optional in glTF but required by everything we emit
    let bin_start = json_start + chunk0_len;
    let bin = if data.len() >= bin_start + CHUNK_HEADER_LEN {
        let bin_len = read_u32(data, bin_start)? as usize;
        let bin_type = read_u32(data, bin_start + 4)?;
        if bin_type != CHUNK_BIN {
            return Err(Error::ContainerFormat("chunk 1 is not BIN".into()));
        }
        let payload_start = bin_start + CHUNK_HEADER_LEN;
        data.get(payload_start..payload_start + bin_len)
            .ok_or_else(|| Error::ContainerFormat("BIN chunk overruns file".into()))?
    } else {
        &[]
    };

    Ok((gltf, bin))
}

fn trim_chunk_padding(json_bytes: &[u8]) -> &[u8] {
    let mut end = json_bytes.len();
    while end > 0 && (json_bytes[end - 1] == 0x20 || json_bytes[end - 1] == 0) {
        end -= 1;
    }
    &json_bytes[..end]
}

/// Parse GLB bytes into triangle sub-meshes plus texture bookkeeping.
pub fn load_glb(data: &[u8]) -> Result<GlbContents> {
    let (gltf, bin) = split_chunks(data)?;

    let texture_count = gltf
        .get("textures")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    let image_count = gltf
        .get("images")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);

    let mut meshes = Vec::new();
    let mut has_vertex_colors = false;

    let empty = Vec::new();
    let gltf_meshes = gltf
        .get("meshes")
        .and_then(Value::as_array)
        .unwrap_or(&empty);
    for gltf_mesh in gltf_meshes {
        let primitives = gltf_mesh
            .get("primitives")
            .and_then(Value::as_array)
            .unwrap_or(&empty);
        for primitive in primitives {
            // Default mode is 4 (TRIANGLES)
            let mode = primitive.get("mode").and_then(Value::as_u64).unwrap_or(4);
            if mode != 4 {
                continue;
            }
            let Some(attributes) = primitive.get("attributes") else {
                continue;
            };
            let Some(position_accessor) = attributes.get("POSITION").and_then(Value::as_u64)
            else {
                continue;
            };

            let positions = read_positions(&gltf, bin, position_accessor)?;
            let faces = match primitive.get("indices").and_then(Value::as_u64) {
                Some(accessor) => read_faces(&gltf, bin, accessor)?,
                None => (0..positions.len() as u32 / 3)
                    .map(|t| [t * 3, t * 3 + 1, t * 3 + 2])
                    .collect(),
            };

            let mut mesh = TriMesh::from_parts(positions, faces);
            if let Some(color_accessor) = attributes.get("COLOR_0").and_then(Value::as_u64) {
                mesh.colors = Some(read_colors(&gltf, bin, color_accessor)?);
                has_vertex_colors = true;
            }
            meshes.push(mesh);
        }
    }

    debug!(
        sub_meshes = meshes.len(),
        texture_count, image_count, has_vertex_colors, "Loaded GLB container"
    );

    Ok(GlbContents {
        meshes,
        texture_count,
        image_count,
        has_vertex_colors,
    })
}

/// Resolved accessor: payload slice start, element count, component type.
struct AccessorView<'a> {
    bin: &'a [u8],
    start: usize,
    count: usize,
    component_type: u64,
    element_type: String,
}

fn accessor_view<'a>(gltf: &Value, bin: &'a [u8], index: u64) -> Result<AccessorView<'a>> {
    let accessor = gltf
        .get("accessors")
        .and_then(Value::as_array)
        .and_then(|a| a.get(index as usize))
        .ok_or_else(|| Error::ContainerFormat(format!("accessor {index} missing")))?;

    let view_index = accessor
        .get("bufferView")
        .and_then(Value::as_u64)
        .ok_or_else(|| Error::ContainerFormat(format!("accessor {index} has no bufferView")))?;
    let view = gltf
        .get("bufferViews")
        .and_then(Value::as_array)
        .and_then(|v| v.get(view_index as usize))
        .ok_or_else(|| Error::ContainerFormat(format!("bufferView {view_index} missing")))?;

    let view_offset = view.get("byteOffset").and_then(Value::as_u64).unwrap_or(0);
    let accessor_offset = accessor
        .get("byteOffset")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let count = accessor
        .get("count")
        .and_then(Value::as_u64)
        .ok_or_else(|| Error::ContainerFormat(format!("accessor {index} has no count")))?;
    let component_type = accessor
        .get("componentType")
        .and_then(Value::as_u64)
        .ok_or_else(|| Error::ContainerFormat(format!("accessor {index} has no componentType")))?;
    let element_type = accessor
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("SCALAR")
        .to_owned();

    Ok(AccessorView {
        bin,
        start: (view_offset + accessor_offset) as usize,
        count: count as usize,
        component_type,
        element_type,
    })
}

impl AccessorView<'_> {
    fn f32_at(&self, byte_offset: usize) -> Result<f32> {
        let start = self.start + byte_offset;
        let bytes: [u8; 4] = self
            .bin
            .get(start..start + 4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| Error::ContainerFormat("accessor overruns BIN chunk".into()))?;
        Ok(f32::from_le_bytes(bytes))
    }

    fn byte_at(&self, byte_offset: usize) -> Result<u8> {
        self.bin
            .get(self.start + byte_offset)
            .copied()
            .ok_or_else(|| Error::ContainerFormat("accessor overruns BIN chunk".into()))
    }

    fn index_at(&self, element: usize) -> Result<u32> {
        match self.component_type {
            COMP_U8 => Ok(u32::from(self.byte_at(element)?)),
            COMP_U16 => {
                let start = self.start + element * 2;
                let bytes: [u8; 2] = self
                    .bin
                    .get(start..start + 2)
                    .and_then(|s| s.try_into().ok())
                    .ok_or_else(|| Error::ContainerFormat("index accessor overruns BIN".into()))?;
                Ok(u32::from(u16::from_le_bytes(bytes)))
            }
            COMP_U32 => {
                let start = self.start + element * 4;
                let bytes: [u8; 4] = self
                    .bin
                    .get(start..start + 4)
                    .and_then(|s| s.try_into().ok())
                    .ok_or_else(|| Error::ContainerFormat("index accessor overruns BIN".into()))?;
                Ok(u32::from_le_bytes(bytes))
            }
            other => Err(Error::ContainerFormat(format!(
                "unsupported index component type {other}"
            ))),
        }
    }
}

fn read_positions(gltf: &Value, bin: &[u8], accessor: u64) -> Result<Vec<Point3<f64>>> {
    let view = accessor_view(gltf, bin, accessor)?;
    if view.component_type != COMP_F32 || view.element_type != "VEC3" {
        return Err(Error::ContainerFormat(
            "POSITION accessor must be f32 VEC3".into(),
        ));
    }
    let mut positions = Vec::with_capacity(view.count);
    for i in 0..view.count {
        positions.push(Point3::new(
            f64::from(view.f32_at(i * 12)?),
            f64::from(view.f32_at(i * 12 + 4)?),
            f64::from(view.f32_at(i * 12 + 8)?),
        ));
    }
    Ok(positions)
}

fn read_faces(gltf: &Value, bin: &[u8], accessor: u64) -> Result<Vec<[u32; 3]>> {
    let view = accessor_view(gltf, bin, accessor)?;
    let mut faces = Vec::with_capacity(view.count / 3);
    let mut tri = [0u32; 3];
    for i in 0..view.count {
        tri[i % 3] = view.index_at(i)?;
        if i % 3 == 2 {
            faces.push(tri);
        }
    }
    Ok(faces)
}

fn read_colors(gltf: &Value, bin: &[u8], accessor: u64) -> Result<Vec<[u8; 4]>> {
    let view = accessor_view(gltf, bin, accessor)?;
    let components = match view.element_type.as_str() {
        "VEC4" => 4,
        "VEC3" => 3,
        other => {
            return Err(Error::ContainerFormat(format!(
                "unsupported COLOR_0 type {other}"
            )))
        }
    };
    let mut colors = Vec::with_capacity(view.count);
    for i in 0..view.count {
        let mut rgba = [255u8; 4];
        for c in 0..components {
            rgba[c] = match view.component_type {
                COMP_U8 => view.byte_at(i * components + c)?,
                COMP_F32 => {
                    let v = view.f32_at((i * components + c) * 4)?;
                    (v.clamp(0.0, 1.0) * 255.0).round() as u8
                }
                other => {
                    return Err(Error::ContainerFormat(format!(
                        "unsupported COLOR_0 component type {other}"
                    )))
                }
            };
        }
        colors.push(rgba);
    }
    Ok(colors)
}

// ---------------------------------------------------------------------------
// Material patcher
// ---------------------------------------------------------------------------

/// Inject PBR constants into the first material of a GLB byte stream.
///
/// Rewrites only the JSON chunk; chunk and total lengths are recomputed
/// and everything after the JSON chunk is carried over byte for byte. A
/// stream that is not a recognizable GLB is left untouched and `false` is
/// returned, so a bad container degrades to a validation failure later
/// instead of aborting the pipeline here.
pub fn patch_material(
    data: &mut Vec<u8>,
    base_color_linear: [f64; 4],
    metallic: f64,
    roughness: f64,
) -> Result<bool> {
    if data.len() < HEADER_LEN + CHUNK_HEADER_LEN
        || read_u32(data, 0)? != GLB_MAGIC
        || read_u32(data, 4)? != GLB_VERSION
    {
        warn!("Not a valid GLB container, skipping material patch");
        return Ok(false);
    }
    let chunk0_len = read_u32(data, HEADER_LEN)? as usize;
    if read_u32(data, HEADER_LEN + 4)? != CHUNK_JSON {
        warn!("GLB chunk 0 is not JSON, skipping material patch");
        return Ok(false);
    }
    let json_start = HEADER_LEN + CHUNK_HEADER_LEN;
    let json_bytes = data
        .get(json_start..json_start + chunk0_len)
        .ok_or_else(|| Error::ContainerFormat("JSON chunk overruns file".into()))?;
    let mut gltf: Value = serde_json::from_slice(trim_chunk_padding(json_bytes))?;

    let root = gltf
        .as_object_mut()
        .ok_or_else(|| Error::ContainerFormat("glTF root is not an object".into()))?;
    let materials = root
        .entry("materials")
        .or_insert_with(|| json!([{ "name": "mat0" }]));
    if !materials.as_array().is_some_and(|m| !m.is_empty()) {
        *materials = json!([{ "name": "mat0" }]);
    }
    let material = materials
        .get_mut(0)
        .and_then(Value::as_object_mut)
        .ok_or_else(|| Error::ContainerFormat("material 0 is not an object".into()))?;

    let pbr = material
        .entry("pbrMetallicRoughness")
        .or_insert_with(|| json!({}));
    let pbr = pbr
        .as_object_mut()
        .ok_or_else(|| Error::ContainerFormat("pbrMetallicRoughness is not an object".into()))?;
    pbr.insert("baseColorFactor".into(), json!(base_color_linear));
    pbr.insert("metallicFactor".into(), json!(metallic));
    pbr.insert("roughnessFactor".into(), json!(roughness));
    material.insert("doubleSided".into(), json!(false));

    let new_json = serde_json::to_vec(&gltf)?;
    let new_padded_len = new_json.len() + pad4(new_json.len());
    let rest = data[json_start + chunk0_len..].to_vec();
    let new_total = HEADER_LEN + CHUNK_HEADER_LEN + new_padded_len + rest.len();

    data.clear();
    data.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    data.extend_from_slice(&GLB_VERSION.to_le_bytes());
    data.extend_from_slice(&(new_total as u32).to_le_bytes());
    data.extend_from_slice(&(new_padded_len as u32).to_le_bytes());
    data.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    data.extend_from_slice(&new_json);
    data.resize(data.len() + pad4(new_json.len()), 0x20);
    data.extend_from_slice(&rest);

    debug!(metallic, roughness, "GLB material patched");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::unit_cube;

    fn json_chunk(data: &[u8]) -> Value {
        let len = u32::from_le_bytes(data[12..16].try_into().unwrap()) as usize;
        serde_json::from_slice(trim_chunk_padding(&data[20..20 + len])).unwrap()
    }

    #[test]
    fn test_export_load_roundtrip() {
        let mut cube = unit_cube();
        cube.colors = Some(vec![[200, 100, 50, 255]; cube.positions.len()]);

        let bytes = export_glb(&cube).unwrap();
        let contents = load_glb(&bytes).unwrap();

        assert_eq!(contents.meshes.len(), 1);
        assert!(contents.has_vertex_colors);
        assert!(!contents.has_textures());

        let loaded = &contents.meshes[0];
        assert_eq!(loaded.positions.len(), cube.positions.len());
        assert_eq!(loaded.faces, cube.faces);
        assert_eq!(loaded.colors.as_ref().unwrap()[0], [200, 100, 50, 255]);
    }

    #[test]
    fn test_export_rejects_empty_mesh() {
        assert!(matches!(
            export_glb(&TriMesh::new()),
            Err(Error::EmptyMesh(_))
        ));
    }

    #[test]
    fn test_header_layout() {
        let bytes = export_glb(&unit_cube()).unwrap();
        assert_eq!(&bytes[0..4], b"glTF");
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 2);
        // Declared total length matches the actual byte count
        assert_eq!(
            u32::from_le_bytes(bytes[8..12].try_into().unwrap()) as usize,
            bytes.len()
        );
        // JSON chunk length is 4-byte aligned
        let json_len = u32::from_le_bytes(bytes[12..16].try_into().unwrap());
        assert_eq!(json_len % 4, 0);
    }

    #[test]
    fn test_load_rejects_bad_magic() {
        let mut bytes = export_glb(&unit_cube()).unwrap();
        bytes[0] = b'X';
        assert!(matches!(
            load_glb(&bytes),
            Err(Error::ContainerFormat(_))
        ));
    }

    #[test]
    fn test_patch_material_values() {
        let mut bytes = export_glb(&unit_cube()).unwrap();
        let patched = patch_material(&mut bytes, [1.0, 0.0, 0.0, 1.0], 0.8, 0.2).unwrap();
        assert!(patched);

        let gltf = json_chunk(&bytes);
        let mat = &gltf["materials"][0];
        assert_eq!(mat["doubleSided"], json!(false));
        let pbr = &mat["pbrMetallicRoughness"];
        assert_eq!(pbr["baseColorFactor"], json!([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(pbr["metallicFactor"], json!(0.8));
        assert_eq!(pbr["roughnessFactor"], json!(0.2));
    }

    #[test]
    fn test_patch_preserves_bin_chunk_and_lengths() {
        let mut bytes = export_glb(&unit_cube()).unwrap();

        let json_len = u32::from_le_bytes(bytes[12..16].try_into().unwrap()) as usize;
        let bin_chunk_before = bytes[20 + json_len..].to_vec();

        patch_material(&mut bytes, [0.5, 0.5, 0.5, 1.0], 0.0, 0.5).unwrap();

        let new_json_len = u32::from_le_bytes(bytes[12..16].try_into().unwrap()) as usize;
        assert_eq!(new_json_len % 4, 0);
        assert_eq!(&bytes[20 + new_json_len..], &bin_chunk_before[..]);
        assert_eq!(
            u32::from_le_bytes(bytes[8..12].try_into().unwrap()) as usize,
            bytes.len()
        );
        // Patched container still loads
        assert!(load_glb(&bytes).is_ok());
    }

    #[test]
    fn test_patch_skips_non_glb() {
        let mut junk = b"not a glb at all, definitely".to_vec();
        let before = junk.clone();
        let patched = patch_material(&mut junk, [1.0, 1.0, 1.0, 1.0], 0.0, 0.5).unwrap();
        assert!(!patched);
        assert_eq!(junk, before);
    }

    #[test]
    fn test_patch_creates_missing_material_list() {
        // Hand-assemble a GLB whose JSON has no materials key
        let gltf = json!({ "asset": { "version": "2.0" } });
        let json_bytes = serde_json::to_vec(&gltf).unwrap();
        let mut bytes = assemble(&json_bytes, &[]);

        assert!(patch_material(&mut bytes, [0.0, 1.0, 0.0, 1.0], 0.1, 0.9).unwrap());
        let patched = json_chunk(&bytes);
        assert_eq!(patched["materials"][0]["name"], json!("mat0"));
        assert_eq!(
            patched["materials"][0]["pbrMetallicRoughness"]["metallicFactor"],
            json!(0.1)
        );
    }
}
