//! glTF 2.0 geometry import.
//!
//! Reads `.gltf` (JSON with external buffers) and `.glb` (binary container).
//! Only geometry is imported: the node hierarchy of the default scene is
//! walked, node transforms are baked in, and every triangle primitive is
//! merged into one [`ModelMesh`]. Materials, textures, skins and animations
//! are ignored.

use crate::AssetError;
use crate::model::ModelMesh;
use crate::source::Fetch;
use glam::{Mat4, Quat, Vec3};
use serde::Deserialize;
use std::collections::BTreeMap;

const GLB_MAGIC: u32 = 0x4654_6c67; // "glTF"
const GLB_CHUNK_JSON: u32 = 0x4e4f_534a;
const GLB_CHUNK_BIN: u32 = 0x004e_4942;

const COMPONENT_U8: u32 = 5121;
const COMPONENT_U16: u32 = 5123;
const COMPONENT_U32: u32 = 5125;
const COMPONENT_F32: u32 = 5126;

const MODE_TRIANGLES: u32 = 4;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Document {
    scene: Option<usize>,
    scenes: Vec<Scene>,
    nodes: Vec<Node>,
    meshes: Vec<MeshDef>,
    accessors: Vec<Accessor>,
    buffer_views: Vec<BufferView>,
    buffers: Vec<Buffer>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Scene {
    nodes: Vec<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Node {
    name: Option<String>,
    children: Vec<usize>,
    mesh: Option<usize>,
    matrix: Option<[f32; 16]>,
    translation: Option<[f32; 3]>,
    rotation: Option<[f32; 4]>,
    scale: Option<[f32; 3]>,
}

impl Node {
    fn local_matrix(&self) -> Mat4 {
        if let Some(m) = self.matrix {
            return Mat4::from_cols_array(&m);
        }
        let t = self.translation.map(Vec3::from).unwrap_or(Vec3::ZERO);
        let r = self.rotation.map(Quat::from_array).unwrap_or(Quat::IDENTITY);
        let s = self.scale.map(Vec3::from).unwrap_or(Vec3::ONE);
        Mat4::from_scale_rotation_translation(s, r, t)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MeshDef {
    name: Option<String>,
    primitives: Vec<Primitive>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Primitive {
    attributes: BTreeMap<String, usize>,
    indices: Option<usize>,
    mode: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Accessor {
    buffer_view: Option<usize>,
    #[serde(default)]
    byte_offset: usize,
    component_type: u32,
    count: usize,
    #[serde(rename = "type")]
    kind: String,
    sparse: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BufferView {
    buffer: usize,
    #[serde(default)]
    byte_offset: usize,
    byte_length: usize,
    byte_stride: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Buffer {
    uri: Option<String>,
    byte_length: usize,
}

/// Parse a `.gltf` or `.glb` payload. External buffers are requested
/// through `fetch`.
pub fn parse_model(name: &str, bytes: &[u8], fetch: &dyn Fetch) -> Result<ModelMesh, AssetError> {
    let (json, bin) = if bytes.len() >= 4 && read_u32(bytes, 0) == Some(GLB_MAGIC) {
        split_glb(bytes)?
    } else {
        (bytes, None)
    };
    let doc: Document =
        serde_json::from_slice(json).map_err(|e| AssetError::GltfParse(e.to_string()))?;

    let buffers = load_buffers(&doc, bin, fetch)?;
    let mut mesh = ModelMesh::new(name);
    let roots = scene_roots(&doc)?;
    for root in roots {
        visit_node(&doc, &buffers, root, Mat4::IDENTITY, &mut mesh, 0)?;
    }

    if mesh.is_empty() {
        return Err(AssetError::GltfParse("model contains no triangles".into()));
    }
    tracing::debug!(
        "parsed glTF '{}': {} vertices, {} triangles",
        name,
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

fn split_glb(bytes: &[u8]) -> Result<(&[u8], Option<&[u8]>), AssetError> {
    let bad = |msg: &str| AssetError::GltfParse(format!("GLB: {msg}"));
    let version = read_u32(bytes, 4).ok_or_else(|| bad("truncated header"))?;
    if version != 2 {
        return Err(bad(&format!("unsupported container version {version}")));
    }
    let total = read_u32(bytes, 8).ok_or_else(|| bad("truncated header"))? as usize;
    let data = bytes.get(..total).ok_or_else(|| bad("length exceeds file"))?;

    let mut json = None;
    let mut bin = None;
    let mut offset = 12;
    while offset + 8 <= data.len() {
        let len = read_u32(data, offset).ok_or_else(|| bad("truncated chunk"))? as usize;
        let kind = read_u32(data, offset + 4).ok_or_else(|| bad("truncated chunk"))?;
        let end = (offset + 8)
            .checked_add(len)
            .ok_or_else(|| bad("chunk exceeds file"))?;
        let body = data
            .get(offset + 8..end)
            .ok_or_else(|| bad("chunk exceeds file"))?;
        match kind {
            GLB_CHUNK_JSON if json.is_none() => json = Some(body),
            GLB_CHUNK_BIN if bin.is_none() => bin = Some(body),
            _ => {}
        }
        offset = end;
    }
    let json = json.ok_or_else(|| bad("missing JSON chunk"))?;
    Ok((json, bin))
}

fn load_buffers(
    doc: &Document,
    bin: Option<&[u8]>,
    fetch: &dyn Fetch,
) -> Result<Vec<Vec<u8>>, AssetError> {
    doc.buffers
        .iter()
        .enumerate()
        .map(|(i, buffer)| {
            let data = match (&buffer.uri, bin) {
                (Some(uri), _) => fetch.fetch(uri)?,
                (None, Some(bin)) if i == 0 => bin.to_vec(),
                (None, _) => {
                    return Err(AssetError::GltfParse(format!(
                        "buffer {i} has no uri and no GLB binary chunk"
                    )));
                }
            };
            if data.len() < buffer.byte_length {
                return Err(AssetError::GltfParse(format!(
                    "buffer {i} is {} bytes, expected {}",
                    data.len(),
                    buffer.byte_length
                )));
            }
            Ok(data)
        })
        .collect()
}

fn scene_roots(doc: &Document) -> Result<Vec<usize>, AssetError> {
    if !doc.scenes.is_empty() {
        let index = doc.scene.unwrap_or(0);
        let scene = doc
            .scenes
            .get(index)
            .ok_or_else(|| AssetError::GltfParse(format!("scene {index} does not exist")))?;
        return Ok(scene.nodes.clone());
    }
    // No scene list: every node that is nobody's child is a root.
    let mut is_child = vec![false; doc.nodes.len()];
    for node in &doc.nodes {
        for &c in &node.children {
            if let Some(flag) = is_child.get_mut(c) {
                *flag = true;
            }
        }
    }
    Ok((0..doc.nodes.len()).filter(|&i| !is_child[i]).collect())
}

fn visit_node(
    doc: &Document,
    buffers: &[Vec<u8>],
    index: usize,
    parent: Mat4,
    out: &mut ModelMesh,
    depth: usize,
) -> Result<(), AssetError> {
    // Deeper than any sane hierarchy means a cycle.
    if depth > 64 {
        return Err(AssetError::GltfParse("node hierarchy too deep".into()));
    }
    let node = doc
        .nodes
        .get(index)
        .ok_or_else(|| AssetError::GltfParse(format!("node {index} does not exist")))?;
    let world = parent * node.local_matrix();

    if let Some(mesh_index) = node.mesh {
        let mesh = doc.meshes.get(mesh_index).ok_or_else(|| {
            AssetError::GltfParse(format!("mesh {mesh_index} does not exist"))
        })?;
        for (p, primitive) in mesh.primitives.iter().enumerate() {
            let mode = primitive.mode.unwrap_or(MODE_TRIANGLES);
            if mode != MODE_TRIANGLES {
                tracing::warn!(
                    "skipping primitive {p} of mesh '{}' (node '{}'): mode {mode} is not triangles",
                    mesh.name.as_deref().unwrap_or("unnamed"),
                    node.name.as_deref().unwrap_or("unnamed"),
                );
                continue;
            }
            append_primitive(doc, buffers, primitive, world, out)?;
        }
    }

    for &child in &node.children {
        visit_node(doc, buffers, child, world, out, depth + 1)?;
    }
    Ok(())
}

fn append_primitive(
    doc: &Document,
    buffers: &[Vec<u8>],
    primitive: &Primitive,
    transform: Mat4,
    out: &mut ModelMesh,
) -> Result<(), AssetError> {
    let position_accessor = *primitive
        .attributes
        .get("POSITION")
        .ok_or_else(|| AssetError::GltfParse("primitive has no POSITION attribute".into()))?;
    let positions = read_vec3(doc, buffers, position_accessor)?;

    let normals = match primitive.attributes.get("NORMAL") {
        Some(&a) => Some(read_vec3(doc, buffers, a)?),
        None => None,
    };

    let indices = match primitive.indices {
        Some(a) => read_indices(doc, buffers, a)?,
        None => (0..positions.len() as u32).collect(),
    };
    if let Some(&bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
        return Err(AssetError::GltfParse(format!(
            "index {bad} out of range for {} vertices",
            positions.len()
        )));
    }

    out.append(transform, &positions, normals.as_deref(), &indices);
    Ok(())
}

fn accessor(doc: &Document, index: usize) -> Result<&Accessor, AssetError> {
    let acc = doc
        .accessors
        .get(index)
        .ok_or_else(|| AssetError::GltfParse(format!("accessor {index} does not exist")))?;
    if acc.sparse.is_some() {
        return Err(AssetError::GltfParse(format!(
            "accessor {index} is sparse, which is not supported"
        )));
    }
    Ok(acc)
}

/// Byte slices for each of `acc.count` elements of `elem_size` bytes.
///
/// Offsets come straight from the file, so all arithmetic is checked and
/// the full extent is validated before anything is allocated.
fn element_bytes<'a>(
    doc: &Document,
    buffers: &'a [Vec<u8>],
    acc: &Accessor,
    elem_size: usize,
) -> Result<Vec<&'a [u8]>, AssetError> {
    let Some(view_index) = acc.buffer_view else {
        // No view: the accessor is all zeros.
        if acc.count > MAX_ZERO_ELEMENTS {
            return Err(AssetError::GltfParse(format!(
                "accessor without buffer view has {} elements",
                acc.count
            )));
        }
        return Ok(vec![&ZEROS[..elem_size]; acc.count]);
    };
    let out_of_range =
        || AssetError::GltfParse(format!("buffer view {view_index} out of range"));
    let view = doc
        .buffer_views
        .get(view_index)
        .ok_or_else(|| AssetError::GltfParse(format!("buffer view {view_index} does not exist")))?;
    let buffer = buffers
        .get(view.buffer)
        .ok_or_else(|| AssetError::GltfParse(format!("buffer {} does not exist", view.buffer)))?;
    let view_end = view
        .byte_offset
        .checked_add(view.byte_length)
        .ok_or_else(out_of_range)?;
    let view_bytes = buffer
        .get(view.byte_offset..view_end)
        .ok_or_else(out_of_range)?;

    let stride = view.byte_stride.unwrap_or(elem_size).max(elem_size);
    if acc.count > 0 {
        let last_end = (acc.count - 1)
            .checked_mul(stride)
            .and_then(|n| n.checked_add(acc.byte_offset))
            .and_then(|n| n.checked_add(elem_size));
        if !matches!(last_end, Some(end) if end <= view_bytes.len()) {
            return Err(AssetError::GltfParse(format!(
                "accessor with {} elements exceeds buffer view {view_index}",
                acc.count
            )));
        }
    }
    Ok((0..acc.count)
        .map(|i| {
            let start = acc.byte_offset + i * stride;
            &view_bytes[start..start + elem_size]
        })
        .collect())
}

/// Largest zero-filled accessor accepted.
const MAX_ZERO_ELEMENTS: usize = 1 << 24;

static ZEROS: [u8; 16] = [0; 16];

fn read_vec3(doc: &Document, buffers: &[Vec<u8>], index: usize) -> Result<Vec<Vec3>, AssetError> {
    let acc = accessor(doc, index)?;
    if acc.component_type != COMPONENT_F32 || acc.kind != "VEC3" {
        return Err(AssetError::GltfParse(format!(
            "accessor {index} must be float VEC3, got {} {}",
            acc.component_type, acc.kind
        )));
    }
    let elements = element_bytes(doc, buffers, acc, 12)?;
    Ok(elements
        .iter()
        .map(|b| {
            let f = |o: usize| f32::from_le_bytes([b[o], b[o + 1], b[o + 2], b[o + 3]]);
            Vec3::new(f(0), f(4), f(8))
        })
        .collect())
}

fn read_indices(doc: &Document, buffers: &[Vec<u8>], index: usize) -> Result<Vec<u32>, AssetError> {
    let acc = accessor(doc, index)?;
    if acc.kind != "SCALAR" {
        return Err(AssetError::GltfParse(format!(
            "index accessor {index} must be SCALAR, got {}",
            acc.kind
        )));
    }
    let size = match acc.component_type {
        COMPONENT_U8 => 1,
        COMPONENT_U16 => 2,
        COMPONENT_U32 => 4,
        other => {
            return Err(AssetError::GltfParse(format!(
                "index accessor {index} has component type {other}"
            )));
        }
    };
    let elements = element_bytes(doc, buffers, acc, size)?;
    Ok(elements
        .iter()
        .map(|b| match size {
            1 => b[0] as u32,
            2 => u16::from_le_bytes([b[0], b[1]]) as u32,
            _ => u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
        })
        .collect())
}

fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let b = bytes.get(offset..offset + 4)?;
    Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    /// In-memory resource map standing in for files or HTTP.
    #[derive(Default)]
    pub(crate) struct MemoryFetch(pub HashMap<String, Vec<u8>>);

    impl Fetch for MemoryFetch {
        fn fetch(&self, uri: &str) -> Result<Vec<u8>, AssetError> {
            self.0
                .get(uri)
                .cloned()
                .ok_or_else(|| AssetError::NotFound(uri.to_string()))
        }
    }

    /// One triangle: three float positions followed by three u16 indices.
    pub(crate) fn triangle_bin() -> Vec<u8> {
        let mut bin = Vec::new();
        for v in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
            for c in v {
                bin.extend_from_slice(&c.to_le_bytes());
            }
        }
        for i in [0u16, 1, 2] {
            bin.extend_from_slice(&i.to_le_bytes());
        }
        bin.extend_from_slice(&[0, 0]); // pad to 4
        bin
    }

    pub(crate) fn triangle_json(uri: Option<&str>, node_extra: &str) -> String {
        let uri = uri.map(|u| format!(r#""uri": "{u}","#)).unwrap_or_default();
        format!(
            r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [ {{ "nodes": [0] }} ],
  "nodes": [ {{ "mesh": 0 {node_extra} }} ],
  "meshes": [ {{ "primitives": [ {{ "attributes": {{ "POSITION": 0 }}, "indices": 1 }} ] }} ],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3" }},
    {{ "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }}
  ],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 6 }}
  ],
  "buffers": [ {{ {uri} "byteLength": 44 }} ]
}}"#
        )
    }

    pub(crate) fn glb(json: &str, bin: &[u8]) -> Vec<u8> {
        let mut json = json.as_bytes().to_vec();
        while json.len() % 4 != 0 {
            json.push(b' ');
        }
        let total = 12 + 8 + json.len() + 8 + bin.len();
        let mut out = Vec::new();
        out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&(total as u32).to_le_bytes());
        out.extend_from_slice(&(json.len() as u32).to_le_bytes());
        out.extend_from_slice(&GLB_CHUNK_JSON.to_le_bytes());
        out.extend_from_slice(&json);
        out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        out.extend_from_slice(&GLB_CHUNK_BIN.to_le_bytes());
        out.extend_from_slice(bin);
        out
    }

    fn fetch_with_bin() -> MemoryFetch {
        let mut files = HashMap::new();
        files.insert("tri.bin".to_string(), triangle_bin());
        MemoryFetch(files)
    }

    #[test]
    fn parses_gltf_with_external_buffer() {
        let json = triangle_json(Some("tri.bin"), "");
        let mesh = parse_model("tri", json.as_bytes(), &fetch_with_bin()).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.positions[1], Vec3::X);
        // no NORMAL attribute: computed from the face
        assert!((mesh.normals[0] - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn bakes_node_translation_and_scale() {
        let json = triangle_json(
            Some("tri.bin"),
            r#", "translation": [0, 10, 0], "scale": [2, 2, 2]"#,
        );
        let mesh = parse_model("tri", json.as_bytes(), &fetch_with_bin()).unwrap();
        assert_eq!(mesh.positions[0], Vec3::new(0.0, 10.0, 0.0));
        assert_eq!(mesh.positions[2], Vec3::new(0.0, 12.0, 0.0));
    }

    #[test]
    fn bakes_node_matrix() {
        let json = triangle_json(
            Some("tri.bin"),
            r#", "matrix": [1,0,0,0, 0,1,0,0, 0,0,1,0, 5,0,0,1]"#,
        );
        let mesh = parse_model("tri", json.as_bytes(), &fetch_with_bin()).unwrap();
        assert_eq!(mesh.positions[1], Vec3::new(6.0, 0.0, 0.0));
    }

    #[test]
    fn parses_glb_with_embedded_buffer() {
        let bytes = glb(&triangle_json(None, ""), &triangle_bin());
        let mesh = parse_model("tri", &bytes, &MemoryFetch::default()).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn glb_rejects_wrong_version() {
        let mut bytes = glb(&triangle_json(None, ""), &triangle_bin());
        bytes[4] = 1;
        assert!(matches!(
            parse_model("tri", &bytes, &MemoryFetch::default()),
            Err(AssetError::GltfParse(_))
        ));
    }

    #[test]
    fn missing_buffer_file_is_not_found() {
        let json = triangle_json(Some("tri.bin"), "");
        assert!(matches!(
            parse_model("tri", json.as_bytes(), &MemoryFetch::default()),
            Err(AssetError::NotFound(_))
        ));
    }

    #[test]
    fn short_buffer_is_rejected() {
        let mut files = HashMap::new();
        files.insert("tri.bin".to_string(), vec![0u8; 10]);
        let json = triangle_json(Some("tri.bin"), "");
        assert!(matches!(
            parse_model("tri", json.as_bytes(), &MemoryFetch(files)),
            Err(AssetError::GltfParse(_))
        ));
    }

    #[test]
    fn overflowing_accessor_offset_is_rejected() {
        let json = triangle_json(Some("tri.bin"), "").replace(
            r#""bufferView": 0, "componentType""#,
            r#""bufferView": 0, "byteOffset": 18446744073709551615, "componentType""#,
        );
        assert!(matches!(
            parse_model("tri", json.as_bytes(), &fetch_with_bin()),
            Err(AssetError::GltfParse(_))
        ));
    }

    #[test]
    fn overflowing_view_offset_is_rejected() {
        let json = triangle_json(Some("tri.bin"), "").replace(
            r#""byteOffset": 36, "byteLength": 6"#,
            r#""byteOffset": 18446744073709551615, "byteLength": 6"#,
        );
        assert!(matches!(
            parse_model("tri", json.as_bytes(), &fetch_with_bin()),
            Err(AssetError::GltfParse(_))
        ));
    }

    #[test]
    fn count_larger_than_view_is_rejected() {
        let json = triangle_json(Some("tri.bin"), "").replace(
            r#""componentType": 5126, "count": 3"#,
            r#""componentType": 5126, "count": 4611686018427387904"#,
        );
        assert!(matches!(
            parse_model("tri", json.as_bytes(), &fetch_with_bin()),
            Err(AssetError::GltfParse(_))
        ));
    }

    #[test]
    fn huge_zero_filled_accessor_is_rejected() {
        let json = triangle_json(Some("tri.bin"), "").replace(
            r#""bufferView": 0, "componentType": 5126, "count": 3"#,
            r#""componentType": 5126, "count": 18446744073709551615"#,
        );
        assert!(matches!(
            parse_model("tri", json.as_bytes(), &fetch_with_bin()),
            Err(AssetError::GltfParse(_))
        ));
    }

    /// Three float positions laid out with `stride` bytes per vertex,
    /// followed by `indices` as raw bytes.
    fn strided_triangle(stride: usize, indices: &[u8]) -> Vec<u8> {
        let mut bin = Vec::new();
        for v in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
            for c in v {
                bin.extend_from_slice(&c.to_le_bytes());
            }
            bin.resize(bin.len() + stride - 12, 0xAB);
        }
        bin.extend_from_slice(indices);
        while bin.len() % 4 != 0 {
            bin.push(0);
        }
        bin
    }

    fn strided_json(stride: usize, index_component: u32, index_bytes: usize, total: usize) -> String {
        let positions = 3 * stride;
        format!(
            r#"{{
  "asset": {{ "version": "2.0" }},
  "nodes": [ {{ "mesh": 0 }} ],
  "meshes": [ {{ "primitives": [ {{ "attributes": {{ "POSITION": 0 }}, "indices": 1 }} ] }} ],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3" }},
    {{ "bufferView": 1, "componentType": {index_component}, "count": 3, "type": "SCALAR" }}
  ],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": {positions}, "byteStride": {stride} }},
    {{ "buffer": 0, "byteOffset": {positions}, "byteLength": {index_bytes} }}
  ],
  "buffers": [ {{ "byteLength": {total} }} ]
}}"#
        )
    }

    #[test]
    fn u8_indices_are_read() {
        let bin = strided_triangle(12, &[2, 1, 0]);
        let json = strided_json(12, COMPONENT_U8, 3, bin.len());
        let mesh = parse_model("tri", &glb(&json, &bin), &MemoryFetch::default()).unwrap();
        assert_eq!(mesh.indices, vec![2, 1, 0]);
    }

    #[test]
    fn u32_indices_are_read() {
        let mut indices = Vec::new();
        for i in [1u32, 2, 0] {
            indices.extend_from_slice(&i.to_le_bytes());
        }
        let bin = strided_triangle(12, &indices);
        let json = strided_json(12, COMPONENT_U32, 12, bin.len());
        let mesh = parse_model("tri", &glb(&json, &bin), &MemoryFetch::default()).unwrap();
        assert_eq!(mesh.indices, vec![1, 2, 0]);
    }

    #[test]
    fn byte_stride_skips_interleaved_data() {
        let mut indices = Vec::new();
        for i in [0u16, 1, 2] {
            indices.extend_from_slice(&i.to_le_bytes());
        }
        let bin = strided_triangle(16, &indices);
        let json = strided_json(16, COMPONENT_U16, 6, bin.len());
        let mesh = parse_model("tri", &glb(&json, &bin), &MemoryFetch::default()).unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.positions.len(), 3);
        assert!((mesh.positions[1] - Vec3::X).length() < 1e-6);
        assert!((mesh.positions[2] - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn non_indexed_primitive_uses_vertex_order() {
        let json = triangle_json(Some("tri.bin"), "").replace(r#", "indices": 1"#, "");
        let mesh = parse_model("tri", json.as_bytes(), &fetch_with_bin()).unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn children_inherit_parent_transform() {
        let json = r#"{
  "nodes": [
    { "translation": [0, 100, 0], "children": [1] },
    { "mesh": 0, "translation": [1, 0, 0] }
  ],
  "meshes": [ { "primitives": [ { "attributes": { "POSITION": 0 } } ] } ],
  "accessors": [ { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3" } ],
  "bufferViews": [ { "buffer": 0, "byteLength": 36 } ],
  "buffers": [ { "uri": "tri.bin", "byteLength": 36 } ]
}"#;
        let mesh = parse_model("tree", json.as_bytes(), &fetch_with_bin()).unwrap();
        assert_eq!(mesh.positions[0], Vec3::new(1.0, 100.0, 0.0));
    }

    #[test]
    fn model_without_triangles_is_an_error() {
        let json = r#"{ "asset": { "version": "2.0" } }"#;
        assert!(parse_model("empty", json.as_bytes(), &MemoryFetch::default()).is_err());
    }
}
