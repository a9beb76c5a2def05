//! In-memory GLB builder for unit tests.

use crate::mesh_primitives::make_box;

pub(crate) struct FixtureMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub indices: Option<Vec<u32>>,
    pub material: Option<usize>,
}

impl FixtureMesh {
    pub fn indexed_box(size: f32, material: Option<usize>) -> Self {
        let geometry = make_box([size, size, size]);
        Self {
            positions: geometry.positions,
            normals: Some(geometry.normals),
            indices: geometry.indices,
            material,
        }
    }

    /// Two loose triangles with no index buffer and no normals.
    pub fn triangle_soup(material: Option<usize>) -> Self {
        Self {
            positions: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            normals: None,
            indices: None,
            material,
        }
    }
}

pub(crate) struct FixtureNode {
    pub mesh: usize,
    pub translation: Option<[f32; 3]>,
}

impl FixtureNode {
    pub fn mesh(mesh: usize) -> Self {
        Self {
            mesh,
            translation: None,
        }
    }

    pub fn translated(mut self, translation: [f32; 3]) -> Self {
        self.translation = Some(translation);
        self
    }
}

/// Builds a binary glTF with one root node per `nodes` entry. `meshes[i]`
/// lists the primitives of mesh `i`.
pub(crate) fn glb(nodes: &[FixtureNode], meshes: &[Vec<FixtureMesh>], material_count: usize) -> Vec<u8> {
    let mut buffer = Vec::new();
    let mut buffer_views = Vec::new();
    let mut accessors = Vec::new();

    let mut mesh_json = Vec::new();
    for primitives in meshes {
        let mut primitive_json = Vec::new();
        for mesh in primitives {
            let mut attributes = serde_json::Map::new();
            let pos_view = push_vec3(&mut buffer, &mut buffer_views, &mesh.positions);
            let (min, max) = min_max_vec3(&mesh.positions);
            let pos_accessor = push_accessor(
                &mut accessors,
                pos_view,
                5126,
                mesh.positions.len(),
                "VEC3",
                Some((min, max)),
            );
            attributes.insert("POSITION".to_string(), serde_json::json!(pos_accessor));
            if let Some(normals) = &mesh.normals {
                let view = push_vec3(&mut buffer, &mut buffer_views, normals);
                let accessor = push_accessor(&mut accessors, view, 5126, normals.len(), "VEC3", None);
                attributes.insert("NORMAL".to_string(), serde_json::json!(accessor));
            }

            let mut primitive = serde_json::Map::new();
            primitive.insert("attributes".to_string(), serde_json::Value::Object(attributes));
            primitive.insert("mode".to_string(), serde_json::json!(4));
            if let Some(indices) = &mesh.indices {
                let mut bytes = Vec::with_capacity(indices.len() * 4);
                for index in indices {
                    bytes.extend_from_slice(&index.to_le_bytes());
                }
                let view = push_bytes(&mut buffer, &mut buffer_views, &bytes, 34963);
                let accessor = push_accessor(&mut accessors, view, 5125, indices.len(), "SCALAR", None);
                primitive.insert("indices".to_string(), serde_json::json!(accessor));
            }
            if let Some(material) = mesh.material {
                primitive.insert("material".to_string(), serde_json::json!(material));
            }
            primitive_json.push(serde_json::Value::Object(primitive));
        }
        mesh_json.push(serde_json::json!({ "primitives": primitive_json }));
    }

    let node_json: Vec<serde_json::Value> = nodes
        .iter()
        .map(|node| match node.translation {
            Some(translation) => serde_json::json!({ "mesh": node.mesh, "translation": translation }),
            None => serde_json::json!({ "mesh": node.mesh }),
        })
        .collect();
    let materials: Vec<serde_json::Value> = (0..material_count)
        .map(|idx| {
            serde_json::json!({
                "name": format!("mat_{idx}"),
                "pbrMetallicRoughness": {
                    "baseColorFactor": [0.5, 0.25, 0.75, 1.0],
                    "metallicFactor": 0.0,
                    "roughnessFactor": 0.5
                }
            })
        })
        .collect();

    let mut gltf = serde_json::json!({
        "asset": { "version": "2.0", "generator": "holoview tests" },
        "scenes": [{ "nodes": (0..nodes.len()).collect::<Vec<_>>() }],
        "scene": 0,
        "nodes": node_json,
        "meshes": mesh_json,
        "buffers": [{ "byteLength": buffer.len() }],
        "bufferViews": buffer_views,
        "accessors": accessors
    });
    if material_count > 0 {
        gltf["materials"] = serde_json::Value::Array(materials);
    }

    let json_bytes = serde_json::to_vec(&gltf).expect("fixture json");
    let glb = gltf::binary::Glb {
        header: gltf::binary::Header {
            magic: *b"glTF",
            version: 2,
            length: 0,
        },
        json: std::borrow::Cow::Owned(json_bytes),
        bin: Some(std::borrow::Cow::Owned(buffer)),
    };
    glb.to_vec().expect("fixture glb")
}

fn push_vec3(
    buffer: &mut Vec<u8>,
    buffer_views: &mut Vec<serde_json::Value>,
    data: &[[f32; 3]],
) -> usize {
    let mut bytes = Vec::with_capacity(data.len() * 12);
    for value in data.iter().flatten() {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    push_bytes(buffer, buffer_views, &bytes, 34962)
}

fn push_bytes(
    buffer: &mut Vec<u8>,
    buffer_views: &mut Vec<serde_json::Value>,
    data: &[u8],
    target: u32,
) -> usize {
    let padding = (4 - (buffer.len() % 4)) % 4;
    buffer.extend(std::iter::repeat_n(0u8, padding));
    let offset = buffer.len();
    buffer.extend_from_slice(data);
    buffer_views.push(serde_json::json!({
        "buffer": 0,
        "byteOffset": offset,
        "byteLength": data.len(),
        "target": target
    }));
    buffer_views.len() - 1
}

fn push_accessor(
    accessors: &mut Vec<serde_json::Value>,
    view: usize,
    component_type: u32,
    count: usize,
    ty: &str,
    min_max: Option<(Vec<f32>, Vec<f32>)>,
) -> usize {
    let mut obj = serde_json::Map::new();
    obj.insert("bufferView".to_string(), serde_json::json!(view));
    obj.insert("componentType".to_string(), serde_json::json!(component_type));
    obj.insert("count".to_string(), serde_json::json!(count));
    obj.insert("type".to_string(), serde_json::json!(ty));
    if let Some((min, max)) = min_max {
        obj.insert("min".to_string(), serde_json::json!(min));
        obj.insert("max".to_string(), serde_json::json!(max));
    }
    accessors.push(serde_json::Value::Object(obj));
    accessors.len() - 1
}

fn min_max_vec3(data: &[[f32; 3]]) -> (Vec<f32>, Vec<f32>) {
    let mut min = [f32::INFINITY; 3];
    let mut max = [f32::NEG_INFINITY; 3];
    for value in data {
        for i in 0..3 {
            min[i] = min[i].min(value[i]);
            max[i] = max[i].max(value[i]);
        }
    }
    (min.to_vec(), max.to_vec())
}

/// A single unit box node, 1x1x1 centered on the origin.
pub(crate) fn unit_box_glb() -> Vec<u8> {
    glb(
        &[FixtureNode::mesh(0)],
        &[vec![FixtureMesh::indexed_box(1.0, Some(0))]],
        1,
    )
}
