use std::collections::HashMap;
use std::sync::Arc;

use glam::{Quat, Vec3};
use holoview_scene::MeshGeometry;

use crate::error::LoadError;
use crate::material::{Material, ShadingModel};
use crate::model::{MeshNode, Model, ModelNode, Transform};

/// Parses a `.glb` or self-contained `.gltf` payload into a model tree.
pub fn load_model_bytes(data: &[u8]) -> Result<Model, LoadError> {
    let (document, buffers, _) =
        gltf::import_slice(data).map_err(|err| LoadError::Parse(err.to_string()))?;
    build_model(&document, &buffers)
}

struct MaterialCache {
    materials: HashMap<Option<usize>, Arc<Material>>,
}

impl MaterialCache {
    fn new() -> Self {
        Self {
            materials: HashMap::new(),
        }
    }

    /// One instance per glTF material index, shared by every primitive that
    /// references it.
    fn get(&mut self, material: gltf::Material<'_>) -> Arc<Material> {
        self.materials
            .entry(material.index())
            .or_insert_with(|| Arc::new(convert_material(&material)))
            .clone()
    }
}

fn convert_material(material: &gltf::Material<'_>) -> Material {
    let name = material
        .name()
        .map(|name| name.to_string())
        .unwrap_or_else(|| match material.index() {
            Some(index) => format!("material_{index}"),
            None => "material_default".to_string(),
        });
    let pbr = material.pbr_metallic_roughness();
    let base = pbr.base_color_factor();
    let mut out = Material::new(name);
    out.shading = ShadingModel::Standard {
        roughness: pbr.roughness_factor(),
        metalness: pbr.metallic_factor(),
    };
    out.color = [base[0], base[1], base[2]];
    out.emissive = material.emissive_factor();
    if material.alpha_mode() == gltf::material::AlphaMode::Blend {
        out.transparent = true;
        out.opacity = base[3];
    }
    out.double_sided = material.double_sided();
    out
}

fn build_model(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> Result<Model, LoadError> {
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(LoadError::Empty)?;
    let mut materials = MaterialCache::new();
    let mut root = ModelNode::group(scene.name().unwrap_or("Scene"));
    for node in scene.nodes() {
        root.children.push(build_node(&node, buffers, &mut materials)?);
    }

    let model = Model::new(root);
    if model.mesh_count() == 0 {
        return Err(LoadError::Empty);
    }
    Ok(model)
}

fn build_node(
    node: &gltf::Node<'_>,
    buffers: &[gltf::buffer::Data],
    materials: &mut MaterialCache,
) -> Result<ModelNode, LoadError> {
    let (translation, rotation, scale) = node.transform().decomposed();
    let transform = Transform {
        translation: Vec3::from(translation),
        rotation: Quat::from_array(rotation),
        scale: Vec3::from(scale),
    };
    let name = node.name().unwrap_or_default().to_string();
    let mut out = ModelNode::group(name.clone()).with_transform(transform);

    if let Some(mesh) = node.mesh() {
        let mut primitives = Vec::new();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                tracing::debug!("skipping non-triangle primitive in mesh {:?}", mesh.name());
                continue;
            }
            if let Some(mesh_node) = build_primitive(&primitive, buffers, materials)? {
                primitives.push(mesh_node);
            }
        }
        if primitives.len() == 1 {
            out.mesh = primitives.pop();
        } else {
            out.children.extend(
                primitives
                    .into_iter()
                    .enumerate()
                    .map(|(idx, mesh_node)| ModelNode::with_mesh(format!("{name}_{idx}"), mesh_node)),
            );
        }
    }

    for child in node.children() {
        out.children.push(build_node(&child, buffers, materials)?);
    }
    Ok(out)
}

fn build_primitive(
    primitive: &gltf::Primitive<'_>,
    buffers: &[gltf::buffer::Data],
    materials: &mut MaterialCache,
) -> Result<Option<MeshNode>, LoadError> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));
    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .ok_or_else(|| LoadError::Parse("glTF primitive missing POSITION attribute".to_string()))?
        .collect();
    if positions.is_empty() {
        return Ok(None);
    }
    let indices: Option<Vec<u32>> = reader.read_indices().map(|iter| iter.into_u32().collect());
    let normals = match reader.read_normals() {
        Some(iter) => {
            let normals: Vec<[f32; 3]> = iter.collect();
            if normals.len() == positions.len() {
                normals
            } else {
                compute_normals(&positions, indices.as_deref())
            }
        }
        None => compute_normals(&positions, indices.as_deref()),
    };

    let geometry = Arc::new(MeshGeometry::new(positions, normals, indices));
    let material = materials.get(primitive.material());
    Ok(Some(MeshNode::new(geometry, material)))
}

/// Area-weighted vertex normals; non-indexed input gets one normal per face.
pub fn compute_normals(positions: &[[f32; 3]], indices: Option<&[u32]>) -> Vec<[f32; 3]> {
    let mut accum = vec![Vec3::ZERO; positions.len()];
    let owned;
    let indices = match indices {
        Some(indices) => indices,
        None => {
            owned = (0..positions.len() as u32).collect::<Vec<_>>();
            &owned
        }
    };
    for tri in indices.chunks_exact(3) {
        let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if i0 >= positions.len() || i1 >= positions.len() || i2 >= positions.len() {
            continue;
        }
        let p0 = Vec3::from(positions[i0]);
        let p1 = Vec3::from(positions[i1]);
        let p2 = Vec3::from(positions[i2]);
        let normal = (p1 - p0).cross(p2 - p0);
        accum[i0] += normal;
        accum[i1] += normal;
        accum[i2] += normal;
    }
    accum
        .into_iter()
        .map(|n| {
            let n = n.normalize_or_zero();
            if n == Vec3::ZERO {
                [0.0, 1.0, 0.0]
            } else {
                n.to_array()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{glb, FixtureMesh, FixtureNode};

    #[test]
    fn primitives_sharing_a_material_share_an_instance() {
        let data = glb(
            &[FixtureNode::mesh(0), FixtureNode::mesh(1).translated([2.0, 0.0, 0.0])],
            &[
                vec![
                    FixtureMesh::indexed_box(1.0, Some(0)),
                    FixtureMesh::indexed_box(0.5, Some(0)),
                ],
                vec![FixtureMesh::triangle_soup(Some(1))],
            ],
            2,
        );
        let model = load_model_bytes(&data).expect("model");
        assert_eq!(model.mesh_count(), 3);

        let mut materials = Vec::new();
        model.for_each_mesh(|_, mesh| materials.push(mesh.materials[0].clone()));
        assert!(Arc::ptr_eq(&materials[0], &materials[1]));
        assert!(!Arc::ptr_eq(&materials[0], &materials[2]));
    }

    #[test]
    fn non_indexed_primitives_stay_non_indexed() {
        let data = glb(
            &[FixtureNode::mesh(0)],
            &[vec![FixtureMesh::triangle_soup(None)]],
            0,
        );
        let model = load_model_bytes(&data).expect("model");
        let mut indexed = Vec::new();
        model.for_each_mesh(|_, mesh| {
            indexed.push(mesh.geometry.indices.is_some());
            assert_eq!(mesh.geometry.normals.len(), mesh.geometry.positions.len());
        });
        assert_eq!(indexed, vec![false]);
    }

    #[test]
    fn node_translation_is_kept() {
        let data = glb(
            &[FixtureNode::mesh(0).translated([0.0, 3.0, 0.0])],
            &[vec![FixtureMesh::indexed_box(1.0, None)]],
            0,
        );
        let model = load_model_bytes(&data).expect("model");
        let bounds = model.world_bounds();
        assert!((bounds.min.y - 2.5).abs() < 1.0e-5);
    }

    #[test]
    fn garbage_bytes_fail_to_parse() {
        let err = load_model_bytes(b"definitely not gltf").expect_err("parse error");
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn computed_normals_face_outward_for_ccw_triangle() {
        let normals = compute_normals(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            None,
        );
        assert_eq!(normals, vec![[0.0, 0.0, 1.0]; 3]);
    }
}
