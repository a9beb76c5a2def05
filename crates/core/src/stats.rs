use std::collections::HashSet;
use std::sync::Arc;

use crate::model::Model;

pub const PLACEHOLDER: &str = "--";

/// Figures for the stats panel, taken once right after a load.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelStats {
    pub file_name: String,
    pub meshes: usize,
    pub vertices: usize,
    pub triangles: usize,
    pub materials: usize,
    /// Width, height and depth of the world bounds, rounded to 2 decimals.
    pub dimensions: [f32; 3],
}

pub fn compute_stats(model: &Model, file_name: &str) -> ModelStats {
    let mut meshes = 0usize;
    let mut vertices = 0usize;
    let mut triangles = 0.0f64;
    let mut materials: HashSet<*const crate::material::Material> = HashSet::new();

    model.for_each_mesh(|_, mesh| {
        meshes += 1;
        let count = mesh.geometry.vertex_count();
        vertices += count;
        triangles += match &mesh.geometry.indices {
            Some(indices) => indices.len() as f64 / 3.0,
            None => count as f64 / 3.0,
        };
        for material in &mesh.materials {
            materials.insert(Arc::as_ptr(material));
        }
    });

    let size = model.world_bounds().size();
    ModelStats {
        file_name: file_name.to_string(),
        meshes,
        vertices,
        triangles: triangles.trunc() as usize,
        materials: materials.len(),
        dimensions: [round2(size.x), round2(size.y), round2(size.z)],
    }
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// Display strings for the stats panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsFields {
    pub file_name: String,
    pub meshes: String,
    pub vertices: String,
    pub materials: String,
    pub triangles: String,
    pub dimensions: String,
}

impl StatsFields {
    pub fn from_stats(stats: Option<&ModelStats>) -> Self {
        let Some(stats) = stats else {
            return Self {
                file_name: PLACEHOLDER.to_string(),
                meshes: PLACEHOLDER.to_string(),
                vertices: PLACEHOLDER.to_string(),
                materials: PLACEHOLDER.to_string(),
                triangles: PLACEHOLDER.to_string(),
                dimensions: PLACEHOLDER.to_string(),
            };
        };
        let [w, h, d] = stats.dimensions;
        Self {
            file_name: stats.file_name.clone(),
            meshes: stats.meshes.to_string(),
            vertices: group_thousands(stats.vertices),
            materials: stats.materials.to_string(),
            triangles: group_thousands(stats.triangles),
            dimensions: format!("{}×{}×{}", trim_decimal(w), trim_decimal(h), trim_decimal(d)),
        }
    }
}

pub fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn trim_decimal(value: f32) -> String {
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use crate::mesh_primitives::make_box;
    use crate::model::{MeshNode, ModelNode};
    use holoview_scene::MeshGeometry;

    fn model_of(meshes: Vec<MeshNode>) -> Model {
        let mut root = ModelNode::group("root");
        for (idx, mesh) in meshes.into_iter().enumerate() {
            root.children.push(ModelNode::with_mesh(format!("mesh{idx}"), mesh));
        }
        Model::new(root)
    }

    fn material(name: &str) -> Arc<Material> {
        Arc::new(Material::new(name.to_string()))
    }

    #[test]
    fn triangles_come_from_indices_or_positions() {
        let indexed = MeshGeometry::new(vec![[0.0; 3]; 3], vec![[0.0, 1.0, 0.0]; 3], Some(vec![0; 300]));
        let soup = MeshGeometry::new(vec![[0.0; 3]; 300], vec![[0.0, 1.0, 0.0]; 300], None);

        let stats = compute_stats(&model_of(vec![MeshNode::new(Arc::new(indexed), material("a"))]), "a");
        assert_eq!(stats.triangles, 100);
        let stats = compute_stats(&model_of(vec![MeshNode::new(Arc::new(soup), material("b"))]), "b");
        assert_eq!(stats.triangles, 100);
        assert_eq!(stats.vertices, 300);
    }

    #[test]
    fn fractional_triangles_truncate_after_summing() {
        let a = MeshGeometry::new(vec![[0.0; 3]; 4], Vec::new(), None);
        let b = MeshGeometry::new(vec![[0.0; 3]; 5], Vec::new(), None);
        let stats = compute_stats(
            &model_of(vec![
                MeshNode::new(Arc::new(a), material("a")),
                MeshNode::new(Arc::new(b), material("b")),
            ]),
            "frac",
        );
        assert_eq!(stats.triangles, 3);
    }

    #[test]
    fn material_count_follows_instance_identity() {
        let shared = material("shared");
        let geometry = Arc::new(make_box([1.0, 1.0, 1.0]));
        let stats = compute_stats(
            &model_of(vec![
                MeshNode::new(geometry.clone(), shared.clone()),
                MeshNode::new(geometry.clone(), shared),
            ]),
            "shared",
        );
        assert_eq!(stats.materials, 1);

        let stats = compute_stats(
            &model_of(vec![
                MeshNode::new(geometry.clone(), material("same")),
                MeshNode::new(geometry, material("same")),
            ]),
            "separate",
        );
        assert_eq!(stats.materials, 2);
        assert_eq!(stats.meshes, 2);
    }

    #[test]
    fn dimensions_round_to_two_decimals() {
        let geometry = Arc::new(make_box([1.234, 2.0, 0.5]));
        let stats = compute_stats(&model_of(vec![MeshNode::new(geometry, material("m"))]), "box");
        assert_eq!(stats.dimensions, [1.23, 2.0, 0.5]);
        let fields = StatsFields::from_stats(Some(&stats));
        assert_eq!(fields.dimensions, "1.23×2×0.5");
        assert_eq!(fields.file_name, "box");
    }

    #[test]
    fn missing_stats_render_placeholders() {
        let fields = StatsFields::from_stats(None);
        assert_eq!(fields.file_name, PLACEHOLDER);
        assert_eq!(fields.meshes, PLACEHOLDER);
        assert_eq!(fields.vertices, PLACEHOLDER);
        assert_eq!(fields.materials, PLACEHOLDER);
        assert_eq!(fields.triangles, PLACEHOLDER);
        assert_eq!(fields.dimensions, PLACEHOLDER);
    }

    #[test]
    fn thousands_are_grouped() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }
}
