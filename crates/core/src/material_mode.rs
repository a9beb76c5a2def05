use std::sync::Arc;

use glam::Mat4;

use crate::color::{hex_to_linear, mean_channel};
use crate::material::{Material, MaterialMode, MaterialTag, ShadingModel};
use crate::model::{MeshNode, Model, ModelNode};
use crate::settings::PaletteColors;

/// Meshes whose world-space bounding box (including any meshes parented
/// under them) exceeds this volume flicker in holo mode.
pub const SIGNIFICANT_VOLUME: f32 = 0.2;

pub const HOLO_OPACITY: f32 = 0.5;
pub const SPIDER_OPACITY: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialPolicy {
    pub colors: PaletteColors,
    /// Derive holo opacity from the brightness of the imported material.
    pub use_color_intensity: bool,
}

pub fn apply_mode(model: &mut Model, mode: MaterialMode, policy: &MaterialPolicy) {
    apply_to_node(&mut model.root, Mat4::IDENTITY, mode, policy);
}

fn apply_to_node(node: &mut ModelNode, parent: Mat4, mode: MaterialMode, policy: &MaterialPolicy) {
    let volume = if mode == MaterialMode::Holo && node.mesh.is_some() {
        node.subtree_bounds(parent).volume()
    } else {
        0.0
    };
    let world = parent * node.transform.matrix();
    if let Some(mesh) = &mut node.mesh {
        apply_to_mesh(mesh, volume, mode, policy);
    }
    for child in &mut node.children {
        apply_to_node(child, world, mode, policy);
    }
}

fn apply_to_mesh(mesh: &mut MeshNode, volume: f32, mode: MaterialMode, policy: &MaterialPolicy) {
    if mode == MaterialMode::Normal {
        if let Some(originals) = &mesh.original_materials {
            mesh.materials = originals.clone();
            mesh.tag = MaterialTag::default();
        }
        return;
    }

    if mesh.original_materials.is_none() {
        mesh.original_materials = Some(
            mesh.materials
                .iter()
                .map(|material| Arc::new(Material::clone(material)))
                .collect(),
        );
    }
    let originals = mesh.original_materials.as_deref().unwrap_or(&[]);

    match mode {
        MaterialMode::Spider => {
            mesh.materials = originals
                .iter()
                .map(|_| Arc::new(spider_material(&policy.colors)))
                .collect();
            mesh.tag = MaterialTag {
                kind: MaterialMode::Spider,
                animate: false,
            };
        }
        MaterialMode::Holo => {
            mesh.materials = originals
                .iter()
                .map(|original| Arc::new(holo_material(original, policy)))
                .collect();
            mesh.tag = MaterialTag {
                kind: MaterialMode::Holo,
                animate: volume > SIGNIFICANT_VOLUME,
            };
        }
        MaterialMode::Normal => {}
    }
}

pub fn holo_material(original: &Material, policy: &MaterialPolicy) -> Material {
    let opacity = if policy.use_color_intensity {
        mean_channel(original.color).clamp(0.3, 0.8)
    } else {
        HOLO_OPACITY
    };
    Material {
        name: "holo".to_string(),
        shading: ShadingModel::Standard {
            roughness: 0.2,
            metalness: 0.8,
        },
        color: hex_to_linear(policy.colors.base),
        emissive: hex_to_linear(policy.colors.emissive),
        opacity,
        transparent: true,
        wireframe: false,
        double_sided: false,
    }
}

pub fn spider_material(colors: &PaletteColors) -> Material {
    Material {
        name: "spider".to_string(),
        shading: ShadingModel::Phong {
            specular: hex_to_linear(colors.specular),
            shininess: 30.0,
            flat_shading: true,
        },
        color: hex_to_linear(colors.base),
        emissive: hex_to_linear(colors.emissive),
        opacity: SPIDER_OPACITY,
        transparent: true,
        wireframe: true,
        double_sided: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_primitives::make_box;
    use crate::model::Transform;
    use crate::settings::Palette;

    fn policy() -> MaterialPolicy {
        MaterialPolicy {
            colors: Palette::NeonGenBlue.colors(),
            use_color_intensity: false,
        }
    }

    fn model_with_boxes(sizes: &[f32]) -> Model {
        let mut root = ModelNode::group("root");
        for (idx, size) in sizes.iter().enumerate() {
            let mut material = Material::new(format!("m{idx}"));
            material.color = [0.9, 0.1, 0.2];
            let mesh = MeshNode::new(Arc::new(make_box([*size; 3])), Arc::new(material));
            root.children.push(ModelNode::with_mesh(format!("box{idx}"), mesh));
        }
        Model::new(root)
    }

    fn materials(model: &Model) -> Vec<Arc<Material>> {
        let mut out = Vec::new();
        model.for_each_mesh(|_, mesh| out.extend(mesh.materials.iter().cloned()));
        out
    }

    #[test]
    fn normal_on_untouched_mesh_keeps_material_instance() {
        let mut model = model_with_boxes(&[1.0]);
        let before = materials(&model);
        apply_mode(&mut model, MaterialMode::Normal, &policy());
        let after = materials(&model);
        assert!(Arc::ptr_eq(&before[0], &after[0]));
        model.for_each_mesh(|_, mesh| assert!(mesh.original_materials.is_none()));
    }

    #[test]
    fn holo_normal_holo_is_repeatable() {
        let mut model = model_with_boxes(&[1.0]);
        apply_mode(&mut model, MaterialMode::Holo, &policy());
        let first = Material::clone(&materials(&model)[0]);
        apply_mode(&mut model, MaterialMode::Normal, &policy());
        apply_mode(&mut model, MaterialMode::Holo, &policy());
        let second = Material::clone(&materials(&model)[0]);
        apply_mode(&mut model, MaterialMode::Normal, &policy());
        apply_mode(&mut model, MaterialMode::Holo, &policy());
        let third = Material::clone(&materials(&model)[0]);
        assert_eq!(first, second);
        assert_eq!(second, third);
        assert_eq!(first.opacity, HOLO_OPACITY);
    }

    #[test]
    fn original_cache_is_filled_once() {
        let mut model = model_with_boxes(&[1.0]);
        apply_mode(&mut model, MaterialMode::Spider, &policy());
        let mut cached = Vec::new();
        model.for_each_mesh(|_, mesh| cached.push(mesh.original_materials.clone().expect("cache")));
        apply_mode(&mut model, MaterialMode::Holo, &policy());
        apply_mode(&mut model, MaterialMode::Spider, &policy());
        model.for_each_mesh(|_, mesh| {
            let now = mesh.original_materials.as_ref().expect("cache");
            assert!(Arc::ptr_eq(&now[0], &cached[0][0]));
        });

        apply_mode(&mut model, MaterialMode::Normal, &policy());
        let restored = materials(&model);
        assert_eq!(restored[0].name, "m0");
        assert_eq!(restored[0].color, [0.9, 0.1, 0.2]);
    }

    #[test]
    fn only_large_meshes_are_animated_in_holo() {
        let mut model = model_with_boxes(&[1.0, 0.5]);
        apply_mode(&mut model, MaterialMode::Holo, &policy());
        let mut tags = Vec::new();
        model.for_each_mesh(|_, mesh| tags.push(mesh.tag));
        assert!(tags[0].animate);
        assert!(!tags[1].animate);
        assert!(tags.iter().all(|tag| tag.kind == MaterialMode::Holo));

        apply_mode(&mut model, MaterialMode::Spider, &policy());
        model.for_each_mesh(|_, mesh| {
            assert_eq!(mesh.tag.kind, MaterialMode::Spider);
            assert!(!mesh.tag.animate);
            assert!(mesh.materials[0].wireframe);
        });
    }

    #[test]
    fn significance_uses_world_scale() {
        let mut model = model_with_boxes(&[0.5]);
        model.root.transform.scale = glam::Vec3::splat(2.0);
        apply_mode(&mut model, MaterialMode::Holo, &policy());
        model.for_each_mesh(|_, mesh| assert!(mesh.tag.animate));
    }

    #[test]
    fn significance_includes_child_meshes() {
        let small = MeshNode::new(
            Arc::new(make_box([0.1; 3])),
            Arc::new(Material::new("hull".to_string())),
        );
        let large = MeshNode::new(
            Arc::new(make_box([1.0; 3])),
            Arc::new(Material::new("wing".to_string())),
        );
        let mut parent = ModelNode::with_mesh("hull", small);
        parent.children.push(
            ModelNode::with_mesh("wing", large)
                .with_transform(Transform::from_translation(glam::Vec3::new(2.0, 0.0, 0.0))),
        );
        let mut root = ModelNode::group("root");
        root.children.push(parent);
        let mut model = Model::new(root);

        apply_mode(&mut model, MaterialMode::Holo, &policy());
        let mut tags = Vec::new();
        model.for_each_mesh(|_, mesh| tags.push(mesh.tag));
        assert!(tags[0].animate);
        assert!(tags[1].animate);
    }

    #[test]
    fn intensity_policy_clamps_mean_color() {
        let original = Material::new("white".to_string());
        let policy = MaterialPolicy {
            use_color_intensity: true,
            ..policy()
        };
        assert_eq!(holo_material(&original, &policy).opacity, 0.8);
        let mut dark = Material::new("dark".to_string());
        dark.color = [0.0, 0.0, 0.0];
        assert_eq!(holo_material(&dark, &policy).opacity, 0.3);
    }
}
