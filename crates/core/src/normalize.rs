use glam::{Quat, Vec3};

use crate::model::Model;

/// Longest side of a normalized model, before the final yaw.
pub const TARGET_EXTENT: f32 = 3.5 * 0.8;

const DEGENERATE_EPSILON: f32 = 1.0e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub scale: f32,
    /// World-space size right after scaling and recentering.
    pub scaled_size: Vec3,
    pub degenerate: bool,
}

/// Scales the model so its longest side is [`TARGET_EXTENT`], centers it on
/// the XZ origin, rests it on y = 0 and applies the initial yaw.
pub fn normalize_model(model: &mut Model, orientation: f32) -> Normalization {
    let bounds = model.world_bounds();
    let size = bounds.size();
    let max_dim = size.max_element();
    let degenerate = !(max_dim > DEGENERATE_EPSILON) || !max_dim.is_finite();
    let scale = if degenerate {
        tracing::warn!(
            "model bounds are degenerate ({:.3}x{:.3}x{:.3}); keeping unit scale",
            size.x,
            size.y,
            size.z
        );
        1.0
    } else {
        TARGET_EXTENT / max_dim
    };

    let center = bounds.center();
    let root = &mut model.root.transform;
    root.scale *= Vec3::splat(scale);
    root.translation -= center * scale;

    let scaled = model.world_bounds();
    if !scaled.is_empty() {
        model.root.transform.translation.y -= scaled.min.y;
    }
    model.root.transform.rotation = Quat::from_rotation_y(orientation);

    Normalization {
        scale,
        scaled_size: scaled.size(),
        degenerate,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::material::Material;
    use crate::mesh_primitives::make_box;
    use crate::model::{MeshNode, ModelNode, Transform};

    fn box_model(size: [f32; 3], offset: Vec3) -> Model {
        let mesh = MeshNode::new(
            Arc::new(make_box(size)),
            Arc::new(Material::new("m".to_string())),
        );
        let mut root = ModelNode::group("root");
        root.children
            .push(ModelNode::with_mesh("box", mesh).with_transform(Transform::from_translation(offset)));
        Model::new(root)
    }

    #[test]
    fn longest_side_becomes_target_extent() {
        let mut model = box_model([2.0, 10.0, 4.0], Vec3::new(5.0, -3.0, 1.0));
        let result = normalize_model(&mut model, std::f32::consts::PI / 2.5);
        assert!((result.scaled_size.max_element() - TARGET_EXTENT).abs() < 1.0e-4);
        // The vertical extent is unaffected by the yaw.
        let bounds = model.world_bounds();
        assert!((bounds.size().y - TARGET_EXTENT).abs() < 1.0e-4);
        assert!(bounds.min.y.abs() < 1.0e-5);
    }

    #[test]
    fn model_is_centered_before_yaw() {
        let mut model = box_model([4.0, 1.0, 2.0], Vec3::new(10.0, 10.0, 10.0));
        normalize_model(&mut model, 0.0);
        let bounds = model.world_bounds();
        assert!(bounds.center().x.abs() < 1.0e-4);
        assert!(bounds.center().z.abs() < 1.0e-4);
        assert!(bounds.min.y.abs() < 1.0e-5);
        assert!((bounds.size().x - TARGET_EXTENT).abs() < 1.0e-4);
    }

    #[test]
    fn degenerate_model_keeps_unit_scale() {
        let mut model = box_model([0.0, 0.0, 0.0], Vec3::ZERO);
        let result = normalize_model(&mut model, 0.0);
        assert!(result.degenerate);
        assert_eq!(result.scale, 1.0);
        assert_eq!(model.root.transform.scale, Vec3::ONE);
    }
}
