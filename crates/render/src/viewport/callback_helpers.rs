use glam::{Mat4, Vec3};
use holoview_scene::{SceneItem, SceneMaterial, SceneShading, SceneSnapshot};

use super::pipeline::{DrawUniforms, FrameUniforms};

const UNLIT: f32 = 0.0;
const PHONG: f32 = 1.0;
const STANDARD: f32 = 2.0;

pub(super) fn frame_uniforms(
    snapshot: &SceneSnapshot,
    view_proj: Mat4,
    encode_srgb: bool,
) -> FrameUniforms {
    let (light_color, light_dir) = match snapshot.directional() {
        Some((color, position)) => {
            let dir = Vec3::from(position).normalize_or_zero();
            if dir == Vec3::ZERO {
                ([0.0; 3], Vec3::Y)
            } else {
                (color, dir)
            }
        }
        None => ([0.0; 3], Vec3::Y),
    };
    FrameUniforms {
        view_proj: view_proj.to_cols_array_2d(),
        camera_pos: snapshot.camera.position,
        encode_srgb: if encode_srgb { 1.0 } else { 0.0 },
        ambient: snapshot.ambient(),
        _pad0: 0.0,
        light_dir: light_dir.to_array(),
        _pad1: 0.0,
        light_color,
        _pad2: 0.0,
    }
}

/// Per-draw uniforms. Flat shading is dropped for line topology since
/// screen-space derivatives of a line have no usable surface normal.
pub(super) fn draw_uniforms(transform: Mat4, material: &SceneMaterial, as_lines: bool) -> DrawUniforms {
    let (kind, specular, shininess, roughness, metalness) = match material.shading {
        SceneShading::Unlit => (UNLIT, [0.0; 3], 1.0, 1.0, 0.0),
        SceneShading::Phong {
            specular,
            shininess,
        } => (PHONG, specular, shininess, 1.0, 0.0),
        SceneShading::Standard {
            roughness,
            metalness,
        } => (STANDARD, [0.0; 3], 1.0, roughness, metalness),
    };
    let flat = material.flat_shading && !as_lines;
    DrawUniforms {
        model: transform.to_cols_array_2d(),
        normal_matrix: transform.inverse().transpose().to_cols_array_2d(),
        color: [
            material.color[0],
            material.color[1],
            material.color[2],
            material.opacity,
        ],
        emissive: [
            material.emissive[0],
            material.emissive[1],
            material.emissive[2],
            kind,
        ],
        specular: [specular[0], specular[1], specular[2], shininess],
        params: [
            roughness,
            metalness,
            if flat { 1.0 } else { 0.0 },
            if material.double_sided { 1.0 } else { 0.0 },
        ],
    }
}

/// Line draws for scan lines: world-space points, unlit.
pub(super) fn line_uniforms(color: [f32; 3], opacity: f32) -> DrawUniforms {
    draw_uniforms(
        Mat4::IDENTITY,
        &SceneMaterial {
            color,
            emissive: [0.0; 3],
            opacity,
            shading: SceneShading::Unlit,
            wireframe: false,
            flat_shading: false,
            double_sided: true,
        },
        true,
    )
}

pub(super) fn is_transparent(material: &SceneMaterial) -> bool {
    material.opacity < 1.0
}

/// Opaque items keep scene order; transparent items follow, farthest first.
pub(super) fn draw_order<F>(items: &[SceneItem], camera_pos: Vec3, local_center: F) -> Vec<usize>
where
    F: Fn(&SceneItem) -> Vec3,
{
    let mut order = Vec::with_capacity(items.len());
    let mut transparent = Vec::new();
    for (index, item) in items.iter().enumerate() {
        if is_transparent(&item.material) {
            let center = item.transform.transform_point3(local_center(item));
            transparent.push((center.distance_squared(camera_pos), index));
        } else {
            order.push(index);
        }
    }
    transparent.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    order.extend(transparent.into_iter().map(|(_, index)| index));
    order
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use holoview_scene::{MeshGeometry, SceneCamera, SceneLight};

    use super::*;

    fn item(x: f32, opacity: f32) -> SceneItem {
        SceneItem {
            geometry: Arc::new(MeshGeometry::new(vec![[0.0; 3]], Vec::new(), None)),
            transform: Mat4::from_translation(Vec3::new(x, 0.0, 0.0)),
            material: SceneMaterial {
                color: [1.0; 3],
                emissive: [0.0; 3],
                opacity,
                shading: SceneShading::Unlit,
                wireframe: false,
                flat_shading: false,
                double_sided: false,
            },
        }
    }

    #[test]
    fn transparent_items_draw_after_opaque_back_to_front() {
        let items = vec![item(1.0, 0.5), item(0.0, 1.0), item(5.0, 0.5), item(2.0, 1.0)];
        let order = draw_order(&items, Vec3::ZERO, |_| Vec3::ZERO);
        assert_eq!(order, vec![1, 3, 2, 0]);
    }

    #[test]
    fn flat_shading_is_ignored_for_lines() {
        let mut material = item(0.0, 1.0).material;
        material.flat_shading = true;
        assert_eq!(draw_uniforms(Mat4::IDENTITY, &material, false).params[2], 1.0);
        assert_eq!(draw_uniforms(Mat4::IDENTITY, &material, true).params[2], 0.0);
    }

    #[test]
    fn missing_directional_light_contributes_nothing() {
        let snapshot = SceneSnapshot {
            items: Vec::new(),
            lines: Vec::new(),
            lights: vec![SceneLight::Ambient {
                color: [1.0; 3],
                intensity: 0.5,
            }],
            camera: SceneCamera {
                position: [0.0, 2.0, 3.0],
                target: [0.0; 3],
                fov_y_degrees: 75.0,
                aspect: 1.5,
                near: 0.1,
                far: 1000.0,
            },
        };
        let frame = frame_uniforms(&snapshot, Mat4::IDENTITY, true);
        assert_eq!(frame.light_color, [0.0; 3]);
        assert_eq!(frame.ambient, [0.5; 3]);
        assert_eq!(frame.encode_srgb, 1.0);
    }
}
