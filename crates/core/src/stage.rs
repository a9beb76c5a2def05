use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::{Mat4, Vec3};
use holoview_scene::{MeshGeometry, SceneItem, SceneLight};

use crate::color::hex_to_linear;
use crate::material::Material;
use crate::mesh_primitives::{make_box, make_circle, make_ring};
use crate::settings::{PaletteColors, StageSettings};

const PLATFORM_HEIGHT: f32 = -0.01;
const CROSS_HEIGHT: f32 = 0.0001;

#[derive(Debug, Clone)]
pub struct StageNode {
    pub name: String,
    pub geometry: Arc<MeshGeometry>,
    pub transform: Mat4,
    pub material: Material,
}

impl StageNode {
    pub fn to_scene(&self) -> SceneItem {
        SceneItem {
            geometry: self.geometry.clone(),
            transform: self.transform,
            material: self.material.to_scene(),
        }
    }
}

/// Lights and static decoration that stay in the scene for the whole session.
#[derive(Debug, Clone)]
pub struct Stage {
    pub lights: Vec<SceneLight>,
    pub nodes: Vec<StageNode>,
}

pub fn build_stage(settings: &StageSettings, colors: &PaletteColors) -> Stage {
    let lights = vec![
        SceneLight::Ambient {
            color: [1.0, 1.0, 1.0],
            intensity: 0.5,
        },
        SceneLight::Directional {
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
            position: [1.0, 1.0, 1.0],
        },
    ];

    let lay_flat = Mat4::from_rotation_x(-FRAC_PI_2);
    let accent = hex_to_linear(settings.accent_palette.colors().dark_base);
    let mut nodes = Vec::new();

    nodes.push(StageNode {
        name: "platform".to_string(),
        geometry: Arc::new(make_circle(settings.platform_radius, settings.platform_segments)),
        transform: Mat4::from_translation(Vec3::new(0.0, PLATFORM_HEIGHT, 0.0)) * lay_flat,
        material: Material::basic(
            "platform",
            hex_to_linear(colors.base),
            settings.platform_opacity,
        )
        .double_sided(),
    });

    for (idx, radius) in settings.ring_radii.iter().enumerate() {
        let thickness = settings.ring_thickness.get(idx).copied().unwrap_or(0.01);
        let opacity = settings.ring_opacities.get(idx).copied().unwrap_or(0.4);
        nodes.push(StageNode {
            name: format!("ring_{idx}"),
            geometry: Arc::new(make_ring(
                radius - thickness / 2.0,
                radius + thickness / 2.0,
                settings.ring_segments,
            )),
            transform: lay_flat,
            material: Material::basic("ring", accent, opacity).double_sided(),
        });
    }

    let cross_half = settings.ring_radii.last().copied().unwrap_or(1.5);
    let cross_offset = Mat4::from_translation(Vec3::new(0.0, CROSS_HEIGHT, 0.0));
    for (name, size) in [
        ("cross_horizontal", [cross_half * 2.0, 0.0, settings.cross_thickness]),
        ("cross_vertical", [settings.cross_thickness, 0.0, cross_half * 2.0]),
    ] {
        nodes.push(StageNode {
            name: name.to_string(),
            geometry: Arc::new(make_box(size)),
            transform: cross_offset,
            material: Material::basic("cross", accent, settings.cross_opacity),
        });
    }

    Stage { lights, nodes }
}
