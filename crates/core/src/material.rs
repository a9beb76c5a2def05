use holoview_scene::{SceneMaterial, SceneShading};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShadingModel {
    /// Unlit, color only.
    Basic,
    Phong {
        specular: [f32; 3],
        shininess: f32,
        flat_shading: bool,
    },
    Standard {
        roughness: f32,
        metalness: f32,
    },
}

/// Surface description attached to mesh nodes through `Arc<Material>`.
///
/// Two meshes share a material only when they hold the same `Arc`; equal
/// field values do not make two materials the same instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub shading: ShadingModel,
    pub color: [f32; 3],
    pub emissive: [f32; 3],
    pub opacity: f32,
    pub transparent: bool,
    pub wireframe: bool,
    pub double_sided: bool,
}

impl Material {
    pub fn new(name: String) -> Self {
        Self {
            name,
            shading: ShadingModel::Standard {
                roughness: 1.0,
                metalness: 1.0,
            },
            color: [1.0, 1.0, 1.0],
            emissive: [0.0, 0.0, 0.0],
            opacity: 1.0,
            transparent: false,
            wireframe: false,
            double_sided: false,
        }
    }

    pub fn basic(name: &str, color: [f32; 3], opacity: f32) -> Self {
        Self {
            name: name.to_string(),
            shading: ShadingModel::Basic,
            color,
            emissive: [0.0, 0.0, 0.0],
            opacity,
            transparent: true,
            wireframe: false,
            double_sided: false,
        }
    }

    pub fn double_sided(mut self) -> Self {
        self.double_sided = true;
        self
    }

    pub fn to_scene(&self) -> SceneMaterial {
        let (shading, flat_shading) = match self.shading {
            ShadingModel::Basic => (SceneShading::Unlit, false),
            ShadingModel::Phong {
                specular,
                shininess,
                flat_shading,
            } => (
                SceneShading::Phong {
                    specular,
                    shininess,
                },
                flat_shading,
            ),
            ShadingModel::Standard {
                roughness,
                metalness,
            } => (
                SceneShading::Standard {
                    roughness,
                    metalness,
                },
                false,
            ),
        };
        SceneMaterial {
            color: self.color,
            emissive: self.emissive,
            opacity: if self.transparent { self.opacity } else { 1.0 },
            shading,
            wireframe: self.wireframe,
            flat_shading,
            double_sided: self.double_sided,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MaterialMode {
    #[default]
    Normal,
    Holo,
    Spider,
}

impl MaterialMode {
    pub const ALL: [MaterialMode; 3] = [MaterialMode::Normal, MaterialMode::Holo, MaterialMode::Spider];

    pub fn label(self) -> &'static str {
        match self {
            MaterialMode::Normal => "Normal",
            MaterialMode::Holo => "Holo",
            MaterialMode::Spider => "Spider",
        }
    }
}

/// Which mode produced a mesh's current materials, and whether the frame loop
/// may flicker their opacity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterialTag {
    pub kind: MaterialMode,
    pub animate: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_material_renders_fully_opaque() {
        let mut material = Material::new("body".to_string());
        material.opacity = 0.2;
        assert_eq!(material.to_scene().opacity, 1.0);
        material.transparent = true;
        assert_eq!(material.to_scene().opacity, 0.2);
    }

    #[test]
    fn mode_round_trips_through_snake_case() {
        let json = serde_json::to_string(&MaterialMode::Spider).expect("serialize");
        assert_eq!(json, "\"spider\"");
    }
}
