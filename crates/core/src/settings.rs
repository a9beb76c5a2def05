use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::material::MaterialMode;

pub const SETTINGS_FILE: &str = "holoview.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteColors {
    pub base: u32,
    pub dark_base: u32,
    pub emissive: u32,
    pub specular: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    NeonGenBlue,
    Orange,
    Aura,
    Verde,
}

impl Palette {
    pub fn colors(self) -> PaletteColors {
        match self {
            Palette::NeonGenBlue => PaletteColors {
                base: 0x00ffff,
                dark_base: 0x00ccff,
                emissive: 0x00ffce,
                specular: 0x00ffce,
            },
            Palette::Orange => PaletteColors {
                base: 0xff8c00,
                dark_base: 0xff4800,
                emissive: 0x800000,
                specular: 0xff9900,
            },
            Palette::Aura => PaletteColors {
                base: 0xee6d2b,
                dark_base: 0x8b4513,
                emissive: 0x8b4513,
                specular: 0x8b4513,
            },
            Palette::Verde => PaletteColors {
                base: 0x399334,
                dark_base: 0x2e7d32,
                emissive: 0x2e7d32,
                specular: 0x2e7d32,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StageSettings {
    pub platform_radius: f32,
    pub platform_segments: u32,
    pub platform_opacity: f32,
    pub ring_radii: Vec<f32>,
    pub ring_thickness: Vec<f32>,
    pub ring_opacities: Vec<f32>,
    pub ring_segments: u32,
    pub cross_opacity: f32,
    pub cross_thickness: f32,
    /// Palette whose dark base tints the rings and the cross.
    pub accent_palette: Palette,
}

impl Default for StageSettings {
    fn default() -> Self {
        Self {
            platform_radius: 2.0,
            platform_segments: 64,
            platform_opacity: 0.15,
            ring_radii: vec![0.9, 1.2, 1.5],
            ring_thickness: vec![0.004, 0.008, 0.012],
            ring_opacities: vec![0.35, 0.35, 0.4],
            ring_segments: 128,
            cross_opacity: 0.6,
            cross_thickness: 0.01,
            accent_palette: Palette::Orange,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RotationSettings {
    pub enabled: bool,
    pub speed: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub step_interval: u32,
    pub step_size: f32,
    pub gauge_segments: usize,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            speed: 0.05,
            min_speed: 0.09,
            max_speed: 4.2,
            step_interval: 10,
            step_size: 0.05,
            gauge_segments: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewerSettings {
    pub load_initial_model: bool,
    pub default_model: String,
    pub default_material_mode: MaterialMode,
    pub default_model_orientation: f32,
    pub use_color_intensity: bool,
    pub scale_camera: bool,
    pub palette: Palette,
    pub stage: StageSettings,
    pub rotation: RotationSettings,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            load_initial_model: true,
            default_model: "millennium_falcon.glb".to_string(),
            default_material_mode: MaterialMode::Holo,
            default_model_orientation: std::f32::consts::PI / 2.5,
            use_color_intensity: false,
            scale_camera: false,
            palette: Palette::NeonGenBlue,
            stage: StageSettings::default(),
            rotation: RotationSettings::default(),
        }
    }
}

impl ViewerSettings {
    pub fn from_json(data: &[u8]) -> Result<Self, String> {
        serde_json::from_slice(data).map_err(|err| format!("invalid settings: {err}"))
    }

    /// Reads settings from `path`, falling back to defaults when the file is
    /// missing or malformed.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read(path) {
            Ok(data) => match Self::from_json(&data) {
                Ok(settings) => {
                    tracing::info!("settings loaded from {}", path.display());
                    settings
                }
                Err(err) => {
                    tracing::warn!("{}; using defaults", err);
                    Self::default()
                }
            },
            Err(err) => {
                tracing::warn!("failed to read {}: {}; using defaults", path.display(), err);
                Self::default()
            }
        }
    }

    pub fn colors(&self) -> PaletteColors {
        self.palette.colors()
    }
}
