use std::sync::Arc;
use std::time::Duration;

use glam::Vec3;
use holoview_scene::SceneLine;

use crate::material::MaterialMode;
use crate::model::Model;
use crate::rotation::RotationState;
use crate::settings::RotationSettings;

/// Chance per frame that an animated holo mesh re-rolls its opacity.
pub const FLICKER_CHANCE: f32 = 0.03;
pub const FLICKER_BASE_OPACITY: f32 = 0.6;
pub const FLICKER_VARIATION: f32 = 0.1;

pub const SCAN_LINE_CHANCE: f32 = 0.02;
pub const SCAN_LINE_LIFETIME: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq)]
pub struct ScanLine {
    pub start: Vec3,
    pub end: Vec3,
    pub opacity: f32,
    pub expires_at: Duration,
}

impl ScanLine {
    pub fn to_scene(&self, color: [f32; 3]) -> SceneLine {
        SceneLine {
            points: vec![self.start.to_array(), self.end.to_array()],
            color,
            opacity: self.opacity,
        }
    }
}

/// Cosmetic per-frame processes: the time accumulator, stepped rotation,
/// holo flicker and transient scan lines. All randomness comes from `rng`.
#[derive(Debug)]
pub struct FrameEffects {
    pub time_value: f32,
    pub rotation_frame: u64,
    pub scan_lines: Vec<ScanLine>,
    rng: fastrand::Rng,
}

impl FrameEffects {
    pub fn new(seed: u64) -> Self {
        Self {
            time_value: 0.0,
            rotation_frame: 0,
            scan_lines: Vec::new(),
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    pub fn advance_time(&mut self) {
        self.time_value += 0.01;
    }

    /// Counts a rotation frame and returns the yaw to add on every
    /// `step_interval`th one.
    pub fn rotation_step(&mut self, rotation: &RotationState, settings: &RotationSettings) -> Option<f32> {
        self.rotation_frame += 1;
        let interval = u64::from(settings.step_interval.max(1));
        if self.rotation_frame % interval == 0 {
            Some(settings.step_size * rotation.speed())
        } else {
            None
        }
    }

    /// Re-rolls the opacity of animated holo meshes. Returns how many changed.
    pub fn flicker(&mut self, model: &mut Model) -> usize {
        let rng = &mut self.rng;
        let mut changed = 0;
        model.for_each_mesh_mut(|_, mesh| {
            if mesh.tag.kind != MaterialMode::Holo || !mesh.tag.animate {
                return;
            }
            if rng.f32() > 1.0 - FLICKER_CHANCE {
                let jitter = rng.f32() * FLICKER_VARIATION - FLICKER_VARIATION / 2.0;
                let opacity = FLICKER_BASE_OPACITY + jitter;
                for material in &mut mesh.materials {
                    Arc::make_mut(material).opacity = opacity;
                }
                changed += 1;
            }
        });
        changed
    }

    /// Rolls for a new scan line at `now`. Returns whether one spawned.
    pub fn maybe_spawn_scan_line(&mut self, now: Duration) -> bool {
        if self.rng.f32() <= 1.0 - SCAN_LINE_CHANCE {
            return false;
        }
        let opacity = 0.1 + self.rng.f32() * 0.5;
        let start = self.random_point();
        let end = self.random_point();
        self.scan_lines.push(ScanLine {
            start,
            end,
            opacity,
            expires_at: now + SCAN_LINE_LIFETIME,
        });
        true
    }

    pub fn expire_scan_lines(&mut self, now: Duration) {
        self.scan_lines.retain(|line| line.expires_at > now);
    }

    fn random_point(&mut self) -> Vec3 {
        Vec3::new(
            self.rng.f32() * 2.0 - 1.0,
            self.rng.f32() * 2.0 - 1.0,
            self.rng.f32() * 2.0 - 1.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{Material, MaterialTag};
    use crate::mesh_primitives::make_box;
    use crate::model::{MeshNode, ModelNode};

    fn tagged_model(tags: &[MaterialTag]) -> Model {
        let mut root = ModelNode::group("root");
        for (idx, tag) in tags.iter().enumerate() {
            let mut material = Material::new(format!("m{idx}"));
            material.transparent = true;
            material.opacity = 0.5;
            let mut mesh = MeshNode::new(Arc::new(make_box([1.0; 3])), Arc::new(material));
            mesh.tag = *tag;
            root.children.push(ModelNode::with_mesh(format!("mesh{idx}"), mesh));
        }
        Model::new(root)
    }

    #[test]
    fn flicker_touches_only_animated_holo_meshes() {
        let animated = MaterialTag {
            kind: MaterialMode::Holo,
            animate: true,
        };
        let still = MaterialTag {
            kind: MaterialMode::Holo,
            animate: false,
        };
        let mut model = tagged_model(&[animated, still]);
        let mut effects = FrameEffects::new(7);
        let mut total = 0;
        for _ in 0..500 {
            total += effects.flicker(&mut model);
        }
        assert!(total > 0);

        let mut opacities = Vec::new();
        model.for_each_mesh(|_, mesh| opacities.push(mesh.materials[0].opacity));
        assert!((opacities[0] - FLICKER_BASE_OPACITY).abs() <= FLICKER_VARIATION / 2.0 + 1.0e-6);
        assert_eq!(opacities[1], 0.5);
    }

    #[test]
    fn flicker_ignores_other_modes() {
        let mut model = tagged_model(&[MaterialTag {
            kind: MaterialMode::Spider,
            animate: true,
        }]);
        let mut effects = FrameEffects::new(1);
        let total: usize = (0..500).map(|_| effects.flicker(&mut model)).sum();
        assert_eq!(total, 0);
    }

    #[test]
    fn scan_lines_spawn_rarely_inside_unit_cube() {
        let mut effects = FrameEffects::new(42);
        let spawned = (0..10_000)
            .filter(|_| effects.maybe_spawn_scan_line(Duration::ZERO))
            .count();
        assert!((100..=300).contains(&spawned), "spawned {spawned}");
        for line in &effects.scan_lines {
            assert!(line.start.abs().max_element() <= 1.0);
            assert!(line.end.abs().max_element() <= 1.0);
            assert!((0.1..=0.6).contains(&line.opacity));
        }
    }

    #[test]
    fn each_scan_line_expires_on_its_own_deadline() {
        let mut effects = FrameEffects::new(3);
        effects.scan_lines.push(ScanLine {
            start: Vec3::ZERO,
            end: Vec3::ONE,
            opacity: 0.3,
            expires_at: Duration::from_millis(1000),
        });
        effects.scan_lines.push(ScanLine {
            start: Vec3::ZERO,
            end: Vec3::ONE,
            opacity: 0.3,
            expires_at: Duration::from_millis(1400),
        });
        effects.expire_scan_lines(Duration::from_millis(999));
        assert_eq!(effects.scan_lines.len(), 2);
        effects.expire_scan_lines(Duration::from_millis(1000));
        assert_eq!(effects.scan_lines.len(), 1);
        effects.expire_scan_lines(Duration::from_millis(1400));
        assert!(effects.scan_lines.is_empty());
    }

    #[test]
    fn rotation_steps_every_interval() {
        let settings = RotationSettings::default();
        let mut rotation = RotationState::new(&settings);
        rotation.set_speed(2.0);
        let mut effects = FrameEffects::new(0);
        let steps: Vec<f32> = (0..30)
            .filter_map(|_| effects.rotation_step(&rotation, &settings))
            .collect();
        assert_eq!(steps.len(), 3);
        assert!((steps[0] - 0.1).abs() < 1.0e-6);
    }
}
