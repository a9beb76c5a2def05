use std::time::Duration;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

use glam::Quat;
use holoview_scene::{SceneItem, SceneSnapshot};

use crate::assets::{release_bytes, ModelSource};
use crate::camera::{OrbitControls, PerspectiveCamera};
use crate::color::hex_to_linear;
use crate::effects::FrameEffects;
use crate::error::LoadError;
use crate::material::MaterialMode;
use crate::material_mode::{apply_mode, MaterialPolicy};
use crate::model::Model;
use crate::normalize::{normalize_model, TARGET_EXTENT};
use crate::rotation::RotationState;
use crate::settings::ViewerSettings;
use crate::stage::{build_stage, Stage};
use crate::stats::{compute_stats, ModelStats};
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// Handed out by [`Viewer::begin_load`] and returned with the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub source: ModelSource,
    pub display_name: String,
    pub started: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadResolution {
    Attached,
    /// A newer load started after this one; the result was dropped.
    Stale,
    Failed,
}

/// Owns everything the viewer shows and mutates it from one thread.
#[derive(Debug)]
pub struct Viewer {
    settings: ViewerSettings,
    stage: Stage,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    model: Option<Model>,
    mode: MaterialMode,
    rotation: RotationState,
    stats: Option<ModelStats>,
    generation: u64,
    pending: Option<u64>,
    effects: FrameEffects,
}

impl Viewer {
    pub fn new(settings: ViewerSettings, width: f32, height: f32, seed: u64) -> Self {
        let stage = build_stage(&settings.stage, &settings.colors());
        let mut camera = PerspectiveCamera::new(1.0);
        camera.set_viewport(width, height);
        Self {
            stage,
            camera,
            controls: OrbitControls::default(),
            model: None,
            mode: settings.default_material_mode,
            rotation: RotationState::new(&settings.rotation),
            stats: None,
            generation: 0,
            pending: None,
            effects: FrameEffects::new(seed),
            settings,
        }
    }

    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.camera.set_viewport(width, height);
    }

    /// Drops the current model and starts a new load generation. Any ticket
    /// handed out earlier becomes stale.
    pub fn begin_load(&mut self, source: ModelSource, display_name: impl Into<String>) -> LoadTicket {
        self.model = None;
        self.stats = None;
        self.generation += 1;
        self.pending = Some(self.generation);
        let display_name = display_name.into();
        tracing::info!("loading {} from {}", display_name, source.describe());
        LoadTicket {
            generation: self.generation,
            source,
            display_name,
            started: Instant::now(),
        }
    }

    pub fn finish_load(&mut self, ticket: LoadTicket, result: Result<Model, LoadError>) -> LoadResolution {
        if ticket.source.is_transient() {
            release_bytes(&ticket.source.describe());
        }
        if ticket.generation != self.generation {
            tracing::debug!(
                "discarding stale load of {} (generation {}, current {})",
                ticket.display_name,
                ticket.generation,
                self.generation
            );
            return LoadResolution::Stale;
        }
        self.pending = None;

        let mut model = match result {
            Ok(model) => model,
            Err(err) => {
                tracing::error!("error loading {}: {}", ticket.display_name, err);
                return LoadResolution::Failed;
            }
        };

        normalize_model(&mut model, self.settings.default_model_orientation);
        let stats = compute_stats(&model, &ticket.display_name);
        apply_mode(&mut model, self.mode, &self.policy());
        if self.settings.scale_camera {
            self.camera.position.z = TARGET_EXTENT;
            self.controls.update(&mut self.camera);
        }
        tracing::info!(
            "loaded {}: {} meshes, {} triangles in {:.1} ms",
            stats.file_name,
            stats.meshes,
            stats.triangles,
            ticket.started.elapsed().as_secs_f32() * 1000.0
        );
        self.stats = Some(stats);
        self.model = Some(model);
        LoadResolution::Attached
    }

    /// Removes the model and its stats. Without a model this does nothing.
    pub fn clear_model(&mut self) -> bool {
        if self.model.take().is_none() {
            return false;
        }
        self.stats = None;
        tracing::info!("model cleared");
        true
    }

    pub fn set_material_mode(&mut self, mode: MaterialMode) {
        self.mode = mode;
        let policy = self.policy();
        if let Some(model) = &mut self.model {
            apply_mode(model, mode, &policy);
            tracing::info!("material mode set to {}", mode.label());
        }
    }

    pub fn toggle_rotation(&mut self) -> bool {
        self.rotation.toggle()
    }

    pub fn set_rotation_speed(&mut self, speed: f32) -> f32 {
        self.rotation.set_speed(speed)
    }

    pub fn set_rotation_from_fraction(&mut self, fraction: f32) -> f32 {
        let speed = self.rotation.speed_from_fraction(fraction);
        self.rotation.set_speed(speed)
    }

    pub fn orbit(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        self.controls.drag_rotate(dx, dy, viewport_height);
    }

    pub fn pan(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        self.controls.drag_pan(&self.camera, dx, dy, viewport_height);
    }

    pub fn zoom(&mut self, steps: f32) {
        self.controls.dolly(steps);
    }

    /// Advances one frame. `now` is the frame clock used for scan-line
    /// deadlines.
    pub fn tick(&mut self, now: Duration) {
        self.controls.update(&mut self.camera);
        self.effects.advance_time();

        if let Some(model) = &mut self.model {
            if self.rotation.enabled {
                if let Some(yaw) = self.effects.rotation_step(&self.rotation, &self.settings.rotation) {
                    let root = &mut model.root.transform;
                    root.rotation = Quat::from_rotation_y(yaw) * root.rotation;
                }
            }
            self.effects.flicker(model);
        }

        self.effects.maybe_spawn_scan_line(now);
        self.effects.expire_scan_lines(now);
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        let mut items: Vec<SceneItem> = self.stage.nodes.iter().map(|node| node.to_scene()).collect();
        if let Some(model) = &self.model {
            model.for_each_mesh(|world, mesh| {
                if let Some(material) = mesh.materials.first() {
                    items.push(SceneItem {
                        geometry: mesh.geometry.clone(),
                        transform: world,
                        material: material.to_scene(),
                    });
                }
            });
        }
        let line_color = hex_to_linear(self.settings.colors().base);
        SceneSnapshot {
            items,
            lines: self
                .effects
                .scan_lines
                .iter()
                .map(|line| line.to_scene(line_color))
                .collect(),
            lights: self.stage.lights.clone(),
            camera: self.camera.to_scene(),
        }
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn mode(&self) -> MaterialMode {
        self.mode
    }

    pub fn rotation(&self) -> &RotationState {
        &self.rotation
    }

    pub fn stats(&self) -> Option<&ModelStats> {
        self.stats.as_ref()
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn effects(&self) -> &FrameEffects {
        &self.effects
    }

    fn policy(&self) -> MaterialPolicy {
        MaterialPolicy {
            colors: self.settings.colors(),
            use_color_intensity: self.settings.use_color_intensity,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::EulerRot;

    use super::*;
    use crate::assets::{load_bytes, store_bytes};
    use crate::gltf_io::load_model_bytes;
    use crate::test_fixtures::{glb, unit_box_glb, FixtureMesh, FixtureNode};

    fn viewer() -> Viewer {
        Viewer::new(ViewerSettings::default(), 800.0, 600.0, 11)
    }

    fn two_box_glb() -> Vec<u8> {
        glb(
            &[FixtureNode::mesh(0), FixtureNode::mesh(0).translated([3.0, 0.0, 0.0])],
            &[vec![FixtureMesh::indexed_box(1.0, Some(0))]],
            1,
        )
    }

    #[test]
    fn successful_load_attaches_model_and_stats() {
        let mut viewer = viewer();
        let ticket = viewer.begin_load(ModelSource::Url("https://host/box.glb".to_string()), "box.glb");
        assert!(viewer.is_loading());
        let result = load_model_bytes(&unit_box_glb());
        assert_eq!(viewer.finish_load(ticket, result), LoadResolution::Attached);

        assert!(viewer.is_loaded());
        assert!(!viewer.is_loading());
        let stats = viewer.stats().expect("stats");
        assert_eq!(stats.file_name, "box.glb");
        assert_eq!(stats.meshes, 1);
        assert_eq!(stats.vertices, 24);
        assert_eq!(stats.triangles, 12);
        assert_eq!(stats.materials, 1);

        let bounds = viewer.model().expect("model").world_bounds();
        assert!(bounds.min.y.abs() < 1.0e-5);
        assert!((bounds.size().y - TARGET_EXTENT).abs() < 1.0e-4);
        viewer.model().expect("model").for_each_mesh(|_, mesh| {
            assert_eq!(mesh.tag.kind, MaterialMode::Holo);
            assert!(mesh.tag.animate);
        });
    }

    #[test]
    fn only_the_latest_load_is_shown() {
        let mut viewer = viewer();
        let first = viewer.begin_load(ModelSource::Url("https://host/a.glb".to_string()), "a.glb");
        let second = viewer.begin_load(ModelSource::Url("https://host/b.glb".to_string()), "b.glb");

        assert_eq!(
            viewer.finish_load(second, load_model_bytes(&unit_box_glb())),
            LoadResolution::Attached
        );
        assert_eq!(
            viewer.finish_load(first, load_model_bytes(&two_box_glb())),
            LoadResolution::Stale
        );
        let stats = viewer.stats().expect("stats");
        assert_eq!(stats.file_name, "b.glb");
        assert_eq!(stats.triangles, 12);
    }

    #[test]
    fn earlier_load_finishing_first_is_still_dropped() {
        let mut viewer = viewer();
        let first = viewer.begin_load(ModelSource::Url("https://host/a.glb".to_string()), "a.glb");
        let second = viewer.begin_load(ModelSource::Url("https://host/b.glb".to_string()), "b.glb");
        assert_eq!(
            viewer.finish_load(first, load_model_bytes(&two_box_glb())),
            LoadResolution::Stale
        );
        assert!(viewer.stats().is_none());
        viewer.finish_load(second, load_model_bytes(&unit_box_glb()));
        assert_eq!(viewer.stats().expect("stats").file_name, "b.glb");
    }

    #[test]
    fn failed_load_leaves_viewer_empty() {
        let mut viewer = viewer();
        let ticket = viewer.begin_load(ModelSource::Url("https://host/box.glb".to_string()), "box.glb");
        viewer.finish_load(ticket, load_model_bytes(&unit_box_glb()));

        let ticket = viewer.begin_load(ModelSource::Url("https://host/bad.glb".to_string()), "bad.glb");
        let resolution = viewer.finish_load(ticket, Err(LoadError::Parse("truncated".to_string())));
        assert_eq!(resolution, LoadResolution::Failed);
        assert!(!viewer.is_loaded());
        assert!(viewer.stats().is_none());
        assert!(!viewer.is_loading());
    }

    #[test]
    fn clear_without_model_changes_nothing() {
        let mut viewer = viewer();
        viewer.set_rotation_speed(1.0);
        let mode = viewer.mode();
        let rotation = viewer.rotation().clone();
        assert!(!viewer.clear_model());
        assert_eq!(viewer.mode(), mode);
        assert_eq!(viewer.rotation(), &rotation);
        assert!(viewer.stats().is_none());
    }

    #[test]
    fn clear_drops_model_and_stats() {
        let mut viewer = viewer();
        let ticket = viewer.begin_load(ModelSource::Url("https://host/box.glb".to_string()), "box.glb");
        viewer.finish_load(ticket, load_model_bytes(&unit_box_glb()));
        assert!(viewer.clear_model());
        assert!(!viewer.is_loaded());
        assert!(viewer.stats().is_none());
        assert_eq!(viewer.snapshot().items.len(), 6);
    }

    #[test]
    fn mode_is_remembered_without_model() {
        let mut viewer = viewer();
        viewer.set_material_mode(MaterialMode::Spider);
        let ticket = viewer.begin_load(ModelSource::Url("https://host/box.glb".to_string()), "box.glb");
        viewer.finish_load(ticket, load_model_bytes(&unit_box_glb()));
        let snapshot = viewer.snapshot();
        let model_item = snapshot.items.last().expect("model item");
        assert!(model_item.material.wireframe);
        assert_eq!(model_item.material.opacity, 0.7);
    }

    #[test]
    fn picked_file_bytes_are_released_after_load() {
        let mut viewer = viewer();
        let key = store_bytes("box.glb", unit_box_glb());
        let source = ModelSource::Blob(key.clone());
        let name = source.display_name();
        let ticket = viewer.begin_load(source, name);
        let bytes = load_bytes(&key).expect("stored bytes");
        viewer.finish_load(ticket, load_model_bytes(&bytes));
        assert!(load_bytes(&key).is_none());
        assert_eq!(viewer.stats().expect("stats").file_name, "box.glb");
    }

    #[test]
    fn rotation_steps_every_ten_frames_while_loaded() {
        let mut viewer = viewer();
        viewer.set_rotation_speed(2.0);
        let ticket = viewer.begin_load(ModelSource::Url("https://host/box.glb".to_string()), "box.glb");
        viewer.finish_load(ticket, load_model_bytes(&unit_box_glb()));
        let start = viewer.model().expect("model").root.transform.rotation;

        for frame in 1..=10 {
            viewer.tick(Duration::from_millis(frame * 16));
        }
        let after = viewer.model().expect("model").root.transform.rotation;
        let yaw = |rotation: Quat| rotation.to_euler(EulerRot::YXZ).0;
        assert!((yaw(after) - yaw(start) - 0.1).abs() < 1.0e-4);

        viewer.toggle_rotation();
        for frame in 11..=30 {
            viewer.tick(Duration::from_millis(frame * 16));
        }
        let frozen = viewer.model().expect("model").root.transform.rotation;
        assert_eq!(frozen, after);
    }

    #[test]
    fn resize_reaches_the_rendered_camera() {
        let mut viewer = viewer();
        let before = viewer.snapshot().camera;
        viewer.resize(1600.0, 400.0);
        let after = viewer.snapshot().camera;
        assert_ne!(before, after);
        assert_eq!(after.aspect, 4.0);

        viewer.resize(0.0, 400.0);
        assert_eq!(viewer.snapshot().camera.aspect, 4.0);
    }

    #[test]
    fn scan_lines_do_not_outlive_one_second() {
        let mut viewer = viewer();
        for frame in 0..600u64 {
            viewer.tick(Duration::from_millis(frame * 16));
        }
        let now = Duration::from_millis(599 * 16);
        for line in &viewer.effects().scan_lines {
            assert!(line.expires_at > now);
            assert!(line.expires_at <= now + Duration::from_millis(1000));
        }
        assert_eq!(viewer.snapshot().lines.len(), viewer.effects().scan_lines.len());
    }
}
