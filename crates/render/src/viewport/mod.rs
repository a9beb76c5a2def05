use std::sync::{Arc, Mutex};

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

use egui::epaint::{PaintCallback, Rect};
use egui_wgpu::Callback;
use holoview_scene::SceneSnapshot;

mod callback;
mod callback_helpers;
mod mesh;
mod pipeline;
mod pipeline_shaders;
mod pipeline_targets;

pub(crate) use mesh::{build_vertices, wireframe_edges};

use callback::ViewportCallback;

/// Owns the scene handed to the GPU callback. The callback itself lives in
/// egui's paint list, so state is shared through mutexes.
pub struct ViewportRenderer {
    target_format: egui_wgpu::wgpu::TextureFormat,
    stats: Arc<Mutex<ViewportStatsState>>,
    scene: Arc<Mutex<ViewportSceneState>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ViewportStats {
    pub fps: f32,
    pub frame_time_ms: f32,
    pub draw_calls: u32,
    pub mesh_count: u32,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_uploads: u64,
}

pub(super) struct ViewportStatsState {
    last_frame: Option<Instant>,
    stats: ViewportStats,
}

pub(super) struct ViewportSceneState {
    version: u64,
    scene: Option<Arc<SceneSnapshot>>,
}

impl ViewportRenderer {
    pub fn new(target_format: egui_wgpu::wgpu::TextureFormat) -> Self {
        Self {
            target_format,
            stats: Arc::new(Mutex::new(ViewportStatsState {
                last_frame: None,
                stats: ViewportStats::default(),
            })),
            scene: Arc::new(Mutex::new(ViewportSceneState {
                version: 0,
                scene: None,
            })),
        }
    }

    pub fn paint_callback(&self, rect: Rect) -> PaintCallback {
        Callback::new_paint_callback(
            rect,
            ViewportCallback {
                target_format: self.target_format,
                rect,
                stats: self.stats.clone(),
                scene: self.scene.clone(),
            },
        )
    }

    pub fn stats_snapshot(&self) -> ViewportStats {
        self.stats
            .lock()
            .map(|state| state.stats)
            .unwrap_or_default()
    }

    pub fn set_scene(&self, scene: SceneSnapshot) {
        if let Ok(mut state) = self.scene.lock() {
            state.version = state.version.wrapping_add(1);
            state.scene = Some(Arc::new(scene));
        }
    }

    pub fn clear_scene(&self) {
        if let Ok(mut state) = self.scene.lock() {
            state.version = state.version.wrapping_add(1);
            state.scene = None;
        }
    }
}
