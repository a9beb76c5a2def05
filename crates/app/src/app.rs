use std::sync::atomic::AtomicU8;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

use holoview_core::{LoadError, LoadTicket, Model, ModelSource, Viewer, ViewerSettings};
use holoview_render::ViewportRenderer;
use tracing_subscriber::filter::LevelFilter;

mod io;
mod logging;
mod ui;
mod ui_panels;
mod viewport;

pub(crate) use logging::ConsoleBuffer;

use logging::level_filter_to_u8;

const INITIAL_VIEWPORT: [f32; 2] = [1400.0, 900.0];

/// Messages posted back to the UI thread by file pickers and load workers.
pub(crate) enum LoadMessage {
    Picked { source: ModelSource },
    Finished {
        ticket: LoadTicket,
        result: Result<Model, LoadError>,
    },
}

pub(crate) struct HoloviewApp {
    viewer: Viewer,
    console: ConsoleBuffer,
    log_level: LevelFilter,
    log_level_state: Arc<AtomicU8>,
    viewport_renderer: Option<ViewportRenderer>,
    load_tx: Sender<LoadMessage>,
    load_rx: Receiver<LoadMessage>,
    started: Instant,
    panel_locked: bool,
    show_console: bool,
}

pub(crate) fn setup_tracing() -> (ConsoleBuffer, Arc<AtomicU8>) {
    logging::setup_tracing()
}

impl HoloviewApp {
    pub(crate) fn new(
        settings: ViewerSettings,
        console: ConsoleBuffer,
        log_level_state: Arc<AtomicU8>,
    ) -> Self {
        let (load_tx, load_rx) = mpsc::channel();
        Self {
            viewer: Viewer::new(settings, INITIAL_VIEWPORT[0], INITIAL_VIEWPORT[1], random_seed()),
            console,
            log_level: LevelFilter::INFO,
            log_level_state,
            viewport_renderer: None,
            load_tx,
            load_rx,
            started: Instant::now(),
            panel_locked: true,
            show_console: false,
        }
    }

    fn set_log_level(&mut self, new_level: LevelFilter) {
        if new_level == self.log_level {
            return;
        }

        self.log_level_state.store(
            level_filter_to_u8(new_level),
            std::sync::atomic::Ordering::Relaxed,
        );
        self.log_level = new_level;
    }
}

fn random_seed() -> u64 {
    let mut bytes = [0u8; 8];
    match getrandom::fill(&mut bytes) {
        Ok(()) => u64::from_le_bytes(bytes),
        Err(err) => {
            tracing::warn!("no entropy source ({}); effects use a fixed seed", err);
            0x5eed_1e55
        }
    }
}
