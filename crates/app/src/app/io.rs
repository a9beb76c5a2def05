use eframe::egui;
#[cfg(not(target_arch = "wasm32"))]
use rfd::FileDialog;

use holoview_core::{load_model_bytes, logging_sink, ModelSource};
#[cfg(not(target_arch = "wasm32"))]
use holoview_core::fetch_bytes_blocking;
#[cfg(target_arch = "wasm32")]
use holoview_core::{fetch_bytes, store_bytes};

use super::{HoloviewApp, LoadMessage};

const MODEL_FILTER_NAME: &str = "glTF model";
const MODEL_EXTENSIONS: [&str; 2] = ["glb", "gltf"];

impl HoloviewApp {
    /// Starts loading the configured default model, if the settings ask for it.
    pub(crate) fn try_load_initial_model(&mut self, ctx: &egui::Context) {
        let settings = self.viewer.settings();
        if !settings.load_initial_model {
            tracing::info!("initial model disabled; waiting for a file");
            return;
        }
        let location = settings.default_model.trim().to_string();
        if location.is_empty() {
            tracing::warn!("no default model configured");
            return;
        }
        self.start_load(ctx, ModelSource::parse(&location));
    }

    pub(crate) fn start_load(&mut self, ctx: &egui::Context, source: ModelSource) {
        let display_name = source.display_name();
        let ticket = self.viewer.begin_load(source, display_name);
        let tx = self.load_tx.clone();
        let ctx = ctx.clone();

        #[cfg(not(target_arch = "wasm32"))]
        {
            let spawned = std::thread::Builder::new()
                .name("holoview-load".to_string())
                .spawn(move || {
                    let sink = logging_sink(ticket.source.describe());
                    let result = fetch_bytes_blocking(&ticket.source, Some(sink))
                        .and_then(|bytes| load_model_bytes(&bytes));
                    if tx.send(LoadMessage::Finished { ticket, result }).is_err() {
                        tracing::debug!("load finished after the viewer closed");
                    }
                    ctx.request_repaint();
                });
            if let Err(err) = spawned {
                tracing::error!("failed to spawn load worker: {}", err);
            }
        }

        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(async move {
            let sink = logging_sink(ticket.source.describe());
            let result = fetch_bytes(&ticket.source, Some(sink))
                .await
                .and_then(|bytes| load_model_bytes(&bytes));
            if tx.send(LoadMessage::Finished { ticket, result }).is_err() {
                tracing::debug!("load finished after the viewer closed");
            }
            ctx.request_repaint();
        });
    }

    /// Applies picker and loader results. Runs at the top of every frame.
    pub(super) fn drain_load_messages(&mut self, ctx: &egui::Context) {
        while let Ok(message) = self.load_rx.try_recv() {
            match message {
                LoadMessage::Picked { source } => self.start_load(ctx, source),
                LoadMessage::Finished { ticket, result } => {
                    self.viewer.finish_load(ticket, result);
                }
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub(super) fn open_model_dialog(&mut self, _ctx: &egui::Context) {
        if let Some(path) = FileDialog::new()
            .add_filter(MODEL_FILTER_NAME, &MODEL_EXTENSIONS)
            .pick_file()
        {
            if let Err(err) = self.load_tx.send(LoadMessage::Picked {
                source: ModelSource::Path(path),
            }) {
                tracing::error!("failed to queue picked file: {}", err);
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub(super) fn open_model_dialog(&mut self, ctx: &egui::Context) {
        let tx = self.load_tx.clone();
        let ctx = ctx.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let Some(handle) = rfd::AsyncFileDialog::new()
                .add_filter(MODEL_FILTER_NAME, &MODEL_EXTENSIONS)
                .pick_file()
                .await
            else {
                return;
            };
            let data = handle.read().await;
            let key = store_bytes(&handle.file_name(), data);
            if tx
                .send(LoadMessage::Picked {
                    source: ModelSource::Blob(key),
                })
                .is_err()
            {
                tracing::debug!("file picked after the viewer closed");
            }
            ctx.request_repaint();
        });
    }
}
