#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

#[cfg(not(target_arch = "wasm32"))]
use eframe::egui;
#[cfg(not(target_arch = "wasm32"))]
use holoview_core::{ModelSource, ViewerSettings, SETTINGS_FILE};

mod app;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    let (console, log_level_state) = app::setup_tracing();

    tracing::info!("Holoview starting");

    let settings = ViewerSettings::load_or_default(Path::new(SETTINGS_FILE));
    let model_arg = std::env::args().nth(1);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_title("Holoview"),
        renderer: eframe::Renderer::Wgpu,
        ..Default::default()
    };
    eframe::run_native(
        "Holoview",
        native_options,
        Box::new(move |cc| {
            let mut app = app::HoloviewApp::new(settings, console, log_level_state);
            match model_arg {
                Some(location) => app.start_load(&cc.egui_ctx, ModelSource::parse(&location)),
                None => app.try_load_initial_model(&cc.egui_ctx),
            }
            Ok(Box::new(app))
        }),
    )
}

#[cfg(target_arch = "wasm32")]
fn main() {}
