#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, unused_imports, non_snake_case)
)]

#[cfg(target_arch = "wasm32")]
mod app;

#[cfg(target_arch = "wasm32")]
use app::HoloviewApp;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

#[cfg(target_arch = "wasm32")]
const BUNDLED_SETTINGS: &str = include_str!("../../../config/holoview.json");

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub async fn start(canvas_id: &str) -> Result<(), wasm_bindgen::JsValue> {
    let _ = console_error_panic_hook::set_once();
    let runner = eframe::WebRunner::new();
    let web_options = eframe::WebOptions::default();
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| JsValue::from_str("canvas not found"))?;
    let canvas: web_sys::HtmlCanvasElement = canvas
        .dyn_into()
        .map_err(|_| JsValue::from_str("canvas is not HtmlCanvasElement"))?;
    runner
        .start(
            canvas,
            web_options,
            Box::new(|cc| {
                let (console, log_level_state) = app::setup_tracing();
                let settings = holoview_core::ViewerSettings::from_json(BUNDLED_SETTINGS.as_bytes())
                    .unwrap_or_else(|err| {
                        tracing::warn!("{}; using defaults", err);
                        holoview_core::ViewerSettings::default()
                    });
                let mut app = HoloviewApp::new(settings, console, log_level_state);
                app.try_load_initial_model(&cc.egui_ctx);
                Ok(Box::new(app))
            }),
        )
        .await
}
