use eframe::egui;
use holoview_render::ViewportRenderer;

use super::HoloviewApp;

/// Scroll distance, in points, that counts as one zoom step.
const SCROLL_STEP: f32 = 50.0;

impl HoloviewApp {
    pub(super) fn sync_wgpu_renderer(&mut self, frame: &eframe::Frame) {
        let Some(render_state) = frame.wgpu_render_state() else {
            return;
        };

        if self.viewport_renderer.is_none() {
            self.viewport_renderer = Some(ViewportRenderer::new(render_state.target_format));
        }
    }

    pub(super) fn show_viewport(&mut self, ui: &mut egui::Ui) {
        let rect = ui.available_rect_before_wrap();
        let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());
        self.handle_viewport_input(&response, rect);

        self.viewer.resize(rect.width(), rect.height());
        self.viewer.tick(self.started.elapsed());

        if let Some(renderer) = &self.viewport_renderer {
            renderer.set_scene(self.viewer.snapshot());
            ui.painter().add(renderer.paint_callback(rect));
        }
    }

    fn handle_viewport_input(&mut self, response: &egui::Response, rect: egui::Rect) {
        let height = rect.height();
        if response.dragged_by(egui::PointerButton::Primary) {
            let delta = response.drag_motion();
            self.viewer.orbit(delta.x, delta.y, height);
        }

        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            let delta = response.drag_motion();
            self.viewer.pan(delta.x, delta.y, height);
        }

        if !response.hovered() {
            return;
        }
        let scroll_delta = response.ctx.input(|i| i.raw_scroll_delta.y);
        if scroll_delta.abs() > 0.0 {
            self.viewer.zoom(scroll_delta / SCROLL_STEP);
        }
    }
}
