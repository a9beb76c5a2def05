use eframe::egui;

use super::HoloviewApp;

impl eframe::App for HoloviewApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        self.sync_wgpu_renderer(frame);
        self.drain_load_messages(ctx);

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Load model...").clicked() {
                        self.open_model_dialog(ctx);
                        ui.close();
                    }
                    if ui
                        .add_enabled(self.viewer.is_loaded(), egui::Button::new("Clear"))
                        .clicked()
                    {
                        self.viewer.clear_model();
                        ui.close();
                    }
                });

                ui.separator();
                ui.label("Holoview");
                ui.separator();
                ui.checkbox(&mut self.show_console, "Console");
                if self.viewer.is_loading() {
                    ui.separator();
                    ui.spinner();
                    ui.label("Loading...");
                }
            });
        });

        if self.show_console {
            self.show_console_panel(ctx);
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.show_viewport(ui);
            });

        self.show_control_panel(ctx);
        self.show_stats_panel(ctx);

        ctx.request_repaint();
    }
}
