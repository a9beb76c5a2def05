use eframe::egui;
use holoview_core::{MaterialMode, StatsFields};
use tracing_subscriber::filter::LevelFilter;

use super::HoloviewApp;

const GAUGE_HEIGHT: f32 = 18.0;
const GAUGE_GAP: f32 = 2.0;

impl HoloviewApp {
    pub(super) fn show_control_panel(&mut self, ctx: &egui::Context) {
        egui::Window::new("Controls")
            .default_pos(egui::pos2(16.0, 48.0))
            .resizable(false)
            .collapsible(false)
            .movable(!self.panel_locked)
            .show(ctx, |ui| {
                let loaded = self.viewer.is_loaded();
                ui.label("Material");
                ui.horizontal(|ui| {
                    for mode in MaterialMode::ALL {
                        let active = loaded && self.viewer.mode() == mode;
                        let clicked = ui
                            .add_enabled_ui(loaded, |ui| ui.selectable_label(active, mode.label()))
                            .inner
                            .clicked();
                        if clicked {
                            self.viewer.set_material_mode(mode);
                        }
                    }
                });

                ui.separator();
                ui.horizontal(|ui| {
                    let rotate_label = if self.viewer.rotation().enabled {
                        "Freeze"
                    } else {
                        "Rotate"
                    };
                    if ui
                        .add_enabled(loaded, egui::Button::new(rotate_label))
                        .clicked()
                    {
                        let enabled = self.viewer.toggle_rotation();
                        tracing::info!("rotation {}", if enabled { "on" } else { "frozen" });
                    }
                    if ui
                        .add_enabled(loaded, egui::Button::new("Clear"))
                        .clicked()
                    {
                        self.viewer.clear_model();
                    }
                    if ui.button("Load model...").clicked() {
                        self.open_model_dialog(ctx);
                    }
                });

                ui.label(format!("Speed {:.2}", self.viewer.rotation().speed()));
                self.rotation_gauge(ui);

                ui.separator();
                let lock_label = if self.panel_locked {
                    "Move panel"
                } else {
                    "Lock panel"
                };
                if ui.button(lock_label).clicked() {
                    self.panel_locked = !self.panel_locked;
                }
            });
    }

    fn rotation_gauge(&mut self, ui: &mut egui::Ui) {
        let interactive = self
            .viewer
            .rotation()
            .gauge_interactive(self.viewer.is_loaded());
        let segments = self.viewer.rotation().segment_count().max(1);
        let size = egui::vec2(ui.available_width().max(180.0), GAUGE_HEIGHT);
        let sense = if interactive {
            egui::Sense::click_and_drag()
        } else {
            egui::Sense::hover()
        };
        let (rect, response) = ui.allocate_exact_size(size, sense);
        let rects = segment_rects(rect, segments);
        let values = self.viewer.rotation().segment_values();

        if interactive {
            if response.clicked() {
                let snapped = response
                    .interact_pointer_pos()
                    .and_then(|pos| segment_at(pos.x, &rects))
                    .and_then(|index| values.get(index).copied());
                if let Some(value) = snapped {
                    let speed = self.viewer.set_rotation_speed(value);
                    tracing::debug!("rotation speed set to {:.2}", speed);
                }
            } else if response.dragged() {
                if let Some(pos) = response.interact_pointer_pos() {
                    let speed = self
                        .viewer
                        .set_rotation_from_fraction(gauge_fraction(pos.x, rect));
                    tracing::debug!("rotation speed set to {:.2}", speed);
                }
            }
        }

        let active = self.viewer.rotation().active_segment_index();
        let accent = palette_color(self.viewer.settings().colors().base);
        let idle = egui::Color32::from_gray(48);
        let disabled = egui::Color32::from_gray(32);
        let painter = ui.painter_at(rect);
        for (index, segment) in rects.iter().copied().enumerate() {
            let color = if !interactive {
                disabled
            } else if index <= active {
                accent
            } else {
                idle
            };
            painter.rect_filled(segment, 2.0, color);
        }

        if interactive {
            let hovered = response
                .hover_pos()
                .and_then(|pos| segment_at(pos.x, &rects))
                .and_then(|index| values.get(index).copied());
            if let Some(value) = hovered {
                response.on_hover_text(format!("Set speed to {value:.2}"));
            }
        }
    }

    pub(super) fn show_stats_panel(&self, ctx: &egui::Context) {
        let fields = StatsFields::from_stats(self.viewer.stats());
        egui::Window::new("Model")
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-16.0, 48.0))
            .resizable(false)
            .show(ctx, |ui| {
                egui::Grid::new("model_stats")
                    .num_columns(2)
                    .striped(true)
                    .show(ui, |ui| {
                        for (label, value) in [
                            ("File", &fields.file_name),
                            ("Meshes", &fields.meshes),
                            ("Vertices", &fields.vertices),
                            ("Triangles", &fields.triangles),
                            ("Materials", &fields.materials),
                            ("Dimensions", &fields.dimensions),
                        ] {
                            ui.label(label);
                            ui.monospace(value.as_str());
                            ui.end_row();
                        }
                    });

                if let Some(renderer) = &self.viewport_renderer {
                    let stats = renderer.stats_snapshot();
                    ui.separator();
                    ui.label(format!(
                        "{:.0} fps ({:.1} ms), {} draws, {} meshes cached",
                        stats.fps, stats.frame_time_ms, stats.draw_calls, stats.mesh_count
                    ));
                }
            });
    }

    pub(super) fn show_console_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("console_panel")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                egui::ComboBox::from_label("Log level")
                    .selected_text(format!("{:?}", self.log_level))
                    .show_ui(ui, |ui| {
                        for level in [
                            LevelFilter::ERROR,
                            LevelFilter::WARN,
                            LevelFilter::INFO,
                            LevelFilter::DEBUG,
                            LevelFilter::TRACE,
                        ] {
                            if ui
                                .selectable_label(self.log_level == level, format!("{:?}", level))
                                .clicked()
                            {
                                self.set_log_level(level);
                            }
                        }
                    });
                ui.separator();
                let console_lines = self.console.snapshot();
                egui::ScrollArea::vertical()
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for line in console_lines {
                            ui.label(line);
                        }
                    });
            });
    }
}

/// Pointer x mapped onto the gauge, clamped to [0, 1].
fn gauge_fraction(pointer_x: f32, rect: egui::Rect) -> f32 {
    ((pointer_x - rect.left()) / rect.width().max(1.0)).clamp(0.0, 1.0)
}

fn segment_rects(rect: egui::Rect, segments: usize) -> Vec<egui::Rect> {
    let count = segments.max(1) as f32;
    let width = ((rect.width() - GAUGE_GAP * (count - 1.0)) / count).max(1.0);
    (0..segments)
        .map(|index| {
            let left = rect.left() + index as f32 * (width + GAUGE_GAP);
            egui::Rect::from_min_size(egui::pos2(left, rect.top()), egui::vec2(width, rect.height()))
        })
        .collect()
}

/// Segment under the pointer; the gap after a segment belongs to it.
fn segment_at(pointer_x: f32, segments: &[egui::Rect]) -> Option<usize> {
    let last = segments.len().checked_sub(1)?;
    Some(
        segments
            .iter()
            .position(|segment| pointer_x <= segment.right() + GAUGE_GAP)
            .unwrap_or(last),
    )
}

fn palette_color(hex: u32) -> egui::Color32 {
    egui::Color32::from_rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}
