use eframe::egui;
use profgraph_core::session::{GenerateRequest, ViewerSession};
use profgraph_core::status::StatusKind;
use profgraph_core::viewport::{PointerButton, PointerTarget, ZOOM_FACTOR};
use profgraph_protocol::{Colormap, FormatChoice, GraphOptions, InputSource, Size, SourceFormat};

use crate::backend::{GenerateBackend, HttpBackend, OutcomeMailbox};
use crate::renderer;

const AUTO_UPDATE_KEY: &str = "profgraph_auto_update";

/// Main application state.
pub struct ViewerApp {
    session: ViewerSession,
    backend: Box<dyn GenerateBackend>,
    mailbox: OutcomeMailbox,
    /// Buffer for the server-side path field.
    path_field: String,
    /// Committed option values, used to detect whether a text filter
    /// actually changed when its field loses focus.
    committed_options: GraphOptions,
    /// Central canvas size from the previous frame (container for
    /// zoom/fit).
    canvas_size: Size,
    /// Set when a file was passed on the command line: generate once on
    /// the first frame.
    generate_on_start: bool,
}

impl ViewerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        server_url: String,
        initial_file: Option<String>,
    ) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let mut session = ViewerSession::new();
        if let Some(storage) = cc.storage {
            if let Some(saved) = eframe::get_value::<bool>(storage, AUTO_UPDATE_KEY) {
                session.set_auto_update(saved, 0.0);
            }
        }

        let mut path_field = String::new();
        let mut generate_on_start = false;
        if let Some(path) = initial_file {
            if let Some(source) = InputSource::from_path(&path) {
                path_field = path;
                session.set_source(source, 0.0);
                generate_on_start = true;
            }
        }

        let committed_options = session.options().clone();
        Self {
            session,
            backend: Box::new(HttpBackend::new(server_url)),
            mailbox: OutcomeMailbox::default(),
            path_field,
            committed_options,
            canvas_size: Size::new(0.0, 0.0),
            generate_on_start,
        }
    }

    fn dispatch(&mut self, ctx: &egui::Context, request: GenerateRequest) {
        self.backend
            .dispatch(request, self.mailbox.clone(), ctx.clone());
    }

    fn generate_manually(&mut self, ctx: &egui::Context) {
        if let Some(request) = self.session.generate_now() {
            self.dispatch(ctx, request);
        }
    }

    /// Fit the mounted graph into the current canvas.
    fn fit_now(&mut self) {
        let Some((width, height)) = self.session.mounted().map(|m| (m.width, m.height)) else {
            return;
        };
        let scale = self.session.viewport().scale();
        let on_screen = Size::new(width * scale, height * scale);
        self.session
            .viewport_mut()
            .fit_to_view(self.canvas_size, on_screen);
    }

    fn sidebar(&mut self, ctx: &egui::Context, now_ms: f64) {
        egui::SidePanel::left("controls")
            .default_width(250.0)
            .show(ctx, |ui| {
                ui.heading("profgraph");
                ui.separator();

                self.source_controls(ui, now_ms);
                ui.separator();
                self.option_controls(ui, now_ms);
                ui.separator();
                self.generate_controls(ui, ctx, now_ms);
                ui.separator();
                self.zoom_controls(ui);
            });
    }

    fn source_controls(&mut self, ui: &mut egui::Ui, now_ms: f64) {
        ui.label("Profile file");
        let mut new_source = None;

        #[cfg(not(target_arch = "wasm32"))]
        if ui.button("Browse…").clicked() {
            if let Some(path) = rfd::FileDialog::new().pick_file() {
                match std::fs::read(&path) {
                    Ok(bytes) => {
                        let name = path
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_else(|| "profile".to_string());
                        new_source = Some(InputSource::from_bytes(name, bytes));
                        // User chose a file; any CLI-provided path no
                        // longer applies.
                        self.path_field.clear();
                    }
                    Err(error) => log::error!("failed to read {}: {error}", path.display()),
                }
            }
        }
        #[cfg(target_arch = "wasm32")]
        ui.small("Drop a profile file anywhere in the window");

        ui.label("Server-side path");
        let response = ui.text_edit_singleline(&mut self.path_field);
        if response.lost_focus() {
            if let Some(source) = InputSource::from_path(&self.path_field) {
                if self.session.source() != Some(&source) {
                    new_source = Some(source);
                }
            }
        }

        if let Some(name) = self.session.source().map(|s| s.file_name()) {
            ui.small(name.to_string());
        }

        if let Some(source) = new_source {
            self.session.set_source(source, now_ms);
        }
    }

    fn option_controls(&mut self, ui: &mut egui::Ui, now_ms: f64) {
        let mut changed = false;
        let mut filter_blurred = false;
        {
            let options = self.session.options_mut();

            egui::ComboBox::from_label("Format")
                .selected_text(options.format.as_str())
                .show_ui(ui, |ui| {
                    changed |= ui
                        .selectable_value(&mut options.format, FormatChoice::Auto, "auto")
                        .changed();
                    for format in SourceFormat::ALL {
                        changed |= ui
                            .selectable_value(
                                &mut options.format,
                                FormatChoice::Fixed(format),
                                format.as_str(),
                            )
                            .changed();
                    }
                });

            changed |= ui
                .add(
                    egui::Slider::new(&mut options.node_threshold, 0.0..=100.0)
                        .suffix("%")
                        .text("Node threshold"),
                )
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(&mut options.edge_threshold, 0.0..=100.0)
                        .suffix("%")
                        .text("Edge threshold"),
                )
                .changed();

            egui::ComboBox::from_label("Colormap")
                .selected_text(options.colormap.as_str())
                .show_ui(ui, |ui| {
                    for colormap in Colormap::ALL {
                        changed |= ui
                            .selectable_value(&mut options.colormap, colormap, colormap.as_str())
                            .changed();
                    }
                });

            changed |= ui
                .checkbox(&mut options.strip, "Strip symbol decorations")
                .changed();
            changed |= ui.checkbox(&mut options.wrap, "Wrap long names").changed();
            changed |= ui
                .checkbox(&mut options.color_nodes_by_selftime, "Color by self time")
                .changed();
            changed |= ui
                .checkbox(&mut options.show_samples, "Show sample counts")
                .changed();

            // Text filters commit when the field loses focus, not on
            // every keystroke.
            for (label, field) in [
                ("Root function", &mut options.root),
                ("Leaf function", &mut options.leaf),
                ("Max depth", &mut options.depth),
                ("Skew", &mut options.skew),
                ("Path filter", &mut options.path),
            ] {
                ui.label(label);
                filter_blurred |= ui.text_edit_singleline(field).lost_focus();
            }
        }

        let filters_changed = filter_blurred && *self.session.options() != self.committed_options;
        if changed || filters_changed {
            self.committed_options = self.session.options().clone();
            self.session.options_changed(now_ms);
        }
    }

    fn generate_controls(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, now_ms: f64) {
        let mut auto_update = self.session.auto_update();
        if ui.checkbox(&mut auto_update, "Auto-update").changed() {
            self.session.set_auto_update(auto_update, now_ms);
        }

        // The button only exists in manual mode.
        if !auto_update {
            let busy = self.session.is_generating();
            let label = if busy { "Generating…" } else { "Generate" };
            if ui.add_enabled(!busy, egui::Button::new(label)).clicked() {
                self.generate_manually(ctx);
            }
        }
        ui.small("Ctrl+Enter regenerates");
    }

    fn zoom_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("➕").clicked() {
                self.session.viewport_mut().zoom_in(self.canvas_size);
            }
            if ui.button("➖").clicked() {
                self.session.viewport_mut().zoom_out(self.canvas_size);
            }
            if ui.button("1:1").clicked() {
                self.session.viewport_mut().reset();
            }
            if ui.button("Fit").clicked() {
                self.fit_now();
            }
        });
    }

    fn status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let status = self.session.status();
                let color = match status.kind {
                    StatusKind::Error => egui::Color32::RED,
                    StatusKind::Success => egui::Color32::from_rgb(0x4c, 0xaf, 0x50),
                    StatusKind::Info => ui.visuals().text_color(),
                };
                ui.colored_label(color, &status.message);

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(mounted) = self.session.mounted() {
                        let zoom_pct = self.session.viewport().scale() * 100.0;
                        ui.label(format!(
                            "{:.0}×{:.0} | Zoom: {zoom_pct:.0}%",
                            mounted.width, mounted.height,
                        ));
                    }
                });
            });
        });
    }

    fn canvas(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_rect_before_wrap();
            self.canvas_size = Size::new(f64::from(available.width()), f64::from(available.height()));

            let response = ui.allocate_rect(available, egui::Sense::click_and_drag());
            let local = |pos: egui::Pos2| {
                (
                    f64::from(pos.x - available.left()),
                    f64::from(pos.y - available.top()),
                )
            };

            // Drag = pan. egui has no text hit-testing here; everything
            // on the canvas is a pannable target.
            if response.drag_started_by(egui::PointerButton::Primary) {
                if let Some(pos) = response.interact_pointer_pos() {
                    let (x, y) = local(pos);
                    self.session.viewport_mut().begin_pan(
                        PointerButton::Primary,
                        PointerTarget::Other,
                        x,
                        y,
                    );
                }
            }
            if response.dragged_by(egui::PointerButton::Primary) {
                if let Some(pos) = response.interact_pointer_pos() {
                    let (x, y) = local(pos);
                    self.session.viewport_mut().update_pan(x, y);
                }
            }
            if response.drag_stopped() {
                self.session.viewport_mut().end_pan();
            }

            // Wheel = cursor-anchored zoom.
            if response.hovered() {
                let scroll = ui.input(|i| i.smooth_scroll_delta);
                if scroll.y.abs() > 0.1 {
                    if let Some(pos) = ui.input(|i| i.pointer.hover_pos()) {
                        let factor = if scroll.y > 0.0 {
                            ZOOM_FACTOR
                        } else {
                            1.0 / ZOOM_FACTOR
                        };
                        let (cx, cy) = local(pos);
                        self.session.viewport_mut().zoom_at_point(cx, cy, factor);
                    }
                }
            }

            if response.double_clicked() {
                self.fit_now();
            }

            // A freshly mounted graph owes a fit; now that the canvas is
            // laid out and measurable, flush it.
            if self.session.take_pending_fit() {
                self.fit_now();
            }

            let painter = ui.painter_at(available);
            match self.session.mounted() {
                Some(mounted) => renderer::paint_graph(
                    &painter,
                    available,
                    mounted,
                    self.session.viewport(),
                    self.session.source().map(|s| s.file_name()),
                ),
                None => renderer::paint_placeholder(&painter, available),
            }
        });
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context, now_ms: f64) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let Some(file) = dropped.first() else {
            return;
        };
        if let Some(bytes) = &file.bytes {
            let name = if file.name.is_empty() {
                "profile".to_string()
            } else {
                file.name.clone()
            };
            self.session
                .set_source(InputSource::from_bytes(name, bytes.to_vec()), now_ms);
            return;
        }
        #[cfg(not(target_arch = "wasm32"))]
        if let Some(path) = &file.path {
            match std::fs::read(path) {
                Ok(bytes) => {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| "profile".to_string());
                    self.session
                        .set_source(InputSource::from_bytes(name, bytes), now_ms);
                }
                Err(error) => log::error!("failed to read {}: {error}", path.display()),
            }
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now_ms = ctx.input(|i| i.time) * 1000.0;

        // Settle a completed request delivered by the backend.
        let outcome = {
            let mut slot = self.mailbox.lock().unwrap_or_else(|e| e.into_inner());
            slot.take()
        };
        if let Some(outcome) = outcome {
            self.session.apply_outcome(outcome, now_ms);
        }

        // CLI-provided file: generate once on the first frame.
        if std::mem::take(&mut self.generate_on_start) {
            self.generate_manually(ctx);
        }

        // Fire the debounce deadline if it passed.
        if let Some(request) = self.session.poll(now_ms) {
            self.dispatch(ctx, request);
        }
        // Keep frames coming while a deadline is armed.
        if let Some(deadline) = self.session.scheduler().deadline_ms() {
            let wait = (deadline - now_ms).max(0.0) / 1000.0;
            ctx.request_repaint_after(std::time::Duration::from_secs_f64(wait));
        }

        if ctx.input(|i| i.modifiers.ctrl && i.key_pressed(egui::Key::Enter)) {
            self.generate_manually(ctx);
        }

        self.sidebar(ctx, now_ms);
        self.status_bar(ctx);
        self.canvas(ctx);
        self.handle_dropped_files(ctx, now_ms);
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, AUTO_UPDATE_KEY, &self.session.auto_update());
    }
}
