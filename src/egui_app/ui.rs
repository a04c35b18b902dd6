//! egui renderer for the analysis window.
mod explanation_panel;
mod input_panel;
mod results_panel;
mod status_bar;
pub mod style;

use std::time::Duration;

use crate::egui_app::controller::EguiController;
use eframe::egui::{self, Frame, Margin, RichText};

/// Smallest window size that keeps the input row on one line.
pub const MIN_VIEWPORT_SIZE: egui::Vec2 = egui::vec2(720.0, 560.0);

const RUNNING_REPAINT_INTERVAL: Duration = Duration::from_millis(50);

/// Renders the egui UI using the shared controller state.
pub struct EguiApp {
    controller: EguiController,
    visuals_set: bool,
}

impl EguiApp {
    pub fn new(controller: EguiController) -> Self {
        Self {
            controller,
            visuals_set: false,
        }
    }

    fn apply_visuals(&mut self, ctx: &egui::Context) {
        if self.visuals_set {
            return;
        }
        let mut visuals = egui::Visuals::dark();
        style::apply_visuals(&mut visuals);
        ctx.set_visuals(visuals);
        self.visuals_set = true;
    }

    fn handle_run_shortcut(&mut self, ctx: &egui::Context) {
        let pressed =
            ctx.input_mut(|i| i.consume_key(egui::Modifiers::COMMAND, egui::Key::Enter));
        if !pressed {
            return;
        }
        if let Err(reason) = self.controller.run_analysis() {
            tracing::debug!("Run shortcut ignored: {reason}");
        }
    }

    fn render_header(&mut self, ctx: &egui::Context) {
        let palette = style::palette();
        egui::TopBottomPanel::top("header")
            .frame(
                Frame::new()
                    .fill(palette.bg_primary)
                    .stroke(style::section_stroke())
                    .inner_margin(Margin::symmetric(12, 8)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("Toxicity analysis").strong().size(18.0));
                    ui.separator();
                    ui.label(
                        RichText::new("Score a French comment and inspect why")
                            .color(palette.text_muted),
                    );
                });
            });
    }

    fn render_body(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(Frame::new().inner_margin(Margin::same(12)))
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("analysis_scroll")
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        self.render_input_panel(ui);
                        ui.add_space(12.0);
                        self.render_results(ui);
                    });
            });
    }
}

impl eframe::App for EguiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_visuals(ctx);
        self.controller.poll_jobs();
        self.handle_run_shortcut(ctx);
        self.render_header(ctx);
        self.render_status(ctx);
        self.render_body(ctx);
        if self.controller.is_running() {
            ctx.request_repaint_after(RUNNING_REPAINT_INTERVAL);
        }
    }
}

fn card_frame() -> Frame {
    Frame::new()
        .fill(style::card_fill())
        .stroke(style::section_stroke())
        .inner_margin(Margin::same(12))
}
