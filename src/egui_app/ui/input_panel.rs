use eframe::egui::{self, Frame, Margin, RichText, Stroke};

use super::EguiApp;
use super::style;
use crate::toxicity_api::{ExplainMethod, ModelName};

impl EguiApp {
    pub(super) fn render_input_panel(&mut self, ui: &mut egui::Ui) {
        let palette = style::palette();
        let running = self.controller.is_running();
        let can_run = self.controller.can_run();

        ui.label(RichText::new("Text").color(palette.text_muted));
        ui.add(
            egui::TextEdit::multiline(&mut self.controller.ui.input.text)
                .hint_text("Type or paste a comment…")
                .desired_width(f32::INFINITY)
                .desired_rows(6),
        );
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            ui.label(RichText::new("Model").color(palette.text_muted));
            render_model_combo(ui, &mut self.controller.ui.input.model);
            ui.add_space(12.0);
            ui.label(RichText::new("Explanation").color(palette.text_muted));
            render_method_combo(ui, &mut self.controller.ui.input.method);
            ui.add_space(12.0);

            let analyze = ui
                .add_enabled(can_run, egui::Button::new("Analyze"))
                .on_hover_text("Ctrl+Enter");
            if analyze.clicked() {
                if let Err(reason) = self.controller.run_analysis() {
                    tracing::debug!("Analyze ignored: {reason}");
                }
            }
            if running {
                let restart = ui
                    .button("Restart")
                    .on_hover_text("Start over with the current input; the pending run is ignored");
                if restart.clicked() {
                    if let Err(reason) = self.controller.restart_analysis() {
                        tracing::debug!("Restart ignored: {reason}");
                    }
                }
                ui.add(egui::Spinner::new().size(16.0));
                ui.label(RichText::new("Analyzing…").color(palette.text_muted));
            }
        });

        if let Some(error) = &self.controller.ui.run.error {
            ui.add_space(8.0);
            Frame::new()
                .fill(style::alert_fill())
                .stroke(Stroke::new(1.0, palette.danger))
                .inner_margin(Margin::symmetric(10, 6))
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.label(RichText::new(error).color(palette.danger));
                });
        }
    }
}

fn render_model_combo(ui: &mut egui::Ui, model: &mut ModelName) {
    egui::ComboBox::from_id_salt("model_combo")
        .width(160.0)
        .selected_text(model.display_name())
        .show_ui(ui, |ui| {
            for option in ModelName::ALL {
                ui.selectable_value(model, option, option.display_name());
            }
        });
}

fn render_method_combo(ui: &mut egui::Ui, method: &mut ExplainMethod) {
    egui::ComboBox::from_id_salt("method_combo")
        .width(200.0)
        .selected_text(method.display_name())
        .show_ui(ui, |ui| {
            for option in ExplainMethod::ALL {
                ui.selectable_value(method, option, option.display_name());
            }
        });
}
