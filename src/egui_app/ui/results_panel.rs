use eframe::egui::{self, Align, Layout, RichText};

use super::{EguiApp, card_frame, style};
use crate::egui_app::view_model::{bar_fraction, format_percent, label_caption};

impl EguiApp {
    /// Score card followed by the explanation card; nothing before a prediction exists.
    pub(super) fn render_results(&mut self, ui: &mut egui::Ui) {
        let Some(prediction) = self.controller.ui.run.prediction.clone() else {
            return;
        };
        let view = self.controller.analysis_view();
        let palette = style::palette();
        let verdict_color = style::classification_color(view.classification);

        card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(RichText::new("Result").strong());
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    ui.label(
                        RichText::new(prediction.model.display_name()).color(palette.text_muted),
                    );
                });
            });
            ui.horizontal(|ui| {
                ui.label(RichText::new("Toxicity").color(palette.text_muted));
                ui.label(
                    RichText::new(format_percent(prediction.toxic_score))
                        .size(28.0)
                        .color(verdict_color),
                );
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    ui.label(
                        RichText::new(view.classification.display_name())
                            .strong()
                            .color(verdict_color),
                    );
                });
            });
            ui.add(
                egui::ProgressBar::new(bar_fraction(view.toxic_probability))
                    .fill(verdict_color)
                    .desired_height(8.0),
            );
            ui.add_space(6.0);
            for prob in &prediction.probs {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(label_caption(prob.label)).color(palette.text_muted));
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format_percent(prob.score));
                    });
                });
            }
        });
        ui.add_space(12.0);
        self.render_explanation(ui);
    }
}
