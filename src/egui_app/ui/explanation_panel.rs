use eframe::egui::{self, Align, Color32, Frame, Layout, Margin, RichText};

use super::{EguiApp, card_frame, style};
use crate::attribution::MAX_RANKED_ATTRIBUTIONS;
use crate::egui_app::view_model::{ExplanationPanel, ScoreBand, chip_label, chip_tooltip};
use crate::toxicity_api::TokenAttribution;

impl EguiApp {
    pub(super) fn render_explanation(&mut self, ui: &mut egui::Ui) {
        let palette = style::palette();
        let header_tag = self.controller.ui.input.method.header_tag();
        let mut open_viewer = false;

        card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(RichText::new("Explanation").strong());
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    ui.label(RichText::new(header_tag).color(palette.text_muted));
                });
            });
            ui.add_space(6.0);
            match self.controller.explanation_panel() {
                ExplanationPanel::Prompt => {
                    ui.label(
                        RichText::new("Pick LIME, SHAP or IG and run the analysis again.")
                            .color(palette.text_muted),
                    );
                }
                ExplanationPanel::Pending => {
                    ui.horizontal(|ui| {
                        ui.add(egui::Spinner::new().size(14.0));
                        ui.label(RichText::new("Computing explanation…").color(palette.text_muted));
                    });
                }
                ExplanationPanel::Markup { html, .. } => {
                    open_viewer = render_markup(ui, html);
                }
                ExplanationPanel::Attributions(ranked) => render_chips(ui, ranked),
                ExplanationPanel::Blank => {}
            }
        });

        if open_viewer {
            self.controller.open_explanation_viewer();
        }
    }
}

/// Returns true when the sandboxed viewer was requested.
fn render_markup(ui: &mut egui::Ui, html: &str) -> bool {
    let palette = style::palette();
    ui.label(
        RichText::new("The interactive explanation runs its own scripts and opens in a sandboxed viewer.")
            .color(palette.text_muted),
    );
    ui.add_space(4.0);
    let open = ui.button("Open in sandboxed viewer").clicked();
    ui.add_space(4.0);
    egui::CollapsingHeader::new("Markup source")
        .id_salt("markup_source")
        .default_open(false)
        .show(ui, |ui| {
            let mut source = html;
            egui::ScrollArea::vertical()
                .id_salt("markup_source_scroll")
                .max_height(240.0)
                .show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut source)
                            .code_editor()
                            .desired_width(f32::INFINITY),
                    );
                });
        });
    open
}

fn render_chips(ui: &mut egui::Ui, ranked: &[TokenAttribution]) {
    ui.label(
        RichText::new(format!("Top {MAX_RANKED_ATTRIBUTIONS} contributing tokens"))
            .color(style::palette().text_muted),
    );
    ui.add_space(4.0);
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing = egui::vec2(6.0, 6.0);
        for attribution in ranked {
            let fill = style::band_fill(ScoreBand::for_score(attribution.score));
            Frame::new()
                .fill(fill)
                .inner_margin(Margin::symmetric(6, 2))
                .show(ui, |ui| {
                    ui.label(RichText::new(chip_label(attribution)).color(Color32::WHITE));
                })
                .response
                .on_hover_text(chip_tooltip(attribution));
        }
    });
}
