use crate::egui_app::view_model::{Classification, ScoreBand};
use eframe::egui::{
    Color32, Stroke, Visuals,
    epaint::{CornerRadius, Shadow},
    style::WidgetVisuals,
};

#[derive(Clone, Copy)]
pub struct Palette {
    pub bg_primary: Color32,
    pub bg_secondary: Color32,
    pub bg_tertiary: Color32,
    pub panel_outline: Color32,
    pub grid_soft: Color32,
    pub text_primary: Color32,
    pub text_muted: Color32,
    pub accent_ice: Color32,
    pub warning: Color32,
    pub success: Color32,
    pub danger: Color32,
}

pub fn palette() -> Palette {
    Palette {
        bg_primary: Color32::from_rgb(10, 10, 12),
        bg_secondary: Color32::from_rgb(26, 28, 30),
        bg_tertiary: Color32::from_rgb(42, 44, 48),
        panel_outline: Color32::from_rgb(38, 42, 48),
        grid_soft: Color32::from_rgb(30, 32, 36),
        text_primary: Color32::from_rgb(185, 192, 200),
        text_muted: Color32::from_rgb(140, 146, 155),
        accent_ice: Color32::from_rgb(167, 217, 255),
        warning: Color32::from_rgb(214, 168, 84),
        success: Color32::from_rgb(102, 176, 136),
        danger: Color32::from_rgb(214, 96, 96),
    }
}

pub fn apply_visuals(visuals: &mut Visuals) {
    let palette = palette();
    visuals.window_fill = palette.bg_primary;
    visuals.panel_fill = palette.bg_secondary;
    visuals.override_text_color = Some(palette.text_primary);
    visuals.hyperlink_color = palette.accent_ice;
    visuals.extreme_bg_color = palette.bg_primary;
    visuals.faint_bg_color = palette.bg_secondary;
    visuals.error_fg_color = palette.danger;
    visuals.warn_fg_color = palette.warning;
    visuals.selection.bg_fill = palette.grid_soft;
    visuals.selection.stroke = Stroke::new(1.0, palette.accent_ice);
    visuals.widgets.noninteractive.bg_fill = palette.bg_secondary;
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, palette.text_primary);
    set_rectilinear(&mut visuals.widgets.inactive, palette);
    set_rectilinear(&mut visuals.widgets.hovered, palette);
    set_rectilinear(&mut visuals.widgets.active, palette);
    set_rectilinear(&mut visuals.widgets.open, palette);
    visuals.window_corner_radius = CornerRadius::ZERO;
    visuals.menu_corner_radius = CornerRadius::ZERO;
    visuals.popup_shadow = Shadow::NONE;
    visuals.button_frame = true;
}

fn set_rectilinear(vis: &mut WidgetVisuals, palette: Palette) {
    vis.corner_radius = CornerRadius::ZERO;
    vis.bg_fill = palette.bg_tertiary;
    vis.weak_bg_fill = palette.grid_soft;
    vis.bg_stroke = Stroke::new(1.0, palette.panel_outline);
    vis.fg_stroke = Stroke::new(1.0, palette.text_primary);
}

pub fn section_stroke() -> Stroke {
    Stroke::new(1.0, palette().panel_outline)
}

pub fn card_fill() -> Color32 {
    palette().bg_primary
}

/// Tone of the footer status badge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusTone {
    Idle,
    Busy,
    Info,
    Warning,
    Error,
}

pub fn status_badge(tone: StatusTone) -> (&'static str, Color32) {
    let palette = palette();
    match tone {
        StatusTone::Idle => ("Idle", palette.bg_tertiary),
        StatusTone::Busy => ("Working", palette.accent_ice),
        StatusTone::Info => ("Info", palette.success),
        StatusTone::Warning => ("Warning", palette.warning),
        StatusTone::Error => ("Error", palette.danger),
    }
}

pub fn classification_color(classification: Classification) -> Color32 {
    let palette = palette();
    match classification {
        Classification::Toxic => palette.danger,
        Classification::NonToxic => palette.success,
    }
}

/// Chip background for an attribution score band.
pub fn band_fill(band: ScoreBand) -> Color32 {
    match band {
        ScoreBand::High => Color32::from_rgb(120, 40, 40),
        ScoreBand::Mid => Color32::from_rgb(110, 84, 36),
        ScoreBand::Low => Color32::from_rgb(36, 72, 56),
    }
}

pub fn alert_fill() -> Color32 {
    Color32::from_rgb(60, 24, 24)
}
