//! Entry point for the egui-based toxicity analysis UI.
#![cfg_attr(
    all(not(debug_assertions), target_os = "windows"),
    windows_subsystem = "windows"
)]
use std::sync::Arc;

use eframe::egui;
use toxilens::egui_app::controller::EguiController;
use toxilens::egui_app::ui::{EguiApp, MIN_VIEWPORT_SIZE};
use toxilens::logging;
use toxilens::settings::{self, Settings, SettingsError};
use toxilens::toxicity_api::HttpToxicityService;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(err) = logging::init() {
        eprintln!("File logging disabled: {err}");
        if let Err(err) = logging::init_stdout_only() {
            eprintln!("Logging disabled: {err}");
        }
    }

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size(egui::vec2(960.0, 720.0))
        .with_min_inner_size(MIN_VIEWPORT_SIZE);
    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let launch = build_controller();
    eframe::run_native(
        "Toxilens",
        native_options,
        Box::new(move |_cc| match launch {
            Ok(controller) => Ok(Box::new(EguiApp::new(controller))),
            Err(err) => Ok(Box::new(LaunchError {
                message: err.to_string(),
            })),
        }),
    )?;
    Ok(())
}

fn build_controller() -> Result<EguiController, SettingsError> {
    let settings: Settings = settings::load_or_default()?;
    let api_base = settings::api_base(&settings)?;
    tracing::info!(%api_base, "Using toxicity service");
    let service = HttpToxicityService::new(api_base.clone(), settings.service_options());
    Ok(EguiController::new(Arc::new(service), &settings, api_base))
}

/// Shown instead of the main window when configuration cannot be loaded.
struct LaunchError {
    message: String,
}

impl eframe::App for LaunchError {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Failed to start UI");
                ui.label(&self.message);
            });
        });
    }
}
