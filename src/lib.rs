//! Library exports for reuse in benchmarks and tests.
/// Per-user application directories.
pub mod app_dirs;
/// Ranking of token attributions for display.
pub mod attribution;
/// Shared egui UI modules.
pub mod egui_app;
/// HTTP agent construction and bounded response reads.
pub mod http_client;
/// File logging setup.
pub mod logging;
/// Isolated rendering of explanation documents.
pub mod sandbox;
/// Launch configuration.
pub mod settings;
/// Client and contracts of the toxicity service.
pub mod toxicity_api;
