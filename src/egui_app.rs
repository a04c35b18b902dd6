//! egui front end: orchestration, state and rendering.
pub mod controller;
pub mod state;
pub mod ui;
pub mod view_model;
