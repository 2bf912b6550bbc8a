mod app;
mod commands;
mod config;
mod effects;
pub(crate) mod logging;
mod ui;

pub use app::run_app;
