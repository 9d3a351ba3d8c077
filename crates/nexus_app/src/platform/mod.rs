//! Terminal front end: operator commands in, console lines out.
mod app;
mod commands;
mod config;
mod effects;
mod render;
mod seed;

pub use app::run_app;
