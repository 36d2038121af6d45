//! LabReserva Server
//!
//! REST JSON API for reserving laboratory equipment: users file requests,
//! technicians and administrators review them, and approval reserves the
//! equipment for the requested window.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod repository;
pub mod services;
pub mod ui;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
