//! Availability and booking engine for Hustle shops, plus the axum host that
//! serves it to the mobile and web clients.

pub mod auth;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod startup;
pub mod store;

use std::sync::Arc;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use handlers::MetricsState;

use clock::Clock;
use store::{BookingStore, ShopDirectory};

#[derive(Clone)]
pub struct AppState {
    pub bookings: Arc<dyn BookingStore>,
    pub directory: Arc<dyn ShopDirectory>,
    pub clock: Arc<dyn Clock>,
    pub config: AppConfig,
    pub metrics: Arc<MetricsState>,
}
