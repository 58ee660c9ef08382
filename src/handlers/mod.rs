pub mod availability_handler;
pub mod bookings_handler;
pub mod health;
pub mod metrics;
pub mod owner_handler;

pub use health::health_check;
pub use metrics::{detached_metrics_state, metrics_handler, setup_metrics_recorder, MetricsState};
