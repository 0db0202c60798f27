//! HTTP handlers and the shared state they extract.

pub mod bootcamps;
pub mod health;

pub use bootcamps::{
    bootcamps_in_radius, create_bootcamp, delete_bootcamp, get_bootcamp, list_bootcamps,
    update_bootcamp,
};
pub use health::{health_handler, liveness_handler, readiness_handler};

use std::sync::Arc;
use std::time::Instant;

use super::{NetworkConfig, ShutdownController};
use crate::traits::{BootcampStore, Geocoder};

/// State handed to every handler through `State` extraction.
///
/// Every field is behind an `Arc`, so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BootcampStore>,
    pub geocoder: Arc<dyn Geocoder>,
    pub shutdown: Arc<ShutdownController>,
    pub config: Arc<NetworkConfig>,
    /// Used for the uptime reported by `/health`.
    pub start_time: Instant,
}

impl AppState {
    /// State with a fresh shutdown controller.
    #[must_use]
    pub fn new(
        store: Arc<dyn BootcampStore>,
        geocoder: Arc<dyn Geocoder>,
        config: NetworkConfig,
    ) -> Self {
        Self {
            store,
            geocoder,
            shutdown: Arc::new(ShutdownController::new()),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }
}
