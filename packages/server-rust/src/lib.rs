//! Bootcamp Server: REST API over a document store with geospatial radius search.

pub mod config;
pub mod error;
pub mod geocode;
pub mod network;
pub mod service;
pub mod storage;
pub mod traits;

pub use config::{GeocoderConfig, GeocoderProvider, ServerConfig};
pub use error::{ApiError, GeocodeError, StoreError};
pub use network::{build_router, AppState, NetworkModule};
pub use traits::{BootcampStore, Geocoder};
