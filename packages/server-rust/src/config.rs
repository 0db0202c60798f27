//! Server-wide configuration types.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::geocode::mapquest::DEFAULT_BASE_URL;
use crate::network::NetworkConfig;

/// Which geocoding backend to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum GeocoderProvider {
    /// MapQuest Geocoding API over HTTPS.
    #[default]
    Mapquest,
    /// Fixed zipcode table loaded from a JSON file.
    Static,
}

/// Geocoder selection and credentials.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub provider: GeocoderProvider,
    /// Required for [`GeocoderProvider::Mapquest`].
    pub api_key: Option<String>,
    pub base_url: String,
    /// Table file for [`GeocoderProvider::Static`]. `None` means an empty table.
    pub fixture_path: Option<PathBuf>,
    pub request_timeout: Duration,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            provider: GeocoderProvider::default(),
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            fixture_path: None,
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Everything the binary needs to assemble a running server.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    pub network: NetworkConfig,
    pub geocoder: GeocoderConfig,
    /// Prometheus scrape listener. Metrics are not exported when `None`.
    pub metrics_addr: Option<SocketAddr>,
}
