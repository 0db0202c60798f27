//! Geocoder implementations and construction from configuration.

pub mod fixed;
pub mod mapquest;

pub use fixed::StaticGeocoder;
pub use mapquest::MapQuestGeocoder;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use crate::config::{GeocoderConfig, GeocoderProvider};
use crate::traits::Geocoder;

/// Builds the geocoder selected by `config`.
///
/// # Errors
///
/// Returns an error if MapQuest is selected without an API key, or if the
/// static fixture file cannot be loaded.
pub async fn build_geocoder(config: &GeocoderConfig) -> anyhow::Result<Arc<dyn Geocoder>> {
    match config.provider {
        GeocoderProvider::Mapquest => {
            let api_key = config
                .api_key
                .clone()
                .context("a geocoder API key is required for the mapquest provider")?;
            let geocoder =
                MapQuestGeocoder::new(api_key, config.base_url.clone(), config.request_timeout)?;
            info!(base_url = %config.base_url, "using mapquest geocoder");
            Ok(Arc::new(geocoder))
        }
        GeocoderProvider::Static => {
            let geocoder = match &config.fixture_path {
                Some(path) => StaticGeocoder::from_json_file(path).await?,
                None => {
                    warn!("static geocoder has no fixture file; every lookup will miss");
                    StaticGeocoder::new()
                }
            };
            Ok(Arc::new(geocoder))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mapquest_requires_api_key() {
        let config = GeocoderConfig::default();
        let err = build_geocoder(&config).await.err().unwrap();
        assert!(err.to_string().contains("API key"));
    }

    #[tokio::test]
    async fn mapquest_builds_with_api_key() {
        let config = GeocoderConfig {
            api_key: Some("secret".into()),
            ..GeocoderConfig::default()
        };
        assert!(build_geocoder(&config).await.is_ok());
    }

    #[tokio::test]
    async fn static_without_fixture_is_empty() {
        let config = GeocoderConfig {
            provider: GeocoderProvider::Static,
            ..GeocoderConfig::default()
        };
        let geocoder = build_geocoder(&config).await.unwrap();
        assert!(geocoder.geocode("02118").await.unwrap().is_empty());
    }
}
