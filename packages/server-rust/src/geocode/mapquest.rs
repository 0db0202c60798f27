//! MapQuest Geocoding API client.
//!
//! Calls `GET {base}/geocoding/v1/address?key=...&location=...` and flattens
//! every `results[].locations[]` entry into a [`GeoLocation`].

use std::time::Duration;

use async_trait::async_trait;
use bootcamp_core::GeoLocation;
use serde::Deserialize;
use tracing::debug;

use crate::error::GeocodeError;
use crate::traits::Geocoder;

/// Public MapQuest API host.
pub const DEFAULT_BASE_URL: &str = "https://www.mapquestapi.com";

/// [`Geocoder`] backed by the MapQuest HTTP API.
pub struct MapQuestGeocoder {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl MapQuestGeocoder {
    /// Creates a client with the given API key, base URL, and request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/geocoding/v1/address",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl Geocoder for MapQuestGeocoder {
    async fn geocode(&self, query: &str) -> Result<Vec<GeoLocation>, GeocodeError> {
        let response: MapQuestResponse = self
            .client
            .get(self.endpoint())
            .query(&[("key", self.api_key.as_str()), ("location", query)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let locations = response.into_locations()?;
        debug!(query = %query, matches = locations.len(), "mapquest geocode");
        Ok(locations)
    }
}

#[derive(Debug, Deserialize)]
struct MapQuestResponse {
    info: MapQuestInfo,
    #[serde(default)]
    results: Vec<MapQuestResult>,
}

#[derive(Debug, Deserialize)]
struct MapQuestInfo {
    statuscode: i64,
    #[serde(default)]
    messages: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MapQuestResult {
    #[serde(default)]
    locations: Vec<MapQuestLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapQuestLocation {
    lat_lng: LatLng,
    #[serde(default)]
    street: Option<String>,
    #[serde(default, rename = "adminArea5")]
    city: Option<String>,
    #[serde(default, rename = "adminArea3")]
    state: Option<String>,
    #[serde(default, rename = "adminArea1")]
    country: Option<String>,
    #[serde(default)]
    postal_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl MapQuestResponse {
    fn into_locations(self) -> Result<Vec<GeoLocation>, GeocodeError> {
        if self.info.statuscode != 0 {
            let detail = if self.info.messages.is_empty() {
                format!("status code {}", self.info.statuscode)
            } else {
                self.info.messages.join("; ")
            };
            return Err(GeocodeError::Provider(detail));
        }

        Ok(self
            .results
            .into_iter()
            .flat_map(|result| result.locations)
            .map(MapQuestLocation::into_location)
            .collect())
    }
}

impl MapQuestLocation {
    fn into_location(self) -> GeoLocation {
        let formatted_address = format_address(&[
            self.street.as_deref(),
            self.city.as_deref(),
            self.state.as_deref(),
            self.postal_code.as_deref(),
            self.country.as_deref(),
        ]);
        GeoLocation {
            latitude: self.lat_lng.lat,
            longitude: self.lat_lng.lng,
            formatted_address,
            city: non_empty(self.city),
            state_code: non_empty(self.state),
            zipcode: non_empty(self.postal_code),
            country_code: non_empty(self.country),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn format_address(parts: &[Option<&str>]) -> Option<String> {
    let joined = parts
        .iter()
        .flatten()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    (!joined.is_empty()).then_some(joined)
}
