//! Table-driven geocoder for development and tests.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use bootcamp_core::GeoLocation;
use tracing::info;

use crate::error::GeocodeError;
use crate::traits::Geocoder;

/// [`Geocoder`] that answers from a fixed zipcode table.
///
/// Unknown queries resolve to zero locations, never an error.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    table: HashMap<String, Vec<GeoLocation>>,
}

impl StaticGeocoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a match for `query`. Repeated calls append further matches.
    #[must_use]
    pub fn with_entry(mut self, query: impl Into<String>, location: GeoLocation) -> Self {
        self.table.entry(query.into()).or_default().push(location);
        self
    }

    /// Loads a table from a JSON object mapping each query to a location
    /// or a list of locations:
    ///
    /// ```json
    /// { "02118": { "latitude": 42.33, "longitude": -71.07, "city": "Boston" } }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid table.
    pub async fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read geocoder fixture {}", path.display()))?;
        let entries: HashMap<String, FixtureEntry> = serde_json::from_slice(&raw)
            .with_context(|| format!("invalid geocoder fixture {}", path.display()))?;

        let table: HashMap<String, Vec<GeoLocation>> = entries
            .into_iter()
            .map(|(query, entry)| (query, entry.into_locations()))
            .collect();
        info!(entries = table.len(), path = %path.display(), "static geocoder table loaded");
        Ok(Self { table })
    }
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum FixtureEntry {
    One(GeoLocation),
    Many(Vec<GeoLocation>),
}

impl FixtureEntry {
    fn into_locations(self) -> Vec<GeoLocation> {
        match self {
            Self::One(location) => vec![location],
            Self::Many(locations) => locations,
        }
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, query: &str) -> Result<Vec<GeoLocation>, GeocodeError> {
        Ok(self.table.get(query.trim()).cloned().unwrap_or_default())
    }
}
