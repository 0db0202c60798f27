use serde::{Deserialize, Serialize};

/// An opaque bootcamp document as stored and returned by the API.
///
/// Keys serialize in sorted order.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Name of the identity field the store assigns to every record.
pub const ID_FIELD: &str = "_id";

/// Name of the GeoJSON field the radius query targets.
pub const LOCATION_FIELD: &str = "location";

/// A point on the Earth's surface in GeoJSON axis order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Degrees east of the prime meridian.
    pub longitude: f64,
    /// Degrees north of the equator.
    pub latitude: f64,
}

impl GeoPoint {
    #[must_use]
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Returns the `[longitude, latitude]` pair used by GeoJSON and `$centerSphere`.
    #[must_use]
    pub fn to_coordinates(self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

/// A single geocoder match for a free-form address or zipcode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub formatted_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub state_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub zipcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub country_code: Option<String>,
}

impl GeoLocation {
    /// Builds a location carrying only coordinates.
    #[must_use]
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            formatted_address: None,
            city: None,
            state_code: None,
            zipcode: None,
            country_code: None,
        }
    }

    #[must_use]
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.longitude, self.latitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_coordinates_are_longitude_first() {
        let p = GeoPoint::new(-71.1, 42.3);
        assert_eq!(p.to_coordinates(), [-71.1, 42.3]);
    }

    #[test]
    fn location_point_swaps_to_geojson_order() {
        let loc = GeoLocation::at(42.3, -71.1);
        assert_eq!(loc.point(), GeoPoint::new(-71.1, 42.3));
    }

    #[test]
    fn location_omits_absent_fields() {
        let json = serde_json::to_value(GeoLocation::at(1.0, 2.0)).unwrap();
        assert_eq!(json, serde_json::json!({ "latitude": 1.0, "longitude": 2.0 }));
    }

    #[test]
    fn location_reads_camel_case() {
        let loc: GeoLocation = serde_json::from_value(serde_json::json!({
            "latitude": 1.0,
            "longitude": 2.0,
            "stateCode": "MA",
            "zipcode": "02118"
        }))
        .unwrap();
        assert_eq!(loc.state_code.as_deref(), Some("MA"));
        assert_eq!(loc.zipcode.as_deref(), Some("02118"));
    }
}
