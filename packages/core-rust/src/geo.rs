//! Spherical geometry for radius queries.
//!
//! Distances are expressed in miles and converted to an angular radius
//! (radians on a unit sphere) by dividing by the Earth's equatorial radius.

use serde_json::{json, Value};

use crate::types::{Document, GeoPoint};

/// Earth radius in miles used for distance to angle conversion.
pub const EARTH_RADIUS_MILES: f64 = 3963.0;

/// Converts a surface distance in miles to an angular radius in radians.
#[must_use]
pub fn angular_radius(distance_miles: f64) -> f64 {
    distance_miles / EARTH_RADIUS_MILES
}

/// Great-circle central angle between two points, in radians (haversine).
#[must_use]
pub fn central_angle(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lat2) = (a.latitude.to_radians(), b.latitude.to_radians());
    let d_lat = lat2 - lat1;
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin()
}

/// Returns `true` when `point` lies inside the spherical cap centred on
/// `center` with the given angular radius.
#[must_use]
pub fn within_sphere(center: GeoPoint, radius: f64, point: GeoPoint) -> bool {
    central_angle(center, point) <= radius
}

/// Builds `{field: {$geoWithin: {$centerSphere: [[lng, lat], radius]}}}`.
#[must_use]
pub fn center_sphere_predicate(field: &str, center: GeoPoint, radius: f64) -> Document {
    let mut predicate = Document::new();
    predicate.insert(
        field.to_string(),
        json!({ "$geoWithin": { "$centerSphere": [center.to_coordinates(), radius] } }),
    );
    predicate
}

/// Reads a point from a GeoJSON `Point` object or a bare `[lng, lat]` pair.
#[must_use]
pub fn point_from_json(value: &Value) -> Option<GeoPoint> {
    let coordinates = match value {
        Value::Object(obj) => obj.get("coordinates")?,
        other => other,
    };
    match coordinates.as_array()?.as_slice() {
        [lng, lat, ..] => Some(GeoPoint::new(lng.as_f64()?, lat.as_f64()?)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOSTON: GeoPoint = GeoPoint {
        longitude: -71.0589,
        latitude: 42.3601,
    };
    const PROVIDENCE: GeoPoint = GeoPoint {
        longitude: -71.4128,
        latitude: 41.8240,
    };

    #[test]
    fn angular_radius_divides_by_earth_radius() {
        assert!((angular_radius(3963.0) - 1.0).abs() < f64::EPSILON);
        assert!((angular_radius(100.0) - 100.0 / 3963.0).abs() < f64::EPSILON);
        assert!(angular_radius(0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn central_angle_of_same_point_is_zero() {
        assert!(central_angle(BOSTON, BOSTON).abs() < 1e-12);
    }

    #[test]
    fn boston_to_providence_is_about_41_miles() {
        let miles = central_angle(BOSTON, PROVIDENCE) * EARTH_RADIUS_MILES;
        assert!((miles - 41.0).abs() < 2.0, "got {miles}");
    }

    #[test]
    fn within_sphere_respects_radius() {
        assert!(within_sphere(BOSTON, angular_radius(50.0), PROVIDENCE));
        assert!(!within_sphere(BOSTON, angular_radius(30.0), PROVIDENCE));
    }

    #[test]
    fn predicate_uses_longitude_latitude_order() {
        let predicate = center_sphere_predicate("location", BOSTON, 0.5);
        assert_eq!(
            Value::Object(predicate),
            json!({"location": {"$geoWithin": {"$centerSphere": [[-71.0589, 42.3601], 0.5]}}})
        );
    }

    #[test]
    fn point_from_geojson_and_pair() {
        let geojson = json!({"type": "Point", "coordinates": [-71.0, 42.0]});
        assert_eq!(point_from_json(&geojson), Some(GeoPoint::new(-71.0, 42.0)));
        assert_eq!(point_from_json(&json!([1.5, 2.5])), Some(GeoPoint::new(1.5, 2.5)));
        assert_eq!(point_from_json(&json!({"type": "Point"})), None);
        assert_eq!(point_from_json(&json!(["a", 1.0])), None);
        assert_eq!(point_from_json(&json!([1.0])), None);
    }
}
