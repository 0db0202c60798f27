//! Bootcamp operations.
//!
//! Each operation is a pure async function over the request data and the
//! collaborators, returning the success [`Envelope`] or an [`ApiError`].
//! Nothing here touches HTTP; the handlers adapt these to axum.

use bootcamp_core::geo::{angular_radius, center_sphere_predicate};
use bootcamp_core::{translate_query, Document, Envelope, LOCATION_FIELD};
use tracing::debug;

use crate::error::ApiError;
use crate::traits::{BootcampStore, Geocoder};

pub const CREATED_MSG: &str = "Bootcamp Created";
pub const UPDATED_MSG: &str = "Bootcamp Updated";
pub const DELETED_MSG: &str = "Bootcamp Deleted";

/// Lists every bootcamp matching the bracket-notation query pairs.
///
/// # Errors
///
/// [`ApiError::MalformedQuery`] if the pairs cannot be translated, or an
/// upstream store failure.
pub async fn list<K, V>(store: &dyn BootcampStore, pairs: &[(K, V)]) -> Result<Envelope, ApiError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let predicate = translate_query(pairs)?;
    let records = store.find(&predicate).await?;
    Ok(Envelope::list(records))
}

/// Fetches a single bootcamp.
///
/// # Errors
///
/// [`ApiError::NotFound`] if no record has this id.
pub async fn get(store: &dyn BootcampStore, id: &str) -> Result<Envelope, ApiError> {
    match store.find_by_id(id).await? {
        Some(record) => Ok(Envelope::record(record)),
        None => Err(ApiError::not_found(id)),
    }
}

/// Creates a bootcamp. The store assigns the id.
///
/// # Errors
///
/// [`ApiError::Validation`] if the payload violates the collection schema.
pub async fn create(store: &dyn BootcampStore, payload: Document) -> Result<Envelope, ApiError> {
    let record = store.insert(payload).await?;
    Ok(Envelope::record_with_message(record, CREATED_MSG))
}

/// Merges `patch` into an existing bootcamp.
///
/// # Errors
///
/// [`ApiError::NotFound`] if no record has this id, or
/// [`ApiError::Validation`] if the merged record is invalid.
pub async fn update(
    store: &dyn BootcampStore,
    id: &str,
    patch: Document,
) -> Result<Envelope, ApiError> {
    match store.update_by_id(id, patch).await? {
        Some(record) => Ok(Envelope::record_with_message(record, UPDATED_MSG)),
        None => Err(ApiError::not_found(id)),
    }
}

/// Deletes a bootcamp.
///
/// # Errors
///
/// [`ApiError::NotFound`] if no record has this id.
pub async fn delete(store: &dyn BootcampStore, id: &str) -> Result<Envelope, ApiError> {
    match store.delete_by_id(id).await? {
        Some(_) => Ok(Envelope::message(DELETED_MSG)),
        None => Err(ApiError::not_found(id)),
    }
}

/// Lists bootcamps within `distance` miles of the first geocoder match for
/// `zipcode`.
///
/// # Errors
///
/// [`ApiError::MalformedQuery`] if `distance` is not a non-negative number,
/// [`ApiError::GeocodeNotFound`] if the zipcode resolves to nothing, or an
/// upstream geocoder or store failure.
pub async fn within_radius(
    store: &dyn BootcampStore,
    geocoder: &dyn Geocoder,
    zipcode: &str,
    distance: &str,
) -> Result<Envelope, ApiError> {
    let distance = parse_distance(distance)?;

    let locations = geocoder.geocode(zipcode).await?;
    let Some(origin) = locations.first() else {
        return Err(ApiError::GeocodeNotFound {
            zipcode: zipcode.to_string(),
        });
    };

    let radius = angular_radius(distance);
    debug!(
        zipcode = %zipcode,
        latitude = origin.latitude,
        longitude = origin.longitude,
        radius,
        "radius search"
    );

    let predicate = center_sphere_predicate(LOCATION_FIELD, origin.point(), radius);
    let records = store.find(&predicate).await?;
    Ok(Envelope::list(records))
}

fn parse_distance(raw: &str) -> Result<f64, ApiError> {
    match raw.trim().parse::<f64>() {
        Ok(distance) if distance.is_finite() && distance >= 0.0 => Ok(distance),
        _ => Err(ApiError::MalformedQuery(format!(
            "distance must be a non-negative number, got `{raw}`"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use bootcamp_core::{EnvelopeData, GeoLocation};
    use parking_lot::Mutex;
    use serde_json::{json, Value};

    use super::*;
    use crate::error::{GeocodeError, StoreError};
    use crate::geocode::StaticGeocoder;
    use crate::storage::DocumentStore;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    /// Records every predicate passed to `find` and returns no rows.
    #[derive(Default)]
    struct RecordingStore {
        predicates: Mutex<Vec<Document>>,
    }

    #[async_trait]
    impl BootcampStore for RecordingStore {
        async fn find(&self, predicate: &Document) -> Result<Vec<Document>, StoreError> {
            self.predicates.lock().push(predicate.clone());
            Ok(Vec::new())
        }

        async fn find_by_id(&self, _id: &str) -> Result<Option<Document>, StoreError> {
            Ok(None)
        }

        async fn insert(&self, payload: Document) -> Result<Document, StoreError> {
            Ok(payload)
        }

        async fn update_by_id(
            &self,
            _id: &str,
            _patch: Document,
        ) -> Result<Option<Document>, StoreError> {
            Ok(None)
        }

        async fn delete_by_id(&self, _id: &str) -> Result<Option<Document>, StoreError> {
            Ok(None)
        }
    }

    struct FailingGeocoder;

    #[async_trait]
    impl Geocoder for FailingGeocoder {
        async fn geocode(&self, _query: &str) -> Result<Vec<GeoLocation>, GeocodeError> {
            Err(GeocodeError::Provider("quota exceeded".into()))
        }
    }

    fn boston() -> StaticGeocoder {
        StaticGeocoder::new()
            .with_entry("02118", GeoLocation::at(42.336, -71.072))
            .with_entry("02118", GeoLocation::at(0.0, 0.0))
    }

    #[tokio::test]
    async fn list_passes_translated_predicate_to_store() {
        let store = RecordingStore::default();
        let pairs = [("averageCost[lte]", "10000"), ("careers[in]", "Business")];

        let envelope = list(&store, &pairs).await.unwrap();
        assert_eq!(envelope.count, Some(0));

        let recorded = store.predicates.lock();
        assert_eq!(
            Value::Object(recorded[0].clone()),
            json!({"averageCost": {"$lte": "10000"}, "careers": {"$in": "Business"}})
        );
    }

    #[tokio::test]
    async fn list_with_no_pairs_uses_empty_predicate() {
        let store = RecordingStore::default();
        let pairs: [(&str, &str); 0] = [];
        list(&store, &pairs).await.unwrap();
        assert!(store.predicates.lock()[0].is_empty());
    }

    #[tokio::test]
    async fn list_rejects_conflicting_pairs() {
        let store = RecordingStore::default();
        let pairs = [("a", "1"), ("a[gt]", "2")];
        let err = list(&store, &pairs).await.unwrap_err();
        assert!(matches!(err, ApiError::MalformedQuery(_)));
        assert!(store.predicates.lock().is_empty());
    }

    #[tokio::test]
    async fn missing_id_is_not_found_for_get_update_delete() {
        let store = RecordingStore::default();
        for err in [
            get(&store, "abc").await.unwrap_err(),
            update(&store, "abc", Document::new()).await.unwrap_err(),
            delete(&store, "abc").await.unwrap_err(),
        ] {
            assert!(matches!(err, ApiError::NotFound { ref id } if id == "abc"));
        }
    }

    fn first_record(envelope: &Envelope) -> Document {
        match &envelope.data {
            Some(EnvelopeData::One(doc)) => doc.clone(),
            Some(EnvelopeData::Many(docs)) => docs[0].clone(),
            None => panic!("envelope carries no data"),
        }
    }

    #[tokio::test]
    async fn crud_against_document_store() {
        let store = DocumentStore::bootcamps();
        let created = create(&store, doc(json!({"name": "A", "description": "d", "city": "X"})))
            .await
            .unwrap();
        assert_eq!(created.msg.as_deref(), Some(CREATED_MSG));
        let id = first_record(&created)["_id"].as_str().unwrap().to_string();

        let updated = update(&store, &id, doc(json!({"city": "Y"}))).await.unwrap();
        let record = first_record(&updated);
        assert_eq!(record["name"], "A");
        assert_eq!(record["city"], "Y");
        assert_eq!(updated.msg.as_deref(), Some(UPDATED_MSG));

        let fetched = get(&store, &id).await.unwrap();
        assert_eq!(first_record(&fetched), record);

        let deleted = delete(&store, &id).await.unwrap();
        assert_eq!(deleted.msg.as_deref(), Some(DELETED_MSG));
        assert!(deleted.data.is_none());
        assert!(matches!(get(&store, &id).await, Err(ApiError::NotFound { .. })));
    }

    #[tokio::test]
    async fn radius_uses_first_match_in_lng_lat_order() {
        let store = RecordingStore::default();
        within_radius(&store, &boston(), "02118", "10").await.unwrap();

        let recorded = store.predicates.lock();
        assert_eq!(
            Value::Object(recorded[0].clone()),
            json!({"location": {"$geoWithin": {"$centerSphere": [[-71.072, 42.336], 10.0 / 3963.0]}}})
        );
    }

    proptest::proptest! {
        #[test]
        fn radius_is_distance_over_earth_radius(distance in 0.0f64..25_000.0) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let store = RecordingStore::default();
            runtime
                .block_on(within_radius(&store, &boston(), "02118", &distance.to_string()))
                .unwrap();

            let recorded = store.predicates.lock();
            let sphere = &recorded[0]["location"]["$geoWithin"]["$centerSphere"];
            proptest::prop_assert_eq!(sphere[1].as_f64().unwrap(), distance / 3963.0);
            proptest::prop_assert_eq!(&sphere[0], &json!([-71.072, 42.336]));
        }
    }

    #[tokio::test]
    async fn radius_without_geocode_match_is_not_found() {
        let store = RecordingStore::default();
        let err = within_radius(&store, &boston(), "99999", "10")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::GeocodeNotFound { ref zipcode } if zipcode == "99999"));
        assert!(store.predicates.lock().is_empty());
    }

    #[tokio::test]
    async fn radius_rejects_bad_distance() {
        let store = RecordingStore::default();
        for distance in ["ten", "-5", "NaN", ""] {
            let err = within_radius(&store, &boston(), "02118", distance)
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::MalformedQuery(_)), "{distance}");
        }
    }

    #[tokio::test]
    async fn radius_geocoder_failure_is_upstream() {
        let store = RecordingStore::default();
        let err = within_radius(&store, &FailingGeocoder, "02118", "10")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn radius_filters_stored_bootcamps() {
        let store = DocumentStore::bootcamps();
        let near = doc(json!({
            "name": "Near",
            "description": "d",
            "location": {"type": "Point", "coordinates": [-71.06, 42.35]},
        }));
        let far = doc(json!({
            "name": "Far",
            "description": "d",
            "location": {"type": "Point", "coordinates": [-122.42, 37.77]},
        }));
        store.insert(near).await.unwrap();
        store.insert(far).await.unwrap();

        let envelope = within_radius(&store, &boston(), "02118", "50").await.unwrap();
        assert_eq!(envelope.count, Some(1));
        assert_eq!(first_record(&envelope)["name"], "Near");
    }
}
