use async_trait::async_trait;
use bootcamp_core::{Document, GeoLocation};

use crate::error::{GeocodeError, StoreError};

/// Pluggable document store for the bootcamps collection.
/// Implementations: in-memory [`DocumentStore`](crate::storage::DocumentStore),
/// recording fakes (tests).
///
/// The store owns record identity: it assigns `_id` on insert and enforces
/// the collection schema on every write.
#[async_trait]
pub trait BootcampStore: Send + Sync {
    /// Return every record matching the predicate, in store-native order.
    async fn find(&self, predicate: &Document) -> Result<Vec<Document>, StoreError>;

    /// Load a single record by identifier.
    async fn find_by_id(&self, id: &str) -> Result<Option<Document>, StoreError>;

    /// Insert a new record and return it with its generated identifier.
    async fn insert(&self, payload: Document) -> Result<Document, StoreError>;

    /// Merge `patch` into the record and return the post-update record.
    /// Returns `None` if no record has this identifier.
    async fn update_by_id(&self, id: &str, patch: Document)
        -> Result<Option<Document>, StoreError>;

    /// Remove a record, returning it if it existed.
    async fn delete_by_id(&self, id: &str) -> Result<Option<Document>, StoreError>;
}

/// Resolves a free-form address or zipcode to candidate locations.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Look up `query`. An empty vector means nothing matched.
    async fn geocode(&self, query: &str) -> Result<Vec<GeoLocation>, GeocodeError>;
}
