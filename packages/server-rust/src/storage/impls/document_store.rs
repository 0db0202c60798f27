//! Schema-enforcing document store over a [`StorageEngine`].
//!
//! [`DocumentStore`] is the concrete [`BootcampStore`]: it assigns record
//! identity, compiles predicates into [`Filter`]s, enforces the collection
//! schema (required and unique fields) on every write, and returns results
//! in insertion order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use bootcamp_core::{CollectionSchema, Document, Filter, ValidationResult, ID_FIELD};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;
use crate::storage::engine::StorageEngine;
use crate::storage::engines::MemoryEngine;
use crate::storage::record::{Record, RecordMetadata};
use crate::traits::BootcampStore;

/// Document store for a single collection.
///
/// Reads are lock-free against the engine. Writes are serialized through
/// `write_lock` so that the uniqueness check and the put happen atomically.
pub struct DocumentStore {
    engine: Box<dyn StorageEngine>,
    schema: CollectionSchema,
    next_sequence: AtomicU64,
    write_lock: Mutex<()>,
}

impl DocumentStore {
    /// Creates a store over the given engine and schema.
    #[must_use]
    pub fn new(engine: Box<dyn StorageEngine>, schema: CollectionSchema) -> Self {
        Self {
            engine,
            schema,
            next_sequence: AtomicU64::new(0),
            write_lock: Mutex::new(()),
        }
    }

    /// In-memory store for the bootcamps collection with its default schema.
    #[must_use]
    pub fn bootcamps() -> Self {
        Self::new(Box::new(MemoryEngine::new()), CollectionSchema::bootcamps())
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.engine.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.engine.is_empty()
    }

    /// All records sorted by insertion sequence.
    fn ordered_records(&self) -> Vec<Record> {
        let mut records: Vec<Record> = self
            .engine
            .entries()
            .into_iter()
            .map(|(_, record)| record)
            .collect();
        records.sort_by_key(|record| record.metadata.sequence);
        records
    }

    fn validate(&self, doc: &Document) -> Result<(), StoreError> {
        match self.schema.validate(doc) {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid { errors } => Err(StoreError::Validation { errors }),
        }
    }

    /// Rejects `doc` if any unique field collides with another record.
    /// `own_id` excludes the record being updated from the comparison.
    fn check_unique(&self, doc: &Document, own_id: Option<&str>) -> Result<(), StoreError> {
        for field in self.schema.unique_fields() {
            let Some(value) = doc.get(field).filter(|v| !v.is_null()) else {
                continue;
            };
            let collides = self.engine.entries().into_iter().any(|(id, record)| {
                own_id != Some(id.as_str()) && record.document.get(field) == Some(value)
            });
            if collides {
                return Err(StoreError::Duplicate {
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl BootcampStore for DocumentStore {
    async fn find(&self, predicate: &Document) -> Result<Vec<Document>, StoreError> {
        let filter = Filter::compile(predicate)?;
        Ok(self
            .ordered_records()
            .into_iter()
            .filter(|record| filter.matches(&record.document))
            .map(|record| record.document)
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.engine.get(id).map(|record| record.document))
    }

    async fn insert(&self, mut payload: Document) -> Result<Document, StoreError> {
        payload.remove(ID_FIELD);
        self.validate(&payload)?;

        let _guard = self.write_lock.lock();
        self.check_unique(&payload, None)?;

        let id = Uuid::new_v4().simple().to_string();
        payload.insert(ID_FIELD.to_string(), Value::String(id.clone()));

        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        let record = Record {
            document: payload.clone(),
            metadata: RecordMetadata::new(sequence, now_millis()),
        };
        self.engine.put(&id, record);

        debug!(collection = %self.schema.collection, id = %id, "record inserted");
        Ok(payload)
    }

    async fn update_by_id(
        &self,
        id: &str,
        patch: Document,
    ) -> Result<Option<Document>, StoreError> {
        let _guard = self.write_lock.lock();
        let Some(mut record) = self.engine.get(id) else {
            return Ok(None);
        };

        for (field, value) in patch {
            if field != ID_FIELD {
                record.document.insert(field, value);
            }
        }
        self.validate(&record.document)?;
        self.check_unique(&record.document, Some(id))?;

        record.metadata.on_update(now_millis());
        let updated = record.document.clone();
        self.engine.put(id, record);

        debug!(collection = %self.schema.collection, id = %id, "record updated");
        Ok(Some(updated))
    }

    async fn delete_by_id(&self, id: &str) -> Result<Option<Document>, StoreError> {
        let _guard = self.write_lock.lock();
        let removed = self.engine.remove(id).map(|record| record.document);
        if removed.is_some() {
            debug!(collection = %self.schema.collection, id = %id, "record deleted");
        }
        Ok(removed)
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
}
