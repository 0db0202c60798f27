//! Record types for the storage layer.
//!
//! Defines the unit stored in a [`StorageEngine`](super::StorageEngine):
//! a [`Record`] pairing the client-visible document with server-internal
//! [`RecordMetadata`].

use bootcamp_core::Document;

/// Metadata tracked for every stored record.
///
/// Server-internal -- NOT serialized into response envelopes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordMetadata {
    /// Record version, incremented on every update.
    pub version: u32,
    /// Monotonic insertion sequence. Defines the store-native result order.
    pub sequence: u64,
    /// Wall-clock time (millis since epoch) when this record was created.
    pub creation_time: i64,
    /// Wall-clock time of the last write.
    pub last_update_time: i64,
}

impl RecordMetadata {
    /// Creates metadata for a freshly inserted record.
    ///
    /// Version starts at 1; creation and update times are both `now`.
    #[must_use]
    pub fn new(sequence: u64, now: i64) -> Self {
        Self {
            version: 1,
            sequence,
            creation_time: now,
            last_update_time: now,
        }
    }

    /// Records a write: increments `version` and updates `last_update_time`.
    pub fn on_update(&mut self, now: i64) {
        self.version = self.version.saturating_add(1);
        self.last_update_time = now;
    }
}

/// A complete record: document + server-internal metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// The stored document, including its `_id`.
    pub document: Document,
    pub metadata: RecordMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_metadata_starts_at_version_one() {
        let meta = RecordMetadata::new(7, 1_000);
        assert_eq!(meta.version, 1);
        assert_eq!(meta.sequence, 7);
        assert_eq!(meta.creation_time, 1_000);
        assert_eq!(meta.last_update_time, 1_000);
    }

    #[test]
    fn on_update_bumps_version_and_keeps_creation_time() {
        let mut meta = RecordMetadata::new(0, 1_000);
        meta.on_update(2_000);
        assert_eq!(meta.version, 2);
        assert_eq!(meta.creation_time, 1_000);
        assert_eq!(meta.last_update_time, 2_000);
    }
}
