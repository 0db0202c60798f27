//! Storage engine abstraction.
//!
//! A [`StorageEngine`] is a synchronous map from record id to [`Record`].
//! Identity, predicates, and schema rules live one layer up in
//! [`DocumentStore`](super::DocumentStore).

use super::record::Record;

/// Key-value storage for records, shared behind `Box<dyn StorageEngine>`.
///
/// Methods take `&self`; implementations provide their own interior
/// synchronization.
pub trait StorageEngine: Send + Sync + 'static {
    /// Inserts or replaces, returning the previous record.
    fn put(&self, id: &str, record: Record) -> Option<Record>;

    fn get(&self, id: &str) -> Option<Record>;

    fn remove(&self, id: &str) -> Option<Record>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Point-in-time copy of every entry, in no particular order.
    fn entries(&self) -> Vec<(String, Record)>;
}
