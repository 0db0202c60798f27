//! In-memory [`StorageEngine`] over a sharded [`DashMap`].

use dashmap::DashMap;

use crate::storage::engine::StorageEngine;
use crate::storage::record::Record;

/// Concurrent in-memory engine. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryEngine {
    records: DashMap<String, Record>,
}

impl MemoryEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageEngine for MemoryEngine {
    fn put(&self, id: &str, record: Record) -> Option<Record> {
        self.records.insert(id.to_owned(), record)
    }

    fn get(&self, id: &str) -> Option<Record> {
        self.records.get(id).map(|entry| entry.value().clone())
    }

    fn remove(&self, id: &str) -> Option<Record> {
        self.records.remove(id).map(|(_, record)| record)
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn entries(&self) -> Vec<(String, Record)> {
        self.records
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}
