//! Concrete [`BootcampStore`](crate::traits::BootcampStore) implementations.

pub mod document_store;

pub use document_store::DocumentStore;
