//! Two-layer storage system for the bootcamp server.
//!
//! - **Layer 1** ([`StorageEngine`]): low-level in-memory key-value storage
//!   of [`Record`]s
//! - **Layer 2** ([`DocumentStore`]): the [`BootcampStore`](crate::traits::BootcampStore)
//!   implementation with identity, predicate evaluation, and schema enforcement

pub mod engine;
pub mod engines;
pub mod impls;
pub mod record;

pub use engine::*;
pub use engines::MemoryEngine;
pub use impls::DocumentStore;
pub use record::*;
