//! Bootcamp operations and their instrumentation.
//!
//! `bootcamps` holds one async function per operation over the store and
//! geocoder traits; `instrument` wraps each call in a span and metrics.

pub mod bootcamps;
pub mod instrument;

pub use instrument::{observe, OPERATIONS_TOTAL, OPERATION_DURATION_SECONDS};
