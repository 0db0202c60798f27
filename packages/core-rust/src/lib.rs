//! Bootcamp Core: query translation, store predicates, geo math, and response envelopes.

pub mod envelope;
pub mod geo;
pub mod predicate;
pub mod query;
pub mod schema;
pub mod types;

pub use envelope::{Envelope, EnvelopeData, ErrorBody};
pub use predicate::{CmpOp, Filter};
pub use query::{translate_filter, translate_query, QueryError};
pub use schema::{CollectionSchema, FieldDef, ValidationResult};
pub use types::{Document, GeoLocation, GeoPoint, ID_FIELD, LOCATION_FIELD};
