//! Uniform JSON response envelopes.
//!
//! Every successful operation answers with an [`Envelope`]; every failure
//! answers with an [`ErrorBody`]. The two shapes never mix: a success envelope
//! has no error field, and `count` appears only on list-returning operations.

use serde::{Deserialize, Serialize};

use crate::types::Document;

/// Payload carried in the `data` field of a success envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvelopeData {
    /// A single record (get, create, update).
    One(Document),
    /// A sequence of records (list, radius).
    Many(Vec<Document>),
}

/// Success response envelope: `{success, count?, data?, msg?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Always `true` for envelopes built through the constructors below.
    pub success: bool,
    /// Number of records in `data`. Present only for list results.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<EnvelopeData>,
    /// Human-readable confirmation for mutating operations.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub msg: Option<String>,
}

impl Envelope {
    /// Envelope for a list-returning operation. `count` mirrors `data.len()`.
    #[must_use]
    pub fn list(records: Vec<Document>) -> Self {
        Self {
            success: true,
            count: Some(records.len()),
            data: Some(EnvelopeData::Many(records)),
            msg: None,
        }
    }

    /// Envelope for a single-record read.
    #[must_use]
    pub fn record(record: Document) -> Self {
        Self {
            success: true,
            count: None,
            data: Some(EnvelopeData::One(record)),
            msg: None,
        }
    }

    /// Envelope for a mutation that returns the affected record.
    #[must_use]
    pub fn record_with_message(record: Document, msg: impl Into<String>) -> Self {
        Self {
            success: true,
            count: None,
            data: Some(EnvelopeData::One(record)),
            msg: Some(msg.into()),
        }
    }

    /// Envelope for a mutation with nothing left to return (delete).
    #[must_use]
    pub fn message(msg: impl Into<String>) -> Self {
        Self {
            success: true,
            count: None,
            data: None,
            msg: Some(msg.into()),
        }
    }
}

/// Error response body: `{success: false, error}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl ErrorBody {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}
