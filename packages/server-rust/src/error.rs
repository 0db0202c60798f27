//! Error taxonomy for the store, the geocoder, and the HTTP surface.
//!
//! [`ApiError`] is the single error reporter: every handler returns
//! `Result<_, ApiError>`, and its [`IntoResponse`] impl maps the error kind to
//! a status code and serializes the `{success: false, error}` body. A request
//! therefore produces exactly one response, success or error.

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bootcamp_core::{ErrorBody, QueryError};
use tracing::{debug, error};

/// Failures reported by a [`BootcampStore`](crate::traits::BootcampStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The document violates the collection schema.
    #[error("{}", .errors.join(", "))]
    Validation { errors: Vec<String> },
    /// A unique field collides with an existing record.
    #[error("Duplicate field value entered for `{field}`")]
    Duplicate { field: String },
    /// The predicate could not be compiled.
    #[error(transparent)]
    Query(#[from] QueryError),
    /// The storage backend itself failed.
    #[error("store backend failure: {0}")]
    Backend(#[from] anyhow::Error),
}

/// Failures reported by a [`Geocoder`](crate::traits::Geocoder).
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The provider answered but reported an error status.
    #[error("geocoding provider error: {0}")]
    Provider(String),
}

/// External collaborator that produced an [`ApiError::Upstream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaborator {
    Store,
    Geocoder,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Store => "store",
            Self::Geocoder => "geocoder",
        })
    }
}

/// Every way a bootcamp operation can fail.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No record exists with the requested identifier.
    #[error("Bootcamp Not Found by Id {id}")]
    NotFound { id: String },
    /// The store rejected a create or update payload.
    #[error("{0}")]
    Validation(String),
    /// Filter or path parameters could not be turned into a query.
    #[error("Malformed query: {0}")]
    MalformedQuery(String),
    /// The zipcode resolved to zero locations.
    #[error("No location found for zipcode {zipcode}")]
    GeocodeNotFound { zipcode: String },
    /// The store or the geocoder failed unexpectedly.
    #[error("{collaborator} failure: {source}")]
    Upstream {
        collaborator: Collaborator,
        #[source]
        source: anyhow::Error,
    },
}

impl ApiError {
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } | Self::GeocodeNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Validation(_) | Self::MalformedQuery(_) => StatusCode::BAD_REQUEST,
            Self::Upstream {
                collaborator: Collaborator::Geocoder,
                ..
            } => StatusCode::BAD_GATEWAY,
            Self::Upstream {
                collaborator: Collaborator::Store,
                ..
            } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable label used for metrics and structured logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Validation(_) => "validation",
            Self::MalformedQuery(_) => "malformed_query",
            Self::GeocodeNotFound { .. } => "geocode_not_found",
            Self::Upstream { .. } => "upstream",
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation { .. } | StoreError::Duplicate { .. } => {
                Self::Validation(err.to_string())
            }
            StoreError::Query(query) => query.into(),
            StoreError::Backend(source) => Self::Upstream {
                collaborator: Collaborator::Store,
                source,
            },
        }
    }
}

impl From<GeocodeError> for ApiError {
    fn from(err: GeocodeError) -> Self {
        Self::Upstream {
            collaborator: Collaborator::Geocoder,
            source: err.into(),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        Self::MalformedQuery(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(kind = self.kind(), status = status.as_u16(), error = %self, "request failed");
        } else {
            debug!(kind = self.kind(), status = status.as_u16(), error = %self, "request rejected");
        }
        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}
