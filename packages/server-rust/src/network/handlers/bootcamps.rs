//! `/api/v1/bootcamps` handlers.
//!
//! Each handler extracts the request data, runs the matching operation from
//! [`crate::service::bootcamps`] under [`observe`], and serializes the
//! envelope. Failures are returned as [`ApiError`], which renders itself.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bootcamp_core::{Document, Envelope};
use bytes::Bytes;
use serde_json::Value;

use super::AppState;
use crate::error::ApiError;
use crate::service::bootcamps;
use crate::service::instrument::observe;

/// Raw query-string pairs in request order.
type QueryPairs = Result<Query<Vec<(String, String)>>, QueryRejection>;

/// `GET /api/v1/bootcamps`
pub async fn list_bootcamps(
    State(state): State<AppState>,
    query: QueryPairs,
) -> Result<Json<Envelope>, ApiError> {
    let Query(pairs) = query.map_err(|rejection| ApiError::MalformedQuery(rejection.body_text()))?;
    observe("list", bootcamps::list(state.store.as_ref(), &pairs))
        .await
        .map(Json)
}

/// `GET /api/v1/bootcamps/{id}`
pub async fn get_bootcamp(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope>, ApiError> {
    observe("get", bootcamps::get(state.store.as_ref(), &id))
        .await
        .map(Json)
}

/// `POST /api/v1/bootcamps`
pub async fn create_bootcamp(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Envelope>), ApiError> {
    let payload = parse_document(&body)?;
    let envelope = observe("create", bootcamps::create(state.store.as_ref(), payload)).await?;
    Ok((StatusCode::CREATED, Json(envelope)))
}

/// `PUT` and `PATCH /api/v1/bootcamps/{id}`
pub async fn update_bootcamp(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Envelope>, ApiError> {
    let patch = parse_document(&body)?;
    observe("update", bootcamps::update(state.store.as_ref(), &id, patch))
        .await
        .map(Json)
}

/// `DELETE /api/v1/bootcamps/{id}`
pub async fn delete_bootcamp(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope>, ApiError> {
    observe("delete", bootcamps::delete(state.store.as_ref(), &id))
        .await
        .map(Json)
}

/// `GET /api/v1/bootcamps/radius/{zipcode}/{distance}`
pub async fn bootcamps_in_radius(
    State(state): State<AppState>,
    Path((zipcode, distance)): Path<(String, String)>,
) -> Result<Json<Envelope>, ApiError> {
    observe(
        "radius",
        bootcamps::within_radius(
            state.store.as_ref(),
            state.geocoder.as_ref(),
            &zipcode,
            &distance,
        ),
    )
    .await
    .map(Json)
}

/// Parses a request body into a document. An empty body is an empty document.
fn parse_document(body: &[u8]) -> Result<Document, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Document::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::Validation(
            "Request body must be a JSON object".to_string(),
        )),
        Err(err) => Err(ApiError::Validation(format!("Invalid JSON body: {err}"))),
    }
}
