//! Operation instrumentation.
//!
//! Wraps each pipeline operation in a tracing span and records its duration
//! and outcome both as span fields and as `metrics` series.

use std::future::Future;
use std::time::Instant;

use tracing::{info_span, Instrument};

use crate::error::ApiError;

/// Counter of completed operations, labelled by `operation` and `outcome`.
pub const OPERATIONS_TOTAL: &str = "bootcamp_operations_total";
/// Histogram of operation latency in seconds, labelled by `operation`.
pub const OPERATION_DURATION_SECONDS: &str = "bootcamp_operation_duration_seconds";

/// Runs `fut` as the named operation.
///
/// The outcome label is `"ok"` on success and the [`ApiError::kind`] on failure.
pub async fn observe<T, F>(operation: &'static str, fut: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    let span = info_span!(
        "operation",
        operation = operation,
        duration_ms = tracing::field::Empty,
        outcome = tracing::field::Empty,
    );

    async move {
        let start = Instant::now();
        let result = fut.await;
        let elapsed = start.elapsed();

        let outcome = match &result {
            Ok(_) => "ok",
            Err(err) => err.kind(),
        };

        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = elapsed.as_millis() as u64;
        tracing::Span::current().record("duration_ms", duration_ms);
        tracing::Span::current().record("outcome", outcome);

        metrics::counter!(OPERATIONS_TOTAL, "operation" => operation, "outcome" => outcome)
            .increment(1);
        metrics::histogram!(OPERATION_DURATION_SECONDS, "operation" => operation)
            .record(elapsed.as_secs_f64());

        tracing::info!(
            operation = operation,
            duration_ms = duration_ms,
            outcome = outcome,
            "operation complete"
        );

        result
    }
    .instrument(span)
    .await
}
