//! Print job submission.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use tracing::{error, info, warn};

use crate::printer::PrinterRegistry;

use super::super::state::AppState;

/// Largest document accepted in one submission
const MAX_DOCUMENT_BYTES: usize = 64 * 1024 * 1024;

/// Handle POST /<printer id> - transform the body and send it to the printer.
///
/// The response is 200 with `success` or `failure` whenever the printer was
/// found; a failed print is not an HTTP error.
pub async fn submit(State(state): State<Arc<AppState>>, uri: Uri, body: Body) -> Response {
    let printer_id = uri.path().strip_prefix('/').unwrap_or(uri.path());

    let registry = match PrinterRegistry::load(&state.printers_path).await {
        Ok(registry) => registry,
        Err(e) => {
            error!(error = %e, "printer registry unavailable");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    // Unknown printers are rejected before the body is read.
    let Some(printer) = registry.get(printer_id) else {
        info!(printer_id, "unknown printer");
        return StatusCode::NOT_FOUND.into_response();
    };

    let body = match axum::body::to_bytes(body, MAX_DOCUMENT_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(printer_id, error = %e, "failed to read document");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };
    let document = String::from_utf8_lossy(&body);

    info!(printer_id, bytes = body.len(), "print job submitted");
    let outcome = state
        .dispatcher
        .dispatch(&document, printer, state.http.timeout())
        .await;

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain")],
        outcome.as_str(),
    )
        .into_response()
}
