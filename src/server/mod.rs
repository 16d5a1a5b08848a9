//! # HTTP Gateway
//!
//! Serves the bundled UI and accepts print jobs.
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | GET | any | file under the static root, or 404 |
//! | POST | `/<printer id>` | 200 `success` / `failure`, 404 unknown printer, 500 registry unreadable |
//!
//! Other methods get 405.
//!
//! ## Usage
//!
//! ```bash
//! receipt-relay serve --servers servers.json --printers printers.json
//! ```
//!
//! Then open http://localhost:8080 in a browser.

mod handlers;
mod state;
mod static_files;

pub use state::AppState;

use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::RelayError;

/// Build the gateway's router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(static_files::serve_file).post(handlers::print::submit),
        )
        .route(
            "/*path",
            get(static_files::serve_file).post(handlers::print::submit),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Run the gateway on an already bound listener.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), RelayError> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, root = %state.http.root.display(), "HTTP gateway listening");
    }

    axum::serve(listener, router(state))
        .await
        .map_err(|e| RelayError::Transport(format!("Server error: {}", e)))
}
