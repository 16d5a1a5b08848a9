//! Server state shared across handlers.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::HttpConfig;
use crate::dispatch::Dispatcher;

/// Application state shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub http: HttpConfig,
    /// Printer registry, re-read on every job submission
    pub printers_path: PathBuf,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(http: HttpConfig, printers_path: impl Into<PathBuf>, dispatcher: Dispatcher) -> Self {
        Self {
            http,
            printers_path: printers_path.into(),
            dispatcher: Arc::new(dispatcher),
        }
    }
}
