//! # Job Dispatcher
//!
//! Delivers one print job to a network printer and reports a single terminal
//! outcome. There is no queue and no retry: every call opens its own
//! connection, even when several jobs target the same printer at once.
//!
//! ## Image Mode
//!
//! For printers configured with `asImage`, and only when a rasterizer is
//! installed, the document is rendered as an SVG preview, rasterized to PNG,
//! and re-transformed as a single image row (`|{i:<base64>}`) with the
//! printer's own options. Without a rasterizer the plain commands are sent;
//! this fallback is silent.

pub mod session;

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::DispatchError;
use crate::markup::{self, Transformer};
use crate::printer::{CommandSet, PrinterConfig};
use crate::raster::Rasterizer;

pub use session::{DispatchSession, SessionState};

/// Terminal outcome of a job, as reported to the submitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Success,
    Failure,
}

impl JobOutcome {
    /// Response body for the HTTP gateway
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

/// Transforms documents and delivers them to printers.
#[derive(Clone)]
pub struct Dispatcher {
    transformer: Arc<dyn Transformer>,
    rasterizer: Option<Arc<dyn Rasterizer>>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("rasterizer", &self.rasterizer.is_some())
            .finish()
    }
}

impl Dispatcher {
    pub fn new(transformer: Arc<dyn Transformer>) -> Self {
        Self {
            transformer,
            rasterizer: None,
        }
    }

    /// Enable image mode for printers that ask for it.
    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    pub fn has_rasterizer(&self) -> bool {
        self.rasterizer.is_some()
    }

    /// Deliver `document` to `printer`.
    ///
    /// `timeout` covers everything from the connection attempt to the
    /// acknowledgment. Every failure (connect, transport, early close,
    /// timeout, rasterizer) collapses to [`JobOutcome::Failure`].
    #[instrument(skip_all, fields(job = %Uuid::new_v4(), printer = %printer.addr()))]
    pub async fn dispatch(
        &self,
        document: &str,
        printer: &PrinterConfig,
        timeout: Duration,
    ) -> JobOutcome {
        let mut session = DispatchSession::new(printer.addr());
        let result = session
            .run_with_timeout(self.payload(document, printer), timeout)
            .await;

        match result {
            Ok(()) => {
                info!(early_bytes = session.early_bytes(), "print job acknowledged");
                JobOutcome::Success
            }
            Err(e) => {
                warn!(error = %e, state = ?session.state(), "print job failed");
                JobOutcome::Failure
            }
        }
    }

    /// Wire bytes for a job.
    async fn payload(&self, document: &str, printer: &PrinterConfig) -> Result<Vec<u8>, DispatchError> {
        if printer.as_image {
            if let Some(rasterizer) = &self.rasterizer {
                let preview = self
                    .transformer
                    .transform(document, &printer.options.with_command(CommandSet::Svg));
                let png = rasterizer.rasterize(&preview).await?;
                let image_row = format!("|{{i:{}}}", BASE64.encode(png));
                let command = self.transformer.transform(&image_row, &printer.options);
                return Ok(markup::binary_bytes(&command));
            }
        }
        Ok(self.command(document, printer))
    }

    /// Plain (non-image) wire bytes for a document.
    pub fn command(&self, document: &str, printer: &PrinterConfig) -> Vec<u8> {
        markup::command_bytes(&self.transformer.transform(document, &printer.options))
    }
}
