//! # receipt-relay - Receipt Printer Gateway
//!
//! A small network gateway for point-of-sale printers. It provides:
//!
//! - **HTTP gateway**: POST a receipt-markup document to `/<printer id>` and
//!   get back `success` or `failure`
//! - **Job dispatcher**: transforms the document and delivers it to a TCP
//!   printer, waiting for the printer's acknowledgment
//! - **Serial bridge**: exposes a serial printer as a single-client TCP endpoint
//! - **Diagnostic sink**: a virtual printer that logs a hex dump of what it
//!   receives and acknowledges each chunk
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use receipt_relay::{
//!     dispatch::{Dispatcher, JobOutcome},
//!     markup::ReceiptMarkup,
//!     printer::PrinterConfig,
//! };
//!
//! # async fn example() {
//! let dispatcher = Dispatcher::new(Arc::new(ReceiptMarkup));
//! let printer = PrinterConfig::new("192.168.1.40", 9100);
//!
//! let document = "^\"COFFEE HOUSE\"\n---\n|Espresso | $3.00\n=\n";
//! let outcome = dispatcher
//!     .dispatch(document, &printer, Duration::from_secs(30))
//!     .await;
//! assert_eq!(outcome, JobOutcome::Success);
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`dispatch`] | Job dispatcher and its session state machine |
//! | [`markup`] | Receipt markup transformer |
//! | [`protocol`] | ESC/POS and StarPRNT command builders |
//! | [`raster`] | Optional SVG rasterizer for image-mode printers |
//! | [`server`] | HTTP gateway |
//! | [`transport`] | Serial bridge and diagnostic sink |
//! | [`printer`] | Printer registry and configuration |
//! | [`config`] | Server registry |
//! | [`error`] | Error types |

pub mod config;
pub mod dispatch;
pub mod error;
pub mod markup;
pub mod printer;
pub mod protocol;
pub mod raster;
pub mod server;
pub mod transport;

// Re-exports for convenience
pub use dispatch::{Dispatcher, JobOutcome};
pub use error::RelayError;
pub use printer::{PrinterConfig, PrinterRegistry};
