//! # Printer Module
//!
//! Printer registry and per-printer configuration.
//!
//! ## Modules
//!
//! - [`config`]: Connection parameters and print options
//! - [`registry`]: The `printers.json` lookup table

pub mod config;
pub mod registry;

pub use config::{CommandSet, PrintOptions, PrinterConfig};
pub use registry::PrinterRegistry;
