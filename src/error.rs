//! # Error Types
//!
//! Error types used throughout the relay. Each service converts these into a
//! terminal signal at its own boundary (an HTTP status, a job outcome, or a
//! dropped client), so only startup errors ever reach `main`.

use std::io;

use thiserror::Error;

/// Main error type for relay operations
#[derive(Debug, Error)]
pub enum RelayError {
    /// A configuration file could not be read or parsed
    #[error("Config error: {0}")]
    Config(String),

    /// A listener could not be bound to its configured address
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Transport-level errors (connection, device, accept loop)
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Why a single print job failed.
///
/// Every variant collapses to the same external `failure` outcome; the
/// distinction only shows up in logs.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    #[error("printer closed the connection before acknowledging")]
    ClosedBeforeAck,

    #[error("no acknowledgment within {0:?}")]
    Timeout(std::time::Duration),

    #[error("rasterize failed: {0}")]
    Rasterize(#[from] RasterError),
}

/// Errors raised by a [`Rasterizer`](crate::raster::Rasterizer) implementation.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("invalid SVG: {0}")]
    Svg(String),

    #[error("render failed: {0}")]
    Render(String),
}
