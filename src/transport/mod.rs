//! # Raw TCP Services
//!
//! The two byte-level listeners that run beside the HTTP gateway.
//!
//! ## Available Services
//!
//! - [`bridge`]: exposes a serial device as a single-client TCP endpoint
//! - [`sink`]: a virtual printer that dumps what it receives and acks each chunk
//!
//! [`serial`] holds the TTY backend for the bridge (Unix only).

pub mod bridge;
#[cfg(unix)]
pub mod serial;
pub mod sink;

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tracing::warn;

pub use bridge::{DeviceOpener, SessionEnd, serve_bridge};
#[cfg(unix)]
pub use serial::SerialDevice;
pub use sink::{ACK, SinkFrame, serve_sink};

/// Pause after a failed accept (e.g. out of file descriptors)
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Accept the next connection. Accept errors are logged and retried; they
/// never stop the listener.
pub(crate) async fn accept(listener: &TcpListener, service: &'static str) -> (TcpStream, SocketAddr) {
    loop {
        match listener.accept().await {
            Ok(conn) => return conn,
            Err(e) => {
                warn!(service, error = %e, "accept failed");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
            }
        }
    }
}
