//! # Serial Bridge
//!
//! Relays bytes between one TCP client and a serial device, unmodified, in
//! both directions.
//!
//! Only one client is served at a time. While a session holds the slot, new
//! connections are accepted and closed straight away; they are never queued.
//! The device is opened per client and closed when the session ends:
//!
//! - **Client leaves** (EOF or error): stop relaying, let the device transmit
//!   what it was already given, then close it.
//! - **Device fails** (read/write error or EOF): close the client at once.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tracing::{error, info, instrument, warn};

/// Relay buffer per direction
const RELAY_BUFFER: usize = 8 * 1024;

/// Source of device handles for bridge sessions.
#[async_trait]
pub trait DeviceOpener: Send + Sync + 'static {
    type Reader: AsyncRead + Unpin + Send + 'static;
    type Writer: AsyncWrite + Unpin + Send + 'static;

    /// Open the device for one session.
    async fn open(&self) -> io::Result<(Self::Reader, Self::Writer)>;
}

/// How a bridge session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The device could not be opened; the client was dropped
    DeviceUnavailable,
    /// The client went away; pending device output was drained
    ClientClosed,
    /// The device closed or failed; the client was dropped
    DeviceClosed,
}

/// Why one relay direction stopped.
#[derive(Debug)]
enum PumpEnd {
    SourceClosed,
    SourceFailed(io::Error),
    SinkFailed(io::Error),
}

/// Accept clients forever, one session at a time.
pub async fn serve_bridge<O: DeviceOpener>(listener: TcpListener, opener: O) -> io::Result<()> {
    let opener = Arc::new(opener);
    let slot = Arc::new(Semaphore::new(1));

    loop {
        let (stream, peer) = super::accept(&listener, "bridge").await;
        let Ok(permit) = Arc::clone(&slot).try_acquire_owned() else {
            warn!(%peer, "bridge busy, refusing client");
            drop(stream);
            continue;
        };

        let opener = Arc::clone(&opener);
        tokio::spawn(async move {
            let end = run_session(stream, peer, opener.as_ref()).await;
            info!(%peer, ?end, "bridge session ended");
            drop(permit);
        });
    }
}

/// Relay between `client` and a freshly opened device until either side ends.
#[instrument(skip(client, opener))]
pub async fn run_session<O: DeviceOpener>(
    client: TcpStream,
    peer: SocketAddr,
    opener: &O,
) -> SessionEnd {
    let (device_rx, mut device_tx) = match opener.open().await {
        Ok(halves) => halves,
        Err(e) => {
            error!(error = %e, "failed to open serial device");
            return SessionEnd::DeviceUnavailable;
        }
    };
    info!("bridge client connected");

    let (client_rx, mut client_tx) = client.into_split();
    let (upstream, downstream) = {
        let upstream = pump(client_rx, &mut device_tx);
        let downstream = pump(device_rx, &mut client_tx);
        tokio::pin!(upstream, downstream);
        tokio::select! {
            end = &mut upstream => (Some(end), None),
            end = &mut downstream => (None, Some(end)),
        }
    };

    let client_left = match (upstream, downstream) {
        (Some(PumpEnd::SourceClosed), _) => true,
        (Some(PumpEnd::SourceFailed(e)), _) | (_, Some(PumpEnd::SinkFailed(e))) => {
            warn!(error = %e, "client connection failed");
            true
        }
        (Some(PumpEnd::SinkFailed(e)), _) | (_, Some(PumpEnd::SourceFailed(e))) => {
            error!(error = %e, "serial device failed");
            false
        }
        (_, Some(PumpEnd::SourceClosed)) => {
            warn!("serial device closed");
            false
        }
        (None, None) => false,
    };

    if !client_left {
        return SessionEnd::DeviceClosed;
    }

    if let Err(e) = device_tx.shutdown().await {
        warn!(error = %e, "serial drain failed");
    }
    // The peer may already be gone.
    let _ = client_tx.shutdown().await;
    SessionEnd::ClientClosed
}

/// Copy `reader` into `writer` until one of them stops.
async fn pump<R, W>(mut reader: R, writer: &mut W) -> PumpEnd
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; RELAY_BUFFER];
    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => return PumpEnd::SourceClosed,
            Ok(n) => n,
            Err(e) => return PumpEnd::SourceFailed(e),
        };
        if let Err(e) = writer.write_all(&buf[..n]).await {
            return PumpEnd::SinkFailed(e);
        }
        if let Err(e) = writer.flush().await {
            return PumpEnd::SinkFailed(e);
        }
    }
}
