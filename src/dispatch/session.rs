//! # Dispatch Session
//!
//! The TCP conversation that delivers one job to one printer.
//!
//! ## State Machine
//!
//! ```text
//! Idle ─► Connecting ─► Writing ──────────────► AwaitingAck ─► Succeeded
//!              │            │                        ▲   │
//!              │            └─► AwaitingDrain ───────┘   │
//!              ▼                       │                 ▼
//!            Failed ◄──────────────────┴────────────  Failed / TimedOut
//! ```
//!
//! The payload is first offered with one non-blocking write. If the socket
//! takes all of it the session goes straight to `AwaitingAck`; otherwise the
//! rest is written in `AwaitingDrain`. Before every write, bytes already
//! waiting on the socket are read and discarded, so nothing the printer sent
//! before the last payload byte was handed over can pass for the
//! acknowledgment. Only a byte read after that counts. Its value is never
//! inspected.
//!
//! The stream is owned by [`DispatchSession::run`], so it is closed exactly
//! once on every exit path: explicitly after an ack, by drop on error, and by
//! drop when the caller's timeout cancels the future.

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use crate::error::DispatchError;

/// Read buffer for acknowledgments and discarded early bytes
const ACK_BUFFER: usize = 512;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Writing,
    AwaitingDrain,
    AwaitingAck,
    Succeeded,
    Failed,
    TimedOut,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::TimedOut)
    }
}

/// One job's connection to its printer.
#[derive(Debug)]
pub struct DispatchSession {
    addr: String,
    state: SessionState,
    /// Bytes discarded while the payload was still draining
    early_bytes: usize,
}

impl DispatchSession {
    pub fn new(addr: String) -> Self {
        Self {
            addr,
            state: SessionState::Idle,
            early_bytes: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn early_bytes(&self) -> usize {
        self.early_bytes
    }

    /// Terminal transition for errors and timeouts raised outside `run`.
    fn fail(&mut self, timed_out: bool) {
        if !self.state.is_terminal() {
            self.transition(if timed_out {
                SessionState::TimedOut
            } else {
                SessionState::Failed
            });
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug!(addr = %self.addr, from = ?self.state, to = ?next, "session state");
        self.state = next;
    }

    /// [`run`](Self::run) bounded by `timeout`, from the connection attempt to
    /// the acknowledgment. On expiry the connection is dropped and the session
    /// ends in `TimedOut`.
    pub async fn run_with_timeout<F>(
        &mut self,
        payload: F,
        timeout: Duration,
    ) -> Result<(), DispatchError>
    where
        F: Future<Output = Result<Vec<u8>, DispatchError>>,
    {
        match tokio::time::timeout(timeout, self.run(payload)).await {
            Ok(result) => result,
            Err(_) => {
                self.fail(true);
                Err(DispatchError::Timeout(timeout))
            }
        }
    }

    /// Drive the session from `Idle` to `Succeeded`.
    ///
    /// `payload` is produced only once the connection is up; a payload error
    /// fails the session like any transport error.
    pub async fn run<F>(&mut self, payload: F) -> Result<(), DispatchError>
    where
        F: Future<Output = Result<Vec<u8>, DispatchError>>,
    {
        self.transition(SessionState::Connecting);
        let mut stream = match TcpStream::connect(self.addr.as_str()).await {
            Ok(stream) => stream,
            Err(source) => {
                self.transition(SessionState::Failed);
                return Err(DispatchError::Connect {
                    addr: self.addr.clone(),
                    source,
                });
            }
        };

        let result = self.deliver(&mut stream, payload).await;
        match result {
            Ok(()) => {
                self.transition(SessionState::Succeeded);
                // Printer is done; a failed FIN changes nothing for the job.
                let _ = stream.shutdown().await;
                Ok(())
            }
            Err(e) => {
                self.transition(SessionState::Failed);
                Err(e)
            }
        }
    }

    async fn deliver<F>(&mut self, stream: &mut TcpStream, payload: F) -> Result<(), DispatchError>
    where
        F: Future<Output = Result<Vec<u8>, DispatchError>>,
    {
        self.transition(SessionState::Writing);
        let payload = payload.await?;
        let mut buf = [0u8; ACK_BUFFER];

        self.discard_pending(stream, &mut buf)?;
        let written = match stream.try_write(&payload) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => 0,
            Err(e) => return Err(e.into()),
        };

        if written < payload.len() {
            self.transition(SessionState::AwaitingDrain);
            self.drain(stream, &payload[written..], &mut buf).await?;
        }

        self.transition(SessionState::AwaitingAck);
        match stream.read(&mut buf).await? {
            0 => Err(DispatchError::ClosedBeforeAck),
            n => {
                debug!(addr = %self.addr, bytes = n, "acknowledged");
                Ok(())
            }
        }
    }

    /// Write the rest of the payload while discarding inbound bytes.
    async fn drain(
        &mut self,
        stream: &mut TcpStream,
        mut rest: &[u8],
        buf: &mut [u8],
    ) -> Result<(), DispatchError> {
        while !rest.is_empty() {
            tokio::select! {
                biased;
                ready = stream.readable() => {
                    ready?;
                    self.discard_pending(stream, buf)?;
                }
                ready = stream.writable() => {
                    ready?;
                    self.discard_pending(stream, buf)?;
                    match stream.try_write(rest) {
                        Ok(n) => rest = &rest[n..],
                        Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
                        Err(e) => return Err(e.into()),
                    }
                }
            }
        }
        Ok(())
    }

    /// Read and drop whatever the printer has already sent.
    fn discard_pending(&mut self, stream: &TcpStream, buf: &mut [u8]) -> Result<(), DispatchError> {
        loop {
            match stream.try_read(buf) {
                Ok(0) => return Err(DispatchError::ClosedBeforeAck),
                Ok(n) => {
                    self.early_bytes += n;
                    debug!(addr = %self.addr, bytes = n, "ignoring bytes received before the payload was written");
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(e) => return Err(e.into()),
            }
        }
    }
}
