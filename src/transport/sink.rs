//! # Diagnostic Sink
//!
//! A virtual printer for development. Every chunk it receives is logged as a
//! hex/ASCII dump and answered with a single [`ACK`] byte, which is enough to
//! complete a dispatch session.
//!
//! ## Dump Format
//!
//! ```text
//! 00000000  1b 40 48 65  6c 6c 6f 2c  20 77 6f 72  6c 64 21 0a  .@Hello, world!.
//! 00000010  1d 56 42 00                                         .VB.
//! ```
//!
//! Offsets restart at zero for every chunk. Short lines are padded with
//! spaces so every line has the same width.

use std::fmt::{self, Write as _};
use std::io;
use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{debug, info, instrument};

/// Acknowledgment written after each chunk
pub const ACK: u8 = 0x00;

/// Bytes per dump line
const FRAME_WIDTH: usize = 16;

/// Hex pairs per group
const GROUP: usize = 4;

/// Largest chunk read at once
const CHUNK_BUFFER: usize = 64 * 1024;

/// One 16-byte line of a chunk dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkFrame<'a> {
    /// Offset of the first byte within its chunk
    pub offset: usize,
    pub bytes: &'a [u8],
}

impl fmt::Display for SinkFrame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}  ", self.offset)?;
        for i in 0..FRAME_WIDTH {
            if i > 0 {
                f.write_str(if i % GROUP == 0 { "  " } else { " " })?;
            }
            match self.bytes.get(i) {
                Some(b) => write!(f, "{:02x}", b)?,
                None => f.write_str("  ")?,
            }
        }
        f.write_str("  ")?;
        for i in 0..FRAME_WIDTH {
            let c = match self.bytes.get(i) {
                Some(&b) if (0x20..=0x7E).contains(&b) => b as char,
                Some(_) => '.',
                None => ' ',
            };
            f.write_char(c)?;
        }
        Ok(())
    }
}

/// Split a chunk into dump lines.
pub fn frames(chunk: &[u8]) -> impl Iterator<Item = SinkFrame<'_>> {
    chunk
        .chunks(FRAME_WIDTH)
        .enumerate()
        .map(|(i, bytes)| SinkFrame {
            offset: i * FRAME_WIDTH,
            bytes,
        })
}

/// Rendered dump lines for a chunk.
pub fn render_chunk(chunk: &[u8]) -> Vec<String> {
    frames(chunk).map(|frame| frame.to_string()).collect()
}

/// Accept connections forever, one task per connection.
pub async fn serve_sink(listener: TcpListener) -> io::Result<()> {
    loop {
        let (stream, peer) = super::accept(&listener, "sink").await;
        tokio::spawn(async move {
            let chunks = sink_session(stream, peer).await;
            debug!(%peer, chunks, "sink connection closed");
        });
    }
}

/// Dump and acknowledge chunks until the peer leaves. Returns the number of
/// chunks acknowledged.
#[instrument(skip(stream))]
pub async fn sink_session<S>(mut stream: S, peer: SocketAddr) -> usize
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; CHUNK_BUFFER];
    let mut chunks = 0;

    loop {
        let n = match stream.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                debug!(error = %e, "sink read failed");
                break;
            }
        };

        info!(target: "sink", bytes = n, "virtual printer received:");
        for frame in frames(&buf[..n]) {
            info!(target: "sink", "{}", frame);
        }

        if let Err(e) = stream.write_all(&[ACK]).await {
            debug!(error = %e, "sink ack failed");
            break;
        }
        chunks += 1;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    #[test]
    fn test_twenty_bytes_make_two_lines() {
        let chunk: Vec<u8> = (0..20u8).map(|i| b'A' + i).collect();
        let lines = render_chunk(&chunk);
        assert_eq!(
            lines,
            vec![
                "00000000  41 42 43 44  45 46 47 48  49 4a 4b 4c  4d 4e 4f 50  ABCDEFGHIJKLMNOP",
                "00000010  51 52 53 54                                         QRST            ",
            ]
        );
    }

    #[test]
    fn test_lines_have_constant_width() {
        let chunk: Vec<u8> = (0..=255u8).collect();
        for len in [1, 5, 16, 17, 31, 256] {
            for line in render_chunk(&chunk[..len]) {
                assert_eq!(line.len(), 78, "{:?}", line);
            }
        }
    }

    #[test]
    fn test_non_printables_become_dots() {
        let lines = render_chunk(&[0x1B, 0x40, 0x7E, 0x7F, 0x20, 0xE9]);
        assert_eq!(
            lines[0],
            "00000000  1b 40 7e 7f  20 e9                                  .@~. .          "
        );
    }

    #[test]
    fn test_empty_chunk_has_no_lines() {
        assert!(render_chunk(&[]).is_empty());
    }

    #[tokio::test]
    async fn test_one_ack_per_chunk() {
        let (mut client, server) = tokio::io::duplex(1024);
        let session = tokio::spawn(sink_session(server, peer()));

        client.write_all(&[0xAA; 20]).await.unwrap();
        let mut ack = [0xFFu8; 1];
        client.read_exact(&mut ack).await.unwrap();
        assert_eq!(ack, [ACK]);

        client.write_all(b"second").await.unwrap();
        client.read_exact(&mut ack).await.unwrap();
        assert_eq!(ack, [ACK]);

        client.shutdown().await.unwrap();
        let mut rest = Vec::new();
        client.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());
        assert_eq!(session.await.unwrap(), 2);
    }
}
