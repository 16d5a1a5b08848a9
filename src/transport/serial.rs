//! # Serial Device
//!
//! Opens a TTY for the serial bridge and exposes it as a tokio
//! reader/writer pair.
//!
//! ## TTY Configuration
//!
//! The device is opened non-blocking and switched to raw mode so binary data
//! passes through unmodified:
//!
//! - **No input processing**: IGNBRK, BRKINT, PARMRK, ISTRIP, INLCR, IGNCR,
//!   ICRNL cleared
//! - **No software flow control**: IXON, IXOFF, IXANY cleared (0x11 and 0x13
//!   appear in raster data)
//! - **No output processing**: OPOST cleared
//! - **No echo, non-canonical**: ECHO, ECHONL, ICANON, ISIG, IEXTEN cleared
//! - **8N1**: CS8, no parity, at the configured baud rate
//!
//! ## Duplex
//!
//! Both halves share one file descriptor registered with the reactor, so
//! reading and writing proceed independently. Shutting down the writer waits
//! (on the blocking pool) until the kernel has transmitted everything.

use std::fs::{File, OpenOptions};
use std::future::Future;
use std::io::{self, Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};

use async_trait::async_trait;
use tokio::io::unix::AsyncFd;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::task::JoinHandle;

use super::bridge::DeviceOpener;

/// A serial device path plus line speed, opened fresh for every client.
#[derive(Debug, Clone)]
pub struct SerialDevice {
    path: PathBuf,
    baud: u32,
}

impl SerialDevice {
    pub fn new(path: impl Into<PathBuf>, baud: u32) -> Self {
        Self {
            path: path.into(),
            baud,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DeviceOpener for SerialDevice {
    type Reader = TtyReader;
    type Writer = TtyWriter;

    async fn open(&self) -> io::Result<(TtyReader, TtyWriter)> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NONBLOCK | libc::O_NOCTTY)
            .open(&self.path)?;
        configure_tty_raw(&file, self.baud)?;

        let fd = Arc::new(AsyncFd::new(file)?);
        Ok((
            TtyReader { fd: Arc::clone(&fd) },
            TtyWriter { fd, drain: None },
        ))
    }
}

/// Read half of an open TTY.
#[derive(Debug)]
pub struct TtyReader {
    fd: Arc<AsyncFd<File>>,
}

/// Write half of an open TTY.
#[derive(Debug)]
pub struct TtyWriter {
    fd: Arc<AsyncFd<File>>,
    drain: Option<JoinHandle<io::Result<()>>>,
}

impl AsyncRead for TtyReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        loop {
            let mut guard = ready!(self.fd.poll_read_ready(cx))?;
            let unfilled = buf.initialize_unfilled();
            match guard.try_io(|inner| {
                let mut file: &File = inner.get_ref();
                file.read(unfilled)
            }) {
                Ok(Ok(n)) => {
                    buf.advance(n);
                    return Poll::Ready(Ok(()));
                }
                Ok(Err(e)) => return Poll::Ready(Err(e)),
                Err(_would_block) => continue,
            }
        }
    }
}

impl AsyncWrite for TtyWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        loop {
            let mut guard = ready!(self.fd.poll_write_ready(cx))?;
            match guard.try_io(|inner| {
                let mut file: &File = inner.get_ref();
                file.write(buf)
            }) {
                Ok(result) => return Poll::Ready(result),
                Err(_would_block) => continue,
            }
        }
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        // writes go straight to the kernel
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let fd = &this.fd;
        let drain = this.drain.get_or_insert_with(|| {
            let fd = Arc::clone(fd);
            tokio::task::spawn_blocking(move || tcdrain(fd.get_ref()))
        });
        match ready!(Pin::new(drain).poll(cx)) {
            Ok(result) => Poll::Ready(result),
            Err(e) => Poll::Ready(Err(io::Error::other(e))),
        }
    }
}

/// Block until all output written to `file` has been transmitted.
fn tcdrain(file: &File) -> io::Result<()> {
    let result = unsafe { libc::tcdrain(file.as_raw_fd()) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Configure a TTY for raw 8N1 at `baud`.
fn configure_tty_raw(file: &File, baud: u32) -> io::Result<()> {
    use std::mem::MaybeUninit;

    let fd = file.as_raw_fd();
    let speed = baud_constant(baud)?;

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);
    termios.c_oflag &= !libc::OPOST;
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB | libc::CSTOPB);
    termios.c_cflag |= libc::CS8 | libc::CREAD | libc::CLOCAL;
    termios.c_cc[libc::VMIN] = 1;
    termios.c_cc[libc::VTIME] = 0;

    let result = unsafe {
        if libc::cfsetispeed(&mut termios, speed) != 0
            || libc::cfsetospeed(&mut termios, speed) != 0
        {
            -1
        } else {
            libc::tcsetattr(fd, libc::TCSANOW, &termios)
        }
    };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(())
}

fn baud_constant(baud: u32) -> io::Result<libc::speed_t> {
    Ok(match baud {
        1200 => libc::B1200,
        2400 => libc::B2400,
        4800 => libc::B4800,
        9600 => libc::B9600,
        19200 => libc::B19200,
        38400 => libc::B38400,
        57600 => libc::B57600,
        115200 => libc::B115200,
        230400 => libc::B230400,
        other => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unsupported baud rate {}", other),
            ));
        }
    })
}
