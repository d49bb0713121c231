//! Blocking byte transport over the dwm IPC socket
//!
//! `Connection` owns the stream and provides the two primitives the framing
//! layer needs: `write_all` and `read_exact`. Both loop on short transfers
//! and silently retry transient conditions (`EINTR`, `EAGAIN`) at the exact
//! offset where they occurred, so callers never observe partial progress.

use std::io::{self, Read, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;

use nix::sys::socket::UnixAddr;
use tracing::{debug, trace};

use crate::error::IpcError;
use crate::frame::FrameSection;

/// Returns true for OS conditions that mean "try the same call again"
pub fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
    )
}

/// Run `op` until it returns something other than a transient error
pub(crate) fn retry_transient<T>(mut op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    loop {
        match op() {
            Err(e) if is_transient(&e) => {
                trace!(kind = ?e.kind(), "Transient socket condition, retrying");
            }
            result => return result,
        }
    }
}

/// Check that `path` can be used as a Unix socket address
///
/// The path must be non-empty and fit in `sockaddr_un.sun_path`.
fn validate_socket_path(path: &Path) -> Result<(), IpcError> {
    if path.as_os_str().is_empty() {
        return Err(IpcError::InvalidSocketPath {
            path: path.to_path_buf(),
            reason: "path is empty".to_string(),
        });
    }

    UnixAddr::new(path).map_err(|errno| IpcError::InvalidSocketPath {
        path: path.to_path_buf(),
        reason: errno.desc().to_string(),
    })?;

    Ok(())
}

/// A single, exclusively owned stream to the dwm IPC server
#[derive(Debug)]
pub struct Connection<S = UnixStream> {
    stream: S,
}

impl Connection<UnixStream> {
    /// Connect to the dwm socket at `path`
    ///
    /// # Errors
    ///
    /// Returns `IpcError::InvalidSocketPath` if the path is empty or too long
    /// for a Unix socket address.
    /// Returns `IpcError::ConnectionFailed` if nothing is listening there.
    pub fn connect(path: &Path) -> Result<Self, IpcError> {
        validate_socket_path(path)?;

        let stream = UnixStream::connect(path).map_err(|source| IpcError::ConnectionFailed {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Connected to dwm socket at {}", path.display());

        Ok(Self::new(stream))
    }
}

impl<S> Connection<S> {
    /// Wrap an already established stream
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    #[cfg(test)]
    pub(crate) fn get_ref(&self) -> &S {
        &self.stream
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Write> Connection<S> {
    /// Write every byte of `buf` to the stream
    ///
    /// # Errors
    ///
    /// Returns `IpcError::SendFailed` on any non-transient write error, or if
    /// the stream accepts zero bytes.
    pub fn write_all(&mut self, buf: &[u8]) -> Result<(), IpcError> {
        let mut written = 0;

        while written < buf.len() {
            let n = retry_transient(|| self.stream.write(&buf[written..]))
                .map_err(IpcError::SendFailed)?;

            if n == 0 {
                return Err(IpcError::SendFailed(io::ErrorKind::WriteZero.into()));
            }

            written += n;
        }

        retry_transient(|| self.stream.flush()).map_err(IpcError::SendFailed)
    }
}

impl<S: Read> Connection<S> {
    /// Fill `buf` completely with bytes belonging to `section` of a frame
    ///
    /// # Errors
    ///
    /// Returns `IpcError::ConnectionClosed` if the stream hits EOF first.
    /// Returns `IpcError::ReceiveFailed` on any non-transient read error.
    pub fn read_exact(&mut self, buf: &mut [u8], section: FrameSection) -> Result<(), IpcError> {
        let mut received = 0;

        while received < buf.len() {
            let n = retry_transient(|| self.stream.read(&mut buf[received..]))
                .map_err(IpcError::ReceiveFailed)?;

            if n == 0 {
                return Err(IpcError::ConnectionClosed {
                    section,
                    received,
                    expected: buf.len(),
                });
            }

            received += n;
        }

        Ok(())
    }
}
