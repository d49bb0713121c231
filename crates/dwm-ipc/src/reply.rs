//! Consuming replies and events from dwm
//!
//! Replies are never parsed: the payload is written verbatim to the output,
//! or dropped when acknowledgements are suppressed. Either way exactly one
//! whole frame is read, which keeps the stream aligned on frame boundaries.

use std::convert::Infallible;
use std::io::{Read, Write};

use tracing::debug;

use crate::error::IpcError;
use crate::frame::read_frame;
use crate::transport::Connection;

/// What to do with a reply once it has been read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyMode {
    /// Write the payload followed by a newline
    Print,
    /// Read the frame and drop it
    Discard,
}

/// Read one frame and write its payload, plus a newline, to `out`
///
/// `out` is flushed so each reply is visible as soon as it arrives.
pub fn consume_and_print<S: Read, W: Write>(
    conn: &mut Connection<S>,
    out: &mut W,
) -> Result<(), IpcError> {
    let frame = read_frame(conn)?;

    out.write_all(&frame.payload)
        .and_then(|()| out.write_all(b"\n"))
        .and_then(|()| out.flush())
        .map_err(IpcError::OutputFailed)
}

/// Read one frame and drop it without producing any output
pub fn consume_and_discard<S: Read>(conn: &mut Connection<S>) -> Result<(), IpcError> {
    let frame = read_frame(conn)?;

    debug!(
        message_type = %frame.message_type,
        payload = %frame.payload_lossy(),
        "Discarded reply"
    );

    Ok(())
}

/// Read one frame and handle it according to `mode`
pub fn consume<S: Read, W: Write>(
    conn: &mut Connection<S>,
    out: &mut W,
    mode: ReplyMode,
) -> Result<(), IpcError> {
    match mode {
        ReplyMode::Print => consume_and_print(conn, out),
        ReplyMode::Discard => consume_and_discard(conn),
    }
}

/// Print frames forever
///
/// Only returns when reading or printing fails, with the error that
/// ended the loop.
pub fn monitor_loop<S: Read, W: Write>(
    conn: &mut Connection<S>,
    out: &mut W,
) -> Result<Infallible, IpcError> {
    debug!("Monitoring for events");

    loop {
        consume_and_print(conn, out)?;
    }
}
