//! Error types for dwm IPC operations

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::frame::FrameSection;

/// Broad classification of an [`IpcError`]
///
/// Used by the CLI to pick a process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The stream could not be established
    Connection,
    /// A read or write on an established stream could not complete
    Io,
    /// The peer sent something that is not a valid dwm IPC frame
    Protocol,
}

/// Errors that can occur when communicating with dwm
#[derive(Debug, Error, Diagnostic)]
pub enum IpcError {
    /// The socket path cannot be used as a Unix socket address
    #[error("Invalid socket path {path}: {reason}")]
    #[diagnostic(code(dwm_ipc::invalid_socket_path))]
    InvalidSocketPath { path: PathBuf, reason: String },

    /// Failed to connect to the dwm socket
    #[error("Failed to connect to dwm socket at {path}: {source}")]
    #[diagnostic(
        code(dwm_ipc::connection_failed),
        help("is dwm running with the IPC patch applied?")
    )]
    ConnectionFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to send a request to dwm
    #[error("Failed to send request to dwm: {0}")]
    #[diagnostic(code(dwm_ipc::send_failed))]
    SendFailed(#[source] std::io::Error),

    /// Failed to receive a reply from dwm
    #[error("Failed to receive reply from dwm: {0}")]
    #[diagnostic(code(dwm_ipc::receive_failed))]
    ReceiveFailed(#[source] std::io::Error),

    /// The stream reached EOF before a full frame section was read
    #[error(
        "Connection to dwm closed while reading {section}: read {received} of {expected} bytes"
    )]
    #[diagnostic(
        code(dwm_ipc::connection_closed),
        help("the connection might have been lost")
    )]
    ConnectionClosed {
        section: FrameSection,
        received: usize,
        expected: usize,
    },

    /// The header did not start with the protocol magic
    #[error("Invalid magic string: got '{found}', expected 'DWM-IPC'")]
    #[diagnostic(code(dwm_ipc::invalid_magic))]
    InvalidMagic { found: String },

    /// The header carried a message type this client does not know
    #[error("Unknown message type {0} in reply header")]
    #[diagnostic(code(dwm_ipc::unknown_message_type))]
    UnknownMessageType(u8),

    /// The payload does not fit the 32-bit size field
    #[error("Payload of {0} bytes exceeds the maximum frame size")]
    #[diagnostic(code(dwm_ipc::payload_too_large))]
    PayloadTooLarge(usize),

    /// Failed to serialize a request document to JSON
    #[error("Failed to serialize request: {0}")]
    #[diagnostic(code(dwm_ipc::serialize_failed))]
    SerializeFailed(#[source] serde_json::Error),

    /// Failed to write a reply to the output stream
    #[error("Failed to write reply: {0}")]
    #[diagnostic(code(dwm_ipc::output_failed))]
    OutputFailed(#[source] std::io::Error),
}

impl IpcError {
    /// Classify this error as a connection, I/O or protocol failure
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidSocketPath { .. } | Self::ConnectionFailed { .. } => {
                ErrorCategory::Connection
            }
            Self::InvalidMagic { .. } | Self::UnknownMessageType(_) => ErrorCategory::Protocol,
            Self::SendFailed(_)
            | Self::ReceiveFailed(_)
            | Self::ConnectionClosed { .. }
            | Self::PayloadTooLarge(_)
            | Self::SerializeFailed(_)
            | Self::OutputFailed(_) => ErrorCategory::Io,
        }
    }
}
