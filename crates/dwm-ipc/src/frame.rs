//! Wire framing for the dwm IPC protocol
//!
//! Every message, in either direction, is a fixed 12-byte header followed by
//! the payload:
//!
//! ```text
//! ┌───────────┬──────────────┬──────────────┬─────────────────┐
//! │ Magic     │ Payload size │ Message type │ Payload         │
//! │ "DWM-IPC" │ u32 LE       │ u8           │ payload_size B  │
//! │ 7 bytes   │ 4 bytes      │ 1 byte       │                 │
//! └───────────┴──────────────┴──────────────┴─────────────────┘
//! ```
//!
//! dwm writes its packed header struct straight from memory, so the size
//! field is in the byte order of the host running dwm. Little-endian covers
//! every platform dwm is realistically built for.

use std::fmt;
use std::io::{self, Read, Write};

use tracing::debug;

use crate::error::IpcError;
use crate::transport::Connection;

/// Protocol magic that starts every frame header
pub const MAGIC: [u8; 7] = *b"DWM-IPC";

/// Header size in bytes: magic, payload size, message type
pub const HEADER_SIZE: usize = MAGIC.len() + 4 + 1;

/// Discriminator carried in the last header byte
///
/// The numeric values are fixed by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    RunCommand = 0,
    GetMonitors = 1,
    GetTags = 2,
    GetLayouts = 3,
    GetDwmClient = 4,
    Subscribe = 5,
    /// Sent only by dwm, to subscribed clients
    Event = 6,
}

impl MessageType {
    /// Protocol name of this message type
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RunCommand => "run_command",
            Self::GetMonitors => "get_monitors",
            Self::GetTags => "get_tags",
            Self::GetLayouts => "get_layouts",
            Self::GetDwmClient => "get_dwm_client",
            Self::Subscribe => "subscribe",
            Self::Event => "event",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<MessageType> for u8 {
    fn from(message_type: MessageType) -> Self {
        message_type as u8
    }
}

impl TryFrom<u8> for MessageType {
    type Error = IpcError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::RunCommand),
            1 => Ok(Self::GetMonitors),
            2 => Ok(Self::GetTags),
            3 => Ok(Self::GetLayouts),
            4 => Ok(Self::GetDwmClient),
            5 => Ok(Self::Subscribe),
            6 => Ok(Self::Event),
            other => Err(IpcError::UnknownMessageType(other)),
        }
    }
}

/// Which part of a frame a read was collecting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSection {
    Header,
    Payload,
}

impl fmt::Display for FrameSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => f.write_str("header"),
            Self::Payload => f.write_str("payload"),
        }
    }
}

/// Decoded frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub message_type: MessageType,
    /// Number of payload bytes following the header
    pub payload_size: u32,
}

impl FrameHeader {
    pub fn new(message_type: MessageType, payload_size: u32) -> Self {
        Self {
            message_type,
            payload_size,
        }
    }

    /// Encode the header into its wire representation
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[..MAGIC.len()].copy_from_slice(&MAGIC);
        buf[MAGIC.len()..HEADER_SIZE - 1].copy_from_slice(&self.payload_size.to_le_bytes());
        buf[HEADER_SIZE - 1] = self.message_type.into();
        buf
    }

    /// Decode a header from its wire representation
    ///
    /// The magic is checked before any other field is looked at.
    ///
    /// # Errors
    ///
    /// Returns `IpcError::InvalidMagic` if the first 7 bytes are not `DWM-IPC`.
    /// Returns `IpcError::UnknownMessageType` for a type byte outside 0..=6.
    pub fn decode(bytes: &[u8; HEADER_SIZE]) -> Result<Self, IpcError> {
        let (magic, rest) = bytes.split_at(MAGIC.len());
        if magic != MAGIC.as_slice() {
            return Err(IpcError::InvalidMagic {
                found: String::from_utf8_lossy(magic).into_owned(),
            });
        }

        let payload_size = u32::from_le_bytes([rest[0], rest[1], rest[2], rest[3]]);
        let message_type = MessageType::try_from(rest[4])?;

        Ok(Self {
            message_type,
            payload_size,
        })
    }
}

/// A complete frame received from dwm
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub message_type: MessageType,
    pub payload: Vec<u8>,
}

impl Frame {
    /// The payload as text, replacing invalid UTF-8
    pub fn payload_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

/// Encode `payload` into a complete frame of the given type
///
/// # Errors
///
/// Returns `IpcError::PayloadTooLarge` if the payload length does not fit
/// the 32-bit size field.
pub fn encode_frame(message_type: MessageType, payload: &[u8]) -> Result<Vec<u8>, IpcError> {
    let payload_size =
        u32::try_from(payload.len()).map_err(|_| IpcError::PayloadTooLarge(payload.len()))?;

    let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
    frame.extend_from_slice(&FrameHeader::new(message_type, payload_size).encode());
    frame.extend_from_slice(payload);
    Ok(frame)
}

/// Encode a frame and write it to the connection in full
pub fn write_frame<S: Write>(
    conn: &mut Connection<S>,
    message_type: MessageType,
    payload: &[u8],
) -> Result<(), IpcError> {
    let frame = encode_frame(message_type, payload)?;

    debug!(
        message_type = %message_type,
        payload_size = payload.len(),
        "Sending frame"
    );

    conn.write_all(&frame)
}

/// Read one complete frame from the connection
///
/// The payload buffer is sized from the header as sent by the server.
///
/// # Errors
///
/// Returns `IpcError::ConnectionClosed` if the stream ends mid-frame,
/// `IpcError::ReceiveFailed` on other read errors or if the payload buffer
/// cannot be allocated, and a protocol error if the header is invalid.
pub fn read_frame<S: Read>(conn: &mut Connection<S>) -> Result<Frame, IpcError> {
    let mut header_bytes = [0u8; HEADER_SIZE];
    conn.read_exact(&mut header_bytes, FrameSection::Header)?;
    let header = FrameHeader::decode(&header_bytes)?;

    let payload_size = header.payload_size as usize;
    let mut payload = Vec::new();
    payload
        .try_reserve_exact(payload_size)
        .map_err(|_| IpcError::ReceiveFailed(io::ErrorKind::OutOfMemory.into()))?;
    payload.resize(payload_size, 0);

    conn.read_exact(&mut payload, FrameSection::Payload)?;

    debug!(
        message_type = %header.message_type,
        payload_size,
        "Received frame"
    );

    Ok(Frame {
        message_type: header.message_type,
        payload,
    })
}
