//! Client library for the dwm IPC protocol
//!
//! dwm (with the IPC patch) listens on a Unix socket, `/tmp/dwm.sock` by
//! default. Clients send framed requests and receive framed replies; after a
//! `subscribe` request the same connection also delivers event frames.
//!
//! ## Architecture
//!
//! - `transport`: the owned socket and its retrying `write_all`/`read_exact`
//! - `frame`: the 12-byte header codec and whole-frame read/write
//! - `classify`: type inference for `run_command` arguments
//! - `message`: typed `Request`s and their JSON payloads
//! - `reply`: printing, discarding and monitoring replies
//! - `client`: `DwmClient`, which ties the above together
//! - `config`: socket path resolution and client options

mod classify;
mod client;
mod config;
mod error;
mod frame;
mod message;
mod reply;
mod transport;

#[cfg(test)]
mod testing;

pub use classify::{
    classify, is_float, is_signed_integer, is_unsigned_integer, Argument, ArgumentKind,
};
pub use client::DwmClient;
pub use config::{
    resolve_socket_path, ClientConfig, ClientOptions, DEFAULT_SOCKET_PATH, DWM_SOCKET_ENV,
};
pub use error::{ErrorCategory, IpcError};
pub use frame::{
    encode_frame, read_frame, write_frame, Frame, FrameHeader, FrameSection, MessageType,
    HEADER_SIZE, MAGIC,
};
pub use message::{Request, KNOWN_EVENTS, PLACEHOLDER_PAYLOAD};
pub use reply::{consume, consume_and_discard, consume_and_print, monitor_loop, ReplyMode};
pub use transport::{is_transient, Connection};
