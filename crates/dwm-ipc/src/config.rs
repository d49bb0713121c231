//! Client configuration
//!
//! The socket path is resolved from, in order of precedence:
//!
//! 1. An explicit override (the `--socket` flag)
//! 2. The `DWM_SOCKET` environment variable
//! 3. `/tmp/dwm.sock`, where the dwm IPC patch listens by default
//!
//! A leading `~` is expanded to the home directory.

use std::path::PathBuf;

use crate::reply::ReplyMode;

/// Socket path used when nothing else is configured
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/dwm.sock";

/// Environment variable that overrides the default socket path
pub const DWM_SOCKET_ENV: &str = "DWM_SOCKET";

/// Per-connection behaviour that is not part of any single request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientOptions {
    /// Read and drop `run_command`/`subscribe` acknowledgements instead of
    /// printing them
    pub ignore_reply: bool,
}

impl ClientOptions {
    /// How acknowledgement replies should be consumed
    pub fn acknowledgement_mode(&self) -> ReplyMode {
        if self.ignore_reply {
            ReplyMode::Discard
        } else {
            ReplyMode::Print
        }
    }
}

/// Everything needed to open a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub socket_path: PathBuf,
    pub options: ClientOptions,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            options: ClientOptions::default(),
        }
    }
}

impl ClientConfig {
    /// Build a config, resolving the socket path against the environment
    pub fn new(socket_override: Option<&str>, options: ClientOptions) -> Self {
        Self {
            socket_path: resolve_socket_path(socket_override),
            options,
        }
    }
}

/// Resolve the socket path from an optional override and `$DWM_SOCKET`
pub fn resolve_socket_path(socket_override: Option<&str>) -> PathBuf {
    resolve_socket_path_with(socket_override, std::env::var(DWM_SOCKET_ENV).ok())
}

fn resolve_socket_path_with(socket_override: Option<&str>, env_value: Option<String>) -> PathBuf {
    let raw = match socket_override {
        Some(path) => path.to_string(),
        None => env_value
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_SOCKET_PATH.to_string()),
    };

    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}
