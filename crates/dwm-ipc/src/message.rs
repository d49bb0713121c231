//! Request payloads sent to dwm
//!
//! Each request kind has a fixed payload shape:
//!
//! - `run_command`: `{"command": "<name>", "args": [...]}`
//! - `get_dwm_client`: `{"client_window_id": <id>}`
//! - `subscribe`: `{"event": "<event>", "action": "subscribe"}`
//! - `get_monitors`, `get_tags`, `get_layouts`: a single placeholder byte
//!
//! The JSON documents are built from typed structs, so every request
//! serializes to a well-formed object with its keys in protocol order.

use serde::Serialize;

use crate::classify::Argument;
use crate::error::IpcError;
use crate::frame::MessageType;

/// Payload of the bare `get_*` queries
///
/// dwm rejects zero-length messages, so one byte is always sent.
pub const PLACEHOLDER_PAYLOAD: &[u8] = &[0];

/// Event names dwm currently publishes
pub const KNOWN_EVENTS: [&str; 6] = [
    "tag_change_event",
    "client_focus_change_event",
    "layout_change_event",
    "monitor_focus_change_event",
    "focused_title_change_event",
    "focused_state_change_event",
];

#[derive(Serialize)]
struct RunCommandPayload<'a> {
    command: &'a str,
    args: &'a [Argument],
}

#[derive(Serialize)]
struct GetDwmClientPayload {
    client_window_id: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum SubscriptionAction {
    Subscribe,
}

#[derive(Serialize)]
struct SubscribePayload<'a> {
    event: &'a str,
    action: SubscriptionAction,
}

/// A request the client can send to dwm
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Run a named dwm IPC command
    RunCommand { name: String, args: Vec<Argument> },
    /// Query monitor properties
    GetMonitors,
    /// Query the list of tags
    GetTags,
    /// Query the list of layouts
    GetLayouts,
    /// Query the properties of the client owning an X window
    GetDwmClient { window_id: u64 },
    /// Subscribe this connection to an event
    Subscribe { event: String },
}

impl Request {
    /// Build a `run_command` request, inferring each argument's type
    pub fn run_command<I, T>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Self::RunCommand {
            name: name.into(),
            args: args
                .into_iter()
                .map(|arg| Argument::from_token(arg.as_ref()))
                .collect(),
        }
    }

    pub fn get_dwm_client(window_id: u64) -> Self {
        Self::GetDwmClient { window_id }
    }

    pub fn subscribe(event: impl Into<String>) -> Self {
        Self::Subscribe {
            event: event.into(),
        }
    }

    /// The header type this request is framed with
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::RunCommand { .. } => MessageType::RunCommand,
            Self::GetMonitors => MessageType::GetMonitors,
            Self::GetTags => MessageType::GetTags,
            Self::GetLayouts => MessageType::GetLayouts,
            Self::GetDwmClient { .. } => MessageType::GetDwmClient,
            Self::Subscribe { .. } => MessageType::Subscribe,
        }
    }

    /// Whether dwm answers this request with a bare success acknowledgement
    ///
    /// Only acknowledgements may be suppressed; query results are always
    /// printed.
    pub fn replies_with_acknowledgement(&self) -> bool {
        matches!(self, Self::RunCommand { .. } | Self::Subscribe { .. })
    }

    /// Serialize the request body
    ///
    /// # Errors
    ///
    /// Returns `IpcError::SerializeFailed` if JSON serialization fails.
    pub fn payload(&self) -> Result<Vec<u8>, IpcError> {
        let payload = match self {
            Self::RunCommand { name, args } => serde_json::to_vec(&RunCommandPayload {
                command: name,
                args,
            }),
            Self::GetMonitors | Self::GetTags | Self::GetLayouts => {
                return Ok(PLACEHOLDER_PAYLOAD.to_vec())
            }
            Self::GetDwmClient { window_id } => serde_json::to_vec(&GetDwmClientPayload {
                client_window_id: *window_id,
            }),
            Self::Subscribe { event } => serde_json::to_vec(&SubscribePayload {
                event,
                action: SubscriptionAction::Subscribe,
            }),
        };

        payload.map_err(IpcError::SerializeFailed)
    }
}
