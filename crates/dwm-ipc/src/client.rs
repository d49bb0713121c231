//! dwm IPC client
//!
//! `DwmClient` owns the connection and the client options. Each request is
//! written in full before its reply is read; the protocol is strictly
//! half-duplex until the client switches to monitoring events.

use std::convert::Infallible;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;

use tracing::info;

use crate::config::{ClientConfig, ClientOptions};
use crate::error::IpcError;
use crate::frame::write_frame;
use crate::message::Request;
use crate::reply::{self, ReplyMode};
use crate::transport::Connection;

/// Client for a single dwm IPC connection
///
/// # Example
///
/// ```ignore
/// let mut client = DwmClient::connect(&ClientConfig::default())?;
/// client.execute(&Request::GetTags, &mut std::io::stdout())?;
/// ```
#[derive(Debug)]
pub struct DwmClient<S = UnixStream> {
    conn: Connection<S>,
    options: ClientOptions,
}

impl DwmClient<UnixStream> {
    /// Connect to the socket named in `config`
    ///
    /// # Errors
    ///
    /// Returns `IpcError::InvalidSocketPath` or `IpcError::ConnectionFailed`
    /// if the socket cannot be reached.
    pub fn connect(config: &ClientConfig) -> Result<Self, IpcError> {
        let conn = Connection::connect(&config.socket_path)?;
        Ok(Self::new(conn, config.options))
    }
}

impl<S> DwmClient<S> {
    pub fn new(conn: Connection<S>, options: ClientOptions) -> Self {
        Self { conn, options }
    }

    #[cfg(test)]
    pub(crate) fn into_connection(self) -> Connection<S> {
        self.conn
    }
}

impl<S: Read + Write> DwmClient<S> {
    /// Frame and send `request` without waiting for a reply
    pub fn send(&mut self, request: &Request) -> Result<(), IpcError> {
        let payload = request.payload()?;
        write_frame(&mut self.conn, request.message_type(), &payload)
    }

    /// Send `request` and consume its reply
    ///
    /// Query results are always written to `out`. Acknowledgements of
    /// `run_command` and `subscribe` are read but dropped when
    /// `ignore_reply` is set.
    pub fn execute<W: Write>(&mut self, request: &Request, out: &mut W) -> Result<(), IpcError> {
        self.send(request)?;

        let mode = if request.replies_with_acknowledgement() {
            self.options.acknowledgement_mode()
        } else {
            ReplyMode::Print
        };

        reply::consume(&mut self.conn, out, mode)
    }

    /// Subscribe to each event in turn, consuming every acknowledgement
    pub fn subscribe<I, T, W>(&mut self, events: I, out: &mut W) -> Result<(), IpcError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
        W: Write,
    {
        for event in events {
            let event = event.as_ref();
            self.execute(&Request::subscribe(event), out)?;
            info!(event, "Subscribed to dwm event");
        }

        Ok(())
    }

    /// Wait for the next frame and print it
    pub fn print_next<W: Write>(&mut self, out: &mut W) -> Result<(), IpcError> {
        reply::consume_and_print(&mut self.conn, out)
    }

    /// Print every frame dwm sends from now on
    ///
    /// Returns only with the error that ended the stream.
    pub fn monitor<W: Write>(&mut self, out: &mut W) -> Result<Infallible, IpcError> {
        reply::monitor_loop(&mut self.conn, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{encode_frame, read_frame, FrameSection, MessageType};
    use crate::message::PLACEHOLDER_PAYLOAD;
    use crate::testing::ChunkedStream;
    use std::os::unix::net::UnixListener;
    use std::path::PathBuf;
    use std::thread::{self, JoinHandle};
    use tempfile::{tempdir, TempDir};

    const SUCCESS: &str = r#"{"result":"success"}"#;

    /// Start a fake dwm that serves a single connection with `handler`
    fn spawn_fake_dwm<F>(handler: F) -> (TempDir, PathBuf, JoinHandle<()>)
    where
        F: FnOnce(Connection<UnixStream>) + Send + 'static,
    {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let socket_path = temp_dir.path().join("dwm.sock");
        let listener = UnixListener::bind(&socket_path).expect("Failed to bind fake dwm");

        let handle = thread::spawn(move || {
            let (stream, _addr) = listener.accept().expect("Failed to accept");
            handler(Connection::new(stream));
        });

        (temp_dir, socket_path, handle)
    }

    fn config(socket_path: PathBuf, ignore_reply: bool) -> ClientConfig {
        ClientConfig {
            socket_path,
            options: ClientOptions { ignore_reply },
        }
    }

    #[test]
    fn test_get_tags_round_trip() {
        let (_dir, socket_path, server) = spawn_fake_dwm(|mut conn| {
            let request = read_frame(&mut conn).unwrap();
            assert_eq!(request.message_type, MessageType::GetTags);
            assert_eq!(request.payload, PLACEHOLDER_PAYLOAD);

            write_frame(&mut conn, MessageType::GetTags, br#"[{"bit_mask":1,"name":"1"}]"#)
                .unwrap();
        });

        let mut client = DwmClient::connect(&config(socket_path, false)).unwrap();
        let mut out = Vec::new();
        client.execute(&Request::GetTags, &mut out).unwrap();
        server.join().unwrap();

        assert_eq!(out, b"[{\"bit_mask\":1,\"name\":\"1\"}]\n");
    }

    #[test]
    fn test_run_command_sends_typed_arguments() {
        let (_dir, socket_path, server) = spawn_fake_dwm(|mut conn| {
            let request = read_frame(&mut conn).unwrap();
            assert_eq!(request.message_type, MessageType::RunCommand);
            assert_eq!(
                request.payload_lossy(),
                r#"{"command":"view","args":[1,-2,3.5,"tag"]}"#
            );

            write_frame(&mut conn, MessageType::RunCommand, SUCCESS.as_bytes()).unwrap();
        });

        let mut client = DwmClient::connect(&config(socket_path, false)).unwrap();
        let mut out = Vec::new();
        let request = Request::run_command("view", ["1", "-2", "3.5", "tag"]);
        client.execute(&request, &mut out).unwrap();
        server.join().unwrap();

        assert_eq!(out, format!("{}\n", SUCCESS).as_bytes());
    }

    #[test]
    fn test_ignored_acknowledgement_keeps_stream_aligned() {
        let (_dir, socket_path, server) = spawn_fake_dwm(|mut conn| {
            read_frame(&mut conn).unwrap();
            write_frame(&mut conn, MessageType::RunCommand, SUCCESS.as_bytes()).unwrap();

            read_frame(&mut conn).unwrap();
            write_frame(&mut conn, MessageType::GetLayouts, br#"[{"symbol":"[]="}]"#).unwrap();
        });

        let mut client = DwmClient::connect(&config(socket_path, true)).unwrap();
        let mut out = Vec::new();
        client
            .execute(&Request::run_command("togglebar", Vec::<String>::new()), &mut out)
            .unwrap();
        assert!(out.is_empty(), "acknowledgement should be suppressed");

        client.execute(&Request::GetLayouts, &mut out).unwrap();
        server.join().unwrap();

        assert_eq!(out, b"[{\"symbol\":\"[]=\"}]\n");
    }

    #[test]
    fn test_ignore_reply_never_hides_query_results() {
        let reply = encode_frame(MessageType::GetMonitors, b"[]").unwrap();
        let conn = Connection::new(ChunkedStream::new(reply, 64));
        let mut client = DwmClient::new(conn, ClientOptions { ignore_reply: true });
        let mut out = Vec::new();

        client.execute(&Request::GetMonitors, &mut out).unwrap();

        assert_eq!(out, b"[]\n");
    }

    #[test]
    fn test_request_frame_identical_over_short_writes() {
        let request = Request::run_command("setmfact", ["-0.05"]);
        let expected = encode_frame(MessageType::RunCommand, &request.payload().unwrap()).unwrap();

        for chunk in [1, 3, 1024] {
            let reply = encode_frame(MessageType::RunCommand, SUCCESS.as_bytes()).unwrap();
            let stream = ChunkedStream::new(reply, chunk).with_interrupts();
            let mut client = DwmClient::new(Connection::new(stream), ClientOptions::default());
            let mut out = Vec::new();

            client.execute(&request, &mut out).unwrap();

            let stream = client.into_connection().into_inner();
            assert_eq!(stream.written, expected, "chunk size {}", chunk);
            assert_eq!(out, format!("{}\n", SUCCESS).as_bytes());
        }
    }

    #[test]
    fn test_subscribe_then_monitor_until_dwm_exits() {
        let (_dir, socket_path, server) = spawn_fake_dwm(|mut conn| {
            let request = read_frame(&mut conn).unwrap();
            assert_eq!(request.message_type, MessageType::Subscribe);
            assert_eq!(
                request.payload_lossy(),
                r#"{"event":"tag_change_event","action":"subscribe"}"#
            );
            write_frame(&mut conn, MessageType::Subscribe, SUCCESS.as_bytes()).unwrap();

            for tags in [1, 2, 4] {
                let event = format!(
                    r#"{{"tag_change_event":{{"new_state":{{"selected":{}}}}}}}"#,
                    tags
                );
                write_frame(&mut conn, MessageType::Event, event.as_bytes()).unwrap();
            }
            // Dropping the connection simulates dwm exiting
        });

        let mut client = DwmClient::connect(&config(socket_path, false)).unwrap();
        let mut out = Vec::new();
        client.subscribe(["tag_change_event"], &mut out).unwrap();
        let err = client.monitor(&mut out).unwrap_err();
        server.join().unwrap();

        match err {
            IpcError::ConnectionClosed { section, .. } => {
                assert_eq!(section, FrameSection::Header)
            }
            other => panic!("Expected ConnectionClosed, got: {:?}", other),
        }

        let printed = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = printed.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], SUCCESS);
        assert!(lines[3].contains(r#""selected":4"#));
    }

    #[test]
    fn test_subscribe_to_several_events_with_ignored_replies() {
        let (_dir, socket_path, server) = spawn_fake_dwm(|mut conn| {
            for expected in ["layout_change_event", "client_focus_change_event"] {
                let request = read_frame(&mut conn).unwrap();
                assert!(request.payload_lossy().contains(expected));
                write_frame(&mut conn, MessageType::Subscribe, SUCCESS.as_bytes()).unwrap();
            }
            write_frame(&mut conn, MessageType::Event, br#"{"layout_change_event":{}}"#).unwrap();
        });

        let mut client = DwmClient::connect(&config(socket_path, true)).unwrap();
        let mut out = Vec::new();
        client
            .subscribe(["layout_change_event", "client_focus_change_event"], &mut out)
            .unwrap();
        assert!(out.is_empty());

        client.print_next(&mut out).unwrap();
        server.join().unwrap();

        assert_eq!(out, b"{\"layout_change_event\":{}}\n");
    }

    #[test]
    fn test_connect_without_dwm() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let socket_path = temp_dir.path().join("dwm.sock");

        let err = DwmClient::connect(&config(socket_path, false)).unwrap_err();
        assert!(matches!(err, IpcError::ConnectionFailed { .. }));
    }
}
