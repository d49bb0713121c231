//! dwm-msg
//!
//! Send IPC messages to dwm and print the replies.

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;

use clap::{CommandFactory, FromArgMatches, Parser, ValueEnum};
use dwm_ipc::{
    is_unsigned_integer, ClientConfig, ClientOptions, DwmClient, ErrorCategory, IpcError,
    Request, KNOWN_EVENTS,
};
use miette::Diagnostic;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dwm-msg")]
#[command(about = "Communicate with dwm, the suckless window manager")]
#[command(version)]
struct Cli {
    /// Path to the dwm IPC socket [default: $DWM_SOCKET or /tmp/dwm.sock]
    #[arg(short, long)]
    socket: Option<String>,

    /// Type of message to send
    #[arg(
        short = 't',
        long = "type",
        value_enum,
        ignore_case = true,
        default_value_t = MessageKind::RunCommand
    )]
    message_type: MessageKind,

    /// Don't print "success" replies from run_command and subscribe
    #[arg(short, long)]
    ignore_reply: bool,

    /// With subscribe, keep listening for events instead of exiting after
    /// the first one
    #[arg(short, long)]
    monitor: bool,

    /// Log protocol traffic to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Command name and arguments, window id, or event names
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum MessageKind {
    /// Run an IPC command: <name> [args...]
    #[value(name = "run_command", alias = "command")]
    RunCommand,
    /// Get monitor properties
    #[value(name = "get_monitors")]
    GetMonitors,
    /// Get the list of tags
    #[value(name = "get_tags")]
    GetTags,
    /// Get the list of layouts
    #[value(name = "get_layouts")]
    GetLayouts,
    /// Get dwm client properties: <window_id>
    #[value(name = "get_dwm_client")]
    GetDwmClient,
    /// Subscribe to events: <event>...
    #[value(name = "subscribe")]
    Subscribe,
}

#[derive(Debug, Error, Diagnostic)]
enum CliError {
    #[error("{0}")]
    #[diagnostic(code(dwm_msg::usage), help("try 'dwm-msg --help'"))]
    Usage(String),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Ipc(#[from] IpcError),
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            Self::Usage(_) => 1,
            Self::Ipc(e) => match e.category() {
                ErrorCategory::Connection => 2,
                ErrorCategory::Io => 3,
                ErrorCategory::Protocol => 4,
            },
        }
    }
}

/// Exit status for an argument parsing failure
///
/// `--help` and `--version` end up here too and are not failures.
fn parse_error_exit_code(err: &clap::Error) -> u8 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}

fn usage(message: &str) -> CliError {
    CliError::Usage(message.to_string())
}

/// What the invocation asks dwm for, validated before connecting
#[derive(Debug, PartialEq)]
enum Action {
    /// One request, one reply
    Request(Request),
    /// Subscribe to every event, then print events
    Subscribe { events: Vec<String>, monitor: bool },
}

impl Action {
    fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.monitor && cli.message_type != MessageKind::Subscribe {
            return Err(usage(
                "The monitor option -m is used with \"-t subscribe\" exclusively",
            ));
        }

        let request = match cli.message_type {
            MessageKind::RunCommand => {
                let (name, args) = cli
                    .args
                    .split_first()
                    .ok_or_else(|| usage("No command specified"))?;
                Request::run_command(name.as_str(), args)
            }
            MessageKind::GetMonitors => Request::GetMonitors,
            MessageKind::GetTags => Request::GetTags,
            MessageKind::GetLayouts => Request::GetLayouts,
            MessageKind::GetDwmClient => {
                let token = cli
                    .args
                    .first()
                    .ok_or_else(|| usage("Expected the window id"))?;
                Request::get_dwm_client(parse_window_id(token)?)
            }
            MessageKind::Subscribe => {
                if cli.args.is_empty() {
                    return Err(usage("Expected event name"));
                }
                return Ok(Self::Subscribe {
                    events: cli.args.clone(),
                    monitor: cli.monitor,
                });
            }
        };

        let consumed = match request {
            Request::RunCommand { .. } => cli.args.len(),
            Request::GetDwmClient { .. } => 1,
            _ => 0,
        };
        if cli.args.len() > consumed {
            tracing::warn!(
                "Ignoring {} extra argument(s) for {}",
                cli.args.len() - consumed,
                request.message_type()
            );
        }

        Ok(Self::Request(request))
    }
}

fn parse_window_id(token: &str) -> Result<u64, CliError> {
    if !is_unsigned_integer(token) {
        return Err(usage("Expected unsigned integer argument"));
    }

    token
        .parse()
        .map_err(|_| usage("Window id is out of range"))
}

fn events_help() -> String {
    format!("Events for subscribe:\n  {}", KNOWN_EVENTS.join("\n  "))
}

fn parse_cli_from<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = Cli::command()
        .after_help(events_help())
        .try_get_matches_from(args)?;
    Cli::from_arg_matches(&matches)
}

fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<(), CliError> {
    let action = Action::from_cli(cli)?;

    let config = ClientConfig::new(
        cli.socket.as_deref(),
        ClientOptions {
            ignore_reply: cli.ignore_reply,
        },
    );

    tracing::debug!("Connecting to {}", config.socket_path.display());

    let mut client = DwmClient::connect(&config)?;

    match action {
        Action::Request(request) => client.execute(&request, out)?,
        Action::Subscribe { events, monitor } => {
            client.subscribe(&events, out)?;

            if monitor {
                let never = client.monitor(out)?;
                match never {}
            }

            client.print_next(out)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };

    // Replies go to stdout, so logs must stay on stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = match parse_cli_from(std::env::args_os()) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(parse_error_exit_code(&err));
        }
    };

    init_tracing(cli.verbose);

    match run(&cli, &mut io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            ExitCode::from(code)
        }
    }
}
