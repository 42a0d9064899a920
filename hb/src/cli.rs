//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// hb - host bridge for correlated request/response messaging
#[derive(Parser)]
#[command(
    name = "hb",
    about = "Host bridge: correlated request/response messaging over a local socket",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the host side and answer requests on the bridge socket
    Serve {
        /// Socket path (overrides config)
        #[arg(short, long)]
        socket: Option<PathBuf>,

        /// Exit after the first connection closes
        #[arg(long)]
        once: bool,
    },

    /// Send one request to the host and print the response
    Call {
        /// Command name, e.g. ECHO
        command: String,

        /// JSON request body
        #[arg(default_value = "{}")]
        body: String,

        /// Socket path (overrides config)
        #[arg(short, long)]
        socket: Option<PathBuf>,

        /// Response timeout in milliseconds (defaults to the configured request timeout)
        #[arg(short, long)]
        timeout_ms: Option<u64>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Check that the host is alive and print its version
    Ping {
        /// Socket path (overrides config)
        #[arg(short, long)]
        socket: Option<PathBuf>,
    },

    /// List the commands the host answers
    Commands,
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hostbridge")
        .join("logs")
        .join("hostbridge.log");
    debug!(?path, "get_log_path: returning path");
    path
}

/// Generate the after_help text with socket status and log location
pub fn generate_after_help() -> String {
    debug!("generate_after_help: called");
    let socket_path = crate::ipc::get_socket_path();
    let log_path = get_log_path();

    let mut help = String::new();

    help.push_str("Host socket:\n");
    let icon = if socket_path.exists() {
        debug!("generate_after_help: socket present");
        "\u{2705}"
    } else {
        debug!("generate_after_help: socket missing");
        "\u{274C}"
    };
    help.push_str(&format!("  {} {}\n", icon, socket_path.display()));

    help.push('\n');
    help.push_str(&format!("Logs are written to: {}\n", log_path.display()));

    debug!("generate_after_help: returning help text");
    help
}

/// Output format for call results
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => {
                debug!(%s, "OutputFormat::from_str: unknown format");
                Err(format!("Unknown format: {}. Use: text or json", s))
            }
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_serve() {
        let cli = Cli::parse_from(["hb", "serve"]);
        assert!(matches!(cli.command, Command::Serve { socket: None, once: false }));
    }

    #[test]
    fn test_cli_parse_serve_once_with_socket() {
        let cli = Cli::parse_from(["hb", "serve", "--once", "-s", "/tmp/hb.sock"]);
        if let Command::Serve { socket, once } = cli.command {
            assert_eq!(socket, Some(PathBuf::from("/tmp/hb.sock")));
            assert!(once);
        } else {
            panic!("Expected Serve command");
        }
    }

    #[test]
    fn test_cli_parse_call() {
        let cli = Cli::parse_from(["hb", "call", "ECHO", r#"{"v":1}"#, "--timeout-ms", "250", "-f", "json"]);
        if let Command::Call {
            command,
            body,
            socket,
            timeout_ms,
            format,
        } = cli.command
        {
            assert_eq!(command, "ECHO");
            assert_eq!(body, r#"{"v":1}"#);
            assert!(socket.is_none());
            assert_eq!(timeout_ms, Some(250));
            assert_eq!(format, OutputFormat::Json);
        } else {
            panic!("Expected Call command");
        }
    }

    #[test]
    fn test_cli_parse_call_default_body() {
        let cli = Cli::parse_from(["hb", "call", "PING"]);
        if let Command::Call { body, format, .. } = cli.command {
            assert_eq!(body, "{}");
            assert_eq!(format, OutputFormat::Text);
        } else {
            panic!("Expected Call command");
        }
    }

    #[test]
    fn test_cli_parse_ping_and_commands() {
        assert!(matches!(Cli::parse_from(["hb", "ping"]).command, Command::Ping { .. }));
        assert!(matches!(Cli::parse_from(["hb", "commands"]).command, Command::Commands));
    }

    #[test]
    fn test_cli_with_config_and_log_level() {
        let cli = Cli::parse_from(["hb", "-c", "/path/to/config.yml", "-l", "debug", "commands"]);
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/config.yml")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("table".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_log_path_ends_with_log_file() {
        assert!(get_log_path().ends_with("hostbridge/logs/hostbridge.log"));
    }
}
