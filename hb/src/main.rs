//! hb - host bridge
//!
//! CLI entry point for running the host side and issuing UI-side requests.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::{CommandFactory, FromArgMatches};
use colored::Colorize;
use eyre::{Context, Result};
use serde_json::Value;
use tracing::{debug, info};

use hostbridge::cli::{Cli, Command, OutputFormat, generate_after_help, get_log_path};
use hostbridge::commands::{Empty, Ping};
use hostbridge::config::Config;
use hostbridge::handlers::builtin::BUILTIN_COMMANDS;
use hostbridge::ipc;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cmd = Cli::command().after_help(generate_after_help());
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Serve { socket, once } => {
            debug!(?socket, once, "main: matched Serve command");
            cmd_serve(config, socket, once).await
        }
        Command::Call {
            command,
            body,
            socket,
            timeout_ms,
            format,
        } => {
            debug!(%command, ?socket, ?timeout_ms, ?format, "main: matched Call command");
            cmd_call(&config, &command, &body, socket, timeout_ms, format).await
        }
        Command::Ping { socket } => {
            debug!(?socket, "main: matched Ping command");
            cmd_ping(&config, socket).await
        }
        Command::Commands => {
            debug!("main: matched Commands command");
            cmd_commands()
        }
    }
}

/// Run the host side until interrupted
async fn cmd_serve(config: Config, socket: Option<PathBuf>, once: bool) -> Result<()> {
    debug!(?socket, once, "cmd_serve: called");
    let socket_path = socket.unwrap_or_else(|| config.transport.socket_path());

    let (listener, socket_path) = ipc::create_listener_at(&socket_path)?;
    println!("{} {}", "Listening on".green(), socket_path.display());

    let result = ipc::serve(listener, config, once).await;

    ipc::cleanup_socket(&socket_path);
    result
}

/// Send one request and print the response body
async fn cmd_call(
    config: &Config,
    command: &str,
    body: &str,
    socket: Option<PathBuf>,
    timeout_ms: Option<u64>,
    format: OutputFormat,
) -> Result<()> {
    debug!(%command, "cmd_call: called");
    let body: Value = serde_json::from_str(body).context("Request body is not valid JSON")?;
    let timeout = timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.mediator.request_timeout());

    let socket_path = socket.unwrap_or_else(|| config.transport.socket_path());
    let connection = ipc::connect(&socket_path, config).await?;

    let response: Value = connection
        .mediator()
        .request_within(command, &body, timeout)
        .await
        .context(format!("{} request failed", command))?;
    connection.close().await;

    match format {
        OutputFormat::Text => println!("{}", serde_json::to_string_pretty(&response)?),
        OutputFormat::Json => println!("{}", serde_json::to_string(&response)?),
    }
    Ok(())
}

/// Round-trip a PING and print the host version
async fn cmd_ping(config: &Config, socket: Option<PathBuf>) -> Result<()> {
    debug!(?socket, "cmd_ping: called");
    let socket_path = socket.unwrap_or_else(|| config.transport.socket_path());

    if !socket_path.exists() {
        debug!(?socket_path, "cmd_ping: socket does not exist");
        println!("{} no socket at {}", "Host is not running:".red(), socket_path.display());
        return Ok(());
    }

    let connection = ipc::connect(&socket_path, config).await?;
    let result = connection
        .mediator()
        .send_within::<Ping>(&Empty {}, config.mediator.request_timeout())
        .await;
    connection.close().await;

    match result {
        Ok(pong) => {
            debug!(version = %pong.version, "cmd_ping: pong received");
            println!("{}", "Host is alive and responsive".green());
            println!("Version: {}", pong.version);
        }
        Err(e) => {
            debug!(error = %e, "cmd_ping: ping failed");
            println!("{} {}", "Host did not answer:".red(), e);
        }
    }
    Ok(())
}

/// List the built-in host commands
fn cmd_commands() -> Result<()> {
    debug!("cmd_commands: called");
    for (name, description) in BUILTIN_COMMANDS {
        println!("  {} {}", format!("{:<20}", name).bold(), description);
    }
    Ok(())
}
