//! Tello pilot entry point.
//!
//! Loads the configuration, sets up logging, binds the UDP session to the
//! drone, and then either runs the gamepad control loop or, with
//! `--console`, an interactive prompt that sends typed commands verbatim.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load config (+ CLI overrides), init logging
//!  └─ TransportSession::bind()        -- one UDP socket, one peer
//!  └─ session.start_receiving()       -- replies echoed by LoggingObserver
//!  └─ ControlLoopUseCase::run()       -- gamepad → commands every 10 ms
//!     or run_console()                -- stdin lines → commands
//! ```
//!
//! # Usage
//!
//! ```text
//! tello-client [OPTIONS]
//!
//! Options:
//!   --config <PATH>          Config file [default: platform config dir]
//!   --remote <ADDR>          Drone address, e.g. 192.168.10.1:8889
//!   --local-port <PORT>      Local UDP port
//!   --log-level <LEVEL>      Log level or filter directive
//!   --console                Type commands instead of using a gamepad
//!   --write-default-config   Write a default config file and exit
//! ```
//!
//! # Runtime
//!
//! Everything runs on a single-threaded Tokio runtime.  The control loop
//! awaits its next tick; while it waits, the session's drain and receive
//! tasks run.  Only the gamepad reader uses a thread of its own.
//!
//! Ctrl+C stops the process without draining queued commands.

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tracing::{error, info};

use tello_client::application::control_loop::{ControlLoopUseCase, GamepadSource};
use tello_client::infrastructure::console::run_console;
use tello_client::infrastructure::logging::init_logging;
use tello_client::infrastructure::network::{LoggingObserver, TransportSession};
use tello_client::infrastructure::storage::config::{
    config_file_path, load_config_from, save_config_to, ClientConfig, GamepadConfig,
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Fly a Tello-style drone with a gamepad over UDP.
#[derive(Debug, Parser)]
#[command(name = "tello-client", version)]
struct Cli {
    /// Configuration file.  Defaults to `config.toml` in the platform config
    /// directory; a missing file means all defaults.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Drone command address (`ip:port`).  Overrides `network.remote_addr`.
    #[arg(long, value_name = "ADDR", env = "TELLO_REMOTE")]
    remote: Option<String>,

    /// Local UDP port.  Overrides `network.local_port`.
    #[arg(long, value_name = "PORT", env = "TELLO_LOCAL_PORT")]
    local_port: Option<u16>,

    /// Log level or filter directive.  Overrides `logging.level`;
    /// `RUST_LOG` still wins over both.
    #[arg(long, value_name = "LEVEL", env = "TELLO_LOG")]
    log_level: Option<String>,

    /// Read commands from stdin instead of the gamepad.
    #[arg(long)]
    console: bool,

    /// Write a config file with every default filled in, then exit.
    #[arg(long)]
    write_default_config: bool,
}

impl Cli {
    /// The config file to read or write, if one can be determined.
    fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(|| config_file_path().ok())
    }

    /// Applies command-line overrides on top of the file configuration.
    fn apply_overrides(&self, config: &mut ClientConfig) {
        if let Some(remote) = &self.remote {
            config.network.remote_addr = remote.clone();
        }
        if let Some(port) = self.local_port {
            config.network.local_port = port;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config_path();

    if cli.write_default_config {
        let path = config_path.context("no --config given and no platform config directory")?;
        save_config_to(&path, &ClientConfig::default())
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("wrote default configuration to {}", path.display());
        return Ok(());
    }

    let mut config = match &config_path {
        Some(path) => load_config_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ClientConfig::default(),
    };
    cli.apply_overrides(&mut config);
    config.validate().context("invalid configuration")?;

    init_logging(&config.logging.level, config.logging.file()).context("failed to set up logging")?;
    info!("Tello pilot starting");
    if let Some(path) = &config_path {
        info!("configuration: {}", path.display());
    }

    let remote = config.network.remote()?;
    let local = config.network.local()?;
    let session = TransportSession::bind(
        local,
        remote,
        Arc::new(LoggingObserver::new()),
        config.network.session_options(),
    )
    .await
    .context("failed to open UDP session")?;
    session
        .start_receiving()
        .context("failed to start receive loop")?;

    let running = Arc::new(AtomicBool::new(true));

    let work = async {
        if cli.console {
            info!("console mode: type SDK commands, one per line");
            let stdin = BufReader::new(tokio::io::stdin());
            let submitted = run_console(stdin, &session, &running)
                .await
                .context("console input failed")?;
            info!("console closed after {submitted} command(s)");
        } else {
            let mut source = open_gamepad(&config.gamepad, Arc::clone(&running))?;
            ControlLoopUseCase::new(config.control.mapper())
                .run(
                    source.as_mut(),
                    &session,
                    config.control.tick_period(),
                    Arc::clone(&running),
                )
                .await?;
        }
        anyhow::Ok(())
    };

    tokio::select! {
        result = work => result?,
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("shutdown signal received"),
                Err(e) => error!("failed to listen for Ctrl+C signal: {e}"),
            }
            running.store(false, Ordering::Relaxed);
        }
    }

    let stats = session.stats();
    info!(
        "Tello pilot stopped (sent {}, received {}, {} still queued)",
        stats.sent,
        stats.received,
        session.pending()
    );

    // Tokio's stdin reader blocks a thread that cannot be cancelled, which
    // would keep the runtime from shutting down until the next newline.
    if cli.console {
        std::process::exit(0);
    }
    Ok(())
}

#[cfg(target_os = "linux")]
fn open_gamepad(
    config: &GamepadConfig,
    running: Arc<AtomicBool>,
) -> anyhow::Result<Box<dyn GamepadSource>> {
    use tello_client::infrastructure::gamepad::linux::LinuxJoystickSource;

    let source = LinuxJoystickSource::open(config.device.clone(), running)
        .context("failed to start gamepad reader")?;
    Ok(Box::new(source))
}

#[cfg(not(target_os = "linux"))]
fn open_gamepad(
    config: &GamepadConfig,
    _running: Arc<AtomicBool>,
) -> anyhow::Result<Box<dyn GamepadSource>> {
    use tello_client::infrastructure::gamepad::NullGamepadSource;

    tracing::warn!(
        "no gamepad backend on this platform (ignoring {}); sending neutral sticks",
        config.device.display()
    );
    Ok(Box::new(NullGamepadSource))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tello_client::infrastructure::gamepad::NullGamepadSource;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["tello-client"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("valid arguments")
    }

    #[test]
    fn test_cli_defaults_leave_config_untouched() {
        // Arrange
        let cli = Cli {
            config: None,
            remote: None,
            local_port: None,
            log_level: None,
            console: false,
            write_default_config: false,
        };
        let mut cfg = ClientConfig::default();

        // Act
        cli.apply_overrides(&mut cfg);

        // Assert
        assert_eq!(cfg, ClientConfig::default());
    }

    #[test]
    fn test_cli_flags_parse() {
        let cli = parse(&["--console", "--config", "/tmp/tello.toml"]);
        assert!(cli.console);
        assert!(!cli.write_default_config);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/tello.toml")));
        assert_eq!(cli.config_path(), Some(PathBuf::from("/tmp/tello.toml")));
    }

    #[test]
    fn test_cli_remote_override() {
        let cli = parse(&["--remote", "203.0.113.1:8889"]);
        let mut cfg = ClientConfig::default();

        cli.apply_overrides(&mut cfg);

        assert_eq!(cfg.network.remote().unwrap(), "203.0.113.1:8889".parse().unwrap());
    }

    #[test]
    fn test_cli_local_port_and_log_level_override() {
        let cli = parse(&["--local-port", "9100", "--log-level", "trace"]);
        let mut cfg = ClientConfig::default();

        cli.apply_overrides(&mut cfg);

        assert_eq!(cfg.network.local_port, 9100);
        assert_eq!(cfg.logging.level, "trace");
    }

    #[test]
    fn test_cli_rejects_non_numeric_port() {
        let result = Cli::try_parse_from(["tello-client", "--local-port", "ninety"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_remote_from_cli_fails_validation() {
        let cli = parse(&["--remote", "not-an-address"]);
        let mut cfg = ClientConfig::default();
        cli.apply_overrides(&mut cfg);

        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_null_source_is_available_everywhere() {
        let mut source: Box<dyn GamepadSource> = Box::new(NullGamepadSource);
        assert!(source.poll_events().is_empty());
    }
}
