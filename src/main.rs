//! Hailstone - resumable Collatz counterexample search
//!
//! CLI entry point for running the search in the foreground or as a
//! background daemon.

use std::fs::OpenOptions;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::{Context, Result};
use num_bigint::BigUint;
use num_integer::Integer;
use tracing::{error, info};

use hailstone::checkpoint::CheckpointStore;
use hailstone::cli::{Cli, Command, OutputFormat};
use hailstone::config::Config;
use hailstone::daemon::DaemonManager;
use hailstone::search::{SearchEngine, StopReason};
use hailstone::trajectory::descend;

/// Raised by SIGTERM/SIGINT; the search loop polls it every round
static STOP: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn raise_stop_flag(_signal: nix::libc::c_int) {
    STOP.store(true, Ordering::Relaxed);
}

#[cfg(unix)]
fn install_signal_handlers() -> Result<()> {
    use nix::sys::signal::{SigHandler, Signal, signal};

    // Handler only touches an atomic, which is async-signal-safe
    unsafe {
        signal(Signal::SIGTERM, SigHandler::Handler(raise_stop_flag))
            .context("Failed to install SIGTERM handler")?;
        signal(Signal::SIGINT, SigHandler::Handler(raise_stop_flag))
            .context("Failed to install SIGINT handler")?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn install_signal_handlers() -> Result<()> {
    Ok(())
}

/// Log to the configured file only, never the console
fn setup_logging(config: &Config, verbose: bool) -> Result<()> {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.files.log)
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration before logging: the log path is configurable
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    setup_logging(&config, cli.verbose).context("Failed to setup logging")?;

    info!(
        initial_seed = %config.search.initial_seed,
        checkpoint_interval = config.search.checkpoint_interval,
        "hailstone starting"
    );

    match cli.command {
        // Bare invocation runs the search in the foreground, like the
        // original single-file tool
        None | Some(Command::Run) => cmd_run(&config, true),
        Some(Command::Start) => cmd_start(cli.config.as_ref()),
        Some(Command::Stop) => cmd_stop(),
        Some(Command::Status { format }) => cmd_status(&config, format),
        Some(Command::Probe { candidate }) => cmd_probe(&candidate),
        Some(Command::RunDaemon) => cmd_run_daemon(&config),
    }
}

/// Run the search until a signal or the timeout budget stops it
fn cmd_run(config: &Config, print_progress: bool) -> Result<()> {
    install_signal_handlers()?;

    let mut engine = SearchEngine::new(config, print_progress)?;
    engine.resume();

    if print_progress {
        println!("searching from seed {} (ctrl-c to stop)", engine.seed());
    }

    match engine.run(&STOP) {
        StopReason::Interrupted => {
            if print_progress {
                println!("\ninterrupted at seed {}, checkpoint written", engine.seed());
            }
        }
        StopReason::TimedOut => {
            if print_progress {
                println!("\ntimeout budget exceeded at seed {}, snapshot written", engine.seed());
            }
        }
    }
    Ok(())
}

/// Start the daemon in the background
fn cmd_start(config_path: Option<&std::path::PathBuf>) -> Result<()> {
    let manager = DaemonManager::new();
    let pid = manager.start(config_path)?;
    println!("hailstone daemon started (pid {pid})");
    Ok(())
}

/// Stop the running daemon
fn cmd_stop() -> Result<()> {
    let manager = DaemonManager::new();
    manager.stop()?;
    println!("hailstone daemon stopped");
    Ok(())
}

/// Show daemon status and the current checkpointed seed
fn cmd_status(config: &Config, format: OutputFormat) -> Result<()> {
    let manager = DaemonManager::new();
    let status = manager.status();

    let store = CheckpointStore::new(&config.files);
    let seed = match store.read_primary() {
        Ok(seed) => Some(seed.to_string()),
        Err(e) if e.is_missing() => None,
        Err(e) => {
            error!(error = %e, "could not read primary checkpoint for status");
            None
        }
    };

    match format {
        OutputFormat::Json => {
            let payload = serde_json::json!({
                "running": status.running,
                "pid": status.pid,
                "pid_file": status.pid_file,
                "seed": seed,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        OutputFormat::Text => {
            if status.running {
                println!("daemon: running (pid {})", status.pid.unwrap_or(0));
            } else {
                println!("daemon: not running");
            }
            match seed {
                Some(seed) => println!("checkpointed seed: {seed}"),
                None => println!("checkpointed seed: none"),
            }
        }
    }
    Ok(())
}

/// Evaluate one candidate's descent and print the diagnostic value
fn cmd_probe(candidate: &str) -> Result<()> {
    let seed: BigUint = candidate
        .trim()
        .parse()
        .map_err(|_| eyre::eyre!("candidate is not a decimal integer: {candidate:?}"))?;
    if seed.is_even() || seed < BigUint::from(3u32) {
        return Err(eyre::eyre!("candidate must be an odd integer >= 3"));
    }

    let descent = descend(&seed);
    println!("seed: {seed}");
    println!("diagnostic: {}", descent.terminal);
    println!("steps: {}", descent.steps);
    Ok(())
}

/// Detached daemon body: register the PID, run quietly, clean up
fn cmd_run_daemon(config: &Config) -> Result<()> {
    let manager = DaemonManager::new();
    manager.register_self()?;

    let result = cmd_run(config, false);

    if let Err(e) = manager.remove_pid_file() {
        error!(error = %e, "failed to remove PID file on exit");
    }
    result
}
