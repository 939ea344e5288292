//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Hailstone - resumable Collatz counterexample search
#[derive(Parser)]
#[command(
    name = "hailstone",
    about = "Searches odd integers upward for a Collatz counterexample, checkpointing to disk",
    version = env!("CARGO_PKG_VERSION"),
    after_help = "With no subcommand the search runs in the foreground until killed."
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Run the search in the foreground
    Run,

    /// Start the search daemon in the background
    Start,

    /// Stop the running daemon (it writes a final checkpoint first)
    Stop,

    /// Show daemon status and the current checkpointed seed
    Status {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Evaluate one odd candidate's descent and print the diagnostic
    Probe {
        /// Candidate seed (decimal, odd, >= 3)
        #[arg(value_name = "SEED")]
        candidate: String,
    },

    /// Internal: Run as daemon process (used by `start`)
    #[command(hide = true)]
    RunDaemon,
}

/// Output format for the status command
#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
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
    fn test_cli_parse_no_command() {
        let cli = Cli::parse_from(["hailstone"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::parse_from(["hailstone", "run"]);
        assert!(matches!(cli.command, Some(Command::Run)));
    }

    #[test]
    fn test_cli_parse_start_stop() {
        let cli = Cli::parse_from(["hailstone", "start"]);
        assert!(matches!(cli.command, Some(Command::Start)));

        let cli = Cli::parse_from(["hailstone", "stop"]);
        assert!(matches!(cli.command, Some(Command::Stop)));
    }

    #[test]
    fn test_cli_parse_status() {
        let cli = Cli::parse_from(["hailstone", "status"]);
        assert!(matches!(cli.command, Some(Command::Status { .. })));

        let cli = Cli::parse_from(["hailstone", "status", "--format", "json"]);
        match cli.command {
            Some(Command::Status { format }) => assert!(matches!(format, OutputFormat::Json)),
            _ => panic!("Expected Status command"),
        }
    }

    #[test]
    fn test_cli_parse_probe() {
        let cli = Cli::parse_from(["hailstone", "probe", "12345"]);
        match cli.command {
            Some(Command::Probe { candidate }) => assert_eq!(candidate, "12345"),
            _ => panic!("Expected Probe command"),
        }
    }

    #[test]
    fn test_output_format_from_str() {
        assert!(matches!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text)));
        assert!(matches!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json)));
        assert!("invalid".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_cli_with_config() {
        let cli = Cli::parse_from(["hailstone", "-c", "/path/to/config.yml", "status"]);
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/config.yml")));
    }
}
