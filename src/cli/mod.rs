//! CLI argument parsing using clap 4.x derive macros

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use itinera_core::protocol::OutputFormat;

/// Plan a trip and follow the itinerary as the server builds it
///
/// Connects to an itinerary server over WebSocket, streams its progress,
/// asks you to choose when the server needs a decision, and prints the
/// finished itinerary.
#[derive(Parser, Debug)]
#[command(name = "itinera")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// The command to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print version information
    #[arg(long)]
    pub version: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a planning session (asks for anything not given)
    Plan(PlanArgs),

    /// Manage configuration
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommand>,
    },
}

#[derive(Args, Debug, Default)]
pub struct PlanArgs {
    /// Where you are going
    pub destination: Option<String>,

    /// Travel date, passed to the server as typed
    #[arg(short, long)]
    pub date: Option<String>,

    /// Output format to request (pdf or markdown)
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Server WebSocket URL (overrides config)
    #[arg(short, long)]
    pub server: Option<String>,

    /// Expect structured {"kind", "payload"} frames from the server
    #[arg(long)]
    pub envelope: bool,

    /// Write the itinerary source to this file when done
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Copy the itinerary source to the clipboard when done
    #[arg(short, long)]
    pub copy: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Print where the configuration file is (or would be written)
    Path,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_plan_args() {
        let cli = Cli::parse_from([
            "itinera", "plan", "Paris", "--date", "2024-06-01", "--format", "markdown", "--copy",
        ]);
        match cli.command {
            Some(Commands::Plan(args)) => {
                assert_eq!(args.destination.as_deref(), Some("Paris"));
                assert_eq!(args.date.as_deref(), Some("2024-06-01"));
                assert_eq!(args.format, Some(OutputFormat::Markdown));
                assert!(args.copy);
                assert!(!args.envelope);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["itinera", "plan", "Paris", "--format", "docx"]).is_err());
    }
}
