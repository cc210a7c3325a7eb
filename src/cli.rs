//! CLI argument parsing for Revivir

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Output format for analysis results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "revivir")]
#[command(version)]
#[command(about = "Forensic timeline replay with retroactive detection", long_about = None)]
pub struct Cli {
    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Enable debug logging to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a capture and report its entity footprint and ATT&CK mapping
    Analyze {
        /// JSONL event capture to replay
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },
    /// Sweep a capture with the retroactive detection rules
    Detect {
        /// JSONL event capture to replay
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },
    /// Replay a capture twice and verify evidence chain integrity
    Verify {
        /// JSONL event capture to replay
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },
}
