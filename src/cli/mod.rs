pub mod output;

pub use output::OutputFormatter;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "leakscan", version, about = "Detect and verify leaked credentials")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan files (or stdin) for credentials
    Scan {
        /// Input files; reads stdin when empty
        inputs: Vec<PathBuf>,

        /// Only run this detector (e.g. "shodan")
        #[arg(short, long)]
        detector: Option<String>,

        /// Verify candidates against the issuing service
        #[arg(long)]
        verify: bool,

        /// Write the JSON report to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify one credential (raw value or canonical serialization)
    Test {
        /// Detector name
        detector: String,
        /// The credential to verify
        secret: String,
    },

    /// Re-verify a persisted finding record in place
    Reverify {
        /// JSON file holding one {detector, secret, verified, reason} record
        file: PathBuf,
    },

    /// List registered detectors
    List,
}
