//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "forgekit")]
#[command(about = "Forgekit - declarative commands for plugin hosts", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to forgekit.yaml + forgekit.local.yaml)
    #[arg(short, long, global = true, env = "FORGEKIT_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the commands registered by the bundled sample plugin
    #[command(name = "commands")]
    List,

    /// Dispatch one command line on the in-memory host
    Run {
        /// Command line, e.g. "greet steve --times 2"
        line: String,

        /// Run as this online player instead of the console
        #[arg(long = "as", value_name = "PLAYER")]
        as_player: Option<String>,

        /// Entities the player is looking at (target-entity commands)
        #[arg(long, value_delimiter = ',', value_name = "IDS")]
        looking_at: Vec<u64>,

        /// Extra permissions granted to the player before dispatch
        #[arg(long, value_delimiter = ',', value_name = "PERMISSIONS")]
        grant: Vec<String>,
    },

    /// Scan and validate the sample catalog without registering anything
    Check,
}
