//! Command-line interface for open_craft.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Open Craft - combine elements to discover new ones
#[derive(Parser, Debug)]
#[command(name = "open_craft")]
#[command(about = "Element combination game with terminal, chat bot and HTTP front-ends", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Optional TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Load the catalog from this directory instead of the built-in one (developer mode)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Directory holding save files
    #[arg(long, global = true)]
    pub save_dir: Option<PathBuf>,

    /// Subcommand to run (defaults to `play`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Play in the terminal
    Play,

    /// Run the chat bot over JSON lines on stdin/stdout
    Bot,

    /// Run the HTTP server
    Http {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List combinations with neither a recipe nor a known impossibility
    Untried {
        /// Print a single random suggestion instead of the full list
        #[arg(long)]
        random: bool,
    },

    /// Load the catalog and report its counts or every inconsistency
    Validate,
}
