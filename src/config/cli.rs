//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::defaults;

/// dsconfig-sync: declarative directory-server configuration
///
/// Reconciles cipher stream providers and uncached attribute criteria
/// against a server's configuration API.
#[derive(Debug, Parser)]
#[command(name = "dsconfig-sync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Base URL of the server's configuration API
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Server version, e.g. 10.0.0.0
    #[arg(long = "server-version", value_name = "VERSION", global = true)]
    pub server_version: Option<String>,

    /// HTTP headers in 'Key=Value' or 'Key: Value' format (can be specified multiple times)
    #[arg(long = "header", value_name = "K=V", global = true)]
    pub headers: Vec<String>,

    /// Bearer token for Authorization header
    #[arg(long, global = true)]
    pub bearer: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// State file holding the obscured values last submitted
    /// (default: next to the desired model, as <model>.state.json)
    #[arg(long = "state-file", value_name = "PATH", global = true)]
    pub state_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for dsconfig-sync
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = defaults::CONFIG_FILE)]
        output: PathBuf,
    },

    /// Show what apply would change, without changing anything
    Plan {
        /// Desired-model file
        #[arg(long, short)]
        model: PathBuf,
    },

    /// Create or update every object in the desired model
    Apply {
        /// Desired-model file
        #[arg(long, short)]
        model: PathBuf,
    },

    /// Delete the objects the desired model created, in reverse order
    Destroy {
        /// Desired-model file
        #[arg(long, short)]
        model: PathBuf,
    },

    /// List known families and their variants
    Variants {
        /// Only show this family
        family: Option<String>,
    },

    /// List a family's objects on the server
    List {
        /// Family name, e.g. cipher-stream-provider
        family: String,
    },
}

impl Command {
    /// Returns true if the command talks to the server.
    #[must_use]
    pub const fn needs_server(&self) -> bool {
        !matches!(self, Self::Init { .. } | Self::Variants { .. })
    }
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Command::Init { .. })
    }
}
