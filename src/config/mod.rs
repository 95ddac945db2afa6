//! Configuration layer for dsconfig-sync.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML settings file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`])
//! - Desired-model files ([`DesiredFile`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//! 2. **TOML config file** - Values from the `[server]` section
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! `url` and `version` have no default and must come from one of the first two.
//!
//! Headers merge: TOML headers are applied first and CLI headers replace
//! same-named entries. A bearer token (CLI wins over TOML) always sets
//! `Authorization` last.

mod cli;
pub mod defaults;
mod desired;
mod error;
mod toml;
mod validated;

#[cfg(test)]
mod validated_tests;

pub use cli::{Cli, Command};
pub use desired::DesiredFile;
pub use error::{ConfigError, field};
pub use toml::{ServerSection, StateSection, TomlConfig, default_config_template};
pub use validated::{ValidatedConfig, write_default_config};
