//! Default values for configuration options.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default request timeout in seconds.
pub const TIMEOUT_SECS: u64 = 30;

/// Default output path for `init`.
pub const CONFIG_FILE: &str = "dsconfig-sync.toml";

/// Default request timeout as Duration.
#[must_use]
pub const fn timeout() -> Duration {
    Duration::from_secs(TIMEOUT_SECS)
}

/// Extension replacing the desired model's own for its state file.
pub const STATE_EXTENSION: &str = "state.json";

/// Default state file for a desired model: `site.toml` keeps its state
/// in `site.state.json`.
#[must_use]
pub fn state_file(model: &Path) -> PathBuf {
    model.with_extension(STATE_EXTENSION)
}
