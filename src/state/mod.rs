//! Persistence of obscured values between runs.
//!
//! The server never returns obscured attributes such as key-store PINs, so
//! a run cannot tell from a fetch whether the secret it is about to send is
//! already in place. This module keeps the last value each run submitted,
//! keyed by family and id, so the next run can compare against it.
//!
//! State files hold secrets in clear text and are written owner-only on
//! Unix.

mod file;
mod snapshot;

#[cfg(test)]
mod snapshot_tests;

pub use file::FileStateStore;
pub use snapshot::{Snapshot, Snapshots};

use std::io;

use thiserror::Error;

/// Result of loading state from persistent storage.
#[derive(Debug, Clone)]
pub enum LoadResult {
    /// Successfully loaded previously saved snapshots.
    Loaded(Snapshots),

    /// No state file exists (first run or explicitly deleted).
    NotFound,

    /// State file exists but could not be parsed.
    /// The run continues with empty state and overwrites it on save.
    Corrupted {
        /// Reason for corruption (for logging/debugging).
        reason: String,
    },
}

impl LoadResult {
    /// Returns the loaded snapshots, or empty state for `NotFound`/`Corrupted`.
    #[must_use]
    pub fn into_snapshots(self) -> Snapshots {
        match self {
            Self::Loaded(snapshots) => snapshots,
            Self::NotFound | Self::Corrupted { .. } => Snapshots::default(),
        }
    }

    /// Returns `true` if state was successfully loaded.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// Errors that can occur while saving state.
///
/// Read-side issues are modeled as [`LoadResult`] variants instead.
#[derive(Debug, Error)]
pub enum StateError {
    /// Failed to write the state file.
    #[error("Failed to write state file: {0}")]
    Write(#[source] io::Error),

    /// Failed to serialize state to JSON.
    #[error("Failed to serialize state: {0}")]
    Serialize(#[source] serde_json::Error),
}
