//! File-based state persistence.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{LoadResult, Snapshot, Snapshots, StateError};

/// Current state file format version.
///
/// Increment this when making breaking changes to the format.
const STATE_FILE_VERSION: u32 = 1;

/// On-disk state file format.
///
/// Incompatible versions are treated as corrupted.
#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    version: u32,

    /// Unix timestamp when the state was saved; informational only.
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_at: Option<String>,

    objects: Vec<Snapshot>,
}

impl StateFile {
    fn new(snapshots: &Snapshots) -> Self {
        Self {
            version: STATE_FILE_VERSION,
            saved_at: Some(unix_timestamp_now()),
            objects: snapshots.iter().cloned().collect(),
        }
    }
}

fn unix_timestamp_now() -> String {
    use std::time::SystemTime;

    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
        .to_string()
}

/// JSON state file with atomic, owner-only writes.
///
/// Saves write `{path}.tmp` and rename it over `{path}`, so the file is
/// either the old or the new state, never a partial one.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Creates a store at the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the state file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads previously saved state.
    #[must_use]
    pub fn load(&self) -> LoadResult {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return LoadResult::NotFound,
            Err(e) => {
                return LoadResult::Corrupted {
                    reason: format!("Failed to read file: {e}"),
                };
            }
        };

        match serde_json::from_str::<StateFile>(&content) {
            Ok(state) if state.version != STATE_FILE_VERSION => LoadResult::Corrupted {
                reason: format!(
                    "Incompatible version: expected {STATE_FILE_VERSION}, got {}",
                    state.version
                ),
            },
            Ok(state) => LoadResult::Loaded(Snapshots::from_entries(state.objects)),
            Err(e) => LoadResult::Corrupted {
                reason: format!("Invalid JSON: {e}"),
            },
        }
    }

    /// Saves the snapshots, replacing the previous file.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be serialized or written.
    pub async fn save(&self, snapshots: &Snapshots) -> Result<(), StateError> {
        let path = self.path.clone();
        let state = StateFile::new(snapshots);

        tokio::task::spawn_blocking(move || Self::save_blocking(&path, &state))
            .await
            .map_err(|e| StateError::Write(std::io::Error::other(e)))?
    }

    fn save_blocking(path: &Path, state: &StateFile) -> Result<(), StateError> {
        let content = serde_json::to_string_pretty(state).map_err(StateError::Serialize)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(StateError::Write)?;
            }
        }

        // state.json -> state.json.tmp, not state.tmp
        let temp_path = PathBuf::from(format!("{}.tmp", path.display()));

        let mut file = owner_only()
            .open(&temp_path)
            .map_err(StateError::Write)?;
        file.write_all(content.as_bytes())
            .map_err(StateError::Write)?;
        file.sync_all().map_err(StateError::Write)?;
        drop(file);

        std::fs::rename(&temp_path, path).map_err(StateError::Write)?;

        Ok(())
    }
}

/// Options for a truncating write readable only by the owner.
fn owner_only() -> std::fs::OpenOptions {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options
}
