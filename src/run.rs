//! Application execution logic.
//!
//! This module runs one remote task (plan, apply, destroy, list) against
//! the configured server and renders the results on stdout. Objects are
//! processed one at a time in file order; a failing object is logged and
//! counted, and the remaining objects are still processed.
//!
//! Model tasks read the state file before reconciling, so obscured values
//! the last apply submitted are compared instead of re-sent. `apply` and
//! `destroy` write it back when it changed.

use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use dsconfig_sync::config::{Command, ConfigError, DesiredFile, ValidatedConfig};
use dsconfig_sync::model::{ConfigObject, DesiredObject, wire_name};
use dsconfig_sync::reconcile::{Deletion, ReconcileError, Reconciled, Reconciler};
use dsconfig_sync::registry::{Family, Registry, RegistryError};
use dsconfig_sync::state::{FileStateStore, LoadResult, Snapshots, StateError};
use dsconfig_sync::store::{ConfigStore, HttpConfigStore, HttpError, ReqwestClient};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// The desired-model file could not be loaded.
    #[error("Failed to load desired model: {0}")]
    Model(#[source] ConfigError),

    /// Failed to create the HTTP client.
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] HttpError),

    /// Unknown family or variant.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A single-shot remote call failed.
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    /// Some objects were rejected before any remote call.
    #[error("{rejected} of {total} object(s) rejected by validation")]
    Rejected {
        /// Objects that failed validation
        rejected: usize,
        /// Objects processed
        total: usize,
    },

    /// Some objects failed against the server.
    #[error("{failed} of {total} object(s) failed")]
    Failed {
        /// Objects that failed, including rejected ones
        failed: usize,
        /// Objects processed
        total: usize,
    },

    /// Failed to save the state file.
    #[error(transparent)]
    State(#[from] StateError),

    /// Failed to write to stdout.
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    /// Failed to render an object as JSON.
    #[error("Failed to render object: {0}")]
    Render(#[from] serde_json::Error),
}

impl RunError {
    /// Returns true if the error stems from user input rather than the server.
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::Model(_) | Self::Registry(_) | Self::Rejected { .. })
    }
}

/// A subcommand that talks to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Dry run over a desired-model file.
    Plan(PathBuf),
    /// Create or update every object in a desired-model file.
    Apply(PathBuf),
    /// Delete the objects of a desired-model file, in reverse order.
    Destroy(PathBuf),
    /// List a family's remote objects.
    List(String),
}

impl Task {
    /// Extracts the remote task from a subcommand.
    ///
    /// Returns `None` for subcommands that run locally.
    pub fn from_command(command: &Command) -> Option<Self> {
        match command {
            Command::Plan { model } => Some(Self::Plan(model.clone())),
            Command::Apply { model } => Some(Self::Apply(model.clone())),
            Command::Destroy { model } => Some(Self::Destroy(model.clone())),
            Command::List { family } => Some(Self::List(family.clone())),
            Command::Init { .. } | Command::Variants { .. } => None,
        }
    }
}

/// Per-object outcome counts for one task.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Tally {
    total: usize,
    rejected: usize,
    failed: usize,
}

impl Tally {
    fn succeed(&mut self) {
        self.total += 1;
    }

    fn fail(&mut self, desired: &DesiredObject, error: &ReconcileError) {
        self.total += 1;
        if is_rejection(error) {
            self.rejected += 1;
        } else {
            self.failed += 1;
        }
        tracing::error!(family = %desired.family, id = desired.id(), "{error}");
    }

    fn into_result(self) -> Result<(), RunError> {
        if self.failed > 0 {
            Err(RunError::Failed {
                failed: self.failed + self.rejected,
                total: self.total,
            })
        } else if self.rejected > 0 {
            Err(RunError::Rejected {
                rejected: self.rejected,
                total: self.total,
            })
        } else {
            Ok(())
        }
    }
}

/// Errors raised before any remote call.
const fn is_rejection(error: &ReconcileError) -> bool {
    matches!(
        error,
        ReconcileError::Validation(_) | ReconcileError::UnsupportedOnVersion { .. }
    )
}

/// Executes one remote task.
///
/// # Errors
///
/// Returns an error if the client or model cannot be set up, output fails,
/// or any object fails.
///
/// Excluded from coverage - requires a live server.
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig, task: Task) -> Result<(), RunError> {
    let reconciler = create_reconciler(&config)?;
    let mut out = std::io::stdout().lock();

    let tally = match task {
        Task::Plan(path) => {
            let (model, _) = load_with_state(&config, reconciler.registry(), &path)?;
            plan(&reconciler, &model, &mut out).await?
        }
        Task::Apply(path) => {
            let (model, state) = load_with_state(&config, reconciler.registry(), &path)?;
            let mut snapshots = state.snapshots.clone();
            let tally = apply(&reconciler, &model, &mut snapshots, &mut out).await?;
            state.save_if_changed(&snapshots).await?;
            tally
        }
        Task::Destroy(path) => {
            let (model, state) = load_with_state(&config, reconciler.registry(), &path)?;
            let mut snapshots = state.snapshots.clone();
            let tally = destroy(&reconciler, &model, &mut snapshots, &mut out).await?;
            state.save_if_changed(&snapshots).await?;
            tally
        }
        Task::List(family) => return list(&reconciler, &family, &mut out).await,
    };

    tally.into_result()
}

/// A state file and the snapshots it held when loaded.
struct LoadedState {
    store: FileStateStore,
    snapshots: Snapshots,
}

impl LoadedState {
    fn load(store: FileStateStore) -> Self {
        let snapshots = match store.load() {
            LoadResult::Loaded(snapshots) => {
                tracing::debug!(
                    "Loaded saved values for {} object(s) from {}",
                    snapshots.len(),
                    store.path().display()
                );
                snapshots
            }
            LoadResult::NotFound => {
                tracing::debug!("No state file at {}", store.path().display());
                Snapshots::default()
            }
            LoadResult::Corrupted { reason } => {
                tracing::warn!(
                    "Ignoring state file {}: {reason}; obscured values will be re-sent",
                    store.path().display()
                );
                Snapshots::default()
            }
        };

        Self { store, snapshots }
    }

    async fn save_if_changed(&self, snapshots: &Snapshots) -> Result<(), StateError> {
        if *snapshots == self.snapshots {
            return Ok(());
        }
        self.store.save(snapshots).await?;
        tracing::debug!("Saved state to {}", self.store.path().display());
        Ok(())
    }
}

/// Loads a desired model together with its state file.
fn load_with_state(
    config: &ValidatedConfig,
    registry: &Registry,
    path: &Path,
) -> Result<(DesiredFile, LoadedState), RunError> {
    let mut model = load_model(path)?;
    let state = LoadedState::load(FileStateStore::new(config.state_file_for(path)));
    attach_previous(registry, &mut model, &state.snapshots);
    Ok((model, state))
}

/// Gives every object the values its last apply submitted.
///
/// Objects of unknown families are left alone; the reconciler rejects them.
fn attach_previous(registry: &Registry, model: &mut DesiredFile, snapshots: &Snapshots) {
    for desired in &mut model.objects {
        let Ok(family) = registry.family(&desired.family) else {
            continue;
        };
        if let Some(previous) = snapshots.previous(family, desired.id()) {
            desired.previous = Some(previous);
        }
    }
}

/// Creates the reconciler over the HTTP store.
fn create_reconciler(
    config: &ValidatedConfig,
) -> Result<Reconciler<HttpConfigStore<ReqwestClient>>, RunError> {
    let client = ReqwestClient::new(config.timeout).map_err(RunError::Client)?;
    let store =
        HttpConfigStore::new(client, config.url.clone()).with_headers(config.headers.clone());

    Ok(Reconciler::new(store, config.version))
}

fn load_model(path: &Path) -> Result<DesiredFile, RunError> {
    let model = DesiredFile::load(path).map_err(RunError::Model)?;
    tracing::info!(
        "Loaded {} object(s) from {}",
        model.len(),
        path.display()
    );
    Ok(model)
}

/// Prints the planned action for every object.
async fn plan<S: ConfigStore>(
    reconciler: &Reconciler<S>,
    model: &DesiredFile,
    out: &mut impl Write,
) -> Result<Tally, RunError> {
    let mut tally = Tally::default();

    for desired in &model.objects {
        match reconciler.plan(desired).await {
            Ok(plan) => {
                writeln!(out, "{plan}")?;
                tally.succeed();
            }
            Err(e) => tally.fail(desired, &e),
        }
    }

    Ok(tally)
}

/// Reconciles every object and prints the confirmed state.
///
/// The obscured values of each confirmed object are recorded in `snapshots`.
async fn apply<S: ConfigStore>(
    reconciler: &Reconciler<S>,
    model: &DesiredFile,
    snapshots: &mut Snapshots,
    out: &mut impl Write,
) -> Result<Tally, RunError> {
    let mut tally = Tally::default();

    for desired in &model.objects {
        match reconciler.reconcile(desired).await {
            Ok(reconciled) => {
                let family = reconciler.registry().family(&desired.family)?;
                snapshots.record(family, &reconciled.object);
                writeln!(out, "{}", describe_outcome(family, &reconciled))?;
                writeln!(out, "{}", render(family, &reconciled.object)?)?;
                tally.succeed();
            }
            Err(e) => tally.fail(desired, &e),
        }
    }

    Ok(tally)
}

/// Deletes every object in reverse declaration order.
///
/// Saved values of objects no longer on the server are dropped.
async fn destroy<S: ConfigStore>(
    reconciler: &Reconciler<S>,
    model: &DesiredFile,
    snapshots: &mut Snapshots,
    out: &mut impl Write,
) -> Result<Tally, RunError> {
    let mut tally = Tally::default();

    for desired in model.objects.iter().rev() {
        match reconciler.delete(desired).await {
            Ok(deletion) => {
                let outcome = match deletion {
                    Deletion::Deleted => "deleted",
                    Deletion::AlreadyGone => "already gone",
                    Deletion::Forgotten => "left in place (adopted)",
                };
                if deletion != Deletion::Forgotten {
                    snapshots.forget(&desired.family, desired.id());
                }
                writeln!(out, "{} '{}': {outcome}", desired.family, desired.id())?;
                tally.succeed();
            }
            Err(e) => tally.fail(desired, &e),
        }
    }

    Ok(tally)
}

/// Prints a family's remote objects as a JSON array.
async fn list<S: ConfigStore>(
    reconciler: &Reconciler<S>,
    family: &str,
    out: &mut impl Write,
) -> Result<(), RunError> {
    let objects = reconciler.list(family).await?;
    let family = reconciler.registry().family(family)?;

    let redacted = objects
        .iter()
        .map(|object| Ok(family.variant(&object.variant)?.redact(object)))
        .collect::<Result<Vec<_>, RegistryError>>()?;

    writeln!(out, "{}", serde_json::to_string_pretty(&redacted)?)?;
    Ok(())
}

/// Prints the registry, or one family of it.
///
/// # Errors
///
/// Returns an error if the family is unknown or output fails.
pub fn describe_variants(
    registry: &Registry,
    family: Option<&str>,
    out: &mut impl Write,
) -> Result<(), RunError> {
    let families: Vec<&Family> = match family {
        Some(name) => vec![registry.family(name)?],
        None => registry.families().collect(),
    };

    for family in families {
        writeln!(out, "{} (endpoint: {})", family.name, family.endpoint)?;
        for tag in family.tags() {
            let variant = family.variant(tag)?;
            if variant.is_adopt_only() {
                writeln!(out, "  {tag:<32} adopt only")?;
            } else {
                let required: Vec<String> = variant.required_attributes().map(wire_name).collect();
                writeln!(out, "  {tag:<32} requires: {}", required.join(", "))?;
            }
        }
    }

    Ok(())
}

fn describe_outcome(family: &Family, reconciled: &Reconciled) -> String {
    let id = &reconciled.object.id;
    if reconciled.created {
        format!("{} '{id}': created", family.name)
    } else if reconciled.operations.is_empty() {
        format!("{} '{id}': unchanged", family.name)
    } else {
        format!(
            "{} '{id}': updated ({} operation(s))",
            family.name,
            reconciled.operations.len()
        )
    }
}

/// Pretty JSON of an object with obscured values masked.
fn render(family: &Family, object: &ConfigObject) -> Result<String, RunError> {
    let redacted = family.variant(&object.variant)?.redact(object);
    Ok(serde_json::to_string_pretty(&redacted)?)
}
