//! The reconciliation driver: the only component that talks to the store.

use std::fmt;

use serde_json::Value as Json;
use tracing::{debug, info, warn};

use crate::model::{ConfigObject, DesiredObject, Mode, Operation, ServerVersion, UpdateRequest};
use crate::registry::{Registry, Variant};
use crate::store::ConfigStore;

use super::diff::diff_objects;
use super::error::ReconcileError;
use super::resolve::{keep_stored, normalize, null_not_applicable, overlay_obscured};
use super::validate::{check_version, validate};

/// Lifecycle phase of one object within a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Desired model accepted, nothing fetched yet.
    Planned,
    /// Reading the last-known remote state.
    Fetching,
    /// Computing the operation batch.
    Diffing,
    /// Waiting for the create or update call.
    Applying,
    /// Authoritative state decoded.
    Confirmed,
    /// The pass stopped with an error.
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Planned => "planned",
            Self::Fetching => "fetching",
            Self::Diffing => "diffing",
            Self::Applying => "applying",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Records and logs phase transitions for one object.
struct Lifecycle<'a> {
    family: &'a str,
    id: &'a str,
    trail: Vec<Phase>,
}

impl<'a> Lifecycle<'a> {
    fn new(family: &'a str, id: &'a str) -> Self {
        debug!(family, id, phase = %Phase::Planned, "Reconciliation started");
        Self {
            family,
            id,
            trail: vec![Phase::Planned],
        }
    }

    fn enter(&mut self, phase: Phase) {
        debug!(family = self.family, id = self.id, %phase, "Phase transition");
        self.trail.push(phase);
    }

    fn current(&self) -> Phase {
        self.trail.last().copied().unwrap_or(Phase::Planned)
    }

    fn fail(&mut self, error: impl Into<ReconcileError>) -> ReconcileError {
        let error = error.into();
        warn!(
            family = self.family,
            id = self.id,
            phase = %self.current(),
            error = %error,
            "Reconciliation failed"
        );
        self.trail.push(Phase::Failed);
        error
    }

    fn finish(self) -> Vec<Phase> {
        self.trail
    }
}

/// A desired object that passed resolution, validation and normalization.
#[derive(Debug, Clone)]
pub struct Prepared {
    /// Resolved variant.
    pub variant: Variant<'static>,
    /// Normalized desired object: defaults injected, foreign attributes null.
    pub plan: ConfigObject,
}

/// Outcome of a successful reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    /// The object as confirmed by the store, with obscured values overlaid
    /// from the desired model.
    pub object: ConfigObject,
    /// Operations submitted in the update call; empty when nothing changed
    /// or the object was created.
    pub operations: Vec<Operation>,
    /// Whether this pass created the object.
    pub created: bool,
    /// Phases visited, in order.
    pub trail: Vec<Phase>,
}

/// What a pass would do, computed without mutating the store.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannedAction {
    /// The object is absent and would be created with this payload.
    Create {
        /// Create request body
        payload: Json,
    },
    /// The object exists and this batch would be applied.
    Update {
        /// Operations in canonical order
        operations: Vec<Operation>,
    },
    /// The object already matches.
    NoChange,
}

/// A dry-run result for one object.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    /// Family name
    pub family: &'static str,
    /// Object id
    pub id: String,
    /// Planned action
    pub action: PlannedAction,
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.action {
            PlannedAction::Create { payload } => {
                let count = payload.as_object().map_or(0, |body| body.len().saturating_sub(2));
                write!(f, "{} '{}': create ({count} attributes)", self.family, self.id)
            }
            PlannedAction::Update { operations } => {
                write!(f, "{} '{}': update", self.family, self.id)?;
                for op in operations {
                    write!(f, "\n    {op}")?;
                }
                Ok(())
            }
            PlannedAction::NoChange => write!(f, "{} '{}': no changes", self.family, self.id),
        }
    }
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    /// The store deleted the object.
    Deleted,
    /// The object was already gone.
    AlreadyGone,
    /// Adopted object: left on the server, only local tracking dropped.
    Forgotten,
}

/// Drives create / adopt / read / update / delete against a [`ConfigStore`].
///
/// Each pass is a strictly sequential chain: resolve, validate, fetch, diff,
/// apply, confirm. The reconciler holds no per-object state, so distinct
/// objects may be reconciled concurrently through a shared reference.
///
/// # Type Parameters
///
/// - `S`: The store implementation
#[derive(Debug)]
pub struct Reconciler<S> {
    store: S,
    registry: Registry,
    version: ServerVersion,
}

impl<S> Reconciler<S> {
    /// Creates a reconciler over the built-in registry.
    #[must_use]
    pub fn new(store: S, version: ServerVersion) -> Self {
        Self {
            store,
            registry: Registry::builtin(),
            version,
        }
    }

    /// Replaces the registry.
    #[must_use]
    pub const fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The registry in use.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The configured server version.
    #[must_use]
    pub const fn version(&self) -> ServerVersion {
        self.version
    }

    /// Resolves, validates, version-checks and normalizes a desired object.
    ///
    /// Makes no remote calls.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::Configuration`] for unknown families or
    /// variants, [`ReconcileError::Validation`] with every violation found,
    /// or [`ReconcileError::UnsupportedOnVersion`].
    pub fn prepare(&self, desired: &DesiredObject) -> Result<Prepared, ReconcileError> {
        let variant = self
            .registry
            .resolve(&desired.family, &desired.object.variant)?;

        validate(variant, &desired.object, desired.mode, self.version)?;
        check_version(variant, &desired.object, self.version)?;

        Ok(Prepared {
            variant,
            plan: normalize(variant, &desired.object, self.version),
        })
    }

    fn confirm(
        variant: Variant<'_>,
        response: &Json,
        plan: &ConfigObject,
    ) -> Result<ConfigObject, ReconcileError> {
        let decoded = variant.decode(response)?;
        let mut object = null_not_applicable(variant, &decoded);
        overlay_obscured(variant, &mut object, plan);
        Ok(object)
    }
}

impl<S: ConfigStore> Reconciler<S> {
    /// Brings one object in line with its desired form.
    ///
    /// In [`Mode::Create`] an absent object is created; an existing one is
    /// diffed and updated. In [`Mode::Adopt`] the object must exist.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`]; validation and version errors are raised
    /// before any remote call, the rest stop the pass where they occur.
    pub async fn reconcile(&self, desired: &DesiredObject) -> Result<Reconciled, ReconcileError> {
        let mut lifecycle = Lifecycle::new(&desired.family, desired.id());
        let Prepared { variant, plan } = self.prepare(desired).map_err(|e| lifecycle.fail(e))?;
        let endpoint = variant.family().endpoint;

        lifecycle.enter(Phase::Fetching);
        let current = self
            .fetch(variant, desired)
            .await
            .map_err(|e| lifecycle.fail(e))?;

        let Some(state) = current else {
            lifecycle.enter(Phase::Applying);
            info!(
                family = variant.family().name,
                id = %plan.id,
                variant = variant.tag(),
                "Creating object"
            );
            let payload = variant.build_create_request(&plan);
            let response = self
                .store
                .create(endpoint, &payload)
                .await
                .map_err(|e| lifecycle.fail(e))?;
            let object = Self::confirm(variant, &response, &plan).map_err(|e| lifecycle.fail(e))?;

            lifecycle.enter(Phase::Confirmed);
            return Ok(Reconciled {
                object,
                operations: Vec::new(),
                created: true,
                trail: lifecycle.finish(),
            });
        };

        lifecycle.enter(Phase::Diffing);
        let plan = keep_stored(variant, &plan, &desired.object, &state);
        let operations = diff_objects(variant, &plan, &state);

        if operations.is_empty() {
            info!(family = variant.family().name, id = %plan.id, "Object is up to date");
            let mut object = state;
            overlay_obscured(variant, &mut object, &plan);

            lifecycle.enter(Phase::Confirmed);
            return Ok(Reconciled {
                object,
                operations,
                created: false,
                trail: lifecycle.finish(),
            });
        }

        lifecycle.enter(Phase::Applying);
        info!(
            family = variant.family().name,
            id = %plan.id,
            operations = operations.len(),
            "Updating object"
        );
        for op in &operations {
            debug!(%op, "Operation");
        }

        let request = UpdateRequest::new(operations);
        let response = self
            .store
            .update(endpoint, &plan.id, &request)
            .await
            .map_err(|e| lifecycle.fail(e))?;
        let object = Self::confirm(variant, &response, &plan).map_err(|e| lifecycle.fail(e))?;

        lifecycle.enter(Phase::Confirmed);
        Ok(Reconciled {
            object,
            operations: request.operations,
            created: false,
            trail: lifecycle.finish(),
        })
    }

    /// Computes what [`Self::reconcile`] would do without mutating the store.
    ///
    /// # Errors
    ///
    /// Same as [`Self::reconcile`], minus anything from the apply phase.
    pub async fn plan(&self, desired: &DesiredObject) -> Result<Plan, ReconcileError> {
        let Prepared { variant, plan } = self.prepare(desired)?;

        let action = match self.fetch(variant, desired).await? {
            None => PlannedAction::Create {
                payload: variant.build_create_request(&plan),
            },
            Some(state) => {
                let plan = keep_stored(variant, &plan, &desired.object, &state);
                let operations = diff_objects(variant, &plan, &state);
                if operations.is_empty() {
                    PlannedAction::NoChange
                } else {
                    PlannedAction::Update { operations }
                }
            }
        };

        Ok(Plan {
            family: variant.family().name,
            id: plan.id,
            action,
        })
    }

    /// Deletes an object this tool created.
    ///
    /// Adopted objects are server-intrinsic and are left in place.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::Configuration`] for unknown families and
    /// [`ReconcileError::Remote`] for any status other than success or 404.
    pub async fn delete(&self, desired: &DesiredObject) -> Result<Deletion, ReconcileError> {
        let family = self.registry.family(&desired.family)?;

        if desired.mode == Mode::Adopt {
            info!(family = family.name, id = desired.id(), "Adopted object left in place");
            return Ok(Deletion::Forgotten);
        }

        match self.store.delete(family.endpoint, desired.id()).await {
            Ok(()) => {
                info!(family = family.name, id = desired.id(), "Deleted object");
                Ok(Deletion::Deleted)
            }
            Err(e) if e.is_not_found() => {
                debug!(family = family.name, id = desired.id(), "Object already gone");
                Ok(Deletion::AlreadyGone)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Lists a family's objects on the server.
    ///
    /// Entries that do not decode are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] if the family is unknown or the list call
    /// fails.
    pub async fn list(&self, family: &str) -> Result<Vec<ConfigObject>, ReconcileError> {
        let family = self.registry.family(family)?;
        let entries = self.store.list(family.endpoint).await?;

        let mut objects = Vec::with_capacity(entries.len());
        for entry in &entries {
            match family.decode(entry) {
                Ok(object) => objects.push(object),
                Err(e) => warn!(family = family.name, error = %e, "Skipping undecodable entry"),
            }
        }

        Ok(objects)
    }

    /// Fetches the last-known state, normalized for diffing.
    ///
    /// Returns `None` only in create mode when the object does not exist.
    async fn fetch(
        &self,
        variant: Variant<'static>,
        desired: &DesiredObject,
    ) -> Result<Option<ConfigObject>, ReconcileError> {
        let family = variant.family();

        let body = match self.store.get(family.endpoint, desired.id()).await {
            Ok(body) => body,
            Err(e) if e.is_not_found() => {
                return match desired.mode {
                    Mode::Create => {
                        debug!(family = family.name, id = desired.id(), "Object absent");
                        Ok(None)
                    }
                    Mode::Adopt => Err(ReconcileError::NotFound {
                        family: family.name,
                        id: desired.id().to_string(),
                    }),
                };
            }
            Err(e) => return Err(e.into()),
        };

        let decoded = family.decode(&body)?;
        if decoded.variant != variant.tag() {
            return Err(ReconcileError::VariantMismatch {
                id: desired.id().to_string(),
                desired: variant.tag().to_string(),
                remote: decoded.variant,
            });
        }

        let mut state = null_not_applicable(variant, &decoded);
        if let Some(previous) = &desired.previous {
            overlay_obscured(variant, &mut state, previous);
        }

        Ok(Some(state))
    }
}
