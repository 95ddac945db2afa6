//! What the caller asks the engine to converge on.

use std::fmt;

use serde::Deserialize;

use super::ConfigObject;

/// How an object relates to the remote store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// The engine owns the object: it creates it when absent and deletes it
    /// on destroy.
    #[default]
    Create,
    /// The object already exists on the server. The engine manages its
    /// attributes but never creates or deletes it.
    Adopt,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => f.write_str("create"),
            Self::Adopt => f.write_str("adopt"),
        }
    }
}

/// The desired form of one object for one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredObject {
    /// Family name, e.g. `cipher-stream-provider`.
    pub family: String,
    /// Ownership mode.
    pub mode: Mode,
    /// Desired attributes.
    pub object: ConfigObject,
    /// The result of the caller's previous pass, if it kept one.
    ///
    /// Only its obscured attributes are used: the store never returns them,
    /// so this is the only record of what was last written.
    pub previous: Option<ConfigObject>,
}

impl DesiredObject {
    /// Creates a desired object in `Create` mode.
    #[must_use]
    pub fn create(family: impl Into<String>, object: ConfigObject) -> Self {
        Self {
            family: family.into(),
            mode: Mode::Create,
            object,
            previous: None,
        }
    }

    /// Creates a desired object in `Adopt` mode.
    #[must_use]
    pub fn adopt(family: impl Into<String>, object: ConfigObject) -> Self {
        Self {
            mode: Mode::Adopt,
            ..Self::create(family, object)
        }
    }

    /// Attaches the previous pass result.
    #[must_use]
    pub fn with_previous(mut self, previous: ConfigObject) -> Self {
        self.previous = Some(previous);
        self
    }

    /// The object id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.object.id
    }
}
