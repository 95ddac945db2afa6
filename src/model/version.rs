//! Directory server product versions.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// A four-part dotted server version such as `10.0.0.0`.
///
/// Ordering is numeric, component by component. Missing trailing
/// components parse as zero, so `9.3` equals `9.3.0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServerVersion([u16; 4]);

/// Error returned when a version string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid server version '{value}': expected up to four dot-separated numbers")]
pub struct ParseVersionError {
    /// The rejected input.
    pub value: String,
}

impl ServerVersion {
    /// 9.1.0.0
    pub const V9_1: Self = Self::new(9, 1, 0, 0);
    /// 9.2.0.0
    pub const V9_2: Self = Self::new(9, 2, 0, 0);
    /// 9.3.0.0
    pub const V9_3: Self = Self::new(9, 3, 0, 0);
    /// 10.0.0.0
    pub const V10_0: Self = Self::new(10, 0, 0, 0);
    /// 10.1.0.0
    pub const V10_1: Self = Self::new(10, 1, 0, 0);

    /// Versions this crate knows how to talk to, oldest first.
    pub const SUPPORTED: [Self; 5] = [Self::V9_1, Self::V9_2, Self::V9_3, Self::V10_0, Self::V10_1];

    /// Creates a version from its components.
    #[must_use]
    pub const fn new(major: u16, minor: u16, point: u16, patch: u16) -> Self {
        Self([major, minor, point, patch])
    }

    /// The newest supported version.
    #[must_use]
    pub const fn latest() -> Self {
        Self::SUPPORTED[Self::SUPPORTED.len() - 1]
    }

    /// Returns true if this version is in [`Self::SUPPORTED`].
    #[must_use]
    pub fn is_supported(self) -> bool {
        Self::SUPPORTED.contains(&self)
    }

    /// Returns true if `self` is at least `minimum`.
    #[must_use]
    pub fn at_least(self, minimum: Self) -> bool {
        self >= minimum
    }
}

impl FromStr for ServerVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseVersionError {
            value: s.to_string(),
        };

        let mut parts = [0u16; 4];
        let mut count = 0;
        for piece in s.trim().split('.') {
            if count == parts.len() {
                return Err(err());
            }
            parts[count] = piece.parse().map_err(|_| err())?;
            count += 1;
        }

        Ok(Self(parts))
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{a}.{b}.{c}.{d}")
    }
}

impl Serialize for ServerVersion {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
