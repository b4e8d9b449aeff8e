//! # Identifier Newtypes
//!
//! Newtype wrappers for every identifier namespace in Shadow Atlas. You
//! cannot pass a `BoundaryId` where a `CellId` is expected, and country /
//! region codes are validated at construction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AtlasError;

/// ISO-3166-1 alpha-2 country code, stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CountryCode(String);

impl CountryCode {
    /// Validate and construct a country code.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` unless the input is exactly two ASCII letters.
    pub fn new(code: &str) -> Result<Self, AtlasError> {
        let c = code.trim().to_uppercase();
        if c.len() != 2 || !c.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(AtlasError::InvalidInput(format!(
                "country code must be 2 ASCII letters, got {code:?}"
            )));
        }
        Ok(Self(c))
    }

    /// Access the inner code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// ISO-3166-2 subdivision code (`CC-SUB`), stored uppercase.
///
/// The country prefix must be present; `"CA"` is not a region code,
/// `"US-CA"` is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionCode(String);

impl RegionCode {
    /// Validate and construct a region code.
    pub fn new(code: &str) -> Result<Self, AtlasError> {
        let c = code.trim().to_uppercase();
        let Some((country, sub)) = c.split_once('-') else {
            return Err(AtlasError::InvalidInput(format!(
                "region code must be CC-SUB, got {code:?}"
            )));
        };
        if country.len() != 2
            || !country.bytes().all(|b| b.is_ascii_uppercase())
            || sub.is_empty()
            || sub.len() > 3
            || !sub.bytes().all(|b| b.is_ascii_alphanumeric())
        {
            return Err(AtlasError::InvalidInput(format!(
                "malformed ISO-3166-2 code {code:?}"
            )));
        }
        Ok(Self(c))
    }

    /// Build from a validated country and a bare subdivision suffix.
    pub fn from_parts(country: &CountryCode, sub: &str) -> Result<Self, AtlasError> {
        Self::new(&format!("{}-{}", country.as_str(), sub))
    }

    /// Access the full `CC-SUB` string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The country half of the code.
    pub fn country(&self) -> &str {
        &self.0[..2]
    }

    /// The subdivision half of the code.
    pub fn subdivision(&self) -> &str {
        &self.0[3..]
    }
}

impl std::fmt::Display for RegionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque boundary identifier, unique within `(country, layer_type)`.
///
/// Stable across equivalent re-fetches; the normalizer is responsible for
/// resolving upstream attribute churn to the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoundaryId(String);

impl BoundaryId {
    /// Wrap an identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Access the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BoundaryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable opaque cell identifier (e.g. a 12-digit block-group GEOID).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(String);

impl CellId {
    /// Wrap an identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Access the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a sealed snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotId(pub Uuid);

/// Unique identifier for a redistricting event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl SnapshotId {
    /// Generate a fresh random snapshot identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl EventId {
    /// Generate a fresh random event identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SnapshotId {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "snapshot:{}", self.0)
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "event:{}", self.0)
    }
}
