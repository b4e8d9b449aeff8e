//! # Layer Types
//!
//! The closed enumeration of administrative layer kinds. Proof layers can
//! occupy a district slot; reference layers (census tract, ZIP, metro) are
//! ingested for cross-validation context only and never enter proofs.

use serde::{Deserialize, Serialize};

use crate::error::AtlasError;

/// Kind of administrative layer a boundary belongs to.
///
/// The canonical string form (`as_str`) is the value used in sort keys,
/// leaf hashes, and published documents. It never changes for an existing
/// variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerType {
    /// National lower-house district.
    Congressional,
    /// State/provincial upper legislative chamber.
    StateUpper,
    /// State/provincial lower legislative chamber.
    StateLower,
    /// County or county-equivalent.
    County,
    /// Incorporated city or municipality.
    City,
    /// Municipal council ward.
    CouncilWard,
    /// Unified school district.
    SchoolUnified,
    /// Elementary school district.
    SchoolElementary,
    /// Secondary school district.
    SchoolSecondary,
    /// Voting precinct.
    VotingPrecinct,
    /// Fire protection district.
    Fire,
    /// Water district.
    Water,
    /// Utility district.
    Utility,
    /// Transit district.
    Transit,
    /// Library district.
    Library,
    /// Hospital district.
    Hospital,
    /// Judicial district.
    Judicial,
    /// Tribal area.
    Tribal,
    /// Census tract (reference only).
    CensusTract,
    /// ZIP code tabulation area (reference only).
    Zip,
    /// Metropolitan statistical area (reference only).
    Metro,
}

impl LayerType {
    /// Every variant, in canonical declaration order.
    pub const ALL: [LayerType; 21] = [
        Self::Congressional,
        Self::StateUpper,
        Self::StateLower,
        Self::County,
        Self::City,
        Self::CouncilWard,
        Self::SchoolUnified,
        Self::SchoolElementary,
        Self::SchoolSecondary,
        Self::VotingPrecinct,
        Self::Fire,
        Self::Water,
        Self::Utility,
        Self::Transit,
        Self::Library,
        Self::Hospital,
        Self::Judicial,
        Self::Tribal,
        Self::CensusTract,
        Self::Zip,
        Self::Metro,
    ];

    /// The canonical kebab-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Congressional => "congressional",
            Self::StateUpper => "state-upper",
            Self::StateLower => "state-lower",
            Self::County => "county",
            Self::City => "city",
            Self::CouncilWard => "council-ward",
            Self::SchoolUnified => "school-unified",
            Self::SchoolElementary => "school-elementary",
            Self::SchoolSecondary => "school-secondary",
            Self::VotingPrecinct => "voting-precinct",
            Self::Fire => "fire",
            Self::Water => "water",
            Self::Utility => "utility",
            Self::Transit => "transit",
            Self::Library => "library",
            Self::Hospital => "hospital",
            Self::Judicial => "judicial",
            Self::Tribal => "tribal",
            Self::CensusTract => "census-tract",
            Self::Zip => "zip",
            Self::Metro => "metro",
        }
    }

    /// Parse a canonical kebab-case name.
    pub fn parse(s: &str) -> Result<Self, AtlasError> {
        Self::ALL
            .iter()
            .copied()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| AtlasError::InvalidInput(format!("unknown layer type {s:?}")))
    }

    /// Reference layers never occupy a district slot or enter proofs.
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::CensusTract | Self::Zip | Self::Metro)
    }
}

impl std::fmt::Display for LayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
