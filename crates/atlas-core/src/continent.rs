//! # Continental Grouping
//!
//! The published table assigning every committed country to one of seven
//! continent tags. Grouping is organizational, but it participates in the
//! hash chain (continent commitments sit between country and global
//! roots), so the table is fixed data: membership changes are a breaking
//! release, not a runtime decision.

use serde::{Deserialize, Serialize};

use crate::error::AtlasError;
use crate::ids::CountryCode;

/// One of the seven continent tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Continent {
    /// Africa.
    Africa,
    /// Antarctica.
    Antarctica,
    /// Asia.
    Asia,
    /// Europe.
    Europe,
    /// North America.
    NorthAmerica,
    /// Oceania.
    Oceania,
    /// South America.
    SouthAmerica,
}

impl Continent {
    /// The two-letter tag used in domain-separated commitments and in
    /// lexicographic ordering at the continent level.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Africa => "AF",
            Self::Antarctica => "AN",
            Self::Asia => "AS",
            Self::Europe => "EU",
            Self::NorthAmerica => "NA",
            Self::Oceania => "OC",
            Self::SouthAmerica => "SA",
        }
    }
}

impl std::fmt::Display for Continent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Look up the continent a country is grouped under.
///
/// The table covers the countries with published slot layouts plus their
/// planned neighbors; anything else is `InvalidInput` so a typo cannot
/// silently mint a new continent grouping.
pub fn continent_of(country: &CountryCode) -> Result<Continent, AtlasError> {
    let continent = match country.as_str() {
        "CA" | "MX" | "US" => Continent::NorthAmerica,
        "AR" | "BR" | "CL" => Continent::SouthAmerica,
        "DE" | "ES" | "FR" | "GB" | "IE" | "IT" | "NL" | "PL" => Continent::Europe,
        "IN" | "JP" | "KR" | "PK" => Continent::Asia,
        "AU" | "NZ" => Continent::Oceania,
        "KE" | "NG" | "ZA" => Continent::Africa,
        other => {
            return Err(AtlasError::InvalidInput(format!(
                "country {other} has no continent grouping published"
            )))
        }
    };
    Ok(continent)
}
