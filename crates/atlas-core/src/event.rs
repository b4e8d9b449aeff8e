//! # Redistricting Events
//!
//! The durable record of one boundary-change episode: which layer and
//! jurisdiction changed, which roots it moved between, and how long the
//! old root stays acceptable. External validators consult these records
//! to honor dual validity.

use serde::{Deserialize, Serialize};

use crate::ids::{CountryCode, EventId, RegionCode};
use crate::layer::LayerType;
use crate::temporal::Timestamp;

/// What triggered a redistricting event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventSource {
    /// A court ordered new maps.
    CourtOrder,
    /// A legislature enacted new maps.
    Legislative,
    /// Decennial census release.
    Census,
    /// Operator-triggered rebuild.
    Manual,
}

impl EventSource {
    /// Canonical kebab-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CourtOrder => "court-order",
            Self::Legislative => "legislative",
            Self::Census => "census",
            Self::Manual => "manual",
        }
    }
}

impl std::fmt::Display for EventSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded redistricting episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedistrictingEvent {
    /// Unique event identifier.
    pub event_id: EventId,
    /// The country whose commitment moved.
    pub country_code: CountryCode,
    /// The affected subdivision, when the change is sub-national.
    pub region_code: Option<RegionCode>,
    /// The layer that was redrawn.
    pub layer_type: LayerType,
    /// When the new boundaries take legal effect.
    pub effective_at: Timestamp,
    /// Global root before the rebuild, `0x` + 64 hex.
    pub old_root: String,
    /// Global root after the rebuild, `0x` + 64 hex.
    pub new_root: String,
    /// The old root remains acceptable until this instant.
    pub dual_validity_until: Timestamp,
    /// What triggered the event.
    pub source: EventSource,
}

impl RedistrictingEvent {
    /// Whether the old root is still acceptable at `now`.
    pub fn old_root_valid_at(&self, now: Timestamp) -> bool {
        now <= self.dual_validity_until
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> RedistrictingEvent {
        RedistrictingEvent {
            event_id: EventId::new(),
            country_code: CountryCode::new("US").unwrap(),
            region_code: Some(RegionCode::new("US-CA").unwrap()),
            layer_type: LayerType::Congressional,
            effective_at: Timestamp::parse("2026-01-01T00:00:00Z").unwrap(),
            old_root: format!("0x{}", "aa".repeat(32)),
            new_root: format!("0x{}", "bb".repeat(32)),
            dual_validity_until: Timestamp::parse("2026-01-31T00:00:00Z").unwrap(),
            source: EventSource::CourtOrder,
        }
    }

    #[test]
    fn old_root_valid_inside_window() {
        let e = event();
        assert!(e.old_root_valid_at(Timestamp::parse("2026-01-15T00:00:00Z").unwrap()));
        assert!(e.old_root_valid_at(e.dual_validity_until));
    }

    #[test]
    fn old_root_invalid_after_window() {
        let e = event();
        assert!(!e.old_root_valid_at(Timestamp::parse("2026-02-01T00:00:00Z").unwrap()));
    }

    #[test]
    fn source_names_are_kebab_case() {
        assert_eq!(EventSource::CourtOrder.as_str(), "court-order");
        let json = serde_json::to_string(&EventSource::Census).unwrap();
        assert_eq!(json, "\"census\"");
    }
}
