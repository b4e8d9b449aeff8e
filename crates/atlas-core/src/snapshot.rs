//! # Snapshot — A Sealed Build
//!
//! An immutable record of one completed build: the global root, the
//! content address it was published under, and the per-country roll-up.
//! The engine exclusively owns an in-flight tree; once sealed into a
//! `Snapshot` the record becomes shared-read and nothing mutates it —
//! supersession writes a new snapshot and stamps `superseded_at` through
//! the repository, never in place.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::{CountryCode, SnapshotId};
use crate::temporal::Timestamp;

/// The per-country roll-up stored inside a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryEntry {
    /// The country Merkle root, `0x` + 64 lowercase hex.
    pub root: String,
    /// Content address of the per-country document.
    pub content_address: String,
    /// Number of cells committed for this country.
    pub cell_count: u64,
    /// Number of boundaries committed for this country.
    pub boundary_count: u64,
}

/// One sealed build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Unique snapshot identifier.
    pub snapshot_id: SnapshotId,
    /// The global Merkle root, `0x` + 64 lowercase hex.
    pub global_root: String,
    /// Content address of the global index document.
    pub content_address: String,
    /// Monotonically increasing on-chain version counter.
    pub version: u64,
    /// Per-country roots and content addresses, keyed by ISO alpha-2.
    pub countries: BTreeMap<CountryCode, CountryEntry>,
    /// Total boundaries across all countries.
    pub boundary_count: u64,
    /// Total cells across all countries.
    pub cell_count: u64,
    /// Quality score tag for warning-level builds (absent when clean).
    pub quality_score: Option<String>,
    /// When the build sealed.
    pub created_at: Timestamp,
    /// Set by the repository when a later snapshot supersedes this one.
    pub superseded_at: Option<Timestamp>,
}

impl Snapshot {
    /// Whether this snapshot is still the authoritative one.
    pub fn is_current(&self) -> bool {
        self.superseded_at.is_none()
    }
}
