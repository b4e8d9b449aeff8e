//! # Published Documents
//!
//! The two outbound document shapes: the global index (one per
//! snapshot) and the per-country document (one per committed country).
//! Hashes render as `0x` + 64 lowercase hex; serialization goes through
//! `CanonicalBytes`, so keys sort and no whitespace or floats survive.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use atlas_core::{AtlasError, CanonicalBytes, Cell, CountryCode, Timestamp};
use atlas_crypto::sha256_hex;
use atlas_merkle::{cell_leaf, leaf::slot_hash, CountryTree};

/// Document format version.
pub const DOCUMENT_VERSION: &str = "3.0.0";

/// Per-country entry in the global index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalCountryEntry {
    /// Content address of the country document.
    pub cid: String,
    /// Country root, `0x` + 64 hex.
    pub root: String,
    /// Committed cell count.
    pub cells: u64,
    /// Fixed slot count N for this country.
    pub slots: u32,
    /// Approximate country-document size, whole megabytes.
    pub size_mb: u64,
    /// When this country last rebuilt.
    pub last_updated: String,
}

/// The global index document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalIndexDocument {
    /// Format version.
    pub version: String,
    /// The global root, `0x` + 64 hex.
    pub global_root: String,
    /// Seal time, ISO-8601.
    pub timestamp: String,
    /// The leaf model committed by this tree.
    pub leaf_model: String,
    /// Per-country entries, keyed by ISO alpha-2.
    pub countries: BTreeMap<String, GlobalCountryEntry>,
}

/// Per-region entry of a country document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionEntry {
    /// Region root, `0x` + 64 hex.
    pub root: String,
    /// Cells in the region.
    pub cells: u64,
}

/// Per-cell entry of a country document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellEntry {
    /// Stable cell identifier.
    pub cell_id: String,
    /// The committed leaf hash, `0x` + 64 hex.
    pub leaf_hash: String,
    /// Slot hashes in slot order (vacant slots carry the canonical
    /// zero), `0x` + 64 hex each.
    pub district_hashes: Vec<String>,
    /// Slot identifiers in slot order; `null` for vacant slots.
    pub district_ids: Vec<Option<String>>,
}

/// The per-country document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryDocument {
    /// ISO alpha-2 country code.
    pub country: String,
    /// Country root, `0x` + 64 hex.
    pub root: String,
    /// Regions, keyed by subdivision suffix (`CA`, not `US-CA`).
    pub regions: BTreeMap<String, RegionEntry>,
    /// Every committed cell, in canonical (region, cell id) order.
    pub cells: Vec<CellEntry>,
}

impl CountryDocument {
    /// Render a country tree and its cells into the published shape.
    pub fn from_tree(tree: &CountryTree, cells: &[Cell]) -> Self {
        let regions = tree
            .regions()
            .map(|(region, root, cell_count)| {
                (
                    region.subdivision().to_string(),
                    RegionEntry {
                        root: root.to_prefixed_hex(),
                        cells: cell_count as u64,
                    },
                )
            })
            .collect();

        let mut sorted: Vec<&Cell> = cells.iter().collect();
        sorted.sort_by(|a, b| {
            (&a.region_code, &a.cell_id).cmp(&(&b.region_code, &b.cell_id))
        });

        let cells = sorted
            .into_iter()
            .map(|cell| CellEntry {
                cell_id: cell.cell_id.as_str().to_string(),
                leaf_hash: cell_leaf(cell).value.to_prefixed_hex(),
                district_hashes: cell
                    .district_slots
                    .iter()
                    .map(|entry| slot_hash(entry).to_prefixed_hex())
                    .collect(),
                district_ids: cell
                    .district_slots
                    .iter()
                    .map(|entry| entry.map(|id| id.as_str().to_string()))
                    .collect(),
            })
            .collect();

        Self {
            country: tree.country().as_str().to_string(),
            root: tree.root().to_prefixed_hex(),
            regions,
            cells,
        }
    }

    /// Canonical bytes of the document.
    pub fn canonical_bytes(&self) -> Result<CanonicalBytes, AtlasError> {
        Ok(CanonicalBytes::new(self)?)
    }

    /// SHA-256 hex of the canonical bytes, the document's content hash.
    pub fn content_hash(&self) -> Result<String, AtlasError> {
        Ok(sha256_hex(self.canonical_bytes()?.as_bytes()))
    }

    /// Approximate published size in whole megabytes, rounded up.
    pub fn size_mb(&self) -> Result<u64, AtlasError> {
        Ok((self.canonical_bytes()?.len() as u64).div_ceil(1024 * 1024))
    }
}

impl GlobalIndexDocument {
    /// Assemble the index from per-country entries.
    pub fn new(
        global_root: String,
        sealed_at: Timestamp,
        countries: BTreeMap<CountryCode, GlobalCountryEntry>,
    ) -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            global_root,
            timestamp: sealed_at.to_iso8601(),
            leaf_model: "cell".to_string(),
            countries: countries
                .into_iter()
                .map(|(code, entry)| (code.as_str().to_string(), entry))
                .collect(),
        }
    }

    /// Canonical bytes of the document.
    pub fn canonical_bytes(&self) -> Result<CanonicalBytes, AtlasError> {
        Ok(CanonicalBytes::new(self)?)
    }
}
