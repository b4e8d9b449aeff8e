//! # Build Engine
//!
//! Owns one build invocation end to end. All stateful collaborators —
//! the cancel token, the hash pool, the capability handles — are
//! constructed here at build start and passed by reference; the only
//! process-wide singleton anywhere below is the Poseidon parameter set.
//!
//! Failure semantics: any error before `seal` completes leaves the
//! repository untouched and the previous snapshot authoritative.
//! Publishing happens before sealing, so an aborted build can leave
//! unreferenced content-addressed documents behind; nothing ever points
//! at them.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use atlas_core::{
    AtlasError, Cell, CountryCode, EventSource, LayerType, RedistrictingEvent, RegionCode,
    Snapshot, SnapshotId, SlotLayout, Timestamp,
};
use atlas_ingest::SourceMetadata;
use atlas_merkle::{CountryTree, GlobalTree};

use crate::cancel::CancelToken;
use crate::config::BuildConfig;
use crate::documents::{CountryDocument, GlobalCountryEntry, GlobalIndexDocument};
use crate::fetch_plan::{fetch_all, FetchTask};
use crate::publisher::Publisher;
use crate::redistricting::RedistrictingTracker;
use crate::repository::{Repository, SnapshotRegionRecord};

/// The build orchestrator.
pub struct BuildEngine<R, P> {
    config: BuildConfig,
    repository: R,
    publisher: P,
    cancel: CancelToken,
    hash_pool: rayon::ThreadPool,
}

impl<R: Repository, P: Publisher> BuildEngine<R, P> {
    /// Construct an engine with a dedicated hash worker pool.
    pub fn new(config: BuildConfig, repository: R, publisher: P) -> Result<Self, AtlasError> {
        let hash_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.effective_workers())
            .build()
            .map_err(|e| AtlasError::InvalidInput(format!("hash pool: {e}")))?;
        Ok(Self {
            config,
            repository,
            publisher,
            cancel: CancelToken::new(),
            hash_pool,
        })
    }

    /// The engine's cancel token; share it with whatever supervises the
    /// build.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// The engine's configuration.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// The repository handle.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Fan out provider extractions under the configured per-origin
    /// concurrency limit.
    pub async fn fetch(
        &self,
        tasks: Vec<FetchTask>,
    ) -> Result<Vec<(Value, SourceMetadata)>, AtlasError> {
        fetch_all(tasks, self.config.fetch_concurrency, &self.cancel).await
    }

    /// Build one country's tree on the hash pool.
    pub fn build_country(
        &self,
        country: CountryCode,
        cells: &[Cell],
    ) -> Result<CountryTree, AtlasError> {
        self.cancel.checkpoint()?;
        self.hash_pool
            .install(|| CountryTree::build(country, cells, &self.config.batch))
    }

    /// Minimum-scope rebuild: one region's cells, everything else
    /// reused.
    pub fn rebuild_region(
        &self,
        tree: &CountryTree,
        region: &RegionCode,
        cells: &[Cell],
    ) -> Result<CountryTree, AtlasError> {
        self.cancel.checkpoint()?;
        self.hash_pool
            .install(|| tree.with_region_rebuilt(region, cells))
    }

    /// Compose country trees into the global root, publish every
    /// document, and seal the snapshot in one repository transaction.
    pub fn seal(
        &self,
        trees: &BTreeMap<CountryCode, CountryTree>,
        cells: &BTreeMap<CountryCode, Vec<Cell>>,
        quality_score: Option<String>,
    ) -> Result<Snapshot, AtlasError> {
        self.cancel.checkpoint()?;

        let country_roots: BTreeMap<CountryCode, _> = trees
            .iter()
            .map(|(code, tree)| (code.clone(), tree.root()))
            .collect();
        let global = self
            .hash_pool
            .install(|| GlobalTree::build(&country_roots, &self.config.batch))?;

        let sealed_at = Timestamp::now();
        let mut entries = BTreeMap::new();
        let mut snapshot_countries = BTreeMap::new();
        let mut region_records = Vec::new();
        let snapshot_id = SnapshotId::new();
        let mut total_cells = 0u64;
        let mut total_boundaries = 0u64;

        for (code, tree) in trees {
            let country_cells = cells.get(code).map(Vec::as_slice).unwrap_or(&[]);
            let document = CountryDocument::from_tree(tree, country_cells);

            // Publisher upload is a suspension point.
            self.cancel.checkpoint()?;
            let cid = self.publisher.publish_country(&document)?;
            tracing::info!(country = %code, %cid, "published country document");

            let boundary_count = distinct_boundaries(country_cells);
            total_cells += tree.cell_count() as u64;
            total_boundaries += boundary_count;

            entries.insert(
                code.clone(),
                GlobalCountryEntry {
                    cid: cid.clone(),
                    root: tree.root().to_prefixed_hex(),
                    cells: tree.cell_count() as u64,
                    slots: SlotLayout::for_country(code)?.len() as u32,
                    size_mb: document.size_mb()?,
                    last_updated: sealed_at.to_iso8601(),
                },
            );
            snapshot_countries.insert(
                code.clone(),
                atlas_core::CountryEntry {
                    root: tree.root().to_prefixed_hex(),
                    content_address: cid,
                    cell_count: tree.cell_count() as u64,
                    boundary_count,
                },
            );
            for (region, root, cell_count) in tree.regions() {
                region_records.push(SnapshotRegionRecord {
                    snapshot_id,
                    country: code.as_str().to_string(),
                    region: region.as_str().to_string(),
                    root: root.to_prefixed_hex(),
                    cell_count: cell_count as u64,
                    archived_at: None,
                });
            }
        }

        let index = GlobalIndexDocument::new(
            global.root().to_prefixed_hex(),
            sealed_at,
            entries,
        );
        self.cancel.checkpoint()?;
        let content_address = self.publisher.publish_global(&index)?;

        let previous = self.repository.current_snapshot()?;
        let version = previous.as_ref().map(|s| s.version + 1).unwrap_or(1);

        let snapshot = Snapshot {
            snapshot_id,
            global_root: global.root().to_prefixed_hex(),
            content_address,
            version,
            countries: snapshot_countries,
            boundary_count: total_boundaries,
            cell_count: total_cells,
            quality_score,
            created_at: sealed_at,
            superseded_at: None,
        };
        self.repository.create_snapshot(&snapshot, &region_records)?;
        if let Some(previous) = previous {
            self.repository
                .supersede_snapshot(&previous.snapshot_id, sealed_at)?;
        }
        tracing::info!(
            version,
            root = %snapshot.global_root,
            cells = total_cells,
            "snapshot sealed"
        );
        Ok(snapshot)
    }

    /// Close out a redistricting rebuild: record the event in the
    /// tracker and persist it.
    #[allow(clippy::too_many_arguments)]
    pub fn record_redistricting(
        &self,
        tracker: &mut RedistrictingTracker,
        country: &CountryCode,
        region: Option<&RegionCode>,
        layer: LayerType,
        effective_at: Timestamp,
        old_root: String,
        new_root: String,
        source: EventSource,
    ) -> Result<RedistrictingEvent, AtlasError> {
        let event = tracker.complete_rebuild(
            country,
            region,
            layer,
            effective_at,
            old_root,
            new_root,
            source,
            self.config.dual_validity_days,
        )?;
        self.repository.record_event(&event)?;
        Ok(event)
    }
}

/// Distinct boundary ids referenced across a country's cells.
fn distinct_boundaries(cells: &[Cell]) -> u64 {
    let mut ids = BTreeSet::new();
    for cell in cells {
        for slot in cell.district_slots.iter().flatten() {
            ids.insert(slot.as_str().to_string());
        }
    }
    ids.len() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_boundaries_deduplicates_across_cells() {
        use atlas_core::{BoundaryId, CellId, DistrictSlots, SlotIndex};
        let us = CountryCode::new("US").unwrap();
        let layout = SlotLayout::for_country(&us).unwrap();

        let mut cells = Vec::new();
        for id in ["a", "b"] {
            let mut slots = DistrictSlots::vacant(&layout);
            slots
                .assign(SlotIndex(0), BoundaryId::new("0601"), &us)
                .unwrap();
            slots
                .assign(SlotIndex(3), BoundaryId::new("06037"), &us)
                .unwrap();
            cells.push(Cell {
                cell_id: CellId::new(id),
                country_code: us.clone(),
                region_code: RegionCode::new("US-CA").unwrap(),
                district_slots: slots,
                population: None,
            });
        }
        assert_eq!(distinct_boundaries(&cells), 2);
    }
}
