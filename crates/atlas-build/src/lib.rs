//! # atlas-build — The Build Engine
//!
//! Orchestrates one build from fetched payloads to a sealed snapshot:
//!
//! 1. fan out provider extractions (per-origin concurrency limits,
//!    results written back by input index),
//! 2. assemble cells by spatially joining the partition layer against
//!    every district layer,
//! 3. build country trees and the global tree,
//! 4. publish documents and seal the snapshot in one repository
//!    transaction.
//!
//! The engine owns the in-flight tree exclusively; a sealed snapshot is
//! shared-read. A failed or cancelled build publishes nothing and leaves
//! the previous snapshot authoritative. Redistricting events drive
//! minimum-scope rebuilds with dual-validity bookkeeping.

pub mod assembler;
pub mod cancel;
pub mod config;
pub mod documents;
pub mod engine;
pub mod fetch_plan;
pub mod pipeline;
pub mod publisher;
pub mod redistricting;
pub mod repository;

pub use assembler::{assemble_cells, PartitionUnit};
pub use cancel::CancelToken;
pub use config::BuildConfig;
pub use documents::{
    CellEntry, CountryDocument, GlobalCountryEntry, GlobalIndexDocument, RegionEntry,
};
pub use engine::BuildEngine;
pub use fetch_plan::{fetch_all, FetchTask};
pub use pipeline::{
    gate_on_reports, normalize_fetched, validate_layers, FetchedLayer, NormalizedLayers,
};
pub use publisher::{DirectoryPublisher, Publisher};
pub use redistricting::{LayerPhase, RebuildScope, RedistrictingTracker};
pub use repository::{
    ExtractionRecord, FailureRecord, JobRecord, JobScopeRecord, NotConfiguredRecord, Repository,
    SnapshotRegionRecord, ValidationResultRecord,
};
