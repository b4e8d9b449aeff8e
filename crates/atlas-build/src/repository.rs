//! # Repository Capability
//!
//! Persistence lives outside the core; this trait is the seam. The
//! record types mirror the persistence schema (`jobs`, `extractions`,
//! `failures`, `snapshots`, `snapshot_regions`, `validation_results`,
//! `not_configured`) with ISO-8601 UTC timestamps and UUID-shaped ids.
//! Every record carries `archived_at` — the core never hard-deletes.
//!
//! The trait surface is transactional units, not table writes: creating
//! a snapshot with its region associations is one call (one
//! transaction), as is recording an extraction with its validation
//! results, as is a progress-counter increment.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use atlas_core::{AtlasError, RedistrictingEvent, Snapshot, SnapshotId, Timestamp};
use atlas_validate::QualityReport;

/// One scheduled build job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    /// Job identifier.
    pub job_id: Uuid,
    /// Free-form scope description (country list, trigger).
    pub scope: String,
    /// Completed work units.
    pub completed: u32,
    /// Total work units.
    pub total: u32,
    /// When the job was created.
    pub created_at: Timestamp,
    /// Soft-delete marker.
    pub archived_at: Option<Timestamp>,
}

/// One country/layer scope a job covers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobScopeRecord {
    /// Scope identifier.
    pub scope_id: Uuid,
    /// Owning job.
    pub job_id: Uuid,
    /// ISO alpha-2 country.
    pub country: String,
    /// The layer in scope.
    pub layer: String,
    /// Optional region restriction (ISO-3166-2).
    pub region: Option<String>,
    /// Soft-delete marker.
    pub archived_at: Option<Timestamp>,
}

/// One successful layer extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRecord {
    /// Extraction identifier.
    pub extraction_id: Uuid,
    /// Owning job.
    pub job_id: Uuid,
    /// Provider name.
    pub source: String,
    /// Layer extracted.
    pub layer: String,
    /// Endpoint the payload came from.
    pub endpoint_url: String,
    /// SHA-256 hex of the raw payload.
    pub content_hash: String,
    /// Features delivered.
    pub feature_count: u32,
    /// When the extraction completed.
    pub extracted_at: Timestamp,
    /// Soft-delete marker.
    pub archived_at: Option<Timestamp>,
}

/// One failed fetch or build step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Failure identifier.
    pub failure_id: Uuid,
    /// Owning job, when one exists.
    pub job_id: Option<Uuid>,
    /// Which component failed.
    pub component: String,
    /// The closed error kind.
    pub kind: String,
    /// Human-readable detail.
    pub detail: String,
    /// When the failure was recorded.
    pub failed_at: Timestamp,
    /// Soft-delete marker.
    pub archived_at: Option<Timestamp>,
}

/// One cross-validation outcome tied to an extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResultRecord {
    /// Result identifier.
    pub result_id: Uuid,
    /// The extraction this validates.
    pub extraction_id: Uuid,
    /// The full quality report.
    pub report: QualityReport,
    /// When validation ran.
    pub validated_at: Timestamp,
    /// Soft-delete marker.
    pub archived_at: Option<Timestamp>,
}

/// A layer a build wanted that no provider is configured to serve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotConfiguredRecord {
    /// Record identifier.
    pub record_id: Uuid,
    /// Owning job.
    pub job_id: Uuid,
    /// ISO alpha-2 country.
    pub country: String,
    /// The unserved layer.
    pub layer: String,
    /// When the gap was observed.
    pub observed_at: Timestamp,
    /// Soft-delete marker.
    pub archived_at: Option<Timestamp>,
}

/// One region root association of a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRegionRecord {
    /// Owning snapshot.
    pub snapshot_id: SnapshotId,
    /// ISO alpha-2 country.
    pub country: String,
    /// ISO-3166-2 region.
    pub region: String,
    /// Region root, `0x` + 64 hex.
    pub root: String,
    /// Cells in the region.
    pub cell_count: u64,
    /// Soft-delete marker.
    pub archived_at: Option<Timestamp>,
}

/// The persistence capability consumed by the engine.
pub trait Repository: Send + Sync {
    /// Persist a sealed snapshot with its region associations, in one
    /// transaction.
    fn create_snapshot(
        &self,
        snapshot: &Snapshot,
        regions: &[SnapshotRegionRecord],
    ) -> Result<(), AtlasError>;

    /// The currently authoritative snapshot, if any.
    fn current_snapshot(&self) -> Result<Option<Snapshot>, AtlasError>;

    /// Mark a snapshot superseded at the given instant.
    fn supersede_snapshot(&self, id: &SnapshotId, at: Timestamp) -> Result<(), AtlasError>;

    /// Persist a successful extraction together with its validation
    /// results, in one transaction.
    fn record_extraction(
        &self,
        extraction: &ExtractionRecord,
        validations: &[ValidationResultRecord],
    ) -> Result<(), AtlasError>;

    /// Persist a failure.
    fn record_failure(&self, failure: &FailureRecord) -> Result<(), AtlasError>;

    /// Read-modify-write a job's progress counter, in one transaction.
    /// Returns the new completed count.
    fn increment_progress(&self, job_id: &Uuid, delta: u32) -> Result<u32, AtlasError>;

    /// Persist a redistricting event.
    fn record_event(&self, event: &RedistrictingEvent) -> Result<(), AtlasError>;

    /// Events whose dual-validity window covers the given instant.
    fn events_active_at(&self, at: Timestamp) -> Result<Vec<RedistrictingEvent>, AtlasError>;
}
