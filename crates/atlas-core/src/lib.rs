//! # atlas-core — Foundational Types for Shadow Atlas
//!
//! This crate is the bedrock of the Shadow Atlas workspace. It defines the
//! boundary/cell data model, identifier newtypes, the district-slot layout
//! tables, canonical byte production, and the closed error taxonomy that
//! every other crate surfaces.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `CountryCode`, `RegionCode`,
//!    `BoundaryId`, `CellId`, `SnapshotId`, `EventId` — all newtypes with
//!    validated constructors. No bare strings for identifiers.
//!
//! 2. **`CanonicalBytes` newtype.** All digest inputs for published documents
//!    flow through `CanonicalBytes::new()`: RFC 8785 key ordering, compact
//!    separators, float rejection. The inner buffer is private; there is no
//!    other construction path.
//!
//! 3. **Single `LayerType` enum.** One definition, exhaustive `match`
//!    everywhere. Adding a layer forces every consumer to handle it.
//!
//! 4. **UTC-only timestamps.** `Timestamp` enforces UTC with Z suffix and
//!    seconds precision.
//!
//! 5. **Closed error taxonomy.** Every fallible operation in the workspace
//!    ultimately surfaces as one of five `ErrorKind`s; `InvariantViolated`
//!    is the only catastrophic one.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `atlas-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod boundary;
pub mod canonical;
pub mod cell;
pub mod continent;
pub mod error;
pub mod event;
pub mod ids;
pub mod layer;
pub mod slots;
pub mod snapshot;
pub mod temporal;

pub use boundary::{AuthorityLevel, Boundary, Provenance};
pub use canonical::CanonicalBytes;
pub use cell::{Cell, DistrictSlots};
pub use continent::{continent_of, Continent};
pub use error::{AtlasError, CanonicalError, ErrorKind, InvariantViolation};
pub use event::{EventSource, RedistrictingEvent};
pub use ids::{BoundaryId, CellId, CountryCode, EventId, RegionCode, SnapshotId};
pub use layer::LayerType;
pub use slots::{SlotIndex, SlotLayout};
pub use snapshot::{CountryEntry, Snapshot};
pub use temporal::Timestamp;
