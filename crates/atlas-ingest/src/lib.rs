//! # atlas-ingest — Boundary Ingestion & Providers
//!
//! The leading edge of the pipeline: upstream payloads come in through a
//! [`FetchClient`] capability, a tagged [`SourceAdapter`] speaks each
//! portal dialect (ArcGIS REST, OGC WFS, plain REST JSON, static files,
//! census APIs), and the normalizer coerces whatever arrives into ordered,
//! canonical [`atlas_core::Boundary`] values.
//!
//! Attribute resolution is data, not code: a [`LayerSpec`] enumerates the
//! prioritized candidate attribute names for ids and display names,
//! because upstream schemas rename columns between vintages. When none of
//! the candidates match, the feature fails loudly instead of guessing.

pub mod catalog;
pub mod error;
pub mod fetch;
pub mod layer_spec;
pub mod normalizer;
pub mod provider;
pub mod retry;

pub use catalog::{catalog_for, SourceCatalogEntry};
pub use error::{NormalizeError, ProviderError};
pub use fetch::{FetchClient, FetchRequest, FetchResponse};
pub use layer_spec::{LayerSpec, RegionRule};
pub use normalizer::{normalize_layer, DroppedFeature, NormalizeOutcome, NormalizerConfig};
pub use provider::{
    EndpointDescriptor, HealthCheck, LayerConfig, Provider, ProviderKind, SourceAdapter,
    SourceHealthReport, SourceMetadata,
};
pub use retry::{with_retry, RetryPolicy};
