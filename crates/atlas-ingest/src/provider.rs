//! # Provider Adapter Model
//!
//! Every upstream source — an ArcGIS REST portal, an OGC WFS endpoint, a
//! plain JSON API, a static file drop, a census API — reduces to one
//! capability: list layers, extract a layer, answer a freshness probe,
//! and report health. The [`Provider`] trait is that capability;
//! [`SourceAdapter`] is the single implementation, dispatching request
//! construction by [`ProviderKind`] tag rather than by inheritance depth.
//!
//! Adapters own transient-failure policy: `extract` runs under the
//! configured [`RetryPolicy`], so callers see either a payload with its
//! provenance metadata or a spent retry budget.

use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use atlas_core::{AuthorityLevel, LayerType, Provenance, Timestamp};
use atlas_crypto::sha256_hex;

use crate::error::ProviderError;
use crate::fetch::{FetchClient, FetchRequest};
use crate::retry::{with_retry, RetryPolicy};

/// The upstream dialect a source speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Esri ArcGIS REST `query` endpoints.
    ArcGisRest,
    /// OGC Web Feature Service.
    OgcWfs,
    /// Plain REST endpoint returning GeoJSON.
    RestJson,
    /// A file served as-is (or read from disk by the fetch client).
    StaticFile,
    /// National census bureau APIs.
    CensusApi,
}

impl ProviderKind {
    /// Canonical tag, used in logs and validation records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ArcGisRest => "arcgis-rest",
            Self::OgcWfs => "ogc-wfs",
            Self::RestJson => "rest-json",
            Self::StaticFile => "static-file",
            Self::CensusApi => "census-api",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where one layer lives within a source.
#[derive(Debug, Clone)]
pub struct EndpointDescriptor {
    /// Base URL of the source.
    pub base_url: String,
    /// Dialect-specific resource: ArcGIS layer path, WFS type name,
    /// REST path suffix, or census dataset path.
    pub resource: Option<String>,
    /// Extra query parameters (API keys stay with the caller's
    /// `FetchClient`, never here).
    pub extra_params: BTreeMap<String, String>,
}

/// One logical layer a source offers.
#[derive(Debug, Clone)]
pub struct LayerConfig {
    /// The layer this endpoint serves.
    pub layer: LayerType,
    /// Human-readable layer name for logs.
    pub display_name: String,
    /// Published expected feature count, when one exists.
    pub expected_count: Option<u32>,
    /// Release year of the vintage behind the endpoint.
    pub vintage: u16,
    /// How authoritative the source is for this layer.
    pub authority_level: AuthorityLevel,
    /// Where to fetch it.
    pub endpoint: EndpointDescriptor,
}

/// Retrieval metadata returned with every extraction.
#[derive(Debug, Clone)]
pub struct SourceMetadata {
    /// The URL the payload came from.
    pub endpoint_url: String,
    /// When it was retrieved.
    pub retrieved_at: Timestamp,
    /// SHA-256 hex of the raw payload bytes.
    pub content_hash: String,
}

/// Result of a health probe.
#[derive(Debug, Clone)]
pub struct HealthCheck {
    /// Whether the source answered at all.
    pub available: bool,
    /// Round-trip latency of the probe.
    pub latency_ms: u64,
    /// Anything worth surfacing (error text, suspicious content type).
    pub issues: Vec<String>,
}

/// Health across every source feeding a build, taken before fetches
/// are scheduled.
#[derive(Debug, Clone, Default)]
pub struct SourceHealthReport {
    /// `(source name, probe result)` per configured source.
    pub sources: Vec<(String, HealthCheck)>,
}

impl SourceHealthReport {
    /// Probe every provider.
    pub fn gather(providers: &[&dyn Provider]) -> Self {
        Self {
            sources: providers
                .iter()
                .map(|p| (p.name().to_string(), p.health_check()))
                .collect(),
        }
    }

    /// Names of sources that did not answer. Their cross-validation
    /// checks will be reported `Skipped`.
    pub fn unavailable(&self) -> Vec<&str> {
        self.sources
            .iter()
            .filter(|(_, h)| !h.available)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Whether every configured source answered.
    pub fn all_available(&self) -> bool {
        self.sources.iter().all(|(_, h)| h.available)
    }
}

/// The upstream-source capability.
pub trait Provider: Send + Sync {
    /// Stable logical name (used in repository records and error text).
    fn name(&self) -> &str;

    /// Which dialect this source speaks.
    fn kind(&self) -> ProviderKind;

    /// The layers this source is configured to serve.
    fn list_layers(&self) -> Vec<LayerConfig>;

    /// Fetch and parse one layer, with retry, returning the payload and
    /// its retrieval metadata.
    fn extract(&self, layer: &LayerConfig) -> Result<(Value, SourceMetadata), ProviderError>;

    /// Best-effort change detection. `true` when freshness is unknown —
    /// an unreadable source must not silently suppress rebuilds.
    fn has_changed_since(&self, since: Timestamp) -> bool;

    /// Probe availability and latency.
    fn health_check(&self) -> HealthCheck;
}

/// The one adapter. Dialect differences are confined to
/// [`SourceAdapter::request_for`].
pub struct SourceAdapter<F> {
    name: String,
    kind: ProviderKind,
    organization: String,
    layers: Vec<LayerConfig>,
    client: F,
    retry: RetryPolicy,
    cancel: Arc<AtomicBool>,
}

impl<F: FetchClient> SourceAdapter<F> {
    /// Construct an adapter over a fetch client.
    ///
    /// The cancel flag is created at build start by the engine and shared
    /// with every component that can block.
    pub fn new(
        name: impl Into<String>,
        kind: ProviderKind,
        organization: impl Into<String>,
        layers: Vec<LayerConfig>,
        client: F,
        retry: RetryPolicy,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            organization: organization.into(),
            layers,
            client,
            retry,
            cancel,
        }
    }

    /// Build the dialect-specific request for a layer.
    pub fn request_for(&self, layer: &LayerConfig) -> FetchRequest {
        let ep = &layer.endpoint;
        let resource = ep.resource.as_deref();
        let mut request = match self.kind {
            ProviderKind::ArcGisRest => {
                let url = match resource {
                    Some(path) => format!("{}/{}/query", ep.base_url.trim_end_matches('/'), path),
                    None => format!("{}/query", ep.base_url.trim_end_matches('/')),
                };
                FetchRequest::new(url)
                    .with_param("f", "geojson")
                    .with_param("where", "1=1")
                    .with_param("outFields", "*")
                    .with_param("returnGeometry", "true")
            }
            ProviderKind::OgcWfs => {
                let mut req = FetchRequest::new(ep.base_url.clone())
                    .with_param("service", "WFS")
                    .with_param("version", "2.0.0")
                    .with_param("request", "GetFeature")
                    .with_param("outputFormat", "application/json");
                if let Some(type_name) = resource {
                    req = req.with_param("typeNames", type_name);
                }
                req
            }
            ProviderKind::RestJson | ProviderKind::CensusApi => {
                let url = match resource {
                    Some(path) => {
                        format!("{}/{}", ep.base_url.trim_end_matches('/'), path)
                    }
                    None => ep.base_url.clone(),
                };
                FetchRequest::new(url)
            }
            ProviderKind::StaticFile => FetchRequest::new(ep.base_url.clone()),
        };
        for (k, v) in &ep.extra_params {
            request = request.with_param(k.clone(), v.clone());
        }
        request
    }

    /// Provenance for boundaries normalized from an extraction.
    pub fn provenance_for(&self, metadata: &SourceMetadata) -> Provenance {
        Provenance {
            source_url: metadata.endpoint_url.clone(),
            content_hash: metadata.content_hash.clone(),
            retrieved_at: metadata.retrieved_at,
            organization: self.organization.clone(),
        }
    }
}

impl<F: FetchClient> Provider for SourceAdapter<F> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn list_layers(&self) -> Vec<LayerConfig> {
        self.layers.clone()
    }

    fn extract(&self, layer: &LayerConfig) -> Result<(Value, SourceMetadata), ProviderError> {
        let request = self.request_for(layer);
        tracing::debug!(source = %self.name, layer = %layer.layer, url = %request.url, "extracting layer");

        let response = with_retry(&self.retry, &self.cancel, || self.client.fetch(&request))?;

        let payload: Value =
            serde_json::from_slice(&response.body).map_err(|e| ProviderError::MalformedPayload {
                source_name: self.name.clone(),
                detail: e.to_string(),
            })?;

        let metadata = SourceMetadata {
            endpoint_url: request.url.clone(),
            retrieved_at: Timestamp::now(),
            content_hash: sha256_hex(&response.body),
        };
        Ok((payload, metadata))
    }

    fn has_changed_since(&self, since: Timestamp) -> bool {
        let Some(layer) = self.layers.first() else {
            return false;
        };
        let request = self.request_for(layer);
        match self.client.probe(&request) {
            Ok(response) => match response.last_modified {
                Some(modified) => modified > since,
                // Freshness unknown: assume changed.
                None => true,
            },
            Err(_) => true,
        }
    }

    fn health_check(&self) -> HealthCheck {
        let Some(layer) = self.layers.first() else {
            return HealthCheck {
                available: false,
                latency_ms: 0,
                issues: vec!["no layers configured".into()],
            };
        };
        let request = self.request_for(layer);
        let started = Instant::now();
        match self.client.probe(&request) {
            Ok(_) => HealthCheck {
                available: true,
                latency_ms: started.elapsed().as_millis() as u64,
                issues: Vec::new(),
            },
            Err(e) => HealthCheck {
                available: false,
                latency_ms: started.elapsed().as_millis() as u64,
                issues: vec![e.to_string()],
            },
        }
    }
}
