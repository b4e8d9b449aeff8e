//! # FetchClient Capability
//!
//! The single seam between this workspace and the network. HTTP stacks,
//! retry-aware portals, disk fixtures, and test fakes all implement this
//! trait; nothing in the core ever opens a socket itself.

use std::collections::BTreeMap;

use atlas_core::Timestamp;

use crate::error::ProviderError;

/// One upstream request, fully described.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Absolute endpoint URL (or path, for static-file sources).
    pub url: String,
    /// Query parameters, sorted for reproducible request identity.
    pub params: BTreeMap<String, String>,
}

impl FetchRequest {
    /// A request with no parameters.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add a query parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// What came back.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Raw response body.
    pub body: Vec<u8>,
    /// Declared content type, when the transport exposes one.
    pub content_type: Option<String>,
    /// Upstream modification timestamp, when the transport exposes one.
    pub last_modified: Option<Timestamp>,
}

/// The I/O capability consumed by provider adapters.
///
/// Implementations own transport policy (connection pooling, TLS,
/// timeouts). Retry with backoff is layered on top by the adapter via
/// [`crate::retry::with_retry`]; implementations should fail fast.
pub trait FetchClient: Send + Sync {
    /// Execute a request and return the raw response.
    fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, ProviderError>;

    /// Lightweight freshness probe. Implementations should prefer HEAD or
    /// conditional requests; the default falls back to a full fetch.
    fn probe(&self, request: &FetchRequest) -> Result<FetchResponse, ProviderError> {
        self.fetch(request)
    }
}
