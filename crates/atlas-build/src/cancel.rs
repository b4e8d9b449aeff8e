//! # Cooperative Cancellation
//!
//! One flag, created at build start, shared with every component that
//! can block. The three suspension points — upstream fetch, batch hash
//! submission, publisher upload — check it and bail with
//! `AtlasError::Cancelled`. A cancelled build publishes nothing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use atlas_core::AtlasError;

/// A shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// A fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Error out if cancellation has been requested. Called at every
    /// suspension point.
    pub fn checkpoint(&self) -> Result<(), AtlasError> {
        if self.is_cancelled() {
            Err(AtlasError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// The raw flag, for components that take `Arc<AtomicBool>`
    /// (the retry loop in `atlas-ingest`).
    pub fn as_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}
