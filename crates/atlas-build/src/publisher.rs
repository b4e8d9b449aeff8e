//! # Publisher Capability
//!
//! Content-addressed publishing lives outside the core: IPFS gateways
//! and pinning services implement [`Publisher`] elsewhere. Publishing is
//! the third suspension point; the engine checkpoints cancellation
//! before every upload.
//!
//! [`DirectoryPublisher`] is the one implementation shipped here — a
//! filesystem content-addressed store (`{base}/{kind}/{digest}.json`)
//! for local runs and fixtures. Filenames encode the content digest, so
//! publishing is idempotent and corruption is visible at read time.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use atlas_core::{AtlasError, CanonicalBytes};
use atlas_crypto::sha256_hex;

use crate::documents::{CountryDocument, GlobalIndexDocument};

/// The content-addressed publishing capability.
pub trait Publisher: Send + Sync {
    /// Publish one country document; returns its content address.
    fn publish_country(&self, document: &CountryDocument) -> Result<String, AtlasError>;

    /// Publish the global index document; returns its content address.
    fn publish_global(&self, document: &GlobalIndexDocument) -> Result<String, AtlasError>;
}

/// A filesystem content-addressed store.
#[derive(Debug, Clone)]
pub struct DirectoryPublisher {
    base_dir: PathBuf,
}

impl DirectoryPublisher {
    /// A publisher rooted at `base_dir`. The directory is created on
    /// first publish.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// The store root.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The path an artifact of `kind` with `digest` lives at.
    pub fn path_for(&self, kind: &str, digest: &str) -> PathBuf {
        self.base_dir.join(kind).join(format!("{digest}.json"))
    }

    fn store(&self, kind: &str, canonical: &CanonicalBytes) -> Result<String, AtlasError> {
        let digest = sha256_hex(canonical.as_bytes());
        let dir = self.base_dir.join(kind);
        fs::create_dir_all(&dir)
            .map_err(|e| AtlasError::InvalidInput(format!("publisher store {kind}: {e}")))?;

        let path = self.path_for(kind, &digest);
        // Create-if-absent: identical digest means identical content, so
        // an existing file is already correct.
        match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(canonical.as_bytes()).map_err(|e| {
                    AtlasError::InvalidInput(format!("publisher write {kind}: {e}"))
                })?;
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(AtlasError::InvalidInput(format!(
                    "publisher open {kind}: {e}"
                )))
            }
        }
        Ok(digest)
    }
}

impl Publisher for DirectoryPublisher {
    fn publish_country(&self, document: &CountryDocument) -> Result<String, AtlasError> {
        self.store("country", &document.canonical_bytes()?)
    }

    fn publish_global(&self, document: &GlobalIndexDocument) -> Result<String, AtlasError> {
        self.store("global-index", &document.canonical_bytes()?)
    }
}
