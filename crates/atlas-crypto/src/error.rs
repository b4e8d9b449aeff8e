//! # Crypto Errors

use thiserror::Error;

use atlas_core::AtlasError;

/// Error in hash or field-element operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The input does not encode a BN254 scalar: wrong length, non-hex
    /// characters, or a value at or above the field modulus. Callers are
    /// responsible for pre-reducing; this layer never reduces silently.
    #[error("invalid field element: {0}")]
    InvalidFieldElement(String),
}

impl From<CryptoError> for AtlasError {
    fn from(e: CryptoError) -> Self {
        AtlasError::InvalidInput(e.to_string())
    }
}
