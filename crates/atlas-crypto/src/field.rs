//! # BN254 Field Elements
//!
//! A thin wrapper over the BN254 scalar field with the two encodings the
//! rest of the workspace needs: 32-byte big-endian bytes, and 64-char
//! lowercase hex (optionally `0x`-prefixed) for published documents.
//!
//! Values at or above the field modulus are rejected with
//! `InvalidFieldElement` — nothing in this crate reduces silently.

use ark_bn254::Fr;
use ark_ff::{BigInteger, BigInteger256, PrimeField, Zero};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CryptoError;

/// An element of the BN254 scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldElement(Fr);

impl FieldElement {
    /// The additive identity.
    pub fn zero() -> Self {
        Self(Fr::zero())
    }

    /// Wrap a raw scalar. Used by the hashers in this crate.
    pub(crate) fn from_fr(fr: Fr) -> Self {
        Self(fr)
    }

    /// The raw scalar, for sponge absorption.
    pub(crate) fn as_fr(&self) -> &Fr {
        &self.0
    }

    /// Decode a 32-byte big-endian value.
    ///
    /// # Errors
    ///
    /// `InvalidFieldElement` when the value is ≥ the field modulus.
    pub fn from_be_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let mut limbs = [0u64; 4];
        for (i, limb) in limbs.iter_mut().enumerate() {
            let start = 32 - (i + 1) * 8;
            let mut chunk = [0u8; 8];
            chunk.copy_from_slice(&bytes[start..start + 8]);
            *limb = u64::from_be_bytes(chunk);
        }
        Fr::from_bigint(BigInteger256::new(limbs))
            .map(Self)
            .ok_or_else(|| {
                CryptoError::InvalidFieldElement(format!(
                    "value 0x{} is not below the BN254 scalar modulus",
                    hex::encode(bytes)
                ))
            })
    }

    /// Decode 64 lowercase/uppercase hex chars, with or without `0x`.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        if stripped.len() != 64 {
            return Err(CryptoError::InvalidFieldElement(format!(
                "expected 64 hex chars, got {}",
                stripped.len()
            )));
        }
        let raw = hex::decode(stripped)
            .map_err(|e| CryptoError::InvalidFieldElement(format!("non-hex input: {e}")))?;
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&raw);
        Self::from_be_bytes(&bytes)
    }

    /// Encode as 32 big-endian bytes.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let raw = self.0.into_bigint().to_bytes_be();
        let mut out = [0u8; 32];
        out[32 - raw.len()..].copy_from_slice(&raw);
        out
    }

    /// Encode as 64 lowercase hex chars, no prefix. This is the
    /// normalized form hash inputs are compared in.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_be_bytes())
    }

    /// Encode as `0x` + 64 lowercase hex, the published-document form.
    pub fn to_prefixed_hex(&self) -> String {
        format!("0x{}", self.to_hex())
    }
}

impl From<u64> for FieldElement {
    fn from(v: u64) -> Self {
        Self(Fr::from(v))
    }
}

impl std::fmt::Display for FieldElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_prefixed_hex())
    }
}

impl Serialize for FieldElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_prefixed_hex())
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_values_round_trip_hex() {
        let x = FieldElement::from(42u64);
        let hex = x.to_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.ends_with("2a"));
        assert_eq!(FieldElement::from_hex(&hex).unwrap(), x);
        assert_eq!(FieldElement::from_hex(&x.to_prefixed_hex()).unwrap(), x);
    }

    #[test]
    fn zero_is_all_zero_bytes() {
        assert_eq!(FieldElement::zero().to_be_bytes(), [0u8; 32]);
    }

    #[test]
    fn modulus_is_rejected() {
        // The BN254 scalar modulus itself, big-endian.
        let modulus_hex = "30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001";
        assert!(matches!(
            FieldElement::from_hex(modulus_hex),
            Err(CryptoError::InvalidFieldElement(_))
        ));
        // One below the modulus is fine.
        let below = "30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000000";
        assert!(FieldElement::from_hex(below).is_ok());
        // All-ones is far above the modulus.
        assert!(FieldElement::from_be_bytes(&[0xff; 32]).is_err());
    }

    #[test]
    fn wrong_lengths_are_rejected() {
        assert!(FieldElement::from_hex("abcd").is_err());
        assert!(FieldElement::from_hex(&"0".repeat(63)).is_err());
        assert!(FieldElement::from_hex("zz").is_err());
    }

    #[test]
    fn serde_round_trip_is_prefixed_hex() {
        let x = FieldElement::from(7u64);
        let json = serde_json::to_string(&x).unwrap();
        assert!(json.starts_with("\"0x"));
        let back: FieldElement = serde_json::from_str(&json).unwrap();
        assert_eq!(back, x);
    }
}
