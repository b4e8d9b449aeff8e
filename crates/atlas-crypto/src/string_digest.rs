//! # String-to-Field Digests
//!
//! Maps arbitrary bytes into the scalar field: SHA-256, truncated to the
//! first 31 bytes (248 bits), reinterpreted big-endian. 248 < 254 bits,
//! so the result is always below the modulus and no reduction happens —
//! the truncation is the whole in-field argument.
//!
//! These digests derive identifier, layer-tag, and geometry field
//! elements. They are never used to combine Merkle nodes; that is
//! exclusively [`crate::hash_pair`].

use std::sync::OnceLock;

use ark_bn254::Fr;
use ark_ff::PrimeField;
use sha2::{Digest, Sha256};

use crate::field::FieldElement;

/// Digest arbitrary bytes into a field element.
pub fn hash_string(input: impl AsRef<[u8]>) -> FieldElement {
    let digest = Sha256::digest(input.as_ref());
    // 31 bytes = 248 bits < 254: already in-field, so the mod-order
    // constructor never actually reduces.
    FieldElement::from_fr(Fr::from_be_bytes_mod_order(&digest[..31]))
}

/// Plain SHA-256 as lowercase hex, for payload content hashes in
/// provenance records.
pub fn sha256_hex(input: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(input.as_ref()))
}

static EMPTY_SLOT: OnceLock<FieldElement> = OnceLock::new();

/// The canonical zero placeholder for a vacant district slot.
pub fn empty_slot() -> FieldElement {
    *EMPTY_SLOT.get_or_init(|| hash_string("EMPTY_SLOT"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digests_are_deterministic_and_distinct() {
        assert_eq!(hash_string("0601"), hash_string("0601"));
        assert_ne!(hash_string("0601"), hash_string("0602"));
        assert_ne!(hash_string(""), hash_string("0601"));
    }

    #[test]
    fn top_byte_is_always_zero() {
        for input in ["", "a", "congressional", "060370001001"] {
            assert_eq!(hash_string(input).to_be_bytes()[0], 0);
        }
    }

    #[test]
    fn empty_slot_is_the_digest_of_its_tag() {
        assert_eq!(empty_slot(), hash_string("EMPTY_SLOT"));
        // Second call hits the cached value.
        assert_eq!(empty_slot(), empty_slot());
    }

    #[test]
    fn sha256_hex_matches_known_vector() {
        // SHA-256("abc"), a NIST test vector.
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn hash_string_is_truncated_sha256() {
        // Zero byte, then the first 31 bytes of the SHA-256 digest.
        let fe = hash_string("abc");
        assert_eq!(fe.to_hex(), format!("00{}", &sha256_hex("abc")[..62]));
    }
}
