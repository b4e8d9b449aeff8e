//! # atlas-crypto — Hash Primitives
//!
//! The fixed hash kernel of Shadow Atlas: Poseidon2 over the BN254 scalar
//! field (width 3: rate 2, capacity 1) for every Merkle node, and
//! SHA-256-truncated-to-field for mapping strings and payloads into the
//! field.
//!
//! ## Division of Labor
//!
//! - [`hash_pair`] / [`hash_n`] — Merkle internal nodes, commitments,
//!   nullifiers. `hash_pair` is non-commutative, which is what makes
//!   sibling-swap forgeries detectable.
//! - [`hash_string`] — identifier and geometry digests only. It never
//!   builds internal nodes.
//!
//! ## Singleton Policy
//!
//! The only process-wide singleton in the workspace is the Poseidon
//! parameter set, initialized once behind a `OnceLock`. It is pure,
//! stateless data; everything stateful is constructed at build start and
//! passed by reference.

pub mod error;
pub mod field;
pub mod nullifier;
pub mod poseidon;
pub mod string_digest;

pub use error::CryptoError;
pub use field::FieldElement;
pub use nullifier::derive_nullifier;
pub use poseidon::{hash_n, hash_pair};
pub use string_digest::{empty_slot, hash_string, sha256_hex};
