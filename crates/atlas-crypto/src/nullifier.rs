//! # Nullifier Derivation
//!
//! A nullifier is the one-time-use public value a prover reveals with a
//! membership proof: `hash_n(user_secret, context_id, epoch)`. The same
//! secret in the same context and epoch always derives the same
//! nullifier, which is what lets a verifier spot reuse — detecting and
//! rejecting that reuse happens at the application layer, not here.

use crate::field::FieldElement;
use crate::poseidon::hash_n;
use crate::string_digest::hash_string;

/// Derive the nullifier for a `(secret, context, epoch)` triple.
///
/// `context_id` is an arbitrary application tag (e.g. a ballot or
/// campaign identifier) digested into the field; `epoch` is a caller-
/// defined period counter.
pub fn derive_nullifier(user_secret: FieldElement, context_id: &str, epoch: u64) -> FieldElement {
    hash_n(&[user_secret, hash_string(context_id), FieldElement::from(epoch)])
}
