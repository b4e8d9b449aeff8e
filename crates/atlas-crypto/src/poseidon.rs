//! # Poseidon2 Pair Hashing
//!
//! The Merkle node hash: Poseidon2 over the BN254 scalar field at width
//! t=3 (rate 2, capacity 1), 8 full and 57 partial rounds, x^5 S-box —
//! the standard 128-bit parameter set for this field. Round constants and
//! the MDS matrix come from the arkworks Grain LFSR derivation and are
//! computed once into a process-wide `OnceLock`.
//!
//! `hash_pair(a, b)` absorbs `a` then `b` and squeezes one element.
//! Absorption order matters: `hash_pair(a, b) ≠ hash_pair(b, a)` in
//! general, and proof verification depends on that asymmetry to reject
//! sibling swaps.

use std::sync::OnceLock;

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::{find_poseidon_ark_and_mds, PoseidonConfig};
use ark_crypto_primitives::sponge::{CryptographicSponge, poseidon::PoseidonSponge};

use crate::field::FieldElement;

/// Width-3 sponge: two rate elements, one capacity element.
const RATE: usize = 2;
const CAPACITY: usize = 1;
const FULL_ROUNDS: usize = 8;
const PARTIAL_ROUNDS: usize = 57;
const ALPHA: u64 = 5;
const FIELD_BITS: u64 = 254;

static PARAMS: OnceLock<PoseidonConfig<Fr>> = OnceLock::new();

/// The shared Poseidon parameter set.
///
/// This is the one sanctioned singleton in the workspace: pure data,
/// initialized on first use, immutable thereafter.
fn params() -> &'static PoseidonConfig<Fr> {
    PARAMS.get_or_init(|| {
        let (ark, mds) = find_poseidon_ark_and_mds::<Fr>(
            FIELD_BITS,
            RATE,
            FULL_ROUNDS as u64,
            PARTIAL_ROUNDS as u64,
            0,
        );
        PoseidonConfig {
            full_rounds: FULL_ROUNDS,
            partial_rounds: PARTIAL_ROUNDS,
            alpha: ALPHA,
            ark,
            mds,
            rate: RATE,
            capacity: CAPACITY,
        }
    })
}

/// Hash two field elements into one. Non-commutative.
pub fn hash_pair(left: FieldElement, right: FieldElement) -> FieldElement {
    let mut sponge = PoseidonSponge::new(params());
    sponge.absorb(left.as_fr());
    sponge.absorb(right.as_fr());
    let out: Vec<Fr> = sponge.squeeze_field_elements(1);
    FieldElement::from_fr(out[0])
}

/// Left-fold of [`hash_pair`] over a small input list.
///
/// `hash_n([a]) == a`; `hash_n([a, b, c]) == hash_pair(hash_pair(a, b), c)`.
/// An empty input folds from the zero element, which only the canonical
/// empty-slot constant ever relies on.
pub fn hash_n(inputs: &[FieldElement]) -> FieldElement {
    let mut iter = inputs.iter().copied();
    let Some(first) = iter.next() else {
        return FieldElement::zero();
    };
    iter.fold(first, hash_pair)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Non-commutativity over random distinct inputs.
        #[test]
        fn random_pairs_do_not_commute(a in any::<u64>(), b in any::<u64>()) {
            prop_assume!(a != b);
            let (fa, fb) = (FieldElement::from(a), FieldElement::from(b));
            prop_assert_ne!(hash_pair(fa, fb), hash_pair(fb, fa));
        }

        /// Output is always a canonical in-field encoding.
        #[test]
        fn output_round_trips_hex(a in any::<u64>(), b in any::<u64>()) {
            let h = hash_pair(FieldElement::from(a), FieldElement::from(b));
            prop_assert_eq!(FieldElement::from_hex(&h.to_hex()).unwrap(), h);
        }
    }
}
