//! # atlas-merkle — The Commitment Engine
//!
//! Bit-exact, deterministic Merkle construction from leaves to the global
//! root:
//!
//! - [`leaf`] computes provenance-bearing leaf hashes for boundaries and
//!   the slot-vector leaf hash for cells.
//! - [`builder`] sorts leaves canonically and folds them bottom-up in
//!   parallel batches, promoting an unpaired node as `hash_pair(x, x)`.
//! - [`proof`] extracts sibling paths and reconstructs roots from them.
//! - [`hierarchy`] composes region, country, continent, and global
//!   levels with domain-separated commitments so a proof minted under
//!   one country cannot be replayed under another.
//!
//! Determinism is the contract: same inputs, same root, regardless of
//! input order, worker count, or batch size.

pub mod builder;
pub mod error;
pub mod hierarchy;
pub mod leaf;
pub mod proof;

pub use builder::{BatchConfig, Leaf, LeafKey, MerkleTree};
pub use error::MerkleError;
pub use hierarchy::{
    continent_commitment, country_commitment, region_commitment, CountryTree, GlobalTree,
    MembershipProof,
};
pub use leaf::{boundary_leaf, cell_leaf};
pub use proof::MerklePath;
