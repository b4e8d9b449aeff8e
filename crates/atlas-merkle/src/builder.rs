//! # Multi-Layer Merkle Builder
//!
//! Bottom-up tree construction over canonically ordered leaves.
//!
//! ## Canonical ordering
//!
//! Primary key lexicographic (layer type), secondary key lexicographic
//! (identifier), stable sort. Any permutation of the input produces the
//! same root; a duplicate key is an invariant violation, not a tie.
//!
//! ## Odd-node rule
//!
//! A level with an odd population promotes its last node as
//! `hash_pair(x, x)` — at every level, identically, and proof
//! reconstruction assumes exactly this form.
//!
//! ## Parallel batching
//!
//! Pair hashing runs in parallel batches (default 64 pairs) per level.
//! Results are written into a pre-allocated vector by pair index, so
//! scheduling order never leaks into the output.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use atlas_crypto::{hash_pair, FieldElement};

use crate::error::MerkleError;

/// Batch sizing for parallel pair hashing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Pairs hashed per parallel batch.
    pub batch_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { batch_size: 64 }
    }
}

/// The composite sort key of a leaf.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LeafKey {
    /// Primary key: layer-type string, or the hierarchy level's own
    /// grouping key (region code for cell trees).
    pub primary: String,
    /// Secondary key: the identifier within the primary group.
    pub secondary: String,
}

/// One leaf: sort key plus the already-computed leaf hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    /// Composite sort key.
    pub key: LeafKey,
    /// The leaf's field element.
    pub value: FieldElement,
}

/// A built tree: every level retained for proof extraction, plus the
/// key → leaf-index mapping.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// `levels[0]` is the sorted leaf vector; the last level has length 1.
    levels: Vec<Vec<FieldElement>>,
    index: BTreeMap<LeafKey, usize>,
}

impl MerkleTree {
    /// Sort leaves canonically and fold them to a root.
    ///
    /// # Errors
    ///
    /// `EmptyTree` for zero leaves, `DuplicateLeaf` when two leaves share
    /// a sort key.
    pub fn build(
        mut leaves: Vec<Leaf>,
        config: &BatchConfig,
        context: &str,
    ) -> Result<Self, MerkleError> {
        if leaves.is_empty() {
            return Err(MerkleError::EmptyTree {
                context: context.to_string(),
            });
        }
        leaves.sort_by(|a, b| a.key.cmp(&b.key));

        let mut index = BTreeMap::new();
        for (i, leaf) in leaves.iter().enumerate() {
            if index.insert(leaf.key.clone(), i).is_some() {
                return Err(MerkleError::DuplicateLeaf {
                    primary: leaf.key.primary.clone(),
                    secondary: leaf.key.secondary.clone(),
                });
            }
        }

        let mut levels = vec![leaves.into_iter().map(|l| l.value).collect::<Vec<_>>()];
        while levels[levels.len() - 1].len() > 1 {
            let next = next_level(&levels[levels.len() - 1], config);
            levels.push(next);
        }
        tracing::debug!(
            context,
            leaves = levels[0].len(),
            depth = levels.len() - 1,
            "built merkle tree"
        );
        Ok(Self { levels, index })
    }

    /// The root.
    pub fn root(&self) -> FieldElement {
        // Construction guarantees a final single-element level.
        self.levels[self.levels.len() - 1][0]
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Tree depth (number of hashing levels above the leaves).
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// The sorted leaf vector.
    pub fn leaves(&self) -> &[FieldElement] {
        &self.levels[0]
    }

    /// Every level, leaves first. Retained for proof extraction.
    pub fn levels(&self) -> &[Vec<FieldElement>] {
        &self.levels
    }

    /// The leaf index for a sort key.
    pub fn leaf_index(&self, key: &LeafKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Iterate `(key, leaf_index)` in canonical order.
    pub fn keys(&self) -> impl Iterator<Item = (&LeafKey, usize)> {
        self.index.iter().map(|(k, i)| (k, *i))
    }
}

/// Hash one level into the next, in parallel batches, assembling results
/// in pair-index order.
fn next_level(level: &[FieldElement], config: &BatchConfig) -> Vec<FieldElement> {
    let pair_count = level.len().div_ceil(2);
    let batch_size = config.batch_size.max(1);

    let mut next = vec![FieldElement::zero(); pair_count];
    next.par_chunks_mut(batch_size)
        .enumerate()
        .for_each(|(batch_index, batch)| {
            for (offset, slot) in batch.iter_mut().enumerate() {
                let pair_index = batch_index * batch_size + offset;
                let left = level[2 * pair_index];
                let right = match level.get(2 * pair_index + 1) {
                    Some(right) => *right,
                    // Odd-node rule: the unpaired node pairs with itself.
                    None => left,
                };
                *slot = hash_pair(left, right);
            }
        });
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(primary: &str, secondary: &str, value: u64) -> Leaf {
        Leaf {
            key: LeafKey {
                primary: primary.into(),
                secondary: secondary.into(),
            },
            value: FieldElement::from(value),
        }
    }

    fn congressional(ids: &[(&str, u64)]) -> Vec<Leaf> {
        ids.iter()
            .map(|(id, v)| leaf("congressional", id, *v))
            .collect()
    }

    #[test]
    fn single_leaf_tree_roots_at_the_leaf() {
        let tree = MerkleTree::build(
            congressional(&[("0601", 7)]),
            &BatchConfig::default(),
            "test",
        )
        .unwrap();
        assert_eq!(tree.root(), FieldElement::from(7u64));
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn three_leaves_follow_the_odd_node_rule() {
        let (a, b, c) = (
            FieldElement::from(1u64),
            FieldElement::from(2u64),
            FieldElement::from(3u64),
        );
        let tree = MerkleTree::build(
            congressional(&[("0601", 1), ("0602", 2), ("0603", 3)]),
            &BatchConfig::default(),
            "test",
        )
        .unwrap();

        let level1 = &tree.levels()[1];
        assert_eq!(level1.len(), 2);
        assert_eq!(level1[0], hash_pair(a, b));
        assert_eq!(level1[1], hash_pair(c, c));
        assert_eq!(tree.root(), hash_pair(hash_pair(a, b), hash_pair(c, c)));
    }

    #[test]
    fn input_order_never_reaches_the_root() {
        let forward = MerkleTree::build(
            congressional(&[("0601", 1), ("0602", 2), ("0603", 3)]),
            &BatchConfig::default(),
            "test",
        )
        .unwrap();
        let reversed = MerkleTree::build(
            congressional(&[("0603", 3), ("0602", 2), ("0601", 1)]),
            &BatchConfig::default(),
            "test",
        )
        .unwrap();
        assert_eq!(forward.root(), reversed.root());
    }

    #[test]
    fn batch_size_never_reaches_the_root() {
        let leaves: Vec<Leaf> = (0..37)
            .map(|i| leaf("congressional", &format!("{i:04}"), i + 1))
            .collect();
        let roots: Vec<FieldElement> = [1usize, 2, 7, 64, 1000]
            .iter()
            .map(|&batch_size| {
                MerkleTree::build(leaves.clone(), &BatchConfig { batch_size }, "test")
                    .unwrap()
                    .root()
            })
            .collect();
        assert!(roots.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn layers_sort_before_ids() {
        // state-upper "0001" must land after congressional "9999".
        let tree = MerkleTree::build(
            vec![
                leaf("state-upper", "0001", 1),
                leaf("congressional", "9999", 2),
            ],
            &BatchConfig::default(),
            "test",
        )
        .unwrap();
        let congressional_key = LeafKey {
            primary: "congressional".into(),
            secondary: "9999".into(),
        };
        assert_eq!(tree.leaf_index(&congressional_key), Some(0));
    }

    #[test]
    fn duplicate_keys_are_an_invariant_violation() {
        let err = MerkleTree::build(
            congressional(&[("0601", 1), ("0601", 2)]),
            &BatchConfig::default(),
            "test",
        )
        .unwrap_err();
        assert!(matches!(err, MerkleError::DuplicateLeaf { .. }));
    }

    #[test]
    fn empty_input_is_an_invariant_violation() {
        assert!(matches!(
            MerkleTree::build(Vec::new(), &BatchConfig::default(), "test"),
            Err(MerkleError::EmptyTree { .. })
        ));
    }

    #[test]
    fn depth_grows_logarithmically() {
        let leaves: Vec<Leaf> = (0..16)
            .map(|i| leaf("congressional", &format!("{i:04}"), i + 1))
            .collect();
        let tree = MerkleTree::build(leaves, &BatchConfig::default(), "test").unwrap();
        assert_eq!(tree.depth(), 4);
        assert_eq!(tree.leaf_count(), 16);
    }
}
