//! # Merkle Paths
//!
//! Sibling-path extraction and reconstruction. A path step is a sibling
//! hash plus a direction bit: 0 when the current node is the left child,
//! 1 when it is the right. At a level where the current node is the
//! unpaired last entry, the node itself is supplied as its own sibling —
//! the verifier accepts exactly that form and nothing else.

use serde::{Deserialize, Serialize};

use atlas_crypto::{hash_pair, FieldElement};

use crate::builder::MerkleTree;

/// A sibling path from a leaf (or subtree root) up to a root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerklePath {
    /// Sibling hashes, leaf level first.
    pub siblings: Vec<FieldElement>,
    /// Direction bits, aligned with `siblings`: `false` = current node
    /// is the left child, `true` = right child.
    pub directions: Vec<bool>,
}

impl MerklePath {
    /// An empty path (single-leaf tree: the leaf is the root).
    pub fn empty() -> Self {
        Self {
            siblings: Vec::new(),
            directions: Vec::new(),
        }
    }

    /// Extract the path for a leaf index.
    ///
    /// Returns `None` when the index is out of range.
    pub fn for_index(tree: &MerkleTree, leaf_index: usize) -> Option<Self> {
        if leaf_index >= tree.leaf_count() {
            return None;
        }
        let mut siblings = Vec::with_capacity(tree.depth());
        let mut directions = Vec::with_capacity(tree.depth());
        let mut position = leaf_index;

        for level in &tree.levels()[..tree.depth()] {
            let sibling_position = position ^ 1;
            let sibling = match level.get(sibling_position) {
                Some(s) => *s,
                // Unpaired node: it is its own sibling.
                None => level[position],
            };
            siblings.push(sibling);
            directions.push(position & 1 == 1);
            position /= 2;
        }
        Some(Self {
            siblings,
            directions,
        })
    }

    /// Fold a starting hash up the path.
    pub fn reconstruct(&self, start: FieldElement) -> FieldElement {
        self.siblings
            .iter()
            .zip(&self.directions)
            .fold(start, |current, (sibling, is_right)| {
                if *is_right {
                    hash_pair(*sibling, current)
                } else {
                    hash_pair(current, *sibling)
                }
            })
    }

    /// Whether folding `start` up this path lands on `root`.
    pub fn verifies(&self, start: FieldElement, root: FieldElement) -> bool {
        self.siblings.len() == self.directions.len() && self.reconstruct(start) == root
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.siblings.len()
    }

    /// Whether the path has no steps.
    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }

    /// Concatenate a continuation path (used when a sub-tree root
    /// continues upward through a higher-level tree).
    pub fn then(mut self, upper: &MerklePath) -> Self {
        self.siblings.extend(upper.siblings.iter().copied());
        self.directions.extend(upper.directions.iter().copied());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{BatchConfig, Leaf, LeafKey};

    fn tree_of(values: &[u64]) -> MerkleTree {
        let leaves = values
            .iter()
            .enumerate()
            .map(|(i, v)| Leaf {
                key: LeafKey {
                    primary: "congressional".into(),
                    secondary: format!("{i:04}"),
                },
                value: FieldElement::from(*v),
            })
            .collect();
        MerkleTree::build(leaves, &BatchConfig::default(), "test").unwrap()
    }

    #[test]
    fn every_leaf_of_every_size_round_trips() {
        for size in [1usize, 2, 3, 4, 5, 7, 8, 9, 15, 16, 17, 33] {
            let values: Vec<u64> = (1..=size as u64).collect();
            let tree = tree_of(&values);
            for leaf_index in 0..size {
                let path = MerklePath::for_index(&tree, leaf_index).unwrap();
                assert!(
                    path.verifies(tree.leaves()[leaf_index], tree.root()),
                    "round-trip failed at size={size}, index={leaf_index}"
                );
            }
        }
    }

    #[test]
    fn middle_leaf_of_three_has_the_expected_shape() {
        let tree = tree_of(&[1, 2, 3]);
        let path = MerklePath::for_index(&tree, 1).unwrap();
        let (a, c) = (FieldElement::from(1u64), FieldElement::from(3u64));

        assert_eq!(path.len(), 2);
        // Step 1: leaf 1 is the right child of (a, b).
        assert_eq!(path.siblings[0], a);
        assert!(path.directions[0]);
        // Step 2: (a,b) is the left child under the root; sibling is (c,c).
        assert_eq!(path.siblings[1], hash_pair(c, c));
        assert!(!path.directions[1]);
    }

    #[test]
    fn tampered_siblings_fail() {
        let tree = tree_of(&[1, 2, 3, 4, 5]);
        for leaf_index in 0..5 {
            let leaf = tree.leaves()[leaf_index];
            let path = MerklePath::for_index(&tree, leaf_index).unwrap();
            for step in 0..path.len() {
                let mut tampered = path.clone();
                tampered.siblings[step] = FieldElement::from(999_999u64);
                assert!(!tampered.verifies(leaf, tree.root()));
            }
        }
    }

    #[test]
    fn flipped_direction_bits_fail() {
        let tree = tree_of(&[1, 2, 3, 4, 5]);
        for leaf_index in 0..5 {
            let leaf = tree.leaves()[leaf_index];
            let path = MerklePath::for_index(&tree, leaf_index).unwrap();
            for step in 0..path.len() {
                let mut flipped = path.clone();
                flipped.directions[step] = !flipped.directions[step];
                // A flip can only accidentally verify when sibling and
                // current hash are equal, which happens only at a
                // self-pair step.
                if flipped.siblings[step] != path.reconstruct_prefix(leaf, step) {
                    assert!(!flipped.verifies(leaf, tree.root()));
                }
            }
        }
    }

    #[test]
    fn single_leaf_path_is_empty() {
        let tree = tree_of(&[42]);
        let path = MerklePath::for_index(&tree, 0).unwrap();
        assert!(path.is_empty());
        assert!(path.verifies(FieldElement::from(42u64), tree.root()));
    }

    #[test]
    fn out_of_range_index_is_none() {
        let tree = tree_of(&[1, 2, 3]);
        assert!(MerklePath::for_index(&tree, 3).is_none());
    }

    #[test]
    fn concatenated_paths_reconstruct_through_both_trees() {
        let lower = tree_of(&[1, 2, 3, 4]);
        // An upper tree whose leaf 0 happens to be the lower root.
        let upper_leaves = vec![
            Leaf {
                key: LeafKey {
                    primary: "region".into(),
                    secondary: "a".into(),
                },
                value: lower.root(),
            },
            Leaf {
                key: LeafKey {
                    primary: "region".into(),
                    secondary: "b".into(),
                },
                value: FieldElement::from(77u64),
            },
        ];
        let upper = MerkleTree::build(upper_leaves, &BatchConfig::default(), "test").unwrap();

        let lower_path = MerklePath::for_index(&lower, 2).unwrap();
        let upper_path = MerklePath::for_index(&upper, 0).unwrap();
        let combined = lower_path.then(&upper_path);
        assert!(combined.verifies(lower.leaves()[2], upper.root()));
    }

    impl MerklePath {
        /// Test helper: the running hash after `steps` steps.
        fn reconstruct_prefix(&self, start: FieldElement, steps: usize) -> FieldElement {
            MerklePath {
                siblings: self.siblings[..steps].to_vec(),
                directions: self.directions[..steps].to_vec(),
            }
            .reconstruct(start)
        }
    }
}
