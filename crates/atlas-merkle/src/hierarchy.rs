//! # Hierarchical Composition
//!
//! Cells roll up through four levels: region trees over cell leaves,
//! a country tree over region commitments, continent trees over country
//! commitments, and the global tree over continent commitments.
//!
//! ## Domain separation
//!
//! At every non-leaf layer the child root is first committed with a tag:
//! `hash_pair(hash_string("REGION:" ++ code), region_root)`, and the same
//! pattern with `COUNTRY:` and `CONTINENT:`. The tag digest rides along
//! in proofs as an ordinary sibling with direction bit 1, which is what
//! makes a cell-in-country-A proof unreplayable against country B: the
//! two paths disagree at the tagged step.
//!
//! Ordering at every non-leaf layer is lexicographic on the identifier
//! (region code, ISO alpha-2, continent tag).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use atlas_core::{
    continent_of, AtlasError, Cell, CellId, Continent, CountryCode, InvariantViolation, RegionCode,
};
use atlas_crypto::{hash_pair, hash_string, FieldElement};

use crate::builder::{BatchConfig, Leaf, LeafKey, MerkleTree};
use crate::leaf::cell_leaf;
use crate::proof::MerklePath;

/// Commit a region root under its code.
pub fn region_commitment(region: &RegionCode, root: FieldElement) -> FieldElement {
    hash_pair(hash_string(format!("REGION:{}", region.as_str())), root)
}

/// Commit a country root under its ISO alpha-2 code.
pub fn country_commitment(country: &CountryCode, root: FieldElement) -> FieldElement {
    hash_pair(hash_string(format!("COUNTRY:{}", country.as_str())), root)
}

/// Commit a continent root under its tag.
pub fn continent_commitment(continent: Continent, root: FieldElement) -> FieldElement {
    hash_pair(hash_string(format!("CONTINENT:{}", continent.tag())), root)
}

/// The committed tree of one country: region trees over cells, plus the
/// country tree over region commitments.
#[derive(Debug, Clone)]
pub struct CountryTree {
    country: CountryCode,
    region_trees: BTreeMap<RegionCode, MerkleTree>,
    country_tree: MerkleTree,
    cell_regions: BTreeMap<CellId, RegionCode>,
    config: BatchConfig,
}

impl CountryTree {
    /// Build the full country tree from its assembled cells.
    pub fn build(
        country: CountryCode,
        cells: &[Cell],
        config: &BatchConfig,
    ) -> Result<Self, AtlasError> {
        let mut by_region: BTreeMap<RegionCode, Vec<&Cell>> = BTreeMap::new();
        let mut cell_regions = BTreeMap::new();
        for cell in cells {
            if cell.country_code != country {
                return Err(AtlasError::InvalidInput(format!(
                    "cell {} belongs to {}, not {}",
                    cell.cell_id, cell.country_code, country
                )));
            }
            by_region
                .entry(cell.region_code.clone())
                .or_default()
                .push(cell);
            cell_regions.insert(cell.cell_id.clone(), cell.region_code.clone());
        }

        let mut region_trees = BTreeMap::new();
        for (region, region_cells) in by_region {
            let leaves: Vec<Leaf> = region_cells.iter().map(|c| cell_leaf(c)).collect();
            let tree = MerkleTree::build(leaves, config, region.as_str())?;
            region_trees.insert(region, tree);
        }

        let country_tree = Self::compose(&country, &region_trees, config)?;
        Ok(Self {
            country,
            region_trees,
            country_tree,
            cell_regions,
            config: *config,
        })
    }

    /// Build the country tree over the current region commitments.
    fn compose(
        country: &CountryCode,
        region_trees: &BTreeMap<RegionCode, MerkleTree>,
        config: &BatchConfig,
    ) -> Result<MerkleTree, AtlasError> {
        let leaves: Vec<Leaf> = region_trees
            .iter()
            .map(|(region, tree)| Leaf {
                key: LeafKey {
                    primary: country.as_str().to_string(),
                    secondary: region.as_str().to_string(),
                },
                value: region_commitment(region, tree.root()),
            })
            .collect();
        Ok(MerkleTree::build(leaves, config, country.as_str())?)
    }

    /// The country this tree commits.
    pub fn country(&self) -> &CountryCode {
        &self.country
    }

    /// The country root.
    pub fn root(&self) -> FieldElement {
        self.country_tree.root()
    }

    /// One region's root, when the region exists.
    pub fn region_root(&self, region: &RegionCode) -> Option<FieldElement> {
        self.region_trees.get(region).map(MerkleTree::root)
    }

    /// Iterate `(region, root, cell_count)` in lexicographic order.
    pub fn regions(&self) -> impl Iterator<Item = (&RegionCode, FieldElement, usize)> {
        self.region_trees
            .iter()
            .map(|(region, tree)| (region, tree.root(), tree.leaf_count()))
    }

    /// Total committed cells.
    pub fn cell_count(&self) -> usize {
        self.region_trees.values().map(MerkleTree::leaf_count).sum()
    }

    /// Rebuild exactly one region from fresh cells, reusing every other
    /// region tree untouched, and recompute the country tree above it.
    ///
    /// This is the minimum-scope rebuild for a region-level
    /// redistricting event.
    pub fn with_region_rebuilt(
        &self,
        region: &RegionCode,
        cells: &[Cell],
    ) -> Result<Self, AtlasError> {
        if !self.region_trees.contains_key(region) {
            return Err(AtlasError::InvalidInput(format!(
                "country {} has no region {region}",
                self.country
            )));
        }
        for cell in cells {
            if cell.region_code != *region {
                return Err(AtlasError::InvalidInput(format!(
                    "cell {} belongs to {}, not {region}",
                    cell.cell_id, cell.region_code
                )));
            }
        }

        let leaves: Vec<Leaf> = cells.iter().map(cell_leaf).collect();
        let rebuilt = MerkleTree::build(leaves, &self.config, region.as_str())?;

        let mut region_trees = self.region_trees.clone();
        region_trees.insert(region.clone(), rebuilt);

        let mut cell_regions: BTreeMap<CellId, RegionCode> = self
            .cell_regions
            .iter()
            .filter(|(_, r)| *r != region)
            .map(|(c, r)| (c.clone(), r.clone()))
            .collect();
        for cell in cells {
            cell_regions.insert(cell.cell_id.clone(), region.clone());
        }

        let country_tree = Self::compose(&self.country, &region_trees, &self.config)?;
        Ok(Self {
            country: self.country.clone(),
            region_trees,
            country_tree,
            cell_regions,
            config: self.config,
        })
    }

    /// The committed leaf hash of a cell.
    pub fn leaf_of(&self, cell_id: &CellId) -> Option<FieldElement> {
        let region = self.cell_regions.get(cell_id)?;
        let tree = self.region_trees.get(region)?;
        let index = tree.leaf_index(&LeafKey {
            primary: region.as_str().to_string(),
            secondary: cell_id.as_str().to_string(),
        })?;
        tree.leaves().get(index).copied()
    }

    /// The sibling path from a cell's leaf all the way to the country
    /// root, crossing the region-commitment tag step.
    pub fn cell_path(&self, cell_id: &CellId) -> Option<MerklePath> {
        let region = self.cell_regions.get(cell_id)?;
        let region_tree = self.region_trees.get(region)?;
        let leaf_index = region_tree.leaf_index(&LeafKey {
            primary: region.as_str().to_string(),
            secondary: cell_id.as_str().to_string(),
        })?;
        let region_path = MerklePath::for_index(region_tree, leaf_index)?;

        // The tagged commitment step: region_root is the right child of
        // hash_pair(tag_digest, region_root).
        let tag_step = MerklePath {
            siblings: vec![hash_string(format!("REGION:{}", region.as_str()))],
            directions: vec![true],
        };

        let commitment_index = self.country_tree.leaf_index(&LeafKey {
            primary: self.country.as_str().to_string(),
            secondary: region.as_str().to_string(),
        })?;
        let country_path = MerklePath::for_index(&self.country_tree, commitment_index)?;

        Some(region_path.then(&tag_step).then(&country_path))
    }
}

/// The global tree: continent trees over country commitments, and the
/// global root over continent commitments.
#[derive(Debug, Clone)]
pub struct GlobalTree {
    continent_trees: BTreeMap<Continent, MerkleTree>,
    global_tree: MerkleTree,
    country_continents: BTreeMap<CountryCode, Continent>,
}

impl GlobalTree {
    /// Compose per-country roots into the global root.
    pub fn build(
        country_roots: &BTreeMap<CountryCode, FieldElement>,
        config: &BatchConfig,
    ) -> Result<Self, AtlasError> {
        if country_roots.is_empty() {
            return Err(AtlasError::InvariantViolated(InvariantViolation::EmptyTree {
                context: "global".into(),
            }));
        }

        let mut by_continent: BTreeMap<Continent, Vec<(&CountryCode, FieldElement)>> =
            BTreeMap::new();
        let mut country_continents = BTreeMap::new();
        for (country, root) in country_roots {
            let continent = continent_of(country)?;
            by_continent
                .entry(continent)
                .or_default()
                .push((country, *root));
            country_continents.insert(country.clone(), continent);
        }

        let mut continent_trees = BTreeMap::new();
        for (continent, members) in by_continent {
            let leaves: Vec<Leaf> = members
                .iter()
                .map(|(country, root)| Leaf {
                    key: LeafKey {
                        primary: continent.tag().to_string(),
                        secondary: country.as_str().to_string(),
                    },
                    value: country_commitment(country, *root),
                })
                .collect();
            continent_trees.insert(continent, MerkleTree::build(leaves, config, continent.tag())?);
        }

        let global_leaves: Vec<Leaf> = continent_trees
            .iter()
            .map(|(continent, tree)| Leaf {
                key: LeafKey {
                    primary: "GLOBAL".to_string(),
                    secondary: continent.tag().to_string(),
                },
                value: continent_commitment(*continent, tree.root()),
            })
            .collect();
        let global_tree = MerkleTree::build(global_leaves, config, "global")?;

        Ok(Self {
            continent_trees,
            global_tree,
            country_continents,
        })
    }

    /// The global root.
    pub fn root(&self) -> FieldElement {
        self.global_tree.root()
    }

    /// The sibling path from a country's root to the global root,
    /// crossing both tagged commitment steps.
    pub fn country_path(&self, country: &CountryCode) -> Option<MerklePath> {
        let continent = self.country_continents.get(country)?;
        let continent_tree = self.continent_trees.get(continent)?;

        let country_tag = MerklePath {
            siblings: vec![hash_string(format!("COUNTRY:{}", country.as_str()))],
            directions: vec![true],
        };
        let commitment_index = continent_tree.leaf_index(&LeafKey {
            primary: continent.tag().to_string(),
            secondary: country.as_str().to_string(),
        })?;
        let continent_path = MerklePath::for_index(continent_tree, commitment_index)?;

        let continent_tag = MerklePath {
            siblings: vec![hash_string(format!("CONTINENT:{}", continent.tag()))],
            directions: vec![true],
        };
        let global_index = self.global_tree.leaf_index(&LeafKey {
            primary: "GLOBAL".to_string(),
            secondary: continent.tag().to_string(),
        })?;
        let global_path = MerklePath::for_index(&self.global_tree, global_index)?;

        Some(
            country_tag
                .then(&continent_path)
                .then(&continent_tag)
                .then(&global_path),
        )
    }
}

/// A full membership proof: leaf to country root, country root to global
/// root, with the claimed country root in between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipProof {
    /// Sibling path from the cell leaf to the country root.
    pub cell_proof: MerklePath,
    /// Sibling path from the country root to the global root.
    pub country_proof: MerklePath,
    /// The claimed country root joining the two halves.
    pub country_root: FieldElement,
}

impl MembershipProof {
    /// Verify against a leaf hash and a claimed global root.
    pub fn verify(&self, leaf: FieldElement, global_root: FieldElement) -> bool {
        self.cell_proof.verifies(leaf, self.country_root)
            && self.country_proof.verifies(self.country_root, global_root)
    }

    /// Total sibling hashes across both halves.
    pub fn len(&self) -> usize {
        self.cell_proof.len() + self.country_proof.len()
    }

    /// Whether the proof carries no steps at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
