//! # LayerSpec — Attribute Resolution as Data
//!
//! Upstream portals rename their columns between vintages: a 2020 release
//! carries `GEOID`, the 2010 one `GEOID10`, a state portal `DISTRICT_NO`.
//! Rather than branching per source, every layer ships a `LayerSpec`
//! enumerating the prioritized candidate attributes — the mapping is
//! data. When none of the candidates match, normalization fails loudly
//! for that feature instead of guessing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use atlas_core::{AuthorityLevel, CountryCode, LayerType, RegionCode};

/// How a boundary's region is derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RegionRule {
    /// Match the boundary id against prefixes; first match wins.
    /// Example: UK ONS codes, where `E…` is England, `W…` Wales.
    IdPrefix(Vec<(String, String)>),
    /// Read an upstream attribute and translate through a table.
    /// Example: US state FIPS attribute `STATEFP` → `US-CA`.
    Attribute {
        /// The attribute carrying the region key.
        attribute: String,
        /// Translation table from attribute value to ISO-3166-2 code.
        map: BTreeMap<String, String>,
    },
    /// The whole layer belongs to one region (state portals), or to no
    /// region at all for national layers.
    Fixed(Option<RegionCode>),
}

/// Everything the normalizer needs to know about one layer's upstream
/// schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSpec {
    /// The layer being normalized.
    pub layer: LayerType,
    /// The country publishing it.
    pub country: CountryCode,
    /// Candidate id attributes, highest priority first.
    pub id_attributes: Vec<String>,
    /// Candidate display-name attributes, highest priority first.
    pub name_attributes: Vec<String>,
    /// How regions are derived.
    pub region_rule: RegionRule,
    /// Whether an unresolvable region lands in the unknown bucket
    /// (`region = None`) instead of halting the layer.
    pub allow_unknown_region: bool,
    /// Release year of this vintage.
    pub vintage: u16,
    /// Authority of the publishing source.
    pub authority_level: AuthorityLevel,
}

impl LayerSpec {
    /// Resolve an attribute through a priority list. String values win
    /// as-is; numeric values are rendered to strings, because census
    /// portals flip GEOID columns between the two from year to year.
    pub fn resolve_attribute<'a>(
        candidates: &[String],
        properties: &'a serde_json::Map<String, Value>,
    ) -> Option<String> {
        for key in candidates {
            match properties.get(key) {
                Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.trim().to_string()),
                Some(Value::Number(n)) => return Some(n.to_string()),
                _ => continue,
            }
        }
        None
    }

    /// Resolve the region for a boundary.
    ///
    /// Returns `Ok(None)` when the rule yields nothing and unknowns are
    /// allowed; `Err(raw)` with the unmatched key when they are not.
    pub fn resolve_region(
        &self,
        id: &str,
        properties: &serde_json::Map<String, Value>,
    ) -> Result<Option<RegionCode>, String> {
        let resolved = match &self.region_rule {
            RegionRule::Fixed(region) => return Ok(region.clone()),
            RegionRule::IdPrefix(prefixes) => prefixes
                .iter()
                .find(|(prefix, _)| id.starts_with(prefix.as_str()))
                .map(|(_, region)| region.clone()),
            RegionRule::Attribute { attribute, map } => {
                Self::resolve_attribute(std::slice::from_ref(attribute), properties)
                    .and_then(|raw| map.get(raw.trim()).cloned())
            }
        };
        match resolved {
            Some(code) => RegionCode::new(&code).map(Some).map_err(|e| e.to_string()),
            None if self.allow_unknown_region => Ok(None),
            None => Err(id.to_string()),
        }
    }
}
