//! # Expected-Count Registry
//!
//! Published constants for how many districts a layer must contain: 650
//! UK parliamentary constituencies, 435 US congressional districts, 40
//! California senate seats. Counts are exact unless an entry carries a
//! documented tolerance — the escape hatch for sources that persistently
//! publish an off-by-one artifact (Wisconsin's senate layer ships 34
//! features against the statutory 33, one being a vacant placeholder).

use serde::{Deserialize, Serialize};

use atlas_core::{CountryCode, LayerType, RegionCode};

/// A published expected count, with optional documented tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedCount {
    /// The statutory number of districts.
    pub count: u32,
    /// Accepted absolute deviation. Zero for every entry without a
    /// documented upstream artifact.
    pub tolerance: u32,
}

impl ExpectedCount {
    /// An exact expectation.
    pub fn exact(count: u32) -> Self {
        Self {
            count,
            tolerance: 0,
        }
    }

    /// An expectation with a documented tolerance.
    pub fn with_tolerance(count: u32, tolerance: u32) -> Self {
        Self { count, tolerance }
    }

    /// Whether an observed count is acceptable under this entry.
    pub fn accepts(&self, observed: u32) -> bool {
        observed.abs_diff(self.count) <= self.tolerance
    }
}

/// Lookup key scope: national layer, or one region of a country.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct RegistryKey {
    country: CountryCode,
    region: Option<RegionCode>,
    layer: LayerType,
}

/// The registry of published counts.
#[derive(Debug, Clone, Default)]
pub struct ExpectedCountRegistry {
    entries: Vec<(RegistryKey, ExpectedCount)>,
}

impl ExpectedCountRegistry {
    /// The built-in table for the countries with published layouts.
    pub fn published() -> Self {
        let us = CountryCode::new("US").expect("static code");
        let gb = CountryCode::new("GB").expect("static code");
        let region = |code: &str| RegionCode::new(code).expect("static code");

        let mut registry = Self::default();
        registry.insert(us.clone(), None, LayerType::Congressional, ExpectedCount::exact(435));
        registry.insert(gb, None, LayerType::Congressional, ExpectedCount::exact(650));
        registry.insert(
            us.clone(),
            Some(region("US-CA")),
            LayerType::StateUpper,
            ExpectedCount::exact(40),
        );
        registry.insert(
            us.clone(),
            Some(region("US-CA")),
            LayerType::StateLower,
            ExpectedCount::exact(80),
        );
        // Wisconsin senate: 33 statutory seats, upstream ships 34
        // features (one vacant placeholder row carries geometry).
        registry.insert(
            us,
            Some(region("US-WI")),
            LayerType::StateUpper,
            ExpectedCount::with_tolerance(33, 1),
        );
        registry
    }

    /// Add or replace an entry.
    pub fn insert(
        &mut self,
        country: CountryCode,
        region: Option<RegionCode>,
        layer: LayerType,
        expected: ExpectedCount,
    ) {
        let key = RegistryKey {
            country,
            region,
            layer,
        };
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = expected;
        } else {
            self.entries.push((key, expected));
        }
    }

    /// Look up an entry, trying region scope first, then national.
    pub fn lookup(
        &self,
        country: &CountryCode,
        region: Option<&RegionCode>,
        layer: LayerType,
    ) -> Option<ExpectedCount> {
        let scoped = self.entries.iter().find(|(k, _)| {
            k.country == *country && k.layer == layer && k.region.as_ref() == region
        });
        if let Some((_, e)) = scoped {
            return Some(*e);
        }
        if region.is_some() {
            return self
                .entries
                .iter()
                .find(|(k, _)| k.country == *country && k.layer == layer && k.region.is_none())
                .map(|(_, e)| *e);
        }
        None
    }
}
