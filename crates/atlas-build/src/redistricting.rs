//! # Redistricting State Machine & Dual Validity
//!
//! Each `(country, region?, layer)` scope moves through
//! `Stable → ChangeDetected → Rebuilding → DualValid → Stable`. A change
//! arrives from a court order, a legislative ping, a freshness probe, or
//! a manual trigger; the rebuild recomputes the minimum sub-tree; the
//! superseded root stays acceptable until `dual_validity_until`, after
//! which the scope settles back to stable.
//!
//! The tracker is a value created at build start and passed by
//! reference — it records events and answers "which roots are
//! acceptable right now", and an external validator consults the
//! persisted events for the same answer after this process is gone.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use atlas_core::{
    AtlasError, CountryCode, EventId, EventSource, LayerType, RedistrictingEvent, RegionCode,
    Timestamp,
};

/// Lifecycle phase of one layer/jurisdiction scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerPhase {
    /// No change in flight.
    Stable,
    /// A change was detected; rebuild not yet queued.
    ChangeDetected,
    /// The affected sub-tree is rebuilding.
    Rebuilding,
    /// Rebuilt; the superseded root is still acceptable.
    DualValid,
}

impl LayerPhase {
    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stable => "STABLE",
            Self::ChangeDetected => "CHANGE_DETECTED",
            Self::Rebuilding => "REBUILDING",
            Self::DualValid => "DUAL_VALID",
        }
    }
}

impl std::fmt::Display for LayerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The minimum sub-tree a change requires rebuilding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildScope {
    /// One region's tree, plus ancestors.
    Region(CountryCode, RegionCode),
    /// One country's tree, plus ancestors.
    Country(CountryCode),
}

/// One tracked scope.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ScopeKey {
    country: CountryCode,
    region: Option<RegionCode>,
    layer: LayerType,
}

/// Tracks phases and dual-validity windows across scopes.
#[derive(Debug, Default)]
pub struct RedistrictingTracker {
    phases: BTreeMap<ScopeKey, (LayerPhase, Option<Timestamp>)>,
    events: Vec<RedistrictingEvent>,
}

impl RedistrictingTracker {
    /// A tracker with no scopes in flight.
    pub fn new() -> Self {
        Self::default()
    }

    /// The phase of a scope (`Stable` when never touched).
    pub fn phase(
        &self,
        country: &CountryCode,
        region: Option<&RegionCode>,
        layer: LayerType,
    ) -> LayerPhase {
        self.phases
            .get(&key(country, region, layer))
            .map(|(phase, _)| *phase)
            .unwrap_or(LayerPhase::Stable)
    }

    /// `Stable → ChangeDetected`.
    pub fn detect_change(
        &mut self,
        country: &CountryCode,
        region: Option<&RegionCode>,
        layer: LayerType,
    ) -> Result<(), AtlasError> {
        self.transition(country, region, layer, LayerPhase::Stable, LayerPhase::ChangeDetected)
    }

    /// `ChangeDetected → Rebuilding`; returns the minimum rebuild scope.
    pub fn begin_rebuild(
        &mut self,
        country: &CountryCode,
        region: Option<&RegionCode>,
        layer: LayerType,
    ) -> Result<RebuildScope, AtlasError> {
        self.transition(
            country,
            region,
            layer,
            LayerPhase::ChangeDetected,
            LayerPhase::Rebuilding,
        )?;
        Ok(match region {
            Some(r) => RebuildScope::Region(country.clone(), r.clone()),
            None => RebuildScope::Country(country.clone()),
        })
    }

    /// `Rebuilding → DualValid`: record the event and open the window.
    #[allow(clippy::too_many_arguments)]
    pub fn complete_rebuild(
        &mut self,
        country: &CountryCode,
        region: Option<&RegionCode>,
        layer: LayerType,
        effective_at: Timestamp,
        old_root: String,
        new_root: String,
        source: EventSource,
        dual_validity_days: i64,
    ) -> Result<RedistrictingEvent, AtlasError> {
        let until = effective_at.plus_days(dual_validity_days);
        self.transition(country, region, layer, LayerPhase::Rebuilding, LayerPhase::DualValid)?;
        if let Some(state) = self.phases.get_mut(&key(country, region, layer)) {
            state.1 = Some(until);
        }

        let event = RedistrictingEvent {
            event_id: EventId::new(),
            country_code: country.clone(),
            region_code: region.cloned(),
            layer_type: layer,
            effective_at,
            old_root,
            new_root,
            dual_validity_until: until,
            source,
        };
        tracing::info!(
            country = %event.country_code,
            layer = %event.layer_type,
            until = %event.dual_validity_until,
            "redistricting rebuilt; dual validity open"
        );
        self.events.push(event.clone());
        Ok(event)
    }

    /// `DualValid → Stable` for every scope whose window has passed.
    pub fn expire(&mut self, now: Timestamp) {
        for state in self.phases.values_mut() {
            if state.0 == LayerPhase::DualValid
                && state.1.map(|until| now > until).unwrap_or(true)
            {
                *state = (LayerPhase::Stable, None);
            }
        }
    }

    /// Every recorded event.
    pub fn events(&self) -> &[RedistrictingEvent] {
        &self.events
    }

    /// Whether a claimed root is acceptable at `now`: the current root
    /// always is; a superseded root is while its window is open.
    pub fn root_acceptable(&self, claimed: &str, current_root: &str, now: Timestamp) -> bool {
        if claimed == current_root {
            return true;
        }
        self.events
            .iter()
            .any(|event| event.old_root == claimed && event.old_root_valid_at(now))
    }

    fn transition(
        &mut self,
        country: &CountryCode,
        region: Option<&RegionCode>,
        layer: LayerType,
        expected: LayerPhase,
        next: LayerPhase,
    ) -> Result<(), AtlasError> {
        let scope = key(country, region, layer);
        let current = self
            .phases
            .get(&scope)
            .map(|(phase, _)| *phase)
            .unwrap_or(LayerPhase::Stable);
        if current != expected {
            return Err(AtlasError::InvalidInput(format!(
                "scope {country}/{layer} is {current}, cannot move to {next}"
            )));
        }
        self.phases.insert(scope, (next, None));
        Ok(())
    }
}

fn key(country: &CountryCode, region: Option<&RegionCode>, layer: LayerType) -> ScopeKey {
    ScopeKey {
        country: country.clone(),
        region: region.cloned(),
        layer,
    }
}
