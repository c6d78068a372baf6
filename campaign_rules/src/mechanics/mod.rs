//! Campaign mechanics: offices, named resources, resource deltas.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Offices a player can hold, ordered from the lowest to the highest tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OfficeTier {
    CityCouncil,
    Mayor,
    StateLegislator,
    Governor,
    Representative,
    Senator,
    President,
}

impl OfficeTier {
    /// All tiers in ascending order.
    pub const ALL: [OfficeTier; 7] = [
        OfficeTier::CityCouncil,
        OfficeTier::Mayor,
        OfficeTier::StateLegislator,
        OfficeTier::Governor,
        OfficeTier::Representative,
        OfficeTier::Senator,
        OfficeTier::President,
    ];

    /// Zero-based tier level.
    pub fn level(&self) -> usize {
        *self as usize
    }

    /// Build a tier from a level, clamping to the highest office.
    pub fn from_level(level: usize) -> Self {
        Self::ALL[level.min(Self::ALL.len() - 1)]
    }

    /// Default effect multiplier for this tier. Higher offices feel every
    /// story harder; the curve never decreases.
    pub fn effect_multiplier(&self) -> f32 {
        match self {
            OfficeTier::CityCouncil => 0.5,
            OfficeTier::Mayor => 0.75,
            OfficeTier::StateLegislator => 1.0,
            OfficeTier::Governor => 1.25,
            OfficeTier::Representative => 1.25,
            OfficeTier::Senator => 1.5,
            OfficeTier::President => 2.0,
        }
    }

    /// Whether the office has a national profile.
    pub fn is_national(&self) -> bool {
        *self >= OfficeTier::Representative
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            OfficeTier::CityCouncil => "City Council",
            OfficeTier::Mayor => "Mayor",
            OfficeTier::StateLegislator => "State Legislator",
            OfficeTier::Governor => "Governor",
            OfficeTier::Representative => "Representative",
            OfficeTier::Senator => "Senator",
            OfficeTier::President => "President",
        }
    }
}

/// Named resources tracked for a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Resource {
    /// Public trust (0-100).
    Trust,
    /// Approval rating (0-100).
    Approval,
    /// Campaign funds.
    Funds,
    /// Political capital spent to get things done.
    PoliticalCapital,
    /// Standing with the press.
    MediaFavor,
    /// Standing with the party.
    PartyLoyalty,
}

impl Resource {
    pub const ALL: [Resource; 6] = [
        Resource::Trust,
        Resource::Approval,
        Resource::Funds,
        Resource::PoliticalCapital,
        Resource::MediaFavor,
        Resource::PartyLoyalty,
    ];

    /// Bounds a resource value is clamped to. `None` means unbounded above.
    pub fn bounds(&self) -> (f32, Option<f32>) {
        match self {
            Resource::Trust | Resource::Approval | Resource::MediaFavor | Resource::PartyLoyalty => {
                (0.0, Some(100.0))
            }
            Resource::Funds | Resource::PoliticalCapital => (0.0, None),
        }
    }

    /// Bound a raw value to this resource's bounds.
    pub fn bound_value(&self, value: f32) -> f32 {
        let (min, max) = self.bounds();
        let value = value.max(min);
        match max {
            Some(max) => value.min(max),
            None => value,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Resource::Trust => "trust",
            Resource::Approval => "approval",
            Resource::Funds => "funds",
            Resource::PoliticalCapital => "political_capital",
            Resource::MediaFavor => "media_favor",
            Resource::PartyLoyalty => "party_loyalty",
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single change to a named resource.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceDelta {
    pub resource: Resource,
    pub amount: f32,
}

impl ResourceDelta {
    pub fn new(resource: Resource, amount: f32) -> Self {
        Self { resource, amount }
    }
}

/// An ordered resource -> delta mapping.
///
/// Ordered so that summaries and application order are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceDeltas(BTreeMap<Resource, f32>);

impl ResourceDeltas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, accumulating onto any existing delta.
    pub fn with(mut self, resource: Resource, amount: f32) -> Self {
        self.add(resource, amount);
        self
    }

    /// Accumulate a delta.
    pub fn add(&mut self, resource: Resource, amount: f32) {
        *self.0.entry(resource).or_insert(0.0) += amount;
    }

    /// Accumulate every delta of another mapping.
    pub fn merge(&mut self, other: &ResourceDeltas) {
        for (resource, amount) in other.iter() {
            self.add(resource, amount);
        }
    }

    pub fn get(&self, resource: Resource) -> f32 {
        self.0.get(&resource).copied().unwrap_or(0.0)
    }

    /// Multiply every delta by a factor.
    pub fn scaled(&self, factor: f32) -> Self {
        Self(self.0.iter().map(|(r, a)| (*r, a * factor)).collect())
    }

    /// Apply `f` to every delta.
    pub fn map(&self, f: impl Fn(Resource, f32) -> f32) -> Self {
        Self(self.0.iter().map(|(r, a)| (*r, f(*r, *a))).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Resource, f32)> + '_ {
        self.0.iter().map(|(r, a)| (*r, *a))
    }

    pub fn to_deltas(&self) -> Vec<ResourceDelta> {
        self.iter().map(|(r, a)| ResourceDelta::new(r, a)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|a| *a == 0.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(Resource, f32)> for ResourceDeltas {
    fn from_iter<T: IntoIterator<Item = (Resource, f32)>>(iter: T) -> Self {
        let mut deltas = ResourceDeltas::new();
        for (resource, amount) in iter {
            deltas.add(resource, amount);
        }
        deltas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_multiplier_is_monotonic() {
        let multipliers: Vec<f32> = OfficeTier::ALL.iter().map(|t| t.effect_multiplier()).collect();
        for pair in multipliers.windows(2) {
            assert!(pair[0] <= pair[1], "{:?}", multipliers);
        }
    }

    #[test]
    fn test_tier_from_level_clamps() {
        assert_eq!(OfficeTier::from_level(0), OfficeTier::CityCouncil);
        assert_eq!(OfficeTier::from_level(5), OfficeTier::Senator);
        assert_eq!(OfficeTier::from_level(99), OfficeTier::President);
    }

    #[test]
    fn test_resource_bound_value() {
        assert_eq!(Resource::Trust.bound_value(120.0), 100.0);
        assert_eq!(Resource::Trust.bound_value(-5.0), 0.0);
        assert_eq!(Resource::Funds.bound_value(5000.0), 5000.0);
    }

    #[test]
    fn test_deltas_accumulate_and_scale() {
        let mut deltas = ResourceDeltas::new()
            .with(Resource::Trust, -10.0)
            .with(Resource::Funds, 5.0);
        deltas.add(Resource::Trust, 4.0);

        assert_eq!(deltas.get(Resource::Trust), -6.0);
        assert_eq!(deltas.scaled(2.0).get(Resource::Funds), 10.0);
        assert_eq!(deltas.get(Resource::Approval), 0.0);
        assert!(!deltas.is_empty());
        assert!(ResourceDeltas::new().is_empty());
    }
}
