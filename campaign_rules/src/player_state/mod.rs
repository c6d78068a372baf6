//! Player state - the single source of truth for context and the sole sink for effects.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::alignment::Alignment;
use crate::mechanics::{OfficeTier, Resource, ResourceDelta};

/// Read access to everything the news pipeline needs to know about the player.
pub trait PlayerContext {
    fn office_tier(&self) -> OfficeTier;

    /// Approval rating, 0-100.
    fn approval(&self) -> f32;

    fn turn(&self) -> u32;

    /// Turns until the next election. `None` when no election is scheduled.
    fn turns_to_election(&self) -> Option<u32>;

    fn alignment(&self) -> Alignment;

    fn chaos_mode(&self) -> bool;

    /// Current value of a named resource.
    fn resource(&self, resource: Resource) -> f32;
}

/// Write access: the only way effects reach persisted player resources.
pub trait ResourceSink {
    /// Apply a delta, returning the resulting value.
    fn apply_delta(&mut self, delta: ResourceDelta) -> f32;
}

/// In-memory player state implementing both collaborator traits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub name: String,
    pub office: OfficeTier,
    pub turn: u32,
    /// Turn on which the next election is held.
    pub election_turn: Option<u32>,
    pub alignment: Alignment,
    pub chaos_mode: bool,
    resources: BTreeMap<Resource, f32>,
}

impl PlayerState {
    /// Create a player with default starting resources.
    pub fn new(name: impl Into<String>, office: OfficeTier) -> Self {
        let resources = Resource::ALL
            .iter()
            .map(|r| (*r, Self::starting_value(*r)))
            .collect();
        Self {
            name: name.into(),
            office,
            turn: 1,
            election_turn: None,
            alignment: Alignment::centrist(),
            chaos_mode: false,
            resources,
        }
    }

    fn starting_value(resource: Resource) -> f32 {
        match resource {
            Resource::Trust => 50.0,
            Resource::Approval => 50.0,
            Resource::Funds => 100.0,
            Resource::PoliticalCapital => 25.0,
            Resource::MediaFavor => 50.0,
            Resource::PartyLoyalty => 50.0,
        }
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_election_turn(mut self, turn: u32) -> Self {
        self.election_turn = Some(turn);
        self
    }

    pub fn with_chaos_mode(mut self, enabled: bool) -> Self {
        self.chaos_mode = enabled;
        self
    }

    /// Set a resource directly, clamped to its bounds.
    pub fn set_resource(&mut self, resource: Resource, value: f32) {
        self.resources.insert(resource, resource.bound_value(value));
    }

    pub fn with_resource(mut self, resource: Resource, value: f32) -> Self {
        self.set_resource(resource, value);
        self
    }

    /// Advance one turn.
    pub fn advance_turn(&mut self) -> u32 {
        self.turn += 1;
        self.turn
    }
}

impl PlayerContext for PlayerState {
    fn office_tier(&self) -> OfficeTier {
        self.office
    }

    fn approval(&self) -> f32 {
        self.resource(Resource::Approval)
    }

    fn turn(&self) -> u32 {
        self.turn
    }

    fn turns_to_election(&self) -> Option<u32> {
        self.election_turn
            .filter(|election| *election >= self.turn)
            .map(|election| election - self.turn)
    }

    fn alignment(&self) -> Alignment {
        self.alignment
    }

    fn chaos_mode(&self) -> bool {
        self.chaos_mode
    }

    fn resource(&self, resource: Resource) -> f32 {
        self.resources.get(&resource).copied().unwrap_or(0.0)
    }
}

impl ResourceSink for PlayerState {
    fn apply_delta(&mut self, delta: ResourceDelta) -> f32 {
        let current = self.resource(delta.resource);
        let next = delta.resource.bound_value(current + delta.amount);
        self.resources.insert(delta.resource, next);
        next
    }
}
