//! Game events - the materialized, player-facing decision units.

mod factory;
mod menu;

pub use factory::*;
pub use menu::*;

use campaign_rules::{AlignmentRange, ResourceDeltas};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::classifier::{EventCategory, Issue};
use crate::consequences::Stance;
use crate::content::SourceKind;
use crate::templates::{EventClassification, Urgency};

/// Unique identifier for game events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    /// Create a new random event ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The gameplay mechanic an event drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameEventKind {
    Emergency,
    Scandal,
    PolicyDecision,
    Opportunity,
    Briefing,
}

impl From<EventClassification> for GameEventKind {
    fn from(classification: EventClassification) -> Self {
        match classification {
            EventClassification::Crisis => GameEventKind::Emergency,
            EventClassification::Scandal => GameEventKind::Scandal,
            EventClassification::Policy => GameEventKind::PolicyDecision,
            EventClassification::Opportunity => GameEventKind::Opportunity,
            EventClassification::Informational => GameEventKind::Briefing,
        }
    }
}

/// A resource change scheduled some turns after the response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeferredDelta {
    pub delay_turns: u32,
    pub deltas: ResourceDeltas,
}

/// What happens on one branch of a response roll.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Outcome {
    /// Share of the event's own effect the player still absorbs.
    /// 0.0 neutralizes it, 1.0 takes it in full, above 1.0 makes it worse.
    pub event_factor: f32,
    /// The option's own deltas, applied immediately.
    #[serde(default)]
    pub bonus: ResourceDeltas,
    #[serde(default)]
    pub deferred: Vec<DeferredDelta>,
}

impl Outcome {
    pub fn new(event_factor: f32) -> Self {
        Self {
            event_factor,
            ..Default::default()
        }
    }

    pub fn with_bonus(mut self, bonus: ResourceDeltas) -> Self {
        self.bonus = bonus;
        self
    }

    pub fn with_deferred(mut self, delay_turns: u32, deltas: ResourceDeltas) -> Self {
        self.deferred.push(DeferredDelta { delay_turns, deltas });
        self
    }

    /// Scale the option's own deltas (not the event factor).
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            event_factor: self.event_factor,
            bonus: self.bonus.scaled(factor),
            deferred: self
                .deferred
                .iter()
                .map(|d| DeferredDelta {
                    delay_turns: d.delay_turns,
                    deltas: d.deltas.scaled(factor),
                })
                .collect(),
        }
    }
}

/// A choice offered to the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseOption {
    pub id: String,
    pub label: String,
    pub description: String,
    /// Position this response takes on the event's issue, if any.
    pub stance: Option<Stance>,
    #[serde(default = "default_strength")]
    pub stance_strength: f32,
    /// Base chance of success, 0.0 - 1.0.
    pub success_probability: f32,
    /// Only available when the player's alignment falls inside.
    pub alignment_gate: Option<AlignmentRange>,
    /// Resources spent to attempt the response.
    #[serde(default)]
    pub cost: ResourceDeltas,
    pub on_success: Outcome,
    pub on_failure: Outcome,
}

fn default_strength() -> f32 {
    1.0
}

impl ResponseOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>, success_probability: f32) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: String::new(),
            stance: None,
            stance_strength: 1.0,
            success_probability: success_probability.clamp(0.0, 1.0),
            alignment_gate: None,
            cost: ResourceDeltas::new(),
            on_success: Outcome::new(1.0),
            on_failure: Outcome::new(1.0),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_stance(mut self, stance: Stance, strength: f32) -> Self {
        self.stance = Some(stance);
        self.stance_strength = strength.max(0.0);
        self
    }

    pub fn with_gate(mut self, gate: AlignmentRange) -> Self {
        self.alignment_gate = Some(gate);
        self
    }

    pub fn with_cost(mut self, cost: ResourceDeltas) -> Self {
        self.cost = cost;
        self
    }

    pub fn on_success(mut self, outcome: Outcome) -> Self {
        self.on_success = outcome;
        self
    }

    pub fn on_failure(mut self, outcome: Outcome) -> Self {
        self.on_failure = outcome;
        self
    }
}

/// One recorded response to an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub option_id: String,
    pub turn: u32,
    pub succeeded: bool,
}

/// A materialized, player-facing decision unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameEvent {
    pub id: EventId,
    pub source_item_id: String,
    pub source_kind: SourceKind,
    /// `None` for generic, template-less events.
    pub template_id: Option<String>,

    pub headline: String,
    pub description: String,
    pub context: String,

    pub category: EventCategory,
    pub classification: EventClassification,
    pub kind: GameEventKind,
    pub urgency: Urgency,

    /// Issue responses take a stance on.
    pub issue: Option<Issue>,
    /// Most prominent entity, used for fatigue tracking.
    pub primary_entity: Option<String>,

    /// Template effect before tier scaling.
    pub base_effect: ResourceDeltas,
    /// Effect after tier scaling and fatigue.
    pub effect: ResourceDeltas,
    pub response_options: Vec<ResponseOption>,

    pub created_turn: u32,
    /// Last turn a response is expected.
    pub deadline_turn: u32,
    /// Turn on which the event expires if unresolved.
    pub expiration_turn: u32,

    pub responses: Vec<ResponseRecord>,
    pub resolved: bool,
    pub expired: bool,
}

impl GameEvent {
    pub fn option(&self, option_id: &str) -> Option<&ResponseOption> {
        self.response_options.iter().find(|o| o.id == option_id)
    }

    pub fn option_ids(&self) -> Vec<&str> {
        self.response_options.iter().map(|o| o.id.as_str()).collect()
    }

    /// Still waiting for a player decision.
    pub fn requires_action(&self) -> bool {
        !self.resolved && !self.expired && !self.response_options.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.resolved || self.expired
    }

    pub fn is_generic(&self) -> bool {
        self.template_id.is_none()
    }

    /// Whether the event should expire at the given turn.
    pub fn is_past_expiration(&self, turn: u32) -> bool {
        !self.resolved && turn >= self.expiration_turn
    }

    pub fn is_overdue(&self, turn: u32) -> bool {
        !self.is_closed() && turn > self.deadline_turn
    }

    /// Record a response; the event resolves on the first one.
    pub fn record_response(&mut self, option_id: impl Into<String>, turn: u32, succeeded: bool) {
        self.responses.push(ResponseRecord {
            option_id: option_id.into(),
            turn,
            succeeded,
        });
        self.resolved = true;
    }

    pub fn mark_expired(&mut self) {
        self.expired = true;
    }
}
