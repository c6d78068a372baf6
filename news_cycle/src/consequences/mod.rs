//! Consequences - turns a chosen response into resource deltas.
//!
//! The [`ConsequenceCalculator`] is pure: it takes the roll as an argument and
//! never touches player state. The [`EffectApplicator`] is the only writer of
//! player resources, and [`StanceTracker`] keeps the stance log.

mod applicator;
mod stance;

pub use applicator::*;
pub use stance::*;

use campaign_rules::{Alignment, AlignmentRange, OfficeTier, PlayerContext, Resource, ResourceDeltas};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::classifier::Issue;
use crate::config::ConsequenceConfig;
use crate::events::{EventId, GameEvent, ResponseOption};

/// Why a response could not be attempted. Nothing is applied in either case.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ResponseFailure {
    #[error(
        "alignment mismatch: option '{option_id}' requires {required}, player is at ({:.0}, {:.0})",
        .alignment.economic,
        .alignment.social
    )]
    AlignmentMismatch {
        option_id: String,
        alignment: Alignment,
        required: AlignmentRange,
    },

    #[error("insufficient {resource}: option '{option_id}' costs {required}, player has {available}")]
    InsufficientResources {
        option_id: String,
        resource: Resource,
        required: f32,
        available: f32,
    },
}

/// Snapshot of the player context a response is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsequenceContext {
    pub tier: OfficeTier,
    pub approval: f32,
    pub turn: u32,
    pub turns_to_election: Option<u32>,
    pub alignment: Alignment,
    pub chaos_mode: bool,
}

impl ConsequenceContext {
    pub fn from_player<P: PlayerContext + ?Sized>(player: &P) -> Self {
        Self {
            tier: player.office_tier(),
            approval: player.approval(),
            turn: player.turn(),
            turns_to_election: player.turns_to_election(),
            alignment: player.alignment(),
            chaos_mode: player.chaos_mode(),
        }
    }

    pub fn under_election_pressure(&self, window: u32) -> bool {
        matches!(self.turns_to_election, Some(turns) if turns <= window)
    }
}

/// A delta scheduled for an absolute turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledDelta {
    pub target_turn: u32,
    pub deltas: ResourceDeltas,
}

/// The stance a response takes, to be written to the log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StanceTaken {
    pub issue: Issue,
    pub stance: Stance,
    pub strength: f32,
}

/// Everything a resolved response does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsequenceResult {
    pub event_id: EventId,
    pub option_id: String,
    pub succeeded: bool,
    /// Chance of success after context modifiers.
    pub success_chance: f32,
    pub roll: f32,
    /// Resources spent on the attempt, as positive amounts.
    pub cost: ResourceDeltas,
    /// Deltas applied right away, excluding the cost.
    pub immediate: ResourceDeltas,
    pub deferred: Vec<ScheduledDelta>,
    pub stance: Option<StanceTaken>,
    /// Context amplification that was applied.
    pub multiplier: f32,
}

impl ConsequenceResult {
    /// Net immediate change, cost included.
    pub fn net_immediate(&self) -> ResourceDeltas {
        let mut net = self.immediate.clone();
        net.merge(&self.cost.scaled(-1.0));
        net
    }
}

/// Resolves responses into [`ConsequenceResult`]s.
#[derive(Debug, Clone, Default)]
pub struct ConsequenceCalculator {
    config: ConsequenceConfig,
}

impl ConsequenceCalculator {
    pub fn new(config: ConsequenceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConsequenceConfig {
        &self.config
    }

    /// Success chance after approval and chaos modifiers, 0.0 - 1.0.
    pub fn success_chance(&self, option: &ResponseOption, ctx: &ConsequenceContext) -> f32 {
        let approval_shift = (ctx.approval - 50.0) / 50.0 * self.config.approval_influence;
        let mut chance = (option.success_probability + approval_shift).clamp(0.0, 1.0);
        if ctx.chaos_mode {
            chance += (0.5 - chance) * self.config.chaos_pull.clamp(0.0, 1.0);
        }
        chance.clamp(0.0, 1.0)
    }

    /// Amplification from chaos mode and election pressure.
    pub fn context_multiplier(&self, ctx: &ConsequenceContext) -> f32 {
        let mut multiplier = 1.0;
        if ctx.chaos_mode {
            multiplier *= self.config.chaos_amplification;
        }
        if ctx.under_election_pressure(self.config.election_pressure_turns) {
            multiplier *= self.config.election_amplification;
        }
        multiplier
    }

    /// Check the alignment gate and the option's cost. No roll is performed.
    pub fn check<P: PlayerContext + ?Sized>(
        &self,
        option: &ResponseOption,
        player: &P,
    ) -> Result<(), ResponseFailure> {
        if let Some(required) = option.alignment_gate {
            let alignment = player.alignment();
            if !required.contains(alignment) {
                return Err(ResponseFailure::AlignmentMismatch {
                    option_id: option.id.clone(),
                    alignment,
                    required,
                });
            }
        }
        for (resource, required) in option.cost.iter() {
            let available = player.resource(resource);
            if required > 0.0 && available < required {
                return Err(ResponseFailure::InsufficientResources {
                    option_id: option.id.clone(),
                    resource,
                    required,
                    available,
                });
            }
        }
        Ok(())
    }

    /// Compute the result of an attempt for a given roll in `[0, 1)`.
    /// Success when `roll < success_chance`.
    pub fn calculate(
        &self,
        event: &GameEvent,
        option: &ResponseOption,
        ctx: &ConsequenceContext,
        roll: f32,
    ) -> ConsequenceResult {
        let success_chance = self.success_chance(option, ctx);
        let succeeded = roll < success_chance;
        let outcome = if succeeded { &option.on_success } else { &option.on_failure };
        let multiplier = self.context_multiplier(ctx);

        let mut raw = event.effect.scaled(outcome.event_factor);
        raw.merge(&outcome.bonus);
        if succeeded {
            let modifier = self.config.success_modifier;
            raw = raw.map(|_, amount| if amount > 0.0 { amount * modifier } else { amount });
        }
        let immediate = raw.scaled(multiplier);

        let deferred = outcome
            .deferred
            .iter()
            .map(|d| ScheduledDelta {
                target_turn: ctx.turn + d.delay_turns.max(1),
                deltas: d.deltas.scaled(multiplier),
            })
            .collect();

        // Any answer to an issue-tagged event is on the record, even a dodge.
        let stance = event.issue.map(|issue| match option.stance {
            Some(stance) => StanceTaken {
                issue,
                stance,
                strength: option.stance_strength,
            },
            None => StanceTaken {
                issue,
                stance: Stance::Neutral,
                strength: 0.0,
            },
        });

        debug!(
            event_id = %event.id,
            option = %option.id,
            succeeded,
            success_chance,
            roll,
            multiplier,
            "response resolved"
        );

        ConsequenceResult {
            event_id: event.id,
            option_id: option.id.clone(),
            succeeded,
            success_chance,
            roll,
            cost: option.cost.clone(),
            immediate,
            deferred,
            stance,
            multiplier,
        }
    }

    /// Check, then calculate.
    pub fn resolve<P: PlayerContext + ?Sized>(
        &self,
        event: &GameEvent,
        option: &ResponseOption,
        player: &P,
        roll: f32,
    ) -> Result<ConsequenceResult, ResponseFailure> {
        self.check(option, player)?;
        let ctx = ConsequenceContext::from_player(player);
        Ok(self.calculate(event, option, &ctx, roll))
    }
}
