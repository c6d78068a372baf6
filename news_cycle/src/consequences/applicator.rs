//! Effect application - the only writer of player resources.
//!
//! Deferred effects sit in a turn-keyed schedule. Flushing splits every entry
//! due by the current turn out of the schedule before applying it, so an entry
//! can never be applied twice even if the same turn is flushed again.

use std::collections::BTreeMap;

use campaign_rules::{ResourceDelta, ResourceDeltas, ResourceSink};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::ConsequenceResult;
use crate::events::EventId;

/// A deferred effect waiting for its turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEffect {
    pub id: u64,
    pub source_event: EventId,
    pub target_turn: u32,
    pub deltas: ResourceDeltas,
}

/// Split a schedule into entries due at or before `turn` and the rest.
/// Due entries come back in turn order, then insertion order.
pub fn split_due(
    mut schedule: BTreeMap<u32, Vec<ScheduledEffect>>,
    turn: u32,
) -> (Vec<ScheduledEffect>, BTreeMap<u32, Vec<ScheduledEffect>>) {
    let remaining = schedule.split_off(&turn.saturating_add(1));
    let due = schedule.into_values().flatten().collect();
    (due, remaining)
}

/// Applies consequence results to a [`ResourceSink`] and owns the schedule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectApplicator {
    schedule: BTreeMap<u32, Vec<ScheduledEffect>>,
    next_id: u64,
}

impl EffectApplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply every non-zero delta in resource order. The sink clamps.
    pub fn apply_deltas<S: ResourceSink + ?Sized>(&self, deltas: &ResourceDeltas, sink: &mut S) -> Vec<ResourceDelta> {
        deltas
            .iter()
            .filter(|(_, amount)| *amount != 0.0)
            .map(|(resource, amount)| {
                sink.apply_delta(ResourceDelta::new(resource, amount));
                ResourceDelta::new(resource, amount)
            })
            .collect()
    }

    /// Spend the cost, apply immediate deltas and schedule deferred ones.
    /// Returns the ids of newly scheduled effects.
    pub fn apply<S: ResourceSink + ?Sized>(&mut self, result: &ConsequenceResult, sink: &mut S) -> Vec<u64> {
        self.apply_deltas(&result.net_immediate(), sink);
        result
            .deferred
            .iter()
            .map(|d| self.schedule(result.event_id, d.target_turn, d.deltas.clone()))
            .collect()
    }

    /// Schedule deltas for a future turn.
    pub fn schedule(&mut self, source_event: EventId, target_turn: u32, deltas: ResourceDeltas) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        debug!(effect_id = id, %source_event, target_turn, "scheduled deferred effect");
        self.schedule.entry(target_turn).or_default().push(ScheduledEffect {
            id,
            source_event,
            target_turn,
            deltas,
        });
        id
    }

    /// Apply everything due at or before `turn`, each entry exactly once.
    pub fn flush<S: ResourceSink + ?Sized>(&mut self, turn: u32, sink: &mut S) -> Vec<ScheduledEffect> {
        let schedule = std::mem::take(&mut self.schedule);
        let (due, remaining) = split_due(schedule, turn);
        self.schedule = remaining;

        for effect in &due {
            self.apply_deltas(&effect.deltas, sink);
            info!(
                effect_id = effect.id,
                source_event = %effect.source_event,
                target_turn = effect.target_turn,
                turn,
                "applied deferred effect"
            );
        }
        due
    }

    /// Effects still waiting, in turn order.
    pub fn pending(&self) -> impl Iterator<Item = &ScheduledEffect> + '_ {
        self.schedule.values().flatten()
    }

    pub fn pending_count(&self) -> usize {
        self.schedule.values().map(Vec::len).sum()
    }

    pub fn is_pending(&self, effect_id: u64) -> bool {
        self.pending().any(|e| e.id == effect_id)
    }
}
