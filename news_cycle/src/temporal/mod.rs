//! Temporal cycle - ages events through attention stages.
//!
//! Every registered event owns one [`CycleState`]. Time is applied in
//! discrete steps (a wall-clock tick or a turn advance); there are no
//! timers or suspended tasks. Stages only move forward, and a single large
//! step can cross several thresholds at once.

mod fatigue;

pub use fatigue::*;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::TemporalConfig;
use crate::events::EventId;

/// Attention stage of a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CycleStage {
    Breaking,
    Developing,
    Ongoing,
    Fading,
    Archived,
    Historical,
}

impl CycleStage {
    pub const ALL: [CycleStage; 6] = [
        CycleStage::Breaking,
        CycleStage::Developing,
        CycleStage::Ongoing,
        CycleStage::Fading,
        CycleStage::Archived,
        CycleStage::Historical,
    ];

    /// The following stage. `None` once Historical.
    pub fn next(&self) -> Option<CycleStage> {
        match self {
            CycleStage::Breaking => Some(CycleStage::Developing),
            CycleStage::Developing => Some(CycleStage::Ongoing),
            CycleStage::Ongoing => Some(CycleStage::Fading),
            CycleStage::Fading => Some(CycleStage::Archived),
            CycleStage::Archived => Some(CycleStage::Historical),
            CycleStage::Historical => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        *self == CycleStage::Historical
    }

    /// Still in the live news cycle.
    pub fn is_active(&self) -> bool {
        *self < CycleStage::Archived
    }

    pub fn name(&self) -> &'static str {
        match self {
            CycleStage::Breaking => "Breaking",
            CycleStage::Developing => "Developing",
            CycleStage::Ongoing => "Ongoing",
            CycleStage::Fading => "Fading",
            CycleStage::Archived => "Archived",
            CycleStage::Historical => "Historical",
        }
    }
}

impl std::fmt::Display for CycleStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-event temporal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleState {
    pub event_id: EventId,
    pub stage: CycleStage,
    pub hours_in_stage: f64,
    pub total_hours: f64,
    /// 0-100.
    pub media_attention: f32,
    /// 0-100.
    pub public_interest: f32,
    pub interactions: u32,
}

impl CycleState {
    pub const FULL_ATTENTION: f32 = 100.0;

    fn new(event_id: EventId, fatigue: f32) -> Self {
        let start = Self::FULL_ATTENTION * (1.0 - fatigue.clamp(0.0, 1.0) * 0.5);
        Self {
            event_id,
            stage: CycleStage::Breaking,
            hours_in_stage: 0.0,
            total_hours: 0.0,
            media_attention: start,
            public_interest: start,
            interactions: 0,
        }
    }
}

/// A stage change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTransition {
    pub event_id: EventId,
    pub from: CycleStage,
    pub to: CycleStage,
}

fn stage_threshold(config: &TemporalConfig, stage: CycleStage) -> Option<f64> {
    match stage {
        CycleStage::Breaking => Some(config.breaking_hours),
        CycleStage::Developing => Some(config.developing_hours),
        CycleStage::Ongoing => Some(config.ongoing_hours),
        CycleStage::Fading => Some(config.fading_hours),
        CycleStage::Archived => Some(config.archived_hours),
        CycleStage::Historical => None,
    }
}

/// Owns every [`CycleState`] and the fatigue table.
#[derive(Debug, Clone)]
pub struct TemporalCycleManager {
    config: TemporalConfig,
    states: HashMap<EventId, CycleState>,
    fatigue: FatigueTracker,
    last_tick: Option<DateTime<Utc>>,
}

impl TemporalCycleManager {
    pub fn new(config: TemporalConfig) -> Self {
        Self {
            config,
            states: HashMap::new(),
            fatigue: FatigueTracker::new(),
            last_tick: None,
        }
    }

    pub fn config(&self) -> &TemporalConfig {
        &self.config
    }

    /// Hours a stage lasts before the next. `None` for Historical.
    pub fn stage_threshold(&self, stage: CycleStage) -> Option<f64> {
        stage_threshold(&self.config, stage)
    }

    /// Start tracking an event. Fatigue lowers its starting attention.
    /// Registering the same id twice keeps the existing state.
    pub fn register(&mut self, event_id: EventId, fatigue: f32) -> &CycleState {
        self.states
            .entry(event_id)
            .or_insert_with(|| CycleState::new(event_id, fatigue))
    }

    pub fn state(&self, event_id: EventId) -> Option<&CycleState> {
        self.states.get(&event_id)
    }

    pub fn states(&self) -> impl Iterator<Item = &CycleState> {
        self.states.values()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Wall-clock entry point. The first call only starts the clock; later
    /// calls advance by the elapsed time once a full tick interval has passed.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<StageTransition> {
        let Some(last) = self.last_tick else {
            self.last_tick = Some(now);
            return Vec::new();
        };
        let elapsed = (now - last).num_milliseconds();
        if elapsed < (self.config.tick_interval_secs as i64).saturating_mul(1000) {
            return Vec::new();
        }
        self.last_tick = Some(now);
        self.advance(elapsed as f64 / 3_600_000.0)
    }

    /// Turn entry point.
    pub fn advance_turn(&mut self) -> Vec<StageTransition> {
        self.fatigue.decay(self.config.fatigue_decay_per_turn);
        self.advance(self.config.hours_per_turn)
    }

    /// Age every event by `hours`, decaying attention and advancing stages.
    pub fn advance(&mut self, hours: f64) -> Vec<StageTransition> {
        if hours <= 0.0 {
            return Vec::new();
        }
        let attention_loss = (self.config.attention_decay_per_hour as f64 * hours) as f32;
        let interest_loss = (self.config.interest_decay_per_hour as f64 * hours) as f32;

        let mut ids: Vec<EventId> = self.states.keys().copied().collect();
        ids.sort();

        let mut transitions = Vec::new();
        for id in ids {
            let Some(state) = self.states.get_mut(&id) else {
                continue;
            };
            state.media_attention = (state.media_attention - attention_loss).max(0.0);
            state.public_interest = (state.public_interest - interest_loss).max(0.0);
            state.total_hours += hours;
            state.hours_in_stage += hours;

            loop {
                let Some(threshold) = stage_threshold(&self.config, state.stage) else {
                    break;
                };
                if state.hours_in_stage < threshold {
                    break;
                }
                let Some(next) = state.stage.next() else {
                    break;
                };
                state.hours_in_stage -= threshold;
                transitions.push(StageTransition {
                    event_id: id,
                    from: state.stage,
                    to: next,
                });
                state.stage = next;
            }
            trace!(
                event_id = %id,
                stage = %state.stage,
                attention = state.media_attention,
                interest = state.public_interest,
                "aged event"
            );
        }

        for transition in &transitions {
            debug!(
                event_id = %transition.event_id,
                from = %transition.from,
                to = %transition.to,
                "stage transition"
            );
        }
        transitions
    }

    /// Player interaction restores part of the lost attention and interest.
    pub fn record_interaction(&mut self, event_id: EventId) -> bool {
        let boost = self.config.interaction_boost;
        match self.states.get_mut(&event_id) {
            Some(state) if state.stage.is_active() => {
                state.media_attention += (CycleState::FULL_ATTENTION - state.media_attention) * boost;
                state.public_interest += (CycleState::FULL_ATTENTION - state.public_interest) * boost;
                state.interactions += 1;
                true
            }
            _ => false,
        }
    }

    /// Jump an event forward to Archived (resolved or expired). Never moves
    /// an already archived or historical event.
    pub fn archive(&mut self, event_id: EventId) -> Option<StageTransition> {
        let state = self.states.get_mut(&event_id)?;
        if state.stage >= CycleStage::Archived {
            return None;
        }
        let transition = StageTransition {
            event_id,
            from: state.stage,
            to: CycleStage::Archived,
        };
        state.stage = CycleStage::Archived;
        state.hours_in_stage = 0.0;
        Some(transition)
    }

    /// Drop states that reached Historical, returning their ids.
    pub fn drain_historical(&mut self) -> Vec<EventId> {
        let mut done: Vec<EventId> = self
            .states
            .values()
            .filter(|s| s.stage.is_terminal())
            .map(|s| s.event_id)
            .collect();
        done.sort();
        for id in &done {
            self.states.remove(id);
        }
        done
    }

    pub fn fatigue(&self) -> &FatigueTracker {
        &self.fatigue
    }

    /// Current fatigue for a story family.
    pub fn fatigue_level(&self, key: &FatigueKey) -> f32 {
        self.fatigue.level(key)
    }

    pub fn is_fatigued(&self, key: &FatigueKey) -> bool {
        self.fatigue
            .is_suppressed(key, self.config.fatigue_suppression_threshold)
    }

    /// Count one more story in a family.
    pub fn register_story(&mut self, key: FatigueKey) -> f32 {
        self.fatigue.register(key, self.config.fatigue_increment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::EventCategory;
    use chrono::Duration;

    fn manager() -> TemporalCycleManager {
        TemporalCycleManager::new(TemporalConfig::default())
    }

    #[test]
    fn test_stage_order() {
        for pair in CycleStage::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].next(), Some(pair[1]));
        }
        assert_eq!(CycleStage::Historical.next(), None);
    }

    #[test]
    fn test_breaking_to_developing_after_threshold() {
        let mut temporal = manager();
        let id = EventId::new();
        temporal.register(id, 0.0);

        assert!(temporal.advance(23.0).is_empty());
        let transitions = temporal.advance(1.0);
        assert_eq!(
            transitions,
            vec![StageTransition {
                event_id: id,
                from: CycleStage::Breaking,
                to: CycleStage::Developing,
            }]
        );
        assert_eq!(temporal.state(id).unwrap().stage, CycleStage::Developing);
    }

    #[test]
    fn test_large_step_cascades() {
        let mut temporal = manager();
        let id = EventId::new();
        temporal.register(id, 0.0);

        // 24 + 72 + 168 = 264 hours reaches Fading.
        let transitions = temporal.advance(270.0);
        assert_eq!(transitions.len(), 3);
        assert_eq!(temporal.state(id).unwrap().stage, CycleStage::Fading);
        assert!((temporal.state(id).unwrap().hours_in_stage - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_historical_is_terminal() {
        let mut temporal = manager();
        let id = EventId::new();
        temporal.register(id, 0.0);
        temporal.advance(10_000.0);
        assert_eq!(temporal.state(id).unwrap().stage, CycleStage::Historical);
        assert!(temporal.advance(10_000.0).is_empty());
        assert_eq!(temporal.drain_historical(), vec![id]);
        assert!(temporal.is_empty());
    }

    #[test]
    fn test_attention_decays_and_interaction_partially_restores() {
        let mut temporal = manager();
        let id = EventId::new();
        temporal.register(id, 0.0);
        temporal.advance(20.0);

        let decayed = temporal.state(id).unwrap().media_attention;
        assert!((decayed - 70.0).abs() < 1e-4);

        assert!(temporal.record_interaction(id));
        let boosted = temporal.state(id).unwrap().media_attention;
        assert!((boosted - 85.0).abs() < 1e-4);
        assert!(boosted < CycleState::FULL_ATTENTION);
    }

    #[test]
    fn test_fatigue_lowers_starting_attention() {
        let mut temporal = manager();
        let state = temporal.register(EventId::new(), 0.5);
        assert_eq!(state.media_attention, 75.0);
    }

    #[test]
    fn test_archive_moves_forward_only() {
        let mut temporal = manager();
        let id = EventId::new();
        temporal.register(id, 0.0);

        let transition = temporal.archive(id).unwrap();
        assert_eq!(transition.from, CycleStage::Breaking);
        assert_eq!(transition.to, CycleStage::Archived);
        assert!(temporal.archive(id).is_none());
        assert!(!temporal.record_interaction(id));
    }

    #[test]
    fn test_tick_respects_interval() {
        let mut temporal = manager();
        let id = EventId::new();
        temporal.register(id, 0.0);
        let start = Utc::now();

        assert!(temporal.tick(start).is_empty());
        temporal.tick(start + Duration::seconds(30));
        assert_eq!(temporal.state(id).unwrap().total_hours, 0.0);

        let transitions = temporal.tick(start + Duration::hours(25));
        assert_eq!(transitions.len(), 1);
    }

    #[test]
    fn test_turn_advance_decays_fatigue() {
        let mut temporal = manager();
        let key = FatigueKey::new(EventCategory::Scandal, Some("Smith"));
        for _ in 0..3 {
            temporal.register_story(key.clone());
        }
        assert!(temporal.is_fatigued(&key));
        temporal.advance_turn();
        assert!(!temporal.is_fatigued(&key));
    }
}
