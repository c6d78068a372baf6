//! Stance history and flip-flop detection.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::classifier::Issue;
use crate::events::EventId;

/// A position taken on an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stance {
    Support,
    Oppose,
    Condemn,
    Defend,
    /// Declining to take a side. Never contradicts anything.
    Neutral,
}

impl Stance {
    /// The stance that contradicts this one, if any.
    pub fn opposite(&self) -> Option<Stance> {
        match self {
            Stance::Support => Some(Stance::Oppose),
            Stance::Oppose => Some(Stance::Support),
            Stance::Condemn => Some(Stance::Defend),
            Stance::Defend => Some(Stance::Condemn),
            Stance::Neutral => None,
        }
    }

    pub fn is_committed(&self) -> bool {
        *self != Stance::Neutral
    }
}

/// One entry in the stance log. Never edited once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StanceRecord {
    pub issue: Issue,
    pub stance: Stance,
    pub turn: u32,
    pub strength: f32,
    pub event_id: EventId,
}

/// What recording a stance did to the score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StanceChange {
    pub flip_flop: bool,
    pub consistency_before: f32,
    pub consistency_after: f32,
}

/// Append-only stance log with a running consistency score (0-100).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StanceTracker {
    records: Vec<StanceRecord>,
    consistency: f32,
    flip_flops: u32,
    flip_flop_penalty: f32,
    recovery: f32,
}

impl StanceTracker {
    pub const MAX_CONSISTENCY: f32 = 100.0;

    pub fn new(flip_flop_penalty: f32, recovery: f32) -> Self {
        Self {
            records: Vec::new(),
            consistency: Self::MAX_CONSISTENCY,
            flip_flops: 0,
            flip_flop_penalty,
            recovery,
        }
    }

    pub fn consistency_score(&self) -> f32 {
        self.consistency
    }

    pub fn flip_flop_count(&self) -> u32 {
        self.flip_flops
    }

    pub fn history(&self) -> &[StanceRecord] {
        &self.records
    }

    pub fn history_for(&self, issue: Issue) -> impl Iterator<Item = &StanceRecord> + '_ {
        self.records.iter().filter(move |r| r.issue == issue)
    }

    /// Most recent committed (non-neutral) stance on an issue.
    pub fn latest(&self, issue: Issue) -> Option<&StanceRecord> {
        self.records
            .iter()
            .rev()
            .find(|r| r.issue == issue && r.stance.is_committed())
    }

    /// Whether taking `stance` now would contradict the latest stance on `issue`.
    pub fn would_be_flip_flop(&self, issue: Issue, stance: Stance) -> bool {
        match self.latest(issue) {
            Some(prior) => prior.stance.opposite() == Some(stance),
            None => false,
        }
    }

    /// Append a record and update the score.
    pub fn record(&mut self, record: StanceRecord) -> StanceChange {
        let before = self.consistency;
        let prior = self.latest(record.issue).map(|r| r.stance);
        let flip_flop = prior.and_then(|p| p.opposite()) == Some(record.stance);

        if flip_flop {
            self.flip_flops += 1;
            self.consistency = (self.consistency - self.flip_flop_penalty * record.strength).max(0.0);
            warn!(
                issue = %record.issue,
                stance = ?record.stance,
                turn = record.turn,
                consistency = self.consistency,
                "flip-flop recorded"
            );
        } else if prior == Some(record.stance) {
            self.consistency = (self.consistency + self.recovery).min(Self::MAX_CONSISTENCY);
            info!(
                issue = %record.issue,
                stance = ?record.stance,
                consistency = self.consistency,
                "consistent stance"
            );
        }

        self.records.push(record);
        StanceChange {
            flip_flop,
            consistency_before: before,
            consistency_after: self.consistency,
        }
    }
}

impl Default for StanceTracker {
    fn default() -> Self {
        Self::new(15.0, 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(issue: Issue, stance: Stance, turn: u32) -> StanceRecord {
        StanceRecord {
            issue,
            stance,
            turn,
            strength: 1.0,
            event_id: EventId::new(),
        }
    }

    #[test]
    fn test_opposites_are_symmetric() {
        for stance in [Stance::Support, Stance::Oppose, Stance::Condemn, Stance::Defend] {
            let opposite = stance.opposite().unwrap();
            assert_eq!(opposite.opposite(), Some(stance));
        }
        assert_eq!(Stance::Neutral.opposite(), None);
    }

    #[test]
    fn test_support_then_oppose_is_flip_flop() {
        let mut tracker = StanceTracker::default();
        let first = tracker.record(record(Issue::Healthcare, Stance::Support, 1));
        assert!(!first.flip_flop);

        let second = tracker.record(record(Issue::Healthcare, Stance::Oppose, 5));
        assert!(second.flip_flop);
        assert!(second.consistency_after < second.consistency_before);
        assert!(tracker.consistency_score() < StanceTracker::MAX_CONSISTENCY);

        assert!(tracker.would_be_flip_flop(Issue::Healthcare, Stance::Support));
        assert!(!tracker.would_be_flip_flop(Issue::Healthcare, Stance::Oppose));
    }

    #[test]
    fn test_issues_are_independent() {
        let mut tracker = StanceTracker::default();
        tracker.record(record(Issue::Taxes, Stance::Support, 1));
        assert!(!tracker.would_be_flip_flop(Issue::Education, Stance::Oppose));
        let change = tracker.record(record(Issue::Education, Stance::Oppose, 2));
        assert!(!change.flip_flop);
        assert_eq!(tracker.consistency_score(), StanceTracker::MAX_CONSISTENCY);
    }

    #[test]
    fn test_neutral_does_not_reset_history() {
        let mut tracker = StanceTracker::default();
        tracker.record(record(Issue::Crime, Stance::Support, 1));
        tracker.record(record(Issue::Crime, Stance::Neutral, 2));
        assert!(tracker.would_be_flip_flop(Issue::Crime, Stance::Oppose));
        assert_eq!(tracker.history().len(), 2);
    }

    #[test]
    fn test_consistency_recovers_but_caps() {
        let mut tracker = StanceTracker::new(10.0, 4.0);
        tracker.record(record(Issue::Ethics, Stance::Condemn, 1));
        tracker.record(record(Issue::Ethics, Stance::Defend, 2));
        assert_eq!(tracker.consistency_score(), 90.0);

        tracker.record(record(Issue::Ethics, Stance::Defend, 3));
        assert_eq!(tracker.consistency_score(), 94.0);
        for turn in 4..10 {
            tracker.record(record(Issue::Ethics, Stance::Defend, turn));
        }
        assert_eq!(tracker.consistency_score(), StanceTracker::MAX_CONSISTENCY);
        assert_eq!(tracker.flip_flop_count(), 1);
    }

    #[test]
    fn test_score_never_negative() {
        let mut tracker = StanceTracker::new(60.0, 0.0);
        for turn in 0..6 {
            let stance = if turn % 2 == 0 { Stance::Support } else { Stance::Oppose };
            tracker.record(record(Issue::Defense, stance, turn));
        }
        assert_eq!(tracker.consistency_score(), 0.0);
        assert_eq!(tracker.history_for(Issue::Defense).count(), 6);
    }
}
