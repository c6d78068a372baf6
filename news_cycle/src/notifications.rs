//! Notifications for the presentation layer.
//!
//! The pipeline queues notifications as state settles and the host drains
//! them once per update. Breaking news jumps the queue.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::events::EventId;
use crate::temporal::CycleStage;

/// Something the presentation layer should know about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Notification {
    NewEventAvailable {
        event_id: EventId,
        headline: String,
        requires_action: bool,
    },
    BreakingNews {
        event_id: EventId,
        headline: String,
        requires_action: bool,
    },
    StageChanged {
        event_id: EventId,
        from: CycleStage,
        to: CycleStage,
    },
    EventExpired {
        event_id: EventId,
        headline: String,
    },
    ResponseProcessed {
        event_id: EventId,
        option_id: String,
        succeeded: bool,
        summary: String,
    },
    CommandRejected {
        event_id: EventId,
        option_id: String,
        reason: String,
    },
}

impl Notification {
    pub fn event_id(&self) -> EventId {
        match self {
            Notification::NewEventAvailable { event_id, .. }
            | Notification::BreakingNews { event_id, .. }
            | Notification::StageChanged { event_id, .. }
            | Notification::EventExpired { event_id, .. }
            | Notification::ResponseProcessed { event_id, .. }
            | Notification::CommandRejected { event_id, .. } => *event_id,
        }
    }

    pub fn is_breaking(&self) -> bool {
        matches!(self, Notification::BreakingNews { .. })
    }
}

/// FIFO queue with a priority lane for breaking news.
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    breaking: VecDeque<Notification>,
    normal: VecDeque<Notification>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notification: Notification) {
        if notification.is_breaking() {
            self.breaking.push_back(notification);
        } else {
            self.normal.push_back(notification);
        }
    }

    pub fn len(&self) -> usize {
        self.breaking.len() + self.normal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breaking.is_empty() && self.normal.is_empty()
    }

    /// Everything queued, breaking news first, each lane in arrival order.
    pub fn drain(&mut self) -> Vec<Notification> {
        self.breaking.drain(..).chain(self.normal.drain(..)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breaking_jumps_queue() {
        let mut queue = NotificationQueue::new();
        let first = EventId::new();
        let urgent = EventId::new();

        queue.push(Notification::NewEventAvailable {
            event_id: first,
            headline: "Quiet story".into(),
            requires_action: true,
        });
        queue.push(Notification::StageChanged {
            event_id: first,
            from: CycleStage::Breaking,
            to: CycleStage::Developing,
        });
        queue.push(Notification::BreakingNews {
            event_id: urgent,
            headline: "Loud story".into(),
            requires_action: true,
        });

        let drained = queue.drain();
        assert_eq!(drained.len(), 3);
        assert_eq!(drained[0].event_id(), urgent);
        assert!(drained[0].is_breaking());
        assert!(matches!(drained[1], Notification::NewEventAvailable { .. }));
        assert!(queue.is_empty());
    }
}
