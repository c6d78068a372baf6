//! Fallback - decides where each cycle's content comes from.
//!
//! Source health works like a circuit breaker. Consecutive live failures
//! demote the primary source to the cache and then to procedural generation;
//! consecutive successes promote it straight back to live.

mod cache;
mod procedural;

pub use cache::*;
pub use procedural::*;

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::FallbackConfig;
use crate::content::SourceKind;

/// A change of primary source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceChange {
    pub from: SourceKind,
    pub to: SourceKind,
}

/// Health snapshot for hosts and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceHealth {
    pub primary: SourceKind,
    pub consecutive_failures: u32,
    pub consecutive_successes: u32,
    /// Success rate over the rolling window, 0.0 - 1.0. 1.0 before any attempt.
    pub success_rate: f32,
    pub attempts: u64,
}

impl SourceHealth {
    pub fn is_degraded(&self) -> bool {
        self.primary != SourceKind::Live
    }
}

/// How many slots each source fills this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CyclePlan {
    pub live: usize,
    pub cache: usize,
    pub procedural: usize,
}

impl CyclePlan {
    pub fn total(&self) -> usize {
        self.live + self.cache + self.procedural
    }
}

/// Tracks live source health and plans each cycle's mix.
#[derive(Debug, Clone)]
pub struct FallbackOrchestrator {
    config: FallbackConfig,
    blend_ratio: f32,
    primary: SourceKind,
    consecutive_failures: u32,
    consecutive_successes: u32,
    window: VecDeque<bool>,
    attempts: u64,
}

impl FallbackOrchestrator {
    pub fn new(config: FallbackConfig, blend_ratio: f32) -> Self {
        Self {
            window: VecDeque::with_capacity(config.health_window),
            config,
            blend_ratio: blend_ratio.clamp(0.0, 1.0),
            primary: SourceKind::Live,
            consecutive_failures: 0,
            consecutive_successes: 0,
            attempts: 0,
        }
    }

    pub fn primary(&self) -> SourceKind {
        self.primary
    }

    pub fn health(&self) -> SourceHealth {
        let success_rate = if self.window.is_empty() {
            1.0
        } else {
            self.window.iter().filter(|ok| **ok).count() as f32 / self.window.len() as f32
        };
        SourceHealth {
            primary: self.primary,
            consecutive_failures: self.consecutive_failures,
            consecutive_successes: self.consecutive_successes,
            success_rate,
            attempts: self.attempts,
        }
    }

    fn push_attempt(&mut self, ok: bool) {
        self.attempts += 1;
        self.window.push_back(ok);
        while self.window.len() > self.config.health_window {
            self.window.pop_front();
        }
    }

    fn switch_to(&mut self, to: SourceKind) -> Option<SourceChange> {
        if self.primary == to {
            return None;
        }
        let change = SourceChange {
            from: self.primary,
            to,
        };
        self.primary = to;
        Some(change)
    }

    /// Record a successful live fetch.
    pub fn record_success(&mut self) -> Option<SourceChange> {
        self.push_attempt(true);
        self.consecutive_failures = 0;
        self.consecutive_successes += 1;

        if self.consecutive_successes >= self.config.promote_after_successes {
            let change = self.switch_to(SourceKind::Live);
            if let Some(change) = change {
                info!(
                    from = %change.from,
                    successes = self.consecutive_successes,
                    "live source recovered, promoting"
                );
            }
            return change;
        }
        None
    }

    /// Record a failed live fetch. `cache_available` decides whether the
    /// first demotion lands on the cache or goes straight to procedural.
    pub fn record_failure(&mut self, cache_available: bool) -> Option<SourceChange> {
        self.push_attempt(false);
        self.consecutive_successes = 0;
        self.consecutive_failures += 1;

        let threshold = self.config.demote_after_failures;
        let target = if self.consecutive_failures >= threshold.saturating_mul(2) || !cache_available {
            SourceKind::Procedural
        } else {
            SourceKind::Cache
        };

        if self.consecutive_failures < threshold || self.primary == SourceKind::Procedural {
            return None;
        }
        let change = self.switch_to(target);
        if let Some(change) = change {
            warn!(
                from = %change.from,
                to = %change.to,
                failures = self.consecutive_failures,
                "live source unhealthy, demoting"
            );
        }
        change
    }

    /// Plan a cycle of `slots` items. When live is primary and delivered
    /// items, the blend ratio reserves a share of slots for procedural
    /// output. Shortfalls fall through to the cache, then to procedural.
    pub fn plan(&self, live_available: usize, cache_available: usize, slots: usize) -> CyclePlan {
        let mut plan = CyclePlan::default();
        let mut remaining = slots;

        if self.primary == SourceKind::Live && live_available > 0 {
            plan.procedural = ((slots as f32) * self.blend_ratio).round() as usize;
            plan.procedural = plan.procedural.min(slots);
            remaining -= plan.procedural;
            plan.live = live_available.min(remaining);
            remaining -= plan.live;
        }

        if self.primary != SourceKind::Procedural {
            plan.cache = cache_available.min(remaining);
            remaining -= plan.cache;
        }

        plan.procedural += remaining;
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orchestrator() -> FallbackOrchestrator {
        FallbackOrchestrator::new(FallbackConfig::default(), 0.2)
    }

    #[test]
    fn test_demotes_after_threshold() {
        let mut fallback = orchestrator();
        assert!(fallback.record_failure(true).is_none());
        assert!(fallback.record_failure(true).is_none());
        assert_eq!(fallback.primary(), SourceKind::Live);

        let change = fallback.record_failure(true).unwrap();
        assert_eq!(change.to, SourceKind::Cache);
        assert_ne!(fallback.primary(), SourceKind::Live);
    }

    #[test]
    fn test_demotes_to_procedural_without_cache_or_after_double_threshold() {
        let mut fallback = orchestrator();
        for _ in 0..3 {
            fallback.record_failure(false);
        }
        assert_eq!(fallback.primary(), SourceKind::Procedural);

        let mut fallback = orchestrator();
        for _ in 0..5 {
            fallback.record_failure(true);
        }
        assert_eq!(fallback.primary(), SourceKind::Cache);
        fallback.record_failure(true);
        assert_eq!(fallback.primary(), SourceKind::Procedural);
    }

    #[test]
    fn test_promotes_after_consecutive_successes() {
        let mut fallback = orchestrator();
        for _ in 0..3 {
            fallback.record_failure(true);
        }
        assert!(fallback.record_success().is_none());
        assert_eq!(fallback.primary(), SourceKind::Cache);
        let change = fallback.record_success().unwrap();
        assert_eq!(change.to, SourceKind::Live);
    }

    #[test]
    fn test_interrupted_success_streak_does_not_promote() {
        let mut fallback = orchestrator();
        for _ in 0..3 {
            fallback.record_failure(true);
        }
        fallback.record_success();
        fallback.record_failure(true);
        fallback.record_success();
        assert_eq!(fallback.primary(), SourceKind::Cache);
    }

    #[test]
    fn test_rolling_success_rate() {
        let mut fallback = FallbackOrchestrator::new(
            FallbackConfig {
                health_window: 4,
                ..FallbackConfig::default()
            },
            0.0,
        );
        assert_eq!(fallback.health().success_rate, 1.0);
        fallback.record_failure(true);
        fallback.record_success();
        fallback.record_success();
        fallback.record_success();
        assert_eq!(fallback.health().success_rate, 0.75);
        fallback.record_success();
        assert_eq!(fallback.health().success_rate, 1.0);
        assert_eq!(fallback.health().attempts, 5);
    }

    #[test]
    fn test_plan_blends_when_live() {
        let fallback = FallbackOrchestrator::new(FallbackConfig::default(), 0.2);
        let plan = fallback.plan(10, 5, 10);
        assert_eq!(plan, CyclePlan { live: 8, cache: 0, procedural: 2 });
    }

    #[test]
    fn test_plan_short_live_falls_through() {
        let fallback = FallbackOrchestrator::new(FallbackConfig::default(), 0.0);
        let plan = fallback.plan(1, 1, 4);
        assert_eq!(plan, CyclePlan { live: 1, cache: 1, procedural: 2 });
        assert_eq!(plan.total(), 4);
    }

    #[test]
    fn test_plan_when_demoted() {
        let mut fallback = orchestrator();
        for _ in 0..3 {
            fallback.record_failure(true);
        }
        assert_eq!(fallback.plan(0, 2, 3), CyclePlan { live: 0, cache: 2, procedural: 1 });

        for _ in 0..3 {
            fallback.record_failure(true);
        }
        assert_eq!(fallback.plan(0, 2, 3), CyclePlan { live: 0, cache: 0, procedural: 3 });
    }
}
