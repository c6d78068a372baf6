//! Pipeline configuration. Read once at startup; there is no hot reload.
//!
//! Every tuning constant the pipeline uses lives here with its default, so
//! hosts can override thresholds and rates without touching code.

use serde::{Deserialize, Serialize};

use crate::classifier::EventCategory;
use crate::error::{NewsError, Result};
use crate::templates::Urgency;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub fetch: FetchConfig,

    /// Fraction (0.0-1.0) of each cycle's slots filled with procedural items
    /// even when live content is available.
    pub blend_ratio: f32,

    pub categories: CategoryConfig,

    /// Default the log filter to `debug` instead of `info`.
    pub debug_logging: bool,

    pub temporal: TemporalConfig,
    pub fallback: FallbackConfig,
    pub cache: CacheConfig,
    pub events: EventWindowConfig,
    pub consequences: ConsequenceConfig,

    /// Seed for rolls and procedural generation.
    pub seed: u64,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            blend_ratio: 0.2,
            categories: CategoryConfig::default(),
            debug_logging: false,
            temporal: TemporalConfig::default(),
            fallback: FallbackConfig::default(),
            cache: CacheConfig::default(),
            events: EventWindowConfig::default(),
            consequences: ConsequenceConfig::default(),
            seed: 0x5EED,
        }
    }
}

impl NewsConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: NewsConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.blend_ratio) {
            return Err(invalid(format!(
                "blend_ratio must be within 0..=1, got {}",
                self.blend_ratio
            )));
        }
        if self.fetch.request_count == 0 {
            return Err(invalid("fetch.request_count must be at least 1"));
        }
        if self.events.archive_capacity == 0 {
            return Err(invalid("events.archive_capacity must be at least 1"));
        }
        if self.cache.capacity == 0 {
            return Err(invalid("cache.capacity must be at least 1"));
        }
        if self.cache.freshness_half_life_hours <= 0.0 {
            return Err(invalid("cache.freshness_half_life_hours must be positive"));
        }
        if self.fallback.demote_after_failures == 0 || self.fallback.promote_after_successes == 0 {
            return Err(invalid("fallback thresholds must be at least 1"));
        }
        if self.fallback.health_window == 0 {
            return Err(invalid("fallback.health_window must be at least 1"));
        }
        let t = &self.temporal;
        for (name, hours) in [
            ("breaking_hours", t.breaking_hours),
            ("developing_hours", t.developing_hours),
            ("ongoing_hours", t.ongoing_hours),
            ("fading_hours", t.fading_hours),
            ("archived_hours", t.archived_hours),
        ] {
            if hours <= 0.0 {
                return Err(invalid(format!("temporal.{} must be positive", name)));
            }
        }
        if t.hours_per_turn < 0.0 {
            return Err(invalid("temporal.hours_per_turn must not be negative"));
        }
        if !(0.0..=1.0).contains(&t.interaction_boost) {
            return Err(invalid("temporal.interaction_boost must be within 0..=1"));
        }
        for window in [
            self.events.breaking,
            self.events.urgent,
            self.events.normal,
            self.events.informational,
        ] {
            if window.expiration_turns == 0 || window.response_turns > window.expiration_turns {
                return Err(invalid(
                    "event windows need expiration_turns >= response_turns and > 0",
                ));
            }
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> NewsError {
    NewsError::InvalidConfig(message.into())
}

/// Live fetching cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub enabled: bool,
    pub interval_secs: u64,
    /// How many raw items to ask the source for.
    pub request_count: usize,
    pub timeout_secs: u64,
    /// Upper bound on events materialized per fetch cycle.
    pub max_events_per_cycle: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 300,
            request_count: 10,
            timeout_secs: 10,
            max_events_per_cycle: 3,
        }
    }
}

/// Per-category enable/disable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    pub disabled: Vec<EventCategory>,
}

impl CategoryConfig {
    pub fn is_enabled(&self, category: EventCategory) -> bool {
        !self.disabled.contains(&category)
    }
}

/// News-cycle aging and fatigue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporalConfig {
    /// How often wall-clock decay is applied.
    pub tick_interval_secs: u64,
    /// Story time that passes on each turn advance.
    pub hours_per_turn: f64,

    pub breaking_hours: f64,
    pub developing_hours: f64,
    pub ongoing_hours: f64,
    pub fading_hours: f64,
    /// Time spent Archived before becoming Historical.
    pub archived_hours: f64,

    /// Media attention lost per hour (0-100 scale).
    pub attention_decay_per_hour: f32,
    /// Public interest lost per hour (0-100 scale).
    pub interest_decay_per_hour: f32,

    /// Fraction of lost attention restored when the player interacts.
    pub interaction_boost: f32,

    /// Fatigue added to a (category, entity) pair per materialized event.
    pub fatigue_increment: f32,
    /// Fatigue removed per turn.
    pub fatigue_decay_per_turn: f32,
    /// Fatigue at or above which near-duplicate stories are suppressed.
    pub fatigue_suppression_threshold: f32,
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 60,
            hours_per_turn: 24.0,
            breaking_hours: 24.0,
            developing_hours: 72.0,
            ongoing_hours: 168.0,
            fading_hours: 48.0,
            archived_hours: 720.0,
            attention_decay_per_hour: 1.5,
            interest_decay_per_hour: 1.0,
            interaction_boost: 0.5,
            fatigue_increment: 0.25,
            fatigue_decay_per_turn: 0.1,
            fatigue_suppression_threshold: 0.75,
        }
    }
}

/// Source health thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Consecutive live failures before the primary source is demoted.
    pub demote_after_failures: u32,
    /// Consecutive live successes before live is promoted back.
    pub promote_after_successes: u32,
    /// Number of recent attempts in the rolling success rate.
    pub health_window: usize,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            demote_after_failures: 3,
            promote_after_successes: 2,
            health_window: 10,
        }
    }
}

/// Cache sizing and eviction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: usize,
    pub max_age_hours: f64,
    /// Items whose quality falls below this are pruned.
    pub quality_floor: f32,
    /// Age at which freshness halves.
    pub freshness_half_life_hours: f64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            max_age_hours: 168.0,
            quality_floor: 20.0,
            freshness_half_life_hours: 48.0,
        }
    }
}

/// Response deadline and expiration, in turns after creation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UrgencyWindow {
    pub response_turns: u32,
    pub expiration_turns: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventWindowConfig {
    pub breaking: UrgencyWindow,
    pub urgent: UrgencyWindow,
    pub normal: UrgencyWindow,
    pub informational: UrgencyWindow,
    /// Closed events kept for lookup. Oldest go first.
    pub archive_capacity: usize,
}

impl EventWindowConfig {
    pub fn window(&self, urgency: Urgency) -> UrgencyWindow {
        match urgency {
            Urgency::Breaking => self.breaking,
            Urgency::Urgent => self.urgent,
            Urgency::Normal => self.normal,
            Urgency::Informational => self.informational,
        }
    }
}

impl Default for EventWindowConfig {
    fn default() -> Self {
        Self {
            breaking: UrgencyWindow {
                response_turns: 1,
                expiration_turns: 2,
            },
            urgent: UrgencyWindow {
                response_turns: 2,
                expiration_turns: 4,
            },
            normal: UrgencyWindow {
                response_turns: 3,
                expiration_turns: 6,
            },
            informational: UrgencyWindow {
                response_turns: 5,
                expiration_turns: 10,
            },
            archive_capacity: 200,
        }
    }
}

/// Consequence scaling and stance scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsequenceConfig {
    /// Multiplier on positive deltas after a successful roll.
    pub success_modifier: f32,
    /// How strongly approval moves the success chance; at approval 0 or 100
    /// the chance shifts by this much.
    pub approval_influence: f32,
    /// Chaos mode pulls the success chance this far toward 0.5.
    pub chaos_pull: f32,
    /// Chaos mode multiplies every delta by this.
    pub chaos_amplification: f32,
    /// Within this many turns of an election, deltas are amplified.
    pub election_pressure_turns: u32,
    pub election_amplification: f32,
    /// Consistency lost per flip-flop, scaled by stance strength.
    pub flip_flop_penalty: f32,
    /// Consistency regained per repeated stance.
    pub consistency_recovery: f32,
}

impl Default for ConsequenceConfig {
    fn default() -> Self {
        Self {
            success_modifier: 1.2,
            approval_influence: 0.2,
            chaos_pull: 0.5,
            chaos_amplification: 1.5,
            election_pressure_turns: 4,
            election_amplification: 1.25,
            flip_flop_penalty: 15.0,
            consistency_recovery: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(NewsConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = NewsConfig::from_toml_str(
            r#"
            blend_ratio = 0.5
            debug_logging = true

            [fetch]
            interval_secs = 60

            [temporal]
            breaking_hours = 6.0

            [categories]
            disabled = ["Diplomacy"]
            "#,
        )
        .unwrap();

        assert_eq!(config.blend_ratio, 0.5);
        assert!(config.debug_logging);
        assert_eq!(config.fetch.interval_secs, 60);
        assert_eq!(config.fetch.request_count, 10);
        assert_eq!(config.temporal.breaking_hours, 6.0);
        assert_eq!(config.temporal.developing_hours, 72.0);
        assert!(!config.categories.is_enabled(EventCategory::Diplomacy));
        assert!(config.categories.is_enabled(EventCategory::Scandal));
    }

    #[test]
    fn test_invalid_blend_ratio_rejected() {
        let err = NewsConfig::from_toml_str("blend_ratio = 1.5").unwrap_err();
        assert!(matches!(err, NewsError::InvalidConfig(_)));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let err = NewsConfig::from_toml_str("blend_ratio = [").unwrap_err();
        assert!(matches!(err, NewsError::ConfigParse(_)));
    }

    #[test]
    fn test_window_lookup() {
        let windows = EventWindowConfig::default();
        assert!(
            windows.window(Urgency::Breaking).expiration_turns
                < windows.window(Urgency::Informational).expiration_turns
        );
    }
}
