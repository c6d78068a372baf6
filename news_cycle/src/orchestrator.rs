//! Orchestrator - the composition root of the news pipeline.
//!
//! The [`NewsOrchestrator`] owns every component and wires them into the two
//! entry points a host game loop drives: a wall-clock [`update`] and a
//! discrete [`on_turn_advance`]. Live fetching is ticketed so the network
//! await never holds a borrow of the orchestrator:
//!
//! 1. [`begin_fetch_cycle`] hands out a [`FetchTicket`]
//! 2. the host awaits [`fetch_live`] with the ticket's count and timeout
//! 3. [`complete_fetch_cycle`] feeds the outcome back in
//!
//! A ticket older than the newest begun cycle is discarded on completion.
//!
//! [`update`]: NewsOrchestrator::update
//! [`on_turn_advance`]: NewsOrchestrator::on_turn_advance
//! [`begin_fetch_cycle`]: NewsOrchestrator::begin_fetch_cycle
//! [`complete_fetch_cycle`]: NewsOrchestrator::complete_fetch_cycle

use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use campaign_rules::{PlayerContext, ResourceSink};
use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classifier::{ClassifiedItem, Classifier, Issue};
use crate::config::NewsConfig;
use crate::consequences::{
    ConsequenceCalculator, ConsequenceContext, ConsequenceResult, EffectApplicator, ResponseFailure,
    ScheduledEffect, Stance, StanceChange, StanceRecord, StanceTracker,
};
use crate::content::{fetch_live, ContentSource, FetchOutcome, SourceKind};
use crate::error::{CommandRejected, Result};
use crate::events::{EventFactory, EventId, FactoryContext, GameEvent};
use crate::fallback::{
    CacheManager, CachedItem, CyclePlan, FallbackOrchestrator, GenerationContext, ProceduralGenerator,
    SourceChange, SourceHealth,
};
use crate::notifications::{Notification, NotificationQueue};
use crate::templates::{TemplateCatalog, TemplateMatcher, Urgency};
use crate::temporal::{CycleStage, CycleState, FatigueKey, StageTransition, TemporalCycleManager};

/// Permission to complete one fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub requested_at: DateTime<Utc>,
    /// Raw items to ask the source for.
    pub count: usize,
    pub timeout: Duration,
}

/// What one fetch cycle produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub generation: u64,
    /// The ticket was stale and its result was dropped.
    pub discarded: bool,
    pub source_change: Option<SourceChange>,
    pub plan: CyclePlan,
    pub created: Vec<EventId>,
    /// Items dropped because their story family was fatigued.
    pub suppressed: usize,
    /// Items dropped because their category is disabled.
    pub filtered: usize,
    /// Cache entries evicted to make room.
    pub evicted: usize,
}

/// What a wall-clock update did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateReport {
    pub transitions: Vec<StageTransition>,
    pub expired: Vec<EventId>,
    /// A live fetch should be started with [`NewsOrchestrator::begin_fetch_cycle`].
    pub fetch_due: bool,
    /// Set when fetching is disabled and the cycle ran from fallback sources.
    pub cycle: Option<CycleReport>,
}

/// What a turn advance did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnReport {
    pub turn: u32,
    pub applied: Vec<ScheduledEffect>,
    pub transitions: Vec<StageTransition>,
    pub expired: Vec<EventId>,
    /// Events whose cycle reached Historical and was dropped.
    pub retired: Vec<EventId>,
    pub pruned: usize,
    pub cycle: Option<CycleReport>,
}

/// Result of a player's response to an event.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseOutcome {
    pub event_id: EventId,
    pub option_id: String,
    /// `Err` when the option could not be attempted; nothing was applied.
    pub result: std::result::Result<ConsequenceResult, ResponseFailure>,
    pub stance_change: Option<StanceChange>,
}

impl ResponseOutcome {
    /// The response was attempted, whether or not the roll succeeded.
    pub fn is_applied(&self) -> bool {
        self.result.is_ok()
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.result, Ok(ref result) if result.succeeded)
    }

    /// Explanation for the presentation layer.
    pub fn message(&self) -> String {
        match &self.result {
            Ok(result) if result.succeeded => format!("'{}' succeeded", self.option_id),
            Ok(_) => format!("'{}' fell short", self.option_id),
            Err(failure) => failure.to_string(),
        }
    }
}

enum Materialization {
    Created(EventId),
    Suppressed,
    Filtered,
}

/// Top-level coordinator. Single-threaded; the host drives it.
pub struct NewsOrchestrator {
    config: NewsConfig,

    classifier: Classifier,
    matcher: TemplateMatcher,
    factory: EventFactory,
    temporal: TemporalCycleManager,

    fallback: FallbackOrchestrator,
    cache: CacheManager,
    generator: ProceduralGenerator,

    calculator: ConsequenceCalculator,
    applicator: EffectApplicator,
    stances: StanceTracker,

    notifications: NotificationQueue,
    rng: ChaCha8Rng,

    /// Open events in creation order.
    active: Vec<GameEvent>,
    archive: Vec<GameEvent>,
    /// Source item ids that already became events.
    materialized: HashSet<String>,

    fetch_generation: u64,
    last_fetch: Option<DateTime<Utc>>,
    /// Latest wall-clock time seen.
    clock: Option<DateTime<Utc>>,
}

impl NewsOrchestrator {
    /// Build the pipeline from a validated config and the builtin catalog.
    pub fn new(config: NewsConfig) -> Result<Self> {
        config.validate()?;
        let c = &config.consequences;
        Ok(Self {
            classifier: Classifier::new(),
            matcher: TemplateMatcher::default(),
            factory: EventFactory::new(config.events.clone()),
            temporal: TemporalCycleManager::new(config.temporal.clone()),
            fallback: FallbackOrchestrator::new(config.fallback.clone(), config.blend_ratio),
            cache: CacheManager::new(config.cache.clone()),
            generator: ProceduralGenerator::new(config.seed.wrapping_add(1))
                .with_disabled(config.categories.disabled.clone()),
            calculator: ConsequenceCalculator::new(c.clone()),
            applicator: EffectApplicator::new(),
            stances: StanceTracker::new(c.flip_flop_penalty, c.consistency_recovery),
            notifications: NotificationQueue::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            active: Vec::new(),
            archive: Vec::new(),
            materialized: HashSet::new(),
            fetch_generation: 0,
            last_fetch: None,
            clock: None,
            config,
        })
    }

    /// Replace the template catalog.
    pub fn with_catalog(mut self, catalog: TemplateCatalog) -> Self {
        self.matcher = TemplateMatcher::new(catalog);
        self
    }

    pub fn config(&self) -> &NewsConfig {
        &self.config
    }

    /// Wall-clock entry point: ages events and reports whether a fetch is due.
    /// With fetching disabled, a due cycle runs immediately from the cache and
    /// the procedural generator.
    pub fn update<P: PlayerContext + ?Sized>(&mut self, now: DateTime<Utc>, player: &P) -> UpdateReport {
        self.clock = Some(now);

        let transitions = self.temporal.tick(now);
        self.notify_transitions(&transitions);
        let expired = self.expire_where(|_, state| state.map_or(false, |s| s.stage >= CycleStage::Archived));
        self.temporal.drain_historical();

        let due = self
            .last_fetch
            .map_or(true, |last| (now - last).num_seconds() >= self.config.fetch.interval_secs as i64);

        let mut report = UpdateReport {
            transitions,
            expired,
            ..Default::default()
        };
        if !due {
            return report;
        }
        if self.config.fetch.enabled {
            report.fetch_due = true;
        } else {
            let ticket = self.begin_fetch_cycle(now);
            report.cycle = Some(self.complete_fetch_cycle(ticket, FetchOutcome::Skipped, now, player));
        }
        report
    }

    /// Start a fetch cycle. Any cycle begun earlier becomes stale.
    pub fn begin_fetch_cycle(&mut self, now: DateTime<Utc>) -> FetchTicket {
        self.fetch_generation += 1;
        self.last_fetch = Some(now);
        debug!(generation = self.fetch_generation, "fetch cycle started");
        FetchTicket {
            generation: self.fetch_generation,
            requested_at: now,
            count: self.config.fetch.request_count,
            timeout: Duration::from_secs(self.config.fetch.timeout_secs),
        }
    }

    /// Feed a fetch outcome back in and materialize this cycle's events.
    pub fn complete_fetch_cycle<P: PlayerContext + ?Sized>(
        &mut self,
        ticket: FetchTicket,
        outcome: FetchOutcome,
        now: DateTime<Utc>,
        player: &P,
    ) -> CycleReport {
        self.clock = Some(now);
        if ticket.generation != self.fetch_generation {
            debug!(
                ticket = ticket.generation,
                current = self.fetch_generation,
                "discarding stale fetch result"
            );
            return CycleReport {
                generation: ticket.generation,
                discarded: true,
                ..Default::default()
            };
        }

        let mut report = CycleReport {
            generation: ticket.generation,
            ..Default::default()
        };

        let live = match outcome {
            FetchOutcome::Success(items) => {
                report.source_change = self.fallback.record_success();
                items
            }
            FetchOutcome::Failure(reason) => {
                warn!(generation = ticket.generation, %reason, "live fetch failed");
                report.source_change = self.fallback.record_failure(!self.cache.is_empty());
                Vec::new()
            }
            FetchOutcome::Skipped => Vec::new(),
        };

        // Every live item is cached, whether or not it becomes an event.
        let mut candidates = Vec::new();
        for raw in &live {
            let classified = self.classifier.classify(raw);
            let cached = CachedItem::from_classified(&classified, SourceKind::Live, now);
            report.evicted += self.cache.insert(cached, now).len();
            if self.materialized.contains(&raw.id) {
                continue;
            }
            if !self.config.categories.is_enabled(classified.category) {
                report.filtered += 1;
                continue;
            }
            candidates.push(classified);
        }
        candidates.sort_by(|a, b| b.relevance.partial_cmp(&a.relevance).unwrap_or(Ordering::Equal));
        let this_cycle: HashSet<String> = candidates.iter().map(|c| c.item.id.clone()).collect();

        let materialized = &self.materialized;
        let categories = &self.config.categories;
        let servable = |item: &CachedItem| {
            !materialized.contains(&item.id)
                && !this_cycle.contains(&item.id)
                && categories.is_enabled(item.category)
        };
        let cache_available = self.cache.items().iter().filter(|&item| servable(item)).count();

        let plan = self
            .fallback
            .plan(candidates.len(), cache_available, self.config.fetch.max_events_per_cycle);
        report.plan = plan;

        let mut batch: Vec<(ClassifiedItem, SourceKind)> = candidates
            .into_iter()
            .take(plan.live)
            .map(|item| (item, SourceKind::Live))
            .collect();

        for cached in self.cache.serve_matching(plan.cache, now, servable) {
            batch.push((self.classifier.classify(&cached.to_raw()), SourceKind::Cache));
        }

        let generation_ctx = GenerationContext::from_player(player);
        for raw in self.generator.generate(&generation_ctx, plan.procedural, now) {
            let classified = self.classifier.classify(&raw);
            let cached = CachedItem::from_classified(&classified, SourceKind::Procedural, now);
            report.evicted += self.cache.insert(cached, now).len();
            batch.push((classified, SourceKind::Procedural));
        }

        for (item, source) in batch {
            match self.materialize(item, source, player) {
                Materialization::Created(id) => report.created.push(id),
                Materialization::Suppressed => report.suppressed += 1,
                Materialization::Filtered => report.filtered += 1,
            }
        }

        info!(
            generation = report.generation,
            primary = %self.fallback.primary(),
            live = plan.live,
            cache = plan.cache,
            procedural = plan.procedural,
            created = report.created.len(),
            suppressed = report.suppressed,
            "fetch cycle complete"
        );
        report
    }

    /// Begin, fetch and complete in one call. Holds the orchestrator for the
    /// duration of the fetch; hosts that keep ticking meanwhile use the
    /// ticketed pair instead.
    pub async fn run_fetch_cycle<P: PlayerContext + ?Sized>(
        &mut self,
        source: &dyn ContentSource,
        now: DateTime<Utc>,
        player: &P,
    ) -> CycleReport {
        let ticket = self.begin_fetch_cycle(now);
        let outcome = if self.config.fetch.enabled {
            fetch_live(source, ticket.count, ticket.timeout).await
        } else {
            FetchOutcome::Skipped
        };
        self.complete_fetch_cycle(ticket, outcome, now, player)
    }

    /// Turn entry point. Call after the player's turn counter has advanced.
    pub fn on_turn_advance<P>(&mut self, player: &mut P) -> TurnReport
    where
        P: PlayerContext + ResourceSink + ?Sized,
    {
        let turn = player.turn();
        let applied = self.applicator.flush(turn, player);

        let transitions = self.temporal.advance_turn();
        self.notify_transitions(&transitions);

        let expired = self.expire_where(|event, state| {
            event.is_past_expiration(turn) || state.map_or(false, |s| s.stage >= CycleStage::Archived)
        });
        let retired = self.temporal.drain_historical();

        let pruned = match self.clock {
            Some(now) => self.cache.prune(now).len(),
            None => 0,
        };
        self.prune_materialized();

        // With live content down and nothing to act on, keep the feed alive.
        let idle = !self.active.iter().any(GameEvent::requires_action);
        let cycle = match self.clock {
            Some(now) if idle && self.fallback.primary() == SourceKind::Procedural => {
                let ticket = self.begin_fetch_cycle(now);
                Some(self.complete_fetch_cycle(ticket, FetchOutcome::Skipped, now, &*player))
            }
            _ => None,
        };

        info!(
            turn,
            applied = applied.len(),
            expired = expired.len(),
            active = self.active.len(),
            pending = self.applicator.pending_count(),
            "turn advanced"
        );

        TurnReport {
            turn,
            applied,
            transitions,
            expired,
            retired,
            pruned,
            cycle,
        }
    }

    /// Resolve a player's choice, rolling from the seeded generator.
    pub fn process_player_response<P>(
        &mut self,
        event_id: EventId,
        option_id: &str,
        player: &mut P,
    ) -> std::result::Result<ResponseOutcome, CommandRejected>
    where
        P: PlayerContext + ResourceSink + ?Sized,
    {
        self.respond(event_id, option_id, None, player)
    }

    /// Resolve a player's choice with a roll in `[0, 1)` supplied by the
    /// caller, for replays and hosts that own their randomness.
    pub fn process_player_response_with_roll<P>(
        &mut self,
        event_id: EventId,
        option_id: &str,
        roll: f32,
        player: &mut P,
    ) -> std::result::Result<ResponseOutcome, CommandRejected>
    where
        P: PlayerContext + ResourceSink + ?Sized,
    {
        self.respond(event_id, option_id, Some(roll), player)
    }

    /// Rejected and gated commands never draw from the generator.
    fn respond<P>(
        &mut self,
        event_id: EventId,
        option_id: &str,
        roll: Option<f32>,
        player: &mut P,
    ) -> std::result::Result<ResponseOutcome, CommandRejected>
    where
        P: PlayerContext + ResourceSink + ?Sized,
    {
        let Some(index) = self.active.iter().position(|e| e.id == event_id) else {
            let rejection = if self.archive.iter().any(|e| e.id == event_id) {
                CommandRejected::EventClosed(event_id)
            } else {
                CommandRejected::UnknownEvent(event_id)
            };
            return Err(self.reject(event_id, option_id, rejection));
        };

        let event = &self.active[index];
        if event.is_closed() {
            return Err(self.reject(event_id, option_id, CommandRejected::EventClosed(event_id)));
        }
        let Some(option) = event.option(option_id) else {
            let rejection = CommandRejected::UnknownOption {
                event_id,
                option_id: option_id.to_string(),
            };
            return Err(self.reject(event_id, option_id, rejection));
        };

        if let Err(failure) = self.calculator.check(option, &*player) {
            info!(event_id = %event_id, option = option_id, reason = %failure, "response not attempted");
            let outcome = ResponseOutcome {
                event_id,
                option_id: option_id.to_string(),
                result: Err(failure),
                stance_change: None,
            };
            self.notifications.push(Notification::ResponseProcessed {
                event_id,
                option_id: option_id.to_string(),
                succeeded: false,
                summary: outcome.message(),
            });
            return Ok(outcome);
        }

        let roll = roll.unwrap_or_else(|| self.rng.gen());
        let ctx = ConsequenceContext::from_player(&*player);
        let result = self.calculator.calculate(event, option, &ctx, roll);
        self.applicator.apply(&result, player);

        let stance_change = result.stance.map(|taken| {
            self.stances.record(StanceRecord {
                issue: taken.issue,
                stance: taken.stance,
                turn: ctx.turn,
                strength: taken.strength,
                event_id,
            })
        });

        let mut event = self.active.remove(index);
        event.record_response(option_id, ctx.turn, result.succeeded);
        if let Some(transition) = self.temporal.archive(event_id) {
            self.notify_transitions(&[transition]);
        }
        info!(
            event_id = %event_id,
            option = option_id,
            succeeded = result.succeeded,
            "event resolved"
        );
        self.close(event);

        let outcome = ResponseOutcome {
            event_id,
            option_id: option_id.to_string(),
            result: Ok(result),
            stance_change,
        };
        self.notifications.push(Notification::ResponseProcessed {
            event_id,
            option_id: option_id.to_string(),
            succeeded: outcome.succeeded(),
            summary: outcome.message(),
        });
        Ok(outcome)
    }

    /// The player looked at or engaged with an open event.
    pub fn record_interaction(&mut self, event_id: EventId) -> bool {
        if !self.active.iter().any(|e| e.id == event_id) {
            return false;
        }
        self.temporal.record_interaction(event_id)
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    /// Open events in creation order.
    pub fn active_events(&self) -> &[GameEvent] {
        &self.active
    }

    /// Look up an open or archived event.
    pub fn event(&self, event_id: EventId) -> Option<&GameEvent> {
        self.active
            .iter()
            .chain(self.archive.iter())
            .find(|e| e.id == event_id)
    }

    pub fn cycle_state(&self, event_id: EventId) -> Option<&CycleState> {
        self.temporal.state(event_id)
    }

    /// Resolved and expired events, oldest first.
    pub fn archived_events(&self) -> &[GameEvent] {
        &self.archive
    }

    pub fn source_health(&self) -> SourceHealth {
        self.fallback.health()
    }

    pub fn consistency_score(&self) -> f32 {
        self.stances.consistency_score()
    }

    pub fn would_be_flip_flop(&self, issue: Issue, stance: Stance) -> bool {
        self.stances.would_be_flip_flop(issue, stance)
    }

    pub fn stance_history(&self) -> &[StanceRecord] {
        self.stances.history()
    }

    pub fn pending_deferred_effects(&self) -> impl Iterator<Item = &ScheduledEffect> + '_ {
        self.applicator.pending()
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    pub fn save_cache(&self, path: impl AsRef<Path>) -> Result<()> {
        self.cache.save_to_path(path)
    }

    /// Restore the cache from disk. Missing or corrupt files leave it empty.
    pub fn load_cache(&mut self, path: impl AsRef<Path>) -> usize {
        let loaded = self.cache.load_from_path(path);
        self.generator
            .resume_after(self.cache.items().iter().map(|item| item.id.as_str()));
        loaded
    }

    fn materialize<P: PlayerContext + ?Sized>(
        &mut self,
        item: ClassifiedItem,
        source: SourceKind,
        player: &P,
    ) -> Materialization {
        if !self.config.categories.is_enabled(item.category) {
            return Materialization::Filtered;
        }

        let key = FatigueKey::new(item.category, item.primary_entity().map(|e| e.name.as_str()));
        if self.temporal.is_fatigued(&key) {
            info!(
                item = %item.item.id,
                category = %item.category,
                entity = %key.entity,
                "suppressing fatigued story"
            );
            return Materialization::Suppressed;
        }
        let fatigue = self.temporal.fatigue_level(&key);

        let template = self.matcher.find_best_match(&item);
        let ctx = FactoryContext::new(source, player.office_tier(), player.turn()).with_fatigue(fatigue);
        let event = self.factory.create(&item, template, ctx);

        self.temporal.register(event.id, fatigue);
        self.temporal.register_story(key);
        self.materialized.insert(item.item.id.clone());

        let notification = if event.urgency == Urgency::Breaking {
            Notification::BreakingNews {
                event_id: event.id,
                headline: event.headline.clone(),
                requires_action: event.requires_action(),
            }
        } else {
            Notification::NewEventAvailable {
                event_id: event.id,
                headline: event.headline.clone(),
                requires_action: event.requires_action(),
            }
        };
        self.notifications.push(notification);

        debug!(
            event_id = %event.id,
            source = %source,
            template = event.template_id.as_deref().unwrap_or("generic"),
            "event materialized"
        );
        let id = event.id;
        self.active.push(event);
        Materialization::Created(id)
    }

    /// Expire every open event the predicate selects.
    fn expire_where(&mut self, expire: impl Fn(&GameEvent, Option<&CycleState>) -> bool) -> Vec<EventId> {
        let due: Vec<EventId> = self
            .active
            .iter()
            .filter(|&e| expire(e, self.temporal.state(e.id)))
            .map(|e| e.id)
            .collect();

        for id in &due {
            let Some(index) = self.active.iter().position(|e| e.id == *id) else {
                continue;
            };
            let mut event = self.active.remove(index);
            event.mark_expired();
            info!(event_id = %event.id, headline = %event.headline, "event expired");
            self.notifications.push(Notification::EventExpired {
                event_id: event.id,
                headline: event.headline.clone(),
            });
            if let Some(transition) = self.temporal.archive(event.id) {
                self.notify_transitions(&[transition]);
            }
            self.close(event);
        }
        due
    }

    /// Move a finished event to the archive, dropping the oldest past capacity.
    fn close(&mut self, event: GameEvent) {
        self.archive.push(event);
        let overflow = self
            .archive
            .len()
            .saturating_sub(self.config.events.archive_capacity);
        if overflow > 0 {
            self.archive.drain(..overflow);
            debug!(dropped = overflow, "archive trimmed");
            self.prune_materialized();
        }
    }

    /// Forget item ids no longer held as an event or a cached item.
    fn prune_materialized(&mut self) {
        let held: HashSet<&str> = self
            .active
            .iter()
            .chain(self.archive.iter())
            .map(|e| e.source_item_id.as_str())
            .collect();
        let cache = &self.cache;
        self.materialized
            .retain(|id| held.contains(id.as_str()) || cache.contains(id));
    }

    fn notify_transitions(&mut self, transitions: &[StageTransition]) {
        for t in transitions {
            self.notifications.push(Notification::StageChanged {
                event_id: t.event_id,
                from: t.from,
                to: t.to,
            });
        }
    }

    fn reject(&mut self, event_id: EventId, option_id: &str, rejection: CommandRejected) -> CommandRejected {
        warn!(event_id = %event_id, option = option_id, reason = %rejection, "command rejected");
        self.notifications.push(Notification::CommandRejected {
            event_id,
            option_id: option_id.to_string(),
            reason: rejection.reason(),
        });
        rejection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::RawItem;
    use crate::events::ResponseOption;
    use campaign_rules::{AlignmentRange, OfficeTier, PlayerState, Resource};

    fn smith(now: DateTime<Utc>) -> RawItem {
        RawItem::new(
            "smith",
            "Senator Smith Faces Bribery Probe",
            "Federal investigators opened a corruption investigation amid allegations of bribery.",
            "Wire",
            now,
        )
    }

    fn quiet_config() -> NewsConfig {
        NewsConfig {
            blend_ratio: 0.0,
            fetch: crate::config::FetchConfig {
                max_events_per_cycle: 1,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn with_smith(player: &PlayerState) -> (NewsOrchestrator, EventId) {
        let mut news = NewsOrchestrator::new(quiet_config()).unwrap();
        let now = Utc::now();
        let ticket = news.begin_fetch_cycle(now);
        let report = news.complete_fetch_cycle(ticket, FetchOutcome::Success(vec![smith(now)]), now, player);
        assert_eq!(report.created.len(), 1);
        (news, report.created[0])
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = NewsConfig {
            blend_ratio: 2.0,
            ..Default::default()
        };
        assert!(NewsOrchestrator::new(config).is_err());
    }

    #[test]
    fn test_smith_becomes_breaking_scandal() {
        let player = PlayerState::new("Pat", OfficeTier::Governor);
        let (mut news, id) = with_smith(&player);

        let event = news.event(id).unwrap();
        assert_eq!(event.template_id.as_deref(), Some("scandal_bribery"));
        assert_eq!(event.source_kind, SourceKind::Live);
        assert_eq!(news.cycle_state(id).unwrap().stage, CycleStage::Breaking);
        assert!(news.cache().contains("smith"));

        let notes = news.drain_notifications();
        assert!(matches!(notes[0], Notification::BreakingNews { event_id, .. } if event_id == id));
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let player = PlayerState::new("Pat", OfficeTier::Mayor);
        let mut news = NewsOrchestrator::new(quiet_config()).unwrap();
        let now = Utc::now();

        let old = news.begin_fetch_cycle(now);
        let _new = news.begin_fetch_cycle(now);
        let report = news.complete_fetch_cycle(old, FetchOutcome::Success(vec![smith(now)]), now, &player);

        assert!(report.discarded);
        assert!(news.active_events().is_empty());
        assert!(news.cache().is_empty());
        assert_eq!(news.source_health().attempts, 0);
    }

    #[test]
    fn test_same_item_materializes_once() {
        let player = PlayerState::new("Pat", OfficeTier::Mayor);
        let (mut news, _) = with_smith(&player);
        let now = Utc::now();
        let ticket = news.begin_fetch_cycle(now);
        let report = news.complete_fetch_cycle(ticket, FetchOutcome::Success(vec![smith(now)]), now, &player);
        assert!(report.created.iter().all(|id| news.event(*id).unwrap().source_item_id != "smith"));
    }

    #[test]
    fn test_response_applies_and_archives() {
        let mut player = PlayerState::new("Pat", OfficeTier::Governor);
        let (mut news, id) = with_smith(&player);
        let trust_before = player.resource(Resource::Trust);

        let outcome = news
            .process_player_response_with_roll(id, "condemn", 0.0, &mut player)
            .unwrap();

        assert!(outcome.succeeded());
        assert!(player.resource(Resource::Trust) > trust_before);
        assert!(news.active_events().is_empty());
        assert!(news.event(id).unwrap().resolved);
        assert_eq!(news.cycle_state(id).unwrap().stage, CycleStage::Archived);
        assert_eq!(news.stance_history().len(), 1);

        let again = news.process_player_response_with_roll(id, "condemn", 0.0, &mut player);
        assert_eq!(again.unwrap_err(), CommandRejected::EventClosed(id));
    }

    #[test]
    fn test_unknown_option_mutates_nothing() {
        let mut player = PlayerState::new("Pat", OfficeTier::Governor);
        let (mut news, id) = with_smith(&player);
        news.drain_notifications();
        let before = player.clone();

        let err = news
            .process_player_response(id, "shrug", &mut player)
            .unwrap_err();

        assert!(matches!(err, CommandRejected::UnknownOption { .. }));
        assert_eq!(player.resource(Resource::Trust), before.resource(Resource::Trust));
        assert_eq!(news.active_events().len(), 1);
        assert!(matches!(
            news.drain_notifications()[..],
            [Notification::CommandRejected { .. }]
        ));

        let stranger = EventId::new();
        assert_eq!(
            news.process_player_response(stranger, "condemn", &mut player).unwrap_err(),
            CommandRejected::UnknownEvent(stranger)
        );
    }

    #[test]
    fn test_rejected_commands_leave_roll_sequence_intact() {
        let mut player = PlayerState::new("Pat", OfficeTier::Governor);
        let (mut clean, clean_id) = with_smith(&player);
        let (mut noisy, noisy_id) = with_smith(&player);
        noisy.active[0].response_options.push(
            ResponseOption::new("hardline", "Hardline", 1.0)
                .with_gate(AlignmentRange::economic(30.0, 100.0).unwrap()),
        );

        assert!(noisy.process_player_response(noisy_id, "shrug", &mut player).is_err());
        assert!(noisy
            .process_player_response(EventId::new(), "condemn", &mut player)
            .is_err());
        let gated = noisy
            .process_player_response(noisy_id, "hardline", &mut player)
            .unwrap();
        assert!(!gated.is_applied());

        let mut other = player.clone();
        let expected = clean
            .process_player_response(clean_id, "defend", &mut player)
            .unwrap();
        let actual = noisy
            .process_player_response(noisy_id, "defend", &mut other)
            .unwrap();
        assert_eq!(
            actual.result.unwrap().roll,
            expected.result.unwrap().roll
        );
    }

    #[test]
    fn test_archive_keeps_only_the_newest_closed_events() {
        let mut player = PlayerState::new("Pat", OfficeTier::Governor);
        let mut config = quiet_config();
        config.fetch.max_events_per_cycle = 2;
        config.events.archive_capacity = 1;
        let mut news = NewsOrchestrator::new(config).unwrap();
        let now = Utc::now();
        let jones = RawItem::new(
            "jones",
            "Senator Jones Faces Bribery Probe",
            "Federal investigators opened a corruption investigation amid allegations of bribery.",
            "Wire",
            now,
        );
        let ticket = news.begin_fetch_cycle(now);
        let report = news.complete_fetch_cycle(ticket, FetchOutcome::Success(vec![smith(now), jones]), now, &player);
        assert_eq!(report.created.len(), 2);

        for id in &report.created {
            news.process_player_response_with_roll(*id, "condemn", 0.0, &mut player)
                .unwrap();
        }

        assert_eq!(news.archived_events().len(), 1);
        assert!(news.event(report.created[0]).is_none());
        assert_eq!(news.archived_events()[0].id, report.created[1]);

        // Still cached, so the same story is not offered twice.
        let ticket = news.begin_fetch_cycle(now);
        let again = news.complete_fetch_cycle(ticket, FetchOutcome::Success(vec![smith(now)]), now, &player);
        assert!(again
            .created
            .iter()
            .all(|id| news.event(*id).unwrap().source_item_id != "smith"));
    }

    #[test]
    fn test_dodging_an_issue_is_logged() {
        let mut player = PlayerState::new("Pat", OfficeTier::Governor);
        let (mut news, id) = with_smith(&player);

        let outcome = news
            .process_player_response_with_roll(id, "distance", 0.0, &mut player)
            .unwrap();

        assert!(!outcome.stance_change.unwrap().flip_flop);
        assert_eq!(news.stance_history().len(), 1);
        assert_eq!(news.stance_history()[0].issue, Issue::Ethics);
        assert_eq!(news.stance_history()[0].stance, Stance::Neutral);
        assert!(!news.would_be_flip_flop(Issue::Ethics, Stance::Defend));
    }

    #[test]
    fn test_gated_option_fails_without_effects() {
        let mut player = PlayerState::new("Pat", OfficeTier::Governor);
        let (mut news, id) = with_smith(&player);
        news.active[0].response_options.push(
            ResponseOption::new("hardline", "Hardline", 1.0)
                .with_gate(AlignmentRange::economic(30.0, 100.0).unwrap())
                .with_stance(Stance::Defend, 1.0),
        );
        let before = player.clone();

        let outcome = news
            .process_player_response_with_roll(id, "hardline", 0.0, &mut player)
            .unwrap();

        assert!(!outcome.is_applied());
        assert!(matches!(outcome.result, Err(ResponseFailure::AlignmentMismatch { .. })));
        assert!(outcome.message().contains("alignment mismatch"));
        for resource in Resource::ALL {
            assert_eq!(player.resource(resource), before.resource(resource));
        }
        assert!(news.stance_history().is_empty());
        assert!(news.event(id).unwrap().requires_action());
    }

    #[test]
    fn test_unanswered_event_expires_on_turn() {
        let mut player = PlayerState::new("Pat", OfficeTier::Governor);
        let (mut news, id) = with_smith(&player);
        let expiration = news.event(id).unwrap().expiration_turn;

        while player.turn < expiration {
            player.advance_turn();
            news.on_turn_advance(&mut player);
        }

        assert!(news.active_events().is_empty());
        assert!(news.event(id).unwrap().expired);
        assert!(news
            .drain_notifications()
            .iter()
            .any(|n| matches!(n, Notification::EventExpired { event_id, .. } if *event_id == id)));
    }

    #[test]
    fn test_disabled_fetch_runs_fallback_cycle_on_update() {
        let mut config = quiet_config();
        config.fetch.enabled = false;
        let mut news = NewsOrchestrator::new(config).unwrap();
        let player = PlayerState::new("Pat", OfficeTier::Mayor);

        let report = news.update(Utc::now(), &player);
        assert!(!report.fetch_due);
        let cycle = report.cycle.unwrap();
        assert_eq!(cycle.plan.procedural, 1);
        assert_eq!(news.active_events().len() + cycle.suppressed, 1);
    }

    #[test]
    fn test_fetch_due_follows_interval() {
        let mut news = NewsOrchestrator::new(quiet_config()).unwrap();
        let player = PlayerState::new("Pat", OfficeTier::Mayor);
        let now = Utc::now();

        assert!(news.update(now, &player).fetch_due);
        news.begin_fetch_cycle(now);
        assert!(!news.update(now + chrono::Duration::seconds(10), &player).fetch_due);
        assert!(news.update(now + chrono::Duration::seconds(301), &player).fetch_due);
    }
}
