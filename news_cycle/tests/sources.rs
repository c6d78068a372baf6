//! Fetch cycles against scripted content sources.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use campaign_rules::{OfficeTier, PlayerState};
use chrono::Utc;
use news_cycle::{
    fetch_live, ContentSource, FetchConfig, FetchOutcome, NewsConfig, NewsError, NewsOrchestrator, RawItem,
    SourceKind,
};

struct StaticSource(Vec<RawItem>);

#[async_trait]
impl ContentSource for StaticSource {
    async fn fetch(&self, count: usize) -> news_cycle::Result<Vec<RawItem>> {
        Ok(self.0.iter().take(count).cloned().collect())
    }
}

#[derive(Default)]
struct FailingSource {
    calls: AtomicUsize,
}

#[async_trait]
impl ContentSource for FailingSource {
    async fn fetch(&self, _count: usize) -> news_cycle::Result<Vec<RawItem>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(NewsError::ContentSource("connection refused".into()))
    }
}

struct SlowSource;

#[async_trait]
impl ContentSource for SlowSource {
    async fn fetch(&self, _count: usize) -> news_cycle::Result<Vec<RawItem>> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Vec::new())
    }
}

fn headlines() -> Vec<RawItem> {
    let now = Utc::now();
    vec![
        RawItem::new(
            "budget",
            "Governor Alvarez Signs Education Budget",
            "Lawmakers approved new school funding after a long debate over the bill.",
            "Wire",
            now,
        ),
        RawItem::new(
            "smith",
            "Senator Smith Faces Bribery Probe",
            "Federal investigators opened a corruption investigation amid allegations of bribery.",
            "Wire",
            now,
        ),
    ]
}

fn config() -> NewsConfig {
    NewsConfig {
        blend_ratio: 0.0,
        fetch: FetchConfig {
            timeout_secs: 1,
            max_events_per_cycle: 2,
            ..FetchConfig::default()
        },
        ..NewsConfig::default()
    }
}

#[tokio::test]
async fn test_consecutive_failures_demote_live_source() {
    let mut news = NewsOrchestrator::new(config()).unwrap();
    let player = PlayerState::new("Pat", OfficeTier::Mayor);
    let source = FailingSource::default();
    let threshold = news.config().fallback.demote_after_failures;

    for attempt in 1..=threshold {
        let report = news.run_fetch_cycle(&source, Utc::now(), &player).await;
        // A dead feed still yields a full cycle.
        assert_eq!(report.plan.total(), 2);
        assert_eq!(report.plan.live, 0);
        if attempt < threshold {
            assert_eq!(news.source_health().primary, SourceKind::Live);
        }
    }

    let health = news.source_health();
    assert_ne!(health.primary, SourceKind::Live);
    assert_eq!(health.consecutive_failures, threshold);
    assert_eq!(health.success_rate, 0.0);
    assert_eq!(source.calls.load(Ordering::SeqCst), threshold as usize);
    assert!(!news.active_events().is_empty());
}

#[tokio::test]
async fn test_recovered_source_is_promoted() {
    let mut news = NewsOrchestrator::new(config()).unwrap();
    let player = PlayerState::new("Pat", OfficeTier::Mayor);
    let failing = FailingSource::default();
    let healthy = StaticSource(headlines());

    for _ in 0..news.config().fallback.demote_after_failures {
        news.run_fetch_cycle(&failing, Utc::now(), &player).await;
    }
    assert!(news.source_health().is_degraded());

    let first = news.run_fetch_cycle(&healthy, Utc::now(), &player).await;
    assert!(first.source_change.is_none());
    assert_eq!(first.plan.live, 0);
    assert!(news.source_health().is_degraded());

    let second = news.run_fetch_cycle(&healthy, Utc::now(), &player).await;
    let change = second.source_change.unwrap();
    assert_eq!(change.to, SourceKind::Live);
    assert!(!news.source_health().is_degraded());
}

#[tokio::test]
async fn test_live_items_are_cached_then_served_when_demoted() {
    let mut news = NewsOrchestrator::new(NewsConfig {
        fetch: FetchConfig {
            max_events_per_cycle: 1,
            ..config().fetch
        },
        ..config()
    })
    .unwrap();
    let player = PlayerState::new("Pat", OfficeTier::Governor);

    let report = news
        .run_fetch_cycle(&StaticSource(headlines()), Utc::now(), &player)
        .await;
    assert_eq!(report.plan.live, 1);
    assert!(news.cache().contains("budget"));
    assert!(news.cache().contains("smith"));

    let failing = FailingSource::default();
    let mut served_from_cache = 0;
    for _ in 0..news.config().fallback.demote_after_failures + 1 {
        let report = news.run_fetch_cycle(&failing, Utc::now(), &player).await;
        served_from_cache += report.plan.cache;
    }
    assert_eq!(news.source_health().primary, SourceKind::Cache);
    assert!(served_from_cache >= 1);
    assert!(news
        .active_events()
        .iter()
        .any(|e| e.source_kind == SourceKind::Cache));
}

#[tokio::test]
async fn test_slow_source_times_out_as_failure() {
    let outcome = fetch_live(&SlowSource, 5, Duration::from_millis(20)).await;
    assert!(matches!(outcome, FetchOutcome::Failure(_)));

    let mut news = NewsOrchestrator::new(config()).unwrap();
    let player = PlayerState::new("Pat", OfficeTier::Mayor);
    let report = news.run_fetch_cycle(&SlowSource, Utc::now(), &player).await;
    assert!(!report.discarded);
    assert_eq!(news.source_health().consecutive_failures, 1);
    assert_eq!(report.plan.live, 0);
}

#[tokio::test]
async fn test_result_of_superseded_fetch_is_dropped() {
    let mut news = NewsOrchestrator::new(config()).unwrap();
    let player = PlayerState::new("Pat", OfficeTier::Mayor);
    let source = StaticSource(headlines());

    let stale = news.begin_fetch_cycle(Utc::now());
    let stale_outcome = fetch_live(&source, stale.count, stale.timeout).await;
    let current = news.begin_fetch_cycle(Utc::now());

    let dropped = news.complete_fetch_cycle(stale, stale_outcome, Utc::now(), &player);
    assert!(dropped.discarded);
    assert!(dropped.created.is_empty());
    assert!(news.active_events().is_empty());

    let outcome = fetch_live(&source, current.count, current.timeout).await;
    let report = news.complete_fetch_cycle(current, outcome, Utc::now(), &player);
    assert!(!report.discarded);
    assert_eq!(report.created.len(), 2);
    assert_eq!(news.source_health().attempts, 1);
}

#[tokio::test]
async fn test_disabled_fetching_never_calls_source() {
    let mut config = config();
    config.fetch.enabled = false;
    let mut news = NewsOrchestrator::new(config).unwrap();
    let player = PlayerState::new("Pat", OfficeTier::Mayor);
    let source = FailingSource::default();

    let report = news.run_fetch_cycle(&source, Utc::now(), &player).await;
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    assert_eq!(report.plan.procedural, 2);
    assert_eq!(news.source_health().attempts, 0);
}

#[test]
fn test_cache_survives_restart_and_corruption() {
    let dir = std::env::temp_dir().join(format!("news-cycle-{}", uuid::Uuid::new_v4()));
    let path = dir.join("cache.json");
    let player = PlayerState::new("Pat", OfficeTier::Mayor);
    let now = Utc::now();

    let mut news = NewsOrchestrator::new(config()).unwrap();
    let ticket = news.begin_fetch_cycle(now);
    news.complete_fetch_cycle(ticket, FetchOutcome::Success(headlines()), now, &player);
    let cached = news.cache().len();
    assert!(cached >= 2);
    news.save_cache(&path).unwrap();

    let mut restarted = NewsOrchestrator::new(config()).unwrap();
    assert_eq!(restarted.load_cache(&path), cached);
    assert!(restarted.cache().contains("smith"));

    std::fs::write(&path, "{ not json").unwrap();
    let mut corrupted = NewsOrchestrator::new(config()).unwrap();
    assert_eq!(corrupted.load_cache(&path), 0);
    assert!(corrupted.cache().is_empty());

    // Still produces content after starting empty.
    let ticket = corrupted.begin_fetch_cycle(now);
    let report = corrupted.complete_fetch_cycle(ticket, FetchOutcome::Failure("offline".into()), now, &player);
    assert_eq!(report.plan.procedural, 2);

    let mut missing = NewsOrchestrator::new(config()).unwrap();
    assert_eq!(missing.load_cache(dir.join("absent.json")), 0);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_procedural_ids_continue_after_restart() {
    let path = std::env::temp_dir().join(format!("news-cycle-{}.json", uuid::Uuid::new_v4()));
    let player = PlayerState::new("Pat", OfficeTier::Mayor);
    let now = Utc::now();
    let mut offline = config();
    offline.fetch.enabled = false;

    let mut news = NewsOrchestrator::new(offline.clone()).unwrap();
    news.update(now, &player);
    let saved: Vec<String> = news
        .cache()
        .items()
        .iter()
        .filter(|item| item.source == SourceKind::Procedural)
        .map(|item| item.id.clone())
        .collect();
    assert!(!saved.is_empty());
    news.save_cache(&path).unwrap();

    let mut restarted = NewsOrchestrator::new(offline).unwrap();
    restarted.load_cache(&path);
    let ticket = restarted.begin_fetch_cycle(now);
    restarted.complete_fetch_cycle(ticket, FetchOutcome::Skipped, now, &player);
    let ticket = restarted.begin_fetch_cycle(now);
    restarted.complete_fetch_cycle(ticket, FetchOutcome::Skipped, now, &player);

    let fresh: Vec<&str> = restarted
        .active_events()
        .iter()
        .filter(|e| e.source_kind == SourceKind::Procedural)
        .map(|e| e.source_item_id.as_str())
        .collect();
    assert!(!fresh.is_empty());
    assert!(fresh.iter().all(|id| !saved.iter().any(|s| s == id)));

    let _ = std::fs::remove_file(&path);
}
