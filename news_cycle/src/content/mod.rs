//! Raw content and the live content source boundary.
//!
//! The live source (an HTTP/RSS fetcher in practice) is the only thing in the
//! pipeline that awaits. It reports success or failure distinctly so the
//! fallback orchestrator can track source health.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{NewsError, Result};

/// Where an item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Live,
    Cache,
    Procedural,
}

impl SourceKind {
    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::Live => "live",
            SourceKind::Cache => "cache",
            SourceKind::Procedural => "procedural",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An unprocessed news item. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawItem {
    pub id: String,
    pub headline: String,
    pub summary: String,
    /// Publisher or feed name.
    pub source: String,
    pub published_at: DateTime<Utc>,
}

impl RawItem {
    pub fn new(
        id: impl Into<String>,
        headline: impl Into<String>,
        summary: impl Into<String>,
        source: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            headline: headline.into(),
            summary: summary.into(),
            source: source.into(),
            published_at,
        }
    }

    /// Headline and summary joined for keyword scanning.
    pub fn full_text(&self) -> String {
        format!("{}. {}", self.headline, self.summary)
    }
}

/// Supplies raw items from the outside world.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch up to `count` items. Any error counts as a fetch failure.
    async fn fetch(&self, count: usize) -> Result<Vec<RawItem>>;
}

/// Result of one live fetch attempt.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Success(Vec<RawItem>),
    Failure(String),
    /// Live fetching was disabled or not attempted this cycle.
    Skipped,
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }
}

/// Fetch from a live source, bounded by `timeout`. Timeouts and errors both
/// come back as [`FetchOutcome::Failure`]; this never returns an error.
pub async fn fetch_live(source: &dyn ContentSource, count: usize, timeout: Duration) -> FetchOutcome {
    match tokio::time::timeout(timeout, source.fetch(count)).await {
        Ok(Ok(items)) => {
            debug!(items = items.len(), "live fetch succeeded");
            FetchOutcome::Success(items)
        }
        Ok(Err(e)) => {
            warn!(error = %e, "live fetch failed");
            FetchOutcome::Failure(e.to_string())
        }
        Err(_) => {
            let e = NewsError::FetchTimeout(timeout);
            warn!(error = %e, "live fetch failed");
            FetchOutcome::Failure(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticSource(Vec<RawItem>);

    #[async_trait]
    impl ContentSource for StaticSource {
        async fn fetch(&self, count: usize) -> Result<Vec<RawItem>> {
            Ok(self.0.iter().take(count).cloned().collect())
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl ContentSource for BrokenSource {
        async fn fetch(&self, _count: usize) -> Result<Vec<RawItem>> {
            Err(NewsError::ContentSource("503 Service Unavailable".into()))
        }
    }

    struct SlowSource;

    #[async_trait]
    impl ContentSource for SlowSource {
        async fn fetch(&self, _count: usize) -> Result<Vec<RawItem>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        }
    }

    fn item(id: &str) -> RawItem {
        RawItem::new(id, "Headline", "Summary", "Wire", Utc::now())
    }

    #[tokio::test]
    async fn test_fetch_live_success_respects_count() {
        let source = StaticSource(vec![item("a"), item("b"), item("c")]);
        let outcome = fetch_live(&source, 2, Duration::from_secs(1)).await;
        match outcome {
            FetchOutcome::Success(items) => assert_eq!(items.len(), 2),
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_live_error_is_failure() {
        let outcome = fetch_live(&BrokenSource, 5, Duration::from_secs(1)).await;
        assert!(matches!(outcome, FetchOutcome::Failure(ref msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn test_fetch_live_timeout_is_failure() {
        let outcome = fetch_live(&SlowSource, 5, Duration::from_millis(10)).await;
        assert!(matches!(outcome, FetchOutcome::Failure(ref msg) if msg.contains("timed out")));
    }

    #[test]
    fn test_full_text_joins_headline_and_summary() {
        let raw = RawItem::new("x", "Mayor Resigns", "The mayor stepped down.", "Wire", Utc::now());
        assert_eq!(raw.full_text(), "Mayor Resigns. The mayor stepped down.");
    }
}
