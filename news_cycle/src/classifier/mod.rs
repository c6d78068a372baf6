//! Classifier - scores raw items for relevance, controversy, sentiment and entities.
//!
//! Classification is deterministic: the output depends only on the item text
//! and the [`Lexicon`] tables. It never fails; an item with no recognizable
//! terms classifies as all zeros.

mod entities;
mod lexicon;

pub use entities::*;
pub use lexicon::*;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::content::RawItem;

/// Gameplay category an item is inferred to belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    Scandal,
    Crisis,
    Policy,
    Election,
    Economy,
    Diplomacy,
    Community,
}

impl EventCategory {
    /// Declaration order; also the tie-break order for category inference.
    pub const ALL: [EventCategory; 7] = [
        EventCategory::Scandal,
        EventCategory::Crisis,
        EventCategory::Policy,
        EventCategory::Election,
        EventCategory::Economy,
        EventCategory::Diplomacy,
        EventCategory::Community,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EventCategory::Scandal => "Scandal",
            EventCategory::Crisis => "Crisis",
            EventCategory::Policy => "Policy",
            EventCategory::Election => "Election",
            EventCategory::Economy => "Economy",
            EventCategory::Diplomacy => "Diplomacy",
            EventCategory::Community => "Community",
        }
    }
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Issue-category tags. Stances are recorded per issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Issue {
    Economy,
    Taxes,
    Healthcare,
    Immigration,
    Environment,
    Education,
    Crime,
    Defense,
    Ethics,
    Infrastructure,
    ForeignPolicy,
    Elections,
}

impl Issue {
    pub fn name(&self) -> &'static str {
        match self {
            Issue::Economy => "economy",
            Issue::Taxes => "taxes",
            Issue::Healthcare => "healthcare",
            Issue::Immigration => "immigration",
            Issue::Environment => "environment",
            Issue::Education => "education",
            Issue::Crime => "crime",
            Issue::Defense => "defense",
            Issue::Ethics => "ethics",
            Issue::Infrastructure => "infrastructure",
            Issue::ForeignPolicy => "foreign policy",
            Issue::Elections => "elections",
        }
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Five-way sentiment bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SentimentClass {
    VeryNegative,
    Negative,
    #[default]
    Neutral,
    Positive,
    VeryPositive,
}

/// Sentiment magnitudes plus their bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Sentiment {
    pub positive: u32,
    pub negative: u32,
    pub class: SentimentClass,
}

impl Sentiment {
    pub fn from_hits(positive: u32, negative: u32) -> Self {
        let net = positive as i64 - negative as i64;
        let class = match net {
            n if n <= -3 => SentimentClass::VeryNegative,
            -2..=-1 => SentimentClass::Negative,
            0 => SentimentClass::Neutral,
            1..=2 => SentimentClass::Positive,
            _ => SentimentClass::VeryPositive,
        };
        Self {
            positive,
            negative,
            class,
        }
    }

    pub fn net(&self) -> i64 {
        self.positive as i64 - self.negative as i64
    }
}

/// A raw item annotated with derived attributes. Never mutated after
/// classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedItem {
    pub item: RawItem,
    /// 0-100.
    pub relevance: f32,
    /// 0-100.
    pub controversy: f32,
    pub sentiment: Sentiment,
    /// Topic strings in order of first appearance.
    pub topics: Vec<String>,
    /// Issue tags in order of first appearance.
    pub issues: Vec<Issue>,
    /// Entities, most prominent first.
    pub entities: Vec<Entity>,
    pub category: EventCategory,
    /// Distinct matched keywords, for caching and persistence.
    pub keywords: Vec<String>,
}

impl ClassifiedItem {
    /// First entity of a kind, by prominence.
    pub fn first_entity(&self, kind: EntityKind) -> Option<&Entity> {
        self.entities.iter().find(|e| e.kind == kind)
    }

    /// The most prominent entity of any kind.
    pub fn primary_entity(&self) -> Option<&Entity> {
        self.entities.first()
    }

    pub fn has_issue(&self, issue: Issue) -> bool {
        self.issues.contains(&issue)
    }
}

/// Lowercase word tokens of a text.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '\''))
        .map(|w| w.trim_matches(|c| c == '-' || c == '\''))
        .map(|w| w.strip_suffix("'s").unwrap_or(w))
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

/// Scores raw items against a [`Lexicon`].
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    lexicon: Lexicon,
}

impl Classifier {
    /// Create a classifier with the default tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a classifier with custom tables.
    pub fn with_lexicon(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Classify a raw item.
    pub fn classify(&self, item: &RawItem) -> ClassifiedItem {
        let tokens = tokenize(&item.full_text());
        let mut keywords: Vec<String> = Vec::new();

        let relevance_hits = weighted_hits(&self.lexicon.relevance, &tokens, &mut keywords);
        let relevance = if self.lexicon.relevance_saturation > 0.0 {
            (relevance_hits / self.lexicon.relevance_saturation * 100.0).min(100.0)
        } else {
            0.0
        };

        let controversy = weighted_hits(&self.lexicon.controversy, &tokens, &mut keywords).min(100.0);

        let positive = count_hits(&self.lexicon.positive, &tokens);
        let negative = count_hits(&self.lexicon.negative, &tokens);
        let sentiment = Sentiment::from_hits(positive, negative);

        let mut topics: Vec<String> = Vec::new();
        let mut issues: Vec<Issue> = Vec::new();
        for token in &tokens {
            for term in &self.lexicon.topics {
                if term_matches(&term.pattern, token) {
                    if !topics.contains(&term.topic) {
                        topics.push(term.topic.clone());
                    }
                    if !issues.contains(&term.issue) {
                        issues.push(term.issue);
                    }
                }
            }
        }

        let category = self.infer_category(&tokens, controversy);
        let entities = extract_entities(&self.lexicon, &item.headline, &item.summary);

        trace!(
            item_id = %item.id,
            relevance,
            controversy,
            ?category,
            entities = entities.len(),
            "classified item"
        );

        ClassifiedItem {
            item: item.clone(),
            relevance,
            controversy,
            sentiment,
            topics,
            issues,
            entities,
            category,
            keywords,
        }
    }

    /// Pick the category whose lexicon matches most. Controversial items lean
    /// toward Scandal. Ties go to declaration order; no hits at all means Policy.
    fn infer_category(&self, tokens: &[String], controversy: f32) -> EventCategory {
        let mut best = EventCategory::Policy;
        let mut best_score = 0.0_f32;

        for category in EventCategory::ALL {
            let Some((_, patterns)) = self.lexicon.categories.iter().find(|(c, _)| *c == category) else {
                continue;
            };
            let mut score = count_hits(patterns, tokens) as f32;
            if category == EventCategory::Scandal && score > 0.0 && controversy >= 50.0 {
                score += controversy / 50.0;
            }
            if score > best_score {
                best = category;
                best_score = score;
            }
        }
        best
    }
}

fn weighted_hits(terms: &[Term], tokens: &[String], matched: &mut Vec<String>) -> f32 {
    let mut total = 0.0;
    for token in tokens {
        for term in terms {
            if term.matches(token) {
                total += term.weight;
                if !matched.contains(token) {
                    matched.push(token.clone());
                }
            }
        }
    }
    total
}

fn count_hits(patterns: &[String], tokens: &[String]) -> u32 {
    tokens
        .iter()
        .filter(|t| patterns.iter().any(|p| term_matches(p, t)))
        .count() as u32
}
