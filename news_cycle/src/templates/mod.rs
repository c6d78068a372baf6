//! Event templates - catalog entries that turn classified items into game events.
//!
//! The catalog is an immutable value built once and handed to the
//! [`TemplateMatcher`]; nothing is registered globally.

mod catalog;
mod injector;
mod matcher;

pub use injector::*;
pub use matcher::*;

use campaign_rules::{OfficeTier, ResourceDeltas};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::classifier::{EntityKind, EventCategory, Issue};
use crate::error::{NewsError, Result};
use crate::events::ResponseOption;

/// Abstract classification of what the event asks of the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventClassification {
    Crisis,
    Scandal,
    Policy,
    Opportunity,
    Informational,
}

/// How quickly an event demands attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Urgency {
    Breaking,
    Urgent,
    Normal,
    Informational,
}

/// Semantic type a placeholder expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaceholderKind {
    Person,
    Organization,
    Location,
    Topic,
}

impl PlaceholderKind {
    /// The entity type that can fill this placeholder, if any.
    pub fn entity_kind(&self) -> Option<EntityKind> {
        match self {
            PlaceholderKind::Person => Some(EntityKind::Person),
            PlaceholderKind::Organization => Some(EntityKind::Organization),
            PlaceholderKind::Location => Some(EntityKind::Location),
            PlaceholderKind::Topic => None,
        }
    }
}

/// A named slot in template text, written `{name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placeholder {
    pub name: String,
    pub kind: PlaceholderKind,
    /// Used when nothing in the item resolves the slot.
    pub fallback: String,
}

impl Placeholder {
    pub fn new(name: impl Into<String>, kind: PlaceholderKind, fallback: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            fallback: fallback.into(),
        }
    }
}

/// How a template's effect grows with office tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum TierScaling {
    /// The tier's own multiplier curve.
    #[default]
    Standard,
    /// The same effect at every tier.
    Flat,
    /// `1.0 + per_tier * level`.
    Linear { per_tier: f32 },
    /// Explicit multiplier per tier level; the last entry covers higher tiers.
    Curve(Vec<f32>),
}

impl TierScaling {
    /// Multiplier for a tier. Never decreases as the tier rises: curves are
    /// read as a running maximum and negative slopes are treated as flat.
    pub fn multiplier(&self, tier: OfficeTier) -> f32 {
        match self {
            TierScaling::Standard => tier.effect_multiplier(),
            TierScaling::Flat => 1.0,
            TierScaling::Linear { per_tier } => 1.0 + per_tier.max(0.0) * tier.level() as f32,
            TierScaling::Curve(points) => {
                if points.is_empty() {
                    return 1.0;
                }
                let upto = tier.level().min(points.len() - 1);
                points[..=upto].iter().copied().fold(f32::MIN, f32::max)
            }
        }
    }
}

/// A catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventTemplate {
    pub id: String,
    pub category: EventCategory,
    pub classification: EventClassification,
    pub min_relevance: f32,
    pub min_controversy: f32,
    /// When non-empty, at least one must be present on the item.
    #[serde(default)]
    pub required_issues: Vec<Issue>,
    pub headline: String,
    pub description: String,
    pub context: String,
    #[serde(default)]
    pub placeholders: Vec<Placeholder>,
    pub base_effect: ResourceDeltas,
    pub urgency: Urgency,
    #[serde(default)]
    pub tier_scaling: TierScaling,
    /// Options offered in addition to the classification's standard menu.
    #[serde(default)]
    pub extra_options: Vec<ResponseOption>,
}

impl EventTemplate {
    /// Required issues the item actually carries.
    pub fn issue_overlap(&self, issues: &[Issue]) -> usize {
        self.required_issues.iter().filter(|i| issues.contains(i)).count()
    }
}

/// The immutable template catalog, in declaration order.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: Vec<EventTemplate>,
}

impl TemplateCatalog {
    /// Build a catalog, rejecting duplicate template ids.
    pub fn new(templates: Vec<EventTemplate>) -> Result<Self> {
        let mut seen = HashSet::new();
        for template in &templates {
            if !seen.insert(template.id.as_str()) {
                return Err(NewsError::InvalidConfig(format!(
                    "duplicate template id '{}'",
                    template.id
                )));
            }
        }
        Ok(Self { templates })
    }

    /// The catalog shipped with the crate.
    pub fn builtin() -> Self {
        Self {
            templates: catalog::builtin_templates(),
        }
    }

    /// Parse a catalog from a JSON array of templates.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let templates: Vec<EventTemplate> = serde_json::from_str(json)?;
        Self::new(templates)
    }

    pub fn templates(&self) -> &[EventTemplate] {
        &self.templates
    }

    pub fn get(&self, id: &str) -> Option<&EventTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// The lowest relevance any template accepts.
    pub fn lowest_relevance_threshold(&self) -> Option<f32> {
        self.templates
            .iter()
            .map(|t| t.min_relevance)
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
