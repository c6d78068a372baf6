//! Template matching - picks catalog entries that fit a classified item.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EventTemplate, TemplateCatalog};
use crate::classifier::ClassifiedItem;

/// How the matcher ranks eligible templates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchWeights {
    /// Per point of item relevance.
    pub relevance: f32,
    /// Per required issue the item carries.
    pub issue_overlap: f32,
    /// Per point of controversy above the template's minimum.
    pub controversy_margin: f32,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            relevance: 0.5,
            issue_overlap: 10.0,
            controversy_margin: 0.25,
        }
    }
}

/// An eligible template with its score.
#[derive(Debug, Clone, Copy)]
pub struct TemplateMatch<'a> {
    pub template: &'a EventTemplate,
    pub score: f32,
}

/// Matches classified items against an immutable catalog.
#[derive(Debug, Clone, Default)]
pub struct TemplateMatcher {
    catalog: TemplateCatalog,
    weights: MatchWeights,
}

impl TemplateMatcher {
    pub fn new(catalog: TemplateCatalog) -> Self {
        Self {
            catalog,
            weights: MatchWeights::default(),
        }
    }

    pub fn with_weights(mut self, weights: MatchWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    /// Whether a template accepts an item at all.
    pub fn is_eligible(template: &EventTemplate, item: &ClassifiedItem) -> bool {
        template.category == item.category
            && item.relevance >= template.min_relevance
            && item.controversy >= template.min_controversy
            && (template.required_issues.is_empty() || template.issue_overlap(&item.issues) > 0)
    }

    fn score(&self, template: &EventTemplate, item: &ClassifiedItem) -> f32 {
        item.relevance * self.weights.relevance
            + template.issue_overlap(&item.issues) as f32 * self.weights.issue_overlap
            + (item.controversy - template.min_controversy) * self.weights.controversy_margin
    }

    /// All eligible templates, best first. Equal scores keep catalog order.
    pub fn find_matches<'a>(&'a self, item: &ClassifiedItem) -> Vec<TemplateMatch<'a>> {
        let mut matches: Vec<TemplateMatch<'a>> = self
            .catalog
            .templates()
            .iter()
            .filter(|t| Self::is_eligible(t, item))
            .map(|template| TemplateMatch {
                template,
                score: self.score(template, item),
            })
            .collect();

        // Stable sort keeps declaration order for ties.
        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        matches
    }

    /// The single best template, or `None` when nothing is eligible.
    pub fn find_best_match(&self, item: &ClassifiedItem) -> Option<&EventTemplate> {
        let best = self.find_matches(item).into_iter().next().map(|m| m.template);
        debug!(
            item_id = %item.item.id,
            category = %item.category,
            template = best.map(|t| t.id.as_str()).unwrap_or("<generic>"),
            "template match"
        );
        best
    }
}
