//! Placeholder substitution.

use std::collections::BTreeMap;

use super::{EventTemplate, Placeholder};
use crate::classifier::ClassifiedItem;

/// Words a title-cased headline leaves lowercase.
const MINOR_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "by", "for", "in", "of", "on", "or", "the", "to", "vs",
];

/// Template text with every placeholder resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectedText {
    pub headline: String,
    pub description: String,
    pub context: String,
}

/// Resolves template placeholders from a classified item.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableInjector;

impl VariableInjector {
    pub fn new() -> Self {
        Self
    }

    /// Value for one placeholder: the heaviest entity of the matching type,
    /// then the first topic (or issue name), then the placeholder's fallback.
    /// Topic placeholders skip the entity step.
    pub fn resolve(&self, placeholder: &Placeholder, item: &ClassifiedItem) -> String {
        if let Some(kind) = placeholder.kind.entity_kind() {
            if let Some(entity) = item.first_entity(kind) {
                return entity.name.clone();
            }
        }
        if let Some(topic) = item.topics.first() {
            return topic.clone();
        }
        if let Some(issue) = item.issues.first() {
            return issue.name().to_string();
        }
        placeholder.fallback.clone()
    }

    /// Fill all text fields of a template.
    pub fn inject(&self, template: &EventTemplate, item: &ClassifiedItem) -> InjectedText {
        let values: BTreeMap<String, String> = template
            .placeholders
            .iter()
            .map(|p| (p.name.clone(), self.resolve(p, item)))
            .collect();

        let headline = if is_title_case(&template.headline) {
            let titled: BTreeMap<String, String> = values
                .iter()
                .map(|(name, value)| (name.clone(), title_case(value)))
                .collect();
            Self::fill(&template.headline, &titled)
        } else {
            Self::fill(&template.headline, &values)
        };

        InjectedText {
            headline,
            description: Self::fill(&template.description, &values),
            context: Self::fill(&template.context, &values),
        }
    }

    /// Replace `{name}` occurrences. Unknown names and unmatched braces are
    /// left as written.
    pub fn fill(text: &str, values: &BTreeMap<String, String>) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    let name = &after[..close];
                    match values.get(name) {
                        Some(value) => out.push_str(value),
                        None => {
                            out.push('{');
                            out.push_str(name);
                            out.push('}');
                        }
                    }
                    rest = &after[close + 1..];
                }
                None => {
                    out.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// Every literal word outside `{placeholders}` is capitalized or minor.
fn is_title_case(text: &str) -> bool {
    let mut words = text
        .split_whitespace()
        .filter(|w| !w.starts_with('{'))
        .filter_map(|w| w.chars().next().map(|first| (w, first)))
        .filter(|(_, first)| first.is_alphabetic())
        .peekable();
    if words.peek().is_none() {
        return false;
    }
    words.all(|(word, first)| first.is_uppercase() || MINOR_WORDS.contains(&word.to_lowercase().as_str()))
}

fn title_case(value: &str) -> String {
    value
        .split(' ')
        .map(|word| {
            if MINOR_WORDS.contains(&word) {
                return word.to_string();
            }
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
