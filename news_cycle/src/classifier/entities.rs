//! Named-entity extraction from capitalization and adjacency.
//!
//! A run of capitalized words that are not keywords or stopwords is a
//! candidate entity. Its type comes from a preceding title ("Senator"), a
//! marker word inside the run ("Party", "County"), a preceding preposition
//! ("in Ohio") or the verb that follows it ("Smith said").

use serde::{Deserialize, Serialize};

use super::lexicon::Lexicon;

/// Semantic type of an extracted entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Person,
    Organization,
    Location,
}

/// An entity mentioned in an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub kind: EntityKind,
    /// Relative prominence within the item, 0.0 - 1.0.
    pub weight: f32,
}

/// Where a word sits, for weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Headline,
    Body,
}

#[derive(Debug)]
struct Mention {
    name: String,
    kind: EntityKind,
    section: Section,
}

#[derive(Debug, Default)]
struct Run {
    words: Vec<String>,
    titled: bool,
    preceding: Option<String>,
    sentence_initial: bool,
}

/// Extract entities from a headline and summary. Headline mentions count
/// double. The result is sorted by weight, heaviest first; ties keep first
/// appearance order.
pub fn extract_entities(lexicon: &Lexicon, headline: &str, summary: &str) -> Vec<Entity> {
    let mut mentions = Vec::new();
    scan(lexicon, headline, Section::Headline, &mut mentions);
    scan(lexicon, summary, Section::Body, &mut mentions);

    // Merge mentions by (name, kind), keeping first-appearance order.
    let mut merged: Vec<(String, EntityKind, f32)> = Vec::new();
    for mention in mentions {
        let score = match mention.section {
            Section::Headline => 2.0,
            Section::Body => 1.0,
        };
        match merged
            .iter_mut()
            .find(|(name, kind, _)| *name == mention.name && *kind == mention.kind)
        {
            Some(entry) => entry.2 += score,
            None => merged.push((mention.name, mention.kind, score)),
        }
    }

    let max = merged.iter().map(|(_, _, s)| *s).fold(0.0_f32, f32::max);
    let mut entities: Vec<Entity> = merged
        .into_iter()
        .map(|(name, kind, score)| Entity {
            name,
            kind,
            weight: if max > 0.0 { score / max } else { 0.0 },
        })
        .collect();

    // Stable sort keeps declaration order for ties.
    entities.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(std::cmp::Ordering::Equal));
    entities
}

fn scan(lexicon: &Lexicon, text: &str, section: Section, out: &mut Vec<Mention>) {
    let mut run = Run::default();
    let mut titled_next = false;
    let mut previous: Option<String> = None;
    let mut sentence_start = true;

    for raw in text.split_whitespace() {
        let word = raw.trim_matches(|c: char| !c.is_alphanumeric() && c != '.' && c != '-' && c != '\'');
        let word = word.trim_end_matches("'s").trim_end_matches('\'');
        let lower = word.to_lowercase();
        let bare_lower = lower.trim_end_matches('.').to_string();
        let ends_sentence = ends_sentence(raw, &lower, lexicon);
        let breaks_run = ends_sentence || raw.ends_with(',') || raw.ends_with(';') || raw.ends_with(':');

        if lexicon.person_titles.contains(&lower) || lexicon.person_titles.contains(&bare_lower) {
            flush(lexicon, &mut run, Some(&bare_lower), section, out);
            titled_next = is_capitalized(word);
            previous = Some(bare_lower);
            sentence_start = ends_sentence;
            continue;
        }

        if is_candidate(lexicon, word, &bare_lower) {
            if run.words.is_empty() {
                run.titled = titled_next;
                run.preceding = previous.clone();
                run.sentence_initial = sentence_start;
            }
            run.words.push(word.trim_end_matches('.').to_string());
        } else {
            flush(lexicon, &mut run, Some(&bare_lower), section, out);
        }

        if breaks_run {
            flush(lexicon, &mut run, None, section, out);
        }

        titled_next = false;
        previous = Some(bare_lower);
        sentence_start = ends_sentence;
    }
    flush(lexicon, &mut run, None, section, out);
}

fn ends_sentence(raw: &str, lower: &str, lexicon: &Lexicon) -> bool {
    let terminal = raw.ends_with('.') || raw.ends_with('!') || raw.ends_with('?');
    // "Sen." and friends are abbreviations, not sentence ends.
    terminal && !lexicon.person_titles.iter().any(|t| t.ends_with('.') && t == lower)
}

fn is_capitalized(word: &str) -> bool {
    word.chars().next().map(|c| c.is_uppercase()).unwrap_or(false)
}

fn is_candidate(lexicon: &Lexicon, word: &str, lower: &str) -> bool {
    if !is_capitalized(word) || lower.len() < 2 {
        return false;
    }
    if lexicon.stopwords.iter().any(|s| s == lower)
        || lexicon.person_verbs.iter().any(|v| v == lower)
        || lexicon.organization_verbs.iter().any(|v| v == lower)
    {
        return false;
    }
    is_marker(lexicon, lower) || !lexicon.is_keyword(lower)
}

fn is_marker(lexicon: &Lexicon, lower: &str) -> bool {
    lexicon.organization_markers.iter().any(|m| m == lower)
        || lexicon.location_markers.iter().any(|m| m == lower)
}

fn flush(
    lexicon: &Lexicon,
    run: &mut Run,
    following: Option<&str>,
    section: Section,
    out: &mut Vec<Mention>,
) {
    if run.words.is_empty() {
        return;
    }
    let current = std::mem::take(run);
    let lowered: Vec<String> = current.words.iter().map(|w| w.to_lowercase()).collect();

    // A run of nothing but marker words ("City Council") names no one.
    if lowered.iter().all(|w| is_marker(lexicon, w)) {
        return;
    }

    let kind = if current.titled {
        Some(EntityKind::Person)
    } else if lowered
        .iter()
        .any(|w| lexicon.organization_markers.contains(w))
    {
        Some(EntityKind::Organization)
    } else if lowered
        .last()
        .map(|w| lexicon.location_markers.contains(w))
        .unwrap_or(false)
        || current
            .preceding
            .as_ref()
            .map(|p| lexicon.location_prepositions.contains(p))
            .unwrap_or(false)
    {
        Some(EntityKind::Location)
    } else if following
        .map(|f| lexicon.person_verbs.iter().any(|v| v == f))
        .unwrap_or(false)
    {
        Some(EntityKind::Person)
    } else if following
        .map(|f| lexicon.organization_verbs.iter().any(|v| v == f))
        .unwrap_or(false)
    {
        Some(EntityKind::Organization)
    } else if current.words.len() >= 2 {
        // First and last name.
        Some(EntityKind::Person)
    } else if current.sentence_initial {
        // A lone capitalized word opening a sentence is just capitalization.
        None
    } else {
        Some(EntityKind::Organization)
    };

    if let Some(kind) = kind {
        out.push(Mention {
            name: current.words.join(" "),
            kind,
            section,
        });
    }
}
