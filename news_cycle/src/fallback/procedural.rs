//! Procedural generator - synthesizes plausible items from game context.
//!
//! Never reads the live source. Output is reproducible for a given seed and
//! sequence of calls.

use campaign_rules::{OfficeTier, PlayerContext};
use chrono::{DateTime, Duration, Utc};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::classifier::EventCategory;
use crate::content::RawItem;

/// The slice of player state generation depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationContext {
    pub tier: OfficeTier,
    pub approval: f32,
    pub turns_to_election: Option<u32>,
    pub turn: u32,
}

impl GenerationContext {
    pub fn from_player<P: PlayerContext + ?Sized>(player: &P) -> Self {
        Self {
            tier: player.office_tier(),
            approval: player.approval(),
            turns_to_election: player.turns_to_election(),
            turn: player.turn(),
        }
    }
}

struct Pattern {
    headline: &'static str,
    summary: &'static str,
}

const SCANDAL: &[Pattern] = &[
    Pattern {
        headline: "{title} {name} faces bribery allegations",
        summary: "{title} {name} said the corruption probe in {place} was politically motivated after leaked records surfaced.",
    },
    Pattern {
        headline: "Fraud scandal engulfs {place} officials",
        summary: "{title} {name} said investigators would review accusations of misconduct.",
    },
];

const CRISIS: &[Pattern] = &[
    Pattern {
        headline: "Flooding forces evacuations in {place}",
        summary: "{title} {name} said state officials declared an emergency as the crisis deepened.",
    },
    Pattern {
        headline: "Power shortage leaves {place} in the dark",
        summary: "{title} {name} said city officials were scrambling as the outage became a crisis.",
    },
];

const POLICY: &[Pattern] = &[Pattern {
    headline: "Lawmakers weigh {topic} reform bill",
    summary: "{title} {name} said the bill would reshape {topic} policy across {place}.",
}];

const ELECTION: &[Pattern] = &[
    Pattern {
        headline: "New poll shows tight race in {place}",
        summary: "{title} {name} said the campaign will court voters as the election nears.",
    },
    Pattern {
        headline: "Debate night looms for {place} candidates",
        summary: "{title} {name} said voters deserve answers before the ballot is printed.",
    },
];

const ECONOMY: &[Pattern] = &[Pattern {
    headline: "Jobs report rattles the {place} economy",
    summary: "{title} {name} said the budget must address inflation as wages stall.",
}];

const DIPLOMACY: &[Pattern] = &[Pattern {
    headline: "Trade summit opens with foreign allies",
    summary: "{title} {name} said state diplomats would press treaty talks on tariffs and sanctions.",
}];

const COMMUNITY: &[Pattern] = &[Pattern {
    headline: "Festival draws volunteers to {place}",
    summary: "{title} {name} said the local parade and library fair showed neighborhood pride.",
}];

const NAMES: &[&str] = &[
    "Alvarez", "Brennan", "Okafor", "Whitaker", "Novak", "Reyes", "Lindqvist", "Moreau",
];

const PLACES: &[&str] = &[
    "Cedar Valley",
    "Riverside County",
    "Harbor District",
    "Lake City",
    "Pine Heights",
    "Mill River",
];

const TOPICS: &[&str] = &["healthcare", "education", "climate", "school funding", "tax"];

fn patterns(category: EventCategory) -> &'static [Pattern] {
    match category {
        EventCategory::Scandal => SCANDAL,
        EventCategory::Crisis => CRISIS,
        EventCategory::Policy => POLICY,
        EventCategory::Election => ELECTION,
        EventCategory::Economy => ECONOMY,
        EventCategory::Diplomacy => DIPLOMACY,
        EventCategory::Community => COMMUNITY,
    }
}

/// The officeholders stories at this tier tend to be about.
fn title_for(tier: OfficeTier) -> &'static str {
    match tier {
        OfficeTier::CityCouncil => "Councilmember",
        OfficeTier::Mayor => "Mayor",
        OfficeTier::StateLegislator => "Senator",
        OfficeTier::Governor => "Governor",
        OfficeTier::Representative => "Congresswoman",
        OfficeTier::Senator => "Senator",
        OfficeTier::President => "President",
    }
}

/// Category weights for a context. Elections dominate near the vote, low
/// approval invites scandal and crisis, and foreign affairs matter nationally.
pub fn category_weights(ctx: &GenerationContext) -> Vec<(EventCategory, f32)> {
    EventCategory::ALL
        .iter()
        .map(|category| {
            let weight = match category {
                EventCategory::Election => match ctx.turns_to_election {
                    Some(turns) if turns <= 6 => 4.0,
                    Some(_) => 1.0,
                    None => 0.5,
                },
                EventCategory::Scandal | EventCategory::Crisis => {
                    1.0 + ((50.0 - ctx.approval) / 25.0).max(0.0)
                }
                EventCategory::Diplomacy => {
                    if ctx.tier.is_national() {
                        1.5
                    } else {
                        0.2
                    }
                }
                EventCategory::Community => {
                    if ctx.tier.level() <= OfficeTier::Mayor.level() {
                        2.0
                    } else {
                        0.5
                    }
                }
                EventCategory::Policy | EventCategory::Economy => 1.0,
            };
            (*category, weight)
        })
        .collect()
}

/// Seeded generator of synthetic items.
#[derive(Debug, Clone)]
pub struct ProceduralGenerator {
    rng: ChaCha8Rng,
    disabled: Vec<EventCategory>,
    generated: u64,
}

impl ProceduralGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            disabled: Vec::new(),
            generated: 0,
        }
    }

    /// Never generate these categories.
    pub fn with_disabled(mut self, disabled: Vec<EventCategory>) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn generated_count(&self) -> u64 {
        self.generated
    }

    /// Continue numbering past ids already handed out, such as ones restored
    /// from a saved cache.
    pub fn resume_after<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        let highest = ids.into_iter().filter_map(sequence_of).max().unwrap_or(0);
        if highest > self.generated {
            debug!(from = self.generated, to = highest, "resuming procedural ids");
            self.generated = highest;
        }
    }

    /// Generate up to `count` items. Returns fewer only when every category
    /// is disabled.
    pub fn generate(&mut self, ctx: &GenerationContext, count: usize, now: DateTime<Utc>) -> Vec<RawItem> {
        let weighted: Vec<(EventCategory, f32)> = category_weights(ctx)
            .into_iter()
            .filter(|(category, _)| !self.disabled.contains(category))
            .collect();
        let Ok(distribution) = WeightedIndex::new(weighted.iter().map(|(_, w)| *w)) else {
            return Vec::new();
        };

        let items: Vec<RawItem> = (0..count)
            .map(|_| {
                let category = weighted[distribution.sample(&mut self.rng)].0;
                self.generate_one(category, ctx, now)
            })
            .collect();
        debug!(count = items.len(), turn = ctx.turn, "generated procedural items");
        items
    }

    /// Generate one item of a given category.
    pub fn generate_one(&mut self, category: EventCategory, ctx: &GenerationContext, now: DateTime<Utc>) -> RawItem {
        let pattern = patterns(category)
            .choose(&mut self.rng)
            .unwrap_or(&POLICY[0]);
        let name = NAMES.choose(&mut self.rng).copied().unwrap_or("Alvarez");
        let place = PLACES.choose(&mut self.rng).copied().unwrap_or("Lake City");
        let topic = TOPICS.choose(&mut self.rng).copied().unwrap_or("healthcare");
        let title = title_for(ctx.tier);

        let fill = |text: &str| {
            text.replace("{title}", title)
                .replace("{name}", name)
                .replace("{place}", place)
                .replace("{topic}", topic)
        };
        let headline = capitalize(&fill(pattern.headline));
        let summary = fill(pattern.summary);
        let minutes_ago = self.rng.gen_range(5..240);

        self.generated += 1;
        RawItem::new(
            format!("{}{}-{}", ID_PREFIX, ctx.turn, self.generated),
            headline,
            summary,
            "Procedural Desk",
            now - Duration::minutes(minutes_ago),
        )
    }
}

/// `procedural-{turn}-{sequence}`
const ID_PREFIX: &str = "procedural-";

fn sequence_of(id: &str) -> Option<u64> {
    id.strip_prefix(ID_PREFIX)?.rsplit('-').next()?.parse().ok()
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
