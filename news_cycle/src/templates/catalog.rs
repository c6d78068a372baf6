//! The built-in template catalog.

use campaign_rules::{AlignmentRange, Resource, ResourceDeltas};

use super::{EventClassification, EventTemplate, Placeholder, PlaceholderKind, TierScaling, Urgency};
use crate::classifier::{EventCategory, Issue};
use crate::consequences::Stance;
use crate::events::{Outcome, ResponseOption};

fn deltas(entries: &[(Resource, f32)]) -> ResourceDeltas {
    entries.iter().copied().collect()
}

fn person(fallback: &str) -> Placeholder {
    Placeholder::new("person", PlaceholderKind::Person, fallback)
}

fn organization(fallback: &str) -> Placeholder {
    Placeholder::new("organization", PlaceholderKind::Organization, fallback)
}

fn location(fallback: &str) -> Placeholder {
    Placeholder::new("location", PlaceholderKind::Location, fallback)
}

fn topic(fallback: &str) -> Placeholder {
    Placeholder::new("topic", PlaceholderKind::Topic, fallback)
}

/// Option available only to progressives on the economic axis.
fn progressive_gate() -> AlignmentRange {
    AlignmentRange {
        economic: (-100.0, -30.0),
        social: (-100.0, 100.0),
    }
}

/// Option available only to conservatives on the economic axis.
fn conservative_gate() -> AlignmentRange {
    AlignmentRange {
        economic: (30.0, 100.0),
        social: (-100.0, 100.0),
    }
}

pub(super) fn builtin_templates() -> Vec<EventTemplate> {
    vec![
        EventTemplate {
            id: "scandal_bribery".into(),
            category: EventCategory::Scandal,
            classification: EventClassification::Scandal,
            min_relevance: 10.0,
            min_controversy: 50.0,
            required_issues: vec![Issue::Ethics],
            headline: "{person} Faces {topic} Allegations".into(),
            description: "Reports tie {person} to {topic} involving {organization}. \
                          Reporters want to know where you stand."
                .into(),
            context: "Ethics stories stick to everyone nearby. Silence reads as complicity.".into(),
            placeholders: vec![
                person("A Prominent Official"),
                topic("corruption"),
                organization("a major donor"),
            ],
            base_effect: deltas(&[(Resource::Trust, -15.0), (Resource::MediaFavor, -5.0)]),
            urgency: Urgency::Breaking,
            tier_scaling: TierScaling::Standard,
            extra_options: Vec::new(),
        },
        EventTemplate {
            id: "scandal_misconduct".into(),
            category: EventCategory::Scandal,
            classification: EventClassification::Scandal,
            min_relevance: 15.0,
            min_controversy: 35.0,
            required_issues: Vec::new(),
            headline: "Misconduct Claims Engulf {person}".into(),
            description: "New claims about {person} are spreading quickly. \
                          Allies are being asked to pick a side."
                .into(),
            context: "The story is still developing; early statements will be remembered.".into(),
            placeholders: vec![person("A Senior Aide")],
            base_effect: deltas(&[(Resource::Trust, -8.0), (Resource::PartyLoyalty, -3.0)]),
            urgency: Urgency::Urgent,
            tier_scaling: TierScaling::Standard,
            extra_options: Vec::new(),
        },
        EventTemplate {
            id: "crisis_disaster".into(),
            category: EventCategory::Crisis,
            classification: EventClassification::Crisis,
            min_relevance: 10.0,
            min_controversy: 0.0,
            required_issues: Vec::new(),
            headline: "Emergency in {location}: Residents Demand Answers".into(),
            description: "Crews are stretched thin in {location}. \
                          Every hour without a plan costs you."
                .into(),
            context: "Crisis response is judged on speed first and competence second.".into(),
            placeholders: vec![location("the District")],
            base_effect: deltas(&[(Resource::Approval, -8.0), (Resource::Trust, -4.0)]),
            urgency: Urgency::Breaking,
            tier_scaling: TierScaling::Standard,
            extra_options: Vec::new(),
        },
        EventTemplate {
            id: "crisis_public_safety".into(),
            category: EventCategory::Crisis,
            classification: EventClassification::Crisis,
            min_relevance: 15.0,
            min_controversy: 10.0,
            required_issues: vec![Issue::Crime],
            headline: "{topic} Fears Grip {location}".into(),
            description: "A spike in {topic} concerns has residents of {location} on edge.".into(),
            context: "Voters want visible action on safety.".into(),
            placeholders: vec![topic("public safety"), location("the City")],
            base_effect: deltas(&[(Resource::Approval, -6.0)]),
            urgency: Urgency::Urgent,
            tier_scaling: TierScaling::Linear { per_tier: 0.15 },
            extra_options: Vec::new(),
        },
        EventTemplate {
            id: "policy_reform".into(),
            category: EventCategory::Policy,
            classification: EventClassification::Policy,
            min_relevance: 20.0,
            min_controversy: 0.0,
            required_issues: vec![
                Issue::Healthcare,
                Issue::Education,
                Issue::Environment,
                Issue::Taxes,
            ],
            headline: "{topic} Overhaul Heads to a Vote".into(),
            description: "A sweeping {topic} package is moving, backed by {organization}. \
                          Your position will be on the record."
                .into(),
            context: "Reform votes define a record for years.".into(),
            placeholders: vec![topic("reform"), organization("a coalition of lawmakers")],
            base_effect: deltas(&[(Resource::PoliticalCapital, -4.0), (Resource::PartyLoyalty, 2.0)]),
            urgency: Urgency::Normal,
            tier_scaling: TierScaling::Standard,
            extra_options: vec![ResponseOption::new("push_further", "Push Further", 0.5)
                .with_description("Demand a bolder version of the bill.")
                .with_stance(Stance::Support, 2.0)
                .with_gate(progressive_gate())
                .with_cost(deltas(&[(Resource::PoliticalCapital, 5.0)]))
                .on_success(Outcome::new(1.0).with_bonus(deltas(&[
                    (Resource::PartyLoyalty, 5.0),
                    (Resource::Approval, 2.0),
                ])))
                .on_failure(Outcome::new(1.0).with_bonus(deltas(&[(Resource::Approval, -3.0)])))],
        },
        EventTemplate {
            id: "policy_bill".into(),
            category: EventCategory::Policy,
            classification: EventClassification::Policy,
            min_relevance: 15.0,
            min_controversy: 0.0,
            required_issues: Vec::new(),
            headline: "Lawmakers Weigh New {topic} Bill".into(),
            description: "A bill on {topic} is gathering votes. {person} is whipping support.".into(),
            context: "Routine legislation, but votes are remembered at election time.".into(),
            placeholders: vec![topic("spending"), person("The Majority Leader")],
            base_effect: deltas(&[(Resource::PoliticalCapital, -2.0)]),
            urgency: Urgency::Normal,
            tier_scaling: TierScaling::Flat,
            extra_options: Vec::new(),
        },
        EventTemplate {
            id: "election_attack".into(),
            category: EventCategory::Election,
            classification: EventClassification::Scandal,
            min_relevance: 15.0,
            min_controversy: 30.0,
            required_issues: Vec::new(),
            headline: "Opponents Hammer {person} Over {topic}".into(),
            description: "Attack ads about {topic} are running across {location}.".into(),
            context: "Negative campaigning works when it goes unanswered.".into(),
            placeholders: vec![person("Your Campaign"), topic("your record"), location("the State")],
            base_effect: deltas(&[(Resource::Approval, -6.0), (Resource::Funds, -5.0)]),
            urgency: Urgency::Urgent,
            tier_scaling: TierScaling::Standard,
            extra_options: Vec::new(),
        },
        EventTemplate {
            id: "election_poll".into(),
            category: EventCategory::Election,
            classification: EventClassification::Opportunity,
            min_relevance: 20.0,
            min_controversy: 0.0,
            required_issues: Vec::new(),
            headline: "New Poll Shakes Up the Race in {location}".into(),
            description: "Fresh numbers from {organization} show voters moving on {topic}.".into(),
            context: "Momentum is a resource; it fades if unused.".into(),
            placeholders: vec![
                location("the State"),
                organization("an independent pollster"),
                topic("the economy"),
            ],
            base_effect: deltas(&[(Resource::Approval, 3.0), (Resource::Funds, 5.0)]),
            urgency: Urgency::Normal,
            tier_scaling: TierScaling::Standard,
            extra_options: Vec::new(),
        },
        EventTemplate {
            id: "economy_downturn".into(),
            category: EventCategory::Economy,
            classification: EventClassification::Policy,
            min_relevance: 10.0,
            min_controversy: 0.0,
            required_issues: vec![Issue::Economy, Issue::Taxes],
            headline: "{topic} Worries Mount in {location}".into(),
            description: "Families in {location} are feeling the squeeze on {topic}.".into(),
            context: "Economic pain is blamed on whoever is in office.".into(),
            placeholders: vec![topic("cost of living"), location("the Region")],
            base_effect: deltas(&[(Resource::Approval, -5.0)]),
            urgency: Urgency::Normal,
            tier_scaling: TierScaling::Standard,
            extra_options: vec![ResponseOption::new("cut_taxes", "Cut Taxes", 0.6)
                .with_description("Promise immediate tax relief.")
                .with_stance(Stance::Oppose, 1.5)
                .with_gate(conservative_gate())
                .with_cost(deltas(&[(Resource::PoliticalCapital, 4.0)]))
                .on_success(
                    Outcome::new(0.3)
                        .with_bonus(deltas(&[(Resource::PartyLoyalty, 4.0)]))
                        .with_deferred(3, deltas(&[(Resource::Approval, 4.0)])),
                )
                .on_failure(Outcome::new(1.0).with_bonus(deltas(&[(Resource::Trust, -3.0)])))],
        },
        EventTemplate {
            id: "economy_boom".into(),
            category: EventCategory::Economy,
            classification: EventClassification::Opportunity,
            min_relevance: 10.0,
            min_controversy: 0.0,
            required_issues: Vec::new(),
            headline: "{organization} Expansion Brings Jobs to {location}".into(),
            description: "{organization} is hiring in {location}. A ribbon cutting is planned.".into(),
            context: "Good news shared is good news claimed.".into(),
            placeholders: vec![organization("A Local Employer"), location("the Area")],
            base_effect: deltas(&[(Resource::Approval, 2.0)]),
            urgency: Urgency::Informational,
            tier_scaling: TierScaling::Flat,
            extra_options: Vec::new(),
        },
        EventTemplate {
            id: "diplomacy_summit".into(),
            category: EventCategory::Diplomacy,
            classification: EventClassification::Opportunity,
            min_relevance: 15.0,
            min_controversy: 0.0,
            required_issues: Vec::new(),
            headline: "Summit With {location} Draws Attention".into(),
            description: "Talks on {topic} are underway. {person} is leading the delegation.".into(),
            context: "Foreign affairs rarely move votes, until they do.".into(),
            placeholders: vec![location("a Key Ally"), topic("trade"), person("The Envoy")],
            base_effect: deltas(&[(Resource::MediaFavor, 3.0)]),
            urgency: Urgency::Informational,
            tier_scaling: TierScaling::Curve(vec![0.25, 0.25, 0.5, 0.75, 1.0, 1.25, 2.0]),
            extra_options: Vec::new(),
        },
        EventTemplate {
            id: "community_event".into(),
            category: EventCategory::Community,
            classification: EventClassification::Informational,
            min_relevance: 10.0,
            min_controversy: 0.0,
            required_issues: Vec::new(),
            headline: "{location} Turns Out for Community Celebration".into(),
            description: "Neighbors in {location} are gathering. {organization} is hosting.".into(),
            context: "Showing up is half of local politics.".into(),
            placeholders: vec![location("the Neighborhood"), organization("a Local Charity")],
            base_effect: deltas(&[(Resource::MediaFavor, 2.0)]),
            urgency: Urgency::Informational,
            tier_scaling: TierScaling::Flat,
            extra_options: Vec::new(),
        },
    ]
}
