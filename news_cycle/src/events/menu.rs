//! Standard response menus per event classification.

use campaign_rules::{Resource, ResourceDeltas};

use super::{Outcome, ResponseOption};
use crate::consequences::Stance;
use crate::templates::EventClassification;

fn deltas(entries: &[(Resource, f32)]) -> ResourceDeltas {
    entries.iter().copied().collect()
}

/// The fixed menu offered for a classification, before any template extras.
pub fn standard_menu(classification: EventClassification) -> Vec<ResponseOption> {
    match classification {
        EventClassification::Crisis => vec![
            ResponseOption::new("act", "Act", 0.7)
                .with_description("Take charge of the response personally.")
                .with_cost(deltas(&[(Resource::Funds, 10.0)]))
                .on_success(
                    Outcome::new(0.3).with_bonus(deltas(&[
                        (Resource::Approval, 6.0),
                        (Resource::Trust, 2.0),
                    ])),
                )
                .on_failure(Outcome::new(1.2).with_bonus(deltas(&[(Resource::MediaFavor, -4.0)]))),
            ResponseOption::new("investigate", "Investigate", 0.85)
                .with_description("Order a review before committing.")
                .on_success(
                    Outcome::new(0.6)
                        .with_bonus(deltas(&[(Resource::Trust, 3.0)]))
                        .with_deferred(2, deltas(&[(Resource::Approval, 3.0)])),
                )
                .on_failure(Outcome::new(1.0).with_bonus(deltas(&[(Resource::MediaFavor, -2.0)]))),
            ResponseOption::new("delegate", "Delegate", 0.9)
                .with_description("Hand the problem to your staff.")
                .with_cost(deltas(&[(Resource::PoliticalCapital, 3.0)]))
                .on_success(Outcome::new(0.8).with_bonus(deltas(&[(Resource::PoliticalCapital, 2.0)])))
                .on_failure(Outcome::new(1.1).with_bonus(deltas(&[(Resource::Trust, -2.0)]))),
        ],
        EventClassification::Scandal => vec![
            ResponseOption::new("condemn", "Condemn", 0.75)
                .with_description("Publicly denounce the conduct.")
                .with_stance(Stance::Condemn, 1.0)
                .on_success(
                    Outcome::new(0.2).with_bonus(deltas(&[
                        (Resource::Trust, 4.0),
                        (Resource::PartyLoyalty, -3.0),
                    ])),
                )
                .on_failure(Outcome::new(0.7).with_bonus(deltas(&[(Resource::PartyLoyalty, -5.0)]))),
            ResponseOption::new("defend", "Defend", 0.4)
                .with_description("Stand by the people involved.")
                .with_stance(Stance::Defend, 1.0)
                .on_success(Outcome::new(0.0).with_bonus(deltas(&[(Resource::PartyLoyalty, 6.0)])))
                .on_failure(
                    Outcome::new(1.5)
                        .with_bonus(deltas(&[(Resource::MediaFavor, -5.0)]))
                        .with_deferred(1, deltas(&[(Resource::Trust, -3.0)])),
                ),
            ResponseOption::new("distance", "Distance", 0.85)
                .with_description("Keep your name out of it.")
                .on_success(Outcome::new(0.5))
                .on_failure(Outcome::new(0.9).with_bonus(deltas(&[(Resource::MediaFavor, -2.0)]))),
        ],
        EventClassification::Policy => vec![
            ResponseOption::new("support", "Support", 0.8)
                .with_description("Back the measure.")
                .with_stance(Stance::Support, 1.0)
                .on_success(Outcome::new(1.0).with_bonus(deltas(&[(Resource::Approval, 3.0)])))
                .on_failure(Outcome::new(1.0).with_bonus(deltas(&[(Resource::PoliticalCapital, -3.0)]))),
            ResponseOption::new("oppose", "Oppose", 0.8)
                .with_description("Fight the measure.")
                .with_stance(Stance::Oppose, 1.0)
                .on_success(
                    Outcome::new(-0.5).with_bonus(deltas(&[
                        (Resource::Approval, 2.0),
                        (Resource::PartyLoyalty, -2.0),
                    ])),
                )
                .on_failure(Outcome::new(0.5).with_bonus(deltas(&[(Resource::PoliticalCapital, -3.0)]))),
            ResponseOption::new("abstain", "Abstain", 1.0)
                .with_description("Stay out of the vote.")
                .with_stance(Stance::Neutral, 0.0)
                .on_success(Outcome::new(0.0).with_bonus(deltas(&[(Resource::Trust, -2.0)])))
                .on_failure(Outcome::new(0.0).with_bonus(deltas(&[(Resource::Trust, -2.0)]))),
        ],
        EventClassification::Opportunity => vec![
            ResponseOption::new("seize", "Seize", 0.65)
                .with_description("Put yourself front and centre.")
                .with_cost(deltas(&[(Resource::Funds, 5.0)]))
                .on_success(
                    Outcome::new(1.0)
                        .with_bonus(deltas(&[
                            (Resource::Approval, 5.0),
                            (Resource::MediaFavor, 4.0),
                        ]))
                        .with_deferred(2, deltas(&[(Resource::Funds, 10.0)])),
                )
                .on_failure(Outcome::new(0.0).with_bonus(deltas(&[(Resource::MediaFavor, -3.0)]))),
            ResponseOption::new("decline", "Decline", 1.0)
                .with_description("Let the moment pass.")
                .on_success(Outcome::new(0.0))
                .on_failure(Outcome::new(0.0)),
        ],
        EventClassification::Informational => generic_menu(),
    }
}

/// Menu for template-less events.
pub fn generic_menu() -> Vec<ResponseOption> {
    vec![
        ResponseOption::new("acknowledge", "Acknowledge", 1.0)
            .with_description("Note the story and move on.")
            .on_success(Outcome::new(0.5).with_bonus(deltas(&[(Resource::MediaFavor, 1.0)])))
            .on_failure(Outcome::new(0.5)),
        ResponseOption::new("ignore", "Ignore", 1.0)
            .with_description("Say nothing.")
            .on_success(Outcome::new(1.0))
            .on_failure(Outcome::new(1.0)),
    ]
}
