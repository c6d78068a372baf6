//! Event factory - assembles game events from matched templates.

use campaign_rules::{OfficeTier, ResourceDeltas};
use tracing::debug;

use super::{generic_menu, standard_menu, EventId, GameEvent, GameEventKind, ResponseOption};
use crate::classifier::{ClassifiedItem, Issue};
use crate::config::EventWindowConfig;
use crate::content::SourceKind;
use crate::templates::{EventClassification, EventTemplate, Urgency, VariableInjector};

/// Per-event inputs that come from the game rather than the item.
#[derive(Debug, Clone, Copy)]
pub struct FactoryContext {
    pub source_kind: SourceKind,
    pub tier: OfficeTier,
    pub turn: u32,
    /// Current fatigue of the item's (category, entity) pair, 0.0 - 1.0.
    pub fatigue: f32,
}

impl FactoryContext {
    pub fn new(source_kind: SourceKind, tier: OfficeTier, turn: u32) -> Self {
        Self {
            source_kind,
            tier,
            turn,
            fatigue: 0.0,
        }
    }

    pub fn with_fatigue(mut self, fatigue: f32) -> Self {
        self.fatigue = fatigue.clamp(0.0, 1.0);
        self
    }

    /// Fatigued stories land softer: full fatigue halves the effect.
    pub fn dampening(&self) -> f32 {
        1.0 - self.fatigue * 0.5
    }
}

/// Builds [`GameEvent`]s.
#[derive(Debug, Clone, Default)]
pub struct EventFactory {
    windows: EventWindowConfig,
    injector: VariableInjector,
}

impl EventFactory {
    pub fn new(windows: EventWindowConfig) -> Self {
        Self {
            windows,
            injector: VariableInjector::new(),
        }
    }

    /// Build an event from a template match, or a generic event when there
    /// is none.
    pub fn create(
        &self,
        item: &ClassifiedItem,
        template: Option<&EventTemplate>,
        ctx: FactoryContext,
    ) -> GameEvent {
        match template {
            Some(template) => self.from_template(item, template, ctx),
            None => self.generic(item, ctx),
        }
    }

    fn from_template(&self, item: &ClassifiedItem, template: &EventTemplate, ctx: FactoryContext) -> GameEvent {
        let text = self.injector.inject(template, item);
        let multiplier = template.tier_scaling.multiplier(ctx.tier);
        let effect = template.base_effect.scaled(multiplier * ctx.dampening());

        let response_options: Vec<ResponseOption> = standard_menu(template.classification)
            .into_iter()
            .chain(template.extra_options.iter().cloned())
            .map(|option| scale_option(option, multiplier))
            .collect();

        let issue = template
            .required_issues
            .iter()
            .copied()
            .find(|issue| item.has_issue(*issue))
            .or_else(|| item.issues.first().copied());

        debug!(
            template = %template.id,
            item_id = %item.item.id,
            tier = %ctx.tier.name(),
            multiplier,
            "materialized templated event"
        );

        self.assemble(
            item,
            ctx,
            Some(template.id.clone()),
            (text.headline, text.description, text.context),
            template.classification,
            template.urgency,
            issue,
            template.base_effect.clone(),
            effect,
            response_options,
        )
    }

    fn generic(&self, item: &ClassifiedItem, ctx: FactoryContext) -> GameEvent {
        debug!(item_id = %item.item.id, "materialized generic event");
        let context = format!("Reported by {}.", item.item.source);
        self.assemble(
            item,
            ctx,
            None,
            (item.item.headline.clone(), item.item.summary.clone(), context),
            EventClassification::Informational,
            Urgency::Informational,
            item.issues.first().copied(),
            ResourceDeltas::new(),
            ResourceDeltas::new(),
            generic_menu(),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        &self,
        item: &ClassifiedItem,
        ctx: FactoryContext,
        template_id: Option<String>,
        (headline, description, context): (String, String, String),
        classification: EventClassification,
        urgency: Urgency,
        issue: Option<Issue>,
        base_effect: ResourceDeltas,
        effect: ResourceDeltas,
        response_options: Vec<ResponseOption>,
    ) -> GameEvent {
        let window = self.windows.window(urgency);
        GameEvent {
            id: EventId::new(),
            source_item_id: item.item.id.clone(),
            source_kind: ctx.source_kind,
            template_id,
            headline,
            description,
            context,
            category: item.category,
            classification,
            kind: GameEventKind::from(classification),
            urgency,
            issue,
            primary_entity: item.primary_entity().map(|e| e.name.clone()),
            base_effect,
            effect,
            response_options,
            created_turn: ctx.turn,
            deadline_turn: ctx.turn + window.response_turns,
            expiration_turn: ctx.turn + window.expiration_turns,
            responses: Vec::new(),
            resolved: false,
            expired: false,
        }
    }
}

/// Scale an option's own bonus and deferred deltas with the office tier.
fn scale_option(mut option: ResponseOption, multiplier: f32) -> ResponseOption {
    option.on_success = option.on_success.scaled(multiplier);
    option.on_failure = option.on_failure.scaled(multiplier);
    option
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Classifier, EventCategory};
    use crate::content::RawItem;
    use crate::templates::{TemplateCatalog, TemplateMatcher};
    use campaign_rules::Resource;
    use chrono::Utc;

    fn smith() -> ClassifiedItem {
        Classifier::new().classify(&RawItem::new(
            "smith",
            "Senator Smith Faces Bribery Probe",
            "Federal investigators opened a corruption investigation amid allegations of bribery.",
            "Wire",
            Utc::now(),
        ))
    }

    #[test]
    fn test_scandal_event_from_template() {
        let item = smith();
        let matcher = TemplateMatcher::default();
        let template = matcher.find_best_match(&item);
        let factory = EventFactory::default();
        let event = factory.create(
            &item,
            template,
            FactoryContext::new(SourceKind::Live, OfficeTier::Governor, 4),
        );

        assert_eq!(event.category, EventCategory::Scandal);
        assert_eq!(event.kind, GameEventKind::Scandal);
        assert_eq!(event.option_ids(), vec!["condemn", "defend", "distance"]);
        assert!(event.effect.get(Resource::Trust) < 0.0);
        assert_eq!(event.issue, Some(Issue::Ethics));
        assert_eq!(event.primary_entity.as_deref(), Some("Smith"));
        assert_eq!(event.urgency, Urgency::Breaking);
        assert_eq!(event.deadline_turn, 5);
        assert_eq!(event.expiration_turn, 6);
        assert!(!event.is_generic());
    }

    #[test]
    fn test_generic_event_passes_text_through() {
        let item = Classifier::new().classify(&RawItem::new(
            "cat",
            "Cat naps in sunbeam",
            "A sleepy afternoon.",
            "Wire",
            Utc::now(),
        ));
        assert!(TemplateMatcher::default().find_best_match(&item).is_none());

        let event = EventFactory::default().create(
            &item,
            None,
            FactoryContext::new(SourceKind::Cache, OfficeTier::Mayor, 1),
        );
        assert!(event.is_generic());
        assert_eq!(event.headline, "Cat naps in sunbeam");
        assert_eq!(event.description, "A sleepy afternoon.");
        assert_eq!(event.option_ids(), vec!["acknowledge", "ignore"]);
        assert!(event.effect.is_empty());
    }

    #[test]
    fn test_effect_grows_with_tier() {
        let item = smith();
        let catalog = TemplateCatalog::builtin();
        let template = catalog.get("scandal_bribery");
        let factory = EventFactory::default();

        let mut previous = 0.0_f32;
        for tier in OfficeTier::ALL {
            let event = factory.create(&item, template, FactoryContext::new(SourceKind::Live, tier, 1));
            let magnitude = event.effect.get(Resource::Trust).abs();
            assert!(magnitude >= previous);
            previous = magnitude;
        }
    }

    #[test]
    fn test_fatigue_dampens_effect() {
        let item = smith();
        let catalog = TemplateCatalog::builtin();
        let template = catalog.get("scandal_bribery");
        let factory = EventFactory::default();
        let ctx = FactoryContext::new(SourceKind::Live, OfficeTier::Senator, 1);

        let fresh = factory.create(&item, template, ctx);
        let tired = factory.create(&item, template, ctx.with_fatigue(0.5));
        assert!(tired.effect.get(Resource::Trust).abs() < fresh.effect.get(Resource::Trust).abs());
    }

    #[test]
    fn test_extra_options_are_appended() {
        let item = Classifier::new().classify(&RawItem::new(
            "health",
            "Senate Debates Healthcare Reform Bill",
            "Lawmakers argued over the hospital funding policy.",
            "Wire",
            Utc::now(),
        ));
        let catalog = TemplateCatalog::builtin();
        let event = EventFactory::default().create(
            &item,
            catalog.get("policy_reform"),
            FactoryContext::new(SourceKind::Live, OfficeTier::StateLegislator, 2),
        );
        assert_eq!(event.option_ids(), vec!["support", "oppose", "abstain", "push_further"]);
        assert_eq!(event.issue, Some(Issue::Healthcare));
    }
}
