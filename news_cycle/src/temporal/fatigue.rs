//! Story fatigue per (category, entity) pair.

use std::collections::HashMap;

use crate::classifier::EventCategory;

/// Identifies a family of near-duplicate stories.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FatigueKey {
    pub category: EventCategory,
    /// Lowercased entity name; empty when the story names nobody.
    pub entity: String,
}

impl FatigueKey {
    pub fn new(category: EventCategory, entity: Option<&str>) -> Self {
        Self {
            category,
            entity: entity.map(|e| e.trim().to_lowercase()).unwrap_or_default(),
        }
    }
}

/// Fatigue levels, each 0.0 - 1.0. Independent of any single event.
#[derive(Debug, Clone, Default)]
pub struct FatigueTracker {
    levels: HashMap<FatigueKey, f32>,
}

impl FatigueTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self, key: &FatigueKey) -> f32 {
        self.levels.get(key).copied().unwrap_or(0.0)
    }

    pub fn is_suppressed(&self, key: &FatigueKey, threshold: f32) -> bool {
        self.level(key) >= threshold
    }

    /// Add fatigue for a story, returning the new level.
    pub fn register(&mut self, key: FatigueKey, increment: f32) -> f32 {
        let level = self.levels.entry(key).or_insert(0.0);
        *level = (*level + increment).min(1.0);
        *level
    }

    /// Decay every pair by `amount`, forgetting pairs that reach zero.
    pub fn decay(&mut self, amount: f32) {
        for level in self.levels.values_mut() {
            *level = (*level - amount).max(0.0);
        }
        self.levels.retain(|_, level| *level > 0.0);
    }

    pub fn tracked(&self) -> usize {
        self.levels.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FatigueKey, f32)> {
        self.levels.iter().map(|(k, v)| (k, *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_normalizes_entity() {
        assert_eq!(
            FatigueKey::new(EventCategory::Scandal, Some(" Smith ")),
            FatigueKey::new(EventCategory::Scandal, Some("smith"))
        );
        assert_ne!(
            FatigueKey::new(EventCategory::Scandal, Some("Smith")),
            FatigueKey::new(EventCategory::Crisis, Some("Smith"))
        );
    }

    #[test]
    fn test_register_and_suppress() {
        let mut tracker = FatigueTracker::new();
        let key = FatigueKey::new(EventCategory::Scandal, Some("Smith"));
        tracker.register(key.clone(), 0.25);
        tracker.register(key.clone(), 0.25);
        assert!(!tracker.is_suppressed(&key, 0.75));
        tracker.register(key.clone(), 0.25);
        assert!(tracker.is_suppressed(&key, 0.75));
        assert_eq!(tracker.register(key.clone(), 0.5), 1.0);
    }

    #[test]
    fn test_decay_forgets() {
        let mut tracker = FatigueTracker::new();
        let key = FatigueKey::new(EventCategory::Economy, None);
        tracker.register(key.clone(), 0.25);
        tracker.decay(0.1);
        assert!((tracker.level(&key) - 0.15).abs() < 1e-6);
        tracker.decay(0.2);
        assert_eq!(tracker.level(&key), 0.0);
        assert_eq!(tracker.tracked(), 0);
    }
}
