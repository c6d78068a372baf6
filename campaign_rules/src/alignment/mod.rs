//! Political alignment coordinates and gated ranges.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest coordinate on either axis.
pub const ALIGNMENT_MIN: f32 = -100.0;
/// Highest coordinate on either axis.
pub const ALIGNMENT_MAX: f32 = 100.0;

/// Errors raised when building alignment values.
#[derive(Debug, Error, PartialEq)]
pub enum RulesError {
    #[error("alignment range on {axis} axis is inverted: {min} > {max}")]
    InvertedRange { axis: &'static str, min: f32, max: f32 },
}

/// A player's position on two axes, each -100 (left/liberal) to 100 (right/conservative).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Alignment {
    pub economic: f32,
    pub social: f32,
}

impl Alignment {
    /// Create an alignment, clamping both axes into range.
    pub fn new(economic: f32, social: f32) -> Self {
        Self {
            economic: economic.clamp(ALIGNMENT_MIN, ALIGNMENT_MAX),
            social: social.clamp(ALIGNMENT_MIN, ALIGNMENT_MAX),
        }
    }

    pub fn centrist() -> Self {
        Self::default()
    }

    /// Distance from the centre, 0.0 to ~141.
    pub fn extremity(&self) -> f32 {
        (self.economic * self.economic + self.social * self.social).sqrt()
    }
}

/// Inclusive bounds on both alignment axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignmentRange {
    pub economic: (f32, f32),
    pub social: (f32, f32),
}

impl AlignmentRange {
    /// Build a range, rejecting inverted bounds.
    pub fn new(economic: (f32, f32), social: (f32, f32)) -> Result<Self, RulesError> {
        if economic.0 > economic.1 {
            return Err(RulesError::InvertedRange {
                axis: "economic",
                min: economic.0,
                max: economic.1,
            });
        }
        if social.0 > social.1 {
            return Err(RulesError::InvertedRange {
                axis: "social",
                min: social.0,
                max: social.1,
            });
        }
        Ok(Self { economic, social })
    }

    /// The whole plane.
    pub fn any() -> Self {
        Self {
            economic: (ALIGNMENT_MIN, ALIGNMENT_MAX),
            social: (ALIGNMENT_MIN, ALIGNMENT_MAX),
        }
    }

    /// Only the economic axis is constrained.
    pub fn economic(min: f32, max: f32) -> Result<Self, RulesError> {
        Self::new((min, max), (ALIGNMENT_MIN, ALIGNMENT_MAX))
    }

    /// Only the social axis is constrained.
    pub fn social(min: f32, max: f32) -> Result<Self, RulesError> {
        Self::new((ALIGNMENT_MIN, ALIGNMENT_MAX), (min, max))
    }

    pub fn contains(&self, alignment: Alignment) -> bool {
        (self.economic.0..=self.economic.1).contains(&alignment.economic)
            && (self.social.0..=self.social.1).contains(&alignment.social)
    }
}

impl std::fmt::Display for AlignmentRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "economic {:.0}..{:.0}, social {:.0}..{:.0}",
            self.economic.0, self.economic.1, self.social.0, self.social.1
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_clamps() {
        let a = Alignment::new(150.0, -300.0);
        assert_eq!(a.economic, 100.0);
        assert_eq!(a.social, -100.0);
    }

    #[test]
    fn test_range_contains() {
        let progressive = AlignmentRange::economic(-100.0, -20.0).unwrap();
        assert!(progressive.contains(Alignment::new(-50.0, 30.0)));
        assert!(progressive.contains(Alignment::new(-20.0, 0.0)));
        assert!(!progressive.contains(Alignment::new(10.0, 0.0)));
        assert!(AlignmentRange::any().contains(Alignment::new(100.0, -100.0)));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = AlignmentRange::social(30.0, -30.0).unwrap_err();
        assert!(matches!(err, RulesError::InvertedRange { axis: "social", .. }));
    }
}
