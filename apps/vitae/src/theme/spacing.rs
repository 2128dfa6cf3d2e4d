//! Named vertical spacing scale. Layout code never uses a raw point value for whitespace.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpacingLevel {
    Tiny,
    Minimal,
    Small,
    Medium,
    Large,
}

impl SpacingLevel {
    pub fn multiplier(self) -> f32 {
        match self {
            SpacingLevel::Tiny => 1.0,
            SpacingLevel::Minimal => 2.0,
            SpacingLevel::Small => 3.0,
            SpacingLevel::Medium => 4.0,
            SpacingLevel::Large => 6.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpacingScale {
    /// Points per unit.
    pub base_unit: f32,
    pub tiny: f32,
    pub minimal: f32,
    pub small: f32,
    pub medium: f32,
    pub large: f32,
}

impl SpacingScale {
    pub fn new(base_unit: f32) -> Self {
        let at = |level: SpacingLevel| base_unit * level.multiplier();
        Self {
            base_unit,
            tiny: at(SpacingLevel::Tiny),
            minimal: at(SpacingLevel::Minimal),
            small: at(SpacingLevel::Small),
            medium: at(SpacingLevel::Medium),
            large: at(SpacingLevel::Large),
        }
    }

    pub fn get(&self, level: SpacingLevel) -> f32 {
        match level {
            SpacingLevel::Tiny => self.tiny,
            SpacingLevel::Minimal => self.minimal,
            SpacingLevel::Small => self.small,
            SpacingLevel::Medium => self.medium,
            SpacingLevel::Large => self.large,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_is_monotonic() {
        let s = SpacingScale::new(2.0);
        assert!(s.tiny < s.minimal && s.minimal < s.small);
        assert!(s.small < s.medium && s.medium < s.large);
    }

    #[test]
    fn test_scale_values() {
        let s = SpacingScale::new(2.0);
        assert_eq!(s.get(SpacingLevel::Tiny), 2.0);
        assert_eq!(s.get(SpacingLevel::Large), 12.0);
    }
}
