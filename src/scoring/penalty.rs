use serde::{Deserialize, Serialize};

use crate::scoring::ScoreResult;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenaltyTierConfig {
    pub stress_above: f64,
    pub happiness_below: f64,
    pub multiplier: f64,
    pub bonus: f64,
}

impl PenaltyTierConfig {
    fn matches(&self, scores: &ScoreResult) -> bool {
        scores.stress > self.stress_above && scores.happiness < self.happiness_below
    }

    fn apply(&self, base: f64) -> f64 {
        base * self.multiplier + self.bonus
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WellbeingPenaltyConfig {
    pub moderate: PenaltyTierConfig,
    pub severe: PenaltyTierConfig,
}

impl Default for WellbeingPenaltyConfig {
    fn default() -> Self {
        Self {
            moderate: PenaltyTierConfig {
                stress_above: 6.0,
                happiness_below: 5.0,
                multiplier: 1.1,
                bonus: 10.0,
            },
            severe: PenaltyTierConfig {
                stress_above: 8.0,
                happiness_below: 4.0,
                multiplier: 1.25,
                bonus: 25.0,
            },
        }
    }
}

impl WellbeingPenaltyConfig {
    /// The severe tier must sit inside the moderate one and weigh strictly more.
    pub fn validate(&self) -> Result<(), String> {
        for (name, tier) in [("moderate", &self.moderate), ("severe", &self.severe)] {
            if !(tier.multiplier >= 1.0) {
                return Err(format!("penalty.{}.multiplier must be >= 1", name));
            }
            if !(tier.bonus >= 0.0) {
                return Err(format!("penalty.{}.bonus must be >= 0", name));
            }
        }
        if self.severe.stress_above < self.moderate.stress_above
            || self.severe.happiness_below > self.moderate.happiness_below
        {
            return Err("penalty.severe must be at least as strict as penalty.moderate".to_string());
        }
        if self.severe.multiplier < self.moderate.multiplier
            || self.severe.bonus <= self.moderate.bonus
        {
            return Err("penalty.severe must add strictly more than penalty.moderate".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyTier {
    None,
    Moderate,
    Severe,
}

impl PenaltyTier {
    pub fn label(self) -> &'static str {
        match self {
            PenaltyTier::None => "none",
            PenaltyTier::Moderate => "moderate",
            PenaltyTier::Severe => "severe",
        }
    }
}

#[derive(Debug, Clone)]
pub struct WellbeingPenalty {
    config: WellbeingPenaltyConfig,
}

impl WellbeingPenalty {
    pub fn new(config: WellbeingPenaltyConfig) -> Self {
        Self { config }
    }

    pub fn tier(&self, scores: &ScoreResult) -> PenaltyTier {
        if self.config.severe.matches(scores) {
            PenaltyTier::Severe
        } else if self.config.moderate.matches(scores) {
            PenaltyTier::Moderate
        } else {
            PenaltyTier::None
        }
    }

    pub fn apply(&self, base: f64, scores: &ScoreResult) -> (f64, PenaltyTier) {
        let tier = self.tier(scores);
        let adjusted = match tier {
            PenaltyTier::Severe => self.config.severe.apply(base),
            PenaltyTier::Moderate => self.config.moderate.apply(base),
            PenaltyTier::None => base,
        };
        (adjusted, tier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(happiness: f64, stress: f64) -> ScoreResult {
        ScoreResult { happiness, stress }
    }

    #[test]
    fn picks_most_severe_matching_tier() {
        let penalty = WellbeingPenalty::new(WellbeingPenaltyConfig::default());

        assert_eq!(penalty.tier(&scores(7.0, 3.0)), PenaltyTier::None);
        assert_eq!(penalty.tier(&scores(4.5, 6.5)), PenaltyTier::Moderate);
        assert_eq!(penalty.tier(&scores(3.0, 9.0)), PenaltyTier::Severe);
        // boundaries are strict
        assert_eq!(penalty.tier(&scores(5.0, 9.0)), PenaltyTier::None);
        assert_eq!(penalty.tier(&scores(4.0, 8.5)), PenaltyTier::Moderate);
        assert_eq!(penalty.tier(&scores(3.0, 8.0)), PenaltyTier::Moderate);
    }

    #[test]
    fn severe_tier_outweighs_moderate() {
        let penalty = WellbeingPenalty::new(WellbeingPenaltyConfig::default());
        for base in [0.0, 25.0, 180.0, 600.0] {
            let (none, _) = penalty.apply(base, &scores(7.0, 2.0));
            let (moderate, _) = penalty.apply(base, &scores(4.5, 6.5));
            let (severe, _) = penalty.apply(base, &scores(3.0, 9.0));
            assert_eq!(none, base);
            assert!(moderate > none);
            assert!(severe > moderate);
        }
    }

    #[test]
    fn rejects_inverted_tiers() {
        let mut config = WellbeingPenaltyConfig::default();
        config.severe.bonus = config.moderate.bonus;
        config.severe.multiplier = config.moderate.multiplier;
        assert!(config.validate().is_err());

        let mut config = WellbeingPenaltyConfig::default();
        config.moderate.multiplier = 0.9;
        assert!(config.validate().is_err());

        assert!(WellbeingPenaltyConfig::default().validate().is_ok());
    }
}
