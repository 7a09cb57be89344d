use serde::{Deserialize, Serialize};

use crate::features::UsageMetrics;
use crate::scoring::{PenaltyTier, ScoreResult, WellbeingPenalty};

/// Per-unit weights of the engagement sum.
///
/// Values are tunable, the ordering is not: re-engagement signals (sessions,
/// notification responsiveness) outweigh raw minutes and comments outweigh
/// likes. Persona thresholds are calibrated against that ordering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngagementWeights {
    pub active_minutes: f64,
    pub sessions: f64,
    pub reels: f64,
    pub stories: f64,
    pub likes: f64,
    pub comments: f64,
    pub notification_rate: f64,
}

impl Default for EngagementWeights {
    fn default() -> Self {
        Self {
            active_minutes: 1.0,
            sessions: 3.0,
            reels: 0.3,
            stories: 0.2,
            likes: 0.2,
            comments: 0.5,
            notification_rate: 40.0,
        }
    }
}

impl EngagementWeights {
    /// Weights of the secondary heuristic used when the clustering path fails.
    pub fn fallback() -> Self {
        Self {
            active_minutes: 1.0,
            sessions: 2.5,
            reels: 0.25,
            stories: 0.15,
            likes: 0.15,
            comments: 0.6,
            notification_rate: 35.0,
        }
    }

    pub fn validate(&self, section: &str) -> Result<(), String> {
        let values = [
            ("active_minutes", self.active_minutes),
            ("sessions", self.sessions),
            ("reels", self.reels),
            ("stories", self.stories),
            ("likes", self.likes),
            ("comments", self.comments),
            ("notification_rate", self.notification_rate),
        ];
        for (name, value) in values {
            if !(value > 0.0) || !value.is_finite() {
                return Err(format!("{}.{} must be a positive number", section, name));
            }
        }
        if self.comments <= self.likes {
            return Err(format!("{}.comments must outweigh {}.likes", section, section));
        }
        if self.sessions < self.active_minutes || self.notification_rate < self.sessions {
            return Err(format!(
                "{}: expected notification_rate >= sessions >= active_minutes",
                section
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngagementScore {
    pub base: f64,
    pub value: f64,
    pub penalty: PenaltyTier,
}

#[derive(Debug, Clone)]
pub struct EngagementScorer {
    weights: EngagementWeights,
    penalty: WellbeingPenalty,
}

impl EngagementScorer {
    pub fn new(weights: EngagementWeights, penalty: WellbeingPenalty) -> Self {
        Self { weights, penalty }
    }

    pub fn weights(&self) -> &EngagementWeights {
        &self.weights
    }

    pub fn base_score(&self, usage: &UsageMetrics) -> f64 {
        let mut score = 0.0;

        score += usage.daily_active_minutes * self.weights.active_minutes;
        score += usage.sessions_per_day * self.weights.sessions;
        score += usage.reels_per_day * self.weights.reels;
        score += usage.stories_per_day * self.weights.stories;
        score += usage.likes_per_day * self.weights.likes;
        score += usage.comments_per_day * self.weights.comments;
        score += usage.notification_response_rate * self.weights.notification_rate;

        score.max(0.0)
    }

    pub fn score(&self, usage: &UsageMetrics, scores: &ScoreResult) -> EngagementScore {
        let base = self.base_score(usage);
        let (value, penalty) = self.penalty.apply(base, scores);
        EngagementScore {
            base,
            value,
            penalty,
        }
    }
}
