pub mod engagement;
pub mod estimator;
pub mod penalty;

pub use engagement::{EngagementScore, EngagementScorer, EngagementWeights};
pub use estimator::{bound_score, estimate, round2, ScoreResult};
pub use penalty::{PenaltyTier, PenaltyTierConfig, WellbeingPenalty, WellbeingPenaltyConfig};
