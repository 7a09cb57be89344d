use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::{InferenceError, ModelError};
use crate::features::FeatureVector;
use crate::models::{ModelContext, Regressor};

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub happiness: f64,
    pub stress: f64,
}

/// Runs both regressors. A failing model fails the whole call; there is no
/// default score to fall back to. Non-finite output counts as a failure.
pub fn estimate(
    models: &ModelContext,
    features: &FeatureVector,
) -> Result<ScoreResult, InferenceError> {
    let happiness = invoke("happiness", models.happiness.as_ref(), features)?;
    let stress = invoke("stress", models.stress.as_ref(), features)?;

    Ok(ScoreResult {
        happiness: bound_score(happiness),
        stress: bound_score(stress),
    })
}

fn invoke(
    model: &'static str,
    regressor: &dyn Regressor,
    features: &FeatureVector,
) -> Result<f64, InferenceError> {
    regressor
        .predict(features)
        .and_then(|value| {
            if value.is_finite() {
                Ok(value)
            } else {
                Err(ModelError::NonFinite)
            }
        })
        .map_err(|source| {
            error!(model, error = %source, "regression model failed");
            InferenceError::ModelInvocation { model, source }
        })
}

/// Clamps to [0, 10] and rounds to two decimals.
pub fn bound_score(raw: f64) -> f64 {
    round2(raw.max(SCORE_MIN).min(SCORE_MAX))
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_and_rounds() {
        assert_eq!(bound_score(-3.2), 0.0);
        assert_eq!(bound_score(12.7), 10.0);
        assert_eq!(bound_score(6.456), 6.46);
        assert_eq!(bound_score(6.454), 6.45);
        assert_eq!(bound_score(10.0), 10.0);
    }
}
