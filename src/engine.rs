use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::InferenceError;
use crate::features::{normalize, FeatureVector, UsageMetrics};
use crate::models::ModelContext;
use crate::persona::{PersonaLabel, PersonaResolution, PersonaResolver, PersonaSource};
use crate::recommendations::compose;
use crate::scoring::{estimate, EngagementScorer, PenaltyTier, ScoreResult, WellbeingPenalty};

/// Result of one inference: scores, resolved persona and advice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub happiness: f64,
    pub stress: f64,
    pub persona: PersonaLabel,
    pub recommendations: Vec<String>,
}

/// `Prediction` plus the intermediate values behind the persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceReport {
    pub prediction: Prediction,
    pub engagement_score: f64,
    pub penalty: PenaltyTier,
    pub resolution: PersonaResolution,
}

impl InferenceReport {
    pub fn source(&self) -> PersonaSource {
        self.resolution.source
    }
}

/// Immutable once built; share it by reference (or `Arc`) across requests.
pub struct Engine {
    models: ModelContext,
    engagement: EngagementScorer,
    resolver: PersonaResolver,
    max_recommendations: usize,
}

impl Engine {
    pub fn new(config: &EngineConfig, models: ModelContext) -> Self {
        let penalty = WellbeingPenalty::new(config.penalty);
        let engagement = EngagementScorer::new(config.engagement, penalty.clone());
        let fallback = EngagementScorer::new(config.fallback, penalty);
        Self {
            models,
            engagement,
            resolver: PersonaResolver::new(fallback, config.thresholds),
            max_recommendations: config.recommendations.max,
        }
    }

    pub fn models(&self) -> &ModelContext {
        &self.models
    }

    pub fn infer(&self, raw: &Map<String, Value>) -> Result<Prediction, InferenceError> {
        self.infer_detailed(raw).map(|report| report.prediction)
    }

    pub fn infer_detailed(
        &self,
        raw: &Map<String, Value>,
    ) -> Result<InferenceReport, InferenceError> {
        let features = normalize(raw, self.models.features.as_slice());
        let scores = estimate(&self.models, &features)?;
        Ok(self.reconcile(&features, scores))
    }

    fn reconcile(&self, features: &FeatureVector, scores: ScoreResult) -> InferenceReport {
        let usage = UsageMetrics::from_features(features);
        let engagement = self.engagement.score(&usage, &scores);
        let resolution = self.resolver.resolve(
            &usage,
            &scores,
            &engagement,
            &self.models.persona,
            &self.models.labels,
        );
        let recommendations = compose(
            &scores,
            resolution.persona,
            features,
            self.max_recommendations,
        );

        debug!(
            happiness = scores.happiness,
            stress = scores.stress,
            engagement = engagement.value,
            penalty = engagement.penalty.label(),
            persona = resolution.persona.label(),
            source = resolution.source.label(),
            "inference complete"
        );

        InferenceReport {
            prediction: Prediction {
                happiness: scores.happiness,
                stress: scores.stress,
                persona: resolution.persona,
                recommendations,
            },
            engagement_score: engagement.value,
            penalty: engagement.penalty,
            resolution,
        }
    }
}
