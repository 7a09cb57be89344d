use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wellbeing_engine::{ModelContext, Prediction};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiPredictionResponse {
    pub happiness_score: f64,
    pub stress_score: f64,
    pub persona: String,
    pub recommendations: Vec<String>,
}

impl ApiPredictionResponse {
    pub fn from_prediction(prediction: Prediction) -> Self {
        Self {
            happiness_score: prediction.happiness,
            stress_score: prediction.stress,
            persona: prediction.persona.label().to_string(),
            recommendations: prediction.recommendations,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub detail: String,
}

impl ApiError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiHealthResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiFeaturesResponse {
    pub features: Vec<String>,
    pub total_features: usize,
}

impl ApiFeaturesResponse {
    pub fn from_models(models: &ModelContext) -> Self {
        Self {
            features: models.features.clone(),
            total_features: models.features.len(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiPersonasResponse {
    pub personas: Vec<String>,
    pub persona_mapping: BTreeMap<String, String>,
}

impl ApiPersonasResponse {
    pub fn from_models(models: &ModelContext) -> Self {
        Self {
            personas: models.labels.personas(),
            persona_mapping: models.labels.entries().clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiModelsResponse {
    pub fingerprint: String,
    pub persona_model: String,
    pub feature_count: usize,
    pub label_count: usize,
}

impl ApiModelsResponse {
    pub fn from_models(models: &ModelContext) -> Self {
        Self {
            fingerprint: models.fingerprint.clone(),
            persona_model: models.persona.status().to_string(),
            feature_count: models.features.len(),
            label_count: models.labels.entries().len(),
        }
    }
}
