pub mod cluster;
pub mod labels;
pub mod linear;

use serde::de::DeserializeOwned;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::{info, warn};

use crate::error::{LoadError, ModelError};
use crate::features::{FeatureVector, UsageMetrics, FEATURE_NAMES};

pub use cluster::CentroidClusterer;
pub use labels::PersonaLabelMap;
pub use linear::{LinearRegressor, Scaling};

pub const HAPPINESS_MODEL_FILE: &str = "happiness_model.json";
pub const STRESS_MODEL_FILE: &str = "stress_model.json";
pub const PERSONA_MODEL_FILE: &str = "persona_model.json";
pub const FEATURES_FILE: &str = "features.json";
pub const PERSONA_LABELS_FILE: &str = "persona_labels.json";

/// Pre-trained regressor over the full feature vector.
pub trait Regressor: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError>;
}

/// Pre-trained clustering assignment over the usage fields only.
pub trait ClusterModel: Send + Sync {
    fn predict(&self, usage: &UsageMetrics) -> Result<usize, ModelError>;
}

pub enum PersonaModel {
    Ready(Box<dyn ClusterModel>),
    /// Present on disk but without a callable predictor.
    Degraded,
    Unavailable,
}

impl PersonaModel {
    pub fn status(&self) -> &'static str {
        match self {
            PersonaModel::Ready(_) => "ready",
            PersonaModel::Degraded => "degraded",
            PersonaModel::Unavailable => "unavailable",
        }
    }
}

impl std::fmt::Debug for PersonaModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.status())
    }
}

/// Everything loaded once at startup and read by every inference.
pub struct ModelContext {
    pub happiness: Box<dyn Regressor>,
    pub stress: Box<dyn Regressor>,
    pub persona: PersonaModel,
    pub labels: PersonaLabelMap,
    pub features: Vec<String>,
    pub fingerprint: String,
}

impl ModelContext {
    pub fn new(
        happiness: Box<dyn Regressor>,
        stress: Box<dyn Regressor>,
        persona: PersonaModel,
        labels: PersonaLabelMap,
    ) -> Self {
        Self {
            happiness,
            stress,
            persona,
            labels,
            features: FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
            fingerprint: String::new(),
        }
    }

    pub fn with_features(mut self, features: Vec<String>) -> Self {
        self.features = features;
        self
    }

    pub fn load(dir: &Path) -> Result<Self, LoadError> {
        let mut hasher = Sha256::new();

        let happiness: LinearRegressor = load_json(dir, HAPPINESS_MODEL_FILE, &mut hasher)?;
        let stress: LinearRegressor = load_json(dir, STRESS_MODEL_FILE, &mut hasher)?;
        let labels: PersonaLabelMap = load_json(dir, PERSONA_LABELS_FILE, &mut hasher)?;

        let features = if dir.join(FEATURES_FILE).exists() {
            let names: Vec<String> = load_json(dir, FEATURES_FILE, &mut hasher)?;
            if names.is_empty() {
                return Err(LoadError::Invalid(format!("{} lists no features", FEATURES_FILE)));
            }
            names
        } else {
            FEATURE_NAMES.iter().map(|name| name.to_string()).collect()
        };

        let persona = if dir.join(PERSONA_MODEL_FILE).exists() {
            let value: Value = load_json(dir, PERSONA_MODEL_FILE, &mut hasher)?;
            persona_model_from_value(value)
        } else {
            PersonaModel::Unavailable
        };
        if !matches!(persona, PersonaModel::Ready(_)) {
            warn!(status = persona.status(), "persona clustering model not usable, heuristic only");
        }

        let digest = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        let fingerprint = format!("{:016x}", u64::from_be_bytes(bytes));

        info!(
            dir = %dir.display(),
            features = features.len(),
            persona_model = persona.status(),
            fingerprint = %fingerprint,
            "model bundle loaded"
        );

        Ok(Self {
            happiness: Box::new(happiness),
            stress: Box::new(stress),
            persona,
            labels,
            features,
            fingerprint,
        })
    }
}

/// Accepts a bare clusterer or one wrapped under `model`/`pipeline`; any other
/// mapping is a structurally degraded export.
pub fn persona_model_from_value(value: Value) -> PersonaModel {
    let candidate = match &value {
        Value::Object(map) if map.contains_key("centroids") => Some(value.clone()),
        Value::Object(map) => map
            .get("model")
            .or_else(|| map.get("pipeline"))
            .filter(|inner| inner.get("centroids").is_some())
            .cloned(),
        _ => None,
    };

    let Some(candidate) = candidate else {
        return PersonaModel::Degraded;
    };

    match serde_json::from_value::<CentroidClusterer>(candidate) {
        Ok(clusterer) => match clusterer.validate() {
            Ok(()) => PersonaModel::Ready(Box::new(clusterer)),
            Err(err) => {
                warn!(error = %err, "persona clustering model failed validation");
                PersonaModel::Degraded
            }
        },
        Err(err) => {
            warn!(error = %err, "persona clustering model could not be decoded");
            PersonaModel::Degraded
        }
    }
}

fn load_json<T: DeserializeOwned>(
    dir: &Path,
    file: &str,
    hasher: &mut Sha256,
) -> Result<T, LoadError> {
    let path = dir.join(file);
    let contents = std::fs::read_to_string(&path).map_err(|source| LoadError::Io {
        path: path.clone(),
        source,
    })?;
    hasher.update(file.as_bytes());
    hasher.update(contents.as_bytes());
    serde_json::from_str(&contents).map_err(|source| LoadError::Parse { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write(dir: &Path, file: &str, value: Value) {
        std::fs::write(dir.join(file), value.to_string()).expect("write");
    }

    fn write_bundle(dir: &Path) {
        write(dir, HAPPINESS_MODEL_FILE, json!({ "intercept": 6.0 }));
        write(dir, STRESS_MODEL_FILE, json!({ "intercept": 4.0 }));
        write(
            dir,
            PERSONA_LABELS_FILE,
            json!({ "0": "Doom-Scroller", "1": "Light User", "2": "Moderate User" }),
        );
    }

    #[test]
    fn loads_bundle_without_clusterer() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_bundle(dir.path());

        let context = ModelContext::load(dir.path()).expect("bundle");
        assert!(matches!(context.persona, PersonaModel::Unavailable));
        assert_eq!(context.features.len(), FEATURE_NAMES.len());
        assert_eq!(context.fingerprint.len(), 16);
    }

    #[test]
    fn plain_mapping_clusterer_is_degraded() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_bundle(dir.path());
        write(dir.path(), PERSONA_MODEL_FILE, json!({ "labels": { "0": "x" } }));

        let context = ModelContext::load(dir.path()).expect("bundle");
        assert!(matches!(context.persona, PersonaModel::Degraded));
    }

    #[test]
    fn wrapped_clusterer_is_ready() {
        let model = persona_model_from_value(json!({
            "model": {
                "mean": vec![0.0; 9],
                "scale": vec![1.0; 9],
                "centroids": [vec![0.0; 9], vec![1.0; 9]]
            }
        }));
        assert!(matches!(model, PersonaModel::Ready(_)));
    }

    #[test]
    fn missing_regressor_fails_to_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), STRESS_MODEL_FILE, json!({ "intercept": 4.0 }));

        assert!(matches!(
            ModelContext::load(dir.path()),
            Err(LoadError::Io { .. })
        ));
    }

    #[test]
    fn fingerprint_tracks_contents() {
        let first = tempfile::tempdir().expect("tempdir");
        let second = tempfile::tempdir().expect("tempdir");
        write_bundle(first.path());
        write_bundle(second.path());
        write(second.path(), STRESS_MODEL_FILE, json!({ "intercept": 4.5 }));

        let a = ModelContext::load(first.path()).expect("bundle");
        let b = ModelContext::load(second.path()).expect("bundle");
        assert_ne!(a.fingerprint, b.fingerprint);
    }
}
