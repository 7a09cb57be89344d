use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ModelError;
use crate::features::{FeatureValue, FeatureVector};
use crate::models::Regressor;

/// Linear regressor exported from a trained pipeline.
///
/// Numeric coefficients apply to standardized values when `scaling` carries
/// an entry for the feature. Categorical coefficients are one-hot weights;
/// unseen categories contribute nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub intercept: f64,
    #[serde(default)]
    pub numeric: BTreeMap<String, f64>,
    #[serde(default)]
    pub scaling: BTreeMap<String, Scaling>,
    #[serde(default)]
    pub categorical: BTreeMap<String, BTreeMap<String, f64>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Scaling {
    pub mean: f64,
    pub scale: f64,
}

impl Scaling {
    pub fn apply(self, value: f64) -> f64 {
        if self.scale == 0.0 {
            value - self.mean
        } else {
            (value - self.mean) / self.scale
        }
    }
}

impl Regressor for LinearRegressor {
    fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        let mut output = self.intercept;

        for (name, coefficient) in &self.numeric {
            let value = features
                .number(name)
                .ok_or_else(|| ModelError::MissingFeature(name.clone()))?;
            let value = match self.scaling.get(name) {
                Some(scaling) => scaling.apply(value),
                None => value,
            };
            output += coefficient * value;
        }

        for (name, levels) in &self.categorical {
            match features.get(name) {
                Some(FeatureValue::Category(level)) => {
                    output += levels.get(level).copied().unwrap_or(0.0);
                }
                Some(FeatureValue::Number(value)) => {
                    output += levels.get(&format_level(*value)).copied().unwrap_or(0.0);
                }
                None => return Err(ModelError::MissingFeature(name.clone())),
            }
        }

        if output.is_finite() {
            Ok(output)
        } else {
            Err(ModelError::NonFinite)
        }
    }
}

// Flags are stored as 0/1 but may be one-hot encoded by the exporter.
fn format_level(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
