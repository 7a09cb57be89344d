use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::features::{UsageMetrics, USAGE_FEATURES};
use crate::models::ClusterModel;

/// Standard-scaled k-means assignment over the nine usage fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CentroidClusterer {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    pub centroids: Vec<Vec<f64>>,
}

impl CentroidClusterer {
    pub fn validate(&self) -> Result<(), ModelError> {
        let width = USAGE_FEATURES.len();
        if self.centroids.is_empty() {
            return Err(ModelError::Empty);
        }
        for values in [&self.mean, &self.scale]
            .into_iter()
            .chain(self.centroids.iter())
        {
            if values.len() != width {
                return Err(ModelError::DimensionMismatch {
                    expected: width,
                    actual: values.len(),
                });
            }
        }
        Ok(())
    }

    fn standardize(&self, values: &[f64]) -> Vec<f64> {
        values
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(value, (mean, scale))| {
                if *scale == 0.0 {
                    value - mean
                } else {
                    (value - mean) / scale
                }
            })
            .collect()
    }
}

impl ClusterModel for CentroidClusterer {
    fn predict(&self, usage: &UsageMetrics) -> Result<usize, ModelError> {
        self.validate()?;
        let point = self.standardize(&usage.to_vec());

        let mut best: Option<(usize, f64)> = None;
        for (index, centroid) in self.centroids.iter().enumerate() {
            let distance: f64 = point
                .iter()
                .zip(centroid.iter())
                .map(|(a, b)| (a - b) * (a - b))
                .sum();
            if !distance.is_finite() {
                return Err(ModelError::NonFinite);
            }
            // strict comparison keeps the lowest index on ties
            if best.map_or(true, |(_, current)| distance < current) {
                best = Some((index, distance));
            }
        }

        best.map(|(index, _)| index).ok_or(ModelError::Empty)
    }
}
