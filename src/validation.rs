//! Range checks run by the CLI and HTTP layers before inference.
//!
//! The engine never calls this; it only applies its own permissive defaults.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::features::normalize;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{label} must be between {min} and {max}")]
pub struct RangeError {
    pub field: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
}

const RANGES: [RangeError; 4] = [
    RangeError {
        field: "age",
        label: "Age",
        min: 13.0,
        max: 100.0,
    },
    RangeError {
        field: "sleep_hours_per_night",
        label: "Sleep hours",
        min: 0.0,
        max: 24.0,
    },
    RangeError {
        field: "body_mass_index",
        label: "BMI",
        min: 10.0,
        max: 60.0,
    },
    RangeError {
        field: "notification_response_rate",
        label: "Notification response rate",
        min: 0.0,
        max: 1.0,
    },
];

/// First violated range, in a fixed order. Missing values are checked as 0.
pub fn validate_ranges(raw: &Map<String, Value>) -> Result<(), RangeError> {
    let fields: Vec<&str> = RANGES.iter().map(|range| range.field).collect();
    let values = normalize(raw, fields.as_slice());

    for range in RANGES.iter() {
        let value = values.number_or(range.field, 0.0);
        if value < range.min || value > range.max {
            return Err(range.clone());
        }
    }
    Ok(())
}
