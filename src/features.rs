//! Raw record → typed, ordered feature vector.
//!
//! Coercion is permissive: anything missing or unparsable becomes `0.0` (or
//! `0` for flags) and the call never fails. Range checks live in `validation`.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Feature names in the order the default models were trained with.
pub const FEATURE_NAMES: [&str; 28] = [
    "age",
    "gender",
    "country",
    "urban_rural",
    "income_level",
    "employment_status",
    "education_level",
    "relationship_status",
    "has_children",
    "sleep_hours_per_night",
    "exercise_hours_per_week",
    "daily_steps_count",
    "diet_quality",
    "smoking",
    "alcohol_frequency",
    "body_mass_index",
    "weekly_work_hours",
    "hobbies_count",
    "social_events_per_month",
    "daily_active_minutes_instagram",
    "sessions_per_day",
    "reels_watched_per_day",
    "stories_viewed_per_day",
    "time_on_feed_per_day",
    "time_on_reels_per_day",
    "likes_given_per_day",
    "comments_written_per_day",
    "notification_response_rate",
];

pub const NUMERIC_FEATURES: [&str; 17] = [
    "age",
    "sleep_hours_per_night",
    "exercise_hours_per_week",
    "daily_steps_count",
    "body_mass_index",
    "weekly_work_hours",
    "hobbies_count",
    "social_events_per_month",
    "daily_active_minutes_instagram",
    "sessions_per_day",
    "reels_watched_per_day",
    "stories_viewed_per_day",
    "time_on_feed_per_day",
    "time_on_reels_per_day",
    "likes_given_per_day",
    "comments_written_per_day",
    "notification_response_rate",
];

pub const FLAG_FEATURES: [&str; 2] = ["has_children", "smoking"];

/// Usage fields in the order the clustering model was trained with.
pub const USAGE_FEATURES: [&str; 9] = [
    "daily_active_minutes_instagram",
    "sessions_per_day",
    "reels_watched_per_day",
    "stories_viewed_per_day",
    "time_on_feed_per_day",
    "time_on_reels_per_day",
    "likes_given_per_day",
    "comments_written_per_day",
    "notification_response_rate",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Numeric,
    Flag,
    Categorical,
}

impl FeatureKind {
    pub fn of(name: &str) -> Self {
        if NUMERIC_FEATURES.contains(&name) {
            FeatureKind::Numeric
        } else if FLAG_FEATURES.contains(&name) {
            FeatureKind::Flag
        } else {
            FeatureKind::Categorical
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Category(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FeatureVector {
    entries: Vec<(String, FeatureValue)>,
}

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, value)| value)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.get(name) {
            Some(FeatureValue::Number(value)) => Some(*value),
            _ => None,
        }
    }

    /// Numeric value of `name`, or `default` when the model bundle does not
    /// carry that feature.
    pub fn number_or(&self, name: &str, default: f64) -> f64 {
        self.number(name).unwrap_or(default)
    }

    pub fn category(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(FeatureValue::Category(value)) => Some(value.as_str()),
            _ => None,
        }
    }
}

/// The nine usage-pattern fields consumed by the engagement scorer and the
/// clustering model.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct UsageMetrics {
    pub daily_active_minutes: f64,
    pub sessions_per_day: f64,
    pub reels_per_day: f64,
    pub stories_per_day: f64,
    pub feed_minutes: f64,
    pub reels_minutes: f64,
    pub likes_per_day: f64,
    pub comments_per_day: f64,
    pub notification_response_rate: f64,
}

impl UsageMetrics {
    pub fn from_features(features: &FeatureVector) -> Self {
        let value = |name: &str| features.number_or(name, 0.0);
        Self {
            daily_active_minutes: value("daily_active_minutes_instagram"),
            sessions_per_day: value("sessions_per_day"),
            reels_per_day: value("reels_watched_per_day"),
            stories_per_day: value("stories_viewed_per_day"),
            feed_minutes: value("time_on_feed_per_day"),
            reels_minutes: value("time_on_reels_per_day"),
            likes_per_day: value("likes_given_per_day"),
            comments_per_day: value("comments_written_per_day"),
            notification_response_rate: value("notification_response_rate"),
        }
    }

    /// Values in `USAGE_FEATURES` order.
    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.daily_active_minutes,
            self.sessions_per_day,
            self.reels_per_day,
            self.stories_per_day,
            self.feed_minutes,
            self.reels_minutes,
            self.likes_per_day,
            self.comments_per_day,
            self.notification_response_rate,
        ]
    }
}

/// Builds a vector holding exactly `feature_names`, in that order.
pub fn normalize<S: AsRef<str>>(raw: &Map<String, Value>, feature_names: &[S]) -> FeatureVector {
    let entries = feature_names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            let raw_value = raw.get(name);
            let value = match FeatureKind::of(name) {
                FeatureKind::Numeric => FeatureValue::Number(coerce_number(name, raw_value)),
                FeatureKind::Flag => FeatureValue::Number(coerce_flag(raw_value)),
                FeatureKind::Categorical => FeatureValue::Category(coerce_category(raw_value)),
            };
            (name.to_string(), value)
        })
        .collect();

    FeatureVector { entries }
}

fn coerce_number(name: &str, value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Some(Value::Bool(flag)) => Some(bool_to_f64(*flag)),
        _ => None,
    };

    match parsed.filter(|number| number.is_finite()) {
        Some(number) => number,
        None => {
            debug!(feature = name, "defaulting missing or unparsable value to 0.0");
            0.0
        }
    }
}

fn coerce_flag(value: Option<&Value>) -> f64 {
    let affirmative = match value {
        Some(Value::String(text)) => {
            matches!(text.trim().to_lowercase().as_str(), "yes" | "true" | "1")
        }
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().map(|n| n != 0.0).unwrap_or(false),
        _ => false,
    };
    bool_to_f64(affirmative)
}

fn coerce_category(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn bool_to_f64(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}
