//! Well-being inference engine.
//!
//! Turns a raw lifestyle and social-media usage record into bounded happiness
//! and stress scores, a usage persona and a short list of advice. Pipeline:
//! feature normalization → score estimation → engagement scoring → persona
//! reconciliation → recommendation composition.

pub mod audit;
pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod models;
pub mod persona;
pub mod recommendations;
pub mod scoring;
pub mod synthetic;
pub mod validation;

pub use config::EngineConfig;
pub use engine::{Engine, InferenceReport, Prediction};
pub use error::{ConfigError, InferenceError, LoadError, ModelError};
pub use features::{FeatureVector, UsageMetrics};
pub use models::{ModelContext, PersonaLabelMap, PersonaModel};
pub use persona::{PersonaLabel, PersonaResolution, PersonaSource};
pub use scoring::ScoreResult;

pub fn format_float(value: f64, digits: usize) -> String {
    format!("{:.1$}", value, digits)
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}
