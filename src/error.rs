use std::path::PathBuf;

use thiserror::Error;

/// Failure raised by an external predictor.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("feature `{0}` is missing from the input vector")]
    MissingFeature(String),

    #[error("expected {expected} values, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("model produced a non-finite output")]
    NonFinite,

    #[error("model has no clusters")]
    Empty,

    #[error("{0}")]
    Other(String),
}

/// Errors surfaced by `Engine::infer`.
///
/// Coercion defaults, a degraded clusterer and label map misses never show up
/// here; they are recovered inside the engine and only logged.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("{model} model invocation failed: {source}")]
    ModelInvocation {
        model: &'static str,
        #[source]
        source: ModelError,
    },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid model bundle: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to write config: {0}")]
    Write(#[source] std::io::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
