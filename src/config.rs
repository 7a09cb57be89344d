use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::persona::PersonaThresholds;
use crate::recommendations::DEFAULT_MAX_RECOMMENDATIONS;
use crate::scoring::{EngagementWeights, WellbeingPenaltyConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    pub dir: PathBuf,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("models"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsConfig {
    pub max: usize,
}

impl Default for RecommendationsConfig {
    fn default() -> Self {
        Self {
            max: DEFAULT_MAX_RECOMMENDATIONS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub models: ModelsConfig,
    pub engagement: EngagementWeights,
    pub fallback: EngagementWeights,
    pub penalty: WellbeingPenaltyConfig,
    pub thresholds: PersonaThresholds,
    pub recommendations: RecommendationsConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            models: ModelsConfig::default(),
            engagement: EngagementWeights::default(),
            fallback: EngagementWeights::fallback(),
            penalty: WellbeingPenaltyConfig::default(),
            thresholds: PersonaThresholds::default(),
            recommendations: RecommendationsConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        let config_path = path.or_else(default_config_path);
        let mut config = match config_path.as_ref() {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
                Self::from_toml(&contents)?
            }
            _ => EngineConfig::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok((config, config_path))
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn write(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Write)?;
        }
        let payload = toml::to_string_pretty(self)?;
        std::fs::write(path, payload).map_err(ConfigError::Write)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engagement
            .validate("engagement")
            .and_then(|_| self.fallback.validate("fallback"))
            .and_then(|_| self.penalty.validate())
            .and_then(|_| self.thresholds.validate())
            .map_err(ConfigError::Invalid)?;
        if self.recommendations.max == 0 {
            return Err(ConfigError::Invalid(
                "recommendations.max must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = env::var("WELLBEING_MODELS_DIR") {
            if !dir.trim().is_empty() {
                self.models.dir = PathBuf::from(dir);
            }
        }
        if let Ok(low) = env::var("PERSONA_LOW_THRESHOLD") {
            if let Ok(value) = low.parse::<f64>() {
                self.thresholds.low = value;
            }
        }
        if let Ok(high) = env::var("PERSONA_HIGH_THRESHOLD") {
            if let Ok(value) = high.parse::<f64>() {
                self.thresholds.high = value;
            }
        }
        if let Ok(max) = env::var("MAX_RECOMMENDATIONS") {
            if let Ok(value) = max.parse::<usize>() {
                self.recommendations.max = value;
            }
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    env::var("ENGINE_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/engine.toml")))
}
