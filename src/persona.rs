//! Persona reconciliation.
//!
//! Two sources produce a persona: the clustering model (through the label
//! map) and a threshold classification of the context-bearing engagement
//! score. Both are computed; the threshold classification is authoritative.
//! The clustering candidate is kept on the resolution for observability and
//! for the `audit` report.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::features::UsageMetrics;
use crate::models::{PersonaLabelMap, PersonaModel};
use crate::scoring::{EngagementScore, EngagementScorer, ScoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PersonaLabel {
    #[serde(rename = "Light User")]
    Light,
    #[serde(rename = "Moderate User")]
    Moderate,
    #[serde(rename = "Doom-Scroller")]
    DoomScroller,
}

impl PersonaLabel {
    pub const ALL: [PersonaLabel; 3] = [
        PersonaLabel::Light,
        PersonaLabel::Moderate,
        PersonaLabel::DoomScroller,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PersonaLabel::Light => "Light User",
            PersonaLabel::Moderate => "Moderate User",
            PersonaLabel::DoomScroller => "Doom-Scroller",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|label| label.label() == value)
    }

    /// Cluster index assumed when the label map has no entry for this label.
    pub fn default_index(self) -> usize {
        match self {
            PersonaLabel::DoomScroller => 0,
            PersonaLabel::Light => 1,
            PersonaLabel::Moderate => 2,
        }
    }
}

impl std::fmt::Display for PersonaLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersonaThresholds {
    pub low: f64,
    pub high: f64,
}

impl Default for PersonaThresholds {
    fn default() -> Self {
        Self {
            low: 90.0,
            high: 260.0,
        }
    }
}

impl PersonaThresholds {
    pub fn classify(&self, score: f64) -> PersonaLabel {
        if score > self.high {
            PersonaLabel::DoomScroller
        } else if score > self.low {
            PersonaLabel::Moderate
        } else {
            PersonaLabel::Light
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.low >= 0.0) || !(self.high > self.low) || !self.high.is_finite() {
            return Err(format!(
                "thresholds must satisfy 0 <= low < high (got low {}, high {})",
                self.low, self.high
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaSource {
    /// Clustering candidate matched the threshold classification.
    ModelAgreed,
    /// Clustering candidate was replaced by the threshold classification.
    ModelOverridden,
    /// No usable clustering candidate.
    HeuristicOnly,
    /// Clustering call failed; the secondary heuristic decided.
    Fallback,
}

impl PersonaSource {
    pub fn label(self) -> &'static str {
        match self {
            PersonaSource::ModelAgreed => "model_agreed",
            PersonaSource::ModelOverridden => "model_overridden",
            PersonaSource::HeuristicOnly => "heuristic_only",
            PersonaSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaResolution {
    pub persona: PersonaLabel,
    pub engagement_score: f64,
    pub model_candidate: Option<PersonaLabel>,
    pub cluster_index: Option<usize>,
    pub source: PersonaSource,
}

#[derive(Debug, Clone)]
pub struct PersonaResolver {
    fallback: EngagementScorer,
    thresholds: PersonaThresholds,
}

impl PersonaResolver {
    pub fn new(fallback: EngagementScorer, thresholds: PersonaThresholds) -> Self {
        Self {
            fallback,
            thresholds,
        }
    }

    pub fn thresholds(&self) -> &PersonaThresholds {
        &self.thresholds
    }

    pub fn resolve(
        &self,
        usage: &UsageMetrics,
        scores: &ScoreResult,
        engagement: &EngagementScore,
        model: &PersonaModel,
        labels: &PersonaLabelMap,
    ) -> PersonaResolution {
        let heuristic = self.thresholds.classify(engagement.value);

        let clusterer = match model {
            PersonaModel::Ready(clusterer) => clusterer,
            PersonaModel::Degraded | PersonaModel::Unavailable => {
                debug!(status = model.status(), "no clustering model, heuristic only");
                return PersonaResolution {
                    persona: heuristic,
                    engagement_score: engagement.value,
                    model_candidate: None,
                    cluster_index: None,
                    source: PersonaSource::HeuristicOnly,
                };
            }
        };

        let index = match clusterer.predict(usage) {
            Ok(index) => index,
            Err(err) => {
                warn!(error = %err, "clustering model failed, using fallback heuristic");
                return self.resolve_fallback(usage, scores, labels);
            }
        };

        let candidate = labels.label_for(index);
        let source = match candidate {
            Some(candidate) if candidate == heuristic => PersonaSource::ModelAgreed,
            Some(candidate) => {
                debug!(
                    model = candidate.label(),
                    heuristic = heuristic.label(),
                    score = engagement.value,
                    "threshold classification overrides clustering candidate"
                );
                PersonaSource::ModelOverridden
            }
            None => {
                warn!(
                    cluster = index,
                    text = labels.text_for(index).unwrap_or(""),
                    "cluster index has no persona in the label map"
                );
                PersonaSource::HeuristicOnly
            }
        };

        // Override point: the threshold classification is returned regardless
        // of the clustering candidate.
        PersonaResolution {
            persona: heuristic,
            engagement_score: engagement.value,
            model_candidate: candidate,
            cluster_index: Some(index),
            source,
        }
    }

    fn resolve_fallback(
        &self,
        usage: &UsageMetrics,
        scores: &ScoreResult,
        labels: &PersonaLabelMap,
    ) -> PersonaResolution {
        let engagement = self.fallback.score(usage, scores);
        let persona = self.thresholds.classify(engagement.value);
        let index = cluster_index_for(labels, persona);
        if labels.label_for(index) != Some(persona) {
            warn!(
                persona = persona.label(),
                cluster = index,
                text = labels.text_for(index).unwrap_or(""),
                "fallback cluster index maps to another label, keeping classified persona"
            );
        }

        PersonaResolution {
            persona,
            engagement_score: engagement.value,
            model_candidate: None,
            cluster_index: Some(index),
            source: PersonaSource::Fallback,
        }
    }
}

/// Cluster index whose label text is `persona`, or the documented default
/// when the map has no such label.
pub fn cluster_index_for(labels: &PersonaLabelMap, persona: PersonaLabel) -> usize {
    match labels.index_of(persona) {
        Some(index) => index,
        None => {
            let index = persona.default_index();
            warn!(
                persona = persona.label(),
                default_index = index,
                "persona missing from label map, using default cluster index"
            );
            index
        }
    }
}
