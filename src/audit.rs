//! Agreement report between the clustering model and the threshold
//! classification that overrides it.
//!
//! The resolver discards the clustering candidate whenever the two disagree;
//! this report measures how often that happens over a sample set so the
//! override can be reviewed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

use crate::engine::Engine;
use crate::persona::{PersonaLabel, PersonaSource};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionEntry {
    pub model: PersonaLabel,
    pub resolved: PersonaLabel,
    pub count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgreementReport {
    pub sample_count: usize,
    pub failures: usize,
    pub model_candidates: usize,
    pub agreed: usize,
    pub overridden: usize,
    pub heuristic_only: usize,
    pub fallback: usize,
    /// Share of clustering candidates that matched the resolved persona.
    pub agreement_rate: f64,
    pub confusion: Vec<ConfusionEntry>,
    pub persona_distribution: BTreeMap<String, usize>,
    pub average_happiness: f64,
    pub average_stress: f64,
}

pub struct AuditRunner {
    pub samples: Vec<Map<String, Value>>,
}

impl AuditRunner {
    pub fn new(samples: Vec<Map<String, Value>>) -> Self {
        Self { samples }
    }

    pub fn run(&self, engine: &Engine) -> AgreementReport {
        let mut report = AgreementReport {
            sample_count: self.samples.len(),
            ..AgreementReport::default()
        };
        let mut confusion: BTreeMap<(PersonaLabel, PersonaLabel), usize> = BTreeMap::new();
        let mut happiness = Vec::new();
        let mut stress = Vec::new();

        for sample in &self.samples {
            let inference = match engine.infer_detailed(sample) {
                Ok(inference) => inference,
                Err(err) => {
                    warn!(error = %err, "audit sample failed");
                    report.failures += 1;
                    continue;
                }
            };

            let resolution = &inference.resolution;
            match resolution.source {
                PersonaSource::ModelAgreed => report.agreed += 1,
                PersonaSource::ModelOverridden => report.overridden += 1,
                PersonaSource::HeuristicOnly => report.heuristic_only += 1,
                PersonaSource::Fallback => report.fallback += 1,
            }
            if let Some(model) = resolution.model_candidate {
                report.model_candidates += 1;
                *confusion.entry((model, resolution.persona)).or_insert(0) += 1;
            }
            *report
                .persona_distribution
                .entry(resolution.persona.label().to_string())
                .or_insert(0) += 1;

            happiness.push(inference.prediction.happiness);
            stress.push(inference.prediction.stress);
        }

        report.agreement_rate = if report.model_candidates == 0 {
            0.0
        } else {
            report.agreed as f64 / report.model_candidates as f64
        };
        report.confusion = confusion
            .into_iter()
            .map(|((model, resolved), count)| ConfusionEntry {
                model,
                resolved,
                count,
            })
            .collect();
        report.average_happiness = mean(&happiness);
        report.average_stress = mean(&stress);
        report
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
