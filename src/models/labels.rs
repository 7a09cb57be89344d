use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::persona::PersonaLabel;

/// Cluster index → persona label text, as exported next to the clustering
/// model. Cluster ids carry no stable meaning across retrainings, so every
/// translation goes through this map.
///
/// Keys are normalized on construction: surrounding whitespace is dropped and
/// numeric keys are rewritten in canonical form (`" 01"` becomes `"1"`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, String>",
    into = "BTreeMap<String, String>"
)]
pub struct PersonaLabelMap {
    entries: BTreeMap<String, String>,
}

impl PersonaLabelMap {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(key, text)| (normalize_key(&key), text.trim().to_string()))
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    pub fn text_for(&self, index: usize) -> Option<&str> {
        self.entries.get(&index.to_string()).map(String::as_str)
    }

    pub fn label_for(&self, index: usize) -> Option<PersonaLabel> {
        self.text_for(index).and_then(PersonaLabel::from_label)
    }

    /// Lowest cluster index whose text is `label`.
    pub fn index_of(&self, label: PersonaLabel) -> Option<usize> {
        self.indexed()
            .filter(|(_, text)| text.as_str() == label.label())
            .map(|(index, _)| index)
            .min()
    }

    /// Distinct persona texts present in the map, in index order.
    pub fn personas(&self) -> Vec<String> {
        let mut indexed: Vec<(usize, &String)> = self.indexed().collect();
        indexed.sort_by_key(|(index, _)| *index);

        let mut personas: Vec<String> = Vec::new();
        for (_, text) in indexed {
            if !personas.contains(text) {
                personas.push(text.clone());
            }
        }
        personas
    }

    fn indexed(&self) -> impl Iterator<Item = (usize, &String)> {
        self.entries
            .iter()
            .filter_map(|(key, text)| key.parse::<usize>().ok().map(|index| (index, text)))
    }
}

fn normalize_key(key: &str) -> String {
    let key = key.trim();
    match key.parse::<usize>() {
        Ok(index) => index.to_string(),
        Err(_) => key.to_string(),
    }
}

impl From<BTreeMap<String, String>> for PersonaLabelMap {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self::new(entries)
    }
}

impl From<PersonaLabelMap> for BTreeMap<String, String> {
    fn from(map: PersonaLabelMap) -> Self {
        map.entries
    }
}

impl<const N: usize> From<[(usize, &str); N]> for PersonaLabelMap {
    fn from(pairs: [(usize, &str); N]) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(index, text)| (index.to_string(), text.to_string()))
                .collect(),
        )
    }
}
