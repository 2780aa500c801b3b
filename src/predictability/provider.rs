//! Precomputed predictability lookup
//!
//! The language-model or cloze step runs elsewhere and leaves a JSON file
//! shaped `{ "<text_id>": { "<position>": { "<word>": probability } } }`.
//! The provider only reads it.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::core::config::PredictabilityMode;
use crate::core::error::{Anomaly, ReaderError, Result};
use crate::core::types::TextId;
use crate::lexicon::Lexicon;
use crate::predictability::distribution::Distribution;
use crate::stimulus::{pre_process_string, Corpus, Text};

const MASS_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Default)]
pub struct PredictabilityProvider {
    entries: BTreeMap<(TextId, usize), Distribution>,
}

/// Predictions of one trial, resolved against the lexicon
///
/// `by_position[p]` lists `(lexicon id, probability)` pairs that may be
/// pre-activated while position `p` is inside the perceptual span.
#[derive(Debug, Clone, Default)]
pub struct TrialPredictions {
    pub by_position: Vec<Vec<(usize, f64)>>,
}

impl TrialPredictions {
    /// No pre-activation anywhere
    pub fn neutral(len: usize) -> Self {
        Self { by_position: vec![Vec::new(); len] }
    }

    pub fn at(&self, position: usize) -> &[(usize, f64)] {
        self.by_position.get(position).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

impl PredictabilityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, text: TextId, position: usize, distribution: Distribution) {
        self.entries.insert((text, position), distribution);
    }

    /// Distribution at a position, or `None` when the lookup has no entry
    pub fn lookup(&self, text: TextId, position: usize) -> Option<&Distribution> {
        self.entries.get(&(text, position))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse the JSON lookup, validating every distribution
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: BTreeMap<String, BTreeMap<String, BTreeMap<String, f64>>> = serde_json::from_str(content)?;
        let mut provider = Self::new();

        for (text_key, positions) in raw {
            let text: u32 = text_key
                .parse()
                .map_err(|_| ReaderError::Predictability(format!("bad text id '{}'", text_key)))?;
            for (pos_key, words) in positions {
                let position: usize = pos_key.parse().map_err(|_| {
                    ReaderError::Predictability(format!("bad position '{}' in text {}", pos_key, text))
                })?;
                let mut candidates = Vec::with_capacity(words.len());
                for (word, p) in words {
                    if !(0.0..=1.0).contains(&p) {
                        return Err(ReaderError::Predictability(format!(
                            "probability {} of '{}' at text {} position {} is outside [0, 1]",
                            p, word, text, position
                        )));
                    }
                    let word = pre_process_string(&word);
                    if !word.is_empty() {
                        candidates.push((word, p));
                    }
                }
                let distribution = Distribution::new(candidates);
                if distribution.total_mass() > 1.0 + MASS_TOLERANCE {
                    return Err(ReaderError::Predictability(format!(
                        "mass at text {} position {} sums to {:.4}",
                        text,
                        position,
                        distribution.total_mass()
                    )));
                }
                provider.insert(TextId(text), position, distribution);
            }
        }

        tracing::info!("Loaded predictability for {} positions", provider.len());
        Ok(provider)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Words the lexicon must contain for the given mode
    pub fn candidate_words(&self, corpus: &Corpus, mode: PredictabilityMode) -> Vec<String> {
        if mode != PredictabilityMode::LanguageModel {
            return Vec::new();
        }
        let mut words = Vec::new();
        for text in &corpus.texts {
            for position in 0..text.len() {
                if let Some(dist) = self.lookup(text.id, position).filter(|d| d.is_informative()) {
                    words.extend(dist.candidates().iter().map(|(w, _)| w.clone()));
                }
            }
        }
        words
    }

    /// Resolve a trial's predictions; misses become neutral priors
    ///
    /// Position 0 has no preceding context and is never predicted.
    pub fn resolve(
        &self,
        text: &Text,
        lexicon: &Lexicon,
        mode: PredictabilityMode,
        anomalies: &mut Vec<Anomaly>,
    ) -> TrialPredictions {
        let mut predictions = TrialPredictions::neutral(text.len());
        if mode == PredictabilityMode::Disabled {
            return predictions;
        }

        for word in text.words.iter().skip(1) {
            let Some(dist) = self.lookup(text.id, word.index) else {
                tracing::warn!(
                    "No predictability for text {} position {}; using neutral prior",
                    text.id.0,
                    word.index
                );
                anomalies.push(Anomaly::MissingPredictability { text: text.id, position: word.index });
                continue;
            };
            if !dist.is_informative() {
                continue;
            }

            let slot = &mut predictions.by_position[word.index];
            match mode {
                PredictabilityMode::Cloze => {
                    let p = dist.probability(&word.text);
                    if let (true, Some(id)) = (p > 0.0, lexicon.lookup(&word.text)) {
                        slot.push((id, p));
                    }
                }
                PredictabilityMode::LanguageModel => {
                    for (candidate, p) in dist.candidates() {
                        if let (true, Some(id)) = (*p > 0.0, lexicon.lookup(candidate)) {
                            slot.push((id, *p));
                        }
                    }
                }
                PredictabilityMode::Disabled => {}
            }
        }

        predictions
    }
}
