//! Word frequency table
//!
//! Frequencies are on a Zipf-like scale (log10 per billion words plus 3),
//! so values run roughly from 0 for unseen words up to about 7.5.

use std::fs;
use std::path::Path;

use ahash::AHashMap;

use crate::core::error::{ReaderError, Result};
use crate::stimulus::pre_process_string;

#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    frequencies: AHashMap<String, f64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(word, frequency)` pairs; words are pre-processed
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for (word, freq) in pairs {
            table.insert(word.as_ref(), freq);
        }
        table
    }

    /// Parse a JSON object mapping words to frequencies
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: std::collections::BTreeMap<String, f64> = serde_json::from_str(content)?;
        for (word, freq) in &raw {
            if !freq.is_finite() || *freq < 0.0 {
                return Err(ReaderError::Frequency(format!(
                    "frequency of '{}' must be finite and non-negative, got {}",
                    word, freq
                )));
            }
        }
        Ok(Self::from_pairs(raw))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Insert a word; a repeated form keeps the larger frequency
    pub fn insert(&mut self, word: &str, frequency: f64) {
        let key = pre_process_string(word);
        if key.is_empty() {
            return;
        }
        let slot = self.frequencies.entry(key).or_insert(frequency);
        if frequency > *slot {
            *slot = frequency;
        }
    }

    pub fn get(&self, word: &str) -> Option<f64> {
        self.frequencies.get(word).copied()
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// The `n` most frequent words, ties broken alphabetically
    pub fn most_frequent(&self, n: usize) -> Vec<(&str, f64)> {
        let mut all: Vec<(&str, f64)> = self.frequencies.iter().map(|(w, f)| (w.as_str(), *f)).collect();
        all.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        all.truncate(n);
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let table = FrequencyTable::from_json(r#"{"The": 7.4, "cat": 4.9}"#).unwrap();
        assert_eq!(table.get("the"), Some(7.4));
        assert_eq!(table.get("cat"), Some(4.9));
        assert_eq!(table.get("dog"), None);
    }

    #[test]
    fn test_negative_frequency_rejected() {
        let result = FrequencyTable::from_json(r#"{"x": -1.0}"#);
        assert!(matches!(result, Err(ReaderError::Frequency(msg)) if msg.contains("'x'")));
    }

    #[test]
    fn test_most_frequent_is_deterministic() {
        let table = FrequencyTable::from_pairs([("b", 3.0), ("a", 3.0), ("c", 5.0), ("d", 1.0)]);
        let top: Vec<&str> = table.most_frequent(3).into_iter().map(|(w, _)| w).collect();
        assert_eq!(top, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_duplicate_forms_keep_max() {
        let table = FrequencyTable::from_pairs([("Cat", 2.0), ("cat", 4.0), ("CAT!", 3.0)]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("cat"), Some(4.0));
    }
}
