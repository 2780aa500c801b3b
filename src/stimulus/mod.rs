//! Stimulus texts read by the simulated reader
//!
//! A corpus is loaded once before any run and shared read-only.

pub mod loader;
pub mod text;

use serde::{Deserialize, Serialize};

use crate::core::types::TextId;

pub use loader::{load_stimulus, parse_stimulus};
pub use text::{pre_process_string, Text, Word};

/// All texts of an experiment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    pub texts: Vec<Text>,
}

impl Corpus {
    pub fn new(texts: Vec<Text>) -> Self {
        Self { texts }
    }

    pub fn text(&self, id: TextId) -> Option<&Text> {
        self.texts.iter().find(|t| t.id == id)
    }

    pub fn word_count(&self) -> usize {
        self.texts.iter().map(|t| t.len()).sum()
    }

    /// Every distinct word form in the corpus, in order of first appearance
    pub fn vocabulary(&self) -> Vec<&str> {
        let mut seen = ahash::AHashSet::new();
        self.texts
            .iter()
            .flat_map(|t| t.words.iter())
            .filter(|w| seen.insert(w.text.as_str()))
            .map(|w| w.text.as_str())
            .collect()
    }
}
