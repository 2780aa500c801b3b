//! Next-word probability distributions

use serde::{Deserialize, Serialize};

const UNIFORM_TOLERANCE: f64 = 1e-9;

/// Probability mass over candidate words at one text position
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    candidates: Vec<(String, f64)>,
}

impl Distribution {
    /// Build from candidates; a repeated word keeps its larger probability
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut out: Vec<(String, f64)> = Vec::new();
        for (word, p) in candidates {
            let word = word.into();
            match out.iter_mut().find(|(w, _)| *w == word) {
                Some(slot) => slot.1 = slot.1.max(p),
                None => out.push((word, p)),
            }
        }
        out.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Self { candidates: out }
    }

    /// Scalar cloze probability for one word
    pub fn single(word: impl Into<String>, probability: f64) -> Self {
        Self::new([(word.into(), probability)])
    }

    pub fn candidates(&self) -> &[(String, f64)] {
        &self.candidates
    }

    pub fn probability(&self, word: &str) -> f64 {
        self.candidates.iter().find(|(w, _)| w == word).map(|(_, p)| *p).unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn total_mass(&self) -> f64 {
        self.candidates.iter().map(|(_, p)| p).sum()
    }

    /// False for the neutral prior: no candidates, or equal mass on all of them
    ///
    /// A single candidate is always informative, whatever its probability.
    pub fn is_informative(&self) -> bool {
        match self.candidates.as_slice() {
            [] => false,
            [_] => true,
            [(_, first), rest @ ..] => rest.iter().any(|(_, p)| (p - first).abs() > UNIFORM_TOLERANCE),
        }
    }
}
