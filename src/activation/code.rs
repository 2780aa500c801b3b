//! Ngram occurrences of a trial's words, resolved to lexicon ngram ids

use crate::lexicon::{word_occurrences, Lexicon};
use crate::stimulus::Text;

/// An ngram occurrence at fixed letter offsets of the trial text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CodedOccurrence {
    pub ngram: usize,
    pub first: usize,
    pub second: Option<usize>,
    pub weight: f64,
}

/// Per-word ngram occurrences; computed once per trial, shared by runs
#[derive(Debug, Clone, Default)]
pub struct TrialCode {
    words: Vec<Vec<CodedOccurrence>>,
}

impl TrialCode {
    /// Ngrams the lexicon does not know cannot excite any word and are dropped
    pub fn new(text: &Text, lexicon: &Lexicon, gap: usize) -> Self {
        let words = text
            .words
            .iter()
            .map(|word| {
                word_occurrences(&word.text, word.start, gap)
                    .into_iter()
                    .filter_map(|occ| {
                        lexicon.ngram_id(&occ.ngram).map(|ngram| CodedOccurrence {
                            ngram,
                            first: occ.first,
                            second: occ.second,
                            weight: occ.weight,
                        })
                    })
                    .collect()
            })
            .collect();
        Self { words }
    }

    pub fn word(&self, position: usize) -> &[CodedOccurrence] {
        self.words.get(position).map(|w| w.as_slice()).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Parameters;
    use crate::lexicon::FrequencyTable;

    #[test]
    fn test_offsets_follow_layout() {
        let text = Text::from_words(0, &["ab", "cd"]);
        let lexicon = Lexicon::build(
            vec![("ab".to_string(), None), ("cd".to_string(), None)],
            &FrequencyTable::new(),
            &Parameters::default(),
        );
        let code = TrialCode::new(&text, &lexicon, 3);
        let cd = lexicon.ngram_id("cd").unwrap();
        let occ = code.word(1).iter().find(|o| o.ngram == cd).unwrap();
        assert_eq!(occ.first, 3);
        assert_eq!(occ.second, Some(4));
        assert!(code.word(7).is_empty());
    }
}
