//! Words, texts and their letter layout

use serde::{Deserialize, Serialize};

use crate::core::types::TextId;

/// A single token of a text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Position in the text (0-based)
    pub index: usize,
    pub text: String,
    /// Frequency supplied with the stimulus, if any
    pub frequency: Option<f64>,
    /// Offset of the first letter in the laid-out text
    pub start: usize,
    /// Offset of the last letter in the laid-out text
    pub end: usize,
}

impl Word {
    /// Orthographic length in letters
    pub fn length(&self) -> usize {
        self.end + 1 - self.start
    }

    /// Letter offset of the word centre
    pub fn center(&self) -> f64 {
        self.start as f64 + (self.length() as f64 - 1.0) / 2.0
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset <= self.end
    }
}

/// One trial: a text laid out on a single line with single spaces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub id: TextId,
    pub words: Vec<Word>,
    letters: Vec<char>,
}

impl Text {
    /// Lay out already pre-processed words
    pub fn new(id: TextId, tokens: Vec<(String, Option<f64>)>) -> Self {
        let mut words = Vec::with_capacity(tokens.len());
        let mut letters = Vec::new();

        for (index, (token, frequency)) in tokens.into_iter().enumerate() {
            if index > 0 {
                letters.push(' ');
            }
            let start = letters.len();
            letters.extend(token.chars());
            let end = letters.len().saturating_sub(1).max(start);
            words.push(Word { index, text: token, frequency, start, end });
        }

        Self { id, words, letters }
    }

    /// Convenience constructor used by tests and demos
    pub fn from_words(id: u32, words: &[&str]) -> Self {
        Self::new(
            TextId(id),
            words.iter().map(|w| (pre_process_string(w), None)).collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of letter positions, spaces included
    pub fn letter_count(&self) -> usize {
        self.letters.len()
    }

    pub fn letter(&self, offset: usize) -> Option<char> {
        self.letters.get(offset).copied()
    }

    pub fn last_offset(&self) -> usize {
        self.letters.len().saturating_sub(1)
    }

    /// Word occupying a letter offset; a space belongs to the following word
    pub fn word_at_offset(&self, offset: usize) -> usize {
        match self.words.iter().position(|w| offset <= w.end) {
            Some(index) => index,
            None => self.words.len().saturating_sub(1),
        }
    }

    pub fn word(&self, index: usize) -> Option<&Word> {
        self.words.get(index)
    }
}

/// Lower-case a token and strip everything that is not a letter or digit
pub fn pre_process_string(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}
