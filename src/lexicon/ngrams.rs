//! Open-bigram and monogram coding of letter strings
//!
//! A word is coded by its letters (monograms), by ordered letter pairs with
//! at most `gap` letters between them (open bigrams), and by two boundary
//! bigrams `_x` / `x_` marking its first and last letter. Occurrences near a
//! word edge weigh more than interior ones.

/// Marker for the space before or after a word
pub const BOUNDARY: char = '_';

const INTERIOR_WEIGHT: f64 = 0.5;
const EDGE_WEIGHT: f64 = 1.0;
const SPANNING_WEIGHT: f64 = 2.0;

/// One ngram found at concrete letter offsets
#[derive(Debug, Clone, PartialEq)]
pub struct NgramOccurrence {
    pub ngram: String,
    /// Offset of the first letter
    pub first: usize,
    /// Offset of the second letter; `None` for monograms and boundary bigrams
    pub second: Option<usize>,
    pub weight: f64,
}

impl NgramOccurrence {
    pub fn is_bigram(&self) -> bool {
        self.ngram.chars().count() == 2
    }
}

/// Every ngram occurrence of a word laid out from offset `start`
pub fn word_occurrences(word: &str, start: usize, gap: usize) -> Vec<NgramOccurrence> {
    let letters: Vec<char> = word.chars().collect();
    let n = letters.len();
    let mut out = Vec::new();
    if n == 0 {
        return out;
    }
    let last = n - 1;

    out.push(NgramOccurrence {
        ngram: format!("{}{}", BOUNDARY, letters[0]),
        first: start,
        second: None,
        weight: EDGE_WEIGHT,
    });
    out.push(NgramOccurrence {
        ngram: format!("{}{}", letters[last], BOUNDARY),
        first: start + last,
        second: None,
        weight: EDGE_WEIGHT,
    });

    for i in 0..n {
        for j in (i + 1)..n.min(i + gap + 2) {
            out.push(NgramOccurrence {
                ngram: format!("{}{}", letters[i], letters[j]),
                first: start + i,
                second: Some(start + j),
                weight: bigram_edge_weight(i, j, last),
            });
        }
    }

    for (i, letter) in letters.iter().enumerate() {
        out.push(NgramOccurrence {
            ngram: letter.to_string(),
            first: start + i,
            second: None,
            weight: monogram_edge_weight(i, last),
        });
    }

    out
}

/// Distinct ngram types of a word (its lexical code)
pub fn word_ngrams(word: &str, gap: usize) -> Vec<String> {
    let mut ngrams: Vec<String> = word_occurrences(word, 0, gap).into_iter().map(|o| o.ngram).collect();
    ngrams.sort();
    ngrams.dedup();
    ngrams
}

fn bigram_edge_weight(i: usize, j: usize, last: usize) -> f64 {
    if i == 0 && j == last {
        SPANNING_WEIGHT
    } else if i == 0 || j == last {
        EDGE_WEIGHT
    } else {
        INTERIOR_WEIGHT
    }
}

fn monogram_edge_weight(i: usize, last: usize) -> f64 {
    if last == 0 {
        SPANNING_WEIGHT
    } else if i == 0 || i == last {
        EDGE_WEIGHT
    } else {
        INTERIOR_WEIGHT
    }
}
