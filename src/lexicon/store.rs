//! The lexicon: every word form the reader can recognize
//!
//! Built once per experiment from the stimulus vocabulary, the candidates of
//! informative predictability distributions and, optionally, the most
//! frequent words of the frequency table. Shared read-only by all runs.

use ahash::AHashMap;

use crate::core::config::Parameters;
use crate::lexicon::frequency::FrequencyTable;
use crate::lexicon::ngrams::word_ngrams;

/// A word unit of the lexicon
#[derive(Debug, Clone)]
pub struct LexiconEntry {
    pub text: String,
    pub length: usize,
    pub frequency: f64,
    /// Activation needed for recognition
    pub threshold: f64,
    /// Level activation decays back to
    pub resting: f64,
    /// Ngram ids of the word's code
    pub ngrams: Vec<usize>,
    bigrams: Vec<usize>,
    letters: Vec<char>,
}

#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: Vec<LexiconEntry>,
    index: AHashMap<String, usize>,
    ngram_ids: AHashMap<String, usize>,
    /// For each ngram id, the entries whose code contains it
    ngram_entries: Vec<Vec<usize>>,
    /// Sparse overlap matrix: (neighbour, overlap beyond `min_overlap`)
    overlap: Vec<Vec<(usize, f64)>>,
}

/// True when two lengths are close enough for the words to compete
pub fn is_similar_length(a: usize, b: usize, similarity: f64) -> bool {
    ((a as f64) - (b as f64)).abs() < similarity * a.max(b) as f64
}

impl Lexicon {
    /// Build the lexicon; a word's own frequency wins over the table
    pub fn build<I>(words: I, table: &FrequencyTable, params: &Parameters) -> Self
    where
        I: IntoIterator<Item = (String, Option<f64>)>,
    {
        let mut lexicon = Lexicon::default();
        let mut frequencies: Vec<f64> = Vec::new();

        let extra = table
            .most_frequent(params.lexicon_extra_words)
            .into_iter()
            .map(|(w, f)| (w.to_string(), Some(f)));

        for (word, given) in words.into_iter().chain(extra) {
            if word.is_empty() {
                continue;
            }
            let frequency = given.or_else(|| table.get(&word)).unwrap_or(params.missing_frequency);
            if let Some(&existing) = lexicon.index.get(&word) {
                if frequency > frequencies[existing] {
                    frequencies[existing] = frequency;
                }
                continue;
            }
            lexicon.push_word(word, params.bigram_gap);
            frequencies.push(frequency);
        }

        let max_frequency = frequencies.iter().cloned().fold(0.0_f64, f64::max);
        for (entry, frequency) in lexicon.entries.iter_mut().zip(frequencies) {
            let relative = if max_frequency > 0.0 { frequency / max_frequency } else { 0.0 };
            entry.frequency = frequency;
            entry.threshold = params.max_threshold * (1.0 - params.freq_weight * relative);
            entry.resting = params.min_activity + params.resting_frequency_gain * relative;
        }

        lexicon.build_overlap(params);

        tracing::debug!(
            "Lexicon built: {} entries, {} ngrams",
            lexicon.entries.len(),
            lexicon.ngram_ids.len()
        );
        lexicon
    }

    fn push_word(&mut self, word: String, gap: usize) {
        let id = self.entries.len();
        let mut ngrams = Vec::new();
        let mut bigrams = Vec::new();

        for ngram in word_ngrams(&word, gap) {
            let is_bigram = ngram.chars().count() == 2;
            let next_id = self.ngram_ids.len();
            let ngram_id = *self.ngram_ids.entry(ngram).or_insert(next_id);
            if ngram_id == self.ngram_entries.len() {
                self.ngram_entries.push(Vec::new());
            }
            self.ngram_entries[ngram_id].push(id);
            ngrams.push(ngram_id);
            if is_bigram {
                bigrams.push(ngram_id);
            }
        }
        bigrams.sort_unstable();

        let mut letters: Vec<char> = word.chars().collect();
        letters.sort_unstable();
        letters.dedup();

        self.index.insert(word.clone(), id);
        self.entries.push(LexiconEntry {
            length: word.chars().count(),
            text: word,
            frequency: 0.0,
            threshold: 0.0,
            resting: 0.0,
            ngrams,
            bigrams,
            letters,
        });
    }

    fn build_overlap(&mut self, params: &Parameters) {
        let n = self.entries.len();
        self.overlap = vec![Vec::new(); n];

        for a in 0..n {
            for b in (a + 1)..n {
                let (ea, eb) = (&self.entries[a], &self.entries[b]);
                if !is_similar_length(ea.length, eb.length, params.length_similarity) {
                    continue;
                }
                let shared = count_shared(&ea.bigrams, &eb.bigrams) + count_shared(&ea.letters, &eb.letters);
                if shared > params.min_overlap {
                    let weight = (shared - params.min_overlap) as f64;
                    self.overlap[a].push((b, weight));
                    self.overlap[b].push((a, weight));
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LexiconEntry] {
        &self.entries
    }

    pub fn entry(&self, id: usize) -> &LexiconEntry {
        &self.entries[id]
    }

    pub fn lookup(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    pub fn ngram_count(&self) -> usize {
        self.ngram_ids.len()
    }

    pub fn ngram_id(&self, ngram: &str) -> Option<usize> {
        self.ngram_ids.get(ngram).copied()
    }

    pub fn entries_with_ngram(&self, ngram_id: usize) -> &[usize] {
        &self.ngram_entries[ngram_id]
    }

    /// Competitors of an entry with their overlap weights
    pub fn neighbours(&self, id: usize) -> &[(usize, f64)] {
        &self.overlap[id]
    }
}

/// Size of the intersection of two sorted, deduplicated slices
fn count_shared<T: Ord>(a: &[T], b: &[T]) -> usize {
    let (mut i, mut j, mut shared) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                shared += 1;
                i += 1;
                j += 1;
            }
        }
    }
    shared
}
