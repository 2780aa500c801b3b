//! Word-activation dynamics
//!
//! One call to [`ActivationEngine::step`] advances every lexicon entry by a
//! single processing cycle. All inputs are computed from the activations of
//! the previous cycle before any activation changes, so the update is an
//! atomic batch over the whole lexicon.

use crate::core::config::{CombinationRule, Parameters};
use crate::lexicon::Lexicon;
use crate::perception::{letter_strength, AttentionWindow, PerceptualSpan, VisualAcuity};

use super::code::TrialCode;

/// Activation of every lexicon entry
#[derive(Debug, Clone, PartialEq)]
pub struct ActivationState {
    values: Vec<f64>,
}

impl ActivationState {
    /// Every entry at its resting level
    pub fn resting(lexicon: &Lexicon) -> Self {
        Self { values: lexicon.entries().iter().map(|e| e.resting).collect() }
    }

    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn get(&self, entry: usize) -> f64 {
        self.values.get(entry).copied().unwrap_or(0.0)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// What the reader sees and expects during one cycle
#[derive(Debug, Clone, Copy)]
pub struct CycleInput<'c> {
    pub code: &'c TrialCode,
    pub span: &'c PerceptualSpan,
    pub eye: usize,
    pub attention: &'c AttentionWindow,
    /// Pre-activation per lexicon entry, as produced by
    /// [`compute_preactivation`](super::compute_preactivation)
    pub preactivation: &'c [(usize, f64)],
}

pub struct ActivationEngine<'a> {
    lexicon: &'a Lexicon,
    params: &'a Parameters,
    acuity: VisualAcuity,
    state: ActivationState,
    // scratch, reused across cycles
    ngram_input: Vec<f64>,
    touched: Vec<usize>,
    word_input: Vec<f64>,
}

impl<'a> ActivationEngine<'a> {
    pub fn new(lexicon: &'a Lexicon, params: &'a Parameters) -> Self {
        Self {
            lexicon,
            params,
            acuity: VisualAcuity::new(params),
            state: ActivationState::resting(lexicon),
            ngram_input: vec![0.0; lexicon.ngram_count()],
            touched: Vec::new(),
            word_input: vec![0.0; lexicon.len()],
        }
    }

    pub fn state(&self) -> &ActivationState {
        &self.state
    }

    pub fn activation(&self, entry: usize) -> f64 {
        self.state.get(entry)
    }

    /// Return every entry to its resting level
    pub fn reset(&mut self) {
        self.state = ActivationState::resting(self.lexicon);
    }

    /// Drop an entry to the activity floor once it has been matched to a word
    pub fn suppress(&mut self, entry: usize) {
        if let Some(value) = self.state.values.get_mut(entry) {
            *value = self.params.min_activity;
        }
    }

    /// Advance all activations by one cycle
    pub fn step(&mut self, input: &CycleInput<'_>) {
        self.collect_ngram_input(input);
        self.collect_word_input(input.preactivation);
        self.apply_inhibition();

        let params = self.params;
        for (id, value) in self.state.values.iter_mut().enumerate() {
            let a = *value;
            let rest = self.lexicon.entry(id).resting;
            let delta = (params.max_activity - a) * self.word_input[id] + (a - rest) * params.decay;
            let next = a + delta;
            *value = if next.is_finite() {
                next.clamp(params.min_activity, params.max_activity)
            } else {
                params.min_activity
            };
        }
    }

    /// Visual strength of every ngram in the span's words
    fn collect_ngram_input(&mut self, input: &CycleInput<'_>) {
        for &g in &self.touched {
            self.ngram_input[g] = 0.0;
        }
        self.touched.clear();

        for &position in input.span.positions() {
            for occ in input.code.word(position) {
                let s1 = letter_strength(&self.acuity, input.attention, occ.first, input.eye);
                let strength = match occ.second {
                    Some(second) => {
                        let s2 = letter_strength(&self.acuity, input.attention, second, input.eye);
                        (s1 * s2).sqrt() * occ.weight
                    }
                    None => s1 * occ.weight,
                };
                if self.ngram_input[occ.ngram] == 0.0 {
                    self.touched.push(occ.ngram);
                }
                self.ngram_input[occ.ngram] += strength;
            }
        }
    }

    /// Bottom-up excitation per entry, combined with pre-activation
    fn collect_word_input(&mut self, preactivation: &[(usize, f64)]) {
        self.word_input.iter_mut().for_each(|x| *x = 0.0);

        for &g in &self.touched {
            let strength = self.ngram_input[g];
            for &entry in self.lexicon.entries_with_ngram(g) {
                let n = self.lexicon.entry(entry).ngrams.len().max(1) as f64;
                self.word_input[entry] += self.params.bigram_to_word_excitation * strength / n;
            }
        }

        for &(entry, pre) in preactivation {
            if let Some(slot) = self.word_input.get_mut(entry) {
                match self.params.combination_rule {
                    CombinationRule::Additive => *slot += pre,
                    CombinationRule::Multiplicative => *slot *= 1.0 + pre,
                }
            }
        }
    }

    /// Lateral inhibition between orthographically overlapping entries
    fn apply_inhibition(&mut self) {
        if self.params.word_inhibition == 0.0 {
            return;
        }
        let floor = self.params.min_activity;
        for id in 0..self.word_input.len() {
            let inhibition: f64 = self
                .lexicon
                .neighbours(id)
                .iter()
                .map(|&(other, overlap)| {
                    let a = (self.state.get(other) - floor).max(0.0);
                    overlap * a * a
                })
                .sum();
            self.word_input[id] -= self.params.word_inhibition * inhibition;
        }
    }
}
