//! Reading tasks
//!
//! A task decides which texts make up the trials, where the eye starts and
//! when a trial is over. Continuous silent reading is the only task; other
//! paradigms plug in here.

use crate::core::config::Parameters;
use crate::saccade::{SaccadeKind, SaccadeTarget};
use crate::stimulus::{Corpus, Text};

pub trait ReadingTask: Send + Sync {
    fn name(&self) -> &str;

    /// Texts to read, in trial order
    fn trials<'c>(&self, corpus: &'c Corpus) -> Vec<&'c Text>;

    /// Letter offset of the first fixation
    fn first_fixation(&self, text: &Text, params: &Parameters) -> usize;

    /// Whether the eye stays put instead of programming a saccade
    ///
    /// `done` is true once the fixated word is recognized or abandoned.
    fn holds_fixation(&self, text: &Text, fixated: usize, done: bool) -> bool;

    /// Whether executing `target` ends the trial
    fn is_finished(&self, target: &SaccadeTarget) -> bool;
}

/// Every text read once, left to right, starting on the first word
#[derive(Debug, Clone, Copy, Default)]
pub struct ContinuousReading;

impl ReadingTask for ContinuousReading {
    fn name(&self) -> &str {
        "continuous_reading"
    }

    fn trials<'c>(&self, corpus: &'c Corpus) -> Vec<&'c Text> {
        corpus.texts.iter().filter(|t| !t.is_empty()).collect()
    }

    fn first_fixation(&self, text: &Text, params: &Parameters) -> usize {
        match text.word(0) {
            Some(word) => {
                let aim = (word.center() - params.landing_offset_bias).round().max(0.0) as usize;
                aim.clamp(word.start, word.end)
            }
            None => 0,
        }
    }

    /// The final word is read to completion before the eye leaves the text
    fn holds_fixation(&self, text: &Text, fixated: usize, done: bool) -> bool {
        fixated + 1 >= text.len() && !done
    }

    fn is_finished(&self, target: &SaccadeTarget) -> bool {
        target.kind == SaccadeKind::Exit
    }
}
