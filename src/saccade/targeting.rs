//! Where the next saccade should go

use serde::{Deserialize, Serialize};

use crate::core::config::Parameters;
use crate::perception::{skewed_attention, PerceptualSpan, VisualAcuity};
use crate::stimulus::{Text, Word};

/// How the eye arrived at, or left, a fixation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaccadeKind {
    /// First fixation of a trial
    Initial,
    Forward,
    Skip,
    Refixation,
    Regression,
    /// The eye leaves the text
    Exit,
}

impl SaccadeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaccadeKind::Initial => "initial",
            SaccadeKind::Forward => "forward",
            SaccadeKind::Skip => "skip",
            SaccadeKind::Refixation => "refixation",
            SaccadeKind::Regression => "regression",
            SaccadeKind::Exit => "exit",
        }
    }
}

impl std::fmt::Display for SaccadeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target word of a saccade; `word` equals the text length for `Exit`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaccadeTarget {
    pub kind: SaccadeKind,
    pub word: usize,
}

impl SaccadeTarget {
    pub fn new(kind: SaccadeKind, word: usize) -> Self {
        Self { kind, word }
    }

    pub fn is_exit(&self) -> bool {
        self.kind == SaccadeKind::Exit
    }
}

/// Per-word reading state the targeting rules look at
#[derive(Debug, Clone, Copy)]
pub struct WordProgress<'p> {
    pub recognized: &'p [bool],
    pub abandoned: &'p [bool],
    /// Refixations made on each word
    pub refixations: &'p [u32],
    /// Regressions made into each word
    pub regressions: &'p [u32],
}

impl WordProgress<'_> {
    fn done(&self, position: usize) -> bool {
        self.recognized.get(position).copied().unwrap_or(true)
            || self.abandoned.get(position).copied().unwrap_or(false)
    }
}

/// Summed attention times acuity over a word's letters
///
/// Attention is centred `salience_position × attend_width` letters past
/// `attention_centre`. Edge letters count four times as much as inner ones.
pub fn word_salience(
    word: &Word,
    eye: usize,
    attention_centre: f64,
    acuity: &VisualAcuity,
    params: &Parameters,
) -> f64 {
    let centre = attention_centre + (params.salience_position * params.attend_width).round();
    (word.start..=word.end)
        .map(|letter| {
            let edge = if letter == word.start || letter == word.end { 2.0 } else { 0.5 };
            let eccentricity = letter as f64 - centre;
            let attention =
                skewed_attention(eccentricity, params.attend_width, params.attention_skew, eccentricity >= 0.0);
            let offset = (letter as i64 - eye as i64).clamp(i32::MIN as i64, i32::MAX as i64) as i32;
            attention * acuity.at(offset) * edge
        })
        .sum()
}

/// Choose the next target from the current recognition state
///
/// Forward saccades go to the most salient unfinished word ahead in the
/// span; ties go to the nearer word.
pub fn select_target(
    text: &Text,
    eye: usize,
    attention_centre: f64,
    span: &PerceptualSpan,
    progress: &WordProgress<'_>,
    params: &Parameters,
) -> SaccadeTarget {
    let fixated = span.fixated;
    let n_words = text.len();

    if !progress.done(fixated) {
        let refixations = progress.refixations.get(fixated).copied().unwrap_or(0);
        if refixations < params.max_refixations {
            return SaccadeTarget::new(SaccadeKind::Refixation, fixated);
        }
    }

    if params.allow_regressions && progress.done(fixated) {
        let behind = (span.first()..fixated).rev().find(|&p| {
            !progress.done(p) && progress.regressions.get(p).copied().unwrap_or(0) < params.max_regressions
        });
        if let Some(word) = behind {
            return SaccadeTarget::new(SaccadeKind::Regression, word);
        }
    }

    let acuity = VisualAcuity::new(params);
    let mut best: Option<(usize, f64)> = None;
    for position in (fixated + 1..=span.last()).filter(|&p| p < n_words && !progress.done(p)) {
        let Some(word) = text.word(position) else { continue };
        let salience = word_salience(word, eye, attention_centre, &acuity, params);
        if !matches!(best, Some((_, top)) if top >= salience) {
            best = Some((position, salience));
        }
    }
    let word = best.map(|(p, _)| p).unwrap_or(span.last() + 1);
    if word >= n_words {
        return SaccadeTarget::new(SaccadeKind::Exit, n_words);
    }
    let kind = if word == fixated + 1 { SaccadeKind::Forward } else { SaccadeKind::Skip };
    SaccadeTarget::new(kind, word)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct State {
        recognized: Vec<bool>,
        abandoned: Vec<bool>,
        refixations: Vec<u32>,
        regressions: Vec<u32>,
    }

    impl State {
        fn new(recognized: &[bool]) -> Self {
            let n = recognized.len();
            Self {
                recognized: recognized.to_vec(),
                abandoned: vec![false; n],
                refixations: vec![0; n],
                regressions: vec![0; n],
            }
        }

        fn progress(&self) -> WordProgress<'_> {
            WordProgress {
                recognized: &self.recognized,
                abandoned: &self.abandoned,
                refixations: &self.refixations,
                regressions: &self.regressions,
            }
        }
    }

    const WORDS: [&str; 8] = ["cat", "dog", "sun", "hat", "pen", "cup", "bus", "map"];

    fn target(fixated: usize, state: &State) -> SaccadeTarget {
        let params = Parameters::default();
        let n = state.recognized.len();
        let text = Text::from_words(0, &WORDS[..n]);
        let eye = text.words[fixated].start;
        let span = PerceptualSpan::new(fixated, n, params.span_left_words, params.span_right_words);
        select_target(&text, eye, eye as f64, &span, &state.progress(), &params)
    }

    #[test]
    fn test_refixate_unrecognized_word() {
        let state = State::new(&[false, false, false]);
        assert_eq!(target(0, &state), SaccadeTarget::new(SaccadeKind::Refixation, 0));
    }

    #[test]
    fn test_forward_after_refixation_budget() {
        let mut state = State::new(&[false, false, false]);
        state.refixations[0] = 1;
        assert_eq!(target(0, &state), SaccadeTarget::new(SaccadeKind::Forward, 1));
    }

    #[test]
    fn test_skip_recognized_neighbour() {
        let state = State::new(&[true, true, false, false]);
        assert_eq!(target(0, &state), SaccadeTarget::new(SaccadeKind::Skip, 2));
    }

    #[test]
    fn test_regression_to_unrecognized_left_word() {
        let state = State::new(&[true, false, true, false]);
        assert_eq!(target(2, &state), SaccadeTarget::new(SaccadeKind::Regression, 1));
    }

    #[test]
    fn test_regression_budget_and_switch() {
        let mut state = State::new(&[true, false, true, false]);
        state.regressions[1] = 1;
        assert_eq!(target(2, &state), SaccadeTarget::new(SaccadeKind::Forward, 3));

        let mut params = Parameters::default();
        params.allow_regressions = false;
        let state = State::new(&[true, false, true, false]);
        let text = Text::from_words(0, &WORDS[..4]);
        let eye = text.words[2].start;
        let span = PerceptualSpan::new(2, 4, 1, 3);
        assert_eq!(select_target(&text, eye, eye as f64, &span, &state.progress(), &params).kind, SaccadeKind::Forward);
    }

    #[test]
    fn test_beyond_span_when_all_recognized() {
        let state = State::new(&[true, true, true, true, true, false]);
        assert_eq!(target(0, &state), SaccadeTarget::new(SaccadeKind::Skip, 4));
    }

    #[test]
    fn test_exit_past_last_word() {
        let state = State::new(&[true, true]);
        assert_eq!(target(0, &state), SaccadeTarget::new(SaccadeKind::Exit, 2));
        let single = State::new(&[false]);
        let mut exhausted = single;
        exhausted.refixations[0] = 1;
        assert!(target(0, &exhausted).is_exit());
    }

    #[test]
    fn test_abandoned_word_is_passed() {
        let mut state = State::new(&[false, false]);
        state.abandoned[0] = true;
        assert_eq!(target(0, &state), SaccadeTarget::new(SaccadeKind::Forward, 1));
    }

    #[test]
    fn test_long_word_outweighs_short_neighbour() {
        let params = Parameters::default();
        let text = Text::from_words(0, &["on", "a", "xylophone"]);
        let state = State::new(&[true, false, false]);
        let span = PerceptualSpan::new(0, 3, 1, 3);
        let acuity = VisualAcuity::new(&params);
        let short = word_salience(&text.words[1], 0, 0.0, &acuity, &params);
        let long = word_salience(&text.words[2], 0, 0.0, &acuity, &params);
        assert!(long > short);
        assert_eq!(
            select_target(&text, 0, 0.0, &span, &state.progress(), &params),
            SaccadeTarget::new(SaccadeKind::Skip, 2)
        );
    }

    #[test]
    fn test_salience_falls_with_distance() {
        let params = Parameters::default();
        let text = Text::from_words(0, &WORDS[..5]);
        let acuity = VisualAcuity::new(&params);
        let saliences: Vec<f64> =
            text.words[1..].iter().map(|w| word_salience(w, 0, 0.0, &acuity, &params)).collect();
        for pair in saliences.windows(2) {
            assert!(pair[0] > pair[1]);
        }
    }
}
