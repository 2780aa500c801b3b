//! Word-level eye-movement measures
//!
//! First-pass fixations of a word are the first fixation on it, provided the
//! eye has not yet been further right and did not arrive by regression, plus
//! the fixations that immediately follow it on the same word. A word without
//! first-pass fixations counts as skipped.

use serde::{Deserialize, Serialize};

use crate::core::types::{Millis, RunId, TextId};
use crate::saccade::SaccadeKind;

use super::output::{RunOutput, TrialOutput};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WordMeasures {
    pub run_id: RunId,
    pub text_id: TextId,
    pub position: usize,
    pub first_pass_fixations: usize,
    pub skipped: bool,
    pub single_fixation: bool,
    pub first_fixation_ms: Option<Millis>,
    pub gaze_duration_ms: Option<Millis>,
    pub total_reading_ms: Millis,
}

/// Serials of the first-pass fixations on `position`
fn first_pass(trial: &TrialOutput, position: usize) -> Vec<usize> {
    let fixations = &trial.fixations;
    let Some(first) = fixations.iter().position(|f| f.fixated_word == position) else {
        return Vec::new();
    };
    let passed_beyond = fixations[..first].iter().any(|f| f.fixated_word > position);
    if passed_beyond || fixations[first].entry_kind == SaccadeKind::Regression {
        return Vec::new();
    }
    fixations[first..]
        .iter()
        .take_while(|f| f.fixated_word == position)
        .map(|f| f.serial)
        .collect()
}

/// Measures for every word of a trial
pub fn trial_measures(run_id: RunId, trial: &TrialOutput, n_words: usize) -> Vec<WordMeasures> {
    (0..n_words)
        .map(|position| {
            let pass = first_pass(trial, position);
            let durations: Vec<Millis> = pass.iter().map(|&s| trial.fixations[s].duration_ms).collect();
            let total_reading_ms = trial
                .fixations
                .iter()
                .filter(|f| f.fixated_word == position)
                .map(|f| f.duration_ms)
                .sum();
            WordMeasures {
                run_id,
                text_id: trial.text_id,
                position,
                first_pass_fixations: pass.len(),
                skipped: pass.is_empty(),
                single_fixation: pass.len() == 1,
                first_fixation_ms: durations.first().copied(),
                gaze_duration_ms: (!durations.is_empty()).then(|| durations.iter().sum()),
                total_reading_ms,
            }
        })
        .collect()
}

/// Measures for every word of every trial of a run
///
/// `lengths[i]` is the number of words of the run's i-th trial.
pub fn run_measures(run: &RunOutput, lengths: &[usize]) -> Vec<WordMeasures> {
    run.trials
        .iter()
        .zip(lengths)
        .flat_map(|(trial, &n)| trial_measures(run.run_id, trial, n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::output::FixationRecord;

    fn fix(serial: usize, word: usize, duration: Millis, entry: SaccadeKind) -> FixationRecord {
        FixationRecord {
            serial,
            start_ms: serial as Millis * 300,
            duration_ms: duration,
            landing_offset: word * 4,
            screen_offset: word * 4,
            fixated_word: word,
            word: String::new(),
            recognized_word: None,
            recognized_words: vec![],
            entry_kind: entry,
            exit_kind: SaccadeKind::Forward,
        }
    }

    fn trial(fixations: Vec<FixationRecord>) -> TrialOutput {
        TrialOutput { text_id: TextId(0), fixations, recognized: vec![], cycles: 0 }
    }

    #[test]
    fn test_first_pass_measures() {
        // 0, refixate 0, skip to 2, regress to 1, forward to 3
        let t = trial(vec![
            fix(0, 0, 200, SaccadeKind::Initial),
            fix(1, 0, 150, SaccadeKind::Refixation),
            fix(2, 2, 250, SaccadeKind::Skip),
            fix(3, 1, 180, SaccadeKind::Regression),
            fix(4, 3, 220, SaccadeKind::Forward),
        ]);
        let m = trial_measures(RunId(0), &t, 5);

        assert_eq!(m[0].first_pass_fixations, 2);
        assert_eq!(m[0].first_fixation_ms, Some(200));
        assert_eq!(m[0].gaze_duration_ms, Some(350));
        assert!(!m[0].single_fixation);

        assert!(m[1].skipped);
        assert_eq!(m[1].gaze_duration_ms, None);
        assert_eq!(m[1].total_reading_ms, 180);

        assert!(m[2].single_fixation);
        assert!(!m[3].skipped);
        assert!(m[4].skipped);
        assert_eq!(m[4].total_reading_ms, 0);
    }

    #[test]
    fn test_run_measures_cover_all_words() {
        let run = RunOutput {
            run_id: RunId(2),
            seed: 44,
            trials: vec![trial(vec![fix(0, 0, 200, SaccadeKind::Initial)]), trial(vec![])],
            anomalies: vec![],
        };
        let m = run_measures(&run, &[3, 2]);
        assert_eq!(m.len(), 5);
        assert!(m.iter().all(|w| w.run_id == RunId(2)));
        assert_eq!(m.iter().filter(|w| w.skipped).count(), 4);
    }
}
