//! Simulation output and serialization

use std::fmt::Write as _;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::Anomaly;
use crate::core::types::{Millis, RunId, TextId};
use crate::saccade::SaccadeKind;

pub const TSV_HEADER: &str =
    "run_id\ttext_id\tfixation\tstart_ms\tduration_ms\tlanding_offset\tscreen_offset\tfixated_word\tword\trecognized_word\tentry\texit";

/// One fixation, written when the eye leaves it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FixationRecord {
    /// Position within the trial's fixation sequence
    pub serial: usize,
    pub start_ms: Millis,
    pub duration_ms: Millis,
    /// Landing letter in reading order
    pub landing_offset: usize,
    /// Landing column from the left edge of the line
    pub screen_offset: usize,
    pub fixated_word: usize,
    /// Printed form of the fixated word
    pub word: String,
    /// Lexicon word matched to the fixated word, if any by the end of the fixation
    pub recognized_word: Option<String>,
    /// Positions recognized during this fixation, in recognition order
    pub recognized_words: Vec<usize>,
    pub entry_kind: SaccadeKind,
    pub exit_kind: SaccadeKind,
}

/// Everything that happened while reading one text
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrialOutput {
    pub text_id: TextId,
    pub fixations: Vec<FixationRecord>,
    /// Lexicon word matched to each position; `None` if never recognized
    pub recognized: Vec<Option<String>>,
    pub cycles: u64,
}

impl TrialOutput {
    /// Saccades executed inside the text; leaving the text is not counted
    pub fn saccade_count(&self) -> usize {
        self.fixations.iter().filter(|f| f.exit_kind != SaccadeKind::Exit).count()
    }

    pub fn misrecognitions(&self, words: &[&str]) -> usize {
        self.recognized
            .iter()
            .zip(words)
            .filter(|(got, expected)| got.as_deref().is_some_and(|g| g != **expected))
            .count()
    }
}

/// Output of one independent run over all trials
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    pub run_id: RunId,
    pub seed: u64,
    pub trials: Vec<TrialOutput>,
    pub anomalies: Vec<Anomaly>,
}

impl RunOutput {
    pub fn fixation_count(&self) -> usize {
        self.trials.iter().map(|t| t.fixations.len()).sum()
    }

    /// Rows without header, one per fixation
    pub fn write_tsv(&self, out: &mut String) {
        for trial in &self.trials {
            for fix in &trial.fixations {
                let _ = writeln!(
                    out,
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    self.run_id.0,
                    trial.text_id.0,
                    fix.serial,
                    fix.start_ms,
                    fix.duration_ms,
                    fix.landing_offset,
                    fix.screen_offset,
                    fix.fixated_word,
                    fix.word,
                    fix.recognized_word.as_deref().unwrap_or(""),
                    fix.entry_kind,
                    fix.exit_kind,
                );
            }
        }
    }
}

/// Complete simulation output
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub runs: Vec<RunOutput>,
    /// Anomalies found while preparing the experiment, before any run
    pub preparation_anomalies: Vec<Anomaly>,
    pub statistics: SimulationStats,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationStats {
    pub runs: u32,
    pub trials: u32,
    pub fixations: u32,
    pub mean_fixation_ms: f64,
    pub skips: u32,
    pub refixations: u32,
    pub regressions: u32,
    pub anomalies: u32,
    pub simulation_time_ms: u64,
}

impl SimulationOutput {
    pub fn new(runs: Vec<RunOutput>, preparation_anomalies: Vec<Anomaly>, elapsed: Duration) -> Self {
        let fixations: Vec<&FixationRecord> = runs
            .iter()
            .flat_map(|r| r.trials.iter())
            .flat_map(|t| t.fixations.iter())
            .collect();
        let count_entries = |kind: SaccadeKind| fixations.iter().filter(|f| f.entry_kind == kind).count() as u32;

        let mean_fixation_ms = if fixations.is_empty() {
            0.0
        } else {
            fixations.iter().map(|f| f.duration_ms as f64).sum::<f64>() / fixations.len() as f64
        };

        let statistics = SimulationStats {
            runs: runs.len() as u32,
            trials: runs.iter().map(|r| r.trials.len()).sum::<usize>() as u32,
            fixations: fixations.len() as u32,
            mean_fixation_ms,
            skips: count_entries(SaccadeKind::Skip),
            refixations: count_entries(SaccadeKind::Refixation),
            regressions: count_entries(SaccadeKind::Regression),
            anomalies: (runs.iter().map(|r| r.anomalies.len()).sum::<usize>() + preparation_anomalies.len()) as u32,
            simulation_time_ms: elapsed.as_millis() as u64,
        };

        Self { runs, preparation_anomalies, statistics }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self).unwrap_or_else(|_| "{}".to_string())
    }

    /// All fixations as tab-separated rows with a header
    pub fn to_tsv(&self) -> String {
        let mut out = String::from(TSV_HEADER);
        out.push('\n');
        for run in &self.runs {
            run.write_tsv(&mut out);
        }
        out
    }

    pub fn summary(&self) -> String {
        format!(
            "Simulated {} runs over {} trials in {}ms\n{} fixations (mean {:.1}ms), {} skips, {} refixations, {} regressions, {} anomalies",
            self.statistics.runs,
            self.statistics.trials,
            self.statistics.simulation_time_ms,
            self.statistics.fixations,
            self.statistics.mean_fixation_ms,
            self.statistics.skips,
            self.statistics.refixations,
            self.statistics.regressions,
            self.statistics.anomalies,
        )
    }
}
