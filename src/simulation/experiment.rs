//! Experiment preparation and run scheduling
//!
//! Everything that does not depend on the random seed is prepared once:
//! the lexicon, per-trial ngram coding, resolved predictions and validated
//! parameters. Runs then only differ in their seed.

use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::activation::TrialCode;
use crate::core::config::Parameters;
use crate::core::error::{Anomaly, Result};
use crate::core::types::RunId;
use crate::lexicon::{FrequencyTable, Lexicon};
use crate::predictability::{PredictabilityProvider, TrialPredictions};
use crate::stimulus::{Corpus, Text};

use super::controller::{run_trial, TrialContext};
use super::output::{RunOutput, SimulationOutput};
use super::task::{ContinuousReading, ReadingTask};

/// A trial ready to be read by any run
struct PreparedTrial {
    text: Text,
    code: TrialCode,
    predictions: TrialPredictions,
}

pub struct Experiment<T: ReadingTask = ContinuousReading> {
    params: Parameters,
    lexicon: Lexicon,
    trials: Vec<PreparedTrial>,
    task: T,
    anomalies: Vec<Anomaly>,
}

impl Experiment<ContinuousReading> {
    pub fn prepare(
        corpus: &Corpus,
        provider: &PredictabilityProvider,
        frequencies: &FrequencyTable,
        params: Parameters,
    ) -> Result<Self> {
        Self::with_task(corpus, provider, frequencies, params, ContinuousReading)
    }
}

impl<T: ReadingTask> Experiment<T> {
    /// Validate parameters and build everything the runs share
    pub fn with_task(
        corpus: &Corpus,
        provider: &PredictabilityProvider,
        frequencies: &FrequencyTable,
        params: Parameters,
        task: T,
    ) -> Result<Self> {
        params.validate()?;

        let texts = task.trials(corpus);
        let mut words: Vec<(String, Option<f64>)> = Vec::new();
        for text in &texts {
            words.extend(text.words.iter().map(|w| (w.text.clone(), w.frequency)));
        }
        words.extend(
            provider
                .candidate_words(corpus, params.predictability_mode)
                .into_iter()
                .map(|w| (w, None)),
        );
        let lexicon = Lexicon::build(words, frequencies, &params);

        let mut anomalies = Vec::new();
        let trials: Vec<PreparedTrial> = texts
            .into_iter()
            .map(|text| PreparedTrial {
                code: TrialCode::new(text, &lexicon, params.bigram_gap),
                predictions: provider.resolve(text, &lexicon, params.predictability_mode, &mut anomalies),
                text: text.clone(),
            })
            .collect();

        tracing::info!(
            "Prepared {} experiment: {} trials, {} lexicon entries, {} anomalies",
            task.name(),
            trials.len(),
            lexicon.len(),
            anomalies.len()
        );

        Ok(Self { params, lexicon, trials, task, anomalies })
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn trial_count(&self) -> usize {
        self.trials.len()
    }

    pub fn texts(&self) -> impl Iterator<Item = &Text> {
        self.trials.iter().map(|t| &t.text)
    }

    /// Anomalies found during preparation
    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    pub fn seed_for(&self, run_index: u32) -> u64 {
        self.params.seed.wrapping_add(run_index as u64)
    }

    /// One independent run over every trial
    pub fn run(&self, run_index: u32) -> RunOutput {
        let seed = self.seed_for(run_index);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut anomalies = Vec::new();

        let trials = self
            .trials
            .iter()
            .map(|trial| {
                let ctx = TrialContext {
                    text: &trial.text,
                    code: &trial.code,
                    predictions: &trial.predictions,
                    lexicon: &self.lexicon,
                    params: &self.params,
                    task: &self.task,
                };
                run_trial(&ctx, &mut rng, &mut anomalies)
            })
            .collect();

        tracing::debug!("Run {} (seed {}) finished", run_index, seed);
        RunOutput { run_id: RunId(run_index), seed, trials, anomalies }
    }

    /// Lazy iterator over all configured runs; each call starts over
    pub fn runs(&self) -> Runs<'_, T> {
        Runs { experiment: self, next: 0 }
    }

    /// All runs on the rayon pool, returned in run order
    pub fn run_parallel(&self) -> Vec<RunOutput> {
        (0..self.params.n_runs).into_par_iter().map(|i| self.run(i)).collect()
    }

    /// Run everything and collect the output
    pub fn simulate(&self, parallel: bool) -> SimulationOutput {
        let start = Instant::now();
        tracing::info!("Starting {} runs ({})", self.params.n_runs, if parallel { "parallel" } else { "sequential" });
        let runs = if parallel { self.run_parallel() } else { self.runs().collect() };
        SimulationOutput::new(runs, self.anomalies.clone(), start.elapsed())
    }
}

/// Iterator returned by [`Experiment::runs`]
pub struct Runs<'e, T: ReadingTask> {
    experiment: &'e Experiment<T>,
    next: u32,
}

impl<T: ReadingTask> Iterator for Runs<'_, T> {
    type Item = RunOutput;

    fn next(&mut self) -> Option<RunOutput> {
        if self.next >= self.experiment.params.n_runs {
            return None;
        }
        let run = self.experiment.run(self.next);
        self.next += 1;
        Some(run)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.experiment.params.n_runs.saturating_sub(self.next) as usize;
        (left, Some(left))
    }
}

impl<T: ReadingTask> ExactSizeIterator for Runs<'_, T> {}
