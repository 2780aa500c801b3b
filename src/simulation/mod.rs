//! Trial controller, experiment runner and outputs

pub mod controller;
pub mod experiment;
pub mod measures;
pub mod output;
pub mod task;

pub use controller::{run_trial, TrialContext};
pub use experiment::{Experiment, Runs};
pub use measures::{run_measures, trial_measures, WordMeasures};
pub use output::{FixationRecord, RunOutput, SimulationOutput, SimulationStats, TrialOutput, TSV_HEADER};
pub use task::{ContinuousReading, ReadingTask};
