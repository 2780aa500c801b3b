//! Contextual predictability from cloze norms or language models

pub mod distribution;
pub mod provider;

pub use distribution::Distribution;
pub use provider::{PredictabilityProvider, TrialPredictions};
