pub mod config;
pub mod error;
pub mod types;

pub use config::{CombinationRule, Parameters, PredictabilityMode};
pub use error::{Anomaly, ReaderError, Result};
pub use types::{Millis, ProgramId, ReadingDirection, RunId, TextId};
