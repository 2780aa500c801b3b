use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{Millis, TextId};

/// Fatal errors. All of them surface before any simulation state exists.
#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unknown parameter in override: {0}")]
    UnknownParameter(String),

    #[error("Stimulus error at line {line}: {reason}")]
    Stimulus { line: usize, reason: String },

    #[error("Predictability error: {0}")]
    Predictability(String),

    #[error("Frequency table error: {0}")]
    Frequency(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ReaderError>;

/// Conditions the model absorbs while a run continues.
///
/// Each one is logged when it happens and kept on the run output so the
/// evaluation side can see how often the model had to fall back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Anomaly {
    /// No predictability entry for a position; a neutral prior was used
    MissingPredictability { text: TextId, position: usize },
    /// Saccade landing fell outside the text and was clamped
    OutOfBoundsLanding { requested: i64, clamped: usize },
    /// A word never crossed threshold within the recognition ceiling
    NonConvergence { text: TextId, position: usize, elapsed_ms: Millis },
    /// Trial hit the hard cycle ceiling and was cut short
    CycleLimit { text: TextId, cycles: u64 },
}

impl std::fmt::Display for Anomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Anomaly::MissingPredictability { text, position } => {
                write!(f, "no predictability for text {} position {}", text.0, position)
            }
            Anomaly::OutOfBoundsLanding { requested, clamped } => {
                write!(f, "landing {} clamped to {}", requested, clamped)
            }
            Anomaly::NonConvergence { text, position, elapsed_ms } => write!(
                f,
                "text {} word {} unrecognized after {}ms",
                text.0, position, elapsed_ms
            ),
            Anomaly::CycleLimit { text, cycles } => {
                write!(f, "text {} stopped after {} cycles", text.0, cycles)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_message() {
        let err = ReaderError::Configuration("decay must be negative".into());
        assert_eq!(err.to_string(), "Configuration error: decay must be negative");
    }

    #[test]
    fn test_io_error_converts() {
        fn open() -> Result<String> {
            Ok(std::fs::read_to_string("/definitely/not/here.tsv")?)
        }
        assert!(matches!(open(), Err(ReaderError::IoError(_))));
    }

    #[test]
    fn test_anomaly_display() {
        let a = Anomaly::OutOfBoundsLanding { requested: -3, clamped: 0 };
        assert_eq!(a.to_string(), "landing -3 clamped to 0");
    }
}
