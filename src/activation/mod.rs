//! Lexical processing: how word candidates gain activation and get recognized

pub mod code;
pub mod engine;
pub mod preactivation;
pub mod recognition;

pub use code::{CodedOccurrence, TrialCode};
pub use engine::{ActivationEngine, ActivationState, CycleInput};
pub use preactivation::{compute_preactivation, context_certainty};
pub use recognition::{resolve_recognitions, threshold_at, Recognition};
