//! OB1 Reader - eye movements in continuous silent reading
//!
//! Letters are recognized in parallel across a perceptual span, words gain
//! activation from open bigrams and contextual predictions, and a saccade
//! programmer decides where and when the eye moves.

pub mod activation;
pub mod core;
pub mod lexicon;
pub mod perception;
pub mod predictability;
pub mod saccade;
pub mod simulation;
pub mod stimulus;
