//! Saccade programming, target selection and landing

pub mod landing;
pub mod program;
pub mod targeting;

pub use landing::{intended_offset, plan_landing, sample_normal, Landing};
pub use program::{ProgramStage, SaccadeProgram, SaccadeProgrammer, Trigger};
pub use targeting::{select_target, word_salience, SaccadeKind, SaccadeTarget, WordProgress};
