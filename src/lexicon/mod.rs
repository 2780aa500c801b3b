//! Lexical knowledge of the simulated reader
//!
//! Frequencies set each word's recognition threshold and resting level;
//! open-bigram codes connect letters on the page to word units; shared
//! codes between words drive lateral inhibition.

pub mod frequency;
pub mod ngrams;
pub mod store;

pub use frequency::FrequencyTable;
pub use ngrams::{word_ngrams, word_occurrences, NgramOccurrence};
pub use store::{is_similar_length, Lexicon, LexiconEntry};
