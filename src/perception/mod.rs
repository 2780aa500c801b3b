//! Visual input to the reader: acuity, attention and the perceptual span
//!
//! A letter's perceptual strength is the product of visual acuity at its
//! distance from the eye and attention at its distance from the attention
//! centre.

pub mod acuity;
pub mod attention;
pub mod span;

pub use acuity::{calc_acuity, VisualAcuity};
pub use attention::{skewed_attention, AttentionWindow};
pub use span::PerceptualSpan;

/// Perceptual strength of the letter at `letter` with the eye at `eye`
pub fn letter_strength(acuity: &VisualAcuity, attention: &AttentionWindow, letter: usize, eye: usize) -> f64 {
    let offset = (letter as i64 - eye as i64).clamp(i32::MIN as i64, i32::MAX as i64) as i32;
    acuity.at(offset) * attention.weight(letter)
}
