//! Spatial attention over the line of text
//!
//! Attention is a Gaussian around its centre, narrower on the side already
//! read, resting on a constant floor of 0.25.

use crate::core::config::Parameters;

/// Attention that never fades, however far a letter lies from the centre
pub const ATTENTION_FLOOR: f64 = 0.25;

/// Attention weight of a letter
///
/// # Arguments
/// * `eccentricity` - letter offset from the attention centre (signed)
/// * `width` - attention width in letters
/// * `skew` - narrowing factor applied behind the centre
/// * `ahead` - whether the letter lies toward upcoming text
pub fn skewed_attention(eccentricity: f64, width: f64, skew: f64, ahead: bool) -> f64 {
    let sigma = if ahead { width } else { width / skew };
    (1.0 / width) * (-(eccentricity * eccentricity) / (2.0 * sigma * sigma)).exp() + ATTENTION_FLOOR
}

/// Where attention sits and how wide it is
#[derive(Debug, Clone, Copy)]
pub struct AttentionWindow {
    /// Letter offset of the attention centre
    pub position: f64,
    width: f64,
    skew: f64,
}

impl AttentionWindow {
    pub fn new(position: f64, params: &Parameters) -> Self {
        Self {
            position,
            width: params.attend_width,
            skew: params.attention_skew,
        }
    }

    /// Move the centre, keeping width and skew
    pub fn shift_to(&mut self, position: f64) {
        self.position = position;
    }

    /// Letters are in reading order; higher offsets lie ahead of the centre
    pub fn weight(&self, letter: usize) -> f64 {
        let eccentricity = letter as f64 - self.position;
        skewed_attention(eccentricity, self.width, self.skew, eccentricity >= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_at_centre() {
        let peak = skewed_attention(0.0, 5.0, 3.0, true);
        assert!((peak - (0.2 + ATTENTION_FLOOR)).abs() < 1e-12);
        assert!(skewed_attention(2.0, 5.0, 3.0, true) < peak);
    }

    #[test]
    fn test_narrower_behind() {
        let ahead = skewed_attention(3.0, 5.0, 3.0, true);
        let behind = skewed_attention(-3.0, 5.0, 3.0, false);
        assert!(behind < ahead);
    }

    #[test]
    fn test_never_below_floor() {
        assert!(skewed_attention(500.0, 5.0, 3.0, true) >= ATTENTION_FLOOR);
        assert!(skewed_attention(-500.0, 5.0, 3.0, false) >= ATTENTION_FLOOR);
    }

    #[test]
    fn test_window_shift() {
        let mut window = AttentionWindow::new(2.0, &Parameters::default());
        let before = window.weight(8);
        window.shift_to(8.0);
        assert!(window.weight(8) > before);
    }

    #[test]
    fn test_direction_does_not_flip_window() {
        let params = Parameters {
            reading_direction: crate::core::types::ReadingDirection::RightToLeft,
            ..Parameters::default()
        };
        let window = AttentionWindow::new(10.0, &params);
        assert!(window.weight(13) > window.weight(7));
        assert_eq!(window.weight(13), AttentionWindow::new(10.0, &Parameters::default()).weight(13));
    }
}
