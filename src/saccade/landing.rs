//! Where a saccade actually lands
//!
//! Saccades aim slightly left of the target word's centre. Oculomotor error
//! pulls short saccades long and long saccades short, with spread growing
//! with the intended distance.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::core::config::Parameters;
use crate::stimulus::Text;

use super::targeting::{SaccadeKind, SaccadeTarget};

/// Draw from Normal(mean, sd); a zero sd returns the mean
pub fn sample_normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, sd: f64) -> f64 {
    let z: f64 = StandardNormal.sample(rng);
    mean + sd.max(0.0) * z
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landing {
    /// Letter the eye lands on
    pub offset: usize,
    /// Offset before clamping to the text
    pub requested: i64,
}

impl Landing {
    pub fn was_clamped(&self) -> bool {
        self.requested != self.offset as i64
    }
}

/// Letter the saccade aims at, before oculomotor error
pub fn intended_offset(text: &Text, eye: usize, target: &SaccadeTarget, params: &Parameters) -> f64 {
    if target.kind == SaccadeKind::Refixation {
        let Some(word) = text.word(target.word) else { return eye as f64 };
        let step = (params.refix_size * word.length() as f64).max(1.0);
        let forward = eye as f64 + step;
        if forward <= word.end as f64 {
            return forward;
        }
        return (eye as f64 - step).max(word.start as f64);
    }
    match text.word(target.word) {
        Some(word) => word.center() - params.landing_offset_bias,
        // exit: the first letter past the text
        None => text.letter_count() as f64,
    }
}

/// Apply saccade error and clamp the result to the text
pub fn plan_landing<R: Rng + ?Sized>(
    text: &Text,
    eye: usize,
    target: &SaccadeTarget,
    params: &Parameters,
    rng: &mut R,
) -> Landing {
    let aim = intended_offset(text, eye, target, params);
    let distance = aim - eye as f64;

    let error = if params.use_saccade_error && target.kind != SaccadeKind::Refixation {
        let mean = (params.optimal_saccade_distance - distance.abs()) * params.saccade_error_scaler;
        let sd = params.saccade_error_sigma + distance.abs() * params.saccade_error_sigma_scaler;
        // error pulls toward the optimal amplitude in the saccade's direction
        distance.signum() * sample_normal(rng, mean, sd)
    } else {
        0.0
    };

    let requested = (aim + error).round() as i64;
    let offset = requested.clamp(0, text.last_offset() as i64) as usize;
    Landing { offset, requested }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn text() -> Text {
        Text::from_words(0, &["the", "quick", "brown", "fox"])
    }

    #[test]
    fn test_aim_left_of_centre() {
        let params = Parameters::default();
        let text = text();
        let target = SaccadeTarget::new(SaccadeKind::Forward, 1);
        let word = text.word(1).unwrap();
        assert_eq!(intended_offset(&text, 1, &target, &params), word.center() - 0.5);
    }

    #[test]
    fn test_no_error_lands_on_target() {
        let mut params = Parameters::default();
        params.use_saccade_error = false;
        let text = text();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for (index, word) in text.words.iter().enumerate() {
            let target = SaccadeTarget::new(SaccadeKind::Skip, index);
            let landing = plan_landing(&text, 0, &target, &params, &mut rng);
            assert_eq!(text.word_at_offset(landing.offset), word.index);
            assert!(!landing.was_clamped());
        }
    }

    #[test]
    fn test_landing_stays_in_text() {
        let mut params = Parameters::default();
        params.saccade_error_sigma = 20.0;
        let text = text();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let target = SaccadeTarget::new(SaccadeKind::Skip, 3);
            let landing = plan_landing(&text, 1, &target, &params, &mut rng);
            assert!(landing.offset <= text.last_offset());
        }
    }

    #[test]
    fn test_refixation_stays_in_word() {
        let params = Parameters::default();
        let text = text();
        let word = text.word(1).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let target = SaccadeTarget::new(SaccadeKind::Refixation, 1);
        for eye in word.start..=word.end {
            let landing = plan_landing(&text, eye, &target, &params, &mut rng);
            assert!(word.contains(landing.offset), "eye {} landed {}", eye, landing.offset);
        }
    }

    #[test]
    fn test_refixation_of_one_letter_word_is_not_clamped() {
        let params = Parameters::default();
        let text = Text::from_words(0, &["a", "cat"]);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let target = SaccadeTarget::new(SaccadeKind::Refixation, 0);
        let landing = plan_landing(&text, 0, &target, &params, &mut rng);
        assert_eq!(landing.offset, 0);
        assert!(!landing.was_clamped());
    }

    #[test]
    fn test_sample_normal_zero_sd() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(sample_normal(&mut rng, 3.5, 0.0), 3.5);
    }
}
