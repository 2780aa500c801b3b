//! Visual acuity as a function of letter eccentricity
//!
//! Follows Harvey & Dumoulin (2007): cortical magnification makes acuity
//! fall off hyperbolically with eccentricity in degrees.

use crate::core::config::Parameters;

/// Scales the formula so that acuity at the fixated letter is exactly 1
const FOVEAL_NORMALIZER: f64 = 35.555556;

/// Raw acuity at `eccentricity` letters from fixation
pub fn calc_acuity(eccentricity: f64, letters_per_degree: f64) -> f64 {
    (1.0 / FOVEAL_NORMALIZER) / (0.018 * (eccentricity * letters_per_degree + 1.0 / 0.64))
}

/// Acuity falloff around the point of fixation
#[derive(Debug, Clone)]
pub struct VisualAcuity {
    letters_per_degree: f64,
    behind_scale: f64,
    floor: f64,
    max_eccentricity: u32,
}

impl VisualAcuity {
    pub fn new(params: &Parameters) -> Self {
        Self {
            letters_per_degree: params.letters_per_degree,
            behind_scale: params.acuity_left_scale,
            floor: params.acuity_floor,
            max_eccentricity: params.max_eccentricity,
        }
    }

    /// Acuity multiplier in `[floor, 1]` for a signed letter offset
    ///
    /// Offsets are in reading order, so positive offsets are upcoming text
    /// whatever the script direction. Offsets past `max_eccentricity` get
    /// the floor instead of failing.
    pub fn at(&self, offset: i32) -> f64 {
        if offset.unsigned_abs() > self.max_eccentricity {
            return self.floor;
        }
        let scale = if offset >= 0 { 1.0 } else { self.behind_scale };
        let eccentricity = offset.unsigned_abs() as f64 * scale;
        calc_acuity(eccentricity, self.letters_per_degree).clamp(self.floor, 1.0)
    }
}
