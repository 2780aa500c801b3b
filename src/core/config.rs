//! Model parameters with documented constants
//!
//! All tunable numbers of the reading model live here. A `Parameters` value
//! is built once, validated, and then passed by reference into every
//! component; nothing mutates it while runs are in flight.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{ReaderError, Result};
use crate::core::types::{Millis, ReadingDirection};

/// How contextual predictability enters word activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictabilityMode {
    /// Context is ignored (control condition)
    Disabled,
    /// Only the realized word's cloze probability is used
    Cloze,
    /// Every candidate in the next-word distribution is pre-activated
    #[default]
    LanguageModel,
}

/// How pre-activation combines with bottom-up input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinationRule {
    #[default]
    Additive,
    Multiplicative,
}

/// Configuration for the reading model
///
/// These values reproduce plausible fixation durations (~200-250ms) and
/// skipping of short, frequent or predictable words at a 25ms cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Parameters {
    // === TIME ===
    /// Duration of one simulation cycle (ms)
    pub cycle_ms: Millis,

    /// Hard ceiling on cycles per trial; the trial is cut short beyond it
    pub max_cycles_per_trial: u64,

    /// Hard ceiling on time spent fixating a word without recognizing it
    ///
    /// Past this the word is abandoned: it stays unrecognized and stops
    /// attracting refixations and regressions.
    pub max_recognition_ms: Millis,

    // === PERCEPTION ===
    /// Conversion of letter eccentricity into degrees of visual angle
    pub letters_per_degree: f64,

    /// Extra acuity falloff on the side already read (1.0 = symmetric)
    ///
    /// Set per language; the side already read is the same for every script.
    pub acuity_left_scale: f64,

    /// Acuity returned for offsets beyond `max_eccentricity`
    pub acuity_floor: f64,

    /// Largest letter offset with meaningful acuity
    pub max_eccentricity: u32,

    /// Script direction; only changes the screen columns in the output
    pub reading_direction: ReadingDirection,

    /// Width of the attention window (letters)
    pub attend_width: f64,

    /// Narrowing of attention to the left of its centre
    pub attention_skew: f64,

    /// Shift of attention past its centre when ranking forward targets,
    /// in units of `attend_width`
    pub salience_position: f64,

    /// Words left of the fixated word inside the perceptual span
    pub span_left_words: usize,

    /// Words right of the fixated word inside the perceptual span
    pub span_right_words: usize,

    // === LEXICON ===
    /// Maximum number of letters skipped inside an open bigram
    pub bigram_gap: usize,

    /// Relative length difference under which two words compete
    pub length_similarity: f64,

    /// Shared ngrams needed before two words inhibit each other
    pub min_overlap: usize,

    /// Most frequent words of the frequency table added as competitors
    pub lexicon_extra_words: usize,

    /// Frequency assumed for words missing from the frequency table
    pub missing_frequency: f64,

    // === ACTIVATION ===
    pub min_activity: f64,
    pub max_activity: f64,

    /// Pull toward resting level per cycle (negative)
    pub decay: f64,

    /// Gain from ngram evidence to word input
    pub bigram_to_word_excitation: f64,

    /// Strength of lateral inhibition between overlapping words
    pub word_inhibition: f64,

    /// Resting activation of the most frequent word
    pub resting_frequency_gain: f64,

    /// Threshold of a word with zero frequency
    pub max_threshold: f64,

    /// How much frequency lowers the threshold (0 = not at all)
    pub freq_weight: f64,

    // === PREDICTABILITY ===
    pub predictability_mode: PredictabilityMode,
    pub combination_rule: CombinationRule,

    /// Pre-activation per cycle for a candidate of probability 1
    pub pred_weight: f64,

    /// How far a candidate's probability lowers its recognition threshold
    /// at that position (0 = not at all)
    pub pred_threshold_weight: f64,

    // === SACCADES ===
    /// Mean labile latency from fixation onset (ms)
    pub mu_ms: f64,
    pub sigma_ms: f64,

    /// Latency reduction once the fixated word is recognized (ms)
    pub recognition_speedup_ms: f64,

    /// Upper bound on labile latency from fixation onset (ms)
    pub max_labile_ms: Millis,

    /// Duration of the committed, non-cancellable stage (ms)
    pub non_labile_ms: Millis,

    /// Flight time of a saccade; the next fixation starts after it (ms)
    pub saccade_duration_ms: Millis,

    pub max_refixations: u32,
    pub max_regressions: u32,
    pub allow_regressions: bool,

    /// Refixation step as a fraction of word length
    pub refix_size: f64,

    /// Preferred landing position offset left of the word centre (letters)
    pub landing_offset_bias: f64,

    // === SACCADE ERROR ===
    pub use_saccade_error: bool,
    pub optimal_saccade_distance: f64,
    pub saccade_error_scaler: f64,
    pub saccade_error_sigma: f64,
    pub saccade_error_sigma_scaler: f64,

    // === RUNS ===
    pub n_runs: u32,
    pub seed: u64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            cycle_ms: 25,
            max_cycles_per_trial: 20_000,
            max_recognition_ms: 1_500,

            letters_per_degree: 0.3,
            acuity_left_scale: 1.5,
            acuity_floor: 0.01,
            max_eccentricity: 30,
            reading_direction: ReadingDirection::LeftToRight,
            attend_width: 5.0,
            attention_skew: 3.0,
            salience_position: 0.5,
            span_left_words: 1,
            span_right_words: 3,

            bigram_gap: 3,
            length_similarity: 0.15,
            min_overlap: 2,
            lexicon_extra_words: 0,
            missing_frequency: 0.0,

            min_activity: 0.0,
            max_activity: 1.0,
            decay: -0.08,
            bigram_to_word_excitation: 0.6,
            word_inhibition: 0.005,
            resting_frequency_gain: 0.05,
            max_threshold: 0.6,
            freq_weight: 0.25,

            predictability_mode: PredictabilityMode::LanguageModel,
            combination_rule: CombinationRule::Additive,
            pred_weight: 0.05,
            pred_threshold_weight: 0.0,

            mu_ms: 175.0,
            sigma_ms: 40.0,
            recognition_speedup_ms: 75.0,
            max_labile_ms: 600,
            non_labile_ms: 50,
            saccade_duration_ms: 25,
            max_refixations: 1,
            max_regressions: 1,
            allow_regressions: true,
            refix_size: 0.2,
            landing_offset_bias: 0.5,

            use_saccade_error: true,
            optimal_saccade_distance: 7.0,
            saccade_error_scaler: 0.2,
            saccade_error_sigma: 0.17,
            saccade_error_sigma_scaler: 0.06,

            n_runs: 10,
            seed: 42,
        }
    }
}

impl Parameters {
    /// Create parameters with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a full or partial parameter file; missing fields keep defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let params: Parameters = toml::from_str(content)?;
        params.validate()?;
        Ok(params)
    }

    /// Load parameters from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Replace the named fields with the values of an override table
    ///
    /// Every key must name an existing field, and the merged result must
    /// validate. Nothing is applied when either check fails.
    pub fn with_overrides(&self, overrides: &toml::Table) -> Result<Self> {
        let current = toml::Value::try_from(self)
            .map_err(|e| ReaderError::Configuration(format!("cannot serialize parameters: {}", e)))?;
        let mut table = match current {
            toml::Value::Table(table) => table,
            _ => return Err(ReaderError::Configuration("parameters are not a table".into())),
        };

        for (name, value) in overrides {
            if !table.contains_key(name) {
                return Err(ReaderError::UnknownParameter(name.clone()));
            }
            tracing::debug!("Override {} = {}", name, value);
            table.insert(name.clone(), value.clone());
        }

        let merged: Parameters = toml::Value::Table(table).try_into().map_err(|e| {
            ReaderError::Configuration(format!("override has wrong type: {}", e))
        })?;
        merged.validate()?;
        Ok(merged)
    }

    /// Apply an override file (flat `name = value` table)
    pub fn with_override_file(&self, path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let overrides: toml::Table = toml::from_str(&content)?;
        self.with_overrides(&overrides)
    }

    /// Validate parameters for internal consistency
    pub fn validate(&self) -> Result<()> {
        fn fail(msg: String) -> Result<()> {
            Err(ReaderError::Configuration(msg))
        }

        if self.cycle_ms == 0 {
            return fail("cycle_ms must be positive".into());
        }
        if self.max_activity <= self.min_activity {
            return fail(format!(
                "max_activity ({}) must exceed min_activity ({})",
                self.max_activity, self.min_activity
            ));
        }
        if !(-1.0..=0.0).contains(&self.decay) {
            return fail(format!("decay ({}) must lie in [-1, 0]", self.decay));
        }
        if self.max_threshold <= self.min_activity || self.max_threshold >= self.max_activity {
            return fail(format!(
                "max_threshold ({}) must lie strictly between min_activity and max_activity",
                self.max_threshold
            ));
        }
        if !(0.0..1.0).contains(&self.freq_weight) {
            return fail(format!("freq_weight ({}) must lie in [0, 1)", self.freq_weight));
        }
        if self.resting_frequency_gain < 0.0
            || self.min_activity + self.resting_frequency_gain >= self.max_threshold
        {
            return fail(format!(
                "resting_frequency_gain ({}) must be non-negative and keep rest below threshold",
                self.resting_frequency_gain
            ));
        }
        if self.bigram_to_word_excitation <= 0.0 || self.bigram_to_word_excitation > 1.0 {
            return fail("bigram_to_word_excitation must lie in (0, 1]".into());
        }
        if self.word_inhibition < 0.0 || self.pred_weight < 0.0 {
            return fail("word_inhibition and pred_weight must be non-negative".into());
        }
        if self.pred_weight > 1.0 {
            return fail(format!("pred_weight ({}) must not exceed 1", self.pred_weight));
        }
        if !(0.0..1.0).contains(&self.pred_threshold_weight) {
            return fail(format!(
                "pred_threshold_weight ({}) must lie in [0, 1)",
                self.pred_threshold_weight
            ));
        }
        if !self.salience_position.is_finite() {
            return fail("salience_position must be finite".into());
        }
        if self.letters_per_degree <= 0.0 || self.attend_width <= 0.0 || self.attention_skew <= 0.0 {
            return fail("letters_per_degree, attend_width and attention_skew must be positive".into());
        }
        if !(self.acuity_floor > 0.0 && self.acuity_floor <= 1.0) {
            return fail(format!("acuity_floor ({}) must lie in (0, 1]", self.acuity_floor));
        }
        if self.acuity_left_scale <= 0.0 {
            return fail("acuity_left_scale must be positive".into());
        }
        if self.span_right_words == 0 {
            return fail("span_right_words must be at least 1".into());
        }
        if !(self.length_similarity > 0.0 && self.length_similarity <= 1.0) {
            return fail("length_similarity must lie in (0, 1]".into());
        }
        if self.mu_ms <= 0.0 || self.sigma_ms < 0.0 {
            return fail("mu_ms must be positive and sigma_ms non-negative".into());
        }
        if self.recognition_speedup_ms < 0.0 || self.recognition_speedup_ms >= self.mu_ms {
            return fail(format!(
                "recognition_speedup_ms ({}) must lie in [0, mu_ms)",
                self.recognition_speedup_ms
            ));
        }
        if self.max_labile_ms < self.cycle_ms || self.non_labile_ms == 0 {
            return fail("max_labile_ms must cover a cycle and non_labile_ms must be positive".into());
        }
        if !(self.refix_size > 0.0 && self.refix_size <= 1.0) {
            return fail("refix_size must lie in (0, 1]".into());
        }
        if self.saccade_error_sigma < 0.0 || self.saccade_error_sigma_scaler < 0.0 {
            return fail("saccade error sigmas must be non-negative".into());
        }
        if self.max_cycles_per_trial == 0 || self.max_recognition_ms < self.cycle_ms {
            return fail("cycle ceilings must allow at least one cycle".into());
        }
        if self.n_runs == 0 {
            return fail("n_runs must be at least 1".into());
        }

        Ok(())
    }

    /// Number of whole cycles covering `ms`, never less than one
    pub fn cycles_for(&self, ms: f64) -> u64 {
        let cycles = (ms / self.cycle_ms as f64).round();
        if cycles < 1.0 {
            1
        } else {
            cycles as u64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_validates() {
        assert!(Parameters::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let params = Parameters::from_toml_str("decay = -0.1\nn_runs = 3\n").unwrap();
        assert_eq!(params.decay, -0.1);
        assert_eq!(params.n_runs, 3);
        assert_eq!(params.cycle_ms, 25);
    }

    #[test]
    fn test_unknown_field_in_file_rejected() {
        let result = Parameters::from_toml_str("decay_rate = -0.1\n");
        assert!(matches!(result, Err(ReaderError::TomlError(_))));
    }

    #[test]
    fn test_enum_fields_parse() {
        let params =
            Parameters::from_toml_str("predictability_mode = \"cloze\"\ncombination_rule = \"multiplicative\"\n")
                .unwrap();
        assert_eq!(params.predictability_mode, PredictabilityMode::Cloze);
        assert_eq!(params.combination_rule, CombinationRule::Multiplicative);
    }

    #[test]
    fn test_override_replaces_named_fields() {
        let overrides: toml::Table = toml::from_str("pred_weight = 0.2\nmax_refixations = 2\n").unwrap();
        let params = Parameters::default().with_overrides(&overrides).unwrap();
        assert_eq!(params.pred_weight, 0.2);
        assert_eq!(params.max_refixations, 2);
        assert_eq!(params.mu_ms, Parameters::default().mu_ms);
    }

    #[test]
    fn test_override_integer_into_float_field() {
        let overrides: toml::Table = toml::from_str("mu_ms = 200\n").unwrap();
        let params = Parameters::default().with_overrides(&overrides).unwrap();
        assert_eq!(params.mu_ms, 200.0);
    }

    #[test]
    fn test_override_unknown_field_fails() {
        let overrides: toml::Table = toml::from_str("inhibition_weight = 0.2\n").unwrap();
        let result = Parameters::default().with_overrides(&overrides);
        assert!(matches!(result, Err(ReaderError::UnknownParameter(name)) if name == "inhibition_weight"));
    }

    #[test]
    fn test_override_out_of_domain_fails() {
        let overrides: toml::Table = toml::from_str("decay = 0.5\n").unwrap();
        let result = Parameters::default().with_overrides(&overrides);
        assert!(matches!(result, Err(ReaderError::Configuration(_))));
    }

    #[test]
    fn test_pred_threshold_weight_range() {
        let overrides: toml::Table = toml::from_str("pred_threshold_weight = 0.4\n").unwrap();
        let params = Parameters::default().with_overrides(&overrides).unwrap();
        assert_eq!(params.pred_threshold_weight, 0.4);

        let params = Parameters { pred_threshold_weight: 1.0, ..Parameters::default() };
        assert!(matches!(params.validate(), Err(ReaderError::Configuration(_))));
    }

    #[test]
    fn test_threshold_must_sit_inside_activity_range() {
        let params = Parameters { max_threshold: 1.2, ..Parameters::default() };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_cycles_for_rounds_and_floors() {
        let params = Parameters::default();
        assert_eq!(params.cycles_for(100.0), 4);
        assert_eq!(params.cycles_for(112.0), 4);
        assert_eq!(params.cycles_for(3.0), 1);
        assert_eq!(params.cycles_for(-40.0), 1);
    }
}
