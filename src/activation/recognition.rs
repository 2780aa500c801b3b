//! Matching above-threshold lexicon entries to word slots in the span
//!
//! Several entries may cross threshold in the same cycle and several slots
//! may accept the same entry. Candidates are ranked by activation, then by
//! distance from fixation, then upcoming slots before passed ones, then by
//! lexicon id, and assigned greedily so each slot and entry is used once.

use std::cmp::Reverse;

use ordered_float::OrderedFloat;

use crate::core::config::Parameters;
use crate::lexicon::{is_similar_length, Lexicon};
use crate::perception::PerceptualSpan;
use crate::predictability::TrialPredictions;
use crate::stimulus::Text;

use super::engine::ActivationState;

/// A word slot matched to a lexicon entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recognition {
    pub position: usize,
    pub entry: usize,
    pub activation: f64,
}

impl Recognition {
    /// Whether the matched entry is the word actually printed at the slot
    pub fn is_correct(&self, text: &Text, lexicon: &Lexicon) -> bool {
        text.word(self.position)
            .map(|w| w.text == lexicon.entry(self.entry).text)
            .unwrap_or(false)
    }
}

/// Recognitions for this cycle, in assignment order
///
/// `recognized[p]` holds the entry already matched to slot `p`. An entry
/// matched to one slot in the span cannot claim a different word elsewhere
/// in the span, except a repeat of the same word. A candidate predicted at
/// a slot needs less activation there, see [`threshold_at`].
pub fn resolve_recognitions(
    lexicon: &Lexicon,
    state: &ActivationState,
    text: &Text,
    span: &PerceptualSpan,
    recognized: &[Option<usize>],
    predictions: &TrialPredictions,
    params: &Parameters,
) -> Vec<Recognition> {
    // lowest threshold any slot can offer
    let floor = 1.0 - params.pred_threshold_weight;
    let above: Vec<(usize, f64)> = state
        .values()
        .iter()
        .enumerate()
        .filter(|(id, a)| **a > lexicon.entry(*id).threshold * floor)
        .map(|(id, a)| (id, *a))
        .collect();
    if above.is_empty() {
        return Vec::new();
    }

    let claimed: Vec<(usize, usize)> = span
        .positions()
        .iter()
        .filter_map(|&p| recognized.get(p).copied().flatten().map(|e| (p, e)))
        .collect();

    let mut candidates: Vec<(Reverse<OrderedFloat<f64>>, usize, bool, usize, usize)> = Vec::new();
    for &position in span.positions() {
        if recognized.get(position).copied().flatten().is_some() {
            continue;
        }
        let Some(word) = text.word(position) else { continue };
        for &(entry, activation) in &above {
            let lexical = lexicon.entry(entry);
            if !is_similar_length(lexical.length, word.length(), params.length_similarity) {
                continue;
            }
            if activation <= threshold_at(lexical.threshold, entry, position, predictions, params) {
                continue;
            }
            let taken_elsewhere = claimed.iter().any(|&(p, e)| {
                e == entry && text.word(p).map(|w| w.text != word.text).unwrap_or(true)
            });
            if taken_elsewhere {
                continue;
            }
            let behind = position < span.fixated;
            candidates.push((Reverse(OrderedFloat(activation)), span.distance(position), behind, entry, position));
        }
    }
    candidates.sort();

    let mut used_slots: Vec<usize> = Vec::new();
    let mut used_entries: Vec<usize> = Vec::new();
    let mut out = Vec::new();
    for (Reverse(OrderedFloat(activation)), _, _, entry, position) in candidates {
        if used_slots.contains(&position) || used_entries.contains(&entry) {
            continue;
        }
        used_slots.push(position);
        used_entries.push(entry);
        out.push(Recognition { position, entry, activation });
    }
    out
}

/// Recognition threshold of `entry` at slot `position`
///
/// Lowered in proportion to the entry's predicted probability there.
pub fn threshold_at(
    threshold: f64,
    entry: usize,
    position: usize,
    predictions: &TrialPredictions,
    params: &Parameters,
) -> f64 {
    if params.pred_threshold_weight <= 0.0 {
        return threshold;
    }
    let probability = predictions
        .at(position)
        .iter()
        .find(|(id, _)| *id == entry)
        .map_or(0.0, |(_, p)| *p);
    threshold * (1.0 - params.pred_threshold_weight * probability)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::FrequencyTable;

    struct Fixture {
        text: Text,
        lexicon: Lexicon,
        params: Parameters,
        none: TrialPredictions,
    }

    fn fixture(words: &[&str], extra: &[&str]) -> Fixture {
        let params = Parameters::default();
        let text = Text::from_words(0, words);
        let lexicon = Lexicon::build(
            words.iter().chain(extra.iter()).map(|w| (w.to_string(), None)),
            &FrequencyTable::new(),
            &params,
        );
        let none = TrialPredictions::neutral(text.len());
        Fixture { text, lexicon, params, none }
    }

    fn state_with(f: &Fixture, active: &[(&str, f64)]) -> ActivationState {
        let mut values = vec![0.0; f.lexicon.len()];
        for (word, a) in active {
            values[f.lexicon.lookup(word).unwrap()] = *a;
        }
        ActivationState::from_values(values)
    }

    #[test]
    fn test_nothing_below_threshold() {
        let f = fixture(&["cat", "sat"], &[]);
        let state = state_with(&f, &[("cat", 0.1)]);
        let span = PerceptualSpan::new(0, 2, 1, 3);
        assert!(resolve_recognitions(&f.lexicon, &state, &f.text, &span, &[None, None], &f.none, &f.params).is_empty());
    }

    #[test]
    fn test_shared_entry_goes_to_fixated_slot() {
        let f = fixture(&["cat", "dog"], &[]);
        let state = state_with(&f, &[("cat", 0.9)]);
        let span = PerceptualSpan::new(0, 2, 1, 3);
        let recs = resolve_recognitions(&f.lexicon, &state, &f.text, &span, &[None, None], &f.none, &f.params);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].position, 0);
        assert!(recs[0].is_correct(&f.text, &f.lexicon));
    }

    #[test]
    fn test_equal_distance_prefers_upcoming_slot() {
        let f = fixture(&["pin", "the", "pen"], &["pan"]);
        let state = state_with(&f, &[("pan", 0.9)]);
        let span = PerceptualSpan::new(1, 3, 1, 3);
        let recs =
            resolve_recognitions(&f.lexicon, &state, &f.text, &span, &[None, Some(1), None], &f.none, &f.params);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].position, 2);
        assert!(!recs[0].is_correct(&f.text, &f.lexicon));
    }

    #[test]
    fn test_stronger_entry_wins_slot() {
        let f = fixture(&["bat"], &["cat"]);
        let state = state_with(&f, &[("bat", 0.7), ("cat", 0.8)]);
        let span = PerceptualSpan::new(0, 1, 1, 3);
        let recs = resolve_recognitions(&f.lexicon, &state, &f.text, &span, &[None], &f.none, &f.params);
        assert_eq!(recs.len(), 1);
        assert_eq!(f.lexicon.entry(recs[0].entry).text, "cat");
    }

    #[test]
    fn test_claimed_entry_not_reused_for_other_word() {
        let f = fixture(&["cat", "dog"], &[]);
        let state = state_with(&f, &[("cat", 0.9)]);
        let span = PerceptualSpan::new(0, 2, 1, 3);
        let cat = f.lexicon.lookup("cat").unwrap();
        let recs =
            resolve_recognitions(&f.lexicon, &state, &f.text, &span, &[Some(cat), None], &f.none, &f.params);
        assert!(recs.is_empty());
    }

    #[test]
    fn test_repeated_word_can_reuse_entry() {
        let f = fixture(&["the", "cat", "the"], &[]);
        let state = state_with(&f, &[("the", 0.9)]);
        let span = PerceptualSpan::new(1, 3, 1, 3);
        let the = f.lexicon.lookup("the").unwrap();
        let cat = f.lexicon.lookup("cat").unwrap();
        let recs = resolve_recognitions(
            &f.lexicon,
            &state,
            &f.text,
            &span,
            &[Some(the), Some(cat), None],
            &f.none,
            &f.params,
        );
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].position, 2);
    }

    #[test]
    fn test_prediction_lowers_threshold() {
        let mut f = fixture(&["she", "opened", "the", "door"], &[]);
        let door = f.lexicon.lookup("door").unwrap();
        let state = state_with(&f, &[("door", 0.5)]);
        let span = PerceptualSpan::new(2, 4, 1, 3);
        let recognized = [Some(0), Some(1), Some(2), None];
        let mut by_position = vec![Vec::new(); 4];
        by_position[3] = vec![(door, 0.9)];
        let predicted = TrialPredictions { by_position };

        // switched off: 0.5 stays under the 0.6 threshold
        let recs = resolve_recognitions(&f.lexicon, &state, &f.text, &span, &recognized, &predicted, &f.params);
        assert!(recs.is_empty());

        f.params.pred_threshold_weight = 0.5;
        let recs = resolve_recognitions(&f.lexicon, &state, &f.text, &span, &recognized, &predicted, &f.params);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].position, 3);

        // unpredicted slots keep the full threshold
        let recs = resolve_recognitions(&f.lexicon, &state, &f.text, &span, &recognized, &f.none, &f.params);
        assert!(recs.is_empty());
    }

    #[test]
    fn test_threshold_at_scales_with_probability() {
        let params = Parameters { pred_threshold_weight: 0.5, ..Parameters::default() };
        let predictions = TrialPredictions { by_position: vec![vec![(4, 0.2), (7, 0.8)]] };
        let low = threshold_at(0.6, 4, 0, &predictions, &params);
        let high = threshold_at(0.6, 7, 0, &predictions, &params);
        assert!(high < low && low < 0.6);
        assert_eq!(threshold_at(0.6, 9, 0, &predictions, &params), 0.6);
    }
}
