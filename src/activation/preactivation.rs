//! Parallel-graded pre-activation from contextual predictions
//!
//! Every candidate listed for an upcoming, unrecognized position inside the
//! span receives input proportional to its probability. The input is scaled
//! by how much of the preceding context has been recognized, so predictions
//! firm up as the reader advances through the sentence.

use crate::perception::PerceptualSpan;
use crate::predictability::TrialPredictions;

/// Fraction of the positions before `position` that are recognized
pub fn context_certainty(recognized: &[bool], position: usize) -> f64 {
    if position == 0 {
        return 0.0;
    }
    let known = recognized.iter().take(position).filter(|r| **r).count();
    known as f64 / position as f64
}

/// Pre-activation per lexicon entry, sorted by entry id
///
/// An entry listed at several positions keeps its strongest input.
/// Positions outside the span contribute nothing.
pub fn compute_preactivation(
    predictions: &TrialPredictions,
    span: &PerceptualSpan,
    recognized: &[bool],
    pred_weight: f64,
) -> Vec<(usize, f64)> {
    let mut out: Vec<(usize, f64)> = Vec::new();
    if pred_weight <= 0.0 {
        return out;
    }

    for &position in span.positions() {
        if recognized.get(position).copied().unwrap_or(true) {
            continue;
        }
        let certainty = context_certainty(recognized, position);
        if certainty <= 0.0 {
            continue;
        }
        for &(entry, probability) in predictions.at(position) {
            let value = pred_weight * probability * certainty;
            match out.iter_mut().find(|(id, _)| *id == entry) {
                Some(slot) => slot.1 = slot.1.max(value),
                None => out.push((entry, value)),
            }
        }
    }

    out.sort_by_key(|(id, _)| *id);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn predictions(by_position: Vec<Vec<(usize, f64)>>) -> TrialPredictions {
        TrialPredictions { by_position }
    }

    #[test]
    fn test_certainty_grows_with_context() {
        let recognized = [true, false, true, true];
        assert_eq!(context_certainty(&recognized, 0), 0.0);
        assert_eq!(context_certainty(&recognized, 1), 1.0);
        assert_eq!(context_certainty(&recognized, 2), 0.5);
        assert!((context_certainty(&recognized, 3) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_candidates_scale_with_probability() {
        let preds = predictions(vec![vec![], vec![(4, 0.6), (9, 0.3)]]);
        let span = PerceptualSpan::new(0, 2, 1, 3);
        let pre = compute_preactivation(&preds, &span, &[true, false], 0.1);
        assert_eq!(pre.len(), 2);
        assert!((pre[0].1 - 0.06).abs() < 1e-12);
        assert!((pre[1].1 - 0.03).abs() < 1e-12);
    }

    #[test]
    fn test_outside_span_contributes_nothing() {
        let preds = predictions(vec![vec![], vec![], vec![], vec![], vec![(7, 0.9)]]);
        let span = PerceptualSpan::new(0, 5, 1, 3);
        let pre = compute_preactivation(&preds, &span, &[true, true, true, true, false], 0.1);
        assert!(pre.is_empty());
    }

    #[test]
    fn test_recognized_positions_are_not_predicted() {
        let preds = predictions(vec![vec![], vec![(2, 0.9)]]);
        let span = PerceptualSpan::new(0, 2, 1, 3);
        assert!(compute_preactivation(&preds, &span, &[true, true], 0.1).is_empty());
    }

    #[test]
    fn test_shared_candidate_keeps_max() {
        let preds = predictions(vec![vec![], vec![(3, 0.2)], vec![(3, 0.8)]]);
        let span = PerceptualSpan::new(0, 3, 1, 3);
        let pre = compute_preactivation(&preds, &span, &[true, true, false], 0.1);
        assert_eq!(pre.len(), 1);
        assert!((pre[0].1 - 0.08).abs() < 1e-12);
    }
}
