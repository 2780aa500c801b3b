//! The perceptual span: words available for processing around fixation

/// Word positions around the fixated word, in slot-matching order
///
/// The order is fixated, +1, -1, +2, -2, ... so nearer words come first
/// and, at equal distance, upcoming words precede words already passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerceptualSpan {
    pub fixated: usize,
    positions: Vec<usize>,
    first: usize,
    last: usize,
}

impl PerceptualSpan {
    /// Span of a text with `n_words` words, anchored on `fixated`
    pub fn new(fixated: usize, n_words: usize, left: usize, right: usize) -> Self {
        let fixated = fixated.min(n_words.saturating_sub(1));
        let first = fixated.saturating_sub(left);
        let last = (fixated + right).min(n_words.saturating_sub(1));

        let mut positions = vec![fixated];
        for distance in 1..=left.max(right) {
            if distance <= right && fixated + distance <= last {
                positions.push(fixated + distance);
            }
            if distance <= left && fixated >= distance {
                positions.push(fixated - distance);
            }
        }

        Self { fixated, positions, first, last }
    }

    /// Positions in slot-matching order
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn contains(&self, position: usize) -> bool {
        position >= self.first && position <= self.last
    }

    pub fn first(&self) -> usize {
        self.first
    }

    pub fn last(&self) -> usize {
        self.last
    }

    /// Distance in words from fixation
    pub fn distance(&self, position: usize) -> usize {
        position.abs_diff(self.fixated)
    }
}
