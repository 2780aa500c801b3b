//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Identifier of a text (one trial of continuous reading)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextId(pub u32);

/// Index of an independent simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunId(pub u32);

/// Identifier of a saccade program, unique within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProgramId(pub u64);

/// Simulated time in milliseconds
pub type Millis = u64;

/// Direction of the script on screen
///
/// Letter offsets inside the model always run in reading order, so the
/// direction only matters when positions are mapped back to the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingDirection {
    #[default]
    LeftToRight,
    RightToLeft,
}

impl ReadingDirection {
    /// Screen column (from the left edge) of a reading-order letter offset
    pub fn screen_offset(&self, offset: usize, letter_count: usize) -> usize {
        match self {
            ReadingDirection::LeftToRight => offset,
            ReadingDirection::RightToLeft => letter_count.saturating_sub(offset + 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_id_ordering() {
        assert!(TextId(1) < TextId(2));
        assert_eq!(TextId(3), TextId(3));
    }

    #[test]
    fn test_text_id_hash() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(TextId(1), "first");
        assert_eq!(map.get(&TextId(1)), Some(&"first"));
    }

    #[test]
    fn test_screen_offset() {
        assert_eq!(ReadingDirection::LeftToRight.screen_offset(3, 10), 3);
        assert_eq!(ReadingDirection::RightToLeft.screen_offset(0, 10), 9);
        assert_eq!(ReadingDirection::RightToLeft.screen_offset(9, 10), 0);
    }
}
