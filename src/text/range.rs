use super::pos::TextPos;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open range `[start, end_exclusive)` between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: TextPos,
    pub end_exclusive: TextPos,
}

impl TextRange {
    pub fn new(start: TextPos, end_exclusive: TextPos) -> Self {
        Self {
            start,
            end_exclusive,
        }
    }

    pub fn empty_at(pos: TextPos) -> Self {
        Self::new(pos, pos)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end_exclusive
    }

    pub fn is_single_line(&self) -> bool {
        self.start.line_idx == self.end_exclusive.line_idx
    }

    /// Smallest range covering both ranges.
    pub fn plus_range(&self, other: &TextRange) -> TextRange {
        TextRange::new(
            self.start.min(other.start),
            self.end_exclusive.max(other.end_exclusive),
        )
    }

    pub fn contains(&self, pos: &TextPos) -> bool {
        self.start <= *pos && *pos < self.end_exclusive
    }
}

impl PartialOrd for TextRange {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TextRange {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.start
            .cmp(&other.start)
            .then(self.end_exclusive.cmp(&other.end_exclusive))
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end_exclusive)
    }
}
