use serde::{Deserialize, Serialize};
use std::fmt;

/// Zero-based position in a text.
///
/// Ordering compares the line first, then the column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct TextPos {
    pub line_idx: u32,
    pub char_idx: u32,
}

impl TextPos {
    pub const ZERO: TextPos = TextPos {
        line_idx: 0,
        char_idx: 0,
    };

    pub fn new(line_idx: u32, char_idx: u32) -> Self {
        Self { line_idx, char_idx }
    }

    pub fn is_before(&self, other: &TextPos) -> bool {
        self < other
    }

    pub fn is_before_or_equal(&self, other: &TextPos) -> bool {
        self <= other
    }
}

impl fmt::Display for TextPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.line_idx, self.char_idx)
    }
}
