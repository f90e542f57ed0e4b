use super::pos::TextPos;
use super::range::TextRange;
use std::fmt;

/// Non-negative length of text in lines and columns.
///
/// `column_count` is the number of characters after the last line break, or
/// the plain character count if the text spans a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TextLength {
    pub line_count: u32,
    pub column_count: u32,
}

impl TextLength {
    pub const ZERO: TextLength = TextLength {
        line_count: 0,
        column_count: 0,
    };

    pub fn new(line_count: u32, column_count: u32) -> Self {
        Self {
            line_count,
            column_count,
        }
    }

    pub fn of_text(text: &str) -> Self {
        let mut line_count = 0;
        let mut column_count = 0;
        for c in text.chars() {
            if c == '\n' {
                line_count += 1;
                column_count = 0;
            } else {
                column_count += 1;
            }
        }
        Self::new(line_count, column_count)
    }

    /// Length of the text between two positions. `end` must not be before `start`.
    pub fn between_positions(start: TextPos, end: TextPos) -> Self {
        if start.line_idx == end.line_idx {
            Self::new(0, end.char_idx.saturating_sub(start.char_idx))
        } else {
            Self::new(end.line_idx - start.line_idx, end.char_idx)
        }
    }

    pub fn of_range(range: &TextRange) -> Self {
        Self::between_positions(range.start, range.end_exclusive)
    }

    /// Length from `start` to `end`, or zero if `end` is shorter.
    pub fn length_diff_non_negative(start: TextLength, end: TextLength) -> Self {
        if end < start {
            return Self::ZERO;
        }
        if start.line_count == end.line_count {
            Self::new(0, end.column_count - start.column_count)
        } else {
            Self::new(end.line_count - start.line_count, end.column_count)
        }
    }

    pub fn is_zero(&self) -> bool {
        self.line_count == 0 && self.column_count == 0
    }

    pub fn add(&self, other: TextLength) -> TextLength {
        if other.line_count == 0 {
            Self::new(self.line_count, self.column_count + other.column_count)
        } else {
            Self::new(self.line_count + other.line_count, other.column_count)
        }
    }

    pub fn add_to_position(&self, pos: TextPos) -> TextPos {
        if self.line_count == 0 {
            TextPos::new(pos.line_idx, pos.char_idx + self.column_count)
        } else {
            TextPos::new(pos.line_idx + self.line_count, self.column_count)
        }
    }

    pub fn create_range(&self, start: TextPos) -> TextRange {
        TextRange::new(start, self.add_to_position(start))
    }

    pub fn to_range(&self) -> TextRange {
        self.create_range(TextPos::ZERO)
    }
}

impl fmt::Display for TextLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.line_count, self.column_count)
    }
}
