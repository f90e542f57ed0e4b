use super::length::TextLength;
use super::pos::TextPos;
use super::range::TextRange;
use std::fmt;

/// Half-open range of byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OffsetRange {
    pub start: usize,
    pub end_exclusive: usize,
}

impl OffsetRange {
    /// Returns `None` if `start > end_exclusive`.
    pub fn try_new(start: usize, end_exclusive: usize) -> Option<Self> {
        (start <= end_exclusive).then_some(Self {
            start,
            end_exclusive,
        })
    }

    pub fn of_length(length: usize) -> Self {
        Self {
            start: 0,
            end_exclusive: length,
        }
    }

    pub fn of_start_and_length(start: usize, length: usize) -> Self {
        Self {
            start,
            end_exclusive: start + length,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end_exclusive
    }

    pub fn len(&self) -> usize {
        self.end_exclusive - self.start
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end_exclusive
    }

    pub fn contains_range(&self, other: &OffsetRange) -> bool {
        self.start <= other.start && other.end_exclusive <= self.end_exclusive
    }

    /// Smallest range containing both ranges.
    pub fn join(&self, other: &OffsetRange) -> OffsetRange {
        OffsetRange {
            start: self.start.min(other.start),
            end_exclusive: self.end_exclusive.max(other.end_exclusive),
        }
    }

    /// Empty if the ranges only touch, `None` if they are disjoint.
    pub fn intersect(&self, other: &OffsetRange) -> Option<OffsetRange> {
        OffsetRange::try_new(
            self.start.max(other.start),
            self.end_exclusive.min(other.end_exclusive),
        )
    }

    pub fn intersects(&self, other: &OffsetRange) -> bool {
        self.start.max(other.start) < self.end_exclusive.min(other.end_exclusive)
    }

    pub fn is_before(&self, other: &OffsetRange) -> bool {
        self.end_exclusive <= other.start
    }

    /// Slice of `text` covered by this range, `None` if out of bounds or not
    /// on a character boundary.
    pub fn substring<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.start..self.end_exclusive)
    }
}

impl fmt::Display for OffsetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end_exclusive)
    }
}

/// Converts between byte offsets and zero-based (line, character) positions.
///
/// Columns count characters, not bytes.
pub struct PositionOffsetTransformer<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> PositionOffsetTransformer<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { text, line_starts }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    fn line_bounds(&self, line_idx: usize) -> (usize, usize) {
        let start = self.line_starts[line_idx];
        let end = self
            .line_starts
            .get(line_idx + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        (start, end)
    }

    /// Byte offset of `pos`. Positions past the end of a line clamp to the
    /// line end; lines past the end of the text clamp to the text end.
    pub fn get_offset(&self, pos: TextPos) -> usize {
        let line_idx = pos.line_idx as usize;
        if line_idx >= self.line_starts.len() {
            return self.text.len();
        }
        let (start, end) = self.line_bounds(line_idx);
        self.text[start..end]
            .char_indices()
            .nth(pos.char_idx as usize)
            .map(|(i, _)| start + i)
            .unwrap_or(end)
    }

    pub fn get_offset_range(&self, range: &TextRange) -> OffsetRange {
        OffsetRange {
            start: self.get_offset(range.start),
            end_exclusive: self.get_offset(range.end_exclusive),
        }
    }

    pub fn get_position(&self, offset: usize) -> TextPos {
        let line_idx = self.line_starts.partition_point(|&s| s <= offset) - 1;
        let start = self.line_starts[line_idx];
        let char_idx = self.text[start..]
            .char_indices()
            .take_while(|(i, _)| start + i < offset)
            .count();
        TextPos::new(line_idx as u32, char_idx as u32)
    }

    pub fn get_range(&self, range: &OffsetRange) -> TextRange {
        TextRange::new(
            self.get_position(range.start),
            self.get_position(range.end_exclusive),
        )
    }

    pub fn get_text_length(&self, range: &OffsetRange) -> TextLength {
        TextLength::of_range(&self.get_range(range))
    }

    /// Length of the whole text.
    pub fn text_length(&self) -> TextLength {
        let last = self.line_starts.len() - 1;
        let (start, end) = self.line_bounds(last);
        TextLength::new(last as u32, self.text[start..end].chars().count() as u32)
    }
}
