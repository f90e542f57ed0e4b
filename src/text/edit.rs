use super::length::TextLength;
use super::offset::PositionOffsetTransformer;
use super::pos::TextPos;
use super::range::TextRange;
use crate::{InsightError, Result};
use serde::{Deserialize, Serialize};

/// Replacement of one range of the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleTextEdit {
    pub range: TextRange,
    pub text: String,
}

impl SingleTextEdit {
    pub fn new(range: TextRange, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }

    pub fn insert(at: TextPos, text: impl Into<String>) -> Self {
        Self::new(TextRange::empty_at(at), text)
    }

    pub fn delete(range: TextRange) -> Self {
        Self::new(range, String::new())
    }

    /// An edit that neither removes nor inserts anything.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty() && self.text.is_empty()
    }
}

/// Sorted, non-overlapping set of replacements against one original text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SingleTextEdit>", into = "Vec<SingleTextEdit>")]
pub struct TextEdit {
    edits: Vec<SingleTextEdit>,
}

impl TextEdit {
    /// Fails if the edits are not sorted by start position or overlap.
    pub fn new(edits: Vec<SingleTextEdit>) -> Result<Self> {
        for edit in &edits {
            if edit.range.end_exclusive < edit.range.start {
                return Err(InsightError::InvalidEdit(format!(
                    "range {} ends before it starts",
                    edit.range
                )));
            }
        }
        for pair in edits.windows(2) {
            if pair[1].range.start < pair[0].range.end_exclusive {
                return Err(InsightError::InvalidEdit(format!(
                    "edit at {} overlaps or precedes edit at {}",
                    pair[1].range, pair[0].range
                )));
            }
        }
        Ok(Self { edits })
    }

    /// Sorts the edits by range first. Overlaps are still rejected.
    pub fn from_unsorted(mut edits: Vec<SingleTextEdit>) -> Result<Self> {
        edits.sort_by(|a, b| a.range.cmp(&b.range));
        Self::new(edits)
    }

    /// Fails if `range` ends before it starts.
    pub fn single(range: TextRange, text: impl Into<String>) -> Result<Self> {
        Self::new(vec![SingleTextEdit::new(range, text)])
    }

    pub fn edits(&self) -> &[SingleTextEdit] {
        &self.edits
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Joins touching edits and removes empty edits.
    pub fn normalize(&self) -> TextEdit {
        let mut edits: Vec<SingleTextEdit> = Vec::with_capacity(self.edits.len());
        for edit in &self.edits {
            match edits.last_mut() {
                Some(last) if last.range.end_exclusive == edit.range.start => {
                    last.range = last.range.plus_range(&edit.range);
                    last.text.push_str(&edit.text);
                }
                _ if edit.is_empty() => {}
                _ => edits.push(edit.clone()),
            }
        }
        TextEdit { edits }
    }

    /// Ranges the replacement texts occupy in the edited text.
    pub fn new_ranges(&self) -> Vec<TextRange> {
        let mut ranges = Vec::with_capacity(self.edits.len());
        let mut prev_end_old = TextPos::ZERO;
        let mut prev_end_new = TextPos::ZERO;
        for edit in &self.edits {
            let start = edit.range.start;
            let new_start = if start.line_idx == prev_end_old.line_idx {
                TextPos::new(
                    prev_end_new.line_idx,
                    prev_end_new.char_idx + (start.char_idx - prev_end_old.char_idx),
                )
            } else {
                TextPos::new(
                    start.line_idx + prev_end_new.line_idx - prev_end_old.line_idx,
                    start.char_idx,
                )
            };
            let new_range = TextLength::of_text(&edit.text).create_range(new_start);
            prev_end_old = edit.range.end_exclusive;
            prev_end_new = new_range.end_exclusive;
            ranges.push(new_range);
        }
        ranges
    }

    pub fn apply_to_string(&self, text: &str) -> String {
        let t = PositionOffsetTransformer::new(text);
        let mut result = String::with_capacity(text.len());
        let mut last_end = 0;
        for edit in &self.edits {
            let range = t.get_offset_range(&edit.range);
            if last_end < range.start {
                result.push_str(&text[last_end..range.start]);
            }
            result.push_str(&edit.text);
            last_end = last_end.max(range.end_exclusive);
        }
        result.push_str(&text[last_end..]);
        result
    }
}

impl TryFrom<Vec<SingleTextEdit>> for TextEdit {
    type Error = InsightError;

    fn try_from(edits: Vec<SingleTextEdit>) -> Result<Self> {
        TextEdit::new(edits)
    }
}

impl From<TextEdit> for Vec<SingleTextEdit> {
    fn from(edit: TextEdit) -> Self {
        edit.edits
    }
}
