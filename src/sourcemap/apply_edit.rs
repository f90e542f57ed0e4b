//! Keeps a source map valid after its generated file is edited.
//!
//! The edit is replayed over the old mapping lines: text between edits is
//! copied with its segments re-anchored to the output column, inserted text
//! becomes unmapped.

use super::codec::{encode_mappings, Mappings, Segment};
use super::map::SourceMapV3;
use crate::logging;
use crate::text::{TextEdit, TextLength, TextPos};
use crate::Result;

/// Returns a map for the text produced by `edit.apply_to_string(generated)`.
pub fn source_map_apply_edit(source_map: &SourceMapV3, edit: &TextEdit) -> Result<SourceMapV3> {
    let decoded = source_map.decoded_mappings()?;
    let result = mappings_apply_edit(decoded, edit);
    let mappings = encode_mappings(&result);
    logging::log_source_map_edited(edit.edits().len(), decoded.len(), result.len());
    Ok(source_map.with_mappings(mappings))
}

pub fn mappings_apply_edit(mappings: &[Vec<Segment>], edit: &TextEdit) -> Mappings {
    let edit = edit.normalize();
    let mut writer = MappingsWriter::new(mappings);
    let mut last_edit_end = TextPos::ZERO;

    for e in edit.edits() {
        if last_edit_end < e.range.start {
            writer.copy_existing(last_edit_end, e.range.start.line_idx, Some(e.range.start.char_idx));
        }
        writer.insert(&e.text);
        last_edit_end = e.range.end_exclusive;
    }

    let last_line = (mappings.len().saturating_sub(1) as u32).max(last_edit_end.line_idx);
    writer.copy_existing(last_edit_end, last_line, None);
    writer.finish()
}

struct MappingsWriter<'a> {
    source: &'a [Vec<Segment>],
    lines: Mappings,
    /// Output column on the last output line.
    column: u32,
}

impl<'a> MappingsWriter<'a> {
    fn new(source: &'a [Vec<Segment>]) -> Self {
        Self {
            source,
            lines: vec![Vec::new()],
            column: 0,
        }
    }

    fn source_line(&self, line_idx: u32) -> &'a [Segment] {
        let source = self.source;
        source
            .get(line_idx as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Appends to the current output line. A segment at the same column as
    /// the previous one replaces it.
    fn push(&mut self, segment: Segment) {
        let Some(line) = self.lines.last_mut() else {
            return;
        };
        match line.last_mut() {
            Some(last) if last.gen_column() == segment.gen_column() => *last = segment,
            _ => line.push(segment),
        }
    }

    fn new_line(&mut self) {
        self.lines.push(Vec::new());
        self.column = 0;
    }

    /// Copies old text from `start` up to `(end_line, end_column)`. A
    /// missing `end_column` runs to the end of `end_line`.
    fn copy_existing(&mut self, start: TextPos, end_line: u32, end_column: Option<u32>) {
        if start.line_idx == end_line {
            self.copy_line_part(start.line_idx, start.char_idx, end_column);
            return;
        }

        self.copy_line_part(start.line_idx, start.char_idx, None);
        for line_idx in start.line_idx + 1..end_line {
            let line = self.source_line(line_idx).to_vec();
            self.lines.push(line);
        }
        self.new_line();
        self.copy_line_part(end_line, 0, end_column);
    }

    fn copy_line_part(&mut self, line_idx: u32, from: u32, to: Option<u32>) {
        let line = self.source_line(line_idx);
        let offset = self.column as i64 - from as i64;
        let first = line.partition_point(|s| s.gen_column() < from);

        // The gap starts inside this segment: carry it over to the gap start.
        if first > 0 {
            self.push(line[first - 1].with_gen_column(self.column));
        }

        for segment in &line[first..] {
            if to.is_some_and(|to| segment.gen_column() >= to) {
                break;
            }
            self.push(segment.with_gen_column((segment.gen_column() as i64 + offset) as u32));
        }

        if let Some(to) = to {
            self.column += to - from;
            self.push(Segment::unmapped(self.column));
        }
    }

    fn insert(&mut self, text: &str) {
        self.push(Segment::unmapped(self.column));
        let length = TextLength::of_text(text);
        if length.line_count == 0 {
            self.column += length.column_count;
        } else {
            for _ in 0..length.line_count {
                self.new_line();
            }
            self.column = length.column_count;
        }
    }

    fn finish(self) -> Mappings {
        self.lines
    }
}
