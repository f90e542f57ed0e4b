use super::vlq;
use crate::{InsightError, Result};
use serde::{Deserialize, Serialize};

/// A zero-based position in one of the map's `sources`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourcePos {
    pub source_idx: u32,
    pub line: u32,
    pub column: u32,
}

/// One entry of a generated line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    /// Column-only segment: generated text from here on maps nowhere.
    Unmapped { gen_column: u32 },
    /// Four-field segment, or five-field when `name_idx` is set.
    Mapped {
        gen_column: u32,
        source: SourcePos,
        name_idx: Option<u32>,
    },
}

/// One segment list per generated line, each sorted by generated column.
pub type Mappings = Vec<Vec<Segment>>;

impl Segment {
    pub fn unmapped(gen_column: u32) -> Self {
        Segment::Unmapped { gen_column }
    }

    pub fn mapped(gen_column: u32, source_idx: u32, line: u32, column: u32) -> Self {
        Segment::Mapped {
            gen_column,
            source: SourcePos {
                source_idx,
                line,
                column,
            },
            name_idx: None,
        }
    }

    pub fn named(gen_column: u32, source: SourcePos, name_idx: u32) -> Self {
        Segment::Mapped {
            gen_column,
            source,
            name_idx: Some(name_idx),
        }
    }

    pub fn gen_column(&self) -> u32 {
        match self {
            Segment::Unmapped { gen_column } | Segment::Mapped { gen_column, .. } => *gen_column,
        }
    }

    pub fn source(&self) -> Option<&SourcePos> {
        match self {
            Segment::Unmapped { .. } => None,
            Segment::Mapped { source, .. } => Some(source),
        }
    }

    pub fn name_idx(&self) -> Option<u32> {
        match self {
            Segment::Unmapped { .. } => None,
            Segment::Mapped { name_idx, .. } => *name_idx,
        }
    }

    /// Same segment anchored at another generated column.
    pub fn with_gen_column(&self, gen_column: u32) -> Self {
        match *self {
            Segment::Unmapped { .. } => Segment::Unmapped { gen_column },
            Segment::Mapped {
                source, name_idx, ..
            } => Segment::Mapped {
                gen_column,
                source,
                name_idx,
            },
        }
    }
}

/// Running totals shared by the four source fields across the whole mapping.
#[derive(Default)]
struct FieldState {
    source_idx: i64,
    line: i64,
    column: i64,
    name_idx: i64,
}

/// Adds a decoded delta to a running total.
fn accumulate(total: &mut i64, delta: i64, field: &str, pos: usize) -> Result<()> {
    *total = total.checked_add(delta).ok_or_else(|| {
        InsightError::InvalidSourceMap(format!(
            "{} overflows in segment ending at {}",
            field, pos
        ))
    })?;
    Ok(())
}

fn to_u32(value: i64, field: &str, pos: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| {
        InsightError::InvalidSourceMap(format!(
            "{} {} out of range in segment ending at {}",
            field, value, pos
        ))
    })
}

/// Decodes a `mappings` string. An empty string is one empty line.
pub fn decode_mappings(mappings: &str) -> Result<Mappings> {
    let bytes = mappings.as_bytes();
    let mut state = FieldState::default();
    let mut lines = Vec::new();
    let mut pos = 0;

    loop {
        let line_end = bytes[pos..]
            .iter()
            .position(|b| *b == b';')
            .map(|i| pos + i)
            .unwrap_or(bytes.len());
        let mut gen_column: i64 = 0;
        let mut line = Vec::new();

        while pos < line_end {
            if bytes[pos] == b',' {
                pos += 1;
                continue;
            }

            let mut fields = [0i64; 5];
            let mut count = 0;
            while pos < line_end && bytes[pos] != b',' {
                if count == fields.len() {
                    return Err(InsightError::InvalidSourceMap(format!(
                        "segment at {} has more than 5 fields",
                        pos
                    )));
                }
                fields[count] = vlq::decode(bytes, &mut pos, line_end)?;
                count += 1;
            }

            accumulate(&mut gen_column, fields[0], "generated column", pos)?;
            let column = to_u32(gen_column, "generated column", pos)?;
            let segment = match count {
                1 => Segment::unmapped(column),
                4 | 5 => {
                    accumulate(&mut state.source_idx, fields[1], "source index", pos)?;
                    accumulate(&mut state.line, fields[2], "source line", pos)?;
                    accumulate(&mut state.column, fields[3], "source column", pos)?;
                    let source = SourcePos {
                        source_idx: to_u32(state.source_idx, "source index", pos)?,
                        line: to_u32(state.line, "source line", pos)?,
                        column: to_u32(state.column, "source column", pos)?,
                    };
                    let name_idx = if count == 5 {
                        accumulate(&mut state.name_idx, fields[4], "name index", pos)?;
                        Some(to_u32(state.name_idx, "name index", pos)?)
                    } else {
                        None
                    };
                    Segment::Mapped {
                        gen_column: column,
                        source,
                        name_idx,
                    }
                }
                _ => {
                    return Err(InsightError::InvalidSourceMap(format!(
                        "segment ending at {} has {} fields, expected 1, 4 or 5",
                        pos, count
                    )))
                }
            };
            line.push(segment);
        }

        lines.push(line);
        if line_end >= bytes.len() {
            break;
        }
        pos = line_end + 1;
    }

    Ok(lines)
}

/// Encodes segment lines into a `mappings` string.
pub fn encode_mappings(lines: &[Vec<Segment>]) -> String {
    let mut out = String::new();
    let mut state = FieldState::default();

    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push(';');
        }
        let mut gen_column: i64 = 0;
        for (j, segment) in line.iter().enumerate() {
            if j > 0 {
                out.push(',');
            }
            let column = segment.gen_column() as i64;
            vlq::encode(column - gen_column, &mut out);
            gen_column = column;

            if let Segment::Mapped {
                source, name_idx, ..
            } = segment
            {
                let source_idx = source.source_idx as i64;
                let line = source.line as i64;
                let column = source.column as i64;
                vlq::encode(source_idx - state.source_idx, &mut out);
                vlq::encode(line - state.line, &mut out);
                vlq::encode(column - state.column, &mut out);
                state.source_idx = source_idx;
                state.line = line;
                state.column = column;

                if let Some(name_idx) = name_idx {
                    let name_idx = *name_idx as i64;
                    vlq::encode(name_idx - state.name_idx, &mut out);
                    state.name_idx = name_idx;
                }
            }
        }
    }

    out
}
