use code_insight::recording::{BlockId, FunctionId, FunctionInfo, LocationRef, ModuleId, ModuleInfo};
use code_insight::sourcemap::{Mappings, Segment};
use code_insight::text::{PositionOffsetTransformer, SingleTextEdit, TextEdit, TextRange};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
pub enum Event {
    Enter(ModuleId, FunctionId),
    Block(BlockId),
    Return,
}

pub fn events() -> impl Strategy<Value = Vec<Event>> {
    prop::collection::vec(
        prop_oneof![
            3 => (0u32..3, 0u32..200_000)
                .prop_map(|(m, f)| Event::Enter(ModuleId(m), FunctionId(f))),
            3 => (0u32..70_000).prop_map(|b| Event::Block(BlockId(b))),
            2 => Just(Event::Return),
        ],
        0..40,
    )
}

/// Drops returns that have no open call.
pub fn balanced(events: Vec<Event>) -> Vec<Event> {
    let mut depth = 0usize;
    events
        .into_iter()
        .filter(|event| match event {
            Event::Enter(..) => {
                depth += 1;
                true
            }
            Event::Return if depth == 0 => false,
            Event::Return => {
                depth -= 1;
                true
            }
            Event::Block(_) => true,
        })
        .collect()
}

fn location(paths: u32) -> impl Strategy<Value = Option<LocationRef>> {
    // Few distinct columns and paths so that the delta encoding kicks in.
    prop::option::of(
        (0u32..500, 0u32..4, 0..paths).prop_map(|(l, c, p)| LocationRef::new(l, c, p)),
    )
}

pub fn module_info() -> impl Strategy<Value = ModuleInfo> {
    (1u32..4)
        .prop_flat_map(|paths| {
            let functions = prop::collection::vec(
                (location(paths), prop::collection::vec(location(paths), 0..6))
                    .prop_map(|(loc, blocks)| FunctionInfo::new(loc, blocks)),
                0..8,
            );
            (Just(paths), functions)
        })
        .prop_map(|(paths, functions)| {
            ModuleInfo::new(
                (0..paths).map(|i| format!("src/file{i}.ts")).collect(),
                functions,
            )
        })
}

/// An ASCII text together with a mapping table for it: every line gets
/// segments at increasing columns within the line, mapped or not.
pub fn text_with_mappings() -> impl Strategy<Value = (String, Mappings)> {
    prop::collection::vec("[a-z ]{0,12}", 1..6).prop_flat_map(|lines| {
        let mappings = lines
            .iter()
            .enumerate()
            .map(|(line_idx, line)| {
                let len = line.len() as u32;
                prop::collection::vec((0..=len, any::<bool>()), 0..5)
                    .prop_map(move |mut columns| {
                        columns.sort_unstable_by_key(|(col, _)| *col);
                        columns.dedup_by_key(|(col, _)| *col);
                        columns
                            .into_iter()
                            .map(|(col, mapped)| {
                                if mapped {
                                    Segment::mapped(col, 0, line_idx as u32, col)
                                } else {
                                    Segment::unmapped(col)
                                }
                            })
                            .collect::<Vec<_>>()
                    })
            })
            .collect::<Vec<_>>();
        (Just(lines.join("\n")), mappings)
    })
}

/// Sorted, non-overlapping edits over `text`, as byte offsets plus
/// replacement text.
pub fn edits_for(text: &str) -> impl Strategy<Value = Vec<(usize, usize, String)>> {
    let len = text.len();
    (
        prop::collection::vec(0..=len, 0..8),
        prop::collection::vec("[a-z\n]{0,4}", 4),
    )
        .prop_map(|(mut offsets, texts)| {
            offsets.sort_unstable();
            offsets
                .chunks_exact(2)
                .zip(texts)
                .map(|(pair, text)| (pair[0], pair[1], text))
                .collect()
        })
}

pub fn to_text_edit(text: &str, edits: &[(usize, usize, String)]) -> TextEdit {
    let transformer = PositionOffsetTransformer::new(text);
    let edits = edits
        .iter()
        .map(|(start, end, replacement)| {
            SingleTextEdit::new(
                TextRange::new(
                    transformer.get_position(*start),
                    transformer.get_position(*end),
                ),
                replacement.clone(),
            )
        })
        .collect();
    TextEdit::new(edits).expect("generated edits are sorted")
}
