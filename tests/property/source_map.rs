use crate::utils::{edits_for, text_with_mappings, to_text_edit};
use code_insight::sourcemap::{
    decode_mappings, encode_mappings, mappings_apply_edit, source_map_apply_edit, SourceMapV3,
};
use code_insight::text::PositionOffsetTransformer;
use proptest::prelude::*;

/// Where byte `offset` of the old text ends up, or `None` if the edit
/// replaced it.
fn moved_offset(offset: usize, edits: &[(usize, usize, String)]) -> Option<usize> {
    let mut moved = offset as i64;
    for (start, end, text) in edits {
        if *start <= offset && offset < *end {
            return None;
        }
        if *end <= offset {
            moved += text.len() as i64 - (*end - *start) as i64;
        }
    }
    Some(moved as usize)
}

proptest! {
    #[test]
    fn test_vlq_round_trip(value in -(1i64 << 40)..(1i64 << 40)) {
        let mut encoded = String::new();
        code_insight::sourcemap::vlq::encode(value, &mut encoded);
        let mut pos = 0;
        let decoded = code_insight::sourcemap::vlq::decode(encoded.as_bytes(), &mut pos, encoded.len()).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert_eq!(pos, encoded.len());
    }

    #[test]
    fn test_mappings_encode_decode((_, mappings) in text_with_mappings()) {
        let encoded = encode_mappings(&mappings);
        prop_assert_eq!(decode_mappings(&encoded).unwrap(), mappings);
    }

    #[test]
    fn test_unedited_positions_keep_their_source(
        (text, mappings, edits) in text_with_mappings().prop_flat_map(|(text, mappings)| {
            let edits = edits_for(&text);
            (Just(text), Just(mappings), edits)
        })
    ) {
        let edit = to_text_edit(&text, &edits);
        let new_text = edit.apply_to_string(&text);

        let old_map = SourceMapV3::new(vec!["a.ts".into()], vec![], encode_mappings(&mappings));
        let new_map = source_map_apply_edit(&old_map, &edit).unwrap();
        prop_assert_eq!(
            new_map.decoded_mappings().unwrap(),
            &mappings_apply_edit(&mappings, &edit)
        );

        let old_positions = PositionOffsetTransformer::new(&text);
        let new_positions = PositionOffsetTransformer::new(&new_text);
        for offset in 0..=text.len() {
            let Some(new_offset) = moved_offset(offset, &edits) else {
                continue;
            };
            let old_pos = old_positions.get_position(offset);
            let new_pos = new_positions.get_position(new_offset);
            prop_assert_eq!(
                old_map.lookup(old_pos.line_idx, old_pos.char_idx).unwrap(),
                new_map.lookup(new_pos.line_idx, new_pos.char_idx).unwrap(),
                "offset {} ({}) moved to {} ({})", offset, old_pos, new_offset, new_pos
            );
        }
    }
}
