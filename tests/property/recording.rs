use crate::utils::{balanced, events, Event};
use code_insight::recording::{decode_all, ExecutionRecorder, Instruction, ModuleId, ModuleInfo};
use code_insight::replay::{Recording, StackFrame};
use proptest::prelude::*;
use std::collections::HashSet;

fn record(events: &[Event]) -> Vec<u8> {
    let mut recorder =
        ExecutionRecorder::new(|_: ModuleId| -> code_insight::Result<ModuleInfo> { Ok(ModuleInfo::default()) });
    for event in events {
        match *event {
            Event::Enter(module_id, function_id) => {
                recorder.record_function_enter(module_id, function_id).unwrap()
            }
            Event::Block(block_id) => recorder.record_block_execution(block_id).unwrap(),
            Event::Return => recorder.record_function_return(),
        }
    }
    recorder.into_bytes()
}

/// What the recorder is expected to write for `events`.
fn expected_instructions(events: &[Event]) -> Vec<Instruction> {
    let payload = ModuleInfo::default().to_bytes().unwrap();
    let mut last_module = None;
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for event in events {
        match *event {
            Event::Enter(module_id, function_id) => {
                if last_module != Some(module_id) {
                    out.push(Instruction::SetModuleId { module_id });
                    last_module = Some(module_id);
                    if seen.insert(module_id) {
                        out.push(Instruction::SetModuleInfo {
                            payload: payload.clone(),
                        });
                    }
                }
                out.push(Instruction::CallFunction { function_id });
            }
            Event::Block(block_id) => out.push(Instruction::ReachedBlock { block_id }),
            Event::Return => out.push(Instruction::ReturnFunction),
        }
    }
    out
}

proptest! {
    #[test]
    fn test_recorder_output_decodes_to_recorded_calls(events in events()) {
        let events = balanced(events);
        let bytes = record(&events);
        prop_assert_eq!(decode_all(&bytes).unwrap(), expected_instructions(&events));
    }

    #[test]
    fn test_stack_depth_matches_call_balance(events in events()) {
        let events = balanced(events);
        let recording = Recording::parse(record(&events));
        let instructions = recording.decode_all().unwrap();

        let mut depth = 0i64;
        for (i, instruction) in instructions.iter().enumerate() {
            match instruction {
                Instruction::CallFunction { .. } => depth += 1,
                Instruction::ReturnFunction => depth -= 1,
                _ => {}
            }
            let stack = recording.stack_at(i).unwrap();
            prop_assert_eq!(stack.depth() as i64, depth);

            // A frame's block must have been reached at or before `i`.
            for frame in &stack.frames {
                if let Some(block_id) = frame.block_id {
                    let reached = instructions[..=i].iter().any(|earlier| {
                        *earlier == Instruction::ReachedBlock { block_id }
                    });
                    prop_assert!(reached);
                }
            }
        }
    }

    #[test]
    fn test_stack_after_each_event_matches_model(events in events()) {
        let events = balanced(events);
        let recording = Recording::parse(record(&events));

        let mut model: Vec<StackFrame> = Vec::new();
        let mut last_module = None;
        let mut seen = HashSet::new();
        let mut index = 0usize;
        for event in &events {
            match *event {
                Event::Enter(module_id, function_id) => {
                    if last_module != Some(module_id) {
                        index += 1;
                        last_module = Some(module_id);
                        if seen.insert(module_id) {
                            index += 1;
                        }
                    }
                    index += 1;
                    model.push(StackFrame { module_id, function_id, block_id: None });
                }
                Event::Block(block_id) => {
                    index += 1;
                    if let Some(top) = model.last_mut() {
                        top.block_id = Some(block_id);
                    }
                }
                Event::Return => {
                    index += 1;
                    model.pop();
                }
            }
            // `index` counts the instructions written so far.
            prop_assert_eq!(&recording.stack_at(index - 1).unwrap().frames, &model);
        }
    }
}
