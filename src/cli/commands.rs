use crate::cli::args::{ApplyEditArgs, DecodeArgs, LookupArgs, ModulesArgs, StackArgs};
use crate::cli::output::{CommandOutput, LookupReport, ModuleSummary, StackReport};
use crate::config::Config;
use crate::logging;
use crate::replay::{Recording, Timeline};
use crate::sourcemap::{source_map_apply_edit, SourceMapV3, SourceMapWithPath};
use crate::text::TextEdit;
use crate::ui::formatter::Formatter;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

fn print_info(message: impl AsRef<str>) {
    println!("{}", Formatter::info(message));
}

fn print_success(message: impl AsRef<str>) {
    println!("{}", Formatter::success(message));
}

fn print_warning(message: impl AsRef<str>) {
    println!("{}", Formatter::warning(message));
}

fn print_json<T: Serialize>(result: T) -> Result<()> {
    let json = CommandOutput::ok(result)
        .to_json()
        .context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

fn load_recording(path: &Path) -> Result<Recording> {
    Recording::from_file(path).with_context(|| format!("Failed to load trace: {:?}", path))
}

/// Execute the decode command
pub fn decode(args: DecodeArgs) -> Result<()> {
    let recording = load_recording(&args.trace)?;
    let instructions = recording.decode_all()?;

    if args.json {
        return print_json(&instructions);
    }

    print_info(format!(
        "Trace {:?}: {} instructions ({} bytes)",
        args.trace,
        instructions.len(),
        recording.bytes().len()
    ));
    for (index, instruction) in instructions.iter().enumerate() {
        println!("{}", Formatter::format_instruction(index, instruction, false));
    }
    Ok(())
}

/// Execute the stack command
pub fn stack(args: StackArgs, config: &Config) -> Result<()> {
    let recording = load_recording(&args.trace)?;
    let mut timeline = Timeline::new(&recording, config.replay.stack_cache_size)?;
    let index = timeline.goto(args.index);
    let stack = timeline.resolved_stack()?;

    if args.json {
        return print_json(StackReport {
            index,
            instruction_count: timeline.len(),
            stack,
        });
    }

    if timeline.is_empty() {
        print_warning("Trace contains no instructions.");
    } else if index != args.index {
        print_warning(format!(
            "Index {} is past the end of the trace, showing instruction {}.",
            args.index, index
        ));
    }

    if args.context > 0 && !timeline.is_empty() {
        let instructions = recording.decode_all()?;
        println!(
            "{}\n",
            Formatter::format_instruction_context(&instructions, index, args.context)
        );
    }

    logging::log_display(&stack, logging::LogLevel::Debug);
    println!("{}", Formatter::format_stack(&stack));
    Ok(())
}

/// Execute the modules command
pub fn modules(args: ModulesArgs) -> Result<()> {
    let recording = load_recording(&args.trace)?;
    let modules = recording.modules()?;

    if args.json {
        let summaries: Vec<ModuleSummary> = modules
            .iter()
            .map(|(id, info)| ModuleSummary {
                module_id: id.0,
                source_paths: info.source_paths().to_vec(),
                functions: info.functions().len(),
                blocks: info.block_count(),
            })
            .collect();
        return print_json(summaries);
    }

    if modules.is_empty() {
        print_warning("No module info recorded.");
        return Ok(());
    }
    for (id, info) in &modules {
        println!("{}", Formatter::format_module_summary(*id, info));
    }
    Ok(())
}

/// Execute the apply-edit command
pub fn apply_edit(args: ApplyEditArgs) -> Result<()> {
    logging::log_loading_source_map(&args.source_map.to_string_lossy());
    let map_json = fs::read_to_string(&args.source_map)
        .with_context(|| format!("Failed to read source map: {:?}", args.source_map))?;
    let source_map = SourceMapV3::from_json(&map_json)?;

    let edit_json = fs::read_to_string(&args.edit)
        .with_context(|| format!("Failed to read edit file: {:?}", args.edit))?;
    let edit: TextEdit = serde_json::from_str(&edit_json)
        .with_context(|| format!("Invalid edit file: {:?}", args.edit))?;

    let updated = source_map_apply_edit(&source_map, &edit)?;
    let updated_json = updated.to_json()?;

    if let (Some(generated), Some(generated_output)) = (&args.generated, &args.generated_output) {
        let text = fs::read_to_string(generated)
            .with_context(|| format!("Failed to read generated file: {:?}", generated))?;
        fs::write(generated_output, edit.apply_to_string(&text)).with_context(|| {
            format!("Failed to write generated file: {:?}", generated_output)
        })?;
    }

    match &args.output {
        Some(output) => {
            fs::write(output, updated_json)
                .with_context(|| format!("Failed to write source map: {:?}", output))?;
            print_success(format!(
                "Applied {} edits, source map written to {:?}",
                edit.edits().len(),
                output
            ));
        }
        None => println!("{}", updated_json),
    }
    Ok(())
}

/// Execute the lookup command
pub fn lookup(args: LookupArgs) -> Result<()> {
    logging::log_loading_source_map(&args.source_map.to_string_lossy());
    let map = SourceMapWithPath::from_file(&args.source_map)?;
    let mapped = map.source_map.lookup(args.line, args.column)?;

    if args.json {
        return print_json(LookupReport {
            line: args.line,
            column: args.column,
            source: mapped.and_then(|m| {
                map.full_source_path(m.source_idx)
                    .map(|p| p.to_string_lossy().into_owned())
            }),
            source_line: mapped.map(|m| m.line_idx),
            source_column: mapped.map(|m| m.column_idx),
        });
    }

    println!(
        "{}",
        Formatter::format_mapped_position(
            args.line,
            args.column,
            mapped.as_ref(),
            &map.source_map.sources
        )
    );
    Ok(())
}
