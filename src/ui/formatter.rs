use crate::recording::instruction::{Instruction, ModuleId};
use crate::recording::module_info::ModuleInfo;
use crate::replay::recording::ResolvedStack;
use crate::sourcemap::map::MappedPosition;
use crossterm::style::Stylize;
use std::sync::atomic::{AtomicBool, Ordering};

/// Pretty printing utilities for CLI output
pub struct Formatter;

impl Formatter {
    /// Format a single decoded instruction.
    pub fn format_instruction(index: usize, instruction: &Instruction, is_current: bool) -> String {
        let prefix = if is_current { "►" } else { " " };
        let text = match instruction {
            Instruction::SetModuleInfo { payload } => {
                format!("SetModuleInfo ({} bytes)", payload.len())
            }
            other => other.to_string(),
        };
        format!("{} {:>6}: {}", prefix, index, text)
    }

    /// Format the instructions around `current`.
    pub fn format_instruction_context(
        instructions: &[Instruction],
        current: usize,
        context_size: usize,
    ) -> String {
        if instructions.is_empty() {
            return "No instructions available".to_string();
        }

        let start = current.saturating_sub(context_size);
        let end = (current + context_size + 1).min(instructions.len());
        let mut lines = vec!["Instruction Context".to_string()];
        lines.extend(
            instructions[start.min(end)..end]
                .iter()
                .enumerate()
                .map(|(i, instruction)| {
                    let index = start + i;
                    Self::format_instruction(index, instruction, index == current)
                }),
        );
        lines.join("\n")
    }

    /// Format a resolved call stack, innermost frame first.
    pub fn format_stack(stack: &ResolvedStack) -> String {
        if stack.frames.is_empty() {
            return "Call stack is empty".to_string();
        }
        let depth = stack.frames.len();
        let mut lines = vec![format!("Call Stack ({} frames)", depth)];
        lines.extend(stack.frames.iter().rev().enumerate().map(|(i, frame)| {
            let text = format!("  #{:<3} {}", i, frame);
            if i == 0 {
                Self::highlight(&text)
            } else {
                text
            }
        }));
        lines.join("\n")
    }

    /// Format a one-line summary of a module table.
    pub fn format_module_summary(module_id: ModuleId, info: &ModuleInfo) -> String {
        format!(
            "Module {}: {} functions, {} blocks, sources: {}",
            module_id,
            info.functions().len(),
            info.block_count(),
            if info.source_paths().is_empty() {
                "<none>".to_string()
            } else {
                info.source_paths().join(", ")
            }
        )
    }

    /// Format the result of a source map lookup.
    pub fn format_mapped_position(
        line_idx: u32,
        char_idx: u32,
        mapped: Option<&MappedPosition>,
        sources: &[String],
    ) -> String {
        match mapped {
            Some(pos) => format!(
                "{}:{} -> {}:{}:{}",
                line_idx + 1,
                char_idx + 1,
                sources
                    .get(pos.source_idx as usize)
                    .map(String::as_str)
                    .unwrap_or("<unknown source>"),
                pos.line_idx + 1,
                pos.column_idx + 1
            ),
            None => format!("{}:{} -> unmapped", line_idx + 1, char_idx + 1),
        }
    }

    /// Format an informational message in blue.
    pub fn info(message: impl AsRef<str>) -> String {
        Self::apply_color(message.as_ref(), ColorKind::Info)
    }

    /// Format a success message in green.
    pub fn success(message: impl AsRef<str>) -> String {
        Self::apply_color(message.as_ref(), ColorKind::Success)
    }

    /// Format a warning message in yellow.
    pub fn warning(message: impl AsRef<str>) -> String {
        Self::apply_color(message.as_ref(), ColorKind::Warning)
    }

    /// Format an error message in red.
    pub fn error(message: impl AsRef<str>) -> String {
        Self::apply_color(message.as_ref(), ColorKind::Error)
    }

    fn highlight(message: &str) -> String {
        Self::apply_color(message, ColorKind::Highlight)
    }

    /// Configure whether ANSI colors are enabled.
    pub fn configure_colors(enable: bool) {
        COLOR_ENABLED.store(enable, Ordering::Relaxed);
    }

    /// Auto-configure color output based on environment.
    pub fn configure_colors_from_env() {
        let no_color = std::env::var_os("NO_COLOR").is_some();
        Self::configure_colors(!no_color);
    }

    fn apply_color(message: &str, kind: ColorKind) -> String {
        if !COLOR_ENABLED.load(Ordering::Relaxed) {
            return message.to_string();
        }

        match kind {
            ColorKind::Info => format!("{}", message.blue()),
            ColorKind::Success => format!("{}", message.green()),
            ColorKind::Warning => format!("{}", message.yellow()),
            ColorKind::Error => format!("{}", message.red()),
            ColorKind::Highlight => format!("{}", message.bold()),
        }
    }
}

#[derive(Copy, Clone)]
enum ColorKind {
    Info,
    Success,
    Warning,
    Error,
    Highlight,
}

static COLOR_ENABLED: AtomicBool = AtomicBool::new(true);
