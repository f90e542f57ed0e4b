//! Structured logging helpers.
//!
//! Thin wrappers around `tracing` so that events carry the same field names
//! wherever they are emitted.

use std::fmt;

/// Log levels matching tracing crate levels.
#[derive(Debug, Clone, Copy)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Debug,
}

/// Logs multi-line output such as a rendered stack, without structured fields.
pub fn log_display<D: fmt::Display>(message: D, level: LogLevel) {
    let msg = message.to_string();
    match level {
        LogLevel::Info => tracing::info!("{}", msg),
        LogLevel::Warn => tracing::warn!("{}", msg),
        LogLevel::Error => tracing::error!("{}", msg),
        LogLevel::Debug => tracing::debug!("{}", msg),
    }
}

/// Log trace file loading.
pub fn log_loading_trace(path: &str) {
    tracing::info!(trace = path, "Loading trace");
}

/// Log a parsed trace.
pub fn log_trace_loaded(bytes: usize) {
    tracing::info!(bytes, "Trace loaded");
}

/// Log the first recording of a module.
pub fn log_module_recorded(module_id: u32, functions: usize, payload_bytes: usize) {
    tracing::debug!(module_id, functions, payload_bytes, "Module info recorded");
}

/// Log a module table found while replaying.
pub fn log_module_registered(module_id: u32, functions: usize) {
    tracing::debug!(module_id, functions, "Module info registered");
}

pub fn log_stack_query(index: usize, depth: usize) {
    tracing::debug!(index, depth, "Stack reconstructed");
}

pub fn log_stack_cache_hit(index: usize) {
    tracing::trace!(index, "Stack cache hit");
}

/// Log source map loading.
pub fn log_loading_source_map(path: &str) {
    tracing::info!(source_map = path, "Loading source map");
}

/// Log an edit propagated into a source map.
pub fn log_source_map_edited(edits: usize, lines_before: usize, lines_after: usize) {
    tracing::debug!(edits, lines_before, lines_after, "Source map edit propagated");
}
