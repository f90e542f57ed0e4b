use crate::replay::recording::ResolvedStack;
use serde::Serialize;

/// Envelope for `--json` output.
#[derive(Debug, Serialize)]
pub struct CommandOutput<T>
where
    T: Serialize,
{
    pub status: String,
    pub result: Option<T>,
    pub errors: Option<Vec<String>>,
}

impl<T: Serialize> CommandOutput<T> {
    pub fn ok(result: T) -> Self {
        Self {
            status: "ok".to_string(),
            result: Some(result),
            errors: None,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Serialize)]
pub struct ModuleSummary {
    pub module_id: u32,
    pub source_paths: Vec<String>,
    pub functions: usize,
    pub blocks: usize,
}

#[derive(Debug, Serialize)]
pub struct StackReport {
    /// Index the stack was reconstructed at, after clamping
    pub index: usize,
    pub instruction_count: usize,
    pub stack: ResolvedStack,
}

#[derive(Debug, Serialize)]
pub struct LookupReport {
    pub line: u32,
    pub column: u32,
    pub source: Option<String>,
    pub source_line: Option<u32>,
    pub source_column: Option<u32>,
}
