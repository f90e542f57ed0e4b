pub mod cli;
pub mod config;
pub mod logging;
pub mod recording;
pub mod replay;
pub mod sourcemap;
pub mod text;
pub mod ui;
use miette::Diagnostic;

pub use recording::recorder::ExecutionRecorder;
pub use replay::recording::Recording;
pub use sourcemap::apply_edit::source_map_apply_edit;
pub use sourcemap::map::SourceMapV3;
pub use text::edit::{SingleTextEdit, TextEdit};

/// Result type alias for the trace and source-map codecs
pub type Result<T> = std::result::Result<T, InsightError>;

/// Error types for recording, replay and source-map handling
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum InsightError {
    #[error("Value {value} does not fit into a 24-bit instruction operand")]
    #[diagnostic(
        code(insight::value_too_large),
        help("Function, block and module ids are limited to 16777215. Split very large modules before instrumenting them.")
    )]
    ValueTooLarge { value: u64 },

    #[error("Malformed trace at byte {offset}: {reason}")]
    #[diagnostic(
        code(insight::malformed_trace),
        help("The trace file is truncated or was not written by an execution recorder.")
    )]
    MalformedTrace { offset: usize, reason: String },

    #[error("Function return at instruction {index} has no matching call")]
    #[diagnostic(
        code(insight::unbalanced_return),
        help("The trace is corrupted: every return must be preceded by a call that is still open.")
    )]
    UnbalancedReturn { index: usize },

    #[error("No module info recorded for module {0}")]
    #[diagnostic(
        code(insight::unknown_module),
        help("Module info is written the first time a module is entered. Use `code-insight modules` to list the recorded modules.")
    )]
    UnknownModule(u32),

    #[error("Invalid module info: {0}")]
    #[diagnostic(
        code(insight::invalid_module_info),
        help("The embedded module table must be JSON with `sourcePaths` and `fnInfos` fields.")
    )]
    InvalidModuleInfo(String),

    #[error("Invalid source map: {0}")]
    #[diagnostic(
        code(insight::invalid_source_map),
        help("Make sure the file is a version 3 source map in JSON form.")
    )]
    InvalidSourceMap(String),

    #[error("Unsupported source map version {0}")]
    #[diagnostic(code(insight::unsupported_version), help("Only version 3 source maps are supported."))]
    UnsupportedVersion(u64),

    #[error("Invalid VLQ digit in mappings at position {pos}")]
    #[diagnostic(
        code(insight::invalid_vlq),
        help("The `mappings` field may only contain base64 digits, `,` and `;`.")
    )]
    InvalidVlq { pos: usize },

    #[error("Invalid text edit: {0}")]
    #[diagnostic(
        code(insight::invalid_edit),
        help("Edits must be sorted by start position and must not overlap.")
    )]
    InvalidEdit(String),

    #[error("File operation failed: {0}")]
    #[diagnostic(
        code(insight::file_error),
        help("Check if you have necessary permissions and that the path exists.")
    )]
    FileError(String),
}
