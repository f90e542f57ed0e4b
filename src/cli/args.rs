use crate::config::Config;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "code-insight")]
#[command(
    about = "Replay execution traces and keep source maps valid across instrumentation edits",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Increase log output (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            return Verbosity::Quiet;
        }
        match self.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    Debug,
}

impl Verbosity {
    pub fn to_log_level(self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "info",
            Verbosity::Debug => "debug",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print every instruction of a trace
    Decode(DecodeArgs),

    /// Show the call stack at an instruction index
    Stack(StackArgs),

    /// List the module tables embedded in a trace
    Modules(ModulesArgs),

    /// Update a source map for edits made to its generated file
    ApplyEdit(ApplyEditArgs),

    /// Map a generated position back to its original source
    Lookup(LookupArgs),
}

#[derive(Parser)]
pub struct DecodeArgs {
    /// Path to the trace file
    pub trace: PathBuf,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct StackArgs {
    /// Path to the trace file
    pub trace: PathBuf,

    /// Zero-based instruction index; larger values select the last instruction
    #[arg(short, long)]
    pub index: usize,

    /// Also print this many instructions around the index
    #[arg(short, long, default_value_t = 0)]
    pub context: usize,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct ModulesArgs {
    /// Path to the trace file
    pub trace: PathBuf,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct ApplyEditArgs {
    /// Source map of the generated file (version 3 JSON)
    #[arg(short = 'm', long)]
    pub source_map: PathBuf,

    /// JSON array of edits: [{"range": {"start": {..}, "end_exclusive": {..}}, "text": ".."}]
    #[arg(short, long)]
    pub edit: PathBuf,

    /// Where to write the updated source map (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Generated file to apply the same edit to
    #[arg(long, requires = "generated_output")]
    pub generated: Option<PathBuf>,

    /// Where to write the edited generated file
    #[arg(long, requires = "generated")]
    pub generated_output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct LookupArgs {
    /// Path to the source map
    pub source_map: PathBuf,

    /// Zero-based generated line
    #[arg(short, long)]
    pub line: u32,

    /// Zero-based generated column
    #[arg(short, long)]
    pub column: u32,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl DecodeArgs {
    pub fn merge_config(&mut self, config: &Config) {
        self.json |= config.prefers_json();
    }
}

impl StackArgs {
    pub fn merge_config(&mut self, config: &Config) {
        self.json |= config.prefers_json();
    }
}

impl ModulesArgs {
    pub fn merge_config(&mut self, config: &Config) {
        self.json |= config.prefers_json();
    }
}

impl LookupArgs {
    pub fn merge_config(&mut self, config: &Config) {
        self.json |= config.prefers_json();
    }
}
