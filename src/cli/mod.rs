pub mod args;
pub mod commands;
pub mod output;

pub use args::{
    ApplyEditArgs, Cli, Commands, DecodeArgs, LookupArgs, ModulesArgs, StackArgs, Verbosity,
};
