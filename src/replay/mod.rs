//! Reader side of the execution trace: stack reconstruction at any
//! instruction index and interactive navigation over a trace.

pub mod recording;
pub mod timeline;

pub use recording::{Recording, ResolvedFrame, ResolvedStack, Stack, StackFrame};
pub use timeline::Timeline;
