//! Writer side of the execution trace: the byte buffer, the instruction
//! codec, per-module location tables and the recorder that ties them
//! together.

pub mod buffer;
pub mod builder;
pub mod instruction;
pub mod module_info;
pub mod recorder;

pub use buffer::ByteBuffer;
pub use builder::{LocationResolver, ModuleInfoBuilder, ResolvedSource};
pub use instruction::{decode_all, BlockId, FunctionId, Instruction, InstructionIter, ModuleId};
pub use module_info::{ExecutionPosition, FunctionInfo, LocationRef, ModuleInfo, SourceLocation};
pub use recorder::{ExecutionRecorder, InstructionWriter, ModuleResolver};
