//! Turns live function/block events into a trace.

use super::buffer::ByteBuffer;
use super::instruction::{check_operand, BlockId, FunctionId, Instruction, ModuleId, RETURN_FUNCTION};
use super::module_info::ModuleInfo;
use crate::logging;
use crate::Result;
use std::collections::HashSet;

/// Supplies the location table of a module the first time it is entered.
pub trait ModuleResolver {
    fn resolve_module(&mut self, module_id: ModuleId) -> Result<ModuleInfo>;
}

impl<F> ModuleResolver for F
where
    F: FnMut(ModuleId) -> Result<ModuleInfo>,
{
    fn resolve_module(&mut self, module_id: ModuleId) -> Result<ModuleInfo> {
        self(module_id)
    }
}

/// Writes single instructions to a trace buffer without any bookkeeping.
#[derive(Debug, Default)]
pub struct InstructionWriter {
    buffer: ByteBuffer,
}

impl InstructionWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, instruction: &Instruction) -> Result<()> {
        instruction.encode(&mut self.buffer)
    }

    pub fn write_set_module_id(&mut self, module_id: ModuleId) -> Result<()> {
        self.write(&Instruction::SetModuleId { module_id })
    }

    pub fn write_module_info(&mut self, info: &ModuleInfo) -> Result<()> {
        self.write_module_info_bytes(info.to_bytes()?)
    }

    fn write_module_info_bytes(&mut self, payload: Vec<u8>) -> Result<()> {
        self.write(&Instruction::SetModuleInfo { payload })
    }

    pub fn write_function_enter(&mut self, function_id: FunctionId) -> Result<()> {
        self.write(&Instruction::CallFunction { function_id })
    }

    pub fn write_block_execution(&mut self, block_id: BlockId) -> Result<()> {
        self.write(&Instruction::ReachedBlock { block_id })
    }

    pub fn write_function_return(&mut self) {
        self.buffer.push(RETURN_FUNCTION);
    }

    pub fn buffer(&self) -> &ByteBuffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> ByteBuffer {
        self.buffer
    }
}

/// Records one execution context.
///
/// `SetModuleId` is only written when the active module changes, and a
/// module's info is written right after the first `SetModuleId` naming it.
/// A failing call writes nothing, so the trace stays decodable.
pub struct ExecutionRecorder<R> {
    resolver: R,
    writer: InstructionWriter,
    last_module_id: Option<ModuleId>,
    resolved_modules: HashSet<ModuleId>,
}

impl<R: ModuleResolver> ExecutionRecorder<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            writer: InstructionWriter::new(),
            last_module_id: None,
            resolved_modules: HashSet::new(),
        }
    }

    pub fn record_function_enter(&mut self, module_id: ModuleId, function_id: FunctionId) -> Result<()> {
        check_operand(function_id.0)?;

        if self.last_module_id != Some(module_id) {
            check_operand(module_id.0)?;
            let payload = if self.resolved_modules.contains(&module_id) {
                None
            } else {
                let info = self.resolver.resolve_module(module_id)?;
                let payload = info.to_bytes()?;
                logging::log_module_recorded(module_id.0, info.functions().len(), payload.len());
                Some(payload)
            };

            self.writer.write_set_module_id(module_id)?;
            self.last_module_id = Some(module_id);
            if let Some(payload) = payload {
                self.writer.write_module_info_bytes(payload)?;
                self.resolved_modules.insert(module_id);
            }
        }

        self.writer.write_function_enter(function_id)
    }

    pub fn record_block_execution(&mut self, block_id: BlockId) -> Result<()> {
        self.writer.write_block_execution(block_id)
    }

    pub fn record_function_return(&mut self) {
        self.writer.write_function_return();
    }

    pub fn buffer(&self) -> &[u8] {
        self.writer.buffer().as_slice()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_buffer().into_vec()
    }
}
