use crate::logging;
use crate::recording::instruction::{BlockId, FunctionId, Instruction, InstructionIter, ModuleId};
use crate::recording::module_info::{ExecutionPosition, ModuleInfo};
use crate::{InsightError, Result};
use itertools::Itertools;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// One open call at a point of the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StackFrame {
    pub module_id: ModuleId,
    pub function_id: FunctionId,
    /// Last block reached in this call, if any.
    pub block_id: Option<BlockId>,
}

/// Open calls, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stack {
    pub frames: Vec<StackFrame>,
}

impl Stack {
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn top(&self) -> Option<&StackFrame> {
        self.frames.last()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedFrame {
    pub module_id: ModuleId,
    pub position: ExecutionPosition,
}

impl fmt::Display for ResolvedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.position)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedStack {
    pub frames: Vec<ResolvedFrame>,
}

impl fmt::Display for ResolvedStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.frames.iter().join("\n"))
    }
}

/// A finished trace.
///
/// Every query decodes the trace from the start, so queries are independent
/// of each other and the type can be shared freely between threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recording {
    data: Vec<u8>,
}

impl Recording {
    pub fn parse(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        logging::log_loading_trace(&path.display().to_string());
        let data = fs::read(path).map_err(|e| {
            InsightError::FileError(format!("Failed to read trace {:?}: {}", path, e))
        })?;
        logging::log_trace_loaded(data.len());
        Ok(Self::parse(data))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn instructions(&self) -> InstructionIter<'_> {
        InstructionIter::new(&self.data)
    }

    pub fn decode_all(&self) -> Result<Vec<Instruction>> {
        self.instructions().collect()
    }

    pub fn instruction_count(&self) -> Result<usize> {
        self.instructions()
            .try_fold(0usize, |count, instruction| instruction.map(|_| count + 1))
    }

    /// The location table recorded for `module_id`, if the trace has one.
    pub fn module_info(&self, module_id: ModuleId) -> Result<Option<ModuleInfo>> {
        let mut active = None;
        for instruction in self.instructions() {
            match instruction? {
                Instruction::SetModuleId { module_id: id } => active = Some(id),
                Instruction::SetModuleInfo { payload } if active == Some(module_id) => {
                    return ModuleInfo::from_bytes(&payload).map(Some);
                }
                _ => {}
            }
        }
        Ok(None)
    }

    /// All recorded location tables, in order of appearance.
    pub fn modules(&self) -> Result<Vec<(ModuleId, ModuleInfo)>> {
        let mut state = ReplayState::default();
        let mut iter = self.instructions();
        let mut index = 0;
        loop {
            let offset = iter.offset();
            let Some(instruction) = iter.next() else {
                break;
            };
            state.apply(index, offset, instruction?)?;
            index += 1;
        }
        let order = std::mem::take(&mut state.module_order);
        order
            .into_iter()
            .map(|id| -> Result<(ModuleId, ModuleInfo)> { Ok((id, state.module_info(id)?.clone())) })
            .collect()
    }

    /// The call stack after replaying instructions `0..=index`. An index past
    /// the end replays the whole trace.
    pub fn stack_at(&self, index: usize) -> Result<Stack> {
        let state = self.replay(index)?;
        logging::log_stack_query(index, state.frames.len());
        Ok(Stack {
            frames: state.frames,
        })
    }

    /// Like [`Recording::stack_at`], with every frame resolved to a source
    /// location where the trace knows one.
    pub fn resolved_stack_at(&self, index: usize) -> Result<ResolvedStack> {
        let mut state = self.replay(index)?;
        logging::log_stack_query(index, state.frames.len());
        let frames = std::mem::take(&mut state.frames);
        let frames = frames
            .into_iter()
            .map(|frame| state.resolve(frame))
            .collect::<Result<Vec<_>>>()?;
        Ok(ResolvedStack { frames })
    }

    /// Resolves a stack obtained from this recording.
    pub fn resolve_stack(&self, stack: &Stack) -> Result<ResolvedStack> {
        let mut modules: HashMap<ModuleId, Option<ModuleInfo>> = HashMap::new();
        let mut frames = Vec::with_capacity(stack.frames.len());
        for frame in &stack.frames {
            if !modules.contains_key(&frame.module_id) {
                let info = self.module_info(frame.module_id)?;
                modules.insert(frame.module_id, info);
            }
            let info = modules.get(&frame.module_id).and_then(Option::as_ref);
            frames.push(resolve_frame(info, *frame));
        }
        Ok(ResolvedStack { frames })
    }

    fn replay(&self, index: usize) -> Result<ReplayState> {
        let mut state = ReplayState::default();
        let mut iter = self.instructions();
        for i in 0..=index {
            let offset = iter.offset();
            let Some(instruction) = iter.next() else {
                break;
            };
            state.apply(i, offset, instruction?)?;
        }
        Ok(state)
    }
}

fn resolve_frame(info: Option<&ModuleInfo>, frame: StackFrame) -> ResolvedFrame {
    let position = match info {
        Some(info) => info.get_location(frame.function_id, frame.block_id),
        None => ExecutionPosition {
            function_id: frame.function_id,
            block_id: frame.block_id,
            location: None,
        },
    };
    ResolvedFrame {
        module_id: frame.module_id,
        position,
    }
}

/// Running state while decoding a trace prefix.
#[derive(Debug, Default)]
struct ReplayState {
    active_module: Option<ModuleId>,
    frames: Vec<StackFrame>,
    payloads: HashMap<ModuleId, Vec<u8>>,
    parsed: HashMap<ModuleId, ModuleInfo>,
    module_order: Vec<ModuleId>,
}

impl ReplayState {
    /// Applies instruction `index`, which starts at byte `offset`.
    fn apply(&mut self, index: usize, offset: usize, instruction: Instruction) -> Result<()> {
        match instruction {
            Instruction::SetModuleId { module_id } => self.active_module = Some(module_id),
            Instruction::SetModuleInfo { payload } => {
                let module_id = self.require_module(index, offset, "module info")?;
                if !self.payloads.contains_key(&module_id) {
                    self.module_order.push(module_id);
                }
                self.payloads.insert(module_id, payload);
                self.parsed.remove(&module_id);
            }
            Instruction::CallFunction { function_id } => {
                let module_id = self.require_module(index, offset, "function call")?;
                self.frames.push(StackFrame {
                    module_id,
                    function_id,
                    block_id: None,
                });
            }
            Instruction::ReachedBlock { block_id } => {
                if let Some(top) = self.frames.last_mut() {
                    top.block_id = Some(block_id);
                }
            }
            Instruction::ReturnFunction => {
                if self.frames.pop().is_none() {
                    return Err(InsightError::UnbalancedReturn { index });
                }
            }
        }
        Ok(())
    }

    fn require_module(&self, index: usize, offset: usize, what: &str) -> Result<ModuleId> {
        self.active_module.ok_or_else(|| InsightError::MalformedTrace {
            offset,
            reason: format!("{what} at instruction {index} before any module was set"),
        })
    }

    fn module_info(&mut self, module_id: ModuleId) -> Result<&ModuleInfo> {
        if !self.parsed.contains_key(&module_id) {
            let payload = self
                .payloads
                .get(&module_id)
                .ok_or(InsightError::UnknownModule(module_id.0))?;
            let info = ModuleInfo::from_bytes(payload)?;
            logging::log_module_registered(module_id.0, info.functions().len());
            self.parsed.insert(module_id, info);
        }
        self.parsed
            .get(&module_id)
            .ok_or(InsightError::UnknownModule(module_id.0))
    }

    fn resolve(&mut self, frame: StackFrame) -> Result<ResolvedFrame> {
        if !self.payloads.contains_key(&frame.module_id) {
            return Ok(resolve_frame(None, frame));
        }
        let info = self.module_info(frame.module_id)?;
        Ok(resolve_frame(Some(info), frame))
    }
}
