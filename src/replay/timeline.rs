use super::recording::{Recording, ResolvedStack, Stack};
use crate::logging;
use crate::Result;
use std::collections::{HashMap, VecDeque};

/// Cursor over the instructions of a recording for time-travel navigation.
///
/// Reconstructed stacks are kept in a small cache so that stepping back and
/// forth over the same region does not replay the trace every time.
pub struct Timeline<'a> {
    recording: &'a Recording,
    /// Current position (instruction index)
    current: usize,
    /// Number of instructions in the recording
    len: usize,
    cache: HashMap<usize, Stack>,
    /// Cached indices, oldest first
    cache_order: VecDeque<usize>,
    cache_size: usize,
}

impl<'a> Timeline<'a> {
    /// Create a timeline positioned at the first instruction.
    pub fn new(recording: &'a Recording, cache_size: usize) -> Result<Self> {
        Ok(Self {
            recording,
            current: 0,
            len: recording.instruction_count()?,
            cache: HashMap::new(),
            cache_order: VecDeque::new(),
            cache_size,
        })
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Step back in time
    pub fn step_back(&mut self) -> Option<usize> {
        if self.current > 0 {
            self.current -= 1;
            Some(self.current)
        } else {
            None
        }
    }

    /// Step forward in time
    pub fn step_forward(&mut self) -> Option<usize> {
        if self.current + 1 < self.len {
            self.current += 1;
            Some(self.current)
        } else {
            None
        }
    }

    /// Jump to an instruction index, clamped to the recording.
    pub fn goto(&mut self, index: usize) -> usize {
        self.current = index.min(self.len.saturating_sub(1));
        self.current
    }

    /// Call stack at the current position.
    pub fn stack(&mut self) -> Result<Stack> {
        if let Some(stack) = self.cache.get(&self.current) {
            logging::log_stack_cache_hit(self.current);
            return Ok(stack.clone());
        }
        let stack = self.recording.stack_at(self.current)?;
        self.remember(self.current, stack.clone());
        Ok(stack)
    }

    pub fn resolved_stack(&mut self) -> Result<ResolvedStack> {
        let stack = self.stack()?;
        self.recording.resolve_stack(&stack)
    }

    /// Moves backward to the nearest earlier instruction with a different
    /// stack depth. Returns the new position, or `None` at the start.
    pub fn step_back_to_depth_change(&mut self) -> Result<Option<usize>> {
        let depth = self.stack()?.depth();
        while self.step_back().is_some() {
            if self.stack()?.depth() != depth {
                return Ok(Some(self.current));
            }
        }
        Ok(None)
    }

    fn remember(&mut self, index: usize, stack: Stack) {
        if self.cache_size == 0 {
            return;
        }
        if self.cache_order.len() >= self.cache_size {
            if let Some(oldest) = self.cache_order.pop_front() {
                self.cache.remove(&oldest);
            }
        }
        self.cache_order.push_back(index);
        self.cache.insert(index, stack);
    }
}
