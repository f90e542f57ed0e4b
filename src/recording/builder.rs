//! Builds a [`ModuleInfo`] while a module is being instrumented.

use super::instruction::{check_operand, BlockId, FunctionId};
use super::module_info::{FunctionInfo, LocationRef, ModuleInfo};
use crate::text::TextPos;
use crate::{InsightError, Result};
use std::collections::HashMap;

/// A position in an original source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub source_path: String,
    pub pos: TextPos,
}

/// Maps a position in the generated file back to its original source.
pub trait LocationResolver {
    fn resolve(&self, pos: TextPos) -> Result<Option<ResolvedSource>>;
}

impl<F> LocationResolver for F
where
    F: Fn(TextPos) -> Result<Option<ResolvedSource>>,
{
    fn resolve(&self, pos: TextPos) -> Result<Option<ResolvedSource>> {
        self(pos)
    }
}

/// Hands out sequential function and block ids and records where each one
/// lives. Positions the resolver cannot map are kept as positions in the
/// generated file.
pub struct ModuleInfoBuilder<'r> {
    generated_path: String,
    resolver: Option<&'r dyn LocationResolver>,
    source_paths: Vec<String>,
    path_indices: HashMap<String, u32>,
    functions: Vec<FunctionInfo>,
}

impl<'r> ModuleInfoBuilder<'r> {
    pub fn new(generated_path: impl Into<String>) -> Self {
        Self {
            generated_path: generated_path.into(),
            resolver: None,
            source_paths: Vec::new(),
            path_indices: HashMap::new(),
            functions: Vec::new(),
        }
    }

    pub fn with_resolver(mut self, resolver: &'r dyn LocationResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn declare_function(&mut self, pos: TextPos) -> Result<FunctionId> {
        let id = self.functions.len() as u32;
        check_operand(id)?;
        let location = self.locate(pos)?;
        self.functions.push(FunctionInfo::new(Some(location), Vec::new()));
        Ok(FunctionId(id))
    }

    pub fn declare_block(&mut self, function_id: FunctionId, pos: TextPos) -> Result<BlockId> {
        let location = self.locate(pos)?;
        let function = self
            .functions
            .get_mut(function_id.0 as usize)
            .ok_or_else(|| {
                InsightError::InvalidModuleInfo(format!("function {function_id} was never declared"))
            })?;
        let id = function.block_locations.len() as u32;
        check_operand(id)?;
        function.block_locations.push(Some(location));
        Ok(BlockId(id))
    }

    pub fn finish(self) -> ModuleInfo {
        tracing::debug!(
            path = %self.generated_path,
            functions = self.functions.len(),
            sources = self.source_paths.len(),
            "Built module info"
        );
        ModuleInfo::new(self.source_paths, self.functions)
    }

    fn locate(&mut self, pos: TextPos) -> Result<LocationRef> {
        let resolved = match self.resolver {
            Some(resolver) => resolver.resolve(pos)?,
            None => None,
        };
        let (path, pos) = match resolved {
            Some(source) => (source.source_path, source.pos),
            None => (self.generated_path.clone(), pos),
        };
        let source_path_idx = self.path_index(path);
        Ok(LocationRef::new(pos.line_idx, pos.char_idx, source_path_idx))
    }

    fn path_index(&mut self, path: String) -> u32 {
        if let Some(&idx) = self.path_indices.get(&path) {
            return idx;
        }
        let idx = self.source_paths.len() as u32;
        self.source_paths.push(path.clone());
        self.path_indices.insert(path, idx);
        idx
    }
}
