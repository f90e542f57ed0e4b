//! Per-module tables mapping function and block ids to source locations.
//!
//! On the wire a table is JSON of the shape
//! `{"sourcePaths": [..], "fnInfos": [[fnLoc, blockLoc0, blockLoc1, ..], ..]}`.
//! A location is `null`, `[line, char, pathIdx]`, `[line, char]` (path as
//! before) or a bare `line` (char and path as before). "Before" refers to the
//! previously emitted location of the same stream: all function locations
//! form one stream, all block locations, in function order, form another.

use super::instruction::{BlockId, FunctionId};
use crate::text::TextPos;
use crate::{InsightError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationRef {
    pub line_idx: u32,
    pub char_idx: u32,
    pub source_path_idx: u32,
}

impl LocationRef {
    pub fn new(line_idx: u32, char_idx: u32, source_path_idx: u32) -> Self {
        Self {
            line_idx,
            char_idx,
            source_path_idx,
        }
    }

    pub fn pos(&self) -> TextPos {
        TextPos::new(self.line_idx, self.char_idx)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub location: Option<LocationRef>,
    /// Indexed by block id.
    pub block_locations: Vec<Option<LocationRef>>,
}

impl FunctionInfo {
    pub fn new(location: Option<LocationRef>, block_locations: Vec<Option<LocationRef>>) -> Self {
        Self {
            location,
            block_locations,
        }
    }

    /// Location of `block_id`, or of the function itself when no block ran yet.
    pub fn location_of(&self, block_id: Option<BlockId>) -> Option<LocationRef> {
        match block_id {
            None => self.location,
            Some(block_id) => self
                .block_locations
                .get(block_id.0 as usize)
                .copied()
                .flatten(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleInfo {
    source_paths: Vec<String>,
    functions: Vec<FunctionInfo>,
}

impl ModuleInfo {
    pub fn new(source_paths: Vec<String>, functions: Vec<FunctionInfo>) -> Self {
        Self {
            source_paths,
            functions,
        }
    }

    pub fn source_paths(&self) -> &[String] {
        &self.source_paths
    }

    pub fn functions(&self) -> &[FunctionInfo] {
        &self.functions
    }

    pub fn function(&self, function_id: FunctionId) -> Option<&FunctionInfo> {
        self.functions.get(function_id.0 as usize)
    }

    pub fn block_count(&self) -> usize {
        self.functions.iter().map(|f| f.block_locations.len()).sum()
    }

    pub fn serialize(&self) -> SerializedModuleInfo {
        let mut fn_infos: Vec<Vec<Option<SerializedLocationRef>>> =
            Vec::with_capacity(self.functions.len());

        let mut fn_stream = DeltaState::default();
        for function in &self.functions {
            let mut entry = Vec::with_capacity(function.block_locations.len() + 1);
            entry.push(fn_stream.encode(function.location));
            fn_infos.push(entry);
        }

        let mut block_stream = DeltaState::default();
        for (function, entry) in self.functions.iter().zip(fn_infos.iter_mut()) {
            entry.extend(
                function
                    .block_locations
                    .iter()
                    .map(|loc| block_stream.encode(*loc)),
            );
        }

        SerializedModuleInfo {
            source_paths: self.source_paths.clone(),
            fn_infos,
        }
    }

    pub fn deserialize(serialized: &SerializedModuleInfo) -> Result<Self> {
        let path_count = serialized.source_paths.len();

        let mut fn_stream = DeltaState::default();
        let mut functions = serialized
            .fn_infos
            .iter()
            .map(|entry| -> Result<FunctionInfo> {
                let location = fn_stream.decode(entry.first().copied().flatten());
                check_path(location, path_count)?;
                Ok(FunctionInfo::new(location, Vec::new()))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut block_stream = DeltaState::default();
        for (entry, function) in serialized.fn_infos.iter().zip(functions.iter_mut()) {
            for loc in entry.iter().skip(1) {
                let location = block_stream.decode(*loc);
                check_path(location, path_count)?;
                function.block_locations.push(location);
            }
        }

        Ok(Self::new(serialized.source_paths.clone(), functions))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.serialize())
            .map_err(|e| InsightError::InvalidModuleInfo(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_bytes(json.as_bytes())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.to_json().map(String::into_bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let serialized: SerializedModuleInfo = serde_json::from_slice(bytes)
            .map_err(|e| InsightError::InvalidModuleInfo(e.to_string()))?;
        Self::deserialize(&serialized)
    }

    /// Resolves an execution point. Missing entries yield a position without
    /// a location rather than an error.
    pub fn get_location(&self, function_id: FunctionId, block_id: Option<BlockId>) -> ExecutionPosition {
        let location = self
            .function(function_id)
            .and_then(|f| f.location_of(block_id))
            .and_then(|loc| {
                let path = self.source_paths.get(loc.source_path_idx as usize)?;
                Some(SourceLocation::new(path.clone(), loc.pos()))
            });
        ExecutionPosition {
            function_id,
            block_id,
            location,
        }
    }
}

fn check_path(location: Option<LocationRef>, path_count: usize) -> Result<()> {
    match location {
        Some(loc) if loc.source_path_idx as usize >= path_count => {
            Err(InsightError::InvalidModuleInfo(format!(
                "source path index {} out of range ({} paths)",
                loc.source_path_idx, path_count
            )))
        }
        _ => Ok(()),
    }
}

/// The "previously emitted" char and path of one location stream.
#[derive(Debug, Default)]
struct DeltaState {
    char_idx: u32,
    source_path_idx: u32,
}

impl DeltaState {
    fn encode(&mut self, location: Option<LocationRef>) -> Option<SerializedLocationRef> {
        let loc = location?;
        if loc.source_path_idx != self.source_path_idx {
            self.source_path_idx = loc.source_path_idx;
            self.char_idx = loc.char_idx;
            Some(SerializedLocationRef::Full(
                loc.line_idx,
                loc.char_idx,
                loc.source_path_idx,
            ))
        } else if loc.char_idx != self.char_idx {
            self.char_idx = loc.char_idx;
            Some(SerializedLocationRef::LineChar(loc.line_idx, loc.char_idx))
        } else {
            Some(SerializedLocationRef::Line(loc.line_idx))
        }
    }

    fn decode(&mut self, location: Option<SerializedLocationRef>) -> Option<LocationRef> {
        let line_idx = match location? {
            SerializedLocationRef::Line(line_idx) => line_idx,
            SerializedLocationRef::LineChar(line_idx, char_idx) => {
                self.char_idx = char_idx;
                line_idx
            }
            SerializedLocationRef::Full(line_idx, char_idx, source_path_idx) => {
                self.char_idx = char_idx;
                self.source_path_idx = source_path_idx;
                line_idx
            }
        };
        Some(LocationRef::new(line_idx, self.char_idx, self.source_path_idx))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedModuleInfo {
    pub source_paths: Vec<String>,
    pub fn_infos: Vec<Vec<Option<SerializedLocationRef>>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SerializedLocationRef {
    Line(u32),
    LineChar(u32, u32),
    Full(u32, u32, u32),
}

/// A function (and optionally block) together with its resolved location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionPosition {
    pub function_id: FunctionId,
    pub block_id: Option<BlockId>,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for ExecutionPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{location}")?,
            None => write!(f, "?")?,
        }
        write!(f, " {{{}", self.function_id)?;
        if let Some(block_id) = self.block_id {
            write!(f, "#{block_id}")?;
        }
        write!(f, "}}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub source_path: String,
    pub pos: TextPos,
}

impl SourceLocation {
    pub fn new(source_path: impl Into<String>, pos: TextPos) -> Self {
        Self {
            source_path: source_path.into(),
            pos,
        }
    }
}

impl fmt::Display for SourceLocation {
    /// One-based `path:line:column`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.source_path,
            self.pos.line_idx + 1,
            self.pos.char_idx + 1
        )
    }
}
