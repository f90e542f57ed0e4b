use super::codec::{decode_mappings, Mappings, Segment};
use crate::recording::builder::{LocationResolver, ResolvedSource};
use crate::text::{OffsetRange, TextPos};
use crate::{InsightError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const SOURCE_MAPPING_URL_PREFIX: &str = "//# sourceMappingURL=";
const INLINE_PREFIX: &str = "data:application/json;charset=utf-8;base64,";

/// A version 3 source map document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMapV3 {
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub names: Vec<String>,
    pub mappings: String,
    #[serde(skip)]
    decoded: OnceLock<Mappings>,
}

/// Result of a successful [`SourceMapV3::lookup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedPosition {
    pub source_idx: u32,
    pub line_idx: u32,
    pub column_idx: u32,
}

impl SourceMapV3 {
    pub fn new(sources: Vec<String>, names: Vec<String>, mappings: impl Into<String>) -> Self {
        Self {
            version: 3,
            file: None,
            source_root: None,
            sources,
            sources_content: None,
            names,
            mappings: mappings.into(),
            decoded: OnceLock::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let map: SourceMapV3 =
            serde_json::from_str(json).map_err(|e| InsightError::InvalidSourceMap(e.to_string()))?;
        if map.version != 3 {
            return Err(InsightError::UnsupportedVersion(map.version));
        }
        Ok(map)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| InsightError::InvalidSourceMap(e.to_string()))
    }

    /// Copy of this map with a different `mappings` string.
    pub fn with_mappings(&self, mappings: String) -> Self {
        Self {
            version: self.version,
            file: self.file.clone(),
            source_root: self.source_root.clone(),
            sources: self.sources.clone(),
            sources_content: self.sources_content.clone(),
            names: self.names.clone(),
            mappings,
            decoded: OnceLock::new(),
        }
    }

    /// Decoded `mappings`, computed on first use.
    pub fn decoded_mappings(&self) -> Result<&Mappings> {
        if let Some(decoded) = self.decoded.get() {
            return Ok(decoded);
        }
        let decoded = decode_mappings(&self.mappings)?;
        Ok(self.decoded.get_or_init(|| decoded))
    }

    /// Source position of the segment covering a generated position.
    ///
    /// `None` if the line has no segment at or before `char_idx`, or if that
    /// segment is unmapped.
    pub fn lookup(&self, line_idx: u32, char_idx: u32) -> Result<Option<MappedPosition>> {
        let Some(line) = self.decoded_mappings()?.get(line_idx as usize) else {
            return Ok(None);
        };
        let idx = line.partition_point(|s| s.gen_column() <= char_idx);
        if idx == 0 {
            return Ok(None);
        }
        Ok(match &line[idx - 1] {
            Segment::Unmapped { .. } => None,
            Segment::Mapped { source, .. } => Some(MappedPosition {
                source_idx: source.source_idx,
                line_idx: source.line,
                column_idx: source.column,
            }),
        })
    }
}

impl PartialEq for SourceMapV3 {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.file == other.file
            && self.source_root == other.source_root
            && self.sources == other.sources
            && self.sources_content == other.sources_content
            && self.names == other.names
            && self.mappings == other.mappings
    }
}

/// A source map together with the path it was loaded from, so that
/// `sources` can be resolved to full paths.
#[derive(Debug, Clone)]
pub struct SourceMapWithPath {
    pub source_map: SourceMapV3,
    pub path: PathBuf,
}

impl SourceMapWithPath {
    pub fn new(source_map: SourceMapV3, path: impl Into<PathBuf>) -> Self {
        Self {
            source_map,
            path: path.into(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| {
            InsightError::FileError(format!("Failed to read source map {:?}: {}", path, e))
        })?;
        Ok(Self::new(SourceMapV3::from_json(&json)?, path))
    }

    /// `<dir of map>/<sourceRoot>/<source>`.
    pub fn full_source_path(&self, source_idx: u32) -> Option<PathBuf> {
        let source = self.source_map.sources.get(source_idx as usize)?;
        let mut path = self
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        if let Some(root) = self.source_map.source_root.as_deref().filter(|r| !r.is_empty()) {
            path.push(root);
        }
        path.push(source);
        Some(path)
    }
}

impl LocationResolver for SourceMapWithPath {
    fn resolve(&self, pos: TextPos) -> Result<Option<ResolvedSource>> {
        let Some(mapped) = self.source_map.lookup(pos.line_idx, pos.char_idx)? else {
            return Ok(None);
        };
        Ok(self
            .full_source_path(mapped.source_idx)
            .map(|path| ResolvedSource {
                source_path: path.to_string_lossy().into_owned(),
                pos: TextPos::new(mapped.line_idx, mapped.column_idx),
            }))
    }
}

/// The `//# sourceMappingURL=` reference at the end of a generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMapLocation {
    pub url: String,
}

impl SourceMapLocation {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Embeds the whole map as a base64 data URL.
    pub fn create_inline(source_map: &SourceMapV3) -> Result<Self> {
        let json = source_map.to_json()?;
        Ok(Self::new(format!("{}{}", INLINE_PREFIX, STANDARD.encode(json))))
    }

    /// Decodes the map if this is an inline data URL.
    pub fn inline_source_map(&self) -> Result<Option<SourceMapV3>> {
        let Some(data) = self.url.strip_prefix(INLINE_PREFIX) else {
            return Ok(None);
        };
        let bytes = STANDARD
            .decode(data.trim())
            .map_err(|e| InsightError::InvalidSourceMap(format!("bad inline data: {}", e)))?;
        let json = String::from_utf8(bytes)
            .map_err(|e| InsightError::InvalidSourceMap(format!("bad inline data: {}", e)))?;
        SourceMapV3::from_json(&json).map(Some)
    }

    /// Finds the reference on the last non-blank line together with that
    /// line's byte range.
    pub fn find_with_range(source: &str) -> Option<(Self, OffsetRange)> {
        let (line, range) = last_non_empty_line(source)?;
        let url = line.strip_prefix(SOURCE_MAPPING_URL_PREFIX)?.trim();
        Some((Self::new(url), range))
    }

    pub fn find(source: &str) -> Option<Self> {
        Self::find_with_range(source).map(|(location, _)| location)
    }

    /// Replaces, appends or (with `None`) removes the reference.
    pub fn set(source: &str, location: Option<&SourceMapLocation>) -> String {
        let comment = location
            .map(|l| format!("{}{}", SOURCE_MAPPING_URL_PREFIX, l.url))
            .unwrap_or_default();
        match Self::find_with_range(source) {
            Some((_, range)) => format!(
                "{}{}{}",
                &source[..range.start],
                comment,
                &source[range.end_exclusive..]
            ),
            None if comment.is_empty() => source.to_string(),
            None => {
                let separator = if source.is_empty() || source.ends_with('\n') {
                    ""
                } else {
                    "\n"
                };
                format!("{}{}{}\n", source, separator, comment)
            }
        }
    }
}

impl fmt::Display for SourceMapLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}{}", SOURCE_MAPPING_URL_PREFIX, self.url)
    }
}

fn last_non_empty_line(text: &str) -> Option<(&str, OffsetRange)> {
    let mut line_end = text.len();
    let mut seen_content = false;
    for (i, c) in text.char_indices().rev() {
        match c {
            '\n' if seen_content => {
                return Some((&text[i + 1..line_end], OffsetRange::try_new(i + 1, line_end)?));
            }
            '\n' => line_end = i,
            ' ' | '\t' | '\r' => {}
            _ => seen_content = true,
        }
    }
    seen_content.then(|| (&text[..line_end], OffsetRange::of_length(line_end)))
}
