//! Version 3 source maps: the VLQ mapping codec and edit propagation.

pub mod apply_edit;
pub mod codec;
pub mod map;
pub mod vlq;

pub use apply_edit::{mappings_apply_edit, source_map_apply_edit};
pub use codec::{decode_mappings, encode_mappings, Mappings, Segment, SourcePos};
pub use map::{MappedPosition, SourceMapLocation, SourceMapV3, SourceMapWithPath};
