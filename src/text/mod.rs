//! Zero-based text geometry and text edits over generated files.

pub mod edit;
pub mod length;
pub mod offset;
pub mod pos;
pub mod range;

pub use edit::{SingleTextEdit, TextEdit};
pub use length::TextLength;
pub use offset::{OffsetRange, PositionOffsetTransformer};
pub use pos::TextPos;
pub use range::TextRange;
