//! Bit-packed trace instructions.
//!
//! Every instruction starts with one opcode byte. The two high bits select
//! the kind; for the three operand-carrying kinds the low six bits either
//! hold the operand itself (values below 61) or one of three width escapes
//! announcing 1, 2 or 3 little-endian operand bytes. `0b11_000000` is a bare
//! function return and `0b11_000001` introduces a module info blob with a
//! big-endian `u32` length prefix.

use super::buffer::ByteBuffer;
use crate::{InsightError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Identifies an instrumented module within one trace.
    ModuleId
);
id_type!(
    /// Index of a function within its module.
    FunctionId
);
id_type!(
    /// Index of a block within its function.
    BlockId
);

/// Largest value an instruction operand can carry.
pub const MAX_OPERAND: u32 = 0xFF_FFFF;

const KIND_MASK: u8 = 0b11_000000;
const OPERAND_MASK: u8 = 0b00_111111;

const SET_MODULE_ID: u8 = 0b00_000000;
const CALL_FUNCTION: u8 = 0b01_000000;
const REACHED_BLOCK: u8 = 0b10_000000;
pub(crate) const RETURN_FUNCTION: u8 = 0b11_000000;
const SET_MODULE_INFO: u8 = 0b11_000001;

const ESCAPE_U8: u8 = 61;
const ESCAPE_U16: u8 = 62;
const ESCAPE_U24: u8 = 63;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Instruction {
    SetModuleId {
        module_id: ModuleId,
    },
    /// Serialized [`ModuleInfo`](super::module_info::ModuleInfo) for the
    /// active module.
    SetModuleInfo {
        #[serde(rename = "module_info_json", with = "payload_text")]
        payload: Vec<u8>,
    },
    CallFunction {
        function_id: FunctionId,
    },
    ReachedBlock {
        block_id: BlockId,
    },
    ReturnFunction,
}

impl Instruction {
    /// Appends the encoded instruction. Nothing is written on error.
    pub fn encode(&self, buffer: &mut ByteBuffer) -> Result<()> {
        match self {
            Instruction::SetModuleId { module_id } => {
                write_operand(SET_MODULE_ID, module_id.0, buffer)
            }
            Instruction::CallFunction { function_id } => {
                write_operand(CALL_FUNCTION, function_id.0, buffer)
            }
            Instruction::ReachedBlock { block_id } => {
                write_operand(REACHED_BLOCK, block_id.0, buffer)
            }
            Instruction::ReturnFunction => {
                buffer.push(RETURN_FUNCTION);
                Ok(())
            }
            Instruction::SetModuleInfo { payload } => {
                let len = u32::try_from(payload.len()).map_err(|_| InsightError::ValueTooLarge {
                    value: payload.len() as u64,
                })?;
                buffer.push(SET_MODULE_INFO);
                buffer.push_u32(len);
                buffer.extend_from_slice(payload);
                Ok(())
            }
        }
    }

    /// Decodes the instruction starting at `offset`.
    ///
    /// Returns `Ok(None)` at the end of the buffer, otherwise the instruction
    /// and the offset of the one after it.
    pub fn decode_at(bytes: &[u8], offset: usize) -> Result<Option<(Instruction, usize)>> {
        let Some(&opcode) = bytes.get(offset) else {
            return Ok(None);
        };
        let mut cursor = offset + 1;

        let instruction = match opcode & KIND_MASK {
            SET_MODULE_ID => Instruction::SetModuleId {
                module_id: ModuleId(read_operand(bytes, opcode, offset, &mut cursor)?),
            },
            CALL_FUNCTION => Instruction::CallFunction {
                function_id: FunctionId(read_operand(bytes, opcode, offset, &mut cursor)?),
            },
            REACHED_BLOCK => Instruction::ReachedBlock {
                block_id: BlockId(read_operand(bytes, opcode, offset, &mut cursor)?),
            },
            _ => match opcode {
                RETURN_FUNCTION => Instruction::ReturnFunction,
                SET_MODULE_INFO => {
                    let prefix = take(bytes, offset, &mut cursor, 4)?;
                    let len = u32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);
                    let payload = take(bytes, offset, &mut cursor, len as usize)?.to_vec();
                    Instruction::SetModuleInfo { payload }
                }
                other => {
                    return Err(InsightError::MalformedTrace {
                        offset,
                        reason: format!("unknown opcode {other:#010b}"),
                    })
                }
            },
        };

        Ok(Some((instruction, cursor)))
    }

    /// The module info payload as text, if this is a `SetModuleInfo`.
    pub fn module_info_json(&self) -> Option<std::borrow::Cow<'_, str>> {
        match self {
            Instruction::SetModuleInfo { payload } => Some(String::from_utf8_lossy(payload)),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::SetModuleId { module_id } => write!(f, "SetModuleId({module_id})"),
            Instruction::SetModuleInfo { payload } => {
                write!(f, "SetModuleInfo({})", String::from_utf8_lossy(payload))
            }
            Instruction::CallFunction { function_id } => write!(f, "CallFunction({function_id})"),
            Instruction::ReachedBlock { block_id } => write!(f, "ReachedBlock({block_id})"),
            Instruction::ReturnFunction => write!(f, "ReturnFunction"),
        }
    }
}

/// Fails with `ValueTooLarge` if `value` does not fit into an operand.
pub fn check_operand(value: u32) -> Result<()> {
    if value > MAX_OPERAND {
        return Err(InsightError::ValueTooLarge {
            value: value as u64,
        });
    }
    Ok(())
}

fn write_operand(kind: u8, value: u32, buffer: &mut ByteBuffer) -> Result<()> {
    check_operand(value)?;
    let bytes = value.to_le_bytes();
    match value {
        0..=60 => buffer.push(kind | value as u8),
        61..=0xFF => {
            buffer.push(kind | ESCAPE_U8);
            buffer.push(bytes[0]);
        }
        0x100..=0xFFFF => {
            buffer.push(kind | ESCAPE_U16);
            buffer.extend_from_slice(&bytes[..2]);
        }
        _ => {
            buffer.push(kind | ESCAPE_U24);
            buffer.extend_from_slice(&bytes[..3]);
        }
    }
    Ok(())
}

fn read_operand(bytes: &[u8], opcode: u8, offset: usize, cursor: &mut usize) -> Result<u32> {
    let width = match opcode & OPERAND_MASK {
        ESCAPE_U8 => 1,
        ESCAPE_U16 => 2,
        ESCAPE_U24 => 3,
        direct => return Ok(direct as u32),
    };
    let operand = take(bytes, offset, cursor, width)?;
    Ok(operand
        .iter()
        .rev()
        .fold(0u32, |acc, &byte| (acc << 8) | byte as u32))
}

fn take<'a>(bytes: &'a [u8], offset: usize, cursor: &mut usize, len: usize) -> Result<&'a [u8]> {
    let end = cursor
        .checked_add(len)
        .filter(|&end| end <= bytes.len())
        .ok_or_else(|| InsightError::MalformedTrace {
            offset,
            reason: format!(
                "instruction needs {} more bytes but only {} remain",
                len,
                bytes.len().saturating_sub(*cursor)
            ),
        })?;
    let slice = &bytes[*cursor..end];
    *cursor = end;
    Ok(slice)
}

/// Iterates over the instructions of a trace. Stops after the first error.
#[derive(Debug, Clone)]
pub struct InstructionIter<'a> {
    bytes: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> InstructionIter<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            offset: 0,
            failed: false,
        }
    }

    /// Byte offset of the next instruction.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl Iterator for InstructionIter<'_> {
    type Item = Result<Instruction>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match Instruction::decode_at(self.bytes, self.offset) {
            Ok(Some((instruction, next))) => {
                self.offset = next;
                Some(Ok(instruction))
            }
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for InstructionIter<'_> {}

pub fn decode_all(bytes: &[u8]) -> Result<Vec<Instruction>> {
    InstructionIter::new(bytes).collect()
}

mod payload_text {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(payload: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&String::from_utf8_lossy(payload))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        Ok(String::deserialize(deserializer)?.into_bytes())
    }
}
