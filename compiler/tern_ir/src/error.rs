//! Bytecode decoding errors.
//!
//! Any of these is fatal: the interpreter stops the run and reports the
//! offset.

use thiserror::Error;

use crate::Tag;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unexpected end of bytecode at offset {offset}: needed {wanted} more byte(s)")]
    UnexpectedEnd { offset: usize, wanted: usize },

    #[error("unknown opcode 0x{byte:02X} at offset {offset}")]
    UnknownOpcode { byte: u8, offset: usize },

    #[error("unknown tag 0x{byte:02X} at offset {offset}")]
    UnknownTag { byte: u8, offset: usize },

    #[error("unexpected `{tag}` tag at offset {offset}, expected {expected}")]
    UnexpectedTag {
        tag: Tag,
        offset: usize,
        expected: &'static str,
    },

    #[error("unknown operator 0x{byte:02X} at offset {offset}")]
    UnknownOperator { byte: u8, offset: usize },

    #[error("invalid UTF-8 in string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("invalid char code point 0x{code:X} at offset {offset}")]
    InvalidChar { code: u32, offset: usize },

    #[error("length out of range at offset {offset}")]
    LengthOutOfRange { offset: usize },
}

impl DecodeError {
    /// Byte offset the error was detected at.
    pub fn offset(&self) -> usize {
        match self {
            Self::UnexpectedEnd { offset, .. }
            | Self::UnknownOpcode { offset, .. }
            | Self::UnknownTag { offset, .. }
            | Self::UnexpectedTag { offset, .. }
            | Self::UnknownOperator { offset, .. }
            | Self::InvalidUtf8 { offset }
            | Self::InvalidChar { offset, .. }
            | Self::LengthOutOfRange { offset } => *offset,
        }
    }
}
