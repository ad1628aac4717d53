//! Instruction set.
//!
//! Opcode byte values are part of the bytecode contract with the compiler;
//! never renumber an existing opcode.

use std::fmt;

/// Interpreter opcodes.
///
/// Operand layouts are documented per variant; "operand" means a tagged
/// operand (literal value, `Pop`, or identifier).
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// `u16` body length, body.
    BlockBegin = 0x01,
    /// Leave the current block.
    BlockEnd = 0x02,
    /// `u16` body length, body. Scope renewed on every in-range jump.
    ForBegin = 0x03,
    /// Lambda type, then the body as a `BlockBegin` instruction.
    Lambda = 0x04,
    /// Callee operand, `u8` argument count, argument operands.
    Call = 0x05,
    /// Operand.
    Return = 0x06,
    /// Identifier, `u8` flags, type, operand.
    Declare = 0x07,
    /// Destination operand, source operand.
    Move = 0x08,
    /// `u8` binary operator, two operands.
    Operation = 0x09,
    /// `u8` unary operator, one operand.
    Unary = 0x0A,
    /// `u32` absolute target.
    Jump = 0x0B,
    /// Two operands, `u32` absolute target.
    JumpIfEqual = 0x0C,
    /// Condition, then-operand, else-operand.
    Ternary = 0x0D,
    /// Name, type.
    TypeAlias = 0x0E,
    /// Operand, type.
    Cast = 0x0F,
    /// Operand.
    Spread = 0x10,
    /// Operand.
    Length = 0x11,
    /// Iterable operand, index operand.
    Get = 0x12,
    /// Array operand, index operand, value operand.
    Set = 0x13,
    /// Array operand, value operand.
    Append = 0x14,
    /// Array operand, index operand.
    Remove = 0x15,
    /// Struct operand, name.
    AttrGet = 0x16,
    /// Struct operand, name, value operand.
    AttrSet = 0x17,
    /// Element type, `u8` count, operands.
    MakeArray = 0x18,
    /// `u8` count, operands.
    MakeTuple = 0x19,
    /// `u8` count, then (name, type, operand) per attribute.
    MakeStruct = 0x1A,
}

impl Opcode {
    pub const fn from_u8(byte: u8) -> Option<Self> {
        Some(match byte {
            0x01 => Opcode::BlockBegin,
            0x02 => Opcode::BlockEnd,
            0x03 => Opcode::ForBegin,
            0x04 => Opcode::Lambda,
            0x05 => Opcode::Call,
            0x06 => Opcode::Return,
            0x07 => Opcode::Declare,
            0x08 => Opcode::Move,
            0x09 => Opcode::Operation,
            0x0A => Opcode::Unary,
            0x0B => Opcode::Jump,
            0x0C => Opcode::JumpIfEqual,
            0x0D => Opcode::Ternary,
            0x0E => Opcode::TypeAlias,
            0x0F => Opcode::Cast,
            0x10 => Opcode::Spread,
            0x11 => Opcode::Length,
            0x12 => Opcode::Get,
            0x13 => Opcode::Set,
            0x14 => Opcode::Append,
            0x15 => Opcode::Remove,
            0x16 => Opcode::AttrGet,
            0x17 => Opcode::AttrSet,
            0x18 => Opcode::MakeArray,
            0x19 => Opcode::MakeTuple,
            0x1A => Opcode::MakeStruct,
            _ => return None,
        })
    }

    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Mnemonic used in runtime error reports.
    pub const fn name(self) -> &'static str {
        match self {
            Opcode::BlockBegin => "block-begin",
            Opcode::BlockEnd => "block-end",
            Opcode::ForBegin => "for-begin",
            Opcode::Lambda => "lambda",
            Opcode::Call => "call",
            Opcode::Return => "return",
            Opcode::Declare => "declare",
            Opcode::Move => "move",
            Opcode::Operation => "operation",
            Opcode::Unary => "unary",
            Opcode::Jump => "jump",
            Opcode::JumpIfEqual => "jump-if-equal",
            Opcode::Ternary => "ternary",
            Opcode::TypeAlias => "type-alias",
            Opcode::Cast => "cast",
            Opcode::Spread => "spread",
            Opcode::Length => "length",
            Opcode::Get => "get",
            Opcode::Set => "set",
            Opcode::Append => "append",
            Opcode::Remove => "remove",
            Opcode::AttrGet => "attr-get",
            Opcode::AttrSet => "attr-set",
            Opcode::MakeArray => "make-array",
            Opcode::MakeTuple => "make-tuple",
            Opcode::MakeStruct => "make-struct",
        }
    }

    /// Opcodes whose body is framed by a `u16` length.
    #[inline]
    pub const fn opens_block(self) -> bool {
        matches!(self, Opcode::BlockBegin | Opcode::ForBegin)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
