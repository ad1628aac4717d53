//! One-byte discriminants for encoded values, types and operands.

/// Tag selecting the decoder for the bytes that follow.
///
/// Values and types share the same tag space: a value literal tagged
/// `Int16` decodes an `i16`, a type tagged `Int16` is simply `int`. The
/// `Pop` and `Slot*`/`Named` tags only appear in operand position.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    Nil = 0x00,
    Any = 0x01,
    Bool = 0x02,
    Char = 0x03,
    Int8 = 0x04,
    Int16 = 0x05,
    IntBig = 0x06,
    Float32 = 0x07,
    Float64 = 0x08,
    Complex64 = 0x09,
    Complex128 = 0x0A,
    String = 0x0B,
    Array = 0x0C,
    Tuple = 0x0D,
    Struct = 0x0E,
    Union = 0x0F,
    Lambda = 0x10,
    Spreadable = 0x11,
    Untyped = 0x12,
    Reference = 0x13,
    Alias = 0x14,

    // Operand-only
    Pop = 0xF0,
    SlotU8 = 0xF1,
    SlotU16 = 0xF2,
    Named = 0xF3,
}

impl Tag {
    pub const fn from_u8(byte: u8) -> Option<Self> {
        Some(match byte {
            0x00 => Tag::Nil,
            0x01 => Tag::Any,
            0x02 => Tag::Bool,
            0x03 => Tag::Char,
            0x04 => Tag::Int8,
            0x05 => Tag::Int16,
            0x06 => Tag::IntBig,
            0x07 => Tag::Float32,
            0x08 => Tag::Float64,
            0x09 => Tag::Complex64,
            0x0A => Tag::Complex128,
            0x0B => Tag::String,
            0x0C => Tag::Array,
            0x0D => Tag::Tuple,
            0x0E => Tag::Struct,
            0x0F => Tag::Union,
            0x10 => Tag::Lambda,
            0x11 => Tag::Spreadable,
            0x12 => Tag::Untyped,
            0x13 => Tag::Reference,
            0x14 => Tag::Alias,
            0xF0 => Tag::Pop,
            0xF1 => Tag::SlotU8,
            0xF2 => Tag::SlotU16,
            0xF3 => Tag::Named,
            _ => return None,
        })
    }

    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Tags that introduce an identifier operand.
    #[inline]
    pub const fn is_identifier(self) -> bool {
        matches!(self, Tag::SlotU8 | Tag::SlotU16 | Tag::Named)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Tag::Nil => "nil",
            Tag::Any => "any",
            Tag::Bool => "bool",
            Tag::Char => "char",
            Tag::Int8 => "int8",
            Tag::Int16 => "int16",
            Tag::IntBig => "bigint",
            Tag::Float32 => "float32",
            Tag::Float64 => "float64",
            Tag::Complex64 => "complex64",
            Tag::Complex128 => "complex128",
            Tag::String => "string",
            Tag::Array => "array",
            Tag::Tuple => "tuple",
            Tag::Struct => "struct",
            Tag::Union => "union",
            Tag::Lambda => "lambda",
            Tag::Spreadable => "spreadable",
            Tag::Untyped => "untyped",
            Tag::Reference => "reference",
            Tag::Alias => "alias",
            Tag::Pop => "pop",
            Tag::SlotU8 => "slot8",
            Tag::SlotU16 => "slot16",
            Tag::Named => "named",
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
