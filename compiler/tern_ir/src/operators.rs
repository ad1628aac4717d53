//! Binary and unary operator codes.

/// Binary operators, encoded as the byte following `Opcode::Operation`.
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    // Arithmetic
    Add = 0x00,
    Sub = 0x01,
    Mul = 0x02,
    Quo = 0x03,
    Rem = 0x04,

    // Bitwise
    And = 0x05,
    Or = 0x06,
    Xor = 0x07,
    Shl = 0x08,
    Shr = 0x09,

    // Logical
    LogicalAnd = 0x0A,
    LogicalOr = 0x0B,

    // Comparison
    Eq = 0x0C,
    NotEq = 0x0D,
    Lt = 0x0E,
    LtEq = 0x0F,
    Gt = 0x10,
    GtEq = 0x11,
}

impl BinaryOp {
    pub const fn from_u8(byte: u8) -> Option<Self> {
        Some(match byte {
            0x00 => Self::Add,
            0x01 => Self::Sub,
            0x02 => Self::Mul,
            0x03 => Self::Quo,
            0x04 => Self::Rem,
            0x05 => Self::And,
            0x06 => Self::Or,
            0x07 => Self::Xor,
            0x08 => Self::Shl,
            0x09 => Self::Shr,
            0x0A => Self::LogicalAnd,
            0x0B => Self::LogicalOr,
            0x0C => Self::Eq,
            0x0D => Self::NotEq,
            0x0E => Self::Lt,
            0x0F => Self::LtEq,
            0x10 => Self::Gt,
            0x11 => Self::GtEq,
            _ => return None,
        })
    }

    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Source-level symbol, used in error messages.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Quo => "/",
            Self::Rem => "%",
            Self::And => "&",
            Self::Or => "|",
            Self::Xor => "^",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::LogicalAnd => "&&",
            Self::LogicalOr => "||",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
        }
    }

    /// Equality plus ordering comparisons; these always yield `bool`.
    #[inline]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq
        )
    }

    #[inline]
    pub const fn is_logical(self) -> bool {
        matches!(self, Self::LogicalAnd | Self::LogicalOr)
    }

    /// Operators that fail with a division error on a zero right operand.
    #[inline]
    pub const fn is_division(self) -> bool {
        matches!(self, Self::Quo | Self::Rem)
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_symbol())
    }
}

/// Unary operators, encoded as the byte following `Opcode::Unary`.
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Plus = 0x00,
    Neg = 0x01,
    Not = 0x02,
}

impl UnaryOp {
    pub const fn from_u8(byte: u8) -> Option<Self> {
        Some(match byte {
            0x00 => Self::Plus,
            0x01 => Self::Neg,
            0x02 => Self::Not,
            _ => return None,
        })
    }

    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Neg => "-",
            Self::Not => "!",
        }
    }
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_symbol())
    }
}
