//! Evaluation errors.
//!
//! `EvalErrorKind` is the pattern-matchable category; `EvalError` adds the
//! instruction that failed. Factory functions are the public way to build
//! errors so call sites stay short and every message is produced in one
//! place.

use std::fmt;

use tern_ir::{DecodeError, Name, Opcode};
use tern_types::{Type, TypeError};

use crate::environment::Ident;
use crate::Value;

/// Result of evaluation.
pub type EvalResult<T = Value> = Result<T, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Types
    WrongTypes {
        to: Type,
        from: Type,
    },
    InvalidArgumentType {
        param: Name,
        expected: Type,
        found: Type,
    },
    WrongReturnType {
        expected: Type,
        found: Type,
    },
    InvalidCast {
        from: Type,
        to: Type,
    },

    // Symbols
    DuplicateSymbol {
        ident: Ident,
    },
    SymbolNotFound {
        ident: Ident,
    },
    ConstAssignment {
        ident: Ident,
    },
    AttributeNotFound {
        name: Name,
    },

    // Operators
    DivisionByZero,
    UnsupportedOperation {
        op: &'static str,
        left: Type,
        right: Option<Type>,
    },

    // Collections
    IndexOutOfBounds {
        index: i64,
        len: usize,
    },
    CyclicValue,

    // Calls
    MissingArguments {
        expected: usize,
        got: usize,
    },
    NotCallable {
        found: Type,
    },
    StackOverflow {
        depth: usize,
    },

    // Bytecode
    InvalidJump {
        target: usize,
    },
    Decode(DecodeError),
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongTypes { to, from } => {
                write!(f, "wrong types: expected `{to}`, found `{from}`")
            }
            Self::InvalidArgumentType {
                param,
                expected,
                found,
            } => write!(
                f,
                "invalid argument type for `{param}`: expected `{expected}`, found `{found}`"
            ),
            Self::WrongReturnType { expected, found } => {
                write!(f, "wrong return type: expected `{expected}`, found `{found}`")
            }
            Self::InvalidCast { from, to } => write!(f, "cannot cast `{from}` to `{to}`"),
            Self::DuplicateSymbol { ident } => write!(f, "`{ident}` is already declared"),
            Self::SymbolNotFound { ident } => write!(f, "undefined symbol `{ident}`"),
            Self::ConstAssignment { ident } => write!(f, "cannot assign to constant `{ident}`"),
            Self::AttributeNotFound { name } => write!(f, "no attribute `{name}` on struct"),
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::UnsupportedOperation {
                op,
                left,
                right: Some(right),
            } => write!(f, "operator `{op}` cannot be applied to `{left}` and `{right}`"),
            Self::UnsupportedOperation {
                op,
                left,
                right: None,
            } => write!(f, "operator `{op}` cannot be applied to `{left}`"),
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
            Self::CyclicValue => write!(f, "a value cannot contain itself"),
            Self::MissingArguments { expected, got } => {
                write!(f, "expected {expected} argument(s), got {got}")
            }
            Self::NotCallable { found } => write!(f, "`{found}` is not callable"),
            Self::StackOverflow { depth } => {
                write!(f, "maximum call depth of {depth} exceeded")
            }
            Self::InvalidJump { target } => write!(f, "jump to {target} leaves every block"),
            Self::Decode(err) => write!(f, "{err}"),
        }
    }
}

/// Where in the bytecode an error surfaced.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub opcode: Opcode,
    pub offset: usize,
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Innermost failing instruction, set once by the interpreter.
    pub location: Option<Location>,
}

impl EvalError {
    pub fn from_kind(kind: EvalErrorKind) -> Self {
        Self {
            kind,
            location: None,
        }
    }

    /// Attach the failing instruction unless an inner one already did.
    #[must_use]
    pub fn at(mut self, opcode: Opcode, offset: usize) -> Self {
        if self.location.is_none() {
            self.location = Some(Location { opcode, offset });
        }
        self
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(Location { opcode, offset }) => {
                write!(f, "{} (in `{opcode}` at offset {offset})", self.kind)
            }
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for EvalError {}

impl From<EvalErrorKind> for EvalError {
    fn from(kind: EvalErrorKind) -> Self {
        Self::from_kind(kind)
    }
}

impl From<DecodeError> for EvalError {
    fn from(err: DecodeError) -> Self {
        Self::from_kind(EvalErrorKind::Decode(err))
    }
}

impl From<TypeError> for EvalError {
    fn from(err: TypeError) -> Self {
        Self::from_kind(match err {
            TypeError::WrongTypes { to, from } => EvalErrorKind::WrongTypes { to, from },
            TypeError::UnresolvedType { name } => EvalErrorKind::SymbolNotFound {
                ident: Ident::Named(name),
            },
            TypeError::UnsupportedOperation { op, left, right } => {
                EvalErrorKind::UnsupportedOperation { op, left, right }
            }
        })
    }
}

// Types

#[cold]
pub fn wrong_types(to: &Type, from: &Type) -> EvalError {
    EvalError::from_kind(EvalErrorKind::WrongTypes {
        to: to.clone(),
        from: from.clone(),
    })
}

#[cold]
pub fn invalid_argument_type(param: Name, expected: &Type, found: &Type) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidArgumentType {
        param,
        expected: expected.clone(),
        found: found.clone(),
    })
}

#[cold]
pub fn wrong_return_type(expected: &Type, found: &Type) -> EvalError {
    EvalError::from_kind(EvalErrorKind::WrongReturnType {
        expected: expected.clone(),
        found: found.clone(),
    })
}

#[cold]
pub fn invalid_cast(from: &Type, to: &Type) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidCast {
        from: from.clone(),
        to: to.clone(),
    })
}

// Symbols

#[cold]
pub fn duplicate_symbol(ident: Ident) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DuplicateSymbol { ident })
}

#[cold]
pub fn symbol_not_found(ident: Ident) -> EvalError {
    EvalError::from_kind(EvalErrorKind::SymbolNotFound { ident })
}

#[cold]
pub fn const_assignment(ident: Ident) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ConstAssignment { ident })
}

#[cold]
pub fn attribute_not_found(name: Name) -> EvalError {
    EvalError::from_kind(EvalErrorKind::AttributeNotFound { name })
}

// Operators

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

#[cold]
pub fn unsupported_binary(op: &'static str, left: &Type, right: &Type) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnsupportedOperation {
        op,
        left: left.clone(),
        right: Some(right.clone()),
    })
}

#[cold]
pub fn unsupported_unary(op: &'static str, operand: &Type) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnsupportedOperation {
        op,
        left: operand.clone(),
        right: None,
    })
}

// Collections

#[cold]
pub fn index_out_of_bounds(index: i64, len: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexOutOfBounds { index, len })
}

#[cold]
pub fn cyclic_value() -> EvalError {
    EvalError::from_kind(EvalErrorKind::CyclicValue)
}

// Calls

#[cold]
pub fn missing_arguments(expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MissingArguments { expected, got })
}

#[cold]
pub fn not_callable(found: &Type) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        found: found.clone(),
    })
}

#[cold]
pub fn stack_overflow(depth: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StackOverflow { depth })
}

// Bytecode

#[cold]
pub fn invalid_jump(target: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidJump { target })
}
