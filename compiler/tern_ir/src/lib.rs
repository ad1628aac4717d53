//! Tern IR - the vocabulary shared by the type engine and the interpreter.
//!
//! This crate contains:
//! - `Name`s for interned identifiers and the `StringInterner` producing them
//! - `Tag`: the one-byte discriminant shared by values, types and operands
//! - `Opcode`: the instruction set consumed by the interpreter
//! - `BinaryOp` / `UnaryOp`: operator codes
//! - `ByteReader` / `ByteWriter`: the native-endian primitive codec
//!
//! Everything above the primitive level (types, values, operands) is decoded
//! by the crate that owns the corresponding model.

mod error;
mod interner;
mod name;
mod opcode;
mod operators;
mod reader;
mod tag;
mod writer;

pub use error::DecodeError;
pub use interner::{SharedInterner, StringInterner};
pub use name::Name;
pub use opcode::Opcode;
pub use operators::{BinaryOp, UnaryOp};
pub use reader::ByteReader;
pub use tag::Tag;
pub use writer::ByteWriter;
