//! Bytecode assembler.
//!
//! [`Emitter`] writes instructions in exactly the layout the interpreter
//! decodes. Block lengths and forward jump targets are back-patched through
//! the marks returned when the block or jump is opened. Errors are sticky:
//! the first one is reported by [`Emitter::finish`].

use std::fmt;

use tern_ir::{BinaryOp, ByteWriter, Opcode, Tag, UnaryOp};
use tern_types::{encode_type, LambdaType, Type};

use crate::environment::SymbolFlags;
use crate::value::{ComplexValue, FloatValue, IntValue};
use crate::Value;

/// Instruction operand.
#[derive(Clone, Debug)]
pub enum Operand {
    /// Oldest pending result of the current scope.
    Pop,
    /// Compact local slot.
    Slot(u16),
    /// Named symbol.
    Named(String),
    Literal(Value),
}

impl Operand {
    pub fn named(name: impl Into<String>) -> Self {
        Operand::Named(name.into())
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Operand::Literal(value.into())
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Operand::Literal(value)
    }
}

impl From<i64> for Operand {
    fn from(n: i64) -> Self {
        Operand::Literal(Value::int(n))
    }
}

impl From<bool> for Operand {
    fn from(b: bool) -> Self {
        Operand::Literal(Value::Bool(b))
    }
}

impl From<f64> for Operand {
    fn from(x: f64) -> Self {
        Operand::Literal(Value::make_float(x))
    }
}

impl From<&str> for Operand {
    fn from(s: &str) -> Self {
        Operand::Literal(Value::string(s))
    }
}

impl From<char> for Operand {
    fn from(c: char) -> Self {
        Operand::Literal(Value::Char(c))
    }
}

/// Assembly failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EmitError {
    /// A block body exceeds the `u16` length field.
    BlockTooLong { start: usize, len: usize },
    /// A jump target exceeds the `u32` target field.
    TargetOutOfRange { target: usize },
    /// More than 255 operands or members in one instruction or literal.
    TooManyOperands { count: usize },
    /// Values with no literal form (lambdas, spreadables).
    NotALiteral { ty: Type },
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitError::BlockTooLong { start, len } => {
                write!(f, "block at offset {start} is {len} bytes long, limit is {}", u16::MAX)
            }
            EmitError::TargetOutOfRange { target } => {
                write!(f, "jump target {target} does not fit in 32 bits")
            }
            EmitError::TooManyOperands { count } => {
                write!(f, "{count} operands given, limit is {}", u8::MAX)
            }
            EmitError::NotALiteral { ty } => write!(f, "`{ty}` values have no literal form"),
        }
    }
}

impl std::error::Error for EmitError {}

/// Open block; pass back to [`Emitter::end_block`].
#[must_use = "an unclosed block keeps a zero length"]
#[derive(Debug)]
pub struct BlockMark {
    len_at: usize,
}

/// Unpatched jump target; pass back to [`Emitter::bind`] or
/// [`Emitter::patch`].
#[must_use = "an unpatched jump targets offset 0"]
#[derive(Debug)]
pub struct JumpMark {
    target_at: usize,
}

/// Bytecode assembler.
#[derive(Default)]
pub struct Emitter {
    writer: ByteWriter,
    error: Option<EmitError>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset of the next byte; usable as a jump target.
    pub fn position(&self) -> usize {
        self.writer.position()
    }

    /// The assembled program, or the first error encountered.
    pub fn finish(self) -> Result<Vec<u8>, EmitError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.writer.finish()),
        }
    }

    fn fail(&mut self, err: EmitError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    // Blocks

    pub fn begin_block(&mut self) -> BlockMark {
        self.open(Opcode::BlockBegin)
    }

    /// Loop block whose scope is renewed on every in-range jump.
    pub fn begin_for(&mut self) -> BlockMark {
        self.open(Opcode::ForBegin)
    }

    fn open(&mut self, opcode: Opcode) -> BlockMark {
        self.writer.write_opcode(opcode);
        let len_at = self.writer.position();
        self.writer.write_u16(0);
        BlockMark { len_at }
    }

    /// Close the block opened by `mark`, patching its length.
    pub fn end_block(&mut self, mark: BlockMark) -> &mut Self {
        let start = mark.len_at + 2;
        let len = self.writer.position() - start;
        match u16::try_from(len) {
            Ok(len) => self.writer.patch_u16(mark.len_at, len),
            Err(_) => self.fail(EmitError::BlockTooLong { start, len }),
        }
        self
    }

    /// `block-end`: leave the current block.
    pub fn leave(&mut self) -> &mut Self {
        self.writer.write_opcode(Opcode::BlockEnd);
        self
    }

    /// Lambda of type `ty`; the returned mark opens its body block.
    pub fn lambda(&mut self, ty: &LambdaType) -> BlockMark {
        self.writer.write_opcode(Opcode::Lambda);
        encode_type(&mut self.writer, &Type::lambda(ty.clone()));
        self.begin_block()
    }

    // Calls

    pub fn call(&mut self, callee: impl Into<Operand>, args: &[Operand]) -> &mut Self {
        self.writer.write_opcode(Opcode::Call);
        self.operand(&callee.into());
        self.count(args.len());
        for arg in args {
            self.operand(arg);
        }
        self
    }

    pub fn ret(&mut self, value: impl Into<Operand>) -> &mut Self {
        self.writer.write_opcode(Opcode::Return);
        self.operand(&value.into());
        self
    }

    // Bindings

    pub fn declare(
        &mut self,
        ident: impl Into<Operand>,
        flags: SymbolFlags,
        ty: &Type,
        value: impl Into<Operand>,
    ) -> &mut Self {
        self.writer.write_opcode(Opcode::Declare);
        self.operand(&ident.into());
        self.writer.write_u8(flags.bits());
        encode_type(&mut self.writer, ty);
        self.operand(&value.into());
        self
    }

    /// Assign `src` to `dst`, or re-post it when `dst` is [`Operand::Pop`].
    pub fn move_to(&mut self, dst: impl Into<Operand>, src: impl Into<Operand>) -> &mut Self {
        self.writer.write_opcode(Opcode::Move);
        self.operand(&dst.into());
        self.operand(&src.into());
        self
    }

    pub fn type_alias(&mut self, name: &str, ty: &Type) -> &mut Self {
        self.writer.write_opcode(Opcode::TypeAlias);
        self.writer.write_str(name);
        encode_type(&mut self.writer, ty);
        self
    }

    // Expressions

    pub fn operation(
        &mut self,
        op: BinaryOp,
        left: impl Into<Operand>,
        right: impl Into<Operand>,
    ) -> &mut Self {
        self.writer.write_opcode(Opcode::Operation);
        self.writer.write_binary_op(op);
        self.operand(&left.into());
        self.operand(&right.into());
        self
    }

    pub fn unary(&mut self, op: UnaryOp, operand: impl Into<Operand>) -> &mut Self {
        self.writer.write_opcode(Opcode::Unary);
        self.writer.write_unary_op(op);
        self.operand(&operand.into());
        self
    }

    pub fn ternary(
        &mut self,
        cond: impl Into<Operand>,
        then: impl Into<Operand>,
        otherwise: impl Into<Operand>,
    ) -> &mut Self {
        self.writer.write_opcode(Opcode::Ternary);
        self.operand(&cond.into());
        self.operand(&then.into());
        self.operand(&otherwise.into());
        self
    }

    pub fn cast(&mut self, value: impl Into<Operand>, ty: &Type) -> &mut Self {
        self.writer.write_opcode(Opcode::Cast);
        self.operand(&value.into());
        encode_type(&mut self.writer, ty);
        self
    }

    pub fn spread(&mut self, value: impl Into<Operand>) -> &mut Self {
        self.unary_opcode(Opcode::Spread, value)
    }

    pub fn length(&mut self, value: impl Into<Operand>) -> &mut Self {
        self.unary_opcode(Opcode::Length, value)
    }

    fn unary_opcode(&mut self, opcode: Opcode, value: impl Into<Operand>) -> &mut Self {
        self.writer.write_opcode(opcode);
        self.operand(&value.into());
        self
    }

    // Jumps

    pub fn jump(&mut self, target: usize) -> &mut Self {
        self.writer.write_opcode(Opcode::Jump);
        self.target(target);
        self
    }

    /// Jump to a target patched later.
    pub fn jump_forward(&mut self) -> JumpMark {
        self.writer.write_opcode(Opcode::Jump);
        self.placeholder()
    }

    pub fn jump_if_equal(
        &mut self,
        left: impl Into<Operand>,
        right: impl Into<Operand>,
        target: usize,
    ) -> &mut Self {
        self.writer.write_opcode(Opcode::JumpIfEqual);
        self.operand(&left.into());
        self.operand(&right.into());
        self.target(target);
        self
    }

    /// Conditional jump to a target patched later.
    pub fn jump_if_equal_forward(
        &mut self,
        left: impl Into<Operand>,
        right: impl Into<Operand>,
    ) -> JumpMark {
        self.writer.write_opcode(Opcode::JumpIfEqual);
        self.operand(&left.into());
        self.operand(&right.into());
        self.placeholder()
    }

    /// Point `mark` at `target`.
    pub fn patch(&mut self, mark: JumpMark, target: usize) -> &mut Self {
        match u32::try_from(target) {
            Ok(target) => self.writer.patch_u32(mark.target_at, target),
            Err(_) => self.fail(EmitError::TargetOutOfRange { target }),
        }
        self
    }

    /// Point `mark` at the current position.
    pub fn bind(&mut self, mark: JumpMark) -> &mut Self {
        let here = self.position();
        self.patch(mark, here)
    }

    fn target(&mut self, target: usize) {
        match u32::try_from(target) {
            Ok(target) => self.writer.write_u32(target),
            Err(_) => {
                self.fail(EmitError::TargetOutOfRange { target });
                self.writer.write_u32(0);
            }
        }
    }

    fn placeholder(&mut self) -> JumpMark {
        let target_at = self.writer.position();
        self.writer.write_u32(0);
        JumpMark { target_at }
    }

    // Collections

    pub fn get(&mut self, iterable: impl Into<Operand>, index: impl Into<Operand>) -> &mut Self {
        self.writer.write_opcode(Opcode::Get);
        self.operand(&iterable.into());
        self.operand(&index.into());
        self
    }

    pub fn set(
        &mut self,
        array: impl Into<Operand>,
        index: impl Into<Operand>,
        value: impl Into<Operand>,
    ) -> &mut Self {
        self.writer.write_opcode(Opcode::Set);
        self.operand(&array.into());
        self.operand(&index.into());
        self.operand(&value.into());
        self
    }

    pub fn append(&mut self, array: impl Into<Operand>, value: impl Into<Operand>) -> &mut Self {
        self.writer.write_opcode(Opcode::Append);
        self.operand(&array.into());
        self.operand(&value.into());
        self
    }

    pub fn remove(&mut self, array: impl Into<Operand>, index: impl Into<Operand>) -> &mut Self {
        self.writer.write_opcode(Opcode::Remove);
        self.operand(&array.into());
        self.operand(&index.into());
        self
    }

    pub fn attr_get(&mut self, target: impl Into<Operand>, name: &str) -> &mut Self {
        self.writer.write_opcode(Opcode::AttrGet);
        self.operand(&target.into());
        self.writer.write_str(name);
        self
    }

    pub fn attr_set(
        &mut self,
        target: impl Into<Operand>,
        name: &str,
        value: impl Into<Operand>,
    ) -> &mut Self {
        self.writer.write_opcode(Opcode::AttrSet);
        self.operand(&target.into());
        self.writer.write_str(name);
        self.operand(&value.into());
        self
    }

    pub fn make_array(&mut self, element: &Type, items: &[Operand]) -> &mut Self {
        self.writer.write_opcode(Opcode::MakeArray);
        encode_type(&mut self.writer, element);
        self.count(items.len());
        for item in items {
            self.operand(item);
        }
        self
    }

    pub fn make_tuple(&mut self, items: &[Operand]) -> &mut Self {
        self.writer.write_opcode(Opcode::MakeTuple);
        self.count(items.len());
        for item in items {
            self.operand(item);
        }
        self
    }

    pub fn make_struct(&mut self, attributes: &[(&str, Type, Operand)]) -> &mut Self {
        self.writer.write_opcode(Opcode::MakeStruct);
        self.count(attributes.len());
        for (name, ty, value) in attributes {
            self.writer.write_str(name);
            encode_type(&mut self.writer, ty);
            self.operand(value);
        }
        self
    }

    // Operands

    fn count(&mut self, count: usize) {
        match u8::try_from(count) {
            Ok(n) => self.writer.write_u8(n),
            Err(_) => {
                self.fail(EmitError::TooManyOperands { count });
                self.writer.write_u8(u8::MAX);
            }
        }
    }

    fn operand(&mut self, operand: &Operand) {
        match operand {
            Operand::Pop => self.writer.write_tag(Tag::Pop),
            Operand::Slot(slot) => match u8::try_from(*slot) {
                Ok(slot) => {
                    self.writer.write_tag(Tag::SlotU8);
                    self.writer.write_u8(slot);
                }
                Err(_) => {
                    self.writer.write_tag(Tag::SlotU16);
                    self.writer.write_u16(*slot);
                }
            },
            Operand::Named(name) => {
                self.writer.write_tag(Tag::Named);
                self.writer.write_str(name);
            }
            Operand::Literal(value) => self.literal(value),
        }
    }

    fn literal(&mut self, value: &Value) {
        match value {
            Value::Nil => self.writer.write_tag(Tag::Nil),
            Value::Any(inner) => self.literal(inner),
            Value::Bool(b) => {
                self.writer.write_tag(Tag::Bool);
                self.writer.write_bool(*b);
            }
            Value::Char(c) => {
                self.writer.write_tag(Tag::Char);
                self.writer.write_char(*c);
            }
            Value::Int(IntValue::I8(n)) => {
                self.writer.write_tag(Tag::Int8);
                self.writer.write_i8(*n);
            }
            Value::Int(IntValue::I16(n)) => {
                self.writer.write_tag(Tag::Int16);
                self.writer.write_i16(*n);
            }
            Value::Int(IntValue::Big(n)) => {
                let bytes = n.to_signed_bytes_le();
                self.writer.write_tag(Tag::IntBig);
                self.writer.write_encoded_len(bytes.len());
                self.writer.write_bytes(&bytes);
            }
            Value::Float(FloatValue::F32(x)) => {
                self.writer.write_tag(Tag::Float32);
                self.writer.write_f32(*x);
            }
            Value::Float(FloatValue::F64(x)) => {
                self.writer.write_tag(Tag::Float64);
                self.writer.write_f64(*x);
            }
            Value::Complex(ComplexValue::C64(c)) => {
                self.writer.write_tag(Tag::Complex64);
                self.writer.write_f32(c.re);
                self.writer.write_f32(c.im);
            }
            Value::Complex(ComplexValue::C128(c)) => {
                self.writer.write_tag(Tag::Complex128);
                self.writer.write_f64(c.re);
                self.writer.write_f64(c.im);
            }
            Value::String(s) => {
                self.writer.write_tag(Tag::String);
                self.writer.write_str(s);
            }
            Value::Array(array) => {
                let items = array.to_vec();
                self.literal_sequence(Tag::Array, &items);
            }
            Value::Tuple(items) => self.literal_sequence(Tag::Tuple, items),
            Value::Union(union) => self.literal_sequence(Tag::Union, union.members()),
            Value::Struct(st) => {
                self.writer.write_tag(Tag::Struct);
                let names = st.attribute_names();
                self.count(names.len());
                for name in names {
                    self.writer.write_str(name.as_str());
                    let value = st.get(*name).unwrap_or(Value::Nil);
                    self.literal(&value);
                }
            }
            Value::Lambda(_) | Value::Spreadable(_) => {
                self.fail(EmitError::NotALiteral {
                    ty: value.type_of(),
                });
                self.writer.write_tag(Tag::Nil);
            }
        }
    }

    fn literal_sequence(&mut self, tag: Tag, items: &[Value]) {
        self.writer.write_tag(tag);
        self.count(items.len());
        for item in items {
            self.literal(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn block_length_is_patched() {
        let mut emitter = Emitter::new();
        let block = emitter.begin_block();
        emitter.ret(1);
        emitter.end_block(block);
        let code = emitter.finish().unwrap();
        // opcode, u16 len, return opcode, Int8 tag, payload
        assert_eq!(code.len(), 6);
        assert_eq!(code[0], Opcode::BlockBegin.as_u8());
        assert_eq!(u16::from_ne_bytes([code[1], code[2]]), 3);
    }

    #[test]
    fn forward_jumps_bind_to_the_current_position() {
        let mut emitter = Emitter::new();
        let jump = emitter.jump_forward();
        emitter.leave();
        emitter.bind(jump);
        let code = emitter.finish().unwrap();
        assert_eq!(u32::from_ne_bytes([code[1], code[2], code[3], code[4]]), 6);
    }

    #[test]
    fn small_slots_use_the_compact_tag() {
        let mut emitter = Emitter::new();
        emitter.ret(Operand::Slot(3)).ret(Operand::Slot(300));
        let code = emitter.finish().unwrap();
        assert_eq!(code[1], Tag::SlotU8 as u8);
        assert_eq!(code[2], 3);
        assert_eq!(code[4], Tag::SlotU16 as u8);
    }

    #[test]
    fn lambdas_have_no_literal_form() {
        let mut emitter = Emitter::new();
        let lambda = crate::value::LambdaValue::native(
            LambdaType::new([], Type::Nil),
            crate::value::NativeFn::new(|_| Ok(Value::Nil)),
        );
        emitter.ret(Value::Lambda(lambda));
        assert!(matches!(
            emitter.finish(),
            Err(EmitError::NotALiteral { .. })
        ));
    }

    #[test]
    fn oversized_blocks_are_reported() {
        let mut emitter = Emitter::new();
        let block = emitter.begin_block();
        let long = "x".repeat(usize::from(u16::MAX));
        emitter.ret(Value::string(long));
        emitter.end_block(block);
        assert!(matches!(
            emitter.finish(),
            Err(EmitError::BlockTooLong { start: 3, .. })
        ));
    }
}
