//! Operand and literal decoding.

use num_bigint::BigInt;
use num_complex::Complex64;
use tern_ir::{ByteReader, DecodeError, Tag};
use tern_stack::ensure_sufficient_stack;

use super::Interpreter;
use crate::environment::{Ident, ScopeKind, SymbolFlags};
use crate::value::StructValue;
use crate::{EvalResult, Value};
use tern_types::Type;

/// Destination of a `move`.
pub(super) enum Target {
    /// Re-post the value for the next instruction.
    Mailbox,
    Symbol(Ident),
}

impl Interpreter {
    /// Operand value: a literal, the oldest mailbox entry, or a symbol's
    /// value.
    pub(super) fn operand(&mut self, r: &mut ByteReader<'_>) -> EvalResult {
        match r.peek_tag()? {
            Tag::Pop => {
                r.read_tag()?;
                Ok(self.scope.take())
            }
            tag if tag.is_identifier() => {
                let ident = self.ident(r)?;
                self.scope.lookup(&ident)
            }
            _ => self.literal(r),
        }
    }

    pub(super) fn ident(&self, r: &mut ByteReader<'_>) -> EvalResult<Ident> {
        let offset = r.position();
        match r.read_tag()? {
            Tag::SlotU8 => Ok(Ident::Slot(u16::from(r.read_u8()?))),
            Tag::SlotU16 => Ok(Ident::Slot(r.read_u16()?)),
            Tag::Named => Ok(Ident::Named(r.read_name(&self.interner)?)),
            tag => Err(DecodeError::UnexpectedTag {
                tag,
                offset,
                expected: "an identifier",
            }
            .into()),
        }
    }

    pub(super) fn target(&self, r: &mut ByteReader<'_>) -> EvalResult<Target> {
        if r.peek_tag()? == Tag::Pop {
            r.read_tag()?;
            return Ok(Target::Mailbox);
        }
        self.ident(r).map(Target::Symbol)
    }

    /// Literal value.
    pub(super) fn literal(&mut self, r: &mut ByteReader<'_>) -> EvalResult {
        ensure_sufficient_stack(|| self.literal_inner(r))
    }

    fn literal_inner(&mut self, r: &mut ByteReader<'_>) -> EvalResult {
        let offset = r.position();
        let value = match r.read_tag()? {
            Tag::Nil => Value::Nil,
            Tag::Any => Value::Any(Box::new(self.literal(r)?)),
            Tag::Bool => Value::Bool(r.read_bool()?),
            Tag::Char => Value::Char(r.read_char()?),
            Tag::Int8 => Value::int(i64::from(r.read_i8()?)),
            Tag::Int16 => Value::int(i64::from(r.read_i16()?)),
            Tag::IntBig => {
                let count = r.read_encoded_len()?;
                if count == 0 {
                    return Err(DecodeError::LengthOutOfRange { offset }.into());
                }
                Value::make_int(BigInt::from_signed_bytes_le(r.read_exact(count)?))
            }
            Tag::Float32 => Value::make_float(f64::from(r.read_f32()?)),
            Tag::Float64 => Value::make_float(r.read_f64()?),
            Tag::Complex64 => {
                let re = r.read_f32()?;
                let im = r.read_f32()?;
                Value::make_complex(Complex64::new(f64::from(re), f64::from(im)))
            }
            Tag::Complex128 => {
                let re = r.read_f64()?;
                let im = r.read_f64()?;
                Value::make_complex(Complex64::new(re, im))
            }
            Tag::String => Value::string(r.read_str()?),
            Tag::Array => Value::array(self.literal_items(r)?),
            Tag::Tuple => Value::tuple(self.literal_items(r)?),
            Tag::Union => Value::union(self.literal_items(r)?),
            Tag::Struct => {
                let count = r.read_u8()?;
                let scope = self.scope.child(ScopeKind::Struct);
                let mut names = Vec::with_capacity(usize::from(count));
                for _ in 0..count {
                    let name = r.read_name(&self.interner)?;
                    let value = self.literal(r)?;
                    scope.declare(Ident::Named(name), SymbolFlags::PUBLIC, Type::Untyped, value)?;
                    names.push(name);
                }
                Value::Struct(StructValue::new(names, scope))
            }
            tag => {
                return Err(DecodeError::UnexpectedTag {
                    tag,
                    offset,
                    expected: "a literal value",
                }
                .into())
            }
        };
        Ok(value)
    }

    fn literal_items(&mut self, r: &mut ByteReader<'_>) -> EvalResult<Vec<Value>> {
        let count = r.read_u8()?;
        let mut items = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            items.push(self.literal(r)?);
        }
        Ok(items)
    }
}
