//! Runtime values.
//!
//! A closed sum mirroring [`Type`]: every value reports its nominal type
//! through [`Value::type_of`], and numerics additionally report their storage
//! width through [`Value::subtype`]. Heap payloads go through factory
//! methods (`Value::string`, `Value::tuple`, ...).

mod cast;
mod composite;
mod heap;
mod numeric;

use std::fmt;

use num_bigint::BigInt;
use num_complex::Complex64;
use tern_types::{Kind, Subtype, Type};

pub use composite::{ArrayValue, LambdaBody, LambdaValue, NativeFn, StructValue, UnionValue};
pub use heap::Heap;
pub use numeric::{ComplexValue, FloatValue, IntValue};

/// Runtime value.
#[derive(Clone, Debug)]
pub enum Value {
    Nil,
    /// A value stored through an `any` slot.
    Any(Box<Value>),
    Bool(bool),
    Char(char),
    Int(IntValue),
    Float(FloatValue),
    Complex(ComplexValue),
    String(Heap<String>),
    Array(ArrayValue),
    Tuple(Heap<Vec<Value>>),
    Struct(StructValue),
    Union(UnionValue),
    Lambda(LambdaValue),
    /// Iterable marked for call-site expansion.
    Spreadable(Box<Value>),
}

impl Value {
    // Factories

    pub fn int(n: i64) -> Self {
        Value::Int(IntValue::from_i64(n))
    }

    /// Narrowest int holding `n`.
    pub fn make_int(n: BigInt) -> Self {
        Value::Int(IntValue::from_bigint(n))
    }

    /// Narrowest float holding `x`.
    pub fn make_float(x: f64) -> Self {
        Value::Float(FloatValue::from_f64(x))
    }

    /// Narrowest complex number holding `c`.
    pub fn make_complex(c: Complex64) -> Self {
        Value::Complex(ComplexValue::from_complex(c))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::String(Heap::new(s.into()))
    }

    pub fn tuple(items: Vec<Value>) -> Self {
        Value::Tuple(Heap::new(items))
    }

    /// Array typed by the union of its items.
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(ArrayValue::inferred(items))
    }

    /// Array with an explicit element type.
    pub fn typed_array(element: Type, items: Vec<Value>) -> Self {
        Value::Array(ArrayValue::new(element, items))
    }

    pub fn union(members: impl IntoIterator<Item = Value>) -> Self {
        Value::Union(UnionValue::new(members))
    }

    pub fn spreadable(inner: Value) -> Self {
        Value::Spreadable(Box::new(inner))
    }

    // Introspection

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Nil => Kind::Nil,
            Value::Any(_) => Kind::Any,
            Value::Bool(_) => Kind::Bool,
            Value::Char(_) => Kind::Char,
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::Complex(_) => Kind::Complex,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Tuple(_) => Kind::Tuple,
            Value::Struct(_) => Kind::Struct,
            Value::Union(_) => Kind::Union,
            Value::Lambda(_) => Kind::Lambda,
            Value::Spreadable(_) => Kind::Spreadable,
        }
    }

    /// Storage width of numerics; `None` for everything else.
    pub fn subtype(&self) -> Option<Subtype> {
        match self {
            Value::Int(n) => Some(n.subtype()),
            Value::Float(x) => Some(x.subtype()),
            Value::Complex(c) => Some(c.subtype()),
            _ => None,
        }
    }

    /// Nominal type.
    pub fn type_of(&self) -> Type {
        match self {
            Value::Nil => Type::Nil,
            Value::Any(_) => Type::Any,
            Value::Bool(_) => Type::Bool,
            Value::Char(_) => Type::Char,
            Value::Int(_) => Type::Int,
            Value::Float(_) => Type::Float,
            Value::Complex(_) => Type::Complex,
            Value::String(_) => Type::String,
            Value::Array(array) => Type::array(array.element_type()),
            Value::Tuple(items) => Type::Tuple(items.iter().map(Value::type_of).collect()),
            Value::Struct(st) => st.type_of(),
            Value::Union(union) => union.type_of(),
            Value::Lambda(lambda) => lambda.type_of(),
            Value::Spreadable(inner) => Type::spreadable(inner.type_of()),
        }
    }

    /// The value behind any `any` wrappers.
    pub fn unwrap_any(&self) -> &Value {
        match self {
            Value::Any(inner) => inner.unwrap_any(),
            value => value,
        }
    }

    /// Let an array stored into a slot of type `slot` pick up the slot's
    /// element type while it is still empty or `untyped`.
    pub fn adopt_type(&self, slot: &Type) {
        if let (Value::Array(array), Some(element)) = (self, slot.element_type()) {
            array.adopt(element);
        }
    }

    /// Elements of an iterable, or `None` for non-iterables.
    pub fn elements(&self) -> Option<Vec<Value>> {
        match self.unwrap_any() {
            Value::Array(array) => Some(array.to_vec()),
            Value::Tuple(items) => Some(items.to_vec()),
            Value::String(s) => Some(s.chars().map(Value::Char).collect()),
            Value::Spreadable(inner) => inner.elements(),
            _ => None,
        }
    }

    /// Element count of an iterable.
    pub fn length(&self) -> Option<usize> {
        match self.unwrap_any() {
            Value::Array(array) => Some(array.len()),
            Value::Tuple(items) => Some(items.len()),
            Value::String(s) => Some(s.chars().count()),
            Value::Spreadable(inner) => inner.length(),
            _ => None,
        }
    }

    pub fn to_display_string(&self) -> String {
        self.to_string()
    }

    /// Whether the array or struct `container` is this value or is nested
    /// anywhere inside it. Containers match by identity.
    pub(crate) fn reaches(&self, container: &Value) -> bool {
        let here = match (self, container) {
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Struct(a), Value::Struct(b)) => a.ptr_eq(b),
            _ => false,
        };
        here || match self {
            Value::Any(inner) | Value::Spreadable(inner) => inner.reaches(container),
            Value::Array(array) => array.items().iter().any(|item| item.reaches(container)),
            Value::Tuple(items) => items.iter().any(|item| item.reaches(container)),
            Value::Union(union) => union.members().iter().any(|m| m.reaches(container)),
            Value::Struct(st) => st
                .attribute_names()
                .iter()
                .any(|name| st.get(*name).is_ok_and(|value| value.reaches(container))),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::make_float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl PartialEq for Value {
    /// Numeric-aware structural equality. Structs and lambdas compare by
    /// identity; a char equals the one-character string holding it.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Any(a), b) => a.as_ref() == b,
            (a, Value::Any(b)) => a == b.as_ref(),

            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Char(c), Value::String(s)) | (Value::String(s), Value::Char(c)) => {
                let mut chars = s.chars();
                chars.next() == Some(*c) && chars.next().is_none()
            }

            (Value::Int(a), Value::Int(b)) => a.to_bigint() == b.to_bigint(),
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                a.to_f64() == b.to_f64()
            }
            (Value::Float(a), Value::Float(b)) => a.to_f64() == b.to_f64(),
            (Value::Complex(a), b) | (b, Value::Complex(a)) => match numeric_as_complex(b) {
                Some(b) => a.to_complex() == b,
                None => false,
            },

            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b) || *a.items() == *b.items(),
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Union(a), Value::Union(b)) => a.members() == b.members(),
            (Value::Struct(a), Value::Struct(b)) => a.ptr_eq(b),
            (Value::Lambda(a), Value::Lambda(b)) => a.ptr_eq(b),
            (Value::Spreadable(a), Value::Spreadable(b)) => a == b,
            _ => false,
        }
    }
}

fn numeric_as_complex(value: &Value) -> Option<Complex64> {
    match value {
        Value::Int(n) => Some(Complex64::new(n.to_f64(), 0.0)),
        Value::Float(x) => Some(Complex64::new(x.to_f64(), 0.0)),
        Value::Complex(c) => Some(c.to_complex()),
        _ => None,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Any(inner) => write!(f, "{inner}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Complex(c) => write!(f, "{c}"),
            Value::String(s) => f.write_str(s),
            Value::Array(array) => {
                f.write_str("[")?;
                write_joined(f, &array.items(), ", ")?;
                f.write_str("]")
            }
            Value::Tuple(items) => {
                f.write_str("(")?;
                write_joined(f, items, ", ")?;
                f.write_str(")")
            }
            Value::Struct(st) => {
                f.write_str("{")?;
                for (i, name) in st.attribute_names().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match st.get(*name) {
                        Ok(value) => write!(f, "{name}: {value}")?,
                        Err(_) => write!(f, "{name}: nil")?,
                    }
                }
                f.write_str("}")
            }
            Value::Union(union) => write_joined(f, union.members(), "|"),
            Value::Lambda(lambda) => write!(f, "<lambda {}>", lambda.signature()),
            Value::Spreadable(inner) => write!(f, "...{inner}"),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, values: &[Value], sep: &str) -> fmt::Result {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{value}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests;
