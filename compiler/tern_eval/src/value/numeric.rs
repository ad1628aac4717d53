//! Auto-narrowed numeric storage.
//!
//! Every constructor picks the smallest representation that holds the value
//! exactly. The width is representational only: the nominal type of all
//! three int widths is `int`, and likewise for floats and complex numbers.

use std::fmt;

use num_bigint::BigInt;
use num_complex::{Complex32, Complex64};
use num_traits::{ToPrimitive, Zero};
use tern_types::Subtype;

/// Signed integer stored in 8 bits, 16 bits or arbitrary precision.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntValue {
    I8(i8),
    I16(i16),
    Big(BigInt),
}

impl IntValue {
    /// Narrow by the bit length of the magnitude: up to 7 bits is 8-bit, up
    /// to 15 bits is 16-bit, anything wider is arbitrary precision.
    pub fn from_bigint(n: BigInt) -> Self {
        let bits = n.magnitude().bits();
        if bits <= 7 {
            if let Some(v) = n.to_i8() {
                return IntValue::I8(v);
            }
        }
        if bits <= 15 {
            if let Some(v) = n.to_i16() {
                return IntValue::I16(v);
            }
        }
        IntValue::Big(n)
    }

    pub fn from_i64(n: i64) -> Self {
        let bits = u64::BITS - n.unsigned_abs().leading_zeros();
        if bits <= 7 {
            if let Ok(v) = i8::try_from(n) {
                return IntValue::I8(v);
            }
        }
        if bits <= 15 {
            if let Ok(v) = i16::try_from(n) {
                return IntValue::I16(v);
            }
        }
        IntValue::Big(BigInt::from(n))
    }

    pub fn to_bigint(&self) -> BigInt {
        match self {
            IntValue::I8(v) => BigInt::from(*v),
            IntValue::I16(v) => BigInt::from(*v),
            IntValue::Big(v) => v.clone(),
        }
    }

    pub fn to_i64(&self) -> Option<i64> {
        match self {
            IntValue::I8(v) => Some(i64::from(*v)),
            IntValue::I16(v) => Some(i64::from(*v)),
            IntValue::Big(v) => v.to_i64(),
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            IntValue::I8(v) => f64::from(*v),
            IntValue::I16(v) => f64::from(*v),
            IntValue::Big(v) => v.to_f64().unwrap_or(f64::NAN),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            IntValue::I8(v) => *v == 0,
            IntValue::I16(v) => *v == 0,
            IntValue::Big(v) => v.is_zero(),
        }
    }

    pub fn subtype(&self) -> Subtype {
        match self {
            IntValue::I8(_) => Subtype::Int8,
            IntValue::I16(_) => Subtype::Int16,
            IntValue::Big(_) => Subtype::IntBig,
        }
    }
}

impl fmt::Display for IntValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntValue::I8(v) => write!(f, "{v}"),
            IntValue::I16(v) => write!(f, "{v}"),
            IntValue::Big(v) => write!(f, "{v}"),
        }
    }
}

/// Float stored in 32 or 64 bits.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FloatValue {
    F32(f32),
    F64(f64),
}

impl FloatValue {
    /// 32-bit when the value survives a round trip through `f32`.
    pub fn from_f64(x: f64) -> Self {
        #[expect(clippy::cast_possible_truncation, reason = "checked by the round trip")]
        let narrow = x as f32;
        if x.is_nan() || f64::from(narrow) == x {
            FloatValue::F32(narrow)
        } else {
            FloatValue::F64(x)
        }
    }

    pub fn to_f64(self) -> f64 {
        match self {
            FloatValue::F32(v) => f64::from(v),
            FloatValue::F64(v) => v,
        }
    }

    pub fn subtype(self) -> Subtype {
        match self {
            FloatValue::F32(_) => Subtype::Float32,
            FloatValue::F64(_) => Subtype::Float64,
        }
    }
}

impl fmt::Display for FloatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Debug keeps the trailing `.0` on integral values.
        match self {
            FloatValue::F32(v) => write!(f, "{v:?}"),
            FloatValue::F64(v) => write!(f, "{v:?}"),
        }
    }
}

/// Complex number stored as two 32-bit or two 64-bit floats.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ComplexValue {
    C64(Complex32),
    C128(Complex64),
}

impl ComplexValue {
    /// 64-bit when both components survive a round trip through `f32`.
    pub fn from_complex(c: Complex64) -> Self {
        match (FloatValue::from_f64(c.re), FloatValue::from_f64(c.im)) {
            (FloatValue::F32(re), FloatValue::F32(im)) => ComplexValue::C64(Complex32::new(re, im)),
            _ => ComplexValue::C128(c),
        }
    }

    pub fn to_complex(self) -> Complex64 {
        match self {
            ComplexValue::C64(c) => Complex64::new(f64::from(c.re), f64::from(c.im)),
            ComplexValue::C128(c) => c,
        }
    }

    pub fn is_zero(self) -> bool {
        self.to_complex().is_zero()
    }

    pub fn subtype(self) -> Subtype {
        match self {
            ComplexValue::C64(_) => Subtype::Complex64,
            ComplexValue::C128(_) => Subtype::Complex128,
        }
    }
}

impl fmt::Display for ComplexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.to_complex();
        let re = FloatValue::from_f64(c.re);
        let im = FloatValue::from_f64(c.im.abs());
        let sign = if c.im.is_sign_negative() { '-' } else { '+' };
        write!(f, "{re}{sign}{im}i")
    }
}
