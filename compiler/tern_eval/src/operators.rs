//! Binary and unary operator evaluation.
//!
//! Mirrors `tern_types::check_binary`: the operand category with the highest
//! precedence selects the handler (`string` > `complex` > `float` > `int` >
//! `char` > `bool`), the handler decides whether it accepts the other
//! operand, and every result is re-narrowed to its smallest width.

use std::cmp::Ordering;

use num_bigint::BigInt;
use num_complex::Complex64;
use num_traits::{ToPrimitive, Zero};
use tern_ir::{BinaryOp, UnaryOp};
use tern_types::Category;

use crate::errors::{division_by_zero, unsupported_binary, unsupported_unary, EvalErrorKind};
use crate::{EvalResult, Value};

/// Evaluate `left op right`.
pub fn eval_binary(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    let left = left.unwrap_any();
    let right = right.unwrap_any();

    // A union value answers through the first member the operator accepts.
    if let Value::Union(union) = left {
        return union
            .members()
            .iter()
            .find_map(|member| eval_binary(op, member, right).ok())
            .ok_or_else(|| unsupported_binary(op.as_symbol(), &left.type_of(), &right.type_of()));
    }
    if let Value::Union(union) = right {
        return union
            .members()
            .iter()
            .find_map(|member| eval_binary(op, left, member).ok())
            .ok_or_else(|| unsupported_binary(op.as_symbol(), &left.type_of(), &right.type_of()));
    }

    let unsupported = || unsupported_binary(op.as_symbol(), &left.type_of(), &right.type_of());

    let (Some(l), Some(r)) = (
        Category::of_kind(left.kind()),
        Category::of_kind(right.kind()),
    ) else {
        return Err(unsupported());
    };
    let Some(category) = Category::select(l, r) else {
        return Err(unsupported());
    };

    if op.is_division() && is_numeric_zero(right) {
        return Err(division_by_zero());
    }
    if !category.supports(op) {
        return Err(unsupported());
    }

    let result = match category {
        Category::String => eval_string(op, &as_text(left), &as_text(right)),
        Category::Char => eval_char(op, left, right),
        Category::Complex => eval_complex(op, as_complex(left), as_complex(right)),
        Category::Float => eval_float(op, as_float(left), as_float(right)),
        Category::Int => eval_int(op, left, right),
        Category::Bool => eval_bool(op, left, right),
    };
    result.ok_or_else(unsupported)
}

/// Evaluate `op operand`: `+x` is `x + 0`, `-x` is `0 - x`, `!x` is
/// `x == false`.
pub fn eval_unary(op: UnaryOp, operand: &Value) -> EvalResult {
    let operand = operand.unwrap_any();
    let unsupported = || unsupported_unary(op.as_symbol(), &operand.type_of());

    let result = match op {
        UnaryOp::Plus | UnaryOp::Neg => {
            let zero = match operand {
                Value::Int(_) => Value::int(0),
                Value::Float(_) => Value::make_float(0.0),
                Value::Complex(_) => Value::make_complex(Complex64::zero()),
                _ => return Err(unsupported()),
            };
            if op == UnaryOp::Plus {
                eval_binary(BinaryOp::Add, operand, &zero)
            } else {
                eval_binary(BinaryOp::Sub, &zero, operand)
            }
        }
        UnaryOp::Not => eval_binary(BinaryOp::Eq, operand, &Value::Bool(false)),
    };
    result.map_err(|err| match err.kind {
        EvalErrorKind::UnsupportedOperation { .. } => unsupported(),
        _ => err,
    })
}

fn is_numeric_zero(value: &Value) -> bool {
    match value {
        Value::Int(n) => n.is_zero(),
        Value::Float(x) => x.to_f64() == 0.0,
        Value::Complex(c) => c.is_zero(),
        _ => false,
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::Char(c) => c.to_string(),
        Value::String(s) => s.to_string(),
        other => other.to_string(),
    }
}

fn as_float(value: &Value) -> f64 {
    match value {
        Value::Int(n) => n.to_f64(),
        Value::Float(x) => x.to_f64(),
        _ => f64::NAN,
    }
}

fn as_complex(value: &Value) -> Complex64 {
    match value {
        Value::Complex(c) => c.to_complex(),
        other => Complex64::new(as_float(other), 0.0),
    }
}

fn as_bigint(value: &Value) -> Option<BigInt> {
    match value {
        Value::Int(n) => Some(n.to_bigint()),
        _ => None,
    }
}

fn compare(op: BinaryOp, ordering: Option<Ordering>) -> Option<Value> {
    let ordering = ordering?;
    let result = match op {
        BinaryOp::Eq => ordering == Ordering::Equal,
        BinaryOp::NotEq => ordering != Ordering::Equal,
        BinaryOp::Lt => ordering == Ordering::Less,
        BinaryOp::LtEq => ordering != Ordering::Greater,
        BinaryOp::Gt => ordering == Ordering::Greater,
        BinaryOp::GtEq => ordering != Ordering::Less,
        _ => return None,
    };
    Some(Value::Bool(result))
}

fn eval_string(op: BinaryOp, a: &str, b: &str) -> Option<Value> {
    match op {
        BinaryOp::Add => Some(Value::string(format!("{a}{b}"))),
        _ => compare(op, Some(a.cmp(b))),
    }
}

fn eval_char(op: BinaryOp, left: &Value, right: &Value) -> Option<Value> {
    let (Value::Char(a), Value::Char(b)) = (left, right) else {
        return None;
    };
    match op {
        BinaryOp::Add => Some(Value::string(format!("{a}{b}"))),
        _ => compare(op, Some(a.cmp(b))),
    }
}

fn eval_complex(op: BinaryOp, a: Complex64, b: Complex64) -> Option<Value> {
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Quo => a / b,
        BinaryOp::Eq => return Some(Value::Bool(a == b)),
        BinaryOp::NotEq => return Some(Value::Bool(a != b)),
        _ => return None,
    };
    Some(Value::make_complex(result))
}

fn eval_float(op: BinaryOp, a: f64, b: f64) -> Option<Value> {
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Quo => a / b,
        BinaryOp::Rem => a % b,
        _ => return compare(op, a.partial_cmp(&b)).or(Some(Value::Bool(op == BinaryOp::NotEq))),
    };
    Some(Value::make_float(result))
}

/// Widest int a left shift may produce.
const MAX_INT_BITS: u64 = 1 << 20;

fn eval_int(op: BinaryOp, left: &Value, right: &Value) -> Option<Value> {
    let a = as_bigint(left)?;
    let b = as_bigint(right)?;
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        // Truncating division; the remainder takes the dividend's sign.
        BinaryOp::Quo => a / b,
        BinaryOp::Rem => a % b,
        BinaryOp::And => a & b,
        BinaryOp::Or => a | b,
        BinaryOp::Xor => a ^ b,
        BinaryOp::Shl => {
            let count = b.to_u64()?;
            if a.bits().saturating_add(count) > MAX_INT_BITS {
                return None;
            }
            a << usize::try_from(count).ok()?
        }
        BinaryOp::Shr => a >> b.to_usize()?,
        _ => return compare(op, Some(a.cmp(&b))),
    };
    Some(Value::make_int(result))
}

fn eval_bool(op: BinaryOp, left: &Value, right: &Value) -> Option<Value> {
    let (Value::Bool(a), Value::Bool(b)) = (left, right) else {
        return None;
    };
    let result = match op {
        BinaryOp::LogicalAnd => *a && *b,
        BinaryOp::LogicalOr => *a || *b,
        BinaryOp::Eq => a == b,
        BinaryOp::NotEq => a != b,
        _ => return None,
    };
    Some(Value::Bool(result))
}
