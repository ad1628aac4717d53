//! Tests for unary operator evaluation.

use crate::errors::EvalErrorKind;
use crate::operators::eval_unary;
use crate::Value;
use num_complex::Complex64;
use pretty_assertions::assert_eq;
use tern_ir::UnaryOp;
use tern_types::Type;

#[test]
fn test_negation() {
    assert_eq!(eval_unary(UnaryOp::Neg, &Value::int(5)).unwrap(), Value::int(-5));
    assert_eq!(
        eval_unary(UnaryOp::Neg, &Value::make_float(2.5)).unwrap(),
        Value::make_float(-2.5)
    );
    assert_eq!(
        eval_unary(UnaryOp::Neg, &Value::make_complex(Complex64::new(1.0, -1.0))).unwrap(),
        Value::make_complex(Complex64::new(-1.0, 1.0))
    );
}

#[test]
fn test_plus_is_identity() {
    assert_eq!(eval_unary(UnaryOp::Plus, &Value::int(7)).unwrap(), Value::int(7));
}

#[test]
fn test_logical_not() {
    assert_eq!(eval_unary(UnaryOp::Not, &Value::Bool(true)).unwrap(), Value::Bool(false));
    assert_eq!(eval_unary(UnaryOp::Not, &Value::Bool(false)).unwrap(), Value::Bool(true));
}

#[test]
fn test_unsupported_operands_name_the_unary_operator() {
    assert_eq!(
        eval_unary(UnaryOp::Neg, &Value::string("x")).unwrap_err().kind,
        EvalErrorKind::UnsupportedOperation {
            op: "-",
            left: Type::String,
            right: None,
        }
    );
    assert_eq!(
        eval_unary(UnaryOp::Not, &Value::int(1)).unwrap_err().kind,
        EvalErrorKind::UnsupportedOperation {
            op: "!",
            left: Type::Int,
            right: None,
        }
    );
}
