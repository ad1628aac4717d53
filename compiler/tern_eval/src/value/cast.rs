//! Explicit conversions (`cast` instruction).

use num_bigint::BigInt;
use num_complex::Complex64;
use num_traits::{FromPrimitive, Zero};
use tern_stack::ensure_sufficient_stack;
use tern_types::{can_assign, Type, TypeResolver};

use super::Value;
use crate::environment::Ident;
use crate::errors::{invalid_cast, symbol_not_found};
use crate::EvalResult;

impl Value {
    /// Convert to `target`, producing a new value or `InvalidCast` naming
    /// both types.
    pub fn cast_to(&self, target: &Type, resolver: &dyn TypeResolver) -> EvalResult {
        ensure_sufficient_stack(|| self.cast_inner(target, resolver))
    }

    fn cast_inner(&self, target: &Type, resolver: &dyn TypeResolver) -> EvalResult {
        match target {
            Type::Reference(name) => {
                let resolved = resolver
                    .resolve_type(*name)
                    .ok_or_else(|| symbol_not_found(Ident::Named(*name)))?;
                return self.cast_to(&resolved, resolver);
            }
            Type::Alias { target, .. } => return self.cast_to(target, resolver),
            Type::Untyped => return Ok(self.clone()),
            Type::Any => {
                return Ok(match self {
                    Value::Any(_) => self.clone(),
                    value => Value::Any(Box::new(value.clone())),
                });
            }
            _ => {}
        }

        let fail = || invalid_cast(&self.type_of(), target);

        match self {
            Value::Any(inner) => return inner.cast_to(target, resolver),
            Value::Union(union) => {
                return union
                    .members()
                    .iter()
                    .find_map(|member| member.cast_to(target, resolver).ok())
                    .ok_or_else(fail);
            }
            Value::Nil => {
                return if target.is_reference_like() {
                    Ok(Value::Nil)
                } else {
                    Err(fail())
                };
            }
            _ => {}
        }

        match (self, target) {
            // Identity on scalars
            (Value::Bool(_), Type::Bool)
            | (Value::Char(_), Type::Char)
            | (Value::Int(_), Type::Int)
            | (Value::Float(_), Type::Float)
            | (Value::Complex(_), Type::Complex)
            | (Value::String(_), Type::String) => Ok(self.clone()),

            // Bool and char through int
            (Value::Bool(b), Type::Int) => Ok(Value::int(i64::from(*b))),
            (Value::Int(n), Type::Bool) => Ok(Value::Bool(!n.is_zero())),
            (Value::Char(c), Type::Int) => Ok(Value::int(i64::from(u32::from(*c)))),
            (Value::Int(n), Type::Char) => n
                .to_i64()
                .and_then(|code| u32::try_from(code).ok())
                .and_then(char::from_u32)
                .map(Value::Char)
                .ok_or_else(fail),

            // Numeric conversions
            (Value::Int(n), Type::Float) => Ok(Value::make_float(n.to_f64())),
            (Value::Int(n), Type::Complex) => {
                Ok(Value::make_complex(Complex64::new(n.to_f64(), 0.0)))
            }
            (Value::Float(x), Type::Int) => truncate(x.to_f64()).ok_or_else(fail),
            (Value::Float(x), Type::Complex) => {
                Ok(Value::make_complex(Complex64::new(x.to_f64(), 0.0)))
            }
            (Value::Complex(c), Type::Float) => {
                let c = c.to_complex();
                if c.im.is_zero() {
                    Ok(Value::make_float(c.re))
                } else {
                    Err(fail())
                }
            }
            (Value::Complex(c), Type::Int) => {
                let c = c.to_complex();
                if c.im.is_zero() {
                    truncate(c.re).ok_or_else(fail)
                } else {
                    Err(fail())
                }
            }

            // Scalars to string
            (
                Value::Bool(_) | Value::Char(_) | Value::Int(_) | Value::Float(_) | Value::Complex(_),
                Type::String,
            ) => Ok(Value::string(self.to_string())),

            // Parsing
            (Value::String(s), Type::Int) => s
                .trim()
                .parse::<BigInt>()
                .map(Value::make_int)
                .map_err(|_| fail()),
            (Value::String(s), Type::Float) => s
                .trim()
                .parse::<f64>()
                .map(Value::make_float)
                .map_err(|_| fail()),
            (Value::String(s), Type::Bool) => match s.trim() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(fail()),
            },
            (Value::String(s), Type::Char) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Char(c)),
                    _ => Err(fail()),
                }
            }
            (Value::String(s), Type::Array(element)) => {
                let items = s
                    .chars()
                    .map(|c| Value::Char(c).cast_to(element, resolver))
                    .collect::<EvalResult<Vec<_>>>()?;
                Ok(rebuild_array(element, items))
            }

            // Element-wise
            (Value::Array(array), Type::Array(element)) => {
                let items = array
                    .to_vec()
                    .iter()
                    .map(|item| item.cast_to(element, resolver))
                    .collect::<EvalResult<Vec<_>>>()?;
                Ok(rebuild_array(element, items))
            }
            (Value::Tuple(items), Type::Tuple(types)) => {
                if items.len() != types.len() {
                    return Err(fail());
                }
                let items = items
                    .iter()
                    .zip(types)
                    .map(|(item, ty)| item.cast_to(ty, resolver))
                    .collect::<EvalResult<Vec<_>>>()?;
                Ok(Value::tuple(items))
            }
            (Value::Spreadable(inner), Type::Spreadable(ty)) => {
                Ok(Value::spreadable(inner.cast_to(ty, resolver)?))
            }

            // Shape checks only
            (Value::Struct(_), Type::Struct(_)) | (Value::Lambda(_), Type::Lambda(_)) => {
                can_assign(target, &self.type_of(), resolver).map_err(|_| fail())?;
                Ok(self.clone())
            }

            (_, Type::Union(members)) => {
                if can_assign(target, &self.type_of(), resolver).is_ok() {
                    return Ok(self.clone());
                }
                members
                    .iter()
                    .find_map(|member| self.cast_to(member, resolver).ok())
                    .ok_or_else(fail)
            }

            _ => Err(fail()),
        }
    }
}

/// Truncate towards zero; non-finite values do not convert.
fn truncate(x: f64) -> Option<Value> {
    if !x.is_finite() {
        return None;
    }
    BigInt::from_f64(x.trunc()).map(Value::make_int)
}

fn rebuild_array(element: &Type, items: Vec<Value>) -> Value {
    if element.is_untyped() {
        Value::array(items)
    } else {
        Value::typed_array(element.clone(), items)
    }
}
