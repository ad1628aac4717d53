//! Static operator typing.
//!
//! Operands are grouped into categories with a fixed precedence; the
//! highest-ranked category on either side picks the handler, which then
//! decides whether it accepts the other operand and the operator. The
//! evaluator mirrors these rules value by value.

use tern_ir::{BinaryOp, UnaryOp};

use crate::{Kind, Type, TypeError};

/// Operand category, ordered from highest to lowest precedence.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    String,
    Complex,
    Float,
    Int,
    Char,
    Bool,
}

impl Category {
    pub const fn of_kind(kind: Kind) -> Option<Self> {
        Some(match kind {
            Kind::String => Category::String,
            Kind::Complex => Category::Complex,
            Kind::Float => Category::Float,
            Kind::Int => Category::Int,
            Kind::Char => Category::Char,
            Kind::Bool => Category::Bool,
            _ => return None,
        })
    }

    pub fn of_type(ty: &Type) -> Option<Self> {
        Self::of_kind(ty.unaliased().kind())
    }

    /// Category selected for a pair of operand categories, if the winner
    /// accepts the loser.
    pub fn select(left: Category, right: Category) -> Option<Category> {
        let (winner, other) = if left <= right {
            (left, right)
        } else {
            (right, left)
        };
        winner.accepts(other).then_some(winner)
    }

    /// Whether this handler takes an operand of `other`'s category.
    pub const fn accepts(self, other: Category) -> bool {
        match self {
            Category::String => matches!(other, Category::String | Category::Char),
            Category::Complex => {
                matches!(other, Category::Complex | Category::Float | Category::Int)
            }
            Category::Float => matches!(other, Category::Float | Category::Int),
            Category::Int => matches!(other, Category::Int),
            Category::Char => matches!(other, Category::Char),
            Category::Bool => matches!(other, Category::Bool),
        }
    }

    /// Whether `op` is defined for this category.
    pub const fn supports(self, op: BinaryOp) -> bool {
        use BinaryOp::{
            Add, And, Eq, Gt, GtEq, LogicalAnd, LogicalOr, Lt, LtEq, Mul, NotEq, Or, Quo, Rem,
            Shl, Shr, Sub, Xor,
        };
        match self {
            Category::String | Category::Char => {
                matches!(op, Add | Eq | NotEq | Lt | LtEq | Gt | GtEq)
            }
            Category::Complex => matches!(op, Add | Sub | Mul | Quo | Eq | NotEq),
            Category::Float => {
                matches!(op, Add | Sub | Mul | Quo | Rem | Eq | NotEq | Lt | LtEq | Gt | GtEq)
            }
            Category::Int => matches!(
                op,
                Add | Sub
                    | Mul
                    | Quo
                    | Rem
                    | And
                    | Or
                    | Xor
                    | Shl
                    | Shr
                    | Eq
                    | NotEq
                    | Lt
                    | LtEq
                    | Gt
                    | GtEq
            ),
            Category::Bool => matches!(op, LogicalAnd | LogicalOr | Eq | NotEq),
        }
    }

    /// Result type of a supported `op` in this category.
    pub fn result_type(self, op: BinaryOp) -> Type {
        if op.is_comparison() || op.is_logical() {
            return Type::Bool;
        }
        match self {
            Category::String | Category::Char => Type::String,
            Category::Complex => Type::Complex,
            Category::Float => Type::Float,
            Category::Int => Type::Int,
            Category::Bool => Type::Bool,
        }
    }
}

/// Result type of `left op right`.
///
/// `any`/`untyped` operands defer the decision to runtime. Union operands
/// check every member pair and yield the union of the results.
pub fn check_binary(op: BinaryOp, left: &Type, right: &Type) -> Result<Type, TypeError> {
    let left = left.unaliased();
    let right = right.unaliased();

    if is_dynamic(left) || is_dynamic(right) {
        return Ok(dynamic_result(op));
    }

    if let Type::Union(members) = left {
        let results = members
            .iter()
            .map(|member| check_binary(op, member, right))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Type::union(results));
    }
    if let Type::Union(members) = right {
        let results = members
            .iter()
            .map(|member| check_binary(op, left, member))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Type::union(results));
    }

    let unsupported = || TypeError::UnsupportedOperation {
        op: op.as_symbol(),
        left: left.clone(),
        right: Some(right.clone()),
    };

    let (Some(l), Some(r)) = (Category::of_type(left), Category::of_type(right)) else {
        return Err(unsupported());
    };
    match Category::select(l, r) {
        Some(category) if category.supports(op) => Ok(category.result_type(op)),
        _ => Err(unsupported()),
    }
}

/// Result type of `op operand`, through the synthetic binary form:
/// `+x` is `x + 0`, `-x` is `0 - x`, `!x` is `x == false`.
pub fn check_unary(op: UnaryOp, operand: &Type) -> Result<Type, TypeError> {
    let operand = operand.unaliased();
    if is_dynamic(operand) {
        return Ok(match op {
            UnaryOp::Not => Type::Bool,
            UnaryOp::Plus | UnaryOp::Neg => Type::Any,
        });
    }

    let unsupported = || TypeError::UnsupportedOperation {
        op: op.as_symbol(),
        left: operand.clone(),
        right: None,
    };

    let result = match op {
        UnaryOp::Plus | UnaryOp::Neg => {
            let binary = if op == UnaryOp::Plus {
                BinaryOp::Add
            } else {
                BinaryOp::Sub
            };
            match Category::of_type(operand) {
                Some(Category::Int | Category::Float | Category::Complex) => {
                    check_binary(binary, operand, &Type::Int)
                }
                _ => return Err(unsupported()),
            }
        }
        UnaryOp::Not => check_binary(BinaryOp::Eq, operand, &Type::Bool),
    };
    result.map_err(|_| unsupported())
}

fn is_dynamic(ty: &Type) -> bool {
    matches!(ty, Type::Any | Type::Untyped)
}

fn dynamic_result(op: BinaryOp) -> Type {
    if op.is_comparison() || op.is_logical() {
        Type::Bool
    } else {
        Type::Any
    }
}
