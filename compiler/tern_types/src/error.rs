//! Type errors raised by reconciliation and operator checking.

use thiserror::Error;

use tern_ir::Name;

use crate::Type;

/// Error from the type engine. Carries the types involved so callers can
/// re-raise it under a more specific kind.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TypeError {
    /// Reconciliation or equality failed.
    #[error("wrong types: expected `{to}`, found `{from}`")]
    WrongTypes { to: Type, from: Type },

    /// A type reference named nothing in scope.
    #[error("unknown type `{name}`")]
    UnresolvedType { name: Name },

    /// The operator is not defined for the operand types.
    #[error("operator `{op}` is not supported for {}", render_operands(.left, .right.as_ref()))]
    UnsupportedOperation {
        op: &'static str,
        left: Type,
        right: Option<Type>,
    },
}

impl TypeError {
    pub fn wrong_types(to: &Type, from: &Type) -> Self {
        TypeError::WrongTypes {
            to: to.clone(),
            from: from.clone(),
        }
    }
}

fn render_operands(left: &Type, right: Option<&Type>) -> String {
    match right {
        Some(right) => format!("`{left}` and `{right}`"),
        None => format!("`{left}`"),
    }
}
