//! Type reconciliation.
//!
//! A single recursive walk answers three questions:
//!
//! - [`can_assign`]: may a value of type `from` be stored in a `to` slot?
//! - [`equal`]: are the two types interchangeable (lambda signatures)?
//! - [`infer`]: what type does a `to` slot have after storing `from`? This is
//!   how `untyped` placeholders get fixed.
//!
//! Resolution order: references, aliases, structural dispatch on `to`, union
//! sources, `Assign`-mode absorption, then the tag-equality fallback.

use tern_ir::Name;
use tern_stack::ensure_sufficient_stack;
use tracing::trace;

use crate::{LambdaType, StructType, Type, TypeError, TypeResolver};

/// Hops allowed when a reference resolves to another reference.
const MAX_REFERENCE_HOPS: usize = 64;

/// Reconciliation mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Assignability, with `untyped`/`any`/`nil` absorption.
    Assign,
    /// Strict equality; nothing is absorbed.
    Equal,
}

/// Reconcile `from` into `to`, returning the resulting type of the `to` slot.
pub fn reconcile(
    to: &Type,
    from: &Type,
    mode: Mode,
    resolver: &dyn TypeResolver,
) -> Result<Type, TypeError> {
    ensure_sufficient_stack(|| Reconciler { mode, resolver }.run(to, from))
}

/// Whether a `from` value may be stored in a `to` slot.
pub fn can_assign(to: &Type, from: &Type, resolver: &dyn TypeResolver) -> Result<(), TypeError> {
    reconcile(to, from, Mode::Assign, resolver).map(drop)
}

/// Whether `to` and `from` are the same type.
pub fn equal(to: &Type, from: &Type, resolver: &dyn TypeResolver) -> Result<(), TypeError> {
    reconcile(to, from, Mode::Equal, resolver).map(drop)
}

/// The type a `to` slot takes after storing a `from` value.
pub fn infer(to: &Type, from: &Type, resolver: &dyn TypeResolver) -> Result<Type, TypeError> {
    reconcile(to, from, Mode::Assign, resolver)
}

struct Reconciler<'r> {
    mode: Mode,
    resolver: &'r dyn TypeResolver,
}

impl Reconciler<'_> {
    fn run(&self, to: &Type, from: &Type) -> Result<Type, TypeError> {
        // References first: both sides are compared by what they name.
        if let Type::Reference(name) = to {
            let resolved = self.resolve(*name)?;
            return self.recurse(&resolved, from);
        }
        if let Type::Reference(name) = from {
            let resolved = self.resolve(*name)?;
            return self.recurse(to, &resolved);
        }

        match (to, from) {
            (Type::Alias { name: a, .. }, Type::Alias { name: b, .. }) if a == b => {
                return Ok(to.clone());
            }
            (Type::Alias { name, target }, _) => {
                let inner = self.recurse(target, from)?;
                return Ok(Type::alias(*name, inner));
            }
            (_, Type::Alias { target, .. }) => return self.recurse(to, target),
            _ => {}
        }

        if let Some(result) = self.structural(to, from) {
            return result;
        }

        if let Type::Union(members) = from {
            let mut results = Vec::with_capacity(members.len());
            for member in members {
                results.push(self.recurse(to, member)?);
            }
            return Ok(Type::union(results));
        }

        if self.mode == Mode::Assign {
            if to.is_untyped() {
                return Ok(if from.is_nil() { Type::Untyped } else { from.clone() });
            }
            if from.is_untyped() || to.is_any() || from.is_nil() {
                return Ok(to.clone());
            }
        }

        if to.kind() == from.kind() {
            Ok(to.clone())
        } else {
            Err(self.mismatch(to, from))
        }
    }

    #[inline]
    fn recurse(&self, to: &Type, from: &Type) -> Result<Type, TypeError> {
        ensure_sufficient_stack(|| self.run(to, from))
    }

    fn resolve(&self, name: Name) -> Result<Type, TypeError> {
        let mut current = name;
        for _ in 0..MAX_REFERENCE_HOPS {
            match self.resolver.resolve_type(current) {
                Some(Type::Reference(next)) => current = next,
                Some(ty) => return Ok(ty),
                None => break,
            }
        }
        Err(TypeError::UnresolvedType { name })
    }

    fn mismatch(&self, to: &Type, from: &Type) -> TypeError {
        trace!(%to, %from, mode = ?self.mode, "types do not reconcile");
        TypeError::wrong_types(to, from)
    }

    /// Shape-directed cases. `None` means `from` does not share `to`'s shape
    /// and the caller continues with union sources and absorption.
    fn structural(&self, to: &Type, from: &Type) -> Option<Result<Type, TypeError>> {
        match (to, from) {
            (Type::Array(to_elem), Type::Array(from_elem)) => {
                Some(self.recurse(to_elem, from_elem).map(Type::array))
            }
            (Type::Spreadable(to_inner), Type::Spreadable(from_inner)) => {
                Some(self.recurse(to_inner, from_inner).map(Type::spreadable))
            }
            (Type::Union(to_members), Type::Union(from_members)) => {
                Some(self.union_from_union(to, to_members, from, from_members))
            }
            (Type::Union(to_members), _) => self.union_from_member(to, to_members, from),
            (Type::Tuple(to_members), Type::Tuple(from_members)) => {
                Some(self.tuple(to, to_members, from, from_members))
            }
            (Type::Struct(to_struct), Type::Struct(from_struct)) => {
                Some(self.structure(to, to_struct, from, from_struct))
            }
            (Type::Lambda(to_sig), Type::Lambda(from_sig)) => {
                Some(self.lambda(to, to_sig, from, from_sig))
            }
            _ => None,
        }
    }

    fn union_from_union(
        &self,
        to: &Type,
        to_members: &[Type],
        from: &Type,
        from_members: &[Type],
    ) -> Result<Type, TypeError> {
        if to_members.len() != from_members.len() {
            return Err(self.mismatch(to, from));
        }
        for member in from_members {
            if !self.contains(to_members, member) {
                return Err(self.mismatch(to, from));
            }
        }
        Ok(to.clone())
    }

    fn union_from_member(
        &self,
        to: &Type,
        to_members: &[Type],
        from: &Type,
    ) -> Option<Result<Type, TypeError>> {
        match self.mode {
            Mode::Equal => Some(Err(self.mismatch(to, from))),
            // nil and untyped sources are absorbed further down.
            Mode::Assign if from.is_nil() || from.is_untyped() => None,
            Mode::Assign => Some(if self.contains(to_members, from) {
                Ok(to.clone())
            } else {
                Err(self.mismatch(to, from))
            }),
        }
    }

    fn contains(&self, members: &[Type], candidate: &Type) -> bool {
        members
            .iter()
            .any(|member| self.recurse(member, candidate).is_ok())
    }

    fn tuple(
        &self,
        to: &Type,
        to_members: &[Type],
        from: &Type,
        from_members: &[Type],
    ) -> Result<Type, TypeError> {
        if to_members.len() != from_members.len() {
            return Err(self.mismatch(to, from));
        }
        let members = to_members
            .iter()
            .zip(from_members)
            .map(|(t, f)| self.recurse(t, f))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Type::Tuple(members))
    }

    fn structure(
        &self,
        to: &Type,
        to_struct: &StructType,
        from: &Type,
        from_struct: &StructType,
    ) -> Result<Type, TypeError> {
        if to_struct.is_wildcard() || from_struct.is_wildcard() {
            return Ok(to.clone());
        }
        if to_struct.len() != from_struct.len() {
            return Err(self.mismatch(to, from));
        }

        let mut attributes = Vec::with_capacity(to_struct.len());
        for attr in &to_struct.attributes {
            let Some(from_ty) = from_struct.attribute(attr.name) else {
                return Err(self.mismatch(to, from));
            };
            attributes.push((attr.name, self.recurse(&attr.ty, from_ty)?));
        }
        Ok(Type::structure(attributes))
    }

    fn lambda(
        &self,
        to: &Type,
        to_sig: &LambdaType,
        from: &Type,
        from_sig: &LambdaType,
    ) -> Result<Type, TypeError> {
        if to_sig.arity() != from_sig.arity() || to_sig.variadic != from_sig.variadic {
            return Err(self.mismatch(to, from));
        }

        // Signatures are invariant regardless of mode; parameter names are
        // not part of the type.
        let strict = Reconciler {
            mode: Mode::Equal,
            resolver: self.resolver,
        };
        strict
            .recurse(&to_sig.ret, &from_sig.ret)
            .map_err(|_| self.mismatch(to, from))?;
        for (t, f) in to_sig.params.iter().zip(&from_sig.params) {
            strict
                .recurse(&t.ty, &f.ty)
                .map_err(|_| self.mismatch(to, from))?;
        }
        Ok(to.clone())
    }
}

#[cfg(test)]
mod tests;
