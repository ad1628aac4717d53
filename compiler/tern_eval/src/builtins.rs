//! Host-supplied builtin functions.
//!
//! The embedding host builds one [`BuiltinRegistry`] and hands it to the
//! interpreter builder, which declares every entry as a public constant in
//! the root scope before execution starts. There is no global registry.

use tern_ir::Name;
use tern_types::{LambdaType, Type};
use tracing::debug;

use crate::environment::{Ident, LocalScope, Scope, SymbolFlags};
use crate::value::{LambdaValue, NativeFn};
use crate::{EvalResult, Value};

/// One registered builtin.
#[derive(Clone)]
pub struct Builtin {
    pub name: Name,
    pub signature: LambdaType,
    pub function: NativeFn,
}

/// Ordered name to (signature, callable) table.
#[derive(Clone, Default)]
pub struct BuiltinRegistry {
    entries: Vec<Builtin>,
}

impl BuiltinRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `f` under `name`. A later registration of the same name
    /// replaces the earlier one.
    pub fn register(
        &mut self,
        name: Name,
        signature: LambdaType,
        f: impl Fn(&[Value]) -> EvalResult + 'static,
    ) -> &mut Self {
        let builtin = Builtin {
            name,
            signature,
            function: NativeFn::new(f),
        };
        match self.entries.iter_mut().find(|entry| entry.name == name) {
            Some(existing) => *existing = builtin,
            None => self.entries.push(builtin),
        }
        self
    }

    pub fn get(&self, name: Name) -> Option<&Builtin> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Builtin> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Declare every builtin as a public constant lambda in `scope`.
    pub fn declare_into(&self, scope: &LocalScope<Scope>) -> EvalResult<()> {
        for builtin in &self.entries {
            let lambda = LambdaValue::native(builtin.signature.clone(), builtin.function.clone());
            scope.declare(
                Ident::Named(builtin.name),
                SymbolFlags::PUBLIC | SymbolFlags::CONST,
                Type::lambda(builtin.signature.clone()),
                Value::Lambda(lambda),
            )?;
        }
        debug!(count = self.entries.len(), "builtins declared");
        Ok(())
    }
}
