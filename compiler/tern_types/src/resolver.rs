//! Lookup seam for type references.

use rustc_hash::FxHashMap;
use tern_ir::Name;

use crate::Type;

/// Resolves `Type::Reference(name)` to the type declared under `name`.
///
/// The interpreter's scope chain implements this; tests and the static
/// checker can use a plain map.
pub trait TypeResolver {
    fn resolve_type(&self, name: Name) -> Option<Type>;
}

/// Resolver that knows no names.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoTypes;

impl TypeResolver for NoTypes {
    fn resolve_type(&self, _name: Name) -> Option<Type> {
        None
    }
}

impl TypeResolver for FxHashMap<Name, Type> {
    fn resolve_type(&self, name: Name) -> Option<Type> {
        self.get(&name).cloned()
    }
}

impl<T: TypeResolver + ?Sized> TypeResolver for &T {
    fn resolve_type(&self, name: Name) -> Option<Type> {
        (**self).resolve_type(name)
    }
}
