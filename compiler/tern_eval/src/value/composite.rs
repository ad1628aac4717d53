//! Mutable and shared composite values: arrays, structs, unions, lambdas.

// Rc backs the shared array storage and native callables.
#![expect(
    clippy::disallowed_types,
    reason = "Rc for shared array storage and native callables"
)]

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use tern_ir::Name;
use tern_types::{infer, Kind, LambdaType, Subtype, Type, TypeResolver};

use super::{Heap, Value};
use crate::environment::{Ident, LocalScope, Scope};
use crate::errors::{attribute_not_found, cyclic_value, index_out_of_bounds};
use crate::EvalResult;

// Arrays

#[derive(Debug)]
struct ArrayData {
    element: Type,
    items: Vec<Value>,
}

/// Shared, mutable array. Clones alias the same storage.
///
/// The element type is part of the mutable state: storing an element
/// reconciles it against the current element type, so an `untyped` array
/// fixes its type on first use.
#[derive(Clone)]
pub struct ArrayValue(Rc<RefCell<ArrayData>>);

impl ArrayValue {
    pub fn new(element: Type, items: Vec<Value>) -> Self {
        ArrayValue(Rc::new(RefCell::new(ArrayData { element, items })))
    }

    /// Array whose element type is the union of the items' types.
    pub fn inferred(items: Vec<Value>) -> Self {
        let element = Type::union(items.iter().map(Value::type_of));
        Self::new(element, items)
    }

    pub fn element_type(&self) -> Type {
        self.0.borrow().element.clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().items.get(index).cloned()
    }

    /// Borrow the elements.
    pub fn items(&self) -> Ref<'_, [Value]> {
        Ref::map(self.0.borrow(), |data| data.items.as_slice())
    }

    /// Copy of the elements.
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.borrow().items.clone()
    }

    /// Element type after storing `value`. An array never holds itself.
    fn accept(&self, value: &Value, resolver: &dyn TypeResolver) -> EvalResult<Type> {
        if value.reaches(&Value::Array(self.clone())) {
            return Err(cyclic_value());
        }
        let current = self.element_type();
        Ok(infer(&current, &value.type_of(), resolver)?)
    }

    /// Push `value`. A rejected value leaves the array untouched.
    pub fn append(&self, value: Value, resolver: &dyn TypeResolver) -> EvalResult<()> {
        let element = self.accept(&value, resolver)?;
        let mut data = self.0.borrow_mut();
        data.element = element;
        data.items.push(value);
        Ok(())
    }

    /// Replace the element at `index`.
    pub fn set(&self, index: i64, value: Value, resolver: &dyn TypeResolver) -> EvalResult<()> {
        let slot = self.checked_index(index)?;
        let element = self.accept(&value, resolver)?;
        let mut data = self.0.borrow_mut();
        data.element = element;
        data.items[slot] = value;
        Ok(())
    }

    /// Remove and return the element at `index`.
    pub fn remove(&self, index: i64) -> EvalResult<Value> {
        let slot = self.checked_index(index)?;
        Ok(self.0.borrow_mut().items.remove(slot))
    }

    pub fn checked_index(&self, index: i64) -> EvalResult<usize> {
        let len = self.len();
        usize::try_from(index)
            .ok()
            .filter(|slot| *slot < len)
            .ok_or_else(|| index_out_of_bounds(index, len))
    }

    /// An empty or `untyped` array stored in a typed slot takes the slot's
    /// element type.
    pub(super) fn adopt(&self, element: &Type) {
        let mut data = self.0.borrow_mut();
        if element.is_untyped() {
            return;
        }
        if data.items.is_empty() || data.element.is_untyped() {
            data.element = element.clone();
        }
    }

    pub fn ptr_eq(&self, other: &ArrayValue) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ArrayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(data) => f
                .debug_struct("Array")
                .field("element", &data.element)
                .field("items", &data.items)
                .finish(),
            Err(_) => f.write_str("Array(<borrowed>)"),
        }
    }
}

// Structs

/// Struct instance. Attributes live as symbols in the instance's own
/// `Struct` scope; clones alias the same instance.
#[derive(Clone)]
pub struct StructValue {
    attributes: Heap<Vec<Name>>,
    scope: LocalScope<Scope>,
}

impl StructValue {
    pub(crate) fn new(attributes: Vec<Name>, scope: LocalScope<Scope>) -> Self {
        StructValue {
            attributes: Heap::new(attributes),
            scope,
        }
    }

    /// Attribute names in declaration order.
    pub fn attribute_names(&self) -> &[Name] {
        &self.attributes
    }

    pub fn scope(&self) -> &LocalScope<Scope> {
        &self.scope
    }

    /// Current structural type, from the attribute symbols.
    pub fn type_of(&self) -> Type {
        let scope = self.scope.borrow();
        Type::structure(self.attributes.iter().map(|name| {
            let ty = scope
                .get(&Ident::Named(*name))
                .map_or(Type::Untyped, |symbol| symbol.ty.clone());
            (*name, ty)
        }))
    }

    /// Read an attribute of this instance (never of an enclosing scope).
    pub fn get(&self, name: Name) -> EvalResult<Value> {
        self.scope
            .borrow()
            .get(&Ident::Named(name))
            .map(|symbol| symbol.value.clone())
            .ok_or_else(|| attribute_not_found(name))
    }

    /// Write an attribute through the symbol stack's const and type checks.
    pub fn set(&self, name: Name, value: Value) -> EvalResult<()> {
        let ident = Ident::Named(name);
        if !self.scope.borrow().contains(&ident) {
            return Err(attribute_not_found(name));
        }
        if value.reaches(&Value::Struct(self.clone())) {
            return Err(cyclic_value());
        }
        self.scope.assign(&ident, value)
    }

    pub fn ptr_eq(&self, other: &StructValue) -> bool {
        LocalScope::ptr_eq(&self.scope, &other.scope)
    }
}

impl fmt::Debug for StructValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Struct")
            .field("attributes", &*self.attributes)
            .finish_non_exhaustive()
    }
}

// Unions

/// One object per union member, deduplicated by kind and width.
#[derive(Clone, Debug)]
pub struct UnionValue(Heap<Vec<Value>>);

impl UnionValue {
    pub fn new(values: impl IntoIterator<Item = Value>) -> Self {
        let mut members: Vec<Value> = Vec::new();
        let mut seen: Vec<(Kind, Option<Subtype>)> = Vec::new();
        for value in values {
            let key = (value.kind(), value.subtype());
            if !seen.contains(&key) {
                seen.push(key);
                members.push(value);
            }
        }
        UnionValue(Heap::new(members))
    }

    pub fn members(&self) -> &[Value] {
        &self.0
    }

    pub fn type_of(&self) -> Type {
        Type::union(self.0.iter().map(Value::type_of))
    }
}

// Lambdas

/// Host function backing a builtin.
#[derive(Clone)]
pub struct NativeFn(Rc<dyn Fn(&[Value]) -> EvalResult>);

impl NativeFn {
    pub fn new(f: impl Fn(&[Value]) -> EvalResult + 'static) -> Self {
        NativeFn(Rc::new(f))
    }

    #[inline]
    pub fn call(&self, args: &[Value]) -> EvalResult {
        (self.0)(args)
    }

    pub fn ptr_eq(&self, other: &NativeFn) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// What runs when a lambda is called.
#[derive(Clone)]
pub enum LambdaBody {
    /// Offset of the body's `block-begin` in the program.
    Bytecode { offset: usize },
    Native(NativeFn),
}

/// A callable: signature, body and captured scope.
#[derive(Clone)]
pub struct LambdaValue {
    ty: Heap<LambdaType>,
    body: LambdaBody,
    scope: Option<LocalScope<Scope>>,
}

impl LambdaValue {
    /// Bytecode lambda closing over `scope`.
    pub fn bytecode(ty: LambdaType, offset: usize, scope: LocalScope<Scope>) -> Self {
        LambdaValue {
            ty: Heap::new(ty),
            body: LambdaBody::Bytecode { offset },
            scope: Some(scope),
        }
    }

    /// Host-implemented lambda.
    pub fn native(ty: LambdaType, f: NativeFn) -> Self {
        LambdaValue {
            ty: Heap::new(ty),
            body: LambdaBody::Native(f),
            scope: None,
        }
    }

    pub fn signature(&self) -> &LambdaType {
        &self.ty
    }

    pub fn body(&self) -> &LambdaBody {
        &self.body
    }

    /// Scope captured at creation; `None` for builtins.
    pub fn captured(&self) -> Option<&LocalScope<Scope>> {
        self.scope.as_ref()
    }

    pub fn type_of(&self) -> Type {
        Type::lambda((*self.ty).clone())
    }

    pub fn ptr_eq(&self, other: &LambdaValue) -> bool {
        if !Heap::ptr_eq(&self.ty, &other.ty) {
            return false;
        }
        match (&self.body, &other.body) {
            (LambdaBody::Bytecode { offset: a }, LambdaBody::Bytecode { offset: b }) => a == b,
            (LambdaBody::Native(a), LambdaBody::Native(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for LambdaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = match &self.body {
            LambdaBody::Bytecode { offset } => format!("bytecode@{offset}"),
            LambdaBody::Native(_) => "native".to_owned(),
        };
        f.debug_struct("Lambda")
            .field("ty", &*self.ty)
            .field("body", &body)
            .finish_non_exhaustive()
    }
}
