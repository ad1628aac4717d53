//! Symbol stack: parent-linked lexical scopes.
//!
//! Each block, lambda body, loop iteration and struct instance gets its own
//! [`Scope`]. Lookups walk towards the root; a child's symbols are never
//! visible to its siblings. Dropping the last handle to a child scope
//! releases its symbols.
//!
//! Scopes are shared through [`LocalScope`] handles because lambdas capture
//! the scope they were created in: a mutation through a closure is visible
//! to the defining scope and the other way round.

// Rc is the intentional implementation detail of LocalScope<T>
#![expect(
    clippy::disallowed_types,
    reason = "Rc is the implementation of LocalScope<T>"
)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use bitflags::bitflags;
use rustc_hash::FxHashMap;
use tern_ir::Name;
use tern_types::{can_assign, infer, Type, TypeResolver};
use tracing::trace;

use crate::errors::{const_assignment, duplicate_symbol, symbol_not_found};
use crate::{EvalResult, Value};

/// A single-threaded shared handle with interior mutability.
///
/// Wraps `Rc<RefCell<T>>` so scope allocation goes through
/// [`LocalScope::new`] only.
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    /// Whether both handles point at the same scope.
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Rc::ptr_eq(&this.0, &other.0)
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T> Deref for LocalScope<T> {
    type Target = RefCell<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: Default> Default for LocalScope<T> {
    fn default() -> Self {
        LocalScope::new(T::default())
    }
}

/// What construct opened a scope.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Global,
    Block,
    Lambda,
    For,
    Struct,
}

/// Symbol key: a compact compiler-assigned slot or a name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ident {
    Slot(u16),
    Named(Name),
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ident::Slot(slot) => write!(f, "#{slot}"),
            Ident::Named(name) => write!(f, "{name}"),
        }
    }
}

impl From<Name> for Ident {
    fn from(name: Name) -> Self {
        Ident::Named(name)
    }
}

bitflags! {
    /// Visibility and mutability of a symbol.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SymbolFlags: u8 {
        const PUBLIC = 1 << 0;
        const CONST = 1 << 1;
    }
}

/// A declared symbol. Type and value always change together.
#[derive(Clone, Debug)]
pub struct Symbol {
    pub flags: SymbolFlags,
    pub ty: Type,
    pub value: Value,
}

impl Symbol {
    #[inline]
    pub fn is_public(&self) -> bool {
        self.flags.contains(SymbolFlags::PUBLIC)
    }

    #[inline]
    pub fn is_const(&self) -> bool {
        self.flags.contains(SymbolFlags::CONST)
    }
}

/// FIFO carrying one instruction's result to the next consumer.
///
/// `nil` is never posted: an empty mailbox already reads as `nil`.
#[derive(Clone, Debug, Default)]
pub struct Mailbox {
    queue: VecDeque<Value>,
}

impl Mailbox {
    pub fn post(&mut self, value: Value) {
        if !value.is_nil() {
            self.queue.push_back(value);
        }
    }

    /// Oldest posted value, or `nil` when empty.
    pub fn take(&mut self) -> Value {
        self.queue.pop_front().unwrap_or(Value::Nil)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// A single lexical scope.
#[derive(Debug)]
pub struct Scope {
    kind: ScopeKind,
    symbols: FxHashMap<Ident, Symbol>,
    parent: Option<LocalScope<Scope>>,
    mailbox: Mailbox,
}

impl Scope {
    /// A root scope.
    pub fn global() -> Self {
        Scope {
            kind: ScopeKind::Global,
            symbols: FxHashMap::default(),
            parent: None,
            mailbox: Mailbox::default(),
        }
    }

    pub fn with_parent(kind: ScopeKind, parent: LocalScope<Scope>) -> Self {
        Scope {
            kind,
            symbols: FxHashMap::default(),
            parent: Some(parent),
            mailbox: Mailbox::default(),
        }
    }

    #[inline]
    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    #[inline]
    pub fn parent(&self) -> Option<&LocalScope<Scope>> {
        self.parent.as_ref()
    }

    /// Symbol declared in this scope only.
    #[inline]
    pub fn get(&self, ident: &Ident) -> Option<&Symbol> {
        self.symbols.get(ident)
    }

    #[inline]
    pub fn contains(&self, ident: &Ident) -> bool {
        self.symbols.contains_key(ident)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    #[inline]
    pub fn mailbox(&mut self) -> &mut Mailbox {
        &mut self.mailbox
    }

    /// Drop every symbol and pending value. Breaks reference cycles between
    /// this scope and the lambdas stored in it.
    pub fn release(&mut self) {
        self.symbols.clear();
        self.mailbox = Mailbox::default();
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::global()
    }
}

impl LocalScope<Scope> {
    /// A fresh root scope.
    pub fn root() -> Self {
        LocalScope::new(Scope::global())
    }

    /// A child scope of `kind` under this one.
    #[must_use]
    pub fn child(&self, kind: ScopeKind) -> Self {
        LocalScope::new(Scope::with_parent(kind, self.clone()))
    }

    /// Declare `ident` in this scope.
    ///
    /// An `untyped` declaration takes the value's type; a typed one must
    /// accept it.
    pub fn declare(
        &self,
        ident: Ident,
        flags: SymbolFlags,
        ty: Type,
        value: Value,
    ) -> EvalResult<()> {
        if self.borrow().contains(&ident) {
            return Err(duplicate_symbol(ident));
        }

        value.adopt_type(&ty);
        let value_ty = value.type_of();
        let ty = if ty.is_untyped() {
            infer(&ty, &value_ty, self)?
        } else {
            can_assign(&ty, &value_ty, self)?;
            ty
        };

        trace!(%ident, %ty, "declare");
        self.borrow_mut()
            .symbols
            .insert(ident, Symbol { flags, ty, value });
        Ok(())
    }

    /// Scope on the parent chain that declares `ident`.
    pub fn owner(&self, ident: &Ident) -> Option<LocalScope<Scope>> {
        let mut current = self.clone();
        loop {
            let parent = {
                let scope = current.borrow();
                if scope.contains(ident) {
                    break;
                }
                scope.parent.clone()
            };
            current = parent?;
        }
        Some(current)
    }

    /// Symbol visible as `ident`, searching outwards.
    pub fn lookup_symbol(&self, ident: &Ident) -> EvalResult<Symbol> {
        let owner = self.owner(ident).ok_or_else(|| symbol_not_found(*ident))?;
        let scope = owner.borrow();
        scope
            .get(ident)
            .cloned()
            .ok_or_else(|| symbol_not_found(*ident))
    }

    /// Value visible as `ident`, searching outwards.
    pub fn lookup(&self, ident: &Ident) -> EvalResult<Value> {
        self.lookup_symbol(ident).map(|symbol| symbol.value)
    }

    /// Store `value` in the symbol visible as `ident`.
    ///
    /// The slot's type is refined by inference, so an `untyped` slot takes
    /// the value's type and a typed slot must accept it.
    pub fn assign(&self, ident: &Ident, value: Value) -> EvalResult<()> {
        let owner = self.owner(ident).ok_or_else(|| symbol_not_found(*ident))?;
        let (flags, slot_ty) = {
            let scope = owner.borrow();
            let symbol = scope.get(ident).ok_or_else(|| symbol_not_found(*ident))?;
            (symbol.flags, symbol.ty.clone())
        };
        if flags.contains(SymbolFlags::CONST) {
            return Err(const_assignment(*ident));
        }

        value.adopt_type(&slot_ty);
        let ty = infer(&slot_ty, &value.type_of(), self)?;

        trace!(%ident, %ty, "assign");
        let mut scope = owner.borrow_mut();
        if let Some(symbol) = scope.symbols.get_mut(ident) {
            symbol.ty = ty;
            symbol.value = value;
        }
        Ok(())
    }

    /// Post a result for the next instruction.
    pub fn post(&self, value: Value) {
        self.borrow_mut().mailbox.post(value);
    }

    /// Take the oldest pending result, or `nil`.
    pub fn take(&self) -> Value {
        self.borrow_mut().mailbox.take()
    }
}

impl TypeResolver for LocalScope<Scope> {
    /// Alias symbols visible under `name`.
    fn resolve_type(&self, name: Name) -> Option<Type> {
        let ident = Ident::Named(name);
        let owner = self.owner(&ident)?;
        let scope = owner.borrow();
        match scope.get(&ident) {
            Some(Symbol {
                ty: ty @ Type::Alias { .. },
                ..
            }) => Some(ty.clone()),
            _ => None,
        }
    }
}

impl fmt::Debug for LocalScope<Scope> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Symbols may hold lambdas capturing this very scope.
        match self.try_borrow() {
            Ok(scope) => f
                .debug_struct("Scope")
                .field("kind", &scope.kind)
                .field("symbols", &scope.symbols.len())
                .finish_non_exhaustive(),
            Err(_) => f.write_str("Scope(<borrowed>)"),
        }
    }
}
