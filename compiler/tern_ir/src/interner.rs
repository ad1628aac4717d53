//! String interner for identifiers decoded from bytecode.
//!
//! Every identifier in a program is interned once; afterwards `Name`s are
//! plain `Copy` handles. Strings are leaked to obtain the `'static`
//! lifetime, which is fine for a process-lifetime vocabulary of names.

// Arc is what makes the interner shareable between a host's builtin registry
// and the interpreter that decodes the program.
#![expect(
    clippy::disallowed_types,
    reason = "Arc required for SharedInterner"
)]

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashSet;

use crate::Name;

/// Deduplicating string interner.
pub struct StringInterner {
    strings: RwLock<FxHashSet<&'static str>>,
}

impl StringInterner {
    /// Create an interner holding only the empty name.
    pub fn new() -> Self {
        let mut strings = FxHashSet::default();
        strings.insert(Name::EMPTY.as_str());
        Self {
            strings: RwLock::new(strings),
        }
    }

    /// Intern `s`, returning its `Name`.
    pub fn intern(&self, s: &str) -> Name {
        // Fast path: already interned
        if let Some(existing) = self.strings.read().get(s) {
            return Name::from_static(existing);
        }

        let mut guard = self.strings.write();
        // Double-check after acquiring the write lock
        if let Some(existing) = guard.get(s) {
            return Name::from_static(existing);
        }
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        guard.insert(leaked);
        Name::from_static(leaked)
    }

    /// Look up `s` without interning it.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.strings.read().get(s).map(|existing| Name::from_static(existing))
    }

    /// Number of interned strings, including the empty name.
    pub fn len(&self) -> usize {
        self.strings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Interner shared between the host and the interpreter.
#[derive(Clone, Default)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::ops::Deref for SharedInterner {
    type Target = StringInterner;

    fn deref(&self) -> &StringInterner {
        &self.0
    }
}
