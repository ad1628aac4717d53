//! Interned identifier.

use std::fmt;

/// Interned identifier: symbol names, struct attribute names, alias names.
///
/// A `Name` points at a string leaked by the [`StringInterner`](crate::StringInterner),
/// so it is `Copy`, displays without an interner in hand, and compares by
/// content.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Name(&'static str);

impl Name {
    /// The pre-interned empty name.
    pub const EMPTY: Name = Name("");

    #[inline]
    pub(crate) const fn from_static(s: &'static str) -> Self {
        Name(s)
    }

    /// The interned text.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", self.0)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        self.0
    }
}
