//! Tag-name interning.
//!
//! Every distinct tag name seen during one parse is stored once in a
//! [`NameTable`]. Nodes and children maps hold the resulting [`Name`] handle,
//! so comparing two names is an integer compare and hashing a children-map key
//! never touches the tag text.

use std::collections::HashMap;

/// A handle to an interned tag name.
///
/// Handles are only meaningful for the [`NameTable`] (and therefore the tree)
/// that produced them. Two nodes of one tree with the same tag text always
/// carry the same handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(usize);

impl Name {
    /// Position of this name in its table, in first-interned order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Per-tree string interner for tag names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTable {
    names: Vec<Box<str>>,
    index: HashMap<Box<str>, Name>,
}

impl NameTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the canonical handle for `text`, adding it on first sight.
    pub fn intern(&mut self, text: &str) -> Name {
        if let Some(&name) = self.index.get(text) {
            return name;
        }
        let name = Name(self.names.len());
        self.names.push(text.into());
        let _ = self.index.insert(text.into(), name);
        name
    }

    /// Return the handle for `text` if it has been interned.
    #[must_use]
    pub fn lookup(&self, text: &str) -> Option<Name> {
        self.index.get(text).copied()
    }

    /// Return the text of an interned name.
    #[must_use]
    pub fn resolve(&self, name: Name) -> Option<&str> {
        self.names.get(name.0).map(AsRef::as_ref)
    }

    /// Number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no name has been interned yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over all names in first-interned order.
    pub fn iter(&self) -> impl Iterator<Item = (Name, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, text)| (Name(i), text.as_ref()))
    }
}
