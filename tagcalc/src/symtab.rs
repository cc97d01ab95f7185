//! # symtab
//!
//! The symbol index: a flat, insertion-ordered table of named values built
//! on [`indexmap::IndexMap`].
//!
//! Each entry carries a `name`, a free-form `category` label, and a numeric
//! `value`. Names are unique: inserting an existing name is rejected rather
//! than silently shadowing the earlier entry. The table answers two queries:
//! exact resolution of a variable name, and case-insensitive substring search
//! over names and categories for autocomplete suggestions.
//!
//! ## Example
//! ```rust
//! # use tagcalc::{SymTab, SymbolEntry};
//! let mut st = SymTab::new();
//! st.insert(SymbolEntry::new("revenue", "Finance", 1200.0)).unwrap();
//! st.insert(SymbolEntry::new("cost", "Finance", 700.0)).unwrap();
//! assert_eq!(st.resolve("revenue"), Some(1200.0));
//! assert_eq!(st.resolve("profit"), None);
//!
//! let hits: Vec<_> = st.search("FIN").iter().map(|&e| e.name()).collect();
//! assert_eq!(hits, ["revenue", "cost"]);
//! ```

use crate::eval::Resolver;
use indexmap::{IndexMap, map::Entry};
use smartstring::alias::String;
use thiserror::Error;

/// Errors that can occur when operating on a [`SymTab`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymTabError {
    /// A symbol with this name is already present.
    #[error("duplicate symbol {name:?} (first defined at index {index})")]
    DuplicateSymbol {
        /// The rejected name.
        name: String,
        /// Index of the entry that already owns the name.
        index: usize,
    },

    /// No symbol with this name exists.
    #[error("unknown symbol {0:?}")]
    UnknownSymbol(String),
}

/// One row of the symbol index.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolEntry {
    name: String,
    category: String,
    value: f64,
}

impl SymbolEntry {
    pub fn new(name: impl AsRef<str>, category: impl AsRef<str>, value: f64) -> Self {
        Self {
            name: String::from(name.as_ref()),
            category: String::from(category.as_ref()),
            value,
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn category(&self) -> &str {
        self.category.as_str()
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Case-insensitive substring match on name or category.
    ///
    /// `needle` must already be lowercase.
    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.category.to_lowercase().contains(needle)
    }
}

/// An insertion-ordered symbol table mapping names to [`SymbolEntry`] rows.
///
/// Each inserted entry receives a stable index corresponding to its insertion
/// order. That order is also the order of [`search`](SymTab::search) results.
#[derive(Debug, Default, Clone)]
pub struct SymTab {
    tab: IndexMap<String, SymbolEntry>,
}

impl SymTab {
    /// Creates a new, empty symbol table.
    pub fn new() -> Self {
        Self {
            tab: IndexMap::new(),
        }
    }

    /// Builds a table from entries in order, failing on the first duplicate name.
    pub fn from_entries(
        entries: impl IntoIterator<Item = SymbolEntry>,
    ) -> Result<Self, SymTabError> {
        let mut st = Self::new();
        for entry in entries {
            st.insert(entry)?;
        }
        Ok(st)
    }

    /// Returns the number of entries currently stored in the symbol table.
    ///
    /// # Example
    /// ```rust
    /// # use tagcalc::{SymTab, SymbolEntry};
    /// let mut st = SymTab::new();
    /// assert_eq!(st.len(), 0);
    /// st.insert(SymbolEntry::new("pi", "Math", 3.14)).unwrap();
    /// assert_eq!(st.len(), 1);
    /// assert!(st.insert(SymbolEntry::new("pi", "Other", 3.0)).is_err());
    /// assert_eq!(st.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.tab.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tab.is_empty()
    }

    /// Inserts a new entry and returns its index.
    ///
    /// Returns [`SymTabError::DuplicateSymbol`] if the name already exists;
    /// the existing entry is left untouched.
    pub fn insert(&mut self, entry: SymbolEntry) -> Result<usize, SymTabError> {
        match self.tab.entry(entry.name.clone()) {
            Entry::Occupied(o) => {
                log::debug!("rejecting duplicate symbol {:?}", entry.name);
                Err(SymTabError::DuplicateSymbol {
                    name: entry.name,
                    index: o.index(),
                })
            }
            Entry::Vacant(v) => {
                let index = v.index();
                v.insert(entry);
                Ok(index)
            }
        }
    }

    /// Updates the value of an existing symbol.
    ///
    /// Variable tokens are re-resolved on every evaluation, so the new value
    /// is visible the next time a formula is evaluated.
    pub fn set_value(&mut self, name: &str, new_value: f64) -> Result<(), SymTabError> {
        let entry = self
            .tab
            .get_mut(name)
            .ok_or_else(|| SymTabError::UnknownSymbol(String::from(name)))?;
        entry.value = new_value;
        Ok(())
    }

    /// Returns the entry with exactly this name.
    pub fn lookup(&self, name: &str) -> Option<&SymbolEntry> {
        self.tab.get(name)
    }

    /// Returns the value of the symbol with exactly this name.
    pub fn resolve(&self, name: &str) -> Option<f64> {
        self.lookup(name).map(SymbolEntry::value)
    }

    /// Returns every entry whose name or category contains `query`,
    /// ignoring case, in insertion order.
    ///
    /// An empty query yields no suggestions. Results are recomputed on every
    /// call; nothing is cached.
    pub fn search(&self, query: &str) -> Vec<&SymbolEntry> {
        if query.is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        self.tab.values().filter(|e| e.matches(&needle)).collect()
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.tab.values()
    }
}

impl Resolver for SymTab {
    fn resolve(&self, name: &str) -> Option<f64> {
        SymTab::resolve(self, name)
    }
}
