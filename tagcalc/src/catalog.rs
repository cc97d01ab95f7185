//! # Symbol Catalog Loader
//!
//! Builds a [`SymTab`] from a plain-text catalog with one entry per line:
//!
//! ```text
//! # name,category,value
//! revenue,Finance,1200
//! tax_rate,Finance / Policy,0.2
//! ```
//!
//! The name is the text before the first comma and the value is the text
//! after the last comma; everything in between is the category, which may
//! itself contain commas. Blank lines and lines starting with `#` are
//! ignored. A value that is not a number is loaded as `0`.
use crate::symtab::{SymTab, SymTabError, SymbolEntry};
use crate::token::is_variable_name;
use smartstring::alias::String;
use thiserror::Error;

/// Errors raised while loading a catalog. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The line has fewer than three comma-separated fields.
    #[error("line {line}: expected `name,category,value`")]
    MissingField { line: usize },

    /// The name cannot be referenced by a variable token.
    #[error("line {line}: invalid symbol name {name:?}")]
    InvalidName { line: usize, name: String },

    /// The name was already defined by an earlier line.
    #[error("line {line}: {source}")]
    Duplicate {
        line: usize,
        #[source]
        source: SymTabError,
    },
}

/// Coerces a catalog value to a number, falling back to `0`.
///
/// # Example
/// ```rust
/// # use tagcalc::catalog::coerce_value;
/// assert_eq!(coerce_value(" 12.5 "), 12.5);
/// assert_eq!(coerce_value("n/a"), 0.0);
/// ```
pub fn coerce_value(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            log::debug!("non-numeric catalog value {:?}, using 0", raw);
            0.0
        }
    }
}

/// Parses a whole catalog into a symbol table, keeping line order.
///
/// # Example
/// ```rust
/// # use tagcalc::catalog::parse_catalog;
/// let st = parse_catalog("# demo\nwidth,Geometry,3\nheight,Geometry,4\n").unwrap();
/// assert_eq!(st.len(), 2);
/// assert_eq!(st.resolve("height"), Some(4.0));
/// ```
pub fn parse_catalog(text: &str) -> Result<SymTab, CatalogError> {
    let mut symtab = SymTab::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let raw = raw.trim();
        if raw.is_empty() || raw.starts_with('#') {
            continue;
        }
        let entry = parse_line(line, raw)?;
        symtab
            .insert(entry)
            .map_err(|source| CatalogError::Duplicate { line, source })?;
    }
    log::debug!("loaded {} catalog entries", symtab.len());
    Ok(symtab)
}

fn parse_line(line: usize, raw: &str) -> Result<SymbolEntry, CatalogError> {
    let (name, rest) = raw
        .split_once(',')
        .ok_or(CatalogError::MissingField { line })?;
    let (category, value) = rest
        .rsplit_once(',')
        .ok_or(CatalogError::MissingField { line })?;
    let name = name.trim();
    if !is_variable_name(name) {
        return Err(CatalogError::InvalidName {
            line,
            name: String::from(name),
        });
    }
    Ok(SymbolEntry::new(name, category.trim(), coerce_value(value)))
}
