//! # Formula Error Type
//!
//! This module defines [`FormulaError`], a unified error enum for the formula
//! pipeline. It aggregates failures from:
//!
//! - **Token edits** (re-typing or committing a tag),
//! - **Evaluation** (structurally invalid formulas),
//! - **Symbol-table operations** (inserts and updates),
//! - **Catalog loading** (malformed catalog lines).
//!
//! Conversions from the underlying error types are derived with `#[from]`,
//! enabling ergonomic propagation via the `?` operator in functions that
//! return `Result<T, FormulaError>`.
use crate::catalog::CatalogError;
use crate::eval::EvalError;
use crate::symtab::SymTabError;
use crate::token::TokenError;
use thiserror::Error;

/// Represents all possible errors that can occur within the formula core.
///
/// # Examples
/// Propagating an evaluation failure:
/// ```rust
/// # use tagcalc::{EvalError, FormulaError, FormulaSession, SymTab};
/// # fn demo(session: &FormulaSession, symtab: &SymTab) -> Result<f64, FormulaError> {
/// let value = session.evaluate(symtab)?; // EvalError -> FormulaError via #[from]
/// # Ok(value) }
/// let err = demo(&FormulaSession::new(), &SymTab::new()).unwrap_err();
/// assert!(matches!(err, FormulaError::Eval(EvalError::EmptyExpression)));
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// A token could not be created or re-typed.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// The formula could not be evaluated.
    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),

    /// A symbol-table operation failed.
    #[error("symtab error: {0}")]
    SymTab(#[from] SymTabError),

    /// The symbol catalog could not be loaded.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}
