//! # tagcalc
//!
//! An incremental formula builder: raw keystrokes are classified on the fly
//! into *tags* (numbers, operators, variables), and the resulting tag list is
//! evaluated to a number on demand, with variables resolved against a symbol
//! catalog.
//!
//! ## Overview
//!
//! The crate defines the following components:
//!
//! - [`token`] — the tag type ([`Token`]), its kinds and operators, and the
//!   session-unique [`TokenId`] generator.
//! - [`tokenizer`] — the incremental [`Tokenizer`] that turns each edit of
//!   the pending input into at most one committed token.
//! - [`stream`] — the ordered, editable [`TokenStream`].
//! - [`parser`] — a shift-reduce parser from tokens to a postfix [`Expr`].
//! - [`eval`] — evaluation of the program through a [`Resolver`], with typed
//!   [`EvalError`]s for malformed formulas.
//! - [`symtab`] — the symbol index ([`SymTab`]) used for variable values and
//!   autocomplete search.
//! - [`catalog`] — loading a [`SymTab`] from a plain-text catalog.
//! - [`session`] — [`FormulaSession`], the owned state object a user
//!   interface drives.
//!
//! ## Example
//!
//! ```rust
//! use tagcalc::{FormulaSession, SymTab, SymbolEntry, TokenKind};
//!
//! let mut symtab = SymTab::new();
//! symtab.insert(SymbolEntry::new("hours", "Timesheet", 37.5)).unwrap();
//!
//! let mut session = FormulaSession::new();
//! session.type_keys("(hours+2)*4").unwrap();
//!
//! let kinds: Vec<TokenKind> = session.tokens().iter().map(|t| t.kind()).collect();
//! assert_eq!(kinds[1], TokenKind::Variable);
//! assert_eq!(session.evaluate(&symtab), Ok(158.0));
//! ```
//!
//! ## Re-exports
//!
//! The main entry points are re-exported at the crate root:
//!
//! ```text
//! FormulaSession, InputChange, Tokenizer, TokenStream, Step,
//! Token, TokenId, TokenIdGen, TokenKind, Operator, TokenError,
//! SymTab, SymbolEntry, SymTabError, evaluate, parse, Expr, BinOp,
//! Resolver, EvalError, parse_catalog, CatalogError, FormulaError
//! ```
pub mod catalog;
pub mod error;
pub mod eval;
pub mod parser;
pub mod session;
pub mod stream;
pub mod symtab;
pub mod token;
pub mod tokenizer;

pub use catalog::{CatalogError, parse_catalog};
pub use error::FormulaError;
pub use eval::{EvalError, Resolver, evaluate};
pub use parser::{BinOp, Expr, Step, parse};
pub use session::{BACKSPACE, FormulaSession, InputChange};
pub use stream::TokenStream;
pub use symtab::{SymTab, SymTabError, SymbolEntry};
pub use token::{Operator, Token, TokenError, TokenId, TokenIdGen, TokenKind};
pub use tokenizer::Tokenizer;
