//! # Formula Evaluation
//!
//! Evaluates a committed token sequence to an `f64`. Every call parses the
//! tokens from scratch (see [`crate::parser`]) and resolves variables through
//! a [`Resolver`]; nothing is cached between calls.
//!
//! Arithmetic is plain IEEE-754 double precision. Division by zero yields
//! `inf`, `-inf` or `NaN` rather than an error. A variable the resolver does
//! not know evaluates to `0`; that default applies to unknown names only and
//! never to a structurally broken formula, which is always an [`EvalError`].
use crate::parser::{Expr, Step, parse};
use crate::token::Token;
use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasher;
use thiserror::Error;

/// Structural reasons a token sequence cannot be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EvalError {
    /// A `(` without a matching `)`, or a `)` that closes nothing.
    #[error("unbalanced parentheses")]
    UnbalancedParentheses,

    /// An operator (or the end of the formula) where an operand was required,
    /// or an operand directly following another operand.
    ///
    /// `position` is the index of the offending token in the stream, or
    /// `None` if the formula ended early.
    #[error("unexpected {}", At(.position))]
    UnexpectedToken { position: Option<usize> },

    /// The formula has no tokens.
    #[error("empty expression")]
    EmptyExpression,
}

/// Formats an [`EvalError::UnexpectedToken`] position.
struct At<'a>(&'a Option<usize>);

impl fmt::Display for At<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(i) => write!(f, "token at position {}", i),
            None => f.write_str("end of formula"),
        }
    }
}

/// A source of variable values.
///
/// The evaluator only ever reads from a resolver, and reads it afresh on
/// every evaluation.
pub trait Resolver {
    /// Returns the value bound to `name`, or `None` if it is unknown.
    fn resolve(&self, name: &str) -> Option<f64>;
}

impl<S: BuildHasher> Resolver for HashMap<std::string::String, f64, S> {
    fn resolve(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl Expr<'_> {
    /// Runs the program on a value stack, resolving variables through
    /// `resolver`.
    pub fn eval<R: Resolver + ?Sized>(&self, resolver: &R) -> f64 {
        // A parsed program never underflows; NaN marks a broken invariant.
        fn pop(stack: &mut Vec<f64>) -> f64 {
            stack.pop().unwrap_or(f64::NAN)
        }

        let mut stack: Vec<f64> = Vec::new();
        for step in self.steps() {
            let value = match *step {
                Step::Number(n) => n,
                Step::Variable(name) => resolver.resolve(name).unwrap_or_else(|| {
                    log::debug!("unresolved variable {:?}, using 0", name);
                    0.0
                }),
                Step::Neg => -pop(&mut stack),
                Step::Binary(op) => {
                    let rhs = pop(&mut stack);
                    let lhs = pop(&mut stack);
                    op.apply(lhs, rhs)
                }
            };
            stack.push(value);
        }
        pop(&mut stack)
    }
}

/// Parses and evaluates `tokens`.
///
/// # Example
/// ```rust
/// # use tagcalc::{evaluate, EvalError, SymTab, SymbolEntry, Token, TokenIdGen, TokenKind};
/// let mut ids = TokenIdGen::new();
/// let mut tokenize = |texts: &[&str]| -> Vec<Token> {
///     texts
///         .iter()
///         .map(|t| Token::new(ids.next_id(), TokenKind::classify(t).unwrap(), t).unwrap())
///         .collect()
/// };
/// let mut symtab = SymTab::new();
/// symtab.insert(SymbolEntry::new("x", "Demo", 5.0)).unwrap();
///
/// assert_eq!(evaluate(&tokenize(&["3", "+", "4", "*", "2"]), &symtab), Ok(11.0));
/// assert_eq!(evaluate(&tokenize(&["x", "*", "2"]), &symtab), Ok(10.0));
/// assert_eq!(evaluate(&tokenize(&["(", "2"]), &symtab), Err(EvalError::UnbalancedParentheses));
/// ```
pub fn evaluate<R: Resolver + ?Sized>(tokens: &[Token], resolver: &R) -> Result<f64, EvalError> {
    let expr = parse(tokens)?;
    let value = expr.eval(resolver);
    log::trace!("Eval {} = {}", expr, value);
    Ok(value)
}
