//! # Formula Parser
//!
//! A shift-reduce operator-precedence parser that turns a committed token
//! sequence into an [`Expr`]: a postfix program of [`Step`]s. Tokens are
//! already classified by the tokenizer, so there is no separate lexing pass.
//!
//! ## Grammar
//! From loosest to tightest binding:
//! ```text
//! Expr   -> Term (('+' | '-') Term)*
//! Term   -> Power (('*' | '/') Power)*
//! Power  -> Factor ('^' Power)?
//! Factor -> number | ident | '(' Expr ')' | '-' Factor
//! ```
//!
//! ## Behavior highlights
//! - `+ - * /` are left-associative; `^` is right-associative, so
//!   `2 ^ 3 ^ 2` is `2 ^ (3 ^ 2)`.
//! - A `-` wherever an operand is expected is prefix negation. Negation binds
//!   tighter than `^`: `-2 ^ 2` is `(-2) ^ 2`.
//! - Parenthesis balance is checked before parsing, so an unmatched `(` or
//!   `)` is always reported as [`EvalError::UnbalancedParentheses`].
//! - Variables are kept by name; values are looked up only when the program
//!   is evaluated.
//! - Parsing, evaluation and display all run on explicit stacks, so nesting
//!   depth is bounded by memory rather than by the call stack.

use crate::eval::EvalError;
use crate::token::{Operator, Token, TokenKind};
use std::fmt;

/// A binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinOp {
    /// Applies the operator with IEEE-754 semantics (no trapping on `/ 0`).
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinOp::Add => lhs + rhs,
            BinOp::Sub => lhs - rhs,
            BinOp::Mul => lhs * rhs,
            BinOp::Div => lhs / rhs,
            BinOp::Pow => lhs.powf(rhs),
        }
    }

    /// Maps an infix operator token to its [`BinOp`]; parentheses have none.
    pub fn from_operator(op: Operator) -> Option<BinOp> {
        match op {
            Operator::Plus => Some(BinOp::Add),
            Operator::Minus => Some(BinOp::Sub),
            Operator::Asterisk => Some(BinOp::Mul),
            Operator::Slash => Some(BinOp::Div),
            Operator::Caret => Some(BinOp::Pow),
            Operator::LeftParen | Operator::RightParen => None,
        }
    }

    fn as_operator(self) -> Operator {
        match self {
            BinOp::Add => Operator::Plus,
            BinOp::Sub => Operator::Minus,
            BinOp::Mul => Operator::Asterisk,
            BinOp::Div => Operator::Slash,
            BinOp::Pow => Operator::Caret,
        }
    }

    fn prec(self) -> u8 {
        match self {
            BinOp::Add | BinOp::Sub => 1,
            BinOp::Mul | BinOp::Div => 2,
            BinOp::Pow => 3,
        }
    }

    fn is_right_assoc(self) -> bool {
        self == BinOp::Pow
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_operator())
    }
}

/// One instruction of a postfix [`Expr`] program.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step<'a> {
    /// Pushes a number literal, widened to `f64`.
    Number(f64),

    /// Pushes the value of a variable, resolved at evaluation time.
    Variable(&'a str),

    /// Negates the top operand.
    Neg,

    /// Pops the right then the left operand and pushes the result.
    Binary(BinOp),
}

/// A parsed formula in postfix order, borrowing variable names from the
/// token stream.
///
/// Only [`parse`] builds an `Expr`, so every program is well-formed: each
/// step finds the operands it needs and exactly one value is left at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr<'a> {
    steps: Vec<Step<'a>>,
}

impl<'a> Expr<'a> {
    /// The program in evaluation order.
    pub fn steps(&self) -> &[Step<'a>] {
        &self.steps
    }
}

impl fmt::Display for Expr<'_> {
    /// Writes the tree fully parenthesized, e.g. `(2 ^ (3 ^ 2))`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack: Vec<String> = Vec::new();
        for step in &self.steps {
            let text = match *step {
                Step::Number(n) => n.to_string(),
                Step::Variable(name) => name.to_owned(),
                Step::Neg => format!("-{}", stack.pop().ok_or(fmt::Error)?),
                Step::Binary(op) => {
                    let rhs = stack.pop().ok_or(fmt::Error)?;
                    let lhs = stack.pop().ok_or(fmt::Error)?;
                    format!("({} {} {})", lhs, op, rhs)
                }
            };
            stack.push(text);
        }
        f.write_str(stack.last().ok_or(fmt::Error)?)
    }
}

/// Parses a token sequence into an [`Expr`].
///
/// # Errors
/// - [`EvalError::EmptyExpression`] for zero tokens,
/// - [`EvalError::UnbalancedParentheses`] for any unmatched `(` or `)`,
/// - [`EvalError::UnexpectedToken`] when an operand is required but an
///   operator (other than prefix `-`) or the end of the stream is found, or
///   when two operands are adjacent.
///
/// # Example
/// ```rust
/// # use tagcalc::{parse, Token, TokenIdGen, TokenKind};
/// let mut ids = TokenIdGen::new();
/// let tokens: Vec<Token> = ["2", "^", "3", "^", "2"]
///     .into_iter()
///     .map(|t| Token::new(ids.next_id(), TokenKind::classify(t).unwrap(), t).unwrap())
///     .collect();
/// assert_eq!(parse(&tokens).unwrap().to_string(), "(2 ^ (3 ^ 2))");
/// ```
pub fn parse(tokens: &[Token]) -> Result<Expr<'_>, EvalError> {
    if tokens.is_empty() {
        return Err(EvalError::EmptyExpression);
    }
    check_balance(tokens)?;

    let mut parser = FormulaParser {
        steps: Vec::with_capacity(tokens.len()),
        stack: Vec::new(),
    };
    let mut want_operand = true;
    for (pos, tok) in tokens.iter().enumerate() {
        let unexpected = EvalError::UnexpectedToken {
            position: Some(pos),
        };
        if want_operand {
            match tok.kind() {
                TokenKind::Number => {
                    // Factor -> number
                    let value = tok.text().parse::<f64>().map_err(|_| unexpected)?;
                    parser.steps.push(Step::Number(value));
                    want_operand = false;
                }
                TokenKind::Variable => {
                    // Factor -> ident
                    parser.steps.push(Step::Variable(tok.text()));
                    want_operand = false;
                }
                TokenKind::Operator => match tok.as_operator() {
                    Some(Operator::LeftParen) => parser.stack.push(Frame::Open),
                    Some(Operator::Minus) => parser.stack.push(Frame::Neg),
                    _ => return Err(unexpected),
                },
            }
        } else {
            match tok.as_operator() {
                Some(Operator::RightParen) => parser.close()?,
                Some(op) => {
                    let op = BinOp::from_operator(op).ok_or(unexpected)?;
                    parser.shift(op);
                    want_operand = true;
                }
                None => return Err(unexpected),
            }
        }
    }
    if want_operand {
        return Err(EvalError::UnexpectedToken { position: None });
    }

    let expr = parser.finish()?;
    if log::log_enabled!(log::Level::Trace) {
        log::trace!("Accept {}", expr);
    }
    Ok(expr)
}

/// Verifies that every `(` has a matching `)` and no `)` closes nothing.
fn check_balance(tokens: &[Token]) -> Result<(), EvalError> {
    let mut depth: usize = 0;
    for op in tokens.iter().filter_map(Token::as_operator) {
        match op {
            Operator::LeftParen => depth += 1,
            Operator::RightParen => {
                depth = depth
                    .checked_sub(1)
                    .ok_or(EvalError::UnbalancedParentheses)?;
            }
            _ => (),
        }
    }
    if depth != 0 {
        return Err(EvalError::UnbalancedParentheses);
    }
    Ok(())
}

/// An operator waiting on the parser stack for its right operand.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Frame {
    Open,
    Neg,
    Binary(BinOp),
}

struct FormulaParser<'a> {
    steps: Vec<Step<'a>>,
    stack: Vec<Frame>,
}

impl<'a> FormulaParser<'a> {
    /// Reduces every stacked operator that binds at least as tightly as
    /// `op`, then shifts `op`.
    fn shift(&mut self, op: BinOp) {
        while let Some(&top) = self.stack.last() {
            let reduce = match top {
                Frame::Open => false,
                Frame::Neg => true,
                Frame::Binary(prev) => {
                    prev.prec() > op.prec() || (prev.prec() == op.prec() && !op.is_right_assoc())
                }
            };
            if !reduce {
                break;
            }
            self.stack.pop();
            self.reduce(top);
        }
        self.stack.push(Frame::Binary(op));
    }

    /// Reduces up to and including the innermost `(`.
    fn close(&mut self) -> Result<(), EvalError> {
        loop {
            match self.stack.pop() {
                Some(Frame::Open) => {
                    log::trace!("Reduce Factor -> ( Expr )");
                    return Ok(());
                }
                Some(frame) => self.reduce(frame),
                None => return Err(EvalError::UnbalancedParentheses),
            }
        }
    }

    /// Reduces everything left on the stack once the input is consumed.
    fn finish(mut self) -> Result<Expr<'a>, EvalError> {
        while let Some(frame) = self.stack.pop() {
            if frame == Frame::Open {
                return Err(EvalError::UnbalancedParentheses);
            }
            self.reduce(frame);
        }
        Ok(Expr { steps: self.steps })
    }

    fn reduce(&mut self, frame: Frame) {
        match frame {
            Frame::Neg => {
                log::trace!("Reduce Factor -> - Factor");
                self.steps.push(Step::Neg);
            }
            Frame::Binary(op) => {
                log::trace!("Reduce Expr -> Expr {} Expr", op);
                self.steps.push(Step::Binary(op));
            }
            Frame::Open => (),
        }
    }
}
