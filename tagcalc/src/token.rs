//! # Formula Tokens
//!
//! This module defines the committed unit of a formula, the *tag*. It provides:
//!
//! - [`TokenKind`]: the three token categories (operator, number, variable),
//! - [`Operator`]: the seven single-character operator symbols,
//! - [`TokenId`] and [`TokenIdGen`]: session-unique, never-reused identifiers,
//! - [`Token`]: a validated `(id, kind, text)` triple.
//!
//! Tokens are produced by the tokenizer (or by a variable commit), stored in
//! the [`TokenStream`](crate::TokenStream), and consumed by the evaluator.
//! A [`Token`] can only be built through validating constructors, so its text
//! always matches the grammar of its kind.
use smartstring::alias::String;
use std::fmt;
use thiserror::Error;

/// The operator characters recognized by the tokenizer, in no particular order.
pub const OPERATOR_CHARS: [char; 7] = ['+', '-', '*', '/', '^', '(', ')'];

/// Errors raised when building or re-typing a [`Token`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The text does not match the grammar of the token's kind.
    #[error("invalid {kind} text {text:?}")]
    InvalidTokenText {
        /// The kind the text was validated against.
        kind: TokenKind,
        /// The rejected text.
        text: String,
    },

    /// No token with the given id exists in the stream.
    #[error("unknown token {0}")]
    UnknownToken(TokenId),
}

/// An opaque token identifier.
///
/// Identifiers are handed out by a [`TokenIdGen`] in strictly increasing order
/// and are never reused within a session, even after the token is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(u64);

impl TokenId {
    /// Returns the raw numeric value of this identifier.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A monotonic generator of [`TokenId`]s.
///
/// # Example
/// ```rust
/// # use tagcalc::TokenIdGen;
/// let mut ids = TokenIdGen::new();
/// let a = ids.next_id();
/// let b = ids.next_id();
/// assert!(a < b);
/// ```
#[derive(Debug, Default)]
pub struct TokenIdGen {
    next: u64,
}

impl TokenIdGen {
    /// Creates a generator whose first identifier is `#0`.
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Returns a fresh identifier.
    pub fn next_id(&mut self) -> TokenId {
        let id = TokenId(self.next);
        self.next += 1;
        id
    }
}

/// The category of a committed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenKind {
    /// One of the seven operator symbols, see [`OPERATOR_CHARS`].
    Operator = 0,

    /// A non-negative decimal integer literal (`^[0-9]+$`).
    Number = 1,

    /// A symbol name, resolved against the symbol index at evaluation time.
    Variable = 2,
}

impl TokenKind {
    /// Lowercase names of each kind, in declaration order.
    pub const STRS: &[&str] = &["operator", "number", "variable"];

    /// Returns `true` if `text` is a valid value for a token of this kind.
    ///
    /// # Example
    /// ```rust
    /// # use tagcalc::TokenKind;
    /// assert!(TokenKind::Number.accepts("007"));
    /// assert!(!TokenKind::Number.accepts("12a"));
    /// assert!(TokenKind::Operator.accepts("^"));
    /// assert!(TokenKind::Variable.accepts("revenue"));
    /// assert!(!TokenKind::Variable.accepts("a+b"));
    /// ```
    pub fn accepts(self, text: &str) -> bool {
        match self {
            TokenKind::Operator => Operator::try_from(text).is_ok(),
            TokenKind::Number => is_number_text(text),
            TokenKind::Variable => is_variable_name(text),
        }
    }

    /// Returns the kind whose grammar `text` matches, if any.
    ///
    /// The three grammars are disjoint, so at most one kind matches.
    pub fn classify(text: &str) -> Option<TokenKind> {
        [TokenKind::Operator, TokenKind::Number, TokenKind::Variable]
            .into_iter()
            .find(|kind| kind.accepts(text))
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(TokenKind::STRS[*self as usize])
    }
}

/// A single-character operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `+`
    Plus,
    /// `-`, binary subtraction or prefix negation depending on position.
    Minus,
    /// `*`
    Asterisk,
    /// `/`
    Slash,
    /// `^`, right-associative exponentiation.
    Caret,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
}

impl Operator {
    /// Maps an operator character to its [`Operator`].
    pub fn from_char(c: char) -> Option<Operator> {
        match c {
            '+' => Some(Operator::Plus),
            '-' => Some(Operator::Minus),
            '*' => Some(Operator::Asterisk),
            '/' => Some(Operator::Slash),
            '^' => Some(Operator::Caret),
            '(' => Some(Operator::LeftParen),
            ')' => Some(Operator::RightParen),
            _ => None,
        }
    }

    /// Returns the character this operator is written as.
    pub fn as_char(self) -> char {
        match self {
            Operator::Plus => '+',
            Operator::Minus => '-',
            Operator::Asterisk => '*',
            Operator::Slash => '/',
            Operator::Caret => '^',
            Operator::LeftParen => '(',
            Operator::RightParen => ')',
        }
    }
}

impl TryFrom<&str> for Operator {
    type Error = ();

    /// Accepts exactly one operator character.
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Operator::from_char(c).ok_or(()),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Returns `true` if `c` is one of the seven operator characters.
#[inline]
pub fn is_operator_char(c: char) -> bool {
    OPERATOR_CHARS.contains(&c)
}

/// Returns `true` if `s` is a non-empty run of ASCII decimal digits.
#[inline]
pub fn is_number_text(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Returns `true` if `s` can name a variable.
///
/// A name is non-empty, contains neither operator characters nor whitespace,
/// and is not a number literal.
pub fn is_variable_name(s: &str) -> bool {
    !s.is_empty()
        && !is_number_text(s)
        && !s.chars().any(|c| is_operator_char(c) || c.is_whitespace())
}

/// A committed formula token (a *tag*).
///
/// # Example
/// ```rust
/// # use tagcalc::{Token, TokenIdGen, TokenKind};
/// let mut ids = TokenIdGen::new();
/// let tok = Token::new(ids.next_id(), TokenKind::Number, "42").unwrap();
/// assert_eq!(tok.kind(), TokenKind::Number);
/// assert_eq!(tok.text(), "42");
///
/// assert!(Token::new(ids.next_id(), TokenKind::Number, "4x").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    id: TokenId,
    kind: TokenKind,
    text: String,
}

impl Token {
    /// Builds a token, validating `text` against the grammar of `kind`.
    pub fn new(id: TokenId, kind: TokenKind, text: impl AsRef<str>) -> Result<Self, TokenError> {
        let text = text.as_ref();
        if !kind.accepts(text) {
            return Err(TokenError::InvalidTokenText {
                kind,
                text: String::from(text),
            });
        }
        Ok(Self {
            id,
            kind,
            text: String::from(text),
        })
    }

    /// Builds an operator token. Infallible, since every [`Operator`] is valid.
    pub fn operator(id: TokenId, op: Operator) -> Self {
        let mut text = String::new();
        text.push(op.as_char());
        Self {
            id,
            kind: TokenKind::Operator,
            text,
        }
    }

    /// Builds a number token from a digit run the caller has already checked.
    pub(crate) fn number(id: TokenId, digits: &str) -> Self {
        debug_assert!(is_number_text(digits));
        Self {
            id,
            kind: TokenKind::Number,
            text: String::from(digits),
        }
    }

    pub fn id(&self) -> TokenId {
        self.id
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    /// Returns the operator this token denotes, or `None` for operands.
    pub fn as_operator(&self) -> Option<Operator> {
        match self.kind {
            TokenKind::Operator => Operator::try_from(self.text()).ok(),
            _ => None,
        }
    }

    /// Replaces the text in place, keeping `id` and `kind`.
    ///
    /// On failure the token is left untouched.
    pub(crate) fn set_text(&mut self, text: &str) -> Result<(), TokenError> {
        if !self.kind.accepts(text) {
            return Err(TokenError::InvalidTokenText {
                kind: self.kind,
                text: String::from(text),
            });
        }
        self.text = String::from(text);
        Ok(())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> TokenIdGen {
        TokenIdGen::new()
    }

    #[test]
    fn id_generator_never_repeats() {
        let mut g = ids();
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..100 {
            assert!(seen.insert(g.next_id()));
        }
        assert_eq!(seen.len(), 100);
    }

    #[test]
    fn number_grammar_accepts_digit_runs_only() {
        assert!(is_number_text("0"));
        assert!(is_number_text("000123"));
        assert!(!is_number_text(""));
        assert!(!is_number_text("-1"));
        assert!(!is_number_text("1.5"));
        assert!(!is_number_text("1e3"));
        assert!(!is_number_text("12a"));
    }

    #[test]
    fn variable_grammar_rejects_operators_whitespace_and_numbers() {
        assert!(is_variable_name("x"));
        assert!(is_variable_name("net_income"));
        assert!(is_variable_name("q3"));
        assert!(!is_variable_name(""));
        assert!(!is_variable_name("42"));
        assert!(!is_variable_name("a b"));
        assert!(!is_variable_name("a-b"));
        assert!(!is_variable_name("(x"));
    }

    #[test]
    fn every_operator_char_round_trips() {
        for c in OPERATOR_CHARS {
            let op = Operator::from_char(c).unwrap();
            assert_eq!(op.as_char(), c);
            assert!(is_operator_char(c));
        }
        assert!(Operator::from_char('%').is_none());
        assert!(Operator::try_from("++").is_err());
        assert!(Operator::try_from("").is_err());
    }

    #[test]
    fn classify_picks_the_single_matching_kind() {
        assert_eq!(TokenKind::classify("+"), Some(TokenKind::Operator));
        assert_eq!(TokenKind::classify("17"), Some(TokenKind::Number));
        assert_eq!(TokenKind::classify("price"), Some(TokenKind::Variable));
        assert_eq!(TokenKind::classify("1+"), None);
        assert_eq!(TokenKind::classify(""), None);
    }

    #[test]
    fn new_rejects_text_of_the_wrong_kind() {
        let mut g = ids();
        let err = Token::new(g.next_id(), TokenKind::Number, "12a").unwrap_err();
        assert!(matches!(
            err,
            TokenError::InvalidTokenText {
                kind: TokenKind::Number,
                ..
            }
        ));
        assert!(err.to_string().contains("invalid number text"));
        assert!(Token::new(g.next_id(), TokenKind::Operator, "%").is_err());
        assert!(Token::new(g.next_id(), TokenKind::Variable, "7").is_err());
    }

    #[test]
    fn set_text_keeps_identity_and_rejects_bad_text() {
        let mut g = ids();
        let mut tok = Token::new(g.next_id(), TokenKind::Number, "12").unwrap();
        let id = tok.id();

        tok.set_text("345").unwrap();
        assert_eq!(tok.text(), "345");
        assert_eq!(tok.id(), id);
        assert_eq!(tok.kind(), TokenKind::Number);

        assert!(tok.set_text("12a").is_err());
        assert_eq!(tok.text(), "345");
    }

    #[test]
    fn operator_tokens_expose_their_operator() {
        let mut g = ids();
        let tok = Token::operator(g.next_id(), Operator::Caret);
        assert_eq!(tok.text(), "^");
        assert_eq!(tok.as_operator(), Some(Operator::Caret));

        let num = Token::new(g.next_id(), TokenKind::Number, "1").unwrap();
        assert_eq!(num.as_operator(), None);
    }

    #[test]
    fn display_formats() {
        let mut g = ids();
        let id = g.next_id();
        assert_eq!(id.to_string(), "#0");
        assert_eq!(TokenKind::Variable.to_string(), "variable");
        assert_eq!(Token::operator(g.next_id(), Operator::LeftParen).to_string(), "(");
    }
}
