//! # Incremental Tokenizer
//!
//! Classifies each edit of the pending input and decides whether a token is
//! committed. The tokenizer owns the pending text and the [`TokenIdGen`]; it
//! never touches the token stream itself, it only hands committed tokens back
//! to its caller.
//!
//! ## Rules
//! Applied to the full new pending text after an edit, first match wins:
//!
//! 1. **Operator commit**: the last character is one of `+ - * / ^ ( )`.
//!    An operator token is emitted and the pending text is cleared. Any text
//!    in front of the operator is discarded.
//! 2. **Integer commit**: the whole text is a digit run. A number token is
//!    emitted.
//! 3. **No match**: the text becomes the pending input.
//!
//! At most one token is emitted per call, and pending input is empty after
//! every commit. Callers that want the text in front of an operator kept must
//! commit it themselves first (see [`FormulaSession::type_keys`]).
//!
//! [`FormulaSession::type_keys`]: crate::FormulaSession::type_keys

use crate::token::{Operator, Token, TokenError, TokenIdGen, TokenKind, is_number_text};
use smartstring::alias::String;

/// The incremental tokenizer state: pending input plus the id generator.
#[derive(Debug, Default)]
pub struct Tokenizer {
    pending: String,
    ids: TokenIdGen,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            pending: String::new(),
            ids: TokenIdGen::new(),
        }
    }

    /// The not-yet-committed text.
    pub fn pending(&self) -> &str {
        self.pending.as_str()
    }

    /// Discards the pending text without committing anything.
    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    /// Applies one edit, given as the full new pending text, and returns the
    /// committed token, if any.
    ///
    /// # Example
    /// ```rust
    /// # use tagcalc::{Tokenizer, TokenKind};
    /// let mut tz = Tokenizer::new();
    ///
    /// assert!(tz.apply("pri").is_none());
    /// assert_eq!(tz.pending(), "pri");
    ///
    /// let op = tz.apply("pri*").unwrap();
    /// assert_eq!(op.text(), "*");
    /// assert_eq!(tz.pending(), "");
    ///
    /// assert_eq!(tz.apply("12").unwrap().kind(), TokenKind::Number);
    /// ```
    pub fn apply(&mut self, new_pending: &str) -> Option<Token> {
        if let Some(op) = new_pending.chars().last().and_then(Operator::from_char) {
            // Rule 1
            let head = &new_pending[..new_pending.len() - op.as_char().len_utf8()];
            if !head.trim().is_empty() {
                log::debug!("discarding {:?} in front of {:?}", head, op.as_char());
            }
            self.pending.clear();
            let token = Token::operator(self.ids.next_id(), op);
            log::trace!("Rule operator {:?} -> {}", op, token.id());
            return Some(token);
        }
        if is_number_text(new_pending) {
            // Rule 2
            self.pending.clear();
            let token = Token::number(self.ids.next_id(), new_pending);
            log::trace!("Rule number {:?} -> {}", new_pending, token.id());
            return Some(token);
        }
        // Rule 3
        log::trace!("Rule pending {:?}", new_pending);
        self.pending = String::from(new_pending);
        None
    }

    /// Builds a variable token with a fresh id. Does not touch pending text.
    pub(crate) fn variable(&mut self, name: &str) -> Result<Token, TokenError> {
        Token::new(self.ids.next_id(), TokenKind::Variable, name)
    }
}
