//! # Formula Session
//!
//! [`FormulaSession`] is the single owner of a formula's mutable state: the
//! committed [`TokenStream`] and the pending input held by the [`Tokenizer`].
//! A presentation layer drives it with one call per user action and reads
//! back the tokens, the pending text, and the evaluated result.
//!
//! The symbol table is not owned by the session. It is passed by reference
//! to the operations that read it, so a catalog refresh is picked up by the
//! next evaluation.
//!
//! ## Example
//! ```rust
//! # use tagcalc::{FormulaSession, SymTab, SymbolEntry};
//! let symtab = SymTab::from_entries([SymbolEntry::new("price", "Sales", 2.5)]).unwrap();
//! let mut session = FormulaSession::new();
//!
//! session.apply_input_change("4");
//! session.apply_input_change("*");
//! session.apply_input_change("pr");
//! let pick = session.search_suggestions(&symtab, session.pending())[0].clone();
//! session.select_suggestion(&pick).unwrap();
//!
//! assert_eq!(session.tokens().to_string(), "4 * price");
//! assert_eq!(session.evaluate(&symtab), Ok(10.0));
//! ```

use crate::error::FormulaError;
use crate::eval::{EvalError, Resolver, evaluate};
use crate::stream::TokenStream;
use crate::symtab::{SymTab, SymbolEntry};
use crate::token::{Token, TokenError, TokenId, is_operator_char};
use crate::tokenizer::Tokenizer;
use smartstring::alias::String;

/// Backspace, as delivered by [`FormulaSession::type_keys`].
pub const BACKSPACE: char = '\u{8}';

/// The outcome of [`FormulaSession::apply_input_change`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputChange {
    /// Pending input after the change; empty whenever a token was committed.
    pub pending: String,
    /// The token committed by the edit, if any.
    pub emitted: Option<Token>,
}

/// Owned formula state: token stream plus pending input.
#[derive(Debug, Default)]
pub struct FormulaSession {
    tokenizer: Tokenizer,
    stream: TokenStream,
}

impl FormulaSession {
    /// Creates a session with no tokens and no pending input.
    pub fn new() -> Self {
        Self {
            tokenizer: Tokenizer::new(),
            stream: TokenStream::new(),
        }
    }

    /// The not-yet-committed text.
    pub fn pending(&self) -> &str {
        self.tokenizer.pending()
    }

    /// The committed tokens in evaluation order.
    pub fn tokens(&self) -> &TokenStream {
        &self.stream
    }

    /// Feeds the full new pending text after one edit.
    ///
    /// At most one token is committed, and it is appended to the stream
    /// before this returns.
    pub fn apply_input_change(&mut self, new_pending: &str) -> InputChange {
        let emitted = self.tokenizer.apply(new_pending);
        if let Some(token) = &emitted {
            self.stream.append(token.clone());
        }
        InputChange {
            pending: String::from(self.tokenizer.pending()),
            emitted,
        }
    }

    /// Backspace with nothing pending removes the last committed token.
    ///
    /// With pending text this is a no-op that returns `None`: editing the
    /// pending text is up to the caller.
    pub fn delete_backward(&mut self) -> Option<Token> {
        if !self.pending().is_empty() {
            return None;
        }
        self.stream.remove_last()
    }

    /// Re-types a committed token in place, keeping its id and kind.
    pub fn replace_token_text(&mut self, id: TokenId, new_text: &str) -> Result<(), TokenError> {
        self.stream.replace_text(id, new_text)
    }

    /// Removes a committed token. Returns `false` if no token has this id.
    pub fn remove_token(&mut self, id: TokenId) -> bool {
        self.stream.remove(id).is_some()
    }

    /// Commits `name` as a variable token and clears the pending input.
    ///
    /// On error nothing changes, including the pending input.
    pub fn commit_variable(&mut self, name: &str) -> Result<Token, TokenError> {
        let token = self.tokenizer.variable(name)?;
        self.tokenizer.clear_pending();
        self.stream.append(token.clone());
        Ok(token)
    }

    /// Commits a picked autocomplete suggestion as a variable token.
    pub fn select_suggestion(&mut self, entry: &SymbolEntry) -> Result<Token, TokenError> {
        self.commit_variable(entry.name())
    }

    /// Evaluates the committed tokens against `resolver`.
    pub fn evaluate<R: Resolver + ?Sized>(&self, resolver: &R) -> Result<f64, EvalError> {
        evaluate(self.stream.as_slice(), resolver)
    }

    /// Autocomplete suggestions for `query`, see [`SymTab::search`].
    pub fn search_suggestions<'s>(&self, symtab: &'s SymTab, query: &str) -> Vec<&'s SymbolEntry> {
        symtab.search(query)
    }

    /// Resets the stream and the pending input together.
    ///
    /// Token ids keep increasing across a reset.
    pub fn clear(&mut self) {
        self.stream.clear();
        self.tokenizer.clear_pending();
    }

    /// Replays keystrokes as a text field would deliver them.
    ///
    /// A run of digits typed with nothing pending is buffered and applied as
    /// one edit once a non-digit (or the end of `keys`) arrives, so `12`
    /// commits a single number. A name still pending when whitespace, an
    /// operator, or the end of `keys` arrives is committed as a variable,
    /// standing in for picking it from the suggestion list. Every other
    /// character is appended to the pending text and applied as one edit.
    /// [`BACKSPACE`] deletes the last buffered digit or pending character, or
    /// the last token when nothing is pending.
    ///
    /// # Example
    /// ```rust
    /// # use tagcalc::FormulaSession;
    /// let mut session = FormulaSession::new();
    /// session.type_keys("(a+2)*b").unwrap();
    /// assert_eq!(session.tokens().to_string(), "( a + 2 ) * b");
    /// assert_eq!(session.pending(), "");
    /// ```
    pub fn type_keys(&mut self, keys: &str) -> Result<(), FormulaError> {
        let mut digits = String::new();
        for key in keys.chars() {
            if key.is_ascii_digit() && self.pending().is_empty() {
                digits.push(key);
                continue;
            }
            if key == BACKSPACE && digits.pop().is_some() {
                continue;
            }
            self.flush_digits(&mut digits);
            match key {
                BACKSPACE => {
                    let mut text = String::from(self.pending());
                    if text.pop().is_some() {
                        self.apply_input_change(&text);
                    } else {
                        self.delete_backward();
                    }
                }
                c if c.is_whitespace() => self.commit_pending()?,
                c if is_operator_char(c) => {
                    self.commit_pending()?;
                    self.apply_input_change(c.encode_utf8(&mut [0; 4]));
                }
                c => {
                    let mut text = String::from(self.pending());
                    text.push(c);
                    self.apply_input_change(&text);
                }
            }
        }
        self.flush_digits(&mut digits);
        self.commit_pending()
    }

    fn flush_digits(&mut self, digits: &mut String) {
        if !digits.is_empty() {
            self.apply_input_change(digits);
            digits.clear();
        }
    }

    fn commit_pending(&mut self) -> Result<(), FormulaError> {
        let name = String::from(self.pending().trim());
        if !name.is_empty() {
            self.commit_variable(&name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    fn symtab() -> SymTab {
        SymTab::from_entries([
            SymbolEntry::new("revenue", "Finance", 1200.0),
            SymbolEntry::new("cost", "Finance", 700.0),
            SymbolEntry::new("headcount", "HR", 12.0),
        ])
        .unwrap()
    }

    fn typed(keys: &str) -> FormulaSession {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut session = FormulaSession::new();
        session.type_keys(keys).unwrap();
        session
    }

    #[test]
    fn new_session_is_empty() {
        let session = FormulaSession::new();
        assert!(session.tokens().is_empty());
        assert_eq!(session.pending(), "");
        assert_eq!(
            session.evaluate(&symtab()),
            Err(EvalError::EmptyExpression)
        );
    }

    #[test]
    fn apply_input_change_reports_and_appends() {
        let mut session = FormulaSession::new();

        let change = session.apply_input_change("rev");
        assert_eq!(change.pending.as_str(), "rev");
        assert!(change.emitted.is_none());
        assert!(session.tokens().is_empty());

        let change = session.apply_input_change("42");
        assert_eq!(change.pending.as_str(), "");
        assert_eq!(change.emitted.as_ref().unwrap().text(), "42");
        assert_eq!(session.tokens().len(), 1);

        let change = session.apply_input_change("x+");
        assert_eq!(change.pending.as_str(), "");
        assert_eq!(change.emitted.as_ref().unwrap().text(), "+");
        assert_eq!(session.tokens().to_string(), "42 +");
    }

    #[test]
    fn one_edit_commits_at_most_one_token() {
        let mut session = FormulaSession::new();
        for edit in ["rev", "rev+", "1", "(", "x", "x)", "x*", "7"] {
            let before = session.tokens().len();
            session.apply_input_change(edit);
            assert!(session.tokens().len() - before <= 1, "edit {:?}", edit);
        }
        assert_eq!(session.tokens().to_string(), "+ 1 ( ) * 7");
    }

    #[test]
    fn delete_backward_with_empty_pending_removes_last_token() {
        let mut session = typed("1+2");
        let removed = session.delete_backward().unwrap();
        assert_eq!(removed.text(), "2");
        assert_eq!(session.tokens().to_string(), "1 +");
    }

    #[test]
    fn delete_backward_on_empty_stream_is_noop() {
        let mut session = FormulaSession::new();
        assert!(session.delete_backward().is_none());
        assert!(session.tokens().is_empty());
    }

    #[test]
    fn delete_backward_never_removes_tokens_while_pending() {
        let mut session = typed("1+");
        session.apply_input_change("rev");
        assert!(session.delete_backward().is_none());
        assert_eq!(session.tokens().len(), 2);
        assert_eq!(session.pending(), "rev");
    }

    #[test]
    fn replace_token_text_validates_and_keeps_identity() {
        let mut session = FormulaSession::new();
        for edit in ["12", "*", "3"] {
            session.apply_input_change(edit);
        }
        let first = session.tokens().as_slice()[0].clone();

        assert!(matches!(
            session.replace_token_text(first.id(), "12a"),
            Err(TokenError::InvalidTokenText { .. })
        ));
        assert_eq!(session.tokens().get(first.id()).unwrap().text(), "12");

        session.replace_token_text(first.id(), "5").unwrap();
        let now = session.tokens().get(first.id()).unwrap();
        assert_eq!(now.text(), "5");
        assert_eq!(now.kind(), TokenKind::Number);
        assert_eq!(session.evaluate(&symtab()), Ok(15.0));
    }

    #[test]
    fn retyping_an_operator_changes_the_result() {
        let mut session = typed("6-2");
        let minus = session.tokens().as_slice()[1].id();
        session.replace_token_text(minus, "/").unwrap();
        assert_eq!(session.evaluate(&symtab()), Ok(3.0));
    }

    #[test]
    fn remove_token_reports_whether_it_existed() {
        let mut session = typed("1+2");
        let plus = session.tokens().as_slice()[1].id();
        assert!(session.remove_token(plus));
        assert!(!session.remove_token(plus));
        assert_eq!(session.tokens().to_string(), "1 2");
        assert_eq!(
            session.evaluate(&symtab()),
            Err(EvalError::UnexpectedToken { position: Some(1) })
        );
    }

    #[test]
    fn ids_are_not_reused_after_removal_or_clear() {
        let mut session = typed("1+2");
        let last = session.delete_backward().unwrap().id();
        session.apply_input_change("3");
        let fresh = session.tokens().last().unwrap().id();
        assert!(fresh > last);

        session.clear();
        session.apply_input_change("4");
        assert!(session.tokens().last().unwrap().id() > fresh);
    }

    #[test]
    fn selecting_a_suggestion_commits_a_variable() {
        let st = symtab();
        let mut session = typed("2*");
        session.apply_input_change("fin");

        let hits = session.search_suggestions(&st, session.pending());
        assert_eq!(hits.len(), 2);
        let tok = session.select_suggestion(hits[1]).unwrap();

        assert_eq!(tok.kind(), TokenKind::Variable);
        assert_eq!(tok.text(), "cost");
        assert_eq!(session.pending(), "");
        assert_eq!(session.evaluate(&st), Ok(1400.0));
    }

    #[test]
    fn commit_variable_rejects_bad_names_and_keeps_pending() {
        let mut session = FormulaSession::new();
        session.apply_input_change("a b");
        assert!(session.commit_variable("a b").is_err());
        assert_eq!(session.pending(), "a b");
        assert!(session.tokens().is_empty());
    }

    #[test]
    fn empty_query_gives_no_suggestions() {
        let session = FormulaSession::new();
        assert!(session.search_suggestions(&symtab(), "").is_empty());
    }

    #[test]
    fn variables_follow_catalog_updates() {
        let mut st = symtab();
        let session = typed("revenue-cost");
        assert_eq!(session.evaluate(&st), Ok(500.0));
        st.set_value("cost", 200.0).unwrap();
        assert_eq!(session.evaluate(&st), Ok(1000.0));
    }

    #[test]
    fn type_keys_handles_backspace() {
        // "revx<BS>" leaves "rev" pending, then "enue" completes the name.
        let keys = format!("revx{BACKSPACE}enue+1{BACKSPACE}{BACKSPACE}*2");
        let session = typed(&keys);
        assert_eq!(session.tokens().to_string(), "revenue * 2");
        assert_eq!(session.evaluate(&symtab()), Ok(2400.0));
    }

    #[test]
    fn type_keys_whitespace_commits_pending_name() {
        let session = typed("headcount 2");
        assert_eq!(session.tokens().to_string(), "headcount 2");
        assert_eq!(
            session.evaluate(&symtab()),
            Err(EvalError::UnexpectedToken { position: Some(1) })
        );
    }

    #[test]
    fn type_keys_commits_a_digit_run_as_one_number() {
        let session = typed("12+3");
        assert_eq!(session.tokens().to_string(), "12 + 3");
        assert_eq!(session.evaluate(&symtab()), Ok(15.0));

        let session = typed("(120-20)*headcount/2");
        assert_eq!(session.tokens().len(), 9);
        assert_eq!(session.evaluate(&symtab()), Ok(600.0));
    }

    #[test]
    fn type_keys_backspace_edits_a_digit_run() {
        let keys = format!("125{BACKSPACE}0/4");
        let session = typed(&keys);
        assert_eq!(session.tokens().to_string(), "120 / 4");
        assert_eq!(session.evaluate(&symtab()), Ok(30.0));
    }

    #[test]
    fn type_keys_keeps_digits_inside_names() {
        let mut session = FormulaSession::new();
        session.type_keys("q1").unwrap();
        assert_eq!(session.tokens().to_string(), "q1");
        assert_eq!(session.tokens().last().unwrap().kind(), TokenKind::Variable);
    }

    #[test]
    fn deeply_nested_formula_evaluates() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut session = FormulaSession::new();
        for _ in 0..10_000 {
            session.apply_input_change("(");
        }
        session.apply_input_change("1");
        for _ in 0..10_000 {
            session.apply_input_change(")");
        }
        assert_eq!(session.tokens().len(), 20_001);
        assert_eq!(session.evaluate(&SymTab::new()), Ok(1.0));
    }

    #[test]
    fn clear_resets_stream_and_pending_together() {
        let mut session = typed("1+");
        session.apply_input_change("abc");
        session.clear();
        assert!(session.tokens().is_empty());
        assert_eq!(session.pending(), "");
    }
}
