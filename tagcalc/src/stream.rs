//! # Token Stream
//!
//! The ordered list of committed tokens. Order is evaluation order: tokens
//! are kept left-to-right exactly as they were committed and are never
//! reordered. Mutations either succeed completely or leave the stream as it
//! was.
use crate::token::{Token, TokenError, TokenId};
use std::fmt;

/// An ordered, mutable sequence of committed [`Token`]s.
///
/// # Example
/// ```rust
/// # use tagcalc::{Token, TokenIdGen, TokenKind, TokenStream};
/// let mut ids = TokenIdGen::new();
/// let mut stream = TokenStream::new();
/// let tok = Token::new(ids.next_id(), TokenKind::Number, "12").unwrap();
/// let id = tok.id();
/// stream.append(tok);
///
/// assert!(stream.replace_text(id, "12a").is_err());
/// assert_eq!(stream.get(id).unwrap().text(), "12");
///
/// stream.replace_text(id, "13").unwrap();
/// assert_eq!(stream.to_string(), "13");
/// ```
#[derive(Debug, Default, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Creates an empty stream.
    pub fn new() -> Self {
        Self { tokens: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Appends a token at the end of the stream.
    pub fn append(&mut self, token: Token) {
        log::trace!("append {} {:?} {}", token.id(), token.kind(), token.text());
        self.tokens.push(token);
    }

    /// Removes and returns the last token, or `None` if the stream is empty.
    pub fn remove_last(&mut self) -> Option<Token> {
        let token = self.tokens.pop();
        if let Some(token) = &token {
            log::trace!("remove_last {}", token.id());
        }
        token
    }

    /// Removes the token with the given id, preserving the order of the rest.
    pub fn remove(&mut self, id: TokenId) -> Option<Token> {
        let index = self.position(id)?;
        log::trace!("remove {} at {}", id, index);
        Some(self.tokens.remove(index))
    }

    /// Replaces the text of the token with the given id.
    ///
    /// The new text is validated against the token's kind; `id` and `kind`
    /// never change.
    ///
    /// # Errors
    /// - [`TokenError::UnknownToken`] if no token has this id,
    /// - [`TokenError::InvalidTokenText`] if the text does not fit the kind.
    ///
    /// In both cases the stream is unchanged.
    pub fn replace_text(&mut self, id: TokenId, new_text: &str) -> Result<(), TokenError> {
        let token = self
            .tokens
            .iter_mut()
            .find(|t| t.id() == id)
            .ok_or(TokenError::UnknownToken(id))?;
        token.set_text(new_text)?;
        log::trace!("replace_text {} -> {:?}", id, new_text);
        Ok(())
    }

    /// Returns the token with the given id.
    pub fn get(&self, id: TokenId) -> Option<&Token> {
        self.tokens.iter().find(|t| t.id() == id)
    }

    /// Returns the index of the token with the given id.
    pub fn position(&self, id: TokenId) -> Option<usize> {
        self.tokens.iter().position(|t| t.id() == id)
    }

    pub fn last(&self) -> Option<&Token> {
        self.tokens.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    /// Removes every token.
    pub fn clear(&mut self) {
        self.tokens.clear();
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

impl fmt::Display for TokenStream {
    /// Writes the token texts separated by single spaces.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Operator, TokenIdGen, TokenKind};

    fn stream_of(ids: &mut TokenIdGen, texts: &[&str]) -> TokenStream {
        let mut stream = TokenStream::new();
        for text in texts {
            let kind = TokenKind::classify(text).unwrap();
            stream.append(Token::new(ids.next_id(), kind, text).unwrap());
        }
        stream
    }

    #[test]
    fn new_stream_is_empty() {
        let stream = TokenStream::new();
        assert!(stream.is_empty());
        assert_eq!(stream.len(), 0);
        assert!(stream.last().is_none());
    }

    #[test]
    fn append_keeps_commit_order() {
        let mut ids = TokenIdGen::new();
        let stream = stream_of(&mut ids, &["3", "+", "x", "*", "2"]);
        let texts: Vec<&str> = stream.iter().map(Token::text).collect();
        assert_eq!(texts, ["3", "+", "x", "*", "2"]);
        assert_eq!(stream.to_string(), "3 + x * 2");
    }

    #[test]
    fn remove_last_on_empty_is_noop() {
        let mut stream = TokenStream::new();
        assert!(stream.remove_last().is_none());
        assert!(stream.is_empty());
    }

    #[test]
    fn remove_last_pops_the_tail() {
        let mut ids = TokenIdGen::new();
        let mut stream = stream_of(&mut ids, &["1", "+", "2"]);
        let last = stream.remove_last().unwrap();
        assert_eq!(last.text(), "2");
        assert_eq!(stream.to_string(), "1 +");
    }

    #[test]
    fn remove_by_id_preserves_order_of_the_rest() {
        let mut ids = TokenIdGen::new();
        let mut stream = stream_of(&mut ids, &["1", "+", "2", "*", "3"]);
        let plus = stream.as_slice()[1].id();

        let removed = stream.remove(plus).unwrap();
        assert_eq!(removed.as_operator(), Some(Operator::Plus));
        assert_eq!(stream.to_string(), "1 2 * 3");
        assert!(stream.get(plus).is_none());

        // Second removal of the same id finds nothing.
        assert!(stream.remove(plus).is_none());
        assert_eq!(stream.len(), 4);
    }

    #[test]
    fn replace_text_validates_against_kind() {
        let mut ids = TokenIdGen::new();
        let mut stream = stream_of(&mut ids, &["12", "+", "x"]);
        let num = stream.as_slice()[0].id();
        let op = stream.as_slice()[1].id();
        let var = stream.as_slice()[2].id();

        assert!(matches!(
            stream.replace_text(num, "12a"),
            Err(TokenError::InvalidTokenText { .. })
        ));
        assert_eq!(stream.get(num).unwrap().text(), "12");

        stream.replace_text(op, "*").unwrap();
        assert!(stream.replace_text(op, "**").is_err());
        stream.replace_text(var, "y").unwrap();
        assert!(stream.replace_text(var, "9").is_err());

        assert_eq!(stream.to_string(), "12 * y");
        assert_eq!(stream.get(var).unwrap().kind(), TokenKind::Variable);
    }

    #[test]
    fn replace_text_on_unknown_id_fails() {
        let mut ids = TokenIdGen::new();
        let mut stream = stream_of(&mut ids, &["1"]);
        let stranger = ids.next_id();
        assert_eq!(
            stream.replace_text(stranger, "2"),
            Err(TokenError::UnknownToken(stranger))
        );
        assert_eq!(stream.to_string(), "1");
    }

    #[test]
    fn clear_empties_the_stream() {
        let mut ids = TokenIdGen::new();
        let mut stream = stream_of(&mut ids, &["1", "+", "2"]);
        stream.clear();
        assert!(stream.is_empty());
    }
}
