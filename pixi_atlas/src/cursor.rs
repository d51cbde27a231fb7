// SPDX-License-Identifier: Apache-2.0

use jsontok::{Token, TokenKind};

use crate::parse_error::ParseError;

/// Read position over a flat token array and the source it was built from.
///
/// Every step is bounds-checked against the end of the token array; running
/// off the end is [`ParseError::EndOfTokens`].
// Lifetime 't is the token array lifetime
// Lifetime 's is the source buffer lifetime
#[derive(Debug, Clone)]
pub(crate) struct TokenCursor<'t, 's> {
    tokens: &'t [Token],
    source: &'s [u8],
    pos: usize,
}

impl<'t, 's> TokenCursor<'t, 's> {
    pub fn new(tokens: &'t [Token], source: &'s [u8]) -> Self {
        TokenCursor {
            tokens,
            source,
            pos: 0,
        }
    }

    /// Index of the token under the cursor.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn peek(&self) -> Result<&'t Token, ParseError> {
        self.tokens.get(self.pos).ok_or(ParseError::EndOfTokens)
    }

    pub fn advance(&mut self) -> Result<&'t Token, ParseError> {
        let token = self.peek()?;
        self.pos += 1;
        Ok(token)
    }

    /// Consumes the current token if it is of `kind`.
    pub fn expect(&mut self, kind: TokenKind) -> Result<&'t Token, ParseError> {
        let token = self.peek()?;
        if token.kind != kind {
            return Err(ParseError::UnexpectedToken {
                expected: kind,
                found: token.kind,
                index: self.pos,
            });
        }
        self.pos += 1;
        Ok(token)
    }

    /// Consumes an object token with at least `min_entries` keys and returns
    /// its key count. The cursor is left on the first key.
    pub fn enter_object(&mut self, min_entries: usize) -> Result<usize, ParseError> {
        let index = self.pos;
        let token = self.expect(TokenKind::Object)?;
        if token.size < min_entries {
            return Err(ParseError::TooFewEntries {
                required: min_entries,
                found: token.size,
                index,
            });
        }
        Ok(token.size)
    }

    /// Consumes an object key and returns its raw bytes.
    pub fn next_key(&mut self) -> Result<&'s [u8], ParseError> {
        let token = self.expect(TokenKind::String)?;
        Ok(self.bytes(token))
    }

    /// Raw source bytes covered by `token`.
    pub fn bytes(&self, token: &Token) -> &'s [u8] {
        self.source.get(token.span()).unwrap_or_default()
    }

    /// Consumes one complete value of any shape.
    ///
    /// An object of size n contributes n keys and n values, an array of size
    /// n contributes n values. Counting the values still owed instead of
    /// recursing keeps the call stack flat for any nesting depth.
    pub fn skip_value(&mut self) -> Result<(), ParseError> {
        let mut pending: usize = 1;
        while pending > 0 {
            let token = self.advance()?;
            pending -= 1;
            let children = match token.kind {
                TokenKind::Object => token.size.saturating_mul(2),
                TokenKind::Array => token.size,
                TokenKind::String | TokenKind::Primitive => 0,
            };
            pending = pending.saturating_add(children);
        }
        Ok(())
    }
}
