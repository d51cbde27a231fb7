// SPDX-License-Identifier: Apache-2.0

use jsontok::TokenKind;

use crate::cursor::TokenCursor;
use crate::int_parser;
use crate::parse_error::ParseError;

/// Reads a string token as text borrowed from the source.
///
/// Escape sequences are not decoded, the raw bytes between the quotes are returned.
pub(crate) fn read_str<'s>(cursor: &mut TokenCursor<'_, 's>) -> Result<&'s str, ParseError> {
    let token = cursor.expect(TokenKind::String)?;
    Ok(core::str::from_utf8(cursor.bytes(token))?)
}

/// Reads a numeric primitive into a 16-bit field.
pub(crate) fn read_u16(cursor: &mut TokenCursor<'_, '_>) -> Result<u16, ParseError> {
    let token = cursor.expect(TokenKind::Primitive)?;
    let text = cursor.bytes(token);
    match text.first() {
        Some(b'0'..=b'9' | b'-') => narrow(text),
        _ => Err(ParseError::InvalidNumber),
    }
}

#[cfg(feature = "int-wrap")]
fn narrow(text: &[u8]) -> Result<u16, ParseError> {
    Ok(int_parser::from_ascii_u16_wrapping(text))
}

#[cfg(feature = "int-range-error")]
fn narrow(text: &[u8]) -> Result<u16, ParseError> {
    Ok(int_parser::from_ascii_u16(text)?)
}
