// SPDX-License-Identifier: Apache-2.0

use jsontok::TokenKind;

#[cfg(feature = "int-range-error")]
use crate::int_parser::ConstParseIntegerError;

/// Required atlas field that was absent, empty or zero once the walk finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// `meta.image`
    Image,
    /// `meta.size.w`
    ImageWidth,
    /// `meta.size.h`
    ImageHeight,
    /// `frames`
    Frames,
}

impl Field {
    /// Dotted JSON path of the field.
    pub const fn path(&self) -> &'static str {
        match self {
            Field::Image => "meta.image",
            Field::ImageWidth => "meta.size.w",
            Field::ImageHeight => "meta.size.h",
            Field::Frames => "frames",
        }
    }
}

/// Errors that can occur while parsing an atlas
#[derive(Debug, PartialEq)]
pub enum ParseError {
    /// An error bubbled up from the underlying tokenizer.
    TokenizerError(jsontok::Error),
    /// A token had the wrong type for the schema step reading it.
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
        index: usize,
    },
    /// An object declared fewer entries than the schema step requires.
    TooFewEntries {
        required: usize,
        found: usize,
        index: usize,
    },
    /// The walk needed a token past the end of the token array.
    EndOfTokens,
    /// A string slice was not valid UTF-8.
    InvalidUtf8(core::str::Utf8Error),
    /// An integer field was not numeric.
    InvalidNumber,
    /// An integer field did not fit in 16 bits (`int-range-error` only).
    NumericOverflow,
    /// A required field was absent, empty or zero.
    MissingField(Field),
    /// The frame list or string table could not be allocated.
    OutOfMemory,
}

impl ParseError {
    /// True for failures reported by the tokenizer rather than the schema walk.
    pub fn is_tokenizer_error(&self) -> bool {
        matches!(self, ParseError::TokenizerError(_))
    }
}

impl From<jsontok::Error> for ParseError {
    fn from(err: jsontok::Error) -> Self {
        ParseError::TokenizerError(err)
    }
}

impl From<core::str::Utf8Error> for ParseError {
    fn from(err: core::str::Utf8Error) -> Self {
        ParseError::InvalidUtf8(err)
    }
}

impl From<alloc::collections::TryReserveError> for ParseError {
    fn from(_: alloc::collections::TryReserveError) -> Self {
        ParseError::OutOfMemory
    }
}

#[cfg(feature = "int-range-error")]
impl From<ConstParseIntegerError> for ParseError {
    fn from(err: ConstParseIntegerError) -> Self {
        match err {
            ConstParseIntegerError::Overflow => ParseError::NumericOverflow,
            _ => ParseError::InvalidNumber,
        }
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParseError::TokenizerError(e) => write!(f, "{e}"),
            ParseError::UnexpectedToken {
                expected,
                found,
                index,
            } => write!(f, "expected {expected:?} at token {index}, found {found:?}"),
            ParseError::TooFewEntries {
                required,
                found,
                index,
            } => write!(
                f,
                "object at token {index} has {found} entries, at least {required} required"
            ),
            ParseError::InvalidUtf8(e) => write!(f, "Invalid UTF-8: {e}"),
            ParseError::MissingField(field) => {
                write!(f, "missing or empty field '{}'", field.path())
            }
            _ => write!(f, "{self:?}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::InvalidUtf8(e) => Some(e),
            _ => None,
        }
    }
}

/// Errors from [`Atlas::from_file`](crate::Atlas::from_file).
#[cfg(feature = "std")]
#[derive(Debug)]
pub enum LoadError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The file was read but is not a valid atlas.
    Parse(ParseError),
}

#[cfg(feature = "std")]
impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        LoadError::Io(err)
    }
}

#[cfg(feature = "std")]
impl From<ParseError> for LoadError {
    fn from(err: ParseError) -> Self {
        LoadError::Parse(err)
    }
}

#[cfg(feature = "std")]
impl core::fmt::Display for LoadError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "{e}"),
            LoadError::Parse(e) => write!(f, "{e}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            LoadError::Parse(e) => Some(e),
        }
    }
}
