// SPDX-License-Identifier: Apache-2.0

//! Strict JSON tokenizer that flattens a document into a pre-order token array.
//!
//! Each [`Token`] records its [`TokenKind`], the byte span it covers in the
//! source and, for containers, the number of logical children. Nothing is
//! decoded: string spans point at the raw bytes between the quotes.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

use alloc::vec::Vec;

mod tokenizer;

pub use tokenizer::{ErrKind, Error, Limits, Token, TokenKind, Tokenizer};

/// Tokenizes `data` with default [`Limits`].
pub fn tokenize(data: &[u8]) -> Result<Vec<Token>, Error> {
    Tokenizer::new().tokenize(data)
}
