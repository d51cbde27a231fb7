// SPDX-License-Identifier: Apache-2.0

//! Parser for the TexturePacker / pixi.js JSON sprite atlas format.
//!
//! An atlas names rectangular frames inside one source image:
//!
//! ```
//! use pixi_atlas::Atlas;
//!
//! let json = r#"{
//!     "frames": {"f1": {"frame": {"x": 0, "y": 0, "w": 16, "h": 16}, "rotated": false}},
//!     "meta": {"image": "a.png", "size": {"w": 64, "h": 32}, "scale": "1"}
//! }"#;
//! let atlas: Atlas = json.parse().unwrap();
//! assert_eq!(atlas.image(), "a.png");
//! assert_eq!((atlas.image_width(), atlas.image_height()), (64, 32));
//! for frame in atlas.frames() {
//!     assert_eq!((frame.name, frame.w, frame.h), ("f1", 16, 16));
//! }
//! ```
//!
//! Parsing runs in two phases. The document is tokenized into a flat token
//! array by [`jsontok`] and walked against the expected schema, producing a
//! working record that borrows the input. Once the walk succeeds the required
//! fields are validated and every string is copied into the returned
//! [`Atlas`], which owns its data and outlives the input buffer. Unknown keys
//! are skipped at every level; anything else that does not match the schema
//! rejects the whole document.

#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

extern crate alloc;

// Compile-time configuration validation
mod config_check;

mod atlas;
mod cursor;
mod extract;
mod int_parser;
mod parse_error;
mod walker;

pub use atlas::{Atlas, Frame};
pub use jsontok::{ErrKind as TokenizerErrorKind, Error as TokenizerError, Limits, TokenKind};
#[cfg(feature = "std")]
pub use parse_error::LoadError;
pub use parse_error::{Field, ParseError};
