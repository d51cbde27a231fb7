// SPDX-License-Identifier: Apache-2.0

//! Schema walkers for the TexturePacker / pixi.js JSON hash layout.
//!
//! Each walker starts at an object token, dispatches every key to a field
//! extractor, a nested walker or [`TokenCursor::skip_value`], and leaves the
//! cursor just past the object. The result is a [`RawAtlas`] whose strings
//! still borrow the source buffer; nothing is validated here beyond shape.

use alloc::vec::Vec;

use log::trace;

use crate::cursor::TokenCursor;
use crate::extract::{read_str, read_u16};
use crate::parse_error::ParseError;

/// A frame as seen during the walk. Missing coordinates stay 0.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawFrame<'s> {
    pub name: &'s str,
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

/// Working record produced by the walk, not yet validated.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct RawAtlas<'s> {
    pub image: Option<&'s str>,
    pub image_w: u16,
    pub image_h: u16,
    pub frames: Vec<RawFrame<'s>>,
}

fn skip_unknown(cursor: &mut TokenCursor<'_, '_>, key: &[u8]) -> Result<(), ParseError> {
    trace!(
        "skipping unknown key '{}' at token {}",
        key.escape_ascii(),
        cursor.position()
    );
    cursor.skip_value()
}

/// Walks the root object: `{"frames": {...}, "meta": {...}, ...}`.
pub(crate) fn walk_root<'s>(cursor: &mut TokenCursor<'_, 's>) -> Result<RawAtlas<'s>, ParseError> {
    let entries = cursor.enter_object(2)?;
    let mut atlas = RawAtlas::default();
    for _ in 0..entries {
        match cursor.next_key()? {
            b"meta" => walk_meta(cursor, &mut atlas)?,
            b"frames" => atlas.frames = walk_frames(cursor)?,
            other => skip_unknown(cursor, other)?,
        }
    }
    Ok(atlas)
}

/// Walks `meta`: `{"image": "...", "size": {...}, ...}`.
fn walk_meta<'s>(
    cursor: &mut TokenCursor<'_, 's>,
    atlas: &mut RawAtlas<'s>,
) -> Result<(), ParseError> {
    let entries = cursor.enter_object(2)?;
    for _ in 0..entries {
        match cursor.next_key()? {
            b"image" => atlas.image = Some(read_str(cursor)?),
            b"size" => walk_size(cursor, atlas)?,
            other => skip_unknown(cursor, other)?,
        }
    }
    Ok(())
}

/// Walks `meta.size`: `{"w": 0, "h": 0}`.
fn walk_size(cursor: &mut TokenCursor<'_, '_>, atlas: &mut RawAtlas<'_>) -> Result<(), ParseError> {
    let entries = cursor.enter_object(2)?;
    for _ in 0..entries {
        match cursor.next_key()? {
            b"w" => atlas.image_w = read_u16(cursor)?,
            b"h" => atlas.image_h = read_u16(cursor)?,
            other => skip_unknown(cursor, other)?,
        }
    }
    Ok(())
}

/// Walks the `frames` map. Keys are frame names, in document order.
///
/// The frame list is reserved up front from the declared entry count and
/// dropped as soon as any entry fails.
fn walk_frames<'s>(cursor: &mut TokenCursor<'_, 's>) -> Result<Vec<RawFrame<'s>>, ParseError> {
    let entries = cursor.enter_object(0)?;
    let mut frames = Vec::new();
    frames.try_reserve_exact(entries)?;
    for _ in 0..entries {
        let name = read_str(cursor)?;
        frames.push(walk_frame(cursor, name)?);
    }
    Ok(frames)
}

/// Walks one frame entry: `{"frame": {...}, "rotated": ..., ...}`.
fn walk_frame<'s>(
    cursor: &mut TokenCursor<'_, 's>,
    name: &'s str,
) -> Result<RawFrame<'s>, ParseError> {
    let mut frame = RawFrame {
        name,
        ..RawFrame::default()
    };
    let entries = cursor.enter_object(1)?;
    for _ in 0..entries {
        match cursor.next_key()? {
            b"frame" => walk_rect(cursor, &mut frame)?,
            other => skip_unknown(cursor, other)?,
        }
    }
    Ok(frame)
}

/// Walks `frame`: `{"x": 0, "y": 0, "w": 0, "h": 0}`.
fn walk_rect(cursor: &mut TokenCursor<'_, '_>, frame: &mut RawFrame<'_>) -> Result<(), ParseError> {
    let entries = cursor.enter_object(1)?;
    for _ in 0..entries {
        match cursor.next_key()? {
            b"x" => frame.x = read_u16(cursor)?,
            b"y" => frame.y = read_u16(cursor)?,
            b"w" => frame.w = read_u16(cursor)?,
            b"h" => frame.h = read_u16(cursor)?,
            other => skip_unknown(cursor, other)?,
        }
    }
    Ok(())
}
