// SPDX-License-Identifier: Apache-2.0

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use jsontok::{Limits, Tokenizer};
use log::debug;

use crate::cursor::TokenCursor;
use crate::parse_error::{Field, ParseError};
use crate::walker::{self, RawAtlas};

/// Byte range inside the atlas string table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: usize,
    end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FrameEntry {
    name: Span,
    x: u16,
    y: u16,
    w: u16,
    h: u16,
}

/// One named rectangle of the atlas image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame<'a> {
    pub name: &'a str,
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

/// A parsed sprite atlas: the source image and its named frames.
///
/// The atlas owns all of its text in a single string table, so it does not
/// borrow from the buffer it was parsed from. It holds two heap blocks: the
/// string table and the frame list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atlas {
    strings: String,
    image: Span,
    image_w: u16,
    image_h: u16,
    frames: Vec<FrameEntry>,
}

impl Atlas {
    /// Parses a JSON atlas with default tokenizer [`Limits`].
    ///
    /// # Example
    /// ```
    /// use pixi_atlas::Atlas;
    /// let json = br#"{"frames": {"idle": {"frame": {"x": 0, "y": 0, "w": 8, "h": 8}}},
    ///                 "meta": {"image": "hero.png", "size": {"w": 64, "h": 64}}}"#;
    /// let atlas = Atlas::parse(json).unwrap();
    /// assert_eq!(atlas.image(), "hero.png");
    /// assert_eq!(atlas.frame_by_name("idle").map(|f| f.w), Some(8));
    /// ```
    pub fn parse(source: &[u8]) -> Result<Self, ParseError> {
        Self::parse_with_limits(source, Limits::default())
    }

    /// Parses a JSON atlas, tokenizing under the given limits.
    pub fn parse_with_limits(source: &[u8], limits: Limits) -> Result<Self, ParseError> {
        let tokens = Tokenizer::with_limits(limits)
            .tokenize(source)
            .inspect_err(|e| debug!("atlas rejected by tokenizer: {}", e))?;
        let mut cursor = TokenCursor::new(&tokens, source);
        let atlas = walker::walk_root(&mut cursor)
            .and_then(RawAtlas::into_owned)
            .inspect_err(|e| debug!("atlas rejected: {}", e))?;
        debug!(
            "parsed atlas '{}' [{}x{}] with {} frames",
            atlas.image(),
            atlas.image_w,
            atlas.image_h,
            atlas.len()
        );
        Ok(atlas)
    }

    /// Reads and parses an atlas file.
    #[cfg(feature = "std")]
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, crate::LoadError> {
        let data = std::fs::read(path)?;
        Ok(Self::parse(&data)?)
    }

    /// File name of the source image (`meta.image`).
    pub fn image(&self) -> &str {
        self.text(self.image)
    }

    pub fn image_width(&self) -> u16 {
        self.image_w
    }

    pub fn image_height(&self) -> u16 {
        self.image_h
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false for a successfully parsed atlas.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames in document order.
    pub fn frames(&self) -> impl DoubleEndedIterator<Item = Frame<'_>> + ExactSizeIterator + '_ {
        self.frames.iter().map(move |entry| self.resolve(entry))
    }

    pub fn frame(&self, index: usize) -> Option<Frame<'_>> {
        self.frames.get(index).map(|entry| self.resolve(entry))
    }

    /// First frame called `name`.
    pub fn frame_by_name(&self, name: &str) -> Option<Frame<'_>> {
        self.frames().find(|frame| frame.name == name)
    }

    /// Prints the atlas to standard output.
    #[cfg(feature = "std")]
    pub fn dump(&self) {
        print!(">>> dump >>>\n{self}<<< dump <<<\n");
    }

    fn text(&self, span: Span) -> &str {
        self.strings.get(span.start..span.end).unwrap_or_default()
    }

    fn resolve(&self, entry: &FrameEntry) -> Frame<'_> {
        Frame {
            name: self.text(entry.name),
            x: entry.x,
            y: entry.y,
            w: entry.w,
            h: entry.h,
        }
    }
}

impl FromStr for Atlas {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.as_bytes())
    }
}

impl fmt::Display for Atlas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "meta image: {} [{}x{}] contain {} frames",
            self.image(),
            self.image_w,
            self.image_h,
            self.len()
        )?;
        for (index, frame) in self.frames().enumerate() {
            writeln!(
                f,
                "- {:03} {:>30} x:{:4}; y:{:4}; w:{:4}; h:{:4}",
                index + 1,
                frame.name,
                frame.x,
                frame.y,
                frame.w,
                frame.h
            )?;
        }
        Ok(())
    }
}

/// Appends `text` to the string table and returns where it landed.
fn append(strings: &mut String, text: &str) -> Span {
    let start = strings.len();
    strings.push_str(text);
    Span {
        start,
        end: strings.len(),
    }
}

impl<'s> RawAtlas<'s> {
    /// Checks the required fields once the whole document has been walked.
    fn validate(&self) -> Result<&'s str, ParseError> {
        let image = match self.image {
            Some(image) if !image.is_empty() => image,
            _ => return Err(ParseError::MissingField(Field::Image)),
        };
        if self.image_w == 0 {
            return Err(ParseError::MissingField(Field::ImageWidth));
        }
        if self.image_h == 0 {
            return Err(ParseError::MissingField(Field::ImageHeight));
        }
        if self.frames.is_empty() {
            return Err(ParseError::MissingField(Field::Frames));
        }
        Ok(image)
    }

    /// Validates the working record and copies it into an owned [`Atlas`].
    ///
    /// Strings are packed image first, then frame names in walk order.
    pub(crate) fn into_owned(self) -> Result<Atlas, ParseError> {
        let image = self.validate()?;

        let total = image.len() + self.frames.iter().map(|f| f.name.len()).sum::<usize>();
        let mut strings = String::new();
        strings.try_reserve_exact(total)?;
        let mut frames = Vec::new();
        frames.try_reserve_exact(self.frames.len())?;

        let image = append(&mut strings, image);
        for raw in &self.frames {
            frames.push(FrameEntry {
                name: append(&mut strings, raw.name),
                x: raw.x,
                y: raw.y,
                w: raw.w,
                h: raw.h,
            });
        }

        Ok(Atlas {
            strings,
            image,
            image_w: self.image_w,
            image_h: self.image_h,
            frames,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walker::RawFrame;
    use test_log::test;

    fn raw<'s>(image: Option<&'s str>, w: u16, h: u16, names: &[&'s str]) -> RawAtlas<'s> {
        RawAtlas {
            image,
            image_w: w,
            image_h: h,
            frames: names
                .iter()
                .enumerate()
                .map(|(i, &name)| RawFrame {
                    name,
                    x: i as u16,
                    y: 2 * i as u16,
                    w: 16,
                    h: 8,
                })
                .collect(),
        }
    }

    #[test]
    fn test_into_owned_packs_strings_in_order() {
        let atlas = raw(Some("sheet.png"), 128, 64, &["a", "bb", "ccc"])
            .into_owned()
            .unwrap();
        assert_eq!(atlas.strings, "sheet.pngabbccc");
        assert_eq!(atlas.image(), "sheet.png");
        assert_eq!(
            atlas.frame(2),
            Some(Frame {
                name: "ccc",
                x: 2,
                y: 4,
                w: 16,
                h: 8
            })
        );
        assert_eq!(atlas.frame(3), None);
    }

    #[test]
    fn test_into_owned_does_not_alias_source() {
        let source = alloc::string::String::from("img.png|frame_0");
        let atlas = raw(Some(&source[..7]), 1, 1, &[&source[8..]])
            .into_owned()
            .unwrap();
        drop(source);
        assert_eq!(atlas.image(), "img.png");
        assert_eq!(atlas.frame(0).map(|f| f.name), Some("frame_0"));
    }

    #[test]
    fn test_validation_order() {
        assert_eq!(
            raw(None, 1, 1, &["a"]).into_owned(),
            Err(ParseError::MissingField(Field::Image))
        );
        assert_eq!(
            raw(Some(""), 1, 1, &["a"]).into_owned(),
            Err(ParseError::MissingField(Field::Image))
        );
        assert_eq!(
            raw(Some("i"), 0, 1, &["a"]).into_owned(),
            Err(ParseError::MissingField(Field::ImageWidth))
        );
        assert_eq!(
            raw(Some("i"), 1, 0, &["a"]).into_owned(),
            Err(ParseError::MissingField(Field::ImageHeight))
        );
        assert_eq!(
            raw(Some("i"), 1, 1, &[]).into_owned(),
            Err(ParseError::MissingField(Field::Frames))
        );
    }

    #[test]
    fn test_empty_frame_names_are_kept() {
        let atlas = raw(Some("i"), 1, 1, &["", "b", ""]).into_owned().unwrap();
        let names: Vec<_> = atlas.frames().map(|f| f.name).collect();
        assert_eq!(names, ["", "b", ""]);
        assert_eq!(atlas.frames().len(), 3);
        assert_eq!(atlas.frames().next_back().map(|f| f.x), Some(2));
    }

    #[test]
    fn test_frame_by_name_returns_first_match() {
        let atlas = raw(Some("i"), 1, 1, &["dup", "other", "dup"])
            .into_owned()
            .unwrap();
        assert_eq!(atlas.frame_by_name("dup").map(|f| f.x), Some(0));
        assert_eq!(atlas.frame_by_name("missing"), None);
    }

    #[test]
    fn test_display() {
        let atlas = raw(Some("sheet.png"), 64, 32, &["hero", "tree"])
            .into_owned()
            .unwrap();
        let text = atlas.to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "meta image: sheet.png [64x32] contain 2 frames");
        assert_eq!(
            lines[1],
            "- 001                           hero x:   0; y:   0; w:  16; h:   8"
        );
        assert_eq!(
            lines[2],
            "- 002                           tree x:   1; y:   2; w:  16; h:   8"
        );
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_parse_from_str() {
        let atlas: Atlas = r#"{"meta": {"image": "a.png", "size": {"w": 2, "h": 2}},
                               "frames": {"f": {"frame": {"w": 1, "h": 1}}}}"#
            .parse()
            .unwrap();
        assert_eq!(atlas.len(), 1);
        assert!(!atlas.is_empty());
        assert_eq!((atlas.image_width(), atlas.image_height()), (2, 2));
    }
}
