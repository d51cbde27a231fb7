// SPDX-License-Identifier: Apache-2.0

use alloc::vec::Vec;
use log::{debug, info};

/// Type tag of a flat token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A number, `true`, `false` or `null`.
    Primitive,
    /// A string, either an object key or a value.
    String,
    Object,
    Array,
}

/// One entry of the flat token array.
///
/// `start..end` is the byte span in the source. For strings the span excludes
/// the quotes, for containers it includes the brackets. `size` counts logical
/// children: keys for an object, items for an array and `1` for a key that
/// received its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    pub size: usize,
}

impl Token {
    const fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Token {
            kind,
            start,
            end,
            size: 0,
        }
    }

    /// Byte range of the token in the source.
    pub fn span(&self) -> core::ops::Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Resource limits applied while tokenizing. Both are unbounded by default.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of tokens; exceeding it fails with [`ErrKind::NoMemory`].
    pub max_tokens: Option<usize>,
    /// Maximum container nesting depth; exceeding it fails with
    /// [`ErrKind::MaxDepthReached`].
    pub max_depth: Option<usize>,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ErrKind {
    /// The token limit was reached before the document ended.
    NoMemory,
    /// A byte that cannot appear at its position.
    InvalidCharacter,
    /// The input ended before the document was complete.
    Partial,
    MaxDepthReached,
}

#[derive(PartialEq, Eq, Clone, Copy)]
pub struct Error {
    kind: ErrKind,
    character: u8,
    position: usize,
}

impl Error {
    pub fn new<T>(kind: ErrKind, character: u8, position: usize) -> Result<T, Self> {
        Err(Self {
            kind,
            character,
            position,
        })
    }

    pub fn kind(&self) -> ErrKind {
        self.kind
    }

    /// The offending byte, or the last byte seen for [`ErrKind::Partial`].
    pub fn character(&self) -> u8 {
        self.character
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{:?}({}) at {}",
            self.kind,
            self.character.escape_ascii(),
            self.position
        )
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.kind {
            ErrKind::NoMemory => write!(f, "not enough tokens were provided"),
            ErrKind::InvalidCharacter => write!(
                f,
                "invalid character '{}' at byte {}",
                self.character.escape_ascii(),
                self.position
            ),
            ErrKind::Partial => write!(
                f,
                "the input is not a full JSON document, more bytes expected after byte {}",
                self.position
            ),
            ErrKind::MaxDepthReached => {
                write!(f, "maximum nesting depth reached at byte {}", self.position)
            }
        }
    }
}

/// What the grammar allows next.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Expect {
    Root,
    KeyOrEnd,
    Key,
    Colon,
    Value,
    ItemOrEnd,
    Item,
    CommaOrEnd,
    Finished,
}

/// An object or array that has not been closed yet.
#[derive(Debug, Clone, Copy)]
struct Open {
    index: usize,
    kind: TokenKind,
    /// Index of the key waiting for its value (objects only)
    key: Option<usize>,
}

/// Receives the tokens as they are discovered.
trait Sink {
    fn push(&mut self, token: Token);
    fn close(&mut self, index: usize, end: usize);
    fn add_child(&mut self, index: usize);
}

impl Sink for Vec<Token> {
    fn push(&mut self, token: Token) {
        Vec::push(self, token);
    }
    fn close(&mut self, index: usize, end: usize) {
        if let Some(token) = self.get_mut(index) {
            token.end = end;
        }
    }
    fn add_child(&mut self, index: usize) {
        if let Some(token) = self.get_mut(index) {
            token.size += 1;
        }
    }
}

/// Discards tokens, used when only the count is wanted.
struct Discard;

impl Sink for Discard {
    fn push(&mut self, _token: Token) {}
    fn close(&mut self, _index: usize, _end: usize) {}
    fn add_child(&mut self, _index: usize) {}
}

/// Flat JSON tokenizer.
///
/// Accepts exactly one root value surrounded by optional whitespace. Escape
/// sequences are validated but left encoded in the source.
pub struct Tokenizer {
    limits: Limits,
    expect: Expect,
    stack: Vec<Open>,
    next: usize,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    pub fn with_limits(limits: Limits) -> Self {
        Tokenizer {
            limits,
            expect: Expect::Root,
            stack: Vec::new(),
            next: 0,
        }
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Tokenizes a complete document.
    pub fn tokenize(&mut self, data: &[u8]) -> Result<Vec<Token>, Error> {
        let mut tokens = Vec::new();
        self.run(data, &mut tokens)?;
        Ok(tokens)
    }

    /// Validates a complete document and returns how many tokens it needs.
    pub fn count(&mut self, data: &[u8]) -> Result<usize, Error> {
        self.run(data, &mut Discard)
    }

    fn reset(&mut self) {
        self.expect = Expect::Root;
        self.stack.clear();
        self.next = 0;
    }

    fn push<S: Sink + ?Sized>(
        &mut self,
        sink: &mut S,
        token: Token,
        data: u8,
        pos: usize,
    ) -> Result<usize, Error> {
        if let Some(max) = self.limits.max_tokens {
            if self.next >= max {
                info!("token limit of {} reached at byte {}", max, pos);
                return Error::new(ErrKind::NoMemory, data, pos);
            }
        }
        sink.push(token);
        let index = self.next;
        self.next += 1;
        Ok(index)
    }

    /// Checks that a value may start here and credits it to its parent.
    fn begin_value<S: Sink + ?Sized>(
        &mut self,
        sink: &mut S,
        data: u8,
        pos: usize,
    ) -> Result<(), Error> {
        match self.expect {
            Expect::Root => Ok(()),
            Expect::Value => {
                if let Some(key) = self.stack.last_mut().and_then(|open| open.key.take()) {
                    sink.add_child(key);
                }
                Ok(())
            }
            Expect::ItemOrEnd | Expect::Item => {
                if let Some(open) = self.stack.last() {
                    sink.add_child(open.index);
                }
                Ok(())
            }
            _ => Error::new(ErrKind::InvalidCharacter, data, pos),
        }
    }

    fn end_value(&mut self) {
        self.expect = if self.stack.is_empty() {
            Expect::Finished
        } else {
            Expect::CommaOrEnd
        };
    }

    fn run<S: Sink + ?Sized>(&mut self, data: &[u8], sink: &mut S) -> Result<usize, Error> {
        self.reset();
        let mut pos = 0;
        while let Some(&current_byte) = data.get(pos) {
            match current_byte {
                b' ' | b'\t' | b'\n' | b'\r' => pos += 1,
                b'{' | b'[' => {
                    self.begin_value(sink, current_byte, pos)?;
                    if let Some(max) = self.limits.max_depth {
                        if self.stack.len() >= max {
                            return Error::new(ErrKind::MaxDepthReached, current_byte, pos);
                        }
                    }
                    let kind = if current_byte == b'{' {
                        TokenKind::Object
                    } else {
                        TokenKind::Array
                    };
                    let index = self.push(sink, Token::new(kind, pos, pos), current_byte, pos)?;
                    self.stack.push(Open {
                        index,
                        kind,
                        key: None,
                    });
                    self.expect = match kind {
                        TokenKind::Object => Expect::KeyOrEnd,
                        _ => Expect::ItemOrEnd,
                    };
                    pos += 1;
                }
                b'}' | b']' => {
                    let kind = if current_byte == b'}' {
                        TokenKind::Object
                    } else {
                        TokenKind::Array
                    };
                    let may_close = matches!(
                        (kind, self.expect),
                        (TokenKind::Object, Expect::KeyOrEnd | Expect::CommaOrEnd)
                            | (TokenKind::Array, Expect::ItemOrEnd | Expect::CommaOrEnd)
                    );
                    let open = match self.stack.last() {
                        Some(open) if may_close && open.kind == kind => *open,
                        _ => return Error::new(ErrKind::InvalidCharacter, current_byte, pos),
                    };
                    self.stack.pop();
                    sink.close(open.index, pos + 1);
                    self.end_value();
                    pos += 1;
                }
                b'"' => {
                    let is_key = matches!(self.expect, Expect::KeyOrEnd | Expect::Key);
                    if !is_key {
                        self.begin_value(sink, current_byte, pos)?;
                    }
                    let end = scan_string(data, pos + 1)?;
                    let index = self.push(
                        sink,
                        Token::new(TokenKind::String, pos + 1, end),
                        current_byte,
                        pos,
                    )?;
                    if is_key {
                        if let Some(open) = self.stack.last_mut() {
                            open.key = Some(index);
                            sink.add_child(open.index);
                        }
                        self.expect = Expect::Colon;
                    } else {
                        self.end_value();
                    }
                    pos = end + 1;
                }
                b':' => {
                    if self.expect != Expect::Colon {
                        return Error::new(ErrKind::InvalidCharacter, current_byte, pos);
                    }
                    self.expect = Expect::Value;
                    pos += 1;
                }
                b',' => {
                    self.expect = match (self.expect, self.stack.last()) {
                        (Expect::CommaOrEnd, Some(open)) if open.kind == TokenKind::Object => {
                            Expect::Key
                        }
                        (Expect::CommaOrEnd, Some(_)) => Expect::Item,
                        _ => return Error::new(ErrKind::InvalidCharacter, current_byte, pos),
                    };
                    pos += 1;
                }
                b'-' | b'0'..=b'9' | b't' | b'f' | b'n' => {
                    self.begin_value(sink, current_byte, pos)?;
                    let end = scan_primitive(data, pos)?;
                    self.push(
                        sink,
                        Token::new(TokenKind::Primitive, pos, end),
                        current_byte,
                        pos,
                    )?;
                    self.end_value();
                    pos = end;
                }
                _ => return Error::new(ErrKind::InvalidCharacter, current_byte, pos),
            }
        }

        if self.expect != Expect::Finished {
            let last = data.last().copied().unwrap_or(b' ');
            return Error::new(ErrKind::Partial, last, data.len());
        }
        debug!("--finished-- {} tokens from {} bytes", self.next, pos);
        Ok(self.next)
    }
}

/// Returns the position of the closing quote of a string whose content starts at `start`.
fn scan_string(data: &[u8], start: usize) -> Result<usize, Error> {
    let mut pos = start;
    while let Some(&byte) = data.get(pos) {
        match byte {
            b'"' => return Ok(pos),
            b'\\' => match data.get(pos + 1) {
                None => break,
                Some(b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't') => pos += 2,
                Some(b'u') => {
                    for offset in pos + 2..pos + 6 {
                        match data.get(offset) {
                            None => return Error::new(ErrKind::Partial, b'u', data.len()),
                            Some(hex) if hex.is_ascii_hexdigit() => {}
                            Some(&other) => {
                                return Error::new(ErrKind::InvalidCharacter, other, offset)
                            }
                        }
                    }
                    pos += 6;
                }
                Some(&other) => return Error::new(ErrKind::InvalidCharacter, other, pos + 1),
            },
            0x00..=0x1f => return Error::new(ErrKind::InvalidCharacter, byte, pos),
            _ => pos += 1,
        }
    }
    Error::new(ErrKind::Partial, b'"', data.len())
}

/// Returns the end (exclusive) of the number or literal starting at `start`.
fn scan_primitive(data: &[u8], start: usize) -> Result<usize, Error> {
    let end = data[start..]
        .iter()
        .position(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b',' | b']' | b'}'))
        .map_or(data.len(), |len| start + len);
    let word = &data[start..end];

    let checked = match word[0] {
        b't' => check_literal(word, b"true"),
        b'f' => check_literal(word, b"false"),
        b'n' => check_literal(word, b"null"),
        _ => check_number(word),
    };
    match checked {
        Ok(()) => Ok(end),
        Err(offset) if offset < word.len() => {
            Error::new(ErrKind::InvalidCharacter, word[offset], start + offset)
        }
        Err(_) if end == data.len() => Error::new(ErrKind::Partial, word[word.len() - 1], end),
        Err(_) => Error::new(ErrKind::InvalidCharacter, data[end], end),
    }
}

/// Offset of the first byte that breaks `literal`, or `word.len()` when `word`
/// is a proper prefix of it.
fn check_literal(word: &[u8], literal: &[u8]) -> Result<(), usize> {
    match word.iter().zip(literal).position(|(a, b)| a != b) {
        Some(offset) => Err(offset),
        None if word.len() == literal.len() => Ok(()),
        None if word.len() < literal.len() => Err(word.len()),
        None => Err(literal.len()),
    }
}

/// Validates the RFC 8259 number grammar, reporting the offset where it breaks.
fn check_number(num: &[u8]) -> Result<(), usize> {
    let is_digit = |i: usize| matches!(num.get(i), Some(b'0'..=b'9'));
    let mut i = 0;
    if num.first() == Some(&b'-') {
        i += 1;
    }
    match num.get(i) {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => {
            while is_digit(i) {
                i += 1;
            }
        }
        _ => return Err(i),
    }
    if num.get(i) == Some(&b'.') {
        i += 1;
        if !is_digit(i) {
            return Err(i);
        }
        while is_digit(i) {
            i += 1;
        }
    }
    if matches!(num.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(num.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        if !is_digit(i) {
            return Err(i);
        }
        while is_digit(i) {
            i += 1;
        }
    }
    if i == num.len() {
        Ok(())
    } else {
        Err(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn tok(data: &[u8]) -> Result<Vec<Token>, Error> {
        Tokenizer::new().tokenize(data)
    }

    fn kinds(data: &[u8]) -> Vec<(TokenKind, usize)> {
        tok(data)
            .unwrap()
            .iter()
            .map(|t| (t.kind, t.size))
            .collect()
    }

    fn err_kind(data: &[u8]) -> ErrKind {
        tok(data).unwrap_err().kind()
    }

    #[test]
    fn test_zero_input() {
        assert_eq!(tok(b""), Error::new(ErrKind::Partial, b' ', 0));
        assert_eq!(err_kind(b"   "), ErrKind::Partial);
    }

    #[test]
    fn test_root_is_garbage() {
        assert_eq!(tok(b"a"), Error::new(ErrKind::InvalidCharacter, b'a', 0));
        assert_eq!(tok(b" a"), Error::new(ErrKind::InvalidCharacter, b'a', 1));
    }

    #[test]
    fn test_root_primitives() {
        assert_eq!(kinds(b"true"), [(TokenKind::Primitive, 0)]);
        assert_eq!(kinds(b" null "), [(TokenKind::Primitive, 0)]);
        assert_eq!(kinds(b"-12.5e+3"), [(TokenKind::Primitive, 0)]);
        assert_eq!(kinds(b"\"a\""), [(TokenKind::String, 0)]);
    }

    #[test]
    fn test_spans() {
        let tokens = tok(br#"{"ab": [1, "x"]}"#).unwrap();
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[0].span(), 0..16);
        assert_eq!(tokens[1].span(), 2..4);
        assert_eq!(tokens[2].span(), 7..15);
        assert_eq!(tokens[3].span(), 8..9);
        assert_eq!(tokens[4].span(), 12..13);
    }

    #[test]
    fn test_sizes_follow_key_convention() {
        assert_eq!(
            kinds(br#"{"a": 1, "b": {"c": []}}"#),
            [
                (TokenKind::Object, 2),
                (TokenKind::String, 1),
                (TokenKind::Primitive, 0),
                (TokenKind::String, 1),
                (TokenKind::Object, 1),
                (TokenKind::String, 1),
                (TokenKind::Array, 0),
            ]
        );
        assert_eq!(
            kinds(b"[[1, 2], {}, \"s\"]"),
            [
                (TokenKind::Array, 3),
                (TokenKind::Array, 2),
                (TokenKind::Primitive, 0),
                (TokenKind::Primitive, 0),
                (TokenKind::Object, 0),
                (TokenKind::String, 0),
            ]
        );
    }

    #[test]
    fn test_escapes_stay_raw() {
        let data = br#"["a\"b\u00e9\n"]"#;
        let tokens = tok(data).unwrap();
        assert_eq!(&data[tokens[1].span()], br#"a\"b\u00e9\n"#);
    }

    #[test]
    fn test_invalid_strings() {
        assert_eq!(
            tok(br#"["a\qb"]"#),
            Error::new(ErrKind::InvalidCharacter, b'q', 4)
        );
        assert_eq!(
            tok(b"[\"a\x01\"]"),
            Error::new(ErrKind::InvalidCharacter, 0x01, 3)
        );
        assert_eq!(
            tok(br#"["\u12g4"]"#),
            Error::new(ErrKind::InvalidCharacter, b'g', 6)
        );
        assert_eq!(err_kind(br#"["abc"#), ErrKind::Partial);
        assert_eq!(err_kind(br#"["abc\"#), ErrKind::Partial);
        assert_eq!(err_kind(br#"["\u12"#), ErrKind::Partial);
    }

    #[test]
    fn test_invalid_numbers() {
        assert_eq!(tok(b"[01]"), Error::new(ErrKind::InvalidCharacter, b'1', 2));
        assert_eq!(tok(b"[1.]"), Error::new(ErrKind::InvalidCharacter, b']', 3));
        assert_eq!(tok(b"[-]"), Error::new(ErrKind::InvalidCharacter, b']', 2));
        assert_eq!(tok(b"[1e+x]"), Error::new(ErrKind::InvalidCharacter, b'x', 4));
        assert_eq!(tok(b"[1a]"), Error::new(ErrKind::InvalidCharacter, b'a', 2));
        assert_eq!(err_kind(b"1e"), ErrKind::Partial);
    }

    #[test]
    fn test_invalid_literals() {
        assert_eq!(tok(b"[tru]"), Error::new(ErrKind::InvalidCharacter, b']', 4));
        assert_eq!(tok(b"[trux]"), Error::new(ErrKind::InvalidCharacter, b'x', 4));
        assert_eq!(tok(b"[nulll]"), Error::new(ErrKind::InvalidCharacter, b'l', 5));
        assert_eq!(err_kind(b"fal"), ErrKind::Partial);
    }

    #[test]
    fn test_structure_errors() {
        assert_eq!(err_kind(b"{1: 2}"), ErrKind::InvalidCharacter);
        assert_eq!(err_kind(br#"{"a" 1}"#), ErrKind::InvalidCharacter);
        assert_eq!(err_kind(br#"{"a":}"#), ErrKind::InvalidCharacter);
        assert_eq!(err_kind(br#"{"a":1,}"#), ErrKind::InvalidCharacter);
        assert_eq!(err_kind(b"[1,]"), ErrKind::InvalidCharacter);
        assert_eq!(err_kind(b"[,1]"), ErrKind::InvalidCharacter);
        assert_eq!(err_kind(b"[1 2]"), ErrKind::InvalidCharacter);
        assert_eq!(err_kind(b"[}"), ErrKind::InvalidCharacter);
        assert_eq!(err_kind(b"{]"), ErrKind::InvalidCharacter);
        assert_eq!(err_kind(b"]"), ErrKind::InvalidCharacter);
        assert_eq!(err_kind(br#"{"a":1 "b":2}"#), ErrKind::InvalidCharacter);
        assert_eq!(err_kind(br#"{"a"::1}"#), ErrKind::InvalidCharacter);
    }

    #[test]
    fn test_no_garbage_after_root() {
        assert_eq!(
            tok(b"true extra"),
            Error::new(ErrKind::InvalidCharacter, b'e', 5)
        );
        assert_eq!(tok(b"{} {}"), Error::new(ErrKind::InvalidCharacter, b'{', 3));
    }

    #[test]
    fn test_truncated_documents() {
        assert_eq!(err_kind(b"{"), ErrKind::Partial);
        assert_eq!(err_kind(br#"{"a""#), ErrKind::Partial);
        assert_eq!(err_kind(br#"{"a":"#), ErrKind::Partial);
        assert_eq!(err_kind(br#"{"a":[1,2"#), ErrKind::Partial);
        assert_eq!(err_kind(br#"{"a":{"b":1}"#), ErrKind::Partial);
    }

    #[test]
    fn test_token_limit() {
        let data = br#"{"a": [1, 2, 3]}"#;
        let mut tokenizer = Tokenizer::with_limits(Limits {
            max_tokens: Some(6),
            ..Limits::default()
        });
        assert_eq!(tokenizer.tokenize(data).map(|t| t.len()), Ok(6));

        let mut tokenizer = Tokenizer::with_limits(Limits {
            max_tokens: Some(5),
            ..Limits::default()
        });
        assert_eq!(
            tokenizer.tokenize(data),
            Error::new(ErrKind::NoMemory, b'3', 13)
        );
    }

    #[test]
    fn test_depth_limit() {
        let mut tokenizer = Tokenizer::with_limits(Limits {
            max_tokens: None,
            max_depth: Some(2),
        });
        assert!(tokenizer.tokenize(b"[[1]]").is_ok());
        assert_eq!(
            tokenizer.tokenize(b"[[[1]]]"),
            Error::new(ErrKind::MaxDepthReached, b'[', 2)
        );

        let mut deep = vec![b'['; 2000];
        deep.extend(vec![b']'; 2000]);
        assert_eq!(Tokenizer::new().tokenize(&deep).map(|t| t.len()), Ok(2000));
    }

    #[test]
    fn test_count_matches_tokenize() {
        let data = br#"{"frames": {"a": {"frame": {"x": 1}}}, "meta": [true, null]}"#;
        let mut tokenizer = Tokenizer::new();
        let count = tokenizer.count(data).unwrap();
        assert_eq!(count, tokenizer.tokenize(data).unwrap().len());
        assert_eq!(tokenizer.count(b"[1,"), Error::new(ErrKind::Partial, b',', 3));
    }

    #[test]
    fn test_tokenizer_is_reusable_after_error() {
        let mut tokenizer = Tokenizer::new();
        assert!(tokenizer.tokenize(b"[1,").is_err());
        assert_eq!(tokenizer.tokenize(b"[1]").map(|t| t.len()), Ok(2));
    }

    #[test]
    fn test_error_display() {
        let err = tok(b"[x]").unwrap_err();
        assert_eq!(format!("{}", err), "invalid character 'x' at byte 1");
        assert_eq!(format!("{:?}", err), "InvalidCharacter(x) at 1");
    }
}
