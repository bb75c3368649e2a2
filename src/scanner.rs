//! Streaming tokenizer.
//!
//! The [`Scanner`] turns a byte stream into [`Token`]s. It works either over
//! an in-memory slice, in which case token data borrows the input, or over a
//! [`Read`] implementation through a bounded buffer that is refilled as the
//! scan advances. Refills keep every byte from the oldest open mark onwards,
//! so a token that straddles a refill is still captured whole; the buffer
//! grows when a single token would not otherwise fit.
//!
//! ```rust
//! use kdl_relaxed::{Relaxed, Scanner, TokenKind};
//!
//! let mut scanner = Scanner::from_slice(b"node 0xff", Relaxed::STRICT);
//! let kinds: Vec<TokenKind> = scanner
//!     .scan_all()
//!     .unwrap()
//!     .into_iter()
//!     .map(|t| t.kind)
//!     .collect();
//! assert_eq!(
//!     kinds,
//!     [TokenKind::BareIdentifier, TokenKind::Whitespace, TokenKind::Hexadecimal]
//! );
//! ```

use crate::error::{Error, Position, Result, ScanErrorKind};
use crate::relaxed::Relaxed;
use crate::token::{Token, TokenKind};
use std::borrow::Cow;
use std::io::{self, Read};
use tracing::{debug, trace};

/// Initial buffer size used when scanning from a reader.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

const UTF8_MAX: usize = 4;

/// Carets further right than this are shifted left in error snippets.
const SNIPPET_MAX_CARET: usize = 64;

/// Failures detected while reading a single token, before they are located.
#[derive(Debug)]
enum LexError {
    Encoding,
    Char(char),
    Eof,
    Number,
    Io(String),
}

type LexResult<T> = std::result::Result<T, LexError>;

/// A tokenizer over a slice or a buffered reader.
pub struct Scanner<'a> {
    raw: Cow<'a, [u8]>,
    /// read position in `raw`
    pos: usize,
    /// number of valid bytes in `raw`
    end: usize,
    /// logical stream offset of `raw[0]`
    base: usize,
    reader: Option<Box<dyn Read + 'a>>,
    marks: Vec<usize>,
    line: usize,
    column: usize,
    after_cr: bool,
    relaxed: Relaxed,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner over an in-memory document; tokens borrow `input`.
    #[must_use]
    pub fn from_slice(input: &'a [u8], relaxed: Relaxed) -> Self {
        Scanner {
            end: input.len(),
            raw: Cow::Borrowed(input),
            pos: 0,
            base: 0,
            reader: None,
            marks: Vec::with_capacity(8),
            line: 0,
            column: 0,
            after_cr: false,
            relaxed,
        }
    }

    /// Creates a scanner reading from `reader` through a buffer of
    /// [`DEFAULT_BUFFER_SIZE`] bytes.
    #[must_use]
    pub fn from_reader<R: Read + 'a>(reader: R, relaxed: Relaxed) -> Self {
        Self::with_capacity(reader, DEFAULT_BUFFER_SIZE, relaxed)
    }

    /// Creates a scanner reading from `reader` through a buffer of (at least
    /// 16) `capacity` bytes.
    #[must_use]
    pub fn with_capacity<R: Read + 'a>(reader: R, capacity: usize, relaxed: Relaxed) -> Self {
        let capacity = capacity.max(UTF8_MAX * 4);
        Scanner {
            raw: Cow::Owned(vec![0; capacity]),
            pos: 0,
            end: 0,
            base: 0,
            reader: Some(Box::new(reader)),
            marks: Vec::with_capacity(8),
            line: 0,
            column: 0,
            after_cr: false,
            relaxed,
        }
    }

    /// Returns the dialect flags this scanner was created with.
    #[must_use]
    pub const fn relaxed(&self) -> Relaxed {
        self.relaxed
    }

    /// Returns the current 1-based position in the stream.
    #[must_use]
    pub fn position(&self) -> Position {
        Position::new(self.base + self.pos, self.line + 1, self.column + 1)
    }

    /// Returns the current capacity of the scan buffer.
    #[must_use]
    pub fn buffer_capacity(&self) -> usize {
        self.raw.len()
    }

    /// Reads the next token.
    ///
    /// Once the input is exhausted every call returns a token of kind
    /// [`TokenKind::Eof`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error::Encoding`], [`Error::Scan`] or [`Error::Io`]
    /// located at the point where scanning failed.
    pub fn next_token(&mut self) -> Result<Token<'a>> {
        let (line, column, offset) = (self.line, self.column, self.base + self.pos);

        self.push_mark();
        let result = self.read_token();
        let data = self.slice_from_mark();
        self.pop_mark();

        match result {
            Ok(kind) => {
                trace!(%kind, line, column, len = data.len(), "scanned token");
                Ok(Token {
                    kind,
                    data,
                    line,
                    column,
                    offset,
                })
            }
            Err(e) => Err(self.locate(e)),
        }
    }

    /// Reads every remaining token, excluding the final `Eof`.
    ///
    /// # Errors
    ///
    /// Returns the first scanning error encountered.
    pub fn scan_all(&mut self) -> Result<Vec<Token<'a>>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            if token.kind == TokenKind::Eof {
                return Ok(tokens);
            }
            tokens.push(token);
        }
    }

    // ------------------------------------------------------------------
    // Buffer management
    // ------------------------------------------------------------------

    /// Refills the buffer when a reader is attached and fewer than two
    /// maximum-width scalars remain unread.
    fn fill(&mut self) -> LexResult<()> {
        if self.reader.is_some() && self.end - self.pos <= UTF8_MAX * 2 {
            self.refill()?;
        }
        Ok(())
    }

    fn refill(&mut self) -> LexResult<()> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(());
        };

        let keep_from = self.marks.first().copied().unwrap_or(self.pos);
        let retained = self.end - keep_from;
        let buf = self.raw.to_mut();
        buf.copy_within(keep_from..self.end, 0);
        if retained > buf.len() * 3 / 4 {
            let grown = buf.len() * 2;
            buf.resize(grown, 0);
        }
        for mark in &mut self.marks {
            *mark -= keep_from;
        }
        self.pos -= keep_from;
        self.base += keep_from;
        self.end = retained;

        let mut exhausted = false;
        let mut failure = None;
        while self.end < buf.len() {
            match reader.read(&mut buf[self.end..]) {
                Ok(0) => {
                    exhausted = true;
                    break;
                }
                Ok(n) => self.end += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    failure = Some(e.to_string());
                    break;
                }
            }
        }
        debug!(
            retained,
            filled = self.end,
            capacity = buf.len(),
            "refilled scan buffer"
        );

        if exhausted || failure.is_some() {
            self.reader = None;
        }
        match failure {
            Some(msg) => Err(LexError::Io(msg)),
            None => Ok(()),
        }
    }

    fn push_mark(&mut self) {
        self.marks.push(self.pos);
    }

    fn pop_mark(&mut self) {
        self.marks.pop();
    }

    /// Bytes consumed since the most recent mark.
    fn marked(&self) -> &[u8] {
        let start = self.marks.last().copied().unwrap_or(self.pos);
        &self.raw[start..self.pos]
    }

    /// Bytes consumed since the most recent mark, borrowed from the input
    /// when scanning a slice and copied when scanning a stream.
    fn slice_from_mark(&self) -> Cow<'a, [u8]> {
        let start = self.marks.last().copied().unwrap_or(self.pos);
        match &self.raw {
            Cow::Borrowed(input) => {
                let input: &'a [u8] = input;
                Cow::Borrowed(&input[start..self.pos])
            }
            Cow::Owned(buf) => Cow::Owned(buf[start..self.pos].to_vec()),
        }
    }

    // ------------------------------------------------------------------
    // Character access
    // ------------------------------------------------------------------

    fn peek(&mut self) -> LexResult<Option<char>> {
        self.fill()?;
        Ok(decode(&self.raw[self.pos..self.end])?.map(|(c, _)| c))
    }

    fn peek_two(&mut self) -> LexResult<(Option<char>, Option<char>)> {
        self.fill()?;
        let input = &self.raw[self.pos..self.end];
        match decode(input)? {
            None => Ok((None, None)),
            Some((c, width)) => Ok((Some(c), decode(&input[width..])?.map(|(c, _)| c))),
        }
    }

    fn next_char(&mut self) -> LexResult<Option<char>> {
        self.fill()?;
        let Some((c, width)) = decode(&self.raw[self.pos..self.end])? else {
            return Ok(None);
        };
        self.pos += width;
        let crlf = c == '\n' && self.after_cr;
        if !is_newline(c) {
            self.column += 1;
        } else if !crlf {
            self.line += 1;
            self.column = 0;
        }
        self.after_cr = c == '\r';
        Ok(Some(c))
    }

    fn bump(&mut self, n: usize) -> LexResult<()> {
        for _ in 0..n {
            self.next_char()?;
        }
        Ok(())
    }

    fn skip_while(&mut self, mut valid: impl FnMut(char) -> bool) -> LexResult<usize> {
        let mut count = 0;
        while let Some(c) = self.peek()? {
            if !valid(c) {
                break;
            }
            self.next_char()?;
            count += 1;
        }
        Ok(count)
    }

    // ------------------------------------------------------------------
    // Token readers
    // ------------------------------------------------------------------

    fn read_token(&mut self) -> LexResult<TokenKind> {
        let nginx = self.relaxed.permit(Relaxed::NGINX_SYNTAX);
        let (c, next) = self.peek_two()?;
        let Some(c) = c else {
            return Ok(TokenKind::Eof);
        };

        match c {
            c if is_whitespace(c) => {
                self.skip_while(is_whitespace)?;
                Ok(TokenKind::Whitespace)
            }
            '\r' => {
                self.bump(if next == Some('\n') { 2 } else { 1 })?;
                Ok(TokenKind::Newline)
            }
            c if is_newline(c) => {
                self.bump(1)?;
                Ok(TokenKind::Newline)
            }
            '/' => match next {
                Some('*') => self.read_multi_line_comment(),
                Some('/') => self.read_single_line_comment(),
                Some('-') => {
                    self.bump(2)?;
                    Ok(TokenKind::TokenComment)
                }
                _ if nginx => self.read_identifier(),
                _ => Err(LexError::Char(c)),
            },
            '(' | ')' | '\\' if nginx => self.read_identifier(),
            '(' => self.punctuation(TokenKind::ParensOpen),
            ')' => self.punctuation(TokenKind::ParensClose),
            '{' => self.punctuation(TokenKind::BraceOpen),
            '}' => self.punctuation(TokenKind::BraceClose),
            '=' => self.punctuation(TokenKind::Equals),
            ';' => self.punctuation(TokenKind::Semicolon),
            '\\' => self.punctuation(TokenKind::Continuation),
            '+' | '-' => match next {
                Some(d) if d.is_ascii_digit() => self.read_decimal(),
                _ => self.read_identifier(),
            },
            '0' => match next {
                Some('x') => self.read_radix(16),
                Some('o') => self.read_radix(8),
                Some('b') => self.read_radix(2),
                _ => self.read_decimal(),
            },
            '1'..='9' => self.read_decimal(),
            '#' if nginx => self.read_single_line_comment(),
            ':' if self.relaxed.permit(Relaxed::YAML_TOML_ASSIGNMENTS) => {
                self.bump(1)?;
                Ok(TokenKind::Whitespace)
            }
            _ => self.read_identifier(),
        }
    }

    fn punctuation(&mut self, kind: TokenKind) -> LexResult<TokenKind> {
        self.bump(1)?;
        Ok(kind)
    }

    /// Reads a `/* ... */` comment; nested comments must be balanced.
    fn read_multi_line_comment(&mut self) -> LexResult<TokenKind> {
        let mut depth = 0usize;
        loop {
            let c = self.next_char()?.ok_or(LexError::Eof)?;
            match c {
                '*' if self.peek()? == Some('/') => {
                    self.bump(1)?;
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(TokenKind::MultiLineComment);
                    }
                }
                '/' if self.peek()? == Some('*') => {
                    self.bump(1)?;
                    depth += 1;
                }
                _ => {}
            }
        }
    }

    /// Reads a comment up to, but not including, the end of the line.
    fn read_single_line_comment(&mut self) -> LexResult<TokenKind> {
        self.skip_while(|c| !is_newline(c))?;
        Ok(TokenKind::SingleLineComment)
    }

    fn read_raw_string(&mut self) -> LexResult<TokenKind> {
        self.bump(1)?; // r
        let mut hashes = 0usize;
        loop {
            match self.next_char()?.ok_or(LexError::Eof)? {
                '"' => break,
                '#' => hashes += 1,
                c => return Err(LexError::Char(c)),
            }
        }

        let mut closing: Option<usize> = None;
        loop {
            let c = self.next_char()?.ok_or(LexError::Eof)?;
            closing = match (c, closing) {
                ('"', _) if hashes == 0 => return Ok(TokenKind::RawString),
                ('"', _) => Some(0),
                ('#', Some(n)) if n + 1 == hashes => return Ok(TokenKind::RawString),
                ('#', Some(n)) => Some(n + 1),
                _ => None,
            };
        }
    }

    fn read_quoted_string(&mut self, quote: char) -> LexResult<TokenKind> {
        self.bump(1)?;
        let mut escaped = false;
        loop {
            let c = self.next_char()?.ok_or(LexError::Eof)?;
            match c {
                '\\' => escaped = !escaped,
                c if c == quote && !escaped => return Ok(TokenKind::QuotedString),
                _ => escaped = false,
            }
        }
    }

    fn read_identifier(&mut self) -> LexResult<TokenKind> {
        let nginx = self.relaxed.permit(Relaxed::NGINX_SYNTAX);
        let (c, next) = self.peek_two()?;
        let c = c.ok_or(LexError::Eof)?;
        if (c as u32) <= 0x20 {
            return Err(LexError::Char(c));
        }

        match c {
            'r' if matches!(next, Some('#' | '"')) => return self.read_raw_string(),
            '"' => return self.read_quoted_string('"'),
            '\'' if nginx => return self.read_quoted_string('\''),
            '{' | '}' | '<' | '>' | ';' | '[' | ']' | '=' | ',' => {
                return Err(LexError::Char(c));
            }
            '\\' | '(' | ')' | '.' | '_' | '?' | '/' if !nginx => {
                return Err(LexError::Char(c));
            }
            _ => {}
        }

        let relaxed = self.relaxed;
        let sign_digit = is_sign(c) && next.map_or(false, |d| d.is_ascii_digit());
        if !is_bare_identifier_start(c, relaxed) || sign_digit {
            return Err(LexError::Char(c));
        }
        self.skip_while(|c| is_bare_identifier_char(c, relaxed))?;

        Ok(match self.marked() {
            b"true" | b"false" => TokenKind::Boolean,
            b"null" => TokenKind::Null,
            _ => TokenKind::BareIdentifier,
        })
    }

    /// Reads digits and `_` separators, and unit letters when multiplier
    /// suffixes are enabled. Returns whether a unit letter was seen.
    fn read_integer(&mut self) -> LexResult<bool> {
        let suffixes = self.relaxed.permit(Relaxed::MULTIPLIER_SUFFIXES);
        let mut suffixed = false;
        let mut first = true;
        while let Some(c) = self.peek()? {
            let valid = if c.is_ascii_digit() {
                true
            } else if first {
                false
            } else if suffixes && is_multiplier(c) {
                suffixed = true;
                true
            } else {
                c == '_'
            };
            if !valid {
                break;
            }
            self.next_char()?;
            first = false;
        }

        if first {
            return Err(self.peek()?.map_or(LexError::Eof, LexError::Char));
        }
        Ok(suffixed)
    }

    fn read_signed_integer(&mut self) -> LexResult<bool> {
        if matches!(self.peek()?, Some('+' | '-')) {
            self.bump(1)?;
        }
        self.read_integer()
    }

    fn read_decimal(&mut self) -> LexResult<TokenKind> {
        let mut suffixed = self.read_signed_integer()?;
        if self.peek()? == Some('.') {
            self.bump(1)?;
            suffixed |= self.read_integer()?;
        }
        if matches!(self.peek()?, Some('e' | 'E')) {
            self.bump(1)?;
            self.read_signed_integer()?;
        }

        match self.peek()? {
            Some(c) if !is_separator(c) => {
                let relaxed = self.relaxed;
                if relaxed.permit(Relaxed::NGINX_SYNTAX) && is_bare_identifier_char(c, relaxed) {
                    // a numeral followed by letters is a plain word in nginx configs
                    self.skip_while(|c| is_bare_identifier_char(c, relaxed))?;
                    Ok(TokenKind::BareIdentifier)
                } else {
                    Err(LexError::Char(c))
                }
            }
            _ if suffixed => Ok(TokenKind::SuffixedDecimal),
            _ => Ok(TokenKind::Decimal),
        }
    }

    /// Reads a `0x`, `0o` or `0b` literal.
    fn read_radix(&mut self, radix: u32) -> LexResult<TokenKind> {
        self.bump(2)?;
        if self.peek()? == Some('_') {
            return Err(LexError::Char('_'));
        }
        let digits = self.skip_while(|c| c == '_' || c.is_digit(radix))?;
        if digits == 0 {
            return Err(LexError::Number);
        }
        match self.peek()? {
            Some(c) if !is_separator(c) => Err(LexError::Char(c)),
            _ => Ok(match radix {
                16 => TokenKind::Hexadecimal,
                8 => TokenKind::Octal,
                _ => TokenKind::Binary,
            }),
        }
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    fn locate(&self, err: LexError) -> Error {
        let position = self.position();
        let snippet = self.snippet(self.pos);
        match err {
            LexError::Encoding => Error::Encoding { position, snippet },
            LexError::Char(c) => {
                Error::scan(ScanErrorKind::UnexpectedCharacter(c), position, snippet)
            }
            LexError::Eof => Error::scan(ScanErrorKind::UnexpectedEof, position, snippet),
            LexError::Number => Error::scan(ScanErrorKind::InvalidNumber, position, snippet),
            LexError::Io(msg) => Error::Io(msg),
        }
    }

    /// Renders the buffered source line around the stream offset `offset`.
    ///
    /// Returns an empty string once a refill has discarded that offset.
    pub(crate) fn snippet_at(&self, offset: usize) -> String {
        match offset.checked_sub(self.base) {
            Some(at) => self.snippet(at),
            None => String::new(),
        }
    }

    /// Renders the line containing buffer position `at`, followed by a caret
    /// line pointing at it.
    fn snippet(&self, at: usize) -> String {
        let raw = &self.raw[..self.end];
        let at = at.min(raw.len());
        let start = raw[..at]
            .iter()
            .rposition(|&b| is_newline_byte(b))
            .map_or(0, |i| i + 1);
        let end = raw[at..]
            .iter()
            .position(|&b| is_newline_byte(b))
            .map_or(raw.len(), |i| at + i);

        let mut line: Vec<char> = String::from_utf8_lossy(&raw[start..end])
            .chars()
            .map(|c| if c == '\t' { ' ' } else { c })
            .collect();
        let mut caret = String::from_utf8_lossy(&raw[start..at]).chars().count() + 1;

        if caret > SNIPPET_MAX_CARET {
            line.drain(..caret - SNIPPET_MAX_CARET);
            caret = SNIPPET_MAX_CARET;
            for c in line.iter_mut().take(3) {
                *c = '.';
            }
        }

        let mut out: String = line.into_iter().collect();
        out.push('\n');
        out.extend(std::iter::repeat(' ').take(caret - 1));
        out.push('^');
        out
    }
}

/// Scans exactly one token from an in-memory fragment.
///
/// The scanner lives on the caller's stack, so concurrent callers share no
/// state.
///
/// # Errors
///
/// Returns the scanning error if the fragment does not start with a valid
/// token.
///
/// # Examples
///
/// ```rust
/// use kdl_relaxed::{classify, Relaxed, TokenKind};
///
/// assert_eq!(classify(b"0o17", Relaxed::STRICT).unwrap().kind, TokenKind::Octal);
/// assert_eq!(classify(b"r#\"raw\"#", Relaxed::STRICT).unwrap().kind, TokenKind::RawString);
/// assert_eq!(classify(b"10ms", Relaxed::MULTIPLIER_SUFFIXES).unwrap().kind, TokenKind::SuffixedDecimal);
/// ```
pub fn classify(fragment: &[u8], relaxed: Relaxed) -> Result<Token<'_>> {
    Scanner::from_slice(fragment, relaxed).next_token()
}

/// Returns `true` if `s` can be written as a bare identifier and reads back
/// as the same string under the strict grammar.
///
/// Keywords (`true`, `false`, `null`) and numerals are not bare identifiers.
///
/// # Examples
///
/// ```rust
/// use kdl_relaxed::is_bare_identifier;
///
/// assert!(is_bare_identifier("node-name"));
/// assert!(!is_bare_identifier("two words"));
/// assert!(!is_bare_identifier("null"));
/// assert!(!is_bare_identifier("-5"));
/// assert!(!is_bare_identifier(""));
/// ```
#[must_use]
pub fn is_bare_identifier(s: &str) -> bool {
    match classify(s.as_bytes(), Relaxed::STRICT) {
        Ok(token) => token.kind == TokenKind::BareIdentifier && token.data.len() == s.len(),
        Err(_) => false,
    }
}

/// Decodes one scalar from the front of `bytes`.
fn decode(bytes: &[u8]) -> LexResult<Option<(char, usize)>> {
    let Some(&lead) = bytes.first() else {
        return Ok(None);
    };
    if lead < 0x80 {
        return Ok(Some((char::from(lead), 1)));
    }
    let width = match lead {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => return Err(LexError::Encoding),
    };
    let chunk = bytes.get(..width).ok_or(LexError::Encoding)?;
    let s = std::str::from_utf8(chunk).map_err(|_| LexError::Encoding)?;
    Ok(s.chars().next().map(|c| (c, width)))
}

pub(crate) fn is_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | ' '
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

pub(crate) fn is_newline(c: char) -> bool {
    matches!(
        c,
        '\r' | '\n' | '\u{0085}' | '\u{000C}' | '\u{2028}' | '\u{2029}'
    )
}

fn is_newline_byte(b: u8) -> bool {
    matches!(b, b'\r' | b'\n' | 0x0C)
}

fn is_line_space(c: char) -> bool {
    is_whitespace(c) || is_newline(c)
}

fn is_sign(c: char) -> bool {
    c == '+' || c == '-'
}

fn is_separator(c: char) -> bool {
    is_line_space(c) || c == ';'
}

fn is_multiplier(c: char) -> bool {
    matches!(
        c,
        'h' | 'm' | 's' | 'u' | 'µ' | 'k' | 'K' | 'M' | 'g' | 'G' | 't' | 'T' | 'b'
    )
}

fn is_bare_identifier_char(c: char, relaxed: Relaxed) -> bool {
    if is_line_space(c) || (c as u32) <= 0x20 {
        return false;
    }
    match c {
        '{' | '}' | '<' | '>' | ';' | '[' | ']' | '=' | ',' => false,
        '(' | ')' | '/' | '\\' | '"' => relaxed.permit(Relaxed::NGINX_SYNTAX),
        ':' => !relaxed.permit(Relaxed::YAML_TOML_ASSIGNMENTS),
        _ => true,
    }
}

fn is_bare_identifier_start(c: char, relaxed: Relaxed) -> bool {
    is_bare_identifier_char(c, relaxed) && !c.is_ascii_digit()
}
