//! Tokens produced by the [`Scanner`](crate::Scanner).

use crate::error::Position;
use std::borrow::Cow;
use std::fmt;

/// The lexical kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TokenKind {
    #[default]
    Unknown,
    Newline,
    Whitespace,
    MultiLineComment,
    SingleLineComment,
    /// The slashdash marker `/-`
    TokenComment,
    Decimal,
    Hexadecimal,
    Octal,
    Binary,
    Boolean,
    Null,
    BareIdentifier,
    SuffixedDecimal,
    RawString,
    QuotedString,
    BraceOpen,
    BraceClose,
    ParensOpen,
    ParensClose,
    Equals,
    Semicolon,
    /// A line continuation backslash
    Continuation,
    Eof,
}

/// Coarse token classes used by the parser's transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Whitespace,
    Value,
    Identifier,
    NonStringValue,
    Number,
    String,
    Terminator,
    EndOfLine,
    Comment,
}

impl TokenKind {
    /// Returns the classes this kind belongs to, in transition lookup order.
    #[must_use]
    pub const fn classes(self) -> &'static [TokenClass] {
        use TokenClass as C;
        match self {
            TokenKind::Newline => &[C::Terminator, C::Whitespace, C::EndOfLine],
            TokenKind::Whitespace => &[C::Whitespace],
            TokenKind::MultiLineComment | TokenKind::SingleLineComment => &[C::Comment],
            TokenKind::Decimal
            | TokenKind::Hexadecimal
            | TokenKind::Octal
            | TokenKind::Binary
            | TokenKind::SuffixedDecimal => &[C::Number, C::Value, C::NonStringValue],
            TokenKind::Boolean | TokenKind::Null => &[C::Value, C::NonStringValue],
            TokenKind::BareIdentifier => &[C::Value, C::Identifier],
            TokenKind::RawString | TokenKind::QuotedString => {
                &[C::Value, C::String, C::Identifier]
            }
            TokenKind::Semicolon => &[C::Terminator],
            TokenKind::Eof => &[C::Terminator, C::EndOfLine],
            _ => &[],
        }
    }

    /// Returns `true` if this kind belongs to `class`.
    #[inline]
    #[must_use]
    pub fn is(self, class: TokenClass) -> bool {
        self.classes().contains(&class)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Unknown => "(invalid)",
            TokenKind::Newline => "Newline",
            TokenKind::Whitespace => "Whitespace",
            TokenKind::MultiLineComment => "MultiLineComment",
            TokenKind::SingleLineComment => "SingleLineComment",
            TokenKind::TokenComment => "TokenComment",
            TokenKind::Decimal => "Decimal",
            TokenKind::Hexadecimal => "Hexadecimal",
            TokenKind::Octal => "Octal",
            TokenKind::Binary => "Binary",
            TokenKind::Boolean => "Boolean",
            TokenKind::Null => "Null",
            TokenKind::BareIdentifier => "BareIdentifier",
            TokenKind::SuffixedDecimal => "SuffixedDecimal",
            TokenKind::RawString => "RawString",
            TokenKind::QuotedString => "QuotedString",
            TokenKind::BraceOpen => "BraceOpen",
            TokenKind::BraceClose => "BraceClose",
            TokenKind::ParensOpen => "ParensOpen",
            TokenKind::ParensClose => "ParensClose",
            TokenKind::Equals => "Equals",
            TokenKind::Semicolon => "Semicolon",
            TokenKind::Continuation => "Continuation",
            TokenKind::Eof => "EOF",
        };
        f.write_str(name)
    }
}

/// A single token.
///
/// `data` borrows the input when scanning an in-memory slice and owns a copy
/// when scanning a stream, since the stream buffer is reused after a refill.
/// `line` and `column` are 0-based and point at the token's first scalar.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub data: Cow<'a, [u8]>,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl<'a> Token<'a> {
    /// Returns the raw bytes of the token.
    #[inline]
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the token text, replacing malformed UTF-8 with U+FFFD.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }

    /// Returns the 1-based position of the token's first scalar.
    #[must_use]
    pub const fn position(&self) -> Position {
        Position::new(self.offset, self.line + 1, self.column + 1)
    }

    /// Returns `true` unless this is the default, invalid token.
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.kind != TokenKind::Unknown
    }

    /// Detaches the token from the input it was scanned from.
    #[must_use]
    pub fn into_owned(self) -> Token<'static> {
        Token {
            kind: self.kind,
            data: Cow::Owned(self.data.into_owned()),
            line: self.line,
            column: self.column,
            offset: self.offset,
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.data.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}({})", self.kind, self.text())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newline_is_terminator_whitespace_and_eol() {
        let kind = TokenKind::Newline;
        assert_eq!(
            kind.classes(),
            &[
                TokenClass::Terminator,
                TokenClass::Whitespace,
                TokenClass::EndOfLine
            ]
        );
        assert!(kind.is(TokenClass::EndOfLine));
        assert!(!kind.is(TokenClass::Value));
    }

    #[test]
    fn test_strings_are_identifiers() {
        assert!(TokenKind::QuotedString.is(TokenClass::Identifier));
        assert!(TokenKind::RawString.is(TokenClass::String));
        assert!(!TokenKind::BareIdentifier.is(TokenClass::String));
        assert!(TokenKind::Null.is(TokenClass::NonStringValue));
        assert!(TokenKind::BraceOpen.classes().is_empty());
    }

    #[test]
    fn test_token_display() {
        let token = Token {
            kind: TokenKind::BareIdentifier,
            data: Cow::Borrowed(b"node"),
            ..Token::default()
        };
        assert_eq!(token.to_string(), "BareIdentifier(node)");
        let eof = Token {
            kind: TokenKind::Eof,
            ..Token::default()
        };
        assert_eq!(eof.to_string(), "EOF");
        assert_eq!(eof.position(), Position::new(0, 1, 1));
        assert!(!Token::default().is_valid());
    }
}
