//! Error types for KDL scanning, parsing and value conversion.
//!
//! Every failure surfaces as a single [`Error`] value. Errors raised while
//! reading a document carry the byte offset and the 1-based line/column of
//! the offending input, plus a rendered snippet of the source line with a
//! caret under the column, ready to print for interactive use.
//!
//! ## Error Categories
//!
//! - **Encoding**: malformed UTF-8 found by the scanner
//! - **Scan**: lexical errors (unexpected character, unterminated token)
//! - **Parse**: grammar errors (token not allowed in the current state)
//! - **Value**: value-domain errors (bad escape, number, suffix or duration)
//! - **Io**: failures of the underlying reader or writer
//!
//! ## Examples
//!
//! ```rust
//! use kdl_relaxed::{parse, ErrorKind};
//!
//! let err = parse("node \"unterminated").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Lexical);
//! assert_eq!(err.position().map(|p| p.line), Some(1));
//! ```

use std::fmt;
use thiserror::Error;

/// A location in the source text.
///
/// `offset` is a byte offset into the logical input stream; `line` and
/// `column` are 1-based and count Unicode scalar values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    #[must_use]
    pub const fn new(offset: usize, line: usize, column: usize) -> Self {
        Position {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// The lexical failure behind an [`Error::Scan`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanErrorKind {
    #[error("unexpected character {0:?}")]
    UnexpectedCharacter(char),

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("invalid numeric literal")]
    InvalidNumber,
}

/// Coarse classification of an [`Error`], one per failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Encoding,
    Lexical,
    Grammar,
    Value,
    Io,
    Custom,
}

/// Represents all possible errors produced by this crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Malformed UTF-8 in the input stream
    #[error("scan failed: invalid UTF-8 input at {position}{}", below(.snippet))]
    Encoding { position: Position, snippet: String },

    /// Lexical error while tokenizing
    #[error("scan failed: {kind} at {position}{}", below(.snippet))]
    Scan {
        kind: ScanErrorKind,
        position: Position,
        snippet: String,
    },

    /// Token not valid in the current grammar state
    #[error("parse failed: {message} at {position}{}", below(.snippet))]
    Parse {
        message: String,
        position: Position,
        snippet: String,
    },

    /// A literal that cannot be converted to a value
    #[error("invalid value: {message}{}{}", located(.position), below_opt(.snippet))]
    Value {
        message: String,
        position: Option<Position>,
        snippet: Option<String>,
    },

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

fn located(position: &Option<Position>) -> String {
    match position {
        Some(p) => format!(" at {p}"),
        None => String::new(),
    }
}

/// Puts a snippet on its own line; an empty snippet renders as nothing.
fn below(snippet: &str) -> String {
    if snippet.is_empty() {
        String::new()
    } else {
        format!("\n{snippet}")
    }
}

fn below_opt(snippet: &Option<String>) -> String {
    snippet.as_deref().map(below).unwrap_or_default()
}

impl Error {
    /// Creates a value-domain error without position information.
    ///
    /// The parser attaches the position of the offending token with
    /// [`Error::at`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kdl_relaxed::{Error, ErrorKind};
    ///
    /// let err = Error::value("escape out of range");
    /// assert_eq!(err.kind(), ErrorKind::Value);
    /// assert_eq!(err.to_string(), "invalid value: escape out of range");
    /// ```
    pub fn value<T: fmt::Display>(msg: T) -> Self {
        Error::Value {
            message: msg.to_string(),
            position: None,
            snippet: None,
        }
    }

    /// Creates a grammar error at `position` with a rendered source snippet.
    pub fn parse(msg: &str, position: Position, snippet: String) -> Self {
        Error::Parse {
            message: msg.to_string(),
            position,
            snippet,
        }
    }

    /// Creates a lexical error at `position` with a rendered source snippet.
    pub fn scan(kind: ScanErrorKind, position: Position, snippet: String) -> Self {
        Error::Scan {
            kind,
            position,
            snippet,
        }
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kdl_relaxed::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reader or writer failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Attaches `position` to a value error that has none yet; other errors
    /// are returned unchanged.
    #[must_use]
    pub fn at(self, position: Position) -> Self {
        match self {
            Error::Value {
                message,
                position: None,
                snippet,
            } => Error::Value {
                message,
                position: Some(position),
                snippet,
            },
            other => other,
        }
    }

    /// Attaches a rendered source snippet to a value error that has none
    /// yet; other errors, and empty snippets, leave the error unchanged.
    #[must_use]
    pub fn with_snippet(self, snippet: String) -> Self {
        match self {
            Error::Value {
                message,
                position,
                snippet: None,
            } if !snippet.is_empty() => Error::Value {
                message,
                position,
                snippet: Some(snippet),
            },
            other => other,
        }
    }

    /// Returns the failure class of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Error::Encoding { .. } => ErrorKind::Encoding,
            Error::Scan { .. } => ErrorKind::Lexical,
            Error::Parse { .. } => ErrorKind::Grammar,
            Error::Value { .. } => ErrorKind::Value,
            Error::Io(_) => ErrorKind::Io,
            Error::Custom(_) => ErrorKind::Custom,
        }
    }

    /// Returns the source position of this error, if it has one.
    #[must_use]
    pub const fn position(&self) -> Option<Position> {
        match self {
            Error::Encoding { position, .. }
            | Error::Scan { position, .. }
            | Error::Parse { position, .. } => Some(*position),
            Error::Value { position, .. } => *position,
            Error::Io(_) | Error::Custom(_) => None,
        }
    }

    /// Returns the rendered source line and caret, if this error has one.
    ///
    /// Errors located at input a streaming reader has already discarded
    /// carry no snippet.
    #[must_use]
    pub fn snippet(&self) -> Option<&str> {
        let snippet = match self {
            Error::Encoding { snippet, .. }
            | Error::Scan { snippet, .. }
            | Error::Parse { snippet, .. } => snippet.as_str(),
            Error::Value { snippet, .. } => snippet.as_deref()?,
            _ => return None,
        };
        Some(snippet).filter(|s| !s.is_empty())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
