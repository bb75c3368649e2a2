//! # kdl_relaxed
//!
//! A reader and writer for KDL node-tree documents, with opt-in relaxed
//! dialects for configuration files written in the style of NGINX, YAML or
//! TOML.
//!
//! ## What is KDL?
//!
//! A KDL document is a list of nodes. Each node has a name, positional
//! arguments, named properties and an optional block of child nodes:
//!
//! ```text
//! server "main" port=8080 {
//!     tls enabled=true
//!     (path)root "/srv/www"
//! }
//! ```
//!
//! ## Key Features
//!
//! - **Streaming**: documents can be read from any `io::Read` through a
//!   bounded buffer, or scanned straight out of a byte slice without copying
//! - **Lossless numbers**: integers beyond 64 bits and decimals beyond `f64`
//!   keep every digit
//! - **Format preservation**: hexadecimal, octal and binary literals are
//!   written back in the radix they were read in
//! - **Comments**: optionally attached to nodes and written back around them
//! - **Relaxed dialects**: bare-word arguments and `#` comments, `key: value`
//!   and `key = value` assignments, and `10k` / `1h30m` style suffixes
//!
//! ## Quick Start
//!
//! ```rust
//! use kdl_relaxed::{parse, to_string};
//!
//! let doc = parse("point x=1 y=2\nparent { child }").unwrap();
//!
//! let point = doc.node("point").unwrap();
//! assert_eq!(point.get("x").and_then(|v| v.as_i64()), Some(1));
//! assert_eq!(doc.node("parent").unwrap().children().len(), 1);
//!
//! assert_eq!(to_string(&doc).unwrap(), "point x=1 y=2\nparent {\n\tchild\n}\n");
//! ```
//!
//! ### Relaxed Dialects
//!
//! ```rust
//! use kdl_relaxed::{parse_with_options, to_string_with_options};
//! use kdl_relaxed::{ParseOptions, Relaxed, WriteOptions};
//!
//! let input = b"location / {\n\t# comment\n\troot /var/www/html;\n}";
//! let options = ParseOptions::new().with_relaxed(Relaxed::NGINX_SYNTAX);
//! let doc = parse_with_options(input, &options).unwrap();
//!
//! let out = to_string_with_options(&doc, &WriteOptions::new().with_indent("    ")).unwrap();
//! assert_eq!(out, "location \"/\" {\n    root \"/var/www/html\"\n}\n");
//! ```
//!
//! ### Building Documents
//!
//! ```rust
//! use kdl_relaxed::{to_string, Document, Node, Value, ValueFlag};
//!
//! let mask = Value::from(255).with_flag(ValueFlag::Hexadecimal);
//! let doc: Document = vec![Node::new("mask").with_argument(mask)].into();
//! assert_eq!(to_string(&doc).unwrap(), "mask 0xff\n");
//! ```
//!
//! ## Logging
//!
//! The scanner and parser emit [`tracing`] events at `trace` level for every
//! token and transition, and at `debug` level for buffer refills and finished
//! documents. No subscriber is installed by the library.
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - Input is validated as UTF-8 while it is scanned
//! - Errors carry the line, column and a caret snippet of the offending input
//! - No partial documents are returned on error

pub mod error;
pub mod map;
pub mod node;
pub mod number;
pub mod options;
pub mod parser;
pub mod quote;
pub mod relaxed;
pub mod scanner;
pub mod ser;
pub mod suffixed;
pub mod token;
pub mod value;

pub use error::{Error, ErrorKind, Position, Result, ScanErrorKind};
pub use map::Properties;
pub use node::{Comment, Document, Node};
pub use number::{BigDecimal, Number};
pub use options::{ParseOptions, WriteOptions};
pub use parser::Parser;
pub use relaxed::Relaxed;
pub use scanner::{classify, is_bare_identifier, Scanner};
pub use ser::Serializer;
pub use suffixed::SuffixedDecimal;
pub use token::{Token, TokenClass, TokenKind};
pub use value::{Format, Value, ValueFlag, ValueKind};

use std::io;

/// Parses a document in the strict grammar.
///
/// # Examples
///
/// ```rust
/// use kdl_relaxed::parse;
///
/// let doc = parse("name \"Bob\"").unwrap();
/// assert_eq!(doc.nodes()[0].arguments()[0].as_str(), Some("Bob"));
/// ```
///
/// # Errors
///
/// Returns an error if the input is not a well-formed document. Error
/// messages include line and column information.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse(input: &str) -> Result<Document> {
    parse_slice(input.as_bytes())
}

/// Parses a document in the strict grammar from raw bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8 or not a well-formed
/// document.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_slice(input: &[u8]) -> Result<Document> {
    parse_with_options(input, &ParseOptions::default())
}

/// Parses a document with custom options.
///
/// # Examples
///
/// ```rust
/// use kdl_relaxed::{parse_with_options, ParseOptions, Relaxed};
///
/// let options = ParseOptions::new().with_relaxed(Relaxed::MULTIPLIER_SUFFIXES);
/// let doc = parse_with_options(b"cache 64kb", &options).unwrap();
///
/// let size = doc.nodes()[0].arguments()[0].as_suffixed().unwrap();
/// assert_eq!(size.as_number().unwrap().as_i64(), Some(64 * 1024));
/// ```
///
/// # Errors
///
/// Returns an error if the input is not a well-formed document in the
/// selected dialect.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_with_options(input: &[u8], options: &ParseOptions) -> Result<Document> {
    let scanner = Scanner::from_slice(input, options.relaxed);
    Parser::new(scanner, options).parse()
}

/// Parses a document in the strict grammar from an I/O stream.
///
/// # Examples
///
/// ```rust
/// use kdl_relaxed::parse_reader;
/// use std::io::Cursor;
///
/// let doc = parse_reader(Cursor::new(b"a 1\nb 2")).unwrap();
/// assert_eq!(doc.len(), 2);
/// ```
///
/// # Errors
///
/// Returns an error if reading fails or the input is not a well-formed
/// document.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_reader<R>(reader: R) -> Result<Document>
where
    R: io::Read,
{
    parse_reader_with_options(reader, &ParseOptions::default())
}

/// Parses a document from an I/O stream with custom options.
///
/// The stream is read through a buffer of `options.buffer_size` bytes that
/// only grows when a single token does not fit.
///
/// # Errors
///
/// Returns an error if reading fails or the input is not a well-formed
/// document in the selected dialect.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_reader_with_options<R>(reader: R, options: &ParseOptions) -> Result<Document>
where
    R: io::Read,
{
    let scanner = Scanner::with_capacity(reader, options.buffer_size, options.relaxed);
    Parser::new(scanner, options).parse()
}

/// Writes a document to a string.
///
/// # Examples
///
/// ```rust
/// use kdl_relaxed::{parse, to_string};
///
/// let doc = parse("n 0xFF").unwrap();
/// assert_eq!(to_string(&doc).unwrap(), "n 0xff\n");
/// ```
///
/// # Errors
///
/// Never fails for an in-memory buffer; the `Result` mirrors
/// [`to_writer`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string(doc: &Document) -> Result<String> {
    to_string_with_options(doc, &WriteOptions::default())
}

/// Writes a document to a string with custom options.
///
/// # Examples
///
/// ```rust
/// use kdl_relaxed::{parse, to_string_with_options, WriteOptions};
///
/// let doc = parse("n 0xFF").unwrap();
/// let options = WriteOptions::new().with_ignore_flags(true).with_add_semicolons(true);
/// assert_eq!(to_string_with_options(&doc, &options).unwrap(), "n 255;\n");
/// ```
///
/// # Errors
///
/// Never fails for an in-memory buffer; the `Result` mirrors
/// [`to_writer_with_options`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options(doc: &Document, options: &WriteOptions) -> Result<String> {
    let mut serializer = Serializer::with_options(Vec::with_capacity(128), options.clone());
    serializer.serialize_document(doc)?;
    String::from_utf8(serializer.into_inner()).map_err(Error::custom)
}

/// Writes a document to an I/O stream.
///
/// # Examples
///
/// ```rust
/// use kdl_relaxed::{parse, to_writer};
///
/// let doc = parse("a; b").unwrap();
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &doc).unwrap();
/// assert_eq!(buffer, b"a\nb\n");
/// ```
///
/// # Errors
///
/// Returns an error if writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W>(writer: W, doc: &Document) -> Result<()>
where
    W: io::Write,
{
    to_writer_with_options(writer, doc, &WriteOptions::default())
}

/// Writes a document to an I/O stream with custom options.
///
/// # Errors
///
/// Returns an error if writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W>(writer: W, doc: &Document, options: &WriteOptions) -> Result<()>
where
    W: io::Write,
{
    let mut serializer = Serializer::with_options(writer, options.clone());
    serializer.serialize_document(doc)
}
