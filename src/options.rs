//! Configuration for parsing and writing documents.
//!
//! - [`ParseOptions`]: grammar dialect, comment capture and stream buffering
//! - [`WriteOptions`]: indentation and optional punctuation in the output
//!
//! ## Examples
//!
//! ```rust
//! use kdl_relaxed::{parse_with_options, to_string_with_options};
//! use kdl_relaxed::{ParseOptions, Relaxed, WriteOptions};
//!
//! let options = ParseOptions::new().with_relaxed(Relaxed::YAML_TOML_ASSIGNMENTS);
//! let doc = parse_with_options(b"name: \"demo\"\nport = 80", &options).unwrap();
//!
//! let options = WriteOptions::new().with_add_equals(true);
//! let out = to_string_with_options(&doc, &options).unwrap();
//! assert_eq!(out, "name = \"demo\"\nport = 80\n");
//! ```

use crate::relaxed::Relaxed;
use crate::scanner::DEFAULT_BUFFER_SIZE;

/// Options controlling how a document is read.
///
/// # Examples
///
/// ```rust
/// use kdl_relaxed::{ParseOptions, Relaxed};
///
/// let options = ParseOptions::new()
///     .with_relaxed(Relaxed::NGINX_SYNTAX | Relaxed::MULTIPLIER_SUFFIXES)
///     .with_parse_comments(true)
///     .with_buffer_size(4096);
/// assert!(options.relaxed.permit(Relaxed::NGINX_SYNTAX));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    pub relaxed: Relaxed,
    /// Attach comments to the nodes they surround.
    pub parse_comments: bool,
    /// Initial buffer size when reading from a stream.
    pub buffer_size: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            relaxed: Relaxed::STRICT,
            parse_comments: false,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl ParseOptions {
    /// Creates default options: strict grammar, comments discarded, 64 KiB
    /// stream buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_relaxed(mut self, relaxed: Relaxed) -> Self {
        self.relaxed = relaxed;
        self
    }

    #[must_use]
    pub fn with_parse_comments(mut self, parse_comments: bool) -> Self {
        self.parse_comments = parse_comments;
        self
    }

    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }
}

/// Options controlling how a document is written.
///
/// # Examples
///
/// ```rust
/// use kdl_relaxed::WriteOptions;
///
/// let options = WriteOptions::new();
/// assert_eq!(options.indent, "\t");
/// assert!(!options.ignore_flags);
///
/// let options = WriteOptions::new().with_indent("    ").with_ignore_flags(true);
/// assert_eq!(options.indent, "    ");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteOptions {
    /// Indentation unit, repeated once per nesting level.
    pub indent: String,
    /// Write numbers in decimal regardless of the radix they were read in.
    pub ignore_flags: bool,
    /// End childless nodes with `;`.
    pub add_semicolons: bool,
    /// Write ` =` between the name and the arguments of nodes that have
    /// nothing but arguments.
    pub add_equals: bool,
    /// Write `:` after the name of nodes that have nothing but arguments.
    /// Ignored when `add_equals` is set.
    pub add_colons: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            indent: "\t".to_string(),
            ignore_flags: false,
            add_semicolons: false,
            add_equals: false,
            add_colons: false,
        }
    }
}

impl WriteOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    #[must_use]
    pub fn with_ignore_flags(mut self, ignore_flags: bool) -> Self {
        self.ignore_flags = ignore_flags;
        self
    }

    #[must_use]
    pub fn with_add_semicolons(mut self, add_semicolons: bool) -> Self {
        self.add_semicolons = add_semicolons;
        self
    }

    #[must_use]
    pub fn with_add_equals(mut self, add_equals: bool) -> Self {
        self.add_equals = add_equals;
        self
    }

    #[must_use]
    pub fn with_add_colons(mut self, add_colons: bool) -> Self {
        self.add_colons = add_colons;
        self
    }
}
