//! Document serialization.
//!
//! The [`Serializer`] writes a [`Document`] depth first, one line per node
//! plus a closing line per block of children. Arguments and property values
//! keep the radix they were read in and are always quoted when they are
//! strings; node names are bare wherever the grammar allows.
//!
//! ## Usage
//!
//! Most users should use the functions in the crate root:
//!
//! ```rust
//! use kdl_relaxed::{parse, to_string};
//!
//! let doc = parse("node  0xFF   key=value").unwrap();
//! assert_eq!(to_string(&doc).unwrap(), "node 0xff key=\"value\"\n");
//! ```
//!
//! ## Direct Serializer Usage
//!
//! ```rust
//! use kdl_relaxed::{parse, Serializer, WriteOptions};
//!
//! let doc = parse("parent { child 1; }").unwrap();
//! let options = WriteOptions::new().with_indent("  ").with_add_semicolons(true);
//! let mut serializer = Serializer::with_options(Vec::new(), options);
//! serializer.serialize_document(&doc).unwrap();
//!
//! let out = String::from_utf8(serializer.into_inner()).unwrap();
//! assert_eq!(out, "parent {\n  child 1;\n}\n");
//! ```

use crate::error::{Error, Result};
use crate::node::{Document, Node};
use crate::options::WriteOptions;
use crate::value::{append_identifier, Format};
use std::io::Write;
use tracing::debug;

/// Writes documents to an [`io::Write`](std::io::Write) sink.
pub struct Serializer<W: Write> {
    writer: W,
    options: WriteOptions,
    buffer: String,
}

impl<W: Write> Serializer<W> {
    /// Creates a serializer with default [`WriteOptions`].
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, WriteOptions::default())
    }

    pub fn with_options(writer: W, options: WriteOptions) -> Self {
        Serializer {
            writer,
            options,
            buffer: String::with_capacity(256),
        }
    }

    #[must_use]
    pub const fn options(&self) -> &WriteOptions {
        &self.options
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Writes every top-level node of `doc`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the writer fails.
    pub fn serialize_document(&mut self, doc: &Document) -> Result<()> {
        for node in doc.nodes() {
            self.serialize_node(node, 0)?;
        }
        debug!(nodes = doc.len(), "serialized document");
        Ok(())
    }

    /// Writes `node` and its children, indented for nesting level `depth`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the writer fails.
    pub fn serialize_node(&mut self, node: &Node, depth: usize) -> Result<()> {
        self.buffer.clear();
        append_node(&mut self.buffer, node, depth, &self.options);
        self.writer
            .write_all(self.buffer.as_bytes())
            .map_err(|e| Error::io(&e.to_string()))
    }
}

/// Renders a single node with default options.
pub(crate) fn node_to_string(node: &Node) -> String {
    let mut out = String::new();
    append_node(&mut out, node, 0, &WriteOptions::default());
    out
}

fn append_node(out: &mut String, node: &Node, depth: usize, options: &WriteOptions) {
    let indent = options.indent.repeat(depth);
    let comment = node.comment();

    if let Some(before) = comment.and_then(|c| c.before.as_deref()) {
        append_leading_comment(out, before, &indent);
    }

    out.push_str(&indent);
    if let Some(annotation) = node.type_annotation() {
        out.push('(');
        append_identifier(out, annotation);
        out.push(')');
    }
    node.name().append_to(out, Format::NodeName);

    let arguments_only = !node.arguments().is_empty()
        && node.properties().is_empty()
        && node.children().is_empty();
    if arguments_only && options.add_equals {
        out.push_str(" =");
    } else if arguments_only && options.add_colons {
        out.push(':');
    }

    let format = if options.ignore_flags {
        Format::Unformatted
    } else {
        Format::Formatted
    };
    for argument in node.arguments() {
        out.push(' ');
        argument.append_to(out, format);
    }
    node.properties().append_to(out, format);

    if !node.children().is_empty() {
        out.push_str(" {\n");
        for child in node.children() {
            append_node(out, child, depth + 1, options);
        }
        out.push_str(&indent);
        out.push('}');
    } else if options.add_semicolons {
        out.push(';');
    }

    if let Some(after) = comment.and_then(|c| c.after.as_deref()) {
        append_trailing_comment(out, after, &indent);
    }
    out.push('\n');
}

/// Writes comment lines above a node; runs of blank lines collapse to one.
fn append_leading_comment(out: &mut String, comment: &str, indent: &str) {
    let mut blank = false;
    for line in comment.split('\n').map(str::trim) {
        if line.is_empty() {
            if !blank {
                out.push('\n');
            }
            blank = true;
            continue;
        }
        blank = false;
        out.push_str(indent);
        out.push_str(line);
        out.push('\n');
    }
}

/// Writes the first line inline after the node, the rest on lines of their
/// own.
fn append_trailing_comment(out: &mut String, comment: &str, indent: &str) {
    let mut lines = comment.split('\n').map(str::trim);
    if let Some(first) = lines.next().filter(|l| !l.is_empty()) {
        out.push(' ');
        out.push_str(first);
    }
    let mut blank = false;
    for line in lines {
        out.push('\n');
        if line.is_empty() {
            if blank {
                out.pop();
            }
            blank = true;
            continue;
        }
        blank = false;
        out.push_str(indent);
        out.push_str(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Comment;
    use crate::value::{Value, ValueFlag};

    fn render(doc: &Document, options: WriteOptions) -> String {
        let mut serializer = Serializer::with_options(Vec::new(), options);
        serializer.serialize_document(doc).unwrap();
        String::from_utf8(serializer.into_inner()).unwrap()
    }

    fn sample() -> Document {
        vec![
            Node::new("title").with_argument("Hello"),
            Node::new("mask")
                .with_argument(Value::from(255).with_flag(ValueFlag::Hexadecimal))
                .with_property("on", true),
            Node::new("parent").with_child(Node::new("child")),
        ]
        .into()
    }

    #[test]
    fn test_default_layout() {
        assert_eq!(
            render(&sample(), WriteOptions::default()),
            "title \"Hello\"\nmask 0xff on=true\nparent {\n\tchild\n}\n"
        );
    }

    #[test]
    fn test_ignore_flags_and_semicolons() {
        let options = WriteOptions::new()
            .with_ignore_flags(true)
            .with_add_semicolons(true)
            .with_indent("    ");
        assert_eq!(
            render(&sample(), options),
            "title \"Hello\";\nmask 255 on=true;\nparent {\n    child;\n}\n"
        );
    }

    #[test]
    fn test_equals_and_colons_only_for_plain_argument_lists() {
        let equals = WriteOptions::new().with_add_equals(true);
        assert_eq!(
            render(&sample(), equals),
            "title = \"Hello\"\nmask 0xff on=true\nparent {\n\tchild\n}\n"
        );
        let colons = WriteOptions::new().with_add_colons(true);
        assert!(render(&sample(), colons).starts_with("title: \"Hello\"\n"));
    }

    #[test]
    fn test_node_names_and_type_annotations() {
        let mut node = Node::new("two words");
        node.set_type_annotation(Some("t".into()));
        node.add_argument(Value::from("x").with_type_annotation("u8"));
        assert_eq!(node_to_string(&node), "(t)\"two words\" (u8)\"x\"\n");
    }

    #[test]
    fn test_comments() {
        let mut child = Node::new("child");
        child.set_comment(Some(Comment {
            before: Some("// one\n\n\n  // two".into()),
            after: Some("// inline\n\n// trailing".into()),
        }));
        let doc: Document = vec![Node::new("parent").with_child(child)].into();
        assert_eq!(
            render(&doc, WriteOptions::default()),
            "parent {\n\t// one\n\n\t// two\n\tchild // inline\n\n\t// trailing\n}\n"
        );
    }

    #[test]
    fn test_trailing_comment_without_inline_part() {
        let mut node = Node::new("n");
        node.comment_mut().after = Some("\n// below".into());
        assert_eq!(node_to_string(&node), "n\n// below\n");
    }

    #[test]
    fn test_writer_failure_is_io_error() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let err = Serializer::new(Broken)
            .serialize_document(&sample())
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Io);
    }
}
