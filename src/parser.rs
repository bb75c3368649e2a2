//! Building a [`Document`] from a token stream.
//!
//! The [`Parser`] is a push-down state machine. Each token is looked up by
//! its exact kind first and then by each of its classes, in the order
//! [`TokenKind::classes`] lists them; the first `(state, key)` pair with an
//! entry in the transition table decides what happens. A token with no entry
//! is a grammar error.
//!
//! Opening a block of children pushes the current state, and closing it pops
//! back, so the state stack mirrors the node stack.
//!
//! ```rust
//! use kdl_relaxed::{ParseOptions, Parser, Relaxed, Scanner};
//!
//! let scanner = Scanner::from_slice(b"server port=80 { tls true }", Relaxed::STRICT);
//! let doc = Parser::new(scanner, &ParseOptions::default()).parse().unwrap();
//!
//! let server = &doc.nodes()[0];
//! assert_eq!(server.get("port").and_then(|v| v.as_i64()), Some(80));
//! assert_eq!(server.children()[0].arguments()[0].as_bool(), Some(true));
//! ```

use crate::error::{Error, Result};
use crate::node::{Document, Node};
use crate::options::ParseOptions;
use crate::relaxed::Relaxed;
use crate::scanner::Scanner;
use crate::token::{Token, TokenClass, TokenKind};
use crate::value::Value;
use std::fmt;
use std::mem;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Document,
    Node,
    NodeParams,
    NodeEnd,
    ArgProp,
    Property,
    PropertyValue,
    Children,
    TypeAnnotation,
    TypeAnnotationDone,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Document => "Document",
            State::Node => "Node",
            State::NodeParams => "NodeParams",
            State::NodeEnd => "NodeEnd",
            State::ArgProp => "ArgProp",
            State::Property => "Property",
            State::PropertyValue => "PropertyValue",
            State::Children => "Children",
            State::TypeAnnotation => "TypeAnnotation",
            State::TypeAnnotationDone => "TypeAnnotationDone",
        };
        f.write_str(name)
    }
}

/// What a token is looked up by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Kind(TokenKind),
    Class(TokenClass),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    /// Ignore the token.
    Skip,
    /// Ignore the token unless a type annotation is waiting for its value.
    Space,
    /// A blank line, `;` or end of input between nodes.
    Blank,
    BufferComment,
    SkipNextNode,
    SkipNextEntry,
    OpenNode,
    Push(State),
    Set(State),
    Pop,
    Annotate,
    /// `=` straight after a node name.
    AssignName,
    /// `=` between a node name and its first argument.
    AssignParams,
    Continue,
    TrailingComment,
    /// A bare identifier in a parameter list.
    Name,
    Hold,
    Suffixed,
    OpenBlock,
    CloseBlock,
    EndNode,
    EndParams,
    EndLine,
    PropertyKey,
    Commit,
    CommitAndSkip,
    CommitAndHold,
    CommitAndEnd,
    Property,
    /// A `}` that also ends the node before it.
    Unwind,
}

/// Returns the entry of the transition table for `(state, key)`.
fn transition(state: State, key: Key) -> Option<Transition> {
    use Key::{Class, Kind};
    use TokenClass as C;
    use TokenKind as K;
    use Transition as T;

    let t = match (state, key) {
        (State::Document | State::Children, Kind(K::Whitespace)) => T::Space,
        (State::Document | State::Children, Class(C::Identifier)) => T::OpenNode,
        (State::Document | State::Children, Kind(K::ParensOpen)) => {
            T::Push(State::TypeAnnotation)
        }
        (State::Document | State::Children, Class(C::Comment)) => T::BufferComment,
        (State::Document | State::Children, Kind(K::TokenComment)) => T::SkipNextNode,
        (State::Document, Class(C::Terminator)) => T::Blank,
        (State::Children, Kind(K::Newline)) => T::Skip,
        (State::Children, Kind(K::BraceClose)) => T::CloseBlock,

        (State::TypeAnnotation, Kind(K::BareIdentifier) | Class(C::String)) => T::Annotate,
        (State::TypeAnnotationDone, Kind(K::ParensClose)) => T::Pop,

        (State::Node, Kind(K::Whitespace)) => T::Set(State::NodeParams),
        (State::Node, Kind(K::Equals)) => T::AssignName,
        (State::Node, Kind(K::BraceOpen)) => T::OpenBlock,
        (State::Node, Class(C::Terminator)) => T::EndNode,

        (State::NodeParams, Kind(K::Whitespace | K::MultiLineComment)) => T::Space,
        (State::NodeParams, Kind(K::Equals)) => T::AssignParams,
        (State::NodeParams, Kind(K::TokenComment)) => T::SkipNextEntry,
        (State::NodeParams, Kind(K::SingleLineComment)) => T::TrailingComment,
        (State::NodeParams, Kind(K::Continuation)) => T::Continue,
        (State::NodeParams, Kind(K::ParensOpen)) => T::Push(State::TypeAnnotation),
        (State::NodeParams, Kind(K::BareIdentifier)) => T::Name,
        (State::NodeParams, Kind(K::SuffixedDecimal)) => T::Suffixed,
        (State::NodeParams, Class(C::String | C::NonStringValue)) => T::Hold,
        (State::NodeParams, Kind(K::BraceOpen)) => T::OpenBlock,
        (State::NodeParams, Class(C::Terminator)) => T::EndParams,

        (State::NodeEnd, Kind(K::Whitespace)) => T::Skip,
        (State::NodeEnd, Class(C::EndOfLine)) => T::EndLine,

        (State::Property, Kind(K::Equals)) => T::PropertyKey,

        (State::ArgProp, Kind(K::TokenComment)) => T::CommitAndSkip,
        (State::ArgProp, Kind(K::BraceOpen)) => T::OpenBlock,
        (State::ArgProp, Kind(K::Equals)) => T::PropertyKey,
        (State::ArgProp, Kind(K::Whitespace)) => T::Commit,
        (State::ArgProp, Class(C::Terminator)) => T::CommitAndEnd,
        (State::ArgProp, Class(C::Value)) => T::CommitAndHold,

        (State::PropertyValue, Kind(K::ParensOpen)) => T::Push(State::TypeAnnotation),
        (State::PropertyValue, Class(C::Value)) => T::Property,

        (State::Node | State::NodeParams | State::ArgProp, Kind(K::BraceClose)) => T::Unwind,
        _ => return None,
    };
    Some(t)
}

/// A node whose declaration has not ended yet.
struct OpenNode {
    node: Node,
    /// Commented out with `/-`; checked for well-formedness, then dropped.
    detached: bool,
}

/// Parses the tokens of one [`Scanner`] into a [`Document`].
pub struct Parser<'a> {
    scanner: Scanner<'a>,
    relaxed: Relaxed,
    parse_comments: bool,
    document: Document,

    state: State,
    stack: Vec<State>,
    nodes: Vec<OpenNode>,

    /// First token of an argument or property not yet known to be either.
    pending: Option<Token<'a>>,
    annotation: Option<String>,
    continuation: bool,
    ignore_next_node: bool,
    ignore_next_entry: bool,
    ignore_children: usize,

    comments: Vec<String>,
    /// Newlines since the last token that was not whitespace.
    newlines: usize,
    /// Whether a blank line before the next comment is worth keeping.
    blank_allowed: bool,
}

impl<'a> Parser<'a> {
    /// Creates a parser reading from `scanner`.
    ///
    /// Only the comment setting of `options` is used here; the dialect is
    /// taken from the scanner so both always agree.
    pub fn new(scanner: Scanner<'a>, options: &ParseOptions) -> Self {
        Parser {
            relaxed: scanner.relaxed(),
            scanner,
            parse_comments: options.parse_comments,
            document: Document::new(),
            state: State::Document,
            stack: Vec::new(),
            nodes: Vec::new(),
            pending: None,
            annotation: None,
            continuation: false,
            ignore_next_node: false,
            ignore_next_entry: false,
            ignore_children: 0,
            comments: Vec::new(),
            newlines: 0,
            blank_allowed: false,
        }
    }

    /// Reads tokens until the end of input and returns the document.
    ///
    /// # Errors
    ///
    /// Returns the first scanning, value or grammar error. No partial
    /// document is returned.
    pub fn parse(mut self) -> Result<Document> {
        loop {
            let token = self.scanner.next_token()?;
            self.feed(&token)?;
            if token.kind == TokenKind::Eof {
                return self.finish(&token);
            }
        }
    }

    fn feed(&mut self, token: &Token<'a>) -> Result<()> {
        if token.kind == TokenKind::Newline {
            self.newlines += 1;
        }

        loop {
            let transition = self.lookup(token)?;
            trace!(state = %self.state, kind = %token.kind, ?transition, "transition");
            if !self.apply(transition, token)? {
                break;
            }
        }

        if !matches!(token.kind, TokenKind::Newline | TokenKind::Whitespace) {
            self.newlines = 0;
        }
        Ok(())
    }

    fn lookup(&self, token: &Token<'a>) -> Result<Transition> {
        std::iter::once(Key::Kind(token.kind))
            .chain(token.kind.classes().iter().copied().map(Key::Class))
            .find_map(|key| transition(self.state, key))
            .ok_or_else(|| self.unexpected(token))
    }

    /// Performs `transition`; returns `true` if the token must be looked up
    /// again in the new state.
    fn apply(&mut self, transition: Transition, token: &Token<'a>) -> Result<bool> {
        match transition {
            Transition::Skip => {}
            Transition::Space => self.reject_annotation(token)?,
            Transition::Blank => {
                if self.annotation.is_some() {
                    return Err(self.error("expected value after type annotation", token));
                }
            }
            Transition::BufferComment => {
                self.reject_annotation(token)?;
                self.buffer_comment(token);
            }
            Transition::SkipNextNode => self.ignore_next_node = true,
            Transition::SkipNextEntry => self.ignore_next_entry = true,
            Transition::OpenNode => self.open_node(token)?,
            Transition::Push(state) => self.push(state),
            Transition::Set(state) => self.state = state,
            Transition::Pop => self.pop(token)?,
            Transition::Annotate => {
                self.annotation = Some(self.value(token)?.value_string());
                self.state = State::TypeAnnotationDone;
            }
            Transition::AssignName => {
                if !self.relaxed.permit(Relaxed::YAML_TOML_ASSIGNMENTS) {
                    return Err(self.unexpected(token));
                }
                self.state = State::NodeParams;
            }
            Transition::AssignParams => {
                if !self.relaxed.permit(Relaxed::YAML_TOML_ASSIGNMENTS)
                    || self.annotation.is_some()
                    || self.pending.is_some()
                {
                    return Err(self.unexpected(token));
                }
            }
            Transition::Continue => self.continuation = true,
            Transition::TrailingComment => {
                if self.parse_comments {
                    let text = token.text().trim_end().to_string();
                    let comment = self.current_node(token)?.comment_mut();
                    comment.after = Some(match comment.after.take() {
                        Some(below) => text + &below,
                        None => text,
                    });
                }
                self.state = State::NodeEnd;
            }
            Transition::Name => {
                self.pending = Some(token.clone());
                self.state = if self.relaxed.permit(Relaxed::NGINX_SYNTAX) {
                    State::ArgProp
                } else {
                    State::Property
                };
            }
            Transition::Hold => {
                self.pending = Some(token.clone());
                self.state = State::ArgProp;
            }
            Transition::Suffixed => {
                self.pending = None;
                self.add_argument(token)?;
            }
            Transition::OpenBlock => {
                self.commit()?;
                if self.annotation.is_some() {
                    return Err(self.error("expected value after type annotation", token));
                }
                if mem::take(&mut self.ignore_next_entry) || self.ignore_children > 0 {
                    self.ignore_children += 1;
                }
                self.state = State::NodeParams;
                self.push(State::Children);
                self.blank_allowed = false;
            }
            Transition::CloseBlock => {
                self.reject_dangling_slashdash(token)?;
                self.ignore_children = self.ignore_children.saturating_sub(1);
                self.flush_comments_into_block();
                self.pop(token)?;
            }
            Transition::EndNode => {
                if self.continuation {
                    self.continuation = token.kind != TokenKind::Newline;
                } else {
                    self.close_node(token)?;
                }
            }
            Transition::EndParams => {
                if self.continuation {
                    self.continuation = token.kind != TokenKind::Newline;
                } else if self.annotation.is_some() {
                    return Err(self.error("expected value after type annotation", token));
                } else {
                    self.close_node(token)?;
                }
            }
            Transition::EndLine => {
                if self.continuation {
                    self.continuation = false;
                    self.state = State::NodeParams;
                } else {
                    self.close_node(token)?;
                }
            }
            Transition::PropertyKey => {
                let is_key = self.pending.as_ref().map_or(false, |t| {
                    matches!(
                        t.kind,
                        TokenKind::BareIdentifier | TokenKind::QuotedString | TokenKind::RawString
                    )
                });
                if self.annotation.is_some() || !is_key {
                    return Err(self.unexpected(token));
                }
                self.state = State::PropertyValue;
            }
            Transition::Commit => {
                self.commit()?;
                self.state = State::NodeParams;
            }
            Transition::CommitAndSkip => {
                self.commit()?;
                self.ignore_next_entry = true;
                self.state = State::NodeParams;
            }
            Transition::CommitAndHold => {
                self.commit()?;
                self.pending = Some(token.clone());
            }
            Transition::CommitAndEnd => {
                self.commit()?;
                self.close_node(token)?;
            }
            Transition::Property => {
                self.add_property(token)?;
                self.state = State::Node;
            }
            Transition::Unwind => {
                self.commit()?;
                if self.annotation.is_some() {
                    return Err(self.error("expected value after type annotation", token));
                }
                self.close_node(token)?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn finish(mut self, eof: &Token<'a>) -> Result<Document> {
        if self.state != State::Document
            || !self.stack.is_empty()
            || !self.nodes.is_empty()
            || self.annotation.is_some()
        {
            let message = format!("unexpected end of input in state {}", self.state);
            return Err(self.error(&message, eof));
        }
        self.reject_dangling_slashdash(eof)?;

        if !self.comments.is_empty() {
            let lines = mem::take(&mut self.comments).join("\n");
            if let Some(last) = self.document.nodes_mut().last_mut() {
                append_below(last, &lines);
            }
        }

        debug!(nodes = self.document.len(), "parsed document");
        Ok(self.document)
    }

    // ------------------------------------------------------------------
    // Stacks
    // ------------------------------------------------------------------

    fn push(&mut self, state: State) {
        self.stack.push(self.state);
        self.state = state;
    }

    fn pop(&mut self, token: &Token<'a>) -> Result<()> {
        match self.stack.pop() {
            Some(state) => {
                self.state = state;
                Ok(())
            }
            None => Err(self.unexpected(token)),
        }
    }

    fn open_node(&mut self, token: &Token<'a>) -> Result<()> {
        let detached = mem::take(&mut self.ignore_next_node) || self.ignore_children > 0;

        let mut node = Node::new(self.value(token)?);
        node.set_type_annotation(self.annotation.take());
        if !self.comments.is_empty() {
            if self.newlines >= 2 {
                self.comments.push(String::new());
            }
            node.comment_mut().before = Some(mem::take(&mut self.comments).join("\n"));
        }

        self.nodes.push(OpenNode { node, detached });
        self.push(State::Node);
        Ok(())
    }

    fn close_node(&mut self, token: &Token<'a>) -> Result<()> {
        if self.ignore_next_entry {
            return Err(self.error("expected argument, property or block after /-", token));
        }
        self.pop(token)?;
        let Some(open) = self.nodes.pop() else {
            return Err(self.unexpected(token));
        };
        self.continuation = false;
        self.blank_allowed = true;

        if open.detached {
            trace!(name = %open.node.name(), "dropped commented-out node");
        } else if let Some(parent) = self.nodes.last_mut() {
            parent.node.add_child(open.node);
        } else {
            self.document.push(open.node);
        }
        Ok(())
    }

    fn current_node(&mut self, token: &Token<'a>) -> Result<&mut Node> {
        if self.nodes.is_empty() {
            return Err(self.unexpected(token));
        }
        let last = self.nodes.len() - 1;
        Ok(&mut self.nodes[last].node)
    }

    // ------------------------------------------------------------------
    // Arguments and properties
    // ------------------------------------------------------------------

    /// Adds the pending token, if any, as an argument.
    fn commit(&mut self) -> Result<()> {
        match self.pending.take() {
            Some(pending) => self.add_argument(&pending),
            None => Ok(()),
        }
    }

    fn add_argument(&mut self, token: &Token<'a>) -> Result<()> {
        let mut value = self.value(token)?;
        value.set_type_annotation(self.annotation.take());
        if !mem::take(&mut self.ignore_next_entry) {
            self.current_node(token)?.add_argument(value);
        }
        Ok(())
    }

    fn add_property(&mut self, token: &Token<'a>) -> Result<()> {
        let Some(key) = self.pending.take() else {
            return Err(self.unexpected(token));
        };
        let key = self.value(&key)?.value_string();
        let mut value = self.value(token)?;
        value.set_type_annotation(self.annotation.take());
        if !mem::take(&mut self.ignore_next_entry) {
            self.current_node(token)?.add_property(key, value);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------

    fn buffer_comment(&mut self, token: &Token<'a>) {
        if !self.parse_comments {
            return;
        }
        if self.newlines >= 2 && (!self.comments.is_empty() || self.blank_allowed) {
            self.comments.push(String::new());
        }
        self.comments.push(token.text().trim_end().to_string());
    }

    /// Hands comments left at the end of a block to the last node closed in
    /// it, or to the node owning the block if there is none.
    fn flush_comments_into_block(&mut self) {
        if self.comments.is_empty() {
            return;
        }
        let lines = mem::take(&mut self.comments).join("\n");
        if let Some(open) = self.nodes.last_mut() {
            let target = match open.node.children().len() {
                0 => &mut open.node,
                n => &mut open.node.children_mut()[n - 1],
            };
            append_below(target, &lines);
        }
    }

    // ------------------------------------------------------------------
    // Errors
    // ------------------------------------------------------------------

    /// Decodes a value token; errors carry the source snippet around it.
    fn value(&self, token: &Token<'a>) -> Result<Value> {
        Value::from_token(token)
            .map_err(|e| e.with_snippet(self.scanner.snippet_at(token.offset)))
    }

    fn reject_dangling_slashdash(&self, token: &Token<'a>) -> Result<()> {
        if self.ignore_next_node {
            return Err(self.error("expected node after /-", token));
        }
        Ok(())
    }

    fn reject_annotation(&self, token: &Token<'a>) -> Result<()> {
        if self.annotation.is_some() {
            return Err(self.unexpected(token));
        }
        Ok(())
    }

    fn unexpected(&self, token: &Token<'a>) -> Error {
        let message = format!("unexpected {} in state {}", token.kind, self.state);
        self.error(&message, token)
    }

    fn error(&self, message: &str, token: &Token<'a>) -> Error {
        Error::parse(message, token.position(), self.scanner.snippet_at(token.offset))
    }
}

/// Appends comment lines below `node`, after any trailing comment it has.
fn append_below(node: &mut Node, lines: &str) {
    let after = node.comment_mut().after.get_or_insert_with(String::new);
    after.push('\n');
    after.push_str(lines);
}
