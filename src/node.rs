//! The document tree.
//!
//! A [`Document`] owns its top-level [`Node`]s and every node owns its
//! children outright, so a tree is always acyclic and can be moved or shared
//! across threads as a plain value.
//!
//! ```rust
//! use kdl_relaxed::{Document, Node};
//!
//! let mut server = Node::new("server");
//! server.add_argument("main");
//! server.add_property("port", 8080);
//! server.add_child(Node::new("tls").with_argument(true));
//!
//! let mut doc = Document::new();
//! doc.push(server);
//!
//! assert_eq!(doc.nodes()[0].get("port").and_then(|v| v.as_i64()), Some(8080));
//! assert!(doc.nodes()[0].child("tls").is_some());
//! assert_eq!(
//!     doc.to_string(),
//!     "server \"main\" port=8080 {\n\ttls true\n}\n"
//! );
//! ```

use crate::map::Properties;
use crate::ser;
use crate::value::Value;
use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};
use std::fmt;

/// Comments attached to a node.
///
/// `before` holds the comment lines preceding the node; `after` holds the
/// comment trailing its line, followed by any comment lines that closed the
/// enclosing block after it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Comment {
    pub before: Option<String>,
    pub after: Option<String>,
}

impl Comment {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.before.is_none() && self.after.is_none()
    }
}

/// A named node with arguments, properties and children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    name: Value,
    type_annotation: Option<String>,
    arguments: Vec<Value>,
    properties: Properties,
    children: Vec<Node>,
    comment: Option<Comment>,
}

impl Node {
    #[must_use]
    pub fn new(name: impl Into<Value>) -> Self {
        Node {
            name: name.into(),
            ..Node::default()
        }
    }

    pub fn set_name(&mut self, name: impl Into<Value>) {
        self.name = name.into();
    }

    pub fn set_type_annotation(&mut self, annotation: Option<String>) {
        self.type_annotation = annotation;
    }

    pub fn set_comment(&mut self, comment: Option<Comment>) {
        self.comment = comment;
    }

    pub fn add_argument(&mut self, value: impl Into<Value>) {
        self.arguments.push(value.into());
    }

    /// Sets a property; a repeated key keeps its first position and takes
    /// the new value.
    pub fn add_property(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.properties.insert(key, value.into())
    }

    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    #[must_use]
    pub fn with_argument(mut self, value: impl Into<Value>) -> Self {
        self.add_argument(value);
        self
    }

    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.add_property(key, value);
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Node) -> Self {
        self.add_child(child);
        self
    }

    #[inline]
    #[must_use]
    pub const fn name(&self) -> &Value {
        &self.name
    }

    #[must_use]
    pub fn type_annotation(&self) -> Option<&str> {
        self.type_annotation.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    pub fn arguments_mut(&mut self) -> &mut Vec<Value> {
        &mut self.arguments
    }

    #[inline]
    #[must_use]
    pub const fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    #[must_use]
    pub const fn comment(&self) -> Option<&Comment> {
        self.comment.as_ref()
    }

    /// Returns the node's comment, creating an empty one if needed.
    pub fn comment_mut(&mut self) -> &mut Comment {
        self.comment.get_or_insert_with(Comment::default)
    }

    /// Returns the value of property `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Returns the first child named `name`.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name.as_str() == Some(name))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&ser::node_to_string(self))
    }
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut node = serializer.serialize_struct("Node", 5)?;
        node.serialize_field("name", &self.name)?;
        node.serialize_field("type", &self.type_annotation)?;
        node.serialize_field("arguments", &self.arguments)?;
        node.serialize_field("properties", &self.properties)?;
        node.serialize_field("children", &self.children)?;
        node.end()
    }
}

/// An ordered list of top-level nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Document { nodes: Vec::new() }
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut Vec<Node> {
        &mut self.nodes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the first top-level node named `name`.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name.as_str() == Some(name))
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            fmt::Display::fmt(node, f)?;
        }
        Ok(())
    }
}

impl From<Vec<Node>> for Document {
    fn from(nodes: Vec<Node>) -> Self {
        Document { nodes }
    }
}

impl FromIterator<Node> for Document {
    fn from_iter<T: IntoIterator<Item = Node>>(iter: T) -> Self {
        Document {
            nodes: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Document {
    type Item = Node;
    type IntoIter = std::vec::IntoIter<Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.nodes.len()))?;
        for node in &self.nodes {
            seq.serialize_element(node)?;
        }
        seq.end()
    }
}
