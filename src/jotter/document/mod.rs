//! # Document Model
//!
//! The rich-text editor hands us its content as serialized HTML. This module
//! parses that markup into a small ordered tree and is the only writer of
//! that tree: everything else reads it, or asks for a change through
//! [`Document::apply`] with an [`Edit`] addressed by [`NodePath`].
//!
//! A path is only meaningful for the content it was taken from. Every call to
//! [`Document::reset`] bumps the document's generation, which lets callers
//! holding a path notice that the content underneath them was replaced.

use crate::error::{JotterError, Result};
use std::fmt;
use std::str::FromStr;

pub mod entities;
pub mod html;

/// How an element's markup was closed in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closing {
    /// `<p>…</p>`
    Paired,
    /// `<br>`
    Void,
    /// `<br/>`
    Slash,
    /// `<br />`
    SpaceSlash,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    /// Raw (still escaped) value, `None` for bare attributes like `hidden`.
    pub value: Option<String>,
    pub quote: Option<char>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<Attr>,
    pub children: Vec<Node>,
    pub closing: Closing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Text in source form; see [`entities::decode`].
    Text(String),
    /// Comments, doctypes and processing instructions, kept verbatim.
    Raw(String),
}

impl Element {
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name == name)
    }

    /// Decoded value of an attribute. Bare attributes yield an empty string.
    pub fn attr(&self, name: &str) -> Option<String> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| match &a.value {
                Some(v) => entities::decode(v).into_owned(),
                None => String::new(),
            })
    }

    /// Decoded text of all descendant text nodes, in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Text of the element itself, leaving out lists nested inside it.
    pub fn own_text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            match node {
                Node::Text(raw) => out.push_str(&entities::decode(raw)),
                Node::Element(el) if !el.is_list() => out.push_str(&el.own_text()),
                _ => {}
            }
        }
        out
    }

    fn is_list(&self) -> bool {
        self.is("ul") || self.is("ol")
    }

    /// Replace the element's text while keeping its structure where possible.
    ///
    /// A lone wrapper child (`<li><p>…</p></li>`) is descended into. Checkbox
    /// inputs of task items stay in front of the new text and nested lists
    /// stay after it.
    fn set_text(&mut self, text: &str) {
        if let Some(idx) = self.sole_element_child() {
            if let Node::Element(child) = &mut self.children[idx] {
                if child.closing == Closing::Paired && !child.is_list() {
                    child.set_text(text);
                    return;
                }
            }
        }

        let (inputs, lists): (Vec<Node>, Vec<Node>) = self
            .children
            .drain(..)
            .filter(|n| matches!(n, Node::Element(el) if el.is("input") || el.is_list()))
            .partition(|n| matches!(n, Node::Element(el) if el.is("input")));
        let escaped = entities::escape_text(text);
        let mut kept = inputs;
        if kept.is_empty() {
            kept.push(Node::Text(escaped));
        } else {
            kept.push(Node::Text(format!(" {}", escaped)));
        }
        kept.extend(lists);
        self.children = kept;
    }

    /// Index of the only element child, if every other child is blank text.
    fn sole_element_child(&self) -> Option<usize> {
        let mut found = None;
        for (i, child) in self.children.iter().enumerate() {
            match child {
                Node::Element(_) if found.is_none() => found = Some(i),
                Node::Element(_) => return None,
                Node::Text(t) if t.trim().is_empty() => {}
                Node::Raw(_) => {}
                Node::Text(_) => return None,
            }
        }
        found
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(raw) => out.push_str(&entities::decode(raw)),
            Node::Element(el) => collect_text(&el.children, out),
            Node::Raw(_) => {}
        }
    }
}

/// Child indexes from the document root down to a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn new(indexes: Vec<usize>) -> Self {
        Self(indexes)
    }

    pub fn indexes(&self) -> &[usize] {
        &self.0
    }

    pub fn child(&self, index: usize) -> Self {
        let mut next = self.0.clone();
        next.push(index);
        Self(next)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

impl FromStr for NodePath {
    type Err = JotterError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Err(JotterError::Document("Empty node path".to_string()));
        }
        s.split('.')
            .map(|part| {
                part.trim()
                    .parse::<usize>()
                    .map_err(|_| JotterError::Document(format!("Invalid node path: {}", s)))
            })
            .collect::<Result<Vec<_>>>()
            .map(NodePath)
    }
}

/// A change requested against the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Replace the text of the element at `path`.
    SetText { path: NodePath, text: String },
}

/// Whether an applied edit changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Changed,
    Unchanged,
}

/// The parsed content of one note.
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<Node>,
    generation: u64,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        Self {
            nodes: html::parse(html),
            generation: 0,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn to_html(&self) -> String {
        html::serialize(&self.nodes)
    }

    /// Replace the whole content. Paths taken before the reset are stale.
    pub fn reset(&mut self, html: &str) {
        self.nodes = html::parse(html);
        self.generation += 1;
    }

    pub fn node(&self, path: &NodePath) -> Option<&Node> {
        let (first, rest) = path.indexes().split_first()?;
        let mut node = self.nodes.get(*first)?;
        for idx in rest {
            match node {
                Node::Element(el) => node = el.children.get(*idx)?,
                _ => return None,
            }
        }
        Some(node)
    }

    pub fn element(&self, path: &NodePath) -> Option<&Element> {
        match self.node(path)? {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, path: &NodePath) -> Option<&mut Element> {
        let (first, rest) = path.indexes().split_first()?;
        let mut el = match self.nodes.get_mut(*first)? {
            Node::Element(el) => el,
            _ => return None,
        };
        for idx in rest {
            el = match el.children.get_mut(*idx)? {
                Node::Element(child) => child,
                _ => return None,
            };
        }
        Some(el)
    }

    /// All elements in document order, with their paths.
    pub fn elements(&self) -> Vec<(NodePath, &Element)> {
        let mut out = Vec::new();
        walk_elements(&self.nodes, &NodePath::default(), &mut out);
        out
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.nodes, &mut out);
        out
    }

    /// A document with no visible text and no images or rules.
    pub fn is_empty(&self) -> bool {
        self.text_content().trim().is_empty()
            && !self
                .elements()
                .iter()
                .any(|(_, el)| el.is("img") || el.is("hr"))
    }

    /// Apply an edit. Fails if the path does not address an element.
    pub fn apply(&mut self, edit: Edit) -> Result<EditOutcome> {
        match edit {
            Edit::SetText { path, text } => {
                let el = self.element_mut(&path).ok_or_else(|| {
                    JotterError::Document(format!("No element at path {}", path))
                })?;
                if el.own_text() == text {
                    return Ok(EditOutcome::Unchanged);
                }
                el.set_text(&text);
                Ok(EditOutcome::Changed)
            }
        }
    }
}

fn walk_elements<'a>(nodes: &'a [Node], base: &NodePath, out: &mut Vec<(NodePath, &'a Element)>) {
    for (i, node) in nodes.iter().enumerate() {
        if let Node::Element(el) = node {
            let path = base.child(i);
            out.push((path.clone(), el));
            walk_elements(&el.children, &path, out);
        }
    }
}

/// Whether serialized HTML represents an empty document.
pub fn is_empty_html(html: &str) -> bool {
    html.trim().is_empty() || Document::parse(html).is_empty()
}
