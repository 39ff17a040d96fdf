//! Arena-backed document tree.
//!
//! Nodes live in a single `Vec` owned by [`Document`] and refer to each other
//! through [`NodeId`] indices. Structural edits such as [`Document::unwrap`]
//! are splices on a parent's child list, so handles collected by
//! [`Document::select`] stay valid while the tree is rewritten. A node that
//! has been unwrapped keeps its slot in the arena but is no longer reachable
//! from the root.

use ego_tree::iter::Edge;
use scraper::{Html, Node};

/// Handle to a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

/// The payload of a tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
    Comment(String),
    Text(String),
    Element(Element),
}

/// An element: tag name plus attributes in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
        }
    }

    /// Builder-style attribute setter, mostly useful in tests.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing its value in place if it already exists.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attrs.iter().position(|(k, _)| k == name)?;
        Some(self.attrs.remove(pos).1)
    }

    /// Class tokens in document order.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, token: &str) -> bool {
        self.classes().any(|c| c == token)
    }

    /// Remove every occurrence of `token` from the class list.
    /// Returns whether anything was removed.
    pub fn remove_class(&mut self, token: &str) -> bool {
        if !self.has_class(token) {
            return false;
        }
        let remaining: Vec<&str> = self.classes().filter(|c| *c != token).collect();
        let joined = remaining.join(" ");
        self.set_attr("class", joined);
        true
    }

    /// Append `token` to the class list unless it is already there.
    pub fn add_class(&mut self, token: &str) {
        if self.has_class(token) {
            return;
        }
        let mut tokens: Vec<&str> = self.classes().collect();
        tokens.push(token);
        let joined = tokens.join(" ");
        self.set_attr("class", joined);
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A mutable HTML document tree.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document holding only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Parse HTML with the html5ever tree builder and copy the result into an arena.
    ///
    /// Parsing never fails; malformed markup is repaired by html5ever.
    pub fn parse(html: &str) -> Self {
        let html = html.strip_prefix('\u{FEFF}').unwrap_or(html);
        let parsed = Html::parse_document(html);
        for error in &parsed.errors {
            tracing::debug!(%error, "html parse error");
        }
        Self::from_html(&parsed)
    }

    fn from_html(parsed: &Html) -> Self {
        let mut doc = Self::new();
        let mut stack = vec![doc.root()];

        for edge in parsed.tree.root().traverse() {
            match edge {
                Edge::Open(node) => {
                    let parent = stack.last().copied().unwrap_or(doc.root());
                    let id = match node.value() {
                        Node::Document | Node::Fragment => parent,
                        Node::Doctype(doctype) => doc.append(
                            parent,
                            NodeKind::Doctype {
                                name: doctype.name().to_string(),
                                public_id: doctype.public_id().to_string(),
                                system_id: doctype.system_id().to_string(),
                            },
                        ),
                        Node::Comment(comment) => {
                            doc.append(parent, NodeKind::Comment(comment.comment.to_string()))
                        }
                        Node::Text(text) => {
                            doc.append(parent, NodeKind::Text(text.text.to_string()))
                        }
                        Node::Element(el) => {
                            let mut attrs: Vec<(String, String)> = el
                                .attrs()
                                .map(|(k, v)| (k.to_string(), v.to_string()))
                                .collect();
                            // attribute storage order is not guaranteed by the parser
                            attrs.sort();
                            let element = Element {
                                name: el.name().to_string(),
                                attrs,
                            };
                            doc.append(parent, NodeKind::Element(element))
                        }
                        // html5ever turns processing instructions into comments in HTML mode
                        Node::ProcessingInstruction(_) => parent,
                    };
                    stack.push(id);
                }
                Edge::Close(_) => {
                    stack.pop();
                }
            }
        }

        doc
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Create a node and append it as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.0].kind
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.kind_mut(id) {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Tag name of the parent element, if the parent is an element.
    pub fn parent_name(&self, id: NodeId) -> Option<&str> {
        let parent = self.parent(id)?;
        self.element(parent).map(|el| el.name.as_str())
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// All elements reachable from the root that satisfy `predicate`, in document order.
    pub fn select<P>(&self, mut predicate: P) -> Vec<NodeId>
    where
        P: FnMut(&Element) -> bool,
    {
        let mut matches = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            if let Some(el) = self.element(id)
                && predicate(el)
            {
                matches.push(id);
            }
            stack.extend(self.children(id).iter().rev());
        }
        matches
    }

    /// Replace `id` in its parent's child list with its own children.
    ///
    /// Returns `false` when the node is detached (the root, or a node that was
    /// already unwrapped).
    pub fn unwrap(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.parent(id) else {
            return false;
        };
        let Some(pos) = self.children(parent).iter().position(|&c| c == id) else {
            return false;
        };

        let children = std::mem::take(&mut self.nodes[id.0].children);
        for &child in &children {
            self.nodes[child.0].parent = Some(parent);
        }
        self.nodes[parent.0].children.splice(pos..=pos, children);
        self.nodes[id.0].parent = None;
        tracing::trace!(?id, ?parent, "unwrapped node");
        true
    }

    /// Join each run of adjacent text children of `parent` into its first node.
    ///
    /// Returns the text nodes that absorbed at least one neighbour.
    pub fn merge_adjacent_text(&mut self, parent: NodeId) -> Vec<NodeId> {
        let children = std::mem::take(&mut self.nodes[parent.0].children);
        let mut kept: Vec<NodeId> = Vec::with_capacity(children.len());
        let mut merged = Vec::new();

        for child in children {
            if let Some(&prev) = kept.last()
                && let NodeKind::Text(tail) = &self.nodes[child.0].kind
                && matches!(self.nodes[prev.0].kind, NodeKind::Text(_))
            {
                let tail = tail.clone();
                if let NodeKind::Text(head) = &mut self.nodes[prev.0].kind {
                    head.push_str(&tail);
                }
                self.nodes[child.0].parent = None;
                if merged.last() != Some(&prev) {
                    merged.push(prev);
                }
                continue;
            }
            kept.push(child);
        }

        self.nodes[parent.0].children = kept;
        merged
    }

    /// Whether `id` or one of its ancestors is an element named in `tags`.
    pub fn has_ancestor_in(&self, id: NodeId, tags: &[&str]) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if self
                .element(node)
                .is_some_and(|el| tags.contains(&el.name.as_str()))
            {
                return true;
            }
            current = self.parent(node);
        }
        false
    }
}
