//! Canonical pretty-printer.
//!
//! One token per line: every start tag, end tag, comment, doctype and
//! non-blank text run gets its own line, indented one space per tree level.
//! Text is trimmed and attributes are sorted by name. Void elements are
//! written self-closed.
//!
//! `pre`, `textarea` and `listing` keep their content verbatim, so the whole
//! element is written compactly on one line.

use crate::dom::{Document, Element, NodeId, NodeKind};

const INDENT: char = ' ';

/// HTML void elements, written as `<tag/>` with no end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Raw text elements: content is written without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext", "noscript",
];

/// Elements whose content is written verbatim on the start tag's line.
/// The parser drops a newline directly after their start tag.
const PRESERVE_WHITESPACE: &[&str] = &["pre", "textarea", "listing"];

/// Attributes holding whitespace-separated token lists.
const TOKEN_LIST_ATTRIBUTES: &[&str] = &[
    "class",
    "rel",
    "rev",
    "headers",
    "accesskey",
    "dropzone",
    "accept-charset",
];

/// Serialize the whole document to canonical text.
pub fn to_pretty_string(doc: &Document) -> String {
    let mut ser = Serializer::new(doc);
    ser.write_node(doc.root());
    ser.out
}

fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

fn is_raw_text_element(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

struct Serializer<'a> {
    doc: &'a Document,
    out: String,
    depth: usize,
}

impl<'a> Serializer<'a> {
    fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            out: String::new(),
            depth: 0,
        }
    }

    fn write_line(&mut self, line: &str) {
        for _ in 0..self.depth {
            self.out.push(INDENT);
        }
        self.out.push_str(line);
        self.out.push('\n');
    }

    fn write_node(&mut self, id: NodeId) {
        let doc = self.doc;
        match doc.kind(id) {
            NodeKind::Document => {
                for &child in doc.children(id) {
                    self.write_node(child);
                }
            }
            NodeKind::Doctype {
                name,
                public_id,
                system_id,
            } => {
                let line = doctype(name, public_id, system_id);
                self.write_line(&line);
            }
            NodeKind::Comment(text) => {
                self.write_line(&format!("<!--{text}-->"));
            }
            NodeKind::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return;
                }
                if doc.parent_name(id).is_some_and(is_raw_text_element) {
                    self.write_line(text);
                } else {
                    self.write_line(&escape_text(text));
                }
            }
            NodeKind::Element(el) => self.write_element(id, el),
        }
    }

    fn write_element(&mut self, id: NodeId, el: &Element) {
        let doc = self.doc;

        if PRESERVE_WHITESPACE.contains(&el.name.as_str()) {
            let mut line = String::new();
            write_compact(doc, id, &mut line);
            self.write_line(&line);
            return;
        }

        let start = start_tag(el);
        if is_void_element(&el.name) {
            self.write_line(&start);
            return;
        }

        self.write_line(&start);
        self.depth += 1;
        for &child in doc.children(id) {
            self.write_node(child);
        }
        self.depth -= 1;
        self.write_line(&format!("</{}>", el.name));
    }
}

/// Serialize a subtree without any added whitespace.
fn write_compact(doc: &Document, id: NodeId, out: &mut String) {
    match doc.kind(id) {
        NodeKind::Document => {
            for &child in doc.children(id) {
                write_compact(doc, child, out);
            }
        }
        NodeKind::Doctype {
            name,
            public_id,
            system_id,
        } => out.push_str(&doctype(name, public_id, system_id)),
        NodeKind::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeKind::Text(text) => {
            if doc.parent_name(id).is_some_and(is_raw_text_element) {
                out.push_str(text);
            } else {
                out.push_str(&escape_text(text));
            }
        }
        NodeKind::Element(el) => {
            out.push_str(&start_tag(el));
            if is_void_element(&el.name) {
                return;
            }
            if PRESERVE_WHITESPACE.contains(&el.name.as_str())
                && let Some(&first) = doc.children(id).first()
                && matches!(doc.kind(first), NodeKind::Text(t) if t.starts_with('\n'))
            {
                out.push('\n');
            }
            for &child in doc.children(id) {
                write_compact(doc, child, out);
            }
            out.push_str("</");
            out.push_str(&el.name);
            out.push('>');
        }
    }
}

fn start_tag(el: &Element) -> String {
    let mut tag = format!("<{}", el.name);

    let mut attrs: Vec<&(String, String)> = el.attrs.iter().collect();
    attrs.sort_by(|a, b| a.0.cmp(&b.0));
    for (name, value) in attrs {
        let value = if TOKEN_LIST_ATTRIBUTES.contains(&name.as_str()) {
            value.split_whitespace().collect::<Vec<_>>().join(" ")
        } else {
            value.clone()
        };
        tag.push(' ');
        tag.push_str(name);
        tag.push_str("=\"");
        tag.push_str(&escape_attr(&value));
        tag.push('"');
    }

    if is_void_element(&el.name) {
        tag.push_str("/>");
    } else {
        tag.push('>');
    }
    tag
}

fn doctype(name: &str, public_id: &str, system_id: &str) -> String {
    let mut out = format!("<!DOCTYPE {name}");
    if !public_id.is_empty() {
        out.push_str(&format!(" PUBLIC \"{public_id}\""));
    }
    if !system_id.is_empty() {
        if public_id.is_empty() {
            out.push_str(" SYSTEM");
        }
        out.push_str(&format!(" \"{system_id}\""));
    }
    out.push('>');
    out
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
