use crate::dom::{Document, NodeId, NodeKind};

/// Elements whose text content is never whitespace-collapsed, at any depth.
const WHITESPACE_EXEMPT: &[&str] = &["script", "pre", "code", "style"];

/// Collapse runs of whitespace in text nodes into a single space.
pub fn collapse_whitespace(doc: &mut Document) {
    let mut stack = vec![doc.root()];
    while let Some(id) = stack.pop() {
        let in_element = match doc.element(id) {
            Some(el) if WHITESPACE_EXEMPT.contains(&el.name.as_str()) => continue,
            Some(_) => true,
            None => false,
        };

        let children = doc.children(id).to_vec();
        for child in children {
            match doc.kind_mut(child) {
                NodeKind::Text(text) if in_element => {
                    let collapsed = collapse(text);
                    if collapsed != *text {
                        *text = collapsed;
                    }
                }
                NodeKind::Element(_) => stack.push(child),
                _ => {}
            }
        }
    }
}

/// Collapse consecutive whitespace characters into a single space.
fn collapse(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_ws = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !prev_ws {
                result.push(' ');
            }
            prev_ws = true;
        } else {
            result.push(c);
            prev_ws = false;
        }
    }
    result
}

/// Drop the `<div id="content">` wrapper the DocBook pipeline puts around the body.
pub fn unwrap_content_wrapper(doc: &mut Document) {
    let wrappers = doc.select(|el| el.attr("id") == Some("content"));
    unwrap_all(doc, wrappers);
}

pub fn unwrap_emphasis(doc: &mut Document) {
    let spans = doc.select(|el| el.has_class("emphasis"));
    unwrap_all(doc, spans);
}

/// Unwrap each node, then rejoin text runs the unwrapping made adjacent.
///
/// Joined text outside exempt elements is collapsed again so it reads the
/// same as a single text node from the parser would.
fn unwrap_all(doc: &mut Document, ids: Vec<NodeId>) {
    for id in ids {
        let Some(parent) = doc.parent(id) else {
            continue;
        };
        if !doc.unwrap(id) {
            continue;
        }
        let collapse_joined =
            doc.element(parent).is_some() && !doc.has_ancestor_in(parent, WHITESPACE_EXEMPT);
        for joined in doc.merge_adjacent_text(parent) {
            if collapse_joined && let NodeKind::Text(text) = doc.kind_mut(joined) {
                *text = collapse(text);
            }
        }
    }
}

pub fn strip_ulist_class(doc: &mut Document) {
    remove_redundant_class(doc, "itemizedlist", "ulist");
}

pub fn strip_disc_type(doc: &mut Document) {
    remove_default_type(doc, "ul", "disc");
}

pub fn strip_olist_class(doc: &mut Document) {
    remove_redundant_class(doc, "orderedlist", "olist");
}

pub fn strip_decimal_type(doc: &mut Document) {
    remove_default_type(doc, "ol", "1");
}

pub fn normalize_inline_image_class(doc: &mut Document) {
    for id in doc.select(|el| el.has_class("inlinemediaobject")) {
        if let Some(el) = doc.element_mut(id) {
            el.remove_class("inlinemediaobject");
            el.add_class("image");
        }
    }
}

/// Links into another page carry `xref` on one side and `link` on the other.
pub fn normalize_cross_page_link_class(doc: &mut Document) {
    let links = doc.select(|el| {
        el.name == "a"
            && el.has_class("xref")
            && el.attr("href").is_some_and(|href| href.contains(".html#"))
    });
    for id in links {
        if let Some(el) = doc.element_mut(id) {
            el.remove_class("xref");
            el.add_class("link");
        }
    }
}

fn remove_redundant_class(doc: &mut Document, marker: &str, redundant: &str) {
    for id in doc.select(|el| el.has_class(marker) && el.has_class(redundant)) {
        if let Some(el) = doc.element_mut(id) {
            el.remove_class(redundant);
        }
    }
}

fn remove_default_type(doc: &mut Document, tag: &str, default: &str) {
    for id in doc.select(|el| el.name == tag && el.attr("type") == Some(default)) {
        if let Some(el) = doc.element_mut(id) {
            el.remove_attr("type");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(doc: &Document, tag: &str) -> NodeId {
        doc.select(|el| el.name == tag)[0]
    }

    fn text_of(doc: &Document, id: NodeId) -> String {
        doc.children(id)
            .iter()
            .filter_map(|&c| match doc.kind(c) {
                NodeKind::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_collapse_helper() {
        assert_eq!(collapse("a   b\n\tc"), "a b c");
        assert_eq!(collapse("  lead"), " lead");
        assert_eq!(collapse("x\u{a0}\u{a0}y"), "x y");
        assert_eq!(collapse(""), "");
    }

    #[test]
    fn test_collapse_whitespace_in_paragraph() {
        let mut doc = Document::parse("<p>a   b\nc</p>");
        collapse_whitespace(&mut doc);
        assert_eq!(text_of(&doc, first(&doc, "p")), "a b c");
    }

    #[test]
    fn test_collapse_skips_exempt_tags() {
        for tag in ["pre", "code", "script", "style"] {
            let html = format!("<body><{tag}>  a   b  </{tag}></body>");
            let mut doc = Document::parse(&html);
            collapse_whitespace(&mut doc);
            assert_eq!(text_of(&doc, first(&doc, tag)), "  a   b  ", "{tag}");
        }
    }

    #[test]
    fn test_collapse_exemption_is_recursive() {
        let mut doc = Document::parse("<pre>x  <span>a   b</span></pre>");
        collapse_whitespace(&mut doc);
        assert_eq!(text_of(&doc, first(&doc, "span")), "a   b");
        assert_eq!(text_of(&doc, first(&doc, "pre")), "x  ");
    }

    #[test]
    fn test_unwrap_content_wrapper() {
        let mut doc = Document::parse(r#"<div id="content"><p>x</p></div>"#);
        unwrap_content_wrapper(&mut doc);
        assert!(doc.select(|el| el.name == "div").is_empty());
        let p = first(&doc, "p");
        assert_eq!(doc.parent_name(p), Some("body"));
    }

    #[test]
    fn test_unwrap_emphasis_keeps_other_spans() {
        let mut doc = Document::parse(
            r#"<p>a <span class="emphasis bold">b</span> <span class="other">c</span></p>"#,
        );
        unwrap_emphasis(&mut doc);
        let spans = doc.select(|el| el.name == "span");
        assert_eq!(spans.len(), 1);
        assert_eq!(doc.element(spans[0]).and_then(|el| el.attr("class")), Some("other"));
        assert_eq!(text_of(&doc, first(&doc, "p")), "a b ");
        assert_eq!(doc.children(first(&doc, "p")).len(), 2);
    }

    #[test]
    fn test_unwrap_rejoins_and_collapses_text() {
        let mut doc = Document::parse(r#"<p>a <span class="emphasis"> b </span> c</p>"#);
        collapse_whitespace(&mut doc);
        unwrap_emphasis(&mut doc);
        let p = first(&doc, "p");
        assert_eq!(doc.children(p).len(), 1);
        assert_eq!(text_of(&doc, p), "a b c");
    }

    #[test]
    fn test_unwrap_inside_code_keeps_spacing() {
        let mut doc = Document::parse(r#"<code>a <span class="emphasis"> b </span></code>"#);
        collapse_whitespace(&mut doc);
        unwrap_emphasis(&mut doc);
        assert_eq!(text_of(&doc, first(&doc, "code")), "a  b ");
    }

    #[test]
    fn test_strip_ulist_requires_both_tokens() {
        let mut doc = Document::parse(
            r#"<ul class="itemizedlist ulist"></ul><ul class="ulist"></ul>"#,
        );
        strip_ulist_class(&mut doc);
        let classes: Vec<&str> = doc
            .select(|el| el.name == "ul")
            .into_iter()
            .filter_map(|id| doc.element(id)?.attr("class"))
            .collect();
        assert_eq!(classes, ["itemizedlist", "ulist"]);
    }

    #[test]
    fn test_strip_olist() {
        let mut doc = Document::parse(r#"<ol class="olist orderedlist arabic"></ol>"#);
        strip_olist_class(&mut doc);
        let ol = doc.element(first(&doc, "ol")).unwrap();
        assert_eq!(ol.attr("class"), Some("orderedlist arabic"));
    }

    #[test]
    fn test_strip_default_list_types_only() {
        let mut doc = Document::parse(
            r#"<ul type="disc"></ul><ul type="square"></ul><ol type="1"></ol><ol type="a"></ol><p type="disc"></p>"#,
        );
        strip_disc_type(&mut doc);
        strip_decimal_type(&mut doc);
        let types: Vec<Option<&str>> = doc
            .select(|el| matches!(el.name.as_str(), "ul" | "ol" | "p"))
            .into_iter()
            .filter_map(|id| doc.element(id))
            .map(|el| el.attr("type"))
            .collect();
        assert_eq!(
            types,
            [None, Some("square"), None, Some("a"), Some("disc")]
        );
    }

    #[test]
    fn test_inline_image_class_becomes_image() {
        let mut doc = Document::parse(
            r#"<span class="inlinemediaobject big"><img src="x.png"></span>"#,
        );
        normalize_inline_image_class(&mut doc);
        let span = doc.element(first(&doc, "span")).unwrap();
        assert_eq!(span.attr("class"), Some("big image"));
    }

    #[test]
    fn test_cross_page_xref_becomes_link() {
        let mut doc = Document::parse(
            r##"<a class="xref" href="other.html#sec">x</a><a class="xref" href="#local">y</a><span class="xref" href="a.html#b">z</span>"##,
        );
        normalize_cross_page_link_class(&mut doc);
        let classes: Vec<&str> = doc
            .select(|el| el.has_class("xref") || el.has_class("link"))
            .into_iter()
            .filter_map(|id| doc.element(id)?.attr("class"))
            .collect();
        assert_eq!(classes, ["link", "xref", "xref"]);
    }

    #[test]
    fn test_rules_tolerate_missing_attributes() {
        let mut doc = Document::parse("<ul><li><a>x</a></li></ul><ol></ol><span>y</span>");
        let before = format!("{doc:?}");
        strip_ulist_class(&mut doc);
        strip_disc_type(&mut doc);
        strip_olist_class(&mut doc);
        strip_decimal_type(&mut doc);
        normalize_inline_image_class(&mut doc);
        normalize_cross_page_link_class(&mut doc);
        unwrap_emphasis(&mut doc);
        unwrap_content_wrapper(&mut doc);
        assert_eq!(format!("{doc:?}"), before);
    }
}
