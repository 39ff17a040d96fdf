//! Markup normalization.
//!
//! The DocBook and AsciiDoc pipelines produce equivalent documents that
//! differ in wrappers, redundant class tokens and default attributes. The
//! rules below erase those differences before the document is pretty-printed
//! into canonical text.

pub mod rules;

use crate::dom::Document;
use crate::serialize;

/// A named, in-place tree rewrite.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub apply: fn(&mut Document),
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// Rewrite rules in application order. Later rules see the effects of earlier ones.
pub const RULES: &[Rule] = &[
    Rule {
        name: "collapse-whitespace",
        apply: rules::collapse_whitespace,
    },
    Rule {
        name: "unwrap-content-wrapper",
        apply: rules::unwrap_content_wrapper,
    },
    Rule {
        name: "unwrap-emphasis",
        apply: rules::unwrap_emphasis,
    },
    Rule {
        name: "strip-ulist-class",
        apply: rules::strip_ulist_class,
    },
    Rule {
        name: "strip-disc-type",
        apply: rules::strip_disc_type,
    },
    Rule {
        name: "strip-olist-class",
        apply: rules::strip_olist_class,
    },
    Rule {
        name: "strip-decimal-type",
        apply: rules::strip_decimal_type,
    },
    Rule {
        name: "inline-image-class",
        apply: rules::normalize_inline_image_class,
    },
    Rule {
        name: "cross-page-link-class",
        apply: rules::normalize_cross_page_link_class,
    },
];

const LONG_META_CHARSET: &str =
    r#"<meta content="text/html; charset=utf-8" http-equiv="Content-Type"/>"#;
const SHORT_META_CHARSET: &str = r#"<meta charset="utf-8"/>"#;

/// Normalize raw HTML into canonical text.
///
/// Never fails: malformed markup is repaired by the parser.
pub fn normalize(html: &str) -> String {
    let mut doc = Document::parse(html);
    apply_rules(&mut doc, RULES);
    serialize::to_pretty_string(&doc).replace(LONG_META_CHARSET, SHORT_META_CHARSET)
}

/// Apply `rules` to `doc` left to right.
pub fn apply_rules(doc: &mut Document, rules: &[Rule]) {
    for rule in rules {
        tracing::debug!(rule = rule.name, "applying rule");
        (rule.apply)(doc);
    }
}
