//! Markup classification for Doxygen's compound schema.
//!
//! See <https://github.com/doxygen/doxygen/blob/master/templates/xml/compound.xsd>

use aerate_tree::{NodeId, Tree};

pub const DESCRIPTION_TAGS: &[&str] = &[
    "briefdescription",
    "detaileddescription",
    "inbodydescription",
    "parameterdescription",
];

pub const INLINE_TAGS: &[&str] = &[
    "ulink", "bold", "s", "strike", "underline", "emphasis", "computeroutput",
    "subscript", "superscript", "center", "small", "del", "ins", "htmlonly",
    "manonly", "xmlonly", "rtfonly", "latexonly", "docbookonly", "image", "dot",
    "msc", "plantuml", "anchor", "formula", "ref", "emoji", "linebreak",
];

pub const STRUCTURAL_TAGS: &[&str] = &[
    "hruler", "preformatted", "programlisting", "verbatim", "indexentry",
    "orderedlist", "itemizedlist", "simplesect", "title", "variablelist",
    "table", "heading", "dotfile", "mscfile", "diafile", "toclist", "language",
    "parameterlist", "xrefsect", "copydoc", "blockquote", "parblock",
];

/// Inline nodes that only carry output-format specific content. `xmlonly`
/// is deliberately absent.
pub const PRESENTATION_TAGS: &[&str] =
    &["htmlonly", "manonly", "rtfonly", "latexonly", "docbookonly"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupClass {
    Inline,
    Structural,
    Other,
}

/// Classify a node. `formula` is inline only when written as `$...$`.
pub fn classify(tree: &Tree, node: NodeId) -> MarkupClass {
    let tag = tree.tag(node);
    if tag == "formula" {
        return if is_inline_formula(tree, node) {
            MarkupClass::Inline
        } else {
            MarkupClass::Structural
        };
    }
    if INLINE_TAGS.contains(&tag) {
        MarkupClass::Inline
    } else if STRUCTURAL_TAGS.contains(&tag) {
        MarkupClass::Structural
    } else {
        MarkupClass::Other
    }
}

fn is_inline_formula(tree: &Tree, node: NodeId) -> bool {
    tree.text(node)
        .is_some_and(|text| text.trim_start().starts_with('$'))
}

pub fn is_inline(tree: &Tree, node: NodeId) -> bool {
    classify(tree, node) == MarkupClass::Inline
}

pub fn is_structural(tree: &Tree, node: NodeId) -> bool {
    classify(tree, node) == MarkupClass::Structural
}

/// An element with neither text nor children
pub fn is_empty(tree: &Tree, node: NodeId) -> bool {
    !tree.has_text(node) && tree.children(node).is_empty()
}
