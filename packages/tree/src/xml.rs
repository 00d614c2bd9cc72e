//! Loading XML documents into a [`Tree`] and writing subtrees back out.

use crate::error::{TreeError, TreeResult};
use crate::tree::{Attributes, Namespaces, NodeId, Tree};
use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Options for [`Tree::parse_with`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Drop text segments made only of whitespace (indentation between
    /// tags). Blank text inside an element that already has text of its
    /// own is mixed content and kept.
    pub remove_blank_text: bool,
}

impl ParseOptions {
    pub fn remove_blank_text() -> Self {
        Self {
            remove_blank_text: true,
        }
    }
}

struct Builder {
    options: ParseOptions,
    tree: Option<Tree>,
    stack: Vec<NodeId>,
    /// Most recently closed element; text that follows it is its tail
    last_closed: Option<NodeId>,
}

impl Builder {
    fn open(&mut self, start: &BytesStart<'_>, pos: u64) -> TreeResult<NodeId> {
        let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Attributes::new();
        let mut namespaces = Namespaces::new();

        for attr in start.attributes() {
            let attr = attr.map_err(|e| TreeError::xml(pos, e))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| TreeError::xml(pos, e))?
                .into_owned();
            if key == "xmlns" {
                namespaces.insert(String::new(), value);
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                namespaces.insert(prefix.to_string(), value);
            } else {
                attributes.insert(key, value);
            }
        }

        let id = if let Some(tree) = self.tree.as_mut() {
            let Some(&parent) = self.stack.last() else {
                return Err(TreeError::MultipleRoots { pos, tag });
            };
            let id = tree.create_element(tag, attributes, namespaces);
            tree.append_child(parent, id)?;
            id
        } else {
            let tree = Tree::with_root(tag, attributes, namespaces);
            let root = tree.root();
            self.tree = Some(tree);
            root
        };
        self.last_closed = None;
        Ok(id)
    }

    fn close(&mut self, tag: &str, pos: u64) -> TreeResult<()> {
        let Some(tree) = &self.tree else {
            return Err(TreeError::UnbalancedEndTag {
                pos,
                expected: String::new(),
                found: tag.to_string(),
            });
        };
        let open = self.stack.pop().ok_or_else(|| TreeError::UnbalancedEndTag {
            pos,
            expected: String::new(),
            found: tag.to_string(),
        })?;
        if tree.tag(open) != tag {
            return Err(TreeError::UnbalancedEndTag {
                pos,
                expected: tree.tag(open).to_string(),
                found: tag.to_string(),
            });
        }
        self.last_closed = Some(open);
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let (Some(tree), Some(&parent)) = (&mut self.tree, self.stack.last()) else {
            // Prolog and epilog text is not part of any element
            return;
        };
        if self.options.remove_blank_text && text.trim().is_empty() && !tree.has_text(parent) {
            return;
        }
        match self.last_closed {
            Some(previous) if tree.parent(previous) == Some(parent) => tree.extend_tail(previous, text),
            _ => tree.extend_text(parent, text),
        }
    }
}

impl Tree {
    /// Create a tree whose root has the given tag, attributes and namespaces
    pub fn with_root(tag: impl Into<String>, attributes: Attributes, namespaces: Namespaces) -> Self {
        let mut tree = Tree::new(tag);
        let root = tree.root();
        for (name, value) in attributes {
            tree.set_attribute(root, name, value);
        }
        tree.declare_namespaces(root, namespaces);
        tree
    }

    /// Parse an XML document, keeping all text
    pub fn parse(xml: &str) -> TreeResult<Tree> {
        Self::parse_with(xml, ParseOptions::default())
    }

    /// Parse an XML document. Comments and processing instructions are
    /// dropped; CDATA sections are kept as text.
    pub fn parse_with(xml: &str, options: ParseOptions) -> TreeResult<Tree> {
        let mut reader = Reader::from_str(xml);
        let mut builder = Builder {
            options,
            tree: None,
            stack: Vec::new(),
            last_closed: None,
        };

        loop {
            let pos = reader.buffer_position() as u64;
            let event = reader.read_event().map_err(|e| TreeError::xml(pos, e))?;
            match event {
                Event::Start(start) => {
                    let id = builder.open(&start, pos)?;
                    builder.stack.push(id);
                }
                Event::Empty(start) => {
                    let id = builder.open(&start, pos)?;
                    builder.last_closed = Some(id);
                }
                Event::End(end) => {
                    let tag = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                    builder.close(&tag, pos)?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(|e| TreeError::xml(pos, e))?;
                    builder.text(&text);
                }
                Event::CData(data) => {
                    let text = String::from_utf8_lossy(&data).into_owned();
                    builder.text(&text);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let (Some(tree), Some(&open)) = (&builder.tree, builder.stack.last()) {
            return Err(TreeError::Unclosed {
                tag: tree.tag(open).to_string(),
            });
        }
        builder.tree.ok_or(TreeError::MissingRoot)
    }

    /// Serialize a subtree. Attributes are written in name order and
    /// childless elements without text are self-closed, so two semantically
    /// equal subtrees serialize identically. The element's own tail is not
    /// written.
    pub fn to_xml(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_element(node, &mut out);
        out
    }

    fn write_element(&self, node: NodeId, out: &mut String) {
        out.push('<');
        out.push_str(self.tag(node));
        for (prefix, uri) in self.declared_namespaces(node) {
            if prefix.is_empty() {
                out.push_str(" xmlns=\"");
            } else {
                out.push_str(" xmlns:");
                out.push_str(prefix);
                out.push_str("=\"");
            }
            out.push_str(&escape(uri.as_str()));
            out.push('"');
        }
        for (name, value) in self.attributes(node) {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }

        if !self.has_text(node) && self.children(node).is_empty() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        if let Some(text) = self.text(node) {
            out.push_str(&partial_escape(text));
        }
        for &child in self.children(node) {
            self.write_element(child, out);
            if let Some(tail) = self.tail(child) {
                out.push_str(&partial_escape(tail));
            }
        }
        out.push_str("</");
        out.push_str(self.tag(node));
        out.push('>');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_and_tail() {
        let tree = Tree::parse("<root>a<bold>b</bold>c<br/>d</root>").unwrap();
        let root = tree.root();
        let children = tree.children(root).to_vec();
        assert_eq!(tree.text(root), Some("a"));
        assert_eq!(tree.text(children[0]), Some("b"));
        assert_eq!(tree.tail(children[0]), Some("c"));
        assert_eq!(tree.tag(children[1]), "br");
        assert_eq!(tree.tail(children[1]), Some("d"));
    }

    #[test]
    fn test_remove_blank_text() {
        let xml = "<root>\n  <a>x</a>\n  <b/>\n</root>";
        let tree = Tree::parse_with(xml, ParseOptions::remove_blank_text()).unwrap();
        assert_eq!(tree.to_xml(tree.root()), "<root><a>x</a><b/></root>");

        let kept = Tree::parse(xml).unwrap();
        assert_eq!(kept.text(kept.root()), Some("\n  "));
    }

    #[test]
    fn test_blank_text_in_mixed_content_is_kept() {
        let xml = "<para>see <ref>a</ref> <ref>b</ref>\n</para>";
        let tree = Tree::parse_with(xml, ParseOptions::remove_blank_text()).unwrap();
        assert_eq!(tree.to_xml(tree.root()), xml);
    }

    #[test]
    fn test_entities_and_attributes_roundtrip() {
        let tree = Tree::parse(r#"<root z="1" a="&quot;q&quot;">1 &lt; 2 &amp; 3</root>"#).unwrap();
        let root = tree.root();
        assert_eq!(tree.text(root), Some("1 < 2 & 3"));
        assert_eq!(tree.attribute(root, "a"), Some("\"q\""));
        assert_eq!(
            tree.to_xml(root),
            r#"<root a="&quot;q&quot;" z="1">1 &lt; 2 &amp; 3</root>"#
        );
    }

    #[test]
    fn test_namespaces_are_inherited() {
        let tree = Tree::parse(r#"<root xmlns:xsi="http://x"><a/></root>"#).unwrap();
        let a = tree.children(tree.root())[0];
        assert!(tree.declared_namespaces(a).is_empty());
        assert_eq!(tree.namespaces(a).get("xsi").map(String::as_str), Some("http://x"));
        assert!(tree.attributes(tree.root()).is_empty());
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(Tree::parse(""), Err(TreeError::MissingRoot)));
        assert!(Tree::parse("<a></b>").is_err());
        assert!(Tree::parse("<a/><b/>").is_err());
    }

    #[test]
    fn test_comments_are_dropped() {
        let tree = Tree::parse("<root>a<!-- note -->b</root>").unwrap();
        assert_eq!(tree.text(tree.root()), Some("ab"));
    }
}
