//! Arena-backed element tree with the text/tail content model.
//!
//! Every element owns an optional `text` (content before its first child) and
//! an optional `tail` (content after its end tag, belonging to the parent's
//! flow). Nodes are addressed by [`NodeId`], which stays valid for the whole
//! life of the [`Tree`]: detaching a node never frees its slot, it only unlinks
//! it from its parent.
//!
//! ```text
//! <para>TEXT<bold>inner</bold>TAIL</para>
//!       ^^^^ para.text        ^^^^ bold.tail
//! ```

use crate::error::{TreeError, TreeResult};
use std::collections::BTreeMap;
use std::fmt;

/// Attribute name → value
pub type Attributes = BTreeMap<String, String>;

/// Namespace prefix (empty for the default namespace) → URI
pub type Namespaces = BTreeMap<String, String>;

/// Stable handle to an element in a [`Tree`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    tag: String,
    attributes: Attributes,
    namespaces: Namespaces,
    text: Option<String>,
    tail: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeData {
    fn new(tag: String, attributes: Attributes, namespaces: Namespaces) -> Self {
        Self {
            tag,
            attributes,
            namespaces,
            text: None,
            tail: None,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// A mutable, ordered, attributed tree of tagged elements
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Tree {
    /// Create a tree holding a single empty root element
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            nodes: vec![NodeData::new(tag.into(), Attributes::new(), Namespaces::new())],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn data(&self, node: NodeId) -> &NodeData {
        &self.nodes[node.0]
    }

    fn data_mut(&mut self, node: NodeId) -> &mut NodeData {
        &mut self.nodes[node.0]
    }

    // ------------------------------------------------------------------
    // Element data
    // ------------------------------------------------------------------

    pub fn tag(&self, node: NodeId) -> &str {
        &self.data(node).tag
    }

    pub fn attributes(&self, node: NodeId) -> &Attributes {
        &self.data(node).attributes
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.data(node).attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, node: NodeId, name: impl Into<String>, value: impl Into<String>) {
        self.data_mut(node).attributes.insert(name.into(), value.into());
    }

    /// Namespace bindings declared directly on this element
    pub fn declared_namespaces(&self, node: NodeId) -> &Namespaces {
        &self.data(node).namespaces
    }

    /// Add namespace declarations to an element
    pub fn declare_namespaces(&mut self, node: NodeId, namespaces: Namespaces) {
        self.data_mut(node).namespaces.extend(namespaces);
    }

    /// All namespace bindings in scope at this element, nearest declaration wins
    pub fn namespaces(&self, node: NodeId) -> Namespaces {
        let mut scope = Namespaces::new();
        let mut chain: Vec<NodeId> = self.ancestors(node).collect();
        chain.reverse();
        chain.push(node);
        for id in chain {
            for (prefix, uri) in &self.data(id).namespaces {
                scope.insert(prefix.clone(), uri.clone());
            }
        }
        scope
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.data(node).text.as_deref()
    }

    pub fn tail(&self, node: NodeId) -> Option<&str> {
        self.data(node).tail.as_deref()
    }

    /// Whether the element has non-empty text
    pub fn has_text(&self, node: NodeId) -> bool {
        self.text(node).is_some_and(|text| !text.is_empty())
    }

    /// Whether the element has non-empty tail text
    pub fn has_tail(&self, node: NodeId) -> bool {
        self.tail(node).is_some_and(|tail| !tail.is_empty())
    }

    pub fn set_text(&mut self, node: NodeId, text: Option<String>) {
        self.data_mut(node).text = text;
    }

    pub fn set_tail(&mut self, node: NodeId, tail: Option<String>) {
        self.data_mut(node).tail = tail;
    }

    /// Append to the element's text. Empty input leaves the text untouched.
    pub fn extend_text(&mut self, node: NodeId, text: &str) {
        extend(&mut self.data_mut(node).text, text);
    }

    /// Append to the element's tail. Empty input leaves the tail untouched.
    pub fn extend_tail(&mut self, node: NodeId, tail: &str) {
        extend(&mut self.data_mut(node).tail, tail);
    }

    /// Insert text in front of the element's tail
    pub fn prepend_tail(&mut self, node: NodeId, tail: &str) {
        if tail.is_empty() {
            return;
        }
        let slot = &mut self.data_mut(node).tail;
        *slot = Some(match slot.take() {
            Some(existing) => format!("{tail}{existing}"),
            None => tail.to_string(),
        });
    }

    /// Remove and return the element's tail
    pub fn take_tail(&mut self, node: NodeId) -> Option<String> {
        self.data_mut(node).tail.take()
    }

    /// Remove and return the element's text
    pub fn take_text(&mut self, node: NodeId) -> Option<String> {
        self.data_mut(node).text.take()
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.data(node).parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.data(node).children
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).first().copied()
    }

    pub fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).last().copied()
    }

    /// Position of the element among its parent's children
    pub fn index_in_parent(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(parent).iter().position(|&child| child == node)
    }

    pub fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let index = self.index_in_parent(node)?;
        index.checked_sub(1).map(|i| self.children(parent)[i])
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let index = self.index_in_parent(node)?;
        self.children(parent).get(index + 1).copied()
    }

    /// Siblings after the element, in document order
    pub fn following_siblings(&self, node: NodeId) -> Vec<NodeId> {
        match (self.parent(node), self.index_in_parent(node)) {
            (Some(parent), Some(index)) => self.children(parent)[index + 1..].to_vec(),
            _ => Vec::new(),
        }
    }

    /// Siblings before the element, nearest first
    pub fn preceding_siblings(&self, node: NodeId) -> Vec<NodeId> {
        match (self.parent(node), self.index_in_parent(node)) {
            (Some(parent), Some(index)) => {
                self.children(parent)[..index].iter().rev().copied().collect()
            }
            _ => Vec::new(),
        }
    }

    /// Ancestors of the element, nearest first
    pub fn ancestors(&self, node: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(node),
        }
    }

    /// Descendants of the element in document order, excluding the element
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    pub fn is_ancestor_of(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|id| id == ancestor)
    }

    /// Whether the element is the root or is reachable from it
    pub fn is_attached(&self, node: NodeId) -> bool {
        node == self.root || self.is_ancestor_of(self.root, node)
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Allocate a detached element
    pub fn create_element(
        &mut self,
        tag: impl Into<String>,
        attributes: Attributes,
        namespaces: Namespaces,
    ) -> NodeId {
        self.nodes.push(NodeData::new(tag.into(), attributes, namespaces));
        NodeId(self.nodes.len() - 1)
    }

    /// Allocate a detached element with the same tag, attributes and namespace
    /// declarations as `node` but no content
    pub fn duplicate_shallow(&mut self, node: NodeId) -> NodeId {
        let data = self.data(node);
        let (tag, attributes, namespaces) =
            (data.tag.clone(), data.attributes.clone(), data.namespaces.clone());
        self.create_element(tag, attributes, namespaces)
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        if child == parent || self.is_ancestor_of(child, parent) {
            return Err(TreeError::structure(format!(
                "cannot insert <{}> into its own subtree",
                self.tag(child)
            )));
        }
        if child == self.root {
            return Err(TreeError::structure("cannot reparent the root element"));
        }
        Ok(())
    }

    /// Insert `child` as the `index`-th child of `parent`, detaching it from
    /// wherever it currently is. Its tail travels with it.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> TreeResult<()> {
        self.check_insertable(parent, child)?;
        self.unlink(child);
        let children = &mut self.data_mut(parent).children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.data_mut(child).parent = Some(parent);
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        let index = self.children(parent).len();
        self.insert_child(parent, index, child)
    }

    /// Move `node` to sit immediately after `anchor`
    pub fn insert_after(&mut self, anchor: NodeId, node: NodeId) -> TreeResult<()> {
        let parent = self.parent(anchor).ok_or_else(|| {
            TreeError::structure(format!("<{}> has no parent to insert into", self.tag(anchor)))
        })?;
        self.check_insertable(parent, node)?;
        self.unlink(node);
        let index = self
            .index_in_parent(anchor)
            .ok_or_else(|| TreeError::structure("anchor is not a child of its parent"))?;
        self.data_mut(parent).children.insert(index + 1, node);
        self.data_mut(node).parent = Some(parent);
        Ok(())
    }

    /// Unlink the element from its parent. The element keeps its content,
    /// including its tail; callers decide what happens to that text.
    pub fn detach(&mut self, node: NodeId) -> TreeResult<()> {
        if node == self.root {
            return Err(TreeError::structure("cannot detach the root element"));
        }
        self.unlink(node);
        Ok(())
    }

    fn unlink(&mut self, node: NodeId) {
        if let Some(parent) = self.data_mut(node).parent.take() {
            self.data_mut(parent).children.retain(|&child| child != node);
        }
    }

    // ------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------

    /// The XPath `string()` of the element: its text and all descendant text
    /// and tails in document order. The element's own tail is excluded.
    pub fn string_value(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_string(node, &mut out);
        out
    }

    fn collect_string(&self, node: NodeId, out: &mut String) {
        if let Some(text) = self.text(node) {
            out.push_str(text);
        }
        for &child in self.children(node) {
            self.collect_string(child, out);
            if let Some(tail) = self.tail(child) {
                out.push_str(tail);
            }
        }
    }

    /// Structural equality of two subtrees (possibly from different trees).
    /// Absent and empty text compare equal; the roots' tails are ignored.
    pub fn semantically_equal(&self, node: NodeId, other: &Tree, other_node: NodeId) -> bool {
        let (a, b) = (self.data(node), other.data(other_node));
        a.tag == b.tag
            && a.attributes == b.attributes
            && a.text.as_deref().unwrap_or("") == b.text.as_deref().unwrap_or("")
            && a.children.len() == b.children.len()
            && a.children.iter().zip(&b.children).all(|(&x, &y)| {
                self.tail(x).unwrap_or("") == other.tail(y).unwrap_or("")
                    && self.semantically_equal(x, other, y)
            })
    }
}

fn extend(slot: &mut Option<String>, text: &str) {
    if text.is_empty() {
        return;
    }
    match slot {
        Some(existing) => existing.push_str(text),
        None => *slot = Some(text.to_string()),
    }
}

/// Iterator over an element's ancestors, nearest first
pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}
