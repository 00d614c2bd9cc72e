//! Aerations: documentable compounds and members.
//!
//! An aeration is a `<compound>` or `<member>` entry of `index.xml`. Its
//! matter is the definition node (`<compounddef>` or `<memberdef>`) in the
//! XML file the compound is documented in.

use crate::error::{IndexError, IndexResult};
use crate::index::DoxygenIndex;
use aerate_tree::{NodeId, Tree};
use std::fmt;

#[derive(Clone, Copy)]
pub struct Aeration<'a> {
    index: &'a DoxygenIndex,
    node: NodeId,
}

/// A definition node together with the document that owns it
pub struct Matter {
    pub document: Tree,
    pub node: NodeId,
}

impl<'a> Aeration<'a> {
    pub(crate) fn new(index: &'a DoxygenIndex, node: NodeId) -> Self {
        Self { index, node }
    }

    /// The index entry node
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn id(&self) -> &'a str {
        self.index.document().attribute(self.node, "refid").unwrap_or("")
    }

    pub fn kind(&self) -> &'a str {
        self.index.document().attribute(self.node, "kind").unwrap_or("")
    }

    pub fn name(&self) -> String {
        let document = self.index.document();
        document
            .children(self.node)
            .iter()
            .find(|&&child| document.tag(child) == "name")
            .map(|&child| document.string_value(child))
            .unwrap_or_default()
    }

    pub fn is_member(&self) -> bool {
        self.index.document().tag(self.node) == "member"
    }

    /// The compound a member is listed under
    pub fn compound(&self) -> Option<Aeration<'a>> {
        if !self.is_member() {
            return None;
        }
        self.index
            .document()
            .parent(self.node)
            .map(|parent| Aeration::new(self.index, parent))
    }

    /// The members listed under a compound
    pub fn members(&self) -> Vec<Aeration<'a>> {
        let document = self.index.document();
        document
            .children(self.node)
            .iter()
            .filter(|&&child| document.tag(child) == "member")
            .map(|&child| Aeration::new(self.index, child))
            .collect()
    }

    /// Load the definition node. The compound's file is read on every call.
    pub fn matter(&self) -> IndexResult<Matter> {
        let (file_id, tag) = match self.compound() {
            Some(compound) => (compound.id(), "memberdef"),
            None => (self.id(), "compounddef"),
        };
        let document = self.index.load_document(&format!("{file_id}.xml"))?;

        let found: Vec<NodeId> = document
            .descendants(document.root())
            .into_iter()
            .filter(|&node| document.tag(node) == tag && document.attribute(node, "id") == Some(self.id()))
            .collect();
        let node = match found.as_slice() {
            [node] => *node,
            [] => {
                return Err(IndexError::Lookup(format!(
                    "No <{tag}> with id {:?} in {file_id}.xml",
                    self.id()
                )));
            }
            _ => {
                return Err(IndexError::Lookup(format!(
                    "Multiple <{tag}>s with id {:?} in {file_id}.xml",
                    self.id()
                )));
            }
        };
        Ok(Matter { document, node })
    }
}

impl PartialEq for Aeration<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Aeration<'_> {}

impl fmt::Debug for Aeration<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aeration")
            .field("id", &self.id())
            .field("kind", &self.kind())
            .field("name", &self.name())
            .finish()
    }
}
