//! Doxygen's `index.xml`: every compound and member with its kind and name.

use crate::aeration::Aeration;
use crate::error::{IndexError, IndexResult};
use aerate_engine::{CrossReferenceIndex, Target, TargetKind};
use aerate_tree::{NodeId, ParseOptions, Tree};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

pub const INDEX_FILE: &str = "index.xml";

/// The parsed `index.xml` of a Doxygen XML output directory
pub struct DoxygenIndex {
    root: PathBuf,
    document: Tree,
    /// `<compound>` and `<member>` nodes by refid. A member listed under
    /// several compounds resolves to its first listing.
    entries: HashMap<String, NodeId>,
}

impl DoxygenIndex {
    /// Load `index.xml` from Doxygen's XML output directory
    #[instrument(skip_all, fields(root = %root.as_ref().display()))]
    pub fn load(root: impl AsRef<Path>) -> IndexResult<Self> {
        let root = root.as_ref().to_path_buf();
        let source = fs::read_to_string(root.join(INDEX_FILE))?;
        let document = Tree::parse_with(&source, ParseOptions::remove_blank_text())?;
        let index = Self::from_document(root, document);
        debug!(entries = index.entries.len(), "Loaded Doxygen index");
        Ok(index)
    }

    /// Wrap an already parsed index document. Compound files are looked up
    /// relative to `root`.
    pub fn from_document(root: PathBuf, document: Tree) -> Self {
        let mut entries = HashMap::new();
        for node in document.descendants(document.root()) {
            if !matches!(document.tag(node), "compound" | "member") {
                continue;
            }
            let Some(refid) = document.attribute(node, "refid") else {
                warn!(tag = document.tag(node), "Index entry without a refid");
                continue;
            };
            entries.entry(refid.to_string()).or_insert(node);
        }
        Self {
            root,
            document,
            entries,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn document(&self) -> &Tree {
        &self.document
    }

    /// The kind and name of the compound or member with this refid
    pub fn find(&self, refid: &str) -> Option<(&str, String)> {
        let aeration = self.get(refid)?;
        Some((aeration.kind(), aeration.name()))
    }

    pub fn get(&self, refid: &str) -> Option<Aeration<'_>> {
        self.entries
            .get(refid)
            .map(|&node| Aeration::new(self, node))
    }

    /// Like [`get`](Self::get), but a miss is an error
    pub fn aeration(&self, refid: &str) -> IndexResult<Aeration<'_>> {
        self.get(refid)
            .ok_or_else(|| IndexError::Lookup(format!("No compound or member with refid {refid:?}")))
    }

    /// Every compound, in index order
    pub fn compounds(&self) -> impl Iterator<Item = Aeration<'_>> {
        self.entries_tagged("compound")
    }

    /// Every member listing of this kind, in index order. Members listed
    /// under several compounds are yielded once.
    pub fn members_of_kind<'a>(&'a self, kind: &str) -> impl Iterator<Item = Aeration<'a>> + 'a {
        let kind = kind.to_string();
        self.entries_tagged("member").filter(move |aeration| {
            aeration.kind() == kind && self.entries.get(aeration.id()) == Some(&aeration.node())
        })
    }

    /// The first member with this name
    pub fn find_member_by_name(&self, name: &str) -> Option<Aeration<'_>> {
        self.entries_tagged("member")
            .find(|aeration| aeration.name() == name)
    }

    fn entries_tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = Aeration<'a>> {
        self.document
            .descendants(self.document.root())
            .into_iter()
            .filter(move |&node| self.document.tag(node) == tag)
            .map(move |node| Aeration::new(self, node))
    }

    /// Parse one of the XML files next to `index.xml`
    pub fn load_document(&self, file_name: &str) -> IndexResult<Tree> {
        let path = self.root.join(file_name);
        debug!(path = %path.display(), "Loading compound file");
        let source = fs::read_to_string(&path)?;
        Ok(Tree::parse_with(&source, ParseOptions::remove_blank_text())?)
    }
}

impl CrossReferenceIndex for DoxygenIndex {
    fn resolve(&self, refid: &str) -> Option<Target> {
        self.find(refid)
            .map(|(kind, name)| Target::new(TargetKind::from_doxygen(kind), name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"<doxygenindex version="1.9.8">
        <compound refid="foo_8h" kind="file"><name>foo.h</name>
            <member refid="foo_8h_1a1" kind="function"><name>open_file</name></member>
            <member refid="foo_8h_1a2" kind="define"><name>MAX_LEN</name></member>
        </compound>
        <compound refid="group__io" kind="group"><name>io</name>
            <member refid="foo_8h_1a1" kind="function"><name>open_file</name></member>
        </compound>
        <compound refid="structpoint" kind="struct"><name>point</name></compound>
    </doxygenindex>"#;

    fn index() -> DoxygenIndex {
        let document = Tree::parse_with(INDEX, ParseOptions::remove_blank_text()).unwrap();
        DoxygenIndex::from_document(PathBuf::from("xml"), document)
    }

    #[test]
    fn test_find() {
        let index = index();
        assert_eq!(index.find("foo_8h_1a2"), Some(("define", "MAX_LEN".to_string())));
        assert_eq!(index.find("structpoint"), Some(("struct", "point".to_string())));
        assert_eq!(index.find("missing"), None);
    }

    #[test]
    fn test_resolve() {
        let index = index();
        assert_eq!(
            index.resolve("foo_8h_1a1"),
            Some(Target::new(TargetKind::Function, "open_file"))
        );
        assert_eq!(index.resolve("foo_8h").map(|t| t.kind), Some(TargetKind::Other));
    }

    #[test]
    fn test_members_are_listed_once() {
        let index = index();
        let functions: Vec<String> = index
            .members_of_kind("function")
            .map(|member| member.name())
            .collect();
        assert_eq!(functions, ["open_file"]);
        assert_eq!(index.compounds().count(), 3);
    }

    #[test]
    fn test_missing_aeration_is_a_lookup_error() {
        assert!(matches!(index().aeration("nope"), Err(IndexError::Lookup(_))));
    }
}
