//! A traversal position that survives structural edits.
//!
//! A [`MutationCursor`] walks a subtree in document order and offers the
//! edits the adjust pass needs. Every edit leaves the cursor either on a node
//! still attached beneath the cursor's root or exhausted; the cursor never
//! escapes its root.
//!
//! Text and tails are reattached with [`Tree::extend_text`] and
//! [`Tree::extend_tail`], so content is only ever concatenated, never
//! overwritten.
//!
//! Splitting `<parent>` before `<target>`:
//!
//! ```text
//! <parent>prefix<target>text</target>suffix</parent>
//! <parent>prefix</parent><parent><target>text</target>suffix</parent>
//! ```
//!
//! Lifting `<target>` out of `<parent>`:
//!
//! ```text
//! <parent>prefix<target>text</target>suffix</parent>
//! <parent>prefix</parent><target>text</target><parent>suffix</parent>
//! ```

use crate::error::{AerateError, AerateResult};
use aerate_tree::{NodeId, Tree};
use tracing::trace;

pub struct MutationCursor<'t> {
    tree: &'t mut Tree,
    root: NodeId,
    current: Option<NodeId>,
}

impl<'t> MutationCursor<'t> {
    /// A cursor positioned on `root`
    pub fn new(tree: &'t mut Tree, root: NodeId) -> Self {
        Self {
            tree,
            root,
            current: Some(root),
        }
    }

    pub fn tree(&self) -> &Tree {
        &*self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut *self.tree
    }

    /// The boundary the cursor can't leave
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The current node, or `None` once exhausted
    pub fn node(&self) -> Option<NodeId> {
        self.current
    }

    pub fn is_exhausted(&self) -> bool {
        self.current.is_none()
    }

    /// Whether `node` is the root or one of its attached descendants
    pub fn contains(&self, node: NodeId) -> bool {
        node == self.root || self.tree.is_ancestor_of(self.root, node)
    }

    pub fn move_to(&mut self, node: NodeId) -> AerateResult<()> {
        if !self.contains(node) {
            return Err(self.violation("move to", node, "outside the cursor's subtree"));
        }
        self.current = Some(node);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Movement
    // ------------------------------------------------------------------

    /// Move to the first child, or past the current node if it has none
    pub fn advance_into(&mut self) {
        let Some(node) = self.current else { return };
        match self.tree.first_child(node) {
            Some(child) => self.current = Some(child),
            None => self.advance_past(),
        }
    }

    /// Move to the next node that isn't a descendant of the current one
    pub fn advance_past(&mut self) {
        let Some(node) = self.current else { return };
        self.current = self.next_outside(node);
    }

    /// Move to the previous sibling, or the parent when there is none. The
    /// cursor stays put on the root.
    pub fn retreat(&mut self) {
        let Some(node) = self.current else { return };
        if node == self.root {
            return;
        }
        self.current = self
            .tree
            .previous_sibling(node)
            .or_else(|| self.tree.parent(node));
    }

    pub fn stop(&mut self) {
        self.current = None;
    }

    /// The node following `node`'s subtree in document order, within the root
    fn next_outside(&self, node: NodeId) -> Option<NodeId> {
        let mut at = node;
        loop {
            if at == self.root {
                return None;
            }
            if let Some(next) = self.tree.next_sibling(at) {
                return Some(next);
            }
            at = self.tree.parent(at)?;
        }
    }

    // ------------------------------------------------------------------
    // Edits
    // ------------------------------------------------------------------

    /// Join `node` (default: the current node) into its previous sibling.
    ///
    /// The previous sibling's tail is folded into its content, followed by
    /// the node's text and children; the node's tail becomes the previous
    /// sibling's tail and the node is detached. A cursor on the node moves to
    /// its first moved child, or past it if it had none.
    pub fn merge_into_previous(&mut self, node: Option<NodeId>) -> AerateResult<()> {
        let node = self.target("merge", node)?;
        if node == self.root {
            return Err(self.violation("merge", node, "it is the cursor's root"));
        }
        let previous = self
            .tree
            .previous_sibling(node)
            .ok_or_else(|| self.violation("merge", node, "it has no previous sibling"))?;
        trace!(op = "merge", tag = self.tree.tag(node), into = self.tree.tag(previous));

        let on_node = self.current == Some(node);
        let first_child = self.tree.first_child(node);
        let after = self.next_outside(node);

        if let Some(tail) = self.tree.take_tail(previous) {
            self.append_content(previous, &tail);
        }
        if let Some(text) = self.tree.take_text(node) {
            self.append_content(previous, &text);
        }
        for child in self.tree.children(node).to_vec() {
            self.tree.append_child(previous, child)?;
        }
        let tail = self.tree.take_tail(node);
        self.tree.set_tail(previous, tail);
        self.tree.detach(node)?;

        if on_node {
            self.current = first_child.or(after);
        }
        Ok(())
    }

    /// Split `node`'s parent so that `node` and its following siblings move
    /// into a copy of the parent placed right after it. The cursor doesn't
    /// move.
    pub fn split_before(&mut self, node: Option<NodeId>) -> AerateResult<()> {
        let node = self.target("split", node)?;
        let parent = self.splittable_parent("split", node)?;
        trace!(op = "split_before", tag = self.tree.tag(node), parent = self.tree.tag(parent));

        let continuation = self.tree.duplicate_shallow(parent);
        let mut moved = vec![node];
        moved.extend(self.tree.following_siblings(node));
        for child in moved {
            self.tree.append_child(continuation, child)?;
        }
        self.place_after(parent, &[continuation])
    }

    /// Split `node`'s parent at `node`'s tail: the tail and every following
    /// sibling move into a copy of the parent placed right after it. The
    /// cursor doesn't move.
    pub fn split_after_tail(&mut self, node: Option<NodeId>) -> AerateResult<()> {
        let node = self.target("split", node)?;
        let parent = self.splittable_parent("split", node)?;
        trace!(op = "split_after_tail", tag = self.tree.tag(node), parent = self.tree.tag(parent));

        let continuation = self.tree.duplicate_shallow(parent);
        let tail = self.tree.take_tail(node);
        self.tree.set_text(continuation, tail);
        for child in self.tree.following_siblings(node) {
            self.tree.append_child(continuation, child)?;
        }
        self.place_after(parent, &[continuation])
    }

    /// Promote `node` to a sibling right after its parent. Its tail and
    /// following siblings, if any, go into a copy of the parent placed after
    /// the lifted node. The cursor doesn't move.
    pub fn lift(&mut self, node: Option<NodeId>) -> AerateResult<()> {
        let node = self.target("lift", node)?;
        let parent = self.splittable_parent("lift", node)?;
        trace!(op = "lift", tag = self.tree.tag(node), parent = self.tree.tag(parent));

        let following = self.tree.following_siblings(node);
        let tail = self.tree.take_tail(node).filter(|tail| !tail.is_empty());

        let mut placed = vec![node];
        if tail.is_some() || !following.is_empty() {
            let continuation = self.tree.duplicate_shallow(parent);
            self.tree.set_text(continuation, tail);
            for child in following {
                self.tree.append_child(continuation, child)?;
            }
            placed.push(continuation);
        }
        self.place_after(parent, &placed)
    }

    /// Detach `node` and its descendants. Its tail joins the preceding text.
    /// A cursor on or inside the node first moves past it.
    pub fn remove(&mut self, node: Option<NodeId>) -> AerateResult<()> {
        let node = self.target("remove", node)?;
        if node == self.root {
            return Err(self.violation("remove", node, "it is the cursor's root"));
        }
        trace!(op = "remove", tag = self.tree.tag(node));

        if let Some(current) = self.current {
            if current == node || self.tree.is_ancestor_of(node, current) {
                self.current = self.next_outside(node);
            }
        }

        if let Some(tail) = self.tree.take_tail(node) {
            match (self.tree.previous_sibling(node), self.tree.parent(node)) {
                (Some(previous), _) => self.tree.extend_tail(previous, &tail),
                (None, Some(parent)) => self.tree.extend_text(parent, &tail),
                (None, None) => {}
            }
        }
        self.tree.detach(node)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn target(&self, operation: &'static str, node: Option<NodeId>) -> AerateResult<NodeId> {
        let node = match node.or(self.current) {
            Some(node) => node,
            None => {
                return Err(AerateError::contract(operation, "", "the cursor is exhausted"));
            }
        };
        if !self.contains(node) {
            return Err(self.violation(operation, node, "outside the cursor's subtree"));
        }
        Ok(node)
    }

    /// The parent of `node`, provided it sits strictly below the root so that
    /// a copy of it can be placed inside the root
    fn splittable_parent(&self, operation: &'static str, node: NodeId) -> AerateResult<NodeId> {
        if node == self.root {
            return Err(self.violation(operation, node, "it is the cursor's root"));
        }
        match self.tree.parent(node) {
            Some(parent) if parent != self.root => Ok(parent),
            _ => Err(self.violation(operation, node, "it is a direct child of the cursor's root")),
        }
    }

    /// Insert `nodes` in order right after `parent`, handing the parent's
    /// tail to the last of them
    fn place_after(&mut self, parent: NodeId, nodes: &[NodeId]) -> AerateResult<()> {
        let mut anchor = parent;
        for &node in nodes {
            self.tree.insert_after(anchor, node)?;
            anchor = node;
        }
        if let Some(tail) = self.tree.take_tail(parent) {
            self.tree.prepend_tail(anchor, &tail);
        }
        Ok(())
    }

    /// Append text at the end of `node`'s content
    fn append_content(&mut self, node: NodeId, text: &str) {
        match self.tree.last_child(node) {
            Some(last) => self.tree.extend_tail(last, text),
            None => self.tree.extend_text(node, text),
        }
    }

    fn violation(&self, operation: &'static str, node: NodeId, reason: &str) -> AerateError {
        AerateError::contract(operation, self.tree.tag(node), reason)
    }
}
