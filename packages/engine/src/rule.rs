//! Guarded actions.
//!
//! A [`Rule`] pairs an action with the criteria deciding whether it may handle
//! a node. Criteria are conjunctive; a criterion that isn't configured doesn't
//! constrain anything.

use crate::error::AerateResult;
use crate::query::PathQuery;
use aerate_tree::{NodeId, Tree};
use std::fmt;

pub type NodePredicate = Box<dyn Fn(&Tree, NodeId) -> bool>;

/// A `when`/`unless` test
pub enum Guard {
    Predicate(NodePredicate),
    Query(PathQuery),
}

impl Guard {
    pub fn predicate(f: impl Fn(&Tree, NodeId) -> bool + 'static) -> Self {
        Guard::Predicate(Box::new(f))
    }

    pub fn query(source: &str) -> AerateResult<Self> {
        Ok(Guard::Query(PathQuery::parse(source)?))
    }

    pub fn evaluate(&self, tree: &Tree, node: NodeId) -> bool {
        match self {
            Guard::Predicate(f) => f(tree, node),
            Guard::Query(query) => query.matches(tree, node),
        }
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Guard::Predicate(_) => f.write_str("Guard::Predicate(..)"),
            Guard::Query(query) => write!(f, "Guard::Query({:?})", query.source()),
        }
    }
}

pub struct Rule<A> {
    name: String,
    action: A,
    tags: Option<Vec<String>>,
    within: Option<Vec<Vec<String>>>,
    when: Option<Guard>,
    unless: Option<Guard>,
}

impl<A> Rule<A> {
    pub fn new(name: impl Into<String>, action: A) -> Self {
        Self {
            name: name.into(),
            action,
            tags: None,
            within: None,
            when: None,
            unless: None,
        }
    }

    /// Only accept nodes with one of these tags
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Only accept nodes inside one of these ancestor chains. Each pattern is a
    /// `/` delimited list of tags that must appear, nearest first, as a
    /// subsequence of the node's ancestors: with ancestors `c -> b -> a`,
    /// `"c/a"` matches but `"a/c"` doesn't.
    pub fn within<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.within = Some(
            patterns
                .into_iter()
                .map(|pattern| pattern.as_ref().split('/').map(str::to_string).collect())
                .collect(),
        );
        self
    }

    pub fn when(mut self, predicate: impl Fn(&Tree, NodeId) -> bool + 'static) -> Self {
        self.when = Some(Guard::predicate(predicate));
        self
    }

    pub fn unless(mut self, predicate: impl Fn(&Tree, NodeId) -> bool + 'static) -> Self {
        self.unless = Some(Guard::predicate(predicate));
        self
    }

    pub fn when_query(mut self, query: &str) -> AerateResult<Self> {
        self.when = Some(Guard::query(query)?);
        Ok(self)
    }

    pub fn unless_query(mut self, query: &str) -> AerateResult<Self> {
        self.unless = Some(Guard::query(query)?);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn action(&self) -> &A {
        &self.action
    }

    pub fn accept(&self, tree: &Tree, node: NodeId) -> bool {
        if let Some(tags) = &self.tags {
            if !tags.iter().any(|tag| tag == tree.tag(node)) {
                return false;
            }
        }

        if let Some(patterns) = &self.within {
            if !patterns.iter().any(|pattern| within_chain(tree, node, pattern)) {
                return false;
            }
        }

        if let Some(when) = &self.when {
            if !when.evaluate(tree, node) {
                return false;
            }
        }

        if let Some(unless) = &self.unless {
            if unless.evaluate(tree, node) {
                return false;
            }
        }

        true
    }
}

fn within_chain(tree: &Tree, node: NodeId, pattern: &[String]) -> bool {
    let mut ancestors = tree.ancestors(node);
    pattern.iter()
        .all(|name| ancestors.any(|ancestor| tree.tag(ancestor) == name))
}

impl<A> fmt::Debug for Rule<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("within", &self.within)
            .field("when", &self.when)
            .field("unless", &self.unless)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Tree {
        Tree::parse("<c><b><a><leaf/></a></b></c>").unwrap()
    }

    fn leaf(tree: &Tree) -> NodeId {
        tree.descendants(tree.root())[2]
    }

    #[test]
    fn test_unconstrained_rule_accepts_everything() {
        let tree = tree();
        let rule = Rule::new("any", ());
        assert!(rule.accept(&tree, tree.root()));
        assert!(rule.accept(&tree, leaf(&tree)));
    }

    #[test]
    fn test_tags() {
        let tree = tree();
        let rule = Rule::new("leafs", ()).tags(["leaf", "other"]);
        assert!(rule.accept(&tree, leaf(&tree)));
        assert!(!rule.accept(&tree, tree.root()));
    }

    #[test]
    fn test_within_is_an_ordered_subsequence() {
        let tree = tree();
        let node = leaf(&tree);
        let accepts = |pattern: &str| Rule::new("w", ()).within([pattern]).accept(&tree, node);

        assert!(accepts("a"));
        assert!(accepts("c"));
        assert!(accepts("a/c"));
        assert!(accepts("a/b/c"));
        assert!(!accepts("c/a"));
        assert!(!accepts("leaf"));
        assert!(!accepts("a/x"));
    }

    #[test]
    fn test_within_specs_are_alternatives() {
        let tree = tree();
        let rule = Rule::new("w", ()).within(["x", "b"]);
        assert!(rule.accept(&tree, leaf(&tree)));
    }

    #[test]
    fn test_guards_combine() {
        let tree = tree();
        let node = leaf(&tree);
        let rule = Rule::new("g", ())
            .tags(["leaf"])
            .when(|tree, node| tree.parent(node).is_some())
            .unless_query("ancestor::x")
            .unwrap();
        assert!(rule.accept(&tree, node));

        let rejected = Rule::new("g", ()).unless_query("ancestor::b").unwrap();
        assert!(!rejected.accept(&tree, node));
    }

    #[test]
    fn test_malformed_query_guard() {
        assert!(Rule::new("bad", ()).when_query("para[").is_err());
    }
}
