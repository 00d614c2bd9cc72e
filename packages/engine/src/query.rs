//! A small XPath subset for rule guards.
//!
//! Supported forms:
//!
//! ```text
//! ./*                                  has any child element
//! ./title                              has a <title> child
//! preceding-sibling::*[1][self::para]  immediately preceded by a <para>
//! ancestor::highlight                  inside a <highlight>
//! @kind='param'                        attribute test on the node itself
//! ```
//!
//! A query is truthy when it selects at least one node.

use crate::error::{AerateError, AerateResult};
use aerate_tree::{NodeId, Tree};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    SelfNode,
    Parent,
    Ancestor,
    Descendant,
    PrecedingSibling,
    FollowingSibling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NameTest {
    Any,
    Tag(String),
}

impl NameTest {
    fn matches(&self, tree: &Tree, node: NodeId) -> bool {
        match self {
            NameTest::Any => true,
            NameTest::Tag(tag) => tree.tag(node) == tag,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    Position(usize),
    SelfTag(String),
    HasChild(String),
    Attribute { name: String, value: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    axis: Axis,
    test: NameTest,
    predicates: Vec<Predicate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    Path(Vec<Step>),
    Attribute { name: String, value: Option<String> },
}

/// A compiled guard query
#[derive(Clone, PartialEq, Eq)]
pub struct PathQuery {
    source: String,
    expr: Expr,
}

impl fmt::Debug for PathQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PathQuery({:?})", self.source)
    }
}

impl PathQuery {
    pub fn parse(source: &str) -> AerateResult<Self> {
        let expr = Parser::new(source).parse()?;
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Nodes selected from `node`, in axis order, without duplicates
    pub fn select(&self, tree: &Tree, node: NodeId) -> Vec<NodeId> {
        match &self.expr {
            Expr::Attribute { name, value } => {
                if attribute_matches(tree, node, name, value.as_deref()) {
                    vec![node]
                } else {
                    Vec::new()
                }
            }
            Expr::Path(steps) => {
                let mut current = vec![node];
                for step in steps {
                    let mut next = Vec::new();
                    for &context in &current {
                        for selected in step.apply(tree, context) {
                            if !next.contains(&selected) {
                                next.push(selected);
                            }
                        }
                    }
                    current = next;
                }
                current
            }
        }
    }

    pub fn matches(&self, tree: &Tree, node: NodeId) -> bool {
        !self.select(tree, node).is_empty()
    }
}

impl Step {
    fn apply(&self, tree: &Tree, node: NodeId) -> Vec<NodeId> {
        let candidates: Vec<NodeId> = match self.axis {
            Axis::Child => tree.children(node).to_vec(),
            Axis::SelfNode => vec![node],
            Axis::Parent => tree.parent(node).into_iter().collect(),
            Axis::Ancestor => tree.ancestors(node).collect(),
            Axis::Descendant => tree.descendants(node),
            Axis::PrecedingSibling => tree.preceding_siblings(node),
            Axis::FollowingSibling => tree.following_siblings(node),
        };

        let mut selected: Vec<NodeId> = candidates
            .into_iter()
            .filter(|&candidate| self.test.matches(tree, candidate))
            .collect();

        for predicate in &self.predicates {
            selected = match predicate {
                Predicate::Position(n) => selected.get(n - 1).copied().into_iter().collect(),
                Predicate::SelfTag(tag) => selected
                    .into_iter()
                    .filter(|&id| tree.tag(id) == tag)
                    .collect(),
                Predicate::HasChild(tag) => selected
                    .into_iter()
                    .filter(|&id| tree.children(id).iter().any(|&c| tree.tag(c) == tag))
                    .collect(),
                Predicate::Attribute { name, value } => selected
                    .into_iter()
                    .filter(|&id| attribute_matches(tree, id, name, value.as_deref()))
                    .collect(),
            };
        }
        selected
    }
}

fn attribute_matches(tree: &Tree, node: NodeId, name: &str, value: Option<&str>) -> bool {
    match (tree.attribute(node, name), value) {
        (Some(actual), Some(expected)) => actual == expected,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

struct Parser<'a> {
    source: &'a str,
    rest: &'a str,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            rest: source.trim(),
        }
    }

    fn error(&self, message: impl Into<String>) -> AerateError {
        AerateError::query(self.source, message)
    }

    fn eat(&mut self, token: &str) -> bool {
        match self.rest.strip_prefix(token) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    fn name(&mut self) -> AerateResult<String> {
        let end = self
            .rest
            .find(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')))
            .unwrap_or(self.rest.len());
        // A trailing "::" belongs to an axis, not the name
        let end = self.rest[..end].find("::").unwrap_or(end);
        if end == 0 {
            return Err(self.error(format!("expected a name at '{}'", self.rest)));
        }
        let (name, rest) = self.rest.split_at(end);
        self.rest = rest;
        Ok(name.to_string())
    }

    fn quoted(&mut self) -> AerateResult<String> {
        let quote = match self.rest.chars().next() {
            Some(c @ ('\'' | '"')) => c,
            _ => return Err(self.error("expected a quoted value")),
        };
        let body = &self.rest[1..];
        let end = body
            .find(quote)
            .ok_or_else(|| self.error("unterminated string"))?;
        let value = body[..end].to_string();
        self.rest = &body[end + 1..];
        Ok(value)
    }

    fn attribute(&mut self) -> AerateResult<(String, Option<String>)> {
        let name = self.name()?;
        let value = if self.eat("=") { Some(self.quoted()?) } else { None };
        Ok((name, value))
    }

    fn parse(mut self) -> AerateResult<Expr> {
        if self.rest.is_empty() {
            return Err(self.error("empty query"));
        }
        if self.eat("@") {
            let (name, value) = self.attribute()?;
            return self.finish(Expr::Attribute { name, value });
        }

        self.eat("./");
        let mut steps = vec![self.step()?];
        while self.eat("/") {
            steps.push(self.step()?);
        }
        self.finish(Expr::Path(steps))
    }

    fn finish(&self, expr: Expr) -> AerateResult<Expr> {
        if self.rest.trim().is_empty() {
            Ok(expr)
        } else {
            Err(self.error(format!("unexpected '{}'", self.rest)))
        }
    }

    fn step(&mut self) -> AerateResult<Step> {
        if self.eat("..") {
            return Ok(Step {
                axis: Axis::Parent,
                test: NameTest::Any,
                predicates: Vec::new(),
            });
        }
        if self.rest == "." || self.rest.starts_with("./") {
            self.eat(".");
            return Ok(Step {
                axis: Axis::SelfNode,
                test: NameTest::Any,
                predicates: Vec::new(),
            });
        }

        let axis = self.axis()?;
        let test = if self.eat("*") {
            NameTest::Any
        } else {
            NameTest::Tag(self.name()?)
        };

        let mut predicates = Vec::new();
        while self.eat("[") {
            predicates.push(self.predicate()?);
            if !self.eat("]") {
                return Err(self.error("expected ']'"));
            }
        }
        Ok(Step {
            axis,
            test,
            predicates,
        })
    }

    fn axis(&mut self) -> AerateResult<Axis> {
        const AXES: &[(&str, Axis)] = &[
            ("child::", Axis::Child),
            ("self::", Axis::SelfNode),
            ("parent::", Axis::Parent),
            ("ancestor::", Axis::Ancestor),
            ("descendant::", Axis::Descendant),
            ("preceding-sibling::", Axis::PrecedingSibling),
            ("following-sibling::", Axis::FollowingSibling),
        ];
        for (prefix, axis) in AXES {
            if self.eat(prefix) {
                return Ok(*axis);
            }
        }
        if let Some(index) = self.rest.find("::") {
            let candidate = &self.rest[..index];
            if !candidate.contains(['/', '[']) {
                return Err(self.error(format!("unsupported axis '{candidate}'")));
            }
        }
        Ok(Axis::Child)
    }

    fn predicate(&mut self) -> AerateResult<Predicate> {
        if let Some(end) = self.rest.find(|c: char| !c.is_ascii_digit()) {
            if end > 0 {
                let position: usize = self.rest[..end]
                    .parse()
                    .map_err(|_| self.error("invalid position"))?;
                if position == 0 {
                    return Err(self.error("positions start at 1"));
                }
                self.rest = &self.rest[end..];
                return Ok(Predicate::Position(position));
            }
        }
        if self.eat("self::") {
            return Ok(Predicate::SelfTag(self.name()?));
        }
        if self.eat("@") {
            let (name, value) = self.attribute()?;
            return Ok(Predicate::Attribute { name, value });
        }
        Ok(Predicate::HasChild(self.name()?))
    }
}
