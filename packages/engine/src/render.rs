use crate::engine::{Position, RuleEngine};
use crate::error::AerateResult;
use crate::rule::Rule;
use crate::xref::{CrossReferenceIndex, NullIndex};
use aerate_tree::{NodeId, Tree};
use tracing::trace;

/// A render action: the engine (for recursion and the index), the tree, the
/// accepted node and the text already emitted on the current line.
pub type RenderAction = Box<dyn Fn(&RenderEngine, &Tree, NodeId, &str) -> AerateResult<String>>;

/// Output for nodes no rule accepts
pub type RenderFallback = Box<dyn Fn(&Tree, NodeId) -> String>;

/// Recursively renders a node through the first accepting rule
pub struct RenderEngine {
    rules: RuleEngine<RenderAction>,
    index: Box<dyn CrossReferenceIndex>,
    fallback: RenderFallback,
}

impl Default for RenderEngine {
    fn default() -> Self {
        Self::new(Box::new(NullIndex))
    }
}

impl RenderEngine {
    /// An engine whose fallback is the node's string value
    pub fn new(index: Box<dyn CrossReferenceIndex>) -> Self {
        Self {
            rules: RuleEngine::new(),
            index,
            fallback: Box::new(|tree, node| tree.string_value(node)),
        }
    }

    pub fn with_fallback(mut self, fallback: impl Fn(&Tree, NodeId) -> String + 'static) -> Self {
        self.fallback = Box::new(fallback);
        self
    }

    /// Build a rule around an action closure
    pub fn rule<F>(name: impl Into<String>, action: F) -> Rule<RenderAction>
    where
        F: Fn(&RenderEngine, &Tree, NodeId, &str) -> AerateResult<String> + 'static,
    {
        Rule::new(name, Box::new(action) as RenderAction)
    }

    pub fn add_rule(&mut self, rule: Rule<RenderAction>, position: Position) -> AerateResult<()> {
        self.rules.add_rule(rule, position)
    }

    pub fn rules(&self) -> &RuleEngine<RenderAction> {
        &self.rules
    }

    pub fn index(&self) -> &dyn CrossReferenceIndex {
        self.index.as_ref()
    }

    /// Render `node`; `before` is the output so far on the current line
    pub fn render(&self, tree: &Tree, node: NodeId, before: &str) -> AerateResult<String> {
        match self.rules.dispatch(tree, node) {
            Some(rule) => {
                trace!(rule = rule.name(), tag = tree.tag(node), "Rendering");
                (rule.action())(self, tree, node, before)
            }
            None => Ok((self.fallback)(tree, node)),
        }
    }
}
