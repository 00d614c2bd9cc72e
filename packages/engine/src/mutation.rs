use crate::cursor::MutationCursor;
use crate::engine::{Position, RuleEngine};
use crate::error::{AerateError, AerateResult};
use crate::rule::Rule;
use aerate_tree::{NodeId, Tree};
use tracing::{debug, instrument, trace};

/// An adjust action. It receives the engine so it can re-dispatch, and the
/// cursor positioned on the accepted node; it must mutate or move the cursor.
pub type MutationAction =
    Box<dyn Fn(&MutationEngine, &mut MutationCursor<'_>) -> AerateResult<()>>;

pub const DEFAULT_MAX_STEPS: usize = 1_000_000;

/// Drives a [`MutationCursor`] over a subtree, dispatching each node it lands
/// on to the first accepting rule. Nodes no rule accepts are stepped into.
pub struct MutationEngine {
    rules: RuleEngine<MutationAction>,
    max_steps: usize,
}

impl Default for MutationEngine {
    fn default() -> Self {
        Self {
            rules: RuleEngine::new(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl MutationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Build a rule around an action closure
    pub fn rule<F>(name: impl Into<String>, action: F) -> Rule<MutationAction>
    where
        F: Fn(&MutationEngine, &mut MutationCursor<'_>) -> AerateResult<()> + 'static,
    {
        Rule::new(name, Box::new(action) as MutationAction)
    }

    pub fn add_rule(&mut self, rule: Rule<MutationAction>, position: Position) -> AerateResult<()> {
        self.rules.add_rule(rule, position)
    }

    pub fn rules(&self) -> &RuleEngine<MutationAction> {
        &self.rules
    }

    /// Run the rules over `root` and its descendants until the cursor leaves
    /// the subtree
    #[instrument(skip(self, tree), fields(tag = tree.tag(root), rules = self.rules.len()))]
    pub fn run(&self, tree: &mut Tree, root: NodeId) -> AerateResult<()> {
        let mut cursor = MutationCursor::new(tree, root);
        let mut steps = 0usize;

        while let Some(node) = cursor.node() {
            if !cursor.contains(node) {
                cursor.stop();
                break;
            }
            if steps >= self.max_steps {
                return Err(AerateError::NoProgress {
                    steps,
                    tag: cursor.tree().tag(node).to_string(),
                });
            }
            self.handle(&mut cursor)?;
            steps += 1;
        }

        debug!(steps, "Mutation pass complete");
        Ok(())
    }

    /// Dispatch the cursor's current node once
    pub fn handle(&self, cursor: &mut MutationCursor<'_>) -> AerateResult<()> {
        let Some(node) = cursor.node() else {
            return Ok(());
        };
        match self.rules.dispatch(cursor.tree(), node) {
            Some(rule) => {
                trace!(rule = rule.name(), tag = cursor.tree().tag(node), "Applying rule");
                (rule.action())(self, cursor)
            }
            None => {
                cursor.advance_into();
                Ok(())
            }
        }
    }
}
