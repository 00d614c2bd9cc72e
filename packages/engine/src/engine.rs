use crate::error::{AerateError, AerateResult};
use crate::rule::Rule;
use aerate_tree::{NodeId, Tree};

/// Where [`RuleEngine::add_rule`] inserts a rule
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    Append,
    Prepend,
    /// Immediately before the first rule with this name
    Before(String),
}

/// An ordered list of rules. The first rule accepting a node handles it.
pub struct RuleEngine<A> {
    rules: Vec<Rule<A>>,
}

impl<A> Default for RuleEngine<A> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<A> RuleEngine<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rule(&mut self, rule: Rule<A>, position: Position) -> AerateResult<()> {
        match position {
            Position::Append => self.rules.push(rule),
            Position::Prepend => self.rules.insert(0, rule),
            Position::Before(name) => {
                let index = self
                    .rules
                    .iter()
                    .position(|existing| existing.name() == name)
                    .ok_or(AerateError::UnknownRule(name))?;
                self.rules.insert(index, rule);
            }
        }
        Ok(())
    }

    /// The first rule accepting `node`
    pub fn dispatch(&self, tree: &Tree, node: NodeId) -> Option<&Rule<A>> {
        self.rules.iter().find(|rule| rule.accept(tree, node))
    }

    pub fn rules(&self) -> &[Rule<A>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names<A>(engine: &RuleEngine<A>) -> Vec<&str> {
        engine.rules().iter().map(Rule::name).collect()
    }

    #[test]
    fn test_insertion_positions() {
        let mut engine = RuleEngine::new();
        engine.add_rule(Rule::new("b", ()), Position::Append).unwrap();
        engine.add_rule(Rule::new("d", ()), Position::Append).unwrap();
        engine.add_rule(Rule::new("a", ()), Position::Prepend).unwrap();
        engine
            .add_rule(Rule::new("c", ()), Position::Before("d".to_string()))
            .unwrap();
        assert_eq!(names(&engine), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_before_unknown_rule() {
        let mut engine = RuleEngine::new();
        let result = engine.add_rule(Rule::new("x", ()), Position::Before("missing".into()));
        assert!(matches!(result, Err(AerateError::UnknownRule(name)) if name == "missing"));
        assert!(engine.is_empty());
    }

    #[test]
    fn test_first_match_wins() {
        let tree = Tree::parse("<para><bold/></para>").unwrap();
        let bold = tree.children(tree.root())[0];

        let mut engine = RuleEngine::new();
        engine
            .add_rule(Rule::new("para", 1).tags(["para"]), Position::Append)
            .unwrap();
        engine
            .add_rule(Rule::new("inside", 2).within(["para"]), Position::Append)
            .unwrap();
        engine.add_rule(Rule::new("any", 3), Position::Append).unwrap();

        assert_eq!(engine.dispatch(&tree, bold).map(|r| *r.action()), Some(2));
        assert_eq!(engine.dispatch(&tree, tree.root()).map(|r| *r.action()), Some(1));
    }

    #[test]
    fn test_no_match() {
        let tree = Tree::parse("<para/>").unwrap();
        let mut engine = RuleEngine::new();
        engine
            .add_rule(Rule::new("bold", ()).tags(["bold"]), Position::Append)
            .unwrap();
        assert!(engine.dispatch(&tree, tree.root()).is_none());
    }
}
