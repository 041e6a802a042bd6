//! Ordered first-match-wins decision tables.
//!
//! RULE: Every rule ladder in the pipeline is a DecisionTable.
//! Rules are evaluated in insertion order; the first predicate that
//! holds decides the outcome, otherwise the fallback applies.
//! Order is part of the contract. Never sort or dedupe rules.

use std::fmt;

type Predicate<I> = Box<dyn Fn(&I) -> bool + Send + Sync>;

pub struct Rule<I, O> {
    pub name: &'static str,
    predicate: Predicate<I>,
    pub outcome: O,
}

pub struct DecisionTable<I, O> {
    name: &'static str,
    rules: Vec<Rule<I, O>>,
    fallback: O,
}

/// Which rule decided an outcome. `None` means the fallback applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision<'a, O> {
    pub rule: Option<&'static str>,
    pub outcome: &'a O,
}

impl<I, O> DecisionTable<I, O> {
    pub fn new(name: &'static str, fallback: O) -> Self {
        Self {
            name,
            rules: Vec::new(),
            fallback,
        }
    }

    /// Append a rule. Later rules only fire when every earlier one failed.
    pub fn rule(
        mut self,
        name: &'static str,
        predicate: impl Fn(&I) -> bool + Send + Sync + 'static,
        outcome: O,
    ) -> Self {
        self.rules.push(Rule {
            name,
            predicate: Box::new(predicate),
            outcome,
        });
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }

    pub fn decide(&self, input: &I) -> Decision<'_, O> {
        self.rules
            .iter()
            .find(|r| (r.predicate)(input))
            .map(|r| Decision {
                rule: Some(r.name),
                outcome: &r.outcome,
            })
            .unwrap_or(Decision {
                rule: None,
                outcome: &self.fallback,
            })
    }

    pub fn evaluate(&self, input: &I) -> &O {
        self.decide(input).outcome
    }
}

impl<I, O: fmt::Debug> fmt::Debug for DecisionTable<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionTable")
            .field("name", &self.name)
            .field("rules", &self.rule_names())
            .field("fallback", &self.fallback)
            .finish()
    }
}
