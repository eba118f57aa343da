//! Knowledge base facade: the public API for storing and querying knowledge.
//!
//! The [`KnowledgeBase`] owns the ground fact set and the ordered rule list.
//! Queries take `&self` and never mutate it; see [`crate::shared`] for the
//! locked wrapper used when several threads need access.

use std::collections::{HashMap, HashSet};

use crate::error::{FactError, KbResult};
use crate::infer::{ResolutionStats, ResolverConfig, Solutions};
use crate::logic::{Fact, Predicate, Rule};
use crate::program::{Clause, Program};
use crate::substitution::Substitution;

/// In-memory store of ground facts and Horn rules.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    facts: HashSet<Fact>,
    /// Predicate index over `facts`, in insertion order.
    by_predicate: HashMap<Predicate, Vec<Fact>>,
    rules: Vec<Rule>,
    config: ResolverConfig,
}

impl KnowledgeBase {
    /// Create an empty knowledge base with default resolver bounds.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ResolverConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ResolverConfig) {
        self.config = config;
    }

    // -----------------------------------------------------------------------
    // Facts
    // -----------------------------------------------------------------------

    /// Insert a ground fact. Returns `true` if it was not already present.
    ///
    /// Fails with [`FactError::NonGround`] if the fact contains variables.
    pub fn add_fact(&mut self, fact: Fact) -> KbResult<bool> {
        if !fact.is_ground() {
            return Err(FactError::NonGround {
                fact: fact.to_string(),
            }
            .into());
        }
        if self.facts.contains(&fact) {
            return Ok(false);
        }
        tracing::trace!(fact = %fact, "adding fact");
        self.by_predicate
            .entry(fact.predicate().clone())
            .or_default()
            .push(fact.clone());
        self.facts.insert(fact);
        Ok(true)
    }

    /// Remove a fact. Returns `true` if it was present.
    pub fn remove_fact(&mut self, fact: &Fact) -> bool {
        if !self.facts.remove(fact) {
            return false;
        }
        if let Some(bucket) = self.by_predicate.get_mut(fact.predicate()) {
            bucket.retain(|f| f != fact);
            if bucket.is_empty() {
                self.by_predicate.remove(fact.predicate());
            }
        }
        true
    }

    pub fn contains_fact(&self, fact: &Fact) -> bool {
        self.facts.contains(fact)
    }

    /// Stored facts for one predicate, in insertion order.
    pub fn facts_for(&self, predicate: &Predicate) -> &[Fact] {
        self.by_predicate
            .get(predicate)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All stored facts, grouped by predicate (group order unspecified).
    pub fn facts(&self) -> impl Iterator<Item = &Fact> {
        self.by_predicate.values().flatten()
    }

    /// Predicates with at least one stored fact.
    pub fn fact_predicates(&self) -> impl Iterator<Item = &Predicate> {
        self.by_predicate.keys()
    }

    pub fn len_facts(&self) -> usize {
        self.facts.len()
    }

    // -----------------------------------------------------------------------
    // Rules
    // -----------------------------------------------------------------------

    /// Append a rule. Rules are tried in insertion order.
    ///
    /// Rules over predicates never seen before are fine: predicates are
    /// implicit. Unsafe rules are accepted with a warning.
    pub fn add_rule(&mut self, rule: Rule) {
        if !rule.is_safe() {
            let unbound: Vec<String> = rule
                .unsafe_variables()
                .iter()
                .map(|v| v.to_string())
                .collect();
            tracing::warn!(
                rule = %rule,
                variables = %unbound.join(", "),
                "head variables do not occur in the rule body"
            );
        }
        tracing::trace!(rule = %rule, "adding rule");
        self.rules.push(rule);
    }

    /// Remove and return the rule at `index`, if any.
    pub fn remove_rule(&mut self, index: usize) -> Option<Rule> {
        (index < self.rules.len()).then(|| self.rules.remove(index))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rules whose head uses `predicate`, in insertion order.
    pub fn rules_for<'a>(&'a self, predicate: &'a Predicate) -> impl Iterator<Item = &'a Rule> {
        self.rules
            .iter()
            .filter(move |rule| rule.head().predicate() == predicate)
    }

    pub fn len_rules(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty() && self.rules.is_empty()
    }

    /// Drop all facts and rules; the resolver config is kept.
    pub fn clear(&mut self) {
        self.facts.clear();
        self.by_predicate.clear();
        self.rules.clear();
    }

    /// Add every clause of a parsed program.
    ///
    /// Ground fact clauses become facts; a fact clause with variables holds
    /// for every value and is stored as a rule with an empty body.
    pub fn extend_from_program(&mut self, program: Program) -> KbResult<()> {
        for clause in program.clauses {
            match clause {
                Clause::Fact(fact) if fact.is_ground() => {
                    self.add_fact(fact)?;
                }
                Clause::Fact(fact) => self.add_rule(Rule::new(fact, Vec::new())),
                Clause::Rule(rule) => self.add_rule(rule),
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Is `goal` a stored fact or derivable through the rules?
    ///
    /// Never fails: unknown predicates, cyclic rules and exhausted search
    /// bounds all answer `false`. A goal with variables asks whether some
    /// instance of it holds.
    pub fn query(&self, goal: &Fact) -> bool {
        if goal.is_ground() && self.contains_fact(goal) {
            tracing::debug!(goal = %goal, "query answered by stored fact");
            return true;
        }
        self.resolve_with_stats(goal).0.is_some()
    }

    /// First answer to `goal`, restricted to the goal's variables.
    pub fn solve(&self, goal: &Fact) -> Option<Substitution> {
        self.resolve_with_stats(goal).0
    }

    /// Up to `limit` distinct answers to `goal`, in search order.
    pub fn answers(&self, goal: &Fact, limit: usize) -> Vec<Substitution> {
        let mut solutions = self.solutions(goal);
        let answers: Vec<Substitution> = solutions.by_ref().take(limit).collect();
        let stats = solutions.stats();
        tracing::debug!(
            goal = %goal,
            answers = answers.len(),
            steps = stats.steps,
            passes = stats.passes,
            "answers enumerated"
        );
        answers
    }

    /// First answer together with the search counters.
    pub fn resolve_with_stats(&self, goal: &Fact) -> (Option<Substitution>, ResolutionStats) {
        let mut solutions = self.solutions(goal);
        let answer = solutions.next();
        let stats = solutions.into_stats();
        tracing::debug!(
            goal = %goal,
            proved = answer.is_some(),
            steps = stats.steps,
            passes = stats.passes,
            loop_prunes = stats.loop_prunes,
            "query resolved"
        );
        (answer, stats)
    }

    /// Lazy iterator over the distinct answers to `goal`.
    pub fn solutions(&self, goal: &Fact) -> Solutions<'_> {
        Solutions::new(self, goal)
    }
}
