//! Static checks over a knowledge base's rule set.
//!
//! Builds the predicate dependency graph (an edge from each rule head's
//! predicate to each of its body predicates) and reports:
//! - rules whose head variables never occur in the body,
//! - predicates that depend on themselves, directly or through a cycle,
//! - body predicates that neither a fact nor a rule head defines.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use crate::kb::KnowledgeBase;
use crate::logic::{Predicate, Rule, Variable};

/// A rule that can derive non-ground consequences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnsafeRule {
    /// Position in the knowledge base's rule list.
    pub index: usize,
    pub rule: Rule,
    /// Head variables missing from the body.
    pub variables: Vec<Variable>,
}

/// Findings of [`analyze`]. Predicate lists are sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    pub unsafe_rules: Vec<UnsafeRule>,
    pub recursive_predicates: Vec<Predicate>,
    /// Mutually recursive groups with more than one member.
    pub recursive_groups: Vec<Vec<Predicate>>,
    pub undefined_predicates: Vec<Predicate>,
}

impl AnalysisReport {
    /// No unsafe rules and no undefined predicates. Recursion is not a
    /// problem on its own.
    pub fn is_clean(&self) -> bool {
        self.unsafe_rules.is_empty() && self.undefined_predicates.is_empty()
    }
}

/// Predicate dependency graph of a rule set.
struct DependencyGraph {
    graph: DiGraph<Predicate, ()>,
    nodes: HashMap<Predicate, NodeIndex>,
}

impl DependencyGraph {
    fn build(rules: &[Rule]) -> Self {
        let mut dg = Self {
            graph: DiGraph::new(),
            nodes: HashMap::new(),
        };
        for rule in rules {
            let head = dg.node(rule.head().predicate());
            for literal in rule.body() {
                let body = dg.node(literal.predicate());
                dg.graph.update_edge(head, body, ());
            }
        }
        dg
    }

    fn node(&mut self, predicate: &Predicate) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(predicate) {
            return idx;
        }
        let idx = self.graph.add_node(predicate.clone());
        self.nodes.insert(predicate.clone(), idx);
        idx
    }

    /// Strongly connected components that contain a cycle.
    fn cycles(&self) -> Vec<Vec<Predicate>> {
        tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| match scc.as_slice() {
                [single] => self.graph.contains_edge(*single, *single),
                _ => true,
            })
            .map(|scc| {
                let mut members: Vec<Predicate> =
                    scc.iter().map(|idx| self.graph[*idx].clone()).collect();
                members.sort();
                members
            })
            .collect()
    }
}

/// Run every check over `kb`.
pub fn analyze(kb: &KnowledgeBase) -> AnalysisReport {
    let rules = kb.rules();

    let unsafe_rules = rules
        .iter()
        .enumerate()
        .filter(|(_, rule)| !rule.is_safe())
        .map(|(index, rule)| UnsafeRule {
            index,
            rule: rule.clone(),
            variables: rule.unsafe_variables().into_iter().cloned().collect(),
        })
        .collect();

    let cycles = DependencyGraph::build(rules).cycles();
    let recursive_predicates: BTreeSet<Predicate> = cycles.iter().flatten().cloned().collect();
    let mut recursive_groups: Vec<Vec<Predicate>> =
        cycles.into_iter().filter(|group| group.len() > 1).collect();
    recursive_groups.sort();

    let heads: HashSet<&Predicate> = rules.iter().map(|r| r.head().predicate()).collect();
    let undefined_predicates: BTreeSet<Predicate> = rules
        .iter()
        .flat_map(|r| r.body())
        .map(|literal| literal.predicate())
        .filter(|p| !heads.contains(p) && kb.facts_for(p).is_empty())
        .cloned()
        .collect();

    let report = AnalysisReport {
        unsafe_rules,
        recursive_predicates: recursive_predicates.into_iter().collect(),
        recursive_groups,
        undefined_predicates: undefined_predicates.into_iter().collect(),
    };
    tracing::debug!(
        unsafe_rules = report.unsafe_rules.len(),
        recursive = report.recursive_predicates.len(),
        undefined = report.undefined_predicates.len(),
        "rule set analyzed"
    );
    report
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unsafe_rules.is_empty() {
            writeln!(f, "unsafe rules: none")?;
        } else {
            writeln!(f, "unsafe rules:")?;
            for entry in &self.unsafe_rules {
                writeln!(
                    f,
                    "  [{}] {}  (unbound: {})",
                    entry.index,
                    entry.rule,
                    join(&entry.variables)
                )?;
            }
        }

        if self.recursive_predicates.is_empty() {
            writeln!(f, "recursive predicates: none")?;
        } else {
            writeln!(f, "recursive predicates: {}", join(&self.recursive_predicates))?;
            for group in &self.recursive_groups {
                writeln!(f, "  mutually recursive: {}", join(group))?;
            }
        }

        if self.undefined_predicates.is_empty() {
            write!(f, "undefined predicates: none")
        } else {
            write!(f, "undefined predicates: {}", join(&self.undefined_predicates))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::parse_program;

    fn kb_from(text: &str) -> KnowledgeBase {
        let mut kb = KnowledgeBase::new();
        kb.extend_from_program(parse_program(text).unwrap()).unwrap();
        kb
    }

    #[test]
    fn clean_program() {
        let kb = kb_from("homem(socrates).\nmortal(X) :- homem(X).");
        let report = analyze(&kb);
        assert!(report.is_clean());
        assert!(report.recursive_predicates.is_empty());
    }

    #[test]
    fn detects_unsafe_rules() {
        let kb = kb_from("p(a).\nq(X, W) :- p(X).");
        let report = analyze(&kb);
        assert_eq!(report.unsafe_rules.len(), 1);
        assert_eq!(report.unsafe_rules[0].index, 0);
        assert_eq!(report.unsafe_rules[0].variables, vec![Variable::new("W")]);
        assert!(!report.is_clean());
    }

    #[test]
    fn detects_direct_and_mutual_recursion() {
        let kb = kb_from(
            "edge(a, b).\n\
             path(X, Z) :- path(X, Y), edge(Y, Z).\n\
             even(X) :- succ(Y, X), odd(Y).\n\
             odd(X) :- succ(Y, X), even(Y).\n\
             succ(z, s).",
        );
        let report = analyze(&kb);
        let names: Vec<&str> = report
            .recursive_predicates
            .iter()
            .map(|p| p.name())
            .collect();
        assert_eq!(names, vec!["even", "odd", "path"]);
        assert_eq!(report.recursive_groups.len(), 1);
        assert_eq!(report.recursive_groups[0].len(), 2);
    }

    #[test]
    fn detects_undefined_body_predicates() {
        let kb = kb_from("grandparent(X, Z) :- parent(X, Y), parent(Y, Z).");
        let report = analyze(&kb);
        assert_eq!(report.undefined_predicates, vec![Predicate::new("parent", 2)]);

        let kb = kb_from("parent(a, b).\ngrandparent(X, Z) :- parent(X, Y), parent(Y, Z).");
        assert!(analyze(&kb).undefined_predicates.is_empty());
    }

    #[test]
    fn report_renders_sections() {
        let kb = kb_from("p(X) :- p(X).");
        let text = analyze(&kb).to_string();
        assert!(text.contains("unsafe rules: none"));
        assert!(text.contains("recursive predicates: p/1"));
        assert!(text.contains("undefined predicates: none"));
    }
}
