//! Horn rules: a single head fact implied by a conjunction of body facts.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use super::fact::Fact;
use super::term::{Term, Variable};

/// A Horn clause `head :- body1 AND body2 ...`.
///
/// Variables shared between head and body are substituted consistently. A
/// rule with an empty body holds unconditionally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Rule {
    head: Fact,
    body: Vec<Fact>,
}

impl Rule {
    pub fn new(head: Fact, body: Vec<Fact>) -> Self {
        Self { head, body }
    }

    pub fn head(&self) -> &Fact {
        &self.head
    }

    pub fn body(&self) -> &[Fact] {
        &self.body
    }

    /// Distinct variables of head and body, in first-occurrence order.
    pub fn variables(&self) -> Vec<&Variable> {
        let mut seen = HashSet::new();
        std::iter::once(&self.head)
            .chain(self.body.iter())
            .flat_map(|fact| fact.args().iter())
            .filter_map(Term::as_variable)
            .filter(|v| seen.insert(*v))
            .collect()
    }

    /// Head variables that never occur in the body.
    ///
    /// Such a rule can derive non-ground consequences; it is accepted, but
    /// flagged by [`crate::analysis`] and logged on insertion.
    pub fn unsafe_variables(&self) -> Vec<&Variable> {
        let body_vars: HashSet<&Variable> = self
            .body
            .iter()
            .flat_map(|fact| fact.args().iter())
            .filter_map(Term::as_variable)
            .collect();
        self.head
            .variables()
            .into_iter()
            .filter(|v| !body_vars.contains(v))
            .collect()
    }

    pub fn is_safe(&self) -> bool {
        self.unsafe_variables().is_empty()
    }

    /// Copy of the rule with every variable moved into `scope`.
    pub(crate) fn rename_apart(&self, scope: u64) -> Self {
        let rename = |term: &Term| match term {
            Term::Variable(v) => Term::Variable(v.in_scope(scope)),
            Term::Constant(_) => term.clone(),
        };
        Self {
            head: self.head.map_args(rename),
            body: self.body.iter().map(|fact| fact.map_args(rename)).collect(),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.head)?;
        if self.body.is_empty() {
            return Ok(());
        }
        write!(f, " :- ")?;
        for (i, fact) in self.body.iter().enumerate() {
            if i > 0 {
                write!(f, " AND ")?;
            }
            write!(f, "{fact}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::Predicate;

    fn grandparent_rule() -> Rule {
        let parent = Predicate::new("parent", 2);
        let grandparent = Predicate::new("grandparent", 2);
        Rule::new(
            grandparent
                .fact([Term::variable("X"), Term::variable("Z")])
                .unwrap(),
            vec![
                parent.fact([Term::variable("X"), Term::variable("Y")]).unwrap(),
                parent.fact([Term::variable("Y"), Term::variable("Z")]).unwrap(),
            ],
        )
    }

    #[test]
    fn display_joins_body_with_and() {
        assert_eq!(
            grandparent_rule().to_string(),
            "grandparent(X, Z) :- parent(X, Y) AND parent(Y, Z)"
        );
    }

    #[test]
    fn variables_in_first_occurrence_order() {
        let rule = grandparent_rule();
        let names: Vec<&str> = rule.variables().iter().map(|v| v.name()).collect();
        assert_eq!(names, vec!["X", "Z", "Y"]);
    }

    #[test]
    fn unsafe_head_variable_is_reported() {
        let p = Predicate::new("p", 2);
        let q = Predicate::new("q", 1);
        let rule = Rule::new(
            p.fact([Term::variable("X"), Term::variable("W")]).unwrap(),
            vec![q.fact([Term::variable("X")]).unwrap()],
        );
        assert!(!rule.is_safe());
        let names: Vec<&str> = rule.unsafe_variables().iter().map(|v| v.name()).collect();
        assert_eq!(names, vec!["W"]);
        assert!(grandparent_rule().is_safe());
    }

    #[test]
    fn rename_apart_moves_every_variable() {
        let renamed = grandparent_rule().rename_apart(7);
        assert!(renamed.variables().iter().all(|v| v.scope() == 7));
        assert_eq!(
            renamed.to_string(),
            "grandparent(X#7, Z#7) :- parent(X#7, Y#7) AND parent(Y#7, Z#7)"
        );
    }

    #[test]
    fn rename_scopes_go_past_u32() {
        let low = grandparent_rule().rename_apart(1);
        let high = grandparent_rule().rename_apart(u64::from(u32::MAX) + 2);
        assert_ne!(low, high);
        assert!(high.variables().iter().all(|v| v.scope() == 4_294_967_297));
    }
}
