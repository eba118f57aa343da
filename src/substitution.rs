//! Variable substitutions.
//!
//! A [`Substitution`] maps variables to terms. Bindings may chain through
//! other variables (`X -> Y`, `Y -> a`); [`Substitution::resolve`] walks a
//! chain to its end. The occurs-check keeps chains acyclic, so every walk
//! terminates.
//!
//! Public operations are pure: they return a new substitution and leave the
//! receiver untouched.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::{SubstitutionError, SubstitutionResult};
use crate::logic::{Fact, Term, Variable};

/// A finite mapping from variables to terms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Substitution {
    bindings: BTreeMap<Variable, Term>,
}

impl Substitution {
    /// Create an empty substitution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a new substitution extending this one with `variable -> term`.
    ///
    /// Fails with [`SubstitutionError::CyclicBinding`] when `term`, followed
    /// through existing bindings, leads back to `variable`. If `variable` is
    /// already bound, the two values are merged: an unbound end of either
    /// chain is bound to the other side, and two different constants fail
    /// with [`SubstitutionError::Conflict`].
    pub fn bind(&self, variable: Variable, term: Term) -> SubstitutionResult<Self> {
        let mut next = self.clone();
        next.bind_in_place(variable, term)?;
        Ok(next)
    }

    pub(crate) fn bind_in_place(
        &mut self,
        variable: Variable,
        term: Term,
    ) -> SubstitutionResult<()> {
        let value = self.resolve(&term);
        if value.as_variable() == Some(&variable) {
            return Err(SubstitutionError::CyclicBinding { variable, term });
        }
        if !self.bindings.contains_key(&variable) {
            self.bindings.insert(variable, value);
            return Ok(());
        }
        let existing = self.resolve(&Term::Variable(variable.clone()));
        self.merge_resolved(&variable, existing, value)
    }

    /// Follow bindings from `term` until a constant or an unbound variable.
    pub fn resolve(&self, term: &Term) -> Term {
        let mut current = term;
        while let Term::Variable(v) = current {
            match self.bindings.get(v) {
                Some(next) => current = next,
                None => break,
            }
        }
        current.clone()
    }

    /// Instantiate `fact`: every bound variable is replaced by the end of
    /// its chain; unbound variables are left as they are.
    pub fn apply(&self, fact: &Fact) -> Fact {
        fact.map_args(|term| self.resolve(term))
    }

    /// Merge `other` into this substitution.
    ///
    /// Each binding of `other` is re-checked against the bindings already
    /// merged; a variable bound to two different constants fails with
    /// [`SubstitutionError::Conflict`].
    pub fn compose(&self, other: &Substitution) -> SubstitutionResult<Self> {
        let mut result = self.clone();
        for (variable, term) in &other.bindings {
            let left = result.resolve(&Term::Variable(variable.clone()));
            let right = result.resolve(term);
            result.merge_resolved(variable, left, right)?;
        }
        Ok(result)
    }

    /// Unify two chain ends. `variable` only names the binding in errors.
    fn merge_resolved(
        &mut self,
        variable: &Variable,
        left: Term,
        right: Term,
    ) -> SubstitutionResult<()> {
        if left == right {
            return Ok(());
        }
        match (left, right) {
            (Term::Variable(v), value) | (value, Term::Variable(v)) => {
                self.bindings.insert(v, value);
                Ok(())
            }
            (left, right) => Err(SubstitutionError::Conflict {
                variable: variable.clone(),
                left,
                right,
            }),
        }
    }

    /// Project onto `variables`, fully resolved. Variables that remain
    /// unbound are omitted.
    pub fn restrict<'a>(&self, variables: impl IntoIterator<Item = &'a Variable>) -> Self {
        let bindings = variables
            .into_iter()
            .filter_map(|v| {
                let value = self.resolve(&Term::Variable(v.clone()));
                (value.as_variable() != Some(v)).then(|| (v.clone(), value))
            })
            .collect();
        Self { bindings }
    }

    /// The direct binding of `variable`, if any (not resolved).
    pub fn get(&self, variable: &Variable) -> Option<&Term> {
        self.bindings.get(variable)
    }

    /// Look up a caller-scoped variable by name and resolve it.
    pub fn value_of(&self, name: &str) -> Option<Term> {
        let variable = Variable::new(name);
        self.bindings
            .contains_key(&variable)
            .then(|| self.resolve(&Term::Variable(variable)))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Term)> {
        self.bindings.iter()
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (variable, term)) in self.bindings.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{variable} -> {term}")?;
        }
        write!(f, "}}")
    }
}
