//! Predicates and facts.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{FactError, FactResult};

use super::term::{Term, Variable};

/// A named relation with a fixed arity.
///
/// Two predicates are equal iff both name and arity match, so `p/1` and
/// `p/2` are distinct relations. Cloning is cheap: the name is shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Predicate {
    name: Arc<str>,
    arity: usize,
}

impl Predicate {
    pub fn new(name: impl Into<Arc<str>>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Apply this predicate to `args`, checking the arity.
    pub fn fact<I, T>(&self, args: I) -> FactResult<Fact>
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        Fact::new(self.clone(), args.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// A predicate applied to an ordered sequence of terms.
///
/// The argument count always equals the predicate's arity; [`Fact::new`] is
/// the only way to build one from outside the crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Fact {
    predicate: Predicate,
    args: Vec<Term>,
}

impl Fact {
    /// Build a fact, failing with [`FactError::ArityMismatch`] when the number
    /// of arguments differs from the predicate's arity.
    pub fn new(predicate: Predicate, args: Vec<Term>) -> FactResult<Self> {
        if args.len() != predicate.arity {
            return Err(FactError::ArityMismatch {
                predicate: predicate.to_string(),
                expected: predicate.arity,
                actual: args.len(),
            });
        }
        Ok(Self { predicate, args })
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn args(&self) -> &[Term] {
        &self.args
    }

    /// A fact is ground when none of its arguments is a variable.
    pub fn is_ground(&self) -> bool {
        self.args.iter().all(Term::is_constant)
    }

    /// Distinct variables in first-occurrence order.
    pub fn variables(&self) -> Vec<&Variable> {
        let mut seen = HashSet::new();
        self.args
            .iter()
            .filter_map(Term::as_variable)
            .filter(|v| seen.insert(*v))
            .collect()
    }

    /// Canonical key identifying this fact up to variable renaming.
    ///
    /// Variables are numbered by first occurrence, so `p(X, Y, X)` and
    /// `p(A, B, A)` share a key while `p(X, X, Y)` does not.
    pub fn variant_key(&self) -> VariantKey {
        let mut order: Vec<&Variable> = Vec::new();
        let args = self
            .args
            .iter()
            .map(|term| match term {
                Term::Constant(c) => KeyTerm::Constant(Arc::clone(c)),
                Term::Variable(v) => {
                    let index = match order.iter().position(|seen| *seen == v) {
                        Some(index) => index,
                        None => {
                            order.push(v);
                            order.len() - 1
                        }
                    };
                    KeyTerm::Variable(index)
                }
            })
            .collect();
        VariantKey {
            predicate: self.predicate.clone(),
            args,
        }
    }

    /// Rebuild the fact with every argument mapped through `f`.
    ///
    /// The argument count is preserved, so the arity invariant holds.
    pub(crate) fn map_args(&self, mut f: impl FnMut(&Term) -> Term) -> Self {
        Self {
            predicate: self.predicate.clone(),
            args: self.args.iter().map(&mut f).collect(),
        }
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.predicate.name)?;
        if self.args.is_empty() {
            return Ok(());
        }
        write!(f, "(")?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}

/// Argument of a [`VariantKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyTerm {
    Constant(Arc<str>),
    /// Index of the variable's first occurrence.
    Variable(usize),
}

/// A fact with its variables canonically numbered; see [`Fact::variant_key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariantKey {
    predicate: Predicate,
    args: Vec<KeyTerm>,
}
