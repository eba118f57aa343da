//! Most general unifier for function-free facts.
//!
//! With no compound terms, unification only ever compares constants and
//! binds variables, argument position by argument position.

use crate::error::{UnifyError, UnifyResult};
use crate::logic::{Fact, Term};
use crate::substitution::Substitution;

/// Unify two facts, returning their most general unifier.
pub fn unify(left: &Fact, right: &Fact) -> UnifyResult<Substitution> {
    unify_with(left, right, &Substitution::new())
}

/// Unify two facts under the existing bindings of `base`.
///
/// On success the result extends `base`; `base` itself is not modified.
pub fn unify_with(left: &Fact, right: &Fact, base: &Substitution) -> UnifyResult<Substitution> {
    if left.predicate() != right.predicate() {
        return Err(UnifyError::PredicateMismatch {
            left: left.predicate().to_string(),
            right: right.predicate().to_string(),
        });
    }

    let mut subst = base.clone();
    for (a, b) in left.args().iter().zip(right.args()) {
        let a = subst.resolve(a);
        let b = subst.resolve(b);

        match (&a, &b) {
            // Same constant, or the same variable on both sides.
            _ if a == b => {}

            (Term::Variable(v), t) | (t, Term::Variable(v)) => {
                subst.bind_in_place(v.clone(), t.clone())?;
            }

            (Term::Constant(x), Term::Constant(y)) => {
                return Err(UnifyError::ConstantClash {
                    left: x.to_string(),
                    right: y.to_string(),
                });
            }
        }
    }
    Ok(subst)
}
