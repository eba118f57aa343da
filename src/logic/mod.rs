//! The logic data model: terms, predicates, facts and rules.
//!
//! Everything here is an immutable value type. Facts and rules hold no
//! back-references, so they can be cloned and shared freely once built.

pub mod fact;
pub mod rule;
pub mod term;

pub use fact::{Fact, KeyTerm, Predicate, VariantKey};
pub use rule::Rule;
pub use term::{Term, Variable};
