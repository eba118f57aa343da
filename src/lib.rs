// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # hornkb
//!
//! A knowledge base of first-order facts and Horn rules, queried by
//! backward chaining with full unification.
//!
//! ## Architecture
//!
//! - **Logic model** (`logic`): terms, predicates, facts and rules
//! - **Substitution & unification** (`substitution`, `unify`): most general
//!   unifiers with an occurs-check
//! - **Resolution** (`infer`): explicit-stack backward chaining with a loop
//!   check, lemmas for left recursion, and depth/step bounds
//! - **Knowledge base** (`kb`): fact store, rule list and the query API
//! - **Program text** (`program`) and **knowledge packs** (`packs`): loading
//!   knowledge from text and TOML
//! - **Analysis** (`analysis`): unsafe rules, recursion, undefined predicates
//!
//! ## Library usage
//!
//! ```no_run
//! use hornkb::kb::KnowledgeBase;
//! use hornkb::logic::{Predicate, Rule, Term};
//!
//! let homem = Predicate::new("homem", 1);
//! let mortal = Predicate::new("mortal", 1);
//!
//! let mut kb = KnowledgeBase::new();
//! kb.add_fact(homem.fact(["socrates"]).unwrap()).unwrap();
//! kb.add_rule(Rule::new(
//!     mortal.fact([Term::variable("X")]).unwrap(),
//!     vec![homem.fact([Term::variable("X")]).unwrap()],
//! ));
//! assert!(kb.query(&mortal.fact(["socrates"]).unwrap()));
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod infer;
pub mod kb;
pub mod logic;
pub mod packs;
pub mod program;
pub mod shared;
pub mod substitution;
pub mod unify;

pub use error::{KbError, KbResult};
pub use kb::KnowledgeBase;
