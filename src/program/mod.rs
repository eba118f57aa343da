//! Program text: a small clause syntax for facts and rules.
//!
//! ```text
//! % comments start with '%' or '#'
//! homem(socrates).
//! mortal(X) :- homem(X).
//! grandparent(X, Z) :- parent(X, Y) AND parent(Y, Z).
//! ```
//!
//! Identifiers starting with an uppercase letter or `_`, and `?`-prefixed
//! names, are variables. Other identifiers and double-quoted strings are
//! constants. Body literals are separated by `,` or `AND`.

pub mod lexer;
mod parser;

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{FactError, FactResult, ProgramError, ProgramResult};
use crate::logic::{Fact, Predicate, Rule};

/// One parsed clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Clause {
    Fact(Fact),
    Rule(Rule),
}

impl Clause {
    fn describe(&self) -> String {
        match self {
            Self::Fact(fact) => format!("fact `{fact}`"),
            Self::Rule(rule) => format!("rule `{rule}`"),
        }
    }
}

/// A parsed program, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Program {
    pub clauses: Vec<Clause>,
}

impl Program {
    pub fn facts(&self) -> impl Iterator<Item = &Fact> {
        self.clauses.iter().filter_map(|clause| match clause {
            Clause::Fact(fact) => Some(fact),
            Clause::Rule(_) => None,
        })
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.clauses.iter().filter_map(|clause| match clause {
            Clause::Rule(rule) => Some(rule),
            Clause::Fact(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// Declared predicates. A literal whose name is declared must use the
/// declared arity; undeclared names are accepted with any arity.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    arities: HashMap<String, usize>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a predicate, replacing any earlier declaration of the name.
    pub fn declare(&mut self, predicate: &Predicate) {
        self.arities
            .insert(predicate.name().to_string(), predicate.arity());
    }

    pub fn with(mut self, predicate: &Predicate) -> Self {
        self.declare(predicate);
        self
    }

    pub fn arity_of(&self, name: &str) -> Option<usize> {
        self.arities.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.arities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arities.is_empty()
    }

    /// Check a use of `name` with `arity` arguments.
    pub fn check(&self, name: &str, arity: usize) -> FactResult<()> {
        match self.arity_of(name) {
            Some(expected) if expected != arity => Err(FactError::ArityMismatch {
                predicate: format!("{name}/{expected}"),
                expected,
                actual: arity,
            }),
            _ => Ok(()),
        }
    }
}

/// Parse program text with no declared predicates.
pub fn parse_program(text: &str) -> ProgramResult<Program> {
    parse_program_with(text, &Signature::default())
}

/// Parse program text, checking literals against `signature`.
pub fn parse_program_with(text: &str, signature: &Signature) -> ProgramResult<Program> {
    let tokens = lexer::tokenize(text)?;
    let clauses = parser::Parser::new(tokens, signature, text).clauses()?;
    Ok(Program { clauses })
}

/// Parse a single fact or goal, such as `mortal(X)`.
pub fn parse_fact(text: &str) -> ProgramResult<Fact> {
    parse_fact_with(text, &Signature::default())
}

pub fn parse_fact_with(text: &str, signature: &Signature) -> ProgramResult<Fact> {
    match single_clause(text, signature, "a single fact")? {
        Clause::Fact(fact) => Ok(fact),
        other => Err(ProgramError::UnexpectedClause {
            expected: "a single fact".into(),
            found: other.describe(),
        }),
    }
}

/// Parse a single rule, such as `mortal(X) :- homem(X)`.
pub fn parse_rule(text: &str) -> ProgramResult<Rule> {
    parse_rule_with(text, &Signature::default())
}

pub fn parse_rule_with(text: &str, signature: &Signature) -> ProgramResult<Rule> {
    match single_clause(text, signature, "a single rule")? {
        Clause::Rule(rule) => Ok(rule),
        other => Err(ProgramError::UnexpectedClause {
            expected: "a single rule".into(),
            found: other.describe(),
        }),
    }
}

fn single_clause(text: &str, signature: &Signature, expected: &str) -> ProgramResult<Clause> {
    let mut program = parse_program_with(text, signature)?;
    match program.clauses.len() {
        1 => Ok(program.clauses.remove(0)),
        0 => Err(ProgramError::UnexpectedClause {
            expected: expected.into(),
            found: "empty input".into(),
        }),
        n => Err(ProgramError::UnexpectedClause {
            expected: expected.into(),
            found: format!("{n} clauses"),
        }),
    }
}
