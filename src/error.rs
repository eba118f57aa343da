//! Rich diagnostic error types for the hornkb engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so users know exactly what went wrong
//! and how to fix it.
//!
//! Only construction and loading errors ever reach a caller. Substitution and
//! unification errors are produced while searching and are recovered locally
//! by the resolver as "this branch fails".

use miette::Diagnostic;
use thiserror::Error;

use crate::logic::{Term, Variable};

/// Top-level error type for the hornkb engine.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum KbError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Fact(#[from] FactError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Substitution(#[from] SubstitutionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Unify(#[from] UnifyError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Program(#[from] ProgramError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Pack(#[from] crate::packs::PackError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Fact errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum FactError {
    #[error("arity mismatch for {predicate}: expected {expected} argument(s), got {actual}")]
    #[diagnostic(
        code(hornkb::fact::arity_mismatch),
        help(
            "A fact must supply exactly one argument per predicate position. \
             Check the predicate declaration, or declare a separate predicate \
             with the arity you need (predicates are identified by name and arity)."
        )
    )]
    ArityMismatch {
        predicate: String,
        expected: usize,
        actual: usize,
    },

    #[error("cannot store non-ground fact {fact}")]
    #[diagnostic(
        code(hornkb::fact::non_ground),
        help(
            "Stored facts must not contain variables. \
             To state something for every value, add it as a rule with an empty body instead."
        )
    )]
    NonGround { fact: String },
}

/// Result type for fact construction.
pub type FactResult<T> = std::result::Result<T, FactError>;

// ---------------------------------------------------------------------------
// Substitution errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum SubstitutionError {
    #[error("cyclic binding: {variable} would be bound to {term}, which refers back to it")]
    #[diagnostic(
        code(hornkb::substitution::cyclic_binding),
        help("The occurs-check rejected a binding. A variable can never be bound to itself.")
    )]
    CyclicBinding { variable: Variable, term: Term },

    #[error("conflicting bindings for {variable}: {left} vs {right}")]
    #[diagnostic(
        code(hornkb::substitution::conflict),
        help("Both substitutions bind the variable, but to different constants.")
    )]
    Conflict {
        variable: Variable,
        left: Term,
        right: Term,
    },
}

/// Result type for substitution operations.
pub type SubstitutionResult<T> = std::result::Result<T, SubstitutionError>;

// ---------------------------------------------------------------------------
// Unification errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum UnifyError {
    #[error("predicate mismatch: {left} vs {right}")]
    #[diagnostic(
        code(hornkb::unify::predicate_mismatch),
        help("Facts over different relations (or different arities) never unify.")
    )]
    PredicateMismatch { left: String, right: String },

    #[error("constant clash: {left} vs {right}")]
    #[diagnostic(
        code(hornkb::unify::constant_clash),
        help("Two different constants occupy the same argument position.")
    )]
    ConstantClash { left: String, right: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Binding(#[from] SubstitutionError),
}

/// Result type for unification.
pub type UnifyResult<T> = std::result::Result<T, UnifyError>;

// ---------------------------------------------------------------------------
// Program text errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ProgramError {
    #[error("syntax error at {line}:{column}: {message}")]
    #[diagnostic(
        code(hornkb::program::syntax),
        help(
            "Clauses look like `homem(socrates).` or `mortal(X) :- homem(X).` \
             Body literals are separated by `,` or `AND`. \
             Variables start with an uppercase letter, `_`, or `?`."
        )
    )]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("invalid literal at {line}:{column}")]
    #[diagnostic(
        code(hornkb::program::literal),
        help("The literal does not match its predicate declaration.")
    )]
    Literal {
        line: usize,
        column: usize,
        #[source]
        source: FactError,
    },

    #[error("expected {expected}, found {found}")]
    #[diagnostic(
        code(hornkb::program::unexpected_clause),
        help("Use `parse_program` to read text that mixes facts and rules.")
    )]
    UnexpectedClause { expected: String, found: String },
}

/// Result type for program parsing.
pub type ProgramResult<T> = std::result::Result<T, ProgramError>;

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file: {path}")]
    #[diagnostic(
        code(hornkb::config::read),
        help("Ensure the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    #[diagnostic(
        code(hornkb::config::parse),
        help(
            "Check the TOML syntax. Recognized sections are [resolver] \
             (max_depth, max_steps) and [log] (filter)."
        )
    )]
    Parse { path: String, message: String },

    #[error("failed to write config file: {path}")]
    #[diagnostic(
        code(hornkb::config::write),
        help("Check that the parent directory is writable.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {message}")]
    #[diagnostic(
        code(hornkb::config::invalid),
        help("Check the HornConfig fields. {message}")
    )]
    Invalid { message: String },
}

/// Result type for configuration loading.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Convenience alias for functions returning hornkb results.
pub type KbResult<T> = std::result::Result<T, KbError>;
