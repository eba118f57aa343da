//! Terms: the arguments of facts.
//!
//! The term language is function-free: a term is either a constant or a
//! logic variable. [`Term`] is a closed sum type so that equality, hashing
//! and unification dispatch are checked exhaustively by the compiler.

use std::fmt::{self, Write};
use std::sync::Arc;

use serde::Serialize;

use crate::program::lexer::is_ident_char;

/// A logic variable.
///
/// Variables written by callers are identified by name alone. The resolver
/// renames rule variables apart by tagging each rule application with its
/// own non-zero `scope`, so a renamed copy never equals a caller's variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Variable {
    name: Arc<str>,
    #[serde(skip_serializing_if = "is_caller_scope")]
    scope: u64,
}

fn is_caller_scope(scope: &u64) -> bool {
    *scope == 0
}

impl Variable {
    /// Create a caller-scoped variable.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            scope: 0,
        }
    }

    /// The variable's name as written.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename scope; `0` for variables written by callers.
    pub fn scope(&self) -> u64 {
        self.scope
    }

    /// A copy of this variable living in another rename scope.
    pub(crate) fn in_scope(&self, scope: u64) -> Self {
        Self {
            name: Arc::clone(&self.name),
            scope,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scope == 0 {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}#{}", self.name, self.scope)
        }
    }
}

/// An argument of a fact: a constant symbol or a logic variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Term {
    /// An atomic symbol such as `socrates`.
    Constant(Arc<str>),
    /// A placeholder bound during unification.
    Variable(Variable),
}

impl Term {
    /// Create a constant term.
    pub fn constant(value: impl Into<Arc<str>>) -> Self {
        Self::Constant(value.into())
    }

    /// Create a caller-scoped variable term.
    pub fn variable(name: impl Into<Arc<str>>) -> Self {
        Self::Variable(Variable::new(name))
    }

    /// Returns `true` if this term is a variable.
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }

    /// Returns `true` if this term is a constant.
    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Self::Variable(v) => Some(v),
            Self::Constant(_) => None,
        }
    }

    pub fn as_constant(&self) -> Option<&str> {
        match self {
            Self::Constant(c) => Some(c),
            Self::Variable(_) => None,
        }
    }
}

/// Plain strings are constants, matching how facts are usually written.
impl From<&str> for Term {
    fn from(value: &str) -> Self {
        Self::constant(value)
    }
}

impl From<String> for Term {
    fn from(value: String) -> Self {
        Self::constant(value)
    }
}

impl From<Variable> for Term {
    fn from(value: Variable) -> Self {
        Self::Variable(value)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(c) if needs_quotes(c) => write_quoted(f, c),
            Self::Constant(c) => write!(f, "{c}"),
            Self::Variable(v) => write!(f, "{v}"),
        }
    }
}

/// Constants that would read back as variables (or not as one identifier)
/// are rendered quoted.
fn needs_quotes(value: &str) -> bool {
    match value.chars().next() {
        None => true,
        Some(first) => {
            first.is_ascii_uppercase()
                || first == '_'
                || first == '-'
                || !value.chars().all(is_ident_char)
        }
    }
}

/// Quote `value` so the program lexer reads it back unchanged: only `"` and
/// `\` are escaped, everything else is written as is.
fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            f.write_char('\\')?;
        }
        f.write_char(c)?;
    }
    f.write_char('"')
}
