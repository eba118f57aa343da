//! Recursive descent parser: tokens → clauses.
//!
//! Grammar:
//!
//! ```text
//! program := clause*
//! clause  := literal [ ":-" literal ( ("," | "AND") literal )* ] "."
//! literal := name [ "(" [ term ( "," term )* ] ")" ]
//! term    := identifier | ?identifier | "quoted"
//! ```
//!
//! The final `.` of the input may be omitted.

use crate::error::{ProgramError, ProgramResult};
use crate::logic::{Fact, Predicate, Rule, Term};

use super::lexer::{Token, TokenKind};
use super::{Clause, Signature};

pub(super) struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    signature: &'a Signature,
    /// Position reported for errors at end of input.
    eof: (usize, usize),
}

impl<'a> Parser<'a> {
    pub(super) fn new(tokens: Vec<Token>, signature: &'a Signature, text: &str) -> Self {
        let eof = match text.rsplit_once('\n') {
            Some((before, tail)) => (before.matches('\n').count() + 2, tail.chars().count() + 1),
            None => (1, text.chars().count() + 1),
        };
        Self {
            tokens,
            pos: 0,
            signature,
            eof,
        }
    }

    pub(super) fn clauses(mut self) -> ProgramResult<Vec<Clause>> {
        let mut clauses = Vec::new();
        while self.peek().is_some() {
            clauses.push(self.clause()?);
        }
        Ok(clauses)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek().is_some_and(|t| &t.kind == kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error_here(&self, expected: &str) -> ProgramError {
        match self.peek() {
            Some(token) => ProgramError::Syntax {
                line: token.line,
                column: token.column,
                message: format!("expected {expected}, found {}", token.kind.describe()),
            },
            None => ProgramError::Syntax {
                line: self.eof.0,
                column: self.eof.1,
                message: format!("expected {expected}, found end of input"),
            },
        }
    }

    fn expect(&mut self, kind: TokenKind) -> ProgramResult<()> {
        if self.eat(&kind) {
            Ok(())
        } else {
            Err(self.error_here(&kind.describe()))
        }
    }

    fn clause(&mut self) -> ProgramResult<Clause> {
        let head = self.literal()?;

        let clause = if self.eat(&TokenKind::Implies) {
            let mut body = vec![self.literal()?];
            while self.eat(&TokenKind::Comma) || self.eat(&TokenKind::And) {
                body.push(self.literal()?);
            }
            Clause::Rule(Rule::new(head, body))
        } else {
            Clause::Fact(head)
        };

        if !self.eat(&TokenKind::Dot) && self.peek().is_some() {
            return Err(self.error_here("`.`"));
        }
        Ok(clause)
    }

    fn literal(&mut self) -> ProgramResult<Fact> {
        let Some(Token {
            kind: TokenKind::Ident(name),
            line,
            column,
            ..
        }) = self.peek().cloned()
        else {
            return Err(self.error_here("a predicate name"));
        };
        self.pos += 1;

        let mut args = Vec::new();
        if self.eat(&TokenKind::LParen) && !self.eat(&TokenKind::RParen) {
            args.push(self.term()?);
            while self.eat(&TokenKind::Comma) {
                args.push(self.term()?);
            }
            self.expect(TokenKind::RParen)?;
        }

        let literal_error = |source| ProgramError::Literal {
            line,
            column,
            source,
        };
        self.signature
            .check(&name, args.len())
            .map_err(literal_error)?;
        Fact::new(Predicate::new(name, args.len()), args).map_err(literal_error)
    }

    fn term(&mut self) -> ProgramResult<Term> {
        let term = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Ident(text)) if is_variable_name(text) => Term::variable(text.as_str()),
            Some(TokenKind::Ident(text) | TokenKind::Quoted(text)) => Term::constant(text.as_str()),
            Some(TokenKind::QVar(text)) => Term::variable(text.as_str()),
            _ => return Err(self.error_here("a term")),
        };
        self.pos += 1;
        Ok(term)
    }
}

/// Uppercase or `_` first letter marks a variable.
fn is_variable_name(text: &str) -> bool {
    text.chars()
        .next()
        .is_some_and(|c| c.is_ascii_uppercase() || c == '_')
}
