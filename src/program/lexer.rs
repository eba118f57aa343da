//! Tokenizer for program text.
//!
//! Produces a flat token stream with line/column positions. Comments run
//! from `%` or `#` to the end of the line.

use crate::error::{ProgramError, ProgramResult};

/// Byte-level source span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A bare identifier: `homem`, `X`, `part-of`, `_tmp`.
    Ident(String),
    /// A `?`-prefixed variable; the text keeps the prefix.
    QVar(String),
    /// A double-quoted constant, unescaped.
    Quoted(String),
    LParen,
    RParen,
    Comma,
    Dot,
    /// `:-`
    Implies,
    /// The `AND` keyword.
    And,
}

impl TokenKind {
    /// Short human-readable form for error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Ident(text) | Self::QVar(text) => format!("`{text}`"),
            Self::Quoted(text) => format!("\"{text}\""),
            Self::LParen => "`(`".into(),
            Self::RParen => "`)`".into(),
            Self::Comma => "`,`".into(),
            Self::Dot => "`.`".into(),
            Self::Implies => "`:-`".into(),
            Self::And => "`AND`".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// 1-based line of the first character.
    pub line: usize,
    /// 1-based column (in characters) of the first character.
    pub column: usize,
}

pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

struct Cursor<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn peek(&mut self) -> Option<(usize, char)> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        let next = self.chars.next();
        if let Some((_, c)) = next {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        next
    }

    fn offset(&mut self) -> usize {
        self.peek().map_or(self.input.len(), |(i, _)| i)
    }

    fn error(&self, line: usize, column: usize, message: impl Into<String>) -> ProgramError {
        ProgramError::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    fn take_ident(&mut self) -> &'a str {
        let start = self.offset();
        while let Some((_, c)) = self.peek() {
            if !is_ident_char(c) {
                break;
            }
            self.bump();
        }
        let end = self.offset();
        &self.input[start..end]
    }
}

/// Split program text into tokens.
pub fn tokenize(input: &str) -> ProgramResult<Vec<Token>> {
    let mut cursor = Cursor::new(input);
    let mut tokens = Vec::new();

    while let Some((start, c)) = cursor.peek() {
        let (line, column) = (cursor.line, cursor.column);

        if c.is_whitespace() {
            cursor.bump();
            continue;
        }
        if c == '%' || c == '#' {
            while let Some((_, c)) = cursor.peek() {
                if c == '\n' {
                    break;
                }
                cursor.bump();
            }
            continue;
        }

        let kind = match c {
            '(' => {
                cursor.bump();
                TokenKind::LParen
            }
            ')' => {
                cursor.bump();
                TokenKind::RParen
            }
            ',' => {
                cursor.bump();
                TokenKind::Comma
            }
            '.' => {
                cursor.bump();
                TokenKind::Dot
            }
            ':' => {
                cursor.bump();
                match cursor.bump() {
                    Some((_, '-')) => TokenKind::Implies,
                    _ => return Err(cursor.error(line, column, "expected `:-`")),
                }
            }
            '?' => {
                cursor.bump();
                let name = cursor.take_ident();
                if name.is_empty() {
                    return Err(cursor.error(line, column, "expected a variable name after `?`"));
                }
                TokenKind::QVar(format!("?{name}"))
            }
            '"' => {
                cursor.bump();
                let mut value = String::new();
                loop {
                    match cursor.bump() {
                        Some((_, '"')) => break,
                        Some((_, '\\')) => match cursor.bump() {
                            Some((_, escaped)) => value.push(escaped),
                            None => return Err(cursor.error(line, column, "unterminated string")),
                        },
                        Some((_, other)) => value.push(other),
                        None => return Err(cursor.error(line, column, "unterminated string")),
                    }
                }
                TokenKind::Quoted(value)
            }
            c if is_ident_start(c) => match cursor.take_ident() {
                "AND" => TokenKind::And,
                text => TokenKind::Ident(text.to_string()),
            },
            other => {
                return Err(cursor.error(line, column, format!("unexpected character `{other}`")));
            }
        };

        let end = cursor.offset();
        tokens.push(Token {
            kind,
            span: Span { start, end },
            line,
            column,
        });
    }

    Ok(tokens)
}
