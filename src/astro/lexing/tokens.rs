//! Token definitions for the Astro lexer
//!
//! A [`Token`] is the immutable unit of lexical output: its normalized text,
//! its [`TokenKind`] and the source [`Range`] it covers. Structural tokens
//! (newline, indent, dedent, no-space, end-of-input) carry no text.
//!
//! Numerals encode both their base and their shape in the kind, so the
//! parser dispatches on [`TokenKind`] directly instead of re-reading the text.

use crate::astro::ast::range::{Position, Range};
use serde::Serialize;
use std::fmt;

/// Radix of a numeric literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Base {
    Binary,
    Octal,
    Decimal,
    Hexadecimal,
}

impl Base {
    pub fn radix(self) -> u32 {
        match self {
            Base::Binary => 2,
            Base::Octal => 8,
            Base::Decimal => 10,
            Base::Hexadecimal => 16,
        }
    }

    /// The source prefix that selects this base (empty for decimal).
    pub fn prefix(self) -> &'static str {
        match self {
            Base::Binary => "0b",
            Base::Octal => "0o",
            Base::Decimal => "",
            Base::Hexadecimal => "0x",
        }
    }

    /// The letter that introduces an exponent in this base.
    pub fn exponent_marker(self) -> char {
        match self {
            Base::Hexadecimal => 'p',
            _ => 'e',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Base::Binary => "binary",
            Base::Octal => "octal",
            Base::Decimal => "decimal",
            Base::Hexadecimal => "hexadecimal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Identifier,
    Keyword,
    Boolean,
    Integer(Base),
    Float(Base),
    String,
    MultiLineString,
    Regex,
    Comment,
    MultiLineComment,
    Operator,
    Punctuator,
    Newline,
    Indent,
    Dedent,
    NoSpace,
    EndOfInput,
}

impl TokenKind {
    /// Synthetic layout markers that have no text of their own.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            TokenKind::Newline
                | TokenKind::Indent
                | TokenKind::Dedent
                | TokenKind::NoSpace
                | TokenKind::EndOfInput
        )
    }

    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::Comment | TokenKind::MultiLineComment)
    }

    pub fn is_numeral(self) -> bool {
        matches!(self, TokenKind::Integer(_) | TokenKind::Float(_))
    }

    /// Literal tokens: numerals, booleans, strings and regexes.
    pub fn is_literal(self) -> bool {
        self.is_numeral()
            || matches!(
                self,
                TokenKind::Boolean
                    | TokenKind::String
                    | TokenKind::MultiLineString
                    | TokenKind::Regex
            )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::Keyword => write!(f, "keyword"),
            TokenKind::Boolean => write!(f, "boolean"),
            TokenKind::Integer(base) => write!(f, "{}-integer", base.name()),
            TokenKind::Float(base) => write!(f, "{}-float", base.name()),
            TokenKind::String => write!(f, "string"),
            TokenKind::MultiLineString => write!(f, "multi-line string"),
            TokenKind::Regex => write!(f, "regex"),
            TokenKind::Comment => write!(f, "comment"),
            TokenKind::MultiLineComment => write!(f, "multi-line comment"),
            TokenKind::Operator => write!(f, "operator"),
            TokenKind::Punctuator => write!(f, "punctuator"),
            TokenKind::Newline => write!(f, "newline"),
            TokenKind::Indent => write!(f, "indent"),
            TokenKind::Dedent => write!(f, "dedent"),
            TokenKind::NoSpace => write!(f, "no-space"),
            TokenKind::EndOfInput => write!(f, "end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub text: Option<String>,
    pub kind: TokenKind,
    pub range: Range,
    /// Indentation width of each continuation line of a multi-line string.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub indentations: Vec<usize>,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, range: Range) -> Self {
        Self {
            text: Some(text.into()),
            kind,
            range,
            indentations: Vec::new(),
        }
    }

    /// A text-less layout marker.
    pub fn structural(kind: TokenKind, range: Range) -> Self {
        Self {
            text: None,
            kind,
            range,
            indentations: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// True for a keyword, operator or punctuator token spelled `text`.
    pub fn is_exactly(&self, text: &str) -> bool {
        self.text.as_deref() == Some(text)
    }

    pub fn start(&self) -> Position {
        self.range.start
    }

    pub fn end(&self) -> Position {
        self.range.end
    }

    pub fn start_line(&self) -> usize {
        self.range.start.line
    }

    pub fn start_col(&self) -> usize {
        self.range.start.column
    }

    pub fn stop_line(&self) -> usize {
        self.range.end.line
    }

    pub fn stop_col(&self) -> usize {
        self.range.end.column
    }

    /// Smallest leading indentation shared by the continuation lines of a
    /// multi-line string.
    pub fn shared_indentation(&self) -> Option<usize> {
        self.indentations.iter().copied().min()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.text {
            Some(text) => write!(f, "{} `{}` at {}", self.kind, text, self.range),
            None => write!(f, "{} at {}", self.kind, self.range.start),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_kinds_have_no_text() {
        let token = Token::structural(TokenKind::Indent, Range::default());
        assert!(token.kind.is_structural());
        assert_eq!(token.text(), "");
        assert!(!TokenKind::Operator.is_structural());
    }

    #[test]
    fn kind_display_names_base_and_shape() {
        assert_eq!(
            TokenKind::Integer(Base::Binary).to_string(),
            "binary-integer"
        );
        assert_eq!(TokenKind::Float(Base::Decimal).to_string(), "decimal-float");
    }

    #[test]
    fn shared_indentation_is_the_minimum() {
        let mut token = Token::new(TokenKind::MultiLineString, "a\n  b\n    c", Range::default());
        token.indentations = vec![2, 4];
        assert_eq!(token.shared_indentation(), Some(2));
    }
}
