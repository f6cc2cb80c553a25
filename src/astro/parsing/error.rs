//! Parse errors

use crate::astro::ast::range::{Position, SourceLocation};
use crate::astro::lexing::LexError;
use std::fmt;

/// A fatal parse failure: either every alternative was exhausted, or a
/// construct failed after its commitment point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(position: Position, message: impl Into<String>) -> Self {
        Self {
            line: position.line,
            column: position.column,
            message: message.into(),
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse error at {}:{}: {}",
            self.line, self.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

impl From<ParseError> for String {
    fn from(err: ParseError) -> Self {
        err.to_string()
    }
}

/// Either stage of the front end failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontendError {
    Lex(LexError),
    Parse(ParseError),
}

impl FrontendError {
    pub fn position(&self) -> Position {
        match self {
            FrontendError::Lex(err) => err.position(),
            FrontendError::Parse(err) => err.position(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            FrontendError::Lex(err) => &err.message,
            FrontendError::Parse(err) => &err.message,
        }
    }
}

impl fmt::Display for FrontendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrontendError::Lex(err) => write!(f, "{}", err),
            FrontendError::Parse(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for FrontendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FrontendError::Lex(err) => Some(err),
            FrontendError::Parse(err) => Some(err),
        }
    }
}

impl From<LexError> for FrontendError {
    fn from(err: LexError) -> Self {
        FrontendError::Lex(err)
    }
}

impl From<ParseError> for FrontendError {
    fn from(err: ParseError) -> Self {
        FrontendError::Parse(err)
    }
}

impl From<FrontendError> for String {
    fn from(err: FrontendError) -> Self {
        err.to_string()
    }
}

/// Format source code context around an error line (1-based).
///
/// Shows 2 lines before the error, the error line with a `>>` marker, and 2
/// lines after, all numbered.
pub fn format_source_context(source: &str, line: usize) -> String {
    let location = SourceLocation::new(source);
    let first = line.saturating_sub(2).max(1);
    let last = (line + 2).min(location.line_count());

    let mut context = String::new();
    for number in first..=last {
        let Some(text) = location.line_text(number) else {
            continue;
        };
        let marker = if number == line { ">>" } else { "  " };
        context.push_str(&format!("{} {:3} | {}\n", marker, number, text));
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_position() {
        let err = ParseError::new(Position::new(3, 4), "unexpected `)`");
        assert_eq!(err.to_string(), "Parse error at 3:4: unexpected `)`");
        let wrapped = FrontendError::from(err.clone());
        assert_eq!(wrapped.position(), Position::new(3, 4));
        assert_eq!(wrapped.message(), "unexpected `)`");
    }

    #[test]
    fn test_format_source_context() {
        let source = "line 1\nline 2\nline 3\nerror line\nline 5\nline 6\nline 7";
        let context = format_source_context(source, 4);

        assert!(!context.contains("line 1"));
        assert!(context.contains("line 2"));
        assert!(context.contains(">>   4 | error line"));
        assert!(context.contains("line 6"));
        assert!(!context.contains("line 7"));
    }

    #[test]
    fn test_format_source_context_at_edges() {
        let context = format_source_context("only", 1);
        assert_eq!(context, ">>   1 | only\n");
    }
}
