//! Base tokenization
//!
//! The scanner walks the source one character at a time and dispatches on a
//! fixed priority order of static character classes (see [`charsets`]):
//!
//! 1. line breaks and inline whitespace
//! 2. comments (`#`, nested `#= … =#`)
//! 3. strings (triple-quoted before single-quoted)
//! 4. numerals, including leading-dot fractions
//! 5. line continuations (`...` at end of line)
//! 6. identifiers, keywords and booleans
//! 7. regex literals, then operator runs
//! 8. punctuators
//!
//! The result is a flat list of [`Lexeme`]s that still contains raw layout
//! (line breaks and whitespace runs). The transformations turn that layout
//! into structural tokens.
//!
//! [`charsets`]: super::charsets

use super::charsets::{
    is_boolean, is_closing_bracket, is_decimal_digit, is_identifier_continue,
    is_identifier_start, is_inline_space, is_keyword, is_operator_char, is_punctuator,
};
use super::common::{LexError, LexResult};
use super::tokens::{Token, TokenKind};
use crate::astro::ast::range::{Position, Range};

/// Raw scanner output, before layout is resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Lexeme {
    Token(Token),
    /// A run of spaces and tabs (or a joined line continuation).
    Whitespace { text: String, range: Range },
    /// `\n` or `\r\n`.
    LineBreak { range: Range },
}

impl Lexeme {
    pub fn range(&self) -> &Range {
        match self {
            Lexeme::Token(token) => &token.range,
            Lexeme::Whitespace { range, .. } | Lexeme::LineBreak { range } => range,
        }
    }
}

/// Saved cursor location, used to build ranges and error positions.
#[derive(Debug, Clone, Copy)]
pub(super) struct Mark {
    index: usize,
    offset: usize,
    position: Position,
}

pub(super) struct Scanner<'src> {
    source: &'src str,
    chars: Vec<(usize, char)>,
    index: usize,
    line: usize,
    column: usize,
    lexemes: Vec<Lexeme>,
}

impl<'src> Scanner<'src> {
    pub(super) fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices().collect(),
            index: 0,
            line: 1,
            column: 0,
            lexemes: Vec::new(),
        }
    }

    pub(super) fn peek(&self) -> Option<char> {
        self.peek_nth(0)
    }

    pub(super) fn peek_nth(&self, n: usize) -> Option<char> {
        self.chars.get(self.index + n).map(|&(_, c)| c)
    }

    /// The character just before the cursor.
    pub(super) fn previous(&self) -> Option<char> {
        self.index
            .checked_sub(1)
            .and_then(|i| self.chars.get(i))
            .map(|&(_, c)| c)
    }

    pub(super) fn advance(&mut self) -> Option<char> {
        let (_, c) = *self.chars.get(self.index)?;
        self.index += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn offset(&self) -> usize {
        self.chars
            .get(self.index)
            .map_or(self.source.len(), |&(offset, _)| offset)
    }

    pub(super) fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    pub(super) fn mark(&self) -> Mark {
        Mark {
            index: self.index,
            offset: self.offset(),
            position: self.position(),
        }
    }

    pub(super) fn range_from(&self, start: Mark) -> Range {
        Range::new(start.offset..self.offset(), start.position, self.position())
    }

    fn slice_from(&self, start: Mark) -> &'src str {
        self.source.get(start.offset..self.offset()).unwrap_or("")
    }

    fn starts_with(&self, pattern: &str) -> bool {
        self.source
            .get(self.offset()..)
            .is_some_and(|rest| rest.starts_with(pattern))
    }

    pub(super) fn error_at(&self, mark: Mark, message: impl Into<String>) -> LexError {
        LexError::new(mark.position, message)
    }

    pub(super) fn error_here(&self, message: impl Into<String>) -> LexError {
        LexError::new(self.position(), message)
    }

    pub(super) fn token_from(&self, start: Mark, kind: TokenKind, text: impl Into<String>) -> Token {
        Token::new(kind, text, self.range_from(start))
    }

    /// Scan the whole source.
    pub(super) fn scan(mut self) -> LexResult<Vec<Lexeme>> {
        while let Some(c) = self.peek() {
            let lexeme = self.dispatch(c)?;
            self.lexemes.push(lexeme);
        }
        Ok(self.lexemes)
    }

    fn dispatch(&mut self, c: char) -> LexResult<Lexeme> {
        let start = self.mark();

        if c == '\n' || (c == '\r' && self.peek_nth(1) == Some('\n')) {
            self.advance_by(if c == '\r' { 2 } else { 1 });
            return Ok(Lexeme::LineBreak {
                range: self.range_from(start),
            });
        }
        if is_inline_space(c) || c == '\r' {
            while self
                .peek()
                .is_some_and(|c| is_inline_space(c) || (c == '\r' && self.peek_nth(1) != Some('\n')))
            {
                self.advance();
            }
            return Ok(Lexeme::Whitespace {
                text: self.slice_from(start).to_string(),
                range: self.range_from(start),
            });
        }

        let token = if c == '#' {
            self.comment()?
        } else if c == '"' || c == '\'' {
            self.string(c)?
        } else if is_decimal_digit(c) || self.at_leading_dot_fraction() {
            self.numeral()?
        } else if self.at_line_continuation() {
            return Ok(self.line_continuation());
        } else if is_identifier_start(c) {
            self.word()
        } else if c == '/' && self.regex_allowed() && self.regex_length().is_some() {
            self.regex()
        } else if is_operator_char(c) {
            while self.peek().is_some_and(is_operator_char) {
                self.advance();
            }
            self.token_from(start, TokenKind::Operator, self.slice_from(start))
        } else if is_punctuator(c) {
            self.advance();
            self.token_from(start, TokenKind::Punctuator, c.to_string())
        } else {
            return Err(self.error_here(format!("unrecognized character `{}`", c)));
        };

        Ok(Lexeme::Token(token))
    }

    fn word(&mut self) -> Token {
        let start = self.mark();
        while self.peek().is_some_and(is_identifier_continue) {
            self.advance();
        }
        let text = self.slice_from(start);
        let kind = if is_keyword(text) {
            TokenKind::Keyword
        } else if is_boolean(text) {
            TokenKind::Boolean
        } else {
            TokenKind::Identifier
        };
        self.token_from(start, kind, text)
    }

    fn comment(&mut self) -> LexResult<Token> {
        let start = self.mark();
        if self.peek_nth(1) == Some('=') {
            return self.block_comment();
        }

        self.advance();
        let body = self.mark();
        while let Some(c) = self.peek() {
            if c == '\n' || (c == '\r' && self.peek_nth(1) == Some('\n')) {
                break;
            }
            self.advance();
        }
        let text = self.slice_from(body);
        Ok(self.token_from(start, TokenKind::Comment, text))
    }

    fn block_comment(&mut self) -> LexResult<Token> {
        let start = self.mark();
        self.advance_by(2);
        let body = self.mark();
        let mut depth = 1usize;

        loop {
            if self.starts_with("#=") {
                depth += 1;
                self.advance_by(2);
            } else if self.starts_with("=#") {
                depth -= 1;
                if depth == 0 {
                    let text = self.slice_from(body).to_string();
                    self.advance_by(2);
                    return Ok(self.token_from(start, TokenKind::MultiLineComment, text));
                }
                self.advance_by(2);
            } else if self.advance().is_none() {
                return Err(self.error_at(
                    start,
                    format!("unterminated multi-line comment ({} level(s) still open)", depth),
                ));
            }
        }
    }

    fn string(&mut self, quote: char) -> LexResult<Token> {
        if self.peek_nth(1) == Some(quote) && self.peek_nth(2) == Some(quote) {
            return self.multi_line_string(quote);
        }

        let start = self.mark();
        self.advance();
        let body = self.mark();
        loop {
            match self.peek() {
                Some(c) if c == quote => break,
                Some('\n') | Some('\r') | None => {
                    return Err(self.error_at(
                        start,
                        "unterminated string: a single-line string must close before the end of the line",
                    ));
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        let text = self.slice_from(body);
        self.advance();
        Ok(self.token_from(start, TokenKind::String, text))
    }

    fn multi_line_string(&mut self, quote: char) -> LexResult<Token> {
        let delimiter: String = std::iter::repeat(quote).take(3).collect();
        let start = self.mark();
        self.advance_by(3);
        let body = self.mark();
        let mut indentations = Vec::new();

        while !self.starts_with(&delimiter) {
            match self.advance() {
                Some('\n') => {
                    let mut width = 0;
                    while self.peek_nth(width).is_some_and(is_inline_space) {
                        width += 1;
                    }
                    let blank = matches!(self.peek_nth(width), Some('\n') | Some('\r') | None);
                    if !blank {
                        indentations.push(width);
                    }
                }
                Some(_) => {}
                None => {
                    return Err(self.error_at(start, "unterminated multi-line string"));
                }
            }
        }

        let text = self.slice_from(body).to_string();
        self.advance_by(3);
        let mut token = self.token_from(start, TokenKind::MultiLineString, text);
        token.indentations = indentations;
        Ok(token)
    }

    /// `.5` style fraction: a dot followed by a digit that does not continue
    /// an identifier, a closed bracket or another dot.
    fn at_leading_dot_fraction(&self) -> bool {
        self.peek() == Some('.')
            && self.peek_nth(1).is_some_and(is_decimal_digit)
            && !self
                .previous()
                .is_some_and(|p| is_identifier_continue(p) || is_closing_bracket(p) || p == '.')
    }

    fn at_line_continuation(&self) -> bool {
        if !self.starts_with("...") {
            return false;
        }
        let mut n = 3;
        while self.peek_nth(n).is_some_and(is_inline_space) {
            n += 1;
        }
        match self.peek_nth(n) {
            Some('\n') => true,
            Some('\r') => self.peek_nth(n + 1) == Some('\n'),
            _ => false,
        }
    }

    /// Consume `...`, trailing spaces and the line break, joining the lines.
    fn line_continuation(&mut self) -> Lexeme {
        let start = self.mark();
        while self.peek() != Some('\n') {
            self.advance();
        }
        self.advance();
        Lexeme::Whitespace {
            text: " ".to_string(),
            range: self.range_from(start),
        }
    }

    /// A `/` starts a regex only where an operand may begin.
    fn regex_allowed(&self) -> bool {
        for lexeme in self.lexemes.iter().rev() {
            match lexeme {
                Lexeme::Whitespace { .. } => continue,
                Lexeme::LineBreak { .. } => return true,
                Lexeme::Token(token) if token.kind.is_comment() => continue,
                Lexeme::Token(token) => {
                    return match token.kind {
                        TokenKind::Identifier | TokenKind::Regex => false,
                        TokenKind::Punctuator => {
                            !token.text().chars().next().is_some_and(is_closing_bracket)
                        }
                        kind => !kind.is_literal(),
                    };
                }
            }
        }
        true
    }

    /// Length in characters of a `/body/` regex at the cursor, if one fits.
    fn regex_length(&self) -> Option<usize> {
        let mut n = 1;
        while let Some(c) = self.peek_nth(n) {
            if c == '/' || c == '\n' || c == '\r' {
                break;
            }
            n += 1;
        }
        if n == 1 || self.peek_nth(n) != Some('/') {
            return None;
        }
        let length = n + 1;

        // Rejected when directly followed by an operator, or by an operand
        // start after optional spaces.
        let mut after = length;
        if self.peek_nth(after).is_some_and(is_operator_char) {
            return None;
        }
        while self.peek_nth(after).is_some_and(is_inline_space) {
            after += 1;
        }
        let starts_operand = self
            .peek_nth(after)
            .is_some_and(|c| is_identifier_continue(c) || matches!(c, '{' | '[' | '(' | '@' | '$'));
        (!starts_operand).then_some(length)
    }

    fn regex(&mut self) -> Token {
        let start = self.mark();
        let length = self.regex_length().unwrap_or(0);
        self.advance();
        let body = self.mark();
        self.advance_by(length.saturating_sub(2));
        let text = self.slice_from(body);
        self.advance();
        self.token_from(start, TokenKind::Regex, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> Vec<Lexeme> {
        Scanner::new(source).scan().expect("scan to succeed")
    }

    fn token_texts(source: &str) -> Vec<(TokenKind, String)> {
        scan(source)
            .into_iter()
            .filter_map(|lexeme| match lexeme {
                Lexeme::Token(token) => Some((token.kind, token.text().to_string())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_layout_lexemes_are_kept() {
        let lexemes = scan("a \n\tb");
        assert!(matches!(lexemes[1], Lexeme::Whitespace { ref text, .. } if text == " "));
        assert!(matches!(lexemes[2], Lexeme::LineBreak { .. }));
        assert!(matches!(lexemes[3], Lexeme::Whitespace { ref text, .. } if text == "\t"));
    }

    #[test]
    fn test_crlf_is_one_line_break() {
        let lexemes = scan("a\r\nb");
        assert_eq!(lexemes.len(), 3);
        assert_eq!(lexemes[2].range().start, Position::new(2, 0));
    }

    #[test]
    fn test_words() {
        assert_eq!(
            token_texts("let done = true"),
            vec![
                (TokenKind::Keyword, "let".to_string()),
                (TokenKind::Identifier, "done".to_string()),
                (TokenKind::Operator, "=".to_string()),
                (TokenKind::Boolean, "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_operator_runs_and_punctuators() {
        assert_eq!(
            token_texts("a++--b.(c)"),
            vec![
                (TokenKind::Identifier, "a".to_string()),
                (TokenKind::Operator, "++--".to_string()),
                (TokenKind::Identifier, "b".to_string()),
                (TokenKind::Punctuator, ".".to_string()),
                (TokenKind::Punctuator, "(".to_string()),
                (TokenKind::Identifier, "c".to_string()),
                (TokenKind::Punctuator, ")".to_string()),
            ]
        );
    }

    #[test]
    fn test_unicode_operators_advance_one_column() {
        let lexemes = scan("a ≠ b");
        assert_eq!(lexemes[4].range().start, Position::new(1, 4));
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            token_texts("x # trailing\n#= outer #= inner =# still =# y"),
            vec![
                (TokenKind::Identifier, "x".to_string()),
                (TokenKind::Comment, " trailing".to_string()),
                (
                    TokenKind::MultiLineComment,
                    " outer #= inner =# still ".to_string()
                ),
                (TokenKind::Identifier, "y".to_string()),
            ]
        );
    }

    #[test]
    fn test_unterminated_nested_comment_is_fatal() {
        let err = Scanner::new("#= a #= b =#").scan().unwrap_err();
        assert_eq!((err.line, err.column), (1, 0));
        assert!(err.message.contains("unterminated multi-line comment"));
    }

    #[test]
    fn test_single_line_string_must_close_on_its_line() {
        let err = Scanner::new("'abc\n'").scan().unwrap_err();
        assert!(err.message.contains("unterminated string"));
    }

    #[test]
    fn test_multi_line_string_records_indentation() {
        let lexemes = scan("\"\"\"first\n    second\n\n  third\"\"\"");
        let Lexeme::Token(token) = &lexemes[0] else {
            panic!("expected a token");
        };
        assert_eq!(token.kind, TokenKind::MultiLineString);
        assert_eq!(token.text(), "first\n    second\n\n  third");
        assert_eq!(token.indentations, vec![4, 2]);
        assert_eq!(token.range.end, Position::new(4, 10));
    }

    #[test]
    fn test_regex_only_where_an_operand_starts() {
        assert_eq!(
            token_texts("x = /ab+c/"),
            vec![
                (TokenKind::Identifier, "x".to_string()),
                (TokenKind::Operator, "=".to_string()),
                (TokenKind::Regex, "ab+c".to_string()),
            ]
        );
        assert_eq!(
            token_texts("a / b / c"),
            vec![
                (TokenKind::Identifier, "a".to_string()),
                (TokenKind::Operator, "/".to_string()),
                (TokenKind::Identifier, "b".to_string()),
                (TokenKind::Operator, "/".to_string()),
                (TokenKind::Identifier, "c".to_string()),
            ]
        );
    }

    #[test]
    fn test_line_continuation_joins_lines() {
        let lexemes = scan("a + ...  \n    b");
        assert!(!lexemes
            .iter()
            .any(|lexeme| matches!(lexeme, Lexeme::LineBreak { .. })));
    }

    #[test]
    fn test_unrecognized_character() {
        let err = Scanner::new("a ` b").scan().unwrap_err();
        assert_eq!((err.line, err.column), (1, 2));
        assert!(err.message.starts_with("unrecognized character"));
    }
}
