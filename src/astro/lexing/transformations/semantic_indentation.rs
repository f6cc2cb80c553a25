//! Semantic indentation mapper
//!
//!     This mapper turns the raw layout left by the scanner (line breaks and
//!     leading whitespace runs) into structural newline, indent and dedent
//!     tokens. We don't care how many spaces a line starts with, only whether
//!     its level went up, down or stayed put.
//!
//!     The first indented line fixes two things for the rest of the source:
//!     whether indentation uses spaces or tabs, and the unit width of one
//!     level. Only the previous level is retained, there is no stack of
//!     widths.
//!
//! Algorithm
//!
//!     1. At every line break (outside brackets), skip blank lines and
//!        measure the leading whitespace of the next line that has content
//!     2. A line whose first content is a comment is transparent: no token
//!     3. Otherwise compute `level = width / unit` and compare it with the
//!        previous level:
//!        - one higher: emit Indent (more than one higher is an error)
//!        - lower by N: emit N Dedent tokens
//!        - equal: emit Newline
//!     4. Inside `()`, `[]` and `{}` line breaks are plain whitespace
//!     5. At end of input, emit one Dedent per level still open
use super::super::common::{LexError, LexResult};
use super::super::scanner::Lexeme;
use super::super::tokens::{Token, TokenKind};
use crate::astro::ast::range::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndentStyle {
    Spaces,
    Tabs,
}

impl IndentStyle {
    fn name(self) -> &'static str {
        match self {
            IndentStyle::Spaces => "spaces",
            IndentStyle::Tabs => "tabs",
        }
    }
}

/// Lexer-side indentation state. Created per source, never reused.
#[derive(Debug, Default)]
pub struct SemanticIndentationMapper {
    unit: Option<usize>,
    style: Option<IndentStyle>,
    level: usize,
    bracket_depth: usize,
}

/// What follows a line break once blank lines are skipped.
enum LineStart<'a> {
    EndOfInput,
    Comment,
    Content {
        indentation: Option<(&'a str, &'a Range)>,
        first: &'a Range,
        resume: usize,
    },
}

impl SemanticIndentationMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace raw line breaks with structural tokens.
    ///
    /// Whitespace lexemes are kept (the no-space pass still needs them), and
    /// leading whitespace of a measured line is kept as plain whitespace.
    pub fn map(&mut self, lexemes: Vec<Lexeme>) -> LexResult<Vec<Lexeme>> {
        let mut result = Vec::with_capacity(lexemes.len());

        if let LineStart::Content {
            indentation: Some((_, range)),
            ..
        } = Self::line_start(&lexemes, 0)
        {
            return Err(LexError::new(
                range.start,
                "source cannot start with indentation",
            ));
        }

        let mut i = 0;
        while i < lexemes.len() {
            match &lexemes[i] {
                Lexeme::Token(token) => {
                    self.track_brackets(token);
                    result.push(lexemes[i].clone());
                    i += 1;
                }
                Lexeme::Whitespace { .. } => {
                    result.push(lexemes[i].clone());
                    i += 1;
                }
                Lexeme::LineBreak { range } if self.bracket_depth > 0 => {
                    result.push(Lexeme::Whitespace {
                        text: "\n".to_string(),
                        range: range.clone(),
                    });
                    i += 1;
                }
                Lexeme::LineBreak { range } => match Self::line_start(&lexemes, i + 1) {
                    LineStart::EndOfInput => break,
                    LineStart::Comment => {
                        result.push(Lexeme::Whitespace {
                            text: "\n".to_string(),
                            range: range.clone(),
                        });
                        i += 1;
                    }
                    LineStart::Content {
                        indentation,
                        first,
                        resume,
                    } => {
                        self.emit_line_change(range, indentation, first, &mut result)?;
                        if let Some((text, range)) = indentation {
                            result.push(Lexeme::Whitespace {
                                text: text.to_string(),
                                range: range.clone(),
                            });
                        }
                        i = resume;
                    }
                },
            }
        }

        let end = lexemes
            .last()
            .map(|lexeme| lexeme.range().clone())
            .unwrap_or_default();
        for _ in 0..self.level {
            result.push(Lexeme::Token(Token::structural(
                TokenKind::Dedent,
                Range::empty(end.span.end, end.end),
            )));
        }
        self.level = 0;

        Ok(result)
    }

    fn track_brackets(&mut self, token: &Token) {
        if token.kind != TokenKind::Punctuator {
            return;
        }
        match token.text() {
            "(" | "[" | "{" => self.bracket_depth += 1,
            ")" | "]" | "}" => self.bracket_depth = self.bracket_depth.saturating_sub(1),
            _ => {}
        }
    }

    /// Skip blank lines starting at `index` and classify the first line
    /// with content.
    fn line_start(lexemes: &[Lexeme], mut index: usize) -> LineStart<'_> {
        loop {
            let indentation = match lexemes.get(index) {
                Some(Lexeme::Whitespace { text, range }) => Some((text.as_str(), range)),
                _ => None,
            };
            let content_at = index + usize::from(indentation.is_some());
            match lexemes.get(content_at) {
                None => return LineStart::EndOfInput,
                Some(Lexeme::LineBreak { .. }) => index = content_at + 1,
                Some(Lexeme::Token(token)) if token.kind.is_comment() => {
                    return LineStart::Comment
                }
                Some(lexeme) => {
                    return LineStart::Content {
                        indentation,
                        first: lexeme.range(),
                        resume: content_at,
                    }
                }
            }
        }
    }

    fn emit_line_change(
        &mut self,
        line_break: &Range,
        indentation: Option<(&str, &Range)>,
        first: &Range,
        out: &mut Vec<Lexeme>,
    ) -> LexResult<()> {
        let level = match indentation {
            Some((text, range)) => self.measure(text, range)?,
            None => 0,
        };

        if level > self.level + 1 {
            return Err(LexError::new(
                first.start,
                format!(
                    "too much indentation: expected at most level {}, found level {}",
                    self.level + 1,
                    level
                ),
            ));
        }

        if level == self.level + 1 {
            let range = indentation.map_or_else(|| first.clone(), |(_, range)| range.clone());
            out.push(Lexeme::Token(Token::structural(TokenKind::Indent, range)));
        } else if level < self.level {
            for _ in level..self.level {
                out.push(Lexeme::Token(Token::structural(
                    TokenKind::Dedent,
                    Range::empty(first.span.start, first.start),
                )));
            }
        } else {
            out.push(Lexeme::Token(Token::structural(
                TokenKind::Newline,
                line_break.clone(),
            )));
        }

        self.level = level;
        Ok(())
    }

    /// Convert a leading whitespace run into a level, fixing the unit and
    /// style on first use.
    fn measure(&mut self, text: &str, range: &Range) -> LexResult<usize> {
        let style = match (text.contains(' '), text.contains('\t')) {
            (true, true) => {
                return Err(LexError::new(
                    range.start,
                    "cannot mix tab and space indentation on the same line",
                ))
            }
            (false, true) => IndentStyle::Tabs,
            _ => IndentStyle::Spaces,
        };

        match self.style {
            Some(expected) if expected != style => {
                return Err(LexError::new(
                    range.start,
                    format!(
                        "cannot mix tab and space indentation: this source is indented with {}, found {}",
                        expected.name(),
                        style.name()
                    ),
                ));
            }
            Some(_) => {}
            None => self.style = Some(style),
        }

        let width = text.chars().count();
        let unit = *self.unit.get_or_insert(width);
        if width % unit != 0 {
            return Err(LexError::new(
                range.start,
                format!(
                    "indentation mismatch: width {} is not a multiple of the indentation unit {}",
                    width, unit
                ),
            ));
        }
        Ok(width / unit)
    }
}
