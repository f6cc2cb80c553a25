//! No-space marker insertion
//!
//! Drops whitespace lexemes and inserts a [`TokenKind::NoSpace`] marker
//! between every two tokens that touch with nothing in between. The parser
//! uses these markers to tell `f(x)` (a call) from `f (x)`, `-5` (a prefix
//! atom) from `- 5`, and so on.
//!
//! Structural tokens and comments never take part: a marker is only placed
//! between two text-bearing, non-comment tokens, so two markers can never
//! be adjacent.

use super::super::scanner::Lexeme;
use super::super::tokens::{Token, TokenKind};
use crate::astro::ast::range::Range;

fn takes_part(token: &Token) -> bool {
    !token.kind.is_structural() && !token.kind.is_comment()
}

pub fn insert_no_space_markers(lexemes: Vec<Lexeme>) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::with_capacity(lexemes.len());
    let mut touching = false;

    for lexeme in lexemes {
        match lexeme {
            Lexeme::Token(token) => {
                let previous_takes_part = tokens.last().is_some_and(takes_part);
                if touching && previous_takes_part && takes_part(&token) {
                    tokens.push(Token::structural(
                        TokenKind::NoSpace,
                        Range::empty(token.range.span.start, token.range.start),
                    ));
                }
                touching = takes_part(&token);
                tokens.push(token);
            }
            Lexeme::Whitespace { .. } | Lexeme::LineBreak { .. } => touching = false,
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astro::lexing::scanner::Scanner;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let lexemes = Scanner::new(source).scan().unwrap();
        insert_no_space_markers(lexemes)
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    use TokenKind::{Identifier, NoSpace, Operator, Punctuator};

    #[test]
    fn test_markers_between_touching_tokens() {
        assert_eq!(
            kinds("f(x) + y"),
            vec![
                Identifier, NoSpace, Punctuator, NoSpace, Identifier, NoSpace, Punctuator,
                Operator, Identifier
            ]
        );
    }

    #[test]
    fn test_no_marker_next_to_comments() {
        assert_eq!(
            kinds("a#note"),
            vec![Identifier, TokenKind::Comment]
        );
    }

    #[test]
    fn test_never_two_markers_in_a_row() {
        let tokens = kinds("$a.b[0]!");
        assert!(tokens
            .windows(2)
            .all(|pair| !(pair[0] == NoSpace && pair[1] == NoSpace)));
    }
}
