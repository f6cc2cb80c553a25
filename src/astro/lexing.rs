//! Lexing
//!
//!     Source text is turned into tokens in three stages:
//!
//!     1. Base tokenization ([`scanner`]): a priority-ordered per-character
//!        dispatch producing tokens plus raw layout (line breaks, whitespace
//!        runs). Numerals are handled by the [`numerals`] subgrammar.
//!     2. Semantic indentation ([`transformations::semantic_indentation`]):
//!        raw layout becomes newline/indent/dedent markers.
//!     3. No-space insertion ([`transformations::no_space`]): whitespace is
//!        dropped and touching tokens are separated by no-space markers.
//!
//!     Finally an end-of-input token is appended. Every call builds fresh
//!     state; nothing is shared between calls.

pub mod charsets;
pub mod common;
pub mod detokenizer;
pub mod numerals;
pub mod scanner;
pub mod tokens;
pub mod transformations;

pub use common::LexError;
pub use tokens::{Base, Token, TokenKind};

use crate::astro::ast::range::{Range, SourceLocation};
use scanner::Scanner;
use tracing::debug;
use transformations::no_space::insert_no_space_markers;
use transformations::semantic_indentation::SemanticIndentationMapper;

/// Lex `source` into a finite token sequence ending in end-of-input.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let lexemes = Scanner::new(source).scan()?;
    let lexemes = SemanticIndentationMapper::new().map(lexemes)?;
    let mut tokens = insert_no_space_markers(lexemes);

    let end = SourceLocation::new(source).byte_to_position(source.len());
    tokens.push(Token::structural(
        TokenKind::EndOfInput,
        Range::empty(source.len(), end),
    ));

    debug!(bytes = source.len(), tokens = tokens.len(), "lexed source");
    Ok(tokens)
}
