//! The Astro language front end: lexer, parser and syntax tree.
//!
//! ```text
//! source text ──lex──▶ Vec<Token> ──parse──▶ Program
//! ```
//!
//! [`lexing::lex`] and [`parsing::parse`] are the two entry points; both are
//! pure functions of their input and build all their state per call.
//! [`parsing::parse_source`] chains them.

pub mod ast;
pub mod config;
pub mod formats;
pub mod lexing;
pub mod parsing;
pub mod testing;
