//! # astro
//!
//! Lexer and memoizing backtracking parser for the indentation-sensitive
//! Astro language.
//!
//! ```rust-example
//! use astro::astro::parsing::parse_source;
//!
//! let program = parse_source("let area = 2pi * r")?;
//! ```
//!
//! ## Testing
//!
//! Shared token and AST helpers live in the [testing module](crate::astro::testing).

pub mod astro;
