//! Parsing
//!
//!     The parser is a backtracking recursive descent over the token stream,
//!     built from the small combinator algebra in [`engine`]. Rules are plain
//!     functions taking the [`Parser`] cursor; every piece of state a rule
//!     touches lives in the cursor, so a failed rule can be undone by
//!     restoring one snapshot.
//!
//!     Grammar modules, leaves first:
//!
//!     - [`literals`]: literal atoms and collection literals
//!     - [`operators`]: chains, prefix/postfix atoms and flat infix runs
//!     - [`layout`]: indentation-sensitive blocks and statement separators
//!     - [`statements`]: control flow and control primitives
//!     - [`declarations`]: module, import, type, enum, fun, prop, let/var/const
//!
//!     Failing alternatives are ordinary control flow. Only running out of
//!     alternatives at the top level, or failing after a construct has
//!     committed, produces a [`ParseError`].

pub mod declarations;
pub mod engine;
pub mod error;
pub mod layout;
pub mod literals;
pub mod operators;
pub mod statements;

pub use engine::{MemoStats, ParseResult, Parser, Snapshot};
pub use error::{format_source_context, FrontendError, ParseError};

use crate::astro::ast::nodes::Program;
use crate::astro::ast::range::Range;
use crate::astro::lexing::{lex, Token};
use tracing::debug;

/// Parse a token sequence produced by [`lex`] into a [`Program`].
///
/// Each call uses a fresh [`Parser`] and therefore a fresh memo table.
pub fn parse(tokens: &[Token]) -> Result<Program, ParseError> {
    let mut parser = Parser::new(tokens);
    let program = program(&mut parser)?;

    let stats = parser.memo_stats();
    debug!(
        tokens = tokens.len(),
        statements = program.body.len(),
        memo_entries = stats.entries,
        memo_hits = stats.hits,
        "parsed program"
    );
    Ok(program)
}

/// Lex and parse `source` in one step.
pub fn parse_source(source: &str) -> Result<Program, FrontendError> {
    let tokens = lex(source)?;
    Ok(parse(&tokens)?)
}

fn program(p: &mut Parser<'_>) -> Result<Program, ParseError> {
    let start = p.start();
    p.optmore(layout::separator)?;

    let mut body = Vec::new();
    if let Some(first) = statements::statement(p)? {
        body.push(first);
        layout::statement_run(p, &mut body)?;
    }
    p.optmore(layout::separator)?;

    if p.eoi()?.is_none() {
        return Err(p.unexpected());
    }
    let range = Range::bounding_box(body.iter().map(|node| &node.range))
        .unwrap_or_else(|| p.range_from(start));
    Ok(Program { body, range })
}
