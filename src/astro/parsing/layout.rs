//! Indentation-sensitive rules
//!
//! The lexer already turned layout into `newline`/`indent`/`dedent` tokens.
//! These rules re-check that arithmetic against the parser's own level
//! counter: a run of dedents closing several nested blocks is consumed one
//! level at a time, each by the block it closes.

use super::engine::{ParseResult, Parser};
use super::statements::statement;
use crate::astro::ast::nodes::Node;
use crate::astro::lexing::tokens::TokenKind;

/// Consume one indent marker and raise the tracked level by one.
pub fn indent(p: &mut Parser<'_>) -> ParseResult<()> {
    let Some(_) = p.kind(TokenKind::Indent)? else {
        return Ok(None);
    };
    p.enter_level();
    Ok(Some(()))
}

/// Succeeds without consuming when the next token keeps the current level.
pub fn samedent(p: &mut Parser<'_>) -> ParseResult<()> {
    if p.at(TokenKind::Indent) || p.at(TokenKind::Dedent) {
        return Ok(None);
    }
    Ok(Some(()))
}

/// Consume one dedent marker and lower the tracked level by one.
pub fn dedent(p: &mut Parser<'_>) -> ParseResult<()> {
    if p.indent_level() == 0 {
        return Ok(None);
    }
    let Some(_) = p.kind(TokenKind::Dedent)? else {
        return Ok(None);
    };
    p.leave_level();
    Ok(Some(()))
}

/// A dedent, or end of input closing the innermost open block.
pub fn dedent_or_eoi(p: &mut Parser<'_>) -> ParseResult<()> {
    if dedent(p)?.is_some() {
        return Ok(Some(()));
    }
    if p.indent_level() > 0 && p.eoi()?.is_some() {
        p.leave_level();
        return Ok(Some(()));
    }
    Ok(None)
}

/// A statement separator: a newline marker or `;`.
pub fn separator(p: &mut Parser<'_>) -> ParseResult<()> {
    if p.kind(TokenKind::Newline)?.is_some() || p.literal(";")?.is_some() {
        return Ok(Some(()));
    }
    Ok(None)
}

/// The end of a statement: one or more separators, or a block that just
/// closed with a dedent.
pub fn statement_end(p: &mut Parser<'_>) -> ParseResult<()> {
    if p.more(separator)?.is_some() {
        return Ok(Some(()));
    }
    let after_dedent = p
        .previous()
        .is_some_and(|t| t.kind == TokenKind::Dedent);
    Ok(after_dedent.then_some(()))
}

/// Statements after the first one, each preceded by a statement end and
/// starting at the current level. Stops before a dedent or end of input.
pub fn statement_run(p: &mut Parser<'_>, body: &mut Vec<Node>) -> ParseResult<()> {
    loop {
        let checkpoint = p.snapshot();
        if statement_end(p)?.is_none()
            || samedent(p)?.is_none()
            || p.eoi()?.is_some()
        {
            p.restore(checkpoint);
            break;
        }
        match statement(p)? {
            Some(node) => body.push(node),
            None => {
                p.restore(checkpoint);
                break;
            }
        }
    }
    Ok(Some(()))
}

/// An indented block of statements.
pub fn block(p: &mut Parser<'_>) -> ParseResult<Vec<Node>> {
    p.attempt(|p| {
        let Some(()) = indent(p)? else {
            return Ok(None);
        };
        let Some(first) = statement(p)? else {
            return Ok(None);
        };
        let mut body = vec![first];
        statement_run(p, &mut body)?;
        p.optmore(separator)?;
        let Some(()) = dedent_or_eoi(p)? else {
            return Ok(None);
        };
        Ok(Some(body))
    })
}

/// A block, or `:` followed by a single inline statement.
pub fn body(p: &mut Parser<'_>) -> ParseResult<Vec<Node>> {
    if let Some(body) = block(p)? {
        return Ok(Some(body));
    }
    p.attempt(|p| {
        let Some(_) = p.literal(":")? else {
            return Ok(None);
        };
        let Some(node) = statement(p)? else {
            return Ok(None);
        };
        Ok(Some(vec![node]))
    })
}
