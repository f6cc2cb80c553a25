//! Statements, control flow and control primitives

use super::declarations::declaration;
use super::engine::{ParseResult, Parser, Rule};
use super::layout;
use super::literals::identifier_name;
use super::operators::{chain, expression, is_assignment_operator};
use crate::astro::ast::nodes::{ElifClause, ExceptClause, Node, NodeKind};
use crate::astro::lexing::tokens::TokenKind;

pub fn statement(p: &mut Parser<'_>) -> ParseResult<Node> {
    p.memo("statement", |p| {
        let rules: [Rule<'_, Node>; 10] = [
            declaration as Rule<'_, Node>,
            if_statement as Rule<'_, Node>,
            while_statement as Rule<'_, Node>,
            loop_statement as Rule<'_, Node>,
            for_statement as Rule<'_, Node>,
            try_statement as Rule<'_, Node>,
            defer_statement as Rule<'_, Node>,
            primitive as Rule<'_, Node>,
            assignment as Rule<'_, Node>,
            expression as Rule<'_, Node>,
        ];
        p.alt(&rules)
    })
}

/// A clause keyword, possibly on the line after the previous clause.
fn clause_keyword(p: &mut Parser<'_>, keyword: &str) -> ParseResult<()> {
    p.attempt(|p| {
        p.opt(|p| p.kind(TokenKind::Newline))?;
        Ok(p.literal(keyword)?.map(|_| ()))
    })
}

fn if_statement(p: &mut Parser<'_>) -> ParseResult<Node> {
    let start = p.start();
    let Some(_) = p.literal("if")? else {
        return Ok(None);
    };
    let condition = p.required(expression, "expected a condition after `if`")?;
    let body = p.required(layout::body, "expected a block or `:` after the `if` condition")?;

    let mut elifs = Vec::new();
    while clause_keyword(p, "elif")?.is_some() {
        let condition = p.required(expression, "expected a condition after `elif`")?;
        let body = p.required(layout::body, "expected a block or `:` after the `elif` condition")?;
        elifs.push(ElifClause { condition, body });
    }
    let else_body = match clause_keyword(p, "else")? {
        Some(()) => p.required(layout::body, "expected a block or `:` after `else`")?,
        None => Vec::new(),
    };

    Ok(Some(p.node(
        NodeKind::If {
            condition: Box::new(condition),
            body,
            elifs,
            else_body,
        },
        start,
    )))
}

fn while_statement(p: &mut Parser<'_>) -> ParseResult<Node> {
    let start = p.start();
    let Some(_) = p.literal("while")? else {
        return Ok(None);
    };
    let condition = p.required(expression, "expected a condition after `while`")?;
    let body = p.required(layout::body, "expected a block or `:` after the `while` condition")?;
    Ok(Some(p.node(
        NodeKind::While {
            condition: Box::new(condition),
            body,
        },
        start,
    )))
}

fn loop_statement(p: &mut Parser<'_>) -> ParseResult<Node> {
    let start = p.start();
    let Some(_) = p.literal("loop")? else {
        return Ok(None);
    };
    let body = p.required(layout::body, "expected a block or `:` after `loop`")?;
    Ok(Some(p.node(NodeKind::Loop { body }, start)))
}

fn for_statement(p: &mut Parser<'_>) -> ParseResult<Node> {
    let start = p.start();
    let Some(_) = p.literal("for")? else {
        return Ok(None);
    };
    let targets = p.separated(identifier_name, ",")?;
    if targets.is_empty() {
        return Err(p.error_here("expected a loop variable after `for`"));
    }
    p.required(|p| p.literal("in"), "expected `in` after the loop variables")?;
    let iterable = p.required(expression, "expected an expression after `in`")?;
    let body = p.required(layout::body, "expected a block or `:` after the `for` header")?;
    Ok(Some(p.node(
        NodeKind::For {
            targets,
            iterable: Box::new(iterable),
            body,
        },
        start,
    )))
}

fn except_clause(p: &mut Parser<'_>) -> ParseResult<ExceptClause> {
    let Some(()) = clause_keyword(p, "except")? else {
        return Ok(None);
    };
    let error = p.opt(identifier_name)?;
    let binding = match error {
        Some(_) if p.literal("as")?.is_some() => Some(p.required(
            identifier_name,
            "expected a name after `as`",
        )?),
        _ => None,
    };
    let body = p.required(layout::body, "expected a block or `:` after `except`")?;
    Ok(Some(ExceptClause {
        error,
        binding,
        body,
    }))
}

fn try_statement(p: &mut Parser<'_>) -> ParseResult<Node> {
    let start = p.start();
    let Some(_) = p.literal("try")? else {
        return Ok(None);
    };
    let body = p.required(layout::body, "expected a block or `:` after `try`")?;
    let excepts = p.optmore(except_clause)?;
    let ensure = match clause_keyword(p, "ensure")? {
        Some(()) => p.required(layout::body, "expected a block or `:` after `ensure`")?,
        None => Vec::new(),
    };
    if excepts.is_empty() && ensure.is_empty() {
        return Err(p.error_here("`try` needs an `except` or `ensure` clause"));
    }
    Ok(Some(p.node(
        NodeKind::Try {
            body,
            excepts,
            ensure,
        },
        start,
    )))
}

fn defer_statement(p: &mut Parser<'_>) -> ParseResult<Node> {
    let start = p.start();
    let Some(_) = p.literal("defer")? else {
        return Ok(None);
    };
    let body = p.required(layout::body, "expected a block or `:` after `defer`")?;
    Ok(Some(p.node(NodeKind::Defer { body }, start)))
}

/// `@name` after `break`, `continue` or `fallthrough`.
fn label(p: &mut Parser<'_>) -> ParseResult<String> {
    let Some(_) = p.literal("@")? else {
        return Ok(None);
    };
    p.required(|p| p.no_space(), "expected a label name directly after `@`")?;
    Ok(Some(p.required(identifier_name, "expected a label name after `@`")?))
}

fn primitive(p: &mut Parser<'_>) -> ParseResult<Node> {
    let start = p.start();
    let Some(keyword) = p.token_if("a control keyword", |t| {
        t.kind == TokenKind::Keyword
            && matches!(
                t.text(),
                "return" | "yield" | "raise" | "break" | "continue" | "fallthrough" | "pass"
            )
    })?
    else {
        return Ok(None);
    };

    let kind = match keyword.text() {
        "return" => NodeKind::Return {
            value: p.opt(expression)?.map(Box::new),
        },
        "yield" => {
            let from = p.literal("from")?.is_some();
            let value = if from {
                Some(p.required(expression, "expected an expression after `yield from`")?)
            } else {
                p.opt(expression)?
            };
            NodeKind::Yield {
                from,
                value: value.map(Box::new),
            }
        }
        "raise" => NodeKind::Raise {
            value: p.opt(expression)?.map(Box::new),
        },
        "break" => NodeKind::Break {
            value: p.opt(expression)?.map(Box::new),
            label: p.opt(label)?,
        },
        "continue" => NodeKind::Continue {
            label: p.opt(label)?,
        },
        "fallthrough" => NodeKind::Fallthrough {
            label: p.opt(label)?,
        },
        _ => NodeKind::Pass,
    };
    Ok(Some(p.node(kind, start)))
}

/// `target op= value`
fn assignment(p: &mut Parser<'_>) -> ParseResult<Node> {
    p.attempt(|p| {
        let start = p.start();
        let Some(target) = chain(p)? else {
            return Ok(None);
        };
        let Some(operator) = p.token_if("an assignment operator", |t| {
            t.kind == TokenKind::Operator && is_assignment_operator(t.text())
        })?
        else {
            return Ok(None);
        };
        let value = p.required(
            expression,
            format!("expected an expression after `{}`", operator.text()),
        )?;
        Ok(Some(p.node(
            NodeKind::Assignment {
                target: Box::new(target),
                operator: operator.text().to_string(),
                value: Box::new(value),
            },
            start,
        )))
    })
}
