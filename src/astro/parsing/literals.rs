//! Literal atoms and collection literals

use super::engine::{ParseResult, Parser};
use super::operators::expression;
use crate::astro::ast::nodes::{DictEntry, Element, Node, NodeKind};
use crate::astro::lexing::tokens::TokenKind;

/// An identifier token's text.
pub fn identifier_name(p: &mut Parser<'_>) -> ParseResult<String> {
    Ok(p
        .kind(TokenKind::Identifier)?
        .map(|token| token.text().to_string()))
}

pub fn identifier(p: &mut Parser<'_>) -> ParseResult<Node> {
    let start = p.start();
    let Some(name) = identifier_name(p)? else {
        return Ok(None);
    };
    Ok(Some(p.node(NodeKind::Identifier { name }, start)))
}

pub fn numeral(p: &mut Parser<'_>) -> ParseResult<Node> {
    p.memo("numeral", |p| {
        let start = p.start();
        let Some(token) = p.token_if("a number", |t| t.kind.is_numeral())? else {
            return Ok(None);
        };
        let digits = token.text().to_string();
        let kind = match token.kind {
            TokenKind::Integer(base) => NodeKind::Integer { base, digits },
            TokenKind::Float(base) => NodeKind::Float { base, digits },
            _ => return Ok(None),
        };
        Ok(Some(p.node(kind, start)))
    })
}

/// A numeral touching an identifier: `78f`, `2x`.
pub fn coefficient(p: &mut Parser<'_>) -> ParseResult<Node> {
    p.attempt(|p| {
        let start = p.start();
        let Some(number) = numeral(p)? else {
            return Ok(None);
        };
        let Some(()) = p.no_space()? else {
            return Ok(None);
        };
        let Some(identifier) = identifier_name(p)? else {
            return Ok(None);
        };
        Ok(Some(p.node(
            NodeKind::Coefficient {
                coefficient: Box::new(number),
                identifier,
            },
            start,
        )))
    })
}

/// Numbers, booleans, strings and regular expressions.
pub fn literal(p: &mut Parser<'_>) -> ParseResult<Node> {
    if let Some(number) = numeral(p)? {
        return Ok(Some(number));
    }
    let start = p.start();
    let Some(token) = p.token_if("a literal", |t| {
        matches!(
            t.kind,
            TokenKind::Boolean | TokenKind::String | TokenKind::MultiLineString | TokenKind::Regex
        )
    })?
    else {
        return Ok(None);
    };
    let text = token.text().to_string();
    let kind = match token.kind {
        TokenKind::Boolean => NodeKind::Boolean {
            value: text == "true",
        },
        TokenKind::String => NodeKind::Str {
            text,
            multi_line: false,
        },
        TokenKind::MultiLineString => NodeKind::Str {
            text,
            multi_line: true,
        },
        TokenKind::Regex => NodeKind::Regex { pattern: text },
        _ => return Ok(None),
    };
    Ok(Some(p.node(kind, start)))
}

/// A tuple element or call argument with an optional `label:`.
pub fn element(p: &mut Parser<'_>) -> ParseResult<Element> {
    let label = p.opt(|p| {
        let Some(name) = identifier_name(p)? else {
            return Ok(None);
        };
        Ok(p.literal(":")?.map(|_| name))
    })?;
    let value = match &label {
        Some(label) => p.required(expression, format!("expected a value for label `{}`", label))?,
        None => match expression(p)? {
            Some(value) => value,
            None => return Ok(None),
        },
    };
    Ok(Some(Element { label, value }))
}

/// `( … )`: a grouped expression, or a tuple when there is a label, a
/// comma or nothing inside.
pub fn parenthesized(p: &mut Parser<'_>) -> ParseResult<Node> {
    let start = p.start();
    let Some(_) = p.literal("(")? else {
        return Ok(None);
    };
    let mut elements = p.separated(element, ",")?;
    let trailing_comma = p.previous().is_some_and(|t| t.is_exactly(","));
    p.required(|p| p.literal(")"), "expected `)` to close the parenthesis")?;

    let grouped = elements.len() == 1 && !trailing_comma && elements[0].label.is_none();
    if grouped {
        if let Some(Element { mut value, .. }) = elements.pop() {
            value.range = p.range_from(start);
            return Ok(Some(value));
        }
    }
    Ok(Some(p.node(NodeKind::Tuple { elements }, start)))
}

/// `[a, b]` or, with `;` between rows, a matrix `[1, 2; 3, 4]`.
pub fn list(p: &mut Parser<'_>) -> ParseResult<Node> {
    let start = p.start();
    let Some(_) = p.literal("[")? else {
        return Ok(None);
    };
    let mut rows = vec![p.separated(expression, ",")?];
    while p.literal(";")?.is_some() {
        rows.push(p.separated(expression, ",")?);
    }
    p.required(|p| p.literal("]"), "expected `]` to close the list")?;

    if rows.len() > 1 && rows.last().is_some_and(Vec::is_empty) {
        rows.pop();
    }
    let kind = if rows.len() > 1 {
        NodeKind::Matrix { rows }
    } else {
        NodeKind::List {
            elements: rows.pop().unwrap_or_default(),
        }
    };
    Ok(Some(p.node(kind, start)))
}

fn dict_entry(p: &mut Parser<'_>) -> ParseResult<DictEntry> {
    p.attempt(|p| {
        let Some(key) = expression(p)? else {
            return Ok(None);
        };
        if p.literal(":")?.is_some() {
            let value = p.required(expression, "expected a value after `:` in dict")?;
            return Ok(Some(DictEntry { key, value }));
        }
        // `{name}` is short for `{name: name}`
        if key.identifier().is_some() {
            return Ok(Some(DictEntry {
                value: key.clone(),
                key,
            }));
        }
        Ok(None)
    })
}

pub fn dict(p: &mut Parser<'_>) -> ParseResult<Node> {
    let start = p.start();
    let Some(_) = p.literal("{")? else {
        return Ok(None);
    };
    let entries = p.separated(dict_entry, ",")?;
    p.required(|p| p.literal("}"), "expected `}` to close the dict")?;
    Ok(Some(p.node(NodeKind::Dict { entries }, start)))
}

/// `$name`
pub fn symbol(p: &mut Parser<'_>) -> ParseResult<Node> {
    let start = p.start();
    let Some(_) = p.literal("$")? else {
        return Ok(None);
    };
    p.required(|p| p.no_space(), "expected a symbol name directly after `$`")?;
    let name = p.required(identifier_name, "expected a symbol name after `$`")?;
    Ok(Some(p.node(NodeKind::Symbol { name }, start)))
}
