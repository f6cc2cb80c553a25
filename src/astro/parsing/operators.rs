//! Operator expressions
//!
//! An expression is a flat run `operand (infix operand)*`, accumulated left
//! to right without consulting precedence. Shaping the run into a tree is
//! left to a later pass, so the parser only has to decide where each
//! operator belongs:
//!
//! - an operator touching the following chain but not the previous token is
//!   a prefix (`-x`, `*+5`);
//! - an operator touching the previous chain but not the following operand
//!   is a postfix (`d+ in b`, `x++)`);
//! - an infix operator is spaced on both sides or touching on both sides
//!   (`a + b`, `a+b`), optionally vectorized with a touching `.` (`a .+ b`).
//!
//! Keyword operators (`is`, `is not`, `in`, `not in`, `mod`) are always
//! infix; `not` on its own is a prefix.

use super::engine::{ParseResult, Parser, Rule};
use super::error::ParseError;
use super::literals::{
    coefficient, dict, element, identifier, identifier_name, list, literal, parenthesized, symbol,
};
use crate::astro::ast::nodes::{Element, Node, NodeKind, OperatorDescriptor, RefKind};
use crate::astro::lexing::tokens::{Token, TokenKind};

/// `=` and compound assignments such as `+=` or `<<=`. Comparisons that
/// end in `=` are not assignments.
pub fn is_assignment_operator(text: &str) -> bool {
    match text.strip_suffix('=') {
        Some("") => true,
        Some(op) => !op.ends_with('=') && !matches!(op, "!" | "<" | ">"),
        None => false,
    }
}

fn is_operator_symbol(token: &Token) -> bool {
    token.kind == TokenKind::Operator && !is_assignment_operator(token.text())
}

/// Tokens that may directly follow a postfix operator.
fn closes_operand(token: Option<&Token>) -> bool {
    match token {
        None => true,
        Some(token) if token.kind.is_structural() || token.kind == TokenKind::EndOfInput => true,
        Some(token) => {
            token.kind == TokenKind::Punctuator
                && matches!(token.text(), ")" | "]" | "}" | "," | ";" | ":")
        }
    }
}

pub fn expression(p: &mut Parser<'_>) -> ParseResult<Node> {
    p.memo("expression", infix_run)
}

fn infix_run(p: &mut Parser<'_>) -> ParseResult<Node> {
    let start = p.start();
    let Some(first) = operand(p)? else {
        return Ok(None);
    };
    let mut operands = vec![first];
    let mut operators = Vec::new();
    loop {
        let checkpoint = p.snapshot();
        let Some(operator) = infix_operator(p)? else {
            break;
        };
        match operand(p)? {
            Some(next) => {
                operators.push(operator);
                operands.push(next);
            }
            None => {
                p.restore(checkpoint);
                break;
            }
        }
    }
    if operators.is_empty() {
        return Ok(operands.pop());
    }
    Ok(Some(p.node(
        NodeKind::Infix {
            operands,
            operators,
        },
        start,
    )))
}

pub fn infix_operator(p: &mut Parser<'_>) -> ParseResult<OperatorDescriptor> {
    let rules: [Rule<'_, OperatorDescriptor>; 2] = [keyword_operator as Rule<'_, OperatorDescriptor>, symbolic_operator as Rule<'_, OperatorDescriptor>];
    p.alt(&rules)
}

fn keyword_operator(p: &mut Parser<'_>) -> ParseResult<OperatorDescriptor> {
    p.attempt(|p| {
        if p.literal("is")?.is_some() {
            let negated = p.opt(|p| p.literal("not"))?.is_some();
            let text = if negated { "is not" } else { "is" };
            return Ok(Some(OperatorDescriptor::keyword(text)));
        }
        if p.literal("not")?.is_some() {
            return Ok(p
                .literal("in")?
                .map(|_| OperatorDescriptor::keyword("not in")));
        }
        for word in ["in", "mod"] {
            if p.literal(word)?.is_some() {
                return Ok(Some(OperatorDescriptor::keyword(word)));
            }
        }
        Ok(None)
    })
}

/// A `.` touching the operator after it.
fn vector_marker(p: &mut Parser<'_>) -> ParseResult<()> {
    p.attempt(|p| {
        let Some(_) = p.literal(".")? else {
            return Ok(None);
        };
        p.no_space()
    })
}

fn symbolic_operator(p: &mut Parser<'_>) -> ParseResult<OperatorDescriptor> {
    p.attempt(|p| {
        let before = p.touching();
        let vectorized = p.opt(vector_marker)?.is_some();
        let Some(token) = p.token_if("an operator", is_operator_symbol)? else {
            return Ok(None);
        };
        if p.touching() != before {
            return Ok(None);
        }
        let operator = OperatorDescriptor::symbol(token.text());
        Ok(Some(if vectorized {
            operator.vectorized()
        } else {
            operator
        }))
    })
}

pub fn operand(p: &mut Parser<'_>) -> ParseResult<Node> {
    p.memo("operand", |p| {
        let rules: [Rule<'_, Node>; 3] = [prefix_atom as Rule<'_, Node>, postfix_atom as Rule<'_, Node>, chain as Rule<'_, Node>];
        p.alt(&rules)
    })
}

pub fn prefix_atom(p: &mut Parser<'_>) -> ParseResult<Node> {
    p.attempt(|p| {
        let start = p.start();
        if p.literal("not")?.is_some() {
            let Some(target) = operand(p)? else {
                return Ok(None);
            };
            return Ok(Some(p.node(
                NodeKind::PrefixAtom {
                    operator: OperatorDescriptor::keyword("not"),
                    operand: Box::new(target),
                },
                start,
            )));
        }
        let vectorized = p.opt(vector_marker)?.is_some();
        let Some(token) = p.token_if("a prefix operator", is_operator_symbol)? else {
            return Ok(None);
        };
        let Some(()) = p.no_space()? else {
            return Ok(None);
        };
        let Some(target) = chain(p)? else {
            return Ok(None);
        };
        let operator = OperatorDescriptor::symbol(token.text());
        Ok(Some(p.node(
            NodeKind::PrefixAtom {
                operator: if vectorized {
                    operator.vectorized()
                } else {
                    operator
                },
                operand: Box::new(target),
            },
            start,
        )))
    })
}

pub fn postfix_atom(p: &mut Parser<'_>) -> ParseResult<Node> {
    p.attempt(|p| {
        let start = p.start();
        let Some(target) = chain(p)? else {
            return Ok(None);
        };
        let Some(()) = p.no_space()? else {
            return Ok(None);
        };
        let vectorized = p.opt(vector_marker)?.is_some();
        let Some(token) = p.token_if("a postfix operator", is_operator_symbol)? else {
            return Ok(None);
        };
        if p.touching() && !closes_operand(p.peek()) {
            return Ok(None);
        }
        let operator = OperatorDescriptor::symbol(token.text());
        Ok(Some(p.node(
            NodeKind::PostfixAtom {
                operand: Box::new(target),
                operator: if vectorized {
                    operator.vectorized()
                } else {
                    operator
                },
            },
            start,
        )))
    })
}

/// `val`, `ref`, `iso` or `acq`.
pub fn ref_kind(p: &mut Parser<'_>) -> ParseResult<RefKind> {
    Ok(p
        .token_if("a reference kind", |t| {
            t.kind == TokenKind::Keyword && RefKind::from_keyword(t.text()).is_some()
        })?
        .and_then(|token| RefKind::from_keyword(token.text())))
}

enum Suffix {
    Call {
        vectorized: bool,
        arguments: Vec<Element>,
    },
    Dot(String),
    Index(Vec<Node>),
}

/// An atom followed by touching calls, field accesses and indexing.
pub fn chain(p: &mut Parser<'_>) -> ParseResult<Node> {
    p.memo("chain", |p| {
        let start = p.start();
        let reference = p.opt(ref_kind)?;
        let Some(mut node) = atom(p)? else {
            return Ok(None);
        };
        while let Some(suffix) = p.opt(postfix)? {
            let kind = match suffix {
                Suffix::Call {
                    vectorized,
                    arguments,
                } => NodeKind::Call {
                    callee: Box::new(node),
                    vectorized,
                    arguments,
                },
                Suffix::Dot(field) => NodeKind::Dot {
                    object: Box::new(node),
                    field,
                },
                Suffix::Index(indices) => NodeKind::Index {
                    object: Box::new(node),
                    indices,
                },
            };
            node = p.node(kind, start);
        }
        if reference.is_some() {
            node.range = p.range_from(start);
        }
        Ok(Some(node.with_reference(reference)))
    })
}

fn arguments(p: &mut Parser<'_>) -> Result<Vec<Element>, ParseError> {
    let arguments = p.separated(element, ",")?;
    p.required(|p| p.literal(")"), "expected `)` to close the argument list")?;
    Ok(arguments)
}

fn postfix(p: &mut Parser<'_>) -> ParseResult<Suffix> {
    p.attempt(|p| {
        let Some(()) = p.no_space()? else {
            return Ok(None);
        };
        if p.literal("(")?.is_some() {
            return Ok(Some(Suffix::Call {
                vectorized: false,
                arguments: arguments(p)?,
            }));
        }
        if p.literal("[")?.is_some() {
            let indices = p.separated(index, ",")?;
            if indices.is_empty() {
                return Err(p.error_here("expected an index inside `[]`"));
            }
            p.required(|p| p.literal("]"), "expected `]` to close the index")?;
            return Ok(Some(Suffix::Index(indices)));
        }
        if p.literal(".")?.is_some() {
            let Some(()) = p.no_space()? else {
                return Ok(None);
            };
            if p.literal("(")?.is_some() {
                return Ok(Some(Suffix::Call {
                    vectorized: true,
                    arguments: arguments(p)?,
                }));
            }
            return Ok(identifier_name(p)?.map(Suffix::Dot));
        }
        Ok(None)
    })
}

fn index(p: &mut Parser<'_>) -> ParseResult<Node> {
    if let Some(slice) = p.opt(slice)? {
        return Ok(Some(slice));
    }
    expression(p)
}

/// `start:stop:step` with every part optional.
fn slice(p: &mut Parser<'_>) -> ParseResult<Node> {
    p.attempt(|p| {
        let start = p.start();
        let lower = p.opt(expression)?;
        let Some(_) = p.literal(":")? else {
            return Ok(None);
        };
        let upper = p.opt(expression)?;
        let step = match p.literal(":")? {
            Some(_) => p.opt(expression)?,
            None => None,
        };
        Ok(Some(p.node(
            NodeKind::Slice {
                start: lower.map(Box::new),
                stop: upper.map(Box::new),
                step: step.map(Box::new),
            },
            start,
        )))
    })
}

pub fn atom(p: &mut Parser<'_>) -> ParseResult<Node> {
    p.memo("atom", |p| {
        let rules: [Rule<'_, Node>; 9] = [
            coefficient as Rule<'_, Node>,
            literal as Rule<'_, Node>,
            identifier as Rule<'_, Node>,
            parenthesized as Rule<'_, Node>,
            list as Rule<'_, Node>,
            dict as Rule<'_, Node>,
            symbol as Rule<'_, Node>,
            await_expression as Rule<'_, Node>,
            new_expression as Rule<'_, Node>,
        ];
        p.alt(&rules)
    })
}

fn await_expression(p: &mut Parser<'_>) -> ParseResult<Node> {
    let start = p.start();
    let Some(_) = p.literal("await")? else {
        return Ok(None);
    };
    let value = p.required(operand, "expected an expression after `await`")?;
    Ok(Some(p.node(
        NodeKind::Await {
            value: Box::new(value),
        },
        start,
    )))
}

fn new_expression(p: &mut Parser<'_>) -> ParseResult<Node> {
    let start = p.start();
    let Some(_) = p.literal("new")? else {
        return Ok(None);
    };
    let value = p.required(chain, "expected a type after `new`")?;
    Ok(Some(p.node(
        NodeKind::New {
            value: Box::new(value),
        },
        start,
    )))
}
