//! Testing utilities for tokens and syntax trees
//!
//! Unit and integration tests share these helpers instead of hand-building
//! token vectors or walking nodes by hand.
//!
//! - [`significant_tokens`] lexes a source and keeps `(kind, text)` pairs for
//!   the tokens that carry text, which is what most lexer tests compare.
//! - [`parse_ok`] parses a source and panics with the failing line in context.
//! - [`assert_ast`] starts a fluent assertion over a [`Program`]:
//!
//! ```rust-example
//! assert_ast(&parse_ok("x = a + b"))
//!     .statement_count(1)
//!     .statement(0, |s| {
//!         s.kind("Assignment").child(1, |value| {
//!             value.kind("Infix").operators(&["+"]);
//!         });
//!     });
//! ```

use crate::astro::ast::nodes::{Node, NodeKind, Program, RefKind};
use crate::astro::lexing::{lex, TokenKind};
use crate::astro::parsing::{format_source_context, parse_source};

/// `(kind, text)` for every token that is not structural.
pub fn significant_tokens(source: &str) -> Vec<(TokenKind, String)> {
    lex(source)
        .unwrap_or_else(|err| panic!("{}\n{}", err, format_source_context(source, err.line)))
        .into_iter()
        .filter(|t| !t.kind.is_structural() && t.kind != TokenKind::EndOfInput)
        .map(|t| (t.kind, t.text().to_string()))
        .collect()
}

/// Every token kind, structural markers included.
pub fn token_kinds(source: &str) -> Vec<TokenKind> {
    lex(source)
        .unwrap_or_else(|err| panic!("{}\n{}", err, format_source_context(source, err.line)))
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

/// Parse `source`, panicking with source context on failure.
pub fn parse_ok(source: &str) -> Program {
    parse_source(source).unwrap_or_else(|err| {
        panic!(
            "{}\n{}",
            err,
            format_source_context(source, err.position().line)
        )
    })
}

/// Create an assertion builder for a program.
pub fn assert_ast(program: &Program) -> ProgramAssertion<'_> {
    ProgramAssertion { program }
}

pub struct ProgramAssertion<'a> {
    program: &'a Program,
}

impl<'a> ProgramAssertion<'a> {
    pub fn statement_count(self, expected: usize) -> Self {
        let actual = self.program.body.len();
        assert_eq!(
            actual,
            expected,
            "Expected {} statements, found {}: [{}]",
            expected,
            actual,
            summarize(self.program.body.iter())
        );
        self
    }

    pub fn statement<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(NodeAssertion<'a>),
    {
        let node = self.program.body.get(index).unwrap_or_else(|| {
            panic!(
                "Statement index {} out of bounds (program has {} statements)",
                index,
                self.program.body.len()
            )
        });
        assertion(NodeAssertion {
            node,
            context: format!("body[{}]", index),
        });
        self
    }
}

pub struct NodeAssertion<'a> {
    node: &'a Node,
    context: String,
}

impl<'a> NodeAssertion<'a> {
    pub fn node(&self) -> &'a Node {
        self.node
    }

    pub fn kind(self, expected: &str) -> Self {
        assert_eq!(
            self.node.kind_name(),
            expected,
            "{}: expected a {} node, found {:?}",
            self.context,
            expected,
            self.node.kind
        );
        self
    }

    pub fn identifier(self, expected: &str) -> Self {
        assert_eq!(
            self.node.identifier(),
            Some(expected),
            "{}: expected identifier `{}`, found {:?}",
            self.context,
            expected,
            self.node.kind
        );
        self
    }

    pub fn reference(self, expected: RefKind) -> Self {
        assert_eq!(
            self.node.reference,
            Some(expected),
            "{}: reference kind",
            self.context
        );
        self
    }

    pub fn annotation(self, expected: &str) -> Self {
        assert_eq!(
            self.node.annotation.as_deref(),
            Some(expected),
            "{}: annotation",
            self.context
        );
        self
    }

    pub fn starts_at(self, line: usize, column: usize) -> Self {
        let start = self.node.range.start;
        assert_eq!(
            (start.line, start.column),
            (line, column),
            "{}: start position",
            self.context
        );
        self
    }

    pub fn child_count(self, expected: usize) -> Self {
        let children = self.node.children();
        assert_eq!(
            children.len(),
            expected,
            "{}: expected {} children, found [{}]",
            self.context,
            expected,
            summarize(children.into_iter())
        );
        self
    }

    pub fn child<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(NodeAssertion<'a>),
    {
        let children = self.node.children();
        let child = children.get(index).copied().unwrap_or_else(|| {
            panic!(
                "{}: child index {} out of bounds ({} children)",
                self.context,
                index,
                children.len()
            )
        });
        assertion(NodeAssertion {
            node: child,
            context: format!("{}.children[{}]", self.context, index),
        });
        self
    }

    /// Operator spellings of an infix run, vectorized ones with a leading `.`.
    pub fn operators(self, expected: &[&str]) -> Self {
        let NodeKind::Infix { operators, .. } = &self.node.kind else {
            panic!("{}: expected an infix run, found {:?}", self.context, self.node.kind);
        };
        let actual: Vec<String> = operators
            .iter()
            .map(|d| format!("{}{}", if d.vectorized { "." } else { "" }, d.operator.text()))
            .collect();
        assert_eq!(actual, expected, "{}: operators", self.context);
        self
    }
}

fn summarize<'a>(nodes: impl Iterator<Item = &'a Node>) -> String {
    nodes.map(Node::kind_name).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fluent_assertions() {
        assert_ast(&parse_ok("x = a + b"))
            .statement_count(1)
            .statement(0, |s| {
                s.kind("Assignment")
                    .child_count(2)
                    .child(0, |target| {
                        target.identifier("x");
                    })
                    .child(1, |value| {
                        value.kind("Infix").operators(&["+"]).child_count(2);
                    });
            });
    }

    #[test]
    #[should_panic(expected = "expected a While node")]
    fn test_kind_mismatch_panics() {
        assert_ast(&parse_ok("pass")).statement(0, |s| {
            s.kind("While");
        });
    }

    #[test]
    fn test_significant_tokens_skip_markers() {
        assert_eq!(
            significant_tokens("f(x)"),
            vec![
                (TokenKind::Identifier, "f".to_string()),
                (TokenKind::Punctuator, "(".to_string()),
                (TokenKind::Identifier, "x".to_string()),
                (TokenKind::Punctuator, ")".to_string()),
            ]
        );
    }
}
