//! Parser engine
//!
//! The [`Parser`] owns the cursor over the token sequence and exposes the
//! combinator algebra every grammar rule is built from:
//!
//! | combinator | succeeds when | consumes |
//! |---|---|---|
//! | [`Parser::literal`] | next token is spelled `text` | the token |
//! | [`Parser::alt`] | the first successful alternative | what it consumed |
//! | [`Parser::more`] | the rule matches at least once | all matches |
//! | [`Parser::optmore`] | always | all matches |
//! | [`Parser::opt`] | always | the match, if any |
//! | [`Parser::and`] | the rule would succeed | nothing |
//! | [`Parser::not`] | the rule would fail | nothing |
//! | [`Parser::eoi`] | the cursor is at the end | nothing |
//!
//! Rules return [`ParseResult`]: `Ok(Some(_))` on success, `Ok(None)` on an
//! ordinary (backtrackable) failure and `Err(_)` on a fatal error. Every
//! combinator saves a [`Snapshot`] on entry and restores it verbatim on
//! failure, so a failed rule leaves no trace in the cursor.
//!
//! Rules registered through [`Parser::memo`] are cached by
//! `(token position, rule name)`. The cache lives and dies with the parser,
//! one parser per top-level parse.

use super::error::ParseError;
use crate::astro::ast::nodes::Node;
use crate::astro::ast::range::{Position, Range};
use crate::astro::lexing::tokens::{Token, TokenKind};
use std::collections::{BTreeSet, HashMap};
use tracing::trace;

pub type ParseResult<T> = Result<Option<T>, ParseError>;

/// A grammar rule usable in [`Parser::alt`] and [`Parser::memo`].
pub type Rule<'t, T> = fn(&mut Parser<'t>) -> ParseResult<T>;

/// Backtracking state. `position` indexes the parser's token list and
/// `line`/`column` are the end of the last consumed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub position: usize,
    pub line: usize,
    pub column: usize,
    pub indent_level: usize,
}

/// Where a node starts, taken before its first token is consumed.
#[derive(Debug, Clone, Copy)]
pub struct Start {
    offset: usize,
    position: Position,
}

/// A cached rule result.
#[derive(Debug, Clone)]
pub enum Fragment {
    Node(Node),
    Nodes(Vec<Node>),
}

/// Rule outputs that can be stored in the memo table.
pub trait Memoize: Clone {
    fn into_fragment(self) -> Fragment;
    fn from_fragment(fragment: &Fragment) -> Option<Self>;
}

impl Memoize for Node {
    fn into_fragment(self) -> Fragment {
        Fragment::Node(self)
    }

    fn from_fragment(fragment: &Fragment) -> Option<Self> {
        match fragment {
            Fragment::Node(node) => Some(node.clone()),
            Fragment::Nodes(_) => None,
        }
    }
}

impl Memoize for Vec<Node> {
    fn into_fragment(self) -> Fragment {
        Fragment::Nodes(self)
    }

    fn from_fragment(fragment: &Fragment) -> Option<Self> {
        match fragment {
            Fragment::Nodes(nodes) => Some(nodes.clone()),
            Fragment::Node(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
struct MemoEntry {
    /// Tracked indentation level when the rule was first tried here.
    entry_level: usize,
    /// The result and the cursor state right after it, or `None` on failure.
    outcome: Option<(Fragment, Snapshot)>,
}

impl MemoEntry {
    fn consumed(&self, from: usize) -> usize {
        self.outcome
            .as_ref()
            .map_or(0, |(_, end)| end.position - from)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

pub struct Parser<'t> {
    tokens: Vec<&'t Token>,
    state: Snapshot,
    memo: HashMap<(usize, &'static str), MemoEntry>,
    hits: usize,
    misses: usize,
    /// Furthest token position at which a token match failed, with what was
    /// expected there.
    furthest: usize,
    expected: BTreeSet<String>,
}

impl<'t> Parser<'t> {
    /// Comments are invisible to the grammar and are dropped here.
    pub fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens: tokens.iter().filter(|t| !t.kind.is_comment()).collect(),
            state: Snapshot {
                position: 0,
                line: 1,
                column: 0,
                indent_level: 0,
            },
            memo: HashMap::new(),
            hits: 0,
            misses: 0,
            furthest: 0,
            expected: BTreeSet::new(),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        self.state = snapshot;
    }

    pub fn indent_level(&self) -> usize {
        self.state.indent_level
    }

    pub fn memo_stats(&self) -> MemoStats {
        MemoStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.memo.len(),
        }
    }

    pub(super) fn enter_level(&mut self) {
        self.state.indent_level += 1;
    }

    pub(super) fn leave_level(&mut self) {
        self.state.indent_level = self.state.indent_level.saturating_sub(1);
    }

    // ----- cursor ---------------------------------------------------------

    fn significant_index(&self, mut index: usize) -> usize {
        while self
            .tokens
            .get(index)
            .is_some_and(|t| t.kind == TokenKind::NoSpace)
        {
            index += 1;
        }
        index
    }

    /// The next token that is not a no-space marker.
    pub fn peek(&self) -> Option<&'t Token> {
        self.tokens
            .get(self.significant_index(self.state.position))
            .copied()
    }

    pub fn at(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|t| t.kind == kind)
    }

    /// True when the next raw token is a no-space marker, i.e. the previous
    /// token touches the next one.
    pub fn touching(&self) -> bool {
        self.tokens
            .get(self.state.position)
            .is_some_and(|t| t.kind == TokenKind::NoSpace)
    }

    /// The last token consumed, skipping no-space markers.
    pub fn previous(&self) -> Option<&'t Token> {
        self.tokens[..self.state.position]
            .iter()
            .rev()
            .find(|t| t.kind != TokenKind::NoSpace)
            .copied()
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let index = self.significant_index(self.state.position);
        let token = *self.tokens.get(index)?;
        self.state.position = index + 1;
        self.state.line = token.stop_line();
        self.state.column = token.stop_col();
        Some(token)
    }

    fn note_failure(&mut self, expected: impl Into<String>) {
        let at = self.significant_index(self.state.position);
        if at > self.furthest {
            self.furthest = at;
            self.expected.clear();
        }
        if at == self.furthest {
            self.expected.insert(expected.into());
        }
    }

    // ----- token matchers --------------------------------------------------

    /// Match a keyword, operator, punctuator or identifier spelled `text`.
    pub fn literal(&mut self, text: &str) -> ParseResult<&'t Token> {
        self.token_if(&format!("`{}`", text), |t| {
            matches!(
                t.kind,
                TokenKind::Keyword
                    | TokenKind::Operator
                    | TokenKind::Punctuator
                    | TokenKind::Identifier
            ) && t.is_exactly(text)
        })
    }

    pub fn kind(&mut self, kind: TokenKind) -> ParseResult<&'t Token> {
        self.token_if(&kind.to_string(), |t| t.kind == kind)
    }

    pub fn token_if(
        &mut self,
        expected: &str,
        accept: impl Fn(&Token) -> bool,
    ) -> ParseResult<&'t Token> {
        match self.peek() {
            Some(token) if accept(token) => Ok(self.advance()),
            _ => {
                self.note_failure(expected);
                Ok(None)
            }
        }
    }

    /// Consume a no-space marker.
    pub fn no_space(&mut self) -> ParseResult<()> {
        if self.touching() {
            self.state.position += 1;
            Ok(Some(()))
        } else {
            self.note_failure("no space");
            Ok(None)
        }
    }

    /// Succeeds without consuming when the next token does not touch the
    /// previous one.
    pub fn spaced(&mut self) -> ParseResult<()> {
        self.not(Self::no_space)
    }

    // ----- combinators -----------------------------------------------------

    /// Run `rule`, restoring the snapshot if it fails.
    pub fn attempt<T>(&mut self, rule: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        let start = self.snapshot();
        let result = rule(self)?;
        if result.is_none() {
            self.restore(start);
        }
        Ok(result)
    }

    pub fn alt<T>(&mut self, rules: &[Rule<'t, T>]) -> ParseResult<T> {
        let start = self.snapshot();
        for rule in rules {
            if let Some(value) = self.attempt(*rule)? {
                return Ok(Some(value));
            }
        }
        self.restore(start);
        Ok(None)
    }

    /// One or more.
    pub fn more<T>(&mut self, rule: impl FnMut(&mut Self) -> ParseResult<T>) -> ParseResult<Vec<T>> {
        let items = self.optmore(rule)?;
        Ok((!items.is_empty()).then_some(items))
    }

    /// Zero or more. Stops on a match that consumed nothing.
    pub fn optmore<T>(
        &mut self,
        mut rule: impl FnMut(&mut Self) -> ParseResult<T>,
    ) -> Result<Vec<T>, ParseError> {
        let mut items = Vec::new();
        loop {
            let before = self.state.position;
            match self.attempt(&mut rule)? {
                Some(item) => {
                    items.push(item);
                    if self.state.position == before {
                        break;
                    }
                }
                None => break,
            }
        }
        Ok(items)
    }

    /// `item (separator item)* separator?`, possibly empty.
    pub fn separated<T>(
        &mut self,
        mut item: impl FnMut(&mut Self) -> ParseResult<T>,
        separator: &str,
    ) -> Result<Vec<T>, ParseError> {
        let mut items = Vec::new();
        let Some(first) = self.attempt(&mut item)? else {
            return Ok(items);
        };
        items.push(first);
        while self.literal(separator)?.is_some() {
            match self.attempt(&mut item)? {
                Some(next) => items.push(next),
                None => break,
            }
        }
        Ok(items)
    }

    /// Zero or one.
    pub fn opt<T>(
        &mut self,
        rule: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> Result<Option<T>, ParseError> {
        self.attempt(rule)
    }

    /// Positive lookahead.
    pub fn and<T>(&mut self, rule: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<()> {
        let start = self.snapshot();
        let result = rule(self)?;
        self.restore(start);
        Ok(result.map(|_| ()))
    }

    /// Negative lookahead.
    pub fn not<T>(&mut self, rule: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<()> {
        let start = self.snapshot();
        let result = rule(self)?;
        self.restore(start);
        Ok(result.is_none().then_some(()))
    }

    pub fn eoi(&mut self) -> ParseResult<()> {
        match self.peek() {
            None => Ok(Some(())),
            Some(token) if token.kind == TokenKind::EndOfInput => Ok(Some(())),
            Some(_) => {
                self.note_failure("end of input");
                Ok(None)
            }
        }
    }

    /// Run `rule` through the memo table under `name`.
    ///
    /// A hit replays the cached outcome and jumps the cursor to the cached
    /// end state. Entries are only reused at the indentation level they
    /// were recorded at. Fatal errors are never cached.
    pub fn memo<T: Memoize>(&mut self, name: &'static str, rule: Rule<'t, T>) -> ParseResult<T> {
        let key = (self.state.position, name);
        let level = self.state.indent_level;

        if let Some(entry) = self.memo.get(&key).filter(|e| e.entry_level == level) {
            match &entry.outcome {
                None => {
                    self.hits += 1;
                    trace!(rule = name, position = key.0, "memo hit (failure)");
                    return Ok(None);
                }
                Some((fragment, end)) => {
                    if let Some(value) = T::from_fragment(fragment) {
                        self.hits += 1;
                        trace!(
                            rule = name,
                            position = key.0,
                            consumed = entry.consumed(key.0),
                            "memo hit"
                        );
                        self.state = *end;
                        return Ok(Some(value));
                    }
                }
            }
        }

        self.misses += 1;
        let result = self.attempt(rule)?;
        let outcome = result
            .as_ref()
            .map(|value| (value.clone().into_fragment(), self.state));
        self.memo.insert(
            key,
            MemoEntry {
                entry_level: level,
                outcome,
            },
        );
        Ok(result)
    }

    // ----- ranges ------------------------------------------------------------

    pub fn start(&self) -> Start {
        match self.peek() {
            Some(token) => Start {
                offset: token.range.span.start,
                position: token.start(),
            },
            None => Start {
                offset: self.previous().map_or(0, |t| t.range.span.end),
                position: Position::new(self.state.line, self.state.column),
            },
        }
    }

    /// Range from `start` to the end of the last consumed text-bearing token.
    pub fn range_from(&self, start: Start) -> Range {
        let last = self.tokens[..self.state.position]
            .iter()
            .rev()
            .find(|t| !t.kind.is_structural());
        match last {
            Some(token) if token.range.span.end >= start.offset => Range::new(
                start.offset..token.range.span.end,
                start.position,
                token.end(),
            ),
            _ => Range::empty(start.offset, start.position),
        }
    }

    pub fn node(&self, kind: crate::astro::ast::nodes::NodeKind, start: Start) -> Node {
        Node::new(kind, self.range_from(start))
    }

    // ----- errors ------------------------------------------------------------

    fn describe(token: Option<&Token>) -> String {
        match token {
            None => "end of input".to_string(),
            Some(token) => match &token.text {
                Some(text) => format!("`{}`", text),
                None => token.kind.to_string(),
            },
        }
    }

    /// A fatal error at the next token.
    pub fn error_here(&self, message: impl Into<String>) -> ParseError {
        let position = self.peek().map_or(
            Position::new(self.state.line, self.state.column),
            |t| t.start(),
        );
        ParseError::new(position, message)
    }

    /// Error describing the furthest point any token match reached.
    pub fn unexpected(&self) -> ParseError {
        let at = self.furthest.max(self.significant_index(self.state.position));
        let token = self.tokens.get(at).copied();
        let position = token.map_or(
            Position::new(self.state.line, self.state.column),
            |t| t.start(),
        );
        let mut message = format!("unexpected {}", Self::describe(token));
        if at == self.furthest && !self.expected.is_empty() {
            let expected: Vec<&str> = self.expected.iter().map(String::as_str).take(8).collect();
            message.push_str(&format!("; expected {}", expected.join(", ")));
        }
        ParseError::new(position, message)
    }

    /// Run a rule past a commitment point: failure becomes fatal.
    ///
    /// When a nested match got further than the current token before
    /// failing, the error points there instead.
    pub fn required<T>(
        &mut self,
        rule: impl FnOnce(&mut Self) -> ParseResult<T>,
        message: impl AsRef<str>,
    ) -> Result<T, ParseError> {
        let here = self.significant_index(self.state.position);
        match self.attempt(rule)? {
            Some(value) => Ok(value),
            None if self.furthest > here => {
                let err = self.unexpected();
                trace!(%err, "commitment failed past the current token");
                Err(err)
            }
            None => {
                let found = Self::describe(self.peek());
                let err = self.error_here(format!("{}, found {}", message.as_ref(), found));
                trace!(%err, "commitment failed");
                Err(err)
            }
        }
    }
}
