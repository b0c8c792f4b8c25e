//! # Parser infrastructure
//!
//! The productions in [`grammar`] are plain recursive-descent functions
//! over a [`ParseState`] that owns the token stream and a cursor into it.
//! Alternatives that need to look further than one token save a
//! [`Checkpoint`] and [`ParseState::rewind`] to it when the attempt dies.
//!
//! Failures are not reported where they are first noticed: a failed
//! alternative near the start of a statement usually says less than the
//! point deepest into the stream that any attempt reached. The state keeps
//! that deepest failure (merging the expectations of attempts that died at
//! the same cursor), and [`grammar::parse`] hands it back when the program
//! as a whole cannot be parsed. No partial tree is ever produced.

mod grammar;

pub use grammar::parse;

use std::fmt;

use lachs::Span;

use crate::lexer::Token;

/// A parse failure: what the grammar wanted, what it got, and where.
///
/// `note` carries freeform context for failures that are not a simple
/// wanted/got mismatch (lexer faults, malformed literals).
#[derive(Debug, Clone)]
pub struct ParseError {
    pub wanted: Vec<String>,
    pub got: Option<String>,
    pub location: Option<Box<Span>>,
    pub note: Option<String>,
}

impl ParseError {
    /// A failure carrying only a freeform explanation.
    pub fn message(note: impl Into<String>) -> Self {
        Self {
            wanted: vec![],
            got: None,
            location: None,
            note: Some(note.into()),
        }
    }

    /// A failure because the grammar wanted `what` at the cursor.
    pub fn wanting(what: impl Into<String>) -> Self {
        Self {
            wanted: vec![what.into()],
            got: None,
            location: None,
            note: None,
        }
    }

    /// Blame the given token: records its description and its span.
    pub fn but_found(mut self, token: &Token) -> Self {
        self.got = Some(token.describe());
        self.location = Some(Box::new(token.pos()));
        self
    }

    /// Blame the end of the token stream.
    pub fn but_found_end(mut self) -> Self {
        self.got = Some("end of input".to_string());
        self
    }

    /// Pin the failure to a span.
    pub fn located(mut self, span: Span) -> Self {
        self.location = Some(Box::new(span));
        self
    }

    /// Fold the expectations of a same-position failure into this one, so
    /// alternatives that died together read as a single `wanted A or B`.
    pub fn absorb(&mut self, other: &ParseError) {
        for want in &other.wanted {
            if !self.wanted.contains(want) {
                self.wanted.push(want.clone());
            }
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = String::new();
        if let Some(note) = &self.note {
            text.push_str(note);
        }
        if !self.wanted.is_empty() {
            if !text.is_empty() {
                text.push_str(": ");
            }
            text.push_str("wanted ");
            for (i, want) in self.wanted.iter().enumerate() {
                if i > 0 {
                    text.push_str(if i + 1 == self.wanted.len() { " or " } else { ", " });
                }
                text.push_str(want);
            }
        }
        if let Some(got) = &self.got {
            text.push_str(", got ");
            text.push_str(got);
        }
        match &self.location {
            Some(span) => write!(f, "{}", span.to_string(&text)),
            None => write!(f, "syntax error: {text}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Result type for parse operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Opaque cursor marker handed out by [`ParseState::checkpoint`] and
/// accepted back by [`ParseState::rewind`].
#[derive(Clone, Copy)]
pub struct Checkpoint(usize);

/// The deepest failure seen so far and how far into the stream it was.
struct Deepest {
    depth: usize,
    error: ParseError,
}

/// Token stream, cursor, and deepest-failure bookkeeping.
pub struct ParseState {
    stream: Vec<Token>,
    cursor: usize,
    deepest: Option<Deepest>,
}

impl ParseState {
    pub fn new(stream: Vec<Token>) -> Self {
        Self {
            stream,
            cursor: 0,
            deepest: None,
        }
    }

    /// Consume and return the token under the cursor.
    pub fn take(&mut self) -> Option<Token> {
        let token = self.stream.get(self.cursor).cloned();
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    /// The token under the cursor, unconsumed.
    pub fn peek(&self) -> Option<&Token> {
        self.stream.get(self.cursor)
    }

    /// Whether the whole stream has been consumed.
    pub fn at_end(&self) -> bool {
        self.cursor >= self.stream.len()
    }

    /// Mark the current cursor so a failed alternative can back out.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.cursor)
    }

    /// Move the cursor back to a previously taken checkpoint.
    pub fn rewind(&mut self, Checkpoint(cursor): Checkpoint) {
        self.cursor = cursor;
    }

    /// The span under the cursor, clamped to the last token once the
    /// stream is exhausted. Stamps AST nodes and error locations.
    pub fn here(&self) -> Span {
        let clamped = self.cursor.min(self.stream.len().saturating_sub(1));
        self.stream.get(clamped).map(Token::pos).unwrap_or(Span {
            start: (0, 0),
            end: (0, 0),
            source: String::new(),
        })
    }

    /// Offer a failure for deepest-failure tracking. Shallower failures
    /// are ignored; one at the same depth merges its expectations.
    pub fn remember(&mut self, error: ParseError) {
        let depth = self.cursor;
        match &mut self.deepest {
            Some(deepest) if depth < deepest.depth => {}
            Some(deepest) if depth == deepest.depth => deepest.error.absorb(&error),
            _ => self.deepest = Some(Deepest { depth, error }),
        }
    }

    /// The failure that made it deepest into the stream, if any.
    pub fn deepest_error(&self) -> Option<&ParseError> {
        self.deepest.as_ref().map(|deepest| &deepest.error)
    }
}
