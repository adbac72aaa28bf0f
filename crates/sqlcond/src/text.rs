//! Rendered SQL text with typed placeholder tokens.
//!
//! A compiled condition is a [`SqlText`]: raw SQL pieces interleaved with
//! [`Token`]s. Raw pieces are never scanned, so caller-supplied SQL can contain
//! `?`, `$1` or anything else without being mistaken for a placeholder. The
//! concrete placeholder syntax is only chosen when a statement is built.

use crate::args::Token;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Part {
    Raw(String),
    Arg(Token),
}

/// SQL text that may contain placeholder tokens.
#[must_use]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlText {
    parts: Vec<Part>,
}

impl SqlText {
    /// Create an empty text.
    pub fn new() -> Self {
        Self { parts: Vec::new() }
    }

    /// Create a text from raw SQL, taken verbatim.
    pub fn raw(sql: impl Into<String>) -> Self {
        let mut text = Self::new();
        text.push_raw(sql.into());
        text
    }

    /// Create a text holding a single token.
    pub fn token(token: Token) -> Self {
        Self {
            parts: vec![Part::Arg(token)],
        }
    }

    /// Append raw SQL.
    pub fn push_str(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }
        match self.parts.last_mut() {
            Some(Part::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(Part::Raw(sql.to_string())),
        }
        self
    }

    fn push_raw(&mut self, sql: String) {
        if sql.is_empty() {
            return;
        }
        match self.parts.last_mut() {
            Some(Part::Raw(last)) => last.push_str(&sql),
            _ => self.parts.push(Part::Raw(sql)),
        }
    }

    /// Append a placeholder token.
    pub fn push_token(&mut self, token: Token) -> &mut Self {
        self.parts.push(Part::Arg(token));
        self
    }

    /// Append a copy of another text.
    pub fn push_text(&mut self, other: &SqlText) -> &mut Self {
        for part in &other.parts {
            match part {
                Part::Raw(s) => {
                    self.push_str(s);
                }
                Part::Arg(t) => {
                    self.push_token(*t);
                }
            }
        }
        self
    }

    /// Append another text, consuming it.
    pub fn append(&mut self, other: SqlText) -> &mut Self {
        for part in other.parts {
            match part {
                Part::Raw(s) => self.push_raw(s),
                Part::Arg(t) => self.parts.push(Part::Arg(t)),
            }
        }
        self
    }

    /// Consuming form of [`append`](SqlText::append), for chaining.
    ///
    /// ```ignore
    /// let text = SqlText::raw("modified_at > created_at + ").then(session.var(86400));
    /// ```
    pub fn then(mut self, other: impl Into<SqlText>) -> Self {
        self.append(other.into());
        self
    }

    /// Check if the text has no content.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Number of placeholder tokens.
    pub fn placeholder_count(&self) -> usize {
        self.tokens().count()
    }

    /// Tokens in left-to-right order.
    pub fn tokens(&self) -> impl Iterator<Item = Token> + '_ {
        self.parts.iter().filter_map(|p| match p {
            Part::Arg(t) => Some(*t),
            Part::Raw(_) => None,
        })
    }

    pub(crate) fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Move tokens issued by store `from` over to store `to`.
    pub(crate) fn rebind(&mut self, from: u64, to: u64) {
        for part in &mut self.parts {
            if let Part::Arg(token) = part
                && token.store() == from
            {
                *token = token.with_store(to);
            }
        }
    }
}

/// Debug view: tokens are shown as `?`.
impl fmt::Display for SqlText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            match part {
                Part::Raw(s) => f.write_str(s)?,
                Part::Arg(_) => f.write_str("?")?,
            }
        }
        Ok(())
    }
}

impl From<&str> for SqlText {
    fn from(sql: &str) -> Self {
        Self::raw(sql)
    }
}

impl From<String> for SqlText {
    fn from(sql: String) -> Self {
        Self::raw(sql)
    }
}

impl From<Token> for SqlText {
    fn from(token: Token) -> Self {
        Self::token(token)
    }
}
