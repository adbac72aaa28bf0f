//! Fragment compiler and sealed statements.
//!
//! A [`Session`] pairs one [`Args`] store with one [`TextBuffer`] and is
//! scoped to a single statement under construction. Compiling a condition
//! binds its operands through the store and returns the rendered
//! [`SqlText`]; texts compiled against the same session can be combined in
//! any order. Sealing the final text produces a [`Statement`], which picks the
//! concrete placeholder syntax when it is built.

use crate::args::{Args, Token};
use crate::buffer::TextBuffer;
use crate::condition::Condition;
use crate::config::SessionConfig;
use crate::error::{CondError, CondResult};
use crate::flavor::Flavor;
use crate::text::{Part, SqlText};
use crate::value::Value;
use std::sync::Arc;

/// Per-statement compilation scope.
///
/// Not meant to be shared across threads; use one session per statement.
///
/// Cloning forks the store. The clone keeps the values bound so far under a
/// new id, so text compiled against either session is rejected by the other.
#[derive(Debug, Clone, Default)]
pub struct Session {
    args: Args,
    buf: TextBuffer,
    config: SessionConfig,
}

impl Session {
    /// Create a session with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session that builds with `flavor`.
    pub fn with_flavor(flavor: Flavor) -> Self {
        Self::with_config(SessionConfig::new().with_flavor(flavor))
    }

    /// Create a session from a configuration.
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            args: Args::new(),
            buf: TextBuffer::new(),
            config,
        }
    }

    /// Compile one condition against this session.
    ///
    /// Binds exactly one value per operand, in declaration order, and places
    /// each token where it was bound.
    pub fn compile(&mut self, cond: &Condition) -> SqlText {
        self.buf.reset();
        cond.write_before(&mut self.buf);
        for (idx, value) in cond.operands().iter().enumerate() {
            let token = self.args.add(value.clone());
            cond.write_operand(&mut self.buf, idx, token);
        }
        cond.write_after(&mut self.buf);

        #[cfg(feature = "tracing")]
        tracing::trace!(
            target: "sqlcond.sql",
            kind = cond.kind(),
            bound = cond.operands().len(),
            total = self.args.len(),
            "compiled condition"
        );

        self.buf.take()
    }

    /// Compile each condition and join the results with ` AND `.
    pub fn compile_and(&mut self, conds: &[Condition]) -> SqlText {
        let texts: Vec<SqlText> = conds.iter().map(|c| self.compile(c)).collect();
        self.buf.reset();
        self.buf.write_joined(&texts, " AND ");
        self.buf.take()
    }

    /// `(a AND b ...)` over texts compiled against this session.
    pub fn and<T: Into<SqlText>>(&mut self, exprs: impl IntoIterator<Item = T>) -> SqlText {
        self.compile(&Condition::and(exprs))
    }

    /// `(a OR b ...)` over texts compiled against this session.
    pub fn or<T: Into<SqlText>>(&mut self, exprs: impl IntoIterator<Item = T>) -> SqlText {
        self.compile(&Condition::or(exprs))
    }

    /// Bind a single value and return its token as text.
    ///
    /// ```ignore
    /// let text = SqlText::raw("modified_at > created_at + ").then(session.var(86400));
    /// ```
    pub fn var(&mut self, value: impl Into<Value>) -> SqlText {
        SqlText::token(self.args.add(value))
    }

    /// Bound values so far.
    pub fn args(&self) -> &Args {
        &self.args
    }

    /// Flavor used by statements sealed from this session.
    pub fn flavor(&self) -> Flavor {
        self.config.flavor
    }

    /// Active configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Seal `text` into a statement, keeping the session usable.
    pub fn statement(&self, text: SqlText) -> CondResult<Statement> {
        seal(text, self.args.snapshot(), &self.config)
    }

    /// Seal `text` into a statement, consuming the session.
    pub fn finish(self, text: SqlText) -> CondResult<Statement> {
        seal(text, self.args, &self.config)
    }
}

fn seal(text: SqlText, args: Args, config: &SessionConfig) -> CondResult<Statement> {
    let result = validate(&text, &args).map(|()| Statement {
        text,
        args: Arc::new(args),
        flavor: config.flavor,
    });
    let result = result.and_then(|stmt| {
        config.check_arg_count(stmt.arg_count())?;
        Ok(stmt)
    });

    #[cfg(feature = "tracing")]
    log_seal(&result, config);

    result
}

#[cfg(feature = "tracing")]
fn log_seal(result: &CondResult<Statement>, config: &SessionConfig) {
    match result {
        Ok(stmt) => {
            if tracing::enabled!(target: "sqlcond.sql", tracing::Level::DEBUG) {
                let (sql, values) = stmt.build();
                tracing::debug!(
                    target: "sqlcond.sql",
                    flavor = %stmt.flavor,
                    param_count = values.len(),
                    sql = %config.truncate_for_log(&sql),
                    "sealed statement"
                );
            }
        }
        Err(err) => {
            tracing::warn!(target: "sqlcond.sql", error = %err, "failed to seal statement");
        }
    }
}

fn validate(text: &SqlText, args: &Args) -> CondResult<()> {
    match text.tokens().find(|t| !args.owns(*t)) {
        Some(token) => Err(CondError::ForeignArgument {
            expected: args.id(),
            found: token.store(),
        }),
        None => Ok(()),
    }
}

/// A sealed statement: rendered text plus the store its tokens refer to.
///
/// Every token in a statement belongs to its own store. Building resolves
/// tokens left to right, so the Nth placeholder always binds the Nth value
/// returned, regardless of the order the fragments were compiled in.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    text: SqlText,
    args: Arc<Args>,
    flavor: Flavor,
}

impl Statement {
    /// Rendered text (tokens shown as `?`).
    pub fn text(&self) -> &SqlText {
        &self.text
    }

    /// Flavor used by [`build`](Statement::build).
    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// Number of arguments [`build`](Statement::build) returns.
    pub fn arg_count(&self) -> usize {
        self.text
            .tokens()
            .filter_map(|t| self.args.get(t))
            .map(expanded_len)
            .sum()
    }

    /// Build SQL and arguments with the statement's own flavor.
    pub fn build(&self) -> (String, Vec<Value>) {
        self.build_with_flavor(self.flavor)
    }

    /// Build SQL and arguments with `flavor`. Placeholder numbering starts at 1.
    pub fn build_with_flavor(&self, flavor: Flavor) -> (String, Vec<Value>) {
        let mut sql = String::new();
        let mut values = Vec::new();
        self.resolve(flavor, &mut sql, &mut values);
        (sql, values)
    }

    fn resolve(&self, flavor: Flavor, sql: &mut String, values: &mut Vec<Value>) {
        for part in self.text.parts() {
            match part {
                Part::Raw(s) => sql.push_str(s),
                Part::Arg(token) => self.resolve_token(*token, flavor, sql, values),
            }
        }
    }

    fn resolve_token(&self, token: Token, flavor: Flavor, sql: &mut String, values: &mut Vec<Value>) {
        // Sealing guarantees ownership.
        if let Some(value) = self.args.get(token) {
            resolve_value(value, flavor, sql, values);
        }
    }
}

fn resolve_value(value: &Value, flavor: Flavor, sql: &mut String, values: &mut Vec<Value>) {
    match value {
        Value::List(items) => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                resolve_value(item, flavor, sql, values);
            }
        }
        Value::Raw(raw) => sql.push_str(raw),
        Value::Subquery(stmt) => stmt.resolve(flavor, sql, values),
        scalar => {
            values.push(scalar.clone());
            flavor.write_placeholder(sql, values.len());
        }
    }
}

fn expanded_len(value: &Value) -> usize {
    match value {
        Value::List(items) => items.iter().map(expanded_len).sum(),
        Value::Raw(_) => 0,
        Value::Subquery(stmt) => stmt.arg_count(),
        _ => 1,
    }
}
