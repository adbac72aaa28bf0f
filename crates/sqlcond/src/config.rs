//! Session configuration.

use crate::flavor::Flavor;
use serde::Deserialize;

/// Default number of SQL characters included in log events.
pub const DEFAULT_MAX_LOGGED_SQL: usize = 200;

/// Configuration applied to every statement a session seals.
///
/// Can be deserialized from any serde format; missing fields take their
/// defaults.
///
/// ```ignore
/// let config = SessionConfig::new()
///     .with_flavor(Flavor::PostgreSql)
///     .with_max_args(65_535);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Placeholder flavor used by [`Statement::build`](crate::Statement::build).
    pub flavor: Flavor,
    /// Upper bound on expanded arguments per statement. `None` means no limit (default).
    pub max_args: Option<usize>,
    /// Truncate SQL in log events to this many characters. `None` logs it in full.
    pub max_logged_sql: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            flavor: Flavor::default(),
            max_args: None,
            max_logged_sql: Some(DEFAULT_MAX_LOGGED_SQL),
        }
    }
}

impl SessionConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the placeholder flavor.
    pub fn with_flavor(mut self, flavor: Flavor) -> Self {
        self.flavor = flavor;
        self
    }

    /// Set the argument limit.
    ///
    /// Sealing a statement that expands to more arguments fails with
    /// [`CondError::TooManyArguments`](crate::CondError::TooManyArguments).
    pub fn with_max_args(mut self, limit: usize) -> Self {
        self.max_args = Some(limit);
        self
    }

    /// Remove the argument limit.
    pub fn without_max_args(mut self) -> Self {
        self.max_args = None;
        self
    }

    /// Set how much SQL is included in log events.
    pub fn with_max_logged_sql(mut self, chars: usize) -> Self {
        self.max_logged_sql = Some(chars);
        self
    }

    /// Log SQL in full.
    pub fn with_full_sql_logging(mut self) -> Self {
        self.max_logged_sql = None;
        self
    }

    /// Check an expanded argument count against the limit.
    pub(crate) fn check_arg_count(&self, got: usize) -> crate::CondResult<()> {
        match self.max_args {
            Some(limit) if got > limit => Err(crate::CondError::TooManyArguments { limit, got }),
            _ => Ok(()),
        }
    }

    /// SQL as it should appear in logs.
    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    pub(crate) fn truncate_for_log<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.max_logged_sql {
            Some(max) if sql.chars().count() > max => {
                let cut: String = sql.chars().take(max).collect();
                std::borrow::Cow::Owned(format!("{cut}..."))
            }
            _ => std::borrow::Cow::Borrowed(sql),
        }
    }
}
