//! Error types for sqlcond

use thiserror::Error;

/// Result type alias for sqlcond operations
pub type CondResult<T> = Result<T, CondError>;

/// Errors raised while constructing conditions or sealing statements.
///
/// Rendering itself never fails; every variant here is a programmer error
/// detected either at construction time or when a statement is sealed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CondError {
    /// Identifier rejected by the strict parser
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Unknown operator spelling
    #[error("Invalid operator: {0}")]
    InvalidOperator(String),

    /// Wrong operand count for a fixed-arity operator
    #[error("Operator {operator} expects {expected} operand(s), got {got}")]
    InvalidArgumentCount {
        operator: &'static str,
        expected: &'static str,
        got: usize,
    },

    /// A placeholder in the text was bound by a different session
    #[error("Placeholder bound by session #{found} used in session #{expected}")]
    ForeignArgument { expected: u64, found: u64 },

    /// Expanded argument list exceeds the configured limit
    #[error("Statement binds {got} arguments, limit is {limit}")]
    TooManyArguments { limit: usize, got: usize },

    /// Unknown placeholder flavor name
    #[error("Unknown flavor: {0}")]
    UnknownFlavor(String),
}

impl CondError {
    /// Create an invalid identifier error
    pub fn invalid_identifier(message: impl Into<String>) -> Self {
        Self::InvalidIdentifier(message.into())
    }

    /// Create an invalid operator error
    pub fn invalid_operator(message: impl Into<String>) -> Self {
        Self::InvalidOperator(message.into())
    }

    /// Check if this is an invalid identifier error
    pub fn is_invalid_identifier(&self) -> bool {
        matches!(self, Self::InvalidIdentifier(_))
    }

    /// Check if this is an arity error
    pub fn is_invalid_argument_count(&self) -> bool {
        matches!(self, Self::InvalidArgumentCount { .. })
    }

    /// Check if this is a cross-session composition error
    pub fn is_foreign_argument(&self) -> bool {
        matches!(self, Self::ForeignArgument { .. })
    }
}
