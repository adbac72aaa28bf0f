//! # sqlcond
//!
//! Composable SQL conditions with placeholder/argument alignment.
//!
//! ## Features
//!
//! - **Unbound fragments**: a [`Condition`] carries no session state and can be
//!   compiled against any number of sessions
//! - **Typed placeholders**: compiled text holds tokens, not `?` substrings, so
//!   raw SQL is never mistaken for a placeholder
//! - **Order isomorphism**: the Nth placeholder of a built statement always binds
//!   the Nth returned argument, however the fragments were composed
//! - **Subqueries as values**: a built [`Statement`] can be bound like any other
//!   value and is spliced in place with its own arguments
//! - **Placeholder flavors**: `?`, `$n`, `@pn`, `:n`, chosen at build time
//!
//! ## Example
//!
//! ```ignore
//! use sqlcond::{Condition, Flavor, Session, SqlText};
//!
//! let mut s = Session::with_flavor(Flavor::PostgreSql);
//! let status = s.compile(&Condition::in_list("status", [1, 2, 5]));
//! let either = s.or([SqlText::raw("id_card IS NULL"), status]);
//! let text = SqlText::raw("SELECT * FROM demo.user WHERE ").then(either);
//!
//! let (sql, args) = s.finish(text)?.build();
//! assert_eq!(sql, "SELECT * FROM demo.user WHERE (id_card IS NULL OR status IN ($1, $2, $3))");
//! assert_eq!(args.len(), 3);
//! # Ok::<(), sqlcond::CondError>(())
//! ```

pub mod args;
pub mod buffer;
pub mod condition;
pub mod config;
pub mod delete;
pub mod error;
pub mod flavor;
pub mod ident;
pub mod session;
pub mod text;
pub mod value;

pub use args::{Args, Token};
pub use buffer::TextBuffer;
pub use condition::{CompareOp, Condition, Logic, Operator, Quantifier};
pub use config::SessionConfig;
pub use delete::{DeleteBuilder, Order, delete_from};
pub use error::{CondError, CondResult};
pub use flavor::Flavor;
pub use ident::{Field, Ident, IdentPart, escape, escape_all};
pub use session::{Session, Statement};
pub use text::SqlText;
pub use value::Value;
