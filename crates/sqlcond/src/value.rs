//! Bound argument values.
//!
//! [`Value`] is what an argument store holds. Scalars become exactly one
//! placeholder in the built SQL. Compound values are expanded when a statement
//! is built:
//!
//! - [`Value::List`] becomes `?, ?, ?` (nested lists are flattened)
//! - [`Value::Raw`] is inlined verbatim and binds nothing
//! - [`Value::Subquery`] is inlined with its own arguments spliced in place

use crate::session::Statement;
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::num::TryFromIntError;
use std::sync::Arc;

/// A caller-supplied datum bound to a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL
    Null,
    /// Boolean
    Bool(bool),
    /// Integer. Types up to 32 bits convert with `From`; `u64`, `usize`,
    /// `i128` and `u128` go through `Value::try_from`, which fails when the
    /// number does not fit in `i64`.
    Int(i64),
    /// Floating point
    Float(f64),
    /// Text
    Text(String),
    /// Binary data
    Bytes(Vec<u8>),
    /// JSON document
    Json(serde_json::Value),
    /// UUID
    Uuid(uuid::Uuid),
    /// Timestamp with time zone
    Timestamp(DateTime<Utc>),
    /// Calendar date
    Date(NaiveDate),
    /// A list expanded into comma-separated placeholders
    List(Vec<Value>),
    /// SQL inlined verbatim (no binding, no escaping)
    Raw(String),
    /// A built statement inlined with its arguments
    Subquery(Arc<Statement>),
}

impl Value {
    /// Build a [`Value::List`] from any iterator of convertible values.
    pub fn list<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }

    /// Build a [`Value::Raw`].
    ///
    /// # Safety
    /// The text is inlined verbatim. Be careful with SQL injection.
    pub fn raw(sql: impl Into<String>) -> Self {
        Value::Raw(sql.into())
    }

    /// Build a [`Value::Subquery`].
    pub fn subquery(statement: Statement) -> Self {
        Value::Subquery(Arc::new(statement))
    }

    /// Whether this value binds exactly one placeholder as-is.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::List(_) | Value::Raw(_) | Value::Subquery(_))
    }

    /// Check if the value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
            Value::Bytes(v) => {
                f.write_str("0x")?;
                for b in v {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
            Value::Json(v) => write!(f, "{v}"),
            Value::Uuid(v) => write!(f, "{v}"),
            Value::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
            Value::Date(v) => write!(f, "{v}"),
            Value::List(values) => {
                f.write_str("(")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str(")")
            }
            Value::Raw(sql) => f.write_str(sql),
            Value::Subquery(stmt) => write!(f, "({})", stmt.text()),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_try_from_int {
    ($($t:ty),*) => {
        $(
            impl TryFrom<$t> for Value {
                type Error = TryFromIntError;

                fn try_from(v: $t) -> Result<Self, Self::Error> {
                    i64::try_from(v).map(Value::Int)
                }
            }
        )*
    };
}

impl_try_from_int!(isize, usize, u64, i128, u128);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl From<uuid::Uuid> for Value {
    fn from(v: uuid::Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<Statement> for Value {
    fn from(v: Statement) -> Self {
        Value::subquery(v)
    }
}

impl From<Arc<Statement>> for Value {
    fn from(v: Arc<Statement>) -> Self {
        Value::Subquery(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

#[cfg(feature = "postgres")]
mod pg {
    use super::Value;
    use bytes::BytesMut;
    use chrono::{DateTime, NaiveDate, Utc};
    use std::error::Error;
    use tokio_postgres::types::{IsNull, ToSql, Type, WrongType, to_sql_checked};

    type BoxError = Box<dyn Error + Sync + Send>;

    // Encode through `T` only if `T` accepts the column type.
    fn encode<T: ToSql>(v: &T, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        if !T::accepts(ty) {
            return Err(Box::new(WrongType::new::<T>(ty.clone())));
        }
        v.to_sql(ty, out)
    }

    impl ToSql for Value {
        fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
            match self {
                Value::Null => Ok(IsNull::Yes),
                Value::Bool(v) => encode::<bool>(v, ty, out),
                Value::Int(v) => {
                    if *ty == Type::INT2 {
                        encode(&i16::try_from(*v)?, ty, out)
                    } else if *ty == Type::INT4 {
                        encode(&i32::try_from(*v)?, ty, out)
                    } else {
                        encode::<i64>(v, ty, out)
                    }
                }
                Value::Float(v) => {
                    if *ty == Type::FLOAT4 {
                        #[allow(clippy::cast_possible_truncation)]
                        let narrowed = *v as f32;
                        encode(&narrowed, ty, out)
                    } else {
                        encode::<f64>(v, ty, out)
                    }
                }
                Value::Text(v) => encode::<String>(v, ty, out),
                Value::Bytes(v) => encode::<Vec<u8>>(v, ty, out),
                Value::Json(v) => encode::<serde_json::Value>(v, ty, out),
                Value::Uuid(v) => encode::<uuid::Uuid>(v, ty, out),
                Value::Timestamp(v) => encode::<DateTime<Utc>>(v, ty, out),
                Value::Date(v) => encode::<NaiveDate>(v, ty, out),
                Value::List(_) | Value::Raw(_) | Value::Subquery(_) => Err(format!(
                    "compound value cannot be sent as a parameter (build the statement first): {self}"
                )
                .into()),
            }
        }

        /// Any column type, since the variant is only known per value.
        /// `to_sql` rejects a mismatched variant with [`WrongType`].
        fn accepts(_ty: &Type) -> bool {
            true
        }

        to_sql_checked!();
    }
}
