//! Condition fragments.
//!
//! A [`Condition`] is an unbound predicate: an escaped field, an operator and
//! the operand values. It holds no reference to any argument store, so the
//! same condition can be compiled against any number of sessions.
//!
//! Every variant renders through the same three phases:
//!
//! | Variant | Before | Operands | After |
//! |---|---|---|---|
//! | comparison | `field op ` | one token | |
//! | membership | `field IN (` | tokens joined by `, ` | `)` |
//! | null check | `field IS [NOT ]NULL` | | |
//! | range | `field BETWEEN ` | token ` AND ` token | |
//! | combinator | `(` children joined by ` AND `/` OR ` | | `)` |
//! | existence | `[NOT ]EXISTS (` | one token | `)` |
//! | quantified | `field op ANY (` | tokens joined by `, ` | `)` |
//! | raw | text as-is | | |
//!
//! # Example
//! ```ignore
//! use sqlcond::{Condition, Session};
//!
//! let cond = Condition::in_list("status", [1, 2, 5]);
//! let mut session = Session::new();
//! assert_eq!(session.compile(&cond).to_string(), "status IN (?, ?, ?)");
//! ```

use crate::args::Token;
use crate::buffer::TextBuffer;
use crate::error::{CondError, CondResult};
use crate::ident::Field;
use crate::text::SqlText;
use crate::value::Value;
use std::fmt;
use std::str::FromStr;

/// Binary comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
}

impl CompareOp {
    /// SQL spelling.
    pub fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Like => "LIKE",
            CompareOp::NotLike => "NOT LIKE",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for CompareOp {
    type Err = CondError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_op(s);
        match normalized.as_str() {
            "=" => Ok(CompareOp::Eq),
            "<>" | "!=" => Ok(CompareOp::Ne),
            ">" => Ok(CompareOp::Gt),
            ">=" => Ok(CompareOp::Gte),
            "<" => Ok(CompareOp::Lt),
            "<=" => Ok(CompareOp::Lte),
            "LIKE" => Ok(CompareOp::Like),
            "NOT LIKE" => Ok(CompareOp::NotLike),
            _ => Err(CondError::invalid_operator(s)),
        }
    }
}

/// Quantifier for `op ANY (...)` style comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantifier {
    Any,
    All,
    Some,
}

impl Quantifier {
    /// SQL keyword.
    pub fn as_sql(self) -> &'static str {
        match self {
            Quantifier::Any => "ANY",
            Quantifier::All => "ALL",
            Quantifier::Some => "SOME",
        }
    }
}

/// Boolean combinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Logic {
    And,
    Or,
}

impl Logic {
    /// Separator placed between children.
    pub fn separator(self) -> &'static str {
        match self {
            Logic::And => " AND ",
            Logic::Or => " OR ",
        }
    }
}

/// Operator selected at runtime, for [`Condition::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Compare(CompareOp),
    In,
    NotIn,
    IsNull,
    IsNotNull,
    Between,
    NotBetween,
    Exists,
    NotExists,
    Quantified(CompareOp, Quantifier),
}

impl Operator {
    fn name(self) -> &'static str {
        match self {
            Operator::Compare(op) => op.as_sql(),
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
            Operator::Between => "BETWEEN",
            Operator::NotBetween => "NOT BETWEEN",
            Operator::Exists => "EXISTS",
            Operator::NotExists => "NOT EXISTS",
            Operator::Quantified(_, q) => q.as_sql(),
        }
    }
}

impl FromStr for Operator {
    type Err = CondError;

    /// Accepts SQL spellings such as `=`, `!=`, `not in`, `is not null`,
    /// `between`, `exists` and quantified forms like `> ANY`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_op(s);
        let op = match normalized.as_str() {
            "IN" => Operator::In,
            "NOT IN" => Operator::NotIn,
            "IS NULL" => Operator::IsNull,
            "IS NOT NULL" => Operator::IsNotNull,
            "BETWEEN" => Operator::Between,
            "NOT BETWEEN" => Operator::NotBetween,
            "EXISTS" => Operator::Exists,
            "NOT EXISTS" => Operator::NotExists,
            other => {
                let quantified = [
                    (" ANY", Quantifier::Any),
                    (" ALL", Quantifier::All),
                    (" SOME", Quantifier::Some),
                ]
                .into_iter()
                .find_map(|(suffix, q)| other.strip_suffix(suffix).map(|cmp| (cmp, q)));

                match quantified {
                    Some((cmp, q)) => Operator::Quantified(
                        cmp.parse().map_err(|_| CondError::invalid_operator(s))?,
                        q,
                    ),
                    None => Operator::Compare(
                        other.parse().map_err(|_| CondError::invalid_operator(s))?,
                    ),
                }
            }
        };
        Ok(op)
    }
}

// Uppercase and collapse runs of whitespace.
fn normalize_op(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_ascii_uppercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq)]
enum ConditionInner {
    Compare {
        field: Field,
        op: CompareOp,
        value: Value,
    },
    In {
        field: Field,
        negated: bool,
        values: Vec<Value>,
    },
    NullCheck {
        field: Field,
        negated: bool,
    },
    Between {
        field: Field,
        negated: bool,
        bounds: [Value; 2],
    },
    Logical {
        logic: Logic,
        exprs: Vec<SqlText>,
    },
    Exists {
        negated: bool,
        subquery: Value,
    },
    Quantified {
        field: Field,
        op: CompareOp,
        quantifier: Quantifier,
        values: Vec<Value>,
    },
    Raw(SqlText),
}

/// An unbound predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition(ConditionInner);

impl Condition {
    /// Build a condition from a runtime operator, checking the operand count.
    ///
    /// `field` is ignored by `EXISTS` / `NOT EXISTS`.
    pub fn new(
        field: impl Into<Field>,
        operator: Operator,
        mut values: Vec<Value>,
    ) -> CondResult<Self> {
        let arity = |expected: &'static str, ok: bool, got: usize| {
            if ok {
                Ok(())
            } else {
                Err(CondError::InvalidArgumentCount {
                    operator: operator.name(),
                    expected,
                    got,
                })
            }
        };
        let got = values.len();
        let field = field.into();

        let inner = match operator {
            Operator::Compare(op) => {
                arity("1", got == 1, got)?;
                ConditionInner::Compare {
                    field,
                    op,
                    value: values.remove(0),
                }
            }
            Operator::In | Operator::NotIn => ConditionInner::In {
                field,
                negated: operator == Operator::NotIn,
                values,
            },
            Operator::IsNull | Operator::IsNotNull => {
                arity("0", got == 0, got)?;
                ConditionInner::NullCheck {
                    field,
                    negated: operator == Operator::IsNotNull,
                }
            }
            Operator::Between | Operator::NotBetween => {
                let bounds: [Value; 2] = values.try_into().map_err(|_| {
                    CondError::InvalidArgumentCount {
                        operator: operator.name(),
                        expected: "2",
                        got,
                    }
                })?;
                ConditionInner::Between {
                    field,
                    negated: operator == Operator::NotBetween,
                    bounds,
                }
            }
            Operator::Exists | Operator::NotExists => {
                arity("1", got == 1, got)?;
                ConditionInner::Exists {
                    negated: operator == Operator::NotExists,
                    subquery: values.remove(0),
                }
            }
            Operator::Quantified(op, quantifier) => ConditionInner::Quantified {
                field,
                op,
                quantifier,
                values,
            },
        };
        Ok(Condition(inner))
    }

    // ==================== Comparison ====================

    /// `field op value` for any [`CompareOp`].
    pub fn compare(field: impl Into<Field>, op: CompareOp, value: impl Into<Value>) -> Self {
        Condition(ConditionInner::Compare {
            field: field.into(),
            op,
            value: value.into(),
        })
    }

    /// `field = value`
    pub fn eq(field: impl Into<Field>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Eq, value)
    }

    /// `field <> value`
    pub fn ne(field: impl Into<Field>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Ne, value)
    }

    /// `field > value`
    pub fn gt(field: impl Into<Field>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Gt, value)
    }

    /// `field >= value`
    pub fn gte(field: impl Into<Field>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Gte, value)
    }

    /// `field < value`
    pub fn lt(field: impl Into<Field>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Lt, value)
    }

    /// `field <= value`
    pub fn lte(field: impl Into<Field>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Lte, value)
    }

    /// `field LIKE pattern`
    pub fn like(field: impl Into<Field>, pattern: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Like, pattern)
    }

    /// `field NOT LIKE pattern`
    pub fn not_like(field: impl Into<Field>, pattern: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::NotLike, pattern)
    }

    // ==================== Membership / range / null ====================

    /// `field IN (v1, v2, ...)`. An empty list renders `field IN ()`.
    pub fn in_list<T: Into<Value>>(field: impl Into<Field>, values: impl IntoIterator<Item = T>) -> Self {
        Condition(ConditionInner::In {
            field: field.into(),
            negated: false,
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    /// `field NOT IN (v1, v2, ...)`
    pub fn not_in<T: Into<Value>>(field: impl Into<Field>, values: impl IntoIterator<Item = T>) -> Self {
        Condition(ConditionInner::In {
            field: field.into(),
            negated: true,
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    /// `field IS NULL`
    pub fn is_null(field: impl Into<Field>) -> Self {
        Condition(ConditionInner::NullCheck {
            field: field.into(),
            negated: false,
        })
    }

    /// `field IS NOT NULL`
    pub fn is_not_null(field: impl Into<Field>) -> Self {
        Condition(ConditionInner::NullCheck {
            field: field.into(),
            negated: true,
        })
    }

    /// `field BETWEEN lower AND upper`
    pub fn between(
        field: impl Into<Field>,
        lower: impl Into<Value>,
        upper: impl Into<Value>,
    ) -> Self {
        Condition(ConditionInner::Between {
            field: field.into(),
            negated: false,
            bounds: [lower.into(), upper.into()],
        })
    }

    /// `field NOT BETWEEN lower AND upper`
    pub fn not_between(
        field: impl Into<Field>,
        lower: impl Into<Value>,
        upper: impl Into<Value>,
    ) -> Self {
        Condition(ConditionInner::Between {
            field: field.into(),
            negated: true,
            bounds: [lower.into(), upper.into()],
        })
    }

    // ==================== Combinators ====================

    /// `(a AND b AND ...)` over already-compiled texts.
    pub fn and<T: Into<SqlText>>(exprs: impl IntoIterator<Item = T>) -> Self {
        Self::logical(Logic::And, exprs)
    }

    /// `(a OR b OR ...)` over already-compiled texts.
    pub fn or<T: Into<SqlText>>(exprs: impl IntoIterator<Item = T>) -> Self {
        Self::logical(Logic::Or, exprs)
    }

    fn logical<T: Into<SqlText>>(logic: Logic, exprs: impl IntoIterator<Item = T>) -> Self {
        Condition(ConditionInner::Logical {
            logic,
            exprs: exprs.into_iter().map(Into::into).collect(),
        })
    }

    // ==================== Subqueries ====================

    /// `EXISTS (subquery)`. A [`Statement`](crate::Statement) is inlined
    /// when the outer statement is built; any other value is bound.
    pub fn exists(subquery: impl Into<Value>) -> Self {
        Condition(ConditionInner::Exists {
            negated: false,
            subquery: subquery.into(),
        })
    }

    /// `NOT EXISTS (subquery)`
    pub fn not_exists(subquery: impl Into<Value>) -> Self {
        Condition(ConditionInner::Exists {
            negated: true,
            subquery: subquery.into(),
        })
    }

    /// `field op ANY (v1, ...)`
    pub fn any<T: Into<Value>>(
        field: impl Into<Field>,
        op: CompareOp,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        Self::quantified(field, op, Quantifier::Any, values)
    }

    /// `field op ALL (v1, ...)`
    pub fn all<T: Into<Value>>(
        field: impl Into<Field>,
        op: CompareOp,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        Self::quantified(field, op, Quantifier::All, values)
    }

    /// `field op SOME (v1, ...)`
    pub fn some<T: Into<Value>>(
        field: impl Into<Field>,
        op: CompareOp,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        Self::quantified(field, op, Quantifier::Some, values)
    }

    fn quantified<T: Into<Value>>(
        field: impl Into<Field>,
        op: CompareOp,
        quantifier: Quantifier,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        Condition(ConditionInner::Quantified {
            field: field.into(),
            op,
            quantifier,
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    /// Raw SQL, inserted verbatim.
    ///
    /// # Safety
    /// Be careful with SQL injection when using raw conditions.
    pub fn raw(sql: impl Into<SqlText>) -> Self {
        Condition(ConditionInner::Raw(sql.into()))
    }

    /// Short variant name, used in log events.
    pub fn kind(&self) -> &'static str {
        match &self.0 {
            ConditionInner::Compare { .. } => "compare",
            ConditionInner::In { .. } => "in",
            ConditionInner::NullCheck { .. } => "null_check",
            ConditionInner::Between { .. } => "between",
            ConditionInner::Logical { .. } => "logical",
            ConditionInner::Exists { .. } => "exists",
            ConditionInner::Quantified { .. } => "quantified",
            ConditionInner::Raw(_) => "raw",
        }
    }

    // ==================== Render protocol ====================

    pub(crate) fn write_before(&self, buf: &mut TextBuffer) {
        match &self.0 {
            ConditionInner::Compare { field, op, .. } => {
                buf.write(field.as_str())
                    .write(" ")
                    .write(op.as_sql())
                    .write(" ");
            }
            ConditionInner::In { field, negated, .. } => {
                buf.write(field.as_str())
                    .write(if *negated { " NOT IN (" } else { " IN (" });
            }
            ConditionInner::NullCheck { field, negated } => {
                buf.write(field.as_str())
                    .write(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            ConditionInner::Between { field, negated, .. } => {
                buf.write(field.as_str()).write(if *negated {
                    " NOT BETWEEN "
                } else {
                    " BETWEEN "
                });
            }
            ConditionInner::Logical { logic, exprs } => {
                buf.write("(").write_joined(exprs, logic.separator());
            }
            ConditionInner::Exists { negated, .. } => {
                buf.write(if *negated { "NOT EXISTS (" } else { "EXISTS (" });
            }
            ConditionInner::Quantified {
                field,
                op,
                quantifier,
                ..
            } => {
                buf.write(field.as_str())
                    .write(" ")
                    .write(op.as_sql())
                    .write(" ")
                    .write(quantifier.as_sql())
                    .write(" (");
            }
            ConditionInner::Raw(text) => {
                buf.write_text(text);
            }
        }
    }

    /// Values to bind, in declaration order.
    pub(crate) fn operands(&self) -> &[Value] {
        match &self.0 {
            ConditionInner::Compare { value, .. } => std::slice::from_ref(value),
            ConditionInner::In { values, .. } | ConditionInner::Quantified { values, .. } => {
                values
            }
            ConditionInner::Between { bounds, .. } => bounds,
            ConditionInner::Exists { subquery, .. } => std::slice::from_ref(subquery),
            ConditionInner::NullCheck { .. }
            | ConditionInner::Logical { .. }
            | ConditionInner::Raw(_) => &[],
        }
    }

    pub(crate) fn write_operand(&self, buf: &mut TextBuffer, idx: usize, token: Token) {
        match &self.0 {
            ConditionInner::In { .. } | ConditionInner::Quantified { .. } if idx > 0 => {
                buf.write(", ");
            }
            ConditionInner::Between { .. } if idx == 1 => {
                buf.write(" AND ");
            }
            _ => {}
        }
        buf.write_token(token);
    }

    pub(crate) fn write_after(&self, buf: &mut TextBuffer) {
        match &self.0 {
            ConditionInner::In { .. }
            | ConditionInner::Logical { .. }
            | ConditionInner::Exists { .. }
            | ConditionInner::Quantified { .. } => {
                buf.write(")");
            }
            ConditionInner::Compare { .. }
            | ConditionInner::NullCheck { .. }
            | ConditionInner::Between { .. }
            | ConditionInner::Raw(_) => {}
        }
    }
}

impl From<&str> for Condition {
    fn from(sql: &str) -> Self {
        Condition::raw(sql)
    }
}

impl From<String> for Condition {
    fn from(sql: String) -> Self {
        Condition::raw(sql)
    }
}

impl From<SqlText> for Condition {
    fn from(text: SqlText) -> Self {
        Condition::raw(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Args;

    // Render with a throwaway store so the tests only look at layout.
    fn render(cond: &Condition) -> String {
        let mut args = Args::new();
        let mut buf = TextBuffer::new();
        cond.write_before(&mut buf);
        for (idx, value) in cond.operands().iter().enumerate() {
            let token = args.add(value.clone());
            cond.write_operand(&mut buf, idx, token);
        }
        cond.write_after(&mut buf);
        buf.take().to_string()
    }

    #[test]
    fn comparison_layouts() {
        assert_eq!(render(&Condition::eq("id", 1234)), "id = ?");
        assert_eq!(render(&Condition::ne("id", 1)), "id <> ?");
        assert_eq!(render(&Condition::gte("age", 18)), "age >= ?");
        assert_eq!(render(&Condition::not_like("name", "%x")), "name NOT LIKE ?");
    }

    #[test]
    fn membership_layouts() {
        assert_eq!(
            render(&Condition::in_list("status", [1, 2, 5])),
            "status IN (?, ?, ?)"
        );
        assert_eq!(render(&Condition::not_in("status", [1])), "status NOT IN (?)");
        assert_eq!(
            render(&Condition::in_list("status", Vec::<i32>::new())),
            "status IN ()"
        );
    }

    #[test]
    fn null_and_range_layouts() {
        assert_eq!(render(&Condition::is_null("id_card")), "id_card IS NULL");
        assert_eq!(render(&Condition::is_not_null("id_card")), "id_card IS NOT NULL");
        assert_eq!(
            render(&Condition::between("id", 1234, 2235)),
            "id BETWEEN ? AND ?"
        );
        assert_eq!(
            render(&Condition::not_between("id", 1, 2)),
            "id NOT BETWEEN ? AND ?"
        );
    }

    #[test]
    fn combinator_layouts() {
        assert_eq!(
            render(&Condition::or(["id_card IS NULL", "status = 1"])),
            "(id_card IS NULL OR status = 1)"
        );
        assert_eq!(render(&Condition::and(["a", "b", "c"])), "(a AND b AND c)");
        assert_eq!(render(&Condition::and(Vec::<SqlText>::new())), "()");
    }

    #[test]
    fn exists_and_quantified_layouts() {
        assert_eq!(render(&Condition::exists("SELECT 1")), "EXISTS (?)");
        assert_eq!(render(&Condition::not_exists(1)), "NOT EXISTS (?)");
        assert_eq!(
            render(&Condition::any("score", CompareOp::Gt, [1, 2])),
            "score > ANY (?, ?)"
        );
        assert_eq!(
            render(&Condition::all("score", CompareOp::Lte, [1])),
            "score <= ALL (?)"
        );
        assert_eq!(
            render(&Condition::some("score", CompareOp::Eq, [1])),
            "score = SOME (?)"
        );
    }

    #[test]
    fn raw_binds_nothing() {
        let cond = Condition::from("modified_at > created_at");
        assert!(cond.operands().is_empty());
        assert_eq!(render(&cond), "modified_at > created_at");
    }

    #[test]
    fn fields_are_escaped_at_construction() {
        assert_eq!(
            render(&Condition::eq("order total", 1)),
            r#""order total" = ?"#
        );
        assert_eq!(render(&Condition::eq(r#""order total""#, 1)), r#""order total" = ?"#);
    }

    #[test]
    fn operator_from_str() {
        assert_eq!("!=".parse::<CompareOp>().unwrap(), CompareOp::Ne);
        assert_eq!("not  like".parse::<CompareOp>().unwrap(), CompareOp::NotLike);
        assert_eq!("is not null".parse::<Operator>().unwrap(), Operator::IsNotNull);
        assert_eq!(
            "> any".parse::<Operator>().unwrap(),
            Operator::Quantified(CompareOp::Gt, Quantifier::Any)
        );
        assert_eq!(
            "<=".parse::<Operator>().unwrap(),
            Operator::Compare(CompareOp::Lte)
        );
        assert!("~~".parse::<Operator>().unwrap_err().to_string().contains("~~"));
    }

    #[test]
    fn dynamic_constructor_checks_arity() {
        let err = Condition::new("id", Operator::Between, vec![Value::from(1)]).unwrap_err();
        assert_eq!(
            err,
            CondError::InvalidArgumentCount {
                operator: "BETWEEN",
                expected: "2",
                got: 1
            }
        );

        let err = Condition::new("id", Operator::IsNull, vec![Value::from(1)]).unwrap_err();
        assert!(err.is_invalid_argument_count());

        let err = Condition::new("id", "=".parse().unwrap(), vec![]).unwrap_err();
        assert!(err.is_invalid_argument_count());
    }

    #[test]
    fn dynamic_constructor_matches_typed() {
        let dynamic = Condition::new(
            "id",
            Operator::Between,
            vec![Value::from(1234), Value::from(2235)],
        )
        .unwrap();
        assert_eq!(dynamic, Condition::between("id", 1234, 2235));

        let dynamic =
            Condition::new("status", Operator::In, vec![Value::from(1), Value::from(2)]).unwrap();
        assert_eq!(dynamic, Condition::in_list("status", [1, 2]));
    }
}
