//! DELETE statement builder.
//!
//! A thin clause builder on top of [`Session`]: conditions are compiled in
//! the builder's own session, so texts produced by [`DeleteBuilder::compile`]
//! and [`DeleteBuilder::var`] can be freely combined before being passed to
//! [`DeleteBuilder::where_text`].
//!
//! # Example
//! ```ignore
//! use sqlcond::{delete_from, Condition};
//!
//! let (sql, args) = delete_from("demo.user")
//!     .where_(Condition::eq("id", 1234))
//!     .limit(10)
//!     .build()?;
//! assert_eq!(sql, "DELETE FROM demo.user WHERE id = ? LIMIT 10");
//! # Ok::<(), sqlcond::CondError>(())
//! ```

use crate::buffer::TextBuffer;
use crate::condition::Condition;
use crate::config::SessionConfig;
use crate::error::CondResult;
use crate::flavor::Flavor;
use crate::ident::escape;
use crate::session::{Session, Statement};
use crate::text::SqlText;
use crate::value::Value;

/// Clause position that [`DeleteBuilder::sql`] injects after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Init,
    AfterDeleteFrom,
    AfterWhere,
    AfterOrderBy,
    AfterLimit,
}

/// Sort direction for `ORDER BY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

/// Start a DELETE builder for `table`.
pub fn delete_from(table: &str) -> DeleteBuilder {
    let mut builder = DeleteBuilder::new();
    builder.delete_from(table);
    builder
}

/// DELETE statement builder.
///
/// A clone gets its own argument store. Conditions added before cloning are
/// carried over, and anything compiled against one builder is rejected by the
/// other.
#[derive(Debug)]
pub struct DeleteBuilder {
    session: Session,
    table: String,
    wheres: Vec<SqlText>,
    order_by: Vec<String>,
    order: Option<Order>,
    limit: Option<u64>,
    marker: Marker,
    injections: Vec<(Marker, SqlText)>,
}

impl Clone for DeleteBuilder {
    fn clone(&self) -> Self {
        let session = self.session.clone();
        let (from, to) = (self.session.args().id(), session.args().id());
        let rebind = |text: &SqlText| {
            let mut text = text.clone();
            text.rebind(from, to);
            text
        };
        Self {
            session,
            table: self.table.clone(),
            wheres: self.wheres.iter().map(rebind).collect(),
            order_by: self.order_by.clone(),
            order: self.order,
            limit: self.limit,
            marker: self.marker,
            injections: self
                .injections
                .iter()
                .map(|(marker, text)| (*marker, rebind(text)))
                .collect(),
        }
    }
}

impl Default for DeleteBuilder {
    fn default() -> Self {
        Self::with_config(SessionConfig::default())
    }
}

impl DeleteBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty builder that builds with `flavor`.
    pub fn with_flavor(flavor: Flavor) -> Self {
        Self::with_config(SessionConfig::new().with_flavor(flavor))
    }

    /// Create an empty builder with a session configuration.
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            session: Session::with_config(config),
            table: String::new(),
            wheres: Vec::new(),
            order_by: Vec::new(),
            order: None,
            limit: None,
            marker: Marker::Init,
            injections: Vec::new(),
        }
    }

    /// Set the target table. The name is escaped.
    pub fn delete_from(&mut self, table: &str) -> &mut Self {
        self.table = escape(table);
        self.marker = Marker::AfterDeleteFrom;
        self
    }

    /// Add a WHERE condition, compiled immediately. Conditions are joined
    /// with `AND`.
    pub fn where_(&mut self, cond: impl Into<Condition>) -> &mut Self {
        let text = self.session.compile(&cond.into());
        self.where_text(text)
    }

    /// Add already-compiled WHERE text.
    pub fn where_text(&mut self, text: impl Into<SqlText>) -> &mut Self {
        self.wheres.push(text.into());
        self.marker = Marker::AfterWhere;
        self
    }

    /// Compile a condition in this builder's session.
    pub fn compile(&mut self, cond: &Condition) -> SqlText {
        self.session.compile(cond)
    }

    /// `(a AND b ...)` in this builder's session.
    pub fn and<T: Into<SqlText>>(&mut self, exprs: impl IntoIterator<Item = T>) -> SqlText {
        self.session.and(exprs)
    }

    /// `(a OR b ...)` in this builder's session.
    pub fn or<T: Into<SqlText>>(&mut self, exprs: impl IntoIterator<Item = T>) -> SqlText {
        self.session.or(exprs)
    }

    /// Bind a value in this builder's session.
    pub fn var(&mut self, value: impl Into<Value>) -> SqlText {
        self.session.var(value)
    }

    /// Set `ORDER BY` columns. Column text is used as given.
    pub fn order_by<S: AsRef<str>>(&mut self, cols: &[S]) -> &mut Self {
        self.order_by = cols.iter().map(|c| c.as_ref().to_string()).collect();
        self.marker = Marker::AfterOrderBy;
        self
    }

    /// Sort ascending.
    pub fn asc(&mut self) -> &mut Self {
        self.order = Some(Order::Asc);
        self.marker = Marker::AfterOrderBy;
        self
    }

    /// Sort descending.
    pub fn desc(&mut self) -> &mut Self {
        self.order = Some(Order::Desc);
        self.marker = Marker::AfterOrderBy;
        self
    }

    /// Set `LIMIT`. The number is written into the SQL, not bound.
    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self.marker = Marker::AfterLimit;
        self
    }

    /// Inject SQL after the most recently set clause.
    ///
    /// # Safety
    /// The text is inserted verbatim. Be careful with SQL injection.
    pub fn sql(&mut self, text: impl Into<SqlText>) -> &mut Self {
        self.injections.push((self.marker, text.into()));
        self
    }

    fn write_injections(&self, buf: &mut TextBuffer, marker: Marker) {
        for (_, text) in self.injections.iter().filter(|(m, _)| *m == marker) {
            buf.write_leading_text(text);
        }
    }

    fn render(&self) -> SqlText {
        let mut buf = TextBuffer::new();
        self.write_injections(&mut buf, Marker::Init);

        buf.write_leading("DELETE FROM ").write(&self.table);
        self.write_injections(&mut buf, Marker::AfterDeleteFrom);

        if !self.wheres.is_empty() {
            buf.write_leading("WHERE ")
                .write_joined(&self.wheres, " AND ");
        }
        self.write_injections(&mut buf, Marker::AfterWhere);

        if !self.order_by.is_empty() {
            buf.write_leading("ORDER BY ").write_strs(&self.order_by, ", ");
            match self.order {
                Some(Order::Asc) => {
                    buf.write(" ASC");
                }
                Some(Order::Desc) => {
                    buf.write(" DESC");
                }
                None => {}
            }
        }
        self.write_injections(&mut buf, Marker::AfterOrderBy);

        if let Some(limit) = self.limit {
            buf.write_leading("LIMIT ").write(&limit.to_string());
        }
        self.write_injections(&mut buf, Marker::AfterLimit);

        buf.take()
    }

    /// Seal the builder into a [`Statement`].
    pub fn to_statement(&self) -> CondResult<Statement> {
        self.session.statement(self.render())
    }

    /// Build SQL and arguments with the configured flavor.
    pub fn build(&self) -> CondResult<(String, Vec<Value>)> {
        Ok(self.to_statement()?.build())
    }

    /// Build SQL and arguments with `flavor`.
    pub fn build_with_flavor(&self, flavor: Flavor) -> CondResult<(String, Vec<Value>)> {
        Ok(self.to_statement()?.build_with_flavor(flavor))
    }

    /// Get the SQL with `?` placeholders (for debugging).
    pub fn to_sql(&self) -> String {
        self.render().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().copied().map(Value::from).collect()
    }

    #[test]
    fn test_delete_from_with_limit() {
        let sql = delete_from("demo.user").where_("status = 1").limit(10).to_sql();
        assert_eq!(sql, "DELETE FROM demo.user WHERE status = 1 LIMIT 10");
    }

    #[test]
    fn test_delete_mixed_conditions() {
        let mut db = DeleteBuilder::new();
        db.delete_from("demo.user");
        let id = db.compile(&Condition::gt("id", 1234));
        let name = db.compile(&Condition::like("name", "%Du"));
        let id_card = db.compile(&Condition::is_null("id_card"));
        let status = db.compile(&Condition::in_list("status", [1, 2, 5]));
        let either = db.or([id_card, status]);
        let tail = SqlText::raw("modified_at > created_at + ").then(db.var(86400));
        db.where_text(id)
            .where_text(name)
            .where_text(either)
            .where_text(tail);

        let (sql, args) = db.build().unwrap();
        assert_eq!(
            sql,
            "DELETE FROM demo.user WHERE id > ? AND name LIKE ? AND (id_card IS NULL OR status IN (?, ?, ?)) AND modified_at > created_at + ?"
        );
        assert_eq!(
            args,
            vec![
                Value::from(1234),
                Value::from("%Du"),
                Value::from(1),
                Value::from(2),
                Value::from(5),
                Value::from(86400),
            ]
        );
    }

    #[test]
    fn test_delete_sql_injection_points() {
        let mut db = DeleteBuilder::new();
        db.sql("/* before */")
            .delete_from("demo.user")
            .sql("PARTITION (p0)")
            .where_(Condition::gt("id", 1234))
            .sql("/* after where */")
            .order_by(&["id"])
            .sql("/* after order by */")
            .limit(10)
            .sql("/* after limit */");

        let (sql, args) = db.build().unwrap();
        assert_eq!(
            sql,
            "/* before */ DELETE FROM demo.user PARTITION (p0) WHERE id > ? /* after where */ ORDER BY id /* after order by */ LIMIT 10 /* after limit */"
        );
        assert_eq!(args, ints(&[1234]));
    }

    #[test]
    fn test_delete_where_variants() {
        let cases: Vec<(Condition, Condition, &str, usize)> = vec![
            (
                Condition::eq("id", 1234),
                Condition::eq("name", "xx"),
                "DELETE FROM demo.user WHERE id = ? AND name = ?",
                2,
            ),
            (
                Condition::in_list("id", [1234, 2235]),
                Condition::in_list("age", [12, 22]),
                "DELETE FROM demo.user WHERE id IN (?, ?) AND age IN (?, ?)",
                4,
            ),
            (
                Condition::not_in("id", [1234, 2235]),
                Condition::not_in("age", [12, 22]),
                "DELETE FROM demo.user WHERE id NOT IN (?, ?) AND age NOT IN (?, ?)",
                4,
            ),
            (
                Condition::between("id", 1234, 2235),
                Condition::between("age", 12, 22),
                "DELETE FROM demo.user WHERE id BETWEEN ? AND ? AND age BETWEEN ? AND ?",
                4,
            ),
            (
                Condition::not_between("id", 1234, 2235),
                Condition::not_between("age", 12, 22),
                "DELETE FROM demo.user WHERE id NOT BETWEEN ? AND ? AND age NOT BETWEEN ? AND ?",
                4,
            ),
            (
                Condition::is_not_null("id"),
                Condition::is_null("addr"),
                "DELETE FROM demo.user WHERE id IS NOT NULL AND addr IS NULL",
                0,
            ),
            (
                Condition::gte("id", 1),
                Condition::lt("id", 10),
                "DELETE FROM demo.user WHERE id >= ? AND id < ?",
                2,
            ),
        ];

        for (first, second, expected, arg_count) in cases {
            let mut db = delete_from("demo.user");
            db.where_(first.clone()).where_(second.clone());
            let (sql, args) = db.build().unwrap();
            assert_eq!(sql, expected);
            assert_eq!(args.len(), arg_count);

            // Compiling through the builder gives the same result.
            let mut db2 = delete_from("demo.user");
            let a = db2.compile(&first);
            let b = db2.compile(&second);
            db2.where_text(a).where_text(b);
            assert_eq!(db2.build().unwrap(), (sql, args));
        }
    }

    #[test]
    fn test_delete_combinators_and_exists() {
        let sql = delete_from("demo.user")
            .where_(Condition::or(["id = 1", "id = 2"]))
            .to_sql();
        assert_eq!(sql, "DELETE FROM demo.user WHERE (id = 1 OR id = 2)");

        let sql = delete_from("demo.user")
            .where_(Condition::and(["id = 1", "id = 2"]))
            .to_sql();
        assert_eq!(sql, "DELETE FROM demo.user WHERE (id = 1 AND id = 2)");

        let (sql, args) = delete_from("demo.user")
            .where_(Condition::exists("select id from book"))
            .build()
            .unwrap();
        assert_eq!(sql, "DELETE FROM demo.user WHERE EXISTS (?)");
        assert_eq!(args.len(), 1);

        let (sql, args) = delete_from("demo.user")
            .where_(Condition::not_exists("select id from book"))
            .build()
            .unwrap();
        assert_eq!(sql, "DELETE FROM demo.user WHERE NOT EXISTS (?)");
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_delete_order_and_flavor() {
        let mut db = DeleteBuilder::with_flavor(Flavor::PostgreSql);
        db.delete_from("events")
            .where_(Condition::lt("created_at", 100))
            .where_(Condition::eq("kind", "tmp"))
            .order_by(&["created_at", "id"])
            .desc()
            .limit(500);

        let (sql, args) = db.build().unwrap();
        assert_eq!(
            sql,
            "DELETE FROM events WHERE created_at < $1 AND kind = $2 ORDER BY created_at, id DESC LIMIT 500"
        );
        assert_eq!(args, vec![Value::from(100), Value::from("tmp")]);

        let (sql, _) = db.build_with_flavor(Flavor::SqlServer).unwrap();
        assert!(sql.contains("created_at < @p1 AND kind = @p2"));
    }

    #[test]
    fn test_delete_without_where() {
        assert_eq!(delete_from("users").to_sql(), "DELETE FROM users");
    }

    #[test]
    fn test_delete_escapes_table() {
        assert_eq!(
            delete_from("audit log").to_sql(),
            r#"DELETE FROM "audit log""#
        );
    }

    #[test]
    fn test_delete_rejects_foreign_text() {
        let mut other = Session::new();
        let foreign = other.compile(&Condition::eq("id", 1));
        let err = delete_from("t").where_text(foreign).build().unwrap_err();
        assert!(err.is_foreign_argument());
    }

    #[test]
    fn test_delete_clone_is_independent() {
        let mut db = delete_from("demo.user");
        db.where_(Condition::gt("id", 1234));
        let tag = SqlText::raw("/* tag */ ").then(db.var("x"));
        db.sql(tag);
        let mut copy = db.clone();

        let expected = (
            String::from("DELETE FROM demo.user WHERE id > ? /* tag */ ?"),
            vec![Value::from(1234), Value::from("x")],
        );
        assert_eq!(copy.build().unwrap(), expected);

        let copied = copy.compile(&Condition::eq("name", "secret"));
        let err = db.where_text(copied).build().unwrap_err();
        assert!(err.is_foreign_argument());

        let original = db.compile(&Condition::eq("name", "other"));
        let err = copy.where_text(original).build().unwrap_err();
        assert!(err.is_foreign_argument());
    }
}
