//! Placeholder syntax per database.

use crate::error::CondError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder flavor used when a statement is built.
///
/// Only placeholder syntax differs between flavors; no other dialect
/// differences are modeled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    /// `?`
    #[default]
    MySql,
    /// `$1, $2, ...`
    #[serde(alias = "postgres", alias = "pg")]
    PostgreSql,
    /// `?`
    Sqlite,
    /// `@p1, @p2, ...`
    #[serde(alias = "mssql")]
    SqlServer,
    /// `:1, :2, ...`
    Oracle,
    /// `?`
    ClickHouse,
}

impl Flavor {
    /// Write the placeholder for the argument at 1-based `position`.
    pub fn write_placeholder(self, out: &mut String, position: usize) {
        match self {
            Flavor::MySql | Flavor::Sqlite | Flavor::ClickHouse => out.push('?'),
            Flavor::PostgreSql => {
                out.push('$');
                out.push_str(&position.to_string());
            }
            Flavor::SqlServer => {
                out.push_str("@p");
                out.push_str(&position.to_string());
            }
            Flavor::Oracle => {
                out.push(':');
                out.push_str(&position.to_string());
            }
        }
    }

    /// The placeholder for the argument at 1-based `position`.
    pub fn placeholder(self, position: usize) -> String {
        let mut out = String::new();
        self.write_placeholder(&mut out, position);
        out
    }

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Flavor::MySql => "mysql",
            Flavor::PostgreSql => "postgresql",
            Flavor::Sqlite => "sqlite",
            Flavor::SqlServer => "sqlserver",
            Flavor::Oracle => "oracle",
            Flavor::ClickHouse => "clickhouse",
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Flavor {
    type Err = CondError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(Flavor::MySql),
            "postgresql" | "postgres" | "pg" => Ok(Flavor::PostgreSql),
            "sqlite" => Ok(Flavor::Sqlite),
            "sqlserver" | "mssql" => Ok(Flavor::SqlServer),
            "oracle" => Ok(Flavor::Oracle),
            "clickhouse" => Ok(Flavor::ClickHouse),
            _ => Err(CondError::UnknownFlavor(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders() {
        assert_eq!(Flavor::MySql.placeholder(3), "?");
        assert_eq!(Flavor::PostgreSql.placeholder(3), "$3");
        assert_eq!(Flavor::SqlServer.placeholder(12), "@p12");
        assert_eq!(Flavor::Oracle.placeholder(1), ":1");
    }

    #[test]
    fn parse_names_and_aliases() {
        assert_eq!("Postgres".parse::<Flavor>().unwrap(), Flavor::PostgreSql);
        assert_eq!("mssql".parse::<Flavor>().unwrap(), Flavor::SqlServer);
        assert_eq!(
            "db2".parse::<Flavor>().unwrap_err(),
            CondError::UnknownFlavor("db2".into())
        );
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for flavor in [
            Flavor::MySql,
            Flavor::PostgreSql,
            Flavor::Sqlite,
            Flavor::SqlServer,
            Flavor::Oracle,
            Flavor::ClickHouse,
        ] {
            assert_eq!(flavor.to_string().parse::<Flavor>().unwrap(), flavor);
        }
    }

    #[test]
    fn serde_accepts_aliases() {
        let f: Flavor = serde_json::from_str("\"pg\"").unwrap();
        assert_eq!(f, Flavor::PostgreSql);
        assert_eq!(serde_json::to_string(&Flavor::Sqlite).unwrap(), "\"sqlite\"");
    }
}
