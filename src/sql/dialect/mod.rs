//! SQL Dialect definitions and formatting rules.
//!
//! This module provides a trait-based abstraction for the dialect differences
//! that matter to compiled analytical queries:
//!
//! - Identifier quoting: `"` (ANSI/PG/DuckDB/Snowflake), `` ` `` (MySQL/BigQuery), `[]` (T-SQL)
//! - Bind parameter placeholders: `$1` vs `?` vs `@p1`
//! - Time truncation: `DATE_TRUNC`, `DATETRUNC`, `TIMESTAMP_TRUNC`, or MySQL date arithmetic
//!
//! # Usage
//!
//! ```ignore
//! use semcube::sql::dialect::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::Postgres;
//! let quoted = dialect.quote_identifier("region");  // "region"
//! let param = dialect.placeholder(1);               // $1
//! ```

mod bigquery;
mod duckdb;
pub mod helpers;
mod mysql;
mod postgres;
mod snowflake;
mod tsql;

pub use bigquery::BigQuery;
pub use duckdb::DuckDb;
pub use mysql::MySql;
pub use postgres::Postgres;
pub use snowflake::Snowflake;
pub use tsql::TSql;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::TimeGrain;

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// The default implementations follow ANSI SQL where possible.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    /// Quote an identifier (cube alias, column, result alias).
    fn quote_identifier(&self, ident: &str) -> String;

    /// Quote a string literal.
    ///
    /// Only used for trusted fragments such as `LIKE ... ESCAPE '\'`;
    /// request values are always bound as parameters.
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    /// Placeholder for the 1-based bind parameter `index`.
    fn placeholder(&self, index: usize) -> String {
        helpers::placeholder_dollar(index)
    }

    /// Truncate an already-rendered time expression to `grain`.
    fn truncate_time(&self, grain: TimeGrain, expr: &str) -> String {
        helpers::date_trunc_quoted_unit(grain, expr)
    }
}

/// Supported SQL dialects.
///
/// This enum provides a convenient way to select a dialect. It implements
/// `SqlDialect` by delegating to the appropriate dialect struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Postgres,
    DuckDb,
    MySql,
    TSql,
    Snowflake,
    BigQuery,
}

impl Dialect {
    /// Get the underlying dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Postgres => &Postgres,
            Dialect::DuckDb => &DuckDb,
            Dialect::MySql => &MySql,
            Dialect::TSql => &TSql,
            Dialect::Snowflake => &Snowflake,
            Dialect::BigQuery => &BigQuery,
        }
    }

    /// All dialects, in declaration order.
    pub fn all() -> [Dialect; 6] {
        [
            Dialect::Postgres,
            Dialect::DuckDb,
            Dialect::MySql,
            Dialect::TSql,
            Dialect::Snowflake,
            Dialect::BigQuery,
        ]
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "duckdb" => Ok(Dialect::DuckDb),
            "mysql" => Ok(Dialect::MySql),
            "tsql" | "mssql" | "sqlserver" => Ok(Dialect::TSql),
            "snowflake" => Ok(Dialect::Snowflake),
            "bigquery" => Ok(Dialect::BigQuery),
            other => Err(format!("unknown dialect '{}'", other)),
        }
    }
}

impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn placeholder(&self, index: usize) -> String {
        self.dialect().placeholder(index)
    }

    fn truncate_time(&self, grain: TimeGrain, expr: &str) -> String {
        self.dialect().truncate_time(grain, expr)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}
