//! Shared helper functions for SQL dialect implementations.
//!
//! This module provides reusable building blocks that dialects can compose
//! to implement the `SqlDialect` trait with minimal duplication.

use crate::model::TimeGrain;

// =============================================================================
// Identifier Quoting
// =============================================================================

/// Quote identifier with double quotes (ANSI style).
/// Used by: Postgres, DuckDB, Snowflake
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote identifier with backticks.
/// Used by: MySQL, BigQuery
pub fn quote_backtick(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

/// Quote identifier with square brackets.
/// Used by: T-SQL (SQL Server, Azure Synapse)
pub fn quote_bracket(ident: &str) -> String {
    format!("[{}]", ident.replace(']', "]]"))
}

// =============================================================================
// String Quoting
// =============================================================================

/// Quote string with single quotes (standard SQL).
pub fn quote_string_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Quote string for dialects where backslash escapes inside literals.
/// Used by: MySQL, BigQuery, Snowflake
pub fn quote_string_backslash(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Quote string with N prefix for Unicode (T-SQL).
pub fn quote_string_unicode(s: &str) -> String {
    format!("N'{}'", s.replace('\'', "''"))
}

// =============================================================================
// Bind Parameters
// =============================================================================

/// `$1`, `$2`, ... (Postgres, DuckDB).
pub fn placeholder_dollar(index: usize) -> String {
    format!("${}", index)
}

/// `?` for every position (MySQL, Snowflake). Binding order is positional.
pub fn placeholder_question(_index: usize) -> String {
    "?".to_string()
}

/// `@p1`, `@p2`, ... (T-SQL via sp_executesql, BigQuery named parameters).
pub fn placeholder_named(index: usize) -> String {
    format!("@p{}", index)
}

// =============================================================================
// Time Truncation
// =============================================================================

/// `DATE_TRUNC('month', expr)`.
/// Used by: Postgres, DuckDB, Snowflake
pub fn date_trunc_quoted_unit(grain: TimeGrain, expr: &str) -> String {
    format!("DATE_TRUNC('{}', {})", grain.as_str(), expr)
}

/// `DATETRUNC(month, expr)` (SQL Server 2022+).
pub fn date_trunc_tsql(grain: TimeGrain, expr: &str) -> String {
    format!("DATETRUNC({}, {})", grain.as_str(), expr)
}

/// `TIMESTAMP_TRUNC(expr, MONTH)`.
/// `WEEK` starts on Sunday in BigQuery; `ISOWEEK` matches the Monday weeks of the other dialects.
pub fn timestamp_trunc_bigquery(grain: TimeGrain, expr: &str) -> String {
    let unit = match grain {
        TimeGrain::Week => "ISOWEEK".to_string(),
        other => other.as_str().to_uppercase(),
    };
    format!("TIMESTAMP_TRUNC({}, {})", expr, unit)
}

/// MySQL has no truncation function; each grain is rebuilt from its parts.
pub fn date_trunc_mysql(grain: TimeGrain, expr: &str) -> String {
    match grain {
        TimeGrain::Second => format!("DATE_FORMAT({}, '%Y-%m-%d %H:%i:%s')", expr),
        TimeGrain::Minute => format!("DATE_FORMAT({}, '%Y-%m-%d %H:%i:00')", expr),
        TimeGrain::Hour => format!("DATE_FORMAT({}, '%Y-%m-%d %H:00:00')", expr),
        TimeGrain::Day => format!("DATE({})", expr),
        TimeGrain::Week => format!("DATE_SUB(DATE({0}), INTERVAL WEEKDAY({0}) DAY)", expr),
        TimeGrain::Month => format!("DATE_FORMAT({}, '%Y-%m-01')", expr),
        TimeGrain::Quarter => format!(
            "MAKEDATE(YEAR({0}), 1) + INTERVAL (QUARTER({0}) - 1) QUARTER",
            expr
        ),
        TimeGrain::Year => format!("DATE_FORMAT({}, '%Y-01-01')", expr),
    }
}
