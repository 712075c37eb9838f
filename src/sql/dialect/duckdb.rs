//! DuckDB SQL dialect.
//!
//! DuckDB follows PostgreSQL conventions for everything the compiler emits:
//! double-quoted identifiers, `$n` parameters and `DATE_TRUNC`.

use super::helpers;
use super::SqlDialect;

/// DuckDB SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct DuckDb;

impl SqlDialect for DuckDb {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }
}
