//! PostgreSQL SQL dialect.
//!
//! - ANSI identifier quoting (`"`)
//! - `$n` bind parameters
//! - `DATE_TRUNC('unit', ts)`

use super::helpers;
use super::SqlDialect;

/// PostgreSQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    // Uses default placeholder ($n) and truncate_time (DATE_TRUNC)
}
