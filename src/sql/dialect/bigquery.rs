//! BigQuery (GoogleSQL) dialect.
//!
//! - Backtick identifier quoting
//! - `@pN` named parameters
//! - `TIMESTAMP_TRUNC(ts, UNIT)`

use super::helpers;
use super::SqlDialect;
use crate::model::TimeGrain;

/// BigQuery SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct BigQuery;

impl SqlDialect for BigQuery {
    fn name(&self) -> &'static str {
        "bigquery"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_backslash(s)
    }

    fn placeholder(&self, index: usize) -> String {
        helpers::placeholder_named(index)
    }

    fn truncate_time(&self, grain: TimeGrain, expr: &str) -> String {
        helpers::timestamp_trunc_bigquery(grain, expr)
    }
}
