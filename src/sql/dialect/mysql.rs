//! MySQL SQL dialect.
//!
//! - Backtick identifier quoting
//! - `?` positional parameters
//! - No DATE_TRUNC: grains are rebuilt with DATE_FORMAT / date arithmetic

use super::helpers;
use super::SqlDialect;
use crate::model::TimeGrain;

/// MySQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct MySql;

impl SqlDialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_backslash(s)
    }

    fn placeholder(&self, index: usize) -> String {
        helpers::placeholder_question(index)
    }

    fn truncate_time(&self, grain: TimeGrain, expr: &str) -> String {
        helpers::date_trunc_mysql(grain, expr)
    }
}
