//! T-SQL (SQL Server / Azure SQL) dialect.
//!
//! - Square bracket identifier quoting (`[name]`)
//! - N'...' prefix for Unicode strings
//! - `@pN` parameters (sp_executesql)
//! - `DATETRUNC` (SQL Server 2022+)

use super::helpers;
use super::SqlDialect;
use crate::model::TimeGrain;

/// T-SQL (SQL Server) dialect.
#[derive(Debug, Clone, Copy)]
pub struct TSql;

impl SqlDialect for TSql {
    fn name(&self) -> &'static str {
        "tsql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_bracket(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        if !s.is_ascii() {
            helpers::quote_string_unicode(s)
        } else {
            helpers::quote_string_single(s)
        }
    }

    fn placeholder(&self, index: usize) -> String {
        helpers::placeholder_named(index)
    }

    fn truncate_time(&self, grain: TimeGrain, expr: &str) -> String {
        helpers::date_trunc_tsql(grain, expr)
    }
}
