//! SQL generation module.
//!
//! This module provides a type-safe SQL builder that generates multi-dialect SQL.
//! It includes:
//!
//! - [`generate`] - Query plan to SQL text, params and result shape
//! - [`query`] - SELECT query builder
//! - [`expr`] - Expression AST and builder DSL
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations

pub mod dialect;
pub mod expr;
pub mod generate;
pub mod query;
pub mod token;

// Re-export commonly used types at the sql module level
pub use dialect::{Dialect, SqlDialect};
pub use expr::{
    avg, col, count, count_distinct, count_star, func, max, min, param, schema_sql, sum,
    table_col, time_trunc, BinaryOperator, Expr, ExprExt,
};
pub use generate::{GeneratedSql, SqlGenerator};
pub use query::{Join, Query, SelectExpr, TableRef, TableSource};
pub use token::{Token, TokenStream};
