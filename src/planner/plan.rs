//! Query plan: the cube-bound, dialect-agnostic form of one request.
//!
//! Built by [`QueryPlanner`](super::QueryPlanner), consumed by the SQL
//! generator, then dropped. Bind parameters are numbered in the order the
//! generator renders them: WHERE predicates first, then HAVING.

use crate::model::{AggregationKind, Meta, SemanticType, TimeGrain};
use crate::query::FilterValue;
use crate::sql::query::TableSource;

#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// Cube sources; the first is the FROM item.
    pub sources: Vec<PlanSource>,
    pub joins: Vec<PlanJoin>,
    pub dimensions: Vec<PlanDimension>,
    pub measures: Vec<PlanMeasure>,
    pub where_predicates: Vec<Predicate>,
    pub having_predicates: Vec<Predicate>,
    /// Values for `Param(i)` by index.
    pub params: Vec<FilterValue>,
}

/// One aliased cube source.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanSource {
    pub cube: String,
    pub alias: String,
    pub source: TableSource,
}

/// INNER JOIN of `table` on `left = right`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanJoin {
    pub table: PlanSource,
    pub left: ColumnExpr,
    pub right: ColumnExpr,
}

/// How a field's `sql` renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnExpr {
    /// Bare identifier: quoted and qualified with the cube alias.
    Column { alias: String, column: String },
    /// Trusted schema SQL; `{CUBE}` is replaced by the quoted alias.
    Trusted { sql: String, alias: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanDimension {
    /// Result member name, `Cube.dimension[.grain]`.
    pub name: String,
    /// SQL column alias.
    pub alias: String,
    pub expr: ColumnExpr,
    pub grain: Option<TimeGrain>,
    pub column_type: SemanticType,
    pub meta: Meta,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanMeasure {
    /// Result member name, `Cube.measure`.
    pub name: String,
    pub alias: String,
    pub aggregate: Aggregate,
    pub meta: Meta,
}

/// An aggregate expression. `expr` is `None` only for `COUNT(*)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    pub kind: AggregationKind,
    pub expr: Option<ColumnExpr>,
}

/// Left-hand side of a predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateTarget {
    /// Row-level column (WHERE).
    Column(ColumnExpr),
    /// Aggregate (HAVING).
    Aggregate(Aggregate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Predicate shape; `usize` values are parameter indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateKind {
    Eq(usize),
    Ne(usize),
    In(Vec<usize>),
    NotIn(Vec<usize>),
    Like { pattern: usize, negated: bool },
    Compare(Comparison, usize),
    IsNull { negated: bool },
    Between { low: usize, high: usize, negated: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub target: PredicateTarget,
    pub kind: PredicateKind,
}
