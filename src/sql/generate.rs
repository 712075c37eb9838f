//! SQL generation from a [`QueryPlan`].
//!
//! Pure rendering: no state beyond the target dialect, no I/O. Every request
//! value arrives as a bind parameter; the only inline SQL is schema-author
//! text (cube sources and field expressions).

use super::dialect::Dialect;
use super::expr::{
    avg, count, count_distinct, count_star, max, min, param, schema_sql, sum, table_col,
    time_trunc, Expr, ExprExt,
};
use super::query::{Query, SelectExpr, TableRef, TableSource};
use crate::compile::{ColumnKind, ResultColumn};
use crate::model::{AggregationKind, SemanticType};
use crate::planner::{
    Aggregate, ColumnExpr, Comparison, PlanDimension, PlanSource, Predicate, PredicateKind,
    PredicateTarget, QueryPlan,
};
use crate::query::FilterValue;

/// Rendered SQL plus what a caller needs to execute it and read the rows.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSql {
    pub sql: String,
    /// Bind values in placeholder order.
    pub params: Vec<FilterValue>,
    pub result_shape: Vec<ResultColumn>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SqlGenerator {
    dialect: Dialect,
}

impl SqlGenerator {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Build the SELECT for a plan.
    pub fn build_query(&self, plan: &QueryPlan) -> Query {
        let mut select: Vec<SelectExpr> = Vec::new();
        let mut group_by = Vec::new();

        for dimension in &plan.dimensions {
            let expr = dimension_expr(dimension);
            select.push(expr.clone().alias(&dimension.alias));
            group_by.push(expr);
        }
        for measure in &plan.measures {
            select.push(aggregate_expr(&measure.aggregate).alias(&measure.alias));
        }

        let mut query = Query::new().select(select).group_by(group_by);

        let mut sources = plan.sources.iter();
        if let Some(root) = sources.next() {
            query = query.from(table_ref(root));
        }
        for join in &plan.joins {
            let on = column(&join.left).eq(column(&join.right));
            query = query.inner_join(table_ref(&join.table), on);
        }

        for predicate in &plan.where_predicates {
            query = query.filter(predicate_expr(predicate));
        }
        for predicate in &plan.having_predicates {
            query = query.having(predicate_expr(predicate));
        }

        query
    }

    pub fn generate(&self, plan: &QueryPlan) -> GeneratedSql {
        let query = self.build_query(plan);
        let tokens = query.to_tokens_for_dialect(self.dialect);
        debug_assert!(
            tokens.params().eq(0..plan.params.len()),
            "parameters must be allocated in render order"
        );

        GeneratedSql {
            sql: tokens.serialize(self.dialect),
            params: plan.params.clone(),
            result_shape: result_shape(plan),
        }
    }
}

/// Ordered result columns: dimensions, then measures.
pub fn result_shape(plan: &QueryPlan) -> Vec<ResultColumn> {
    let dimensions = plan.dimensions.iter().map(|d| ResultColumn {
        name: d.name.clone(),
        alias: d.alias.clone(),
        kind: ColumnKind::Dimension,
        column_type: d.column_type,
        grain: d.grain,
        meta: d.meta.clone(),
    });
    let measures = plan.measures.iter().map(|m| ResultColumn {
        name: m.name.clone(),
        alias: m.alias.clone(),
        kind: ColumnKind::Measure,
        column_type: SemanticType::Number,
        grain: None,
        meta: m.meta.clone(),
    });
    dimensions.chain(measures).collect()
}

fn table_ref(source: &PlanSource) -> TableRef {
    let table = match &source.source {
        TableSource::Named { schema, table } => {
            let t = TableRef::new(table);
            match schema {
                Some(schema) => t.with_schema(schema),
                None => t,
            }
        }
        TableSource::Derived(sql) => TableRef::derived(sql),
    };
    table.with_alias(&source.alias)
}

fn column(expr: &ColumnExpr) -> Expr {
    match expr {
        ColumnExpr::Column { alias, column } => table_col(alias, column),
        ColumnExpr::Trusted { sql, alias } => schema_sql(sql, alias),
    }
}

fn dimension_expr(dimension: &PlanDimension) -> Expr {
    let expr = column(&dimension.expr);
    match dimension.grain {
        Some(grain) => time_trunc(grain, expr),
        None => expr,
    }
}

fn aggregate_expr(aggregate: &Aggregate) -> Expr {
    let arg = aggregate.expr.as_ref().map(column);
    match (aggregate.kind, arg) {
        (AggregationKind::Sum, Some(arg)) => sum(arg),
        (AggregationKind::Avg, Some(arg)) => avg(arg),
        (AggregationKind::Min, Some(arg)) => min(arg),
        (AggregationKind::Max, Some(arg)) => max(arg),
        (AggregationKind::Count, Some(arg)) => count(arg),
        (AggregationKind::CountDistinct, Some(arg)) => count_distinct(arg),
        (AggregationKind::Count, None) => count_star(),
        // Rejected at schema load; render the row count rather than panic.
        (_, None) => count_star(),
    }
}

fn predicate_expr(predicate: &Predicate) -> Expr {
    let lhs = match &predicate.target {
        // Trusted SQL may contain operators of lower precedence.
        PredicateTarget::Column(expr @ ColumnExpr::Trusted { .. }) => column(expr).paren(),
        PredicateTarget::Column(expr) => column(expr),
        PredicateTarget::Aggregate(aggregate) => aggregate_expr(aggregate),
    };
    let params = |indices: &[usize]| indices.iter().copied().map(param).collect::<Vec<_>>();

    match &predicate.kind {
        PredicateKind::Eq(i) => lhs.eq(param(*i)),
        PredicateKind::Ne(i) => lhs.ne(param(*i)),
        PredicateKind::In(indices) => lhs.in_list(params(indices)),
        PredicateKind::NotIn(indices) => lhs.not_in_list(params(indices)),
        PredicateKind::Like { pattern, negated } => {
            if *negated {
                lhs.not_like(param(*pattern))
            } else {
                lhs.like(param(*pattern))
            }
        }
        PredicateKind::Compare(op, i) => match op {
            Comparison::Gt => lhs.gt(param(*i)),
            Comparison::Gte => lhs.gte(param(*i)),
            Comparison::Lt => lhs.lt(param(*i)),
            Comparison::Lte => lhs.lte(param(*i)),
        },
        PredicateKind::IsNull { negated } => {
            if *negated {
                lhs.is_not_null()
            } else {
                lhs.is_null()
            }
        }
        PredicateKind::Between { low, high, negated } => {
            if *negated {
                lhs.not_between(param(*low), param(*high))
            } else {
                lhs.between(param(*low), param(*high))
            }
        }
    }
}
