//! Query planning.
//!
//! Turns a resolved, variation-checked request into a [`QueryPlan`]: aliased
//! cube sources, the INNER join sequence, grouping and aggregate expressions,
//! and parameterized WHERE/HAVING predicates.

mod build;
pub mod plan;

pub use build::QueryPlanner;
pub use plan::{
    Aggregate, ColumnExpr, Comparison, PlanDimension, PlanJoin, PlanMeasure, PlanSource,
    Predicate, PredicateKind, PredicateTarget, QueryPlan,
};
