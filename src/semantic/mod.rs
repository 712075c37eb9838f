//! Semantic layer - reference resolution, join graph, and role variations.
//!
//! Sits between the raw request and the planner:
//!
//! 1. **Resolve** - Bind `Cube.field` names to definitions, order the joins
//! 2. **Vary** - Check the caller's role against dimension variations
//!
//! Both phases report through [`CompileError`].

pub mod error;
pub mod join_graph;
pub mod resolve;
pub mod variation;

pub use error::{CompileError, CompileResult};
pub use join_graph::{JoinGraph, JoinStep};
pub use resolve::{
    FilterTarget, ResolvedDimension, ResolvedFilter, ResolvedMeasure, ResolvedRequest, Resolver,
};
pub use variation::{RoleRestriction, VariationResolver, VariationTable, Visibility};
