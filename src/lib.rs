//! # semcube
//!
//! A semantic-layer query compiler: cube definitions in, role-aware,
//! parameterized multi-dialect SQL out.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │           Cube declarations (CubeDef, serde)             │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [registry]
//! ┌─────────────────────────────────────────────────────────┐
//! │        SchemaRegistry (read-only, process-wide)          │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!        QueryRequest ───► ▼ [semantic::resolve + join graph]
//! ┌─────────────────────────────────────────────────────────┐
//! │       ResolvedRequest ──► Fingerprint ──► PlanCache      │
//! └─────────────────────────────────────────────────────────┘
//!                          │ miss
//!                          ▼ [semantic::variation]
//! ┌─────────────────────────────────────────────────────────┐
//! │          Role restrictions (IN allowed values)           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [planner]
//! ┌─────────────────────────────────────────────────────────┐
//! │                      QueryPlan                           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sql::generate]
//! ┌─────────────────────────────────────────────────────────┐
//! │          CompiledQuery { sql, params, shape }            │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod cache;
pub mod compile;
pub mod config;
pub mod model;
pub mod planner;
pub mod query;
pub mod registry;
pub mod semantic;
pub mod sql;

// Re-export SQL submodules at crate level
pub use sql::dialect;
pub use sql::expr;
pub use sql::token;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::cache::{CacheStats, Fingerprint, PlanCache};
    pub use crate::compile::{ColumnKind, CompiledQuery, Compiler, ResultColumn};
    pub use crate::config::{Settings, VariationEnforcement, VariationPolicy};
    pub use crate::model::{
        AggregationKind, Cube, CubeDef, Dimension, Measure, SemanticType, TimeGrain, Variation,
    };
    pub use crate::query::{Filter, FilterOperator, FilterValue, QueryRequest};
    pub use crate::registry::SchemaRegistry;
    pub use crate::semantic::{CompileError, CompileResult};
    pub use crate::sql::dialect::{Dialect, SqlDialect};
}

// Also export at crate root for convenience
pub use compile::{CompiledQuery, Compiler};
pub use registry::SchemaRegistry;
pub use semantic::{CompileError, CompileResult};
