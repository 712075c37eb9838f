//! End-to-end compilation from a query request to SQL.
//!
//! This module provides the high-level API:
//!
//! ```text
//! Request → Canonicalize → Resolve → Fingerprint ─┬─ cache hit ──────────────→ CompiledQuery
//!                                                 └─ Variations → Plan → SQL → CompiledQuery
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use semcube::prelude::*;
//!
//! let registry = Arc::new(SchemaRegistry::from_defs(defs)?);
//! let compiler = Compiler::new(registry, Settings::load()?)?;
//!
//! let request = QueryRequest::new("Revenue")
//!     .measure("netRevenue")
//!     .dimension("region")
//!     .role("sales");
//! let compiled = compiler.compile(&request)?;
//! println!("{}", compiled.sql);
//! ```

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::cache::{CacheStats, Fingerprint, PlanCache};
use crate::config::Settings;
use crate::model::{Meta, SemanticType, TimeGrain};
use crate::planner::QueryPlanner;
use crate::query::{canonicalize, FilterValue, QueryRequest};
use crate::registry::SchemaRegistry;
use crate::semantic::error::CompileResult;
use crate::semantic::resolve::Resolver;
use crate::semantic::variation::{VariationResolver, VariationTable};
use crate::sql::dialect::Dialect;
use crate::sql::generate::SqlGenerator;

// ============================================================================
// Result Types
// ============================================================================

/// Whether a result column is a grouping key or an aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Dimension,
    Measure,
}

/// One column of the result set, in SELECT order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultColumn {
    /// Member name: `Cube.field`, or `Cube.field.grain` for truncated time.
    pub name: String,
    /// SQL alias of the column in the generated statement.
    pub alias: String,
    pub kind: ColumnKind,
    pub column_type: SemanticType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grain: Option<TimeGrain>,
    /// Field metadata, passed through unmodified.
    pub meta: Meta,
}

/// Result of compiling a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledQuery {
    /// The generated SQL string.
    pub sql: String,

    /// Bind values, in placeholder order.
    pub params: Vec<FilterValue>,

    pub result_shape: Vec<ResultColumn>,

    pub fingerprint: Fingerprint,
}

// ============================================================================
// Compiler
// ============================================================================

/// Compiles requests against a read-only registry.
///
/// `Compiler` is `Send + Sync`; share one instance across worker threads.
/// Compilation never blocks, and the plan cache is the only shared mutable
/// state.
#[derive(Debug)]
pub struct Compiler {
    registry: Arc<SchemaRegistry>,
    settings: Settings,
    variations: VariationResolver,
    generator: SqlGenerator,
    cache: Option<PlanCache>,
}

impl Compiler {
    /// Create a compiler. Fails if a declared join does not resolve.
    pub fn new(registry: Arc<SchemaRegistry>, settings: Settings) -> CompileResult<Self> {
        registry.validate_joins()?;

        let table = VariationTable::from_registry(&registry);
        debug!(
            cubes = registry.len(),
            varied_dimensions = table.len(),
            dialect = %settings.compiler.dialect,
            "compiler ready"
        );

        let variations = VariationResolver::new(
            table,
            settings.variations.default_policy,
            settings.variations.enforcement,
        );
        let cache = settings
            .cache
            .enabled
            .then(|| PlanCache::from_settings(&settings.cache));

        Ok(Self {
            generator: SqlGenerator::new(settings.compiler.dialect),
            registry,
            settings,
            variations,
            cache,
        })
    }

    /// Compile a request to SQL. All-or-nothing: on error no SQL is produced.
    pub fn compile(&self, request: &QueryRequest) -> CompileResult<Arc<CompiledQuery>> {
        let filters = canonicalize(&request.filters)?;
        let resolved = Resolver::new(&self.registry).resolve(request, &filters)?;

        let resolved_filters: Vec<_> = resolved.filters.iter().map(|f| f.filter.clone()).collect();
        let fingerprint = Fingerprint::compute(
            &resolved.field_names(),
            &resolved_filters,
            &resolved.role,
            resolved.grain,
            self.dialect(),
        )?;

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&fingerprint) {
                info!(fingerprint = %fingerprint, cache = "hit", "compiled query");
                return Ok(hit);
            }
        }

        let restrictions = self.variations.apply(&resolved)?;
        let plan = QueryPlanner::new(&self.settings.grains).plan(&resolved, &restrictions)?;
        let generated = self.generator.generate(&plan);

        let compiled = Arc::new(CompiledQuery {
            sql: generated.sql,
            params: generated.params,
            result_shape: generated.result_shape,
            fingerprint: fingerprint.clone(),
        });

        if let Some(cache) = &self.cache {
            cache.put(fingerprint.clone(), Arc::clone(&compiled));
        }

        info!(
            fingerprint = %fingerprint,
            cache = if self.cache.is_some() { "miss" } else { "off" },
            columns = compiled.result_shape.len(),
            params = compiled.params.len(),
            "compiled query"
        );
        Ok(compiled)
    }

    pub fn dialect(&self) -> Dialect {
        self.generator.dialect()
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Cache counters, or `None` when caching is disabled.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(PlanCache::stats)
    }

    /// Drop cached plans.
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }
}
