//! Reference resolution.
//!
//! Turns the names in a [`QueryRequest`] into cube-bound field definitions,
//! records cubes in first-touch order, and orders the joins between them.

use std::sync::Arc;

use tracing::debug;

use crate::model::{Cube, Dimension, Measure, TimeGrain};
use crate::query::{Filter, QueryRequest};
use crate::registry::SchemaRegistry;
use crate::semantic::error::{CompileError, CompileResult};
use crate::semantic::join_graph::{JoinGraph, JoinStep};

/// A measure bound to its cube.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMeasure {
    pub cube: String,
    pub measure: Measure,
}

/// A dimension bound to its cube.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDimension {
    pub cube: String,
    pub dimension: Dimension,
}

impl ResolvedMeasure {
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.cube, self.measure.name)
    }
}

impl ResolvedDimension {
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.cube, self.dimension.name)
    }
}

/// What a filter constrains.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterTarget {
    /// Row-level: compiles to WHERE.
    Dimension(ResolvedDimension),
    /// Aggregate-level: compiles to HAVING.
    Measure(ResolvedMeasure),
}

impl FilterTarget {
    pub fn cube(&self) -> &str {
        match self {
            Self::Dimension(d) => &d.cube,
            Self::Measure(m) => &m.cube,
        }
    }
}

/// A filter whose member has been resolved. `filter.member` is qualified.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFilter {
    pub filter: Filter,
    pub target: FilterTarget,
}

/// The dependency-closed field set for one request.
#[derive(Debug, Clone)]
pub struct ResolvedRequest {
    /// Touched cubes, first-touch order.
    pub cubes: Vec<Arc<Cube>>,
    pub joins: Vec<JoinStep>,
    pub measures: Vec<ResolvedMeasure>,
    pub dimensions: Vec<ResolvedDimension>,
    pub filters: Vec<ResolvedFilter>,
    pub role: String,
    pub grain: Option<TimeGrain>,
}

impl ResolvedRequest {
    /// Qualified names of the selected fields: measures, then dimensions,
    /// each in request order.
    pub fn field_names(&self) -> Vec<String> {
        self.measures
            .iter()
            .map(ResolvedMeasure::qualified_name)
            .chain(self.dimensions.iter().map(ResolvedDimension::qualified_name))
            .collect()
    }
}

pub struct Resolver<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Resolve a request. `filters` must already be canonical.
    pub fn resolve(
        &self,
        request: &QueryRequest,
        filters: &[Filter],
    ) -> CompileResult<ResolvedRequest> {
        let mut touched: Vec<String> = Vec::new();

        let mut measures: Vec<ResolvedMeasure> = Vec::new();
        for name in &request.measures {
            let (cube, field) = self.split(&request.cube, name)?;
            let measure = self.registry.lookup_measure(cube, field)?;
            if measures
                .iter()
                .any(|m| m.cube == cube && m.measure.name == field)
            {
                continue;
            }
            touch(&mut touched, cube);
            measures.push(ResolvedMeasure {
                cube: cube.into(),
                measure: measure.clone(),
            });
        }

        let mut dimensions: Vec<ResolvedDimension> = Vec::new();
        for name in &request.dimensions {
            let (cube, field) = self.split(&request.cube, name)?;
            let dimension = self.registry.lookup_dimension(cube, field)?;
            if dimensions
                .iter()
                .any(|d| d.cube == cube && d.dimension.name == field)
            {
                continue;
            }
            touch(&mut touched, cube);
            dimensions.push(ResolvedDimension {
                cube: cube.into(),
                dimension: dimension.clone(),
            });
        }

        let mut resolved_filters = Vec::with_capacity(filters.len());
        for filter in filters {
            let (cube, field) = self.split(&request.cube, &filter.member)?;
            let owner = self.registry.lookup(cube)?;
            let target = if let Some(dimension) = owner.dimension(field) {
                FilterTarget::Dimension(ResolvedDimension {
                    cube: cube.into(),
                    dimension: dimension.clone(),
                })
            } else if let Some(measure) = owner.measure(field) {
                FilterTarget::Measure(ResolvedMeasure {
                    cube: cube.into(),
                    measure: measure.clone(),
                })
            } else {
                return Err(CompileError::unknown_field(cube, field));
            };

            let mut filter = filter.clone();
            filter.member = format!("{}.{}", cube, field);
            resolved_filters.push(ResolvedFilter { filter, target });
        }

        // Qualification can reorder members and merge bare with qualified spellings.
        resolved_filters.sort_by(|a, b| a.filter.canonical_cmp(&b.filter));
        resolved_filters.dedup_by(|a, b| a.filter == b.filter);
        for resolved in &resolved_filters {
            touch(&mut touched, resolved.target.cube());
        }

        let graph = JoinGraph::build(self.registry, &touched)?;
        let joins = graph.join_order()?;

        let cubes = touched
            .iter()
            .map(|name| self.registry.lookup(name).cloned())
            .collect::<CompileResult<Vec<_>>>()?;

        debug!(
            cubes = ?touched,
            joins = joins.len(),
            measures = measures.len(),
            dimensions = dimensions.len(),
            filters = resolved_filters.len(),
            "resolved request"
        );

        Ok(ResolvedRequest {
            cubes,
            joins,
            measures,
            dimensions,
            filters: resolved_filters,
            role: request.role.clone(),
            grain: request.grain,
        })
    }

    /// Split `Cube.field` on the first dot; a bare name belongs to `default_cube`.
    fn split<'n>(&self, default_cube: &'n str, name: &'n str) -> CompileResult<(&'n str, &'n str)> {
        let (cube, field) = match name.split_once('.') {
            Some((cube, field)) => (cube, field),
            None => (default_cube, name),
        };
        if cube.is_empty() {
            return Err(CompileError::UnknownCube(cube.into()));
        }
        if field.is_empty() {
            return Err(CompileError::unknown_field(cube, field));
        }
        Ok((cube, field))
    }
}

fn touch(touched: &mut Vec<String>, cube: &str) {
    if !touched.iter().any(|c| c == cube) {
        touched.push(cube.into());
    }
}
