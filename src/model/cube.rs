//! Cube: a named logical table with measures, dimensions and declared joins.

use std::collections::BTreeMap;

use crate::model::dimension::Dimension;
use crate::model::measure::Measure;
use crate::query::FilterValue;
use crate::semantic::error::{CompileError, CompileResult};

/// A named logical fact table. Immutable once registered.
#[derive(Debug, Clone, PartialEq)]
pub struct Cube {
    pub name: String,
    /// Base SELECT (or plain table name) producing the cube's rows.
    pub sql: String,
    pub measures: BTreeMap<String, Measure>,
    pub dimensions: BTreeMap<String, Dimension>,
    /// Target cube name -> join declaration.
    pub joins: BTreeMap<String, CubeJoin>,
}

/// A declared equi-join on a key dimension present on both cubes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CubeJoin {
    pub cube: String,
    pub key: String,
}

impl Cube {
    pub fn new(name: &str, sql: &str) -> Self {
        Self {
            name: name.into(),
            sql: sql.into(),
            measures: BTreeMap::new(),
            dimensions: BTreeMap::new(),
            joins: BTreeMap::new(),
        }
    }

    pub fn with_measure(mut self, measure: Measure) -> Self {
        self.measures.insert(measure.name.clone(), measure);
        self
    }

    pub fn with_dimension(mut self, dimension: Dimension) -> Self {
        self.dimensions.insert(dimension.name.clone(), dimension);
        self
    }

    pub fn with_join(mut self, cube: &str, key: &str) -> Self {
        self.joins.insert(
            cube.into(),
            CubeJoin {
                cube: cube.into(),
                key: key.into(),
            },
        );
        self
    }

    pub fn measure(&self, name: &str) -> Option<&Measure> {
        self.measures.get(name)
    }

    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.get(name)
    }

    /// Check the cube is internally consistent.
    ///
    /// Cross-cube checks (join targets) happen in the registry.
    pub fn validate(&self) -> CompileResult<()> {
        if self.name.trim().is_empty() {
            return Err(CompileError::invalid_schema(&self.name, "cube name is empty"));
        }
        if self.sql.trim().is_empty() {
            return Err(CompileError::invalid_schema(&self.name, "base sql is empty"));
        }

        for measure in self.measures.values() {
            if self.dimensions.contains_key(&measure.name) {
                return Err(CompileError::invalid_schema(
                    &self.name,
                    format!("'{}' is declared as both measure and dimension", measure.name),
                ));
            }
            if measure.kind.requires_sql() && measure.sql.is_none() {
                return Err(CompileError::UnsupportedAggregation {
                    measure: format!("{}.{}", self.name, measure.name),
                    kind: format!("{} without sql", measure.kind),
                });
            }
        }

        for dimension in self.dimensions.values() {
            let bad = dimension.variations.values().find_map(|v| {
                v.values.iter().find(|value| {
                    FilterValue::from_variation_value(value, dimension.dimension_type).is_none()
                })
            });
            if let Some(value) = bad {
                return Err(CompileError::invalid_schema(
                    &self.name,
                    format!(
                        "variation value '{}' of '{}' does not fit its {:?} type",
                        value, dimension.name, dimension.dimension_type
                    ),
                ));
            }
        }

        for join in self.joins.values() {
            if !self.dimensions.contains_key(&join.key) {
                return Err(CompileError::invalid_schema(
                    &self.name,
                    format!(
                        "join to '{}' uses key '{}', which is not a dimension of this cube",
                        join.cube, join.key
                    ),
                ));
            }
        }

        Ok(())
    }
}
