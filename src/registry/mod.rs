//! Schema registry: parsed cubes by name.
//!
//! Populated once at startup, then shared read-only (`Arc<SchemaRegistry>`)
//! across compilations. A process-wide instance can be installed with
//! [`SchemaRegistry::install_global`].

use std::collections::BTreeMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::model::{Cube, CubeDef, Dimension, Measure};
use crate::semantic::error::{CompileError, CompileResult};

static GLOBAL: OnceCell<Arc<SchemaRegistry>> = OnceCell::new();

#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    cubes: BTreeMap<String, Arc<Cube>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from cubes, failing on the first duplicate or invalid cube.
    pub fn from_cubes(cubes: impl IntoIterator<Item = Cube>) -> CompileResult<Self> {
        let mut registry = Self::new();
        for cube in cubes {
            registry.register(cube)?;
        }
        Ok(registry)
    }

    /// Build a registry from serde declarations.
    pub fn from_defs(defs: impl IntoIterator<Item = CubeDef>) -> CompileResult<Self> {
        let mut registry = Self::new();
        for def in defs {
            registry.register(Cube::try_from(def)?)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, cube: Cube) -> CompileResult<()> {
        if self.cubes.contains_key(&cube.name) {
            return Err(CompileError::DuplicateCube(cube.name));
        }
        cube.validate()?;
        debug!(
            cube = %cube.name,
            measures = cube.measures.len(),
            dimensions = cube.dimensions.len(),
            "registered cube"
        );
        self.cubes.insert(cube.name.clone(), Arc::new(cube));
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> CompileResult<&Arc<Cube>> {
        self.cubes
            .get(name)
            .ok_or_else(|| CompileError::UnknownCube(name.into()))
    }

    pub fn lookup_measure(&self, cube: &str, measure: &str) -> CompileResult<&Measure> {
        self.lookup(cube)?
            .measure(measure)
            .ok_or_else(|| CompileError::unknown_field(cube, measure))
    }

    pub fn lookup_dimension(&self, cube: &str, dimension: &str) -> CompileResult<&Dimension> {
        self.lookup(cube)?
            .dimension(dimension)
            .ok_or_else(|| CompileError::unknown_field(cube, dimension))
    }

    /// Cubes in name order.
    pub fn cubes(&self) -> impl Iterator<Item = &Arc<Cube>> {
        self.cubes.values()
    }

    pub fn len(&self) -> usize {
        self.cubes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cubes.is_empty()
    }

    /// Check every declared join targets a registered cube that also
    /// declares the key dimension.
    pub fn validate_joins(&self) -> CompileResult<()> {
        for cube in self.cubes.values() {
            for join in cube.joins.values() {
                let target = self.cubes.get(&join.cube).ok_or_else(|| {
                    CompileError::invalid_schema(
                        &cube.name,
                        format!("join targets unknown cube '{}'", join.cube),
                    )
                })?;
                if target.dimension(&join.key).is_none() {
                    return Err(CompileError::invalid_schema(
                        &cube.name,
                        format!(
                            "join key '{}' is not a dimension of '{}'",
                            join.key, join.cube
                        ),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Install the process-wide registry. Returns the registry back if one
    /// was already installed.
    pub fn install_global(registry: Arc<SchemaRegistry>) -> Result<(), Arc<SchemaRegistry>> {
        GLOBAL.set(registry)
    }

    /// The process-wide registry, if installed.
    pub fn global() -> Option<Arc<SchemaRegistry>> {
        GLOBAL.get().cloned()
    }
}
