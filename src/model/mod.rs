//! Cube model types.
//!
//! Cubes are built once at schema-load time (from [`CubeDef`] declarations
//! or the builder API) and shared read-only through the registry.

pub mod cube;
pub mod declaration;
pub mod dimension;
pub mod measure;
pub mod types;

pub use cube::{Cube, CubeJoin};
pub use declaration::{CubeDef, DimensionDef, JoinDef, MeasureDef};
pub use dimension::{Dimension, Variation};
pub use measure::Measure;
pub use types::{AggregationKind, Meta, SemanticType, TimeGrain};
