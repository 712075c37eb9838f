//! Serde form of a Cube-style schema declaration.
//!
//! An external loader parses schema files into [`CubeDef`]; the conversion
//! into [`Cube`] validates aggregation and dimension types.
//!
//! ```json
//! {
//!   "name": "Revenue",
//!   "sql": "SELECT f.* FROM fact_revenue_daily f",
//!   "measures": { "netRevenue": { "type": "sum", "sql": "amount" } },
//!   "dimensions": {
//!     "region": {
//!       "type": "string",
//!       "sql": "region_code",
//!       "meta": { "variations": { "sales": ["JP", "KR"] } }
//!     }
//!   },
//!   "joins": { "Targets": { "key": "region" } }
//! }
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::model::cube::Cube;
use crate::model::dimension::{Dimension, Variation};
use crate::model::measure::Measure;
use crate::model::types::{AggregationKind, Meta, SemanticType};
use crate::semantic::error::CompileError;

/// Meta key under which role variations may be declared.
const META_VARIATIONS: &str = "variations";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CubeDef {
    pub name: String,
    pub sql: String,
    #[serde(default)]
    pub measures: BTreeMap<String, MeasureDef>,
    #[serde(default)]
    pub dimensions: BTreeMap<String, DimensionDef>,
    #[serde(default)]
    pub joins: BTreeMap<String, JoinDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeasureDef {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub sql: Option<String>,
    #[serde(default)]
    pub meta: Meta,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DimensionDef {
    #[serde(rename = "type")]
    pub kind: String,
    pub sql: String,
    #[serde(default)]
    pub meta: Meta,
    /// Role -> allowed values. Also read from `meta.variations`.
    #[serde(default)]
    pub variations: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinDef {
    pub key: String,
}

impl CubeDef {
    /// Parse a declaration from JSON.
    pub fn from_json(value: serde_json::Value) -> Result<Self, CompileError> {
        let name = value
            .get("name")
            .and_then(|n| n.as_str())
            .unwrap_or("<unnamed>")
            .to_string();
        serde_json::from_value(value)
            .map_err(|e| CompileError::invalid_schema(&name, e.to_string()))
    }
}

impl TryFrom<CubeDef> for Cube {
    type Error = CompileError;

    fn try_from(def: CubeDef) -> Result<Self, Self::Error> {
        let mut cube = Cube::new(&def.name, &def.sql);

        for (name, m) in def.measures {
            let kind = AggregationKind::parse(&m.kind).ok_or_else(|| {
                CompileError::UnsupportedAggregation {
                    measure: format!("{}.{}", def.name, name),
                    kind: m.kind.clone(),
                }
            })?;
            cube = cube.with_measure(Measure::new(&name, kind, m.sql.as_deref()).with_meta(m.meta));
        }

        for (name, d) in def.dimensions {
            let dimension_type = SemanticType::parse(&d.kind).ok_or_else(|| {
                CompileError::invalid_schema(
                    &def.name,
                    format!("dimension '{}' has unknown type '{}'", name, d.kind),
                )
            })?;
            let variations = match d.variations {
                Some(v) => v,
                None => variations_from_meta(&def.name, &name, &d.meta)?,
            };
            let mut dimension = Dimension::new(&name, dimension_type, &d.sql).with_meta(d.meta);
            for (role, values) in variations {
                dimension = dimension.with_variation(Variation::new(&role, values));
            }
            cube = cube.with_dimension(dimension);
        }

        for (target, join) in def.joins {
            cube = cube.with_join(&target, &join.key);
        }

        cube.validate()?;
        Ok(cube)
    }
}

fn variations_from_meta(
    cube: &str,
    dimension: &str,
    meta: &Meta,
) -> Result<BTreeMap<String, Vec<String>>, CompileError> {
    match meta.get(META_VARIATIONS) {
        None => Ok(BTreeMap::new()),
        Some(raw) => serde_json::from_value(raw.clone()).map_err(|e| {
            CompileError::invalid_schema(
                cube,
                format!("dimension '{}' has malformed variations: {}", dimension, e),
            )
        }),
    }
}
