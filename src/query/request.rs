use serde::{Deserialize, Serialize};

use crate::model::TimeGrain;
use crate::query::filter::Filter;

/// An analytical request: what to select, how to filter, and who is asking.
///
/// Field names are `Cube.field`, or a bare `field` resolved against `cube`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Default cube for bare field names.
    pub cube: String,
    #[serde(default)]
    pub measures: Vec<String>,
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub filters: Vec<Filter>,
    /// Resolved caller role. Opaque to the compiler.
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub grain: Option<TimeGrain>,
}

impl QueryRequest {
    pub fn new(cube: &str) -> Self {
        Self {
            cube: cube.into(),
            ..Default::default()
        }
    }

    pub fn measure(mut self, name: &str) -> Self {
        self.measures.push(name.into());
        self
    }

    pub fn dimension(mut self, name: &str) -> Self {
        self.dimensions.push(name.into());
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn role(mut self, role: &str) -> Self {
        self.role = role.into();
        self
    }

    pub fn grain(mut self, grain: TimeGrain) -> Self {
        self.grain = Some(grain);
        self
    }
}
