// src/model/measure.rs
use crate::model::types::{AggregationKind, Meta};

/// An aggregatable field owned by one cube.
#[derive(Debug, Clone, PartialEq)]
pub struct Measure {
    pub name: String,
    pub kind: AggregationKind,
    /// Source column or expression. `None` only for `count` (row count).
    pub sql: Option<String>,
    pub meta: Meta,
}

impl Measure {
    pub fn new(name: &str, kind: AggregationKind, sql: Option<&str>) -> Self {
        Self {
            name: name.into(),
            kind,
            sql: sql.map(Into::into),
            meta: Meta::new(),
        }
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }
}
