// src/model/dimension.rs
use std::collections::BTreeMap;

use crate::model::types::{Meta, SemanticType};

/// A groupable, filterable field owned by one cube.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub name: String,
    pub dimension_type: SemanticType,
    pub sql: String,
    /// Role name -> allowed values.
    pub variations: BTreeMap<String, Variation>,
    pub meta: Meta,
}

/// The values of a dimension visible to one role.
#[derive(Debug, Clone, PartialEq)]
pub struct Variation {
    pub role: String,
    /// Declared order, duplicates removed.
    pub values: Vec<String>,
}

impl Variation {
    pub fn new(role: &str, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut ordered: Vec<String> = Vec::new();
        for value in values {
            let value = value.into();
            if !ordered.contains(&value) {
                ordered.push(value);
            }
        }
        Self {
            role: role.into(),
            values: ordered,
        }
    }

    pub fn allows(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

impl Dimension {
    pub fn new(name: &str, dimension_type: SemanticType, sql: &str) -> Self {
        Self {
            name: name.into(),
            dimension_type,
            sql: sql.into(),
            variations: BTreeMap::new(),
            meta: Meta::new(),
        }
    }

    pub fn with_variation(mut self, variation: Variation) -> Self {
        self.variations.insert(variation.role.clone(), variation);
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    pub fn is_time(&self) -> bool {
        self.dimension_type == SemanticType::Time
    }

    pub fn variation_for(&self, role: &str) -> Option<&Variation> {
        self.variations.get(role)
    }

    /// Whether any role is restricted on this dimension.
    pub fn is_varied(&self) -> bool {
        !self.variations.is_empty()
    }
}
