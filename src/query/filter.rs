//! Request filters.
//!
//! Filter values are typed and never rendered into SQL text; the generator
//! binds them as positional parameters.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::model::SemanticType;
use crate::semantic::error::{CompileError, CompileResult};

/// A filter predicate on a dimension or measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// `Cube.field` or a bare field of the request's cube.
    #[serde(alias = "dimension")]
    pub member: String,
    pub operator: FilterOperator,
    #[serde(default, alias = "value", deserialize_with = "one_or_many")]
    pub values: Vec<FilterValue>,
}

/// Filter operators, using Cube's names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    Gt,
    Gte,
    Lt,
    Lte,
    Set,
    NotSet,
    InDateRange,
    NotInDateRange,
}

/// A typed filter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "notEquals",
            Self::Contains => "contains",
            Self::NotContains => "notContains",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Set => "set",
            Self::NotSet => "notSet",
            Self::InDateRange => "inDateRange",
            Self::NotInDateRange => "notInDateRange",
        }
    }

    /// Allowed number of values: (min, max). `None` max means unbounded.
    fn arity(&self) -> (usize, Option<usize>) {
        match self {
            Self::Equals | Self::NotEquals => (1, None),
            Self::Contains | Self::NotContains => (1, Some(1)),
            Self::Gt | Self::Gte | Self::Lt | Self::Lte => (1, Some(1)),
            Self::Set | Self::NotSet => (0, Some(0)),
            Self::InDateRange | Self::NotInDateRange => (2, Some(2)),
        }
    }

    /// Set-membership operators whose value order is irrelevant.
    pub fn is_set_membership(&self) -> bool {
        matches!(self, Self::Equals | Self::NotEquals)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FilterValue {
    /// String form used to compare against declared variation values.
    pub fn to_variation_key(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::String(s) => s.clone(),
        }
    }

    /// Bind value for a declared variation value of a `dimension_type` dimension.
    ///
    /// Numbers parse as integers, then floats. `None` if the text does not fit
    /// the type.
    pub fn from_variation_value(value: &str, dimension_type: SemanticType) -> Option<Self> {
        match dimension_type {
            SemanticType::Number => value
                .parse()
                .map(Self::Int)
                .ok()
                .or_else(|| value.parse().ok().map(Self::Float)),
            SemanticType::Boolean => value.parse().ok().map(Self::Bool),
            SemanticType::String | SemanticType::Time => Some(Self::String(value.to_string())),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Int(_) => 1,
            Self::Float(_) => 2,
            Self::String(_) => 3,
        }
    }

    /// Total order used for canonicalization.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::String(a), Self::String(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for FilterValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for FilterValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl Filter {
    pub fn new(
        member: &str,
        operator: FilterOperator,
        values: impl IntoIterator<Item = impl Into<FilterValue>>,
    ) -> Self {
        Self {
            member: member.into(),
            operator,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn equals(member: &str, values: impl IntoIterator<Item = impl Into<FilterValue>>) -> Self {
        Self::new(member, FilterOperator::Equals, values)
    }

    pub fn not_equals(
        member: &str,
        values: impl IntoIterator<Item = impl Into<FilterValue>>,
    ) -> Self {
        Self::new(member, FilterOperator::NotEquals, values)
    }

    /// A filter that takes no values (`set` / `notSet`).
    pub fn unary(member: &str, operator: FilterOperator) -> Self {
        Self {
            member: member.into(),
            operator,
            values: Vec::new(),
        }
    }

    /// Order by member, then operator, then values.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.member
            .cmp(&other.member)
            .then(self.operator.cmp(&other.operator))
            .then_with(|| cmp_values(&self.values, &other.values))
    }

    pub fn validate(&self) -> CompileResult<()> {
        let (min, max) = self.operator.arity();
        let n = self.values.len();
        if n < min || max.is_some_and(|max| n > max) {
            let expected = match max {
                Some(max) if max == min => format!("exactly {}", min),
                Some(max) => format!("{} to {}", min, max),
                None => format!("at least {}", min),
            };
            return Err(CompileError::invalid_filter(
                &self.member,
                format!(
                    "operator '{}' takes {} value(s), got {}",
                    self.operator, expected, n
                ),
            ));
        }
        if matches!(
            self.operator,
            FilterOperator::Contains | FilterOperator::NotContains
        ) && !matches!(self.values.first(), Some(FilterValue::String(_)))
        {
            return Err(CompileError::invalid_filter(
                &self.member,
                format!("operator '{}' takes a string value", self.operator),
            ));
        }
        Ok(())
    }
}

/// Canonical form of a filter list: each filter validated, set-membership
/// values sorted and deduplicated, filters sorted by member then operator.
pub fn canonicalize(filters: &[Filter]) -> CompileResult<Vec<Filter>> {
    let mut out = Vec::with_capacity(filters.len());
    for filter in filters {
        filter.validate()?;
        let mut filter = filter.clone();
        if filter.operator.is_set_membership() {
            filter.values.sort_by(FilterValue::canonical_cmp);
            filter
                .values
                .dedup_by(|a, b| a.canonical_cmp(b) == Ordering::Equal);
        }
        out.push(filter);
    }
    out.sort_by(Filter::canonical_cmp);
    out.dedup();
    Ok(out)
}

fn cmp_values(a: &[FilterValue], b: &[FilterValue]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        let ord = x.canonical_cmp(y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<FilterValue>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<FilterValue>),
        One(FilterValue),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(values) => values,
        OneOrMany::One(value) => vec![value],
    })
}
