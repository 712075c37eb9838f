//! Role-scoped dimension visibility.
//!
//! Variations are a decision table keyed by `(cube, dimension)` then role,
//! built once from the registry. The [`VariationResolver`] applies it to a
//! resolved request: it validates explicit filter values and produces the
//! implicit `IN (allowed)` restrictions the planner adds to WHERE.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::config::{VariationEnforcement, VariationPolicy};
use crate::query::FilterOperator;
use crate::registry::SchemaRegistry;
use crate::semantic::error::{CompileError, CompileResult};
use crate::semantic::resolve::{FilterTarget, ResolvedDimension, ResolvedRequest};

/// What a role may see of one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility<'a> {
    /// No variation applies.
    Unrestricted,
    /// Only these values.
    Restricted(&'a [String]),
    /// The dimension is varied and the role has no entry under a deny policy.
    Denied,
}

/// `(cube, dimension) -> role -> allowed values`.
#[derive(Debug, Clone, Default)]
pub struct VariationTable {
    entries: BTreeMap<(String, String), BTreeMap<String, Vec<String>>>,
}

impl VariationTable {
    pub fn from_registry(registry: &SchemaRegistry) -> Self {
        let mut entries = BTreeMap::new();
        for cube in registry.cubes() {
            for dimension in cube.dimensions.values().filter(|d| d.is_varied()) {
                let roles = dimension
                    .variations
                    .values()
                    .map(|v| (v.role.clone(), v.values.clone()))
                    .collect();
                entries.insert((cube.name.clone(), dimension.name.clone()), roles);
            }
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn visibility(
        &self,
        cube: &str,
        dimension: &str,
        role: &str,
        policy: VariationPolicy,
    ) -> Visibility<'_> {
        let Some(roles) = self.entries.get(&(cube.to_string(), dimension.to_string())) else {
            return Visibility::Unrestricted;
        };
        match (roles.get(role), policy) {
            (Some(values), _) => Visibility::Restricted(values),
            (None, VariationPolicy::Open) => Visibility::Unrestricted,
            (None, VariationPolicy::Deny) => Visibility::Denied,
        }
    }
}

/// An implicit `dimension IN (allowed)` predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleRestriction {
    pub dimension: ResolvedDimension,
    pub allowed: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct VariationResolver {
    table: VariationTable,
    policy: VariationPolicy,
    enforcement: VariationEnforcement,
}

impl VariationResolver {
    pub fn new(
        table: VariationTable,
        policy: VariationPolicy,
        enforcement: VariationEnforcement,
    ) -> Self {
        Self {
            table,
            policy,
            enforcement,
        }
    }

    /// Check the request against the caller's role and collect the
    /// restrictions to inject, in first-mention order.
    pub fn apply(&self, request: &ResolvedRequest) -> CompileResult<Vec<RoleRestriction>> {
        let role = request.role.as_str();

        // Every dimension the request groups or filters on, then both sides
        // of each join key.
        let mut mentioned: Vec<ResolvedDimension> = Vec::new();
        let filtered = request.filters.iter().filter_map(|f| match &f.target {
            FilterTarget::Dimension(d) => Some(d.clone()),
            FilterTarget::Measure(_) => None,
        });
        let join_keys = request.joins.iter().flat_map(|step| {
            [step.left.as_str(), step.right.as_str()]
                .into_iter()
                .filter_map(move |cube| join_key(request, cube, &step.key))
        });
        for dimension in request.dimensions.iter().cloned().chain(filtered).chain(join_keys) {
            if !mentioned.iter().any(|m| same_dimension(m, &dimension)) {
                mentioned.push(dimension);
            }
        }

        let mut restrictions = Vec::new();
        for dimension in &mentioned {
            let name = dimension.qualified_name();
            let allowed = match self.table.visibility(
                &dimension.cube,
                &dimension.dimension.name,
                role,
                self.policy,
            ) {
                Visibility::Unrestricted => continue,
                Visibility::Denied => {
                    warn!(role = %role, dimension = %name, "role has no variation under deny policy");
                    return Err(CompileError::variation(
                        role,
                        &name,
                        "no visibility declared for this role",
                    ));
                }
                Visibility::Restricted(values) => values,
            };

            if allowed.is_empty() {
                return Err(CompileError::variation(role, &name, "no values are visible"));
            }

            let mut covered = false;
            for filter in request.filters.iter().filter(|f| match &f.target {
                FilterTarget::Dimension(d) => same_dimension(d, dimension),
                FilterTarget::Measure(_) => false,
            }) {
                if filter.filter.operator != FilterOperator::Equals {
                    continue;
                }
                let outside: Vec<String> = filter
                    .filter
                    .values
                    .iter()
                    .map(|v| v.to_variation_key())
                    .filter(|v| !allowed.contains(v))
                    .collect();
                if outside.is_empty() {
                    covered = true;
                } else if self.enforcement == VariationEnforcement::Strict {
                    return Err(CompileError::variation(
                        role,
                        &name,
                        format!("value(s) {} not visible", outside.join(", ")),
                    ));
                }
            }

            if covered {
                debug!(role = %role, dimension = %name, "explicit filter within visible set");
                continue;
            }

            debug!(
                role = %role,
                dimension = %name,
                allowed = allowed.len(),
                "injecting variation predicate"
            );
            restrictions.push(RoleRestriction {
                dimension: dimension.clone(),
                allowed: allowed.to_vec(),
            });
        }

        Ok(restrictions)
    }
}

fn join_key(request: &ResolvedRequest, cube: &str, key: &str) -> Option<ResolvedDimension> {
    let cube = request.cubes.iter().find(|c| c.name == cube)?;
    Some(ResolvedDimension {
        cube: cube.name.clone(),
        dimension: cube.dimension(key)?.clone(),
    })
}

fn same_dimension(a: &ResolvedDimension, b: &ResolvedDimension) -> bool {
    a.cube == b.cube && a.dimension.name == b.dimension.name
}
