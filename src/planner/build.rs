//! Plan construction.

use std::collections::{HashMap, HashSet};

use inflector::Inflector;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::plan::{
    Aggregate, ColumnExpr, Comparison, PlanDimension, PlanJoin, PlanMeasure, PlanSource,
    Predicate, PredicateKind, PredicateTarget, QueryPlan,
};
use crate::config::GrainSettings;
use crate::model::{Cube, Measure};
use crate::query::{Filter, FilterOperator, FilterValue};
use crate::semantic::error::{CompileError, CompileResult};
use crate::semantic::resolve::{FilterTarget, ResolvedRequest};
use crate::semantic::variation::RoleRestriction;
use crate::sql::expr::LIKE_ESCAPE;
use crate::sql::query::TableSource;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern"));

static TABLE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:([A-Za-z_][A-Za-z0-9_]*)\.)?([A-Za-z_][A-Za-z0-9_]*)$").expect("table pattern")
});

pub struct QueryPlanner<'a> {
    grains: &'a GrainSettings,
}

impl<'a> QueryPlanner<'a> {
    pub fn new(grains: &'a GrainSettings) -> Self {
        Self { grains }
    }

    pub fn plan(
        &self,
        request: &ResolvedRequest,
        restrictions: &[RoleRestriction],
    ) -> CompileResult<QueryPlan> {
        if request.measures.is_empty() && request.dimensions.is_empty() {
            return Err(CompileError::EmptySelection);
        }
        self.check_grain(request)?;

        // Cube sources, first-touch order.
        let mut cube_aliases = AliasAllocator::default();
        let mut aliases: HashMap<String, String> = HashMap::new();
        let mut sources = Vec::with_capacity(request.cubes.len());
        for cube in &request.cubes {
            let alias = cube_aliases.allocate(&cube.name.to_snake_case());
            aliases.insert(cube.name.clone(), alias.clone());
            sources.push(PlanSource {
                cube: cube.name.clone(),
                alias,
                source: table_source(&cube.sql),
            });
        }
        let alias_of = |cube: &str| alias_for(&aliases, cube);

        let mut joins = Vec::with_capacity(request.joins.len());
        for step in &request.joins {
            let table = sources
                .iter()
                .find(|s| s.cube == step.right)
                .cloned()
                .ok_or_else(|| CompileError::UnknownCube(step.right.clone()))?;
            let left = key_column(request, &step.left, &step.key, &alias_of(&step.left)?)?;
            let right = key_column(request, &step.right, &step.key, &table.alias)?;
            joins.push(PlanJoin { table, left, right });
        }

        let mut column_aliases = AliasAllocator::default();

        let mut dimensions = Vec::with_capacity(request.dimensions.len());
        for d in &request.dimensions {
            let grain = request.grain.filter(|_| d.dimension.is_time());
            let mut name = d.qualified_name();
            let mut alias = format!(
                "{}__{}",
                d.cube.to_snake_case(),
                d.dimension.name.to_snake_case()
            );
            if let Some(grain) = grain {
                name = format!("{}.{}", name, grain);
                alias = format!("{}__{}", alias, grain);
            }
            dimensions.push(PlanDimension {
                name,
                alias: column_aliases.allocate(&alias),
                expr: column_expr(&d.dimension.sql, &alias_of(&d.cube)?),
                grain,
                column_type: d.dimension.dimension_type,
                meta: d.dimension.meta.clone(),
            });
        }

        let mut measures = Vec::with_capacity(request.measures.len());
        for m in &request.measures {
            let alias = format!(
                "{}__{}",
                m.cube.to_snake_case(),
                m.measure.name.to_snake_case()
            );
            measures.push(PlanMeasure {
                name: m.qualified_name(),
                alias: column_aliases.allocate(&alias),
                aggregate: aggregate(&m.measure, &alias_of(&m.cube)?),
                meta: m.measure.meta.clone(),
            });
        }

        // Parameters are allocated in render order: WHERE, then HAVING.
        let mut params = Vec::new();

        let mut where_predicates = Vec::new();
        for resolved in &request.filters {
            if let FilterTarget::Dimension(d) = &resolved.target {
                let expr = column_expr(&d.dimension.sql, &alias_of(&d.cube)?);
                let target = PredicateTarget::Column(expr);
                where_predicates.push(predicate(target, &resolved.filter, &mut params)?);
            }
        }
        for restriction in restrictions {
            let d = &restriction.dimension;
            let expr = column_expr(&d.dimension.sql, &alias_of(&d.cube)?);
            let target = PredicateTarget::Column(expr);
            let indices = restriction
                .allowed
                .iter()
                .map(|v| {
                    let value = FilterValue::from_variation_value(v, d.dimension.dimension_type)
                        .ok_or_else(|| {
                            CompileError::invalid_schema(
                                &d.cube,
                                format!(
                                    "variation value '{}' of '{}' is not bindable",
                                    v, d.dimension.name
                                ),
                            )
                        })?;
                    Ok(bind(&mut params, value))
                })
                .collect::<CompileResult<Vec<_>>>()?;
            where_predicates.push(Predicate {
                target,
                kind: PredicateKind::In(indices),
            });
        }

        let mut having_predicates = Vec::new();
        for resolved in &request.filters {
            if let FilterTarget::Measure(m) = &resolved.target {
                if matches!(
                    resolved.filter.operator,
                    FilterOperator::Contains
                        | FilterOperator::NotContains
                        | FilterOperator::InDateRange
                        | FilterOperator::NotInDateRange
                ) {
                    return Err(CompileError::invalid_filter(
                        &resolved.filter.member,
                        format!(
                            "operator '{}' does not apply to a measure",
                            resolved.filter.operator
                        ),
                    ));
                }
                let target =
                    PredicateTarget::Aggregate(aggregate(&m.measure, &alias_of(&m.cube)?));
                having_predicates.push(predicate(target, &resolved.filter, &mut params)?);
            }
        }

        debug!(
            sources = sources.len(),
            joins = joins.len(),
            where_predicates = where_predicates.len(),
            having_predicates = having_predicates.len(),
            params = params.len(),
            "planned query"
        );

        Ok(QueryPlan {
            sources,
            joins,
            dimensions,
            measures,
            where_predicates,
            having_predicates,
            params,
        })
    }

    fn check_grain(&self, request: &ResolvedRequest) -> CompileResult<()> {
        let Some(grain) = request.grain else {
            return Ok(());
        };
        if !self.grains.allows(grain) {
            return Err(CompileError::InvalidGrain(format!(
                "'{}' is not an allowed grain",
                grain
            )));
        }
        if !request.dimensions.iter().any(|d| d.dimension.is_time()) {
            return Err(CompileError::InvalidGrain(format!(
                "'{}' requested without a time dimension",
                grain
            )));
        }
        Ok(())
    }
}

/// Hands out unique aliases, suffixing `_2`, `_3`, ... on collision.
#[derive(Debug, Default)]
struct AliasAllocator {
    used: HashSet<String>,
}

impl AliasAllocator {
    fn allocate(&mut self, base: &str) -> String {
        let base = if base.is_empty() { "t" } else { base };
        let mut candidate = base.to_string();
        let mut n = 2;
        while self.used.contains(&candidate) {
            candidate = format!("{}_{}", base, n);
            n += 1;
        }
        self.used.insert(candidate.clone());
        candidate
    }
}

fn alias_for(aliases: &HashMap<String, String>, cube: &str) -> CompileResult<String> {
    aliases
        .get(cube)
        .cloned()
        .ok_or_else(|| CompileError::UnknownCube(cube.into()))
}

fn column_expr(sql: &str, alias: &str) -> ColumnExpr {
    let sql = sql.trim();
    if IDENTIFIER.is_match(sql) {
        ColumnExpr::Column {
            alias: alias.into(),
            column: sql.into(),
        }
    } else {
        ColumnExpr::Trusted {
            sql: sql.into(),
            alias: alias.into(),
        }
    }
}

fn table_source(sql: &str) -> TableSource {
    let sql = sql.trim();
    match TABLE_NAME.captures(sql) {
        Some(caps) => TableSource::Named {
            schema: caps.get(1).map(|m| m.as_str().to_string()),
            table: caps[2].to_string(),
        },
        None => TableSource::Derived(sql.into()),
    }
}

fn aggregate(measure: &Measure, alias: &str) -> Aggregate {
    Aggregate {
        kind: measure.kind,
        expr: measure.sql.as_deref().map(|sql| column_expr(sql, alias)),
    }
}

fn key_column(
    request: &ResolvedRequest,
    cube: &str,
    key: &str,
    alias: &str,
) -> CompileResult<ColumnExpr> {
    let owner: &Cube = request
        .cubes
        .iter()
        .find(|c| c.name == cube)
        .ok_or_else(|| CompileError::UnknownCube(cube.into()))?;
    let dimension = owner
        .dimension(key)
        .ok_or_else(|| CompileError::unknown_field(cube, key))?;
    Ok(column_expr(&dimension.sql, alias))
}

fn bind(params: &mut Vec<FilterValue>, value: FilterValue) -> usize {
    params.push(value);
    params.len() - 1
}

/// `%value%` with LIKE metacharacters escaped.
fn contains_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if c == '%' || c == '_' || c == LIKE_ESCAPE {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn predicate(
    target: PredicateTarget,
    filter: &Filter,
    params: &mut Vec<FilterValue>,
) -> CompileResult<Predicate> {
    let values = &filter.values;
    let first = || {
        values
            .first()
            .cloned()
            .ok_or_else(|| CompileError::invalid_filter(&filter.member, "missing value"))
    };

    let kind = match filter.operator {
        FilterOperator::Equals | FilterOperator::NotEquals => {
            let negated = filter.operator == FilterOperator::NotEquals;
            if values.len() == 1 {
                let index = bind(params, first()?);
                if negated {
                    PredicateKind::Ne(index)
                } else {
                    PredicateKind::Eq(index)
                }
            } else {
                let indices = values.iter().map(|v| bind(params, v.clone())).collect();
                if negated {
                    PredicateKind::NotIn(indices)
                } else {
                    PredicateKind::In(indices)
                }
            }
        }
        FilterOperator::Contains | FilterOperator::NotContains => {
            let FilterValue::String(s) = first()? else {
                return Err(CompileError::invalid_filter(
                    &filter.member,
                    "contains takes a string value",
                ));
            };
            PredicateKind::Like {
                pattern: bind(params, FilterValue::String(contains_pattern(&s))),
                negated: filter.operator == FilterOperator::NotContains,
            }
        }
        FilterOperator::Gt => PredicateKind::Compare(Comparison::Gt, bind(params, first()?)),
        FilterOperator::Gte => PredicateKind::Compare(Comparison::Gte, bind(params, first()?)),
        FilterOperator::Lt => PredicateKind::Compare(Comparison::Lt, bind(params, first()?)),
        FilterOperator::Lte => PredicateKind::Compare(Comparison::Lte, bind(params, first()?)),
        FilterOperator::Set => PredicateKind::IsNull { negated: true },
        FilterOperator::NotSet => PredicateKind::IsNull { negated: false },
        FilterOperator::InDateRange | FilterOperator::NotInDateRange => {
            let [low, high] = values.as_slice() else {
                return Err(CompileError::invalid_filter(
                    &filter.member,
                    "date range takes exactly two values",
                ));
            };
            PredicateKind::Between {
                low: bind(params, low.clone()),
                high: bind(params, high.clone()),
                negated: filter.operator == FilterOperator::NotInDateRange,
            }
        }
    };

    Ok(Predicate { target, kind })
}
