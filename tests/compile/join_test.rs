//! Multi-cube requests.

#[path = "../common/mod.rs"]
mod common;

use common::*;
use semcube::prelude::*;

#[test]
fn test_one_inner_join_per_extra_cube() {
    let request = QueryRequest::new("Revenue")
        .measure("netRevenue")
        .measure("Targets.target")
        .dimension("region");
    let compiled = compile(&request);

    assert_eq!(compiled.sql.matches("JOIN \"dw\"").count(), 1);
    assert_eq!(compiled.sql.matches("INNER JOIN").count(), 1);
    assert!(compiled.sql.contains(
        r#"INNER JOIN "dw"."region_targets" AS "targets" ON "revenue"."region_code" = "targets"."region""#
    ));
    assert!(compiled
        .sql
        .contains(r#"SUM("targets"."target_amount") AS "targets__target""#));
    assert_parses(&compiled.sql, Dialect::Postgres);
}

#[test]
fn test_join_from_undeclared_side() {
    // Targets declares no joins; the edge from Revenue is used in reverse.
    let request = QueryRequest::new("Targets")
        .measure("target")
        .dimension("Revenue.fiscalPeriod");
    let compiled = compile(&request);

    assert!(compiled.sql.contains(r#"FROM "dw"."region_targets" AS "targets""#));
    assert!(compiled
        .sql
        .contains(r#"AS "revenue" ON "targets"."region" = "revenue"."region_code""#));
}

#[test]
fn test_same_cube_through_filter_joins_once() {
    let request = QueryRequest::new("Revenue")
        .measure("netRevenue")
        .dimension("Targets.region")
        .filter(Filter::not_equals("Targets.region", ["AU"]));
    let compiled = compile(&request);

    assert_eq!(compiled.sql.matches("INNER JOIN").count(), 1);
    assert!(compiled.sql.contains(r#""targets"."region" <> $1"#));
}

#[test]
fn test_trusted_dimension_expression() {
    let request = QueryRequest::new("Targets")
        .measure("target")
        .dimension("owner")
        .filter(Filter::new("owner", FilterOperator::Contains, ["Tan"]));
    let compiled = compile(&request);

    assert!(compiled.sql.contains(
        r#""targets".owner_first || ' ' || "targets".owner_last AS "targets__owner""#
    ));
    assert!(compiled.sql.contains(
        r#"WHERE ("targets".owner_first || ' ' || "targets".owner_last) LIKE $1"#
    ));
    assert_eq!(strings(&compiled.params), ["%Tan%"]);
    assert_parses(&compiled.sql, Dialect::Postgres);
}

#[test]
fn test_unjoinable_cubes() {
    let compiler = compiler(Settings::default());
    let request = QueryRequest::new("Revenue")
        .measure("count")
        .measure("Inventory.units");

    let err = compiler.compile(&request).unwrap_err();
    assert!(matches!(
        err,
        CompileError::UnjoinableCubes { ref from, ref to } if from == "Revenue" && to == "Inventory"
    ));
    assert_eq!(compiler.cache_stats().unwrap().entries, 0);
}

#[test]
fn test_undeclared_join_target_rejected_at_startup() {
    let revenue = CubeDef::from_json(serde_json::json!({
        "name": "Revenue",
        "sql": "fact_revenue",
        "measures": { "count": { "type": "count" } },
        "dimensions": { "region": { "sql": "region_code", "type": "string" } },
        "joins": { "Forecast": { "key": "region" } }
    }))
    .unwrap();
    let registry = SchemaRegistry::from_defs([revenue]).unwrap();

    let err = Compiler::new(std::sync::Arc::new(registry), Settings::default()).unwrap_err();
    assert!(matches!(err, CompileError::InvalidSchema { ref cube, .. } if cube == "Revenue"));
    assert!(err.to_string().contains("Forecast"));
}

#[test]
fn test_grouping_by_joined_key_keeps_role_restriction() {
    let request = QueryRequest::new("Revenue")
        .measure("netRevenue")
        .dimension("Targets.region")
        .role("sales");
    let compiled = compile(&request);

    assert!(compiled
        .sql
        .contains(r#"WHERE "revenue"."region_code" IN ($1, $2, $3, $4, $5, $6, $7)"#));
    assert_eq!(strings(&compiled.params), SALES_REGIONS);
    assert_parses(&compiled.sql, Dialect::Postgres);
}
