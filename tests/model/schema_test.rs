#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;

use common::*;
use semcube::prelude::*;
use serde_json::json;

#[test]
fn test_parse_revenue_declaration() {
    let cube = Cube::try_from(CubeDef::from_json(revenue_def()).unwrap()).unwrap();

    assert_eq!(cube.name, "Revenue");
    assert!(cube.sql.starts_with("SELECT f.*, r.region_name"));

    let net = cube.measure("netRevenue").unwrap();
    assert_eq!(net.kind, AggregationKind::Sum);
    assert_eq!(net.sql.as_deref(), Some("amount"));
    assert_eq!(net.meta["certification_tier"], 1);

    let count = cube.measure("count").unwrap();
    assert_eq!(count.kind, AggregationKind::Count);
    assert!(count.sql.is_none());

    let region = cube.dimension("region").unwrap();
    assert_eq!(region.dimension_type, SemanticType::String);
    assert_eq!(region.variation_for("finance").unwrap().values, FINANCE_REGIONS);
    assert_eq!(region.variation_for("sales").unwrap().values, SALES_REGIONS);
    assert!(region.variation_for("marketing").is_none());
    // Variations stay visible in meta for consumers of the result shape.
    assert!(region.meta.contains_key("variations"));

    assert!(cube.dimension("transactionDate").unwrap().is_time());
    assert_eq!(cube.joins["Targets"].key, "region");
}

#[test]
fn test_registry_lookup() {
    let registry = registry();
    assert_eq!(registry.len(), 3);
    assert_eq!(
        registry.cubes().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        ["Inventory", "Revenue", "Targets"]
    );
    assert!(registry.lookup_measure("Revenue", "netRevenue").is_ok());
    assert!(matches!(
        registry.lookup_dimension("Revenue", "country"),
        Err(CompileError::UnknownField { .. })
    ));
    assert!(matches!(
        registry.lookup("Orders"),
        Err(CompileError::UnknownCube(_))
    ));
}

#[test]
fn test_duplicate_cube() {
    let defs = [revenue_def(), revenue_def()]
        .into_iter()
        .map(|v| CubeDef::from_json(v).unwrap());
    let err = SchemaRegistry::from_defs(defs).unwrap_err();
    assert!(matches!(err, CompileError::DuplicateCube(ref name) if name == "Revenue"));
}

#[test]
fn test_invalid_declarations() {
    let cases = [
        // Unknown aggregation.
        json!({
            "name": "A", "sql": "a",
            "measures": { "p90": { "sql": "x", "type": "percentile" } }
        }),
        // Sum without an expression.
        json!({
            "name": "B", "sql": "b",
            "measures": { "total": { "type": "sum" } }
        }),
        // Unknown dimension type.
        json!({
            "name": "C", "sql": "c",
            "dimensions": { "geo": { "sql": "g", "type": "geometry" } }
        }),
        // Join key that is not a local dimension.
        json!({
            "name": "D", "sql": "d",
            "joins": { "A": { "key": "region" } }
        }),
        // Malformed variations.
        json!({
            "name": "E", "sql": "e",
            "dimensions": {
                "region": { "sql": "r", "type": "string", "meta": { "variations": ["JP"] } }
            }
        }),
    ];

    for case in cases {
        let name = case["name"].as_str().unwrap().to_string();
        let result = CubeDef::from_json(case).and_then(Cube::try_from);
        assert!(result.is_err(), "cube {name} should be rejected");
    }
}

#[test]
fn test_count_distinct_spelling() {
    let def = CubeDef::from_json(inventory_def()).unwrap();
    let cube = Cube::try_from(def).unwrap();
    assert_eq!(cube.measure("skus").unwrap().kind, AggregationKind::CountDistinct);
}

#[test]
fn test_programmatic_cube() {
    let cube = Cube::new("Orders", "shop.orders")
        .with_measure(Measure::new("count", AggregationKind::Count, None))
        .with_dimension(
            Dimension::new("status", SemanticType::String, "status")
                .with_variation(Variation::new("support", ["open", "open", "pending"])),
        );
    let status = cube.dimension("status").unwrap();
    assert_eq!(status.variation_for("support").unwrap().values, ["open", "pending"]);
    assert!(status.variation_for("support").unwrap().allows("pending"));

    let mut registry = SchemaRegistry::new();
    registry.register(cube).unwrap();
    assert!(!registry.is_empty());
}

#[test]
fn test_global_registry() {
    let registry = registry();
    assert!(SchemaRegistry::install_global(Arc::clone(&registry)).is_ok());
    assert!(SchemaRegistry::install_global(Arc::clone(&registry)).is_err());

    let global = SchemaRegistry::global().unwrap();
    assert!(Arc::ptr_eq(&global, &registry));
}
