//! Role-scoped dimension visibility.

#[path = "../common/mod.rs"]
mod common;

use common::*;
use semcube::prelude::*;

fn by_region(role: &str) -> QueryRequest {
    QueryRequest::new("Revenue")
        .measure("netRevenue")
        .dimension("region")
        .role(role)
}

#[test]
fn test_finance_sees_nine_regions() {
    let compiled = compile(&by_region("finance"));
    assert!(compiled
        .sql
        .contains(r#""revenue"."region_code" IN ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#));
    assert_eq!(strings(&compiled.params), FINANCE_REGIONS);
}

#[test]
fn test_roles_compile_to_different_sql() {
    let compiler = compiler(Settings::default());
    let sales = compiler.compile(&by_region("sales")).unwrap();
    let finance = compiler.compile(&by_region("finance")).unwrap();

    assert_ne!(sales.fingerprint, finance.fingerprint);
    assert_ne!(sales.sql, finance.sql);
    assert!(!strings(&sales.params).contains(&"AU".to_string()));
}

#[test]
fn test_unlisted_role_open_by_default() {
    let compiled = compile(&by_region("marketing"));
    assert!(!compiled.sql.contains("WHERE"));
    assert!(compiled.params.is_empty());
}

#[test]
fn test_explicit_value_outside_role_rejected() {
    let compiler = compiler(Settings::default());
    let request = by_region("sales").filter(Filter::equals("region", ["AU"]));

    let err = compiler.compile(&request).unwrap_err();
    match err {
        CompileError::VariationViolation {
            role, dimension, ..
        } => {
            assert_eq!(role, "sales");
            assert_eq!(dimension, "Revenue.region");
        }
        other => panic!("expected VariationViolation, got {other:?}"),
    }
}

#[test]
fn test_explicit_value_inside_role_needs_no_restriction() {
    let request = by_region("sales").filter(Filter::equals("region", ["KR", "JP"]));
    let compiled = compile(&request);

    assert!(compiled
        .sql
        .contains(r#"WHERE "revenue"."region_code" IN ($1, $2)"#));
    assert_eq!(strings(&compiled.params), ["JP", "KR"]);
}

#[test]
fn test_filter_only_mention_is_restricted() {
    let request = QueryRequest::new("Revenue")
        .measure("count")
        .filter(Filter::not_equals("region", ["JP"]))
        .role("sales");
    let compiled = compile(&request);

    assert!(compiled.sql.contains(
        r#"WHERE "revenue"."region_code" <> $1 AND "revenue"."region_code" IN ($2, $3, $4, $5, $6, $7, $8)"#
    ));
    assert_eq!(compiled.params.len(), 8);
}

#[test]
fn test_predicate_enforcement_restricts_instead_of_rejecting() {
    let compiler = compiler(Settings::default().with_enforcement(VariationEnforcement::Predicate));
    let request = by_region("sales").filter(Filter::equals("region", ["AU"]));

    let compiled = compiler.compile(&request).unwrap();
    assert!(compiled.sql.contains(
        r#"WHERE "revenue"."region_code" = $1 AND "revenue"."region_code" IN ($2, $3, $4, $5, $6, $7, $8)"#
    ));
    let params = strings(&compiled.params);
    assert_eq!(params[0], "AU");
    assert_eq!(params[1..], SALES_REGIONS);
}

#[test]
fn test_deny_policy() {
    let compiler = compiler(Settings::default().with_variation_policy(VariationPolicy::Deny));

    let err = compiler.compile(&by_region("marketing")).unwrap_err();
    assert!(matches!(err, CompileError::VariationViolation { .. }));

    // Listed roles and unvaried dimensions are unaffected.
    assert!(compiler.compile(&by_region("sales")).is_ok());
    let request = QueryRequest::new("Revenue")
        .measure("count")
        .dimension("fiscalPeriod")
        .role("marketing");
    assert!(compiler.compile(&request).is_ok());
}

#[test]
fn test_empty_variation_rejects() {
    let revenue = CubeDef::from_json(serde_json::json!({
        "name": "Revenue",
        "sql": "fact_revenue",
        "measures": { "count": { "type": "count" } },
        "dimensions": {
            "region": {
                "sql": "region_code",
                "type": "string",
                "variations": { "intern": [] }
            }
        }
    }))
    .unwrap();
    let registry = SchemaRegistry::from_defs([revenue]).unwrap();
    let compiler = Compiler::new(std::sync::Arc::new(registry), Settings::default()).unwrap();

    let err = compiler
        .compile(&QueryRequest::new("Revenue").measure("count").dimension("region").role("intern"))
        .unwrap_err();
    assert!(matches!(err, CompileError::VariationViolation { .. }));
}
