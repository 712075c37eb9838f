//! End-to-end compilation of the Revenue cube.

#[path = "../common/mod.rs"]
mod common;

use common::*;
use semcube::prelude::*;

#[test]
fn test_sales_role_revenue_by_region() {
    let request = QueryRequest::new("Revenue")
        .measure("netRevenue")
        .measure("count")
        .dimension("region")
        .role("sales");
    let compiled = compile(&request);

    insta::assert_snapshot!(compiled.sql, @r#"
    SELECT
      "revenue"."region_code" AS "revenue__region",
      SUM("revenue"."amount") AS "revenue__net_revenue",
      COUNT(*) AS "revenue__count"
    FROM (SELECT f.*, r.region_name FROM fact_revenue_daily f JOIN dim_region r ON f.region_code = r.region_code WHERE f.type = 'recognized') AS "revenue"
    WHERE "revenue"."region_code" IN ($1, $2, $3, $4, $5, $6, $7)
    GROUP BY "revenue"."region_code"
    "#);
    assert_eq!(strings(&compiled.params), SALES_REGIONS);
    assert_parses(&compiled.sql, Dialect::Postgres);
}

#[test]
fn test_group_by_matches_dimensions() {
    let request = QueryRequest::new("Revenue")
        .measure("netRevenue")
        .dimension("region")
        .dimension("fiscalPeriod")
        .role("finance");
    let compiled = compile(&request);

    let group_by = compiled
        .sql
        .lines()
        .find(|l| l.starts_with("GROUP BY"))
        .expect("has GROUP BY");
    assert_eq!(group_by.matches(", ").count() + 1, 2);
    assert_eq!(compiled.sql.matches("SUM(").count(), 1);
}

#[test]
fn test_repeated_measure_selected_once() {
    let request = QueryRequest::new("Revenue")
        .measure("netRevenue")
        .measure("Revenue.netRevenue")
        .dimension("fiscalPeriod");
    let compiled = compile(&request);
    assert_eq!(compiled.sql.matches("SUM(").count(), 1);
    assert_eq!(compiled.result_shape.len(), 2);
}

#[test]
fn test_measures_only_has_no_group_by() {
    let compiled = compile(&QueryRequest::new("Revenue").measure("count"));
    assert!(!compiled.sql.contains("GROUP BY"));
    assert!(compiled.params.is_empty());
}

#[test]
fn test_result_shape_carries_metadata() {
    let request = QueryRequest::new("Revenue")
        .measure("netRevenue")
        .dimension("region")
        .role("finance");
    let compiled = compile(&request);

    let names: Vec<_> = compiled.result_shape.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Revenue.region", "Revenue.netRevenue"]);

    let revenue = &compiled.result_shape[1];
    assert_eq!(revenue.kind, ColumnKind::Measure);
    assert_eq!(revenue.column_type, SemanticType::Number);
    assert_eq!(revenue.meta["certification_tier"], 1);
    assert_eq!(
        revenue.meta["definition"],
        "Recognized revenue per ASC 606 minus refunds"
    );

    let json = serde_json::to_value(&*compiled).unwrap();
    assert_eq!(json["resultShape"][1]["columnType"], "number");
    assert_eq!(json["resultShape"][0]["kind"], "dimension");
}

#[test]
fn test_time_grain() {
    let request = QueryRequest::new("Revenue")
        .measure("netRevenue")
        .dimension("transactionDate")
        .grain(TimeGrain::Month);
    let compiled = compile(&request);

    assert!(compiled.sql.contains(
        r#"DATE_TRUNC('month', "revenue"."transaction_date") AS "revenue__transaction_date__month""#
    ));
    assert_eq!(compiled.result_shape[0].name, "Revenue.transactionDate.month");
    assert_eq!(compiled.result_shape[0].grain, Some(TimeGrain::Month));
}

#[test]
fn test_filters_are_bound() {
    let request = QueryRequest::new("Revenue")
        .measure("netRevenue")
        .dimension("fiscalPeriod")
        .filter(Filter::equals("fiscalPeriod", ["FY24'; DROP TABLE x; --"]))
        .filter(Filter::new("netRevenue", FilterOperator::Gt, [1000i64]));
    let compiled = compile(&request);

    assert!(!compiled.sql.contains("DROP TABLE"));
    assert!(compiled.sql.contains(r#"WHERE "revenue"."fiscal_period" = $1"#));
    assert!(compiled.sql.contains(r#"HAVING SUM("revenue"."amount") > $2"#));
    assert_eq!(
        compiled.params,
        vec![
            FilterValue::String("FY24'; DROP TABLE x; --".into()),
            FilterValue::Int(1000)
        ]
    );
}

#[test]
fn test_request_from_json() {
    let request: QueryRequest = serde_json::from_value(serde_json::json!({
        "cube": "Revenue",
        "measures": ["netRevenue"],
        "dimensions": ["region"],
        "filters": [{ "dimension": "region", "operator": "equals", "value": "JP" }],
        "role": "sales"
    }))
    .unwrap();
    let compiled = compile(&request);
    assert_eq!(strings(&compiled.params), ["JP"]);
}

#[test]
fn test_errors() {
    let compiler = compiler(Settings::default());

    let err = compiler.compile(&QueryRequest::new("Revenue")).unwrap_err();
    assert!(matches!(err, CompileError::EmptySelection));

    let err = compiler
        .compile(&QueryRequest::new("Revenue").measure("grossRevenue"))
        .unwrap_err();
    assert!(matches!(
        err,
        CompileError::UnknownField { ref cube, ref field } if cube == "Revenue" && field == "grossRevenue"
    ));

    let err = compiler
        .compile(&QueryRequest::new("Bookings").measure("count"))
        .unwrap_err();
    assert!(matches!(err, CompileError::UnknownCube(ref c) if c == "Bookings"));

    let err = compiler
        .compile(
            &QueryRequest::new("Revenue")
                .measure("count")
                .dimension("region")
                .grain(TimeGrain::Month),
        )
        .unwrap_err();
    assert!(matches!(err, CompileError::InvalidGrain(_)));
}
