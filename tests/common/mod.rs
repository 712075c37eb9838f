//! Shared fixtures: the Revenue cube and two neighbours.
//!
//! - `Revenue` joins `Targets` on `region`.
//! - `Inventory` declares no joins.

#![allow(dead_code)]

use std::sync::Arc;

use semcube::prelude::*;
use serde_json::{json, Value};
use sqlparser::dialect::{
    BigQueryDialect, DuckDbDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect,
    SnowflakeDialect,
};
use sqlparser::parser::Parser;

pub const FINANCE_REGIONS: [&str; 9] = ["JP", "KR", "SG", "HK", "TW", "AU", "NZ", "IN", "CN"];
pub const SALES_REGIONS: [&str; 7] = ["JP", "KR", "SG", "HK", "TW", "IN", "CN"];

pub fn revenue_def() -> Value {
    json!({
        "name": "Revenue",
        "sql": "SELECT f.*, r.region_name FROM fact_revenue_daily f JOIN dim_region r ON f.region_code = r.region_code WHERE f.type = 'recognized'",
        "measures": {
            "netRevenue": {
                "sql": "amount",
                "type": "sum",
                "meta": {
                    "certification_tier": 1,
                    "definition": "Recognized revenue per ASC 606 minus refunds"
                }
            },
            "count": { "type": "count" }
        },
        "dimensions": {
            "region": {
                "sql": "region_code",
                "type": "string",
                "meta": {
                    "variations": {
                        "finance": FINANCE_REGIONS,
                        "sales": SALES_REGIONS
                    }
                }
            },
            "fiscalPeriod": { "sql": "fiscal_period", "type": "string" },
            "transactionDate": { "sql": "transaction_date", "type": "time" }
        },
        "joins": { "Targets": { "key": "region" } }
    })
}

pub fn targets_def() -> Value {
    json!({
        "name": "Targets",
        "sql": "dw.region_targets",
        "measures": {
            "target": { "sql": "target_amount", "type": "sum" }
        },
        "dimensions": {
            "region": { "sql": "region", "type": "string" },
            "owner": { "sql": "{CUBE}.owner_first || ' ' || {CUBE}.owner_last", "type": "string" }
        }
    })
}

pub fn inventory_def() -> Value {
    json!({
        "name": "Inventory",
        "sql": "inventory_snapshot",
        "measures": {
            "units": { "sql": "units", "type": "sum" },
            "skus": { "sql": "sku", "type": "countDistinct" }
        },
        "dimensions": {
            "sku": { "sql": "sku", "type": "string" }
        }
    })
}

pub fn registry() -> Arc<SchemaRegistry> {
    let defs = [revenue_def(), targets_def(), inventory_def()]
        .into_iter()
        .map(|v| CubeDef::from_json(v).expect("fixture parses"));
    Arc::new(SchemaRegistry::from_defs(defs).expect("fixture registers"))
}

pub fn compiler(settings: Settings) -> Compiler {
    Compiler::new(registry(), settings).expect("fixture joins resolve")
}

pub fn compile(request: &QueryRequest) -> Arc<CompiledQuery> {
    compiler(Settings::default())
        .compile(request)
        .expect("request compiles")
}

/// Assert the SQL parses for the dialect.
pub fn assert_parses(sql: &str, dialect: Dialect) {
    let result = match dialect {
        Dialect::Postgres => Parser::parse_sql(&PostgreSqlDialect {}, sql),
        Dialect::DuckDb => Parser::parse_sql(&DuckDbDialect {}, sql),
        Dialect::MySql => Parser::parse_sql(&MySqlDialect {}, sql),
        Dialect::TSql => Parser::parse_sql(&MsSqlDialect {}, sql),
        Dialect::Snowflake => Parser::parse_sql(&SnowflakeDialect {}, sql),
        Dialect::BigQuery => Parser::parse_sql(&BigQueryDialect {}, sql),
    };
    if let Err(e) = result {
        panic!("{} SQL does not parse: {}\n{}", dialect, e, sql);
    }
}

pub fn strings(values: &[FilterValue]) -> Vec<String> {
    values
        .iter()
        .map(|v| match v {
            FilterValue::String(s) => s.clone(),
            other => panic!("expected string param, got {:?}", other),
        })
        .collect()
}
