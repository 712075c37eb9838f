//! Determinism and plan cache behavior.

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;
use std::thread;

use common::*;
use semcube::prelude::*;

fn request() -> QueryRequest {
    QueryRequest::new("Revenue")
        .measure("netRevenue")
        .measure("count")
        .dimension("region")
        .dimension("fiscalPeriod")
        .filter(Filter::equals("fiscalPeriod", ["FY24", "FY23"]))
        .role("sales")
}

#[test]
fn test_output_is_byte_identical_across_compilers() {
    let mut settings = Settings::default();
    settings.cache.enabled = false;

    let first = compiler(settings.clone()).compile(&request()).unwrap();
    for _ in 0..5 {
        let again = compiler(settings.clone()).compile(&request()).unwrap();
        assert_eq!(again.sql, first.sql);
        assert_eq!(again.params, first.params);
        assert_eq!(again.fingerprint, first.fingerprint);
    }
}

#[test]
fn test_second_compile_hits_cache() {
    let compiler = compiler(Settings::default());
    let a = compiler.compile(&request()).unwrap();
    let b = compiler.compile(&request()).unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    let stats = compiler.cache_stats().unwrap();
    assert_eq!((stats.entries, stats.hits, stats.misses), (1, 1, 1));
}

#[test]
fn test_filter_order_does_not_change_fingerprint() {
    let compiler = compiler(Settings::default());
    let a = compiler
        .compile(
            &QueryRequest::new("Revenue")
                .measure("count")
                .filter(Filter::equals("fiscalPeriod", ["FY24"]))
                .filter(Filter::new("Revenue.netRevenue", FilterOperator::Gt, [10i64])),
        )
        .unwrap();
    let b = compiler
        .compile(
            &QueryRequest::new("Revenue")
                .measure("Revenue.count")
                .filter(Filter::new("netRevenue", FilterOperator::Gt, [10i64]))
                .filter(Filter::equals("Revenue.fiscalPeriod", ["FY24"])),
        )
        .unwrap();

    assert_eq!(a.fingerprint, b.fingerprint);
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn test_field_order_is_not_served_from_another_request() {
    let a = QueryRequest::new("Revenue")
        .measure("netRevenue")
        .measure("Targets.target")
        .dimension("region")
        .dimension("fiscalPeriod");
    let b = QueryRequest::new("Revenue")
        .measure("Targets.target")
        .measure("netRevenue")
        .dimension("fiscalPeriod")
        .dimension("region");

    let cold = compile(&b);

    let warm = compiler(Settings::default());
    let first = warm.compile(&a).unwrap();
    let after = warm.compile(&b).unwrap();

    assert_ne!(first.fingerprint, after.fingerprint);
    assert_eq!(after.sql, cold.sql);
    assert_eq!(after.params, cold.params);
    assert_eq!(after.result_shape, cold.result_shape);
    assert_eq!(warm.cache_stats().unwrap().entries, 2);
}

#[test]
fn test_fingerprint_covers_role_grain_and_dialect() {
    let base = compile(&request()).fingerprint.clone();

    let finance = compile(&request().role("finance")).fingerprint.clone();
    assert_ne!(base, finance);

    let tsql = compiler(Settings::default().with_dialect(Dialect::TSql))
        .compile(&request())
        .unwrap()
        .fingerprint
        .clone();
    assert_ne!(base, tsql);

    let by_day = |grain: TimeGrain| {
        compile(
            &QueryRequest::new("Revenue")
                .measure("count")
                .dimension("transactionDate")
                .grain(grain),
        )
        .fingerprint
        .clone()
    };
    assert_ne!(by_day(TimeGrain::Day), by_day(TimeGrain::Month));
}

#[test]
fn test_concurrent_compiles_share_one_entry() {
    let compiler = Arc::new(compiler(Settings::default()));

    let results: Vec<Arc<CompiledQuery>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let compiler = Arc::clone(&compiler);
                scope.spawn(move || compiler.compile(&request()).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for result in &results[1..] {
        assert_eq!(result.sql, results[0].sql);
        assert_eq!(result.params, results[0].params);
    }
    let stats = compiler.cache_stats().unwrap();
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.hits + stats.misses, 8);
}

#[test]
fn test_bounded_cache_still_compiles() {
    let mut settings = Settings::default();
    settings.cache.max_entries = Some(1);
    let compiler = compiler(settings);

    let first = compiler.compile(&request()).unwrap();
    let other = compiler.compile(&request().role("finance")).unwrap();
    assert_ne!(first.sql, other.sql);
    assert_eq!(compiler.cache_stats().unwrap().entries, 1);

    // The stored entry is still served.
    assert!(Arc::ptr_eq(&first, &compiler.compile(&request()).unwrap()));
}

#[test]
fn test_clear_cache() {
    let compiler = compiler(Settings::default());
    let a = compiler.compile(&request()).unwrap();
    compiler.clear_cache();
    let b = compiler.compile(&request()).unwrap();

    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(a, b);
}
