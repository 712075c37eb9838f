use std::env;
use std::fs;
use std::path::PathBuf;

use semcube::config::{SettingsError, CONFIG_ENV_VAR};
use semcube::prelude::*;

fn temp_config(name: &str, content: &str) -> PathBuf {
    let path = env::temp_dir().join(format!("semcube-{}-{}.toml", name, std::process::id()));
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_from_file() {
    let path = temp_config(
        "from-file",
        r#"
[compiler]
dialect = "mysql"

[variations]
default_policy = "deny"

[cache]
max_entries = 64
"#,
    );

    let settings = Settings::from_file(&path).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(settings.compiler.dialect, Dialect::MySql);
    assert_eq!(settings.variations.default_policy, VariationPolicy::Deny);
    // Unset sections keep their defaults.
    assert_eq!(settings.variations.enforcement, VariationEnforcement::Strict);
    assert!(settings.grains.allows(TimeGrain::Quarter));
    assert!(settings.cache.enabled);
    assert_eq!(settings.cache.max_entries, Some(64));
}

#[test]
fn test_missing_file() {
    let err = Settings::from_file("/nonexistent/semcube.toml").unwrap_err();
    assert!(matches!(err, SettingsError::FileNotFound(_)));
}

#[test]
fn test_invalid_files() {
    let path = temp_config("bad-dialect", "[compiler]\ndialect = \"oracle\"\n");
    let err = Settings::from_file(&path).unwrap_err();
    fs::remove_file(&path).ok();
    assert!(matches!(err, SettingsError::ParseError(_)));

    let path = temp_config("no-grains", "[grains]\nallowed = []\n");
    let err = Settings::from_file(&path).unwrap_err();
    fs::remove_file(&path).ok();
    assert!(matches!(err, SettingsError::InvalidConfig(_)));
}

#[test]
fn test_load_from_env() {
    let path = temp_config("env", "[compiler]\ndialect = \"snowflake\"\n");
    env::set_var(CONFIG_ENV_VAR, &path);
    let settings = Settings::load();
    env::remove_var(CONFIG_ENV_VAR);
    fs::remove_file(&path).ok();

    assert_eq!(settings.unwrap().compiler.dialect, Dialect::Snowflake);
}

#[test]
fn test_configured_grains_limit_requests() {
    let settings = Settings::from_toml_str("[grains]\nallowed = [\"month\"]\n").unwrap();
    assert!(!settings.grains.allows(TimeGrain::Day));

    let cube = Cube::new("Revenue", "fact_revenue")
        .with_measure(Measure::new("count", AggregationKind::Count, None))
        .with_dimension(Dimension::new("day", SemanticType::Time, "transaction_date"));
    let registry = SchemaRegistry::from_cubes([cube]).unwrap();
    let compiler = Compiler::new(std::sync::Arc::new(registry), settings).unwrap();

    let request = QueryRequest::new("Revenue").measure("count").dimension("day");
    assert!(compiler.compile(&request.clone().grain(TimeGrain::Month)).is_ok());
    assert!(matches!(
        compiler.compile(&request.grain(TimeGrain::Day)),
        Err(CompileError::InvalidGrain(_))
    ));
}
