mod common;

use common::write_config;
use rpa_loop::domain::config::ConfigValue;
use rpa_loop::domain::ports::ConfigSource;
use rpa_loop::error::ConfigError;
use rpa_loop::interfaces::csv::config_reader::CsvConfigSource;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_loaded_values_match_source_literals() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.csv");
    let rows = [
        ("max_system_retry", "2"),
        ("max_business_retry", "0"),
        ("mail_port", "587"),
        ("offset", "-3"),
        ("threshold", "0.25"),
        ("vault_url", "https://vault.example"),
        ("process_name", "invoice-bot"),
        ("account_code", "00123"),
        ("dial_prefix", "+44"),
        ("adjustment", "+1.5"),
    ];
    write_config(&path, &rows).unwrap();

    let config = CsvConfigSource::new(Some(path)).load().await.unwrap();

    assert_eq!(config.len(), rows.len());
    for (key, literal) in rows {
        assert_eq!(config.get(key).unwrap().to_string(), literal, "key {key}");
    }
    assert_eq!(config.get("mail_port").unwrap(), &ConfigValue::Integer(587));
    assert_eq!(config.get("offset").unwrap().as_integer(), Some(-3));
    assert_eq!(config.get("threshold").unwrap(), &ConfigValue::Decimal(dec!(0.25)));
    assert_eq!(config.get("account_code").unwrap().as_str(), Some("00123"));
    assert_eq!(config.get("dial_prefix").unwrap().as_integer(), None);
    assert_eq!(config.get("adjustment").unwrap(), &ConfigValue::from("+1.5"));
}

#[tokio::test]
async fn test_duplicate_keys_are_a_configuration_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.csv");
    write_config(
        &path,
        &[
            ("max_system_retry", "1"),
            ("max_business_retry", "1"),
            ("max_system_retry", "4"),
        ],
    )
    .unwrap();

    let result = CsvConfigSource::new(Some(path)).load().await;
    assert!(matches!(result, Err(ConfigError::DuplicateKey(key)) if key == "max_system_retry"));
}

#[tokio::test]
async fn test_non_numeric_budget_is_a_configuration_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.csv");
    write_config(&path, &[("max_system_retry", "twice"), ("max_business_retry", "0")]).unwrap();

    let result = CsvConfigSource::new(Some(path)).load().await;
    assert!(matches!(result, Err(ConfigError::NotANumber { .. })));
}
