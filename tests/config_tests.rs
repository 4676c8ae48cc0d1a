// Config loading and validation tests

use servertrack::config::AppConfig;

const VALID_CONFIG: &str = r#"
[ingest]
input_path = "./data/reports.csv"
queue_poll_ms = 25

[aggregator]
shutdown_timeout_secs = 10
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.ingest.input_path, "./data/reports.csv");
    assert_eq!(config.ingest.queue_poll_ms, 25);
    assert_eq!(config.aggregator.shutdown_timeout_secs, 10);
}

#[test]
fn test_empty_config_uses_defaults() {
    let config = AppConfig::load_from_str("").expect("empty config");
    assert_eq!(config.ingest.input_path, "./input.csv");
    assert_eq!(config.ingest.queue_poll_ms, 10);
    assert_eq!(config.aggregator.shutdown_timeout_secs, 5);
}

#[test]
fn test_partial_config_fills_missing_sections() {
    let config = AppConfig::load_from_str("[ingest]\ninput_path = \"x.csv\"\n").unwrap();
    assert_eq!(config.ingest.input_path, "x.csv");
    assert_eq!(config.ingest.queue_poll_ms, 10);
    assert_eq!(config.aggregator.shutdown_timeout_secs, 5);
}

#[test]
fn test_config_validation_rejects_empty_input_path() {
    let bad = VALID_CONFIG.replace("input_path = \"./data/reports.csv\"", "input_path = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("ingest.input_path"));
}

#[test]
fn test_config_validation_rejects_zero_poll_interval() {
    let bad = VALID_CONFIG.replace("queue_poll_ms = 25", "queue_poll_ms = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("queue_poll_ms"));
}

#[test]
fn test_config_validation_rejects_zero_shutdown_timeout() {
    let bad = VALID_CONFIG.replace("shutdown_timeout_secs = 10", "shutdown_timeout_secs = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("shutdown_timeout_secs"));
}
