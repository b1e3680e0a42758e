//! Table-driven tests for configuration loading and validation.

use std::time::Duration;

use portal::config::load_config_from_str;
use portal::{load_config, ConfigError, PageRequest, StoreError};

/// Represents a single config loading test case.
struct ConfigTestCase {
    /// Test case name for identification.
    name: &'static str,
    /// The config JSON content to test.
    config_json: &'static str,
    /// Whether loading should succeed.
    should_succeed: bool,
    /// Expected error substring (if should_succeed is false).
    expected_error: Option<&'static str>,
}

const JSON_CONFIG_TESTS: &[ConfigTestCase] = &[
    ConfigTestCase {
        name: "valid_minimal",
        config_json: r#"{ "version": "1.0" }"#,
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "valid_full",
        config_json: r#"{
            "version": "1.0",
            "dataDirectory": "/var/lib/portal",
            "defaultPageSize": 25,
            "maxPageSize": 200,
            "simulatedLatencyMs": 300,
            "storageQuotaBytes": 5242880
        }"#,
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "missing_version",
        config_json: r#"{ "defaultPageSize": 10 }"#,
        should_succeed: false,
        expected_error: Some("Schema validation failed"),
    },
    ConfigTestCase {
        name: "unsupported_version",
        config_json: r#"{ "version": "0.9" }"#,
        should_succeed: false,
        expected_error: Some("Unsupported config version"),
    },
    ConfigTestCase {
        name: "zero_page_size",
        config_json: r#"{ "version": "1.0", "defaultPageSize": 0 }"#,
        should_succeed: false,
        expected_error: Some("/defaultPageSize: "),
    },
    ConfigTestCase {
        name: "negative_latency",
        config_json: r#"{ "version": "1.0", "simulatedLatencyMs": -5 }"#,
        should_succeed: false,
        expected_error: Some("/simulatedLatencyMs: "),
    },
    ConfigTestCase {
        name: "latency_over_a_minute",
        config_json: r#"{ "version": "1.0", "simulatedLatencyMs": 120000 }"#,
        should_succeed: false,
        expected_error: Some("Schema validation failed"),
    },
    ConfigTestCase {
        name: "default_above_max",
        config_json: r#"{ "version": "1.0", "defaultPageSize": 30, "maxPageSize": 10 }"#,
        should_succeed: false,
        expected_error: Some("exceeds maxPageSize"),
    },
    ConfigTestCase {
        name: "unknown_key",
        config_json: r#"{ "version": "1.0", "pageSize": 10 }"#,
        should_succeed: false,
        expected_error: Some("Schema validation failed"),
    },
    ConfigTestCase {
        name: "not_json",
        config_json: "version = 1.0",
        should_succeed: false,
        expected_error: Some("Failed to parse config JSON"),
    },
];

#[test]
fn test_json_config_loading() {
    for test_case in JSON_CONFIG_TESTS {
        let result = load_config_from_str(test_case.config_json);

        if test_case.should_succeed {
            assert!(
                result.is_ok(),
                "Test '{}': Expected success but got error: {:?}",
                test_case.name,
                result.err()
            );
        } else {
            assert!(
                result.is_err(),
                "Test '{}': Expected error but got success",
                test_case.name
            );

            if let Some(expected_error) = test_case.expected_error {
                let error_msg = result.err().unwrap().to_string();
                assert!(
                    error_msg.contains(expected_error),
                    "Test '{}': Expected error containing '{}', got '{}'",
                    test_case.name,
                    expected_error,
                    error_msg
                );
            }
        }
    }
}

#[test]
fn test_page_size_capping() {
    let config =
        load_config_from_str(r#"{ "version": "1.0", "defaultPageSize": 15, "maxPageSize": 50 }"#)
            .unwrap();
    assert_eq!(config.page_size(None), 15);
    assert_eq!(config.page_size(Some(40)), 40);
    assert_eq!(config.page_size(Some(500)), 50);
    assert_eq!(config.page_size(Some(0)), 0);
}

#[test]
fn test_zero_page_size_is_rejected_like_zero_page() {
    let config = load_config_from_str(r#"{ "version": "1.0" }"#).unwrap();
    let err = PageRequest::new(1, config.page_size(Some(0))).unwrap_err();
    assert!(matches!(
        err,
        StoreError::InvalidPageRequest {
            page: 1,
            page_size: 0
        }
    ));
    assert!(PageRequest::new(0, config.page_size(None)).is_err());
}

#[test]
fn test_loaded_values_flow_into_accessors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("portal.json");
    std::fs::write(
        &path,
        r#"{ "version": "1.0", "dataDirectory": "/srv/portal", "simulatedLatencyMs": 250 }"#,
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.simulated_latency(), Duration::from_millis(250));
    assert_eq!(
        config.data_directory(),
        Some(std::path::PathBuf::from("/srv/portal"))
    );
    assert_eq!(config.default_page_size, 20);
    assert_eq!(config.storage_quota_bytes, None);
}

#[test]
fn test_missing_file_reports_path() {
    let err = load_config("/no/such/portal.json").unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
    assert!(err.to_string().contains("/no/such/portal.json"));
}
