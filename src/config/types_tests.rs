//! Tests for types

use super::*;
use proptest::prelude::*;

#[test]
fn test_throttle_config_default() {
    let config = ThrottleConfig::default();
    assert_eq!(config.default_ms, 66);
    assert_eq!(config.default_interval(), Duration::from_millis(66));
}

#[test]
fn test_parse_throttle_default_ms() {
    let toml = r#"
[throttle]
default_ms = 100
"#;
    let config: Config = toml::from_str(toml).unwrap();
    assert_eq!(config.throttle.default_ms, 100);
}

#[test]
fn test_empty_throttle_section_uses_default() {
    let toml = r#"
[throttle]
"#;
    let config: Config = toml::from_str(toml).unwrap();
    assert_eq!(config.throttle.default_ms, DEFAULT_THROTTLE_MS);
}

#[test]
fn test_missing_throttle_section_uses_default() {
    let toml = r#"
[replay]
format = "json"
"#;
    let config: Config = toml::from_str(toml).unwrap();
    assert_eq!(config.throttle.default_ms, DEFAULT_THROTTLE_MS);
    assert_eq!(config.replay.format, OutputFormat::Json);
}

#[test]
fn test_parse_text_format() {
    let toml = r#"
[replay]
format = "text"
"#;
    let config: Config = toml::from_str(toml).unwrap();
    assert_eq!(config.replay.format, OutputFormat::Text);
}

#[test]
fn test_invalid_format_fails_to_parse() {
    let toml = r#"
[replay]
format = "yaml"
"#;
    let result: Result<Config, _> = toml::from_str(toml);
    assert!(result.is_err());
}

#[test]
fn test_negative_throttle_fails_to_parse() {
    let toml = r#"
[throttle]
default_ms = -5
"#;
    let result: Result<Config, _> = toml::from_str(toml);
    assert!(result.is_err());
}

#[test]
fn test_empty_config_uses_defaults() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config.throttle.default_ms, DEFAULT_THROTTLE_MS);
    assert_eq!(config.replay.format, OutputFormat::Text);
}

// Feature: config-system, Property 1: Valid throttle parsing
// For any non-negative interval in throttle.default_ms, parsing should keep
// the exact value.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_valid_throttle_parsing(ms in 0u64..100_000) {
        let toml_content = format!(r#"
[throttle]
default_ms = {}
"#, ms);

        let config: Result<Config, _> = toml::from_str(&toml_content);
        prop_assert!(config.is_ok(), "Failed to parse default_ms = {}", ms);
        prop_assert_eq!(config.unwrap().throttle.default_ms, ms);
    }
}

// Feature: config-system, Property 2: Valid format parsing
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn prop_valid_format_parsing(format in prop::sample::select(vec!["text", "json"])) {
        let toml_content = format!(r#"
[replay]
format = "{}"
"#, format);

        let config: Config = toml::from_str(&toml_content).unwrap();
        let expected = match format {
            "text" => OutputFormat::Text,
            "json" => OutputFormat::Json,
            _ => unreachable!(),
        };
        prop_assert_eq!(config.replay.format, expected);
    }
}
