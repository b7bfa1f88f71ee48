//! Integration tests for configuration loading and validation

use lessonforge_core::config::{load_from_json, load_from_yaml, ConfigError, GenerationConfig};
use lessonforge_core::cost::CostTier;
use lessonforge_core::providers::ProviderKind;
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to create a test config file
fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_load_valid_yaml_config() {
    env::set_var("LF_TEST_GOOGLE_KEY", "google-test-key");

    let yaml = r#"
version: "0.1"
providers:
  - type: google
    api_key: ${LF_TEST_GOOGLE_KEY}
    default_model: gemini-1.5-pro
  - type: custom
    base_url: http://localhost:11434/v1
    default_model: gemma3:4b
defaults:
  provider: google
  temperature: 0.4
  max_tokens: 4000
  timeout_secs: 90
  system_prompt: You are an expert IGCSE educator.
repair:
  max_attempts: 3
  preview_chars: 120
  backoff:
    initial_delay_ms: 100
rollout:
  window: 2024-q4
  default_tier: minimal
  buckets:
    - tier: ultra_minimal
      weight: 25
    - tier: minimal
      weight: 75
"#;

    let dir = TempDir::new().unwrap();
    let path = create_test_file(&dir, "config.yaml", yaml);
    let config = load_from_yaml(&path).unwrap();

    let google = config.provider(ProviderKind::Google).unwrap();
    assert_eq!(google.api_key.as_ref().unwrap().expose_secret(), "google-test-key");
    assert_eq!(google.default_model.as_deref(), Some("gemini-1.5-pro"));
    assert_eq!(config.defaults.provider, ProviderKind::Google);
    assert_eq!(config.defaults.max_tokens, 4000);
    assert_eq!(config.timeout().as_secs(), 90);
    assert_eq!(config.repair.max_attempts, 3);
    assert_eq!(config.repair.backoff.initial_delay_ms, 100);
    assert_eq!(config.repair.backoff.max_delay_ms, 5000);

    let rollout = config.rollout.unwrap();
    assert_eq!(rollout.default_tier, CostTier::Minimal);
    assert_eq!(rollout.total_weight(), 100);

    env::remove_var("LF_TEST_GOOGLE_KEY");
}

#[test]
fn test_load_valid_json_config() {
    let json = r#"{
        "providers": [
            {"type": "azure", "api_key": "azure-key", "base_url": "https://school.openai.azure.com", "default_model": "gpt4o-prod"}
        ],
        "defaults": {"provider": "azure"}
    }"#;

    let dir = TempDir::new().unwrap();
    let path = create_test_file(&dir, "config.json", json);
    let config = load_from_json(&path).unwrap();

    assert_eq!(config.version, "0.1");
    assert_eq!(config.defaults.provider, ProviderKind::Azure);
    assert_eq!(config.defaults.temperature, 0.7);
    assert_eq!(config.repair.max_attempts, 2);
}

#[test]
fn test_missing_env_var_fails() {
    let yaml = r#"
providers:
  - type: openai
    api_key: ${LF_TEST_DEFINITELY_UNSET}
"#;
    let dir = TempDir::new().unwrap();
    let path = create_test_file(&dir, "config.yaml", yaml);

    match load_from_yaml(&path) {
        Err(ConfigError::EnvVarNotFound { var }) => assert_eq!(var, "LF_TEST_DEFINITELY_UNSET"),
        other => panic!("expected EnvVarNotFound, got {:?}", other),
    }
}

#[test]
fn test_unknown_field_is_a_parse_error() {
    let yaml = r#"
defaults:
  provider: openai
  temprature: 0.5
"#;
    let dir = TempDir::new().unwrap();
    let path = create_test_file(&dir, "config.yaml", yaml);

    match load_from_yaml(&path) {
        Err(ConfigError::ParseError { message, .. }) => assert!(message.contains("temprature")),
        other => panic!("expected ParseError, got {:?}", other),
    }
}

#[test]
fn test_unknown_provider_type_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = create_test_file(&dir, "config.json", r#"{"providers": [{"type": "cohere"}]}"#);
    assert!(matches!(load_from_json(&path), Err(ConfigError::ParseError { .. })));
}

#[test]
fn test_validation_errors_carry_field_path() {
    let cases = [
        ("defaults:\n  temperature: 3.5\n", "defaults.temperature"),
        ("repair:\n  max_attempts: 0\n", "repair.max_attempts"),
        ("providers:\n  - type: custom\n", "providers[0].base_url"),
        ("providers:\n  - type: openai\n    base_url: ftp://example.com\n", "providers[0].base_url"),
        ("repair:\n  backoff:\n    jitter_factor: 1.5\n", "repair.backoff.jitter_factor"),
    ];

    let dir = TempDir::new().unwrap();
    for (i, (yaml, field)) in cases.iter().enumerate() {
        let path = create_test_file(&dir, &format!("case{}.yaml", i), yaml);
        match load_from_yaml(&path) {
            Err(ConfigError::ValidationError(err)) => assert_eq!(err.field_path, *field, "{}", yaml),
            other => panic!("expected validation error for {:?}, got {:?}", yaml, other),
        }
    }
}

#[test]
fn test_missing_file() {
    let result = load_from_yaml("/nonexistent/lessonforge.yaml");
    assert!(matches!(result, Err(ConfigError::IoError { .. })));
}

#[test]
fn test_from_env() {
    env::set_var("HUGGINGFACE_API_KEY", "hf_test_key_value");
    env::set_var("LLM_DEFAULT_PROVIDER", "hf");

    let config = GenerationConfig::from_env().unwrap();
    assert_eq!(config.defaults.provider, ProviderKind::HuggingFace);
    let settings = config.provider(ProviderKind::HuggingFace).unwrap();
    assert_eq!(settings.api_key.as_ref().unwrap().expose_secret(), "hf_test_key_value");

    env::set_var("LLM_DEFAULT_PROVIDER", "cohere");
    assert!(matches!(
        GenerationConfig::from_env(),
        Err(ConfigError::UnknownProvider { .. })
    ));

    env::remove_var("LLM_DEFAULT_PROVIDER");
    env::remove_var("HUGGINGFACE_API_KEY");
}
