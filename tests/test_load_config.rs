use serial_test::serial;
use std::env;
use std::fs::write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

use text_reorg::contract::Backend;
use text_reorg::load_config::{load_api_key, load_config};

/// A full config file maps onto every section.
#[test]
fn test_load_config_reads_all_sections() {
    let config_yaml = r#"
traversal:
  input_root: ./data/raw
  output_root: ./data/organized
  delay_secs: 5
transform:
  backend: openai
  model: gpt-4o
  max_tokens: 800
  temperature: 0.2
convert:
  pandoc: /usr/local/bin/pandoc
logging:
  log_dir: ./run-logs
  level: debug
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    let config = load_config(config_file.path()).expect("Config should load");

    assert_eq!(config.traversal.input_root, Some(PathBuf::from("./data/raw")));
    assert_eq!(
        config.traversal.output_root,
        Some(PathBuf::from("./data/organized"))
    );
    assert_eq!(config.traversal.delay_secs, 5);
    assert_eq!(config.transform.backend, Backend::OpenAi);
    assert_eq!(config.transform.model(), "gpt-4o");
    assert_eq!(config.transform.max_tokens, 800);
    assert_eq!(config.convert.pandoc, PathBuf::from("/usr/local/bin/pandoc"));
    assert_eq!(config.logging.log_dir, PathBuf::from("./run-logs"));
    assert_eq!(config.logging.level, "debug");
}

/// Omitted sections and fields fall back to defaults.
#[test]
fn test_load_config_partial_file_uses_defaults() {
    let config_yaml = r#"
traversal:
  input_root: ./in
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    let config = load_config(config_file.path()).expect("Partial config should load");
    assert_eq!(config.traversal.input_root, Some(PathBuf::from("./in")));
    assert_eq!(config.traversal.output_root, None);
    assert_eq!(config.traversal.delay_secs, 30);
    assert_eq!(config.transform.backend, Backend::Gemini);
    assert_eq!(config.transform.model(), "gemini-1.5-flash");
    assert_eq!(config.transform.max_tokens, 500);
    assert_eq!(config.convert.pandoc, PathBuf::from("pandoc"));
}

#[test]
fn test_load_config_empty_file_is_default() {
    let config_file = NamedTempFile::new().expect("temp file");
    let config = load_config(config_file.path()).expect("Empty config should load");
    assert!(config.traversal.to_traversal_config().is_none());
}

#[test]
fn test_load_config_errors_for_invalid_file() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), b"not-yaml: [:::").unwrap();

    let err = load_config(config_file.path()).unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("parse") || msg.contains("YAML"),
        "Parse error expected, got: {msg}"
    );
}

#[test]
fn test_load_config_errors_for_unknown_backend() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), "transform:\n  backend: claude\n").unwrap();
    assert!(load_config(config_file.path()).is_err());
}

#[test]
fn test_load_config_errors_for_missing_file() {
    let err = load_config("/no/such/config.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
#[serial]
fn test_api_key_prefers_generic_variable() {
    env::set_var("API_KEY", "generic-key");
    env::set_var("GEMINI_API_KEY", "gemini-key");

    assert_eq!(load_api_key(Backend::Gemini).unwrap(), "generic-key");

    env::remove_var("API_KEY");
    env::remove_var("GEMINI_API_KEY");
}

#[test]
#[serial]
fn test_api_key_falls_back_to_backend_variable() {
    env::remove_var("API_KEY");
    env::set_var("OPENAI_API_KEY", "openai-key");
    env::remove_var("GEMINI_API_KEY");

    assert_eq!(load_api_key(Backend::OpenAi).unwrap(), "openai-key");
    assert!(load_api_key(Backend::Gemini).is_err());

    env::remove_var("OPENAI_API_KEY");
}

#[test]
#[serial]
fn test_api_key_missing_is_an_error() {
    env::remove_var("API_KEY");
    env::remove_var("OPENAI_API_KEY");
    env::remove_var("GEMINI_API_KEY");

    let err = load_api_key(Backend::Gemini).unwrap_err();
    assert!(err.to_string().contains("API_KEY"));
}
