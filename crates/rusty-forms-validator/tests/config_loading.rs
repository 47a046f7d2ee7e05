//! Integration tests for loading rusty-forms.toml from disk

use rusty_forms_validator::{Validator, ValidatorConfig};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("rusty-forms.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
        [validator]
        server_side = false

        [backend.parsley]
        trigger_on = "keyup"
        "#,
    );

    let config = ValidatorConfig::load(&path).unwrap();

    assert!(!config.validator.server_side);
    assert_eq!(config.backend.parsley.trigger_on, "keyup");

    let validator = Validator::from_config(&config).unwrap();
    assert!(!validator.server_side());
    assert!(validator.client_side());
}

#[test]
fn test_empty_file_is_default() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "   \n");
    let config = ValidatorConfig::load(&path).unwrap();

    assert_eq!(config.backend.prefix, "data-parsley-");
}

#[test]
fn test_parse_error_names_the_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[validator\nclient_side = ");
    let error = ValidatorConfig::load(&path).unwrap_err();

    assert!(format!("{}", error).contains("Failed to parse config file"));
}

#[test]
fn test_missing_file_is_default() {
    let dir = TempDir::new().unwrap();
    let config = ValidatorConfig::load(dir.path().join("absent.toml")).unwrap();

    assert!(config.validator.client_side);
    assert!(config.validator.server_side);
}
