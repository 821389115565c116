//! Configuration loading.

use std::fs;
use std::path::Path;

use phpdoc_reflect::config::CONFIG_FILE_NAME;
use phpdoc_reflect::{Config, ConfigError};
use pretty_assertions::assert_eq;

#[test]
fn explicit_files_are_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(
        &path,
        r#"
known_classes = ["Carbon\\Carbon", "Exception"]
nullable_defaults = false
log_level = "debug"

[aliases]
"uuid|ulid" = "string"
money = "float"
"#,
    )
    .unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.known_classes, vec!["Carbon\\Carbon", "Exception"]);
    assert!(!config.nullable_defaults);
    assert_eq!(config.log_level, "debug");
    assert_eq!(
        config.aliases.iter().collect::<Vec<_>>(),
        vec![
            (&"money".to_string(), &"float".to_string()),
            (&"uuid|ulid".to_string(), &"string".to_string()),
        ]
    );
}

#[test]
fn missing_explicit_files_are_errors() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn invalid_toml_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "known_classes = [").unwrap();
    let err = Config::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn wrong_value_types_are_parse_errors() {
    let err = Config::from_toml_str("nullable_defaults = \"yes\"", Path::new("x.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { ref path, .. } if path == Path::new("x.toml")));
}

#[test]
fn empty_files_give_defaults() {
    let config = Config::from_toml_str("", Path::new("empty.toml")).unwrap();
    assert_eq!(config, Config::default());
    assert!(config.nullable_defaults);
    assert_eq!(config.log_level, "warn");
}

#[test]
fn the_project_file_is_looked_up_first() {
    let paths = Config::candidate_paths();
    assert_eq!(paths.first().map(|p| p.as_path()), Some(Path::new(CONFIG_FILE_NAME)));
    assert!(paths.iter().skip(1).all(|p| p.ends_with("phpdoc-reflect/config.toml")));
}
