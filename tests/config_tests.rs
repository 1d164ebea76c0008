use pretty_assertions::assert_eq;
use rumdown_lib::config::{Config, ConfigError, OutputFormat, SafeMode, create_default_config};
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_load_config_file() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let config_path = temp_dir.path().join("custom.toml");
    fs::write(
        &config_path,
        r#"
[global]
safe-mode = "remove"
output-format = "html"
lazy-ol = true
html-replacement-text = "[nope]"
extensions = ["tables"]
"#,
    )
    .expect("Failed to write test config file");

    let config = Config::load_with_discovery(config_path.to_str(), false).expect("config should load");
    assert_eq!(config.global.safe_mode, SafeMode::Remove);
    assert_eq!(config.global.output_format, OutputFormat::Html);
    assert!(config.global.lazy_ol);
    assert_eq!(config.global.html_replacement_text, "[nope]");
    assert_eq!(config.global.extensions, vec!["tables"]);
    // Unset keys keep their defaults
    assert_eq!(config.global.tab_length, 4);
    assert!(config.global.enable_attributes);
}

#[test]
fn test_missing_explicit_config_is_io_error() {
    let temp_dir = tempdir().unwrap();
    let missing = temp_dir.path().join("absent.toml");
    let err = Config::load_with_discovery(missing.to_str(), false).unwrap_err();
    assert!(matches!(err, ConfigError::IoError { .. }), "{err}");
}

#[test]
fn test_discover_config_upward_from_nested_dir() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    fs::create_dir(root.join(".git")).unwrap();
    fs::write(root.join("rumdown.toml"), "[global]\ntab-length = 2\n").unwrap();
    let nested = root.join("docs").join("guide");
    fs::create_dir_all(&nested).unwrap();

    let found = Config::discover_config_upward(&nested).expect("config should be found");
    assert_eq!(found, root.join("rumdown.toml"));
}

#[test]
fn test_dotfile_takes_precedence() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("rumdown.toml"), "").unwrap();
    fs::write(root.join(".rumdown.toml"), "").unwrap();
    assert_eq!(Config::discover_config_upward(root), Some(root.join(".rumdown.toml")));
}

#[test]
fn test_discovery_stops_at_git_root() {
    let temp_dir = tempdir().unwrap();
    let outer = temp_dir.path();
    fs::write(outer.join(".rumdown.toml"), "[global]\ntab-length = 8\n").unwrap();
    let project = outer.join("project");
    fs::create_dir_all(project.join(".git")).unwrap();
    let nested = project.join("src");
    fs::create_dir_all(&nested).unwrap();

    assert_eq!(Config::discover_config_upward(&nested), None);
}

#[test]
#[serial(cwd)]
fn test_load_with_discovery_uses_current_dir() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    fs::create_dir(root.join(".git")).unwrap();
    fs::write(root.join(".rumdown.toml"), "[global]\nsafe-mode = \"escape\"\n").unwrap();

    let original_dir = env::current_dir().unwrap();
    env::set_current_dir(root).unwrap();
    let discovered = Config::load_with_discovery(None, false);
    let isolated = Config::load_with_discovery(None, true);
    env::set_current_dir(original_dir).unwrap();

    assert_eq!(discovered.unwrap().global.safe_mode, SafeMode::Escape);
    assert_eq!(isolated.unwrap(), Config::default());
}

#[test]
fn test_create_default_config_round_trips() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join(".rumdown.toml");
    let path_str = path.to_str().unwrap();

    create_default_config(path_str).expect("first init should succeed");
    let config = Config::load(path_str).expect("generated config should parse");
    assert_eq!(config, Config::default());

    let err = create_default_config(path_str).unwrap_err();
    assert!(matches!(err, ConfigError::FileExists { .. }), "{err}");
}

#[test]
fn test_invalid_value_reports_key() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("bad.toml");
    fs::write(&path, "[global]\ntab-length = 0\n").unwrap();
    let err = Config::load(path.to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("tab-length"), "{err}");
}

#[test]
fn test_unknown_safe_mode_is_parse_error() {
    let err = Config::from_toml_str("[global]\nsafe-mode = \"paranoid\"\n", "inline").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)), "{err}");
}
