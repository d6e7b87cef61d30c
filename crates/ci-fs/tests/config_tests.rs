use assert_fs::prelude::*;
use ci_fs::{ConfigStore, Error, NormalizedPath};
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq)]
struct Settings {
    name: String,
    retries: u32,
}

#[rstest]
#[case("settings.toml", "name = \"site\"\nretries = 3\n")]
#[case("settings.json", r#"{"name": "site", "retries": 3}"#)]
#[case("settings.yml", "name: site\nretries: 3\n")]
#[case("settings.yaml", "name: site\nretries: 3\n")]
fn test_load_detects_format(#[case] file: &str, #[case] content: &str) {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child(file).write_str(content).unwrap();

    let path = NormalizedPath::new(temp.child(file).path());
    let settings: Settings = ConfigStore::new().load(&path).unwrap();

    assert_eq!(
        settings,
        Settings {
            name: "site".into(),
            retries: 3
        }
    );
}

#[test]
fn test_load_rejects_unknown_extension() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("settings.ini").write_str("name=site").unwrap();

    let path = NormalizedPath::new(temp.child("settings.ini").path());
    let result: Result<Settings, _> = ConfigStore::new().load(&path);

    assert!(matches!(result, Err(Error::UnsupportedFormat { extension }) if extension == "ini"));
}

#[test]
fn test_load_reports_parse_errors_with_format() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("settings.toml").write_str("name = ").unwrap();

    let path = NormalizedPath::new(temp.child("settings.toml").path());
    let result: Result<Settings, _> = ConfigStore::new().load(&path);

    match result {
        Err(Error::ConfigParse { format, .. }) => assert_eq!(format, "TOML"),
        other => panic!("expected ConfigParse, got {other:?}"),
    }
}

#[test]
fn test_load_missing_file_is_io_error() {
    let temp = assert_fs::TempDir::new().unwrap();
    let missing = temp.child("settings.toml");

    let result: Result<Settings, _> = ConfigStore::new().load(&NormalizedPath::new(missing.path()));

    assert!(matches!(result, Err(Error::Io { .. })));
    missing.assert(predicate::path::missing());
}
