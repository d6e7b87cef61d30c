//! End-to-end flows across the workspace crates
//!
//! Root discovery -> install -> rerun -> uninstall, against a temp project
//! seeded with a copy of the packaged files.

use ci_fs::NormalizedPath;
use ci_installer::config::OWN_PACKAGE;
use ci_installer::manifest::RequirementStatus;
use ci_installer::services::ServicesOutcome;
use ci_installer::{FileAction, Installer, InstallerConfig, StepOutcome, find_project_root, uninstall};
use ci_test_utils::project::TestProject;
use pretty_assertions::assert_eq;
use serde_yaml::Value;
use std::fs;

fn installer_for(project: &TestProject) -> Installer {
    Installer::new(
        InstallerConfig::default()
            .with_root(project.root())
            .with_source(project.source()),
    )
}

fn lando(project: &TestProject) -> Value {
    serde_yaml::from_str(&project.read(".lando.yml")).unwrap()
}

#[test]
fn test_discovers_root_from_vendor_directory() {
    let project = TestProject::new().drupal("^10").write(
        "vendor/helloworlddevs/pantheon-ci-tools/composer.json",
        &format!(r#"{{"name": "{OWN_PACKAGE}"}}"#),
    );
    let vendor = project.root().join("vendor/helloworlddevs/pantheon-ci-tools");

    let root = find_project_root(&vendor, OWN_PACKAGE);
    assert_eq!(root, NormalizedPath::new(project.root()));
}

#[test]
fn test_full_lifecycle() {
    let project = TestProject::new().drupal("^10.2").lando_file().web_sites();
    let installer = installer_for(&project);

    // First run installs everything.
    let report = installer.install().unwrap();
    assert_eq!(report.scaffold.count(FileAction::Installed), 13);
    assert!(report.config_split.is_complete());
    assert!(matches!(
        report.config_split.requirement,
        StepOutcome::Done(RequirementStatus::Added)
    ));
    let first_lando = project.read(".lando.yml");
    let first_composer = project.read("composer.json");

    let doc = lando(&project);
    assert_eq!(doc["events"]["post-start"].as_sequence().unwrap().len(), 3);
    assert_eq!(doc["events"]["post-pull"].as_sequence().unwrap().len(), 2);
    assert_eq!(
        doc["tooling"]["safe-export"]["cmd"].as_sequence().unwrap().len(),
        5
    );
    assert!(doc["tooling"]["drush"].is_mapping());
    assert_eq!(first_lando.matches("dev-config.sh enable").count(), 1);

    // Second run is a no-op for every managed artifact.
    let rerun = installer.install().unwrap();
    assert_eq!(rerun.scaffold.count(FileAction::Installed), 0);
    assert_eq!(rerun.scaffold.count(FileAction::Updated), 0);
    assert!(matches!(
        rerun.config_split.requirement,
        StepOutcome::Done(RequirementStatus::AlreadyPresent)
    ));
    assert!(!rerun.config_split.lando.done().unwrap().changed);
    assert_eq!(project.read(".lando.yml"), first_lando);
    assert_eq!(project.read("composer.json"), first_composer);

    // Uninstall removes what was copied and keeps project edits.
    let removed = uninstall::cleanup(&NormalizedPath::new(project.root()));
    assert_eq!(removed.removed.len(), uninstall::installed_files().len());
    assert!(removed.failed.is_empty());
    project.assert_file_not_exists(".ci");
    project.assert_file_not_exists("lando/scripts");
    project.assert_file_exists("web/sites/development.services.yml");
    assert_eq!(project.read(".lando.yml"), first_lando);
}

#[test]
fn test_drupal_11_project_with_html_webroot() {
    let project = TestProject::new()
        .drupal("^11.0")
        .lando_file()
        .dir("html/sites/default")
        .write(
            "html/sites/development.services.local.yml",
            "services:\n  cache.backend.null:\n    class: Drupal\\Core\\Cache\\NullBackendFactory\n",
        );

    let report = installer_for(&project).install().unwrap();
    let services = report.config_split.services.done().unwrap();

    match &services.outcome {
        ServicesOutcome::Written { webroot, major, .. } => {
            assert_eq!(webroot, "html");
            assert_eq!(*major, 11);
        }
        other => panic!("expected services to be written, got {other:?}"),
    }
    assert_eq!(services.cleaned, vec!["development.services.local.yml".to_string()]);
    assert!(!project.read("html/sites/development.services.local.yml").contains("cache.backend.null"));
    assert!(
        !project
            .read("html/sites/development.services.yml")
            .contains("cache.backend.null:")
    );
}

#[test]
fn test_yaml_config_file_drives_install() {
    let project = TestProject::new().drupal("^10").lando_file();
    let config_path = project.root().join("ci-tools.yaml");
    fs::write(
        &config_path,
        format!(
            "project_root: {}\nsource_dir: {}\ndev_constraint: \"^2.0.1\"\nwebroots:\n  - docroot\n",
            project.root().display(),
            project.source().display()
        ),
    )
    .unwrap();

    let config = InstallerConfig::load(&NormalizedPath::new(&config_path)).unwrap();
    assert_eq!(config.webroots, vec!["docroot".to_string()]);

    let report = Installer::new(config).install().unwrap();
    assert!(matches!(
        report.config_split.services.done().map(|s| &s.outcome),
        Some(ServicesOutcome::NoWebroot)
    ));

    let composer: serde_json::Value =
        serde_json::from_str(&project.read("composer.json")).unwrap();
    assert_eq!(composer["require-dev"]["drupal/config_split"], "^2.0.1");
}

#[test]
fn test_hand_edited_lando_file_is_completed_not_duplicated() {
    // Entries already present in different textual forms.
    let project = TestProject::new().drupal("^10").web_sites().write(
        ".lando.yml",
        "\
name: site
events:
  post-pull:
    - \"appserver: drush cr\"
    - appserver: bash /app/lando/scripts/dev-config.sh disable
tooling:
  config-check:
    service: appserver
    description: custom
    cmd: echo custom
",
    );

    let report = installer_for(&project).install().unwrap();
    let merge = report.config_split.lando.done().unwrap();
    assert!(merge.changed);

    let doc = lando(&project);
    let post_pull = doc["events"]["post-pull"].as_sequence().unwrap();
    assert_eq!(post_pull.len(), 2);
    assert_eq!(
        doc["tooling"]["config-check"]["cmd"],
        Value::from("bash /app/lando/scripts/config-safety-check.sh")
    );
}
