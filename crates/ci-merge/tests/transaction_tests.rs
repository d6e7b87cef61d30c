//! Safe-write transaction scenarios against real files.

use std::cell::Cell;
use std::fs;

use ci_fs::NormalizedPath;
use ci_merge::{
    CommandDefinition, DocumentWriter, Entry, Error, MergePlan, SafeWrite, TransactionConfig,
    TransactionState, signature,
};
use pretty_assertions::assert_eq;
use serde_yaml::Value;
use tempfile::TempDir;

fn write_lando(temp: &TempDir, content: &str) -> NormalizedPath {
    let path = NormalizedPath::new(temp.path().join(".lando.yml"));
    fs::write(path.to_native(), content).unwrap();
    path
}

fn read(path: &NormalizedPath) -> String {
    fs::read_to_string(path.to_native()).unwrap()
}

fn parse(path: &NormalizedPath) -> Value {
    serde_yaml::from_str(&read(path)).unwrap()
}

fn packaged_plan() -> MergePlan {
    MergePlan::new()
        .post_start([
            Entry::service("appserver", "echo hi"),
            Entry::service("appserver", "echo bye"),
        ])
        .post_pull([Entry::service("appserver", "drush cr")])
        .tooling(
            "dev-config",
            CommandDefinition::single("appserver", "Toggle dev config", "bash dev-config.sh"),
        )
        .tooling(
            "safe-export",
            CommandDefinition::steps("appserver", "Export safely", ["bash check.sh", "drush cex -y"]),
        )
}

/// Fails every write; restores through the default implementation.
struct FailingWriter;

impl DocumentWriter for FailingWriter {
    fn write(&self, path: &NormalizedPath, _content: &str) -> ci_fs::Result<()> {
        Err(ci_fs::Error::io(
            path.to_native(),
            std::io::Error::other("disk full"),
        ))
    }
}

/// Truncates the target, then fails; the restore fails too.
struct BrokenDisk {
    restores: Cell<usize>,
}

impl DocumentWriter for BrokenDisk {
    fn write(&self, path: &NormalizedPath, _content: &str) -> ci_fs::Result<()> {
        fs::write(path.to_native(), "events: [").unwrap();
        Err(ci_fs::Error::io(
            path.to_native(),
            std::io::Error::other("disk full"),
        ))
    }

    fn restore(&self, backup: &NormalizedPath, _target: &NormalizedPath) -> ci_fs::Result<()> {
        self.restores.set(self.restores.get() + 1);
        Err(ci_fs::Error::io(
            backup.to_native(),
            std::io::Error::other("read-only filesystem"),
        ))
    }
}

#[test]
fn test_appends_only_missing_hooks() {
    let temp = TempDir::new().unwrap();
    let path = write_lando(&temp, "events:\n  post-start:\n    - \"appserver: echo hi\"\n");
    let plan = MergePlan::new().post_start([
        Entry::text("appserver: echo hi"),
        Entry::text("appserver: echo bye"),
    ]);

    let mut tx = SafeWrite::new(path.clone(), TransactionConfig::default());
    let report = tx.run(&plan).unwrap();

    let doc = parse(&path);
    let hooks = doc["events"]["post-start"].as_sequence().unwrap();
    let sigs: Vec<_> = hooks.iter().map(signature).collect();
    assert_eq!(
        sigs,
        vec![
            signature(&Value::from("appserver: echo hi")),
            signature(&Value::from("appserver: echo bye")),
        ]
    );
    assert_eq!(report.stats.hooks_added(), 1);
    assert_eq!(tx.state(), TransactionState::Written);
}

#[test]
fn test_hooks_are_written_unquoted() {
    let temp = TempDir::new().unwrap();
    let path = write_lando(&temp, "name: mysite\n");

    SafeWrite::new(path.clone(), TransactionConfig::default())
        .run(&MergePlan::new().post_start([Entry::text("appserver: echo bye")]))
        .unwrap();

    let text = read(&path);
    assert!(text.contains("- appserver: echo bye"), "got:\n{text}");
    assert!(!text.contains("'appserver"), "got:\n{text}");
}

#[test]
fn test_tooling_definition_is_replaced() {
    let temp = TempDir::new().unwrap();
    let path = write_lando(
        &temp,
        "tooling:\n  dev-config:\n    service: appserver\n    description: Old text\n    cmd: old.sh\n  drush:\n    service: appserver\n",
    );

    SafeWrite::new(path.clone(), TransactionConfig::default())
        .run(&packaged_plan())
        .unwrap();

    let doc = parse(&path);
    assert_eq!(doc["tooling"]["dev-config"]["description"], Value::from("Toggle dev config"));
    assert_eq!(doc["tooling"]["drush"]["service"], Value::from("appserver"));
    assert!(!read(&path).contains("Old text"));
}

#[test]
fn test_missing_file_is_reported_and_not_created() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join(".lando.yml"));

    let mut tx = SafeWrite::new(path.clone(), TransactionConfig::default());
    let err = tx.run(&packaged_plan()).unwrap_err();

    assert!(matches!(err, Error::MissingInput { .. }));
    assert_eq!(tx.state(), TransactionState::NoSource);
    assert!(!path.exists());
    assert!(!tx.backup_path().exists());
}

#[test]
fn test_string_and_mapping_forms_deduplicate() {
    let temp = TempDir::new().unwrap();
    let path = write_lando(&temp, "events:\n  post-start:\n    - appserver: cmd\n");

    SafeWrite::new(path.clone(), TransactionConfig::default())
        .run(&MergePlan::new().post_start([Entry::text("'appserver: cmd'")]))
        .unwrap();

    let doc = parse(&path);
    assert_eq!(doc["events"]["post-start"].as_sequence().unwrap().len(), 1);
}

#[test]
fn test_failed_write_restores_original() {
    let temp = TempDir::new().unwrap();
    let original = "name: mysite\nevents:\n  post-start:\n    - appserver: echo hi\n";
    let path = write_lando(&temp, original);

    let mut tx = SafeWrite::new(path.clone(), TransactionConfig::with_writer(FailingWriter));
    let err = tx.run(&packaged_plan()).unwrap_err();

    assert!(matches!(err, Error::Write { .. }));
    assert!(!err.is_unrecoverable());
    assert_eq!(tx.state(), TransactionState::Restored);
    assert_eq!(read(&path), original);
    assert!(tx.backup_path().is_file());
}

#[test]
fn test_failed_restore_is_surfaced_loudly() {
    let temp = TempDir::new().unwrap();
    let path = write_lando(&temp, "name: mysite\n");
    let writer = BrokenDisk {
        restores: Cell::new(0),
    };

    let mut tx = SafeWrite::new(path.clone(), TransactionConfig::with_writer(writer));
    let err = tx.run(&packaged_plan()).unwrap_err();

    assert!(err.is_unrecoverable());
    assert_eq!(tx.state(), TransactionState::RestoreFailed);
    let message = err.to_string();
    assert!(message.contains("manually copy"), "{message}");
    assert!(message.contains(".lando.yml.bak"), "{message}");
    // The backup still holds the original for manual recovery
    assert_eq!(read(tx.backup_path()), "name: mysite\n");
}

#[test]
fn test_parse_failure_leaves_file_untouched() {
    let temp = TempDir::new().unwrap();
    let original = "events: [unclosed\n";
    let path = write_lando(&temp, original);

    let mut tx = SafeWrite::new(path.clone(), TransactionConfig::default());
    let err = tx.run(&packaged_plan()).unwrap_err();

    assert!(matches!(err, Error::Parse { .. }));
    assert_eq!(tx.state(), TransactionState::Aborted);
    assert_eq!(read(&path), original);
}

#[test]
fn test_backup_failure_aborts_before_mutation() {
    let temp = TempDir::new().unwrap();
    let original = "name: mysite\n";
    let path = write_lando(&temp, original);
    // A directory where the backup file should go makes the copy fail
    fs::create_dir(temp.path().join(".lando.yml.bak")).unwrap();

    let mut tx = SafeWrite::new(path.clone(), TransactionConfig::default());
    let err = tx.run(&packaged_plan()).unwrap_err();

    assert!(matches!(err, Error::Backup { .. }));
    assert_eq!(tx.state(), TransactionState::Aborted);
    assert_eq!(read(&path), original);
}

#[test]
fn test_backup_is_left_on_disk_after_success() {
    let temp = TempDir::new().unwrap();
    let path = write_lando(&temp, "name: mysite\n");

    let report = SafeWrite::new(path.clone(), TransactionConfig::default())
        .run(&packaged_plan())
        .unwrap();

    assert_eq!(read(&report.backup), "name: mysite\n");
    assert!(report.changed);
}

#[test]
fn test_rerun_is_byte_identical() {
    let temp = TempDir::new().unwrap();
    let path = write_lando(
        &temp,
        "name: mysite\nrecipe: drupal10\nevents:\n  post-start:\n    - appserver: echo hi\ntooling:\n  drush:\n    service: appserver\n",
    );
    let plan = packaged_plan();

    SafeWrite::new(path.clone(), TransactionConfig::default())
        .run(&plan)
        .unwrap();
    let first = read(&path);

    let report = SafeWrite::new(path.clone(), TransactionConfig::default())
        .run(&plan)
        .unwrap();
    let second = read(&path);

    assert_eq!(first, second);
    assert!(!report.changed);
    assert_eq!(report.stats.hooks_added(), 0);
    assert_eq!(report.stats.commands_created, 0);
}

#[test]
fn test_preview_does_not_touch_disk() {
    let temp = TempDir::new().unwrap();
    let original = "name: mysite\n";
    let path = write_lando(&temp, original);

    let tx = SafeWrite::new(path.clone(), TransactionConfig::default());
    let preview = tx.preview(&packaged_plan()).unwrap();

    assert!(preview.changed);
    assert!(preview.diff.contains("+events:"), "{}", preview.diff);
    assert!(preview.rendered.contains("safe-export:"));
    assert_eq!(read(&path), original);
    assert!(!tx.backup_path().exists());
    assert_eq!(tx.state(), TransactionState::Start);
}

#[test]
fn test_preview_of_missing_file_is_reported() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join(".lando.yml"));

    let err = SafeWrite::new(path.clone(), TransactionConfig::default())
        .preview(&packaged_plan())
        .unwrap_err();

    assert!(matches!(err, Error::MissingInput { .. }));
    assert!(!path.exists());
}

#[test]
fn test_changed_flag_tracks_text_difference() {
    let temp = TempDir::new().unwrap();
    let path = write_lando(&temp, "name: mysite\n");

    let report = SafeWrite::new(path.clone(), TransactionConfig::default())
        .run(&MergePlan::new())
        .unwrap();

    assert!(report.changed, "empty sections are still added");
    let rerun = SafeWrite::new(path.clone(), TransactionConfig::default())
        .run(&MergePlan::new())
        .unwrap();
    assert!(!rerun.changed);
}

#[cfg(unix)]
#[test]
fn test_merge_keeps_file_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let path = write_lando(&temp, "name: mysite\n");
    fs::set_permissions(path.to_native(), fs::Permissions::from_mode(0o640)).unwrap();

    let report = SafeWrite::new(path.clone(), TransactionConfig::default())
        .run(&packaged_plan())
        .unwrap();

    assert!(report.changed);
    let mode = fs::metadata(path.to_native()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o640);
}
