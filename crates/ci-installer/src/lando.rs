//! Lando integration for the config-split workflow
//!
//! Installs the helper scripts under `lando/scripts` and merges the hooks
//! and tooling commands that call them into `.lando.yml`.

use ci_fs::checksum::files_match;
use ci_fs::{CiPath, NormalizedPath, io};
use ci_merge::{
    CommandDefinition, Entry, MergePlan, MergeReport, Preview, SafeWrite, TransactionConfig,
};
use tracing::info;

use crate::config::InstallerConfig;
use crate::error::{Error, Result};
use crate::report::{FileAction, InstalledFile};

pub const LANDO_SCRIPTS: [&str; 2] = ["config-safety-check.sh", "dev-config.sh"];

/// Where the scripts live inside the packaged `files/` tree.
const SCRIPT_SOURCE_DIR: &str = "scripts/config_split";

const SERVICE: &str = "appserver";
const DEV_CONFIG: &str = "bash /app/lando/scripts/dev-config.sh";
const SAFETY_CHECK: &str = "bash /app/lando/scripts/config-safety-check.sh";

/// Hooks and tooling commands for the dev config split.
pub fn config_split_plan() -> MergePlan {
    MergePlan::new()
        .post_start([
            Entry::service(SERVICE, r#"echo "🔧 Setting up dev environment...""#),
            Entry::service(SERVICE, format!("{DEV_CONFIG} enable")),
        ])
        .post_pull([
            Entry::service(SERVICE, format!("{DEV_CONFIG} disable")),
            Entry::service(SERVICE, "drush cr"),
        ])
        .tooling(
            "dev-config",
            CommandDefinition::single(
                SERVICE,
                "Enable/disable dev config split (usage - dev-config enable|disable)",
                DEV_CONFIG,
            ),
        )
        .tooling(
            "config-check",
            CommandDefinition::single(
                SERVICE,
                "Check the configuration split (usage - config-check)",
                SAFETY_CHECK,
            ),
        )
        .tooling(
            "safe-export",
            CommandDefinition::steps(
                SERVICE,
                "Export the configuration split (usage - safe-export)",
                [
                    r#"echo "🔍 Preparing safe config export...""#.to_string(),
                    format!("{DEV_CONFIG} disable"),
                    SAFETY_CHECK.to_string(),
                    "drush cex -y".to_string(),
                    r#"echo "✅ Config exported safely""#.to_string(),
                ],
            ),
        )
}

/// Copy the helper scripts into `<root>/lando/scripts` with mode 0755.
pub fn install_scripts(config: &InstallerConfig) -> Result<Vec<InstalledFile>> {
    let root = config.root();
    let source_dir = config.source().join(SCRIPT_SOURCE_DIR);
    let dest_dir = root.join(CiPath::LandoScripts.as_str());
    io::ensure_dir(&dest_dir)?;

    let mut installed = Vec::with_capacity(LANDO_SCRIPTS.len());
    for script in LANDO_SCRIPTS {
        let from = source_dir.join(script);
        if !from.is_file() {
            return Err(Error::SourceMissing {
                path: from.to_native(),
            });
        }
        let to = dest_dir.join(script);
        let action = if !to.is_file() {
            FileAction::Installed
        } else if files_match(&from.to_native(), &to.to_native()) {
            FileAction::Unchanged
        } else {
            FileAction::Updated
        };

        io::copy_file(&from, &to)?;
        io::set_executable(&to)?;
        info!(script, action = %action, "lando script");
        installed.push(InstalledFile {
            path: to.display_relative(&root),
            action,
            executable: true,
        });
    }
    Ok(installed)
}

/// Merge the config-split plan into the project's Lando file.
pub fn merge_lando_file(
    path: &NormalizedPath,
    tx_config: TransactionConfig,
) -> ci_merge::Result<MergeReport> {
    SafeWrite::new(path.clone(), tx_config).run(&config_split_plan())
}

/// Merged Lando file and diff, without writing.
pub fn preview_lando_file(path: &NormalizedPath) -> ci_merge::Result<Preview> {
    SafeWrite::new(path.clone(), TransactionConfig::default()).preview(&config_split_plan())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ci_merge::signature;
    use serde_yaml::Value;

    #[test]
    fn plan_matches_packaged_hooks() {
        let plan = config_split_plan();
        let events: Vec<(&str, usize)> = plan
            .events()
            .map(|(name, entries)| (name, entries.len()))
            .collect();
        assert_eq!(events, vec![("post-start", 2), ("post-pull", 2)]);

        let commands: Vec<&str> = plan.commands().map(|(name, _)| name).collect();
        assert_eq!(commands, vec!["dev-config", "config-check", "safe-export"]);
    }

    #[test]
    fn setup_hook_dedups_against_string_form() {
        let plan = config_split_plan();
        let (_, post_start) = plan.events().next().unwrap();
        let as_string = Value::from(r#"appserver: echo "🔧 Setting up dev environment...""#);
        assert_eq!(signature(&post_start[0].to_value()), signature(&as_string));
    }
}
