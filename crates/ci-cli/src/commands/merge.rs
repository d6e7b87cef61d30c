use std::path::{Path, PathBuf};

use ci_fs::NormalizedPath;
use ci_installer::lando;
use ci_merge::TransactionConfig;
use colored::Colorize;

use crate::error::Result;

pub fn run_merge(cwd: &Path, file: PathBuf, dry_run: bool) -> Result<()> {
    let path = NormalizedPath::new(cwd.join(file));

    if dry_run {
        let preview = lando::preview_lando_file(&path)?;
        if preview.changed {
            print!("{}", preview.diff);
            println!(
                "{} {} hooks would be added, {} commands written (dry run)",
                "=>".blue().bold(),
                preview.stats.hooks_added(),
                preview.stats.commands_written
            );
        } else {
            println!("{} {} is already up to date", "OK".green().bold(), path);
        }
        return Ok(());
    }

    let report = lando::merge_lando_file(&path, TransactionConfig::default())?;
    if report.changed {
        println!(
            "{} Updated {} ({} hooks added, {} commands written)",
            "OK".green().bold(),
            path,
            report.stats.hooks_added(),
            report.stats.commands_written
        );
    } else {
        println!("{} {} is already up to date", "OK".green().bold(), path);
    }
    println!("   Backup: {}", report.backup.as_str().dimmed());
    Ok(())
}
