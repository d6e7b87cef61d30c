use std::path::{Path, PathBuf};

use ci_installer::uninstall;
use colored::Colorize;

use crate::error::Result;

pub fn run_uninstall(cwd: &Path, root: Option<PathBuf>) -> Result<()> {
    let root = super::resolve_root(cwd, root);
    println!("{} Cleaning up installed files in {}", "=>".blue().bold(), root);

    let report = uninstall::cleanup(&root);

    for path in &report.removed {
        println!("   {} {}", "Removed".green(), path);
    }
    for dir in &report.dirs_removed {
        println!("   {} empty directory {}", "Removed".green(), dir);
    }
    for (path, e) in &report.failed {
        println!("   {} could not remove {}: {}", "error:".red().bold(), path, e);
    }

    if report.removed.is_empty() {
        println!("   No files to remove (already cleaned up)");
    } else {
        println!("   Removed {} file(s)", report.removed.len());
    }
    println!(
        "{} .lando.yml changes were kept; remove the config-split hooks and tooling by hand if needed",
        "Note:".yellow().bold()
    );
    Ok(())
}
