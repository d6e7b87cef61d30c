use std::path::{Path, PathBuf};

use ci_fs::NormalizedPath;
use ci_installer::installer::manual_steps;
use ci_installer::manifest::RequirementStatus;
use ci_installer::services::ServicesOutcome;
use ci_installer::{FileAction, InstallReport, Installer, InstallerConfig, StepOutcome};
use colored::Colorize;

use crate::error::Result;

/// Packaged files shipped next to the workspace sources.
fn packaged_source() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../files")
}

pub fn run_install(
    cwd: &Path,
    root: Option<PathBuf>,
    source: Option<PathBuf>,
    config_file: Option<PathBuf>,
) -> Result<()> {
    let mut config = match config_file {
        Some(path) => InstallerConfig::load(&NormalizedPath::new(cwd.join(path)))?,
        None => InstallerConfig::default().with_source(packaged_source()),
    };
    if root.is_some() || root_is_default(&config) {
        config.project_root = super::resolve_root(cwd, root).to_native();
    }
    if let Some(source) = source {
        config.source_dir = cwd.join(source);
    }

    println!("{} Installing Pantheon CI tools...", "=>".blue().bold());
    println!("   Source:      {}", config.source().as_str().cyan());
    println!("   Destination: {}", config.root().as_str().cyan());

    let installer = Installer::new(config);
    let report = installer.install()?;
    print_report(installer.config(), &report);
    Ok(())
}

/// A config file may pin the root; the built-in `.` means "discover".
fn root_is_default(config: &InstallerConfig) -> bool {
    config.project_root == InstallerConfig::default().project_root
}

fn print_report(config: &InstallerConfig, report: &InstallReport) {
    for file in &report.scaffold.files {
        let label = match file.action {
            FileAction::Installed => "Copied".green(),
            FileAction::Updated => "Updated".green(),
            FileAction::Unchanged => "Unchanged".dimmed(),
            FileAction::Skipped => "Skipped".yellow(),
        };
        println!("   {} {}", label, file.path);
    }
    println!("{} CI files installed", "OK".green().bold());

    println!();
    println!("{} Installing Config Split setup...", "=>".blue().bold());
    let split = &report.config_split;

    match &split.requirement {
        StepOutcome::Done(RequirementStatus::Added) => println!(
            "   {} {}:{} to require-dev",
            "Added".green(),
            config.dev_package,
            config.dev_constraint
        ),
        StepOutcome::Done(RequirementStatus::AlreadyPresent) => {
            println!("   {} already in require-dev", config.dev_package)
        }
        StepOutcome::Failed(e) => println!("   {} {}", "error:".red().bold(), e),
        StepOutcome::NotRun => {}
    }

    if let StepOutcome::Done(scripts) = &split.scripts {
        for script in scripts {
            println!("   {} {}", script.action.to_string().green(), script.path);
        }
    } else if let Some(e) = split.scripts.error() {
        println!("   {} {}", "error:".red().bold(), e);
    }

    match &split.services {
        StepOutcome::Done(services) => {
            for name in &services.cleaned {
                println!("   {} incompatible cache services in {}", "Cleaned".green(), name);
            }
            match &services.outcome {
                ServicesOutcome::Written {
                    webroot,
                    major,
                    action,
                } => println!(
                    "   {} {}/sites/development.services.yml (Drupal {})",
                    action.to_string().green(),
                    webroot,
                    major
                ),
                ServicesOutcome::NoWebroot => println!(
                    "   {} no Drupal sites directory found; skipped development.services.yml",
                    "warning:".yellow().bold()
                ),
            }
        }
        StepOutcome::Failed(e) => println!("   {} {} (continuing)", "warning:".yellow().bold(), e),
        StepOutcome::NotRun => {}
    }

    match &split.lando {
        StepOutcome::Done(merge) if merge.changed => println!(
            "   {} {} ({} hooks added, {} commands written)",
            "Updated".green(),
            config.lando_file,
            merge.stats.hooks_added(),
            merge.stats.commands_written
        ),
        StepOutcome::Done(_) => println!("   {} is already up to date", config.lando_file),
        StepOutcome::Failed(e) => println!("   {} {}", "error:".red().bold(), e),
        StepOutcome::NotRun => {}
    }

    let steps = manual_steps(config, &split.requirement);
    if !steps.is_empty() {
        println!();
        println!("Next steps:");
        for step in steps {
            println!("   {}", step.cyan());
        }
    }

    println!();
    if split.is_complete() {
        println!("{} Installation complete", "OK".green().bold());
    } else {
        println!(
            "{} Installation finished with skipped steps (see above)",
            "WARN".yellow().bold()
        );
    }
}
