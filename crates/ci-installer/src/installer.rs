//! End-to-end installation
//!
//! Scaffolding failures abort the install. The config-split stage runs
//! afterwards and reports each step's outcome instead of failing: a
//! missing `.lando.yml` or a broken `composer.json` never undoes the
//! copied CI files.

use ci_fs::NormalizedPath;
use ci_merge::{MergeReport, TransactionConfig};
use tracing::{error, info, warn};

use crate::config::InstallerConfig;
use crate::error::Result;
use crate::lando;
use crate::manifest::{self, RequirementStatus};
use crate::report::{InstalledFile, StepOutcome};
use crate::scaffold::{self, ScaffoldReport};
use crate::services::{self, ServicesReport};
use crate::version;

#[derive(Debug)]
pub struct ConfigSplitReport {
    pub requirement: StepOutcome<RequirementStatus>,
    pub scripts: StepOutcome<Vec<InstalledFile>>,
    pub services: StepOutcome<ServicesReport>,
    pub lando: StepOutcome<MergeReport>,
}

impl ConfigSplitReport {
    fn not_run() -> Self {
        Self {
            requirement: StepOutcome::NotRun,
            scripts: StepOutcome::NotRun,
            services: StepOutcome::NotRun,
            lando: StepOutcome::NotRun,
        }
    }

    /// True when every required step succeeded. Services are optional.
    pub fn is_complete(&self) -> bool {
        self.requirement.is_done() && self.scripts.is_done() && self.lando.is_done()
    }
}

#[derive(Debug)]
pub struct InstallReport {
    pub root: NormalizedPath,
    pub scaffold: ScaffoldReport,
    pub config_split: ConfigSplitReport,
}

/// Shell commands the user has to run themselves after this install.
pub fn manual_steps(config: &InstallerConfig, requirement: &StepOutcome<RequirementStatus>) -> Vec<String> {
    let package = &config.dev_package;
    match requirement {
        StepOutcome::Done(RequirementStatus::Added) => {
            vec![format!("composer update {package} --with-all-dependencies")]
        }
        StepOutcome::Failed(_) => vec![
            format!("composer require --dev '{package}:{}'", config.dev_constraint),
            format!("composer update {package} --with-all-dependencies"),
        ],
        _ => Vec::new(),
    }
}

pub struct Installer {
    config: InstallerConfig,
    tx_config: Box<dyn Fn() -> TransactionConfig>,
}

impl Installer {
    pub fn new(config: InstallerConfig) -> Self {
        Self {
            config,
            tx_config: Box::new(TransactionConfig::default),
        }
    }

    /// Use a custom transaction setup for the Lando merge.
    pub fn with_transaction(mut self, make: impl Fn() -> TransactionConfig + 'static) -> Self {
        self.tx_config = Box::new(make);
        self
    }

    pub fn config(&self) -> &InstallerConfig {
        &self.config
    }

    pub fn install(&self) -> Result<InstallReport> {
        let root = self.config.root();
        info!(source = %self.config.source(), root = %root, "copying CI configuration files");
        let scaffold = scaffold::scaffold(
            &self.config.source(),
            &root,
            &scaffold::default_manifest(),
        )?;

        let config_split = self.install_config_split();
        Ok(InstallReport {
            root,
            scaffold,
            config_split,
        })
    }

    /// Each failure is logged and recorded; later steps that depend on
    /// it are not attempted.
    pub fn install_config_split(&self) -> ConfigSplitReport {
        let mut report = ConfigSplitReport::not_run();
        let root = self.config.root();

        report.requirement = StepOutcome::from_result(manifest::ensure_dev_requirement(
            &root,
            &self.config.dev_package,
            &self.config.dev_constraint,
        ));
        if let Some(e) = report.requirement.error() {
            error!(error = %e, "could not ensure dev requirement; skipping config split setup");
            return report;
        }

        report.scripts = StepOutcome::from_result(lando::install_scripts(&self.config));
        if let Some(e) = report.scripts.error() {
            error!(error = %e, "could not install Lando scripts; skipping config split setup");
            return report;
        }

        let major = version::detect_major_version(&root);
        report.services =
            StepOutcome::from_result(services::install_development_services(&self.config, major));
        if let Some(e) = report.services.error() {
            warn!(error = %e, "could not install development services; continuing");
        }

        report.lando = StepOutcome::from_result(
            lando::merge_lando_file(&self.config.lando_path(), (self.tx_config)())
                .map_err(Into::into),
        );
        if let Some(e) = report.lando.error() {
            error!(error = %e, "could not update Lando configuration");
        }

        report
    }
}

impl std::fmt::Debug for Installer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Installer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
