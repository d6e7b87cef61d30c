//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Pantheon CI tools - install CI scaffolding and the Lando config-split setup
#[derive(Parser, Debug)]
#[command(name = "ci-tools")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Copy CI files and set up the dev config split
    ///
    /// Examples:
    ///   ci-tools install
    ///   ci-tools install --root ../site --source vendor/helloworlddevs/pantheon-ci-tools/files
    Install {
        /// Project root (default: nearest directory with a project composer.json)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Packaged files directory
        #[arg(long, env = "CI_TOOLS_SOURCE")]
        source: Option<PathBuf>,

        /// Installer settings file (TOML, JSON or YAML)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Merge the config-split hooks and commands into a Lando file
    Merge {
        /// Lando file to update
        #[arg(default_value = ".lando.yml")]
        file: PathBuf,

        /// Print the diff without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Remove installed files (Lando and composer.json edits are kept)
    Uninstall {
        /// Project root (default: nearest directory with a project composer.json)
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Print the Drupal major version required by composer.json
    DetectVersion {
        /// Project root (default: nearest directory with a project composer.json)
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_merge_defaults() {
        let cli = Cli::parse_from(["ci-tools", "merge"]);
        assert_eq!(
            cli.command,
            Commands::Merge {
                file: PathBuf::from(".lando.yml"),
                dry_run: false
            }
        );
    }

    #[test]
    fn parses_global_verbose_after_subcommand() {
        let cli = Cli::parse_from(["ci-tools", "merge", "site/.lando.yml", "--dry-run", "-v"]);
        assert!(cli.verbose);
        assert_eq!(
            cli.command,
            Commands::Merge {
                file: PathBuf::from("site/.lando.yml"),
                dry_run: true
            }
        );
    }

    #[test]
    fn parses_install_paths() {
        let cli = Cli::parse_from(["ci-tools", "install", "--root", "/srv/site", "--source", "/pkg/files"]);
        match cli.command {
            Commands::Install { root, source, config } => {
                assert_eq!(root, Some(PathBuf::from("/srv/site")));
                assert_eq!(source, Some(PathBuf::from("/pkg/files")));
                assert_eq!(config, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
