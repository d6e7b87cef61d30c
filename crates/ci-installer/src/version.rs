//! Drupal major version detection from composer.json

use std::sync::LazyLock;

use ci_fs::NormalizedPath;
use regex::Regex;
use semver::VersionReq;
use serde_json::Value;
use tracing::{debug, warn};

use crate::manifest::read_manifest;

pub const DEFAULT_MAJOR: u64 = 10;

const CORE_PACKAGES: [&str; 2] = ["drupal/core", "drupal/core-recommended"];

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("Invalid number regex"));

/// Major version required by the project's `drupal/core` constraint.
///
/// Falls back to [`DEFAULT_MAJOR`] when the manifest or constraint is
/// missing or unreadable.
pub fn detect_major_version(root: &NormalizedPath) -> u64 {
    let manifest = match read_manifest(root) {
        Ok(manifest) => manifest,
        Err(e) => {
            warn!(error = %e, "cannot read composer.json; assuming Drupal {DEFAULT_MAJOR}");
            return DEFAULT_MAJOR;
        }
    };

    let constraint = CORE_PACKAGES.iter().find_map(|package| {
        manifest
            .get("require")
            .and_then(|require| require.get(*package))
            .and_then(Value::as_str)
    });

    match constraint.and_then(major_from_constraint) {
        Some(major) => {
            debug!(major, "detected Drupal version");
            major
        }
        None => {
            warn!("could not detect Drupal version; assuming Drupal {DEFAULT_MAJOR}");
            DEFAULT_MAJOR
        }
    }
}

/// Major version named by a Composer constraint.
///
/// Semver requirements (`^10.3`, `~11.0.0`) are parsed properly; anything
/// else (`10.2.x-dev`, `^10 || ^11`) uses the first number in the string.
pub fn major_from_constraint(constraint: &str) -> Option<u64> {
    if let Ok(req) = VersionReq::parse(constraint)
        && let Some(first) = req.comparators.first()
    {
        return Some(first.major);
    }
    FIRST_NUMBER
        .find(constraint)
        .and_then(|m| m.as_str().parse().ok())
}
