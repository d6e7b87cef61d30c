//! composer.json editing
//!
//! Only `require-dev` is touched. Other keys keep their order; the output
//! uses Composer's four-space indentation and a trailing newline.

use std::cmp::Ordering;
use std::sync::LazyLock;

use ci_fs::{NormalizedPath, io};
use regex::Regex;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{Error, Result};

pub const COMPOSER_FILE: &str = "composer.json";
const REQUIRE_DEV: &str = "require-dev";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementStatus {
    Added,
    AlreadyPresent,
}

/// Read `composer.json` under `root` as a JSON object.
pub fn read_manifest(root: &NormalizedPath) -> Result<Map<String, Value>> {
    let path = root.join(COMPOSER_FILE);
    if !path.is_file() {
        return Err(Error::ManifestMissing {
            path: path.to_native(),
        });
    }
    let content = io::read_text(&path)?;
    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(Error::manifest_parse(path.to_native(), "top level is not an object")),
        Err(e) => Err(Error::manifest_parse(path.to_native(), e.to_string())),
    }
}

/// Make sure `package` is listed in `require-dev`.
///
/// Never runs Composer; the lock file is left for the user to update.
pub fn ensure_dev_requirement(
    root: &NormalizedPath,
    package: &str,
    constraint: &str,
) -> Result<RequirementStatus> {
    let path = root.join(COMPOSER_FILE);
    let mut manifest = read_manifest(root)?;

    let require_dev = manifest
        .entry(REQUIRE_DEV)
        .or_insert_with(|| Value::Object(Map::new()));
    let Value::Object(packages) = require_dev else {
        return Err(Error::manifest_parse(
            path.to_native(),
            "require-dev is not an object",
        ));
    };

    if packages.contains_key(package) {
        debug!(package, "already in require-dev");
        return Ok(RequirementStatus::AlreadyPresent);
    }

    packages.insert(package.to_string(), Value::from(constraint));
    sort_packages(packages);

    io::write_text(&path, &to_composer_json(&manifest)?)?;
    info!(package, constraint, "added to require-dev");
    Ok(RequirementStatus::Added)
}

/// Sort a package map the way `composer require --sort-packages` does:
/// platform packages first (`php`, `hhvm`, `ext-*`, `lib-*`, then other
/// platform names), then everything else, each group in natural order.
pub fn sort_packages(packages: &mut Map<String, Value>) {
    let mut entries: Vec<(String, Value)> = std::mem::take(packages).into_iter().collect();
    entries.sort_by(|(a, _), (b, _)| compare_packages(a, b));
    packages.extend(entries);
}

/// Names Composer resolves against the platform instead of a repository.
static PLATFORM_PACKAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:php(?:-64bit|-ipv6|-zts|-debug)?|hhvm|(?:ext|lib)-[a-z0-9](?:[_.-]?[a-z0-9]+)*|composer(?:-(?:plugin|runtime))?-api)$",
    )
    .expect("Invalid platform package regex")
});

fn compare_packages(a: &str, b: &str) -> Ordering {
    platform_rank(a)
        .cmp(&platform_rank(b))
        .then_with(|| natural_cmp(a, b))
}

fn platform_rank(name: &str) -> u8 {
    if !PLATFORM_PACKAGE.is_match(name) {
        return 5;
    }
    ["php", "hhvm", "ext", "lib"]
        .iter()
        .position(|prefix| name.starts_with(prefix))
        .map_or(4, |rank| rank as u8)
}

/// `strnatcmp`: digit runs compare by numeric value, everything else
/// byte by byte.
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        if a[i].is_ascii_digit() && b[j].is_ascii_digit() {
            let (a_run, next_i) = digit_run(a, i);
            let (b_run, next_j) = digit_run(b, j);
            let ordering = a_run.len().cmp(&b_run.len()).then_with(|| a_run.cmp(b_run));
            if ordering != Ordering::Equal {
                return ordering;
            }
            (i, j) = (next_i, next_j);
        } else {
            match a[i].cmp(&b[j]) {
                Ordering::Equal => (i, j) = (i + 1, j + 1),
                other => return other,
            }
        }
    }
    (a.len() - i).cmp(&(b.len() - j))
}

/// Digits starting at `start` without leading zeros, and the index after them.
fn digit_run(bytes: &[u8], start: usize) -> (&[u8], usize) {
    let end = bytes[start..]
        .iter()
        .position(|b| !b.is_ascii_digit())
        .map_or(bytes.len(), |offset| start + offset);
    let run = &bytes[start..end];
    let significant = run.iter().position(|&b| b != b'0').unwrap_or(run.len());
    (&run[significant..], end)
}

/// Render with four-space indentation and a trailing newline.
pub fn to_composer_json(manifest: &Map<String, Value>) -> Result<String> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    manifest
        .serialize(&mut serializer)
        .map_err(|e| Error::manifest_parse(COMPOSER_FILE, e.to_string()))?;
    let mut text = String::from_utf8_lossy(&buffer).into_owned();
    text.push('\n');
    Ok(text)
}
