//! development.services.yml installation
//!
//! Drupal 11 core declares `cache.backend.null` itself, so older local
//! service files that redeclare it (or the memory backend) break the
//! container. Those definitions are stripped before the template is copied.

use std::borrow::Cow;
use std::fs;
use std::sync::LazyLock;

use ci_fs::{NormalizedPath, io};
use regex::Regex;
use tracing::{info, warn};

use crate::config::InstallerConfig;
use crate::error::{Error, Result};
use crate::report::FileAction;

pub const SERVICES_FILE: &str = "development.services.yml";

/// First major version whose core defines the null cache backend.
const CORE_NULL_BACKEND: u64 = 11;

/// `cache.backend.null:` or `cache.backend.memory:` as a service key.
static BACKEND_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*)cache\.backend\.(?:null|memory):\s*(\{.*\}\s*)?$")
        .expect("Invalid backend key regex")
});

static BACKEND_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*#.*cache\.backend\.(?:null|memory)").expect("Invalid backend comment regex")
});

static SERVICES_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^services:\s*$").expect("Invalid services header regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServicesOutcome {
    Written {
        webroot: String,
        major: u64,
        action: FileAction,
    },
    /// No `sites/default` directory under any webroot candidate
    NoWebroot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicesReport {
    pub outcome: ServicesOutcome,
    /// Existing service files rewritten by the Drupal 11 cleanup
    pub cleaned: Vec<String>,
}

/// First candidate with a `sites/default` directory.
pub fn find_webroot(root: &NormalizedPath, candidates: &[String]) -> Option<String> {
    candidates
        .iter()
        .find(|webroot| root.join(webroot).join("sites/default").is_dir())
        .cloned()
}

pub fn template_name(major: u64) -> &'static str {
    if major >= CORE_NULL_BACKEND {
        "development.services.d11.yml"
    } else {
        "development.services.d10.yml"
    }
}

/// Install the template for `major` into `<webroot>/sites`.
pub fn install_development_services(config: &InstallerConfig, major: u64) -> Result<ServicesReport> {
    let root = config.root();
    let Some(webroot) = find_webroot(&root, &config.webroots) else {
        warn!("no Drupal sites directory found; skipping {SERVICES_FILE}");
        return Ok(ServicesReport {
            outcome: ServicesOutcome::NoWebroot,
            cleaned: Vec::new(),
        });
    };
    let sites = root.join(&webroot).join("sites");

    let cleaned = if major >= CORE_NULL_BACKEND {
        clean_services_dir(&sites)?
    } else {
        Vec::new()
    };

    let template = config.source().join("templates").join(template_name(major));
    if !template.is_file() {
        return Err(Error::TemplateMissing {
            path: template.to_native(),
        });
    }

    let dest = sites.join(SERVICES_FILE);
    let action = if dest.is_file() {
        FileAction::Updated
    } else {
        FileAction::Installed
    };
    io::copy_file(&template, &dest)?;
    info!(path = %dest.display_relative(&root), major, action = %action, "development services");

    Ok(ServicesReport {
        outcome: ServicesOutcome::Written {
            webroot,
            major,
            action,
        },
        cleaned,
    })
}

/// Strip conflicting cache backends from every `development.services*.yml`
/// in `sites`. Returns the names of files that changed.
pub fn clean_services_dir(sites: &NormalizedPath) -> Result<Vec<String>> {
    let native = sites.to_native();
    let entries = fs::read_dir(&native).map_err(|e| ci_fs::Error::io(&native, e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ci_fs::Error::io(&native, e))?;
        match entry.file_name().into_string() {
            Ok(name) if is_services_file(&name) => names.push(name),
            Ok(_) => {}
            Err(raw) => warn!(name = ?raw, "skipping file with a non UTF-8 name"),
        }
    }
    names.sort();

    let mut cleaned = Vec::new();
    for name in names {
        let path = sites.join(&name);
        let content = io::read_text(&path)?;
        if let Cow::Owned(stripped) = strip_cache_backends(&content) {
            io::write_text(&path, &stripped)?;
            info!(file = %name, "removed incompatible cache services");
            cleaned.push(name);
        }
    }
    Ok(cleaned)
}

fn is_services_file(name: &str) -> bool {
    name.starts_with("development.services") && name.ends_with(".yml")
}

/// Remove null/memory cache backend definitions from service YAML.
///
/// Handles block definitions (the key line plus its more-indented body),
/// inline `{ ... }` definitions and comment lines naming them, then drops a
/// `services:` header left with no entries.
pub fn strip_cache_backends(content: &str) -> Cow<'_, str> {
    let mut kept: Vec<&str> = Vec::new();
    let mut skip_deeper_than: Option<usize> = None;
    let mut changed = false;

    for line in content.lines() {
        if let Some(indent) = skip_deeper_than {
            if line.trim().is_empty() || indent_of(line) > indent {
                changed = true;
                continue;
            }
            skip_deeper_than = None;
        }
        if BACKEND_COMMENT.is_match(line) {
            changed = true;
            continue;
        }
        if let Some(caps) = BACKEND_KEY.captures(line) {
            changed = true;
            if caps.get(2).is_none() {
                skip_deeper_than = Some(caps[1].len());
            }
            continue;
        }
        kept.push(line);
    }

    if !changed {
        return Cow::Borrowed(content);
    }

    let kept = drop_empty_services_headers(kept);
    let mut out = kept.join("\n");
    if content.ends_with('\n') && !out.is_empty() {
        out.push('\n');
    }
    Cow::Owned(out)
}

fn drop_empty_services_headers(lines: Vec<&str>) -> Vec<&str> {
    let mut out = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        if SERVICES_HEADER.is_match(line) {
            let has_children = lines[i + 1..]
                .iter()
                .find(|next| !next.trim().is_empty())
                .is_some_and(|next| indent_of(next) > 0);
            if !has_children {
                continue;
            }
        }
        out.push(*line);
    }
    out
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}
