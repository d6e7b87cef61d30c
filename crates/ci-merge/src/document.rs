//! YAML document adapter
//!
//! Parses a file into a [`ConfigDocument`] whose root is always a mapping,
//! hands out typed accessors for the sections the merge touches, and
//! serializes back to Lando-style YAML through the [`normalize`] shim.
//!
//! [`normalize`]: crate::normalize

use ci_fs::{NormalizedPath, io};
use serde_yaml::{Mapping, Sequence, Value};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::normalize;
use crate::signature::signature;

/// A parsed configuration file. The root is a mapping by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    root: Mapping,
}

impl ConfigDocument {
    /// Read and parse `path`.
    ///
    /// A missing file is [`Error::MissingInput`]; unreadable content,
    /// invalid YAML or a non-mapping top level is reported as
    /// [`Error::Read`] or [`Error::Parse`]. The file is never modified.
    pub fn parse(path: &NormalizedPath) -> Result<Self> {
        Self::load(path).map(|(_, doc)| doc)
    }

    /// Like [`parse`](Self::parse), also returning the text that was read.
    pub fn load(path: &NormalizedPath) -> Result<(String, Self)> {
        if !path.is_file() {
            return Err(Error::MissingInput {
                path: path.to_native(),
            });
        }
        let source = io::read_text(path).map_err(|source| Error::Read {
            path: path.to_native(),
            source,
        })?;
        let doc = Self::from_source(&source, path)?;
        Ok((source, doc))
    }

    /// Parse already-loaded text. `origin` is only used in diagnostics.
    pub fn from_source(source: &str, origin: &NormalizedPath) -> Result<Self> {
        let value: Value = serde_yaml::from_str(source)
            .map_err(|e| Error::parse(origin.to_native(), e.to_string()))?;

        let root = match value {
            Value::Mapping(map) => map,
            Value::Null => Mapping::new(),
            other => {
                return Err(Error::parse(
                    origin.to_native(),
                    format!("top level is a {}, expected a mapping", kind_name(&other)),
                ));
            }
        };
        debug!(path = %origin, keys = root.len(), "parsed document");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Mapping {
        &self.root
    }

    /// Look up a top-level key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// Mutable access to a top-level mapping section, created empty when
    /// absent or null.
    pub fn mapping_mut(&mut self, key: &str) -> Result<&mut Mapping> {
        ensure_mapping(&mut self.root, key, key)
    }

    /// Mutable access to the sequence at `parent.child`, creating both
    /// levels when absent or null.
    pub fn nested_sequence_mut(&mut self, parent: &str, child: &str) -> Result<&mut Sequence> {
        let section = ensure_mapping(&mut self.root, parent, parent)?;
        ensure_sequence(section, child, &format!("{parent}.{child}"))
    }

    /// Serialize back to YAML text.
    ///
    /// The encoder output is run through the Lando formatting shim. If the
    /// shimmed text no longer means the same thing as the tree, the raw
    /// encoder output is returned instead.
    pub fn serialize(&self) -> Result<String> {
        let tree = Value::Mapping(self.root.clone());
        let raw = serde_yaml::to_string(&tree).map_err(|e| Error::Serialize {
            message: e.to_string(),
        })?;

        let formatted = normalize::lando_style(&raw);
        if formatted == raw {
            return Ok(raw);
        }

        match serde_yaml::from_str::<Value>(&formatted) {
            Ok(reparsed) if equivalent(&tree, &reparsed) => Ok(formatted),
            Ok(_) => {
                warn!("formatted YAML changed meaning; keeping encoder output");
                Ok(raw)
            }
            Err(e) => {
                warn!(error = %e, "formatted YAML failed to parse; keeping encoder output");
                Ok(raw)
            }
        }
    }
}

fn ensure_mapping<'a>(parent: &'a mut Mapping, key: &str, section: &str) -> Result<&'a mut Mapping> {
    let slot = parent.entry(Value::from(key)).or_insert(Value::Null);
    if slot.is_null() {
        *slot = Value::Mapping(Mapping::new());
    }
    match slot {
        Value::Mapping(map) => Ok(map),
        other => Err(Error::shape(section, "mapping", other)),
    }
}

fn ensure_sequence<'a>(parent: &'a mut Mapping, key: &str, section: &str) -> Result<&'a mut Sequence> {
    let slot = parent.entry(Value::from(key)).or_insert(Value::Null);
    if slot.is_null() {
        *slot = Value::Sequence(Sequence::new());
    }
    match slot {
        Value::Sequence(seq) => Ok(seq),
        other => Err(Error::shape(section, "sequence", other)),
    }
}

/// Short name of a node kind for diagnostics.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Structural equality where sequence elements that are hook entries are
/// compared by [`signature`].
///
/// This is the equality the formatting shim must preserve: it may turn the
/// string `'appserver: drush cr'` into the mapping `appserver: drush cr`
/// but must not change anything else.
pub fn equivalent(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Mapping(left), Value::Mapping(right)) => {
            left.len() == right.len()
                && left
                    .iter()
                    .zip(right.iter())
                    .all(|((lk, lv), (rk, rv))| lk == rk && equivalent(lv, rv))
        }
        (Value::Sequence(left), Value::Sequence(right)) => {
            left.len() == right.len()
                && left.iter().zip(right.iter()).all(|(l, r)| {
                    if is_entry(l) && is_entry(r) {
                        signature(l) == signature(r)
                    } else {
                        equivalent(l, r)
                    }
                })
        }
        _ => a == b,
    }
}

fn is_entry(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Mapping(_))
}
