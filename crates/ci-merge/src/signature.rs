//! Order- and quoting-independent identity for hook entries
//!
//! Two entries with equal [`Signature`] are duplicates. Mapping entries are
//! rendered as key-sorted JSON. String entries lose surrounding whitespace
//! and a surrounding pair of quote characters; when what remains has
//! the `service: command` shape it is rendered exactly like the equivalent
//! one-key mapping, so `'appserver: drush cr'` and `{appserver: drush cr}`
//! collide.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value as JsonValue};
use serde_yaml::Value;

/// `service: command` with a plain identifier key.
static SERVICE_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_-]+):\s+(\S.*)$").expect("Invalid service command regex")
});

const MAPPING_MARKER: &str = "A:";
const STRING_MARKER: &str = "S:";
const OTHER_MARKER: &str = "V:";

/// Canonical identity of a list entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature(String);

impl Signature {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the signature of an entry.
pub fn signature(entry: &Value) -> Signature {
    match entry {
        Value::Mapping(_) => Signature(format!("{MAPPING_MARKER}{}", canonical_json(entry))),
        Value::String(text) => string_signature(text),
        Value::Tagged(tagged) => signature(&tagged.value),
        other => Signature(format!("{OTHER_MARKER}{}", canonical_json(other))),
    }
}

fn string_signature(text: &str) -> Signature {
    let normalized = strip_outer_quotes(text.trim());

    if let Some(caps) = SERVICE_COMMAND.captures(normalized) {
        let mut map = Map::new();
        map.insert(caps[1].to_string(), JsonValue::String(caps[2].to_string()));
        return Signature(format!("{MAPPING_MARKER}{}", JsonValue::Object(map)));
    }

    Signature(format!("{STRING_MARKER}{normalized}"))
}

/// Drop a matching pair of surrounding `'` or `"` quotes.
///
/// Unpaired quotes belong to the command (`appserver: echo "hi"`).
fn strip_outer_quotes(text: &str) -> &str {
    for quote in ['\'', '"'] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}

/// Render a node as JSON with every mapping's keys sorted.
fn canonical_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                JsonValue::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                JsonValue::Number(u.into())
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(JsonValue::Number)
                    .unwrap_or_else(|| JsonValue::String(n.to_string()))
            }
        }
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Sequence(items) => JsonValue::Array(items.iter().map(canonical_json).collect()),
        Value::Mapping(map) => {
            let mut entries: Vec<(String, JsonValue)> = map
                .iter()
                .map(|(k, v)| (key_string(k), canonical_json(v)))
                .collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));

            let mut json_map = Map::new();
            for (key, value) in entries {
                json_map.insert(key, value);
            }
            JsonValue::Object(json_map)
        }
        Value::Tagged(tagged) => canonical_json(&tagged.value),
    }
}

fn key_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => canonical_json(other).to_string(),
    }
}
