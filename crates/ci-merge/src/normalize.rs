//! Lando formatting shim over `serde_yaml` output
//!
//! `serde_yaml` has no per-scalar style control, so strings containing
//! `: ` come out quoted (`- 'appserver: drush cr'`). Lando files
//! conventionally write these hooks bare. The rewrites here only touch
//! list-item lines and `cmd:` lines, and each one is applied only when the
//! unquoted line parses back to the intended value.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_yaml::Value;

use crate::signature::signature;

/// A bare `-` followed by a `key: value` line on its own.
static SPLIT_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^( *)-[ \t]*\n( +)([A-Za-z0-9_-]+:.*)$").expect("Invalid split item regex")
});

/// A list item holding a quoted `service: command` string.
static QUOTED_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^( *- )('[A-Za-z0-9_-]+:[ \t]*.+'|"[A-Za-z0-9_-]+:[ \t]*.+")$"#)
        .expect("Invalid quoted item regex")
});

/// A `cmd:` key with a quoted scalar value.
static QUOTED_CMD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^( *cmd: )('.*'|".*")$"#).expect("Invalid quoted cmd regex")
});

/// Apply every rewrite, in order.
pub fn lando_style(yaml: &str) -> String {
    let collapsed = collapse_split_items(yaml);
    let items = unquote_list_items(&collapsed);
    unquote_cmd_values(&items).into_owned()
}

/// Join `-\n  key: value` onto one line.
///
/// Only when the body sits exactly two columns right of the dash, which is
/// where `- ` puts it; any other indentation would change the structure.
pub fn collapse_split_items(yaml: &str) -> Cow<'_, str> {
    SPLIT_ITEM.replace_all(yaml, |caps: &Captures| {
        let dash_indent = &caps[1];
        let body_indent = &caps[2];
        if body_indent.len() == dash_indent.len() + 2 {
            format!("{dash_indent}- {}", &caps[3])
        } else {
            caps[0].to_string()
        }
    })
}

/// Rewrite `- 'service: command'` as `- service: command`.
///
/// The bare form parses as a one-key mapping; the rewrite is kept only
/// when that mapping has the same signature as the quoted string.
pub fn unquote_list_items(yaml: &str) -> Cow<'_, str> {
    QUOTED_ITEM.replace_all(yaml, |caps: &Captures| {
        let prefix = &caps[1];
        match decode_quoted(&caps[2]) {
            Some(text) if bare_item_matches(&text) => format!("{prefix}{text}"),
            _ => caps[0].to_string(),
        }
    })
}

/// Rewrite `cmd: 'text'` as `cmd: text` where the plain scalar reads back
/// as the same string.
pub fn unquote_cmd_values(yaml: &str) -> Cow<'_, str> {
    QUOTED_CMD.replace_all(yaml, |caps: &Captures| {
        let prefix = &caps[1];
        match decode_quoted(&caps[2]) {
            Some(text) if bare_cmd_matches(&text) => format!("{prefix}{text}"),
            _ => caps[0].to_string(),
        }
    })
}

/// Decode a single- or double-quoted YAML scalar into its string value.
fn decode_quoted(quoted: &str) -> Option<String> {
    match serde_yaml::from_str::<Value>(quoted) {
        Ok(Value::String(text)) if !text.contains('\n') => Some(text),
        _ => None,
    }
}

fn bare_item_matches(text: &str) -> bool {
    let Ok(parsed) = serde_yaml::from_str::<Value>(text) else {
        return false;
    };
    let one_string_entry = parsed
        .as_mapping()
        .is_some_and(|map| map.len() == 1 && map.values().all(Value::is_string));
    one_string_entry && signature(&parsed) == signature(&Value::from(text))
}

fn bare_cmd_matches(text: &str) -> bool {
    let Ok(parsed) = serde_yaml::from_str::<Value>(&format!("cmd: {text}")) else {
        return false;
    };
    parsed.get("cmd").and_then(Value::as_str) == Some(text)
}
