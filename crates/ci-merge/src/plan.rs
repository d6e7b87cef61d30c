//! Declarative description of what a merge should add
//!
//! A [`MergePlan`] is owned by the caller. It lists hooks to append to
//! `events.<name>` sequences and command definitions to write into
//! `tooling`.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// Top-level key holding lifecycle event hooks.
pub const EVENTS_KEY: &str = "events";
/// Top-level key holding named tooling commands.
pub const TOOLING_KEY: &str = "tooling";
/// Hooks run after the containers start.
pub const POST_START: &str = "post-start";
/// Hooks run after a database/files pull.
pub const POST_PULL: &str = "post-pull";

/// One element of an event hook list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// `{service: command}` mapping form
    Service { service: String, command: String },
    /// Bare string form, e.g. `"appserver: drush cr"`
    Text(String),
}

impl Entry {
    pub fn service(service: impl Into<String>, command: impl Into<String>) -> Self {
        Self::Service {
            service: service.into(),
            command: command.into(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Convert to the YAML node inserted into the document.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Service { service, command } => {
                let mut map = Mapping::new();
                map.insert(Value::from(service.as_str()), Value::from(command.as_str()));
                Value::Mapping(map)
            }
            Self::Text(text) => Value::from(text.as_str()),
        }
    }
}

/// Body of a tooling command: one shell line or an ordered list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandBody {
    Single(String),
    Steps(Vec<String>),
}

/// A named Lando tooling command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDefinition {
    pub service: String,
    pub description: String,
    pub cmd: CommandBody,
}

impl CommandDefinition {
    pub fn single(
        service: impl Into<String>,
        description: impl Into<String>,
        cmd: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            description: description.into(),
            cmd: CommandBody::Single(cmd.into()),
        }
    }

    pub fn steps<I, S>(service: impl Into<String>, description: impl Into<String>, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            service: service.into(),
            description: description.into(),
            cmd: CommandBody::Steps(steps.into_iter().map(Into::into).collect()),
        }
    }

    /// Convert to a mapping with keys in `service`, `description`, `cmd` order.
    pub fn to_value(&self) -> Value {
        let mut map = Mapping::new();
        map.insert(Value::from("service"), Value::from(self.service.as_str()));
        map.insert(Value::from("description"), Value::from(self.description.as_str()));
        let cmd = match &self.cmd {
            CommandBody::Single(line) => Value::from(line.as_str()),
            CommandBody::Steps(lines) => Value::Sequence(
                lines.iter().map(|line| Value::from(line.as_str())).collect(),
            ),
        };
        map.insert(Value::from("cmd"), cmd);
        Value::Mapping(map)
    }
}

/// Desired additions for one merge run.
///
/// `post-start` and `post-pull` are always present (possibly empty) so
/// the merge creates both sections even when nothing is added to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan {
    events: Vec<(String, Vec<Entry>)>,
    tooling: Vec<(String, CommandDefinition)>,
}

impl Default for MergePlan {
    fn default() -> Self {
        Self::new()
    }
}

impl MergePlan {
    pub fn new() -> Self {
        Self {
            events: vec![
                (POST_START.to_string(), Vec::new()),
                (POST_PULL.to_string(), Vec::new()),
            ],
            tooling: Vec::new(),
        }
    }

    pub fn post_start(self, entries: impl IntoIterator<Item = Entry>) -> Self {
        self.event(POST_START, entries)
    }

    pub fn post_pull(self, entries: impl IntoIterator<Item = Entry>) -> Self {
        self.event(POST_PULL, entries)
    }

    /// Append hooks for an arbitrary event name.
    pub fn event(mut self, name: &str, entries: impl IntoIterator<Item = Entry>) -> Self {
        match self.events.iter_mut().find(|(event, _)| event == name) {
            Some((_, existing)) => existing.extend(entries),
            None => self.events.push((name.to_string(), entries.into_iter().collect())),
        }
        self
    }

    /// Add or replace a tooling command. Later definitions win.
    pub fn tooling(mut self, name: &str, definition: CommandDefinition) -> Self {
        match self.tooling.iter_mut().find(|(command, _)| command == name) {
            Some((_, existing)) => *existing = definition,
            None => self.tooling.push((name.to_string(), definition)),
        }
        self
    }

    pub fn events(&self) -> impl Iterator<Item = (&str, &[Entry])> {
        self.events
            .iter()
            .map(|(name, entries)| (name.as_str(), entries.as_slice()))
    }

    pub fn commands(&self) -> impl Iterator<Item = (&str, &CommandDefinition)> {
        self.tooling.iter().map(|(name, def)| (name.as_str(), def))
    }

    /// The tooling section as a YAML mapping, in declaration order.
    pub fn tooling_mapping(&self) -> Mapping {
        self.commands()
            .map(|(name, def)| (Value::from(name), def.to_value()))
            .collect()
    }
}
