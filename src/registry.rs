//! # Command Reference Registry
//!
//! The registry maps a command name to the ordered list of sources that
//! provide it: a module of the solution, an external package repository, or
//! the host's built-in commands. Names are compared case-insensitively and
//! kept as originally supplied.
//!
//! Lookups accept either a bare command name (`Get-Widget`) or a qualified
//! reference naming the provider (`Contoso.Core\Get-Widget`). A qualified
//! lookup only matches when that exact provider is registered for the
//! command.
//!
//! The registry snapshot is pretty-printed JSON that preserves insertion
//! order, so a registry can be cached between runs and reloaded without loss.

use std::collections::HashMap;
use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::names;

/// Separator between provider and command in a qualified reference.
pub const QUALIFIER_SEPARATOR: char = '\\';

/// The kind of command a source provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CommandType {
    Alias,
    Function,
    Filter,
    Cmdlet,
    ExternalScript,
    Application,
    Workflow,
    Configuration,
    Unknown,
}

impl CommandType {
    const NAMED: [CommandType; 8] = [
        CommandType::Alias,
        CommandType::Function,
        CommandType::Filter,
        CommandType::Cmdlet,
        CommandType::ExternalScript,
        CommandType::Application,
        CommandType::Workflow,
        CommandType::Configuration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandType::Alias => "Alias",
            CommandType::Function => "Function",
            CommandType::Filter => "Filter",
            CommandType::Cmdlet => "Cmdlet",
            CommandType::ExternalScript => "ExternalScript",
            CommandType::Application => "Application",
            CommandType::Workflow => "Workflow",
            CommandType::Configuration => "Configuration",
            CommandType::Unknown => "Unknown",
        }
    }

    /// Case-insensitive lookup; unrecognized names map to `Unknown`.
    pub fn from_name(name: &str) -> Self {
        Self::NAMED
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(name.trim()))
            .unwrap_or(CommandType::Unknown)
    }
}

impl From<String> for CommandType {
    fn from(name: String) -> Self {
        CommandType::from_name(&name)
    }
}

impl From<CommandType> for String {
    fn from(command_type: CommandType) -> Self {
        command_type.as_str().to_string()
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a command provider lives relative to the solution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceLocation {
    #[default]
    Unknown,
    /// Fetched from an external package repository.
    ExternalRepository,
    /// Shipped with the host.
    BuiltIn,
    /// Another artifact of the solution being built.
    Solution,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceLocation::Unknown => "Unknown",
            SourceLocation::ExternalRepository => "ExternalRepository",
            SourceLocation::BuiltIn => "BuiltIn",
            SourceLocation::Solution => "Solution",
        };
        f.write_str(s)
    }
}

/// One provider of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandSourceEntry {
    pub command_name: String,
    pub command_type: CommandType,
    /// Empty for built-in commands that have no owning module.
    #[serde(default)]
    pub source_name: String,
    #[serde(default)]
    pub source_location: SourceLocation,
}

impl CommandSourceEntry {
    /// Fails with [`Error::MissingRequiredField`] if the command name is
    /// blank.
    pub fn new(
        command_name: impl Into<String>,
        command_type: CommandType,
        source_name: impl Into<String>,
        source_location: SourceLocation,
    ) -> Result<Self> {
        let command_name = command_name.into();
        if command_name.trim().is_empty() {
            return Err(Error::MissingRequiredField {
                record: "command source".to_string(),
                field: "commandName".to_string(),
            });
        }
        Ok(Self {
            command_name,
            command_type,
            source_name: source_name.into(),
            source_location,
        })
    }

    /// `source\command`, or just `command` when there is no source name.
    pub fn fully_qualified_name(&self) -> String {
        qualify(&self.source_name, &self.command_name)
    }
}

impl fmt::Display for CommandSourceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.source_name, self.source_location)
    }
}

pub(crate) fn qualify(source: &str, command: &str) -> String {
    if source.is_empty() {
        command.to_string()
    } else {
        format!("{}{}{}", source, QUALIFIER_SEPARATOR, command)
    }
}

/// All known providers of one command, in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRegistryEntry {
    pub command_name: String,
    pub sources: Vec<CommandSourceEntry>,
}

impl CommandRegistryEntry {
    pub fn contains_source(&self, source_name: &str) -> bool {
        self.sources
            .iter()
            .any(|s| names::eq(&s.source_name, source_name))
    }
}

/// A parsed command lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandRef<'a> {
    Bare(&'a str),
    Qualified { source: &'a str, command: &'a str },
}

impl<'a> CommandRef<'a> {
    /// Parse a bare or `source\command` reference.
    ///
    /// Fails with [`Error::MalformedReference`] when the reference contains a
    /// separator but is not exactly two non-blank halves around one separator.
    pub fn parse(reference: &'a str) -> Result<Self> {
        let reference = reference.trim();
        let Some((source, command)) = reference.split_once(QUALIFIER_SEPARATOR) else {
            return Ok(CommandRef::Bare(reference));
        };

        if source.trim().is_empty()
            || command.trim().is_empty()
            || command.contains(QUALIFIER_SEPARATOR)
        {
            return Err(Error::MalformedReference {
                reference: reference.to_string(),
            });
        }

        Ok(CommandRef::Qualified {
            source: source.trim(),
            command: command.trim(),
        })
    }

    pub fn command(&self) -> &'a str {
        match self {
            CommandRef::Bare(command) => command,
            CommandRef::Qualified { command, .. } => command,
        }
    }

    pub fn source(&self) -> Option<&'a str> {
        match self {
            CommandRef::Bare(_) => None,
            CommandRef::Qualified { source, .. } => Some(source),
        }
    }
}

/// Command name → providers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CommandRegistryEntry>", into = "Vec<CommandRegistryEntry>")]
pub struct CommandRegistry {
    entries: Vec<CommandRegistryEntry>,
    index: HashMap<String, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `entry` as a provider of its command.
    ///
    /// Unless `allow_duplicate_sources` is set, a source already recorded for
    /// the command is not added a second time. Returns whether `entry` was
    /// inserted.
    pub fn register(&mut self, entry: CommandSourceEntry, allow_duplicate_sources: bool) -> bool {
        let key = names::key(&entry.command_name);
        match self.index.get(&key) {
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(CommandRegistryEntry {
                    command_name: entry.command_name.clone(),
                    sources: vec![entry],
                });
                true
            }
            Some(&slot) => {
                let existing = &mut self.entries[slot];
                if allow_duplicate_sources || !existing.contains_source(&entry.source_name) {
                    existing.sources.push(entry);
                    true
                } else {
                    debug!(
                        "Skipping duplicate source {} for {}",
                        entry.source_name, entry.command_name
                    );
                    false
                }
            }
        }
    }

    /// Register every provider of `other`. Returns how many were inserted.
    pub fn extend_from(&mut self, other: &CommandRegistry, allow_duplicate_sources: bool) -> usize {
        other
            .entries
            .iter()
            .flat_map(|e| e.sources.iter())
            .filter(|s| self.register((*s).clone(), allow_duplicate_sources))
            .count()
    }

    /// Whether a bare or qualified reference resolves.
    pub fn contains(&self, reference: &str) -> Result<bool> {
        Ok(!self.sources_for(reference)?.is_empty())
    }

    /// Providers matching a bare or qualified reference, in registration
    /// order. Unknown or blank references yield an empty list.
    pub fn sources_for(&self, reference: &str) -> Result<Vec<&CommandSourceEntry>> {
        let parsed = CommandRef::parse(reference)?;
        let Some(entry) = self.get(parsed.command()) else {
            return Ok(Vec::new());
        };

        Ok(match parsed.source() {
            None => entry.sources.iter().collect(),
            Some(source) => entry
                .sources
                .iter()
                .filter(|s| names::eq(&s.source_name, source))
                .collect(),
        })
    }

    pub fn get(&self, command_name: &str) -> Option<&CommandRegistryEntry> {
        if command_name.is_empty() {
            return None;
        }
        self.index
            .get(&names::key(command_name))
            .map(|&i| &self.entries[i])
    }

    /// Number of distinct commands.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CommandRegistryEntry> {
        self.entries.iter()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }
}

impl From<Vec<CommandRegistryEntry>> for CommandRegistry {
    fn from(entries: Vec<CommandRegistryEntry>) -> Self {
        let mut registry = CommandRegistry::new();
        for entry in entries {
            let key = names::key(&entry.command_name);
            match registry.index.get(&key) {
                Some(&slot) => registry.entries[slot].sources.extend(entry.sources),
                None => {
                    registry.index.insert(key, registry.entries.len());
                    registry.entries.push(entry);
                }
            }
        }
        registry
    }
}

impl From<CommandRegistry> for Vec<CommandRegistryEntry> {
    fn from(registry: CommandRegistry) -> Self {
        registry.entries
    }
}
