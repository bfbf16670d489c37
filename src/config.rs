//! # Build Configuration
//!
//! This module defines [`BuildConfig`], the switches that control how a
//! solution is assembled and checked, and the logic for reading it from a
//! YAML or JSON document.
//!
//! ## Format
//!
//! ```yaml
//! allowDuplicateCommandSources: false
//! updateModuleReferences: true
//! checkCommandReferences:
//!   enabled: true
//!   excludedSources: [Microsoft.PowerShell.Utility]
//!   excludedCommands: [Write-Host]
//! ```
//!
//! Every key is optional except `enabled` inside `checkCommandReferences`.
//! Keys are matched without regard to case.
//!
//! ## Validation
//!
//! The document is validated against a table of [`FieldRule`]s rather than
//! deserialized directly, so that every problem is found in one pass. Missing
//! required fields, fields of the wrong type and unknown keys are all
//! collected into a single [`Error::ConfigValidation`].

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::checker::ReferenceCheckConfig;
use crate::error::{Error, Result};
use crate::names::NameSet;

/// Switches controlling one build session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    /// Record the same provider more than once for a command.
    pub allow_duplicate_command_sources: bool,
    /// Merge a re-registered artifact into the existing record instead of
    /// rejecting it as a duplicate.
    pub update_module_references: bool,
    pub check_command_references: ReferenceCheckConfig,
}

/// The value type a field must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    StringList,
    Mapping,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Bool => write!(f, "a boolean"),
            FieldKind::StringList => write!(f, "a list of strings"),
            FieldKind::Mapping => write!(f, "a mapping"),
        }
    }
}

/// One validation rule: the field's name, its type, and whether it must be
/// present.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldRule {
    const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }

    const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self.kind {
            FieldKind::Bool => value.is_bool(),
            FieldKind::StringList => value
                .as_sequence()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            FieldKind::Mapping => value.is_mapping(),
        }
    }
}

pub const BUILD_CONFIG_RULES: &[FieldRule] = &[
    FieldRule::optional("allowDuplicateCommandSources", FieldKind::Bool),
    FieldRule::optional("updateModuleReferences", FieldKind::Bool),
    FieldRule::optional("checkCommandReferences", FieldKind::Mapping),
];

pub const REFERENCE_CHECK_RULES: &[FieldRule] = &[
    FieldRule::required("enabled", FieldKind::Bool),
    FieldRule::optional("excludedSources", FieldKind::StringList),
    FieldRule::optional("excludedCommands", FieldKind::StringList),
];

/// Parse and validate a configuration document.
///
/// An empty document yields [`BuildConfig::default`].
pub fn parse(content: &str) -> Result<BuildConfig> {
    let document: Value = serde_yaml::from_str(content)?;
    let root = match document {
        Value::Null => return Ok(BuildConfig::default()),
        Value::Mapping(map) => map,
        _ => {
            return Err(Error::ConfigValidation {
                issues: vec!["configuration must be a mapping".to_string()],
            })
        }
    };

    let mut issues = Vec::new();
    let top = validate(&root, BUILD_CONFIG_RULES, "", &mut issues);

    let check = match top.get("checkCommandReferences") {
        Some(Value::Mapping(section)) => {
            let fields = validate(
                section,
                REFERENCE_CHECK_RULES,
                "checkCommandReferences.",
                &mut issues,
            );
            ReferenceCheckConfig {
                enabled: bool_field(&fields, "enabled"),
                excluded_sources: list_field(&fields, "excludedSources"),
                excluded_commands: list_field(&fields, "excludedCommands"),
            }
        }
        _ => ReferenceCheckConfig::default(),
    };

    if !issues.is_empty() {
        return Err(Error::ConfigValidation { issues });
    }

    Ok(BuildConfig {
        allow_duplicate_command_sources: bool_field(&top, "allowDuplicateCommandSources"),
        update_module_references: bool_field(&top, "updateModuleReferences"),
        check_command_references: check,
    })
}

/// Read and parse a configuration file.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<BuildConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

/// Check `map` against `rules`, appending an issue for every violation.
/// Returns the values that passed, keyed by rule name.
fn validate<'a>(
    map: &'a Mapping,
    rules: &[FieldRule],
    prefix: &str,
    issues: &mut Vec<String>,
) -> HashMap<&'static str, &'a Value> {
    let mut accepted = HashMap::new();

    for (key, value) in map {
        let Some(key) = key.as_str() else {
            issues.push(format!("{}: keys must be strings", display_prefix(prefix)));
            continue;
        };
        let Some(rule) = rules.iter().find(|r| r.name.eq_ignore_ascii_case(key)) else {
            issues.push(format!("unknown field '{}{}'", prefix, key));
            continue;
        };
        if accepted.contains_key(rule.name) {
            issues.push(format!("field '{}{}' is given more than once", prefix, rule.name));
        } else if rule.accepts(value) {
            accepted.insert(rule.name, value);
        } else {
            issues.push(format!("field '{}{}' must be {}", prefix, rule.name, rule.kind));
        }
    }

    for rule in rules.iter().filter(|r| r.required) {
        let present = map
            .keys()
            .filter_map(Value::as_str)
            .any(|k| rule.name.eq_ignore_ascii_case(k));
        if !present {
            issues.push(format!("missing required field '{}{}'", prefix, rule.name));
        }
    }

    accepted
}

fn display_prefix(prefix: &str) -> &str {
    match prefix.strip_suffix('.') {
        Some(section) => section,
        None => "configuration",
    }
}

fn bool_field(fields: &HashMap<&'static str, &Value>, name: &str) -> bool {
    fields.get(name).and_then(|v| v.as_bool()).unwrap_or(false)
}

fn list_field(fields: &HashMap<&'static str, &Value>, name: &str) -> NameSet {
    fields
        .get(name)
        .and_then(|v| v.as_sequence())
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}
