//! # Reference Checker
//!
//! Verifies that the commands an artifact invokes can be resolved before the
//! artifact is packaged.
//!
//! ## Process
//!
//! 1.  **Candidates**: referenced names are deduplicated case-insensitively,
//!     blank names are dropped, and every locally defined function is removed.
//!     What remains are the artifact's external references.
//! 2.  **Enabled**: a disabled [`ReferenceCheckConfig`] produces no results.
//! 3.  **Exclusions**: a candidate is skipped when its command name is an
//!     excluded command, or when it resolves to an excluded source.
//! 4.  **Lookup**: each remaining candidate is looked up in the
//!     [`CommandRegistry`]. Found references report the provider and its
//!     [`SourceLocation`]; the checker does not filter by location, callers
//!     decide which locations are acceptable.
//!
//! An unresolved reference is a result with `is_found == false`, never an
//! error. Only a malformed qualified reference fails the check.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::names::NameSet;
use crate::registry::{qualify, CommandRef, CommandRegistry, CommandType, SourceLocation};
use crate::syntax::SourceSymbols;

/// Reference checking switches and exclusions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceCheckConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Providers whose commands are never reported.
    #[serde(default)]
    pub excluded_sources: NameSet,
    /// Commands that are never reported.
    #[serde(default)]
    pub excluded_commands: NameSet,
}

impl ReferenceCheckConfig {
    /// An enabled configuration with no exclusions.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    pub fn exclude_source(mut self, source: impl Into<String>) -> Self {
        self.excluded_sources.insert(source);
        self
    }

    pub fn exclude_command(mut self, command: impl Into<String>) -> Self {
        self.excluded_commands.insert(command);
        self
    }
}

/// The outcome of checking one referenced command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub command_name: String,
    pub command_type: Option<CommandType>,
    /// Provider the reference resolved to, or the qualifier of an unresolved
    /// qualified reference.
    pub source: Option<String>,
    pub source_location: SourceLocation,
    /// Set by consumers that act on the result; `None` until then.
    pub is_referenced: Option<bool>,
    pub is_found: bool,
}

impl AnalysisResult {
    pub fn fully_qualified_name(&self) -> String {
        qualify(self.source.as_deref().unwrap_or(""), &self.command_name)
    }
}

/// Step 1: the distinct, non-blank, non-local references of an artifact.
pub fn candidate_references(symbols: &SourceSymbols) -> Vec<&str> {
    let mut seen = NameSet::new();
    symbols
        .referenced
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .filter(|r| seen.insert(*r))
        .filter(|r| !symbols.defined.contains(r))
        .collect()
}

/// Check every external reference of one artifact against `registry`.
pub fn check_references(
    symbols: &SourceSymbols,
    registry: &CommandRegistry,
    config: &ReferenceCheckConfig,
) -> Result<Vec<AnalysisResult>> {
    if !config.enabled {
        return Ok(Vec::new());
    }

    let candidates = candidate_references(symbols);
    debug!("Checking {} candidate references", candidates.len());

    let mut results = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let parsed = CommandRef::parse(candidate)?;
        if config.excluded_commands.contains(parsed.command()) {
            continue;
        }

        let sources = registry.sources_for(candidate)?;
        let resolved_source = parsed
            .source()
            .or_else(|| sources.first().map(|s| s.source_name.as_str()));
        if resolved_source.is_some_and(|s| !s.is_empty() && config.excluded_sources.contains(s)) {
            continue;
        }

        let result = match sources.first() {
            Some(provider) => AnalysisResult {
                command_name: parsed.command().to_string(),
                command_type: Some(provider.command_type),
                source: Some(provider.source_name.clone()).filter(|s| !s.is_empty()),
                source_location: provider.source_location,
                is_referenced: None,
                is_found: true,
            },
            None => AnalysisResult {
                command_name: parsed.command().to_string(),
                command_type: None,
                source: parsed.source().map(str::to_string),
                source_location: SourceLocation::Unknown,
                is_referenced: None,
                is_found: false,
            },
        };
        results.push(result);
    }

    Ok(results)
}

/// Flag solution commands by whether the artifact declares a dependency on
/// the module that provides them.
///
/// Results resolved to a [`SourceLocation::Solution`] provider get
/// `is_referenced = Some(true)` when the provider is in `declared`, and
/// `Some(false)` when the command is used without declaring its module.
/// Other results are left untouched.
pub fn mark_declared_dependencies(results: &mut [AnalysisResult], declared: &NameSet) {
    for result in results.iter_mut() {
        if !result.is_found || result.source_location != SourceLocation::Solution {
            continue;
        }
        let declared_here = result
            .source
            .as_deref()
            .is_some_and(|s| declared.contains(s));
        result.is_referenced = Some(declared_here);
    }
}

/// Reference check results for one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceReport {
    pub artifact: String,
    pub results: Vec<AnalysisResult>,
}

impl ReferenceReport {
    pub fn unresolved(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.results.iter().filter(|r| !r.is_found)
    }

    /// Solution commands used without declaring the providing module.
    pub fn undeclared(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.results.iter().filter(|r| r.is_referenced == Some(false))
    }

    /// Found references counted per location, in a fixed location order.
    pub fn by_location(&self) -> Vec<(SourceLocation, usize)> {
        [
            SourceLocation::Solution,
            SourceLocation::ExternalRepository,
            SourceLocation::BuiltIn,
            SourceLocation::Unknown,
        ]
        .into_iter()
        .map(|loc| {
            let count = self
                .results
                .iter()
                .filter(|r| r.is_found && r.source_location == loc)
                .count();
            (loc, count)
        })
        .filter(|(_, count)| *count > 0)
        .collect()
    }

    pub fn is_clean(&self) -> bool {
        self.unresolved().next().is_none() && self.undeclared().next().is_none()
    }
}
