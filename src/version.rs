//! # Version Requirements and Resolution
//!
//! This module models the dependency declarations an artifact makes on other
//! artifacts ("requires `Contoso.Core` at `1.2.0`") and reconciles flat lists
//! of such declarations into deduplicated selections.
//!
//! ## Grouping
//!
//! Requirements are grouped by `(name, target_directory)`, with the name
//! compared case-insensitively. Two requirements on the same artifact that
//! are packaged into different target directories are independent.
//!
//! ## Resolution
//!
//! - [`latest_per_group`] keeps the single highest version of each group. An
//!   absent version ("any version") sorts below every concrete version, and
//!   the first of several equal maxima wins.
//! - [`unique_per_group`] keeps one entry per distinct version of each group,
//!   discarding exact duplicates.
//!
//! Both are pure functions. Groups appear in the order in which their first
//! member was encountered, so the output is stable under repeated application.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::names;

/// A dotted numeric artifact version: `major.minor[.build[.revision]]`.
///
/// A missing component sorts below any present component, so `1.2` is
/// lower than `1.2.0`, which is lower than `1.2.0.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArtifactVersion {
    pub major: u64,
    pub minor: u64,
    pub build: Option<u64>,
    pub revision: Option<u64>,
}

impl ArtifactVersion {
    pub fn new(major: u64, minor: u64) -> Self {
        Self {
            major,
            minor,
            build: None,
            revision: None,
        }
    }

    pub fn with_build(mut self, build: u64) -> Self {
        self.build = Some(build);
        self
    }

    /// Sets the revision component. A revision implies a build component,
    /// which defaults to `0` when not already present.
    pub fn with_revision(mut self, revision: u64) -> Self {
        self.build = Some(self.build.unwrap_or(0));
        self.revision = Some(revision);
        self
    }
}

impl FromStr for ArtifactVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidVersion {
            value: s.to_string(),
        };

        let parts = s
            .trim()
            .split('.')
            .map(|p| p.parse::<u64>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>>>()?;

        match parts.as_slice() {
            [major, minor] => Ok(Self::new(*major, *minor)),
            [major, minor, build] => Ok(Self::new(*major, *minor).with_build(*build)),
            [major, minor, build, revision] => Ok(Self::new(*major, *minor)
                .with_build(*build)
                .with_revision(*revision)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for ArtifactVersion {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ArtifactVersion> for String {
    fn from(version: ArtifactVersion) -> Self {
        version.to_string()
    }
}

impl fmt::Display for ArtifactVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(build) = self.build {
            write!(f, ".{}", build)?;
        }
        if let Some(revision) = self.revision {
            write!(f, ".{}", revision)?;
        }
        Ok(())
    }
}

/// Where a requirement was resolved from, when known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementSource {
    /// Name of the package repository that provides the artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// Location (URL or path) of that repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_source_location: Option<String>,
    /// Package management provider used to fetch the artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_management_provider: Option<String>,
    /// Lower values are preferred when several repositories qualify.
    #[serde(default)]
    pub priority: i32,
}

/// A declared dependency on another artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRequirement {
    pub name: String,
    /// `None` means any version satisfies the requirement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<ArtifactVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_directory: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_information: Option<RequirementSource>,
}

impl VersionRequirement {
    /// Create a requirement on `name` at any version.
    ///
    /// Fails with [`Error::MissingRequiredField`] if the name is blank.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::MissingRequiredField {
                record: "version requirement".to_string(),
                field: "name".to_string(),
            });
        }
        Ok(Self {
            name,
            version: None,
            guid: None,
            target_directory: None,
            source_information: None,
        })
    }

    pub fn with_version(mut self, version: ArtifactVersion) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = Some(guid.into());
        self
    }

    pub fn with_target_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.target_directory = Some(dir.into());
        self
    }

    pub fn with_source_information(mut self, source: RequirementSource) -> Self {
        self.source_information = Some(source);
        self
    }

    /// Case-insensitive name comparison.
    pub fn is_named(&self, name: &str) -> bool {
        names::eq(&self.name, name)
    }

    fn group_key(&self) -> GroupKey {
        (names::key(&self.name), self.target_directory.clone())
    }
}

impl fmt::Display for VersionRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}/{}", self.name, version),
            None => write!(f, "{}", self.name),
        }
    }
}

type GroupKey = (String, Option<PathBuf>);

/// Partition `requirements` into groups, preserving first-occurrence order of
/// groups and input order within each group.
fn group(requirements: &[VersionRequirement]) -> Vec<Vec<&VersionRequirement>> {
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<Vec<&VersionRequirement>> = Vec::new();

    for requirement in requirements {
        let slot = *index.entry(requirement.group_key()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(requirement);
    }

    groups
}

/// Select the highest-versioned requirement of each `(name, target)` group.
///
/// # Examples
///
/// ```
/// use solution_build::version::{latest_per_group, VersionRequirement};
///
/// let reqs = vec![
///     VersionRequirement::new("Core").unwrap().with_version("1.0".parse().unwrap()),
///     VersionRequirement::new("core").unwrap().with_version("2.1".parse().unwrap()),
///     VersionRequirement::new("Net").unwrap(),
/// ];
/// let latest = latest_per_group(&reqs);
/// assert_eq!(latest.len(), 2);
/// assert_eq!(latest[0].to_string(), "core/2.1");
/// assert_eq!(latest[1].to_string(), "Net");
/// ```
pub fn latest_per_group(requirements: &[VersionRequirement]) -> Vec<VersionRequirement> {
    group(requirements)
        .into_iter()
        .filter_map(|members| {
            members
                .into_iter()
                .reduce(|best, candidate| {
                    if candidate.version > best.version {
                        candidate
                    } else {
                        best
                    }
                })
                .cloned()
        })
        .collect()
}

/// Keep one requirement per distinct version within each `(name, target)`
/// group. The first occurrence of a given version wins.
pub fn unique_per_group(requirements: &[VersionRequirement]) -> Vec<VersionRequirement> {
    let mut result = Vec::with_capacity(requirements.len());

    for members in group(requirements) {
        let mut seen: HashSet<Option<&ArtifactVersion>> = HashSet::new();
        for requirement in members {
            if seen.insert(requirement.version.as_ref()) {
                result.push(requirement.clone());
            }
        }
    }

    result
}

/// An ordered collection of requirements with lookup helpers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequirementSet {
    items: Vec<VersionRequirement>,
}

impl RequirementSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, requirement: VersionRequirement) {
        self.items.push(requirement);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VersionRequirement> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[VersionRequirement] {
        &self.items
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|r| r.is_named(name))
    }

    pub fn contains_version(&self, name: &str, version: Option<&ArtifactVersion>) -> bool {
        self.items
            .iter()
            .any(|r| r.is_named(name) && r.version.as_ref() == version)
    }

    /// The highest-versioned requirement on `name`, regardless of target
    /// directory.
    pub fn latest(&self, name: &str) -> Option<&VersionRequirement> {
        self.items
            .iter()
            .filter(|r| r.is_named(name))
            .reduce(|best, candidate| {
                if candidate.version > best.version {
                    candidate
                } else {
                    best
                }
            })
    }

    pub fn latest_per_group(&self) -> Vec<VersionRequirement> {
        latest_per_group(&self.items)
    }

    pub fn unique_per_group(&self) -> Vec<VersionRequirement> {
        unique_per_group(&self.items)
    }
}

impl FromIterator<VersionRequirement> for RequirementSet {
    fn from_iter<I: IntoIterator<Item = VersionRequirement>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for RequirementSet {
    type Item = VersionRequirement;
    type IntoIter = std::vec::IntoIter<VersionRequirement>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
