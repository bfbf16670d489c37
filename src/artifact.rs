//! # Artifact Validation Records
//!
//! An [`ArtifactRecord`] is the validation state of one module or script in
//! the solution: its identity, where it is built from and packaged to, the
//! dependencies it declares, and a set of independent boolean facets filled
//! in by external validators.
//!
//! Records do not point back at the collection that owns them. Operations
//! that need to know about sibling artifacts, such as
//! [`ArtifactRecord::required_dependencies`], take the sibling
//! [`ArtifactGraph`] as a parameter.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::graph::ArtifactGraph;
use crate::names::{self, NameSet};
use crate::version::{ArtifactVersion, VersionRequirement};

/// What an artifact is packaged as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Module,
    Script,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Module => write!(f, "module"),
            ArtifactKind::Script => write!(f, "script"),
        }
    }
}

/// Validation state of a single module or script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactRecord {
    name: String,
    pub kind: ArtifactKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<ArtifactVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_directory: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_directory: Option<PathBuf>,
    #[serde(default)]
    pub declared_dependencies: Vec<VersionRequirement>,
    /// Dependencies the artifact's own metadata marks as external, i.e.
    /// provided outside the solution and never packaged with it.
    #[serde(default)]
    pub external_dependencies: NameSet,
    /// Name and location resolved to a real module or script.
    #[serde(default)]
    pub is_valid_identity: bool,
    #[serde(default)]
    pub is_version_valid: bool,
    #[serde(default)]
    pub is_new_version: bool,
    #[serde(default)]
    pub supports_version_control: bool,
    #[serde(default)]
    pub is_ready_for_packaging: bool,
    #[serde(default)]
    pub validation_errors: Vec<String>,
    #[serde(default)]
    processing_order: Option<u32>,
}

impl ArtifactRecord {
    /// Create a record with all facets unset.
    ///
    /// Fails with [`Error::MissingRequiredField`] if `name` is blank.
    pub fn new(name: impl Into<String>, kind: ArtifactKind) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::MissingRequiredField {
                record: kind.to_string(),
                field: "name".to_string(),
            });
        }
        Ok(Self {
            name,
            kind,
            version: None,
            source_directory: None,
            target_directory: None,
            declared_dependencies: Vec::new(),
            external_dependencies: NameSet::new(),
            is_valid_identity: false,
            is_version_valid: false,
            is_new_version: false,
            supports_version_control: false,
            is_ready_for_packaging: false,
            validation_errors: Vec::new(),
            processing_order: None,
        })
    }

    pub fn module(name: impl Into<String>) -> Result<Self> {
        Self::new(name, ArtifactKind::Module)
    }

    pub fn script(name: impl Into<String>) -> Result<Self> {
        Self::new(name, ArtifactKind::Script)
    }

    pub fn with_version(mut self, version: ArtifactVersion) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_source_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_directory = Some(dir.into());
        self
    }

    pub fn with_target_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.target_directory = Some(dir.into());
        self
    }

    pub fn with_dependency(mut self, requirement: VersionRequirement) -> Self {
        self.declared_dependencies.push(requirement);
        self
    }

    pub fn with_external_dependency(mut self, name: impl Into<String>) -> Self {
        self.external_dependencies.insert(name);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_named(&self, name: &str) -> bool {
        names::eq(&self.name, name)
    }

    /// Identity, version and version-control facets all hold.
    pub fn is_valid(&self) -> bool {
        self.is_valid_identity && self.is_version_valid && self.supports_version_control
    }

    /// The order assigned by the last [`ArtifactGraph::refresh_ordering`],
    /// or `None` if ordering has not run since the record was inserted.
    pub fn processing_order(&self) -> Option<u32> {
        self.processing_order
    }

    pub(crate) fn set_processing_order(&mut self, order: Option<u32>) {
        self.processing_order = order;
    }

    /// Merge the validation facets and identity payload of `other` into this
    /// record. The record's name and processing order are kept.
    pub fn merge_from(&mut self, other: ArtifactRecord) -> Result<()> {
        if !self.is_named(&other.name) {
            return Err(Error::IdentityMismatch {
                expected: self.name.clone(),
                actual: other.name,
            });
        }

        self.kind = other.kind;
        self.version = other.version;
        self.source_directory = other.source_directory;
        self.target_directory = other.target_directory;
        self.declared_dependencies = other.declared_dependencies;
        self.external_dependencies = other.external_dependencies;
        self.is_valid_identity = other.is_valid_identity;
        self.is_version_valid = other.is_version_valid;
        self.is_new_version = other.is_new_version;
        self.supports_version_control = other.supports_version_control;
        self.is_ready_for_packaging = other.is_ready_for_packaging;
        self.validation_errors = other.validation_errors;
        Ok(())
    }

    /// Declared requirements, filtered against the artifact's external
    /// dependency metadata and the sibling artifacts in `siblings`.
    ///
    /// Requirements without a target directory inherit this artifact's.
    pub fn required_dependencies(
        &self,
        filter: RequirementFilter,
        siblings: &ArtifactGraph,
    ) -> Vec<VersionRequirement> {
        let is_external = |r: &VersionRequirement| self.external_dependencies.contains(&r.name);
        let is_sibling = |r: &VersionRequirement| siblings.contains(&r.name);

        self.declared_dependencies
            .iter()
            .filter(|r| match filter {
                RequirementFilter::FindAll => true,
                RequirementFilter::RemoveExternalDependencies => !is_external(r),
                RequirementFilter::RemoveKnownSolutionItems => !is_sibling(r),
                RequirementFilter::RemoveExternalDependenciesAndKnownSolutionItems => {
                    !is_external(r) && !is_sibling(r)
                }
                RequirementFilter::OnlyKnownSolutionItems => is_sibling(r),
            })
            .map(|r| self.with_default_target(r))
            .collect()
    }

    /// Declared requirements that the artifact marks as external.
    pub fn external_dependency_requirements(&self) -> Vec<VersionRequirement> {
        self.declared_dependencies
            .iter()
            .filter(|r| self.external_dependencies.contains(&r.name))
            .map(|r| self.with_default_target(r))
            .collect()
    }

    fn with_default_target(&self, requirement: &VersionRequirement) -> VersionRequirement {
        let mut requirement = requirement.clone();
        if requirement.target_directory.is_none() {
            requirement.target_directory = self.target_directory.clone();
        }
        requirement
    }
}

impl fmt::Display for ArtifactRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}/{}", self.name, version),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Which declared requirements [`ArtifactRecord::required_dependencies`]
/// returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequirementFilter {
    /// Every declared requirement.
    #[default]
    FindAll,
    /// Drop requirements the artifact marks as external.
    RemoveExternalDependencies,
    /// Drop requirements satisfied by a sibling artifact in the solution.
    RemoveKnownSolutionItems,
    /// Drop both external and sibling requirements.
    RemoveExternalDependenciesAndKnownSolutionItems,
    /// Keep only requirements satisfied by a sibling artifact.
    OnlyKnownSolutionItems,
}

impl RequirementFilter {
    pub const ALL: [RequirementFilter; 5] = [
        RequirementFilter::FindAll,
        RequirementFilter::RemoveExternalDependencies,
        RequirementFilter::RemoveKnownSolutionItems,
        RequirementFilter::RemoveExternalDependenciesAndKnownSolutionItems,
        RequirementFilter::OnlyKnownSolutionItems,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequirementFilter::FindAll => "FindAll",
            RequirementFilter::RemoveExternalDependencies => "RemoveExternalDependencies",
            RequirementFilter::RemoveKnownSolutionItems => "RemoveKnownSolutionItems",
            RequirementFilter::RemoveExternalDependenciesAndKnownSolutionItems => {
                "RemoveExternalDependenciesAndKnownSolutionItems"
            }
            RequirementFilter::OnlyKnownSolutionItems => "OnlyKnownSolutionItems",
        }
    }

    /// Look a filter up by name, ignoring case, `-` and `_`. Unrecognized
    /// names select [`RequirementFilter::FindAll`].
    pub fn from_name(name: &str) -> Self {
        let wanted: String = name
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();

        Self::ALL
            .into_iter()
            .find(|f| f.as_str().to_lowercase() == wanted)
            .unwrap_or_default()
    }
}

impl fmt::Display for RequirementFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(name: &str) -> VersionRequirement {
        VersionRequirement::new(name).unwrap()
    }

    /// A depends on B (in the graph), C (declared external) and D (neither).
    fn solution() -> (ArtifactRecord, ArtifactGraph) {
        let a = ArtifactRecord::module("A")
            .unwrap()
            .with_target_directory("out/A")
            .with_dependency(req("B"))
            .with_dependency(req("C"))
            .with_dependency(req("D"))
            .with_external_dependency("c");

        let mut graph = ArtifactGraph::new();
        graph.add(a.clone()).unwrap();
        graph.add(ArtifactRecord::module("b").unwrap()).unwrap();
        (a, graph)
    }

    fn names(reqs: &[VersionRequirement]) -> Vec<&str> {
        reqs.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_new_rejects_blank_name() {
        let err = ArtifactRecord::script("").unwrap_err();
        match err {
            Error::MissingRequiredField { record, field } => {
                assert_eq!(record, "script");
                assert_eq!(field, "name");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_is_valid_requires_three_facets() {
        let mut record = ArtifactRecord::module("Core").unwrap();
        record.is_valid_identity = true;
        record.is_version_valid = true;
        record.is_ready_for_packaging = true;
        assert!(!record.is_valid());
        record.supports_version_control = true;
        assert!(record.is_valid());
    }

    #[test]
    fn test_filter_find_all() {
        let (a, graph) = solution();
        let all = a.required_dependencies(RequirementFilter::FindAll, &graph);
        assert_eq!(names(&all), vec!["B", "C", "D"]);
    }

    #[test]
    fn test_filter_remove_external() {
        let (a, graph) = solution();
        let reqs = a.required_dependencies(RequirementFilter::RemoveExternalDependencies, &graph);
        assert_eq!(names(&reqs), vec!["B", "D"]);
    }

    #[test]
    fn test_filter_remove_known_solution_items() {
        let (a, graph) = solution();
        let reqs = a.required_dependencies(RequirementFilter::RemoveKnownSolutionItems, &graph);
        assert_eq!(names(&reqs), vec!["C", "D"]);
    }

    #[test]
    fn test_filter_remove_both_leaves_only_unknown() {
        let (a, graph) = solution();
        let reqs = a.required_dependencies(
            RequirementFilter::RemoveExternalDependenciesAndKnownSolutionItems,
            &graph,
        );
        assert_eq!(names(&reqs), vec!["D"]);
    }

    #[test]
    fn test_filter_only_known_solution_items() {
        let (a, graph) = solution();
        let reqs = a.required_dependencies(RequirementFilter::OnlyKnownSolutionItems, &graph);
        assert_eq!(names(&reqs), vec!["B"]);
    }

    #[test]
    fn test_requirements_inherit_target_directory() {
        let (mut a, graph) = solution();
        a.declared_dependencies[2].target_directory = Some(PathBuf::from("elsewhere"));
        let reqs = a.required_dependencies(RequirementFilter::FindAll, &graph);
        assert_eq!(reqs[0].target_directory, Some(PathBuf::from("out/A")));
        assert_eq!(reqs[2].target_directory, Some(PathBuf::from("elsewhere")));
        // the declaration itself is untouched
        assert_eq!(a.declared_dependencies[0].target_directory, None);
    }

    #[test]
    fn test_external_dependency_requirements() {
        let (a, _) = solution();
        let ext = a.external_dependency_requirements();
        assert_eq!(names(&ext), vec!["C"]);
    }

    #[test]
    fn test_filter_from_name() {
        assert_eq!(
            RequirementFilter::from_name("remove-external-dependencies-and-known-solution-items"),
            RequirementFilter::RemoveExternalDependenciesAndKnownSolutionItems
        );
        assert_eq!(
            RequirementFilter::from_name("onlyknownsolutionitems"),
            RequirementFilter::OnlyKnownSolutionItems
        );
        assert_eq!(
            RequirementFilter::from_name("something-else"),
            RequirementFilter::FindAll
        );
        for filter in RequirementFilter::ALL {
            assert_eq!(RequirementFilter::from_name(filter.as_str()), filter);
        }
    }

    #[test]
    fn test_merge_from_copies_facets() {
        let mut existing = ArtifactRecord::module("Core").unwrap();
        existing.set_processing_order(Some(3));

        let mut update = ArtifactRecord::module("CORE")
            .unwrap()
            .with_version("2.0".parse().unwrap())
            .with_dependency(req("Net"));
        update.is_version_valid = true;
        update.is_new_version = true;
        update.supports_version_control = true;
        update.is_ready_for_packaging = true;

        existing.merge_from(update).unwrap();
        assert_eq!(existing.name(), "Core");
        assert!(existing.is_version_valid);
        assert!(existing.is_new_version);
        assert!(existing.supports_version_control);
        assert!(existing.is_ready_for_packaging);
        assert_eq!(existing.declared_dependencies.len(), 1);
        assert_eq!(existing.processing_order(), Some(3));
        assert_eq!(existing.to_string(), "Core/2.0");
    }

    #[test]
    fn test_merge_from_other_artifact_fails() {
        let mut existing = ArtifactRecord::module("Core").unwrap();
        let other = ArtifactRecord::module("Net").unwrap();
        let err = existing.merge_from(other).unwrap_err();
        assert!(matches!(err, Error::IdentityMismatch { .. }));
    }
}
