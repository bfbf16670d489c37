//! # Solution Manifest
//!
//! A manifest describes every module and script of a solution in one YAML
//! (or JSON) document: identity, directories, declared requirements, the
//! validation facets filled in by external validators, and the symbols the
//! external parser extracted from each artifact's source.
//!
//! ```yaml
//! modules:
//!   - name: Contoso.Core
//!     version: 1.2.0
//!     targetDirectory: out/modules
//!     requiredModules:
//!       - Contoso.Util
//!       - name: Pester
//!         version: 5.3.1
//!     externalModuleDependencies: [Pester]
//!     symbols:
//!       defined: [Get-Widget]
//!       referenced: [Write-Output]
//! scripts:
//!   - name: Deploy
//!     sourceDirectory: scripts
//!     requiredModules: [Contoso.Core]
//! ```
//!
//! Loading the document only checks its shape. Each entry is turned into an
//! [`ArtifactRecord`] separately by [`ArtifactSpec::into_record`], so one bad
//! entry does not prevent the rest of the solution from loading.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::artifact::{ArtifactKind, ArtifactRecord};
use crate::error::{Error, Result};
use crate::syntax::SourceSymbols;
use crate::version::{ArtifactVersion, VersionRequirement};

/// The whole solution as written in a manifest file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionManifest {
    #[serde(default)]
    pub modules: Vec<ArtifactSpec>,
    #[serde(default)]
    pub scripts: Vec<ArtifactSpec>,
}

/// One `requiredModules` entry: either a bare name or a detailed
/// declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequirementSpec {
    Name(String),
    #[serde(rename_all = "camelCase")]
    Detailed {
        name: String,
        #[serde(default)]
        version: Option<ArtifactVersion>,
        #[serde(default)]
        guid: Option<String>,
        #[serde(default)]
        target_directory: Option<PathBuf>,
    },
}

impl RequirementSpec {
    pub fn into_requirement(self) -> Result<VersionRequirement> {
        match self {
            RequirementSpec::Name(name) => VersionRequirement::new(name),
            RequirementSpec::Detailed {
                name,
                version,
                guid,
                target_directory,
            } => {
                let mut requirement = VersionRequirement::new(name)?;
                requirement.version = version;
                requirement.guid = guid;
                requirement.target_directory = target_directory;
                Ok(requirement)
            }
        }
    }
}

/// A module or script entry of the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactSpec {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: Option<ArtifactVersion>,
    #[serde(default)]
    pub source_directory: Option<PathBuf>,
    #[serde(default)]
    pub target_directory: Option<PathBuf>,
    #[serde(default)]
    pub required_modules: Vec<RequirementSpec>,
    #[serde(default)]
    pub external_module_dependencies: Vec<String>,
    #[serde(default)]
    pub symbols: SourceSymbols,
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
}

impl ArtifactSpec {
    /// Build the validation record for this entry, returning it together with
    /// the entry's symbols.
    ///
    /// Fails with [`Error::MissingRequiredField`] when the name is blank, when
    /// a script has no source directory, or when a requirement has no name.
    pub fn into_record(self, kind: ArtifactKind) -> Result<(ArtifactRecord, SourceSymbols)> {
        let mut record = ArtifactRecord::new(self.name, kind)?;

        if kind == ArtifactKind::Script && self.source_directory.is_none() {
            return Err(Error::MissingRequiredField {
                record: format!("script '{}'", record.name()),
                field: "sourceDirectory".to_string(),
            });
        }

        record.version = self.version;
        record.source_directory = self.source_directory;
        record.target_directory = self.target_directory;
        record.declared_dependencies = self
            .required_modules
            .into_iter()
            .map(RequirementSpec::into_requirement)
            .collect::<Result<_>>()?;
        record.external_dependencies = self.external_module_dependencies.into_iter().collect();
        record.is_valid_identity = self.is_valid_identity;
        record.is_version_valid = self.is_version_valid;
        record.is_new_version = self.is_new_version;
        record.supports_version_control = self.supports_version_control;
        record.is_ready_for_packaging = self.is_ready_for_packaging;
        record.validation_errors = self.validation_errors;

        Ok((record, self.symbols))
    }
}

impl SolutionManifest {
    /// Parse a YAML or JSON manifest.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Every entry with the kind it was listed under, modules first.
    pub fn into_entries(self) -> impl Iterator<Item = (ArtifactKind, ArtifactSpec)> {
        self.modules
            .into_iter()
            .map(|spec| (ArtifactKind::Module, spec))
            .chain(self.scripts.into_iter().map(|spec| (ArtifactKind::Script, spec)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
modules:
  - name: Contoso.Core
    version: 1.2.0
    targetDirectory: out/modules
    requiredModules:
      - Contoso.Util
      - name: Pester
        version: 5.3.1
        guid: a699dea5-2c73-4616-a270-1f7abb777e71
    externalModuleDependencies: [Pester]
    symbols:
      defined: [Get-Widget]
      referenced: [Write-Output]
    isValidIdentity: true
    supportsVersionControl: true
  - name: Contoso.Util
scripts:
  - name: Deploy
    sourceDirectory: scripts
    requiredModules: [Contoso.Core]
"#;

    #[test]
    fn test_parse_sample() {
        let manifest = SolutionManifest::parse(SAMPLE).unwrap();
        assert_eq!(manifest.modules.len(), 2);
        assert_eq!(manifest.scripts.len(), 1);
        assert_eq!(
            manifest.modules[0].required_modules[0],
            RequirementSpec::Name("Contoso.Util".to_string())
        );
    }

    #[test]
    fn test_into_record_copies_everything() {
        let manifest = SolutionManifest::parse(SAMPLE).unwrap();
        let spec = manifest.modules[0].clone();
        let (record, symbols) = spec.into_record(ArtifactKind::Module).unwrap();

        assert_eq!(record.name(), "Contoso.Core");
        assert_eq!(record.to_string(), "Contoso.Core/1.2.0");
        assert_eq!(record.target_directory, Some(PathBuf::from("out/modules")));
        assert_eq!(record.declared_dependencies.len(), 2);
        let pester = &record.declared_dependencies[1];
        assert_eq!(pester.to_string(), "Pester/5.3.1");
        assert!(pester.guid.is_some());
        assert!(record.external_dependencies.contains("pester"));
        assert!(record.is_valid_identity);
        assert!(!record.is_version_valid);
        assert!(symbols.defined.contains("get-widget"));
        assert_eq!(symbols.referenced, vec!["Write-Output"]);
    }

    #[test]
    fn test_script_requires_source_directory() {
        let spec = ArtifactSpec {
            name: "Deploy".to_string(),
            ..ArtifactSpec::default()
        };
        let err = spec.into_record(ArtifactKind::Script).unwrap_err();
        match err {
            Error::MissingRequiredField { record, field } => {
                assert_eq!(record, "script 'Deploy'");
                assert_eq!(field, "sourceDirectory");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_name_rejected() {
        let spec = ArtifactSpec {
            name: "  ".to_string(),
            ..ArtifactSpec::default()
        };
        assert!(matches!(
            spec.into_record(ArtifactKind::Module),
            Err(Error::MissingRequiredField { .. })
        ));
    }

    #[test]
    fn test_blank_requirement_name_rejected() {
        let spec = ArtifactSpec {
            name: "Core".to_string(),
            required_modules: vec![RequirementSpec::Name(String::new())],
            ..ArtifactSpec::default()
        };
        assert!(spec.into_record(ArtifactKind::Module).is_err());
    }

    #[test]
    fn test_json_manifest() {
        let manifest =
            SolutionManifest::parse(r#"{"modules": [{"name": "A", "requiredModules": ["B"]}]}"#)
                .unwrap();
        assert_eq!(manifest.modules[0].name, "A");
        assert!(manifest.scripts.is_empty());
    }

    #[test]
    fn test_empty_manifest() {
        assert_eq!(SolutionManifest::parse("  \n").unwrap(), SolutionManifest::default());
    }

    #[test]
    fn test_entries_list_modules_first() {
        let manifest = SolutionManifest::parse(SAMPLE).unwrap();
        let kinds: Vec<ArtifactKind> = manifest.into_entries().map(|(k, _)| k).collect();
        assert_eq!(
            kinds,
            vec![ArtifactKind::Module, ArtifactKind::Module, ArtifactKind::Script]
        );
    }
}
