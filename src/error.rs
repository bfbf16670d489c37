//! # Error Handling
//!
//! This module defines the centralized error type for `solution-build`. It
//! uses the `thiserror` library to create a single `Error` enum covering the
//! identity and shape failures raised while a solution is being assembled,
//! plus the wrapped I/O and (de)serialization errors of the loading glue.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Identity/shape variants (`DuplicateName`,
//!   `IdentityMismatch`, `MalformedReference`, `MissingRequiredField`) are
//!   deterministic input-validation failures: they are raised at the call that
//!   caused them and are never retried.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! A processing order that reaches the cycle ceiling is *not* an error. It is
//! reported through [`crate::graph::ArtifactGraph::saturated`] so callers can
//! surface it as a likely circular dependency. Likewise, an unresolved command
//! reference is an ordinary [`crate::checker::AnalysisResult`].

use thiserror::Error;

/// Main error type for solution-build operations
#[derive(Error, Debug)]
pub enum Error {
    /// An artifact with the same (case-insensitive) name is already present
    /// in the collection and upsert semantics were not requested.
    #[error("Duplicate artifact name: {name}")]
    DuplicateName { name: String },

    /// Validation facets were merged between records describing different
    /// artifacts.
    #[error("Identity mismatch: cannot merge '{actual}' into '{expected}'")]
    IdentityMismatch { expected: String, actual: String },

    /// A qualified command reference did not have the `source\command` shape.
    #[error("Malformed command reference: {reference}")]
    MalformedReference { reference: String },

    /// A required identity field was blank when building a record.
    #[error("Missing required field '{field}' on {record}")]
    MissingRequiredField { record: String, field: String },

    /// The build configuration failed one or more field rules.
    ///
    /// All failing rules are collected and rendered one per line.
    #[error("Configuration validation failed:{}", issues.iter().map(|i| format!("\n  - {}", i)).collect::<String>())]
    ConfigValidation { issues: Vec<String> },

    /// A version string could not be parsed.
    #[error("Invalid version: {value}")]
    InvalidVersion { value: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON (de)serialization error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Short, stable name of the error kind, used when reporting failed
    /// artifacts.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::DuplicateName { .. } => "duplicate-name",
            Error::IdentityMismatch { .. } => "identity-mismatch",
            Error::MalformedReference { .. } => "malformed-reference",
            Error::MissingRequiredField { .. } => "missing-required-field",
            Error::ConfigValidation { .. } => "config-validation",
            Error::InvalidVersion { .. } => "invalid-version",
            Error::Io(_) => "io",
            Error::Yaml(_) => "yaml",
            Error::Json(_) => "json",
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_duplicate_name() {
        let error = Error::DuplicateName {
            name: "Contoso.Core".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Duplicate artifact name"));
        assert!(display.contains("Contoso.Core"));
    }

    #[test]
    fn test_error_display_identity_mismatch() {
        let error = Error::IdentityMismatch {
            expected: "Contoso.Core".to_string(),
            actual: "Contoso.Net".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Identity mismatch"));
        assert!(display.contains("'Contoso.Net' into 'Contoso.Core'"));
    }

    #[test]
    fn test_error_display_malformed_reference() {
        let error = Error::MalformedReference {
            reference: r"a\b\c".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Malformed command reference"));
        assert!(display.contains(r"a\b\c"));
    }

    #[test]
    fn test_error_display_missing_field() {
        let error = Error::MissingRequiredField {
            record: "script #2".to_string(),
            field: "name".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Missing required field 'name'"));
        assert!(display.contains("script #2"));
    }

    #[test]
    fn test_error_display_config_validation_lists_every_issue() {
        let error = Error::ConfigValidation {
            issues: vec![
                "'enabled' must be a boolean".to_string(),
                "unknown field 'colour'".to_string(),
            ],
        };
        let display = format!("{}", error);
        assert!(display.starts_with("Configuration validation failed:"));
        assert!(display.contains("\n  - 'enabled' must be a boolean"));
        assert!(display.contains("\n  - unknown field 'colour'"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        assert_eq!(error.kind(), "io");
        assert!(format!("{}", error).contains("File not found"));
    }

    #[test]
    fn test_error_from_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{unclosed").unwrap_err();
        let error: Error = json_error.into();
        assert!(format!("{}", error).contains("JSON error"));
    }

    #[test]
    fn test_error_from_yaml_error() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: [unclosed").unwrap_err();
        let error: Error = yaml_error.into();
        assert_eq!(error.kind(), "yaml");
    }

    #[test]
    fn test_error_kind_identity_variants() {
        assert_eq!(
            Error::DuplicateName {
                name: "x".to_string()
            }
            .kind(),
            "duplicate-name"
        );
        assert_eq!(
            Error::MissingRequiredField {
                record: "x".to_string(),
                field: "name".to_string()
            }
            .kind(),
            "missing-required-field"
        );
    }
}
