//! # Check Command Implementation
//!
//! This module implements the `check` subcommand, which verifies that every
//! command invoked by the solution's artifacts can be resolved.
//!
//! ## Functionality
//!
//! - **Solution Commands**: Functions defined by each module are published as
//!   solution commands before checking.
//! - **Registry Snapshot**: Commands from a registry snapshot written by
//!   `registry export` (external repositories, built-ins) are added when one
//!   is given or found at the default location.
//! - **Undeclared Modules**: Using a solution command without declaring its
//!   module as a requirement is reported as a warning.
//! - **Unresolved References**: Any unresolved reference fails the command.
//!
//! Without `--config`, reference checking is enabled with no exclusions.

use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

use solution_build::checker::{ReferenceCheckConfig, ReferenceReport};
use solution_build::config::BuildConfig;
use solution_build::defaults::default_registry_path;
use solution_build::output::{Marker, OutputConfig};
use solution_build::registry::CommandRegistry;

use super::{load_config, load_session};

/// Check that every referenced command can be resolved
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the solution manifest.
    #[arg(short, long, value_name = "FILE", default_value = "solution.yaml")]
    pub manifest: PathBuf,

    /// Path to the build configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Command registry snapshot with external and built-in commands.
    ///
    /// Defaults to the snapshot in the cache directory, when it exists.
    /// Can also be set with the `SOLUTION_BUILD_REGISTRY` environment variable.
    #[arg(short, long, value_name = "FILE", env = "SOLUTION_BUILD_REGISTRY")]
    pub registry: Option<PathBuf>,
}

/// Execute the `check` command.
pub fn execute(args: CheckArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    println!(
        "{} Checking command references: {}",
        out.marker(Marker::Scan),
        args.manifest.display()
    );

    let config = load_config(args.config.as_deref())?.unwrap_or_else(|| BuildConfig {
        check_command_references: ReferenceCheckConfig::enabled(),
        ..BuildConfig::default()
    });
    if !config.check_command_references.enabled {
        println!(
            "{} Reference checking is disabled in the configuration",
            out.marker(Marker::Warn)
        );
    }

    let mut session = load_session(&args.manifest, config)?;

    if let Some(snapshot) = load_registry(args.registry.as_deref())? {
        let added = session.import_commands(&snapshot);
        println!(
            "{} Loaded {} command source(s) from registry snapshot",
            out.marker(Marker::Info),
            added
        );
    }
    session.register_solution_commands()?;

    let reports = session.check_all_references();
    let mut unresolved = 0;
    for report in &reports {
        unresolved += print_report(report, &out);
    }

    for failure in session.failures() {
        println!(
            "{} Skipped {} '{}': {}",
            out.marker(Marker::Err),
            failure.kind,
            failure.name,
            failure.message
        );
    }

    if unresolved > 0 {
        return Err(anyhow::anyhow!(
            "{} unresolved command reference(s)",
            unresolved
        ));
    }
    if !session.failures().is_empty() {
        return Err(anyhow::anyhow!(
            "{} artifact(s) could not be checked",
            session.failures().len()
        ));
    }

    println!("\n{} All command references resolved", out.marker(Marker::Ok));
    Ok(())
}

/// The explicit snapshot, else the default one if it exists.
fn load_registry(path: Option<&Path>) -> Result<Option<CommandRegistry>> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let default = default_registry_path();
            if !default.exists() {
                return Ok(None);
            }
            default
        }
    };

    let content = std::fs::read_to_string(&path).map_err(|e| {
        anyhow::anyhow!("Failed to read registry from {}: {}", path.display(), e)
    })?;
    let registry = CommandRegistry::from_json(&content).map_err(|e| {
        anyhow::anyhow!("Failed to parse registry from {}: {}", path.display(), e)
    })?;
    Ok(Some(registry))
}

/// Print one artifact's results. Returns the number of unresolved
/// references.
fn print_report(report: &ReferenceReport, out: &OutputConfig) -> usize {
    let unresolved: Vec<String> = report
        .unresolved()
        .map(|r| r.fully_qualified_name())
        .collect();

    if unresolved.is_empty() {
        let found = report.results.len();
        println!(
            "{} {}: {} reference(s) resolved",
            out.marker(Marker::Ok),
            out.strong(&report.artifact),
            found
        );
    } else {
        println!(
            "{} {}: unresolved {}",
            out.marker(Marker::Err),
            out.strong(&report.artifact),
            unresolved.join(", ")
        );
    }

    for (location, count) in report.by_location() {
        println!("   {}: {}", location, count);
    }

    for result in report.undeclared() {
        println!(
            "{} {} uses {} without declaring {}",
            out.marker(Marker::Warn),
            report.artifact,
            result.command_name,
            result.source.as_deref().unwrap_or("its module")
        );
    }

    unresolved.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_registry_missing_file() {
        let err = load_registry(Some(Path::new("/nonexistent/commands.json"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read registry"));
    }

    #[test]
    fn test_load_registry_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("commands.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_registry(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse registry"));
    }

    #[test]
    fn test_load_registry_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("commands.json");
        std::fs::write(
            &path,
            r#"[{"commandName": "Get-Date", "sources": [{"commandName": "Get-Date", "commandType": "Cmdlet", "sourceName": "Utility", "sourceLocation": "BuiltIn"}]}]"#,
        )
        .unwrap();
        let registry = load_registry(Some(&path)).unwrap().unwrap();
        assert!(registry.contains("get-date").unwrap());
    }
}
