//! # Deps Command Implementation
//!
//! This module implements the `deps` subcommand, which lists the modules an
//! artifact (or the whole solution) requires, after applying a
//! [`RequirementFilter`] and reducing the result to one version per name and
//! target directory.
//!
//! Filter names are matched leniently: case, `-` and `_` are ignored, so
//! `remove-known-solution-items` selects `RemoveKnownSolutionItems`. An
//! unrecognized name selects `FindAll`.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use solution_build::artifact::RequirementFilter;
use solution_build::config::BuildConfig;
use solution_build::output::{Marker, OutputConfig};
use solution_build::session::{self, Resolution};
use solution_build::version::VersionRequirement;

use super::load_session;

/// List required modules after filtering and version resolution
#[derive(Args, Debug)]
pub struct DepsArgs {
    /// Path to the solution manifest.
    #[arg(short, long, value_name = "FILE", default_value = "solution.yaml")]
    pub manifest: PathBuf,

    /// Only list the requirements of this artifact.
    #[arg(short, long, value_name = "NAME")]
    pub artifact: Option<String>,

    /// Which requirements to keep.
    ///
    /// One of FindAll, RemoveExternalDependencies, RemoveKnownSolutionItems,
    /// RemoveExternalDependenciesAndKnownSolutionItems, OnlyKnownSolutionItems.
    #[arg(short, long, value_name = "MODE", default_value = "FindAll")]
    pub filter: String,

    /// Keep every distinct version instead of only the latest.
    #[arg(long)]
    pub unique: bool,
}

/// Execute the `deps` command.
pub fn execute(args: DepsArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let filter = RequirementFilter::from_name(&args.filter);
    let resolution = if args.unique {
        Resolution::Unique
    } else {
        Resolution::Latest
    };

    let session = load_session(&args.manifest, BuildConfig::default())?;

    let requirements = match &args.artifact {
        Some(name) => {
            let declared = session
                .required_dependencies(name, filter)
                .ok_or_else(|| anyhow::anyhow!("Artifact not found: {}", name))?;
            session::resolve(&declared, resolution)
        }
        None => session.resolve_requirements(filter, resolution),
    };

    println!(
        "{} Required modules ({}): {}",
        out.marker(Marker::Info),
        filter,
        args.artifact.as_deref().unwrap_or("whole solution")
    );
    if requirements.is_empty() {
        println!("   (none)");
    }
    for requirement in &requirements {
        println!("   {}", describe(requirement));
    }

    Ok(())
}

/// One line per requirement: `name/version`, then the target directory when
/// there is one.
fn describe(requirement: &VersionRequirement) -> String {
    match &requirement.target_directory {
        Some(dir) => format!("{} -> {}", requirement, dir.display()),
        None => requirement.to_string(),
    }
}
