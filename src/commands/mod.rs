//! # CLI Command Implementations
//!
//! Each subcommand of `solution-build` lives in its own file with:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args`, calls into the
//!   `solution_build` library and prints the result.
//!
//! The helpers below load the inputs most commands share: the solution
//! manifest and the optional build configuration.

pub mod check;
pub mod completions;
pub mod deps;
pub mod order;
pub mod registry;
pub mod tree;

use std::path::Path;

use anyhow::Result;

use solution_build::config::{self, BuildConfig};
use solution_build::manifest::SolutionManifest;
use solution_build::session::BuildSession;

/// Read the build configuration at `path`, if one was given.
pub(crate) fn load_config(path: Option<&Path>) -> Result<Option<BuildConfig>> {
    match path {
        None => Ok(None),
        Some(path) => config::from_file(path).map(Some).map_err(|e| {
            anyhow::anyhow!("Failed to load config from {}: {}", path.display(), e)
        }),
    }
}

/// Create a session with `config` and register every artifact of the
/// manifest at `manifest_path`.
pub(crate) fn load_session(manifest_path: &Path, config: BuildConfig) -> Result<BuildSession> {
    let manifest = SolutionManifest::from_file(manifest_path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to load manifest from {}: {}",
            manifest_path.display(),
            e
        )
    })?;

    let mut session = BuildSession::new(config);
    session.load_manifest(manifest);
    Ok(session)
}
