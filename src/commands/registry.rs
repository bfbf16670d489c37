//! # Registry Command Implementation
//!
//! This module implements the `registry` subcommand group:
//!
//! - **`registry export`**: Publishes the functions defined by every module of
//!   a solution as solution commands, merges them with an earlier snapshot if
//!   one is given, and writes the result as a JSON snapshot.
//! - **`registry lookup`**: Prints every provider of a bare or qualified
//!   (`source\command`) command name found in a snapshot.

use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

use solution_build::config::BuildConfig;
use solution_build::defaults::default_registry_path;
use solution_build::output::{Marker, OutputConfig};
use solution_build::registry::CommandRegistry;

use super::{load_config, load_session};

/// Export or query command registry snapshots
#[derive(Args, Debug)]
pub struct RegistryArgs {
    #[command(subcommand)]
    pub command: RegistryCommand,
}

#[derive(Subcommand, Debug)]
pub enum RegistryCommand {
    /// Write a snapshot of the solution's commands
    Export(ExportArgs),
    /// Print the providers of a command
    Lookup(LookupArgs),
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Path to the solution manifest.
    #[arg(short, long, value_name = "FILE", default_value = "solution.yaml")]
    pub manifest: PathBuf,

    /// Path to the build configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Earlier snapshot whose commands are kept in the export.
    #[arg(long, value_name = "FILE")]
    pub merge: Option<PathBuf>,

    /// Where to write the snapshot. Defaults to the cache directory.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Snapshot to search. Defaults to the cache directory.
    #[arg(short, long, value_name = "FILE", env = "SOLUTION_BUILD_REGISTRY")]
    pub registry: Option<PathBuf>,

    /// Command name, optionally qualified as `source\command`.
    pub name: String,
}

/// Execute the `registry` command.
pub fn execute(args: RegistryArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    match args.command {
        RegistryCommand::Export(args) => export(args, &out),
        RegistryCommand::Lookup(args) => lookup(args, &out),
    }
}

fn read_snapshot(path: &Path) -> Result<CommandRegistry> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        anyhow::anyhow!("Failed to read registry from {}: {}", path.display(), e)
    })?;
    CommandRegistry::from_json(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse registry from {}: {}", path.display(), e))
}

fn export(args: ExportArgs, out: &OutputConfig) -> Result<()> {
    let config = load_config(args.config.as_deref())?.unwrap_or_else(BuildConfig::default);
    let mut session = load_session(&args.manifest, config)?;

    if let Some(merge) = &args.merge {
        let previous = read_snapshot(merge)?;
        session.import_commands(&previous);
    }
    let published = session.register_solution_commands()?;

    let output = args.output.unwrap_or_else(default_registry_path);
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&output, session.commands().to_json()?)?;

    println!(
        "{} Wrote {} command(s) ({} from the solution) to {}",
        out.marker(Marker::Ok),
        session.commands().len(),
        published,
        output.display()
    );
    Ok(())
}

fn lookup(args: LookupArgs, out: &OutputConfig) -> Result<()> {
    let path = args.registry.unwrap_or_else(default_registry_path);
    let registry = read_snapshot(&path)?;

    let sources = registry.sources_for(&args.name)?;
    if sources.is_empty() {
        println!("{} {} not found", out.marker(Marker::Err), args.name);
        return Err(anyhow::anyhow!("Command not found: {}", args.name));
    }

    println!("{} Providers of {}:", out.marker(Marker::Info), args.name);
    for source in sources {
        println!(
            "   {} ({}, {})",
            source.fully_qualified_name(),
            source.command_type,
            source.source_location
        );
    }
    Ok(())
}
