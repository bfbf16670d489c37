//! # Order Command Implementation
//!
//! This module implements the `order` subcommand, which loads a solution
//! manifest, computes the processing order of every module and script, and
//! prints the resulting build plan.
//!
//! ## Functionality
//!
//! - **Build Order**: Artifacts are listed by processing order; dependencies
//!   always come before their dependents.
//! - **Cycle Warnings**: Artifacts that reached the processing order ceiling
//!   are flagged as likely circular dependencies. They are still listed, at
//!   the end, and do not fail the command.
//! - **Load Failures**: Entries that could not be registered are reported and
//!   make the command exit with an error.
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::Result;
use clap::Args;
use std::fmt::Write as _;
use std::path::PathBuf;

use solution_build::output::{Marker, OutputConfig};
use solution_build::session::{BuildPlan, PlannedArtifact};

use super::{load_config, load_session};

/// Print the order in which the solution's artifacts can be packaged
#[derive(Args, Debug)]
pub struct OrderArgs {
    /// Path to the solution manifest.
    #[arg(short, long, value_name = "FILE", default_value = "solution.yaml")]
    pub manifest: PathBuf,

    /// Path to the build configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the build plan as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Execute the `order` command.
///
/// # Arguments
/// * `args` - The command arguments
/// * `color_flag` - The value of the global --color flag ("always", "never", or "auto")
pub fn execute(args: OrderArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let config = load_config(args.config.as_deref())?.unwrap_or_default();
    let mut session = load_session(&args.manifest, config)?;
    let plan = session.build_plan();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        println!(
            "{} Build order for: {}",
            out.marker(Marker::Plan),
            args.manifest.display()
        );
        print!("{}", render_plan(&plan, &out));
    }

    if !plan.failures.is_empty() {
        return Err(anyhow::anyhow!(
            "{} artifact(s) failed to load",
            plan.failures.len()
        ));
    }
    Ok(())
}

/// Render the plan body: both ordered lists, then cycle warnings and load
/// failures.
pub fn render_plan(plan: &BuildPlan, out: &OutputConfig) -> String {
    let mut text = String::new();

    render_section(&mut text, "Modules", &plan.modules);
    render_section(&mut text, "Scripts", &plan.scripts);

    if !plan.saturated.is_empty() {
        let _ = writeln!(text);
    }
    for name in &plan.saturated {
        let _ = writeln!(
            text,
            "{} {} reached the processing order ceiling; it is likely part of, or depends on, a circular dependency",
            out.marker(Marker::Warn),
            name
        );
    }

    if !plan.failures.is_empty() {
        let _ = writeln!(text);
    }
    for failure in &plan.failures {
        let name = if failure.name.trim().is_empty() {
            "<unnamed>"
        } else {
            failure.name.as_str()
        };
        let _ = writeln!(
            text,
            "{} Skipped {} '{}': {}",
            out.marker(Marker::Err),
            failure.kind,
            name,
            failure.message
        );
    }

    if plan.failures.is_empty() {
        let _ = writeln!(
            text,
            "\n{} Ordered {} module(s) and {} script(s)",
            out.marker(Marker::Ok),
            plan.modules.len(),
            plan.scripts.len()
        );
    }

    text
}

fn render_section(text: &mut String, title: &str, artifacts: &[PlannedArtifact]) {
    let _ = writeln!(text, "\n{}:", title);
    if artifacts.is_empty() {
        let _ = writeln!(text, "  (none)");
    }
    for artifact in artifacts {
        let label = match &artifact.version {
            Some(version) => format!("{}/{}", artifact.name, version),
            None => artifact.name.clone(),
        };
        let _ = writeln!(text, "  {:>6}  {}", artifact.processing_order, label);
    }
}
