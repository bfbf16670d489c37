//! # Tree Command Implementation
//!
//! This module implements the `tree` subcommand, which displays the declared
//! dependencies of every artifact in a hierarchical format.
//!
//! ## Functionality
//!
//! - **Dependency Tree Visualization**: Each module and script is a root;
//!   dependencies on other modules of the solution are expanded beneath it.
//! - **Depth Control**: Supports `--depth` flag to limit tree depth
//! - **Cycle Marking**: A dependency that leads back to an artifact already on
//!   the current branch is shown once, marked `(cycle)`, and not expanded.
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::Result;
use clap::Args;
use ptree::{print_tree, TreeItem};
use std::path::PathBuf;

use solution_build::artifact::ArtifactRecord;
use solution_build::config::BuildConfig;
use solution_build::names;
use solution_build::output::{Marker, OutputConfig};
use solution_build::session::BuildSession;

use super::load_session;

/// Display the dependency tree of the solution's artifacts
#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Path to the solution manifest.
    #[arg(short, long, value_name = "FILE", default_value = "solution.yaml")]
    pub manifest: PathBuf,

    /// Only show the tree rooted at this artifact.
    #[arg(short, long, value_name = "NAME")]
    pub artifact: Option<String>,

    /// Maximum depth to display in the tree.
    ///
    /// Use 0 to show only the artifacts themselves, 1 to show their direct
    /// dependencies, etc.
    #[arg(long, value_name = "NUM")]
    pub depth: Option<usize>,
}

/// Execute the `tree` command.
pub fn execute(args: TreeArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    println!(
        "{} Dependency tree for: {}",
        out.marker(Marker::Tree),
        args.manifest.display()
    );

    let session = load_session(&args.manifest, BuildConfig::default())?;
    let max_depth = args.depth.unwrap_or(usize::MAX);

    let roots: Vec<&ArtifactRecord> = match &args.artifact {
        Some(name) => {
            let record = session
                .modules()
                .get(name)
                .or_else(|| session.scripts().get(name))
                .ok_or_else(|| anyhow::anyhow!("Artifact not found: {}", name))?;
            vec![record]
        }
        None => session
            .modules()
            .iter()
            .chain(session.scripts().iter())
            .collect(),
    };

    for record in roots {
        let mut path = Vec::new();
        let node = build_tree_node(&session, record, max_depth, &mut path);
        print_tree(&node).map_err(|e| anyhow::anyhow!("Failed to display tree: {}", e))?;
    }

    Ok(())
}

/// Build the tree under `record`. `path` holds the keys of the artifacts on
/// the current branch.
fn build_tree_node(
    session: &BuildSession,
    record: &ArtifactRecord,
    max_depth: usize,
    path: &mut Vec<String>,
) -> TreeNode {
    let label = format!("{} [{}]", record, record.kind);
    if path.len() >= max_depth {
        return TreeNode::leaf(label);
    }

    path.push(names::key(record.name()));
    let children = record
        .declared_dependencies
        .iter()
        .map(|requirement| {
            match session.modules().get(&requirement.name) {
                Some(dep) if path.contains(&names::key(dep.name())) => {
                    TreeNode::leaf(format!("{} (cycle)", dep))
                }
                Some(dep) => build_tree_node(session, dep, max_depth, path),
                None if record.external_dependencies.contains(&requirement.name) => {
                    TreeNode::leaf(format!("{} (external)", requirement))
                }
                None => TreeNode::leaf(format!("{} (not in solution)", requirement)),
            }
        })
        .collect();
    path.pop();

    TreeNode { label, children }
}

/// Tree node structure for ptree visualization
#[derive(Clone)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeNode {
    fn leaf(label: String) -> Self {
        Self {
            label,
            children: vec![],
        }
    }
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: std::io::Write>(
        &self,
        f: &mut W,
        _style: &ptree::Style,
    ) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> std::borrow::Cow<'_, [Self::Child]> {
        std::borrow::Cow::Borrowed(&self.children)
    }
}
