//! # Solution Build Library
//!
//! This library provides the core of the `solution-build` tool: deciding the
//! order in which the interdependent modules and scripts of a solution can be
//! packaged, and verifying before packaging that every command an artifact
//! invokes can be resolved.
//!
//! ## Quick Example
//!
//! ```
//! use solution_build::artifact::ArtifactRecord;
//! use solution_build::graph::ArtifactGraph;
//! use solution_build::version::VersionRequirement;
//!
//! let mut graph = ArtifactGraph::new();
//! graph
//!     .add(ArtifactRecord::module("App").unwrap()
//!         .with_dependency(VersionRequirement::new("Core").unwrap()))
//!     .unwrap();
//! graph.add(ArtifactRecord::module("Core").unwrap()).unwrap();
//!
//! let order: Vec<&str> = graph.ordered_list().iter().map(|r| r.name()).collect();
//! assert_eq!(order, vec!["Core", "App"]);
//! ```
//!
//! ## Core Concepts
//!
//! - **Artifacts (`artifact`, `graph`)**: One validation record per module or
//!   script, collected into a case-insensitively keyed graph that computes
//!   processing order and flags likely circular dependencies.
//! - **Requirements (`version`)**: Declared dependencies on other artifacts and
//!   the resolver that reduces them to one selection per name and target.
//! - **Commands (`registry`, `syntax`, `checker`)**: The registry of known
//!   command providers, the typed interface to the external source parser, and
//!   the checker that reports unresolved references.
//! - **Session (`session`, `manifest`, `config`)**: The per-invocation owner
//!   of all of the above, loaded from a solution manifest and a build
//!   configuration.
//!
//! ## Execution Flow
//!
//! 1.  **Load**: Read the manifest and register every artifact. Bad entries
//!     are recorded as failures and skipped.
//! 2.  **Publish**: Register the functions each module defines as solution
//!     commands, optionally merged with an external registry snapshot.
//! 3.  **Check**: Resolve every artifact's command references in parallel.
//! 4.  **Order**: Compute processing order and emit the build plan.

pub mod artifact;
pub mod checker;
pub mod config;
pub mod defaults;
pub mod error;
pub mod graph;
pub mod manifest;
pub mod names;
pub mod output;
pub mod registry;
pub mod session;
pub mod syntax;
pub mod version;

#[cfg(test)]
mod graph_proptest;
