//! # Build Session
//!
//! A [`BuildSession`] owns everything one build invocation knows about the
//! solution: the module and script graphs, the command registry, the symbols
//! extracted from each artifact and the configuration in effect. Sessions are
//! constructed explicitly and passed by reference; there is no process-wide
//! state.
//!
//! ## Lifecycle
//!
//! 1.  **Population** (single writer): artifacts are registered one at a time,
//!     from a [`SolutionManifest`] or directly. An artifact that cannot be
//!     registered is recorded as an [`ArtifactFailure`] and the session moves
//!     on to the next one.
//! 2.  **Solution commands**: [`BuildSession::register_solution_commands`]
//!     publishes every function defined by a module as a `Solution` command
//!     source.
//! 3.  **Analysis** (readers only): reference checks, requirement resolution
//!     and the build plan. [`BuildSession::check_all_references`] fans out
//!     across artifacts in parallel.

use std::collections::HashMap;

use log::{debug, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::artifact::{ArtifactKind, ArtifactRecord, RequirementFilter};
use crate::checker::{self, ReferenceReport};
use crate::config::BuildConfig;
use crate::error::{Error, Result};
use crate::graph::ArtifactGraph;
use crate::manifest::SolutionManifest;
use crate::names::{self, NameSet};
use crate::registry::{CommandRegistry, CommandSourceEntry, CommandType, SourceLocation};
use crate::syntax::{SourceSymbols, SymbolExtractor};
use crate::version::{self, ArtifactVersion, VersionRequirement};

/// An artifact that was left out of the session, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactFailure {
    pub name: String,
    pub kind: ArtifactKind,
    /// Stable error kind, see [`Error::kind`].
    pub reason: &'static str,
    pub message: String,
}

/// How [`BuildSession::external_requirements`] reduces the collected
/// requirements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Resolution {
    /// The highest version per `(name, target directory)`.
    #[default]
    Latest,
    /// Every distinct version per `(name, target directory)`.
    Unique,
}

/// One entry of a build plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedArtifact {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<ArtifactVersion>,
    pub processing_order: u32,
}

impl From<&ArtifactRecord> for PlannedArtifact {
    fn from(record: &ArtifactRecord) -> Self {
        Self {
            name: record.name().to_string(),
            version: record.version.clone(),
            processing_order: record.processing_order().unwrap_or_default(),
        }
    }
}

/// The order in which the solution can be packaged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildPlan {
    pub modules: Vec<PlannedArtifact>,
    pub scripts: Vec<PlannedArtifact>,
    /// Artifacts whose order reached the ceiling: likely circular
    /// dependencies.
    pub saturated: Vec<String>,
    pub failures: Vec<ArtifactFailure>,
}

impl BuildPlan {
    pub fn is_clean(&self) -> bool {
        self.saturated.is_empty() && self.failures.is_empty()
    }
}

type SymbolKey = (ArtifactKind, String);

/// All state of one build invocation.
#[derive(Debug, Default)]
pub struct BuildSession {
    config: BuildConfig,
    modules: ArtifactGraph,
    scripts: ArtifactGraph,
    commands: CommandRegistry,
    symbols: HashMap<SymbolKey, SourceSymbols>,
    failures: Vec<ArtifactFailure>,
}

impl BuildSession {
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn modules(&self) -> &ArtifactGraph {
        &self.modules
    }

    pub fn scripts(&self) -> &ArtifactGraph {
        &self.scripts
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn failures(&self) -> &[ArtifactFailure] {
        &self.failures
    }

    pub fn symbols(&self, kind: ArtifactKind, name: &str) -> Option<&SourceSymbols> {
        self.symbols.get(&(kind, names::key(name)))
    }

    /// Register every entry of `manifest`. Returns how many were accepted.
    pub fn load_manifest(&mut self, manifest: SolutionManifest) -> usize {
        let mut accepted = 0;
        for (kind, spec) in manifest.into_entries() {
            let name = spec.name.clone();
            match spec.into_record(kind) {
                Ok((record, symbols)) => {
                    if self.register(record, symbols) {
                        accepted += 1;
                    }
                }
                Err(err) => self.record_failure(name, kind, &err),
            }
        }
        debug!(
            "Loaded {} modules and {} scripts",
            self.modules.len(),
            self.scripts.len()
        );
        accepted
    }

    pub fn register_module(&mut self, mut record: ArtifactRecord, symbols: SourceSymbols) -> bool {
        record.kind = ArtifactKind::Module;
        self.register(record, symbols)
    }

    pub fn register_script(&mut self, mut record: ArtifactRecord, symbols: SourceSymbols) -> bool {
        record.kind = ArtifactKind::Script;
        self.register(record, symbols)
    }

    /// Register `record` with the symbols `extractor` finds in `source`.
    ///
    /// Source that cannot be parsed is recorded as a failure.
    pub fn register_source(
        &mut self,
        record: ArtifactRecord,
        source: &str,
        extractor: &impl SymbolExtractor,
    ) -> bool {
        match extractor.extract(source) {
            Ok(symbols) => self.register(record, symbols),
            Err(err) => {
                self.record_failure(record.name().to_string(), record.kind, &err);
                false
            }
        }
    }

    /// Insert `record` into the graph for its kind, or merge it into an
    /// existing record when `update_module_references` is set.
    ///
    /// A rejected record is recorded as a failure and `false` is returned.
    pub fn register(&mut self, record: ArtifactRecord, symbols: SourceSymbols) -> bool {
        let kind = record.kind;
        let name = record.name().to_string();
        let graph = match kind {
            ArtifactKind::Module => &mut self.modules,
            ArtifactKind::Script => &mut self.scripts,
        };

        let outcome = if self.config.update_module_references {
            graph.upsert(record)
        } else {
            graph.add(record)
        };

        match outcome {
            Ok(()) => {
                self.symbols.insert((kind, names::key(&name)), symbols);
                true
            }
            Err(err) => {
                self.record_failure(name, kind, &err);
                false
            }
        }
    }

    fn record_failure(&mut self, name: String, kind: ArtifactKind, err: &Error) {
        warn!("Skipping {} '{}': {}", kind, name, err);
        self.failures.push(ArtifactFailure {
            name,
            kind,
            reason: err.kind(),
            message: err.to_string(),
        });
    }

    /// Add previously known command sources, such as an external registry
    /// snapshot. Returns how many providers were inserted.
    pub fn import_commands(&mut self, registry: &CommandRegistry) -> usize {
        self.commands
            .extend_from(registry, self.config.allow_duplicate_command_sources)
    }

    /// Publish every function defined by a module as a `Solution` source
    /// named after the module. Returns how many providers were inserted.
    pub fn register_solution_commands(&mut self) -> Result<usize> {
        let mut inserted = 0;
        for module in self.modules.iter() {
            let Some(symbols) = self.symbols.get(&(ArtifactKind::Module, names::key(module.name())))
            else {
                continue;
            };
            for function in symbols.defined.iter().filter(|f| !f.trim().is_empty()) {
                let entry = CommandSourceEntry::new(
                    function,
                    CommandType::Function,
                    module.name(),
                    SourceLocation::Solution,
                )?;
                if self
                    .commands
                    .register(entry, self.config.allow_duplicate_command_sources)
                {
                    inserted += 1;
                }
            }
        }
        debug!("Registered {} solution commands", inserted);
        Ok(inserted)
    }

    /// Check the references of the first artifact named `name`, modules
    /// before scripts. Returns `None` if no such artifact is registered.
    pub fn check_references(&self, name: &str) -> Result<Option<ReferenceReport>> {
        let record = self.modules.get(name).or_else(|| self.scripts.get(name));
        record.map(|r| self.check_artifact(r)).transpose()
    }

    /// Check every registered artifact, modules first, in parallel.
    ///
    /// An artifact whose references cannot be checked is recorded as a
    /// failure and left out of the returned reports.
    pub fn check_all_references(&mut self) -> Vec<ReferenceReport> {
        let outcomes: Vec<(String, ArtifactKind, Result<ReferenceReport>)> = {
            let records: Vec<&ArtifactRecord> =
                self.modules.iter().chain(self.scripts.iter()).collect();
            records
                .par_iter()
                .map(|record| {
                    (
                        record.name().to_string(),
                        record.kind,
                        self.check_artifact(record),
                    )
                })
                .collect()
        };

        let mut reports = Vec::with_capacity(outcomes.len());
        for (name, kind, outcome) in outcomes {
            match outcome {
                Ok(report) => reports.push(report),
                Err(err) => self.record_failure(name, kind, &err),
            }
        }
        reports
    }

    fn check_artifact(&self, record: &ArtifactRecord) -> Result<ReferenceReport> {
        let empty = SourceSymbols::default();
        let symbols = self.symbols(record.kind, record.name()).unwrap_or(&empty);
        let mut results = checker::check_references(
            symbols,
            &self.commands,
            &self.config.check_command_references,
        )?;

        let declared: NameSet = record
            .declared_dependencies
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        checker::mark_declared_dependencies(&mut results, &declared);

        Ok(ReferenceReport {
            artifact: record.name().to_string(),
            results,
        })
    }

    /// Declared requirements of the named artifact, filtered against the
    /// solution's modules.
    pub fn required_dependencies(
        &self,
        name: &str,
        filter: RequirementFilter,
    ) -> Option<Vec<VersionRequirement>> {
        self.modules
            .get(name)
            .or_else(|| self.scripts.get(name))
            .map(|record| record.required_dependencies(filter, &self.modules))
    }

    /// Requirements that must be fetched from outside the solution: every
    /// artifact's requirements that are neither declared external nor
    /// provided by a module of the solution, reduced per `resolution`.
    pub fn external_requirements(&self, resolution: Resolution) -> Vec<VersionRequirement> {
        self.resolve_requirements(
            RequirementFilter::RemoveExternalDependenciesAndKnownSolutionItems,
            resolution,
        )
    }

    /// Every artifact's requirements passing `filter`, reduced per
    /// `resolution`.
    pub fn resolve_requirements(
        &self,
        filter: RequirementFilter,
        resolution: Resolution,
    ) -> Vec<VersionRequirement> {
        let all: Vec<VersionRequirement> = self
            .modules
            .iter()
            .chain(self.scripts.iter())
            .flat_map(|record| record.required_dependencies(filter, &self.modules))
            .collect();
        resolve(&all, resolution)
    }

    /// Order both graphs and report the result.
    pub fn build_plan(&mut self) -> BuildPlan {
        let modules: Vec<PlannedArtifact> = self
            .modules
            .ordered_list()
            .into_iter()
            .map(PlannedArtifact::from)
            .collect();
        let scripts: Vec<PlannedArtifact> = self
            .scripts
            .ordered_list()
            .into_iter()
            .map(PlannedArtifact::from)
            .collect();

        let saturated = self
            .modules
            .saturated()
            .into_iter()
            .chain(self.scripts.saturated())
            .map(str::to_string)
            .collect();

        BuildPlan {
            modules,
            scripts,
            saturated,
            failures: self.failures.clone(),
        }
    }
}

/// Reduce `requirements` per `resolution`.
pub fn resolve(requirements: &[VersionRequirement], resolution: Resolution) -> Vec<VersionRequirement> {
    match resolution {
        Resolution::Latest => version::latest_per_group(requirements),
        Resolution::Unique => version::unique_per_group(requirements),
    }
}
