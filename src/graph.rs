//! # Artifact Validation Graph
//!
//! [`ArtifactGraph`] owns one [`ArtifactRecord`] per artifact in the
//! solution, keyed case-insensitively by name, and computes the order in
//! which artifacts can be built so that every dependency is packaged before
//! the artifacts that depend on it.
//!
//! ## Processing Order
//!
//! - An artifact with no dependencies inside the graph has order `0`.
//! - Otherwise its order is `1 + max(order of each in-graph dependency)`.
//!   Dependencies on names outside the graph are external and ignored.
//!
//! ## Cycles
//!
//! Dependency declarations come from artifact metadata and can be wrong. An
//! order that reaches [`PROCESSING_ORDER_CEILING`] saturates: every artifact
//! that depends on a saturated artifact is saturated too, and an edge back
//! into the artifact currently being resolved counts as saturated. Every
//! artifact on a cycle, and every artifact depending on one, therefore ends
//! up at the ceiling and sorts to the back of the build order. The ceiling is
//! a depth cap rather than an exact cycle report; [`ArtifactGraph::saturated`]
//! lists the affected artifacts.
//!
//! Resolution uses an explicit worklist, so deep or cyclic graphs never
//! exhaust the native stack.

use std::collections::HashMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactRecord;
use crate::error::{Error, Result};
use crate::names;

/// Processing order assigned to artifacts on or behind a dependency cycle
/// (or nested implausibly deep).
pub const PROCESSING_ORDER_CEILING: u32 = 999_999;

/// An insertion-ordered, case-insensitively keyed collection of artifact
/// records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ArtifactRecord>", into = "Vec<ArtifactRecord>")]
pub struct ArtifactGraph {
    records: Vec<ArtifactRecord>,
    index: HashMap<String, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done(u32),
}

/// One artifact being resolved on the worklist.
struct Frame {
    node: usize,
    deps: Vec<usize>,
    next: usize,
    order: u32,
}

impl Frame {
    fn absorb(&mut self, dep_order: u32) {
        if dep_order >= PROCESSING_ORDER_CEILING {
            self.order = PROCESSING_ORDER_CEILING;
        } else {
            self.order = self.order.max(dep_order + 1);
        }
    }
}

impl ArtifactGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, taking ownership of it.
    ///
    /// Fails with [`Error::DuplicateName`] if an artifact with the same name
    /// (ignoring case) is already present.
    pub fn add(&mut self, record: ArtifactRecord) -> Result<()> {
        let key = names::key(record.name());
        if self.index.contains_key(&key) {
            return Err(Error::DuplicateName {
                name: record.name().to_string(),
            });
        }
        debug!("Registered {} {}", record.kind, record);
        self.index.insert(key, self.records.len());
        self.records.push(record);
        Ok(())
    }

    /// Insert a record unless the name is taken. Returns whether it was
    /// inserted.
    pub fn try_add(&mut self, record: ArtifactRecord) -> bool {
        self.add(record).is_ok()
    }

    /// Insert a record, or merge its facets into the existing record of the
    /// same name. The existing record keeps its position in the graph.
    pub fn upsert(&mut self, record: ArtifactRecord) -> Result<()> {
        match self.index.get(&names::key(record.name())) {
            Some(&slot) => {
                debug!("Updating {} {}", record.kind, record);
                self.records[slot].merge_from(record)
            }
            None => self.add(record),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ArtifactRecord> {
        self.index.get(&names::key(name)).map(|&i| &self.records[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ArtifactRecord> {
        match self.index.get(&names::key(name)) {
            Some(&i) => Some(&mut self.records[i]),
            None => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&names::key(name))
    }

    /// Names of every artifact, in insertion order.
    pub fn all_names(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ArtifactRecord> {
        self.records.iter()
    }

    /// The records that `name` declares a dependency on and that are part of
    /// this graph, in declaration order.
    pub fn internal_dependencies(&self, name: &str) -> Vec<&ArtifactRecord> {
        match self.index.get(&names::key(name)) {
            Some(&i) => self
                .dependency_slots(i)
                .into_iter()
                .map(|d| &self.records[d])
                .collect(),
            None => Vec::new(),
        }
    }

    /// Compute the processing order of `name` without storing it.
    ///
    /// Returns `None` if `name` is not part of the graph.
    pub fn compute_processing_order(&self, name: &str) -> Option<u32> {
        let start = *self.index.get(&names::key(name))?;
        let mut marks = vec![Mark::Unvisited; self.records.len()];
        Some(self.resolve(start, &mut marks))
    }

    /// Recompute and store the processing order of every record.
    pub fn refresh_ordering(&mut self) {
        let mut marks = vec![Mark::Unvisited; self.records.len()];
        let orders: Vec<u32> = (0..self.records.len())
            .map(|i| self.resolve(i, &mut marks))
            .collect();

        for (record, order) in self.records.iter_mut().zip(orders) {
            if order >= PROCESSING_ORDER_CEILING {
                warn!(
                    "{} reached the processing order ceiling; it is likely part of, or depends on, a circular dependency",
                    record.name()
                );
            }
            record.set_processing_order(Some(order));
        }
        debug!("Computed processing order for {} artifacts", self.records.len());
    }

    /// Refresh the ordering, then return every record sorted by processing
    /// order. Records with equal order keep their insertion order.
    pub fn ordered_list(&mut self) -> Vec<&ArtifactRecord> {
        self.refresh_ordering();
        let mut ordered: Vec<&ArtifactRecord> = self.records.iter().collect();
        ordered.sort_by_key(|r| r.processing_order());
        ordered
    }

    /// Names of records whose stored processing order reached the ceiling.
    ///
    /// Reflects the last [`refresh_ordering`](Self::refresh_ordering).
    pub fn saturated(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| matches!(r.processing_order(), Some(o) if o >= PROCESSING_ORDER_CEILING))
            .map(|r| r.name())
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    fn dependency_slots(&self, slot: usize) -> Vec<usize> {
        self.records[slot]
            .declared_dependencies
            .iter()
            .filter_map(|r| self.index.get(&names::key(&r.name)).copied())
            .collect()
    }

    fn frame(&self, node: usize) -> Frame {
        Frame {
            node,
            deps: self.dependency_slots(node),
            next: 0,
            order: 0,
        }
    }

    fn resolve(&self, start: usize, marks: &mut [Mark]) -> u32 {
        if let Mark::Done(order) = marks[start] {
            return order;
        }

        marks[start] = Mark::InProgress;
        let mut stack = vec![self.frame(start)];

        while let Some(frame) = stack.last_mut() {
            let next = if frame.order < PROCESSING_ORDER_CEILING {
                frame.deps.get(frame.next).copied()
            } else {
                None
            };

            match next {
                Some(dep) => {
                    frame.next += 1;
                    match marks[dep] {
                        Mark::Done(order) => frame.absorb(order),
                        // back edge: dep is still being resolved further up
                        Mark::InProgress => frame.absorb(PROCESSING_ORDER_CEILING),
                        Mark::Unvisited => {
                            marks[dep] = Mark::InProgress;
                            let child = self.frame(dep);
                            stack.push(child);
                        }
                    }
                }
                None => {
                    let (node, order) = (frame.node, frame.order);
                    stack.pop();
                    marks[node] = Mark::Done(order);
                    if let Some(parent) = stack.last_mut() {
                        parent.absorb(order);
                    }
                }
            }
        }

        match marks[start] {
            Mark::Done(order) => order,
            _ => PROCESSING_ORDER_CEILING,
        }
    }
}

impl TryFrom<Vec<ArtifactRecord>> for ArtifactGraph {
    type Error = Error;

    fn try_from(records: Vec<ArtifactRecord>) -> Result<Self> {
        let mut graph = ArtifactGraph::new();
        for record in records {
            graph.add(record)?;
        }
        Ok(graph)
    }
}

impl From<ArtifactGraph> for Vec<ArtifactRecord> {
    fn from(graph: ArtifactGraph) -> Self {
        graph.records
    }
}

impl<'a> IntoIterator for &'a ArtifactGraph {
    type Item = &'a ArtifactRecord;
    type IntoIter = std::slice::Iter<'a, ArtifactRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
