//! Property-based tests for processing order, the requirement resolver and
//! registry snapshots.

#[cfg(test)]
mod proptest_tests {
    use crate::artifact::ArtifactRecord;
    use crate::graph::{ArtifactGraph, PROCESSING_ORDER_CEILING};
    use crate::registry::{CommandRegistry, CommandSourceEntry, CommandType, SourceLocation};
    use crate::version::{latest_per_group, unique_per_group, ArtifactVersion, VersionRequirement};
    use proptest::prelude::*;

    fn node_name(i: usize) -> String {
        format!("Artifact{}", i)
    }

    /// Node `i` may only depend on nodes with a smaller index, so the graph is
    /// acyclic. Some dependencies point outside the graph.
    fn acyclic_graph() -> impl Strategy<Value = ArtifactGraph> {
        (1usize..40).prop_flat_map(|n| {
            prop::collection::vec(prop::collection::vec(0usize..n + 5, 0..5), n).prop_map(
                move |deps| {
                    let mut graph = ArtifactGraph::new();
                    for (i, targets) in deps.into_iter().enumerate() {
                        let mut record = ArtifactRecord::module(node_name(i)).unwrap();
                        for t in targets {
                            let dep = if t < i {
                                node_name(t)
                            } else {
                                format!("External{}", t)
                            };
                            record = record.with_dependency(VersionRequirement::new(dep).unwrap());
                        }
                        graph.add(record).unwrap();
                    }
                    graph
                },
            )
        })
    }

    fn requirement() -> impl Strategy<Value = VersionRequirement> {
        (
            "[A-Ca-c]",
            prop::option::of((0u64..3, 0u64..3)),
            prop::option::of("[xy]"),
        )
            .prop_map(|(name, version, target)| {
                let mut r = VersionRequirement::new(name).unwrap();
                r.version = version.map(|(major, minor)| ArtifactVersion::new(major, minor));
                r.target_directory = target.map(Into::into);
                r
            })
    }

    // ============================================================================
    // processing order
    // ============================================================================

    proptest! {
        /// Property: in an acyclic graph every in-graph dependency orders
        /// strictly before its dependent, and roots order at 0
        #[test]
        fn acyclic_dependencies_order_first(mut graph in acyclic_graph()) {
            graph.refresh_ordering();
            for record in graph.iter() {
                let order = record.processing_order().unwrap();
                prop_assert!(order < PROCESSING_ORDER_CEILING);
                let deps = graph.internal_dependencies(record.name());
                if deps.is_empty() {
                    prop_assert_eq!(order, 0);
                }
                for dep in deps {
                    prop_assert!(dep.processing_order().unwrap() < order);
                }
            }
            prop_assert!(graph.saturated().is_empty());
        }

        /// Property: compute_processing_order agrees with the stored order
        #[test]
        fn compute_matches_refresh(mut graph in acyclic_graph()) {
            graph.refresh_ordering();
            for record in graph.iter() {
                prop_assert_eq!(
                    graph.compute_processing_order(record.name()),
                    record.processing_order()
                );
            }
        }

        /// Property: every artifact on a cycle, and every artifact that depends
        /// on one, reaches the ceiling
        #[test]
        fn cycles_saturate(cycle_len in 1usize..8, tail_len in 0usize..8) {
            let mut graph = ArtifactGraph::new();
            for i in 0..cycle_len {
                let next = node_name((i + 1) % cycle_len);
                graph
                    .add(
                        ArtifactRecord::module(node_name(i))
                            .unwrap()
                            .with_dependency(VersionRequirement::new(next).unwrap()),
                    )
                    .unwrap();
            }
            for j in 0..tail_len {
                let target = if j == 0 {
                    node_name(0)
                } else {
                    format!("Tail{}", j - 1)
                };
                graph
                    .add(
                        ArtifactRecord::module(format!("Tail{}", j))
                            .unwrap()
                            .with_dependency(VersionRequirement::new(target).unwrap()),
                    )
                    .unwrap();
            }
            graph.add(ArtifactRecord::module("Independent").unwrap()).unwrap();

            graph.refresh_ordering();
            prop_assert_eq!(graph.saturated().len(), cycle_len + tail_len);
            prop_assert_eq!(graph.get("Independent").unwrap().processing_order(), Some(0));
        }
    }

    // ============================================================================
    // requirement resolver
    // ============================================================================

    proptest! {
        /// Property: unique_per_group is idempotent
        #[test]
        fn unique_is_idempotent(reqs in prop::collection::vec(requirement(), 0..30)) {
            let once = unique_per_group(&reqs);
            let twice = unique_per_group(&once);
            prop_assert_eq!(once, twice);
        }

        /// Property: latest_per_group is deterministic and never loses to
        /// another member of its group
        #[test]
        fn latest_is_maximal(reqs in prop::collection::vec(requirement(), 0..30)) {
            let latest = latest_per_group(&reqs);
            prop_assert_eq!(&latest, &latest_per_group(&reqs));
            for chosen in &latest {
                for other in reqs
                    .iter()
                    .filter(|r| r.is_named(&chosen.name) && r.target_directory == chosen.target_directory)
                {
                    prop_assert!(other.version <= chosen.version);
                }
            }
            let groups = unique_per_group(&latest);
            prop_assert_eq!(groups.len(), latest.len());
        }
    }

    // ============================================================================
    // registry snapshot
    // ============================================================================

    proptest! {
        /// Property: a registry survives a JSON round trip unchanged
        #[test]
        fn registry_round_trip(
            entries in prop::collection::vec(("[A-Da-d]-[a-z]{1,4}", "[A-C]?", 0usize..4), 0..20),
            allow_duplicates in any::<bool>(),
        ) {
            let locations = [
                SourceLocation::Unknown,
                SourceLocation::ExternalRepository,
                SourceLocation::BuiltIn,
                SourceLocation::Solution,
            ];
            let mut registry = CommandRegistry::new();
            for (command, source, loc) in entries {
                let entry = CommandSourceEntry::new(command, CommandType::Function, source, locations[loc]).unwrap();
                registry.register(entry, allow_duplicates);
            }

            let json = registry.to_json().unwrap();
            let back = CommandRegistry::from_json(&json).unwrap();
            prop_assert_eq!(back, registry);
        }
    }
}
