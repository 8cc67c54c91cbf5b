//! Property tests for impact resolution over random module graphs.

use std::collections::BTreeSet;
use std::path::PathBuf;

use proptest::prelude::*;

use partial_core::{DependencySpec, ImpactOptions, ImpactResolver, ModuleGraph, ModuleSpec};

#[derive(Debug, Clone)]
struct Scenario {
    size: usize,
    edges: Vec<(usize, usize, bool)>,
    changed: BTreeSet<usize>,
    ignored: BTreeSet<usize>,
}

fn id(i: usize) -> String {
    format!("m{i}")
}

fn scenario() -> impl Strategy<Value = Scenario> {
    (1usize..12).prop_flat_map(|size| {
        (
            Just(size),
            prop::collection::vec((0..size, 0..size, any::<bool>()), 0..size * 3),
            prop::collection::btree_set(0..size, 0..=size),
            prop::collection::btree_set(0..size, 0..=size / 3),
        )
            .prop_map(|(size, edges, changed, ignored)| Scenario {
                size,
                edges,
                changed,
                ignored,
            })
    })
}

impl Scenario {
    fn graph(&self) -> ModuleGraph {
        let specs = (0..self.size).map(|i| ModuleSpec {
            id: id(i),
            root: PathBuf::from(id(i)),
            dependencies: self
                .edges
                .iter()
                .filter(|(from, _, _)| *from == i)
                .map(|(_, to, snapshot)| DependencySpec {
                    id: id(*to),
                    snapshot: *snapshot,
                })
                .collect(),
        });
        ModuleGraph::from_specs(specs).unwrap()
    }

    fn options(&self, impacted: bool, snapshots: bool) -> ImpactOptions {
        ImpactOptions {
            impacted,
            build_snapshot_dependencies: snapshots,
            ignored_modules: self.ignored.iter().map(|&i| id(i)).collect(),
        }
    }

    fn changed_ids(&self) -> Vec<String> {
        self.changed.iter().map(|&i| id(i)).collect()
    }
}

fn resolve(g: &ModuleGraph, opts: &ImpactOptions, changed: &[String]) -> Vec<String> {
    ImpactResolver::new(g, opts)
        .resolve_ids(changed.iter().map(String::as_str))
        .ids()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

proptest! {
    #[test]
    fn without_expansion_output_is_filtered_input(s in scenario()) {
        let g = s.graph();
        let out: BTreeSet<String> = resolve(&g, &s.options(false, false), &s.changed_ids())
            .into_iter()
            .collect();
        let expected: BTreeSet<String> = s
            .changed
            .difference(&s.ignored)
            .map(|&i| id(i))
            .collect();
        prop_assert_eq!(out, expected);
    }

    #[test]
    fn output_is_a_subsequence_of_the_reactor(
        s in scenario(),
        impacted in any::<bool>(),
        snapshots in any::<bool>(),
    ) {
        let g = s.graph();
        let out = resolve(&g, &s.options(impacted, snapshots), &s.changed_ids());
        let positions: Vec<usize> = out.iter().map(|m| g.find(m).unwrap().position()).collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]), "not in reactor order: {:?}", out);
    }

    #[test]
    fn ignored_modules_never_appear(
        s in scenario(),
        impacted in any::<bool>(),
        snapshots in any::<bool>(),
    ) {
        let g = s.graph();
        let out = resolve(&g, &s.options(impacted, snapshots), &s.changed_ids());
        for i in &s.ignored {
            prop_assert!(!out.contains(&id(*i)));
        }
    }

    #[test]
    fn impacted_output_is_closed_under_dependents(s in scenario()) {
        let g = s.graph();
        let without = resolve(&g, &s.options(false, false), &s.changed_ids());
        let with = resolve(&g, &s.options(true, false), &s.changed_ids());
        for m in &without {
            prop_assert!(with.contains(m));
        }
        for m in &with {
            let idx = g.find(m).unwrap();
            for dependent in g.dependents(idx) {
                let dep_id = g.get(*dependent).unwrap().id().to_owned();
                prop_assert!(
                    with.contains(&dep_id) || s.ignored.contains(&dependent.position()),
                    "{} depends on {} but is missing", dep_id, m
                );
            }
        }
    }

    #[test]
    fn snapshot_output_is_closed_under_snapshot_edges(
        s in scenario(),
        impacted in any::<bool>(),
    ) {
        let g = s.graph();
        let out = resolve(&g, &s.options(impacted, true), &s.changed_ids());
        for m in &out {
            let module = g.get(g.find(m).unwrap()).unwrap();
            for dep in module.dependencies().iter().filter(|d| d.snapshot) {
                let dep_id = g.get(dep.target).unwrap().id().to_owned();
                prop_assert!(
                    out.contains(&dep_id) || s.ignored.contains(&dep.target.position()),
                    "{} has snapshot dependency {} that is missing", m, dep_id
                );
            }
        }
    }

    #[test]
    fn resolution_is_idempotent(
        s in scenario(),
        impacted in any::<bool>(),
        snapshots in any::<bool>(),
    ) {
        let g = s.graph();
        let opts = s.options(impacted, snapshots);
        let first = resolve(&g, &opts, &s.changed_ids());
        let second = resolve(&g, &opts, &s.changed_ids());
        prop_assert_eq!(first, second);
    }
}
