//! The module graph: an arena of modules in reactor order.
//!
//! Modules are addressed by [`ModuleIdx`], which is also their position in
//! the reactor. Only outgoing dependency edges are declared; the reverse
//! (dependents) adjacency is derived once at construction time.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::closure;
use crate::error::GraphError;

// ---------------------------------------------------------------------------
// ModuleIdx
// ---------------------------------------------------------------------------

/// Index of a module in a [`ModuleGraph`], equal to its reactor position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleIdx(usize);

impl ModuleIdx {
    pub(crate) const fn at(position: usize) -> Self {
        Self(position)
    }

    /// The reactor position this index refers to.
    #[must_use]
    pub const fn position(self) -> usize {
        self.0
    }
}

impl fmt::Display for ModuleIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Specs (input form)
// ---------------------------------------------------------------------------

/// Declarative description of one reactor module, in the shape the host
/// project model (or a reactor manifest) provides it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleSpec {
    /// Unique module identifier.
    pub id: String,
    /// Module root directory.
    pub root: PathBuf,
    /// Declared dependencies, in declaration order.
    #[serde(default)]
    pub dependencies: Vec<DependencySpec>,
}

/// A declared dependency on another module by id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencySpec {
    /// Identifier of the depended-upon module.
    pub id: String,
    /// Whether the dependency is on an in-development (snapshot) version.
    #[serde(default)]
    pub snapshot: bool,
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// A resolved dependency edge `owner depends-on target`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Dependency {
    /// The depended-upon module.
    pub target: ModuleIdx,
    /// Only snapshot edges are followed when building snapshot dependencies.
    pub snapshot: bool,
}

/// A node in the module graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Module {
    idx: ModuleIdx,
    id: String,
    root: PathBuf,
    dependencies: Vec<Dependency>,
}

impl Module {
    /// This module's index (and reactor position).
    #[must_use]
    pub const fn idx(&self) -> ModuleIdx {
        self.idx
    }

    /// Unique identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Root directory, as declared.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Outgoing dependency edges on other reactor modules.
    #[must_use]
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }
}

/// Which edges a closure walks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relation {
    /// Reverse edges: modules that depend on the current one.
    Dependents,
    /// Forward edges of any kind.
    Dependencies,
    /// Forward edges flagged as snapshot.
    SnapshotDependencies,
}

/// Immutable module graph in reactor order.
#[derive(Clone, Debug, Default)]
pub struct ModuleGraph {
    modules: Vec<Module>,
    by_id: HashMap<String, ModuleIdx>,
    dependents: Vec<Vec<ModuleIdx>>,
}

impl ModuleGraph {
    /// Build a graph from module specs listed in reactor order.
    ///
    /// Dependencies on ids that are not part of the reactor are external
    /// artifacts and are dropped. Self-dependencies are dropped as well.
    ///
    /// # Errors
    /// Returns [`GraphError`] for duplicate or empty module ids.
    pub fn from_specs(specs: impl IntoIterator<Item = ModuleSpec>) -> Result<Self, GraphError> {
        let specs: Vec<ModuleSpec> = specs.into_iter().collect();

        let mut by_id = HashMap::with_capacity(specs.len());
        for (position, spec) in specs.iter().enumerate() {
            if spec.id.is_empty() {
                return Err(GraphError::EmptyId { position });
            }
            if let Some(first) = by_id.insert(spec.id.clone(), ModuleIdx(position)) {
                return Err(GraphError::DuplicateModule {
                    id: spec.id.clone(),
                    first: first.0,
                    second: position,
                });
            }
        }

        let mut dependents = vec![Vec::new(); specs.len()];
        let mut modules = Vec::with_capacity(specs.len());
        for (position, spec) in specs.into_iter().enumerate() {
            let idx = ModuleIdx(position);
            let mut dependencies: Vec<Dependency> = Vec::with_capacity(spec.dependencies.len());
            for dep in spec.dependencies {
                let Some(&target) = by_id.get(&dep.id) else {
                    tracing::trace!(module = %spec.id, dependency = %dep.id, "external dependency");
                    continue;
                };
                if target == idx {
                    continue;
                }
                // The same module may be declared twice (e.g. different
                // scopes); any snapshot declaration wins.
                if let Some(existing) = dependencies.iter_mut().find(|d| d.target == target) {
                    existing.snapshot |= dep.snapshot;
                    continue;
                }
                dependencies.push(Dependency {
                    target,
                    snapshot: dep.snapshot,
                });
                dependents[target.0].push(idx);
            }
            modules.push(Module {
                idx,
                id: spec.id,
                root: spec.root,
                dependencies,
            });
        }

        Ok(Self {
            modules,
            by_id,
            dependents,
        })
    }

    /// All modules in reactor order.
    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Number of modules in the reactor.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Return `true` if the reactor is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Look up a module by index. `None` for an index from another graph.
    #[must_use]
    pub fn get(&self, idx: ModuleIdx) -> Option<&Module> {
        self.modules.get(idx.0)
    }

    /// Look up a module index by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<ModuleIdx> {
        self.by_id.get(id).copied()
    }

    /// Modules that declare a direct dependency on `idx`.
    #[must_use]
    pub fn dependents(&self, idx: ModuleIdx) -> &[ModuleIdx] {
        self.dependents.get(idx.0).map_or(&[][..], Vec::as_slice)
    }

    /// Direct neighbours of `idx` under `relation`.
    pub fn neighbours(&self, idx: ModuleIdx, relation: Relation) -> impl Iterator<Item = ModuleIdx> + '_ {
        let (forward, reverse): (&[Dependency], &[ModuleIdx]) = match relation {
            Relation::Dependents => (&[], self.dependents(idx)),
            Relation::Dependencies | Relation::SnapshotDependencies => {
                (self.get(idx).map_or(&[][..], Module::dependencies), &[])
            }
        };
        forward
            .iter()
            .filter(move |d| relation != Relation::SnapshotDependencies || d.snapshot)
            .map(|d| d.target)
            .chain(reverse.iter().copied())
    }

    /// All modules reachable from `seeds` under `relation`, seeds included.
    #[must_use]
    pub fn closure(
        &self,
        seeds: impl IntoIterator<Item = ModuleIdx>,
        relation: Relation,
    ) -> closure::ModuleSet {
        closure::transitive_closure(self.len(), seeds, |idx| self.neighbours(idx, relation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(id: &str, deps: &[(&str, bool)]) -> ModuleSpec {
        ModuleSpec {
            id: id.to_owned(),
            root: PathBuf::from(id),
            dependencies: deps
                .iter()
                .map(|(id, snapshot)| DependencySpec {
                    id: (*id).to_owned(),
                    snapshot: *snapshot,
                })
                .collect(),
        }
    }

    #[test]
    fn indices_follow_reactor_order() {
        let graph = ModuleGraph::from_specs([spec("a", &[]), spec("b", &[("a", false)])]).unwrap();
        assert_eq!(graph.find("a").unwrap().position(), 0);
        assert_eq!(graph.find("b").unwrap().position(), 1);
        assert_eq!(graph.get(ModuleIdx(1)).unwrap().id(), "b");
    }

    #[test]
    fn dependents_are_derived() {
        let graph = ModuleGraph::from_specs([
            spec("a", &[]),
            spec("b", &[("a", false)]),
            spec("c", &[("a", true)]),
        ])
        .unwrap();
        let a = graph.find("a").unwrap();
        let names: Vec<_> = graph.dependents(a).iter().map(|&i| graph.get(i).unwrap().id()).collect();
        assert_eq!(names, ["b", "c"]);
    }

    #[test]
    fn external_and_self_dependencies_are_dropped() {
        let graph = ModuleGraph::from_specs([spec("a", &[("junit", false), ("a", true)])]).unwrap();
        assert!(graph.get(ModuleIdx(0)).unwrap().dependencies().is_empty());
    }

    #[test]
    fn repeated_dependency_keeps_snapshot_flag() {
        let graph = ModuleGraph::from_specs([
            spec("a", &[]),
            spec("b", &[("a", false), ("a", true)]),
        ])
        .unwrap();
        let b = graph.get(ModuleIdx(1)).unwrap();
        assert_eq!(
            b.dependencies(),
            &[Dependency {
                target: ModuleIdx(0),
                snapshot: true
            }]
        );
        assert_eq!(graph.dependents(ModuleIdx(0)), &[ModuleIdx(1)]);
    }

    #[test]
    fn foreign_index_is_tolerated() {
        let graph = ModuleGraph::from_specs([spec("a", &[]), spec("b", &[("a", true)])]).unwrap();
        let foreign = ModuleIdx(7);
        assert!(graph.get(foreign).is_none());
        assert!(graph.dependents(foreign).is_empty());
        for relation in [Relation::Dependents, Relation::Dependencies, Relation::SnapshotDependencies] {
            assert_eq!(graph.neighbours(foreign, relation).count(), 0);
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = ModuleGraph::from_specs([spec("a", &[]), spec("a", &[])]).unwrap_err();
        assert_eq!(
            err,
            GraphError::DuplicateModule {
                id: "a".into(),
                first: 0,
                second: 1
            }
        );
    }

    #[test]
    fn empty_ids_are_rejected() {
        let err = ModuleGraph::from_specs([spec("", &[])]).unwrap_err();
        assert_eq!(err, GraphError::EmptyId { position: 0 });
    }

    #[test]
    fn neighbours_filter_by_relation() {
        let graph = ModuleGraph::from_specs([
            spec("a", &[]),
            spec("b", &[]),
            spec("c", &[("a", true), ("b", false)]),
        ])
        .unwrap();
        let c = graph.find("c").unwrap();
        let all: Vec<_> = graph.neighbours(c, Relation::Dependencies).collect();
        let snap: Vec<_> = graph.neighbours(c, Relation::SnapshotDependencies).collect();
        assert_eq!(all, [ModuleIdx(0), ModuleIdx(1)]);
        assert_eq!(snap, [ModuleIdx(0)]);
        let rev: Vec<_> = graph.neighbours(ModuleIdx(1), Relation::Dependents).collect();
        assert_eq!(rev, [c]);
    }
}
