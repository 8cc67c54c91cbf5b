//! Impact resolution: from directly changed modules to the build set.
//!
//! 1. Ignored modules are dropped from the changed set.
//! 2. With `impacted`, every transitive dependent is added.
//! 3. With `build_snapshot_dependencies`, every module reachable over
//!    snapshot edges is added.
//! 4. The reactor is filtered down to the result, keeping reactor order.
//!
//! Ignored modules are removed again after each expansion, so they never
//! appear in the output. Expansion still walks *through* them: a module that
//! depends on a changed module only via an ignored one is still impacted.

use std::collections::BTreeSet;

use crate::closure::ModuleSet;
use crate::graph::{Module, ModuleGraph, ModuleIdx, Relation};

/// Policy knobs for [`ImpactResolver`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImpactOptions {
    /// Add transitive dependents of changed modules.
    pub impacted: bool,
    /// Add transitive snapshot dependencies of the working set.
    pub build_snapshot_dependencies: bool,
    /// Module ids that never trigger a build and are never built.
    pub ignored_modules: BTreeSet<String>,
}

/// Expands changed modules into a [`BuildSet`].
#[derive(Clone, Copy, Debug)]
pub struct ImpactResolver<'g> {
    graph: &'g ModuleGraph,
    options: &'g ImpactOptions,
}

impl<'g> ImpactResolver<'g> {
    #[must_use]
    pub const fn new(graph: &'g ModuleGraph, options: &'g ImpactOptions) -> Self {
        Self { graph, options }
    }

    /// Resolve changed modules given by id. Ids not in the reactor are
    /// dropped silently.
    #[must_use]
    pub fn resolve_ids<'a>(&self, changed: impl IntoIterator<Item = &'a str>) -> BuildSet<'g> {
        self.resolve(changed.into_iter().filter_map(|id| {
            let found = self.graph.find(id);
            if found.is_none() {
                tracing::debug!(module = id, "changed module not in reactor, dropping");
            }
            found
        }))
    }

    /// Resolve changed modules into the ordered build set.
    #[must_use]
    pub fn resolve(&self, changed: impl IntoIterator<Item = ModuleIdx>) -> BuildSet<'g> {
        let ignored: ModuleSet = self
            .options
            .ignored_modules
            .iter()
            .filter_map(|id| self.graph.find(id))
            .collect();

        let mut working: ModuleSet = changed
            .into_iter()
            .filter(|idx| idx.position() < self.graph.len())
            .collect();
        working.retain(|idx| !ignored.contains(idx));
        let direct = working.len();

        if self.options.impacted {
            working = self.graph.closure(working, Relation::Dependents);
            working.retain(|idx| !ignored.contains(idx));
        }
        let after_dependents = working.len();

        if self.options.build_snapshot_dependencies {
            working = self.graph.closure(working, Relation::SnapshotDependencies);
            working.retain(|idx| !ignored.contains(idx));
        }

        tracing::debug!(
            direct,
            impacted = after_dependents - direct,
            snapshot_dependencies = working.len() - after_dependents,
            "resolved build set"
        );

        BuildSet::from_set(self.graph, &working)
    }
}

/// Modules to build, in reactor order, without duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildSet<'g> {
    modules: Vec<&'g Module>,
}

impl<'g> BuildSet<'g> {
    fn from_set(graph: &'g ModuleGraph, set: &ModuleSet) -> Self {
        Self {
            modules: graph
                .modules()
                .iter()
                .filter(|m| set.contains(&m.idx()))
                .collect(),
        }
    }

    /// Every module in the reactor, in order.
    #[must_use]
    pub fn all(graph: &'g ModuleGraph) -> Self {
        Self {
            modules: graph.modules().iter().collect(),
        }
    }

    /// Modules in build order.
    pub fn iter(&self) -> impl Iterator<Item = &'g Module> + '_ {
        self.modules.iter().copied()
    }

    /// Module ids in build order.
    #[must_use]
    pub fn ids(&self) -> Vec<&'g str> {
        self.modules.iter().map(|m| m.id()).collect()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.modules.iter().any(|m| m.id() == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
