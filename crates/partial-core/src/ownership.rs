//! Changed-path → owning-module lookup.

use std::path::{Path, PathBuf};

use crate::closure::ModuleSet;
use crate::graph::{ModuleGraph, ModuleIdx};
use crate::path::normalize;

/// Maps file paths to the most specific module whose root encloses them.
#[derive(Clone, Debug)]
pub struct ModuleOwnership {
    /// Absolute, normalized module roots, deepest first. Ties keep reactor
    /// order.
    roots: Vec<(PathBuf, ModuleIdx)>,
}

impl ModuleOwnership {
    /// Index every module root of `graph`. Relative roots are resolved
    /// against `base` (normally the repository root).
    #[must_use]
    pub fn new(graph: &ModuleGraph, base: &Path) -> Self {
        let mut roots: Vec<(PathBuf, ModuleIdx)> = graph
            .modules()
            .iter()
            .map(|m| (normalize(&base.join(m.root())), m.idx()))
            .collect();
        roots.sort_by_key(|(root, _)| std::cmp::Reverse(root.components().count()));
        Self { roots }
    }

    /// The module owning `path`, or `None` when it lies outside every
    /// module root. Matching is component-wise, so `/repo/app-2` is not
    /// inside `/repo/app`.
    #[must_use]
    pub fn owner(&self, path: &Path) -> Option<ModuleIdx> {
        let path = normalize(path);
        self.roots
            .iter()
            .find(|(root, _)| path.starts_with(root))
            .map(|(_, idx)| *idx)
    }

    /// The deduplicated set of modules owning any of `paths`.
    pub fn changed_modules<'p>(&self, paths: impl IntoIterator<Item = &'p Path>) -> ModuleSet {
        paths
            .into_iter()
            .filter_map(|path| {
                let owner = self.owner(path);
                if owner.is_none() {
                    tracing::debug!(path = %path.display(), "changed file outside every module");
                }
                owner
            })
            .collect()
    }
}
