//! Transitive closure over a directed relation.
//!
//! Both impact expansions (dependents and snapshot dependencies) are the same
//! worklist walk with a different successor function.

use std::collections::BTreeSet;

use crate::graph::ModuleIdx;

/// An ordered set of modules. Iterates in reactor order.
pub type ModuleSet = BTreeSet<ModuleIdx>;

/// Every node reachable from `seeds` through `successors`, seeds included.
///
/// Runs to fixpoint with a visited set, so chains of any depth are followed
/// and cycles terminate. `node_count` bounds the index space; successors
/// outside it are ignored.
pub fn transitive_closure<F, I>(
    node_count: usize,
    seeds: impl IntoIterator<Item = ModuleIdx>,
    mut successors: F,
) -> ModuleSet
where
    F: FnMut(ModuleIdx) -> I,
    I: IntoIterator<Item = ModuleIdx>,
{
    let mut visited = vec![false; node_count];
    let mut worklist: Vec<ModuleIdx> = Vec::new();

    for seed in seeds {
        if let Some(seen) = visited.get_mut(seed.position())
            && !*seen
        {
            *seen = true;
            worklist.push(seed);
        }
    }

    while let Some(current) = worklist.pop() {
        for next in successors(current) {
            if let Some(seen) = visited.get_mut(next.position())
                && !*seen
            {
                *seen = true;
                worklist.push(next);
            }
        }
    }

    visited
        .iter()
        .enumerate()
        .filter(|(_, seen)| **seen)
        .map(|(position, _)| ModuleIdx::at(position))
        .collect()
}
