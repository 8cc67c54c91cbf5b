//! Errors raised while building a [`ModuleGraph`](crate::ModuleGraph).

use thiserror::Error;

/// A reactor description that cannot be turned into a graph.
///
/// Only structural problems are errors. Dependencies on modules outside the
/// reactor are ordinary external artifacts and are skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Two modules share the same identifier.
    #[error("duplicate module id `{id}` (positions {first} and {second})")]
    DuplicateModule {
        /// The repeated identifier.
        id: String,
        /// Reactor position of the first occurrence.
        first: usize,
        /// Reactor position of the repeated occurrence.
        second: usize,
    },

    /// A module has an empty identifier.
    #[error("module at position {position} has an empty id")]
    EmptyId {
        /// Reactor position of the offending module.
        position: usize,
    },
}
