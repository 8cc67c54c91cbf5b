//! Core domain logic for partial-build.
//!
//! Everything in this crate is pure, in-memory computation over a module
//! graph; there is no I/O and nothing here can fail once a graph is built.
//!
//! - [`graph`]: arena of modules with index-based dependency edges.
//! - [`closure`]: the transitive-closure primitive shared by both
//!   expansion modes.
//! - [`impact`]: expands directly changed modules into the build set.
//! - [`ownership`]: maps changed file paths to the module that owns them.
//! - [`path`]: lexical path normalization.

pub mod closure;
pub mod error;
pub mod graph;
pub mod impact;
pub mod ownership;
pub mod path;

pub use error::GraphError;
pub use graph::{Dependency, DependencySpec, Module, ModuleGraph, ModuleIdx, ModuleSpec, Relation};
pub use impact::{BuildSet, ImpactOptions, ImpactResolver};
pub use ownership::ModuleOwnership;
