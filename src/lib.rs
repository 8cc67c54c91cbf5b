//! partial-build library crate.
//!
//! The primary interface is the `partial` binary. The modules are public so
//! integration tests (and other front ends, such as a build-tool plugin) can
//! drive change detection and planning directly.

pub mod changes;
pub mod config;
pub mod error;
pub mod plan;
pub mod reactor;
pub mod telemetry;

pub use changes::{ChangeDetector, ChangeError, ChangedFiles};
pub use config::{ComparisonMode, ConfigError, Configuration, Overrides, PartialConfig, Selection};
pub use error::PartialError;
pub use plan::{BuildPlan, PlanReport};
