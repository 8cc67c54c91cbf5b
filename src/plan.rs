//! One end-to-end computation: changed files → changed modules → build set.

use partial_core::closure::ModuleSet;
use partial_core::{BuildSet, ImpactResolver, Module, ModuleGraph, ModuleOwnership};
use partial_git::GitRepo;
use serde::Serialize;

use crate::changes::{ChangeDetector, ChangeError, ChangedFiles};
use crate::config::{ComparisonMode, Configuration, Selection};

/// Result of planning a partial build.
#[derive(Debug)]
pub struct BuildPlan<'g> {
    /// Files that triggered the build; `None` when every module was selected
    /// without looking at git.
    pub changed_files: Option<ChangedFiles>,
    /// Modules owning at least one changed file, ignored modules included.
    pub changed_modules: Vec<&'g Module>,
    /// Modules to build, in reactor order.
    pub build_set: BuildSet<'g>,
}

/// Detect changed files under `mode`, minus excluded paths.
///
/// # Errors
/// Propagates [`ChangeError`] from the detector.
pub fn changed_files<R: GitRepo + ?Sized>(
    repo: &R,
    mode: &ComparisonMode,
    config: &Configuration,
) -> Result<ChangedFiles, ChangeError> {
    let files = ChangeDetector::new(repo, mode).detect()?;
    Ok(files.excluding(&config.exclude_paths))
}

/// Compute the build plan for `graph` under `config`.
///
/// # Errors
/// Propagates [`ChangeError`] from change detection. `build_all` never
/// fails.
pub fn plan<'g, R: GitRepo + ?Sized>(
    repo: &R,
    graph: &'g ModuleGraph,
    config: &'g Configuration,
) -> Result<BuildPlan<'g>, ChangeError> {
    let mode = match &config.selection {
        Selection::BuildAll => {
            tracing::info!(modules = graph.len(), "building all modules");
            return Ok(BuildPlan {
                changed_files: None,
                changed_modules: Vec::new(),
                build_set: BuildSet::all(graph),
            });
        }
        Selection::Changes(mode) => mode,
    };

    let files = changed_files(repo, mode, config)?;
    let ownership = ModuleOwnership::new(graph, repo.workdir());
    let changed: ModuleSet = ownership.changed_modules(files.iter());
    let changed_modules: Vec<&Module> = changed.iter().filter_map(|&idx| graph.get(idx)).collect();

    let build_set = ImpactResolver::new(graph, &config.impact).resolve(changed.iter().copied());
    tracing::info!(
        changed_files = files.len(),
        changed_modules = changed_modules.len(),
        selected = build_set.len(),
        "build set computed"
    );

    Ok(BuildPlan {
        changed_files: Some(files),
        changed_modules,
        build_set,
    })
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Serializable summary of a [`BuildPlan`], used for `--format json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlanReport {
    pub build_all: bool,
    pub changed_files: Vec<String>,
    pub changed_modules: Vec<String>,
    pub build_set: Vec<String>,
}

impl From<&BuildPlan<'_>> for PlanReport {
    fn from(plan: &BuildPlan<'_>) -> Self {
        Self {
            build_all: plan.changed_files.is_none(),
            changed_files: plan
                .changed_files
                .iter()
                .flat_map(ChangedFiles::iter)
                .map(|p| p.display().to_string())
                .collect(),
            changed_modules: plan.changed_modules.iter().map(|m| m.id().to_owned()).collect(),
            build_set: plan.build_set.iter().map(|m| m.id().to_owned()).collect(),
        }
    }
}
