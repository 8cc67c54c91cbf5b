//! partial-build configuration (`.partial/config.toml` + command-line overrides).
//!
//! Configuration is resolved once at startup into an immutable
//! [`Configuration`] and passed explicitly to the change detector and the
//! impact resolver. Resolution validates option combinations up front, so a
//! bad combination fails before any git command runs.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use partial_core::ImpactOptions;
use partial_git::RemoteBranch;
use serde::Deserialize;

/// Location of the config file relative to the repository root.
pub const CONFIG_PATH: &str = ".partial/config.toml";

// ---------------------------------------------------------------------------
// File layer
// ---------------------------------------------------------------------------

/// Top-level configuration as written in `.partial/config.toml`.
///
/// Missing fields use defaults. Missing file → all defaults (no error).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    /// How changed files are detected.
    #[serde(default)]
    pub changes: ChangesConfig,

    /// How changed modules expand into the build set.
    #[serde(default)]
    pub impact: ImpactConfig,

    /// Where the module graph comes from.
    #[serde(default)]
    pub reactor: ReactorConfig,
}

/// Change-detection settings.
///
/// ```toml
/// [changes]
/// base_branch = "refs/heads/develop"
/// compare_to_merge_base = true
/// exclude_paths = ["**/*.md"]
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangesConfig {
    /// Report tracked files changed relative to `HEAD`.
    #[serde(default)]
    pub uncommitted: bool,

    /// Report files unknown to git.
    #[serde(default)]
    pub untracked: bool,

    /// Branch (or any revision) to compare `HEAD` against.
    #[serde(default)]
    pub base_branch: Option<String>,

    /// Compare against `merge-base(HEAD, base)` instead of the base tip.
    #[serde(default)]
    pub compare_to_merge_base: bool,

    /// Fetch `reference_branch` before comparing and use it as the base.
    #[serde(default)]
    pub fetch_reference_branch: bool,

    /// Remote-tracking ref to fetch, e.g. `refs/remotes/origin/develop`.
    #[serde(default)]
    pub reference_branch: Option<String>,

    /// Remote used when `reference_branch` does not name one.
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Glob patterns (relative to the repository root) for changed files
    /// that never trigger a build.
    #[serde(default)]
    pub exclude_paths: Vec<String>,
}

impl Default for ChangesConfig {
    fn default() -> Self {
        Self {
            uncommitted: false,
            untracked: false,
            base_branch: None,
            compare_to_merge_base: false,
            fetch_reference_branch: false,
            reference_branch: None,
            remote: default_remote(),
            exclude_paths: Vec::new(),
        }
    }
}

fn default_remote() -> String {
    "origin".to_owned()
}

/// Impact-expansion settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImpactConfig {
    /// Add modules that transitively depend on changed modules.
    #[serde(default = "default_impacted")]
    pub impacted: bool,

    /// Add in-development dependencies of the modules being built.
    #[serde(default)]
    pub build_snapshot_dependencies: bool,

    /// Module ids that are never built.
    #[serde(default)]
    pub ignored_modules: Vec<String>,

    /// Skip detection and build the whole reactor.
    #[serde(default)]
    pub build_all: bool,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            impacted: default_impacted(),
            build_snapshot_dependencies: false,
            ignored_modules: Vec::new(),
            build_all: false,
        }
    }
}

const fn default_impacted() -> bool {
    true
}

/// Reactor manifest location.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReactorConfig {
    /// Path to the reactor manifest, relative to the repository root.
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
        }
    }
}

fn default_manifest() -> PathBuf {
    PathBuf::from("reactor.toml")
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// An error loading or validating configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigError {
    /// Path to the config file, if the error came from one.
    pub path: Option<PathBuf>,
    /// Human-readable description.
    pub message: String,
}

impl ConfigError {
    fn invalid(message: impl Into<String>) -> Self {
        Self {
            path: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = &self.path {
            write!(f, "{}: {}", p.display(), self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ConfigError {}

impl PartialConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns defaults if the file does not exist.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError {
                    path: Some(path.to_owned()),
                    message: format!("could not read file: {e}"),
                });
            }
        };
        Self::parse(&contents).map_err(|mut e| {
            e.path = Some(path.to_owned());
            e
        })
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ConfigError` on invalid TOML or unknown fields.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| {
            let mut message = e.message().to_owned();
            if let Some(span) = e.span() {
                let line = toml_str[..span.start]
                    .chars()
                    .filter(|&c| c == '\n')
                    .count()
                    + 1;
                message = format!("line {line}: {message}");
            }
            ConfigError {
                path: None,
                message,
            }
        })
    }

    /// Apply command-line overrides on top of the file values.
    #[must_use]
    pub fn with_overrides(mut self, o: &Overrides) -> Self {
        let c = &mut self.changes;
        c.uncommitted |= o.uncommitted;
        c.untracked |= o.untracked;
        c.compare_to_merge_base |= o.compare_to_merge_base;
        c.fetch_reference_branch |= o.fetch_reference_branch;
        if let Some(base) = &o.base_branch {
            c.base_branch = Some(base.clone());
        }
        if let Some(reference) = &o.reference_branch {
            c.reference_branch = Some(reference.clone());
        }
        if let Some(remote) = &o.remote {
            c.remote.clone_from(remote);
        }
        c.exclude_paths.extend(o.exclude_paths.iter().cloned());

        let i = &mut self.impact;
        if let Some(impacted) = o.impacted {
            i.impacted = impacted;
        }
        i.build_snapshot_dependencies |= o.build_snapshot_dependencies;
        i.ignored_modules.extend(o.ignored_modules.iter().cloned());
        i.build_all |= o.build_all;

        if let Some(manifest) = &o.reactor_manifest {
            self.reactor.manifest.clone_from(manifest);
        }
        self
    }

    /// Validate and freeze into a [`Configuration`].
    ///
    /// # Errors
    /// Returns `ConfigError` for contradictory or incomplete options and for
    /// invalid exclude patterns.
    pub fn resolve(self) -> Result<Configuration, ConfigError> {
        let exclude_paths = self
            .changes
            .exclude_paths
            .iter()
            .map(|p| {
                glob::Pattern::new(p)
                    .map_err(|e| ConfigError::invalid(format!("invalid exclude pattern '{p}': {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let selection = if self.impact.build_all {
            Selection::BuildAll
        } else {
            Selection::Changes(ComparisonMode::from_changes(&self.changes)?)
        };

        Ok(Configuration {
            selection,
            exclude_paths,
            impact: ImpactOptions {
                impacted: self.impact.impacted,
                build_snapshot_dependencies: self.impact.build_snapshot_dependencies,
                ignored_modules: self.impact.ignored_modules.into_iter().collect::<BTreeSet<_>>(),
            },
            reactor_manifest: self.reactor.manifest,
        })
    }
}

/// Command-line overrides. Boolean switches can only turn options on, except
/// `impacted`, which can be forced either way.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Overrides {
    pub uncommitted: bool,
    pub untracked: bool,
    pub base_branch: Option<String>,
    pub compare_to_merge_base: bool,
    pub fetch_reference_branch: bool,
    pub reference_branch: Option<String>,
    pub remote: Option<String>,
    pub exclude_paths: Vec<String>,
    pub impacted: Option<bool>,
    pub build_snapshot_dependencies: bool,
    pub ignored_modules: Vec<String>,
    pub build_all: bool,
    pub reactor_manifest: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Validated, immutable configuration for one invocation.
#[derive(Clone, Debug)]
pub struct Configuration {
    /// Whether to detect changes or build everything.
    pub selection: Selection,
    /// Changed files matching any of these never trigger a build.
    pub exclude_paths: Vec<glob::Pattern>,
    /// Expansion policy for the impact resolver.
    pub impact: ImpactOptions,
    /// Reactor manifest path (relative paths are resolved against the
    /// repository root).
    pub reactor_manifest: PathBuf,
}

/// What the build set is computed from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Every reactor module, no git access.
    BuildAll,
    /// Modules affected by files changed under the given mode.
    Changes(ComparisonMode),
}

/// The single active change-detection mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ComparisonMode {
    /// Working-tree state relative to `HEAD`. At least one flag is set.
    WorkingTree {
        /// Modified tracked files.
        uncommitted: bool,
        /// Files unknown to git.
        untracked: bool,
    },
    /// `HEAD` against a local revision.
    Branch {
        /// The revision compared against.
        base: String,
        /// Compare against the merge base rather than the tip.
        merge_base: bool,
    },
    /// `HEAD` against a freshly fetched remote branch.
    FetchedReference {
        /// The remote branch and its tracking ref.
        reference: RemoteBranch,
        /// Compare against the merge base rather than the tip.
        merge_base: bool,
    },
}

impl ComparisonMode {
    fn from_changes(c: &ChangesConfig) -> Result<Self, ConfigError> {
        if c.uncommitted || c.untracked {
            if c.base_branch.is_some() || c.fetch_reference_branch || c.compare_to_merge_base {
                tracing::warn!(
                    "uncommitted/untracked detection takes precedence; branch comparison options are ignored"
                );
            }
            return Ok(Self::WorkingTree {
                uncommitted: c.uncommitted,
                untracked: c.untracked,
            });
        }

        if c.fetch_reference_branch {
            let Some(reference) = c.reference_branch.as_deref() else {
                return Err(ConfigError::invalid(
                    "fetch_reference_branch is set but reference_branch is not",
                ));
            };
            let reference = RemoteBranch::parse(reference, &c.remote).ok_or_else(|| {
                ConfigError::invalid(format!(
                    "reference_branch '{reference}' does not name a remote branch \
                     (expected refs/remotes/<remote>/<branch>)"
                ))
            })?;
            if let Some(base) = &c.base_branch {
                tracing::warn!(base = %base, "fetched reference branch is the comparison base; base_branch is ignored");
            }
            return Ok(Self::FetchedReference {
                reference,
                merge_base: c.compare_to_merge_base,
            });
        }

        match c.base_branch.as_deref() {
            Some("") => Err(ConfigError::invalid("base_branch must not be empty")),
            Some(base) => Ok(Self::Branch {
                base: base.to_owned(),
                merge_base: c.compare_to_merge_base,
            }),
            None if c.compare_to_merge_base => Err(ConfigError::invalid(
                "compare_to_merge_base requires base_branch (or fetch_reference_branch)",
            )),
            None => Err(ConfigError::invalid(
                "no comparison mode: set uncommitted, untracked, base_branch, \
                 or fetch_reference_branch",
            )),
        }
    }
}
