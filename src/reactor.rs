//! Reactor manifest: the ordered module list the build tool would hand us.
//!
//! ```toml
//! [[module]]
//! id = "core"
//! root = "core"
//!
//! [[module]]
//! id = "app"
//! root = "app"
//! dependencies = [{ id = "core", snapshot = true }]
//! ```
//!
//! Table order is reactor (build) order. Roots are relative to the
//! repository root unless absolute.

use std::fmt;
use std::path::{Path, PathBuf};

use partial_core::{GraphError, ModuleGraph, ModuleSpec};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReactorManifest {
    #[serde(default, rename = "module")]
    modules: Vec<ModuleSpec>,
}

/// Failure to load a reactor manifest.
#[derive(Debug)]
pub enum ReactorError {
    /// The manifest file could not be read.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The manifest is not valid TOML or has unexpected keys.
    Parse {
        path: Option<PathBuf>,
        message: String,
    },
    /// The module list is structurally invalid.
    Graph {
        path: Option<PathBuf>,
        source: GraphError,
    },
}

impl ReactorError {
    fn at(self, path: &Path) -> Self {
        match self {
            Self::Parse { message, .. } => Self::Parse {
                path: Some(path.to_owned()),
                message,
            },
            Self::Graph { source, .. } => Self::Graph {
                path: Some(path.to_owned()),
                source,
            },
            read @ Self::Read { .. } => read,
        }
    }

    /// The manifest path, when the error came from a file.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Read { path, .. } => Some(path),
            Self::Parse { path, .. } | Self::Graph { path, .. } => path.as_deref(),
        }
    }
}

impl fmt::Display for ReactorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = self.path() {
            write!(f, "{}: ", path.display())?;
        }
        match self {
            Self::Read { source, .. } => write!(f, "could not read reactor manifest: {source}"),
            Self::Parse { message, .. } => write!(f, "{message}"),
            Self::Graph { source, .. } => write!(f, "{source}"),
        }
    }
}

impl std::error::Error for ReactorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Graph { source, .. } => Some(source),
            Self::Parse { .. } => None,
        }
    }
}

/// Load the module graph from a manifest file.
///
/// # Errors
/// Returns [`ReactorError`] if the file is missing, malformed, or describes
/// an invalid graph.
pub fn load(path: &Path) -> Result<ModuleGraph, ReactorError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ReactorError::Read {
        path: path.to_owned(),
        source,
    })?;
    let graph = parse(&contents).map_err(|e| e.at(path))?;
    tracing::debug!(path = %path.display(), modules = graph.len(), "loaded reactor");
    Ok(graph)
}

/// Parse a manifest from a TOML string.
///
/// # Errors
/// Returns [`ReactorError::Parse`] or [`ReactorError::Graph`].
pub fn parse(toml_str: &str) -> Result<ModuleGraph, ReactorError> {
    let manifest: ReactorManifest = toml::from_str(toml_str).map_err(|e| {
        let mut message = e.message().to_owned();
        if let Some(span) = e.span() {
            let line = toml_str[..span.start].matches('\n').count() + 1;
            message = format!("line {line}: {message}");
        }
        ReactorError::Parse {
            path: None,
            message,
        }
    })?;
    ModuleGraph::from_specs(manifest.modules)
        .map_err(|source| ReactorError::Graph { path: None, source })
}
