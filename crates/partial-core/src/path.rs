//! Lexical path normalization.

use std::path::{Component, Path, PathBuf};

/// Resolve `.` and `..` components without touching the file system.
///
/// `..` never climbs above the root (or above the start of a relative path,
/// where it is kept). Separators are rebuilt from components, so
/// `a//b/./c` and `a/b/c` normalize to the same value.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}
