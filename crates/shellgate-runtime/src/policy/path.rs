use anyhow::{bail, Context, Result};
use std::path::{Component, Path, PathBuf};
use tracing::warn;

use super::{Access, Verdict};
use crate::config::SandboxConfig;
use crate::error::ToolError;

/// Workspace-scoped path policy. All file operations and command working
/// directories resolve through this guard before touching the filesystem.
///
/// Paths are canonicalized (symlinks and `..` resolved) before any prefix
/// comparison, so traversal and symlink escapes are judged on where they
/// actually land. Reads and writes share the same workspace boundary.
#[derive(Debug, Clone)]
pub struct PathGuard {
    root: PathBuf,
    /// Restricted prefixes as configured plus their canonical forms
    restricted: Vec<PathBuf>,
}

impl PathGuard {
    /// Create the guard, creating the workspace directory if absent.
    /// Fails if the workspace cannot be created or sits inside a restricted prefix.
    pub fn new(root: PathBuf, restricted_paths: &[PathBuf]) -> Result<Self> {
        std::fs::create_dir_all(&root)
            .context(format!("Failed to create workspace root: {:?}", root))?;
        let root = root
            .canonicalize()
            .context(format!("Workspace root not found: {:?}", root))?;

        let mut restricted = Vec::new();
        for prefix in restricted_paths.iter().filter(|p| p.is_absolute()) {
            restricted.push(prefix.clone());
            if let Ok(canonical) = prefix.canonicalize() {
                if canonical != *prefix {
                    restricted.push(canonical);
                }
            }
        }

        if let Some(prefix) = restricted.iter().find(|p| root.starts_with(p)) {
            bail!(
                "Workspace root {:?} lies inside restricted path {:?}",
                root,
                prefix
            );
        }

        Ok(Self { root, restricted })
    }

    pub fn from_config(config: &SandboxConfig) -> Result<Self> {
        Self::new(config.workspace_root.clone(), &config.restricted_paths)
    }

    /// Resolve a user-provided path to canonical form. Relative paths are
    /// taken relative to the workspace root; paths that do not exist yet are
    /// resolved through their longest existing ancestor.
    pub fn resolve(&self, input_path: &str) -> PathBuf {
        let candidate = Path::new(input_path);
        let joined = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        };
        canonicalize_lenient(&joined)
    }

    /// Decide whether a canonical path may be accessed. Pure: no I/O.
    pub fn check(&self, canonical: &Path, access: Access) -> Verdict {
        if let Some(prefix) = self.restricted.iter().find(|p| canonical.starts_with(p)) {
            return Verdict::Deny(format!(
                "Path is in restricted area: {}",
                prefix.display()
            ));
        }

        if !canonical.starts_with(&self.root) {
            let reason = match access {
                Access::Write => "Can only write to workspace",
                Access::Read => "Can only read from workspace",
            };
            return Verdict::Deny(format!(
                "{}: {} is outside {}",
                reason,
                canonical.display(),
                self.root.display()
            ));
        }

        Verdict::Allow
    }

    /// Resolve then check; the canonical path on success.
    pub fn authorize(&self, input_path: &str, access: Access) -> Result<PathBuf, ToolError> {
        let resolved = self.resolve(input_path);
        match self.check(&resolved, access) {
            Verdict::Allow => Ok(resolved),
            Verdict::Deny(reason) => {
                warn!(path = input_path, ?access, reason = %reason, "Path access denied");
                Err(ToolError::PolicyRejection(reason))
            }
        }
    }

    /// Tuple form of [`PathGuard::authorize`].
    pub fn is_safe(&self, input_path: &str, access: Access) -> (bool, String) {
        self.check(&self.resolve(input_path), access).into_pair()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path relative to the workspace root, if it lies underneath it.
    pub fn relative<'a>(&self, path: &'a Path) -> Option<&'a Path> {
        path.strip_prefix(&self.root).ok()
    }
}

/// Canonicalize `path`, tolerating a missing tail: the longest existing
/// ancestor is canonicalized and the rest appended after lexical normalization.
fn canonicalize_lenient(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }

    let components: Vec<Component> = path.components().collect();
    for split in (1..components.len()).rev() {
        let prefix: PathBuf = components[..split].iter().collect();
        if let Ok(base) = prefix.canonicalize() {
            return append_normalized(base, &components[split..]);
        }
    }
    append_normalized(PathBuf::new(), &components)
}

/// Push components onto `base`, applying `.` and `..` without filesystem access.
fn append_normalized(mut base: PathBuf, rest: &[Component]) -> PathBuf {
    for c in rest {
        match c {
            // PathBuf::pop never removes the root
            Component::ParentDir => {
                base.pop();
            }
            Component::CurDir => {}
            other => base.push(other.as_os_str()),
        }
    }
    base
}
