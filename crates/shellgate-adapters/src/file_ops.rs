//! Workspace file operations. Each operation authorizes its path through the
//! [`PathGuard`] before any filesystem call beyond path resolution.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Serialize;
use shellgate_runtime::{Access, PathGuard, ToolError};
use std::fs::Metadata;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Content encoding for read/write payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Encoding {
    #[serde(rename = "utf-8")]
    Utf8,
    #[serde(rename = "base64")]
    Base64,
}

impl Encoding {
    /// Parse the optional `encoding` parameter; absent means UTF-8.
    pub fn parse(value: Option<&str>) -> Result<Self, ToolError> {
        match value.map(|v| v.to_ascii_lowercase()) {
            None => Ok(Encoding::Utf8),
            Some(v) if v == "utf-8" || v == "utf8" => Ok(Encoding::Utf8),
            Some(v) if v == "base64" || v == "binary" => Ok(Encoding::Base64),
            Some(v) => Err(ToolError::InvalidInput(format!(
                "unsupported encoding '{}' (expected utf-8 or base64)",
                v
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
    /// Link whose target lies outside the workspace; never followed
    Symlink,
}

impl EntryKind {
    fn of(meta: &Metadata) -> Self {
        if meta.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadOutcome {
    pub path: String,
    /// UTF-8 text, or base64 when `is_binary`
    pub content: String,
    /// Size in bytes of the file contents
    pub size: u64,
    pub is_binary: bool,
    pub encoding: Encoding,
}

#[derive(Debug, Clone, Serialize)]
pub struct WriteOutcome {
    pub path: String,
    pub size: u64,
    /// True when the file did not exist before this write
    pub created: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DirEntryInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// 0 for directories
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
    pub permissions: String,
    /// Relative to the workspace root
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListOutcome {
    pub path: String,
    pub entries: Vec<DirEntryInfo>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileInfo {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub size: u64,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub accessed: Option<DateTime<Utc>>,
    pub permissions: String,
    pub owner: Option<u32>,
    pub group: Option<u32>,
    /// Including the leading dot, empty when there is none
    pub extension: String,
    pub absolute_path: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateDirOutcome {
    pub path: String,
    pub created: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteOutcome {
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// Relative to the workspace root
    pub path: String,
    pub name: String,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
    pub absolute_path: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub pattern: String,
    pub directory: String,
    pub recursive: bool,
    pub results: Vec<SearchHit>,
    pub count: usize,
}

/// File operations confined to the workspace.
pub struct FileOps {
    guard: Arc<PathGuard>,
    max_file_size: u64,
}

impl FileOps {
    pub fn new(guard: Arc<PathGuard>, max_file_size: u64) -> Self {
        Self {
            guard,
            max_file_size,
        }
    }

    pub fn guard(&self) -> &PathGuard {
        &self.guard
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    pub async fn read(&self, path: &str, encoding: Encoding) -> Result<ReadOutcome> {
        let resolved = self.guard.authorize(path, Access::Read)?;
        let meta = stat(&resolved, path, "File not found").await?;
        if meta.is_dir() {
            return Err(ToolError::OperationFailure(format!(
                "Is a directory: {} (use list_directory)",
                path
            ))
            .into());
        }
        self.check_size(meta.len(), "File")?;

        let bytes = tokio::fs::read(&resolved)
            .await
            .context(format!("Failed to read file: {}", path))?;
        // The file may have grown since the metadata check
        self.check_size(bytes.len() as u64, "File")?;
        let size = bytes.len() as u64;

        let text = match encoding {
            Encoding::Utf8 => String::from_utf8(bytes).map_err(|e| e.into_bytes()),
            Encoding::Base64 => Err(bytes),
        };
        let outcome = match text {
            Ok(content) => ReadOutcome {
                path: self.display(&resolved),
                content,
                size,
                is_binary: false,
                encoding: Encoding::Utf8,
            },
            Err(bytes) => ReadOutcome {
                path: self.display(&resolved),
                content: STANDARD.encode(&bytes),
                size,
                is_binary: true,
                encoding: Encoding::Base64,
            },
        };
        debug!(path, size, is_binary = outcome.is_binary, "Read file");
        Ok(outcome)
    }

    /// Atomic write (temp file + rename). Overwrites unconditionally.
    pub async fn write(&self, path: &str, content: &str, encoding: Encoding) -> Result<WriteOutcome> {
        let resolved = self.guard.authorize(path, Access::Write)?;

        let bytes = match encoding {
            Encoding::Utf8 => content.as_bytes().to_vec(),
            Encoding::Base64 => STANDARD
                .decode(content)
                .map_err(|e| ToolError::InvalidInput(format!("Invalid base64 content: {}", e)))?,
        };
        self.check_size(bytes.len() as u64, "Content")?;

        // Decided before the write so an overwrite is never reported as a creation
        let existing = match tokio::fs::metadata(&resolved).await {
            Ok(meta) => Some(meta),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(e).context(format!("Failed to stat: {}", path)),
        };
        if existing.as_ref().is_some_and(Metadata::is_dir) {
            return Err(ToolError::OperationFailure(format!("Is a directory: {}", path)).into());
        }

        let parent = resolved
            .parent()
            .unwrap_or(self.guard.root())
            .to_path_buf();
        tokio::fs::create_dir_all(&parent)
            .await
            .context(format!("Failed to create directories: {:?}", parent))?;

        let target = resolved.clone();
        let permissions = existing.as_ref().map(Metadata::permissions);
        let size = bytes.len() as u64;
        tokio::task::spawn_blocking(move || persist_atomically(&parent, &target, &bytes, permissions))
            .await
            .context("Write task panicked")??;

        info!(path, size, created = existing.is_none(), "Wrote file");
        Ok(WriteOutcome {
            path: self.display(&resolved),
            size,
            created: existing.is_none(),
        })
    }

    /// Directories first, then by name. Entries that cannot be stat'ed are skipped.
    pub async fn list(&self, path: Option<&str>) -> Result<ListOutcome> {
        let dir = match path {
            Some(p) => self.guard.authorize(p, Access::Read)?,
            None => self.guard.root().to_path_buf(),
        };
        let label = path.unwrap_or(".");
        let meta = stat(&dir, label, "Directory not found").await?;
        if !meta.is_dir() {
            return Err(ToolError::OperationFailure(format!("Not a directory: {}", label)).into());
        }

        let mut reader = tokio::fs::read_dir(&dir)
            .await
            .context(format!("Failed to list directory: {}", label))?;
        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .context(format!("Failed to list directory: {}", label))?
        {
            let entry_path = entry.path();
            let Some((meta, kind)) = self.entry_metadata(&entry_path).await else {
                continue;
            };
            entries.push(DirEntryInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
                size: if kind == EntryKind::File { meta.len() } else { 0 },
                modified: timestamp(meta.modified()),
                permissions: permission_bits(&meta),
                path: self.display(&entry_path),
            });
        }

        entries.sort_by(|a, b| {
            (a.kind != EntryKind::Directory, &a.name).cmp(&(b.kind != EntryKind::Directory, &b.name))
        });

        Ok(ListOutcome {
            path: self.display(&dir),
            count: entries.len(),
            entries,
        })
    }

    pub async fn info(&self, path: &str) -> Result<FileInfo> {
        let resolved = self.guard.authorize(path, Access::Read)?;
        let meta = stat(&resolved, path, "File not found").await?;

        Ok(FileInfo {
            name: resolved
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: self.display(&resolved),
            kind: EntryKind::of(&meta),
            size: meta.len(),
            created: timestamp(meta.created()),
            modified: timestamp(meta.modified()),
            accessed: timestamp(meta.accessed()),
            permissions: permission_bits(&meta),
            owner: owner_ids(&meta).map(|(uid, _)| uid),
            group: owner_ids(&meta).map(|(_, gid)| gid),
            extension: resolved
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default(),
            absolute_path: resolved,
        })
    }

    pub async fn create_dir(&self, path: &str) -> Result<CreateDirOutcome> {
        let resolved = self.guard.authorize(path, Access::Write)?;

        let created = match tokio::fs::metadata(&resolved).await {
            Ok(meta) if meta.is_dir() => false,
            Ok(_) => {
                return Err(ToolError::OperationFailure(format!(
                    "Path exists and is not a directory: {}",
                    path
                ))
                .into());
            }
            Err(_) => {
                tokio::fs::create_dir_all(&resolved)
                    .await
                    .context(format!("Failed to create directory: {}", path))?;
                true
            }
        };

        info!(path, created, "Created directory");
        Ok(CreateDirOutcome {
            path: self.display(&resolved),
            created,
        })
    }

    /// Delete a file, symlink or directory. The workspace root itself is never deleted.
    pub async fn delete(&self, path: &str, recursive: bool) -> Result<DeleteOutcome> {
        // A symlink is removed itself, never its target, wherever it points
        if let Some(link) = self.symlink_entry(path) {
            tokio::fs::remove_file(&link)
                .await
                .map_err(|e| delete_failure(path, e))?;
            warn!(path, "Deleted symlink");
            return Ok(DeleteOutcome {
                path: self.display(&link),
            });
        }

        let resolved = self.guard.authorize(path, Access::Write)?;
        if resolved == self.guard.root() {
            return Err(ToolError::PolicyRejection("cannot delete workspace root".into()).into());
        }

        let meta = stat(&resolved, path, "Path not found").await?;
        let removal = if meta.is_dir() {
            if recursive {
                tokio::fs::remove_dir_all(&resolved).await
            } else {
                tokio::fs::remove_dir(&resolved).await
            }
        } else {
            tokio::fs::remove_file(&resolved).await
        };
        removal.map_err(|e| delete_failure(path, e))?;

        warn!(path, recursive, "Deleted path");
        Ok(DeleteOutcome {
            path: self.display(&resolved),
        })
    }

    /// Glob search under `directory` (default: workspace root). Only files
    /// are returned, sorted by path relative to the root.
    pub async fn search(
        &self,
        pattern: &str,
        directory: Option<&str>,
        recursive: bool,
    ) -> Result<SearchOutcome> {
        let base = match directory {
            Some(d) => self.guard.authorize(d, Access::Read)?,
            None => self.guard.root().to_path_buf(),
        };
        let label = directory.unwrap_or(".");
        let meta = stat(&base, label, "Directory not found").await?;
        if !meta.is_dir() {
            return Err(ToolError::OperationFailure(format!("Not a directory: {}", label)).into());
        }

        if pattern.is_empty()
            || Path::new(pattern).is_absolute()
            || Path::new(pattern)
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(ToolError::InvalidInput(format!(
                "pattern must be relative and stay inside the directory: {}",
                pattern
            ))
            .into());
        }
        let matcher = glob::Pattern::new(pattern)
            .map_err(|e| ToolError::InvalidInput(format!("Invalid pattern '{}': {}", pattern, e)))?;

        let guard = self.guard.clone();
        let walk_base = base.clone();
        let mut results = tokio::task::spawn_blocking(move || {
            collect_matches(&guard, &walk_base, &matcher, recursive)
        })
        .await
        .context("Search task panicked")?;
        results.sort_by(|a, b| a.path.cmp(&b.path));

        debug!(pattern, directory = label, recursive, count = results.len(), "Search finished");
        Ok(SearchOutcome {
            pattern: pattern.to_string(),
            directory: self.display(&base),
            recursive,
            count: results.len(),
            results,
        })
    }

    fn check_size(&self, size: u64, what: &str) -> Result<(), ToolError> {
        if size > self.max_file_size {
            return Err(ToolError::ResourceLimitExceeded(format!(
                "{} too large ({} > {} bytes)",
                what, size, self.max_file_size
            )));
        }
        Ok(())
    }

    /// The un-followed path of `input` when its final component is a symlink
    /// whose parent directory is writable. Only the parent is authorized.
    fn symlink_entry(&self, input: &str) -> Option<PathBuf> {
        let candidate = Path::new(input);
        let name = candidate.file_name()?;
        let parent = self
            .guard
            .authorize(candidate.parent()?.to_str()?, Access::Write)
            .ok()?;
        let entry = parent.join(name);
        match std::fs::symlink_metadata(&entry) {
            Ok(meta) if meta.file_type().is_symlink() => Some(entry),
            _ => None,
        }
    }

    /// Metadata for a listing entry. Symlinks are followed only when the
    /// target stays inside the workspace; otherwise the link itself is
    /// described. Dangling or unreadable entries yield `None`.
    async fn entry_metadata(&self, entry_path: &Path) -> Option<(Metadata, EntryKind)> {
        let lstat = match tokio::fs::symlink_metadata(entry_path).await {
            Ok(meta) => meta,
            Err(e) => {
                debug!(path = %entry_path.display(), error = %e, "Skipping unreadable entry");
                return None;
            }
        };
        if !lstat.file_type().is_symlink() {
            let kind = EntryKind::of(&lstat);
            return Some((lstat, kind));
        }

        let target = match tokio::fs::canonicalize(entry_path).await {
            Ok(target) => target,
            Err(e) => {
                debug!(path = %entry_path.display(), error = %e, "Skipping dangling symlink");
                return None;
            }
        };
        if !self.guard.check(&target, Access::Read).is_allowed() {
            return Some((lstat, EntryKind::Symlink));
        }
        let meta = tokio::fs::metadata(&target).await.ok()?;
        let kind = EntryKind::of(&meta);
        Some((meta, kind))
    }

    /// Workspace-relative display form; "." for the root itself.
    fn display(&self, path: &Path) -> String {
        display_relative(&self.guard, path)
    }
}

fn display_relative(guard: &PathGuard, path: &Path) -> String {
    match guard.relative(path) {
        Some(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Some(rel) => rel.display().to_string(),
        None => path.display().to_string(),
    }
}

/// Metadata, mapping NotFound to an OperationFailure with `missing` as the message.
async fn stat(path: &Path, label: &str, missing: &str) -> Result<Metadata> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(meta),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(ToolError::OperationFailure(format!("{}: {}", missing, label)).into())
        }
        Err(e) => Err(e).context(format!("Failed to stat: {}", label)),
    }
}

fn delete_failure(path: &str, err: std::io::Error) -> ToolError {
    ToolError::OperationFailure(format!("Failed to delete {}: {}", path, err))
}

fn persist_atomically(
    parent: &Path,
    target: &Path,
    bytes: &[u8],
    permissions: Option<std::fs::Permissions>,
) -> Result<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .context("Failed to create temp file for atomic write")?;
    tmp.write_all(bytes)
        .context("Failed to write to temp file")?;
    tmp.flush()?;

    match permissions {
        Some(perms) => tmp.as_file().set_permissions(perms)?,
        None => set_default_permissions(tmp.as_file())?,
    }

    tmp.persist(target)
        .context(format!("Failed to persist file: {:?}", target))?;
    Ok(())
}

#[cfg(unix)]
fn set_default_permissions(file: &std::fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    // tempfile creates 0600; new files get the usual 0644
    file.set_permissions(std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_default_permissions(_file: &std::fs::File) -> std::io::Result<()> {
    Ok(())
}

/// Walk `base` without following directory symlinks, so link cycles cannot
/// repeat or stall the walk. A recursive search matches `pattern` against any
/// trailing run of path components; a flat one against the whole relative path.
fn collect_matches(
    guard: &PathGuard,
    base: &Path,
    pattern: &glob::Pattern,
    recursive: bool,
) -> Vec<SearchHit> {
    let options = glob::MatchOptions {
        require_literal_separator: true,
        ..glob::MatchOptions::new()
    };
    let mut walker = WalkDir::new(base).min_depth(1).follow_links(false);
    if !recursive {
        walker = walker.max_depth(Path::new(pattern.as_str()).components().count().max(1));
    }

    let mut hits = Vec::new();
    for entry in walker.into_iter().filter_map(|e| e.ok()) {
        if entry.file_type().is_dir() {
            continue;
        }
        let path = entry.path();
        let Ok(relative) = path.strip_prefix(base) else {
            continue;
        };
        if !matches_tail(pattern, relative, recursive, options) {
            continue;
        }

        let Ok(meta) = std::fs::metadata(path) else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }
        // Symlinks may point out of the workspace
        let Ok(canonical) = path.canonicalize() else {
            continue;
        };
        if !guard.check(&canonical, Access::Read).is_allowed() {
            continue;
        }
        hits.push(SearchHit {
            path: display_relative(guard, path),
            name: entry.file_name().to_string_lossy().into_owned(),
            size: meta.len(),
            modified: timestamp(meta.modified()),
            absolute_path: path.to_path_buf(),
        });
    }
    hits
}

fn matches_tail(
    pattern: &glob::Pattern,
    relative: &Path,
    recursive: bool,
    options: glob::MatchOptions,
) -> bool {
    let components: Vec<_> = relative.components().collect();
    let starts = if recursive { components.len() } else { 1 };
    (0..starts).any(|i| {
        let tail: PathBuf = components[i..].iter().collect();
        pattern.matches_path_with(&tail, options)
    })
}

fn timestamp(time: std::io::Result<SystemTime>) -> Option<DateTime<Utc>> {
    time.ok().map(DateTime::<Utc>::from)
}

#[cfg(unix)]
fn permission_bits(meta: &Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;
    format!("{:03o}", meta.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn permission_bits(meta: &Metadata) -> String {
    let bits = if meta.permissions().readonly() { "444" } else { "644" };
    bits.to_string()
}

#[cfg(unix)]
fn owner_ids(meta: &Metadata) -> Option<(u32, u32)> {
    use std::os::unix::fs::MetadataExt;
    Some((meta.uid(), meta.gid()))
}

#[cfg(not(unix))]
fn owner_ids(_meta: &Metadata) -> Option<(u32, u32)> {
    None
}
