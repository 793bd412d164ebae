//! Sandbox configuration shared by the guards, the executor and file tools.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Immutable sandbox settings, built once at startup and handed to every
/// component by reference. Missing TOML fields fall back to the defaults below.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SandboxConfig {
    /// Directory all file access and command working dirs are confined to
    #[serde(default = "default_workspace_root")]
    pub workspace_root: PathBuf,

    /// Base command names permitted to run
    #[serde(default = "default_allowed_commands")]
    pub allowed_commands: Vec<String>,

    /// Path prefixes that are never accessible
    #[serde(default = "default_restricted_paths")]
    pub restricted_paths: Vec<PathBuf>,

    /// Extra case-insensitive substrings rejected on top of the built-in list
    #[serde(default)]
    pub blocked_patterns: Vec<String>,

    /// Timeout applied when a shell call does not supply one
    #[serde(default = "default_timeout_secs")]
    pub default_timeout_secs: u64,

    /// Upper bound for caller-supplied timeouts
    #[serde(default = "default_max_timeout_secs")]
    pub max_timeout_secs: u64,

    /// Read/write size limit for file operations
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,

    /// Validate commands but never spawn them
    #[serde(default)]
    pub dry_run: bool,
}

fn default_workspace_root() -> PathBuf {
    PathBuf::from("/workspace")
}

fn default_allowed_commands() -> Vec<String> {
    [
        "ls", "cd", "pwd", "cat", "grep", "find", "mkdir", "touch", "cp", "mv", "rm", "chmod",
        "chown", "python", "python3", "pip", "git", "docker", "npm", "node", "echo", "curl",
        "wget", "ssh", "scp", "rsync", "tar", "zip", "unzip", "df", "du", "head", "tail", "wc",
        "sort", "uniq", "diff", "patch",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_restricted_paths() -> Vec<PathBuf> {
    [
        "/etc", "/root", "/boot", "/proc", "/sys", "/var/lib", "/usr/lib", "/lib", "/bin", "/sbin",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_timeout_secs() -> u64 {
    600
}

fn default_max_file_size_mb() -> u64 {
    10
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            workspace_root: default_workspace_root(),
            allowed_commands: default_allowed_commands(),
            restricted_paths: default_restricted_paths(),
            blocked_patterns: Vec::new(),
            default_timeout_secs: default_timeout_secs(),
            max_timeout_secs: default_max_timeout_secs(),
            max_file_size_mb: default_max_file_size_mb(),
            dry_run: false,
        }
    }
}

impl SandboxConfig {
    /// Default settings rooted at `workspace_root`.
    pub fn with_workspace(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            ..Self::default()
        }
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}
