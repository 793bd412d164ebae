use anyhow::{Context, Result};
use std::path::Path;

pub const DEFAULT_CONFIG: &str = r#"# Shellgate Configuration

[sandbox]
# Must not lie inside any restricted_paths entry (note that ~ is /root for root)
workspace_root = "/workspace"
dry_run = false
default_timeout_secs = 30
max_timeout_secs = 600
max_file_size_mb = 10

allowed_commands = [
    "ls", "cd", "pwd", "cat", "grep", "find", "mkdir", "touch", "cp", "mv",
    "rm", "chmod", "chown", "python", "python3", "pip", "git", "docker",
    "npm", "node", "echo", "curl", "wget", "ssh", "scp", "rsync", "tar",
    "zip", "unzip", "df", "du", "head", "tail", "wc", "sort", "uniq",
    "diff", "patch",
]

restricted_paths = [
    "/etc", "/root", "/boot", "/proc", "/sys", "/var/lib", "/usr/lib",
    "/lib", "/bin", "/sbin",
]

# Added on top of the built-in dangerous patterns
blocked_patterns = []
"#;

/// Initialize a new config file
pub fn run_init(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("Config already exists at {:?}", path);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create config directory: {:?}", parent))?;
    }
    std::fs::write(path, DEFAULT_CONFIG)
        .context(format!("Failed to write config file: {:?}", path))?;
    println!("Created config at {:?}", path);
    Ok(())
}
