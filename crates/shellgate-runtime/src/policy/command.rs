use std::collections::HashSet;

use super::Verdict;
use crate::config::SandboxConfig;

/// Dangerous patterns blocked regardless of config
pub const BUILTIN_DANGER_PATTERNS: &[&str] = &[
    "rm -rf /",
    "mkfs",
    "dd if=",
    "> /dev/sda",
    "chmod 777 /",
    ":(){ :|:& };:",
    "fork()",
    "exec(",
    "system(",
    "shutdown",
    "reboot",
    "halt",
    "poweroff",
];

/// Roots that, combined with `..` anywhere in a command, signal a traversal attempt
const TRAVERSAL_ROOTS: &[&str] = &["/etc", "/root", "/boot"];

/// Decides whether a shell command string may run.
///
/// The allow-list only looks at the leading command, so the whole string is
/// also scanned for danger patterns to catch chained sub-commands such as
/// `git status; rm -rf /`. Matching is substring based and best-effort.
#[derive(Debug, Clone)]
pub struct CommandGuard {
    allowed: HashSet<String>,
    /// Lower-cased built-in and configured patterns
    danger_patterns: Vec<String>,
}

impl CommandGuard {
    pub fn new(allowed: impl IntoIterator<Item = String>, extra_patterns: &[String]) -> Self {
        let danger_patterns = BUILTIN_DANGER_PATTERNS
            .iter()
            .map(|p| p.to_string())
            .chain(extra_patterns.iter().map(|p| p.to_lowercase()))
            .filter(|p| !p.is_empty())
            .collect();
        Self {
            allowed: allowed.into_iter().collect(),
            danger_patterns,
        }
    }

    pub fn from_config(config: &SandboxConfig) -> Self {
        Self::new(config.allowed_commands.iter().cloned(), &config.blocked_patterns)
    }

    /// Classify `command`. Pure: no I/O, no state.
    pub fn check(&self, command: &str) -> Verdict {
        let parts = match shell_words::split(command) {
            Ok(parts) => parts,
            Err(e) => return Verdict::Deny(format!("Command parsing error: {}", e)),
        };

        let Some(first) = parts.first() else {
            return Verdict::Deny("Empty command".to_string());
        };

        let base_cmd = base_command(first);
        if !self.allowed.contains(base_cmd) {
            return Verdict::Deny(format!("Command '{}' not in allowed list", base_cmd));
        }

        let cmd_lower = command.to_lowercase();
        if let Some(pattern) = self
            .danger_patterns
            .iter()
            .find(|p| cmd_lower.contains(p.as_str()))
        {
            return Verdict::Deny(format!("Command contains dangerous pattern: {}", pattern));
        }

        if command.contains("..") && TRAVERSAL_ROOTS.iter().any(|root| command.contains(root)) {
            return Verdict::Deny("Path traversal attempt detected".to_string());
        }

        Verdict::Allow
    }

    /// Tuple form of [`CommandGuard::check`].
    pub fn is_safe(&self, command: &str) -> (bool, String) {
        self.check(command).into_pair()
    }

    pub fn allowed_commands(&self) -> impl Iterator<Item = &str> {
        self.allowed.iter().map(String::as_str)
    }
}

/// Strip any leading directory: `/usr/bin/git` -> `git`.
fn base_command(token: &str) -> &str {
    token.rsplit('/').next().unwrap_or(token)
}
