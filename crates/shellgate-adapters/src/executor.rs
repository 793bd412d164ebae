use serde::{Deserialize, Serialize};
use shellgate_runtime::{Access, CommandGuard, PathGuard, SandboxConfig, Verdict};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{info, warn};

/// Prepended to the inherited PATH of every spawned command
pub const SYSTEM_SEARCH_PATH: &str = "/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin";

/// Longest command prefix written to the audit log
const LOGGED_COMMAND_CHARS: usize = 100;

/// Outcome of one shell invocation. Every failure mode lands here; the
/// executor never returns an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    /// Process exit code; 1 for policy rejections, -1 for timeouts,
    /// spawn failures and signal termination
    pub exit_code: i32,
    pub duration_seconds: f64,
    pub working_dir: PathBuf,
}

impl ExecutionResult {
    fn failed(exit_code: i32, stderr: String, started: Instant, working_dir: PathBuf) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr,
            exit_code,
            duration_seconds: started.elapsed().as_secs_f64(),
            working_dir,
        }
    }
}

/// Runs approved commands through `sh -c` with a bounded working directory
/// and wall-clock timeout.
pub struct Executor {
    commands: Arc<CommandGuard>,
    paths: Arc<PathGuard>,
    default_timeout: Duration,
    max_timeout: Duration,
    dry_run: bool,
}

impl Executor {
    pub fn new(commands: Arc<CommandGuard>, paths: Arc<PathGuard>, default_timeout: Duration) -> Self {
        Self {
            commands,
            paths,
            default_timeout,
            max_timeout: default_timeout.max(Duration::from_secs(600)),
            dry_run: false,
        }
    }

    pub fn from_config(config: &SandboxConfig, paths: Arc<PathGuard>) -> Self {
        Self::new(
            Arc::new(CommandGuard::from_config(config)),
            paths,
            Duration::from_secs(config.default_timeout_secs),
        )
        .with_max_timeout(Duration::from_secs(config.max_timeout_secs))
        .with_dry_run(config.dry_run)
    }

    /// Cap applied to caller-supplied timeouts
    pub fn with_max_timeout(mut self, max_timeout: Duration) -> Self {
        self.max_timeout = max_timeout;
        self
    }

    /// In dry-run mode approved commands are logged but never spawned
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn command_guard(&self) -> &CommandGuard {
        &self.commands
    }

    /// Timeout actually applied for a request
    pub fn effective_timeout(&self, requested: Option<Duration>) -> Duration {
        requested
            .unwrap_or(self.default_timeout)
            .min(self.max_timeout)
    }

    /// Validate and run `command`. Total: rejections, spawn errors and
    /// timeouts are all reported in the returned result.
    pub async fn execute(
        &self,
        command: &str,
        working_dir: Option<&str>,
        timeout: Option<Duration>,
    ) -> ExecutionResult {
        let started = Instant::now();
        let logged: String = command.chars().take(LOGGED_COMMAND_CHARS).collect();

        if let Verdict::Deny(reason) = self.commands.check(command) {
            warn!(cmd = %logged, reason = %reason, "Command rejected");
            return ExecutionResult::failed(
                1,
                format!("Security violation: {}", reason),
                started,
                self.paths.root().to_path_buf(),
            );
        }

        let cwd = match working_dir {
            None => self.paths.root().to_path_buf(),
            Some(dir) => match self.paths.authorize(dir, Access::Write) {
                Ok(resolved) => resolved,
                Err(err) => {
                    return ExecutionResult::failed(
                        1,
                        format!("Invalid working directory: {}", err),
                        started,
                        self.paths.root().to_path_buf(),
                    );
                }
            },
        };

        if let Err(e) = tokio::fs::create_dir_all(&cwd).await {
            return ExecutionResult::failed(
                -1,
                format!("Execution error: failed to create working directory: {}", e),
                started,
                cwd,
            );
        }

        if self.dry_run {
            warn!(cmd = %logged, "SANDBOX MODE - command not executed");
            return ExecutionResult {
                success: true,
                stdout: "[dry-run]".to_string(),
                stderr: String::new(),
                exit_code: 0,
                duration_seconds: started.elapsed().as_secs_f64(),
                working_dir: cwd,
            };
        }

        let timeout = self.effective_timeout(timeout);

        // Audit log: record exact command being executed
        info!(cmd = %logged, cwd = %cwd.display(), timeout_secs = timeout.as_secs_f64(), "Executing shell command");

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .current_dir(&cwd)
            .env("PATH", search_path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own process group so a timeout can take down every descendant
        #[cfg(unix)]
        cmd.process_group(0);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(cmd = %logged, error = %e, "Command spawn failed");
                return ExecutionResult::failed(
                    -1,
                    format!("Execution error: {}", e),
                    started,
                    cwd,
                );
            }
        };
        let pid = child.id();

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let exit_code = output.status.code().unwrap_or(-1);
                let duration_seconds = started.elapsed().as_secs_f64();
                info!(cmd = %logged, exit_code, duration_seconds, "Command finished");
                ExecutionResult {
                    success: exit_code == 0,
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    exit_code,
                    duration_seconds,
                    working_dir: cwd,
                }
            }
            Ok(Err(e)) => {
                warn!(cmd = %logged, error = %e, "Command wait failed");
                ExecutionResult::failed(-1, format!("Execution error: {}", e), started, cwd)
            }
            Err(_) => {
                // The dropped wait future already killed `sh`; reap the rest of the group
                if let Some(pid) = pid {
                    kill_process_group(pid);
                }
                warn!(cmd = %logged, timeout_secs = timeout.as_secs_f64(), "Command timed out");
                ExecutionResult::failed(
                    -1,
                    format!("Command timed out after {} seconds", format_secs(timeout)),
                    started,
                    cwd,
                )
            }
        }
    }
}

fn search_path() -> String {
    match std::env::var("PATH") {
        Ok(inherited) if !inherited.is_empty() => format!("{}:{}", SYSTEM_SEARCH_PATH, inherited),
        _ => SYSTEM_SEARCH_PATH.to_string(),
    }
}

/// `30` for whole seconds, `0.5` otherwise.
fn format_secs(duration: Duration) -> String {
    if duration.subsec_nanos() == 0 {
        duration.as_secs().to_string()
    } else {
        format!("{}", duration.as_secs_f64())
    }
}

/// Kill a process group (best-effort).
#[cfg(unix)]
fn kill_process_group(pgid: u32) {
    // SAFETY: killpg only sends a signal; an already-gone group yields ESRCH.
    let result = unsafe { libc::killpg(pgid as libc::pid_t, libc::SIGKILL) };
    if result == -1 {
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ESRCH) {
            warn!(pgid, error = %err, "Failed to kill process group");
        }
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pgid: u32) {}
