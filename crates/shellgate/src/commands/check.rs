use anyhow::Result;
use shellgate_runtime::{CommandGuard, SandboxConfig};
use tracing::info;

/// Print the command guard verdict. Returns whether the command is allowed.
pub fn execute(command: &str, config: &SandboxConfig) -> Result<bool> {
    let guard = CommandGuard::from_config(config);
    let (safe, reason) = guard.is_safe(command);
    info!(safe, %reason, "Checked command");

    if safe {
        println!("allowed");
    } else {
        println!("denied: {}", reason);
    }
    Ok(safe)
}
