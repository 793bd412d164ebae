use super::print_result;
use anyhow::{Context, Result};
use serde_json::json;
use shellgate_runtime::SandboxConfig;
use tracing::info;

pub async fn execute(
    command: String,
    cwd: Option<String>,
    timeout: Option<f64>,
    config: &SandboxConfig,
) -> Result<bool> {
    let gateway =
        shellgate_adapters::build_gateway(config).context("Failed to build tool gateway")?;

    info!(dry_run = config.dry_run, "Executing command");
    let result = gateway
        .call(
            "shell",
            json!({
                "command": command,
                "working_dir": cwd,
                "timeout_seconds": timeout,
            }),
        )
        .await;

    print_result(&result)
}
