use super::print_result;
use anyhow::{Context, Result};
use serde_json::Value;
use shellgate_runtime::SandboxConfig;

pub async fn execute(tool: String, params: String, config: &SandboxConfig) -> Result<bool> {
    let input: Value = serde_json::from_str(&params).context("Failed to parse --params JSON")?;
    if !input.is_object() {
        anyhow::bail!("--params must be a JSON object");
    }

    let gateway =
        shellgate_adapters::build_gateway(config).context("Failed to build tool gateway")?;
    let result = gateway.call(&tool, input).await;

    print_result(&result)
}
