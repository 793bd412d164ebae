use anyhow::{Context, Result};
use shellgate_runtime::SandboxConfig;

pub fn execute(config: &SandboxConfig) -> Result<()> {
    let gateway =
        shellgate_adapters::build_gateway(config).context("Failed to build tool gateway")?;
    println!("{}", serde_json::to_string_pretty(&gateway.schemas())?);
    Ok(())
}
