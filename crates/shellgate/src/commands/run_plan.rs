use anyhow::{Context, Result};
use serde_json::json;
use shellgate_runtime::SandboxConfig;
use std::path::PathBuf;
use tracing::info;

/// Run every plan step and print the collected results. Returns whether all
/// steps succeeded.
pub async fn execute(plan_file: PathBuf, config: &SandboxConfig) -> Result<bool> {
    info!(?plan_file, dry_run = config.dry_run, "Running plan");

    let plan_content = std::fs::read_to_string(&plan_file)
        .context(format!("Failed to read plan file: {:?}", plan_file))?;

    let plan: serde_json::Value =
        serde_json::from_str(&plan_content).context("Failed to parse plan JSON")?;

    let gateway =
        shellgate_adapters::build_gateway(config).context("Failed to build tool gateway")?;
    let results = gateway.run_plan(&plan).await?;

    let failed = results
        .iter()
        .filter(|r| !r["success"].as_bool().unwrap_or(false))
        .count();
    info!(steps = results.len(), failed, "Plan execution completed");

    let report = json!({
        "id": plan.get("id").cloned().unwrap_or_default(),
        "success": failed == 0,
        "results": results,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(failed == 0)
}
