pub mod call;
pub mod check;
pub mod exec;
pub mod init;
pub mod run_plan;
pub mod tools;

use anyhow::Result;
use serde_json::Value;

/// Print a JSON value to stdout and report whether it marks success.
pub(crate) fn print_result(value: &Value) -> Result<bool> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(value["success"].as_bool().unwrap_or(false))
}
