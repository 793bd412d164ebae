pub mod create_directory_tool;
pub mod delete_path_tool;
pub mod executor;
pub mod file_info_tool;
pub mod file_ops;
pub mod list_directory_tool;
pub mod read_file_tool;
pub mod search_files_tool;
pub mod shell_tool;
pub mod write_file_tool;

pub use create_directory_tool::CreateDirectoryTool;
pub use delete_path_tool::DeletePathTool;
pub use executor::{ExecutionResult, Executor};
pub use file_info_tool::FileInfoTool;
pub use file_ops::{Encoding, FileOps};
pub use list_directory_tool::ListDirectoryTool;
pub use read_file_tool::ReadFileTool;
pub use search_files_tool::SearchFilesTool;
pub use shell_tool::ShellTool;
pub use write_file_tool::WriteFileTool;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{json, Value};
use shellgate_runtime::{PathGuard, SandboxConfig, ToolError, ToolGateway};
use std::sync::Arc;
use tracing::info;

/// Register the shell tool on the gateway.
pub fn register_shell_tool(
    gateway: &ToolGateway,
    config: &SandboxConfig,
    guard: Arc<PathGuard>,
) -> Result<()> {
    let executor = Executor::from_config(config, guard);
    gateway.register_tool(Arc::new(ShellTool::new(Arc::new(executor))))
}

/// Register all filesystem tools on the gateway, sharing one [`FileOps`].
pub fn register_filesystem_tools(
    gateway: &ToolGateway,
    config: &SandboxConfig,
    guard: Arc<PathGuard>,
) -> Result<()> {
    let ops = Arc::new(FileOps::new(guard, config.max_file_size_bytes()));
    gateway.register_tool(Arc::new(ReadFileTool::new(ops.clone())))?;
    gateway.register_tool(Arc::new(WriteFileTool::new(ops.clone())))?;
    gateway.register_tool(Arc::new(ListDirectoryTool::new(ops.clone())))?;
    gateway.register_tool(Arc::new(FileInfoTool::new(ops.clone())))?;
    gateway.register_tool(Arc::new(CreateDirectoryTool::new(ops.clone())))?;
    gateway.register_tool(Arc::new(DeletePathTool::new(ops.clone())))?;
    gateway.register_tool(Arc::new(SearchFilesTool::new(ops)))?;
    Ok(())
}

/// Build a gateway with every tool registered. Fails only if the workspace
/// root cannot be prepared.
pub fn build_gateway(config: &SandboxConfig) -> Result<ToolGateway> {
    let guard = Arc::new(PathGuard::from_config(config).context("Failed to prepare workspace")?);
    info!(
        workspace = %guard.root().display(),
        dry_run = config.dry_run,
        "Tool gateway initialized"
    );

    let gateway = ToolGateway::new();
    register_shell_tool(&gateway, config, guard.clone())?;
    register_filesystem_tools(&gateway, config, guard)?;
    Ok(gateway)
}

pub(crate) fn required_str<'a>(input: &'a Value, field: &str) -> Result<&'a str, ToolError> {
    input[field]
        .as_str()
        .ok_or_else(|| ToolError::InvalidInput(format!("Missing required field '{}'", field)))
}

/// Serialize an outcome and mark it successful.
pub(crate) fn success_payload<T: Serialize>(outcome: &T) -> Result<Value> {
    let mut value = serde_json::to_value(outcome).context("Failed to serialize tool result")?;
    match value.as_object_mut() {
        Some(map) => {
            map.insert("success".to_string(), json!(true));
            Ok(value)
        }
        None => Ok(json!({ "success": true, "result": value })),
    }
}
