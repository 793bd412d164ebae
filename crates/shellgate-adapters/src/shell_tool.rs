use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use shellgate_runtime::{PermissionLevel, Tool, ToolError, ToolSchemaInfo};
use std::sync::Arc;
use std::time::Duration;

use crate::executor::Executor;

/// `shell` tool: validates then runs a command through the [`Executor`].
pub struct ShellTool {
    executor: Arc<Executor>,
}

impl ShellTool {
    pub fn new(executor: Arc<Executor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl Tool for ShellTool {
    async fn execute(&self, input: Value) -> Result<Value> {
        let command = input["command"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidInput("Input missing 'command' field".into()))?;
        let working_dir = input["working_dir"].as_str();
        let timeout = parse_timeout(&input["timeout_seconds"])?;

        let result = self.executor.execute(command, working_dir, timeout).await;
        serde_json::to_value(result).context("Failed to serialize execution result")
    }

    fn name(&self) -> &str {
        "shell"
    }

    fn schema(&self) -> ToolSchemaInfo {
        ToolSchemaInfo {
            name: "shell".to_string(),
            description: "Execute an allow-listed shell command inside the workspace".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "command": {
                        "type": "string",
                        "description": "Shell command to execute"
                    },
                    "working_dir": {
                        "type": "string",
                        "description": "Working directory (defaults to the workspace root)"
                    },
                    "timeout_seconds": {
                        "type": "number",
                        "description": "Wall-clock limit in seconds"
                    }
                },
                "required": ["command"]
            }),
        }
    }

    fn permission_level(&self) -> PermissionLevel {
        PermissionLevel::Execute
    }
}

/// Absent or null means "use the default"; anything else must be a positive number.
fn parse_timeout(value: &Value) -> Result<Option<Duration>, ToolError> {
    if value.is_null() {
        return Ok(None);
    }
    value
        .as_f64()
        .filter(|secs| *secs > 0.0)
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .map(Some)
        .ok_or_else(|| {
            ToolError::InvalidInput(format!(
                "'timeout_seconds' must be a positive number, got {}",
                value
            ))
        })
}
