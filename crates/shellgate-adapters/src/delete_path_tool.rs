use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use shellgate_runtime::{PermissionLevel, Tool, ToolSchemaInfo};
use std::sync::Arc;

use crate::file_ops::FileOps;
use crate::{required_str, success_payload};

pub struct DeletePathTool {
    ops: Arc<FileOps>,
}

impl DeletePathTool {
    pub fn new(ops: Arc<FileOps>) -> Self {
        Self { ops }
    }
}

#[async_trait]
impl Tool for DeletePathTool {
    async fn execute(&self, input: Value) -> Result<Value> {
        let path = required_str(&input, "path")?;
        let recursive = input["recursive"].as_bool().unwrap_or(false);

        let outcome = self.ops.delete(path, recursive).await?;
        success_payload(&outcome)
    }

    fn name(&self) -> &str {
        "delete_path"
    }

    fn schema(&self) -> ToolSchemaInfo {
        ToolSchemaInfo {
            name: "delete_path".to_string(),
            description: "Delete a file or directory inside the workspace".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "Path relative to workspace" },
                    "recursive": { "type": "boolean", "description": "Delete non-empty directories" }
                },
                "required": ["path"]
            }),
        }
    }

    fn permission_level(&self) -> PermissionLevel {
        PermissionLevel::Write
    }
}
