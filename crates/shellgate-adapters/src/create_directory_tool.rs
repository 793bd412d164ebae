use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use shellgate_runtime::{PermissionLevel, Tool, ToolSchemaInfo};
use std::sync::Arc;

use crate::file_ops::FileOps;
use crate::{required_str, success_payload};

pub struct CreateDirectoryTool {
    ops: Arc<FileOps>,
}

impl CreateDirectoryTool {
    pub fn new(ops: Arc<FileOps>) -> Self {
        Self { ops }
    }
}

#[async_trait]
impl Tool for CreateDirectoryTool {
    async fn execute(&self, input: Value) -> Result<Value> {
        let path = required_str(&input, "path")?;
        let outcome = self.ops.create_dir(path).await?;
        success_payload(&outcome)
    }

    fn name(&self) -> &str {
        "create_directory"
    }

    fn schema(&self) -> ToolSchemaInfo {
        ToolSchemaInfo {
            name: "create_directory".to_string(),
            description: "Create a directory and any missing parents".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "Directory path relative to workspace" }
                },
                "required": ["path"]
            }),
        }
    }

    fn permission_level(&self) -> PermissionLevel {
        PermissionLevel::Write
    }
}
