use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use shellgate_runtime::{PermissionLevel, Tool, ToolSchemaInfo};
use std::sync::Arc;

use crate::file_ops::FileOps;
use crate::success_payload;

pub struct ListDirectoryTool {
    ops: Arc<FileOps>,
}

impl ListDirectoryTool {
    pub fn new(ops: Arc<FileOps>) -> Self {
        Self { ops }
    }
}

#[async_trait]
impl Tool for ListDirectoryTool {
    async fn execute(&self, input: Value) -> Result<Value> {
        let outcome = self.ops.list(input["path"].as_str()).await?;
        success_payload(&outcome)
    }

    fn name(&self) -> &str {
        "list_directory"
    }

    fn schema(&self) -> ToolSchemaInfo {
        ToolSchemaInfo {
            name: "list_directory".to_string(),
            description: "List a directory, directories first".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "Directory (defaults to the workspace root)" }
                },
                "required": []
            }),
        }
    }

    fn permission_level(&self) -> PermissionLevel {
        PermissionLevel::Read
    }
}
