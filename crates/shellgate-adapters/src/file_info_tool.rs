use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use shellgate_runtime::{PermissionLevel, Tool, ToolSchemaInfo};
use std::sync::Arc;

use crate::file_ops::FileOps;
use crate::{required_str, success_payload};

pub struct FileInfoTool {
    ops: Arc<FileOps>,
}

impl FileInfoTool {
    pub fn new(ops: Arc<FileOps>) -> Self {
        Self { ops }
    }
}

#[async_trait]
impl Tool for FileInfoTool {
    async fn execute(&self, input: Value) -> Result<Value> {
        let path = required_str(&input, "path")?;
        let info = self.ops.info(path).await?;
        success_payload(&info)
    }

    fn name(&self) -> &str {
        "get_file_info"
    }

    fn schema(&self) -> ToolSchemaInfo {
        ToolSchemaInfo {
            name: "get_file_info".to_string(),
            description: "Stat a file or directory".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "Path relative to workspace" }
                },
                "required": ["path"]
            }),
        }
    }

    fn permission_level(&self) -> PermissionLevel {
        PermissionLevel::Read
    }
}
