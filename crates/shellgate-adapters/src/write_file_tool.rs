use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use shellgate_runtime::{PermissionLevel, Tool, ToolSchemaInfo};
use std::sync::Arc;

use crate::file_ops::{Encoding, FileOps};
use crate::{required_str, success_payload};

pub struct WriteFileTool {
    ops: Arc<FileOps>,
}

impl WriteFileTool {
    pub fn new(ops: Arc<FileOps>) -> Self {
        Self { ops }
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    async fn execute(&self, input: Value) -> Result<Value> {
        let path = required_str(&input, "path")?;
        let content = required_str(&input, "content")?;
        let encoding = Encoding::parse(input["encoding"].as_str())?;

        let outcome = self.ops.write(path, content, encoding).await?;
        success_payload(&outcome)
    }

    fn name(&self) -> &str {
        "write_file"
    }

    fn schema(&self) -> ToolSchemaInfo {
        ToolSchemaInfo {
            name: "write_file".to_string(),
            description: "Write content to a file atomically, creating parent directories".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "File path relative to workspace" },
                    "content": { "type": "string", "description": "Content to write" },
                    "encoding": { "type": "string", "enum": ["utf-8", "base64"], "description": "base64 for binary content" }
                },
                "required": ["path", "content"]
            }),
        }
    }

    fn permission_level(&self) -> PermissionLevel {
        PermissionLevel::Write
    }
}
