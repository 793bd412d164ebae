use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use shellgate_runtime::{PermissionLevel, Tool, ToolSchemaInfo};
use std::sync::Arc;

use crate::file_ops::{Encoding, FileOps};
use crate::{required_str, success_payload};

pub struct ReadFileTool {
    ops: Arc<FileOps>,
}

impl ReadFileTool {
    pub fn new(ops: Arc<FileOps>) -> Self {
        Self { ops }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    async fn execute(&self, input: Value) -> Result<Value> {
        let path = required_str(&input, "path")?;
        let encoding = Encoding::parse(input["encoding"].as_str())?;

        let outcome = self.ops.read(path, encoding).await?;
        success_payload(&outcome)
    }

    fn name(&self) -> &str {
        "read_file"
    }

    fn schema(&self) -> ToolSchemaInfo {
        ToolSchemaInfo {
            name: "read_file".to_string(),
            description: "Read a file; non UTF-8 content is returned base64-encoded".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "File path relative to workspace" },
                    "encoding": { "type": "string", "enum": ["utf-8", "base64"], "description": "Force base64 to read raw bytes" }
                },
                "required": ["path"]
            }),
        }
    }

    fn permission_level(&self) -> PermissionLevel {
        PermissionLevel::Read
    }
}
