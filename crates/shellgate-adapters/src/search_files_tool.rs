use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use shellgate_runtime::{PermissionLevel, Tool, ToolSchemaInfo};
use std::sync::Arc;

use crate::file_ops::FileOps;
use crate::{required_str, success_payload};

pub struct SearchFilesTool {
    ops: Arc<FileOps>,
}

impl SearchFilesTool {
    pub fn new(ops: Arc<FileOps>) -> Self {
        Self { ops }
    }
}

#[async_trait]
impl Tool for SearchFilesTool {
    async fn execute(&self, input: Value) -> Result<Value> {
        let pattern = required_str(&input, "pattern")?;
        let directory = input["directory"].as_str();
        let recursive = input["recursive"].as_bool().unwrap_or(true);

        let outcome = self.ops.search(pattern, directory, recursive).await?;
        success_payload(&outcome)
    }

    fn name(&self) -> &str {
        "search_files"
    }

    fn schema(&self) -> ToolSchemaInfo {
        ToolSchemaInfo {
            name: "search_files".to_string(),
            description: "Find files matching a glob pattern".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "pattern": { "type": "string", "description": "Glob such as *.rs" },
                    "directory": { "type": "string", "description": "Base directory (defaults to the workspace root)" },
                    "recursive": { "type": "boolean", "description": "Descend into subdirectories (default true)" }
                },
                "required": ["pattern"]
            }),
        }
    }

    fn permission_level(&self) -> PermissionLevel {
        PermissionLevel::Read
    }
}
