use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Capability a tool needs, used for audit logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    Read,
    Write,
    Execute,
}

/// Tool description handed to the orchestration layer
#[derive(Debug, Clone, Serialize)]
pub struct ToolSchemaInfo {
    pub name: String,
    pub description: String,
    /// JSON Schema of the parameters object
    pub parameters: Value,
}

/// Async Tool trait
/// Note: Uses async_trait for trait object compatibility with DashMap storage
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute tool with input, returns the success payload.
    /// Failures should be raised as [`crate::ToolError`] so the gateway can classify them.
    async fn execute(&self, input: Value) -> Result<Value>;

    /// Tool name for registration
    fn name(&self) -> &str;

    fn schema(&self) -> ToolSchemaInfo;

    fn permission_level(&self) -> PermissionLevel {
        PermissionLevel::Read
    }
}
