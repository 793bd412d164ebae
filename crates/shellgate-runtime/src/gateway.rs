use crate::{Tool, ToolError, ToolSchemaInfo};
use anyhow::{bail, Context, Result};
use dashmap::DashMap;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn, Instrument};
use uuid::Uuid;

/// Named-tool façade used by the conversation loop.
///
/// Every call is total: whatever happens, the caller gets a JSON object with
/// a `success` flag. Failures carry `error` and `error_kind`.
pub struct ToolGateway {
    tools: DashMap<String, Arc<dyn Tool>>,
}

impl ToolGateway {
    pub fn new() -> Self {
        Self {
            tools: DashMap::new(),
        }
    }

    /// Register a tool under its own name. Names must be unique.
    pub fn register_tool(&self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            bail!("Tool '{}' already registered", name);
        }
        info!(tool = %name, permission = ?tool.permission_level(), "Registered tool");
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Registered tool names, sorted
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Schemas of all registered tools, sorted by name
    pub fn schemas(&self) -> Vec<ToolSchemaInfo> {
        let mut schemas: Vec<ToolSchemaInfo> = self.tools.iter().map(|e| e.schema()).collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    /// Invoke a tool by name. Never fails; errors are reported in the result.
    pub async fn call(&self, name: &str, input: Value) -> Value {
        let call_id = Uuid::new_v4();
        let span = tracing::info_span!("tool_call", %call_id, tool = name);
        self.dispatch(name, input).instrument(span).await
    }

    async fn dispatch(&self, name: &str, input: Value) -> Value {
        // Clone out of the map so no shard lock is held across the await
        let Some(tool) = self.tools.get(name).map(|t| t.value().clone()) else {
            warn!("Unknown tool requested");
            return failure(&ToolError::InvalidInput(format!("unknown tool: {}", name)));
        };

        let input = if input.is_null() { json!({}) } else { input };
        if let Err(err) = validate_input(&tool.schema(), &input) {
            warn!(reason = %err, "Tool input rejected");
            return failure(&err);
        }

        let started = Instant::now();
        match tool.execute(input).await {
            Ok(result) => {
                info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    success = result["success"].as_bool().unwrap_or(true),
                    "Tool completed"
                );
                result
            }
            Err(err) => {
                let classified = ToolError::classify(&err);
                warn!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    kind = classified.kind(),
                    error = %classified,
                    "Tool failed"
                );
                failure(&classified)
            }
        }
    }

    /// Run plan JSON `{"steps": [{"tool": .., "input": ..}]}` sequentially.
    /// A failing step does not stop the plan; every step's result is returned.
    pub async fn run_plan(&self, plan: &Value) -> Result<Vec<Value>> {
        let steps = plan["steps"]
            .as_array()
            .context("Plan missing 'steps' array")?;

        let mut results = Vec::with_capacity(steps.len());
        for (i, step) in steps.iter().enumerate() {
            let tool_name = step["tool"]
                .as_str()
                .context(format!("Step {} missing 'tool' field", i))?;

            info!(step = i, tool = tool_name, "Executing plan step");
            let result = self.call(tool_name, step["input"].clone()).await;
            if result["success"] == json!(false) {
                warn!(step = i, tool = tool_name, "Plan step failed");
            }
            results.push(result);
        }

        Ok(results)
    }
}

impl Default for ToolGateway {
    fn default() -> Self {
        Self::new()
    }
}

/// Uniform failure object for a classified error.
pub fn failure(err: &ToolError) -> Value {
    json!({
        "success": false,
        "error": err.to_string(),
        "error_kind": err.kind(),
    })
}

/// Check the input is an object carrying every field the schema marks required.
fn validate_input(schema: &ToolSchemaInfo, input: &Value) -> Result<(), ToolError> {
    if !input.is_object() {
        return Err(ToolError::InvalidInput(format!(
            "input for tool '{}' must be an object",
            schema.name
        )));
    }

    let required = schema.parameters["required"].as_array();
    for field in required.into_iter().flatten().filter_map(Value::as_str) {
        if input.get(field).map_or(true, Value::is_null) {
            return Err(ToolError::InvalidInput(format!(
                "missing required field '{}' for tool '{}'",
                field, schema.name
            )));
        }
    }
    Ok(())
}
