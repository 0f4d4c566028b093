//! Tools the provider may call, and the dispatcher that runs them
//!
//! Dispatch never fails: unknown tools, malformed arguments and handler
//! errors all come back as a `ToolOutput` whose text is shown to the model.

mod customer_interest;
mod feedback;

pub use customer_interest::RecordCustomerInterestTool;
pub use feedback::RecordFeedbackTool;

use crate::llm::ToolDefinition;
use crate::store::LogStore;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

/// Result from tool execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub success: bool,
    pub output: String,
}

impl ToolOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: message.into(),
        }
    }
}

/// Failures a tool reports to the dispatcher, which renders them as text
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    InvalidArguments(#[from] serde_json::Error),
    #[error("{0}")]
    Failed(String),
}

/// Trait for tools that can be executed by the agent
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name
    fn name(&self) -> &str;

    /// Tool description for LLM
    fn description(&self) -> String;

    /// JSON schema for tool input
    fn input_schema(&self) -> Value;

    /// Execute the tool. `input` is always a JSON object.
    async fn run(&self, input: Value) -> Result<ToolOutput, ToolError>;
}

/// Collection of tools available to the agent
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Lead capture and feedback logging, both writing to `store`
    pub fn new(store: Arc<LogStore>) -> Self {
        let tools: Vec<Arc<dyn Tool>> = vec![
            Arc::new(RecordCustomerInterestTool::new(Arc::clone(&store))),
            Arc::new(RecordFeedbackTool::new(store)),
        ];
        Self { tools }
    }

    /// Get all tool definitions for LLM
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    /// Run the named tool against raw provider arguments
    pub async fn dispatch(&self, name: &str, raw_args: &Value) -> ToolOutput {
        let Some(tool) = self.tools.iter().find(|t| t.name() == name) else {
            tracing::warn!(tool = %name, "Unknown tool requested");
            return ToolOutput::error(format!("Unknown tool: {name}"));
        };

        let args = normalize_arguments(name, raw_args);

        let output = match tool.run(Value::Object(args)).await {
            Ok(output) => output,
            Err(ToolError::InvalidArguments(e)) => {
                ToolOutput::error(format!("Tool '{name}' argument error: {e}"))
            }
            Err(ToolError::Failed(e)) => ToolOutput::error(format!("Tool '{name}' failed: {e}")),
        };

        tracing::info!(
            tool = %name,
            success = output.success,
            result = %output.output,
            "Tool executed"
        );
        output
    }
}

/// Required string argument that may be sent as `null`.
///
/// Using `deserialize_with` keeps the key mandatory, unlike a plain
/// `Option` field which serde fills with `None` when absent.
fn nullable_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
}

/// Coerce a provider argument payload into an object.
///
/// Text is parsed as JSON; anything that does not yield an object becomes
/// an empty map.
pub fn normalize_arguments(tool: &str, raw: &Value) -> Map<String, Value> {
    match raw {
        Value::Object(map) => map.clone(),
        Value::String(text) if text.trim().is_empty() => Map::new(),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                tracing::warn!(tool = %tool, "Tool arguments are not an object, using empty map");
                Map::new()
            }
            Err(e) => {
                tracing::warn!(tool = %tool, error = %e, "Unparseable tool arguments, using empty map");
                Map::new()
            }
        },
        _ => Map::new(),
    }
}
