//! Unanswered-question logging tool

use super::{Tool, ToolError, ToolOutput};
use crate::sanitize::{clean, QUESTION_MAX_CHARS};
use crate::store::{utc_timestamp, FeedbackEntry, FeedbackWrite, LogStore};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub const EMPTY_QUESTION: &str = "Feedback requires a non-empty question.";
pub const FEEDBACK_RECORDED: &str = "Feedback recorded.";

/// Logs a question the business knowledge cannot answer
pub struct RecordFeedbackTool {
    store: Arc<LogStore>,
}

impl RecordFeedbackTool {
    pub fn new(store: Arc<LogStore>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FeedbackInput {
    #[serde(deserialize_with = "super::nullable_string")]
    question: Option<String>,
}

#[async_trait]
impl Tool for RecordFeedbackTool {
    fn name(&self) -> &'static str {
        "record_feedback"
    }

    fn description(&self) -> String {
        "Log a question we cannot answer with the current business context.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "question": {
                    "type": "string",
                    "description": "Exact user question we couldn't answer"
                }
            },
            "required": ["question"],
            "additionalProperties": false
        })
    }

    async fn run(&self, input: Value) -> Result<ToolOutput, ToolError> {
        let input: FeedbackInput = serde_json::from_value(input)?;

        let question = clean(input.question.as_deref().unwrap_or_default(), QUESTION_MAX_CHARS);
        if question.is_empty() {
            return Ok(ToolOutput::error(EMPTY_QUESTION));
        }

        let entry = FeedbackEntry {
            timestamp: utc_timestamp(),
            question,
        };

        let store = Arc::clone(&self.store);
        let written = tokio::task::spawn_blocking(move || store.record_feedback(&entry))
            .await
            .map_err(|e| ToolError::Failed(e.to_string()))?;

        // Storage failures are still a normal result for the model to relay
        Ok(match written {
            Ok(FeedbackWrite::Primary(_)) => ToolOutput::success(FEEDBACK_RECORDED),
            Ok(FeedbackWrite::Fallback(path)) => ToolOutput::success(format!(
                "Feedback recorded (fallback path used: {})",
                path.display()
            )),
            Err(e) => ToolOutput::error(format!("Failed to record feedback: {e}")),
        })
    }
}
