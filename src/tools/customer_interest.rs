//! Lead capture tool

use super::{Tool, ToolError, ToolOutput};
use crate::sanitize::{clean, is_valid_email, EMAIL_MAX_CHARS, MESSAGE_MAX_CHARS, NAME_MAX_CHARS};
use crate::store::{utc_timestamp, Lead, LogStore};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub const DEFAULT_MESSAGE: &str = "General inquiry";
pub const INVALID_EMAIL: &str = "Invalid email address.";
pub const MISSING_NAME: &str = "Please provide a name.";
pub const LEAD_SAVED: &str = "Lead saved.";

/// Saves a potential customer's contact details for follow-up
pub struct RecordCustomerInterestTool {
    store: Arc<LogStore>,
}

impl RecordCustomerInterestTool {
    pub fn new(store: Arc<LogStore>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CustomerInterestInput {
    #[serde(deserialize_with = "super::nullable_string")]
    email: Option<String>,
    #[serde(deserialize_with = "super::nullable_string")]
    name: Option<String>,
    #[serde(deserialize_with = "super::nullable_string")]
    message: Option<String>,
}

#[async_trait]
impl Tool for RecordCustomerInterestTool {
    fn name(&self) -> &'static str {
        "record_customer_interest"
    }

    fn description(&self) -> String {
        "Save a potential customer's contact to follow up.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "email": {"type": "string", "description": "Customer email"},
                "name": {"type": "string", "description": "Customer full name"},
                "message": {"type": "string", "description": "Short summary of request"}
            },
            "required": ["email", "name", "message"],
            "additionalProperties": false
        })
    }

    async fn run(&self, input: Value) -> Result<ToolOutput, ToolError> {
        let input: CustomerInterestInput = serde_json::from_value(input)?;

        let email = clean(input.email.as_deref().unwrap_or_default(), EMAIL_MAX_CHARS).to_lowercase();
        let name = clean(input.name.as_deref().unwrap_or_default(), NAME_MAX_CHARS);
        let message = match clean(input.message.as_deref().unwrap_or_default(), MESSAGE_MAX_CHARS) {
            m if m.is_empty() => DEFAULT_MESSAGE.to_string(),
            m => m,
        };

        if !is_valid_email(&email) {
            return Ok(ToolOutput::error(INVALID_EMAIL));
        }
        if name.is_empty() {
            return Ok(ToolOutput::error(MISSING_NAME));
        }

        let lead = Lead {
            timestamp: utc_timestamp(),
            email,
            name,
            message,
        };

        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.record_lead(&lead))
            .await
            .map_err(|e| ToolError::Failed(e.to_string()))?
            .map_err(|e| ToolError::Failed(e.to_string()))?;

        Ok(ToolOutput::success(LEAD_SAVED))
    }
}
