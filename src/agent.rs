//! One user turn, driven to a final answer
//!
//! A turn is at most two provider round-trips: the first offers the tools
//! and lets the model decide, the second (only when tools were called)
//! asks for a plain-text answer that can see every tool result.

#[cfg(test)]
pub mod testing;

use crate::config::Config;
use crate::history::{self, History};
use crate::llm::{
    ContentBlock, LlmError, LlmMessage, LlmRequest, LlmResponse, LlmService, LoggingService,
    MessageRole, OpenAIService, SystemContent,
};
use crate::readiness::provider_ready;
use crate::tools::ToolRegistry;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::Instrument;
use uuid::Uuid;

pub const SETUP_MESSAGE: &str =
    "(Setup needed) No API key visible to this process. Set OPENAI_API_KEY and re-run.";
pub const NO_RESPONSE: &str = "(no response)";
pub const TEMPERATURE: f32 = 0.3;

const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(60);

/// Why a turn ended without a model answer
#[derive(Error, Debug)]
pub enum TurnError {
    #[error("{}", SETUP_MESSAGE)]
    Setup,
    #[error("(Agent error) {}: {}", .0.kind, .0.message)]
    Provider(#[from] LlmError),
}

/// Outcome of a turn. `text` is always user-presentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReply {
    pub success: bool,
    pub text: String,
}

pub struct Agent {
    llm: Option<Arc<dyn LlmService>>,
    api_key: Option<String>,
    model: String,
    tools: ToolRegistry,
    system_prompt: String,
    provider_timeout: Duration,
}

impl Agent {
    pub fn new(
        llm: Arc<dyn LlmService>,
        api_key: Option<String>,
        tools: ToolRegistry,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            model: llm.model_id().to_string(),
            llm: Some(llm),
            api_key,
            tools,
            system_prompt: system_prompt.into(),
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    /// Agent backed by the OpenAI client. Without a key no client is built
    /// and every turn returns the setup message.
    pub fn from_config(
        config: &Config,
        tools: ToolRegistry,
        system_prompt: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let api_key = config.openai_api_key.as_deref().map(str::trim);
        let llm: Option<Arc<dyn LlmService>> = match api_key {
            Some(key) if !key.is_empty() => {
                let service = OpenAIService::new(
                    key.to_string(),
                    &config.model,
                    config.base_url.as_deref(),
                    config.provider_timeout,
                )?;
                Some(Arc::new(LoggingService::new(Arc::new(service))))
            }
            _ => None,
        };

        Ok(Self {
            llm,
            api_key: config.openai_api_key.clone(),
            model: config.model.clone(),
            tools,
            system_prompt: system_prompt.into(),
            provider_timeout: config.provider_timeout,
        })
    }

    #[must_use]
    pub fn with_provider_timeout(mut self, provider_timeout: Duration) -> Self {
        self.provider_timeout = provider_timeout;
        self
    }

    pub fn is_ready(&self) -> bool {
        self.llm.is_some() && provider_ready(self.api_key.as_deref())
    }

    pub fn model_id(&self) -> &str {
        &self.model
    }

    /// Run one turn. Never fails: errors come back as reply text.
    pub async fn run_turn(&self, user_text: &str, history: Option<&History>) -> AgentReply {
        let span = tracing::info_span!("turn", turn_id = %Uuid::new_v4(), model = %self.model);

        async {
            match self.try_turn(user_text, history).await {
                Ok(text) => AgentReply { success: true, text },
                Err(e) => {
                    match &e {
                        TurnError::Setup => tracing::warn!("Turn skipped, provider not configured"),
                        TurnError::Provider(err) => tracing::error!(
                            kind = %err.kind,
                            error = %err.message,
                            "Turn failed"
                        ),
                    }
                    AgentReply {
                        success: false,
                        text: e.to_string(),
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Final text of one turn
    pub async fn run_agent(&self, user_text: &str, history: Option<&History>) -> String {
        self.run_turn(user_text, history).await.text
    }

    async fn try_turn(&self, user_text: &str, history: Option<&History>) -> Result<String, TurnError> {
        let llm = match &self.llm {
            Some(llm) if provider_ready(self.api_key.as_deref()) => llm,
            _ => return Err(TurnError::Setup),
        };

        let mut messages = self.build_context(user_text, history);

        let first = self
            .complete(llm.as_ref(), messages.clone(), self.tools.definitions())
            .await?;

        let tool_uses = first.tool_uses();
        if tool_uses.is_empty() {
            return Ok(text_or_placeholder(&first));
        }

        tracing::info!(tool_calls = tool_uses.len(), "Executing tool calls");

        let mut results = Vec::with_capacity(tool_uses.len());
        for tool_use in &tool_uses {
            let output = self.tools.dispatch(tool_use.name, tool_use.input).await;
            results.push(ContentBlock::tool_result(
                tool_use.id,
                tool_use.name,
                output.output,
                !output.success,
            ));
        }

        messages.push(LlmMessage {
            role: MessageRole::Assistant,
            content: first.content.clone(),
        });
        messages.push(LlmMessage {
            role: MessageRole::User,
            content: results,
        });

        let second = self.complete(llm.as_ref(), messages, Vec::new()).await?;
        Ok(text_or_placeholder(&second))
    }

    fn build_context(&self, user_text: &str, history: Option<&History>) -> Vec<LlmMessage> {
        let mut messages = Vec::new();
        for pair in history::normalize(history) {
            if !pair.user.is_empty() {
                messages.push(LlmMessage::user(pair.user));
            }
            if !pair.assistant.is_empty() {
                messages.push(LlmMessage::assistant(pair.assistant));
            }
        }
        messages.push(LlmMessage::user(user_text));
        messages
    }

    async fn complete(
        &self,
        llm: &dyn LlmService,
        messages: Vec<LlmMessage>,
        tools: Vec<crate::llm::ToolDefinition>,
    ) -> Result<LlmResponse, LlmError> {
        let request = LlmRequest {
            system: vec![SystemContent::new(&self.system_prompt)],
            messages,
            tools,
            temperature: Some(TEMPERATURE),
        };

        match timeout(self.provider_timeout, llm.complete(&request)).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::timeout(format!(
                "Provider did not respond within {}s",
                self.provider_timeout.as_secs_f32()
            ))),
        }
    }
}

fn text_or_placeholder(response: &LlmResponse) -> String {
    let text = response.text();
    if text.is_empty() {
        NO_RESPONSE.to_string()
    } else {
        text
    }
}
