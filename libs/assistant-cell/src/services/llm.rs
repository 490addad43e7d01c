//! Chat-completion client used by the conversation loop.
//!
//! Wire types stay private to this module; callers only see [`ModelReply`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::error::AssistantError;
use crate::models::ChatMessage;
use crate::services::dispatch::CapabilitySchema;

/// What the model decided to do with the latest turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelReply {
    Message(String),
    /// `arguments` is the raw JSON text produced by the model.
    Call { name: String, arguments: String },
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        capabilities: &[CapabilitySchema],
    ) -> Result<ModelReply, AssistantError>;
}

/// Client for `POST {base_url}/chat/completions` on OpenAI or any compatible server.
#[derive(Debug, Clone)]
pub struct OpenAiChatModel {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f32,
    api_key: Option<String>,
}

impl OpenAiChatModel {
    pub fn new(config: &AppConfig) -> Result<Self, AssistantError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.llm_timeout_seconds))
            .build()
            .map_err(|e| AssistantError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        let api_key = Some(config.openai_api_key.clone()).filter(|key| !key.is_empty());

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.openai_base_url.trim_end_matches('/')),
            model: config.openai_model.clone(),
            temperature: config.openai_temperature,
            api_key,
        })
    }
}

#[async_trait]
impl LanguageModel for OpenAiChatModel {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        capabilities: &[CapabilitySchema],
    ) -> Result<ModelReply, AssistantError> {
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages,
            tools: capabilities
                .iter()
                .map(|function| Tool { kind: "function", function })
                .collect(),
            tool_choice: "auto",
            temperature: self.temperature,
        };

        debug!(model = %self.model, messages = messages.len(), "sending chat completion request");

        let mut request = self.client.post(&self.endpoint).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            error!(url = %self.endpoint, error = %e, "chat completion request failed");
            AssistantError::Llm(e.to_string())
        })?;

        let response = check_status(response).await?;

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!(error = %e, "failed to decode chat completion response");
            AssistantError::Llm(format!("failed to parse response body: {}", e))
        })?;

        let message = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| AssistantError::Llm("response contained no choices".to_string()))?;

        message.into_reply()
    }
}

// ==============================================================================
// WIRE TYPES
// ==============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    tools: Vec<Tool<'a>>,
    tool_choice: &'static str,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Tool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: &'a CapabilitySchema,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
    // older models answer with a single function_call instead of tool_calls
    #[serde(default)]
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

impl ChoiceMessage {
    fn into_reply(self) -> Result<ModelReply, AssistantError> {
        let call = self
            .tool_calls
            .and_then(|calls| calls.into_iter().next())
            .map(|call| call.function)
            .or(self.function_call);

        if let Some(FunctionCall { name, arguments }) = call {
            debug!("model requested capability {}", name);
            return Ok(ModelReply::Call { name, arguments });
        }

        self.content
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .map(ModelReply::Message)
            .ok_or_else(|| AssistantError::Llm("empty or missing content in response".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, AssistantError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => format!("HTTP {}: {}", status, envelope.error.message),
        Err(_) => format!("HTTP {}: {}", status, body),
    };

    error!("chat completion returned an error: {}", message);
    Err(AssistantError::Llm(message))
}
