// OpenAI-compatible chat completions backend
//
// Works for OpenAI itself and any server exposing /v1/chat/completions
// (Ollama, vLLM, LM Studio, Groq, Mistral).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::types::{ProviderRequest, ProviderResponse};
use super::LlmBackend;
use crate::config::constants::{DEFAULT_OPENAI_MODEL, OPENAI_BASE_URL};
use crate::errors::{GenerationError, GenerationResult};

/// OpenAI-compatible backend
#[derive(Clone)]
pub struct OpenAIBackend {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
    timeout: Duration,
}

impl OpenAIBackend {
    /// Create a backend for api.openai.com
    pub fn new(api_key: String, timeout: Duration) -> GenerationResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::fatal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: OPENAI_BASE_URL.to_string(),
            default_model: DEFAULT_OPENAI_MODEL.to_string(),
            timeout,
        })
    }

    /// Set custom model for this backend
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Point at another OpenAI-compatible server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Convert ProviderRequest to OpenAI API format
    fn to_openai_request(&self, request: &ProviderRequest) -> OpenAIRequest {
        let model = if request.model.is_empty() {
            self.default_model.clone()
        } else {
            request.model.clone()
        };

        let mut messages = Vec::with_capacity(2);

        // System prompt goes first as a {"role":"system"} message
        if let Some(system) = &request.system {
            messages.push(OpenAIMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(OpenAIMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        OpenAIRequest {
            model,
            messages,
            max_tokens: Some(request.max_tokens),
            temperature: request.temperature,
            response_format: request.json_output.then(|| ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        }
    }

    /// Convert OpenAI response to ProviderResponse
    fn from_openai_response(&self, response: OpenAIResponse) -> GenerationResult<ProviderResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GenerationError::parse("OpenAI returned no choices in response"))?;

        let text = choice
            .message
            .content
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| GenerationError::parse("OpenAI returned an empty message"))?;

        Ok(ProviderResponse {
            text,
            model: response.model,
            stop_reason: choice.finish_reason,
            provider: "openai".to_string(),
        })
    }
}

#[async_trait]
impl LlmBackend for OpenAIBackend {
    async fn send_message(&self, request: &ProviderRequest) -> GenerationResult<ProviderResponse> {
        let openai_request = self.to_openai_request(request);
        let url = format!("{}/v1/chat/completions", self.base_url);

        tracing::debug!(
            model = %openai_request.model,
            prompt_chars = request.prompt.len(),
            "Sending request to OpenAI API"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| GenerationError::from_transport(&e, self.timeout))?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(GenerationError::from_status(status, &error_body));
        }

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::from_transport(&e, self.timeout))?;

        self.from_openai_response(openai_response)
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}

// OpenAI API types

#[derive(Debug, Clone, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Clone, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}
