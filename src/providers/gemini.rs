// Google Gemini API backend
//
// Uses generateContent with a system instruction and, when JSON output is
// requested, responseMimeType "application/json".

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::types::{ProviderRequest, ProviderResponse};
use super::LlmBackend;
use crate::config::constants::{DEFAULT_GEMINI_MODEL, GEMINI_BASE_URL};
use crate::errors::{GenerationError, GenerationResult};

/// Google Gemini API backend
#[derive(Clone)]
pub struct GeminiBackend {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
    timeout: Duration,
}

impl GeminiBackend {
    /// Create a new Gemini backend; `timeout` bounds each HTTP request
    pub fn new(api_key: String, timeout: Duration) -> GenerationResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::fatal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
            default_model: DEFAULT_GEMINI_MODEL.to_string(),
            timeout,
        })
    }

    /// Create with custom default model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Point at another endpoint (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Convert ProviderRequest to Gemini API format
    fn to_gemini_request(&self, request: &ProviderRequest) -> GeminiRequest {
        let model = if request.model.is_empty() {
            self.default_model.clone()
        } else {
            request.model.clone()
        };

        let system_instruction = request.system.as_ref().map(|system| GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: system.clone(),
            }],
        });

        let generation_config = GeminiGenerationConfig {
            temperature: request.temperature,
            max_output_tokens: Some(request.max_tokens as i32),
            response_mime_type: request
                .json_output
                .then(|| "application/json".to_string()),
        };

        GeminiRequest {
            model,
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: request.prompt.clone(),
                }],
            }],
            system_instruction,
            generation_config: Some(generation_config),
        }
    }

    /// Convert Gemini response to ProviderResponse
    fn from_gemini_response(
        &self,
        response: GeminiResponse,
        model: String,
    ) -> GenerationResult<ProviderResponse> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| GenerationError::parse("Gemini returned no candidates in response"))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerationError::parse(format!(
                "Gemini returned an empty answer (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(ProviderResponse {
            text,
            model,
            stop_reason: candidate.finish_reason,
            provider: "gemini".to_string(),
        })
    }
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    async fn send_message(&self, request: &ProviderRequest) -> GenerationResult<ProviderResponse> {
        let gemini_request = self.to_gemini_request(request);
        let model = gemini_request.model.clone();

        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        tracing::debug!(
            model = %model,
            prompt_chars = request.prompt.len(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .header("content-type", "application/json")
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| GenerationError::from_transport(&e, self.timeout))?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(GenerationError::from_status(status, &error_body));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::from_transport(&e, self.timeout))?;

        self.from_gemini_response(gemini_response, model)
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}

// Gemini API types

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip)]
    model: String, // Used in URL, not in body
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>, // "user" or "model"
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}
