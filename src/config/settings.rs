// Configuration structs

use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::constants::*;

/// Which LLM backend serves generation requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Gemini,
    Openai,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::Openai => "openai",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "openai" => Ok(ProviderKind::Openai),
            other => bail!("Unknown provider '{}' (expected 'gemini' or 'openai')", other),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub refinement: RefinementConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8000")
    pub bind_address: String,
    /// Origins allowed by CORS
    pub cors_origins: Vec<String>,
    /// Maximum request body size in bytes
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_HTTP_ADDR.to_string(),
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

/// Generation backend settings
#[derive(Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// Missing key is allowed at startup; generation then fails with NotConfigured
    pub api_key: Option<String>,
    /// Overrides the backend's default model
    pub model: Option<String>,
    /// Overrides the backend's API endpoint
    pub base_url: Option<String>,
}

impl ProviderConfig {
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().map_or(false, |k| !k.trim().is_empty())
    }

    /// Model that will actually be used
    pub fn effective_model(&self) -> &str {
        match (&self.model, self.kind) {
            (Some(m), _) if !m.trim().is_empty() => m,
            (_, ProviderKind::Gemini) => DEFAULT_GEMINI_MODEL,
            (_, ProviderKind::Openai) => DEFAULT_OPENAI_MODEL,
        }
    }
}

// Keep the key out of logs
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Refinement controller and validation gate settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefinementConfig {
    /// Maximum critique/regenerate cycles for test cases (>= 1)
    pub iteration_cap: u32,
    /// Upper bound for one provider call
    pub call_timeout_secs: u64,
    /// Retries after the first attempt, transient failures only
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub max_tokens: u32,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            iteration_cap: DEFAULT_ITERATION_CAP,
            call_timeout_secs: DEFAULT_CALL_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl RefinementConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

impl Config {
    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.bind_address.trim().is_empty() {
            bail!("server.bind_address must not be empty");
        }
        if self.server.body_limit_bytes == 0 {
            bail!("server.body_limit_bytes must be greater than 0");
        }
        if self.refinement.iteration_cap == 0 {
            bail!("refinement.iteration_cap must be at least 1");
        }
        if self.refinement.call_timeout_secs == 0 {
            bail!("refinement.call_timeout_secs must be greater than 0");
        }
        if self.refinement.max_tokens == 0 {
            bail!("refinement.max_tokens must be greater than 0");
        }
        if let Some(url) = &self.provider.base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                bail!("provider.base_url must start with http:// or https:// (got '{}')", url);
            }
        }
        Ok(())
    }
}
