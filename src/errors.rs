// Error taxonomy for generation and refinement
//
// Everything that can go wrong between a client request and the generation
// provider ends up as one of these variants. The refinement controller never
// lets anything else escape.

use std::time::Duration;
use thiserror::Error;

/// Result alias for provider and controller operations
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Failures surfaced at the refinement controller boundary
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GenerationError {
    /// Provider output could not be mapped onto the expected schema
    #[error("Generation produced unusable output: {0}")]
    ParseFailure(String),

    /// Provider or network failure
    #[error("Generation provider request failed: {message}")]
    Provider { message: String, transient: bool },

    /// A single provider call exceeded the configured timeout
    #[error("Generation provider did not answer within {0:?}")]
    ProviderTimeout(Duration),

    /// Refine was called with blank feedback
    #[error("Feedback is required to refine an artifact")]
    EmptyFeedback,

    /// Request did not carry the source material the artifact kind needs
    #[error("Invalid generation input: {0}")]
    InvalidInput(String),

    /// No provider credentials were configured
    #[error("Generation provider is not configured: {0}")]
    NotConfigured(String),
}

impl GenerationError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseFailure(message.into())
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
            transient: true,
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
            transient: false,
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Whether another attempt could plausibly succeed.
    ///
    /// Parse failures and client-input errors are deterministic and are
    /// never retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Provider {
                transient: true,
                ..
            } | Self::ProviderTimeout(_)
        )
    }

    /// Stable machine-readable code, used in HTTP error bodies
    pub fn code(&self) -> &'static str {
        match self {
            Self::ParseFailure(_) => "parse_failure",
            Self::Provider { .. } => "provider_error",
            Self::ProviderTimeout(_) => "provider_timeout",
            Self::EmptyFeedback => "empty_feedback",
            Self::InvalidInput(_) => "invalid_input",
            Self::NotConfigured(_) => "not_configured",
        }
    }

    /// Classify an HTTP status returned by a provider API.
    ///
    /// Rate limiting and server-side failures are transient; everything
    /// else (bad key, bad request, unknown model) is not.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = format!("status {status}: {}", truncate(body, 500));
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::REQUEST_TIMEOUT
            || status.is_server_error()
        {
            Self::transient(message)
        } else {
            Self::fatal(message)
        }
    }

    /// Classify a transport error from reqwest
    pub fn from_transport(err: &reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::ProviderTimeout(timeout)
        } else if err.is_connect() || err.is_request() {
            Self::transient(err.to_string())
        } else if err.is_decode() {
            Self::parse(format!("provider response body was not valid JSON: {err}"))
        } else {
            Self::fatal(err.to_string())
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
