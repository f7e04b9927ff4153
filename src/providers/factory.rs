// Provider factory
//
// Creates the LLM backend and generation provider from configuration

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::gemini::GeminiBackend;
use super::llm::LlmGenerationProvider;
use super::openai::OpenAIBackend;
use super::types::{Critique, RevisionNotes};
use super::{GenerationProvider, LlmBackend};
use crate::artifact::{Artifact, ArtifactKind, GenerationContext};
use crate::config::{Config, ProviderConfig, ProviderKind};
use crate::errors::{GenerationError, GenerationResult};

/// Create an `LlmBackend` from provider settings.
///
/// `timeout` bounds each HTTP request. A missing API key is `NotConfigured`.
pub fn create_backend(
    config: &ProviderConfig,
    timeout: Duration,
) -> GenerationResult<Arc<dyn LlmBackend>> {
    let api_key = config
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            GenerationError::NotConfigured(format!(
                "no API key for the {} provider (set {} or provider.api_key)",
                config.kind,
                match config.kind {
                    ProviderKind::Gemini => "GEMINI_API_KEY",
                    ProviderKind::Openai => "OPENAI_API_KEY",
                }
            ))
        })?
        .to_string();

    let model = config.effective_model().to_string();
    match config.kind {
        ProviderKind::Gemini => {
            let mut backend = GeminiBackend::new(api_key, timeout)?.with_model(model);
            if let Some(url) = &config.base_url {
                backend = backend.with_base_url(url.clone());
            }
            Ok(Arc::new(backend))
        }
        ProviderKind::Openai => {
            let mut backend = OpenAIBackend::new(api_key, timeout)?.with_model(model);
            if let Some(url) = &config.base_url {
                backend = backend.with_base_url(url.clone());
            }
            Ok(Arc::new(backend))
        }
    }
}

/// Create the generation provider the server uses.
///
/// Without credentials this still succeeds: the returned provider answers
/// every call with `NotConfigured`, so the service can start and serve
/// health checks and exports.
pub fn create_generation_provider(config: &Config) -> GenerationResult<Arc<dyn GenerationProvider>> {
    match create_backend(&config.provider, config.refinement.call_timeout()) {
        Ok(backend) => {
            tracing::info!(
                provider = %backend.name(),
                model = %backend.default_model(),
                "Generation provider ready"
            );
            Ok(Arc::new(
                LlmGenerationProvider::new(backend).with_max_tokens(config.refinement.max_tokens),
            ))
        }
        Err(GenerationError::NotConfigured(reason)) => {
            tracing::warn!("{}; generation endpoints will answer 503", reason);
            Ok(Arc::new(UnconfiguredProvider { reason }))
        }
        Err(e) => Err(e),
    }
}

/// Stand-in used when no credentials are configured
pub struct UnconfiguredProvider {
    reason: String,
}

impl UnconfiguredProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn err<T>(&self) -> GenerationResult<T> {
        Err(GenerationError::NotConfigured(self.reason.clone()))
    }
}

#[async_trait]
impl GenerationProvider for UnconfiguredProvider {
    async fn produce(&self, _kind: ArtifactKind, _ctx: &GenerationContext) -> GenerationResult<Artifact> {
        self.err()
    }

    async fn critique(&self, _artifact: &Artifact, _ctx: &GenerationContext) -> GenerationResult<Critique> {
        self.err()
    }

    async fn revise(
        &self,
        _artifact: &Artifact,
        _notes: &RevisionNotes,
        _ctx: &GenerationContext,
    ) -> GenerationResult<Artifact> {
        self.err()
    }

    fn name(&self) -> &str {
        "unconfigured"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_not_configured() {
        let err = create_backend(&ProviderConfig::default(), Duration::from_secs(5))
            .err()
            .unwrap();
        assert!(matches!(err, GenerationError::NotConfigured(_)));
    }

    #[test]
    fn test_backend_kind_follows_config() {
        let mut config = ProviderConfig {
            api_key: Some("key".into()),
            ..Default::default()
        };
        let backend = create_backend(&config, Duration::from_secs(5)).unwrap();
        assert_eq!(backend.name(), "gemini");

        config.kind = ProviderKind::Openai;
        config.model = Some("gpt-4o".into());
        let backend = create_backend(&config, Duration::from_secs(5)).unwrap();
        assert_eq!(backend.name(), "openai");
        assert_eq!(backend.default_model(), "gpt-4o");
    }

    #[tokio::test]
    async fn test_unconfigured_provider_reports_not_configured() {
        let provider = create_generation_provider(&Config::default()).unwrap();
        assert_eq!(provider.name(), "unconfigured");
        let err = provider
            .produce(ArtifactKind::Requirements, &GenerationContext::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "not_configured");
    }
}
