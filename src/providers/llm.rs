// LLM-backed generation provider
//
// Renders prompts, asks the backend for JSON, maps the answer onto the
// artifact schema and normalizes it.

use async_trait::async_trait;
use std::sync::Arc;

use super::parse::{parse_artifact, parse_critique};
use super::prompts;
use super::types::{Critique, ProviderRequest, RevisionNotes};
use super::{GenerationProvider, LlmBackend};
use crate::artifact::{
    normalize_requirements, normalize_test_cases, Artifact, ArtifactKind, GenerationContext, IdPolicy,
};
use crate::config::constants::DEFAULT_MAX_TOKENS;
use crate::errors::{GenerationError, GenerationResult};

pub struct LlmGenerationProvider {
    backend: Arc<dyn LlmBackend>,
    model: String,
    max_tokens: u32,
    temperature: Option<f32>,
}

impl LlmGenerationProvider {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self {
            backend,
            model: String::new(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: Some(0.2),
        }
    }

    /// Override the backend's default model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    async fn complete(&self, system: &str, prompt: String) -> GenerationResult<String> {
        let mut request = ProviderRequest::new(prompt)
            .with_system(system)
            .with_model(self.model.clone())
            .with_max_tokens(self.max_tokens);
        if let Some(t) = self.temperature {
            request = request.with_temperature(t);
        }
        let response = self.backend.send_message(&request).await?;
        tracing::debug!(
            provider = %response.provider,
            model = %response.model,
            answer_chars = response.text.len(),
            "Backend answered"
        );
        Ok(response.text)
    }
}

/// Parse and normalize an answer; `policy` only applies to requirements.
///
/// Cleanup can drop every item (stubs, blank markup, duplicates), so the
/// emptiness check runs again on the normalized artifact.
fn finish(kind: ArtifactKind, text: &str, policy: IdPolicy) -> GenerationResult<Artifact> {
    let artifact = match parse_artifact(kind, text)? {
        Artifact::Requirements(items) => Artifact::Requirements(normalize_requirements(items, policy)),
        Artifact::TestCases(items) => Artifact::TestCases(normalize_test_cases(items)),
    };
    if artifact.is_empty() {
        return Err(GenerationError::parse(format!("model returned no usable {kind}")));
    }
    Ok(artifact)
}

#[async_trait]
impl GenerationProvider for LlmGenerationProvider {
    async fn produce(&self, kind: ArtifactKind, ctx: &GenerationContext) -> GenerationResult<Artifact> {
        let text = self
            .complete(prompts::system_for(kind), prompts::produce_prompt(kind, ctx))
            .await?;
        finish(kind, &text, IdPolicy::Sequential)
    }

    async fn critique(&self, artifact: &Artifact, ctx: &GenerationContext) -> GenerationResult<Critique> {
        let text = self
            .complete(prompts::CRITIC_SYSTEM, prompts::critique_prompt(artifact, ctx))
            .await?;
        parse_critique(&text)
    }

    async fn revise(
        &self,
        artifact: &Artifact,
        notes: &RevisionNotes,
        ctx: &GenerationContext,
    ) -> GenerationResult<Artifact> {
        let kind = artifact.kind();
        let text = self
            .complete(prompts::system_for(kind), prompts::revise_prompt(artifact, notes, ctx))
            .await?;
        finish(kind, &text, IdPolicy::Preserve)
    }

    fn name(&self) -> &str {
        self.backend.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderResponse;
    use std::sync::Mutex;

    /// Backend that replays canned answers and records prompts
    struct CannedBackend {
        answers: Mutex<Vec<String>>,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedBackend {
        fn new(answers: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                answers: Mutex::new(answers.iter().rev().map(|s| s.to_string()).collect()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmBackend for CannedBackend {
        async fn send_message(&self, request: &ProviderRequest) -> GenerationResult<ProviderResponse> {
            self.prompts.lock().unwrap().push(request.prompt.clone());
            let text = self
                .answers
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| GenerationError::fatal("no more answers"))?;
            Ok(ProviderResponse {
                text,
                model: "canned".into(),
                stop_reason: None,
                provider: "canned".into(),
            })
        }

        fn name(&self) -> &str {
            "canned"
        }

        fn default_model(&self) -> &str {
            "canned"
        }
    }

    #[tokio::test]
    async fn test_produce_requirements_assigns_sequential_ids() {
        let backend = CannedBackend::new(&[
            r#"{"requirements":[{"id":"REQ-001","text":"**The system shall** A."},{"id":"X","text":"The system shall B."}]}"#,
        ]);
        let provider = LlmGenerationProvider::new(backend);
        let ctx = GenerationContext::from_document("doc.md", "stuff");
        let artifact = provider.produce(ArtifactKind::Requirements, &ctx).await.unwrap();
        let items = artifact.requirements().unwrap();
        assert_eq!(items[0].id, "REQ-1");
        assert_eq!(items[0].text, "The system shall A.");
        assert_eq!(items[1].id, "REQ-2");
    }

    #[tokio::test]
    async fn test_revise_requirements_preserves_ids() {
        let backend = CannedBackend::new(&[
            r#"[{"id":"REQ-3","text":"The system shall C."},{"id":"","text":"The system shall D."}]"#,
        ]);
        let provider = LlmGenerationProvider::new(backend.clone());
        let prior = Artifact::Requirements(vec![crate::artifact::RequirementItem::new(
            "REQ-3",
            "The system shall C.",
        )]);
        let notes = RevisionNotes::Human("add D".into());
        let artifact = provider
            .revise(&prior, &notes, &GenerationContext::default())
            .await
            .unwrap();
        let ids: Vec<_> = artifact.requirements().unwrap().iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, ["REQ-3", "REQ-4"]);
        assert!(backend.prompts.lock().unwrap()[0].contains("add D"));
    }

    #[tokio::test]
    async fn test_malformed_answer_is_parse_failure() {
        let backend = CannedBackend::new(&["Sorry, I can't help with that."]);
        let provider = LlmGenerationProvider::new(backend);
        let ctx = GenerationContext::from_document("doc.md", "stuff");
        let err = provider.produce(ArtifactKind::Requirements, &ctx).await.unwrap_err();
        assert!(matches!(err, GenerationError::ParseFailure(_)));
    }

    #[tokio::test]
    async fn test_answer_emptied_by_cleanup_is_parse_failure() {
        let backend = CannedBackend::new(&[r#"[{"id":"REQ-1","text":"(stub)"},{"id":"REQ-2","text":"- **:**"}]"#]);
        let provider = LlmGenerationProvider::new(backend);
        let ctx = GenerationContext::from_document("doc.md", "stuff");
        let err = provider.produce(ArtifactKind::Requirements, &ctx).await.unwrap_err();
        assert_eq!(err, GenerationError::parse("model returned no usable requirements"));
    }

    #[tokio::test]
    async fn test_revise_emptied_by_cleanup_is_parse_failure() {
        let backend = CannedBackend::new(&[r#"[{"id":"REQ-1","text":"**(stub)**"}]"#]);
        let provider = LlmGenerationProvider::new(backend);
        let prior = Artifact::Requirements(vec![crate::artifact::RequirementItem::new("REQ-1", "The system shall C.")]);
        let err = provider
            .revise(&prior, &RevisionNotes::Human("drop C".into()), &GenerationContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::ParseFailure(_)));
    }

    #[tokio::test]
    async fn test_three_bullets_become_ordered_requirements() {
        let backend = CannedBackend::new(&[r#"{"requirements":[
            {"id":"REQ-1","text":"Users log in"},
            {"id":"REQ-2","text":"Users log out"},
            {"id":"REQ-3","text":"Users reset passwords"}]}"#]);
        let provider = LlmGenerationProvider::new(backend.clone());
        let ctx = GenerationContext::from_document(
            "auth.md",
            "- Users log in\n- Users log out\n- Users reset passwords\n",
        );
        let artifact = provider.produce(ArtifactKind::Requirements, &ctx).await.unwrap();

        let pairs: Vec<(&str, &str)> = artifact
            .requirements()
            .unwrap()
            .iter()
            .map(|r| (r.id.as_str(), r.text.as_str()))
            .collect();
        assert_eq!(
            pairs,
            [("REQ-1", "Users log in"), ("REQ-2", "Users log out"), ("REQ-3", "Users reset passwords")]
        );
        assert!(backend.prompts.lock().unwrap()[0].contains("- Users reset passwords"));
    }

    #[tokio::test]
    async fn test_critique_uses_structured_verdict() {
        let backend = CannedBackend::new(&[r#"{"approved":false,"deficiencies":["missing negative path"]}"#]);
        let provider = LlmGenerationProvider::new(backend);
        let critique = provider
            .critique(&Artifact::TestCases(vec![]), &GenerationContext::default())
            .await
            .unwrap();
        assert!(!critique.approved);
        assert_eq!(critique.deficiencies, ["missing negative path"]);
    }
}
