// Refinement controller: generate and refine artifacts with a human in the loop

use std::sync::Arc;
use uuid::Uuid;

use crate::artifact::{
    Artifact, ArtifactKind, ArtifactRevision, GenerationContext, RefinementSession,
};
use crate::config::RefinementConfig;
use crate::errors::{GenerationError, GenerationResult};
use crate::providers::{GenerationProvider, RevisionNotes};

use super::gate::ValidationGate;
use super::retry::{with_retry, RetryPolicy};
use super::types::{GenerationOutcome, ValidationReport};

/// Entry point for every generation request.
///
/// Test cases always pass through the validation gate; requirements take a
/// single provider call. The human loop never ends on its own: every call
/// returns an artifact (or a typed error) and the caller decides whether to
/// refine again or export.
pub struct RefinementController {
    provider: Arc<dyn GenerationProvider>,
    policy: RetryPolicy,
    iteration_cap: u32,
}

impl RefinementController {
    pub fn new(provider: Arc<dyn GenerationProvider>, config: &RefinementConfig) -> Self {
        Self {
            provider,
            policy: RetryPolicy::from_config(config),
            iteration_cap: config.iteration_cap.max(1),
        }
    }

    /// Replace the retry policy (tests use short delays)
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn iteration_cap(&self) -> u32 {
        self.iteration_cap
    }

    /// First artifact of `kind` from the context's source material (version 1)
    pub async fn generate(
        &self,
        kind: ArtifactKind,
        ctx: &GenerationContext,
    ) -> GenerationResult<GenerationOutcome> {
        ctx.ensure_generatable(kind)?;
        let run_id = Uuid::new_v4();
        tracing::info!(%run_id, %kind, provider = %self.provider.name(), "Generating artifact");

        let candidate = with_retry(&self.policy, "produce", || self.provider.produce(kind, ctx)).await;
        let candidate = self.log_failure(run_id, candidate)?;
        let (payload, validation) = self.validate(run_id, candidate, ctx).await?;

        let revision = ArtifactRevision::initial(payload);
        tracing::info!(%run_id, version = revision.version, items = revision.payload.len(), "Artifact generated");
        Ok(GenerationOutcome {
            revision,
            validation,
        })
    }

    /// Regenerate `prior` so it applies `feedback` (version `prior + 1`).
    ///
    /// Blank feedback is rejected before any provider call.
    pub async fn refine(
        &self,
        prior: &ArtifactRevision,
        feedback: &str,
        ctx: &GenerationContext,
    ) -> GenerationResult<GenerationOutcome> {
        let feedback = feedback.trim();
        if feedback.is_empty() {
            return Err(GenerationError::EmptyFeedback);
        }
        if prior.payload.is_empty() {
            return Err(GenerationError::invalid_input(format!(
                "cannot refine an empty {} artifact",
                prior.kind()
            )));
        }

        let run_id = Uuid::new_v4();
        tracing::info!(
            %run_id,
            kind = %prior.kind(),
            from_version = prior.version,
            feedback_chars = feedback.len(),
            "Refining artifact"
        );

        let notes = RevisionNotes::Human(feedback.to_string());
        let candidate = with_retry(&self.policy, "revise", || {
            self.provider.revise(&prior.payload, &notes, ctx)
        })
        .await;
        let candidate = self.log_failure(run_id, candidate)?;
        if candidate.kind() != prior.kind() {
            return Err(GenerationError::parse(format!(
                "provider returned {} while refining {}",
                candidate.kind(),
                prior.kind()
            )));
        }
        let (payload, validation) = self.validate(run_id, candidate, ctx).await?;

        let revision = prior.successor(payload, feedback);
        tracing::info!(%run_id, version = revision.version, items = revision.payload.len(), "Artifact refined");
        Ok(GenerationOutcome {
            revision,
            validation,
        })
    }

    /// Start a session with a freshly generated artifact
    pub async fn start_session(
        &self,
        kind: ArtifactKind,
        ctx: GenerationContext,
    ) -> GenerationResult<(RefinementSession, Option<ValidationReport>)> {
        let outcome = self.generate(kind, &ctx).await?;
        let session = RefinementSession::start(outcome.revision, ctx)
            .map_err(|e| GenerationError::invalid_input(e.to_string()))?;
        Ok((session, outcome.validation))
    }

    /// Refine the session's latest revision and append the result.
    ///
    /// On error the session is left unchanged.
    pub async fn refine_session(
        &self,
        session: &mut RefinementSession,
        feedback: &str,
    ) -> GenerationResult<Option<ValidationReport>> {
        let outcome = self
            .refine(session.latest(), feedback, session.context())
            .await?;
        session
            .push(outcome.revision)
            .map_err(|e| GenerationError::invalid_input(e.to_string()))?;
        Ok(outcome.validation)
    }

    /// Run the gate for test cases; requirements pass straight through
    async fn validate(
        &self,
        run_id: Uuid,
        candidate: Artifact,
        ctx: &GenerationContext,
    ) -> GenerationResult<(Artifact, Option<ValidationReport>)> {
        match candidate.kind() {
            ArtifactKind::Requirements => Ok((candidate, None)),
            ArtifactKind::TestCases => {
                let gate = ValidationGate::new(self.provider.as_ref(), &self.policy, self.iteration_cap);
                let result = gate.run(candidate, ctx).await;
                let (artifact, report) = self.log_failure(run_id, result)?;
                tracing::info!(
                    %run_id,
                    status = ?report.status,
                    cycles = report.cycles,
                    critiques = report.critiques,
                    "Validation gate finished"
                );
                Ok((artifact, Some(report)))
            }
        }
    }

    fn log_failure<T>(&self, run_id: Uuid, result: GenerationResult<T>) -> GenerationResult<T> {
        if let Err(e) = &result {
            tracing::warn!(%run_id, code = e.code(), "Generation failed: {}", e);
        }
        result
    }
}
