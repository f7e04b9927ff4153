// Generation providers
//
// Two layers: `GenerationProvider` is what the refinement controller talks
// to (produce, critique, revise structured artifacts). `LlmBackend` is the
// raw text-completion API (Gemini, OpenAI-compatible) that the LLM-backed
// provider drives.

use async_trait::async_trait;

use crate::artifact::{Artifact, ArtifactKind, GenerationContext};
use crate::errors::GenerationResult;

pub mod types;

// Backend implementations
pub mod gemini;
pub mod openai;

// Backend factory
pub mod factory;

// Prompt-driven provider over an LlmBackend
pub mod llm;
pub mod parse;
pub mod prompts;

pub use factory::{create_backend, create_generation_provider, UnconfiguredProvider};
pub use gemini::GeminiBackend;
pub use llm::LlmGenerationProvider;
pub use openai::OpenAIBackend;
pub use types::{Critique, ProviderRequest, ProviderResponse, RevisionNotes};

/// Produces, critiques and revises artifacts.
///
/// Implementations keep no state between calls: everything a call needs is
/// in its arguments. Output must already be mapped onto the schema; anything
/// that cannot be is reported as `GenerationError::ParseFailure`.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// First candidate artifact of `kind` from the context's source material
    async fn produce(&self, kind: ArtifactKind, ctx: &GenerationContext) -> GenerationResult<Artifact>;

    /// Structured verdict on a test case artifact
    async fn critique(&self, artifact: &Artifact, ctx: &GenerationContext) -> GenerationResult<Critique>;

    /// Regenerate the whole artifact so it addresses `notes`
    async fn revise(
        &self,
        artifact: &Artifact,
        notes: &RevisionNotes,
        ctx: &GenerationContext,
    ) -> GenerationResult<Artifact>;

    /// Provider name for logs
    fn name(&self) -> &str;
}

/// Trait for text-completion backends
///
/// All backends (Gemini, OpenAI-compatible) implement this trait, providing a
/// unified single-turn interface.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Send one prompt and wait for the complete answer (no retry)
    async fn send_message(&self, request: &ProviderRequest) -> GenerationResult<ProviderResponse>;

    /// Get the backend name (e.g., "openai", "gemini")
    fn name(&self) -> &str;

    /// Get the default model for this backend
    fn default_model(&self) -> &str;
}
