// Inputs that travel with a refinement session
//
// The provider keeps no memory between calls, so everything a call needs
// besides the artifact itself lives here and is resent on every round.

use serde::{Deserialize, Serialize};

use super::types::{ArtifactKind, EnrichmentContext, RequirementItem, TestCaseTemplate};
use crate::errors::{GenerationError, GenerationResult};

/// Raw material an artifact is generated from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceMaterial {
    /// Extracted document text (requirements)
    Document { name: String, text: String },
    /// Requirement list under test (test cases)
    Requirements { items: Vec<RequirementItem> },
    /// Caller no longer has the source, e.g. a requirements refine round
    #[default]
    Absent,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationContext {
    pub source: SourceMaterial,
    #[serde(default)]
    pub template: Option<TestCaseTemplate>,
    #[serde(default)]
    pub enrichment: Option<EnrichmentContext>,
    /// Free-text direction that is not tied to a prior artifact
    #[serde(default)]
    pub guidance: Option<String>,
}

impl GenerationContext {
    pub fn from_document(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: SourceMaterial::Document {
                name: name.into(),
                text: text.into(),
            },
            ..Default::default()
        }
    }

    pub fn from_requirements(items: Vec<RequirementItem>) -> Self {
        Self {
            source: SourceMaterial::Requirements { items },
            ..Default::default()
        }
    }

    pub fn with_template(mut self, template: TestCaseTemplate) -> Self {
        self.template = Some(template);
        self
    }

    pub fn with_enrichment(mut self, enrichment: EnrichmentContext) -> Self {
        self.enrichment = Some(enrichment);
        self
    }

    pub fn with_guidance(mut self, guidance: impl Into<String>) -> Self {
        let guidance = guidance.into();
        if !guidance.trim().is_empty() {
            self.guidance = Some(guidance.trim().to_string());
        }
        self
    }

    /// Requirements under test, empty for document sources
    pub fn requirements(&self) -> &[RequirementItem] {
        match &self.source {
            SourceMaterial::Requirements { items } => items,
            _ => &[],
        }
    }

    /// Check that the source material can seed a first generation of `kind`
    pub fn ensure_generatable(&self, kind: ArtifactKind) -> GenerationResult<()> {
        match (kind, &self.source) {
            (ArtifactKind::Requirements, SourceMaterial::Document { text, .. })
                if !text.trim().is_empty() =>
            {
                Ok(())
            }
            (ArtifactKind::Requirements, _) => Err(GenerationError::invalid_input(
                "requirement extraction needs non-empty document text",
            )),
            (ArtifactKind::TestCases, SourceMaterial::Requirements { items })
                if !items.is_empty() =>
            {
                Ok(())
            }
            (ArtifactKind::TestCases, _) => Err(GenerationError::invalid_input(
                "test case generation needs at least one requirement",
            )),
        }
    }
}
