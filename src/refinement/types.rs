// Refinement outcome types: ValidationStatus, ValidationReport, GenerationOutcome

use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactRevision;

/// Terminal state of a validation gate run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    /// A critique round accepted the artifact
    Approved,
    /// The iteration cap ran out; the latest artifact is returned anyway
    MaxIterationsExceeded,
}

impl ValidationStatus {
    pub fn is_approved(&self) -> bool {
        matches!(self, ValidationStatus::Approved)
    }
}

/// What the gate did before returning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub status: ValidationStatus,
    /// Regeneration cycles run (never more than the cap)
    pub cycles: u32,
    /// Critique rounds run
    pub critiques: u32,
    /// Deficiencies from the last rejecting critique, empty when approved first time
    pub deficiencies: Vec<String>,
}

/// Result of `generate` or `refine`
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub revision: ArtifactRevision,
    /// Present for test cases only
    pub validation: Option<ValidationReport>,
}

impl GenerationOutcome {
    pub fn status(&self) -> Option<ValidationStatus> {
        self.validation.as_ref().map(|v| v.status)
    }
}
