// Versioned artifact snapshots and the session that owns them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::context::GenerationContext;
use super::types::{ArtifactKind, RequirementItem, TestCase};

/// The structured output of one generation round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "lowercase")]
pub enum Artifact {
    Requirements(Vec<RequirementItem>),
    #[serde(rename = "testcases")]
    TestCases(Vec<TestCase>),
}

impl Artifact {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Artifact::Requirements(_) => ArtifactKind::Requirements,
            Artifact::TestCases(_) => ArtifactKind::TestCases,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Artifact::Requirements(items) => items.len(),
            Artifact::TestCases(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn requirements(&self) -> Option<&[RequirementItem]> {
        match self {
            Artifact::Requirements(items) => Some(items),
            Artifact::TestCases(_) => None,
        }
    }

    pub fn test_cases(&self) -> Option<&[TestCase]> {
        match self {
            Artifact::TestCases(items) => Some(items),
            Artifact::Requirements(_) => None,
        }
    }

    pub fn into_requirements(self) -> Option<Vec<RequirementItem>> {
        match self {
            Artifact::Requirements(items) => Some(items),
            Artifact::TestCases(_) => None,
        }
    }

    pub fn into_test_cases(self) -> Option<Vec<TestCase>> {
        match self {
            Artifact::TestCases(items) => Some(items),
            Artifact::Requirements(_) => None,
        }
    }
}

/// One immutable snapshot of an artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRevision {
    pub version: u32,
    pub payload: Artifact,
    pub feedback_applied: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ArtifactRevision {
    /// First revision of a new session
    pub fn initial(payload: Artifact) -> Self {
        Self {
            version: 1,
            payload,
            feedback_applied: None,
            created_at: Utc::now(),
        }
    }

    /// Successor of `self` carrying the feedback that produced it
    pub fn successor(&self, payload: Artifact, feedback: impl Into<String>) -> Self {
        Self {
            version: self.version + 1,
            payload,
            feedback_applied: Some(feedback.into()),
            created_at: Utc::now(),
        }
    }

    /// Rebuild a revision the client sent back to us (stateless server).
    /// Versions below 1 are clamped.
    pub fn restored(payload: Artifact, version: Option<u32>) -> Self {
        Self {
            version: version.unwrap_or(1).max(1),
            payload,
            feedback_applied: None,
            created_at: Utc::now(),
        }
    }

    pub fn kind(&self) -> ArtifactKind {
        self.payload.kind()
    }
}

/// Why a revision could not be appended to a session
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("revision version {got} does not follow {expected_prev}")]
    VersionGap { expected_prev: u32, got: u32 },
    #[error("revision holds {got} but the session produces {expected}")]
    KindMismatch {
        expected: ArtifactKind,
        got: ArtifactKind,
    },
}

/// Ordered, append-only revision history for one artifact.
///
/// There is no terminal state: the human decides when to stop refining.
#[derive(Debug, Clone, Serialize)]
pub struct RefinementSession {
    kind: ArtifactKind,
    revisions: Vec<ArtifactRevision>,
    context: GenerationContext,
}

impl RefinementSession {
    /// Start a session from its first revision (version 1)
    pub fn start(first: ArtifactRevision, context: GenerationContext) -> Result<Self, SessionError> {
        if first.version != 1 {
            return Err(SessionError::VersionGap {
                expected_prev: 0,
                got: first.version,
            });
        }
        Ok(Self {
            kind: first.kind(),
            revisions: vec![first],
            context,
        })
    }

    /// Append the next revision; rejects gaps and kind changes
    pub fn push(&mut self, revision: ArtifactRevision) -> Result<(), SessionError> {
        let latest = self.latest().version;
        if revision.version != latest + 1 {
            return Err(SessionError::VersionGap {
                expected_prev: latest,
                got: revision.version,
            });
        }
        if revision.kind() != self.kind {
            return Err(SessionError::KindMismatch {
                expected: self.kind,
                got: revision.kind(),
            });
        }
        self.revisions.push(revision);
        Ok(())
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Authoritative revision for export and further refinement
    pub fn latest(&self) -> &ArtifactRevision {
        // start() guarantees at least one revision
        &self.revisions[self.revisions.len() - 1]
    }

    pub fn revisions(&self) -> &[ArtifactRevision] {
        &self.revisions
    }

    pub fn context(&self) -> &GenerationContext {
        &self.context
    }
}
