// Artifact store
//
// Requirements and test cases, the revisions that hold them, and the
// session history a human refines over time.

pub mod context;
pub mod normalize;
pub mod revision;
pub mod types;

pub use context::{GenerationContext, SourceMaterial};
pub use normalize::{clean_requirement_text, normalize_requirements, normalize_test_cases, IdPolicy};
pub use revision::{Artifact, ArtifactRevision, RefinementSession, SessionError};
pub use types::{
    ArtifactKind, EnrichmentContext, Priority, RequirementItem, TestCase, TestCaseTemplate,
    TestStatus, TestStep,
};
