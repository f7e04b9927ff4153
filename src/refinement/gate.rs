// Validation gate: bounded critique/regenerate loop for test cases

use crate::artifact::{Artifact, GenerationContext};
use crate::errors::GenerationResult;
use crate::providers::{GenerationProvider, RevisionNotes};

use super::retry::{with_retry, RetryPolicy};
use super::types::{ValidationReport, ValidationStatus};

/// Internal gate states. Callers only ever see the terminal ones, through
/// `ValidationReport::status`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum GateState {
    Validating,
    Regenerating(Vec<String>),
    Approved,
    MaxIterationsExceeded,
}

/// Runs the critique/regenerate loop over one candidate artifact.
///
/// Each cycle is one critique call and, on rejection, one revise call with
/// the critique's deficiencies. After `iteration_cap` regenerations the
/// latest artifact is returned tagged `MaxIterationsExceeded`, so a run
/// costs at most `2 × iteration_cap` provider calls.
pub struct ValidationGate<'a> {
    provider: &'a dyn GenerationProvider,
    policy: &'a RetryPolicy,
    iteration_cap: u32,
}

impl<'a> ValidationGate<'a> {
    /// `iteration_cap` below 1 is treated as 1
    pub fn new(provider: &'a dyn GenerationProvider, policy: &'a RetryPolicy, iteration_cap: u32) -> Self {
        Self {
            provider,
            policy,
            iteration_cap: iteration_cap.max(1),
        }
    }

    /// Validate `candidate`, regenerating as needed.
    ///
    /// Provider errors end the run and are returned as-is; no partial
    /// artifact escapes.
    pub async fn run(
        &self,
        candidate: Artifact,
        ctx: &GenerationContext,
    ) -> GenerationResult<(Artifact, ValidationReport)> {
        let mut artifact = candidate;
        let mut cycles = 0u32;
        let mut critiques = 0u32;
        let mut last_deficiencies: Vec<String> = Vec::new();
        let mut state = GateState::Validating;

        loop {
            state = match state {
                GateState::Validating => {
                    let critique = with_retry(self.policy, "critique", || {
                        self.provider.critique(&artifact, ctx)
                    })
                    .await?;
                    critiques += 1;

                    if critique.approved {
                        GateState::Approved
                    } else {
                        tracing::debug!(
                            cycle = cycles + 1,
                            deficiencies = critique.deficiencies.len(),
                            "Critique rejected test cases"
                        );
                        last_deficiencies = critique.deficiencies.clone();
                        GateState::Regenerating(critique.deficiencies)
                    }
                }
                GateState::Regenerating(deficiencies) => {
                    let notes = RevisionNotes::Deficiencies(deficiencies);
                    let revised = with_retry(self.policy, "revise", || {
                        self.provider.revise(&artifact, &notes, ctx)
                    })
                    .await?;
                    artifact = revised;
                    cycles += 1;

                    if cycles >= self.iteration_cap {
                        GateState::MaxIterationsExceeded
                    } else {
                        GateState::Validating
                    }
                }
                GateState::Approved => {
                    return Ok((
                        artifact,
                        ValidationReport {
                            status: ValidationStatus::Approved,
                            cycles,
                            critiques,
                            deficiencies: last_deficiencies,
                        },
                    ));
                }
                GateState::MaxIterationsExceeded => {
                    tracing::warn!(
                        cap = self.iteration_cap,
                        "Validation gate hit its iteration cap; returning latest test cases"
                    );
                    return Ok((
                        artifact,
                        ValidationReport {
                            status: ValidationStatus::MaxIterationsExceeded,
                            cycles,
                            critiques,
                            deficiencies: last_deficiencies,
                        },
                    ));
                }
            };
        }
    }
}
