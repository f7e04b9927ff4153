// Shared helpers for integration tests: a scripted generation provider
// that counts every call it receives.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use testgen::artifact::{Artifact, ArtifactKind, GenerationContext, RequirementItem, TestCase, TestStep};
use testgen::errors::{GenerationError, GenerationResult};
use testgen::providers::{Critique, GenerationProvider, RevisionNotes};

pub fn sample_requirements() -> Vec<RequirementItem> {
    vec![
        RequirementItem::new("REQ-1", "Users can log in with email and password."),
        RequirementItem::new("REQ-2", "Users can reset a forgotten password."),
    ]
}

pub fn sample_test_case(n: usize) -> TestCase {
    let mut tc = TestCase::new(
        format!("TC-{}", n),
        format!("Scenario {}", n),
        vec![TestStep {
            step: 1,
            action: "Open the login page".to_string(),
            expected: "The login form is shown".to_string(),
            test_data: None,
        }],
    );
    tc.tags = vec!["REQ-1".to_string()];
    tc
}

pub fn sample_test_cases() -> Vec<TestCase> {
    vec![sample_test_case(1), sample_test_case(2)]
}

/// Provider with scripted behaviour.
///
/// `produce` returns the sample artifact of the requested kind (after any
/// queued failures). `critique` pops queued verdicts and approves once the
/// queue is empty, unless `rejecting_forever` is set. `revise` appends one
/// item per human feedback round and returns machine-driven revisions with
/// a version marker in the first title.
#[derive(Default)]
pub struct ScriptedProvider {
    produce_failures: Mutex<VecDeque<GenerationError>>,
    critiques: Mutex<VecDeque<Critique>>,
    reject_forever: bool,
    delay: Option<Duration>,
    pub produce_calls: AtomicU32,
    pub critique_calls: AtomicU32,
    pub revise_calls: AtomicU32,
    pub notes_seen: Mutex<Vec<RevisionNotes>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_critiques(self, critiques: Vec<Critique>) -> Self {
        *self.critiques.lock().unwrap() = critiques.into();
        self
    }

    pub fn rejecting_forever(mut self) -> Self {
        self.reject_forever = true;
        self
    }

    pub fn failing_produce(self, errors: Vec<GenerationError>) -> Self {
        *self.produce_failures.lock().unwrap() = errors.into();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn total_calls(&self) -> u32 {
        self.produce_calls.load(Ordering::SeqCst)
            + self.critique_calls.load(Ordering::SeqCst)
            + self.revise_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl GenerationProvider for ScriptedProvider {
    async fn produce(&self, kind: ArtifactKind, _ctx: &GenerationContext) -> GenerationResult<Artifact> {
        self.produce_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if let Some(err) = self.produce_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        Ok(match kind {
            ArtifactKind::Requirements => Artifact::Requirements(sample_requirements()),
            ArtifactKind::TestCases => Artifact::TestCases(sample_test_cases()),
        })
    }

    async fn critique(&self, _artifact: &Artifact, _ctx: &GenerationContext) -> GenerationResult<Critique> {
        self.critique_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.reject_forever {
            return Ok(Critique::reject(["negative paths are not covered"]));
        }
        Ok(self
            .critiques
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(Critique::approve))
    }

    async fn revise(
        &self,
        artifact: &Artifact,
        notes: &RevisionNotes,
        _ctx: &GenerationContext,
    ) -> GenerationResult<Artifact> {
        let round = self.revise_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.pause().await;
        self.notes_seen.lock().unwrap().push(notes.clone());

        let revised = match (artifact, notes) {
            (Artifact::Requirements(items), RevisionNotes::Human(feedback)) => {
                let mut items = items.clone();
                items.push(RequirementItem::new(format!("REQ-{}", items.len() + 1), feedback.clone()));
                Artifact::Requirements(items)
            }
            (Artifact::TestCases(cases), RevisionNotes::Human(feedback)) => {
                let mut cases = cases.clone();
                let mut tc = sample_test_case(cases.len() + 1);
                tc.title = feedback.clone();
                cases.push(tc);
                Artifact::TestCases(cases)
            }
            (Artifact::TestCases(cases), RevisionNotes::Deficiencies(_)) => {
                let mut cases = cases.clone();
                if let Some(first) = cases.first_mut() {
                    first.title = format!("Scenario 1 (revision {})", round);
                }
                if !cases.iter().any(|c| c.is_negative()) {
                    let mut tc = sample_test_case(cases.len() + 1);
                    tc.title = "Reject invalid credentials".to_string();
                    tc.test_type = "Negative".to_string();
                    tc.tags.push("negative".to_string());
                    cases.push(tc);
                }
                Artifact::TestCases(cases)
            }
            (other, _) => other.clone(),
        };
        Ok(revised)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
