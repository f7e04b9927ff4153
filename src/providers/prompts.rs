// Prompt construction for requirement extraction and test case design
//
// System instructions are constants; task prompts are rendered from the
// artifact and generation context on every call.

use crate::artifact::{Artifact, ArtifactKind, EnrichmentContext, GenerationContext, SourceMaterial};

use super::types::RevisionNotes;

pub const REQUIREMENTS_SYSTEM: &str = r#"You are a senior business analyst specialising in requirements engineering.

Extract TESTABLE functional requirements from the material you are given.

Rules:
1. Every requirement is one complete, verifiable statement.
2. Use the form "The system shall ..." consistently.
3. Be specific and measurable; include acceptance criteria where possible.
4. No code, file paths, directory layouts or implementation details.
5. No markdown formatting inside requirement text.
6. One behaviour per requirement.

Respond with JSON only, in exactly this shape:
{"requirements": [{"id": "REQ-1", "text": "The system shall ..."}]}"#;

pub const TEST_CASES_SYSTEM: &str = r#"You are a senior QA engineer designing test cases in the JIRA/Xray/TestRail style.

Rules:
1. Every test case traces to at least one requirement: put the requirement ids in "tags".
2. Test cases are atomic: one behaviour per case.
3. Steps are numbered from 1; each has a concrete action and a concrete expected result.
4. Provide test data where a step needs it.
5. Cover positive, negative and edge paths. Mark negative cases with the tag "negative".
6. priority is one of Critical, High, Medium, Low.
7. type is one of Functional, Integration, E2E, Regression, Smoke, Security, Performance, Usability.
8. status is "Draft" for new test cases.
9. automation_status is one of "Manual", "To Be Automated", "Automated".

Respond with JSON only, in exactly this shape:
{"test_cases": [{"id": "TC-1", "title": "...", "description": "...", "priority": "High",
  "type": "Functional", "status": "Draft", "preconditions": "...",
  "steps": [{"step": 1, "action": "...", "expected": "...", "test_data": null}],
  "expected_result": "...", "test_data": "...", "estimated_time": "5 mins",
  "automation_status": "Manual", "component": "...", "tags": ["REQ-1", "functional"]}]}"#;

pub const CRITIC_SYSTEM: &str = r#"You are a QA lead reviewing test cases before they are handed to testers.

Checklist:
1. Each test case has a clear, descriptive title and a meaningful description.
2. Preconditions are specific.
3. Steps are actionable, numbered, and each has a specific expected result (not "works correctly").
4. Test data is given where needed.
5. Each test case is traceable to at least one requirement via its tags.
6. Priority and type are sensible.
7. Together the test cases cover every requirement, including negative paths.

Respond with JSON only:
{"approved": true, "deficiencies": []}
or
{"approved": false, "deficiencies": ["concrete problem 1", "concrete problem 2"]}
When approved is false, deficiencies must list at least one concrete problem."#;

/// System instruction for producing or revising an artifact of `kind`
pub fn system_for(kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::Requirements => REQUIREMENTS_SYSTEM,
        ArtifactKind::TestCases => TEST_CASES_SYSTEM,
    }
}

/// Prompt for the first generation of `kind`
pub fn produce_prompt(kind: ArtifactKind, ctx: &GenerationContext) -> String {
    let mut prompt = String::new();
    match kind {
        ArtifactKind::Requirements => {
            prompt.push_str("Extract testable requirements from this document.\n\n");
            push_source(&mut prompt, ctx);
            prompt.push_str("Produce between 5 and 15 high-quality requirements.\n");
        }
        ArtifactKind::TestCases => {
            prompt.push_str("Design test cases for the requirements below.\n\n");
            push_source(&mut prompt, ctx);
            push_test_case_context(&mut prompt, ctx);
            prompt.push_str("Generate 1 to 3 test cases per requirement.\n");
        }
    }
    push_guidance(&mut prompt, ctx);
    prompt
}

/// Prompt for regenerating `artifact` so it addresses `notes`
pub fn revise_prompt(artifact: &Artifact, notes: &RevisionNotes, ctx: &GenerationContext) -> String {
    let mut prompt = String::new();
    let noun = match artifact.kind() {
        ArtifactKind::Requirements => "requirements",
        ArtifactKind::TestCases => "test cases",
    };
    prompt.push_str(&format!("Revise the existing {noun} below.\n\n"));
    prompt.push_str("## Current version\n```json\n");
    prompt.push_str(&artifact_json(artifact));
    prompt.push_str("\n```\n\n");

    match notes {
        RevisionNotes::Human(_) => {
            prompt.push_str("## Reviewer feedback (apply all of it)\n");
        }
        RevisionNotes::Deficiencies(_) => {
            prompt.push_str("## Deficiencies found in review (fix every one)\n");
        }
    }
    prompt.push_str(&notes.to_prompt_text());
    prompt.push_str("\n\n");

    if artifact.kind() == ArtifactKind::TestCases {
        push_source(&mut prompt, ctx);
        push_test_case_context(&mut prompt, ctx);
        prompt.push_str(
            "Keep the ids of test cases you keep. Return the complete revised list, \
             not only the changed cases.\n",
        );
    } else {
        prompt.push_str(
            "Keep the ids of requirements you keep; leave the id empty for new ones. \
             Return the complete revised list, not only the changed items.\n",
        );
    }
    push_guidance(&mut prompt, ctx);
    prompt
}

/// Prompt for one critique round over test cases
pub fn critique_prompt(artifact: &Artifact, ctx: &GenerationContext) -> String {
    let mut prompt = String::from("Review these test cases against the checklist.\n\n");
    prompt.push_str("## Test cases\n```json\n");
    prompt.push_str(&artifact_json(artifact));
    prompt.push_str("\n```\n\n");
    push_source(&mut prompt, ctx);
    prompt
}

fn artifact_json(artifact: &Artifact) -> String {
    let rendered = match artifact {
        Artifact::Requirements(items) => serde_json::to_string_pretty(items),
        Artifact::TestCases(items) => serde_json::to_string_pretty(items),
    };
    rendered.unwrap_or_else(|_| "[]".to_string())
}

fn push_source(prompt: &mut String, ctx: &GenerationContext) {
    match &ctx.source {
        SourceMaterial::Document { name, text } => {
            prompt.push_str(&format!("## Document: {name}\n---DOCUMENT START---\n"));
            prompt.push_str(text.trim());
            prompt.push_str("\n---DOCUMENT END---\n\n");
        }
        SourceMaterial::Requirements { items } => {
            prompt.push_str("## Requirements\n");
            for item in items {
                prompt.push_str(&format!("- {}: {}\n", item.id, item.text));
            }
            prompt.push('\n');
        }
        SourceMaterial::Absent => {}
    }
}

fn push_test_case_context(prompt: &mut String, ctx: &GenerationContext) {
    if let Some(template) = &ctx.template {
        prompt.push_str(&format!(
            "## Template\nname: {}\nformat: {}\n",
            template.name, template.format
        ));
        if !template.fields.is_empty() {
            prompt.push_str(&format!("fields: {}\n", template.fields.join(", ")));
        }
        prompt.push('\n');
    }
    if let Some(enrichment) = ctx.enrichment.as_ref().filter(|e| !e.is_empty()) {
        prompt.push_str("## Application context\n");
        push_enrichment(prompt, enrichment);
        prompt.push('\n');
    }
}

fn push_enrichment(prompt: &mut String, e: &EnrichmentContext) {
    if let Some(link) = &e.app_link {
        prompt.push_str(&format!("Application: {link}\n"));
    }
    if let Some(link) = &e.prototype_link {
        prompt.push_str(&format!("Prototype: {link}\n"));
    }
    for link in &e.diagram_links {
        prompt.push_str(&format!("Diagram: {link}\n"));
    }
    for link in &e.image_links {
        prompt.push_str(&format!("Image: {link}\n"));
    }
    if let Some(notes) = e.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        prompt.push_str(&format!("Notes: {}\n", notes.trim()));
    }
}

fn push_guidance(prompt: &mut String, ctx: &GenerationContext) {
    if let Some(guidance) = &ctx.guidance {
        prompt.push_str("\n## Additional direction from the reviewer\n");
        prompt.push_str(guidance);
        prompt.push('\n');
    }
}
