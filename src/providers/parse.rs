// Mapping model output onto the artifact schema
//
// Models are asked for JSON, but still wrap it in fences or prose now and
// then. We strip that, locate the JSON value and map it strictly: anything
// that does not fit the schema is a ParseFailure, never a partial artifact.

use serde::Deserialize;
use serde_json::Value;

use crate::artifact::{ArtifactKind, Artifact, Priority, RequirementItem, TestCase, TestStatus, TestStep};
use crate::errors::{GenerationError, GenerationResult};

use super::types::Critique;

/// Strip leading/trailing markdown code fences (```json ... ``` or ``` ... ```)
pub fn strip_markdown_fences(s: &str) -> &str {
    let s = s.trim();
    let s = if let Some(rest) = s.strip_prefix("```json") {
        rest
    } else if let Some(rest) = s.strip_prefix("```") {
        rest
    } else {
        s
    };
    if let Some(rest) = s.strip_suffix("```") {
        rest.trim()
    } else {
        s.trim()
    }
}

/// Locate the outermost JSON object or array in `text`
pub fn extract_json(text: &str) -> Option<&str> {
    let stripped = strip_markdown_fences(text);
    if stripped.starts_with('{') || stripped.starts_with('[') {
        return Some(stripped);
    }
    let start = match (stripped.find('{'), stripped.find('[')) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => return None,
    };
    let end = match (stripped.rfind('}'), stripped.rfind(']')) {
        (Some(a), Some(b)) => a.max(b),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => return None,
    };
    (end > start).then(|| &stripped[start..=end])
}

fn parse_value(text: &str) -> GenerationResult<Value> {
    let json = extract_json(text)
        .ok_or_else(|| GenerationError::parse("model output contains no JSON value"))?;
    serde_json::from_str(json)
        .map_err(|e| GenerationError::parse(format!("model output is not valid JSON: {e}")))
}

/// Accept either a bare array or an object holding the array under `key`
fn take_list(value: Value, key: &str) -> GenerationResult<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(GenerationError::parse(format!("'{key}' is not an array"))),
            None => Err(GenerationError::parse(format!("object has no '{key}' array"))),
        },
        _ => Err(GenerationError::parse(format!("expected an array of {key}"))),
    }
}

/// Render a scalar as text; null and blank strings become None
fn text_of(value: Option<Value>, field: &str) -> GenerationResult<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let s = s.trim();
            Ok((!s.is_empty()).then(|| s.to_string()))
        }
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(GenerationError::parse(format!("'{field}' must be a scalar"))),
    }
}

fn required_text(value: Option<Value>, field: &str) -> GenerationResult<String> {
    text_of(value, field)?.ok_or_else(|| GenerationError::parse(format!("'{field}' is missing or empty")))
}

/// Parse a provider answer into an artifact of `kind`
pub fn parse_artifact(kind: ArtifactKind, text: &str) -> GenerationResult<Artifact> {
    let artifact = match kind {
        ArtifactKind::Requirements => Artifact::Requirements(parse_requirements(text)?),
        ArtifactKind::TestCases => Artifact::TestCases(parse_test_cases(text)?),
    };
    if artifact.is_empty() {
        return Err(GenerationError::parse(format!("model returned no {kind}")));
    }
    Ok(artifact)
}

pub fn parse_requirements(text: &str) -> GenerationResult<Vec<RequirementItem>> {
    take_list(parse_value(text)?, "requirements")?
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            let Value::Object(mut map) = item else {
                return Err(GenerationError::parse(format!("requirement #{} is not an object", idx + 1)));
            };
            let id = text_of(map.remove("id"), "id")?.unwrap_or_default();
            let text = required_text(map.remove("text"), "text")?;
            Ok(RequirementItem { id, text })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct RawStep {
    #[serde(default)]
    step: Option<Value>,
    #[serde(default)]
    action: Option<Value>,
    #[serde(default)]
    expected: Option<Value>,
    #[serde(default)]
    test_data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawTestCase {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    title: Option<Value>,
    #[serde(default)]
    description: Option<Value>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default, rename = "type")]
    test_type: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    preconditions: Option<Value>,
    #[serde(default)]
    steps: Vec<RawStep>,
    #[serde(default)]
    expected_result: Option<Value>,
    #[serde(default)]
    test_data: Option<Value>,
    #[serde(default)]
    estimated_time: Option<Value>,
    #[serde(default)]
    automation_status: Option<String>,
    #[serde(default)]
    component: Option<Value>,
    #[serde(default)]
    tags: Vec<String>,
}

impl RawTestCase {
    fn into_test_case(self) -> GenerationResult<TestCase> {
        let title = required_text(self.title, "title")?;
        let steps = self
            .steps
            .into_iter()
            .enumerate()
            .map(|(idx, raw)| raw.into_step(idx as u32 + 1))
            .collect::<GenerationResult<Vec<_>>>()?;

        let mut tc = TestCase::new(text_of(self.id, "id")?.unwrap_or_default(), title, steps);
        tc.description = text_of(self.description, "description")?;
        if let Some(p) = self.priority.filter(|p| !p.trim().is_empty()) {
            tc.priority = p.parse::<Priority>().map_err(GenerationError::parse)?;
        }
        if let Some(t) = self.test_type.filter(|t| !t.trim().is_empty()) {
            tc.test_type = t.trim().to_string();
        }
        if let Some(s) = self.status.filter(|s| !s.trim().is_empty()) {
            tc.status = s.parse::<TestStatus>().map_err(GenerationError::parse)?;
        }
        tc.preconditions = text_of(self.preconditions, "preconditions")?;
        tc.expected_result = text_of(self.expected_result, "expected_result")?;
        tc.test_data = text_of(self.test_data, "test_data")?;
        tc.estimated_time = text_of(self.estimated_time, "estimated_time")?;
        if let Some(a) = self.automation_status.filter(|a| !a.trim().is_empty()) {
            tc.automation_status = a.trim().to_string();
        }
        tc.component = text_of(self.component, "component")?;
        tc.tags = self.tags;
        Ok(tc)
    }
}

impl RawStep {
    /// `position` stands in for a missing step number
    fn into_step(self, position: u32) -> GenerationResult<TestStep> {
        let step = match self.step {
            None | Some(Value::Null) => position,
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| GenerationError::parse(format!("step number {n} is not a positive integer")))?,
            Some(Value::String(s)) => s
                .trim()
                .parse::<u32>()
                .map_err(|_| GenerationError::parse(format!("step number '{s}' is not an integer")))?,
            Some(_) => return Err(GenerationError::parse("step number must be an integer")),
        };
        Ok(TestStep {
            step,
            action: required_text(self.action, "action")?,
            expected: required_text(self.expected, "expected")?,
            test_data: text_of(self.test_data, "test_data")?,
        })
    }
}

pub fn parse_test_cases(text: &str) -> GenerationResult<Vec<TestCase>> {
    take_list(parse_value(text)?, "test_cases")?
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            let raw: RawTestCase = serde_json::from_value(item).map_err(|e| {
                GenerationError::parse(format!("test case #{} does not match the schema: {e}", idx + 1))
            })?;
            raw.into_test_case()
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct RawCritique {
    approved: Option<bool>,
    #[serde(default)]
    deficiencies: Vec<String>,
}

/// Parse a critique verdict.
///
/// A missing `approved` flag, or a rejection that names no deficiency, cannot
/// drive the gate and is a ParseFailure.
pub fn parse_critique(text: &str) -> GenerationResult<Critique> {
    let raw: RawCritique = serde_json::from_value(parse_value(text)?)
        .map_err(|e| GenerationError::parse(format!("critique does not match the schema: {e}")))?;
    let approved = raw
        .approved
        .ok_or_else(|| GenerationError::parse("critique has no 'approved' flag"))?;
    let deficiencies: Vec<String> = raw
        .deficiencies
        .into_iter()
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .collect();

    if approved {
        return Ok(Critique::approve());
    }
    if deficiencies.is_empty() {
        return Err(GenerationError::parse("critique rejected the artifact without naming a deficiency"));
    }
    Ok(Critique::reject(deficiencies))
}
