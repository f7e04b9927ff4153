// Artifact payload types: requirements and test cases

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which kind of artifact a session produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Requirements,
    #[serde(rename = "testcases")]
    TestCases,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Requirements => write!(f, "requirements"),
            ArtifactKind::TestCases => write!(f, "testcases"),
        }
    }
}

/// A single testable requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementItem {
    pub id: String,
    pub text: String,
}

impl RequirementItem {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// One numbered step within a test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestStep {
    pub step: u32,
    pub action: String,
    pub expected: String,
    #[serde(default)]
    pub test_data: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "Critical",
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    /// Case-insensitive, since model output is not always capitalised
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(Priority::Critical),
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("unknown priority '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TestStatus {
    #[default]
    Draft,
    Ready,
    #[serde(rename = "In Review")]
    InReview,
    Approved,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Draft => "Draft",
            TestStatus::Ready => "Ready",
            TestStatus::InReview => "In Review",
            TestStatus::Approved => "Approved",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "draft" => Ok(TestStatus::Draft),
            "ready" => Ok(TestStatus::Ready),
            "inreview" => Ok(TestStatus::InReview),
            "approved" => Ok(TestStatus::Approved),
            _ => Err(format!("unknown status '{}'", s.trim())),
        }
    }
}

fn default_test_type() -> String {
    "Functional".to_string()
}

fn default_automation_status() -> String {
    "Manual".to_string()
}

/// A test case following the usual JIRA/Xray/TestRail field set.
///
/// `tags` carries the ids of the requirements the case traces to, plus any
/// free-form labels. It behaves as an insertion-ordered set: normalization
/// removes duplicates and keeps first occurrences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(rename = "type", default = "default_test_type")]
    pub test_type: String,
    #[serde(default)]
    pub status: TestStatus,
    #[serde(default)]
    pub preconditions: Option<String>,
    pub steps: Vec<TestStep>,
    #[serde(default)]
    pub expected_result: Option<String>,
    #[serde(default)]
    pub test_data: Option<String>,
    #[serde(default)]
    pub estimated_time: Option<String>,
    #[serde(default = "default_automation_status")]
    pub automation_status: String,
    #[serde(default)]
    pub component: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TestCase {
    /// Minimal test case with every optional field at its default
    pub fn new(id: impl Into<String>, title: impl Into<String>, steps: Vec<TestStep>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            priority: Priority::default(),
            test_type: default_test_type(),
            status: TestStatus::default(),
            preconditions: None,
            steps,
            expected_result: None,
            test_data: None,
            estimated_time: None,
            automation_status: default_automation_status(),
            component: None,
            tags: Vec::new(),
        }
    }

    /// True when the case exercises a negative path (by type or tag)
    pub fn is_negative(&self) -> bool {
        let mentions_negative = |s: &str| s.to_ascii_lowercase().contains("negative");
        mentions_negative(&self.test_type) || self.tags.iter().any(|t| mentions_negative(t))
    }
}

/// Output shape the caller asked for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseTemplate {
    pub name: String,
    pub format: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Extra links and notes that inform test-case generation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentContext {
    #[serde(default)]
    pub app_link: Option<String>,
    #[serde(default)]
    pub prototype_link: Option<String>,
    #[serde(default)]
    pub diagram_links: Vec<String>,
    #[serde(default)]
    pub image_links: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl EnrichmentContext {
    pub fn is_empty(&self) -> bool {
        self.app_link.is_none()
            && self.prototype_link.is_none()
            && self.diagram_links.is_empty()
            && self.image_links.is_empty()
            && self.notes.as_deref().map_or(true, |n| n.trim().is_empty())
    }
}
