// Test-management and automation integrations
//
// Neither integration talks to anything yet. Both answer with a structured
// status so clients can tell a stub apart from a failure.

use serde::{Deserialize, Serialize};

use crate::artifact::TestCase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationStatus {
    NotConfigured,
    Stubbed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JiraExportResult {
    pub status: IntegrationStatus,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaywrightResult {
    pub status: IntegrationStatus,
    pub files: Vec<String>,
    pub notes: String,
}

pub fn jira_stub(project_key: &str, issue_type: &str, test_cases: &[TestCase]) -> JiraExportResult {
    tracing::info!(project_key, issue_type, count = test_cases.len(), "JIRA export requested");
    JiraExportResult {
        status: IntegrationStatus::NotConfigured,
        message: format!(
            "JIRA export adapter not configured. Would export {} test cases to project '{}' as '{}' issues. \
             Provide JIRA credentials and API configuration to enable this feature.",
            test_cases.len(),
            project_key,
            issue_type
        ),
    }
}

pub fn playwright_stub(test_cases: &[TestCase], target_base_url: Option<&str>) -> PlaywrightResult {
    tracing::info!(count = test_cases.len(), target_base_url, "Playwright generation requested");
    PlaywrightResult {
        status: IntegrationStatus::Stubbed,
        files: vec![
            "tests/pages/example_page.py".to_string(),
            "tests/test_generated_cases.py".to_string(),
        ],
        notes: "POM generation stub. Implement selectors and actions for your app.".to_string(),
    }
}
