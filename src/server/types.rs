// Request and response bodies for the HTTP API

use serde::{Deserialize, Serialize};

use crate::artifact::{EnrichmentContext, RequirementItem, TestCase, TestCaseTemplate};
use crate::refinement::ValidationReport;

/// Response of `/requirements/parse`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResponse {
    pub source_name: String,
    pub raw_text: String,
    pub requirements: Vec<RequirementItem>,
    pub version: u32,
}

/// Body of `/requirements/enrich`, also the optional `context` of a
/// generate request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrichRequest {
    #[serde(default)]
    pub requirements: Vec<RequirementItem>,
    #[serde(flatten)]
    pub enrichment: EnrichmentContext,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateTestCasesRequest {
    pub requirements: Vec<RequirementItem>,
    pub template: TestCaseTemplate,
    #[serde(default)]
    pub context: Option<EnrichRequest>,
    #[serde(default)]
    pub feedback: Option<String>,
    /// Latest test cases the client holds; with `feedback` this is a refine round
    #[serde(default)]
    pub existing_test_cases: Vec<TestCase>,
    /// Version of `existing_test_cases`
    #[serde(default)]
    pub version: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateTestCasesResponse {
    pub test_cases: Vec<TestCase>,
    pub version: u32,
    pub validation: Option<ValidationReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRequest {
    pub test_cases: Vec<TestCase>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraExportRequest {
    pub project_key: String,
    pub issue_type: String,
    pub test_cases: Vec<TestCase>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationRequest {
    pub test_cases: Vec<TestCase>,
    #[serde(default)]
    pub target_base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
