// Export of approved test cases to files and (stubbed) integrations

pub mod csv;
pub mod excel;
pub mod integrations;
pub mod json;

use anyhow::Result;
use std::fmt;
use std::str::FromStr;

use crate::artifact::{TestCase, TestStep};

pub use integrations::{jira_stub, playwright_stub, IntegrationStatus, JiraExportResult, PlaywrightResult};
pub use json::{import_json, JsonExport, JSON_EXPORT_FORMAT};

/// File formats a test-case list can be downloaded as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Excel,
    Json,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Json => "application/json",
        }
    }

    pub fn filename(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "test_cases.csv",
            ExportFormat::Excel => "test_cases.xlsx",
            ExportFormat::Json => "test_cases.json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Excel => write!(f, "excel"),
            ExportFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "json" => Ok(ExportFormat::Json),
            _ => anyhow::bail!("Unknown export format: {}", s),
        }
    }
}

/// A rendered download
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: &'static str,
}

impl ExportedFile {
    /// Value for the `Content-Disposition` response header
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename={}", self.filename)
    }
}

/// Render `test_cases` in `format`
pub fn export(format: ExportFormat, test_cases: &[TestCase]) -> Result<ExportedFile> {
    let bytes = match format {
        ExportFormat::Csv => csv::to_csv(test_cases)?,
        ExportFormat::Excel => excel::to_xlsx(test_cases)?,
        ExportFormat::Json => json::to_json(test_cases)?,
    };
    tracing::info!(%format, count = test_cases.len(), bytes = bytes.len(), "Exported test cases");
    Ok(ExportedFile {
        bytes,
        content_type: format.content_type(),
        filename: format.filename(),
    })
}

pub(crate) fn tags_text(tags: &[String]) -> String {
    tags.join(", ")
}

pub(crate) fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

/// Steps rendered one per line for single-cell formats
pub(crate) fn steps_text(steps: &[TestStep], render: impl Fn(&TestStep) -> String) -> String {
    steps.iter().map(render).collect::<Vec<_>>().join("\n")
}
