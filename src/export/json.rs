// JSON export and import (versioned envelope)

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::artifact::{normalize_test_cases, TestCase};

pub const JSON_EXPORT_FORMAT: &str = "test_cases_v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonExport {
    pub export_format: String,
    pub total_count: usize,
    pub test_cases: Vec<TestCase>,
}

pub fn to_json(test_cases: &[TestCase]) -> Result<Vec<u8>> {
    let export = JsonExport {
        export_format: JSON_EXPORT_FORMAT.to_string(),
        total_count: test_cases.len(),
        test_cases: test_cases.to_vec(),
    };
    serde_json::to_vec_pretty(&export).context("Failed to serialize test cases")
}

/// Read test cases back from an export.
///
/// Accepts the versioned envelope or a bare array; the result is normalized
/// so it can seed a refine round.
pub fn import_json(bytes: &[u8]) -> Result<Vec<TestCase>> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).context("Test case import is not valid JSON")?;

    let test_cases: Vec<TestCase> = if value.is_array() {
        serde_json::from_value(value).context("Invalid test case list")?
    } else {
        let export: JsonExport =
            serde_json::from_value(value).context("Invalid test case export")?;
        if export.export_format != JSON_EXPORT_FORMAT {
            bail!("Unsupported export format: {}", export.export_format);
        }
        export.test_cases
    };

    Ok(normalize_test_cases(test_cases))
}
