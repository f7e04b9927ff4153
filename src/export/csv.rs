// CSV export: one row per test case, every field quoted

use anyhow::{Context, Result};
use csv::{QuoteStyle, WriterBuilder};

use super::{opt, steps_text, tags_text};
use crate::artifact::{TestCase, TestStep};

pub const HEADERS: [&str; 14] = [
    "ID",
    "Title",
    "Description",
    "Priority",
    "Type",
    "Status",
    "Preconditions",
    "Steps",
    "Expected Result",
    "Test Data",
    "Estimated Time",
    "Automation Status",
    "Component",
    "Tags",
];

fn step_line(step: &TestStep) -> String {
    let mut line = format!("{}. {} -> Expected: {}", step.step, step.action, step.expected);
    if let Some(data) = step.test_data.as_deref().filter(|d| !d.is_empty()) {
        line.push_str(&format!(" [Data: {}]", data));
    }
    line
}

pub fn to_csv(test_cases: &[TestCase]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new());
    writer.write_record(HEADERS).context("Failed to write CSV header")?;

    for tc in test_cases {
        let steps = steps_text(&tc.steps, step_line);
        let tags = tags_text(&tc.tags);
        writer
            .write_record([
                tc.id.as_str(),
                tc.title.as_str(),
                opt(&tc.description),
                tc.priority.as_str(),
                tc.test_type.as_str(),
                tc.status.as_str(),
                opt(&tc.preconditions),
                steps.as_str(),
                opt(&tc.expected_result),
                opt(&tc.test_data),
                opt(&tc.estimated_time),
                tc.automation_status.as_str(),
                opt(&tc.component),
                tags.as_str(),
            ])
            .with_context(|| format!("Failed to write CSV row for {}", tc.id))?;
    }

    writer.into_inner().context("Failed to flush CSV writer")
}
