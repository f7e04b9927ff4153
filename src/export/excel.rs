// XLSX export with a styled header and priority colour coding

use anyhow::{Context, Result};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};

use super::csv::HEADERS;
use super::{opt, steps_text, tags_text};
use crate::artifact::{Priority, TestCase, TestStep};

const SHEET_NAME: &str = "Test Cases";
const HEADER_FILL: u32 = 0x4472C4;
const COLUMN_WIDTHS: [f64; 14] = [
    12.0, 40.0, 50.0, 10.0, 15.0, 12.0, 40.0, 60.0, 40.0, 30.0, 15.0, 18.0, 20.0, 30.0,
];
const PRIORITY_COLUMN: u16 = 3;

fn priority_fill(priority: Priority) -> u32 {
    match priority {
        Priority::Critical => 0xFF6B6B,
        Priority::High => 0xFFA500,
        Priority::Medium => 0xFFD93D,
        Priority::Low => 0x6BCB77,
    }
}

fn step_block(step: &TestStep) -> String {
    let mut block = format!("{}. {}\n   → {}", step.step, step.action, step.expected);
    if let Some(data) = step.test_data.as_deref().filter(|d| !d.is_empty()) {
        block.push_str(&format!("\n   [Data: {}]", data));
    }
    block
}

fn cell_format() -> Format {
    Format::new()
        .set_text_wrap()
        .set_align(FormatAlign::Top)
        .set_border(FormatBorder::Thin)
}

pub fn to_xlsx(test_cases: &[TestCase]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap();
    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }
    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        sheet.set_column_width(col as u16, *width)?;
    }
    sheet.set_freeze_panes(1, 0)?;

    let body = cell_format();
    for (i, tc) in test_cases.iter().enumerate() {
        let row = (i + 1) as u32;
        let steps = steps_text(&tc.steps, step_block);
        let tags = tags_text(&tc.tags);
        let values = [
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
        ];
        for (col, value) in values.iter().enumerate() {
            let col = col as u16;
            if col == PRIORITY_COLUMN {
                let format = cell_format()
                    .set_background_color(Color::RGB(priority_fill(tc.priority)))
                    .set_align(FormatAlign::Center);
                sheet.write_string_with_format(row, col, *value, &format)?;
            } else {
                sheet.write_string_with_format(row, col, *value, &body)?;
            }
        }
    }

    workbook
        .save_to_buffer()
        .context("Failed to render XLSX workbook")
}
