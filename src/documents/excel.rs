// Excel (.xlsx) text extraction
//
// Sheets whose header row names a requirement or id column are read as
// requirement tables; anything else is flattened one row per line.

use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use std::io::Cursor;

const REQUIREMENT_KEYWORDS: &[&str] = &[
    "requirement",
    "description",
    "story",
    "user story",
    "feature",
    "acceptance criteria",
    "spec",
    "specification",
];

const ID_KEYWORDS: &[&str] = &["id", "req id", "requirement id", "story id", "key", "#"];

pub fn xlsx_to_text(bytes: &[u8]) -> Result<String> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| anyhow!("Failed to open workbook: {}", e))?;

    let sheet_names = workbook.sheet_names();
    let with_banners = sheet_names.len() > 1;
    let mut lines = Vec::new();

    for name in &sheet_names {
        let range = workbook
            .worksheet_range(name)
            .map_err(|e| anyhow!("{}", e))
            .with_context(|| format!("Failed to read sheet '{}'", name))?;
        let rows: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();

        let sheet_lines = sheet_to_lines(&rows);
        if sheet_lines.is_empty() {
            continue;
        }
        if with_banners {
            lines.push(format!("--- {} ---", name));
        }
        lines.extend(sheet_lines);
    }

    tracing::debug!(sheets = sheet_names.len(), lines = lines.len(), "Extracted workbook text");
    Ok(lines.join("\n"))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

fn matches_any(header: &str, keywords: &[&str]) -> bool {
    let header = header.to_lowercase();
    keywords.iter().any(|k| header.contains(k))
}

/// Lines for one sheet, already trimmed, empty lines dropped
fn sheet_to_lines(rows: &[Vec<String>]) -> Vec<String> {
    let Some(header) = rows.first() else {
        return Vec::new();
    };
    let structured = header
        .iter()
        .any(|h| matches_any(h, REQUIREMENT_KEYWORDS) || matches_any(h, ID_KEYWORDS));

    if structured {
        structured_lines(header, &rows[1..])
    } else {
        rows.iter()
            .map(|row| {
                row.iter()
                    .filter(|c| !c.is_empty())
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|line| !line.is_empty())
            .collect()
    }
}

fn structured_lines(header: &[String], body: &[Vec<String>]) -> Vec<String> {
    let text_col = header
        .iter()
        .position(|h| matches_any(h, REQUIREMENT_KEYWORDS))
        .unwrap_or(if header.len() > 1 { 1 } else { 0 });
    let id_col = header.iter().position(|h| matches_any(h, ID_KEYWORDS));

    body.iter()
        .filter_map(|row| {
            let text = row.get(text_col).map(|s| s.trim()).unwrap_or_default();
            if text.is_empty() {
                return None;
            }
            let id = id_col
                .and_then(|c| row.get(c))
                .map(|s| s.trim())
                .unwrap_or_default();
            Some(if id.is_empty() {
                text.to_string()
            } else {
                format!("{}: {}", id, text)
            })
        })
        .collect()
}
