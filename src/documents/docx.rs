// Word (.docx) text extraction
//
// Body paragraphs become lines; each table row becomes one line with its
// cells joined by " | ".

use anyhow::{anyhow, Result};

pub fn docx_to_text(bytes: &[u8]) -> Result<String> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| anyhow!("Failed to parse DOCX file: {}", e))?;
    let mut lines = Vec::new();
    for child in &docx.document.children {
        document_child(child, &mut lines);
    }
    Ok(lines.join("\n"))
}

fn document_child(child: &docx_rs::DocumentChild, lines: &mut Vec<String>) {
    match child {
        docx_rs::DocumentChild::Paragraph(paragraph) => {
            let text = paragraph_text(paragraph);
            if !text.trim().is_empty() {
                lines.push(text);
            }
        }
        docx_rs::DocumentChild::Table(table) => table_lines(table, lines),
        _ => {}
    }
}

fn paragraph_text(paragraph: &docx_rs::Paragraph) -> String {
    let mut buffer = String::new();
    for child in &paragraph.children {
        paragraph_child(child, &mut buffer);
    }
    buffer
}

fn paragraph_child(child: &docx_rs::ParagraphChild, buffer: &mut String) {
    match child {
        docx_rs::ParagraphChild::Run(run) => run_text(run, buffer),
        docx_rs::ParagraphChild::Hyperlink(link) => {
            for link_child in &link.children {
                paragraph_child(link_child, buffer);
            }
        }
        _ => {}
    }
}

fn run_text(run: &docx_rs::Run, buffer: &mut String) {
    for child in &run.children {
        match child {
            docx_rs::RunChild::Text(text) => buffer.push_str(&text.text),
            docx_rs::RunChild::Tab(_) => buffer.push('\t'),
            docx_rs::RunChild::Break(_) => buffer.push('\n'),
            _ => {}
        }
    }
}

fn table_lines(table: &docx_rs::Table, lines: &mut Vec<String>) {
    for row in &table.rows {
        let docx_rs::TableChild::TableRow(row) = row;
        let mut cells = Vec::new();
        for cell in &row.cells {
            let docx_rs::TableRowChild::TableCell(cell) = cell;
            let text = cell_text(cell);
            if !text.trim().is_empty() {
                cells.push(text);
            }
        }
        if !cells.is_empty() {
            lines.push(cells.join(" | "));
        }
    }
}

fn cell_text(cell: &docx_rs::TableCell) -> String {
    let mut parts = Vec::new();
    for content in &cell.children {
        match content {
            docx_rs::TableCellContent::Paragraph(paragraph) => {
                let text = paragraph_text(paragraph);
                if !text.trim().is_empty() {
                    parts.push(text);
                }
            }
            docx_rs::TableCellContent::Table(table) => {
                let mut nested = Vec::new();
                table_lines(table, &mut nested);
                if !nested.is_empty() {
                    parts.push(nested.join(" "));
                }
            }
            _ => {}
        }
    }
    parts.join(" ")
}
