// Document text extraction
//
// Turns an uploaded requirements document into plain text for the
// requirement extractor. Markdown and text are decoded as UTF-8 (lossy);
// .docx and .xlsx are parsed structurally.

pub mod docx;
pub mod excel;

use thiserror::Error;

/// Why an upload could not be turned into text
#[derive(Debug, Error)]
pub enum DocumentError {
    /// File type we have no parser for
    #[error("Unsupported file type '{0}'. Supported: .md, .markdown, .txt, .docx, .xlsx")]
    Unsupported(String),

    /// Supported type, but the bytes could not be parsed
    #[error("Could not read {name}: {source:#}")]
    Unreadable {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Recognised upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Markdown,
    PlainText,
    Docx,
    Xlsx,
}

impl DocumentFormat {
    /// Detect the format from the file name, falling back to the content type
    pub fn detect(filename: &str, content_type: Option<&str>) -> Option<Self> {
        let lower = filename.to_ascii_lowercase();
        let by_extension = match lower.rsplit_once('.').map(|(_, ext)| ext) {
            Some("md") | Some("markdown") => Some(Self::Markdown),
            Some("txt") => Some(Self::PlainText),
            Some("docx") => Some(Self::Docx),
            Some("xlsx") => Some(Self::Xlsx),
            _ => None,
        };
        by_extension.or_else(|| match content_type.map(|c| c.trim().to_ascii_lowercase()) {
            Some(ct) if ct.starts_with("text/markdown") => Some(Self::Markdown),
            Some(ct) if ct.starts_with("text/plain") => Some(Self::PlainText),
            Some(ct) if ct == "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(Self::Docx)
            }
            Some(ct) if ct == "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => {
                Some(Self::Xlsx)
            }
            _ => None,
        })
    }
}

/// Extract plain text from an uploaded document
pub fn extract_text(
    filename: &str,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<String, DocumentError> {
    let format = DocumentFormat::detect(filename, content_type)
        .ok_or_else(|| DocumentError::Unsupported(filename.to_string()))?;

    let unreadable = |source: anyhow::Error| DocumentError::Unreadable {
        name: filename.to_string(),
        source,
    };

    let text = match format {
        DocumentFormat::Markdown | DocumentFormat::PlainText => {
            String::from_utf8_lossy(bytes).into_owned()
        }
        DocumentFormat::Docx => docx::docx_to_text(bytes).map_err(unreadable)?,
        DocumentFormat::Xlsx => excel::xlsx_to_text(bytes).map_err(unreadable)?,
    };

    tracing::debug!(
        file = %filename,
        format = ?format,
        chars = text.len(),
        "Extracted document text"
    );
    Ok(text)
}
