//! Text extraction for uploaded documents.
//!
//! The format is chosen from the file extension alone. Pages or paragraphs that
//! yield no text are skipped; everything else is joined with newlines.

mod docx;
mod pdf;

use log::debug;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type. Use TXT, PDF, or DOCX.")]
    UnsupportedFormat(String),

    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse PDF: {0}")]
    Pdf(String),

    #[error("failed to parse DOCX: {0}")]
    Docx(String),

    #[error("extraction task failed: {0}")]
    Task(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Text,
    Pdf,
    Docx,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "txt" => Ok(DocumentFormat::Text),
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            _ => Err(ExtractError::UnsupportedFormat(ext)),
        }
    }
}

pub fn extract_text(path: &Path) -> Result<String, ExtractError> {
    let format = DocumentFormat::from_path(path)?;
    debug!("Extracting {:?} text from {}", format, path.display());

    match format {
        DocumentFormat::Text => Ok(fs::read_to_string(path)?),
        DocumentFormat::Pdf => pdf::extract(&fs::read(path)?),
        DocumentFormat::Docx => docx::extract(&fs::read(path)?),
    }
}

fn join_non_empty<I>(parts: I) -> String where I: IntoIterator<Item = String> {
    parts
        .into_iter()
        .filter(|p| !p.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
