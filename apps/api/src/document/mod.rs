//! Document Loader: turns uploaded resume bytes into an ordered line sequence.
//!
//! PDF goes through `pdf-extract`; DOCX paragraphs are read straight from the
//! `word/document.xml` part of the zip container; plain text is taken as-is.
//! PDF extraction is CPU-bound: async callers run `load_document` inside
//! `tokio::task::spawn_blocking`.

pub mod docx;
pub mod pdf;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::TailorError;
use crate::models::resume::ResumeDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Text,
}

impl DocumentFormat {
    /// Infers the format from an uploaded file's extension.
    pub fn from_filename(filename: &str) -> Result<Self, TailorError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                TailorError::UnsupportedFormat(format!("'{filename}' has no file extension"))
            })?;
        extension.parse()
    }

    /// Recognizes PDF and DOCX by their leading magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"%PDF-") {
            Some(DocumentFormat::Pdf)
        } else if bytes.starts_with(b"PK\x03\x04") {
            Some(DocumentFormat::Docx)
        } else {
            None
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = TailorError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            "txt" | "text" => Ok(DocumentFormat::Text),
            other => Err(TailorError::UnsupportedFormat(format!(
                "'{other}' (expected pdf, docx or txt)"
            ))),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Text => "txt",
        };
        f.write_str(tag)
    }
}

/// Extracts the visible text lines of a resume.
pub fn load_document(bytes: &[u8], format: DocumentFormat) -> Result<ResumeDocument, TailorError> {
    let document = match format {
        DocumentFormat::Pdf => ResumeDocument::from_text(&pdf::extract_text(bytes)?),
        DocumentFormat::Docx => ResumeDocument::from_lines(docx::extract_lines(bytes)?),
        DocumentFormat::Text => {
            let text = std::str::from_utf8(bytes).map_err(|e| {
                TailorError::Extraction(format!("Resume text is not valid UTF-8: {e}"))
            })?;
            ResumeDocument::from_text(text.strip_prefix('\u{feff}').unwrap_or(text))
        }
    };

    tracing::debug!("Loaded {} resume: {} lines", format, document.len());
    Ok(document)
}
