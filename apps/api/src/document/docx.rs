//! DOCX text extraction.
//!
//! A `.docx` file is a zip archive; the body lives in `word/document.xml`:
//! ```xml
//! <w:body>
//!   <w:p>
//!     <w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr>
//!     <w:r><w:t>Built a </w:t></w:r>
//!     <w:r><w:t xml:space="preserve">dashboard</w:t><w:br/><w:t>Second line</w:t></w:r>
//!   </w:p>
//! </w:body>
//! ```
//! Every `<w:p>` becomes one line. `<w:br/>` and `<w:cr/>` inside a run start a
//! new line, `<w:tab/>` inside a run becomes `\t`. Tab stops declared in
//! paragraph properties are ignored.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::errors::TailorError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Reads the paragraph lines of a DOCX document.
pub fn extract_lines(bytes: &[u8]) -> Result<Vec<String>, TailorError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| TailorError::Extraction(format!("Failed to open DOCX container: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| TailorError::Extraction(format!("DOCX has no {DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| TailorError::Extraction(format!("Failed to read {DOCUMENT_PART}: {e}")))?;

    parse_document_xml(&xml)
}

fn parse_document_xml(xml: &str) -> Result<Vec<String>, TailorError> {
    let mut reader = Reader::from_str(xml);

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:p" => current.clear(),
                b"w:r" => in_run = true,
                b"w:t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:p" => lines.push(String::new()),
                b"w:tab" if in_run => current.push('\t'),
                b"w:br" | b"w:cr" if in_run => lines.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t.unescape().map_err(|e| {
                    TailorError::Extraction(format!("Bad text in {DOCUMENT_PART}: {e}"))
                })?;
                current.push_str(&text);
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:p" => lines.push(std::mem::take(&mut current)),
                b"w:r" => in_run = false,
                b"w:t" => in_text = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(TailorError::Extraction(format!(
                    "Malformed {DOCUMENT_PART} at byte {}: {e}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
    }

    Ok(lines)
}
