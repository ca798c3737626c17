use crate::errors::TailorError;

/// Extracts the text layer of a PDF. Encrypted or corrupt files surface as `Extraction`.
pub fn extract_text(bytes: &[u8]) -> Result<String, TailorError> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| TailorError::Extraction(format!("Failed to extract text from PDF: {e}")))
}
