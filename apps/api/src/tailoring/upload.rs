use axum::extract::Multipart;
use bytes::Bytes;

use crate::document::DocumentFormat;
use crate::errors::{AppError, TailorError};

/// An uploaded resume with the format it will be parsed as.
pub struct UploadedResume {
    pub filename: String,
    pub data: Bytes,
    pub format: DocumentFormat,
}

/// Parsed form fields from the multipart upload.
pub struct TailorForm {
    pub resume: UploadedResume,
    pub job_description: String,
}

/// Parse a multipart form with a `resume` file, a `job_description` text field
/// and an optional `format` field overriding filename-based detection.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<TailorForm, AppError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut format_tag: Option<String> = None;
    let mut job_description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read form field: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "resume" => {
                let filename = field.file_name().unwrap_or("resume").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read resume file: {e}")))?;
                file = Some((filename, data));
            }
            "format" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read format: {e}")))?;
                if !value.trim().is_empty() {
                    format_tag = Some(value);
                }
            }
            "job_description" => {
                job_description = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read job_description: {e}"))
                })?);
            }
            other => {
                tracing::debug!("Ignoring unknown form field '{other}'");
            }
        }
    }

    let (filename, data) =
        file.ok_or_else(|| AppError::Validation("Missing 'resume' file field".to_string()))?;
    if data.is_empty() {
        return Err(AppError::Validation("Uploaded resume is empty".to_string()));
    }

    let job_description = job_description
        .filter(|jd| !jd.trim().is_empty())
        .ok_or_else(|| AppError::Validation("job_description cannot be empty".to_string()))?;

    let format = detect_format(format_tag.as_deref(), &filename, &data)?;

    Ok(TailorForm {
        resume: UploadedResume {
            filename,
            data,
            format,
        },
        job_description,
    })
}

/// Explicit tag wins; then the filename extension; then magic bytes.
fn detect_format(
    tag: Option<&str>,
    filename: &str,
    data: &[u8],
) -> Result<DocumentFormat, TailorError> {
    if let Some(tag) = tag {
        return tag.parse();
    }
    DocumentFormat::from_filename(filename).or_else(|err| DocumentFormat::sniff(data).ok_or(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_tag_overrides_filename() {
        let format = detect_format(Some("txt"), "resume.pdf", b"%PDF-1.7").unwrap();
        assert_eq!(format, DocumentFormat::Text);
    }

    #[test]
    fn test_unknown_extension_falls_back_to_magic_bytes() {
        let format = detect_format(None, "upload.bin", b"%PDF-1.7\n").unwrap();
        assert_eq!(format, DocumentFormat::Pdf);
    }

    #[test]
    fn test_unrecognizable_upload_is_unsupported() {
        let err = detect_format(None, "resume.odt", b"<office:document>").unwrap_err();
        assert!(matches!(err, TailorError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_bad_explicit_tag_is_unsupported() {
        let err = detect_format(Some("rtf"), "resume.docx", b"PK\x03\x04").unwrap_err();
        assert!(matches!(err, TailorError::UnsupportedFormat(_)));
    }
}
