//! Upload validation
//!
//! Checks an uploaded file against the operation's allow-list before any
//! backend call is made.

use super::types::{OcrError, OcrOperation, UploadedFile};

/// Validate an upload for the given operation
pub fn validate_upload(
    file: Option<&UploadedFile>,
    operation: OcrOperation,
) -> Result<&UploadedFile, OcrError> {
    let file = match file {
        Some(file) if !file.data.is_empty() => file,
        _ => return Err(OcrError::NoFile),
    };

    let essence = file.essence();
    if !operation.allowed_media_types().contains(&essence.as_str()) {
        return Err(OcrError::UnsupportedMediaType {
            operation,
            media_type: file.media_type.clone(),
        });
    }

    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(media_type: &str) -> UploadedFile {
        UploadedFile::new(b"%PDF-1.7".to_vec(), media_type)
    }

    #[test]
    fn test_missing_file() {
        let result = validate_upload(None, OcrOperation::TextExtraction);
        assert!(matches!(result, Err(OcrError::NoFile)));
    }

    #[test]
    fn test_empty_file_counts_as_missing() {
        let empty = UploadedFile::new(Vec::new(), "image/png");
        let result = validate_upload(Some(&empty), OcrOperation::TextExtraction);
        assert!(matches!(result, Err(OcrError::NoFile)));
    }

    #[test]
    fn test_text_extraction_allow_list() {
        for media_type in [
            "image/jpeg",
            "image/png",
            "image/bmp",
            "image/tiff",
            "application/pdf",
        ] {
            let upload = file(media_type);
            assert!(
                validate_upload(Some(&upload), OcrOperation::TextExtraction).is_ok(),
                "{media_type} should be accepted"
            );
        }

        for media_type in ["image/gif", "text/plain", "application/octet-stream"] {
            let upload = file(media_type);
            assert!(matches!(
                validate_upload(Some(&upload), OcrOperation::TextExtraction),
                Err(OcrError::UnsupportedMediaType { .. })
            ));
        }
    }

    #[test]
    fn test_table_extraction_pdf_only() {
        let pdf = file("application/pdf");
        assert!(validate_upload(Some(&pdf), OcrOperation::TableExtraction).is_ok());

        for media_type in ["image/jpeg", "image/png", "image/bmp", "image/tiff"] {
            let upload = file(media_type);
            let err = validate_upload(Some(&upload), OcrOperation::TableExtraction).unwrap_err();
            match err {
                OcrError::UnsupportedMediaType { operation, media_type: got } => {
                    assert_eq!(operation, OcrOperation::TableExtraction);
                    assert_eq!(got, media_type);
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_media_type_parameters_ignored() {
        let upload = file("application/pdf; name=report.pdf");
        assert!(validate_upload(Some(&upload), OcrOperation::TableExtraction).is_ok());
    }
}
