//! Error types for the OCR gateway

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::ocr::{ErrorKind, OcrError};

/// Message returned for every backend or transport failure
pub const BACKEND_FAILURE_MESSAGE: &str = "Bad request, no file uploaded or file format error";

/// Message returned when no file was uploaded
pub const NO_FILE_MESSAGE: &str = "No file was uploaded.";

/// Message returned when the backend found no text
pub const EMPTY_TEXT_MESSAGE: &str = "No text could be extracted from the uploaded image.";

/// Message returned when the backend found no tables
pub const NO_TABLES_MESSAGE: &str = "No tables found in the document.";

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type; every message is safe to show to the client
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    EmptyResult(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Backend(String),
}

impl From<OcrError> for AppError {
    fn from(err: OcrError) -> Self {
        match err.kind() {
            ErrorKind::Validation => {
                tracing::debug!("Rejected upload: {}", err);
                let message = match &err {
                    OcrError::UnsupportedMediaType { operation, .. } => {
                        operation.unsupported_media_message().to_string()
                    }
                    _ => NO_FILE_MESSAGE.to_string(),
                };
                AppError::Validation(message)
            }
            ErrorKind::EmptyResult => AppError::EmptyResult(EMPTY_TEXT_MESSAGE.to_string()),
            ErrorKind::NotFound => AppError::NotFound(NO_TABLES_MESSAGE.to_string()),
            ErrorKind::Backend => {
                tracing::error!(error = ?err, "OCR backend error: {}", err);
                AppError::Backend(BACKEND_FAILURE_MESSAGE.to_string())
            }
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::EmptyResult(_) | AppError::Backend(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse {
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::OcrOperation;

    #[test]
    fn test_validation_messages() {
        let err = AppError::from(OcrError::NoFile);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), NO_FILE_MESSAGE);

        let err = AppError::from(OcrError::UnsupportedMediaType {
            operation: OcrOperation::TableExtraction,
            media_type: "image/png".to_string(),
        });
        assert_eq!(err.to_string(), "Uploaded file must be a PDF.");
    }

    #[test]
    fn test_not_found_is_404() {
        let err = AppError::from(OcrError::NoTables);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), NO_TABLES_MESSAGE);
    }

    #[test]
    fn test_backend_detail_not_exposed() {
        let err = AppError::from(OcrError::UnexpectedStatus {
            status: 401,
            body: "secret subscription detail".to_string(),
        });

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), BACKEND_FAILURE_MESSAGE);
    }

    #[test]
    fn test_empty_result_is_400() {
        let err = AppError::from(OcrError::EmptyResult);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), EMPTY_TEXT_MESSAGE);
    }
}
