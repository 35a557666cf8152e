//! OCR Types
//!
//! Defines the request, backend job and result types of the OCR pipeline.

use axum::body::Bytes;
use serde::{Deserialize, Deserializer, Serialize};

/// Media types accepted for plain text extraction
const TEXT_MEDIA_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/bmp",
    "image/tiff",
    "application/pdf",
];

/// Media types accepted for table extraction
const TABLE_MEDIA_TYPES: &[&str] = &["application/pdf"];

/// OCR operation requested by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OcrOperation {
    /// Flat text with per-line provenance (read analysis)
    TextExtraction,
    /// Structured tables (layout analysis)
    TableExtraction,
}

impl OcrOperation {
    /// Media types this operation accepts
    pub fn allowed_media_types(&self) -> &'static [&'static str] {
        match self {
            Self::TextExtraction => TEXT_MEDIA_TYPES,
            Self::TableExtraction => TABLE_MEDIA_TYPES,
        }
    }

    /// Message shown to the client when the upload has the wrong type
    pub fn unsupported_media_message(&self) -> &'static str {
        match self {
            Self::TextExtraction => "Uploaded file must be an image or PDF.",
            Self::TableExtraction => "Uploaded file must be a PDF.",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextExtraction => "text_extraction",
            Self::TableExtraction => "table_extraction",
        }
    }
}

impl std::fmt::Display for OcrOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file received from the client, held in memory for one request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub data: Bytes,
    pub media_type: String,
    pub file_name: Option<String>,
}

impl UploadedFile {
    pub fn new(data: impl Into<Bytes>, media_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            media_type: media_type.into(),
            file_name: None,
        }
    }

    /// Media type without parameters, lowercased
    pub fn essence(&self) -> String {
        self.media_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase()
    }
}

/// Reference to an in-progress backend job (the operation location URL)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status of a backend job as observed by one poll
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    Running,
    /// Terminal; carries the backend's `analyzeResult`
    Succeeded(serde_json::Value),
    Failed,
}

/// Status strings reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BackendStatus {
    NotStarted,
    Running,
    Succeeded,
    Failed,
    #[serde(other)]
    Unknown,
}

/// Body of a poll response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    pub status: BackendStatus,
    #[serde(default)]
    pub analyze_result: Option<serde_json::Value>,
}

/// Treat an explicit `null` list like a missing one
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Read (text) results
// ============================================================================

/// `analyzeResult` of a read job
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadAnalyzeResult {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub read_results: Vec<ReadPage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadPage {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub lines: Vec<ReadLine>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadLine {
    #[serde(default)]
    pub text: String,
}

/// One extracted line with its position in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextLine {
    /// Page number (1-indexed)
    pub page: usize,
    /// Line number within the page (1-indexed)
    pub line: usize,
    pub text: String,
}

/// Output of text extraction
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextExtraction {
    pub extracted_text: String,
    pub detailed_data: Vec<TextLine>,
}

// ============================================================================
// Layout (table) results
// ============================================================================

/// `analyzeResult` of a layout job; tables are kept raw for passthrough
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LayoutAnalyzeResult {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tables: Vec<serde_json::Value>,
}

/// A raw table as reported by the layout backend
#[derive(Debug, Clone, Deserialize)]
pub struct RawTable {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cells: Vec<Cell>,
}

/// One table cell
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub row_index: usize,
    pub column_index: usize,
    #[serde(default)]
    pub content: Option<String>,
}

/// A dense table: row 0 is the header, the rest is the body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub header: Vec<String>,
    pub body: Vec<Vec<String>>,
}

/// Output of table extraction
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableExtraction {
    pub tables: Vec<Table>,
    /// Untouched backend tables
    pub extracted_data: Vec<serde_json::Value>,
}

// ============================================================================
// Errors
// ============================================================================

/// How an [`OcrError`] is reported to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    EmptyResult,
    NotFound,
    Backend,
}

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("no file uploaded")]
    NoFile,

    #[error("unsupported media type: {media_type} for {operation}")]
    UnsupportedMediaType {
        operation: OcrOperation,
        media_type: String,
    },

    #[error("no text could be extracted")]
    EmptyResult,

    #[error("no tables found")]
    NoTables,

    #[error("operation location header not found")]
    MissingOperationLocation,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("processing failed")]
    ProcessingFailed,

    #[error("job did not complete within {0:?}")]
    PollTimeout(std::time::Duration),

    #[error("job still running after {0} polls")]
    PollAttemptsExhausted(u32),

    #[error("malformed backend result: {0}")]
    MalformedResult(String),
}

impl OcrError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoFile | Self::UnsupportedMediaType { .. } => ErrorKind::Validation,
            Self::EmptyResult => ErrorKind::EmptyResult,
            Self::NoTables => ErrorKind::NotFound,
            _ => ErrorKind::Backend,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_essence() {
        let file = UploadedFile::new(vec![1u8], "Application/PDF; charset=binary");
        assert_eq!(file.essence(), "application/pdf");
    }

    #[test]
    fn test_poll_response_statuses() {
        let running: PollResponse = serde_json::from_str(r#"{"status":"notStarted"}"#).unwrap();
        assert_eq!(running.status, BackendStatus::NotStarted);
        assert!(running.analyze_result.is_none());

        let odd: PollResponse = serde_json::from_str(r#"{"status":"partiallySucceeded"}"#).unwrap();
        assert_eq!(odd.status, BackendStatus::Unknown);
    }

    #[test]
    fn test_cell_null_content() {
        let cell: Cell =
            serde_json::from_str(r#"{"rowIndex":1,"columnIndex":2,"content":null}"#).unwrap();
        assert_eq!((cell.row_index, cell.column_index), (1, 2));
        assert!(cell.content.is_none());
    }

    #[test]
    fn test_null_lists_are_empty() {
        let read: ReadAnalyzeResult =
            serde_json::from_value(serde_json::json!({"readResults": null})).unwrap();
        assert!(read.read_results.is_empty());

        let page: ReadPage = serde_json::from_value(serde_json::json!({"lines": null})).unwrap();
        assert!(page.lines.is_empty());

        let layout: LayoutAnalyzeResult =
            serde_json::from_value(serde_json::json!({"tables": null})).unwrap();
        assert!(layout.tables.is_empty());

        let table: RawTable = serde_json::from_value(serde_json::json!({"cells": null})).unwrap();
        assert!(table.cells.is_empty());
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(OcrError::NoFile.kind(), ErrorKind::Validation);
        assert_eq!(OcrError::EmptyResult.kind(), ErrorKind::EmptyResult);
        assert_eq!(OcrError::NoTables.kind(), ErrorKind::NotFound);
        assert_eq!(OcrError::ProcessingFailed.kind(), ErrorKind::Backend);
        assert_eq!(OcrError::MissingOperationLocation.kind(), ErrorKind::Backend);
    }
}
