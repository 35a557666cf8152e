//! OCR API endpoints
//!
//! - POST /ocr/image-to-text - Extract text from an image or PDF
//! - POST /ocr/table-to-json - Extract tables from a PDF
//!
//! Both endpoints take a multipart upload with the file in `processFile`.

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::ocr::{Table, TextLine, UploadedFile};
use crate::state::AppState;

/// Multipart field carrying the document
pub const UPLOAD_FIELD: &str = "processFile";

const UNREADABLE_UPLOAD_MESSAGE: &str = "Failed to read the uploaded file.";

/// Text extraction response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageToTextResponse {
    pub status: &'static str,
    pub extracted_text: String,
    pub detailed_data: Vec<TextLine>,
}

/// Table extraction response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableToJsonResponse {
    pub status: &'static str,
    pub tables: Vec<Table>,
    /// Raw backend tables
    pub extracted_data: Vec<serde_json::Value>,
}

/// Create the OCR router
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/image-to-text", post(image_to_text))
        .route("/table-to-json", post(table_to_json))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

/// POST /ocr/image-to-text
async fn image_to_text(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ImageToTextResponse>> {
    let file = read_upload(multipart).await?;
    let extraction = state.ocr().extract_text(file.as_ref()).await?;

    Ok(Json(ImageToTextResponse {
        status: "success",
        extracted_text: extraction.extracted_text,
        detailed_data: extraction.detailed_data,
    }))
}

/// POST /ocr/table-to-json
async fn table_to_json(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<TableToJsonResponse>> {
    let file = read_upload(multipart).await?;
    let extraction = state.ocr().extract_tables(file.as_ref()).await?;

    Ok(Json(TableToJsonResponse {
        status: "success",
        tables: extraction.tables,
        extracted_data: extraction.extracted_data,
    }))
}

/// Pull the `processFile` part out of a multipart upload.
///
/// A request that is not multipart at all is treated as having no file.
async fn read_upload(
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Option<UploadedFile>> {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::debug!("Request is not a multipart upload: {}", rejection);
            return Ok(None);
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("Failed to read multipart field: {}", e);
        AppError::Validation(UNREADABLE_UPLOAD_MESSAGE.to_string())
    })? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(|s| s.to_string());
        let media_type = match field.content_type() {
            Some(content_type) => content_type.to_string(),
            None => guess_media_type(file_name.as_deref()),
        };

        let data = field.bytes().await.map_err(|e| {
            tracing::warn!("Failed to read file data: {}", e);
            AppError::Validation(UNREADABLE_UPLOAD_MESSAGE.to_string())
        })?;

        tracing::debug!(
            file_name = ?file_name,
            media_type = %media_type,
            size = data.len(),
            "Received upload"
        );

        return Ok(Some(UploadedFile {
            data,
            media_type,
            file_name,
        }));
    }

    tracing::debug!("No {} field found in multipart upload", UPLOAD_FIELD);
    Ok(None)
}

/// Media type from the file extension, for parts sent without a Content-Type
fn guess_media_type(file_name: Option<&str>) -> String {
    file_name
        .map(|name| mime_guess::from_path(name).first_or_octet_stream())
        .unwrap_or(mime_guess::mime::APPLICATION_OCTET_STREAM)
        .essence_str()
        .to_string()
}
