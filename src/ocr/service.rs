//! OCR Service
//!
//! Runs the upload → submit → poll → transform pipeline against the backend
//! configured for each operation.

use std::sync::Arc;

use tracing::instrument;

use super::{
    backend::{AzureBackend, BackendProfile, OcrBackend},
    gate::validate_upload,
    poller::{poll_until_complete, PollPolicy},
    transform::{transform_tables, transform_text},
    types::{
        LayoutAnalyzeResult, OcrError, OcrOperation, ReadAnalyzeResult, TableExtraction,
        TextExtraction, UploadedFile,
    },
};
use crate::config::OcrConfig;

/// OCR service shared by all requests
#[derive(Clone)]
pub struct OcrService {
    read_backend: Arc<dyn OcrBackend>,
    layout_backend: Arc<dyn OcrBackend>,
    policy: PollPolicy,
}

impl OcrService {
    /// Create a service over explicit backends
    pub fn new(
        read_backend: Arc<dyn OcrBackend>,
        layout_backend: Arc<dyn OcrBackend>,
        policy: PollPolicy,
    ) -> Self {
        Self {
            read_backend,
            layout_backend,
            policy,
        }
    }

    /// Create a service with HTTP backends for both tenants
    pub fn from_config(config: &OcrConfig) -> Result<Self, OcrError> {
        let read = BackendProfile::read(
            &config.read.endpoint,
            &config.read.api_key,
            &config.read_api_version,
        );
        let layout = BackendProfile::layout(
            &config.layout.endpoint,
            &config.layout.api_key,
            &config.layout_model,
            &config.layout_api_version,
        );

        Ok(Self::new(
            Arc::new(AzureBackend::new(read, config.request_timeout)?),
            Arc::new(AzureBackend::new(layout, config.request_timeout)?),
            config.poll,
        ))
    }

    fn backend(&self, operation: OcrOperation) -> &dyn OcrBackend {
        match operation {
            OcrOperation::TextExtraction => self.read_backend.as_ref(),
            OcrOperation::TableExtraction => self.layout_backend.as_ref(),
        }
    }

    /// Validate, submit and wait for a job, returning its result payload
    async fn run_job(
        &self,
        file: Option<&UploadedFile>,
        operation: OcrOperation,
    ) -> Result<serde_json::Value, OcrError> {
        let file = validate_upload(file, operation)?;
        let backend = self.backend(operation);

        tracing::info!(
            backend = backend.name(),
            file_name = ?file.file_name,
            media_type = %file.media_type,
            size = file.data.len(),
            "Submitting document"
        );

        let handle = backend.submit(file.data.clone()).await?;
        tracing::debug!(job = %handle, "OCR job accepted");

        let payload = poll_until_complete(backend, &handle, &self.policy).await?;
        tracing::info!(job = %handle, "OCR job succeeded");

        Ok(payload)
    }

    /// Extract flat text and line provenance from an image or PDF
    #[instrument(
        name = "ocr",
        skip_all,
        fields(request_id = %uuid::Uuid::new_v4(), operation = "text_extraction")
    )]
    pub async fn extract_text(
        &self,
        file: Option<&UploadedFile>,
    ) -> Result<TextExtraction, OcrError> {
        let payload = self.run_job(file, OcrOperation::TextExtraction).await?;
        let result: ReadAnalyzeResult = serde_json::from_value(payload)
            .map_err(|e| OcrError::MalformedResult(format!("read result: {}", e)))?;

        let extraction = transform_text(&result).ok_or(OcrError::EmptyResult)?;
        tracing::info!(lines = extraction.detailed_data.len(), "Text extracted");
        Ok(extraction)
    }

    /// Extract tables from a PDF
    #[instrument(
        name = "ocr",
        skip_all,
        fields(request_id = %uuid::Uuid::new_v4(), operation = "table_extraction")
    )]
    pub async fn extract_tables(
        &self,
        file: Option<&UploadedFile>,
    ) -> Result<TableExtraction, OcrError> {
        let payload = self.run_job(file, OcrOperation::TableExtraction).await?;
        let result: LayoutAnalyzeResult = serde_json::from_value(payload)
            .map_err(|e| OcrError::MalformedResult(format!("layout result: {}", e)))?;

        let extraction = transform_tables(result.tables)?.ok_or(OcrError::NoTables)?;
        tracing::info!(tables = extraction.tables.len(), "Tables extracted");
        Ok(extraction)
    }
}
