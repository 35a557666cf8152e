//! OCR Module
//!
//! Extracts text and tables from uploaded documents using an asynchronous
//! OCR backend.
//!
//! The pipeline for every request is:
//! - validate the upload against the operation's media types
//! - submit the raw bytes and read the job handle (`Operation-Location`)
//! - poll the job within the configured [`PollPolicy`]
//! - transform the result into text lines or dense tables
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ocr_gateway_server::ocr::{OcrService, UploadedFile};
//!
//! let service = OcrService::from_config(&config.ocr)?;
//! let file = UploadedFile::new(bytes, "application/pdf");
//!
//! let text = service.extract_text(Some(&file)).await?;
//! let tables = service.extract_tables(Some(&file)).await?;
//! ```

mod backend;
mod gate;
mod poller;
mod service;
mod transform;
mod types;

pub use backend::{AzureBackend, BackendProfile, OcrBackend};
pub use gate::validate_upload;
pub use poller::{poll_until_complete, PollPolicy};
pub use service::OcrService;
pub use transform::{build_table, transform_tables, transform_text, MAX_GRID_CELLS};
pub use types::{
    Cell, ErrorKind, JobHandle, JobStatus, OcrError, OcrOperation, ReadAnalyzeResult, ReadLine,
    ReadPage, Table, TableExtraction, TextExtraction, TextLine, UploadedFile,
};

#[cfg(test)]
pub use backend::MockBackend;
