//! Application state management

use std::sync::Arc;

use crate::config::{Config, ServerConfig};
use crate::ocr::{OcrError, OcrService};

/// Error type for state initialization
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Failed to initialize OCR backends: {0}")]
    OcrInit(#[from] OcrError),
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    server: ServerConfig,
    ocr: OcrService,
}

impl AppState {
    /// Create application state over an existing OCR service
    pub fn new(server: ServerConfig, ocr: OcrService) -> Self {
        Self {
            inner: Arc::new(AppStateInner { server, ocr }),
        }
    }

    /// Create application state with HTTP backends from configuration
    pub fn from_config(config: &Config) -> Result<Self, StateError> {
        let ocr = OcrService::from_config(&config.ocr)?;
        Ok(Self::new(config.server.clone(), ocr))
    }

    /// Get the server configuration
    pub fn server_config(&self) -> &ServerConfig {
        &self.inner.server
    }

    /// Get the OCR service
    pub fn ocr(&self) -> &OcrService {
        &self.inner.ocr
    }
}
