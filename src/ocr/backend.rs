//! OCR Backends
//!
//! Defines the backend trait and the HTTP implementation used for both the
//! read and the layout tenant.

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;

use super::types::{BackendStatus, JobHandle, JobStatus, OcrError, PollResponse};

/// Header carrying the backend subscription key
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Header carrying the job handle on an accepted submission
const OPERATION_LOCATION_HEADER: &str = "operation-location";

/// Asynchronous OCR backend: submit a document, then poll the job
#[async_trait]
pub trait OcrBackend: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Submit raw document bytes, returning the job handle
    async fn submit(&self, data: Bytes) -> Result<JobHandle, OcrError>;

    /// Query the current status of a job
    async fn poll(&self, handle: &JobHandle) -> Result<JobStatus, OcrError>;
}

/// Endpoint, credential and analysis path of one backend tenant
#[derive(Debug, Clone)]
pub struct BackendProfile {
    pub name: String,
    pub endpoint: String,
    pub api_key: String,
    /// Path (and query) of the analyze call, relative to the endpoint
    pub analyze_path: String,
}

impl BackendProfile {
    /// Generic read analysis, used for text extraction
    pub fn read(endpoint: &str, api_key: &str, api_version: &str) -> Self {
        Self {
            name: "read".to_string(),
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            analyze_path: format!("/vision/{}/read/analyze", api_version),
        }
    }

    /// Layout analysis with a table-aware model, used for table extraction
    pub fn layout(endpoint: &str, api_key: &str, model: &str, api_version: &str) -> Self {
        Self {
            name: "layout".to_string(),
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            analyze_path: format!(
                "/formrecognizer/documentModels/{}:analyze?api-version={}",
                model, api_version
            ),
        }
    }

    pub fn analyze_url(&self) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), self.analyze_path)
    }
}

/// HTTP backend speaking the submit / operation-location / poll protocol
pub struct AzureBackend {
    client: reqwest::Client,
    profile: BackendProfile,
}

impl AzureBackend {
    pub fn new(profile: BackendProfile, request_timeout: Duration) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self { client, profile })
    }
}

#[async_trait]
impl OcrBackend for AzureBackend {
    fn name(&self) -> &str {
        &self.profile.name
    }

    async fn submit(&self, data: Bytes) -> Result<JobHandle, OcrError> {
        let url = self.profile.analyze_url();
        tracing::debug!(
            backend = %self.profile.name,
            %url,
            bytes = data.len(),
            "Submitting OCR job"
        );

        let response = self
            .client
            .post(&url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.profile.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(data)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::UnexpectedStatus { status, body });
        }

        let location = response
            .headers()
            .get(OPERATION_LOCATION_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .ok_or(OcrError::MissingOperationLocation)?;

        Ok(JobHandle::new(location))
    }

    async fn poll(&self, handle: &JobHandle) -> Result<JobStatus, OcrError> {
        let response = self
            .client
            .get(handle.as_str())
            .header(SUBSCRIPTION_KEY_HEADER, &self.profile.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::UnexpectedStatus { status, body });
        }

        let body = response.bytes().await?;
        let parsed: PollResponse = serde_json::from_slice(&body).map_err(|e| {
            OcrError::MalformedResult(format!("Failed to parse poll response: {}", e))
        })?;

        Ok(match parsed.status {
            BackendStatus::NotStarted | BackendStatus::Running => JobStatus::Running,
            BackendStatus::Succeeded => {
                let result = parsed.analyze_result.ok_or_else(|| {
                    OcrError::MalformedResult("succeeded job has no analyzeResult".to_string())
                })?;
                JobStatus::Succeeded(result)
            }
            BackendStatus::Failed => JobStatus::Failed,
            BackendStatus::Unknown => {
                tracing::warn!(
                    backend = %self.profile.name,
                    job = %handle,
                    "Unknown job status, still waiting"
                );
                JobStatus::Running
            }
        })
    }
}

/// Scripted backend for tests
#[cfg(test)]
pub struct MockBackend {
    statuses: std::sync::Mutex<std::collections::VecDeque<JobStatus>>,
    fail_submit: bool,
    submits: std::sync::atomic::AtomicUsize,
    polls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockBackend {
    /// Backend that answers polls with `statuses` in order, then `Running` forever
    pub fn with_statuses(statuses: Vec<JobStatus>) -> Self {
        Self {
            statuses: std::sync::Mutex::new(statuses.into()),
            fail_submit: false,
            submits: Default::default(),
            polls: Default::default(),
        }
    }

    /// Backend whose submission never returns a job handle
    pub fn without_operation_location() -> Self {
        Self {
            fail_submit: true,
            ..Self::with_statuses(Vec::new())
        }
    }

    pub fn submit_count(&self) -> usize {
        self.submits.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn poll_count(&self) -> usize {
        self.polls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl OcrBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn submit(&self, _data: Bytes) -> Result<JobHandle, OcrError> {
        self.submits.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.fail_submit {
            return Err(OcrError::MissingOperationLocation);
        }
        Ok(JobHandle::new("http://backend.test/operations/1"))
    }

    async fn poll(&self, _handle: &JobHandle) -> Result<JobStatus, OcrError> {
        self.polls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let next = self.statuses.lock().unwrap().pop_front();
        Ok(next.unwrap_or(JobStatus::Running))
    }
}
