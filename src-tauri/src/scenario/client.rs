//! HTTP client for the scenario API: inline and upload-then-run flows.

use super::config::{RequestFlow, ScenarioConfig};
use super::types::{RunRequest, UploadReply};
use super::OcrBackend;
use crate::error::OcrError;
use crate::upload::{self, UploadCandidate};
use serde_json::Value;

pub struct ScenarioClient {
    http: reqwest::Client,
    config: ScenarioConfig,
}

impl ScenarioClient {
    pub fn new(config: ScenarioConfig) -> Result<Self, OcrError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            config,
        })
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Run the configured flow and normalize the reply to display text.
    pub async fn recognize(&self, candidate: &UploadCandidate) -> Result<String, OcrError> {
        let start = std::time::Instant::now();
        let candidate = self.prepare(candidate)?;

        let reply = match self.config.flow {
            RequestFlow::Inline => self.run_inline(&candidate).await?,
            RequestFlow::UploadThenRun => {
                let file_id = self.upload_file(&candidate).await?;
                self.run_uploaded(&file_id).await?
            }
        };
        let text = self.config.reply.extract(&reply)?;

        log::info!(
            "[SCENARIO] {:?} flow complete: {} chars in {}ms",
            self.config.flow,
            text.chars().count(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }

    /// Apply optional JPEG normalization.
    fn prepare(&self, candidate: &UploadCandidate) -> Result<UploadCandidate, OcrError> {
        if !self.config.transcode_jpeg {
            return Ok(candidate.clone());
        }
        let jpeg = upload::to_jpeg(candidate.bytes())?;
        Ok(candidate.with_bytes("image/jpeg", jpeg))
    }

    /// Flow A: one run call with the image inlined.
    pub async fn run_inline(&self, candidate: &UploadCandidate) -> Result<Value, OcrError> {
        let base64 = candidate.to_base64();
        log::info!("[SCENARIO] Inline payload: {} base64 chars", base64.len());
        self.run_scenario(&RunRequest::inline(base64, &self.config.user))
            .await
    }

    /// Flow B, step 1: multipart upload. Returns the remote file id.
    pub async fn upload_file(&self, candidate: &UploadCandidate) -> Result<String, OcrError> {
        let start = std::time::Instant::now();
        let part = reqwest::multipart::Part::bytes(candidate.bytes().to_vec())
            .file_name(candidate.name.clone())
            .mime_str(&candidate.mime_type)?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("user", self.config.user.clone());

        let response = self
            .http
            .post(self.config.upload_url())
            .bearer_auth(&self.config.token)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("[UPLOAD] Upload returned {}: {}", status, body);
            return Err(OcrError::Upload {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response.text().await?;
        let reply: UploadReply = serde_json::from_str(&body)
            .map_err(|e| OcrError::Format(format!("upload reply is not JSON: {}", e)))?;
        let id = reply
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| OcrError::Format("upload reply has no file id".to_string()))?;

        log::info!(
            "[UPLOAD] Uploaded {} bytes in {}ms",
            candidate.size,
            start.elapsed().as_millis()
        );
        Ok(id)
    }

    /// Flow B, step 2: run referencing the uploaded file.
    pub async fn run_uploaded(&self, file_id: &str) -> Result<Value, OcrError> {
        self.run_scenario(&RunRequest::uploaded(file_id, &self.config.user))
            .await
    }

    async fn run_scenario(&self, body: &RunRequest<'_>) -> Result<Value, OcrError> {
        let start = std::time::Instant::now();
        let response = self
            .http
            .post(self.config.run_url())
            .bearer_auth(&self.config.token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("[SCENARIO] API returned {}: {}", status, body);
            return Err(OcrError::Api {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }
        log::info!("[SCENARIO] API latency: {}ms", start.elapsed().as_millis());

        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| OcrError::Format(format!("reply is not JSON: {}", e)))
    }
}

impl OcrBackend for ScenarioClient {
    async fn recognize(&self, candidate: &UploadCandidate) -> Result<String, OcrError> {
        ScenarioClient::recognize(self, candidate).await
    }
}
