//! HTTP implementation of [`PredictionService`] over reqwest.

use super::{DatasetUpload, PredictionService, Result};
use crate::config::ClientConfig;
use crate::error::ServiceError;
use anyhow::Context;
use async_trait::async_trait;
use claim_types::{ClaimPayload, PolicyRecord, PredictionResult};
use reqwest::{multipart, Client, Response, StatusCode};
use serde_json::Value;
use url::Url;

pub struct HttpPredictionClient {
    http: Client,
    base_url: Url,
    timeout_secs: u64,
}

impl HttpPredictionClient {
    pub fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        let base_url = config.base_url().context("Invalid Prediction Service URL")?;
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url,
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL plus percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn transport_error(&self, err: reqwest::Error) -> ServiceError {
        if err.is_timeout() {
            ServiceError::Timeout(self.timeout_secs)
        } else {
            ServiceError::Transport(err.to_string())
        }
    }

    fn decode_error(&self, endpoint: &str, err: reqwest::Error) -> ServiceError {
        if err.is_timeout() {
            return ServiceError::Timeout(self.timeout_secs);
        }
        ServiceError::Decode {
            endpoint: endpoint.to_string(),
            reason: err.to_string(),
        }
    }

    /// Pass 2xx responses through; turn anything else into `ServiceError::Status`.
    async fn ensure_success(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        tracing::warn!(status = status.as_u16(), %message, "Prediction Service returned an error");
        Err(ServiceError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_text(&self, url: Url, endpoint: &str) -> Result<String> {
        tracing::debug!(%url, "GET");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = self.ensure_success(response).await?;
        response
            .text()
            .await
            .map_err(|e| self.decode_error(endpoint, e))
    }
}

#[async_trait]
impl PredictionService for HttpPredictionClient {
    async fn get_record(&self, policy_id: &str) -> Result<PolicyRecord> {
        let url = self.endpoint(&["record", policy_id]);
        tracing::debug!(%url, "Fetching policy record");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let not_found = || ServiceError::NotFound {
            policy_id: policy_id.to_string(),
        };
        if response.status() == StatusCode::NOT_FOUND {
            return Err(not_found());
        }
        let response = self.ensure_success(response).await?;

        let record: Option<PolicyRecord> = response
            .json()
            .await
            .map_err(|e| self.decode_error("/record", e))?;
        record.ok_or_else(not_found)
    }

    async fn predict(&self, payload: &ClaimPayload) -> Result<PredictionResult> {
        let url = self.endpoint(&["predict"]);
        tracing::debug!(%url, "Submitting claim for scoring");

        let response = self
            .http
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = self.ensure_success(response).await?;

        response
            .json()
            .await
            .map_err(|e| self.decode_error("/predict", e))
    }

    async fn upload_dataset(&self, upload: DatasetUpload) -> Result<String> {
        let url = self.endpoint(&["summary", "upload"]);
        tracing::debug!(
            %url,
            file = %upload.file_name,
            bytes = upload.bytes.len(),
            "Uploading dataset"
        );

        let part = multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str("text/csv")
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = self.ensure_success(response).await?;

        response
            .text()
            .await
            .map_err(|e| self.decode_error("/summary/upload", e))
    }

    async fn get_summary(&self, dataset: &str) -> Result<String> {
        let url = self.endpoint(&["summary", dataset]);
        self.get_text(url, "/summary/{dataset}").await
    }

    async fn get_default_summary(&self) -> Result<String> {
        let url = self.endpoint(&["summary"]);
        self.get_text(url, "/summary").await
    }
}

/// Human message for a non-2xx body.
///
/// FastAPI wraps errors as `{"detail": "..."}` (or a list of `{"msg": ...}`
/// for request validation); those are unwrapped, anything else is returned
/// as the trimmed body text.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return format!("HTTP {status}");
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        match value.get("detail") {
            Some(Value::String(detail)) => return detail.clone(),
            Some(Value::Array(items)) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                if !messages.is_empty() {
                    return messages.join("; ");
                }
            }
            _ => {}
        }
    }

    trimmed.to_string()
}
