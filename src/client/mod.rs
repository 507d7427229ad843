//! PredictionService trait - the only boundary between the page flows and
//! the scoring backend. Flows depend on this trait, never on reqwest.

pub mod http;

use crate::error::ServiceError;
use async_trait::async_trait;
use claim_types::{ClaimPayload, PolicyRecord, PredictionResult};

pub use http::HttpPredictionClient;

pub type Result<T> = std::result::Result<T, ServiceError>;

/// A CSV dataset ready to be posted as multipart field `file`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait PredictionService: Send + Sync {
    /// `GET /record/{policyId}`. 404 or an empty body is `ServiceError::NotFound`.
    async fn get_record(&self, policy_id: &str) -> Result<PolicyRecord>;

    /// `POST /predict`
    async fn predict(&self, payload: &ClaimPayload) -> Result<PredictionResult>;

    /// `POST /summary/upload`. Returns the report text the backend produced.
    async fn upload_dataset(&self, upload: DatasetUpload) -> Result<String>;

    /// `GET /summary/{datasetName}`
    async fn get_summary(&self, dataset: &str) -> Result<String>;

    /// `GET /summary` - the report for the training dataset.
    async fn get_default_summary(&self) -> Result<String>;
}
