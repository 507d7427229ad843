//! Session - runs page flows against a [`PredictionService`]
//!
//! The flows in [`crate::flow`] are pure; this is where their suspension
//! points (record fetch, prediction, upload, summary fetch) actually await
//! the service. Each call is bounded by the configured timeout and each page
//! instance has at most one call outstanding, because every method here
//! takes the flow by `&mut` for the duration of the call.

use crate::client::{DatasetUpload, PredictionService};
use crate::error::ServiceError;
use crate::flow::{ClaimFlow, SubmitOutcome, SummaryFlow, UploadFlow};
use crate::time::{Clock, SystemClock};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct Session {
    service: Arc<dyn PredictionService>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl Session {
    pub fn new(service: Arc<dyn PredictionService>, timeout: Duration) -> Self {
        Self {
            service,
            clock: Arc::new(SystemClock),
            timeout,
        }
    }

    /// Replace the clock used for "now" (claim time and future checks).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The clock claims are stamped with.
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, ServiceError>
    where
        F: Future<Output = Result<T, ServiceError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ServiceError::Timeout(self.timeout.as_secs())),
        }
    }

    /// Open a claim page: create the flow and fetch its record.
    pub async fn open_claim(&self, policy_id: &str) -> ClaimFlow {
        let mut flow = ClaimFlow::new(policy_id);
        self.load_claim(&mut flow).await;
        flow
    }

    /// Fetch the record for a flow that is still Loading.
    pub async fn load_claim(&self, flow: &mut ClaimFlow) {
        let policy_id = flow.policy_id().to_string();
        tracing::info!(%policy_id, "Loading policy record");
        let result = self.bounded(self.service.get_record(&policy_id)).await;
        match &result {
            Ok(_) => tracing::debug!(%policy_id, "Policy record loaded"),
            Err(err) if err.is_not_found() => tracing::info!(%policy_id, "No record for policy"),
            Err(err) => tracing::error!(%policy_id, error = %err, "Record lookup failed"),
        }
        flow.record_loaded(result);
    }

    /// Validate and, when valid, send the claim for scoring.
    ///
    /// Returns what `submit` decided; no request is made unless it is `Send`.
    pub async fn submit_claim(&self, flow: &mut ClaimFlow) -> SubmitOutcome {
        let outcome = flow.submit(self.clock.now());
        let SubmitOutcome::Send(payload) = &outcome else {
            return outcome;
        };

        tracing::info!(policy_id = %flow.policy_id(), "Submitting claim");
        let result = self.bounded(self.service.predict(payload)).await;
        match &result {
            Ok(prediction) => tracing::info!(
                policy_id = %flow.policy_id(),
                genuine = prediction.genuine_probability,
                fraud = prediction.fraud_probability,
                "Claim scored"
            ),
            Err(err) => tracing::error!(
                policy_id = %flow.policy_id(),
                error = %err,
                "Prediction failed"
            ),
        }
        flow.prediction_received(result);
        outcome
    }

    /// Upload the selected file. Returns the dataset name on success.
    ///
    /// A no-op returning `None` when nothing is selected or a dialog is open.
    pub async fn upload(&self, flow: &mut UploadFlow) -> Option<String> {
        let file = flow.begin_upload()?;
        tracing::info!(path = %file.path.display(), dataset = %file.dataset, "Uploading dataset");

        let result = match tokio::fs::read(&file.path).await {
            Ok(bytes) => {
                let upload = DatasetUpload {
                    file_name: file.file_name(),
                    bytes,
                };
                self.bounded(self.service.upload_dataset(upload)).await
            }
            Err(err) => Err(ServiceError::File {
                path: file.path.clone(),
                reason: err.to_string(),
            }),
        };

        match result {
            Ok(_) => {
                tracing::info!(dataset = %file.dataset, "Dataset uploaded");
                flow.upload_finished(Ok(()));
                Some(file.dataset)
            }
            Err(err) => {
                tracing::error!(dataset = %file.dataset, error = %err, "Upload failed");
                flow.upload_finished(Err(err));
                None
            }
        }
    }

    /// Open a summary page for `dataset`, or the default report when `None`.
    pub async fn open_summary(&self, dataset: Option<String>) -> SummaryFlow {
        let mut flow = SummaryFlow::new(dataset);
        self.load_summary(&mut flow).await;
        flow
    }

    pub async fn load_summary(&self, flow: &mut SummaryFlow) {
        let result = match flow.dataset() {
            Some(dataset) => {
                tracing::info!(%dataset, "Fetching summary");
                self.bounded(self.service.get_summary(dataset)).await
            }
            None => {
                tracing::info!("Fetching default summary");
                self.bounded(self.service.get_default_summary()).await
            }
        };
        if let Err(err) = &result {
            tracing::error!(error = %err, "Summary fetch failed");
        }
        flow.report_received(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Result;
    use crate::flow::{ClaimEdit, ClaimPhase, SummaryState, UploadState, ValidationError};
    use crate::time::{self, FixedClock};
    use async_trait::async_trait;
    use claim_types::{ClaimPayload, PolicyRecord, PredictionResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeService {
        predict_calls: AtomicUsize,
        uploads: Mutex<Vec<DatasetUpload>>,
        slow: bool,
    }

    fn record() -> PolicyRecord {
        serde_json::from_value(serde_json::json!({
            "policy_status": "Active",
            "driver_age": 29,
            "no_previous_claims": 0,
            "fir_filed": "Yes",
            "license": "Yes",
            "drunk_driving": "No"
        }))
        .unwrap()
    }

    #[async_trait]
    impl PredictionService for FakeService {
        async fn get_record(&self, policy_id: &str) -> Result<PolicyRecord> {
            if self.slow {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            if policy_id == "POL-1" {
                Ok(record())
            } else {
                Err(ServiceError::NotFound {
                    policy_id: policy_id.to_string(),
                })
            }
        }

        async fn predict(&self, _payload: &ClaimPayload) -> Result<PredictionResult> {
            self.predict_calls.fetch_add(1, Ordering::SeqCst);
            Ok(PredictionResult::new(0.92, 0.08))
        }

        async fn upload_dataset(&self, upload: DatasetUpload) -> Result<String> {
            self.uploads.lock().unwrap().push(upload);
            Ok("Total Records: 3".to_string())
        }

        async fn get_summary(&self, dataset: &str) -> Result<String> {
            Ok(format!("Total Records: {}\n", dataset.len()))
        }

        async fn get_default_summary(&self) -> Result<String> {
            Err(ServiceError::Transport("connection refused".into()))
        }
    }

    fn session(service: Arc<FakeService>) -> Session {
        let now = time::parse("2024-03-01 09:15 AM IST").unwrap();
        Session::new(service, Duration::from_secs(1)).with_clock(Arc::new(FixedClock(now)))
    }

    #[tokio::test]
    async fn blank_incident_makes_no_network_call() {
        let service = Arc::new(FakeService::default());
        let session = session(service.clone());
        let mut flow = session.open_claim("POL-1").await;
        assert_eq!(flow.phase(), ClaimPhase::Ready);

        let outcome = session.submit_claim(&mut flow).await;
        assert_eq!(
            outcome,
            SubmitOutcome::Rejected(ValidationError::MissingIncidentTime)
        );
        assert_eq!(
            flow.field_error().unwrap().to_string(),
            "Please enter incident time"
        );
        assert_eq!(service.predict_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn valid_claim_is_scored_with_clock_time() {
        let service = Arc::new(FakeService::default());
        let session = session(service.clone());
        let mut flow = session.open_claim("POL-1").await;
        flow.edit(ClaimEdit::IncidentTime("2024-02-28 06:00 PM IST".into()));

        let SubmitOutcome::Send(payload) = session.submit_claim(&mut flow).await else {
            panic!("expected the claim to be sent");
        };
        assert_eq!(payload.time_of_claim, "2024-03-01 09:15 AM IST");
        assert_eq!(flow.phase(), ClaimPhase::Resolved);
        assert_eq!(service.predict_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_policy_fails_the_page() {
        let session = session(Arc::new(FakeService::default()));
        let flow = session.open_claim("NOPE").await;
        assert_eq!(flow.phase(), ClaimPhase::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_service_times_out() {
        let service = Arc::new(FakeService {
            slow: true,
            ..Default::default()
        });
        let session = session(service);
        let flow = session.open_claim("POL-1").await;
        let crate::flow::ClaimState::Failed { dialog } = flow.state() else {
            panic!("expected Failed");
        };
        assert_eq!(dialog.message, "Request timed out after 1s");
    }

    #[tokio::test]
    async fn upload_posts_file_and_names_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("april.CSV");
        std::fs::write(&path, "Policy,Original Claim\n1,Genuine\n").unwrap();

        let service = Arc::new(FakeService::default());
        let session = session(service.clone());
        let mut flow = UploadFlow::new();
        assert_eq!(session.upload(&mut flow).await, None);

        flow.select_file(&path);
        assert_eq!(session.upload(&mut flow).await.as_deref(), Some("april"));
        assert_eq!(
            flow.state(),
            &UploadState::Uploaded {
                dataset: "april".into()
            }
        );
        let uploads = service.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].file_name, "april.CSV");
    }

    #[tokio::test]
    async fn unreadable_file_fails_upload() {
        let session = session(Arc::new(FakeService::default()));
        let mut flow = UploadFlow::new();
        flow.select_file("/definitely/not/here.csv");
        assert_eq!(session.upload(&mut flow).await, None);
        assert_eq!(flow.state(), &UploadState::Idle);
        assert_eq!(flow.dialog().unwrap().title, "Upload failed");
    }

    #[tokio::test]
    async fn summaries_load_by_dataset_or_fail() {
        let session = session(Arc::new(FakeService::default()));
        let named = session.open_summary(Some("march".into())).await;
        assert!(matches!(named.state(), SummaryState::Ready { .. }));

        let default = session.open_summary(None).await;
        assert!(default.has_dialog());
    }
}
