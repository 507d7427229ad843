//! HttpPredictionClient against an in-process fake backend.

mod helpers;

use claim_types::ClaimPayload;
use claimguard::client::{DatasetUpload, HttpPredictionClient, PredictionService};
use claimguard::config::ClientConfig;
use claimguard::ServiceError;

fn client(base_url: &str, timeout_secs: u64) -> HttpPredictionClient {
    HttpPredictionClient::new(&ClientConfig {
        base_url: base_url.to_string(),
        timeout_secs,
    })
    .unwrap()
}

fn payload() -> ClaimPayload {
    ClaimPayload {
        policy_status: "Active".into(),
        license: "Yes".into(),
        driver_age: 42,
        drunk_driving: "No".into(),
        fir_filed: "Yes".into(),
        no_previous_claims: 1,
        time_of_incident: "2024-03-01 08:00 AM IST".into(),
        time_of_claim: "2024-03-01 09:15 AM IST".into(),
    }
}

#[tokio::test]
async fn record_lookup_decodes_policy() {
    let (url, _backend) = helpers::spawn().await;
    let record = client(&url, 5).get_record("POL-1001").await.unwrap();
    assert_eq!(record.driver_age, 42);
    assert_eq!(record.model, "Hatchback Z");
    assert_eq!(record.time_of_claim.as_deref(), Some("2023-06-12 09:00 AM IST"));
}

#[tokio::test]
async fn policy_id_is_sent_as_one_encoded_segment() {
    let (url, backend) = helpers::spawn().await;
    let record = client(&url, 5).get_record("POL 1/2").await.unwrap();
    assert_eq!(record.policy_status, "Active");
    assert_eq!(backend.record_lookups(), vec!["POL 1/2".to_string()]);
}

#[tokio::test]
async fn missing_and_null_records_are_not_found() {
    let (url, _backend) = helpers::spawn().await;
    let c = client(&url, 5);

    let err = c.get_record("UNKNOWN").await.unwrap_err();
    assert_eq!(
        err,
        ServiceError::NotFound {
            policy_id: "UNKNOWN".into()
        }
    );

    let err = c.get_record("EMPTY").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "No record found for Policy ID: EMPTY");
}

#[tokio::test]
async fn undecodable_record_is_a_decode_error() {
    let (url, _backend) = helpers::spawn().await;
    let err = client(&url, 5).get_record("BROKEN").await.unwrap_err();
    assert!(matches!(err, ServiceError::Decode { .. }), "{err:?}");
}

#[tokio::test]
async fn slow_backend_times_out() {
    let (url, _backend) = helpers::spawn().await;
    let err = client(&url, 1).get_record("SLOW").await.unwrap_err();
    assert_eq!(err, ServiceError::Timeout(1));
}

#[tokio::test]
async fn predict_posts_payload_as_json() {
    let (url, backend) = helpers::spawn().await;
    let result = client(&url, 5).predict(&payload()).await.unwrap();
    assert!((result.genuine_probability - 0.85).abs() < 1e-9);
    assert_eq!(result.predicted_label.as_deref(), Some("Genuine Claim"));
    assert_eq!(backend.predictions(), vec![payload()]);
}

#[tokio::test]
async fn predict_error_detail_is_unwrapped() {
    let (url, _backend) = helpers::spawn().await;
    let mut bad = payload();
    bad.license.clear();
    let err = client(&url, 5).predict(&bad).await.unwrap_err();
    assert_eq!(
        err,
        ServiceError::Status {
            status: 400,
            message: "Missing fields: license".into()
        }
    );
    assert_eq!(err.to_string(), "Missing fields: license");
}

#[tokio::test]
async fn upload_sends_csv_in_file_field() {
    let (url, backend) = helpers::spawn().await;
    let report = client(&url, 5)
        .upload_dataset(DatasetUpload {
            file_name: "claims_march.csv".into(),
            bytes: b"Policy,Original Claim\n1,Genuine\n".to_vec(),
        })
        .await
        .unwrap();
    assert!(report.contains("Total Records: 1,200"));

    let uploads = backend.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].field, "file");
    assert_eq!(uploads[0].file_name.as_deref(), Some("claims_march.csv"));
    assert_eq!(uploads[0].content_type.as_deref(), Some("text/csv"));
    assert!(uploads[0].body.starts_with("Policy,Original Claim"));
}

#[tokio::test]
async fn upload_failure_carries_plain_text_body() {
    let (url, _backend) = helpers::spawn().await;
    let err = client(&url, 5)
        .upload_dataset(DatasetUpload {
            file_name: "empty.csv".into(),
            bytes: Vec::new(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "EmptyDataError: No columns to parse from file");
}

#[tokio::test]
async fn summaries_by_name_and_default() {
    let (url, _backend) = helpers::spawn().await;
    let c = client(&url, 5);

    let text = c.get_summary("claims_march").await.unwrap();
    assert!(text.contains("Accuracy of the Model is: 91.67%"));

    let err = c.get_summary("missing").await.unwrap_err();
    assert_eq!(err.to_string(), "Summary not found");

    let default = c.get_default_summary().await.unwrap();
    assert_eq!(default.trim(), "Total Records: 0");
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    // port 9 (discard) is not served by anything in the test environment
    let err = client("http://127.0.0.1:9", 2)
        .get_default_summary()
        .await
        .unwrap_err();
    assert!(
        matches!(err, ServiceError::Transport(_) | ServiceError::Timeout(_)),
        "{err:?}"
    );
}
