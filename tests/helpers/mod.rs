//! In-process fake Prediction Service for integration tests.
//!
//! Serves the same routes and error shapes as the FastAPI backend on an
//! ephemeral port and records what it received.

#![allow(dead_code)]

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use claim_types::ClaimPayload;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const REPORT: &str = "\
Total Records: 1,200
Actual Genuine Claims: 900
Predicted Genuine Claims: 880
Actual Fraud Claims: 300
Predicted Fraud Claims: 320
Correctly Predicted: 1,100
Incorrectly Predicted: 100
Accuracy of the Model is: 91.67%
";

/// One multipart part as received by `POST /summary/upload`.
#[derive(Debug, Clone)]
pub struct ReceivedPart {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Default)]
pub struct Recorded {
    pub record_lookups: Vec<String>,
    pub predictions: Vec<ClaimPayload>,
    pub uploads: Vec<ReceivedPart>,
    pub summaries: Vec<String>,
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    pub recorded: Arc<Mutex<Recorded>>,
}

impl FakeBackend {
    pub fn predictions(&self) -> Vec<ClaimPayload> {
        self.recorded.lock().unwrap().predictions.clone()
    }

    pub fn uploads(&self) -> Vec<ReceivedPart> {
        self.recorded.lock().unwrap().uploads.clone()
    }

    pub fn record_lookups(&self) -> Vec<String> {
        self.recorded.lock().unwrap().record_lookups.clone()
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

pub fn policy_json() -> Value {
    json!({
        "policy_status": "Active",
        "driver_age": 42,
        "model": "Hatchback Z",
        "fuel_type": "Diesel",
        "transmission_type": "Automatic",
        "no_previous_claims": 1,
        "time_of_incident": "2023-06-11 10:30 PM IST",
        "fir_filed": "Yes",
        "license": "Yes",
        "drunk_driving": "No",
        "time_of_claim": "2023-06-12 09:00 AM IST"
    })
}

async fn get_record(State(backend): State<FakeBackend>, Path(id): Path<String>) -> Response {
    backend.recorded.lock().unwrap().record_lookups.push(id.clone());
    match id.as_str() {
        "POL-1001" | "POL 1/2" => Json(policy_json()).into_response(),
        "EMPTY" => Json(Value::Null).into_response(),
        "BROKEN" => (StatusCode::OK, "not json").into_response(),
        "SLOW" => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(policy_json()).into_response()
        }
        _ => detail(StatusCode::NOT_FOUND, "Policy not found"),
    }
}

async fn predict(
    State(backend): State<FakeBackend>,
    Json(payload): Json<ClaimPayload>,
) -> Response {
    let drunk = payload.drunk_driving == "Yes";
    let license = payload.license.clone();
    backend.recorded.lock().unwrap().predictions.push(payload);

    if license.is_empty() {
        return detail(StatusCode::BAD_REQUEST, "Missing fields: license");
    }
    let (genuine, fraud) = if drunk { (0.2, 0.8) } else { (0.85, 0.15) };
    Json(json!({
        "genuine_probability": genuine,
        "fraud_probability": fraud,
        "predicted_label": if genuine >= fraud { "Genuine Claim" } else { "Fraud Claim" },
    }))
    .into_response()
}

async fn upload(State(backend): State<FakeBackend>, mut multipart: Multipart) -> Response {
    let mut parts = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let body = field.text().await.unwrap_or_default();
        parts.push(ReceivedPart {
            field: name,
            file_name,
            content_type,
            body,
        });
    }
    let accepted = parts.iter().any(|p| p.field == "file");
    let empty = parts.iter().any(|p| p.field == "file" && p.body.trim().is_empty());
    backend.recorded.lock().unwrap().uploads.extend(parts);

    if !accepted {
        return (StatusCode::BAD_REQUEST, "No file part").into_response();
    }
    if empty {
        return (StatusCode::INTERNAL_SERVER_ERROR, "EmptyDataError: No columns to parse from file")
            .into_response();
    }
    (StatusCode::OK, REPORT).into_response()
}

async fn summary(State(backend): State<FakeBackend>, Path(dataset): Path<String>) -> Response {
    backend.recorded.lock().unwrap().summaries.push(dataset.clone());
    match dataset.as_str() {
        "missing" => detail(StatusCode::NOT_FOUND, "Summary not found"),
        "garbled" => (StatusCode::OK, "nothing useful here").into_response(),
        _ => (StatusCode::OK, REPORT).into_response(),
    }
}

async fn default_summary() -> Response {
    (StatusCode::OK, "Total Records: 0\n").into_response()
}

/// Start the fake backend and return its base URL.
pub async fn spawn() -> (String, FakeBackend) {
    let backend = FakeBackend::default();
    let app = Router::new()
        .route("/record/:id", get(get_record))
        .route("/predict", post(predict))
        .route("/summary/upload", post(upload))
        .route("/summary", get(default_summary))
        .route("/summary/:dataset", get(summary))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), backend)
}
