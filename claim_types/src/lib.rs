//! Claim Types - Level 1 Foundation Types
//!
//! Pure data structures shared by the Prediction Service client, the page
//! flows and the CLI. Nothing in here talks to the network or reads a clock.
//!
//! ## Contents
//!
//! - Policy records as returned by `GET /record/{policyId}`
//! - Claim payloads as sent to `POST /predict`
//! - Prediction results
//! - Report metrics parsed from a batch summary
//! - The three-way verdict
//!
//! ## Rules
//!
//! 1. **NO BUSINESS LOGIC** - classification, parsing and validation live in `claimguard`
//! 2. **NO WORKSPACE DEPENDENCIES**
//! 3. **SERIALIZABLE** - every type supports serde

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// POLICY RECORD
// ============================================================================

/// A policy record keyed by policy id.
///
/// Fetched once per claim page. Only the claim fields are editable, and
/// those edits happen on a working copy (`claimguard::flow::ClaimForm`),
/// never on the record itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRecord {
    #[serde(default)]
    pub policy_status: String,
    pub driver_age: u32,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub fuel_type: String,
    #[serde(default)]
    pub transmission_type: String,
    pub no_previous_claims: u32,
    /// Incident time as stored by the backend (historical, informational)
    #[serde(default)]
    pub time_of_incident: String,
    #[serde(default)]
    pub fir_filed: String,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub drunk_driving: String,
    /// Historical claim time; carried for display, never submitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_claim: Option<String>,
}

// ============================================================================
// YES / NO FLAGS
// ============================================================================

/// Two-option flag used by the FIR filed, license and drunk driving fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    /// Wire label ("Yes" / "No")
    pub fn as_str(&self) -> &'static str {
        match self {
            YesNo::Yes => "Yes",
            YesNo::No => "No",
        }
    }
}

impl fmt::Display for YesNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a recognised yes/no answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected yes or no, got '{0}'")]
pub struct ParseYesNoError(pub String);

impl FromStr for YesNo {
    type Err = ParseYesNoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" => Ok(YesNo::Yes),
            "no" | "n" => Ok(YesNo::No),
            _ => Err(ParseYesNoError(s.to_string())),
        }
    }
}

// ============================================================================
// CLAIM PAYLOAD
// ============================================================================

/// Validated snapshot submitted to `POST /predict`.
///
/// Only constructed after the incident time has passed validation; see
/// `claimguard::flow::claim`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimPayload {
    pub policy_status: String,
    pub license: String,
    pub driver_age: u32,
    pub drunk_driving: String,
    pub fir_filed: String,
    pub no_previous_claims: u32,
    pub time_of_incident: String,
    pub time_of_claim: String,
}

// ============================================================================
// PREDICTION RESULT
// ============================================================================

/// Scores returned by the Prediction Service.
///
/// Both probabilities are in `[0, 1]`; they are not required to sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub genuine_probability: f64,
    pub fraud_probability: f64,
    /// Label the backend derives on its own (genuine >= fraud); informational
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_label: Option<String>,
}

impl PredictionResult {
    pub fn new(genuine_probability: f64, fraud_probability: f64) -> Self {
        Self {
            genuine_probability,
            fraud_probability,
            predicted_label: None,
        }
    }

    /// Genuine probability as a percentage in `[0, 100]`
    pub fn genuine_pct(&self) -> f64 {
        self.genuine_probability * 100.0
    }

    /// Fraud probability as a percentage in `[0, 100]`
    pub fn fraud_pct(&self) -> f64 {
        self.fraud_probability * 100.0
    }
}

// ============================================================================
// REPORT METRICS
// ============================================================================

/// Typed metrics parsed from a batch prediction report.
///
/// Every field defaults to zero when its label is missing from the report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetrics {
    pub total: u64,
    pub actual_genuine: u64,
    pub predicted_genuine: u64,
    pub actual_fraud: u64,
    pub predicted_fraud: u64,
    pub correct: u64,
    pub incorrect: u64,
    /// Model accuracy as a percentage (e.g. `87.5`)
    pub accuracy: f64,
}

// ============================================================================
// VERDICT
// ============================================================================

/// Three-way classification derived from a prediction. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Genuine,
    NeedsInvestigation,
    Fraud,
}

impl Verdict {
    /// Dialog title shown for this verdict
    pub fn title(&self) -> &'static str {
        match self {
            Verdict::Genuine => "Genuine Claim",
            Verdict::NeedsInvestigation => "Need Further Investigation",
            Verdict::Fraud => "Fraud Claim",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Genuine => "genuine",
            Verdict::NeedsInvestigation => "needs_investigation",
            Verdict::Fraud => "fraud",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
