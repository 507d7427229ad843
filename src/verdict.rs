//! Probability-to-verdict classification
//!
//! An ordered decision table over the two percentages returned by the
//! Prediction Service. The thresholds are fixed policy, not a calibrated
//! merge of the two scores:
//!
//! | # | condition                              | verdict            |
//! |---|----------------------------------------|--------------------|
//! | 1 | genuine >= fraud and genuine >= 80     | Genuine            |
//! | 2 | genuine >= 50                          | NeedsInvestigation |
//! | 3 | otherwise                              | Fraud              |

use claim_types::{PredictionResult, Verdict};
use serde::Serialize;

/// Minimum genuine percentage for an outright genuine verdict
pub const GENUINE_THRESHOLD: f64 = 80.0;

/// Minimum genuine percentage to avoid a fraud verdict
pub const INVESTIGATION_THRESHOLD: f64 = 50.0;

/// Classify two percentages in `[0, 100]`.
pub fn classify(genuine_pct: f64, fraud_pct: f64) -> Verdict {
    if genuine_pct >= fraud_pct && genuine_pct >= GENUINE_THRESHOLD {
        Verdict::Genuine
    } else if genuine_pct >= INVESTIGATION_THRESHOLD {
        Verdict::NeedsInvestigation
    } else {
        Verdict::Fraud
    }
}

/// Classify a raw prediction (probabilities in `[0, 1]`).
pub fn classify_prediction(result: &PredictionResult) -> Verdict {
    classify(result.genuine_pct(), result.fraud_pct())
}

/// Colour family a verdict is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Green,
    Orange,
    Red,
}

impl From<Verdict> for Tone {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Genuine => Tone::Green,
            Verdict::NeedsInvestigation => Tone::Orange,
            Verdict::Fraud => Tone::Red,
        }
    }
}

/// The resolved-claim dialog content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerdictCard {
    pub verdict: Verdict,
    pub tone: Tone,
    pub genuine_pct: f64,
    pub fraud_pct: f64,
}

impl VerdictCard {
    pub fn from_prediction(result: &PredictionResult) -> Self {
        let verdict = classify_prediction(result);
        Self {
            verdict,
            tone: verdict.into(),
            genuine_pct: result.genuine_pct(),
            fraud_pct: result.fraud_pct(),
        }
    }

    pub fn title(&self) -> &'static str {
        self.verdict.title()
    }

    /// "Genuinity: 81.0%"
    pub fn genuine_line(&self) -> String {
        format!("Genuinity: {:.1}%", self.genuine_pct)
    }

    /// "Chance of Fraud: 10.0%"
    pub fn fraud_line(&self) -> String {
        format!("Chance of Fraud: {:.1}%", self.fraud_pct)
    }
}
