//! Lenient report parser
//!
//! The report is line oriented, one `Label: value` pair per line, with blank
//! lines between groups. A label that is missing (or whose value does not
//! parse) leaves its field at zero; parsing never fails.
//!
//! Matching is prefix based and case sensitive on the trimmed line, and the
//! first matching line wins.

use claim_types::ReportMetrics;

pub const TOTAL_RECORDS: &str = "Total Records";
pub const ACTUAL_GENUINE: &str = "Actual Genuine Claims";
pub const PREDICTED_GENUINE: &str = "Predicted Genuine Claims";
pub const ACTUAL_FRAUD: &str = "Actual Fraud Claims";
pub const PREDICTED_FRAUD: &str = "Predicted Fraud Claims";
pub const CORRECTLY_PREDICTED: &str = "Correctly Predicted";
pub const INCORRECTLY_PREDICTED: &str = "Incorrectly Predicted";
pub const ACCURACY: &str = "Accuracy of the Model is";

/// Every recognised label, in report order.
pub const LABELS: [&str; 8] = [
    TOTAL_RECORDS,
    ACTUAL_GENUINE,
    PREDICTED_GENUINE,
    ACTUAL_FRAUD,
    PREDICTED_FRAUD,
    CORRECTLY_PREDICTED,
    INCORRECTLY_PREDICTED,
    ACCURACY,
];

/// Parse result plus the labels that were not found.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReport {
    pub metrics: ReportMetrics,
    pub missing_labels: Vec<&'static str>,
}

impl ParsedReport {
    /// True when no label at all was recognised, i.e. the metrics are all
    /// defaults because the text was not a report.
    pub fn is_unrecognised(&self) -> bool {
        self.missing_labels.len() == LABELS.len()
    }
}

/// Parse report text into metrics. Missing labels yield zero.
pub fn parse(text: &str) -> ReportMetrics {
    parse_with_diagnostics(text).metrics
}

/// Parse report text and also report which labels were absent.
pub fn parse_with_diagnostics(text: &str) -> ParsedReport {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let mut missing_labels = Vec::new();

    let mut raw = |label: &'static str| {
        let value = find_value(&lines, label);
        if value.is_none() {
            missing_labels.push(label);
        }
        value
    };

    let mut count = |label: &'static str| raw(label).map(parse_count).unwrap_or(0);

    let total = count(TOTAL_RECORDS);
    let actual_genuine = count(ACTUAL_GENUINE);
    let predicted_genuine = count(PREDICTED_GENUINE);
    let actual_fraud = count(ACTUAL_FRAUD);
    let predicted_fraud = count(PREDICTED_FRAUD);
    let correct = count(CORRECTLY_PREDICTED);
    let incorrect = count(INCORRECTLY_PREDICTED);
    let accuracy = raw(ACCURACY).map(parse_percentage).unwrap_or(0.0);

    ParsedReport {
        metrics: ReportMetrics {
            total,
            actual_genuine,
            predicted_genuine,
            actual_fraud,
            predicted_fraud,
            correct,
            incorrect,
            accuracy,
        },
        missing_labels,
    }
}

/// Text after the first `:` of the first line starting with `label`.
fn find_value<'a>(lines: &[&'a str], label: &str) -> Option<&'a str> {
    lines
        .iter()
        .copied()
        .find(|line| line.starts_with(label))
        .and_then(|line| line.split_once(':'))
        .map(|(_, value)| value.trim())
}

/// `1,234` -> 1234. Trailing text after the digits is ignored.
fn parse_count(value: &str) -> u64 {
    let digits: String = value
        .chars()
        .filter(|c| *c != ',')
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// `87.50%` -> 87.5
fn parse_percentage(value: &str) -> f64 {
    let number: String = value
        .replace('%', "")
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    number.parse().unwrap_or(0.0)
}
