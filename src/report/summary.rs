//! Summary presentation
//!
//! Display values derived from parsed report metrics: the KPI row, the
//! accuracy tile, and the bar and pie series the summary page charts.

use claim_types::ReportMetrics;
use serde::Serialize;
use std::fmt::Write as _;

/// Predicted fraud as a whole-number percentage of all records.
///
/// `"0%"` when the report has no records.
pub fn fraud_rate(metrics: &ReportMetrics) -> String {
    if metrics.total == 0 {
        return "0%".to_string();
    }
    let rate = metrics.predicted_fraud as f64 / metrics.total as f64 * 100.0;
    format!("{:.0}%", rate.round())
}

/// `1234567` -> `"1,234,567"`
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KpiTile {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarPoint {
    pub name: &'static str,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PieSlice {
    pub name: &'static str,
    pub value: u64,
    /// Share of the pie, one decimal (`"62.5%"`)
    pub share: String,
}

/// Everything the summary page shows for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryPresentation {
    pub kpis: Vec<KpiTile>,
    pub accuracy: String,
    pub bars: Vec<BarPoint>,
    pub claims_pie: Vec<PieSlice>,
    pub prediction_pie: Vec<PieSlice>,
}

impl SummaryPresentation {
    pub fn from_metrics(metrics: &ReportMetrics) -> Self {
        let kpis = vec![
            KpiTile {
                label: "Total Claims",
                value: group_thousands(metrics.total),
            },
            KpiTile {
                label: "Genuine Claims",
                value: group_thousands(metrics.predicted_genuine),
            },
            KpiTile {
                label: "Fraudulent Claims",
                value: group_thousands(metrics.predicted_fraud),
            },
            KpiTile {
                label: "Fraud Rate",
                value: fraud_rate(metrics),
            },
        ];

        let bars = [
            ("Act Gen", metrics.actual_genuine),
            ("Pred Gen", metrics.predicted_genuine),
            ("Act Fraud", metrics.actual_fraud),
            ("Pred Fraud", metrics.predicted_fraud),
            ("Correctly P", metrics.correct),
            ("Incorrectly P", metrics.incorrect),
        ]
        .into_iter()
        .map(|(name, value)| BarPoint { name, value })
        .collect();

        Self {
            kpis,
            accuracy: format!("{:.2}%", metrics.accuracy),
            bars,
            claims_pie: pie(&[
                ("Genuine", metrics.predicted_genuine),
                ("Fraud", metrics.predicted_fraud),
            ]),
            prediction_pie: pie(&[("Correct", metrics.correct), ("Incorrect", metrics.incorrect)]),
        }
    }

    /// Plain-text rendering for terminals.
    pub fn render_text(&self, title: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Summary for {title}");
        let _ = writeln!(out);

        for tile in &self.kpis {
            let _ = writeln!(out, "  {:<18} {:>12}", tile.label, tile.value);
        }
        let _ = writeln!(out, "  {:<18} {:>12}", "Model Accuracy", self.accuracy);
        let _ = writeln!(out);

        let _ = writeln!(out, "Statistics");
        let max = self.bars.iter().map(|b| b.value).max().unwrap_or(0);
        for bar in &self.bars {
            let width = if max == 0 {
                0
            } else {
                (bar.value as f64 / max as f64 * BAR_WIDTH as f64).round() as usize
            };
            let _ = writeln!(
                out,
                "  {:<14} {:<width$} {}",
                bar.name,
                "#".repeat(width),
                group_thousands(bar.value),
                width = BAR_WIDTH
            );
        }
        let _ = writeln!(out);

        let pies = [
            ("Claims", &self.claims_pie),
            ("Model Prediction", &self.prediction_pie),
        ];
        for (heading, slices) in pies {
            let _ = writeln!(out, "{heading}");
            for slice in slices {
                let _ = writeln!(out, "  {:<10} {:>7}", slice.name, slice.share);
            }
        }
        out
    }
}

const BAR_WIDTH: usize = 40;

fn pie(parts: &[(&'static str, u64)]) -> Vec<PieSlice> {
    let total: u64 = parts.iter().map(|(_, v)| v).sum();
    parts
        .iter()
        .map(|&(name, value)| {
            let pct = if total == 0 {
                0.0
            } else {
                value as f64 / total as f64 * 100.0
            };
            PieSlice {
                name,
                value,
                share: format!("{pct:.1}%"),
            }
        })
        .collect()
}
