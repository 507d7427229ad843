//! Summary page: fetch a report, parse it, present it.

use super::dialog::Dialog;
use crate::error::ServiceError;
use crate::report::{self, ParsedReport, SummaryPresentation};

#[derive(Debug, Clone, PartialEq)]
pub enum SummaryState {
    Loading,
    Ready {
        report: ParsedReport,
        presentation: SummaryPresentation,
    },
    Failed { dialog: Dialog },
}

/// One summary page instance. `dataset` is `None` for the default report.
#[derive(Debug, Clone)]
pub struct SummaryFlow {
    dataset: Option<String>,
    state: SummaryState,
}

impl SummaryFlow {
    pub fn new(dataset: Option<String>) -> Self {
        Self {
            dataset,
            state: SummaryState::Loading,
        }
    }

    pub fn dataset(&self) -> Option<&str> {
        self.dataset.as_deref()
    }

    /// Heading for the page.
    pub fn title(&self) -> String {
        match &self.dataset {
            Some(name) => format!("Summary: {name}"),
            None => "Summary".to_string(),
        }
    }

    pub fn state(&self) -> &SummaryState {
        &self.state
    }

    pub fn has_dialog(&self) -> bool {
        matches!(self.state, SummaryState::Failed { .. })
    }

    /// Report text arrived (or the fetch failed). Only meaningful while Loading.
    pub fn report_received(&mut self, result: Result<String, ServiceError>) {
        if !matches!(self.state, SummaryState::Loading) {
            tracing::warn!("Ignoring summary response outside Loading");
            return;
        }
        self.state = match result {
            Ok(text) => {
                let parsed = report::parse_with_diagnostics(&text);
                if !parsed.missing_labels.is_empty() {
                    tracing::warn!(
                        dataset = self.dataset.as_deref().unwrap_or("default"),
                        missing = ?parsed.missing_labels,
                        "Report is missing labels; defaulting them to zero"
                    );
                }
                let presentation = SummaryPresentation::from_metrics(&parsed.metrics);
                SummaryState::Ready {
                    report: parsed,
                    presentation,
                }
            }
            Err(err) => SummaryState::Failed {
                dialog: Dialog::error(err.to_string()),
            },
        };
    }

    /// Close the failure dialog. Returns true when the page should be left.
    pub fn dismiss(&mut self) -> bool {
        self.has_dialog()
    }
}
