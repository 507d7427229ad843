//! Batch Report Module
//!
//! Turns the plain-text summary the backend writes for an uploaded dataset
//! into typed metrics, and derives the values the summary page displays.
//!
//! - `parser`: lenient `Label: value` parsing into [`ReportMetrics`]
//! - `summary`: KPI tiles, fraud rate and chart series

pub mod parser;
pub mod summary;

pub use claim_types::ReportMetrics;
pub use parser::{parse, parse_with_diagnostics, ParsedReport};
pub use summary::{fraud_rate, group_thousands, SummaryPresentation};
