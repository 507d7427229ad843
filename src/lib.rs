//! claimguard - case lookup and decision support for claim fraud scoring
//!
//! A client for the Prediction Service: look up a policy, capture the
//! incident details, score the claim and show a three-way verdict; upload a
//! batch dataset and present its accuracy report.
//!
//! ## Layout
//! Pure logic at the bottom, I/O at the top:
//!
//! ```text
//! time / verdict / report      formatting, classification, parsing
//! flow                         page state machines (no I/O)
//! client                       PredictionService trait + reqwest impl
//! session                      drives flows against the service
//! keys / app                   view-scoped key routing, navigation
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use claimguard::{client::HttpPredictionClient, config::ClientConfig, session::Session};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ClientConfig::load(None)?;
//! let client = Arc::new(HttpPredictionClient::new(&config)?);
//! let session = Session::new(client, config.timeout());
//! let flow = session.open_claim("POL-1001").await;
//! println!("{}", flow.phase());
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Configuration
pub mod config;

// Pure domain logic
pub mod report;
pub mod time;
pub mod verdict;

// Page state machines
pub mod flow;

// Prediction Service boundary
pub mod client;

// Async orchestration and the UI shell
pub mod app;
pub mod keys;
pub mod session;

pub use claim_types::{ClaimPayload, PolicyRecord, PredictionResult, ReportMetrics, Verdict, YesNo};
pub use error::{ConfigError, ServiceError};
