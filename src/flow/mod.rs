//! Page flows
//!
//! Each page is a pure state machine: it accepts user intents and service
//! results and never performs I/O itself. [`crate::session::Session`] runs
//! the network calls and feeds the results back in.

pub mod claim;
pub mod dialog;
pub mod summary;
pub mod upload;

pub use claim::{
    build_payload, elapsed_hours, ClaimEdit, ClaimFlow, ClaimForm, ClaimPhase, ClaimState,
    DismissOutcome, Draft, SubmitOutcome, ValidationError,
};
pub use dialog::Dialog;
pub use summary::{SummaryFlow, SummaryState};
pub use upload::{dataset_name, SelectedFile, UploadAction, UploadFlow, UploadState};

/// Trimmed policy id from search input; `None` when blank.
pub fn normalize_policy_id(input: &str) -> Option<String> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
