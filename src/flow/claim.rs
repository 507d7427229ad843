//! Claim submission page state machine
//!
//! ```text
//! Loading ──record──► Ready ──submit──► Validating ──ok──► Submitting ──scores──► Resolved
//!    │                  ▲                   │                  │                     │
//!    │                  └──field error──────┘                  │                     │
//!    │                  ▲                                      │                     │
//!    │                  └──────────service error (overlay)─────┘                     │
//!    │                  ▲                                                            │
//!    │                  └──────────────────────────dismiss──────────────────────────┘
//!    └──not found──► Failed (dismiss navigates home)
//! ```
//!
//! The state is a single enum so impossible combinations (loading and
//! resolved at once, a verdict without a record) cannot be represented.
//! Network calls are not made here; `crate::session` drives the transitions.

use super::dialog::Dialog;
use crate::error::ServiceError;
use crate::time::{self, ReferenceTime};
use crate::verdict::VerdictCard;
use claim_types::{ClaimPayload, PolicyRecord, PredictionResult, YesNo};
use std::fmt;

/// Field name validation errors are scoped to.
pub const INCIDENT_FIELD: &str = "time_of_incident";

// ============================================================================
// FORM
// ============================================================================

/// Editable working copy of a policy record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimForm {
    /// Typed by the user; starts empty
    pub time_of_incident: String,
    pub no_previous_claims: u32,
    pub fir_filed: String,
    pub license: String,
    pub drunk_driving: String,
}

impl ClaimForm {
    pub fn from_record(record: &PolicyRecord) -> Self {
        Self {
            time_of_incident: String::new(),
            no_previous_claims: record.no_previous_claims,
            fir_filed: record.fir_filed.clone(),
            license: record.license.clone(),
            drunk_driving: record.drunk_driving.clone(),
        }
    }

    fn apply(&mut self, edit: ClaimEdit) {
        match edit {
            ClaimEdit::IncidentTime(text) => self.time_of_incident = text,
            ClaimEdit::PreviousClaims(n) => self.no_previous_claims = n,
            ClaimEdit::FirFiled(v) => self.fir_filed = v.as_str().to_string(),
            ClaimEdit::License(v) => self.license = v.as_str().to_string(),
            ClaimEdit::DrunkDriving(v) => self.drunk_driving = v.as_str().to_string(),
        }
    }
}

/// One user edit on the claim form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimEdit {
    IncidentTime(String),
    PreviousClaims(u32),
    FirFiled(YesNo),
    License(YesNo),
    DrunkDriving(YesNo),
}

/// Record plus the user's edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub record: PolicyRecord,
    pub form: ClaimForm,
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Field-scoped, recoverable rejection of the incident time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter incident time")]
    MissingIncidentTime,

    #[error("Please enter incident time in correct format: YYYY-MM-DD HH:MM AM/PM IST")]
    MalformedIncidentTime,

    /// Rejected by the future-time check; carries its message.
    #[error("{0}")]
    IncidentTime(&'static str),
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        INCIDENT_FIELD
    }
}

/// Validate the draft against `now` and build the payload.
///
/// Checks run in order and the first failure wins: blank, malformed, future.
/// `time_of_claim` is `now` rendered under the shared format contract.
pub fn build_payload(draft: &Draft, now: ReferenceTime) -> Result<ClaimPayload, ValidationError> {
    let incident = draft.form.time_of_incident.trim();
    if incident.is_empty() {
        return Err(ValidationError::MissingIncidentTime);
    }
    if time::parse(incident).is_none() {
        return Err(ValidationError::MalformedIncidentTime);
    }

    let now_text = now.render();
    let check = time::validate_not_future(incident, &now_text);
    if !check.valid {
        return Err(ValidationError::IncidentTime(check.message));
    }

    let record = &draft.record;
    let form = &draft.form;
    Ok(ClaimPayload {
        policy_status: record.policy_status.clone(),
        license: form.license.clone(),
        driver_age: record.driver_age,
        drunk_driving: form.drunk_driving.clone(),
        fir_filed: form.fir_filed.clone(),
        no_previous_claims: form.no_previous_claims,
        time_of_incident: incident.to_string(),
        time_of_claim: now_text,
    })
}

/// Hours from the payload's incident time to its claim time.
///
/// `None` when either side is off the shared format contract.
pub fn elapsed_hours(payload: &ClaimPayload) -> Option<f64> {
    let incident = time::parse(&payload.time_of_incident)?;
    let claim = time::parse(&payload.time_of_claim)?;
    Some(time::hours_between(incident, claim))
}

// ============================================================================
// STATE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ClaimState {
    /// Record fetch in flight.
    Loading,
    /// Editable. `overlay` holds a transient service error dialog.
    Ready {
        draft: Draft,
        field_error: Option<ValidationError>,
        overlay: Option<Dialog>,
    },
    /// Prediction request in flight; further submits are ignored.
    Submitting(Draft),
    /// Verdict shown; dismissing returns to Ready.
    Resolved { draft: Draft, card: VerdictCard },
    /// Record could not be loaded; dismissing leaves the page.
    Failed { dialog: Dialog },
}

/// Variant name without payload, for logs and assertions.
///
/// `Validating` names the checks `ClaimFlow::submit` runs between Ready and
/// Submitting; no stored state rests there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimPhase {
    Loading,
    Ready,
    Validating,
    Submitting,
    Resolved,
    Failed,
}

impl fmt::Display for ClaimPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClaimPhase::Loading => "loading",
            ClaimPhase::Ready => "ready",
            ClaimPhase::Validating => "validating",
            ClaimPhase::Submitting => "submitting",
            ClaimPhase::Resolved => "resolved",
            ClaimPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

impl ClaimState {
    pub fn phase(&self) -> ClaimPhase {
        match self {
            ClaimState::Loading => ClaimPhase::Loading,
            ClaimState::Ready { .. } => ClaimPhase::Ready,
            ClaimState::Submitting(_) => ClaimPhase::Submitting,
            ClaimState::Resolved { .. } => ClaimPhase::Resolved,
            ClaimState::Failed { .. } => ClaimPhase::Failed,
        }
    }
}

/// Result of a submit request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation passed; send this payload.
    Send(ClaimPayload),
    /// Validation failed; the flow is back in Ready with the field error set.
    Rejected(ValidationError),
    /// Not in a state that accepts a submit (loading, in flight, dialog open).
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissOutcome {
    /// A dialog was closed; the page stays.
    Closed,
    /// The page is terminal; leave it.
    NavigateHome,
    /// Nothing was open.
    Nothing,
}

// ============================================================================
// FLOW
// ============================================================================

/// One claim page instance for one policy id.
#[derive(Debug, Clone)]
pub struct ClaimFlow {
    policy_id: String,
    state: ClaimState,
}

impl ClaimFlow {
    pub fn new(policy_id: impl Into<String>) -> Self {
        Self {
            policy_id: policy_id.into(),
            state: ClaimState::Loading,
        }
    }

    pub fn policy_id(&self) -> &str {
        &self.policy_id
    }

    pub fn state(&self) -> &ClaimState {
        &self.state
    }

    pub fn phase(&self) -> ClaimPhase {
        self.state.phase()
    }

    pub fn draft(&self) -> Option<&Draft> {
        match &self.state {
            ClaimState::Ready { draft, .. }
            | ClaimState::Submitting(draft)
            | ClaimState::Resolved { draft, .. } => Some(draft),
            ClaimState::Loading | ClaimState::Failed { .. } => None,
        }
    }

    pub fn field_error(&self) -> Option<&ValidationError> {
        match &self.state {
            ClaimState::Ready { field_error, .. } => field_error.as_ref(),
            _ => None,
        }
    }

    /// True while a dialog covers the page (verdict, service error, not found).
    pub fn has_dialog(&self) -> bool {
        matches!(
            self.state,
            ClaimState::Resolved { .. }
                | ClaimState::Failed { .. }
                | ClaimState::Ready {
                    overlay: Some(_),
                    ..
                }
        )
    }

    /// Record fetch completed. Only meaningful while Loading.
    pub fn record_loaded(&mut self, result: Result<PolicyRecord, ServiceError>) {
        if !matches!(self.state, ClaimState::Loading) {
            tracing::warn!(phase = %self.phase(), "Ignoring record response outside Loading");
            return;
        }
        self.state = match result {
            Ok(record) => {
                let form = ClaimForm::from_record(&record);
                ClaimState::Ready {
                    draft: Draft { record, form },
                    field_error: None,
                    overlay: None,
                }
            }
            Err(ServiceError::NotFound { .. }) => ClaimState::Failed {
                dialog: Dialog::policy_not_found(&self.policy_id),
            },
            Err(err) => ClaimState::Failed {
                dialog: Dialog::error(err.to_string()),
            },
        };
    }

    /// Apply an edit. Returns false outside Ready.
    pub fn edit(&mut self, edit: ClaimEdit) -> bool {
        let ClaimState::Ready {
            draft, field_error, ..
        } = &mut self.state
        else {
            return false;
        };
        if matches!(edit, ClaimEdit::IncidentTime(_)) {
            *field_error = None;
        }
        draft.form.apply(edit);
        true
    }

    /// Validate and, on success, move to Submitting.
    ///
    /// Accepted only in Ready with no dialog open. The checks run on the
    /// draft taken out of Ready; the flow then lands in Submitting or back
    /// in Ready with the field error.
    pub fn submit(&mut self, now: ReferenceTime) -> SubmitOutcome {
        let (next, outcome) = match std::mem::replace(&mut self.state, ClaimState::Loading) {
            ClaimState::Ready {
                draft,
                overlay: None,
                ..
            } => self.validate(draft, now),
            other => (other, SubmitOutcome::Ignored),
        };
        self.state = next;
        outcome
    }

    fn validate(&self, draft: Draft, now: ReferenceTime) -> (ClaimState, SubmitOutcome) {
        tracing::debug!(
            policy_id = %self.policy_id,
            phase = %ClaimPhase::Validating,
            "Validating claim"
        );
        match build_payload(&draft, now) {
            Ok(payload) => (ClaimState::Submitting(draft), SubmitOutcome::Send(payload)),
            Err(error) => {
                tracing::debug!(policy_id = %self.policy_id, %error, "Claim rejected");
                let ready = ClaimState::Ready {
                    draft,
                    field_error: Some(error.clone()),
                    overlay: None,
                };
                (ready, SubmitOutcome::Rejected(error))
            }
        }
    }

    /// Prediction call completed. Only meaningful while Submitting.
    pub fn prediction_received(&mut self, result: Result<PredictionResult, ServiceError>) {
        if !matches!(self.state, ClaimState::Submitting(_)) {
            tracing::warn!(phase = %self.phase(), "Ignoring prediction outside Submitting");
            return;
        }
        let ClaimState::Submitting(draft) = std::mem::replace(&mut self.state, ClaimState::Loading)
        else {
            return;
        };
        self.state = match result {
            Ok(prediction) => ClaimState::Resolved {
                draft,
                card: VerdictCard::from_prediction(&prediction),
            },
            Err(err) => ClaimState::Ready {
                draft,
                field_error: None,
                overlay: Some(Dialog::error(err.to_string())),
            },
        };
    }

    /// Close whatever dialog is showing.
    pub fn dismiss(&mut self) -> DismissOutcome {
        match std::mem::replace(&mut self.state, ClaimState::Loading) {
            ClaimState::Failed { dialog } => {
                self.state = ClaimState::Failed { dialog };
                DismissOutcome::NavigateHome
            }
            ClaimState::Ready {
                draft,
                field_error,
                overlay: Some(_),
            } => {
                self.state = ClaimState::Ready {
                    draft,
                    field_error,
                    overlay: None,
                };
                DismissOutcome::Closed
            }
            ClaimState::Resolved { draft, .. } => {
                self.state = ClaimState::Ready {
                    draft,
                    field_error: None,
                    overlay: None,
                };
                DismissOutcome::Closed
            }
            other => {
                self.state = other;
                DismissOutcome::Nothing
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claim_types::Verdict;

    fn record() -> PolicyRecord {
        PolicyRecord {
            policy_status: "Active".into(),
            driver_age: 37,
            model: "Sedan X".into(),
            fuel_type: "Petrol".into(),
            transmission_type: "Manual".into(),
            no_previous_claims: 1,
            time_of_incident: "2023-11-02 08:00 PM IST".into(),
            fir_filed: "Yes".into(),
            license: "Yes".into(),
            drunk_driving: "No".into(),
            time_of_claim: None,
        }
    }

    fn now() -> ReferenceTime {
        time::parse("2024-03-01 09:15 AM IST").unwrap()
    }

    fn ready_flow() -> ClaimFlow {
        let mut flow = ClaimFlow::new("POL-1");
        flow.record_loaded(Ok(record()));
        flow
    }

    #[test]
    fn record_moves_loading_to_ready_with_empty_incident() {
        let flow = ready_flow();
        assert_eq!(flow.phase(), ClaimPhase::Ready);
        let draft = flow.draft().unwrap();
        assert_eq!(draft.form.time_of_incident, "");
        assert_eq!(draft.form.no_previous_claims, 1);
    }

    #[test]
    fn not_found_is_terminal() {
        let mut flow = ClaimFlow::new("NOPE");
        flow.record_loaded(Err(ServiceError::NotFound {
            policy_id: "NOPE".into(),
        }));
        assert_eq!(flow.phase(), ClaimPhase::Failed);
        let ClaimState::Failed { dialog } = flow.state() else {
            panic!("expected Failed");
        };
        assert_eq!(dialog.title, "Policy ID Not Found!");
        assert_eq!(dialog.message, "No record found for Policy ID: NOPE");
        assert!(flow.has_dialog());
        assert_eq!(flow.dismiss(), DismissOutcome::NavigateHome);
    }

    #[test]
    fn blank_incident_is_rejected_inline() {
        let mut flow = ready_flow();
        flow.edit(ClaimEdit::IncidentTime("   ".into()));
        let outcome = flow.submit(now());
        assert_eq!(
            outcome,
            SubmitOutcome::Rejected(ValidationError::MissingIncidentTime)
        );
        assert_eq!(flow.phase(), ClaimPhase::Ready);
        let err = flow.field_error().unwrap();
        assert_eq!(err.to_string(), "Please enter incident time");
        assert_eq!(err.field(), "time_of_incident");
    }

    #[test]
    fn malformed_and_future_times_are_rejected() {
        let mut flow = ready_flow();
        flow.edit(ClaimEdit::IncidentTime("01/03/2024 9am".into()));
        assert_eq!(
            flow.submit(now()),
            SubmitOutcome::Rejected(ValidationError::MalformedIncidentTime)
        );

        flow.edit(ClaimEdit::IncidentTime("2024-03-01 09:16 AM IST".into()));
        let SubmitOutcome::Rejected(err) = flow.submit(now()) else {
            panic!("future time must be rejected");
        };
        assert_eq!(err.to_string(), "Time entered is in the future.");
    }

    #[test]
    fn editing_incident_time_clears_field_error() {
        let mut flow = ready_flow();
        flow.submit(now());
        assert!(flow.field_error().is_some());
        flow.edit(ClaimEdit::PreviousClaims(3));
        assert!(flow.field_error().is_some());
        flow.edit(ClaimEdit::IncidentTime("2024-03-01 09:00 AM IST".into()));
        assert!(flow.field_error().is_none());
    }

    #[test]
    fn valid_submit_builds_payload_from_edits() {
        let mut flow = ready_flow();
        flow.edit(ClaimEdit::IncidentTime(" 2024-02-29 11:30 PM IST ".into()));
        flow.edit(ClaimEdit::PreviousClaims(4));
        flow.edit(ClaimEdit::DrunkDriving(YesNo::Yes));
        flow.edit(ClaimEdit::FirFiled(YesNo::No));

        let SubmitOutcome::Send(payload) = flow.submit(now()) else {
            panic!("expected payload");
        };
        assert_eq!(flow.phase(), ClaimPhase::Submitting);
        assert_eq!(payload.time_of_incident, "2024-02-29 11:30 PM IST");
        assert_eq!(payload.time_of_claim, "2024-03-01 09:15 AM IST");
        assert_eq!(payload.no_previous_claims, 4);
        assert_eq!(payload.drunk_driving, "Yes");
        assert_eq!(payload.fir_filed, "No");
        assert_eq!(payload.license, "Yes");
        assert_eq!(payload.driver_age, 37);
        assert_eq!(payload.policy_status, "Active");
    }

    #[test]
    fn elapsed_hours_spans_incident_to_claim() {
        let mut flow = ready_flow();
        flow.edit(ClaimEdit::IncidentTime("2024-02-29 11:30 PM IST".into()));
        let SubmitOutcome::Send(mut payload) = flow.submit(now()) else {
            panic!("expected payload");
        };
        // 23:30 to 09:15 next day
        assert_eq!(elapsed_hours(&payload), Some(9.75));

        payload.time_of_claim = "later".into();
        assert_eq!(elapsed_hours(&payload), None);
    }

    #[test]
    fn incident_equal_to_now_is_accepted() {
        let mut flow = ready_flow();
        flow.edit(ClaimEdit::IncidentTime(now().render()));
        assert!(matches!(flow.submit(now()), SubmitOutcome::Send(_)));
    }

    #[test]
    fn submitting_blocks_further_submits_and_edits() {
        let mut flow = ready_flow();
        flow.edit(ClaimEdit::IncidentTime("2024-03-01 08:00 AM IST".into()));
        assert!(matches!(flow.submit(now()), SubmitOutcome::Send(_)));
        assert_eq!(flow.submit(now()), SubmitOutcome::Ignored);
        assert!(!flow.edit(ClaimEdit::PreviousClaims(9)));
    }

    #[test]
    fn prediction_resolves_then_dismiss_returns_to_ready() {
        let mut flow = ready_flow();
        flow.edit(ClaimEdit::IncidentTime("2024-03-01 08:00 AM IST".into()));
        flow.submit(now());
        flow.prediction_received(Ok(PredictionResult::new(0.55, 0.45)));

        let ClaimState::Resolved { card, .. } = flow.state() else {
            panic!("expected Resolved");
        };
        assert_eq!(card.verdict, Verdict::NeedsInvestigation);
        assert!(flow.has_dialog());

        assert_eq!(flow.dismiss(), DismissOutcome::Closed);
        assert_eq!(flow.phase(), ClaimPhase::Ready);
        // edits survive a round trip, so resubmission needs no retyping
        assert_eq!(
            flow.draft().unwrap().form.time_of_incident,
            "2024-03-01 08:00 AM IST"
        );
        assert!(matches!(flow.submit(now()), SubmitOutcome::Send(_)));
    }

    #[test]
    fn service_error_is_a_recoverable_overlay() {
        let mut flow = ready_flow();
        flow.edit(ClaimEdit::IncidentTime("2024-03-01 08:00 AM IST".into()));
        flow.submit(now());
        flow.prediction_received(Err(ServiceError::Status {
            status: 400,
            message: "Missing fields: license".into(),
        }));

        assert_eq!(flow.phase(), ClaimPhase::Ready);
        let ClaimState::Ready { overlay, .. } = flow.state() else {
            panic!("expected Ready");
        };
        let overlay = overlay.as_ref().unwrap();
        assert_eq!(overlay.title, "Error");
        assert_eq!(overlay.message, "Missing fields: license");

        // dialog must be closed before the next attempt
        assert_eq!(flow.submit(now()), SubmitOutcome::Ignored);
        assert_eq!(flow.dismiss(), DismissOutcome::Closed);
        assert!(matches!(flow.submit(now()), SubmitOutcome::Send(_)));
    }

    #[test]
    fn late_responses_are_ignored() {
        let mut flow = ready_flow();
        flow.prediction_received(Ok(PredictionResult::new(0.9, 0.1)));
        assert_eq!(flow.phase(), ClaimPhase::Ready);
        flow.record_loaded(Ok(record()));
        assert_eq!(flow.phase(), ClaimPhase::Ready);
        assert_eq!(flow.dismiss(), DismissOutcome::Nothing);
    }

    #[test]
    fn ignored_submit_leaves_state_untouched() {
        let mut failed = ClaimFlow::new("NOPE");
        failed.record_loaded(Err(ServiceError::NotFound {
            policy_id: "NOPE".into(),
        }));
        let before = failed.state().clone();
        assert_eq!(failed.submit(now()), SubmitOutcome::Ignored);
        assert_eq!(failed.state(), &before);

        let mut resolved = ready_flow();
        resolved.edit(ClaimEdit::IncidentTime("2024-03-01 08:00 AM IST".into()));
        resolved.submit(now());
        resolved.prediction_received(Ok(PredictionResult::new(0.9, 0.1)));
        let before = resolved.state().clone();
        assert_eq!(resolved.submit(now()), SubmitOutcome::Ignored);
        assert_eq!(resolved.state(), &before);
    }

    #[test]
    fn submit_while_loading_is_ignored() {
        let mut flow = ClaimFlow::new("POL-1");
        assert_eq!(flow.submit(now()), SubmitOutcome::Ignored);
        assert!(!flow.edit(ClaimEdit::PreviousClaims(2)));
    }
}
