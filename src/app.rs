//! App shell - current page, key routing and navigation
//!
//! The shell owns exactly one page at a time. Entering a page attaches its
//! key scope; leaving detaches it. Whenever the page shows a dialog a
//! `Dialog` scope sits on top, so Enter dismisses the dialog before the page
//! beneath can act.

use crate::flow::{
    self, ClaimEdit, ClaimFlow, DismissOutcome, SubmitOutcome, SummaryFlow, UploadAction,
    UploadFlow,
};
use crate::keys::{Key, KeyRouter, ScopeHandle, ViewScope};
use crate::session::Session;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Page {
    Home,
    Claim(ClaimFlow),
    Upload(UploadFlow),
    Summary(SummaryFlow),
}

impl Page {
    fn scope(&self) -> ViewScope {
        match self {
            Page::Home => ViewScope::Home,
            Page::Claim(_) => ViewScope::ClaimDetails,
            Page::Upload(_) => ViewScope::Upload,
            Page::Summary(_) => ViewScope::Summary,
        }
    }

    fn has_dialog(&self) -> bool {
        match self {
            Page::Home => false,
            Page::Claim(flow) => flow.has_dialog(),
            Page::Upload(flow) => flow.dialog().is_some(),
            Page::Summary(flow) => flow.has_dialog(),
        }
    }
}

/// What a key press led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The visible view acted on the key.
    Handled,
    /// Upload page wants a file; call [`App::select_file`] and press again.
    NeedsFile,
    /// Nothing to do (blank search, in-flight request, no view).
    Ignored,
}

pub struct App {
    session: Session,
    page: Page,
    router: KeyRouter,
    page_scope: ScopeHandle,
    dialog_scope: Option<ScopeHandle>,
    search: String,
}

impl App {
    pub fn new(session: Session) -> Self {
        let mut router = KeyRouter::new();
        let page_scope = router.attach(ViewScope::Home);
        Self {
            session,
            page: Page::Home,
            router,
            page_scope,
            dialog_scope: None,
            search: String::new(),
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn router(&self) -> &KeyRouter {
        &self.router
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    // ========================================================================
    // NAVIGATION
    // ========================================================================

    fn enter_page(&mut self, page: Page) {
        if let Some(handle) = self.dialog_scope.take() {
            self.router.detach(handle);
        }
        self.router.detach(self.page_scope);
        self.page = page;
        self.page_scope = self.router.attach(self.page.scope());
        tracing::debug!(scope = %self.page.scope(), "Entered page");
        self.sync_dialog_scope();
    }

    /// Keep the dialog scope attached exactly while the page shows a dialog.
    fn sync_dialog_scope(&mut self) {
        match (self.page.has_dialog(), self.dialog_scope) {
            (true, None) => self.dialog_scope = Some(self.router.attach(ViewScope::Dialog)),
            (false, Some(handle)) => {
                self.router.detach(handle);
                self.dialog_scope = None;
            }
            _ => {}
        }
    }

    pub fn go_home(&mut self) {
        self.search.clear();
        self.enter_page(Page::Home);
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    /// Search for the current input. Blank input is ignored.
    pub async fn search(&mut self) -> bool {
        let Some(policy_id) = flow::normalize_policy_id(&self.search) else {
            tracing::debug!("Ignoring blank policy search");
            return false;
        };
        self.enter_page(Page::Claim(ClaimFlow::new(policy_id)));
        if let Page::Claim(claim) = &mut self.page {
            self.session.load_claim(claim).await;
        }
        self.sync_dialog_scope();
        true
    }

    pub fn open_upload(&mut self) {
        self.enter_page(Page::Upload(UploadFlow::new()));
    }

    pub async fn open_summary(&mut self, dataset: Option<String>) {
        self.enter_page(Page::Summary(SummaryFlow::new(dataset)));
        if let Page::Summary(summary) = &mut self.page {
            self.session.load_summary(summary).await;
        }
        self.sync_dialog_scope();
    }

    // ========================================================================
    // PAGE INPUT
    // ========================================================================

    /// Apply a claim form edit. False when not on an editable claim page.
    pub fn edit_claim(&mut self, edit: ClaimEdit) -> bool {
        match &mut self.page {
            Page::Claim(claim) => claim.edit(edit),
            _ => false,
        }
    }

    /// Choose the dataset file on the upload page.
    pub fn select_file(&mut self, path: impl Into<PathBuf>) -> bool {
        match &mut self.page {
            Page::Upload(upload) => upload.select_file(path),
            _ => false,
        }
    }

    // ========================================================================
    // KEYS
    // ========================================================================

    /// Route a key to the topmost view and run its action.
    pub async fn press(&mut self, key: Key) -> KeyOutcome {
        let Some(scope) = self.router.dispatch(key) else {
            return KeyOutcome::Ignored;
        };
        let outcome = match (scope, key) {
            (ViewScope::Dialog, _) => self.dismiss_dialog(),
            (ViewScope::Home, Key::Enter) => {
                if self.search().await {
                    KeyOutcome::Handled
                } else {
                    KeyOutcome::Ignored
                }
            }
            (ViewScope::Home, Key::Escape) => KeyOutcome::Ignored,
            (_, Key::Escape) => {
                self.go_home();
                KeyOutcome::Handled
            }
            (ViewScope::ClaimDetails, Key::Enter) => self.submit_claim().await,
            (ViewScope::Upload, Key::Enter) => self.upload_action().await,
            (ViewScope::Summary, Key::Enter) => KeyOutcome::Ignored,
        };
        self.sync_dialog_scope();
        outcome
    }

    fn dismiss_dialog(&mut self) -> KeyOutcome {
        match &mut self.page {
            Page::Claim(claim) => match claim.dismiss() {
                DismissOutcome::NavigateHome => self.go_home(),
                DismissOutcome::Closed | DismissOutcome::Nothing => {}
            },
            Page::Upload(upload) => {
                upload.dismiss();
            }
            Page::Summary(summary) => {
                if summary.dismiss() {
                    self.go_home();
                }
            }
            Page::Home => return KeyOutcome::Ignored,
        }
        KeyOutcome::Handled
    }

    async fn submit_claim(&mut self) -> KeyOutcome {
        let Page::Claim(claim) = &mut self.page else {
            return KeyOutcome::Ignored;
        };
        match self.session.submit_claim(claim).await {
            SubmitOutcome::Ignored => KeyOutcome::Ignored,
            SubmitOutcome::Send(_) | SubmitOutcome::Rejected(_) => KeyOutcome::Handled,
        }
    }

    async fn upload_action(&mut self) -> KeyOutcome {
        let Page::Upload(upload) = &mut self.page else {
            return KeyOutcome::Ignored;
        };
        match upload.enter_action() {
            UploadAction::PickFile => KeyOutcome::NeedsFile,
            UploadAction::Upload(_) => {
                if let Some(dataset) = self.session.upload(upload).await {
                    self.open_summary(Some(dataset)).await;
                }
                KeyOutcome::Handled
            }
            UploadAction::DismissDialog => {
                upload.dismiss();
                KeyOutcome::Handled
            }
            UploadAction::None => KeyOutcome::Ignored,
        }
    }
}
