//! Dataset upload page state machine
//!
//! ```text
//! Idle ──select──► Selected ──upload──► Uploading ──ok──► Uploaded
//!  ▲                   │                    │
//!  │                   └──select (replace)  │
//!  └────────────────error (dialog)──────────┘
//! ```

use super::dialog::Dialog;
use crate::error::ServiceError;
use std::path::{Path, PathBuf};

/// Dataset name for an uploaded file: the file name minus a trailing `.csv`.
///
/// The suffix match ignores case. Names without the suffix are kept whole.
pub fn dataset_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let len = file_name.len();
    if len > 4
        && file_name.is_char_boundary(len - 4)
        && file_name[len - 4..].eq_ignore_ascii_case(".csv")
    {
        file_name[..len - 4].to_string()
    } else {
        file_name
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub dataset: String,
}

impl SelectedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let dataset = dataset_name(&path);
        Self { path, dataset }
    }

    /// File name as sent in the multipart part.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{}.csv", self.dataset))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Selected(SelectedFile),
    Uploading(SelectedFile),
    /// Backend accepted the file; the summary can be fetched by `dataset`.
    Uploaded { dataset: String },
}

/// What Enter should do on the upload page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadAction {
    PickFile,
    Upload(SelectedFile),
    DismissDialog,
    /// Upload in flight or already done.
    None,
}

#[derive(Debug, Clone)]
pub struct UploadFlow {
    state: UploadState,
    dialog: Option<Dialog>,
}

impl Default for UploadFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadFlow {
    pub fn new() -> Self {
        Self {
            state: UploadState::Idle,
            dialog: None,
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    /// Choose (or replace) the file. Ignored while an upload is in flight.
    pub fn select_file(&mut self, path: impl Into<PathBuf>) -> bool {
        if matches!(self.state, UploadState::Uploading(_)) {
            return false;
        }
        let file = SelectedFile::new(path);
        tracing::debug!(path = %file.path.display(), dataset = %file.dataset, "Dataset selected");
        self.state = UploadState::Selected(file);
        true
    }

    /// Move to Uploading. `None` when no file is selected (no-op).
    pub fn begin_upload(&mut self) -> Option<SelectedFile> {
        if self.dialog.is_some() {
            return None;
        }
        let UploadState::Selected(file) = &self.state else {
            return None;
        };
        let file = file.clone();
        self.state = UploadState::Uploading(file.clone());
        Some(file)
    }

    /// Upload response arrived. Only meaningful while Uploading.
    pub fn upload_finished(&mut self, result: Result<(), ServiceError>) {
        let UploadState::Uploading(file) = &self.state else {
            tracing::warn!("Ignoring upload response outside Uploading");
            return;
        };
        match result {
            Ok(()) => {
                self.state = UploadState::Uploaded {
                    dataset: file.dataset.clone(),
                };
            }
            Err(err) => {
                self.dialog = Some(Dialog::upload_failed(err.to_string()));
                self.state = UploadState::Idle;
            }
        }
    }

    pub fn dismiss(&mut self) -> bool {
        self.dialog.take().is_some()
    }

    pub fn enter_action(&self) -> UploadAction {
        if self.dialog.is_some() {
            return UploadAction::DismissDialog;
        }
        match &self.state {
            UploadState::Idle => UploadAction::PickFile,
            UploadState::Selected(file) => UploadAction::Upload(file.clone()),
            UploadState::Uploading(_) | UploadState::Uploaded { .. } => UploadAction::None,
        }
    }
}
