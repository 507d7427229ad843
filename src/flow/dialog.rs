//! Dismissible dialog content (title + message).

use crate::verdict::Tone;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dialog {
    pub title: String,
    pub message: String,
    pub tone: Tone,
}

impl Dialog {
    pub fn new(title: impl Into<String>, message: impl Into<String>, tone: Tone) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            tone,
        }
    }

    /// Generic service failure; the message is shown as returned.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new("Error", message, Tone::Red)
    }

    pub fn policy_not_found(policy_id: &str) -> Self {
        Self::new(
            "Policy ID Not Found!",
            format!("No record found for Policy ID: {policy_id}"),
            Tone::Red,
        )
    }

    pub fn upload_failed(message: impl Into<String>) -> Self {
        Self::new("Upload failed", message, Tone::Red)
    }
}
