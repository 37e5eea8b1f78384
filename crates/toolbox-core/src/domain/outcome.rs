//! Outcome model: common result format for the built-in handlers.
//!
//! A batch handler processes many items; a single item failing is recorded
//! here instead of failing the whole task.

use serde::{Deserialize, Serialize};

/// One item that could not be processed.
///
/// Exactly one of `file` / `gallery` is set. The keys are what the front end
/// renders (`err.file`, `err.gallery`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// File or folder name, for the filesystem handlers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Gallery title, for the crawler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallery: Option<String>,
    pub error: String,
}

impl ErrorDetail {
    /// Name of whatever failed, file or gallery.
    pub fn item(&self) -> &str {
        self.file
            .as_deref()
            .or(self.gallery.as_deref())
            .unwrap_or_default()
    }
}

/// Per-item tally returned as a task `result`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskReport {
    pub success: usize,
    pub failed: usize,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

impl TaskReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self) {
        self.success += 1;
    }

    pub fn record_failure(&mut self, file: impl Into<String>, error: impl Into<String>) {
        self.failed += 1;
        self.errors.push(ErrorDetail {
            file: Some(file.into()),
            gallery: None,
            error: error.into(),
        });
    }

    pub fn record_gallery_failure(&mut self, gallery: impl Into<String>, error: impl Into<String>) {
        self.failed += 1;
        self.errors.push(ErrorDetail {
            file: None,
            gallery: Some(gallery.into()),
            error: error.into(),
        });
    }

    /// Items attempted so far.
    pub fn total(&self) -> usize {
        self.success + self.failed
    }
}
