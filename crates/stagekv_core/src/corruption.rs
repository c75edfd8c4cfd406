//! Reporting of partially applied commits.
//!
//! Once a commit starts publishing, each rename or unlink takes effect on
//! its own. If one of them fails after others succeeded, storage holds part
//! of the transaction and no caller can undo that. The failing `commit`
//! returns [`CoreError::Corruption`](crate::CoreError::Corruption), and the
//! same report is handed to the store-wide [`CorruptionHandler`] so the
//! condition is surfaced even if the caller drops the error.

use std::fmt;
use std::sync::Arc;
use tracing::error;

/// Store-wide callback for partially applied commits.
pub type CorruptionHandler = Arc<dyn Fn(&CorruptionReport) + Send + Sync>;

/// What a failed publish phase managed to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorruptionReport {
    /// Keys whose new version was published.
    pub published: Vec<String>,
    /// Keys whose staged version was not published.
    pub unpublished: Vec<String>,
    /// Dropped keys whose file was removed.
    pub removed: Vec<String>,
    /// Dropped keys whose file was not removed.
    pub unremoved: Vec<String>,
    /// The key whose operation failed.
    pub failed_key: String,
    /// The error of the failed operation.
    pub error: String,
}

impl fmt::Display for CorruptionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "commit partially applied at key {:?} ({}): {} published, {} unpublished, {} removed, {} not removed",
            self.failed_key,
            self.error,
            self.published.len(),
            self.unpublished.len(),
            self.removed.len(),
            self.unremoved.len()
        )
    }
}

/// The handler installed when none is given: logs the report.
pub(crate) fn log_corruption() -> CorruptionHandler {
    Arc::new(|report: &CorruptionReport| {
        error!(
            failed_key = %report.failed_key,
            published = ?report.published,
            unpublished = ?report.unpublished,
            removed = ?report.removed,
            unremoved = ?report.unremoved,
            error = %report.error,
            "storage left partially committed"
        );
    })
}
