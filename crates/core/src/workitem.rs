//! The tracked work item and its status lifecycle.
//!
//! A [`WorkItem`] is created when the remote service accepts a job and is
//! dropped from tracking the first time a terminal status is observed.
//! Statuses only move through the manager in the automation crate; this
//! module just defines the values and the transitions they allow.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Timestamp, WorkItemId};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Local view of a remote job's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkItemStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl WorkItemStatus {
    /// `true` once no further transitions are expected.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// The name pushed to notification subscribers.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for WorkItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// WorkItem
// ---------------------------------------------------------------------------

/// One remote export job while it is being tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkItem {
    /// Correlation id issued by the remote service.
    pub id: WorkItemId,
    /// Source document reference handed to the remote task.
    pub input_ref: String,
    /// Pre-provisioned writable destination for the merged artifact.
    pub output_ref: String,
    pub submitted_at: Timestamp,
    pub status: WorkItemStatus,
    /// Retrieval location, attached once on successful completion.
    pub extra_info: Option<String>,
}

impl WorkItem {
    /// Create a tracked item stamped with the current time.
    pub fn new(
        id: impl Into<WorkItemId>,
        input_ref: impl Into<String>,
        output_ref: impl Into<String>,
        status: WorkItemStatus,
    ) -> Self {
        Self {
            id: id.into(),
            input_ref: input_ref.into(),
            output_ref: output_ref.into(),
            submitted_at: chrono::Utc::now(),
            status,
            extra_info: None,
        }
    }

    /// Consume the item into its final form.
    ///
    /// A `Completed` item gets its output location as `extra_info`; an
    /// already populated `extra_info` is never overwritten.
    pub fn finalize(mut self, status: WorkItemStatus) -> Self {
        debug_assert!(status.is_terminal(), "finalize called with {status}");
        self.status = status;
        if status == WorkItemStatus::Completed && self.extra_info.is_none() {
            self.extra_info = Some(self.output_ref.clone());
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Reject empty or whitespace-only document references before anything is
/// sent to the remote service.
pub fn validate_references(input_ref: &str, output_ref: &str) -> Result<(), CoreError> {
    if input_ref.trim().is_empty() {
        return Err(CoreError::Validation(
            "Input document reference must not be empty".to_string(),
        ));
    }
    if output_ref.trim().is_empty() {
        return Err(CoreError::Validation(
            "Output reference must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Reject correlation ids that would not stay a single path segment on the
/// remote service (`/`, `?`, `#`, or a dot segment).
pub fn validate_workitem_id(id: &str) -> Result<(), CoreError> {
    if id.trim().is_empty() {
        return Err(CoreError::Validation("Work item id must not be empty".to_string()));
    }
    if matches!(id, "." | "..") || id.contains(['/', '?', '#']) {
        return Err(CoreError::Validation(format!(
            "Work item id {id:?} is not a valid identifier"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
