//! Automation REST API message types.
//!
//! The remote service accepts a work item descriptor on submission and
//! reports progress with `{"id", "status", "reportUrl"?, "stats"?}` both
//! when polled and in the completion callback it posts back to us.

use serde::{Deserialize, Serialize};
use viewpress_core::types::WorkItemId;
use viewpress_core::view_selection::ViewSelectionConfig;
use viewpress_core::workitem::WorkItemStatus;

// ---------------------------------------------------------------------------
// Remote status
// ---------------------------------------------------------------------------

/// Work item status as reported by the remote service.
///
/// Unknown values are kept verbatim and treated as failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RemoteStatus {
    Pending,
    InProgress,
    Success,
    Cancelled,
    FailedDownload,
    FailedInstructions,
    FailedUpload,
    FailedUploadOptional,
    FailedLimitDataSize,
    FailedLimitProcessingTime,
    Other(String),
}

impl RemoteStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "inprogress",
            Self::Success => "success",
            Self::Cancelled => "cancelled",
            Self::FailedDownload => "failedDownload",
            Self::FailedInstructions => "failedInstructions",
            Self::FailedUpload => "failedUpload",
            Self::FailedUploadOptional => "failedUploadOptional",
            Self::FailedLimitDataSize => "failedLimitDataSize",
            Self::FailedLimitProcessingTime => "failedLimitProcessingTime",
            Self::Other(s) => s,
        }
    }

    /// Map onto the local status vocabulary.
    ///
    /// Only `success` completes a job; every other end state, including a
    /// cancellation we did not initiate, is a failure.
    pub fn to_local(&self) -> WorkItemStatus {
        match self {
            Self::Pending => WorkItemStatus::Pending,
            Self::InProgress => WorkItemStatus::Running,
            Self::Success => WorkItemStatus::Completed,
            _ => WorkItemStatus::Failed,
        }
    }

    /// Terminal status implied by a completion callback.
    pub fn callback_outcome(&self) -> WorkItemStatus {
        match self {
            Self::Success => WorkItemStatus::Completed,
            _ => WorkItemStatus::Failed,
        }
    }
}

impl From<String> for RemoteStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => Self::Pending,
            "inprogress" => Self::InProgress,
            "success" => Self::Success,
            "cancelled" => Self::Cancelled,
            "failedDownload" => Self::FailedDownload,
            "failedInstructions" => Self::FailedInstructions,
            "failedUpload" => Self::FailedUpload,
            "failedUploadOptional" => Self::FailedUploadOptional,
            "failedLimitDataSize" => Self::FailedLimitDataSize,
            "failedLimitProcessingTime" => Self::FailedLimitProcessingTime,
            _ => Self::Other(s),
        }
    }
}

impl From<RemoteStatus> for String {
    fn from(status: RemoteStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for RemoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// Body of `POST /workitems`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemDescriptor {
    pub activity_id: String,
    pub arguments: WorkItemArguments,
}

/// Named arguments bound to the activity's parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemArguments {
    pub input_file: Argument,
    pub input_json: Argument,
    pub output_file: Argument,
    pub on_complete: Argument,
}

/// A single URL-addressed argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Argument {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verb: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<serde_json::Value>,
}

impl Argument {
    fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            verb: None,
            headers: None,
        }
    }

    fn with_verb(url: impl Into<String>, verb: &str) -> Self {
        Self {
            url: url.into(),
            verb: Some(verb.to_string()),
            headers: None,
        }
    }
}

/// Deployment-wide parts of every descriptor.
#[derive(Debug, Clone)]
pub struct DescriptorTemplate {
    pub activity_id: String,
    /// Public URL of our callback endpoint.
    pub callback_url: String,
    /// Bearer token the remote task presents when downloading the input.
    pub input_token: Option<String>,
}

impl DescriptorTemplate {
    /// Build the descriptor for one export job.
    ///
    /// The selection flags travel inline as a `data:` URL so the remote
    /// task finds them as its `params.json`.
    pub fn build(
        &self,
        input_ref: &str,
        output_ref: &str,
        selection: &ViewSelectionConfig,
    ) -> WorkItemDescriptor {
        let mut input_file = Argument::get(input_ref);
        if let Some(token) = &self.input_token {
            input_file.headers = Some(serde_json::json!({
                "Authorization": format!("Bearer {token}"),
            }));
        }

        WorkItemDescriptor {
            activity_id: self.activity_id.clone(),
            arguments: WorkItemArguments {
                input_file,
                input_json: Argument::get(format!(
                    "data:application/json,{}",
                    selection.to_json_string()
                )),
                output_file: Argument::with_verb(output_ref, "put"),
                on_complete: Argument::with_verb(self.callback_url.clone(), "post"),
            },
        }
    }
}

/// Response of `POST /workitems`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    /// Correlation id assigned by the remote service.
    pub id: WorkItemId,
    pub status: RemoteStatus,
}

// ---------------------------------------------------------------------------
// Status reports
// ---------------------------------------------------------------------------

/// Response of `GET /workitems/{id}`, and the body of the completion
/// callback.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub id: WorkItemId,
    pub status: RemoteStatus,
    /// Link to the remote execution log.
    #[serde(default)]
    pub report_url: Option<String>,
    /// Timing data, passed through untouched.
    #[serde(default)]
    pub stats: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
