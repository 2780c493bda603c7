//! Work item lifecycle coordination.
//!
//! [`WorkItemManager`] submits export jobs to the remote service and then
//! follows them through three independent channels: client polls, the
//! service's completion callback, and client cancellation. All three end
//! in [`finalize`](WorkItemManager::finalize), which claims the item from
//! the [`WorkItemRegistry`] and publishes exactly one status event for the
//! caller that won the claim.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio_util::task::TaskTracker;
use viewpress_core::job_events::TOPIC_WORKITEM;
use viewpress_core::types::WorkItemId;
use viewpress_core::view_selection::ViewSelectionConfig;
use viewpress_core::workitem::{
    validate_references, validate_workitem_id, WorkItem, WorkItemStatus,
};
use viewpress_events::{EventBus, StatusEvent};

use crate::api::AutomationApiError;
use crate::messages::{DescriptorTemplate, StatusResponse};
use crate::outcomes::FinalizedOutcomes;
use crate::registry::WorkItemRegistry;
use crate::service::AutomationService;

/// How long [`WorkItemManager::shutdown`] waits for detached remote
/// cancellations and callback reconciliation.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures surfaced to callers of the manager.
#[derive(Debug, thiserror::Error)]
pub enum WorkItemError {
    /// Bad references; rejected before any remote call.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The remote service refused or could not take the job. Nothing is
    /// tracked.
    #[error("Submission failed: {0}")]
    SubmissionFailed(String),

    /// The id is unknown (to the remote service for polls, to the
    /// registry for cancels).
    #[error("Work item {0} not found")]
    NotFound(WorkItemId),

    /// Network or service failure while talking to the remote side.
    #[error("Remote service unavailable: {0}")]
    RemoteTransient(String),

    /// The remote service handed out an id that is already tracked.
    #[error("Work item {0} is already tracked")]
    Duplicate(WorkItemId),
}

impl WorkItemError {
    fn from_remote(id: &str, err: AutomationApiError) -> Self {
        match err {
            AutomationApiError::NotFound(_) => Self::NotFound(id.to_string()),
            other => Self::RemoteTransient(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmittedWorkItem {
    pub workitem_id: WorkItemId,
    pub status: WorkItemStatus,
}

/// Status as observed by a poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkItemReport {
    pub workitem_id: WorkItemId,
    pub status: WorkItemStatus,
    /// Artifact location, when this poll finalized a completed job.
    pub extra_info: Option<String>,
    /// Remote execution log, if the service provided one.
    pub report_url: Option<String>,
}

// ---------------------------------------------------------------------------
// WorkItemManager
// ---------------------------------------------------------------------------

/// Coordinates submission, status reconciliation and cancellation.
///
/// Created once at startup; shared via `Arc`.
pub struct WorkItemManager {
    service: Arc<dyn AutomationService>,
    registry: Arc<WorkItemRegistry>,
    bus: Arc<EventBus>,
    template: DescriptorTemplate,
    /// How finalized items ended, for polls that lose the claim.
    outcomes: FinalizedOutcomes,
    /// Detached remote cancellations and callback reconciliation.
    background: TaskTracker,
}

impl WorkItemManager {
    pub fn new(
        service: Arc<dyn AutomationService>,
        registry: Arc<WorkItemRegistry>,
        bus: Arc<EventBus>,
        template: DescriptorTemplate,
    ) -> Self {
        Self {
            service,
            registry,
            bus,
            template,
            outcomes: FinalizedOutcomes::default(),
            background: TaskTracker::new(),
        }
    }

    pub fn registry(&self) -> &Arc<WorkItemRegistry> {
        &self.registry
    }

    // ---- submission ----

    /// Submit an export job and start tracking it.
    ///
    /// The registry entry exists before this returns, so a callback that
    /// arrives immediately after the remote service accepted the job is
    /// always matched.
    pub async fn submit(
        &self,
        input_ref: &str,
        output_ref: &str,
        selection: &ViewSelectionConfig,
    ) -> Result<SubmittedWorkItem, WorkItemError> {
        validate_references(input_ref, output_ref)
            .map_err(|e| WorkItemError::InvalidInput(e.to_string()))?;

        let descriptor = self.template.build(input_ref, output_ref, selection);

        let response = self.service.submit(&descriptor).await.map_err(|e| {
            tracing::error!(error = %e, "Work item submission failed");
            WorkItemError::SubmissionFailed(e.to_string())
        })?;

        let status = response.status.to_local();
        let item = WorkItem::new(response.id.clone(), input_ref, output_ref, status);

        if self.registry.put(item).await.is_err() {
            tracing::error!(workitem_id = %response.id, "Remote service reused a tracked id");
            return Err(WorkItemError::Duplicate(response.id));
        }

        tracing::info!(
            workitem_id = %response.id,
            remote_status = %response.status,
            "Work item submitted",
        );

        Ok(SubmittedWorkItem {
            workitem_id: response.id,
            status,
        })
    }

    // ---- status reconciliation ----

    /// Ask the remote service for the current status of `id`.
    ///
    /// Non-terminal answers are passed through untouched. A terminal answer
    /// also finalizes the item if it is still tracked. When another channel
    /// already finalized it, the recorded outcome supplies `extra_info`.
    pub async fn poll(&self, id: &str) -> Result<WorkItemReport, WorkItemError> {
        validate_workitem_id(id).map_err(|e| WorkItemError::InvalidInput(e.to_string()))?;

        let response = self
            .service
            .status(id)
            .await
            .map_err(|e| WorkItemError::from_remote(id, e))?;

        let status = response.status.to_local();
        let mut extra_info = None;

        if status.is_terminal() {
            extra_info = match self.finalize(id, status).await {
                Some(item) => item.extra_info,
                None => self.outcomes.get(id).await.and_then(|o| o.extra_info),
            };
        }

        Ok(WorkItemReport {
            workitem_id: id.to_string(),
            status,
            extra_info,
            report_url: response.report_url,
        })
    }

    /// Handle the completion callback pushed by the remote service.
    ///
    /// Returns the finalized item, or `None` when the job was already
    /// finalized through another channel (or never tracked).
    pub async fn on_callback(&self, report: StatusResponse) -> Option<WorkItem> {
        if !self.registry.contains(&report.id).await {
            tracing::info!(
                workitem_id = %report.id,
                remote_status = %report.status,
                "Callback for a work item that is no longer tracked",
            );
            return None;
        }

        let status = report.status.callback_outcome();
        tracing::info!(
            workitem_id = %report.id,
            remote_status = %report.status,
            report_url = ?report.report_url,
            "Work item callback received",
        );

        self.finalize(&report.id, status).await
    }

    /// Reconcile a raw callback body on a tracked background task, so the
    /// HTTP caller can be acknowledged first and [`shutdown`](Self::shutdown)
    /// still waits for it. An unparseable body is logged and dropped.
    pub fn spawn_callback<B>(self: &Arc<Self>, body: B)
    where
        B: AsRef<[u8]> + Send + 'static,
    {
        let manager = Arc::clone(self);
        self.background.spawn(async move {
            let report: StatusResponse = match serde_json::from_slice(body.as_ref()) {
                Ok(report) => report,
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding malformed work item callback");
                    return;
                }
            };
            manager.on_callback(report).await;
        });
    }

    // ---- cancellation ----

    /// Cancel a tracked work item.
    ///
    /// The item is finalized as `Cancelled` right away; the remote cancel
    /// request runs detached and its outcome is only logged. A late
    /// callback for the same id is then absorbed as a no-op.
    pub async fn cancel(&self, id: &str) -> Result<WorkItem, WorkItemError> {
        validate_workitem_id(id).map_err(|e| WorkItemError::InvalidInput(e.to_string()))?;

        let item = self
            .finalize(id, WorkItemStatus::Cancelled)
            .await
            .ok_or_else(|| WorkItemError::NotFound(id.to_string()))?;

        let service = Arc::clone(&self.service);
        let workitem_id = item.id.clone();
        self.background.spawn(async move {
            match service.cancel(&workitem_id).await {
                Ok(()) => tracing::info!(workitem_id = %workitem_id, "Remote cancel accepted"),
                Err(e) => tracing::warn!(
                    workitem_id = %workitem_id,
                    error = %e,
                    "Remote cancel failed (work item already cancelled locally)",
                ),
            }
        });

        Ok(item)
    }

    // ---- shared ----

    /// Claim `id` from the registry and publish its final status.
    ///
    /// Only the caller whose removal succeeds publishes; everyone else gets
    /// `None` and does nothing.
    async fn finalize(&self, id: &str, status: WorkItemStatus) -> Option<WorkItem> {
        let Some(item) = self.registry.remove_if_present(id).await else {
            tracing::debug!(workitem_id = %id, %status, "Work item already finalized");
            return None;
        };

        let item = item.finalize(status);
        self.outcomes.record(&item).await;
        let delivered = self
            .bus
            .publish(TOPIC_WORKITEM, StatusEvent::from_workitem(&item));

        tracing::info!(
            workitem_id = %item.id,
            status = %item.status,
            subscribers = delivered,
            "Work item finalized",
        );

        Some(item)
    }

    /// Wait (bounded) for detached remote cancellations and in-flight
    /// callbacks to finish.
    pub async fn shutdown(&self) {
        self.background.close();
        if tokio::time::timeout(SHUTDOWN_GRACE, self.background.wait())
            .await
            .is_err()
        {
            tracing::warn!(
                pending = self.background.len(),
                "Background work item tasks still running at shutdown",
            );
        }
    }
}
