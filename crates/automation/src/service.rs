//! The remote compute service seam.
//!
//! [`WorkItemManager`](crate::WorkItemManager) talks to the remote side only
//! through [`AutomationService`], so the lifecycle logic can be exercised
//! without a network.

use async_trait::async_trait;

use crate::api::{AutomationApiError, DesignAutomationApi};
use crate::messages::{StatusResponse, SubmitResponse, WorkItemDescriptor};

/// Operations the remote compute service offers for work items.
#[async_trait]
pub trait AutomationService: Send + Sync {
    /// Queue a job. The returned id correlates every later call.
    async fn submit(
        &self,
        descriptor: &WorkItemDescriptor,
    ) -> Result<SubmitResponse, AutomationApiError>;

    /// Current status of a job.
    async fn status(&self, id: &str) -> Result<StatusResponse, AutomationApiError>;

    /// Best-effort cancellation.
    async fn cancel(&self, id: &str) -> Result<(), AutomationApiError>;
}

#[async_trait]
impl AutomationService for DesignAutomationApi {
    async fn submit(
        &self,
        descriptor: &WorkItemDescriptor,
    ) -> Result<SubmitResponse, AutomationApiError> {
        self.submit_workitem(descriptor).await
    }

    async fn status(&self, id: &str) -> Result<StatusResponse, AutomationApiError> {
        self.get_workitem(id).await
    }

    async fn cancel(&self, id: &str) -> Result<(), AutomationApiError> {
        self.cancel_workitem(id).await
    }
}
