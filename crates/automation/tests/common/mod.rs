//! In-memory stand-in for the remote automation service.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::broadcast;
use viewpress_automation::messages::{
    DescriptorTemplate, RemoteStatus, StatusResponse, SubmitResponse, WorkItemDescriptor,
};
use viewpress_automation::{AutomationApiError, AutomationService, WorkItemManager, WorkItemRegistry};
use viewpress_events::{EventBus, TopicEvent};

/// Scriptable fake of the remote service.
///
/// Submissions get sequential ids `wi-1`, `wi-2`, ... Statuses are whatever
/// the test set via [`MockService::set_status`]; unknown ids are 404s.
#[derive(Default)]
pub struct MockService {
    next_id: AtomicUsize,
    statuses: Mutex<HashMap<String, RemoteStatus>>,
    pub submitted: Mutex<Vec<WorkItemDescriptor>>,
    pub cancelled: Mutex<Vec<String>>,
    pub fail_submit: Mutex<bool>,
    pub fail_status: Mutex<bool>,
    pub fail_cancel: Mutex<bool>,
}

impl MockService {
    pub fn set_status(&self, id: &str, status: RemoteStatus) {
        self.statuses.lock().unwrap().insert(id.to_string(), status);
    }

    pub fn submit_calls(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    pub fn cancel_calls(&self) -> Vec<String> {
        self.cancelled.lock().unwrap().clone()
    }
}

fn unavailable() -> AutomationApiError {
    AutomationApiError::ApiError {
        status: 503,
        body: "service unavailable".to_string(),
    }
}

#[async_trait]
impl AutomationService for MockService {
    async fn submit(
        &self,
        descriptor: &WorkItemDescriptor,
    ) -> Result<SubmitResponse, AutomationApiError> {
        if *self.fail_submit.lock().unwrap() {
            return Err(unavailable());
        }
        self.submitted.lock().unwrap().push(descriptor.clone());
        let id = format!("wi-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.set_status(&id, RemoteStatus::Pending);
        Ok(SubmitResponse {
            id,
            status: RemoteStatus::Pending,
        })
    }

    async fn status(&self, id: &str) -> Result<StatusResponse, AutomationApiError> {
        if *self.fail_status.lock().unwrap() {
            return Err(unavailable());
        }
        let status = self
            .statuses
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| AutomationApiError::NotFound(id.to_string()))?;
        Ok(StatusResponse {
            id: id.to_string(),
            status,
            report_url: Some(format!("https://logs.example/{id}.txt")),
            stats: None,
        })
    }

    async fn cancel(&self, id: &str) -> Result<(), AutomationApiError> {
        self.cancelled.lock().unwrap().push(id.to_string());
        if *self.fail_cancel.lock().unwrap() {
            return Err(unavailable());
        }
        Ok(())
    }
}

pub struct Harness {
    pub service: Arc<MockService>,
    pub registry: Arc<WorkItemRegistry>,
    pub bus: Arc<EventBus>,
    pub manager: Arc<WorkItemManager>,
    pub events: broadcast::Receiver<TopicEvent>,
}

pub fn harness() -> Harness {
    let service = Arc::new(MockService::default());
    let registry = Arc::new(WorkItemRegistry::new());
    let bus = Arc::new(EventBus::default());
    let events = bus.subscribe();
    let manager = Arc::new(WorkItemManager::new(
        service.clone(),
        Arc::clone(&registry),
        Arc::clone(&bus),
        DescriptorTemplate {
            activity_id: "viewpress.ExportToPdfs+test".to_string(),
            callback_url: "http://localhost:3000/api/v1/callback/designautomation".to_string(),
            input_token: None,
        },
    ));

    Harness {
        service,
        registry,
        bus,
        manager,
        events,
    }
}

/// Drain every event published so far.
pub fn drain(rx: &mut broadcast::Receiver<TopicEvent>) -> Vec<TopicEvent> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        out.push(event);
    }
    out
}
