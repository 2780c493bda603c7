//! Remote compute service client and work item lifecycle coordination.
//!
//! Provides the typed wire messages of the automation REST API, an HTTP
//! client for it, the process-wide [`WorkItemRegistry`], and the
//! [`WorkItemManager`] that submits jobs and reconciles poll, callback and
//! cancellation results through a single claim-once gate.

pub mod api;
pub mod config;
pub mod manager;
pub mod messages;
pub mod outcomes;
pub mod registry;
pub mod service;

pub use api::{AutomationApiError, DesignAutomationApi};
pub use config::AutomationConfig;
pub use manager::{WorkItemError, WorkItemManager};
pub use outcomes::FinalizedOutcomes;
pub use registry::WorkItemRegistry;
pub use service::AutomationService;
