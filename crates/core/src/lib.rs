//! Domain types shared by every viewpress crate.
//!
//! Nothing in here performs I/O. The work item model, the view-selection
//! flags consumed by the remote export task, and the notification topic
//! names all live here so the service and the task agree on them.

pub mod error;
pub mod job_events;
pub mod types;
pub mod view_selection;
pub mod workitem;
